// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Dashboard assembly and the build pass
//!
//! `Dashboard::build` turns the declarative page tree into a running
//! system: models are registered (duplicate ids fail the build), figure
//! components are bound to their data sources, controls and actions run
//! their `pre_build` validation in tree order, and the callback wiring plus
//! the gateway table are computed once. The result is a frozen
//! [`BuiltDashboard`]: `Arc`-shared registries plus the action runtime.
//! Configuration failures anywhere in this pass abort the build — the
//! dashboard does not start half-validated.

use std::sync::Arc;

use tracing::debug;

use crate::actions::wiring::wire_action;
use crate::actions::ActionWiring;
use crate::data_manager::DataManager;
use crate::error::{Error, Result};
use crate::model_manager::ModelManager;
use crate::models::{KindFilter, Model, ModelId, ModelKind, Page};
use crate::runtime::{ActionRuntime, ChainRun, GatewayTable, TriggerEvent, UiState};

/// The declarative root: a titled collection of pages.
#[derive(Debug, Default)]
pub struct Dashboard {
    /// Dashboard title.
    pub title: String,
    /// Pages in navigation order.
    pub pages: Vec<Page>,
}

impl Dashboard {
    /// Create an empty dashboard.
    pub fn new(title: impl Into<String>) -> Self {
        Dashboard {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    /// Append a page.
    #[must_use]
    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Run the full build pass against a configured data manager.
    pub fn build(self, mut data: DataManager) -> Result<BuiltDashboard> {
        let mut models = ModelManager::new();
        for page in self.pages {
            models.register(Model::Page(page))?;
        }

        bind_figure_components(&models, &mut data)?;
        pre_build_controls(&mut models, &data)?;
        pre_build_chain_actions(&mut models, &data)?;
        let (gateway, wiring) = compute_wiring(&models)?;
        let ui = seed_ui_state(&models);

        let models = Arc::new(models);
        let data = Arc::new(data);
        let runtime = Arc::new(ActionRuntime::new(
            Arc::clone(&models),
            Arc::clone(&data),
            gateway,
            ui,
        ));
        Ok(BuiltDashboard {
            models,
            data,
            runtime,
            wiring,
        })
    }
}

/// A fully built, frozen dashboard.
pub struct BuiltDashboard {
    /// The frozen model registry.
    pub models: Arc<ModelManager>,
    /// The data manager with its bindings and cache.
    pub data: Arc<DataManager>,
    /// The action runtime, shared so chains on unrelated triggers can be
    /// dispatched from concurrent tasks.
    pub runtime: Arc<ActionRuntime>,
    /// Per-action callback wiring, for host-framework introspection.
    pub wiring: Vec<ActionWiring>,
}

impl std::fmt::Debug for BuiltDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltDashboard")
            .field("wiring", &self.wiring)
            .finish_non_exhaustive()
    }
}

impl BuiltDashboard {
    /// Dispatch a trigger event through the runtime.
    pub async fn dispatch(&self, event: TriggerEvent) -> Result<ChainRun> {
        self.runtime.dispatch(event).await
    }

    /// The wiring entry for one action, if it exists.
    #[must_use]
    pub fn wiring_for(&self, action: &ModelId) -> Option<&ActionWiring> {
        self.wiring.iter().find(|wiring| &wiring.action == action)
    }
}

/// Record which data source feeds each figure component.
fn bind_figure_components(models: &ModelManager, data: &mut DataManager) -> Result<()> {
    let bindings: Vec<(ModelId, String)> = models
        .models_of(KindFilter::Figures, None)
        .filter_map(|model| {
            model
                .captured_figure()
                .map(|captured| (model.id().clone(), captured.data_source().to_string()))
        })
        .collect();
    for (component, source) in bindings {
        data.bind_component(component, source)?;
    }
    Ok(())
}

/// Run control `pre_build` in tree order: filters first (parameters query
/// filter dynamism), then parameters.
fn pre_build_controls(models: &mut ModelManager, data: &DataManager) -> Result<()> {
    let filter_ids: Vec<ModelId> = models
        .models_of(KindFilter::Kind(ModelKind::Filter), None)
        .map(|m| m.id().clone())
        .collect();
    for id in filter_ids {
        let Model::Filter(mut filter) = models.take(&id)? else {
            return Err(Error::Validation(format!("Model '{id}' is not a filter.")));
        };
        let result = filter.pre_build(models, data);
        models.put_back(Model::Filter(filter));
        result?;
        debug!(filter = %id, "filter pre-built");
    }

    let parameter_ids: Vec<ModelId> = models
        .models_of(KindFilter::Kind(ModelKind::Parameter), None)
        .map(|m| m.id().clone())
        .collect();
    for id in parameter_ids {
        let Model::Parameter(mut parameter) = models.take(&id)? else {
            return Err(Error::Validation(format!("Model '{id}' is not a parameter.")));
        };
        let result = parameter.pre_build(models, data);
        models.put_back(Model::Parameter(parameter));
        result?;
        debug!(parameter = %id, "parameter pre-built");
    }
    Ok(())
}

/// Run `pre_build` over every action in every chain. The owning model stays
/// registered; only its chain list is detached for mutation.
fn pre_build_chain_actions(models: &mut ModelManager, data: &DataManager) -> Result<()> {
    let owners: Vec<ModelId> = models
        .models_of(KindFilter::Any, None)
        .filter(|model| !model.chains().is_empty())
        .map(|model| model.id().clone())
        .collect();

    for owner in owners {
        let page = models.page_of(&owner).ok_or_else(|| Error::Validation(format!(
            "Model '{owner}' carries actions but is not attached to any page."
        )))?;
        let mut chains = {
            let model = models.get_mut(&owner)?;
            let Some(chains) = model.chains_mut() else { continue };
            std::mem::take(chains)
        };
        let mut result = Ok(());
        'outer: for chain in &mut chains {
            let trigger = chain.trigger().clone();
            for action in chain.actions_mut() {
                if let Err(error) = action.pre_build(&page, &trigger, models, data) {
                    result = Err(error);
                    break 'outer;
                }
                action.mark_ready();
            }
        }
        if let Some(slot) = models.get_mut(&owner)?.chains_mut() {
            *slot = chains;
        }
        result?;
    }
    Ok(())
}

/// Build the gateway table and the per-action wiring list.
fn compute_wiring(models: &ModelManager) -> Result<(GatewayTable, Vec<ActionWiring>)> {
    let mut gateway = GatewayTable::new();
    let mut wiring = Vec::new();
    let entries: Vec<(ModelId, crate::actions::ActionsChain)> = models
        .chains()
        .map(|(owner, chain)| (owner.clone(), chain.clone()))
        .collect();
    for (owner, chain) in entries {
        let page = models.page_of(&owner).ok_or_else(|| Error::Validation(format!(
            "Model '{owner}' carries actions but is not attached to any page."
        )))?;
        let key = (
            chain.trigger().component().clone(),
            chain.trigger().property().to_string(),
        );
        if gateway.contains_key(&key) {
            return Err(Error::Validation(format!(
                "Trigger '{}.{}' already fires an actions chain; group all actions for one trigger into a single chain.",
                key.0, key.1
            )));
        }
        for action in chain.actions() {
            wiring.push(wire_action(action, &page, models)?);
        }
        gateway.insert(key, chain);
    }
    Ok((gateway, wiring))
}

/// Seed the UI state store with selector defaults and container collapse
/// states.
fn seed_ui_state(models: &ModelManager) -> UiState {
    let mut ui = UiState::new();
    for model in models.models_of(KindFilter::Any, None) {
        match model {
            Model::Selector(selector) => {
                if let Some(value) = selector.derived_default() {
                    ui.set_control_value(selector.id.clone(), value);
                }
            }
            Model::Container(container) => {
                if let Some(collapsed) = container.collapsed {
                    ui.set_collapsed(container.id.clone(), collapsed);
                }
            }
            _ => {}
        }
    }
    ui
}
