// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Action runtime: the explicit task queue behind every trigger
//!
//! A [`TriggerEvent`] enters the runtime, the gateway table resolves the
//! actions chain registered for that `(component, property)` pair, and the
//! chain's actions run strictly in declared order against one immutable
//! controls snapshot taken at dispatch time. Output writes land in the
//! [`UiState`] store as each action finishes, so later actions in the same
//! chain observe earlier effects through process state — writes never
//! re-enter the queue, which is what makes a cycle-breaker unnecessary.
//!
//! Chains on unrelated triggers are independent: dispatch them from
//! separate tasks (see [`ActionRuntime::spawn_dispatch`]) and they run
//! concurrently. Within one chain there is no concurrency at all; a slow
//! data loader blocks its chain for the duration of the load.

pub mod task;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info_span, warn};

use crate::actions::context::{ClickData, ControlState, ControlsState, InteractionState};
use crate::actions::{ActionKind, ActionOutputs, ActionsChain, OutputValue};
use crate::captured::Figure;
use crate::data_manager::DataManager;
use crate::error::{Error, Result};
use crate::model_manager::ModelManager;
use crate::models::{ControlValue, KindFilter, Model, ModelId, ModelKind, SelectorUpdate};

pub use task::{ActionTask, ChainRun, ChainState, TaskState};

use crate::actions::export::DownloadPayload;

// ============================================================================
// Trigger events
// ============================================================================

/// The payload carried by a trigger event.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerValue {
    /// A selector's value changed.
    Control(ControlValue),
    /// A point on a figure was clicked.
    Click(ClickData),
    /// A plain activation (button click).
    Activated,
}

/// One user event entering the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    /// The component whose property changed.
    pub component: ModelId,
    /// The changed property.
    pub property: String,
    /// The new value.
    pub value: TriggerValue,
}

impl TriggerEvent {
    /// A selector value change.
    pub fn control_change(component: impl Into<ModelId>, value: ControlValue) -> Self {
        TriggerEvent {
            component: component.into(),
            property: "value".to_string(),
            value: TriggerValue::Control(value),
        }
    }

    /// A click on a figure's data point.
    pub fn click(component: impl Into<ModelId>, click_data: ClickData) -> Self {
        TriggerEvent {
            component: component.into(),
            property: "click_data".to_string(),
            value: TriggerValue::Click(click_data),
        }
    }

    /// A button press.
    pub fn press(component: impl Into<ModelId>) -> Self {
        TriggerEvent {
            component: component.into(),
            property: "n_clicks".to_string(),
            value: TriggerValue::Activated,
        }
    }
}

// ============================================================================
// UI state store
// ============================================================================

/// The live component-property store the host framework would own: current
/// selector values, pending click events, and everything the action layer
/// has written back.
#[derive(Debug, Default)]
pub struct UiState {
    control_values: HashMap<ModelId, ControlValue>,
    click_data: HashMap<ModelId, ClickData>,
    collapsed: HashMap<ModelId, bool>,
    figures: HashMap<ModelId, Figure>,
    selector_updates: HashMap<ModelId, SelectorUpdate>,
    downloads: HashMap<ModelId, DownloadPayload>,
}

impl UiState {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a selector's current value.
    pub fn set_control_value(&mut self, selector: ModelId, value: ControlValue) {
        self.control_values.insert(selector, value);
    }

    /// Seed a container's collapse state.
    pub fn set_collapsed(&mut self, container: ModelId, collapsed: bool) {
        self.collapsed.insert(container, collapsed);
    }

    /// A selector's current value.
    #[must_use]
    pub fn control_value(&self, selector: &ModelId) -> Option<&ControlValue> {
        self.control_values.get(selector)
    }

    /// A container's current collapse state.
    #[must_use]
    pub fn collapsed(&self, container: &ModelId) -> Option<bool> {
        self.collapsed.get(container).copied()
    }

    /// The last figure written for a component.
    #[must_use]
    pub fn figure(&self, component: &ModelId) -> Option<&Figure> {
        self.figures.get(component)
    }

    /// The last selector rebuild written for a dynamic filter.
    #[must_use]
    pub fn selector_update(&self, control: &ModelId) -> Option<&SelectorUpdate> {
        self.selector_updates.get(control)
    }

    /// The last download written to a virtual download component.
    #[must_use]
    pub fn download(&self, component: &ModelId) -> Option<&DownloadPayload> {
        self.downloads.get(component)
    }
}

// ============================================================================
// Runtime
// ============================================================================

/// Dispatches trigger events into their action chains.
pub struct ActionRuntime {
    models: Arc<ModelManager>,
    data: Arc<DataManager>,
    gateway: HashMap<(ModelId, String), ActionsChain>,
    ui: RwLock<UiState>,
}

impl ActionRuntime {
    pub(crate) fn new(
        models: Arc<ModelManager>,
        data: Arc<DataManager>,
        gateway: HashMap<(ModelId, String), ActionsChain>,
        ui: UiState,
    ) -> Self {
        ActionRuntime {
            models,
            data,
            gateway,
            ui: RwLock::new(ui),
        }
    }

    /// The chain registered for a trigger, if any.
    #[must_use]
    pub fn chain_for(&self, component: &ModelId, property: &str) -> Option<&ActionsChain> {
        self.gateway
            .get(&(component.clone(), property.to_string()))
    }

    /// Read from the UI state store.
    pub fn with_ui<R>(&self, f: impl FnOnce(&UiState) -> R) -> R {
        f(&self.ui.read())
    }

    /// Dispatch one trigger event and run its chain to completion.
    ///
    /// Actions execute strictly in declared order. A failing action stops
    /// the chain: its task is marked `Failed`, the rest `Skipped`, and the
    /// error is attached to the returned [`ChainRun`] — outputs already
    /// written by earlier actions stay applied, and nothing outside this
    /// chain is affected.
    pub async fn dispatch(&self, event: TriggerEvent) -> Result<ChainRun> {
        let chain = self
            .gateway
            .get(&(event.component.clone(), event.property.clone()))
            .ok_or_else(|| Error::TriggerNotFound {
                component: event.component.to_string(),
                property: event.property.clone(),
            })?;

        let span = info_span!("actions_chain", chain = %chain.id(), trigger = %event.component);
        let _guard = span.enter();

        // The triggering write lands in the store before the snapshot is
        // taken, so the snapshot already reflects the new value.
        {
            let mut ui = self.ui.write();
            match &event.value {
                TriggerValue::Control(value) => {
                    ui.control_values
                        .insert(event.component.clone(), value.clone());
                }
                TriggerValue::Click(click) => {
                    ui.click_data.insert(event.component.clone(), click.clone());
                }
                TriggerValue::Activated => {}
            }
        }

        let mut run = ChainRun {
            chain: chain.id().clone(),
            trigger: chain.trigger().clone(),
            state: ChainState::Triggered,
            tasks: chain
                .actions()
                .iter()
                .map(|action| ActionTask {
                    action: action.id().clone(),
                    name: action.name().to_string(),
                    state: TaskState::Pending,
                })
                .collect(),
            outputs: ActionOutputs::new(),
            error: None,
        };

        let page = self
            .models
            .page_of(&event.component)
            .ok_or_else(|| Error::Validation(format!(
                "Trigger component '{}' is not attached to any page.",
                event.component
            )))?;
        let controls = self.snapshot(&page, &event.component);
        run.state = ChainState::Dispatching;
        debug!(remaining = run.remaining(), "chain dispatched");

        for index in 0..chain.actions().len() {
            let action = &chain.actions()[index];
            run.tasks[index].state = TaskState::Running;
            match action.execute(&self.models, &self.data, &controls) {
                Ok(outputs) => {
                    self.apply_outputs(action, &outputs);
                    run.outputs.extend(outputs);
                    run.tasks[index].state = TaskState::Finished;
                    debug!(action = %action.id(), remaining = run.remaining(), "action finished");
                }
                Err(error) => {
                    warn!(action = %action.id(), %error, "action failed; skipping rest of chain");
                    run.tasks[index].state = TaskState::Failed;
                    for task in &mut run.tasks[index + 1..] {
                        task.state = TaskState::Skipped;
                    }
                    run.error = Some(error.in_action(action.id().to_string()));
                    run.state = ChainState::Failed;
                    return Ok(run);
                }
            }
        }
        run.state = ChainState::Finished;
        Ok(run)
    }

    /// Dispatch on a spawned task, for chains on unrelated triggers that
    /// should run concurrently.
    pub fn spawn_dispatch(
        self: &Arc<Self>,
        event: TriggerEvent,
    ) -> tokio::task::JoinHandle<Result<ChainRun>> {
        let runtime = Arc::clone(self);
        tokio::spawn(async move { runtime.dispatch(event).await })
    }

    /// Dispatch several events concurrently and wait for every chain.
    /// Events must hit distinct triggers for the concurrency to matter;
    /// results come back in event order.
    pub async fn dispatch_all(&self, events: Vec<TriggerEvent>) -> Vec<Result<ChainRun>> {
        futures::future::join_all(events.into_iter().map(|event| self.dispatch(event))).await
    }

    /// Build the immutable controls snapshot for a page, in page
    /// declaration order.
    fn snapshot(&self, page: &ModelId, triggered: &ModelId) -> ControlsState {
        let ui = self.ui.read();
        let mut snapshot = ControlsState::new();

        for model in self
            .models
            .models_of(KindFilter::Kind(ModelKind::Filter), Some(page))
        {
            let Model::Filter(filter) = model else { continue };
            let Some(selector_id) = filter.selector_id() else { continue };
            if let Some(value) = self.selector_value(&ui, selector_id) {
                snapshot.filters.push(ControlState {
                    control: filter.id.clone(),
                    selector: selector_id.clone(),
                    value,
                    triggered: selector_id == triggered,
                });
            }
        }

        for model in self
            .models
            .models_of(KindFilter::Kind(ModelKind::Parameter), Some(page))
        {
            let Model::Parameter(parameter) = model else { continue };
            let Some(selector_id) = parameter.selector_id() else { continue };
            if let Some(value) = self.selector_value(&ui, selector_id) {
                snapshot.parameters.push(ControlState {
                    control: parameter.id.clone(),
                    selector: selector_id.clone(),
                    value,
                    triggered: selector_id == triggered,
                });
            }
        }

        for model in self
            .models
            .models_of(KindFilter::Kind(ModelKind::Graph), Some(page))
        {
            let Model::Graph(graph) = model else { continue };
            let interacts = graph
                .actions
                .iter()
                .flat_map(|chain| chain.actions())
                .any(|action| matches!(action.kind(), ActionKind::FilterInteraction { .. }));
            if interacts {
                snapshot.filter_interaction.push(InteractionState {
                    source: graph.id.clone(),
                    click_data: ui.click_data.get(&graph.id).cloned(),
                });
            }
        }

        snapshot
    }

    fn selector_value(&self, ui: &UiState, selector_id: &ModelId) -> Option<ControlValue> {
        if let Some(value) = ui.control_values.get(selector_id) {
            return Some(value.clone());
        }
        match self.models.get(selector_id) {
            Ok(Model::Selector(selector)) => selector.derived_default(),
            _ => None,
        }
    }

    /// Write one action's outputs into the UI state store.
    fn apply_outputs(&self, action: &crate::actions::Action, outputs: &ActionOutputs) {
        let bindings = action.outputs(&self.models).unwrap_or_default();
        let mut ui = self.ui.write();
        for (key, value) in outputs {
            let component = bindings
                .get(key)
                .map(|binding| binding.component.clone())
                .unwrap_or_else(|| ModelId::from(key.as_str()));
            match value {
                OutputValue::Figure(figure) => {
                    ui.figures.insert(component, figure.clone());
                }
                OutputValue::Collapsed(collapsed) => {
                    ui.collapsed.insert(component, *collapsed);
                }
                OutputValue::Download(payload) => {
                    ui.downloads.insert(component, payload.clone());
                }
                OutputValue::SelectorUpdate(update) => {
                    ui.selector_updates.insert(component, update.clone());
                }
            }
        }
    }
}

/// The gateway table type: `(component, property)` → chain.
pub(crate) type GatewayTable = HashMap<(ModelId, String), ActionsChain>;
