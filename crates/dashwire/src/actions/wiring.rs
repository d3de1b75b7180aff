// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Callback wiring
//!
//! Translates an action's declared logical inputs and outputs into the
//! concrete reactive read and write bindings the hosting framework needs:
//! one state reference per filter selector, parameter selector and
//! interaction source on the action's page, and one output binding per
//! resolved target. The wiring is computed once at dashboard build time and
//! handed to the host; nothing here runs per invocation.

use std::collections::BTreeMap;

use crate::actions::{Action, ActionKind};
use crate::model_manager::ModelManager;
use crate::models::{KindFilter, Model, ModelId, ModelKind};

/// A reactive read binding: the host supplies this property's current value
/// when the action fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRef {
    /// Component to read from.
    pub component: ModelId,
    /// Property to read.
    pub property: String,
}

/// A reactive write binding: the host writes the action's output value to
/// this property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBinding {
    /// Component to write to.
    pub component: ModelId,
    /// Property to write.
    pub property: String,
}

/// The concrete read set of one action, grouped the way the controls
/// snapshot is grouped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackInputs {
    /// One read per filter selector on the page.
    pub filters: Vec<StateRef>,
    /// One read per parameter selector on the page.
    pub parameters: Vec<StateRef>,
    /// One read per interaction source figure on the page.
    pub filter_interaction: Vec<StateRef>,
}

/// The full wiring of one action: what it reads and where it writes.
#[derive(Debug, Clone)]
pub struct ActionWiring {
    /// The wired action.
    pub action: ModelId,
    /// Read bindings.
    pub inputs: CallbackInputs,
    /// Write bindings keyed by the action's logical output keys.
    pub outputs: BTreeMap<String, OutputBinding>,
}

/// Compute the read set for an action living on `page`.
#[must_use]
pub fn callback_inputs(page: &ModelId, models: &ModelManager) -> CallbackInputs {
    let mut inputs = CallbackInputs::default();

    for model in models.models_of(KindFilter::Kind(ModelKind::Filter), Some(page)) {
        let Model::Filter(filter) = model else { continue };
        if let Some(selector_id) = filter.selector_id() {
            inputs.filters.push(StateRef {
                component: selector_id.clone(),
                property: "value".to_string(),
            });
        }
    }

    for model in models.models_of(KindFilter::Kind(ModelKind::Parameter), Some(page)) {
        let Model::Parameter(parameter) = model else { continue };
        if let Some(selector_id) = parameter.selector_id() {
            inputs.parameters.push(StateRef {
                component: selector_id.clone(),
                property: "value".to_string(),
            });
        }
    }

    for model in models.models_of(KindFilter::Kind(ModelKind::Graph), Some(page)) {
        let Model::Graph(graph) = model else { continue };
        let interacts = graph
            .actions
            .iter()
            .flat_map(|chain| chain.actions())
            .any(|action| matches!(action.kind(), ActionKind::FilterInteraction { .. }));
        if interacts {
            inputs.filter_interaction.push(StateRef {
                component: graph.id.clone(),
                property: "click_data".to_string(),
            });
        }
    }

    inputs
}

/// Compute the full wiring for one pre-built action.
pub fn wire_action(
    action: &Action,
    page: &ModelId,
    models: &ModelManager,
) -> crate::error::Result<ActionWiring> {
    Ok(ActionWiring {
        action: action.id().clone(),
        inputs: callback_inputs(page, models),
        outputs: action.outputs(models)?,
    })
}
