// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Actions: pure computations bound to reactive inputs and outputs
//!
//! An [`Action`] is a named unit of work fired by a trigger: it reads the
//! immutable controls snapshot, computes a mapping of logical output keys
//! to values, and never touches anything else. Built-in behaviors are a
//! tagged union ([`ActionKind`]) dispatched per kind into a
//! `(validate, compute, output-shape)` triple; user-defined behaviors plug
//! in through the [`CustomAction`] trait without touching the built-ins.
//!
//! Lifecycle per dashboard build: `Constructed` (fields set from config) →
//! `PreBuilt` (targets resolved against the model manager; failures here
//! are permanent and stop the dashboard from starting) → `Ready` (wired
//! into the callback table). Runtime invocations are independent of each
//! other; an action keeps no state between calls.

pub mod apply;
pub mod context;
pub mod export;
pub mod wiring;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::captured::Figure;
use crate::data_manager::DataManager;
use crate::error::{Error, Result};
use crate::model_manager::ModelManager;
use crate::models::{
    KindFilter, Model, ModelId, ModelKind, SelectorUpdate, TargetRef,
};
use crate::models::controls::FilterOperator;

pub use context::{ClickData, ControlState, ControlsState, InteractionState};
pub use export::DownloadPayload;
pub use wiring::{ActionWiring, CallbackInputs, OutputBinding, StateRef};

// ============================================================================
// Triggers and chains
// ============================================================================

/// The reactive event that fires an actions chain: one component property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trigger {
    component: ModelId,
    property: String,
}

impl Trigger {
    /// Create a trigger.
    pub fn new(component: ModelId, property: impl Into<String>) -> Self {
        Trigger {
            component,
            property: property.into(),
        }
    }

    /// The component whose property change fires the chain.
    #[must_use]
    pub fn component(&self) -> &ModelId {
        &self.component
    }

    /// The watched property.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }
}

/// An ordered group of actions sharing one trigger.
///
/// Execution is strictly sequential: later actions may depend on the
/// effects earlier actions had on shared process state.
#[derive(Debug, Clone)]
pub struct ActionsChain {
    id: ModelId,
    trigger: Trigger,
    actions: Vec<Action>,
}

impl ActionsChain {
    /// Create a chain; the id derives from the trigger component.
    #[must_use]
    pub fn new(trigger: Trigger, actions: Vec<Action>) -> Self {
        let id = ModelId::from(format!("actions_chain_{}", trigger.component()));
        ActionsChain {
            id,
            trigger,
            actions,
        }
    }

    /// Chain id.
    #[must_use]
    pub fn id(&self) -> &ModelId {
        &self.id
    }

    /// The shared trigger.
    #[must_use]
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// The actions in declared order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub(crate) fn actions_mut(&mut self) -> &mut Vec<Action> {
        &mut self.actions
    }
}

// ============================================================================
// Output values
// ============================================================================

/// The value an action writes to one output binding.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    /// A regenerated figure.
    Figure(Figure),
    /// A container collapse state.
    Collapsed(bool),
    /// A downloadable file payload.
    Download(DownloadPayload),
    /// A rebuilt dynamic-filter selector configuration.
    SelectorUpdate(SelectorUpdate),
}

/// Mapping of logical output key to computed value, in stable key order.
pub type ActionOutputs = BTreeMap<String, OutputValue>;

// ============================================================================
// Export format
// ============================================================================

/// File format for the export-data action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Excel workbook. Requires the `xlsx` cargo feature.
    Xlsx,
}

impl FileFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
        }
    }
}

// ============================================================================
// Custom actions
// ============================================================================

/// A user-defined action kind: the (validate, compute, output-shape) triple
/// the built-in kinds implement through the enum.
pub trait CustomAction: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Validate configuration against the built model tree. Runs once at
    /// `pre_build`; failures stop the dashboard from starting.
    fn validate(
        &self,
        action_id: &ModelId,
        page: &ModelId,
        models: &ModelManager,
        data: &DataManager,
    ) -> Result<()> {
        let _ = (action_id, page, models, data);
        Ok(())
    }

    /// The concrete output bindings this action writes.
    fn outputs(
        &self,
        action_id: &ModelId,
        models: &ModelManager,
    ) -> Result<BTreeMap<String, OutputBinding>>;

    /// Compute the output values for one invocation. Must be pure given the
    /// controls snapshot.
    fn compute(
        &self,
        models: &ModelManager,
        data: &DataManager,
        controls: &ControlsState,
    ) -> Result<ActionOutputs>;
}

// ============================================================================
// Action kinds
// ============================================================================

/// The behavior variants an action can carry.
#[derive(Clone)]
pub enum ActionKind {
    /// Apply a column predicate to each target figure's source data.
    Filter {
        /// Filtered column.
        column: String,
        /// Target figure ids.
        targets: Vec<ModelId>,
        /// Predicate operator derived from the selector type.
        operator: FilterOperator,
    },
    /// Like `Filter`, but the predicate value comes from a source figure's
    /// click event rather than a standalone selector.
    FilterInteraction {
        /// Target figure ids.
        targets: Vec<ModelId>,
    },
    /// Rebind captured-call arguments (or loader arguments) on each target.
    Parameter {
        /// `<component>.<argument_path>` references.
        targets: Vec<TargetRef>,
    },
    /// Recompute target figures (and dynamic filters) under the current
    /// controls state.
    UpdateFigures {
        /// Target ids; empty resolves to all figures on the page.
        targets: Vec<ModelId>,
    },
    /// Serialize each target's currently-filtered data to a download.
    ExportData {
        /// Target figure ids; empty resolves to all figures on the page.
        targets: Vec<ModelId>,
        /// Output format.
        file_format: FileFormat,
    },
    /// Collapse and expand containers. The simplest action: a pure UI-state
    /// toggle with no data involvement.
    ToggleContainers {
        /// Containers to collapse.
        collapse: Vec<ModelId>,
        /// Containers to expand.
        expand: Vec<ModelId>,
    },
    /// A user-defined action.
    Custom(Arc<dyn CustomAction>),
}

impl fmt::Debug for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Filter {
                column,
                targets,
                operator,
            } => f
                .debug_struct("Filter")
                .field("column", column)
                .field("targets", targets)
                .field("operator", operator)
                .finish(),
            ActionKind::FilterInteraction { targets } => f
                .debug_struct("FilterInteraction")
                .field("targets", targets)
                .finish(),
            ActionKind::Parameter { targets } => {
                f.debug_struct("Parameter").field("targets", targets).finish()
            }
            ActionKind::UpdateFigures { targets } => f
                .debug_struct("UpdateFigures")
                .field("targets", targets)
                .finish(),
            ActionKind::ExportData {
                targets,
                file_format,
            } => f
                .debug_struct("ExportData")
                .field("targets", targets)
                .field("file_format", file_format)
                .finish(),
            ActionKind::ToggleContainers { collapse, expand } => f
                .debug_struct("ToggleContainers")
                .field("collapse", collapse)
                .field("expand", expand)
                .finish(),
            ActionKind::Custom(custom) => {
                f.debug_tuple("Custom").field(&custom.name()).finish()
            }
        }
    }
}

/// Build-lifecycle state of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Fields set from user configuration.
    Constructed,
    /// Validated against the model tree.
    PreBuilt,
    /// Registered into the callback wiring.
    Ready,
}

// ============================================================================
// Action
// ============================================================================

/// A named, side-effect-describing unit: a pure computation with declared
/// reactive inputs and outputs.
#[derive(Debug, Clone)]
pub struct Action {
    id: ModelId,
    kind: ActionKind,
    state: ActionState,
}

impl Action {
    /// A filter action.
    pub fn filter(
        id: impl Into<ModelId>,
        column: impl Into<String>,
        targets: Vec<ModelId>,
        operator: FilterOperator,
    ) -> Self {
        Action {
            id: id.into(),
            kind: ActionKind::Filter {
                column: column.into(),
                targets,
                operator,
            },
            state: ActionState::Constructed,
        }
    }

    /// A filter-interaction action, fired by clicks on the source figure.
    pub fn filter_interaction(id: impl Into<ModelId>, targets: Vec<ModelId>) -> Self {
        Action {
            id: id.into(),
            kind: ActionKind::FilterInteraction { targets },
            state: ActionState::Constructed,
        }
    }

    /// A parameter action.
    pub fn parameter(id: impl Into<ModelId>, targets: Vec<TargetRef>) -> Self {
        Action {
            id: id.into(),
            kind: ActionKind::Parameter { targets },
            state: ActionState::Constructed,
        }
    }

    /// An update-figures action; empty targets resolve to every figure on
    /// the page at `pre_build`.
    pub fn update_figures(id: impl Into<ModelId>, targets: Vec<ModelId>) -> Self {
        Action {
            id: id.into(),
            kind: ActionKind::UpdateFigures { targets },
            state: ActionState::Constructed,
        }
    }

    /// An export-data action; empty targets resolve to every figure on the
    /// page at `pre_build`.
    pub fn export_data(
        id: impl Into<ModelId>,
        targets: Vec<ModelId>,
        file_format: FileFormat,
    ) -> Self {
        Action {
            id: id.into(),
            kind: ActionKind::ExportData {
                targets,
                file_format,
            },
            state: ActionState::Constructed,
        }
    }

    /// A container collapse/expand toggle.
    pub fn toggle_containers(
        id: impl Into<ModelId>,
        collapse: Vec<ModelId>,
        expand: Vec<ModelId>,
    ) -> Self {
        Action {
            id: id.into(),
            kind: ActionKind::ToggleContainers { collapse, expand },
            state: ActionState::Constructed,
        }
    }

    /// A user-defined action.
    pub fn custom(id: impl Into<ModelId>, custom: Arc<dyn CustomAction>) -> Self {
        Action {
            id: id.into(),
            kind: ActionKind::Custom(custom),
            state: ActionState::Constructed,
        }
    }

    /// Action id.
    #[must_use]
    pub fn id(&self) -> &ModelId {
        &self.id
    }

    /// The behavior variant.
    #[must_use]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Build-lifecycle state.
    #[must_use]
    pub fn state(&self) -> ActionState {
        self.state
    }

    pub(crate) fn mark_ready(&mut self) {
        self.state = ActionState::Ready;
    }

    /// Name used in logs and spans.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.kind {
            ActionKind::Filter { .. } => "filter",
            ActionKind::FilterInteraction { .. } => "filter_interaction",
            ActionKind::Parameter { .. } => "parameter",
            ActionKind::UpdateFigures { .. } => "update_figures",
            ActionKind::ExportData { .. } => "export_data",
            ActionKind::ToggleContainers { .. } => "toggle_containers",
            ActionKind::Custom(custom) => custom.name(),
        }
    }

    /// Validate and resolve configuration against the built model tree.
    /// Idempotent; failures are permanent configuration errors.
    ///
    /// `trigger` is the chain trigger this action belongs to; the owning
    /// model may be detached from the registry while the builder mutates
    /// it, so the trigger is passed in rather than looked up.
    pub fn pre_build(
        &mut self,
        page: &ModelId,
        trigger: &Trigger,
        models: &ModelManager,
        data: &DataManager,
    ) -> Result<()> {
        match &mut self.kind {
            // Filter and parameter actions are created by their owning
            // control's pre_build with targets already resolved.
            ActionKind::Filter { .. } | ActionKind::Parameter { .. } => {}
            ActionKind::FilterInteraction { targets } => {
                validate_targets_on_page(targets, models, page)?;
                let source = trigger.component().clone();
                match models.get(&source)? {
                    Model::Graph(graph) if !graph.custom_data.is_empty() => {}
                    Model::Graph(_) => {
                        return Err(Error::Validation(format!(
                            "Source chart '{source}' does not expose any custom_data columns required by filter_interaction."
                        )))
                    }
                    _ => {
                        return Err(Error::Validation(format!(
                            "filter_interaction can only be triggered by a Graph; '{source}' is not one."
                        )))
                    }
                }
            }
            ActionKind::UpdateFigures { targets } => {
                let figure_ids: Vec<ModelId> = models
                    .models_of(KindFilter::Figures, Some(page))
                    .map(|m| m.id().clone())
                    .collect();
                if targets.is_empty() {
                    *targets = figure_ids;
                } else {
                    let dynamic_filter_ids: Vec<ModelId> = models
                        .models_of(KindFilter::Kind(ModelKind::Filter), Some(page))
                        .filter_map(|m| match m {
                            Model::Filter(filter) if filter.is_dynamic() => {
                                Some(filter.id.clone())
                            }
                            _ => None,
                        })
                        .collect();
                    let invalid: Vec<String> = targets
                        .iter()
                        .filter(|t| !figure_ids.contains(t) && !dynamic_filter_ids.contains(t))
                        .map(ToString::to_string)
                        .collect();
                    if !invalid.is_empty() {
                        return Err(Error::Validation(format!(
                            "targets {invalid:?} are not valid figures on the page."
                        )));
                    }
                }
            }
            ActionKind::ExportData {
                targets,
                file_format,
            } => {
                export::check_format_available(*file_format)?;
                if targets.is_empty() {
                    *targets = models
                        .models_of(KindFilter::Figures, Some(page))
                        .map(|m| m.id().clone())
                        .collect();
                } else {
                    validate_targets_on_page(targets, models, page)?;
                }
            }
            ActionKind::ToggleContainers { collapse, expand } => {
                if collapse.is_empty() && expand.is_empty() {
                    return Err(Error::InvalidToggleTargets(
                        "at least one collapse or expand target is required".to_string(),
                    ));
                }
                let overlap: Vec<String> = collapse
                    .iter()
                    .filter(|id| expand.contains(id))
                    .map(ToString::to_string)
                    .collect();
                if !overlap.is_empty() {
                    return Err(Error::InvalidToggleTargets(format!(
                        "targets {overlap:?} appear in both the collapse and expand sets"
                    )));
                }
                for target in collapse.iter().chain(expand.iter()) {
                    validate_targets_on_page(std::slice::from_ref(target), models, page)?;
                    match models.get(target)? {
                        Model::Container(container) if container.collapsed.is_some() => {}
                        Model::Container(_) => {
                            return Err(Error::InvalidToggleTargets(format!(
                                "container '{target}' is not collapsible"
                            )))
                        }
                        _ => {
                            return Err(Error::InvalidToggleTargets(format!(
                                "target '{target}' is not a container"
                            )))
                        }
                    }
                }
            }
            ActionKind::Custom(custom) => {
                custom.validate(&self.id, page, models, data)?;
            }
        }
        self.state = ActionState::PreBuilt;
        Ok(())
    }

    /// The concrete output bindings this action writes, computed from
    /// `pre_build`-resolved state.
    pub fn outputs(&self, models: &ModelManager) -> Result<BTreeMap<String, OutputBinding>> {
        match &self.kind {
            ActionKind::Filter { targets, .. }
            | ActionKind::FilterInteraction { targets }
            | ActionKind::UpdateFigures { targets } => figure_output_bindings(targets, models),
            ActionKind::Parameter { targets } => {
                let mut components: Vec<ModelId> = Vec::new();
                for target in targets {
                    if !components.contains(target.model()) {
                        components.push(target.model().clone());
                    }
                }
                figure_output_bindings(&components, models)
            }
            ActionKind::ExportData { targets, .. } => Ok(targets
                .iter()
                .map(|target| {
                    (
                        format!("download_dataframe_{target}"),
                        OutputBinding {
                            component: ModelId::from(format!(
                                "download_dataframe_{}_{target}",
                                self.id
                            )),
                            property: "data".to_string(),
                        },
                    )
                })
                .collect()),
            ActionKind::ToggleContainers { collapse, expand } => Ok(collapse
                .iter()
                .chain(expand.iter())
                .map(|target| {
                    (
                        target.to_string(),
                        OutputBinding {
                            component: target.clone(),
                            property: "collapsed".to_string(),
                        },
                    )
                })
                .collect()),
            ActionKind::Custom(custom) => custom.outputs(&self.id, models),
        }
    }

    /// Run the action's pure computation against the controls snapshot.
    pub fn execute(
        &self,
        models: &ModelManager,
        data: &DataManager,
        controls: &ControlsState,
    ) -> Result<ActionOutputs> {
        match &self.kind {
            ActionKind::Filter { targets, .. }
            | ActionKind::FilterInteraction { targets }
            | ActionKind::UpdateFigures { targets } => {
                apply::get_modified_page_figures(models, data, controls, targets)
            }
            ActionKind::Parameter { targets } => {
                let mut components: Vec<ModelId> = Vec::new();
                for target in targets {
                    if !components.contains(target.model()) {
                        components.push(target.model().clone());
                    }
                }
                apply::get_modified_page_figures(models, data, controls, &components)
            }
            ActionKind::ExportData {
                targets,
                file_format,
            } => export::export_targets(models, data, controls, targets, *file_format),
            ActionKind::ToggleContainers { collapse, expand } => {
                let mut outputs = ActionOutputs::new();
                for target in collapse {
                    outputs.insert(target.to_string(), OutputValue::Collapsed(true));
                }
                for target in expand {
                    outputs.insert(target.to_string(), OutputValue::Collapsed(false));
                }
                Ok(outputs)
            }
            ActionKind::Custom(custom) => custom.compute(models, data, controls),
        }
    }
}

fn validate_targets_on_page(
    targets: &[ModelId],
    models: &ModelManager,
    page: &ModelId,
) -> Result<()> {
    for target in targets {
        if !models.contains(target) {
            return Err(Error::ModelNotFound(target.to_string()));
        }
        if models.page_of(target).as_ref() != Some(page) {
            return Err(Error::TargetNotOnPage {
                target: target.to_string(),
                page: page.to_string(),
            });
        }
    }
    Ok(())
}

fn figure_output_bindings(
    targets: &[ModelId],
    models: &ModelManager,
) -> Result<BTreeMap<String, OutputBinding>> {
    let mut bindings = BTreeMap::new();
    for target in targets {
        let property = match models.get(target) {
            Ok(model) => model.output_property().to_string(),
            // Stale references keep their default shape so wiring stays
            // total; the apply layer skips them at runtime anyway.
            Err(_) => "figure".to_string(),
        };
        bindings.insert(
            target.to_string(),
            OutputBinding {
                component: target.clone(),
                property,
            },
        );
    }
    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_derives_from_trigger() {
        let chain = ActionsChain::new(Trigger::new(ModelId::from("dropdown"), "value"), vec![]);
        assert_eq!(chain.id(), &ModelId::from("actions_chain_dropdown"));
        assert_eq!(chain.trigger().property(), "value");
    }

    #[test]
    fn test_file_format_extension() {
        assert_eq!(FileFormat::Csv.extension(), "csv");
        assert_eq!(FileFormat::Xlsx.extension(), "xlsx");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(
            Action::update_figures("a", Vec::new()).name(),
            "update_figures"
        );
        assert_eq!(
            Action::export_data("b", Vec::new(), FileFormat::Csv).name(),
            "export_data"
        );
        assert_eq!(
            Action::toggle_containers("c", Vec::new(), Vec::new()).name(),
            "toggle_containers"
        );
    }

    #[test]
    fn test_action_starts_constructed() {
        let action = Action::update_figures("a", Vec::new());
        assert_eq!(action.state(), ActionState::Constructed);
    }

    #[test]
    fn test_custom_kind_debug_shows_name() {
        struct Noop;
        impl CustomAction for Noop {
            fn name(&self) -> &str {
                "noop"
            }
            fn outputs(
                &self,
                _action_id: &ModelId,
                _models: &ModelManager,
            ) -> Result<BTreeMap<String, OutputBinding>> {
                Ok(BTreeMap::new())
            }
            fn compute(
                &self,
                _models: &ModelManager,
                _data: &DataManager,
                _controls: &ControlsState,
            ) -> Result<ActionOutputs> {
                Ok(ActionOutputs::new())
            }
        }
        let action = Action::custom("x", Arc::new(Noop));
        assert!(format!("{:?}", action.kind()).contains("noop"));
    }
}
