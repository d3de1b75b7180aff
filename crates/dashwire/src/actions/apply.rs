// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Filter and parameter application
//!
//! This is the algorithmic core of the action layer: given a controls
//! snapshot and a set of target ids, produce the regenerated figure for
//! each target. The order of operations is fixed and deliberate:
//!
//! 1. loader arguments from `data_frame` parameters are applied while the
//!    target's source data is loaded (parameters may change the *shape* of
//!    the loaded frame),
//! 2. filters apply to the loaded frame, AND-composed in page declaration
//!    order,
//! 3. figure-interaction predicates apply the same way after filters,
//! 4. remaining parameters rebind the captured call's keyword arguments,
//! 5. the captured call re-runs with the final frame and argument map.
//!
//! A target that no longer exists on the page is skipped silently rather
//! than failing the whole invocation: pages in the middle of a navigation
//! transition routinely hold stale references.

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::actions::context::{ControlState, ControlsState, InteractionState};
use crate::actions::{ActionKind, ActionOutputs, OutputValue};
use crate::captured::{set_nested, ArgumentMap, CapturedCallable};
use crate::data_manager::{DataManager, LoadArguments};
use crate::dataframe::{Column, DataFrame};
use crate::error::{Error, Result};
use crate::model_manager::ModelManager;
use crate::models::controls::{rebuild_selector_update, FilterOperator};
use crate::models::{ControlValue, Model, ModelId};

/// Convert a control value to its JSON form for argument rebinding.
#[must_use]
pub fn control_value_to_json(value: &ControlValue) -> JsonValue {
    match value {
        ControlValue::Single(v) => serde_json::to_value(v).unwrap_or(JsonValue::Null),
        ControlValue::Many(vs) => serde_json::to_value(vs).unwrap_or(JsonValue::Null),
    }
}

/// Apply every filter targeting `target` to `frame`, AND-composed in the
/// order the snapshot lists them (page declaration order).
pub fn apply_filters(
    mut frame: DataFrame,
    filters: &[ControlState],
    models: &ModelManager,
    target: &ModelId,
) -> Result<DataFrame> {
    for state in filters {
        let Ok(Model::Filter(filter)) = models.get(&state.control) else {
            continue;
        };
        if !filter.targets.contains(target) {
            continue;
        }
        let values = state.value.as_list();
        let mask = match filter.operator() {
            FilterOperator::IsIn => {
                if values.is_empty() {
                    continue;
                }
                frame.isin(&filter.column, &values)?
            }
            FilterOperator::Between => {
                let (Some(low), Some(high)) = (values.first(), values.get(1)) else {
                    continue;
                };
                frame.between(&filter.column, low, high)?
            }
        };
        frame = frame.filter(&mask)?;
    }
    Ok(frame)
}

/// Apply every pending figure-interaction event targeting `target`,
/// composed the same way as filters.
pub fn apply_filter_interaction(
    mut frame: DataFrame,
    interactions: &[InteractionState],
    models: &ModelManager,
    target: &ModelId,
) -> Result<DataFrame> {
    for interaction in interactions {
        let Some(click) = &interaction.click_data else {
            continue;
        };
        let Ok(Model::Graph(source)) = models.get(&interaction.source) else {
            continue;
        };
        let targets_this = source.actions.iter().flat_map(|chain| chain.actions()).any(
            |action| match action.kind() {
                ActionKind::FilterInteraction { targets } => targets.contains(target),
                _ => false,
            },
        );
        if !targets_this {
            continue;
        }
        if source.custom_data.is_empty() {
            return Err(Error::Validation(format!(
                "No custom_data columns found for source chart '{}'.",
                source.id
            )));
        }
        for (column, value) in source.custom_data.iter().zip(&click.custom_data) {
            let mask = frame.isin(column, std::slice::from_ref(value))?;
            frame = frame.filter(&mask)?;
        }
    }
    Ok(frame)
}

/// Collect the loader arguments for `target` contributed by `data_frame`
/// parameters in the snapshot.
pub fn loader_arguments(
    target: &ModelId,
    parameters: &[ControlState],
    models: &ModelManager,
) -> Result<LoadArguments> {
    let mut args = LoadArguments::new();
    for state in parameters {
        let Ok(Model::Parameter(parameter)) = models.get(&state.control) else {
            continue;
        };
        for target_ref in &parameter.targets {
            let Some(argument) = target_ref.data_frame_argument() else {
                continue;
            };
            if target_ref.model() != target {
                continue;
            }
            match &state.value {
                ControlValue::Single(value) => args.set(argument, value.clone()),
                ControlValue::Many(_) => {
                    return Err(Error::Validation(format!(
                        "data_frame argument '{argument}' requires a scalar selector value."
                    )))
                }
            }
        }
    }
    Ok(args)
}

/// Rebind the captured call's keyword arguments for `target` from every
/// non-`data_frame` parameter in the snapshot. Dotted paths update one
/// nested key without clobbering siblings.
pub fn parametrized_config(
    target: &ModelId,
    captured: &CapturedCallable,
    parameters: &[ControlState],
    models: &ModelManager,
) -> Result<ArgumentMap> {
    let mut config = captured.bound_arguments();
    config.remove("data_frame");
    for state in parameters {
        let Ok(Model::Parameter(parameter)) = models.get(&state.control) else {
            continue;
        };
        for target_ref in &parameter.targets {
            if target_ref.model() != target
                || target_ref.is_data_frame()
                || target_ref.path().is_empty()
            {
                continue;
            }
            set_nested(
                &mut config,
                target_ref.path(),
                control_value_to_json(&state.value),
            )?;
        }
    }
    Ok(config)
}

/// Load `target`'s bound data with parameter-derived loader arguments and
/// run the full filter pipeline over it.
pub fn load_filtered_frame(
    models: &ModelManager,
    data: &DataManager,
    controls: &ControlsState,
    target: &ModelId,
) -> Result<DataFrame> {
    let args = loader_arguments(target, &controls.parameters, models)?;
    let frame = data.component_data_with(target, &args)?;
    let frame = apply_filters(frame, &controls.filters, models, target)?;
    apply_filter_interaction(frame, &controls.filter_interaction, models, target)
}

/// Regenerate every target under the current controls state.
///
/// Figure targets come back as [`OutputValue::Figure`]; dynamic-filter
/// targets as [`OutputValue::SelectorUpdate`] rebuilt from the freshly
/// loaded data. Stale targets are skipped.
pub fn get_modified_page_figures(
    models: &ModelManager,
    data: &DataManager,
    controls: &ControlsState,
    targets: &[ModelId],
) -> Result<ActionOutputs> {
    let mut outputs = ActionOutputs::new();
    for target in targets {
        let Ok(model) = models.get(target) else {
            debug!(target = %target, "skipping stale action target");
            continue;
        };
        match model {
            _ if model.is_figure() => {
                let captured = model.captured_figure().ok_or_else(|| {
                    Error::Validation(format!("figure model '{target}' has no captured call"))
                })?;
                let frame = load_filtered_frame(models, data, controls, target)?;
                let config = parametrized_config(target, captured, &controls.parameters, models)?;
                let figure = captured.call(frame, &config)?;
                outputs.insert(target.to_string(), OutputValue::Figure(figure));
            }
            Model::Filter(filter) => {
                let selector_kind = filter
                    .selector_id()
                    .and_then(|id| match models.get(id) {
                        Ok(Model::Selector(selector)) => Some(selector.kind),
                        _ => None,
                    })
                    .ok_or_else(|| {
                        Error::Validation(format!("Filter '{target}' has no built selector."))
                    })?;
                let mut columns: Vec<Column> = Vec::new();
                for figure_id in &filter.targets {
                    if !models.contains(figure_id) {
                        continue;
                    }
                    let args = loader_arguments(figure_id, &controls.parameters, models)?;
                    let frame = data.component_data_with(figure_id, &args)?;
                    if let Some(column) = frame.column(&filter.column) {
                        columns.push(column.clone());
                    }
                }
                let refs: Vec<&Column> = columns.iter().collect();
                let update = rebuild_selector_update(filter, selector_kind, &refs)?;
                outputs.insert(target.to_string(), OutputValue::SelectorUpdate(update));
            }
            _ => {
                debug!(target = %target, "action target is neither figure nor dynamic filter; skipping");
            }
        }
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::Value;
    use serde_json::json;

    #[test]
    fn test_control_value_to_json() {
        assert_eq!(
            control_value_to_json(&ControlValue::Single(Value::from(3.0))),
            json!(3.0)
        );
        assert_eq!(
            control_value_to_json(&ControlValue::Many(vec![
                Value::from("a"),
                Value::from("b")
            ])),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_empty_snapshot_leaves_frame_untouched() {
        let models = ModelManager::new();
        let frame = DataFrame::new()
            .with_column("x", vec![Value::from(1.0), Value::from(2.0)])
            .unwrap();
        let out = apply_filters(frame.clone(), &[], &models, &ModelId::from("g")).unwrap();
        assert_eq!(out, frame);
        let out =
            apply_filter_interaction(frame.clone(), &[], &models, &ModelId::from("g")).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn test_stale_targets_are_skipped() {
        let models = ModelManager::new();
        let data = DataManager::new();
        let outputs = get_modified_page_figures(
            &models,
            &data,
            &ControlsState::new(),
            &[ModelId::from("gone")],
        )
        .unwrap();
        assert!(outputs.is_empty());
    }
}
