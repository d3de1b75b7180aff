// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! End-to-end action loop tests
//!
//! Each test assembles a small dashboard, dispatches trigger events through
//! the runtime and asserts on the regenerated figures, downloads and UI
//! state — the full path from declarative config to action outputs.

use std::sync::Arc;

use dashwire::actions::{Action, FileFormat};
use dashwire::captured::CapturedCallable;
use dashwire::data_manager::{DataManager, InMemoryCache};
use dashwire::dataframe::{DataFrame, Value};
use dashwire::error::Error;
use dashwire::models::{
    Button, Container, ControlValue, Filter, Graph, Model, ModelId, Page, Parameter, Selector,
};
use dashwire::runtime::TriggerEvent;
use dashwire::{ClickData, Dashboard};
use dashwire_testing::{iris, iris_sample_loader, scatter_figure, CountingLoader};
use serde_json::json;

fn static_iris_data() -> DataManager {
    let mut data = DataManager::new();
    data.register_static("iris", iris()).unwrap();
    data
}

/// Opt into log output for a test run via RUST_LOG.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ============================================================================
// Filter scenarios
// ============================================================================

#[tokio::test]
async fn test_dropdown_filter_regenerates_target_figure() {
    init_tracing();
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_control(Model::Filter(Filter::new("species_filter", "species"))),
    );
    let built = dashboard.build(data).unwrap();

    let run = built
        .dispatch(TriggerEvent::control_change(
            "species_filter_selector",
            ControlValue::Many(vec![Value::from("setosa")]),
        ))
        .await
        .unwrap();
    assert!(run.succeeded());
    assert_eq!(run.remaining(), 0);

    let rows = built.runtime.with_ui(|ui| {
        ui.figure(&ModelId::from("scatter")).unwrap().data.row_count()
    });
    assert_eq!(rows, 50);
}

#[tokio::test]
async fn test_two_filters_compose_with_and() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_control(Model::Filter(Filter::new("species_filter", "species")))
            .with_control(Model::Filter(Filter::new("width_filter", "petal_width"))),
    );
    let built = dashboard.build(data).unwrap();

    // Narrow species first; the width filter still spans its full range so
    // it keeps everything.
    built
        .dispatch(TriggerEvent::control_change(
            "species_filter_selector",
            ControlValue::Many(vec![Value::from("setosa")]),
        ))
        .await
        .unwrap();
    let rows = built.runtime.with_ui(|ui| {
        ui.figure(&ModelId::from("scatter")).unwrap().data.row_count()
    });
    assert_eq!(rows, 50);

    // Now narrow the width range; both predicates apply (AND).
    built
        .dispatch(TriggerEvent::control_change(
            "width_filter_selector",
            ControlValue::Many(vec![Value::from(0.2), Value::from(0.3)]),
        ))
        .await
        .unwrap();
    let figure = built
        .runtime
        .with_ui(|ui| ui.figure(&ModelId::from("scatter")).cloned())
        .unwrap();
    assert!(figure.data.row_count() < 50);
    let species = figure.data.column("species").unwrap();
    assert!(species.values.iter().all(|v| *v == Value::from("setosa")));
}

#[tokio::test]
async fn test_filter_interaction_from_source_chart_click() {
    let data = static_iris_data();
    let source = Graph::new("bar", scatter_figure("iris"))
        .with_custom_data(vec!["species".to_string()])
        .with_actions(vec![Action::filter_interaction(
            "cross_filter",
            vec![ModelId::from("scatter")],
        )]);
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(source))
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris")))),
    );
    let built = dashboard.build(data).unwrap();

    let run = built
        .dispatch(TriggerEvent::click(
            "bar",
            ClickData {
                custom_data: vec![Value::from("virginica")],
            },
        ))
        .await
        .unwrap();
    assert!(run.succeeded());

    let figure = built
        .runtime
        .with_ui(|ui| ui.figure(&ModelId::from("scatter")).cloned())
        .unwrap();
    assert_eq!(figure.data.row_count(), 50);
    let species = figure.data.column("species").unwrap();
    assert!(species.values.iter().all(|v| *v == Value::from("virginica")));
}

#[tokio::test]
async fn test_filter_interaction_requires_custom_data() {
    let data = static_iris_data();
    let source = Graph::new("bar", scatter_figure("iris")).with_actions(vec![
        Action::filter_interaction("cross_filter", vec![ModelId::from("scatter")]),
    ]);
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(source))
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris")))),
    );
    let err = dashboard.build(data).unwrap_err();
    assert!(err.to_string().contains("custom_data"));
}

// ============================================================================
// Parameter scenarios
// ============================================================================

#[tokio::test]
async fn test_data_frame_parameter_reloads_once_per_new_value() {
    let counting = CountingLoader::wrap(iris_sample_loader());
    let mut data = DataManager::new();
    data.register_loader("iris_sample", counting.clone()).unwrap();
    data.set_cache(Arc::new(InMemoryCache::new()));

    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new(
                "scatter",
                scatter_figure("iris_sample"),
            )))
            .with_control(Model::Parameter(
                Parameter::new(
                    "points_param",
                    &["scatter.data_frame.number_of_points"],
                    Selector::slider("points_slider")
                        .with_bounds(10.0, 150.0)
                        .with_value(ControlValue::Single(Value::from(10.0))),
                )
                .unwrap(),
            )),
    );
    let built = dashboard.build(data).unwrap();
    assert_eq!(counting.call_count(), 0);

    // Moving the slider to 100 triggers exactly one reload and one
    // re-render with the new loader argument.
    let run = built
        .dispatch(TriggerEvent::control_change(
            "points_slider",
            ControlValue::Single(Value::from(100.0)),
        ))
        .await
        .unwrap();
    assert!(run.succeeded());
    assert_eq!(run.outputs.len(), 1);
    assert_eq!(counting.call_count(), 1);
    let rows = built.runtime.with_ui(|ui| {
        ui.figure(&ModelId::from("scatter")).unwrap().data.row_count()
    });
    assert_eq!(rows, 100);

    // Back to 10: a fresh (name, kwargs) pair, so one more reload.
    built
        .dispatch(TriggerEvent::control_change(
            "points_slider",
            ControlValue::Single(Value::from(10.0)),
        ))
        .await
        .unwrap();
    assert_eq!(counting.call_count(), 2);

    // Setting 10 again hits the cache; no reload.
    built
        .dispatch(TriggerEvent::control_change(
            "points_slider",
            ControlValue::Single(Value::from(10.0)),
        ))
        .await
        .unwrap();
    assert_eq!(counting.call_count(), 2);
}

#[tokio::test]
async fn test_data_frame_parameter_refreshes_dynamic_filter() {
    let mut data = DataManager::new();
    data.register_loader("iris_sample", iris_sample_loader())
        .unwrap();
    data.set_cache(Arc::new(InMemoryCache::new()));

    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new(
                "scatter",
                scatter_figure("iris_sample"),
            )))
            .with_control(Model::Filter(Filter::new("species_filter", "species")))
            .with_control(Model::Parameter(
                Parameter::new(
                    "points_param",
                    &["scatter.data_frame.number_of_points"],
                    Selector::slider("points_slider")
                        .with_bounds(10.0, 150.0)
                        .with_value(ControlValue::Single(Value::from(10.0))),
                )
                .unwrap(),
            )),
    );
    let built = dashboard.build(data).unwrap();

    // The default sample (10 rows) only contains setosa, so the dynamic
    // filter starts with a single option.
    {
        let Model::Selector(selector) = built
            .models
            .get(&ModelId::from("species_filter_selector"))
            .unwrap()
        else {
            panic!("not a selector")
        };
        assert_eq!(selector.options, vec![Value::from("setosa")]);
    }

    // Growing the sample to 100 rows reloads the data, re-renders the
    // figure and rebuilds the filter's options from the new frame.
    let run = built
        .dispatch(TriggerEvent::control_change(
            "points_slider",
            ControlValue::Single(Value::from(100.0)),
        ))
        .await
        .unwrap();
    assert!(run.succeeded());

    let update = built
        .runtime
        .with_ui(|ui| ui.selector_update(&ModelId::from("species_filter")).cloned())
        .unwrap();
    assert_eq!(
        update.options,
        vec![Value::from("setosa"), Value::from("versicolor")]
    );
    // The figure keeps honoring the filter's current selection (setosa,
    // its only initial option), so 50 of the 100 loaded rows survive.
    let rows = built.runtime.with_ui(|ui| {
        ui.figure(&ModelId::from("scatter")).unwrap().data.row_count()
    });
    assert_eq!(rows, 50);
}

#[tokio::test]
async fn test_parameter_is_idempotent() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_control(Model::Parameter(
                Parameter::new(
                    "axis_param",
                    &["scatter.x"],
                    Selector::radio_items("axis_selector").with_options(vec![
                        Value::from("sepal_length"),
                        Value::from("petal_width"),
                    ]),
                )
                .unwrap(),
            )),
    );
    let built = dashboard.build(data).unwrap();

    let event = TriggerEvent::control_change(
        "axis_selector",
        ControlValue::Single(Value::from("petal_width")),
    );
    built.dispatch(event.clone()).await.unwrap();
    let first = built
        .runtime
        .with_ui(|ui| ui.figure(&ModelId::from("scatter")).cloned())
        .unwrap();
    built.dispatch(event).await.unwrap();
    let second = built
        .runtime
        .with_ui(|ui| ui.figure(&ModelId::from("scatter")).cloned())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.config["x"], json!("petal_width"));
}

#[tokio::test]
async fn test_parameter_nested_path_preserves_siblings() {
    let data = static_iris_data();
    let capture = CapturedCallable::new("iris", |frame, args| {
        Ok(dashwire::Figure::new(
            "scatter",
            frame,
            serde_json::Value::Object(args.clone()),
        ))
    })
    .with_argument("layout", json!({"title": {"text": "Iris", "size": 12}, "height": 400}));

    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", capture)))
            .with_control(Model::Parameter(
                Parameter::new(
                    "size_param",
                    &["scatter.layout.title.size"],
                    Selector::slider("size_slider").with_bounds(8.0, 32.0),
                )
                .unwrap(),
            )),
    );
    let built = dashboard.build(data).unwrap();

    built
        .dispatch(TriggerEvent::control_change(
            "size_slider",
            ControlValue::Single(Value::from(20.0)),
        ))
        .await
        .unwrap();
    let figure = built
        .runtime
        .with_ui(|ui| ui.figure(&ModelId::from("scatter")).cloned())
        .unwrap();
    assert_eq!(figure.config["layout"]["title"]["size"], json!(20.0));
    assert_eq!(figure.config["layout"]["title"]["text"], json!("Iris"));
    assert_eq!(figure.config["layout"]["height"], json!(400));
}

#[test]
fn test_duplicate_parameter_targets_rejected() {
    let data = static_iris_data();
    let slider = |id: &str| Selector::slider(id).with_bounds(0.0, 1.0);
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_control(Model::Parameter(
                Parameter::new("first", &["scatter.x"], slider("first_selector")).unwrap(),
            ))
            .with_control(Model::Parameter(
                Parameter::new("second", &["scatter.x"], slider("second_selector")).unwrap(),
            )),
    );
    let err = dashboard.build(data).unwrap_err();
    assert!(matches!(err, Error::DuplicateParameterTargets(_)));
}

#[test]
fn test_parameter_selector_requires_bounds() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_control(Model::Parameter(
                Parameter::new("p", &["scatter.x"], Selector::slider("bare_slider")).unwrap(),
            )),
    );
    let err = dashboard.build(data).unwrap_err();
    assert!(matches!(err, Error::MissingSelectorBounds { .. }));
}

// ============================================================================
// Export scenarios
// ============================================================================

#[tokio::test]
async fn test_export_csv_round_trips_filtered_data() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_component(Model::Button(Button::new("export_btn", "Export").with_actions(
                vec![Action::export_data("export", Vec::new(), FileFormat::Csv)],
            )))
            .with_control(Model::Filter(Filter::new("species_filter", "species"))),
    );
    let built = dashboard.build(data).unwrap();

    built
        .dispatch(TriggerEvent::control_change(
            "species_filter_selector",
            ControlValue::Many(vec![Value::from("versicolor")]),
        ))
        .await
        .unwrap();
    let run = built
        .dispatch(TriggerEvent::press("export_btn"))
        .await
        .unwrap();
    assert!(run.succeeded());

    let wiring = built.wiring_for(&ModelId::from("export")).unwrap();
    let binding = wiring.outputs.get("download_dataframe_scatter").unwrap();
    let payload = built
        .runtime
        .with_ui(|ui| ui.download(&binding.component).cloned())
        .unwrap();
    assert_eq!(payload.filename, "scatter.csv");

    // The payload round-trips through an actual file on disk: same rows,
    // same columns as the on-screen frame.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(&payload.filename);
    std::fs::write(&path, &payload.content).unwrap();
    let parsed = DataFrame::read_csv(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(parsed.row_count(), 50);
    assert_eq!(
        parsed.column_names(),
        vec!["species", "sepal_length", "petal_width"]
    );
}

#[cfg(not(feature = "xlsx"))]
#[test]
fn test_export_xlsx_without_support_fails_at_build() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_component(Model::Button(Button::new("export_btn", "Export").with_actions(
                vec![Action::export_data(
                    "export",
                    vec![ModelId::from("scatter")],
                    FileFormat::Xlsx,
                )],
            ))),
    );
    // The capability gap surfaces at build time, before any interaction.
    let err = dashboard.build(data).unwrap_err();
    assert!(matches!(err, Error::ExportFormatUnavailable { .. }));
}

#[tokio::test]
async fn test_export_defaults_to_all_page_figures() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("first", scatter_figure("iris"))))
            .with_component(Model::Graph(Graph::new("second", scatter_figure("iris"))))
            .with_component(Model::Button(Button::new("export_btn", "Export").with_actions(
                vec![Action::export_data("export", Vec::new(), FileFormat::Csv)],
            ))),
    );
    let built = dashboard.build(data).unwrap();
    let run = built
        .dispatch(TriggerEvent::press("export_btn"))
        .await
        .unwrap();
    assert_eq!(run.outputs.len(), 2);
    assert!(run.outputs.contains_key("download_dataframe_first"));
    assert!(run.outputs.contains_key("download_dataframe_second"));
}

// ============================================================================
// Container toggles
// ============================================================================

#[tokio::test]
async fn test_toggle_containers_writes_collapse_state() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Container(
                Container::new("details", "Details").collapsible(false),
            ))
            .with_component(Model::Container(
                Container::new("summary", "Summary").collapsible(true),
            ))
            .with_component(Model::Button(Button::new("toggle_btn", "Toggle").with_actions(
                vec![Action::toggle_containers(
                    "toggle",
                    vec![ModelId::from("details")],
                    vec![ModelId::from("summary")],
                )],
            ))),
    );
    let built = dashboard.build(data).unwrap();
    assert_eq!(
        built.runtime.with_ui(|ui| ui.collapsed(&ModelId::from("details"))),
        Some(false)
    );

    let run = built
        .dispatch(TriggerEvent::press("toggle_btn"))
        .await
        .unwrap();
    assert!(run.succeeded());
    built.runtime.with_ui(|ui| {
        assert_eq!(ui.collapsed(&ModelId::from("details")), Some(true));
        assert_eq!(ui.collapsed(&ModelId::from("summary")), Some(false));
    });
}

#[test]
fn test_toggle_overlapping_sets_rejected() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Container(
                Container::new("details", "Details").collapsible(false),
            ))
            .with_component(Model::Button(Button::new("toggle_btn", "Toggle").with_actions(
                vec![Action::toggle_containers(
                    "toggle",
                    vec![ModelId::from("details")],
                    vec![ModelId::from("details")],
                )],
            ))),
    );
    let err = dashboard.build(data).unwrap_err();
    assert!(matches!(err, Error::InvalidToggleTargets(_)));
}

#[test]
fn test_toggle_with_no_targets_rejected() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home").with_component(Model::Button(
            Button::new("toggle_btn", "Toggle").with_actions(vec![Action::toggle_containers(
                "toggle",
                Vec::new(),
                Vec::new(),
            )]),
        )),
    );
    let err = dashboard.build(data).unwrap_err();
    assert!(matches!(err, Error::InvalidToggleTargets(_)));
}

// ============================================================================
// Update figures and chain orchestration
// ============================================================================

#[tokio::test]
async fn test_update_figures_defaults_to_all_figures() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("first", scatter_figure("iris"))))
            .with_component(Model::Graph(Graph::new("second", scatter_figure("iris"))))
            .with_component(Model::Button(Button::new("refresh", "Refresh").with_actions(
                vec![Action::update_figures("update", Vec::new())],
            )))
            .with_control(Model::Filter(Filter::new("species_filter", "species"))),
    );
    let built = dashboard.build(data).unwrap();

    built
        .dispatch(TriggerEvent::control_change(
            "species_filter_selector",
            ControlValue::Many(vec![Value::from("setosa")]),
        ))
        .await
        .unwrap();
    let run = built.dispatch(TriggerEvent::press("refresh")).await.unwrap();
    assert!(run.succeeded());
    assert_eq!(run.outputs.len(), 2);
    // The refresh re-applies the active filter state to every figure.
    built.runtime.with_ui(|ui| {
        for id in ["first", "second"] {
            assert_eq!(ui.figure(&ModelId::from(id)).unwrap().data.row_count(), 50);
        }
    });
}

#[tokio::test]
async fn test_chain_runs_actions_sequentially_and_merges_outputs() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_component(Model::Container(
                Container::new("details", "Details").collapsible(true),
            ))
            .with_component(Model::Button(Button::new("both_btn", "Do both").with_actions(
                vec![
                    Action::toggle_containers("open", Vec::new(), vec![ModelId::from("details")]),
                    Action::update_figures("update", Vec::new()),
                ],
            ))),
    );
    let built = dashboard.build(data).unwrap();

    let run = built.dispatch(TriggerEvent::press("both_btn")).await.unwrap();
    assert!(run.succeeded());
    assert_eq!(run.tasks.len(), 2);
    assert_eq!(run.tasks[0].name, "toggle_containers");
    assert_eq!(run.tasks[1].name, "update_figures");
    assert!(run.outputs.contains_key("details"));
    assert!(run.outputs.contains_key("scatter"));
}

#[tokio::test]
async fn test_independent_chains_dispatch_concurrently() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_component(Model::Button(Button::new("refresh", "Refresh").with_actions(
                vec![Action::update_figures("update", Vec::new())],
            )))
            .with_control(Model::Filter(Filter::new("species_filter", "species"))),
    );
    let built = dashboard.build(data).unwrap();

    let filter_run = built.runtime.spawn_dispatch(TriggerEvent::control_change(
        "species_filter_selector",
        ControlValue::Many(vec![Value::from("setosa")]),
    ));
    let refresh_run = built.runtime.spawn_dispatch(TriggerEvent::press("refresh"));

    let (filter_run, refresh_run) = tokio::join!(filter_run, refresh_run);
    assert!(filter_run.unwrap().unwrap().succeeded());
    assert!(refresh_run.unwrap().unwrap().succeeded());

    // The batched form awaits every chain and preserves event order.
    let runs = built
        .runtime
        .dispatch_all(vec![
            TriggerEvent::control_change(
                "species_filter_selector",
                ControlValue::Many(vec![Value::from("virginica")]),
            ),
            TriggerEvent::press("refresh"),
        ])
        .await;
    assert!(runs.iter().all(|run| run.as_ref().unwrap().succeeded()));
}

#[tokio::test]
async fn test_failing_action_skips_rest_of_chain() {
    // A graph whose data source disappears at runtime: registered under a
    // loader that always fails.
    let mut data = DataManager::new();
    data.register_static("iris", iris()).unwrap();
    data.register_loader(
        "broken",
        Arc::new(
            |_args: &dashwire::LoadArguments| -> dashwire::data_manager::LoaderResult {
                Err("connection refused".into())
            },
        ),
    )
    .unwrap();

    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("bad", scatter_figure("broken"))))
            .with_component(Model::Container(
                Container::new("details", "Details").collapsible(true),
            ))
            .with_component(Model::Button(Button::new("btn", "Run").with_actions(vec![
                Action::update_figures("update", vec![ModelId::from("bad")]),
                Action::toggle_containers("open", Vec::new(), vec![ModelId::from("details")]),
            ]))),
    );
    let built = dashboard.build(data).unwrap();

    let run = built.dispatch(TriggerEvent::press("btn")).await.unwrap();
    assert!(!run.succeeded());
    assert!(run.error.is_some());
    assert_eq!(run.tasks[0].state, dashwire::TaskState::Failed);
    assert_eq!(run.tasks[1].state, dashwire::TaskState::Skipped);
    // The skipped toggle never wrote its output.
    assert_eq!(
        built.runtime.with_ui(|ui| ui.collapsed(&ModelId::from("details"))),
        Some(true)
    );
}

// ============================================================================
// Custom actions
// ============================================================================

/// A user-defined action: summarizes a figure's currently-filtered row
/// count into a card, reusing the framework's own apply pipeline.
struct SummarizeRows {
    source: ModelId,
    card: ModelId,
}

impl dashwire::CustomAction for SummarizeRows {
    fn name(&self) -> &str {
        "summarize_rows"
    }

    fn outputs(
        &self,
        _action_id: &ModelId,
        _models: &dashwire::ModelManager,
    ) -> dashwire::Result<std::collections::BTreeMap<String, dashwire::actions::OutputBinding>> {
        Ok(std::collections::BTreeMap::from([(
            "summary".to_string(),
            dashwire::actions::OutputBinding {
                component: self.card.clone(),
                property: "figure".to_string(),
            },
        )]))
    }

    fn compute(
        &self,
        models: &dashwire::ModelManager,
        data: &DataManager,
        controls: &dashwire::ControlsState,
    ) -> dashwire::Result<dashwire::ActionOutputs> {
        let frame = dashwire::actions::apply::load_filtered_frame(
            models,
            data,
            controls,
            &self.source,
        )?;
        let summary = dashwire::Figure::new(
            "summary",
            frame.clone(),
            serde_json::json!({"rows": frame.row_count()}),
        );
        Ok(std::collections::BTreeMap::from([(
            "summary".to_string(),
            dashwire::OutputValue::Figure(summary),
        )]))
    }
}

#[tokio::test]
async fn test_custom_action_runs_through_the_chain() {
    let data = static_iris_data();
    let custom = Action::custom(
        "summarize",
        Arc::new(SummarizeRows {
            source: ModelId::from("scatter"),
            card: ModelId::from("summary_card"),
        }),
    );
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_component(Model::Card(dashwire::Card::new("summary_card", "")))
            .with_component(Model::Button(
                Button::new("summarize_btn", "Summarize").with_actions(vec![custom]),
            ))
            .with_control(Model::Filter(Filter::new("species_filter", "species"))),
    );
    let built = dashboard.build(data).unwrap();

    built
        .dispatch(TriggerEvent::control_change(
            "species_filter_selector",
            ControlValue::Many(vec![Value::from("setosa")]),
        ))
        .await
        .unwrap();
    let run = built
        .dispatch(TriggerEvent::press("summarize_btn"))
        .await
        .unwrap();
    assert!(run.succeeded());
    assert_eq!(run.tasks[0].name, "summarize_rows");

    let summary = built
        .runtime
        .with_ui(|ui| ui.figure(&ModelId::from("summary_card")).cloned())
        .unwrap();
    assert_eq!(summary.config["rows"], serde_json::json!(50));
}

// ============================================================================
// Wiring introspection
// ============================================================================

#[test]
fn test_filter_wiring_reads_all_page_controls() {
    let data = static_iris_data();
    let dashboard = Dashboard::new("Demo").with_page(
        Page::new("home", "Home")
            .with_component(Model::Graph(Graph::new("scatter", scatter_figure("iris"))))
            .with_control(Model::Filter(Filter::new("species_filter", "species")))
            .with_control(Model::Parameter(
                Parameter::new(
                    "axis_param",
                    &["scatter.x"],
                    Selector::radio_items("axis_selector")
                        .with_options(vec![Value::from("sepal_length")]),
                )
                .unwrap(),
            )),
    );
    let built = dashboard.build(data).unwrap();

    let wiring = built
        .wiring_for(&ModelId::from("filter_action_species_filter"))
        .unwrap();
    assert_eq!(wiring.inputs.filters.len(), 1);
    assert_eq!(wiring.inputs.parameters.len(), 1);
    assert!(wiring.inputs.filter_interaction.is_empty());
    let binding = wiring.outputs.get("scatter").unwrap();
    assert_eq!(binding.component, ModelId::from("scatter"));
    assert_eq!(binding.property, "figure");
}
