// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! # Dashwire
//!
//! Dashwire is a declarative dashboarding framework core: you describe
//! pages, figures and controls as plain data, and the framework turns that
//! description into a dependency-ordered set of reactive action wiring.
//! When a control changes, the action runtime resolves exactly which
//! figures must be recomputed, applies filter and parameter mutations to
//! the cached data, and regenerates the affected figures — nothing else.
//!
//! The crate is organized leaf to root:
//!
//! - [`dataframe`] — the minimal column-oriented table the action core
//!   filters and serializes
//! - [`data_manager`] — named data sources, dynamic loaders and the shared
//!   cache
//! - [`models`] / [`model_manager`] — the declarative model tree and its
//!   registry
//! - [`captured`] — captured figure calls: a factory plus bound arguments,
//!   re-invokable with substituted data
//! - [`actions`] — the action contract, built-in action kinds, the filter/
//!   parameter application algorithm and the callback wiring layer
//! - [`runtime`] — the explicit task queue that sequences a trigger's
//!   actions and fans independent chains out concurrently
//! - [`dashboard`] — the build pass tying everything together
//!
//! # Example
//!
//! ```rust,ignore
//! use dashwire::prelude::*;
//!
//! let mut data = DataManager::new();
//! data.register_static("iris", iris_frame)?;
//!
//! let dashboard = Dashboard::new("Demo").with_page(
//!     Page::new("home", "Home")
//!         .with_component(Model::Graph(Graph::new("scatter", scatter_figure)))
//!         .with_control(Model::Filter(Filter::new("species_filter", "species"))),
//! );
//! let built = dashboard.build(data)?;
//!
//! let run = built
//!     .dispatch(TriggerEvent::control_change(
//!         "species_filter_selector",
//!         ControlValue::Many(vec![Value::from("setosa")]),
//!     ))
//!     .await?;
//! assert!(run.succeeded());
//! ```

pub mod actions;
pub mod captured;
pub mod dashboard;
pub mod data_manager;
pub mod dataframe;
pub mod error;
pub mod model_manager;
pub mod models;
pub mod runtime;

pub use crate::actions::{
    Action, ActionKind, ActionOutputs, ActionWiring, ActionsChain, ClickData, ControlState,
    ControlsState, CustomAction, DownloadPayload, FileFormat, InteractionState, OutputValue,
    Trigger,
};
pub use crate::captured::{ArgumentMap, CapturedCallable, Figure};
pub use crate::dashboard::{BuiltDashboard, Dashboard};
pub use crate::data_manager::{
    CacheTimeout, DataCache, DataLoader, DataManager, InMemoryCache, LoadArguments, LoaderResult,
};
pub use crate::dataframe::{Column, DType, DataFrame, Value};
pub use crate::error::{Error, Result};
pub use crate::model_manager::ModelManager;
pub use crate::models::{
    AgGrid, Button, Card, Container, ControlValue, FigureComponent, Filter, Graph, KindFilter,
    Model, ModelId, ModelKind, Page, Parameter, Selector, SelectorKind, TargetRef,
};
pub use crate::runtime::{ActionRuntime, ChainRun, ChainState, TaskState, TriggerEvent, UiState};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::actions::{Action, ActionsChain, FileFormat, OutputValue, Trigger};
    pub use crate::captured::{CapturedCallable, Figure};
    pub use crate::dashboard::{BuiltDashboard, Dashboard};
    pub use crate::data_manager::{DataManager, InMemoryCache, LoadArguments};
    pub use crate::dataframe::{DataFrame, Value};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        Button, Card, Container, ControlValue, Filter, Graph, Model, ModelId, Page, Parameter,
        Selector,
    };
    pub use crate::runtime::{ChainRun, TriggerEvent};
}
