// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Declarative dashboard models
//!
//! Every dashboard unit (page, container, figure component, button,
//! control, selector) is a plain struct wrapped in the [`Model`] tagged
//! union. Models form a tree: `Dashboard → Page → Container/components`,
//! with controls hanging off pages and containers. Actions reference other
//! models by [`ModelId`], never by ownership, so the tree stays acyclic and
//! lookups go through the model manager.
//!
//! Construction is pure data assembly; registration into the
//! [`crate::model_manager::ModelManager`] happens in the dashboard build
//! pass, which detaches children from their parents and records the
//! parent/child links by ID.

pub mod controls;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actions::{Action, ActionsChain, Trigger};
use crate::captured::CapturedCallable;
use crate::error::{Error, Result};

pub use controls::{
    ColumnKind, ControlValue, Filter, FilterOperator, Parameter, Selector, SelectorKind,
    SelectorUpdate,
};

// ============================================================================
// Identifiers and references
// ============================================================================

/// Unique identifier of a model within one dashboard process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(String);

impl ModelId {
    /// Generate a fresh random id for models the user left unnamed.
    #[must_use]
    pub fn generated() -> Self {
        ModelId(uuid::Uuid::new_v4().simple().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        ModelId(value.to_string())
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        ModelId(value)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed `<model_id>.<argument_path>` reference.
///
/// Parsed once when the owning control is constructed; the action layer
/// never re-parses target strings at invocation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    model: ModelId,
    path: Vec<String>,
}

impl TargetRef {
    /// Parse a dotted target string.
    pub fn parse(target: &str) -> Result<Self> {
        let Some((model, rest)) = target.split_once('.') else {
            return Err(Error::InvalidTarget {
                target: target.to_string(),
                reason: "targets must be supplied in the form <target_component>.<target_argument>"
                    .to_string(),
            });
        };
        let path: Vec<String> = rest.split('.').map(str::to_string).collect();
        if path.first().map(String::as_str) == Some("figure") {
            return Err(Error::InvalidTarget {
                target: target.to_string(),
                reason: "arguments of the captured figure function are targeted directly, not via '.figure.'"
                    .to_string(),
            });
        }
        if path.first().map(String::as_str) == Some("data_frame") && path.len() != 2 {
            return Err(Error::InvalidTarget {
                target: target.to_string(),
                reason: "'data_frame' targets must be supplied in the form <target_component>.data_frame.<loader_argument>"
                    .to_string(),
            });
        }
        Ok(TargetRef {
            model: ModelId::from(model),
            path,
        })
    }

    /// Reference a whole model with no argument path. Used internally when a
    /// dynamic-data parameter pulls a filter into its target set.
    #[must_use]
    pub fn whole(model: ModelId) -> Self {
        TargetRef {
            model,
            path: Vec::new(),
        }
    }

    /// The targeted model.
    #[must_use]
    pub fn model(&self) -> &ModelId {
        &self.model
    }

    /// The argument path segments (empty for whole-model references).
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// True when the reference rebinds a loader argument
    /// (`<model>.data_frame.<arg>`).
    #[must_use]
    pub fn is_data_frame(&self) -> bool {
        self.path.first().map(String::as_str) == Some("data_frame")
    }

    /// The loader argument name for a `data_frame` reference.
    #[must_use]
    pub fn data_frame_argument(&self) -> Option<&str> {
        if self.is_data_frame() {
            self.path.get(1).map(String::as_str)
        } else {
            None
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.model)
        } else {
            write!(f, "{}.{}", self.model, self.path.join("."))
        }
    }
}

// ============================================================================
// Model kinds
// ============================================================================

/// Discriminator tag for [`Model`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Top-level page.
    Page,
    /// Collapsible grouping of components.
    Container,
    /// Plotted chart.
    Graph,
    /// Data grid.
    AgGrid,
    /// Static text card.
    Card,
    /// User-captured custom figure.
    FigureComponent,
    /// Clickable button.
    Button,
    /// Data filter control.
    Filter,
    /// Figure-argument parameter control.
    Parameter,
    /// Input widget backing a control.
    Selector,
}

/// Filter for model traversal queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    /// Match every model.
    Any,
    /// Match one concrete kind.
    Kind(ModelKind),
    /// Match every figure-producing model (Graph, AgGrid, custom figure).
    Figures,
}

impl KindFilter {
    /// Whether a model of `kind` passes this filter.
    #[must_use]
    pub fn matches(&self, kind: ModelKind) -> bool {
        match self {
            KindFilter::Any => true,
            KindFilter::Kind(wanted) => *wanted == kind,
            KindFilter::Figures => matches!(
                kind,
                ModelKind::Graph | ModelKind::AgGrid | ModelKind::FigureComponent
            ),
        }
    }
}

// ============================================================================
// Composite models
// ============================================================================

/// A dashboard page: components plus page-scoped controls.
#[derive(Debug)]
pub struct Page {
    /// Unique id.
    pub id: ModelId,
    /// Page title shown in navigation.
    pub title: String,
    /// Child components, in layout order. Drained at registration.
    pub components: Vec<Model>,
    /// Page-scoped controls. Drained at registration.
    pub controls: Vec<Model>,
    component_ids: Vec<ModelId>,
    control_ids: Vec<ModelId>,
}

impl Page {
    /// Create a page.
    pub fn new(id: impl Into<ModelId>, title: impl Into<String>) -> Self {
        Page {
            id: id.into(),
            title: title.into(),
            components: Vec::new(),
            controls: Vec::new(),
            component_ids: Vec::new(),
            control_ids: Vec::new(),
        }
    }

    /// Append a component.
    #[must_use]
    pub fn with_component(mut self, component: Model) -> Self {
        self.components.push(component);
        self
    }

    /// Append a control.
    #[must_use]
    pub fn with_control(mut self, control: Model) -> Self {
        self.controls.push(control);
        self
    }

    /// Child component ids, recorded at registration.
    #[must_use]
    pub fn component_ids(&self) -> &[ModelId] {
        &self.component_ids
    }

    /// Control ids, recorded at registration.
    #[must_use]
    pub fn control_ids(&self) -> &[ModelId] {
        &self.control_ids
    }
}

/// A collapsible grouping of components within a page.
#[derive(Debug)]
pub struct Container {
    /// Unique id.
    pub id: ModelId,
    /// Heading shown above the container.
    pub title: String,
    /// Child components. Drained at registration.
    pub components: Vec<Model>,
    /// Container-scoped controls. Drained at registration.
    pub controls: Vec<Model>,
    /// Initial collapse state; `None` means the container is not collapsible.
    pub collapsed: Option<bool>,
    component_ids: Vec<ModelId>,
    control_ids: Vec<ModelId>,
}

impl Container {
    /// Create a non-collapsible container.
    pub fn new(id: impl Into<ModelId>, title: impl Into<String>) -> Self {
        Container {
            id: id.into(),
            title: title.into(),
            components: Vec::new(),
            controls: Vec::new(),
            collapsed: None,
            component_ids: Vec::new(),
            control_ids: Vec::new(),
        }
    }

    /// Make the container collapsible with the given initial state.
    #[must_use]
    pub fn collapsible(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    /// Append a component.
    #[must_use]
    pub fn with_component(mut self, component: Model) -> Self {
        self.components.push(component);
        self
    }

    /// Append a control scoped to this container.
    #[must_use]
    pub fn with_control(mut self, control: Model) -> Self {
        self.controls.push(control);
        self
    }

    /// Child component ids, recorded at registration.
    #[must_use]
    pub fn component_ids(&self) -> &[ModelId] {
        &self.component_ids
    }

    /// Control ids, recorded at registration.
    #[must_use]
    pub fn control_ids(&self) -> &[ModelId] {
        &self.control_ids
    }
}

// ============================================================================
// Leaf components
// ============================================================================

/// A plotted chart backed by a captured figure function.
#[derive(Debug)]
pub struct Graph {
    /// Unique id.
    pub id: ModelId,
    /// The captured figure call to re-invoke on every update.
    pub figure: CapturedCallable,
    /// Columns exposed through the chart's custom-data channel, consumed by
    /// filter-interaction actions on other figures.
    pub custom_data: Vec<String>,
    /// Action chains fired by this chart (trigger: `click_data`).
    pub actions: Vec<ActionsChain>,
}

impl Graph {
    /// Create a graph component.
    pub fn new(id: impl Into<ModelId>, figure: CapturedCallable) -> Self {
        Graph {
            id: id.into(),
            figure,
            custom_data: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Expose columns through the custom-data channel.
    #[must_use]
    pub fn with_custom_data(mut self, columns: Vec<String>) -> Self {
        self.custom_data = columns;
        self
    }

    /// Attach actions fired when a point on this chart is clicked.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        let trigger = Trigger::new(self.id.clone(), "click_data");
        self.actions.push(ActionsChain::new(trigger, actions));
        self
    }
}

/// A data grid backed by a captured figure function.
#[derive(Debug)]
pub struct AgGrid {
    /// Unique id.
    pub id: ModelId,
    /// The captured grid call to re-invoke on every update.
    pub figure: CapturedCallable,
    /// Action chains fired by this grid.
    pub actions: Vec<ActionsChain>,
}

impl AgGrid {
    /// Create a grid component.
    pub fn new(id: impl Into<ModelId>, figure: CapturedCallable) -> Self {
        AgGrid {
            id: id.into(),
            figure,
            actions: Vec::new(),
        }
    }
}

/// A user-captured custom figure component.
#[derive(Debug)]
pub struct FigureComponent {
    /// Unique id.
    pub id: ModelId,
    /// The captured call to re-invoke on every update.
    pub figure: CapturedCallable,
}

impl FigureComponent {
    /// Create a custom figure component.
    pub fn new(id: impl Into<ModelId>, figure: CapturedCallable) -> Self {
        FigureComponent {
            id: id.into(),
            figure,
        }
    }
}

/// A static text card. Not reactive to controls.
#[derive(Debug)]
pub struct Card {
    /// Unique id.
    pub id: ModelId,
    /// Markdown body.
    pub text: String,
}

impl Card {
    /// Create a card.
    pub fn new(id: impl Into<ModelId>, text: impl Into<String>) -> Self {
        Card {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A clickable button carrying action chains (trigger: `n_clicks`).
#[derive(Debug)]
pub struct Button {
    /// Unique id.
    pub id: ModelId,
    /// Button label.
    pub text: String,
    /// Action chains fired on click.
    pub actions: Vec<ActionsChain>,
}

impl Button {
    /// Create a button.
    pub fn new(id: impl Into<ModelId>, text: impl Into<String>) -> Self {
        Button {
            id: id.into(),
            text: text.into(),
            actions: Vec::new(),
        }
    }

    /// Attach actions fired when the button is clicked.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        let trigger = Trigger::new(self.id.clone(), "n_clicks");
        self.actions.push(ActionsChain::new(trigger, actions));
        self
    }
}

// ============================================================================
// The tagged union
// ============================================================================

/// Any declarative dashboard unit.
#[derive(Debug)]
pub enum Model {
    /// See [`Page`].
    Page(Page),
    /// See [`Container`].
    Container(Container),
    /// See [`Graph`].
    Graph(Graph),
    /// See [`AgGrid`].
    AgGrid(AgGrid),
    /// See [`Card`].
    Card(Card),
    /// See [`FigureComponent`].
    FigureComponent(FigureComponent),
    /// See [`Button`].
    Button(Button),
    /// See [`controls::Filter`].
    Filter(Filter),
    /// See [`controls::Parameter`].
    Parameter(Parameter),
    /// See [`controls::Selector`].
    Selector(Selector),
}

impl Model {
    /// The model's unique id.
    #[must_use]
    pub fn id(&self) -> &ModelId {
        match self {
            Model::Page(m) => &m.id,
            Model::Container(m) => &m.id,
            Model::Graph(m) => &m.id,
            Model::AgGrid(m) => &m.id,
            Model::Card(m) => &m.id,
            Model::FigureComponent(m) => &m.id,
            Model::Button(m) => &m.id,
            Model::Filter(m) => &m.id,
            Model::Parameter(m) => &m.id,
            Model::Selector(m) => &m.id,
        }
    }

    /// The model's discriminator tag.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Page(_) => ModelKind::Page,
            Model::Container(_) => ModelKind::Container,
            Model::Graph(_) => ModelKind::Graph,
            Model::AgGrid(_) => ModelKind::AgGrid,
            Model::Card(_) => ModelKind::Card,
            Model::FigureComponent(_) => ModelKind::FigureComponent,
            Model::Button(_) => ModelKind::Button,
            Model::Filter(_) => ModelKind::Filter,
            Model::Parameter(_) => ModelKind::Parameter,
            Model::Selector(_) => ModelKind::Selector,
        }
    }

    /// True for figure-producing models.
    #[must_use]
    pub fn is_figure(&self) -> bool {
        KindFilter::Figures.matches(self.kind())
    }

    /// The captured figure call for figure-producing models.
    #[must_use]
    pub fn captured_figure(&self) -> Option<&CapturedCallable> {
        match self {
            Model::Graph(m) => Some(&m.figure),
            Model::AgGrid(m) => Some(&m.figure),
            Model::FigureComponent(m) => Some(&m.figure),
            _ => None,
        }
    }

    /// The reactive property the action layer writes figure updates to, or
    /// `selector` for control models rebuilt by `update_figures`.
    #[must_use]
    pub fn output_property(&self) -> &'static str {
        match self {
            Model::Filter(_) | Model::Parameter(_) => "selector",
            Model::Container(_) => "collapsed",
            _ => "figure",
        }
    }

    /// The action chains attached to this model, if it can carry any.
    #[must_use]
    pub fn chains(&self) -> &[ActionsChain] {
        match self {
            Model::Graph(m) => &m.actions,
            Model::AgGrid(m) => &m.actions,
            Model::Button(m) => &m.actions,
            Model::Selector(m) => &m.actions,
            _ => &[],
        }
    }

    /// Mutable access to the model's chains during the build phase.
    pub(crate) fn chains_mut(&mut self) -> Option<&mut Vec<ActionsChain>> {
        match self {
            Model::Graph(m) => Some(&mut m.actions),
            Model::AgGrid(m) => Some(&mut m.actions),
            Model::Button(m) => Some(&mut m.actions),
            Model::Selector(m) => Some(&mut m.actions),
            _ => None,
        }
    }

    /// Child ids recorded at registration, in declaration order
    /// (components before controls).
    #[must_use]
    pub fn child_ids(&self) -> Vec<ModelId> {
        match self {
            Model::Page(m) => m
                .component_ids
                .iter()
                .chain(m.control_ids.iter())
                .cloned()
                .collect(),
            Model::Container(m) => m
                .component_ids
                .iter()
                .chain(m.control_ids.iter())
                .cloned()
                .collect(),
            Model::Filter(m) => m.selector_id().cloned().into_iter().collect(),
            Model::Parameter(m) => m.selector_id().cloned().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Drain nested child models for registration, recording their ids on
    /// the parent. Called exactly once per model by the model manager.
    pub(crate) fn take_children(&mut self) -> Vec<Model> {
        match self {
            Model::Page(m) => {
                let components = std::mem::take(&mut m.components);
                let controls = std::mem::take(&mut m.controls);
                m.component_ids = components.iter().map(|c| c.id().clone()).collect();
                m.control_ids = controls.iter().map(|c| c.id().clone()).collect();
                components.into_iter().chain(controls).collect()
            }
            Model::Container(m) => {
                let components = std::mem::take(&mut m.components);
                let controls = std::mem::take(&mut m.controls);
                m.component_ids = components.iter().map(|c| c.id().clone()).collect();
                m.control_ids = controls.iter().map(|c| c.id().clone()).collect();
                components.into_iter().chain(controls).collect()
            }
            Model::Filter(m) => m.take_selector().map(Model::Selector).into_iter().collect(),
            Model::Parameter(m) => m.take_selector().map(Model::Selector).into_iter().collect(),
            _ => Vec::new(),
        }
    }
}
