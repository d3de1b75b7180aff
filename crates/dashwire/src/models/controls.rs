// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Controls: filters, parameters and their selectors
//!
//! A control binds a selector's current value to its targets: a [`Filter`]
//! derives a predicate applied to each target figure's source data, a
//! [`Parameter`] rebinds keyword arguments of each target's captured figure
//! call. Most of the interesting work happens in `pre_build`, which runs
//! once per dashboard build: targets are resolved, column types inferred,
//! default selectors chosen, and the control's action chain attached to its
//! selector.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::actions::{Action, ActionsChain, Trigger};
use crate::data_manager::{DataManager, DataSourceName, LoadArguments};
use crate::dataframe::{Column, DType, Value};
use crate::error::{Error, Result};
use crate::model_manager::ModelManager;
use crate::models::{KindFilter, Model, ModelId, ModelKind, TargetRef};

// ============================================================================
// Control values
// ============================================================================

/// A selector's current value: scalar for single-select widgets, a list for
/// multi-select and range widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlValue {
    /// Single-select value.
    Single(Value),
    /// Multi-select or range value.
    Many(Vec<Value>),
}

impl ControlValue {
    /// The value as a list, wrapping scalars in a one-element vector.
    #[must_use]
    pub fn as_list(&self) -> Vec<Value> {
        match self {
            ControlValue::Single(v) => vec![v.clone()],
            ControlValue::Many(vs) => vs.clone(),
        }
    }
}

// ============================================================================
// Selectors
// ============================================================================

/// The concrete widget kind backing a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorKind {
    /// Dropdown list; multi-select by default.
    Dropdown {
        /// Whether multiple options can be selected.
        multi: bool,
    },
    /// Checkbox list (always multi-select).
    Checklist,
    /// Radio buttons (always single-select).
    RadioItems,
    /// Single-value numeric slider.
    Slider,
    /// Two-handle numeric range slider.
    RangeSlider,
    /// Calendar picker; a range picker when `range` is set.
    DatePicker {
        /// Whether the picker selects a date range.
        range: bool,
    },
}

impl SelectorKind {
    /// Human-readable kind name for error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SelectorKind::Dropdown { .. } => "Dropdown",
            SelectorKind::Checklist => "Checklist",
            SelectorKind::RadioItems => "RadioItems",
            SelectorKind::Slider => "Slider",
            SelectorKind::RangeSlider => "RangeSlider",
            SelectorKind::DatePicker { .. } => "DatePicker",
        }
    }

    /// The column class this widget naturally selects over.
    #[must_use]
    pub fn column_class(&self) -> ColumnKind {
        match self {
            SelectorKind::Dropdown { .. } | SelectorKind::Checklist | SelectorKind::RadioItems => {
                ColumnKind::Categorical
            }
            SelectorKind::Slider | SelectorKind::RangeSlider => ColumnKind::Numerical,
            SelectorKind::DatePicker { .. } => ColumnKind::Temporal,
        }
    }

    /// Whether the widget yields a list value.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        match self {
            SelectorKind::Dropdown { multi } => *multi,
            SelectorKind::Checklist | SelectorKind::RangeSlider => true,
            SelectorKind::DatePicker { range } => *range,
            SelectorKind::RadioItems | SelectorKind::Slider => false,
        }
    }

    /// Whether the widget selects an inclusive range (two-ended).
    #[must_use]
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            SelectorKind::RangeSlider | SelectorKind::DatePicker { range: true }
        )
    }

    /// Categorical widgets fit any column; numerical and temporal widgets
    /// only fit their own column class.
    #[must_use]
    pub fn fits_column(&self, column: ColumnKind) -> bool {
        match self.column_class() {
            ColumnKind::Categorical => true,
            class => class == column,
        }
    }
}

/// A selector: the input widget backing a control.
#[derive(Debug)]
pub struct Selector {
    /// Unique id.
    pub id: ModelId,
    /// Widget kind.
    pub kind: SelectorKind,
    /// Title shown above the widget; defaults from the owning control.
    pub title: Option<String>,
    /// Options for categorical widgets.
    pub options: Vec<Value>,
    /// Lower bound for numerical/temporal widgets.
    pub min: Option<Value>,
    /// Upper bound for numerical/temporal widgets.
    pub max: Option<Value>,
    /// Current (or initial) value.
    pub value: Option<ControlValue>,
    /// Action chains fired when the value changes.
    pub actions: Vec<ActionsChain>,
}

impl Selector {
    /// Create a selector of the given kind.
    pub fn new(id: impl Into<ModelId>, kind: SelectorKind) -> Self {
        Selector {
            id: id.into(),
            kind,
            title: None,
            options: Vec::new(),
            min: None,
            max: None,
            value: None,
            actions: Vec::new(),
        }
    }

    /// Multi-select dropdown.
    pub fn dropdown(id: impl Into<ModelId>) -> Self {
        Self::new(id, SelectorKind::Dropdown { multi: true })
    }

    /// Single-select dropdown.
    pub fn dropdown_single(id: impl Into<ModelId>) -> Self {
        Self::new(id, SelectorKind::Dropdown { multi: false })
    }

    /// Checkbox list.
    pub fn checklist(id: impl Into<ModelId>) -> Self {
        Self::new(id, SelectorKind::Checklist)
    }

    /// Radio buttons.
    pub fn radio_items(id: impl Into<ModelId>) -> Self {
        Self::new(id, SelectorKind::RadioItems)
    }

    /// Single-value slider.
    pub fn slider(id: impl Into<ModelId>) -> Self {
        Self::new(id, SelectorKind::Slider)
    }

    /// Range slider.
    pub fn range_slider(id: impl Into<ModelId>) -> Self {
        Self::new(id, SelectorKind::RangeSlider)
    }

    /// Date range picker.
    pub fn date_picker(id: impl Into<ModelId>) -> Self {
        Self::new(id, SelectorKind::DatePicker { range: true })
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the options.
    #[must_use]
    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = options;
        self
    }

    /// Set the bounds.
    #[must_use]
    pub fn with_bounds(mut self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self
    }

    /// Set the initial value.
    #[must_use]
    pub fn with_value(mut self, value: ControlValue) -> Self {
        self.value = Some(value);
        self
    }

    /// The reactive property the action layer reads from this widget.
    #[must_use]
    pub fn input_property(&self) -> &'static str {
        "value"
    }

    /// The value this selector starts with when the user set none:
    /// all options for multi-select, the first option for single-select,
    /// the full range for range widgets, the minimum for a plain slider.
    #[must_use]
    pub fn derived_default(&self) -> Option<ControlValue> {
        if let Some(value) = &self.value {
            return Some(value.clone());
        }
        match self.kind {
            SelectorKind::Dropdown { multi: true } | SelectorKind::Checklist => {
                Some(ControlValue::Many(self.options.clone()))
            }
            SelectorKind::Dropdown { multi: false } | SelectorKind::RadioItems => {
                self.options.first().cloned().map(ControlValue::Single)
            }
            SelectorKind::Slider => self.min.clone().map(ControlValue::Single),
            SelectorKind::RangeSlider | SelectorKind::DatePicker { range: true } => {
                match (&self.min, &self.max) {
                    (Some(min), Some(max)) => {
                        Some(ControlValue::Many(vec![min.clone(), max.clone()]))
                    }
                    _ => None,
                }
            }
            SelectorKind::DatePicker { range: false } => self.min.clone().map(ControlValue::Single),
        }
    }
}

/// A rebuilt selector configuration, produced when `update_figures`
/// refreshes a dynamic filter from newly loaded data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorUpdate {
    /// New options for categorical selectors.
    pub options: Vec<Value>,
    /// New lower bound for numerical/temporal selectors.
    pub min: Option<Value>,
    /// New upper bound for numerical/temporal selectors.
    pub max: Option<Value>,
}

// ============================================================================
// Column classification
// ============================================================================

/// The filter-relevant class of a column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Numbers.
    Numerical,
    /// Text and booleans.
    Categorical,
    /// Dates.
    Temporal,
}

impl ColumnKind {
    /// Classify a column data type.
    #[must_use]
    pub fn from_dtype(dtype: DType) -> Self {
        match dtype {
            DType::Number => ColumnKind::Numerical,
            DType::Date => ColumnKind::Temporal,
            DType::Text | DType::Bool => ColumnKind::Categorical,
        }
    }

    /// Name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Numerical => "numerical",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Temporal => "temporal",
        }
    }
}

/// How a filter's selector value turns into a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Row value equals any of the selected values.
    #[default]
    IsIn,
    /// Row value lies in the inclusive `[low, high]` range.
    Between,
}

// ============================================================================
// Filter
// ============================================================================

/// Filter the data supplied to `targets` on the owning page.
///
/// With no explicit targets the filter applies to every figure on its page
/// (or inside its container, for container-scoped filters) whose data frame
/// contains `column`.
#[derive(Debug)]
pub struct Filter {
    /// Unique id.
    pub id: ModelId,
    /// Column of the targeted data frames to filter.
    pub column: String,
    /// Target figure ids; resolved during `pre_build` when empty.
    pub targets: Vec<ModelId>,
    selector: Option<Selector>,
    selector_id: Option<ModelId>,
    column_kind: Option<ColumnKind>,
    operator: FilterOperator,
    dynamic: bool,
}

impl Filter {
    /// Create a filter over `column`.
    pub fn new(id: impl Into<ModelId>, column: impl Into<String>) -> Self {
        Filter {
            id: id.into(),
            column: column.into(),
            targets: Vec::new(),
            selector: None,
            selector_id: None,
            column_kind: None,
            operator: FilterOperator::default(),
            dynamic: false,
        }
    }

    /// Restrict the filter to explicit targets.
    #[must_use]
    pub fn with_targets(mut self, targets: Vec<ModelId>) -> Self {
        self.targets = targets;
        self
    }

    /// Use a specific selector instead of the type-derived default.
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector_id = Some(selector.id.clone());
        self.selector = Some(selector);
        self
    }

    /// The selector id, once the selector exists.
    #[must_use]
    pub fn selector_id(&self) -> Option<&ModelId> {
        self.selector_id.as_ref()
    }

    /// The column class inferred at `pre_build`.
    #[must_use]
    pub fn column_kind(&self) -> Option<ColumnKind> {
        self.column_kind
    }

    /// The predicate operator chosen at `pre_build`.
    #[must_use]
    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// Whether the filter is re-evaluated when dynamic data reloads.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub(crate) fn take_selector(&mut self) -> Option<Selector> {
        self.selector.take()
    }

    /// Resolve targets, infer the column type, configure the selector and
    /// attach the filter's action chain. Idempotent; failures are permanent
    /// configuration errors.
    pub fn pre_build(&mut self, models: &mut ModelManager, data: &DataManager) -> Result<()> {
        let page = models
            .page_of(&self.id)
            .ok_or_else(|| Error::Validation(format!(
                "Filter '{}' is not attached to any page.", self.id
            )))?;
        check_targets_on_page(self.targets.iter(), models, &page)?;

        // Scope of the implicit target search: the parent container for
        // container-scoped filters, otherwise the page.
        let root = models.parent(&self.id).cloned().unwrap_or_else(|| page.clone());
        let explicit = !self.targets.is_empty();
        let proposed: Vec<ModelId> = if explicit {
            self.targets.clone()
        } else {
            models
                .models_of(KindFilter::Figures, Some(&root))
                .map(|m| m.id().clone())
                .collect()
        };

        // Dynamic loaders see their default arguments here; actual loader
        // arguments only flow in through data_frame parameters at runtime.
        let requests: Vec<(DataSourceName, LoadArguments)> = proposed
            .iter()
            .map(|target| {
                let model = models.get(target)?;
                let captured = model.captured_figure().ok_or_else(|| Error::InvalidTarget {
                    target: target.to_string(),
                    reason: "filter targets must be figure components".to_string(),
                })?;
                Ok((captured.data_source().to_string(), LoadArguments::new()))
            })
            .collect::<Result<_>>()?;
        let frames = data.multi_load(&requests)?;

        let mut targeted: Vec<(ModelId, Column)> = Vec::new();
        for (target, frame) in proposed.iter().zip(&frames) {
            match frame.column(&self.column) {
                Some(column) => targeted.push((target.clone(), column.clone())),
                None if explicit => {
                    return Err(Error::ColumnNotFound {
                        column: self.column.clone(),
                        target: target.to_string(),
                    })
                }
                None => {}
            }
        }
        if targeted.is_empty() {
            return Err(Error::ColumnNotFoundAnywhere(self.column.clone()));
        }
        self.targets = targeted.iter().map(|(id, _)| id.clone()).collect();

        let column_kind = classify_columns(&self.column, targeted.iter().map(|(_, c)| c))?;
        self.column_kind = Some(column_kind);

        let mut selector = match self.selector_id.take() {
            Some(id) => models.take_selector(&id)?,
            None => default_selector(&self.id, column_kind),
        };
        if !selector.kind.fits_column(column_kind) {
            return Err(Error::IncompatibleSelector {
                selector: selector.kind.name().to_string(),
                column_type: column_kind.name().to_string(),
                column: self.column.clone(),
            });
        }

        // A filter is dynamic iff the user fixed neither options nor bounds
        // and at least one target reads from a dynamic data source.
        let user_fixed = !selector.options.is_empty() || selector.min.is_some() || selector.max.is_some();
        if !user_fixed {
            for target in &self.targets {
                let source = models
                    .get(target)?
                    .captured_figure()
                    .map(|captured| captured.data_source().to_string());
                if let Some(source) = source {
                    if data.is_dynamic(&source)? {
                        self.dynamic = true;
                        break;
                    }
                }
            }
        }

        configure_selector_from_columns(&mut selector, column_kind, targeted.iter().map(|(_, c)| c));
        if selector.title.is_none() {
            selector.title = Some(self.column.clone());
        }
        if selector.value.is_none() {
            selector.value = selector.derived_default();
        }

        self.operator = if selector.kind.is_range() {
            FilterOperator::Between
        } else {
            FilterOperator::IsIn
        };

        if selector.actions.is_empty() {
            let action = Action::filter(
                format!("filter_action_{}", self.id),
                self.column.clone(),
                self.targets.clone(),
                self.operator,
            );
            let trigger = Trigger::new(selector.id.clone(), selector.input_property());
            selector.actions.push(ActionsChain::new(trigger, vec![action]));
        }

        debug!(filter = %self.id, targets = ?self.targets, "filter pre-build resolved");
        self.selector_id = Some(selector.id.clone());
        models.put_selector(self.id.clone(), selector)?;
        Ok(())
    }
}

// ============================================================================
// Parameter
// ============================================================================

/// Alter the arguments supplied to any `targets` on the owning page.
#[derive(Debug)]
pub struct Parameter {
    /// Unique id.
    pub id: ModelId,
    /// `<component>.<argument_path>` references, parsed at construction.
    pub targets: Vec<TargetRef>,
    selector: Option<Selector>,
    selector_id: Option<ModelId>,
}

impl Parameter {
    /// Create a parameter from dotted target strings.
    pub fn new(
        id: impl Into<ModelId>,
        targets: &[&str],
        selector: Selector,
    ) -> Result<Self> {
        let targets = targets
            .iter()
            .map(|target| TargetRef::parse(target))
            .collect::<Result<Vec<_>>>()?;
        Ok(Parameter {
            id: id.into(),
            targets,
            selector_id: Some(selector.id.clone()),
            selector: Some(selector),
        })
    }

    /// The selector id.
    #[must_use]
    pub fn selector_id(&self) -> Option<&ModelId> {
        self.selector_id.as_ref()
    }

    pub(crate) fn take_selector(&mut self) -> Option<Selector> {
        self.selector.take()
    }

    /// Validate targets and the selector, extend dynamic-data targets with
    /// their linked dynamic filters, and attach the parameter's action
    /// chain. Idempotent; failures are permanent configuration errors.
    pub fn pre_build(&mut self, models: &mut ModelManager, _data: &DataManager) -> Result<()> {
        let page = models
            .page_of(&self.id)
            .ok_or_else(|| Error::Validation(format!(
                "Parameter '{}' is not attached to any page.", self.id
            )))?;
        check_targets_on_page(self.targets.iter().map(TargetRef::model), models, &page)?;

        self.check_duplicate_targets(models)?;

        let selector_id = self.selector_id.clone().ok_or_else(|| Error::Validation(format!(
            "Parameter '{}' has no selector.", self.id
        )))?;
        let mut selector = models.take_selector(&selector_id)?;
        match selector.kind.column_class() {
            ColumnKind::Numerical | ColumnKind::Temporal => {
                if selector.min.is_none() || selector.max.is_none() {
                    let kind_name = selector.kind.name().to_string();
                    models.put_selector(self.id.clone(), selector)?;
                    return Err(Error::MissingSelectorBounds { selector: kind_name });
                }
            }
            ColumnKind::Categorical => {
                if selector.options.is_empty() {
                    let kind_name = selector.kind.name().to_string();
                    models.put_selector(self.id.clone(), selector)?;
                    return Err(Error::MissingSelectorOptions { selector: kind_name });
                }
            }
        }

        if selector.title.is_none() {
            let title: Vec<&str> = self
                .targets
                .iter()
                .filter_map(|t| t.path().last().map(String::as_str))
                .collect();
            selector.title = Some(title.join(", "));
        }
        if selector.value.is_none() {
            selector.value = selector.derived_default();
        }

        // A parameter feeding loader arguments also refreshes every dynamic
        // filter linked to the same figure, plus that filter's own targets,
        // so filter options track the newly loaded data.
        let mut extra: Vec<TargetRef> = Vec::new();
        for target in &self.targets {
            if !target.is_data_frame() {
                continue;
            }
            for filter in models.models_of(KindFilter::Kind(ModelKind::Filter), Some(&page)) {
                let Model::Filter(filter) = filter else { continue };
                if !filter.is_dynamic() || !filter.targets.contains(target.model()) {
                    continue;
                }
                extra.push(TargetRef::whole(filter.id.clone()));
                extra.extend(filter.targets.iter().cloned().map(TargetRef::whole));
            }
        }
        for target in extra {
            if !self.targets.contains(&target) {
                self.targets.push(target);
            }
        }

        if selector.actions.is_empty() {
            let action = Action::parameter(
                format!("parameter_action_{}", self.id),
                self.targets.clone(),
            );
            let trigger = Trigger::new(selector.id.clone(), selector.input_property());
            selector.actions.push(ActionsChain::new(trigger, vec![action]));
        }

        self.selector_id = Some(selector.id.clone());
        models.put_selector(self.id.clone(), selector)?;
        Ok(())
    }

    fn check_duplicate_targets(&self, models: &ModelManager) -> Result<()> {
        let mut all: Vec<String> = self.targets.iter().map(ToString::to_string).collect();
        let mut components: Vec<&ModelId> = self.targets.iter().map(TargetRef::model).collect();
        for other in models.models_of(KindFilter::Kind(ModelKind::Parameter), None) {
            let Model::Parameter(other) = other else { continue };
            if other.id == self.id {
                continue;
            }
            all.extend(other.targets.iter().map(ToString::to_string));
            components.extend(other.targets.iter().map(TargetRef::model));
        }
        let mut duplicates: Vec<String> = all
            .iter()
            .filter(|target| all.iter().filter(|t| t == target).count() > 1)
            .cloned()
            .collect();
        duplicates.sort();
        duplicates.dedup();
        if !duplicates.is_empty() {
            return Err(Error::DuplicateParameterTargets(duplicates));
        }
        // Same component reached through different argument paths is legal
        // but easy to misconfigure; surface it.
        let mut seen = std::collections::HashSet::new();
        for component in components {
            if !seen.insert(component.clone()) {
                warn!(component = %component, "multiple parameters target the same component through different argument paths");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

fn check_targets_on_page<'a>(
    targets: impl Iterator<Item = &'a ModelId>,
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

fn classify_columns<'a>(
    column: &str,
    columns: impl Iterator<Item = &'a Column>,
) -> Result<ColumnKind> {
    let mut kind: Option<ColumnKind> = None;
    for col in columns {
        let this = col
            .dtype()
            .map(ColumnKind::from_dtype)
            .ok_or_else(|| Error::ColumnNotFoundAnywhere(column.to_string()))?;
        match kind {
            None => kind = Some(this),
            Some(existing) if existing != this => {
                return Err(Error::MixedColumnTypes(column.to_string()))
            }
            Some(_) => {}
        }
    }
    kind.ok_or_else(|| Error::ColumnNotFoundAnywhere(column.to_string()))
}

fn default_selector(filter_id: &ModelId, column_kind: ColumnKind) -> Selector {
    let id = ModelId::from(format!("{filter_id}_selector"));
    match column_kind {
        ColumnKind::Categorical => Selector::dropdown(id),
        ColumnKind::Numerical => Selector::range_slider(id),
        ColumnKind::Temporal => Selector::date_picker(id),
    }
}

/// Fill selector options or bounds from the targeted columns when the user
/// left them unset. Already-set values are never overwritten.
pub(crate) fn configure_selector_from_columns<'a>(
    selector: &mut Selector,
    column_kind: ColumnKind,
    columns: impl Iterator<Item = &'a Column>,
) {
    let columns: Vec<&Column> = columns.collect();
    match column_kind {
        ColumnKind::Categorical => {
            if selector.options.is_empty() {
                let mut options: Vec<Value> = Vec::new();
                for column in &columns {
                    for value in column.unique_sorted() {
                        if !options.contains(&value) {
                            options.push(value);
                        }
                    }
                }
                options.sort_by(|a, b| {
                    a.partial_cmp_same_type(b).unwrap_or(std::cmp::Ordering::Equal)
                });
                selector.options = options;
            }
        }
        ColumnKind::Numerical | ColumnKind::Temporal => {
            if selector.min.is_none() {
                selector.min = columns
                    .iter()
                    .filter_map(|c| c.min())
                    .min_by(|a, b| a.partial_cmp_same_type(b).unwrap_or(std::cmp::Ordering::Equal));
            }
            if selector.max.is_none() {
                selector.max = columns
                    .iter()
                    .filter_map(|c| c.max())
                    .max_by(|a, b| a.partial_cmp_same_type(b).unwrap_or(std::cmp::Ordering::Equal));
            }
        }
    }
}

/// Rebuild a dynamic filter's selector configuration from freshly loaded
/// target data. Used by `update_figures` and dynamic-data parameters.
pub(crate) fn rebuild_selector_update(
    filter: &Filter,
    selector_kind: SelectorKind,
    columns: &[&Column],
) -> Result<SelectorUpdate> {
    let column_kind = filter.column_kind().ok_or_else(|| Error::Validation(format!(
        "Filter '{}' has not been pre-built.", filter.id
    )))?;
    let mut scratch = Selector::new(ModelId::generated(), selector_kind);
    configure_selector_from_columns(&mut scratch, column_kind, columns.iter().copied());
    Ok(SelectorUpdate {
        options: scratch.options,
        min: scratch.min,
        max: scratch.max,
    })
}
