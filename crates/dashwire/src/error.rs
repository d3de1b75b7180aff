// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Error types for Dashwire
//!
//! This module provides actionable error messages for dashboard authors. All
//! errors include:
//! 1. What went wrong
//! 2. Why it's a problem
//! 3. How to fix it (when there is a concrete fix)
//!
//! The variants group into the four failure classes of the framework:
//!
//! - **Configuration errors** — raised during model construction or
//!   `pre_build`; fatal, the dashboard does not start.
//! - **Data errors** — raised at load/lookup time; fatal to the requesting
//!   component only.
//! - **Action runtime errors** — raised inside an action's compute function;
//!   surfaced for the affected outputs only.
//! - **Capability errors** — a requested feature is not compiled in;
//!   detected eagerly at `pre_build`, never mid-interaction.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Dashwire error type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ========================================================================
    // Configuration errors
    // ========================================================================
    /// A model was registered under an ID that already exists.
    #[error("Model '{0}' is already registered. Every model needs a unique id; set an explicit id on one of the two models.")]
    DuplicateModelId(String),

    /// A model lookup failed.
    #[error("Model '{0}' not found. Check the id for typos and make sure the model is part of the dashboard tree.")]
    ModelNotFound(String),

    /// A target reference could not be parsed or points at the wrong shape.
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget {
        /// The offending target string.
        target: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A control or action targets a model that does not live on its page.
    #[error("Target '{target}' does not exist on page '{page}'. Controls and actions can only target models on their own page.")]
    TargetNotOnPage {
        /// The target model id.
        target: String,
        /// The page the control/action lives on.
        page: String,
    },

    /// Two parameters target the same `<component>.<argument>` pair.
    #[error("Duplicate parameter targets {0:?} found. Each <component>.<argument> pair may be targeted by at most one Parameter.")]
    DuplicateParameterTargets(Vec<String>),

    /// A numerical or temporal selector inside a Parameter is missing bounds.
    #[error("{selector} requires the arguments 'min' and 'max' when used within Parameter.")]
    MissingSelectorBounds {
        /// Selector kind name.
        selector: String,
    },

    /// A categorical selector inside a Parameter has no options.
    #[error("{selector} requires the argument 'options' when used within Parameter.")]
    MissingSelectorOptions {
        /// Selector kind name.
        selector: String,
    },

    /// The chosen selector cannot filter the column's type.
    #[error("Chosen selector {selector} is not compatible with {column_type} column '{column}'.")]
    IncompatibleSelector {
        /// Selector kind name.
        selector: String,
        /// Inferred column type.
        column_type: String,
        /// The filtered column.
        column: String,
    },

    /// A filtered column has different types across its targets.
    #[error("Inconsistent types detected in column '{0}'. This column must have the same type for all targets.")]
    MixedColumnTypes(String),

    /// A filter column is missing from a targeted data frame.
    #[error("Selected column '{column}' not found in dataframe for '{target}'.")]
    ColumnNotFound {
        /// The missing column.
        column: String,
        /// The target whose data frame was inspected.
        target: String,
    },

    /// A filter column is missing from every targeted data frame.
    #[error("Selected column '{0}' not found in any targeted dataframe.")]
    ColumnNotFoundAnywhere(String),

    /// Collapse/expand targets are malformed.
    #[error("Invalid container toggle targets: {0}")]
    InvalidToggleTargets(String),

    /// Generic configuration validation failure.
    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // Data errors
    // ========================================================================
    /// A data source was registered under a name that already exists.
    #[error("Data source '{0}' is already registered. Data source names are unique across the data manager.")]
    DuplicateDataSource(String),

    /// A data source lookup failed.
    #[error("Data source '{0}' does not exist. Register it with register_static() or register_loader() before the dashboard is built.")]
    DataSourceNotFound(String),

    /// A component is already bound to a data source.
    #[error("Component '{component}' is already bound to data source '{existing}'.")]
    DuplicateBinding {
        /// The component id.
        component: String,
        /// The data source it is already bound to.
        existing: String,
    },

    /// A component-data lookup was made for an unbound component.
    #[error("Component '{0}' is not bound to any data source. Call bind_component() during the build phase.")]
    ComponentNotBound(String),

    /// A cache timeout was set on a static data source.
    #[error("Static data does not support a cache timeout; use a dynamic data source (a loader function) instead.")]
    StaticSourceTimeout,

    /// Load arguments were supplied for a static data source.
    #[error("Data source '{0}' is static and takes no load arguments.")]
    StaticLoadArguments(String),

    /// A dynamic data loader failed.
    #[error("Loader for data source '{name}' failed: {source}")]
    LoaderFailed {
        /// The data source name.
        name: String,
        /// The underlying loader error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ========================================================================
    // Action runtime errors
    // ========================================================================
    /// An action's compute function failed.
    #[error("Action '{action}' failed: {source}")]
    ActionExecution {
        /// The action id.
        action: String,
        /// The underlying error.
        source: Box<Error>,
    },

    /// A trigger event did not match any registered actions chain.
    #[error("No actions chain is registered for trigger '{component}.{property}'.")]
    TriggerNotFound {
        /// Trigger component id.
        component: String,
        /// Trigger component property.
        property: String,
    },

    // ========================================================================
    // Capability errors
    // ========================================================================
    /// The requested export format is not compiled into this build.
    #[error("Export format '{format}' is not available: {reason}")]
    ExportFormatUnavailable {
        /// The requested file format.
        format: String,
        /// What is missing and how to get it.
        reason: String,
    },

    /// The requested export format is not recognized at all.
    #[error("Unknown file format '{0}'. Known file formats: \"csv\", \"xlsx\".")]
    UnknownExportFormat(String),

    /// Serializing a data frame to its export format failed.
    #[error("Export serialization failed: {0}")]
    ExportSerialization(String),

    /// JSON (de)serialization failure inside the wiring layer.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an error raised inside an action's compute function so the
    /// failing action is identifiable in the surfaced message.
    #[must_use]
    pub fn in_action(self, action_id: impl Into<String>) -> Self {
        Error::ActionExecution {
            action: action_id.into(),
            source: Box::new(self),
        }
    }

    /// True for errors that belong to the configuration class, i.e. the
    /// dashboard should fail to start.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::DuplicateModelId(_)
                | Error::ModelNotFound(_)
                | Error::InvalidTarget { .. }
                | Error::TargetNotOnPage { .. }
                | Error::DuplicateParameterTargets(_)
                | Error::MissingSelectorBounds { .. }
                | Error::MissingSelectorOptions { .. }
                | Error::IncompatibleSelector { .. }
                | Error::MixedColumnTypes(_)
                | Error::ColumnNotFound { .. }
                | Error::ColumnNotFoundAnywhere(_)
                | Error::InvalidToggleTargets(_)
                | Error::Validation(_)
                | Error::ExportFormatUnavailable { .. }
                | Error::UnknownExportFormat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_model_id_message_is_actionable() {
        let err = Error::DuplicateModelId("scatter".to_string());
        let msg = err.to_string();
        assert!(msg.contains("scatter"));
        assert!(msg.contains("unique id"));
    }

    #[test]
    fn test_in_action_wraps_source() {
        let err = Error::DataSourceNotFound("iris".to_string()).in_action("export");
        let msg = err.to_string();
        assert!(msg.contains("export"));
        assert!(msg.contains("iris"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(Error::DuplicateModelId("a".into()).is_configuration());
        assert!(Error::UnknownExportFormat("pdf".into()).is_configuration());
        assert!(!Error::DataSourceNotFound("a".into()).is_configuration());
        assert!(!Error::ComponentNotBound("a".into()).is_configuration());
    }

    #[test]
    fn test_trigger_not_found_names_component_and_property() {
        let err = Error::TriggerNotFound {
            component: "dropdown".to_string(),
            property: "value".to_string(),
        };
        assert!(err.to_string().contains("dropdown.value"));
    }
}
