// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! The controls snapshot actions read from
//!
//! Every action invocation receives one immutable [`ControlsState`]: the
//! current value of every filter and parameter selector on the page plus
//! any pending figure-interaction events, captured at dispatch time. Two
//! invocations with equal snapshots (and equal configuration) produce equal
//! results; that purity is what the wiring layer relies on.

use serde::{Deserialize, Serialize};

use crate::dataframe::Value;
use crate::models::{ControlValue, ModelId};

/// The state of one control at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    /// The Filter or Parameter control model.
    pub control: ModelId,
    /// The selector widget whose value was read.
    pub selector: ModelId,
    /// The selector's current value.
    pub value: ControlValue,
    /// Whether this control's change fired the running chain.
    pub triggered: bool,
}

/// A click event on a source figure, carrying the clicked point's
/// custom-data values aligned with the figure's `custom_data` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickData {
    /// Custom-data values of the clicked point, one per exposed column.
    pub custom_data: Vec<Value>,
}

/// The interaction state of one source figure at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionState {
    /// The source figure.
    pub source: ModelId,
    /// The last click event, if any.
    pub click_data: Option<ClickData>,
}

/// The full immutable snapshot passed to every action in a chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlsState {
    /// Filter states in page declaration order.
    pub filters: Vec<ControlState>,
    /// Parameter states in page declaration order.
    pub parameters: Vec<ControlState>,
    /// Figure-interaction states in page declaration order.
    pub filter_interaction: Vec<InteractionState>,
}

impl ControlsState {
    /// An empty snapshot (no controls on the page).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
