// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Export-data serialization
//!
//! The export action re-applies the currently active filters and
//! interactions to each target's source data (parameters contribute loader
//! arguments only; they never rebind figure configuration here, since the
//! exported artifact is the data, not the figure) and serializes the exact
//! on-screen frame to a downloadable payload, one per target.
//!
//! CSV is always available. XLSX is compiled in behind the `xlsx` cargo
//! feature; an xlsx-configured action on a build without it fails
//! `pre_build`, so the gap surfaces at dashboard start, never
//! mid-interaction.

use tracing::debug;

use crate::actions::apply::load_filtered_frame;
use crate::actions::context::ControlsState;
use crate::actions::{ActionOutputs, FileFormat, OutputValue};
use crate::data_manager::DataManager;
use crate::error::{Error, Result};
use crate::model_manager::ModelManager;
use crate::models::ModelId;

/// A downloadable file produced by the export action.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadPayload {
    /// Suggested file name, `<target>.<extension>`.
    pub filename: String,
    /// Serialized file content.
    pub content: Vec<u8>,
}

/// Fail fast when the requested format is not compiled into this build.
pub fn check_format_available(format: FileFormat) -> Result<()> {
    match format {
        FileFormat::Csv => Ok(()),
        FileFormat::Xlsx => {
            if cfg!(feature = "xlsx") {
                Ok(())
            } else {
                Err(Error::ExportFormatUnavailable {
                    format: "xlsx".to_string(),
                    reason: "this build does not include Excel support; enable the 'xlsx' cargo feature"
                        .to_string(),
                })
            }
        }
    }
}

/// Serialize the currently-filtered frame of every target to `format`,
/// keyed `download_dataframe_<target>`.
pub fn export_targets(
    models: &ModelManager,
    data: &DataManager,
    controls: &ControlsState,
    targets: &[ModelId],
    format: FileFormat,
) -> Result<ActionOutputs> {
    check_format_available(format)?;
    let mut outputs = ActionOutputs::new();
    for target in targets {
        let Ok(model) = models.get(target) else {
            debug!(target = %target, "skipping stale export target");
            continue;
        };
        if model.captured_figure().is_none() {
            debug!(target = %target, "export target is not a figure; skipping");
            continue;
        }
        let frame = load_filtered_frame(models, data, controls, target)?;
        let content = match format {
            FileFormat::Csv => frame.to_csv_bytes()?,
            FileFormat::Xlsx => to_xlsx(&frame)?,
        };
        outputs.insert(
            format!("download_dataframe_{target}"),
            OutputValue::Download(DownloadPayload {
                filename: format!("{target}.{}", format.extension()),
                content,
            }),
        );
    }
    Ok(outputs)
}

#[cfg(feature = "xlsx")]
fn to_xlsx(frame: &crate::dataframe::DataFrame) -> Result<Vec<u8>> {
    frame.to_xlsx_bytes()
}

#[cfg(not(feature = "xlsx"))]
fn to_xlsx(_frame: &crate::dataframe::DataFrame) -> Result<Vec<u8>> {
    // Unreachable in practice: check_format_available rejects xlsx first.
    Err(Error::ExportFormatUnavailable {
        format: "xlsx".to_string(),
        reason: "this build does not include Excel support; enable the 'xlsx' cargo feature"
            .to_string(),
    })
}
