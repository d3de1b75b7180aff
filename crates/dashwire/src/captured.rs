// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Captured figure calls
//!
//! A [`CapturedCallable`] stores a figure-producing function together with
//! its bound keyword arguments and the name of the data source feeding its
//! `data_frame`. The action layer re-invokes the capture with a substituted
//! data frame and a modified argument map; the function itself never runs
//! until then.
//!
//! Argument maps are JSON objects. Parameters may rebind one key deep
//! inside a nested object (`layout.title.size`) without clobbering sibling
//! keys; [`set_nested`] implements that surgical update.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::data_manager::DataSourceName;
use crate::dataframe::DataFrame;
use crate::error::{Error, Result};

/// Keyword arguments bound into a captured call.
pub type ArgumentMap = Map<String, JsonValue>;

/// A renderable figure produced by a captured call.
///
/// The action core does not render markup; a figure is the data it was
/// built from plus the configuration the factory resolved. Two figures
/// built from the same inputs compare equal, which is what the idempotence
/// guarantees in the action layer rest on.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Factory-chosen discriminator, e.g. `scatter`.
    pub kind: String,
    /// The exact data the figure displays.
    pub data: DataFrame,
    /// Resolved layout/configuration.
    pub config: JsonValue,
}

impl Figure {
    /// Create a figure.
    pub fn new(kind: impl Into<String>, data: DataFrame, config: JsonValue) -> Self {
        Figure {
            kind: kind.into(),
            data,
            config,
        }
    }
}

/// The function shape every figure factory implements: `data_frame` first,
/// then the merged keyword arguments.
pub type FigureFn = dyn Fn(DataFrame, &ArgumentMap) -> Result<Figure> + Send + Sync;

/// A figure function captured together with its bound arguments and data
/// source, ready to be re-invoked by the action layer.
#[derive(Clone)]
pub struct CapturedCallable {
    function: Arc<FigureFn>,
    data_source: DataSourceName,
    arguments: ArgumentMap,
}

impl CapturedCallable {
    /// Capture `function` reading from the named data source.
    pub fn new(
        data_source: impl Into<DataSourceName>,
        function: impl Fn(DataFrame, &ArgumentMap) -> Result<Figure> + Send + Sync + 'static,
    ) -> Self {
        CapturedCallable {
            function: Arc::new(function),
            data_source: data_source.into(),
            arguments: ArgumentMap::new(),
        }
    }

    /// Bind a keyword argument into the capture.
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    /// The data source feeding this capture's `data_frame`.
    #[must_use]
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// A copy of the bound arguments, the starting point for parameter
    /// rebinding.
    #[must_use]
    pub fn bound_arguments(&self) -> ArgumentMap {
        self.arguments.clone()
    }

    /// Invoke the captured function with a substituted data frame and the
    /// final argument map.
    pub fn call(&self, data_frame: DataFrame, arguments: &ArgumentMap) -> Result<Figure> {
        (self.function)(data_frame, arguments)
    }

    /// Invoke with the originally bound arguments.
    pub fn call_with_bound(&self, data_frame: DataFrame) -> Result<Figure> {
        self.call(data_frame, &self.arguments)
    }
}

impl fmt::Debug for CapturedCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedCallable")
            .field("data_source", &self.data_source)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Rebind one key along a dotted path inside an argument map, leaving
/// sibling keys untouched. Intermediate segments must already exist and be
/// objects; a missing or non-object segment is a configuration error.
pub fn set_nested(arguments: &mut ArgumentMap, path: &[String], value: JsonValue) -> Result<()> {
    let Some((last, intermediate)) = path.split_last() else {
        return Err(Error::Validation(
            "argument path must have at least one segment".to_string(),
        ));
    };
    let mut current = arguments;
    for segment in intermediate {
        current = current
            .get_mut(segment)
            .and_then(JsonValue::as_object_mut)
            .ok_or_else(|| Error::Validation(format!(
                "argument path segment '{segment}' does not exist or is not an object"
            )))?;
    }
    current.insert(last.clone(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::Value;
    use serde_json::json;

    fn scatter_capture() -> CapturedCallable {
        CapturedCallable::new("iris", |frame, args| {
            Ok(Figure::new(
                "scatter",
                frame,
                JsonValue::Object(args.clone()),
            ))
        })
        .with_argument("x", json!("sepal_length"))
        .with_argument("y", json!("sepal_width"))
    }

    fn one_row_frame() -> DataFrame {
        DataFrame::new()
            .with_column("sepal_length", vec![Value::from(5.1)])
            .unwrap()
    }

    #[test]
    fn test_call_substitutes_frame_and_arguments() {
        let capture = scatter_capture();
        let mut args = capture.bound_arguments();
        args.insert("y".to_string(), json!("petal_width"));
        let figure = capture.call(one_row_frame(), &args).unwrap();
        assert_eq!(figure.config["y"], json!("petal_width"));
        assert_eq!(figure.config["x"], json!("sepal_length"));
        assert_eq!(figure.data.row_count(), 1);
    }

    #[test]
    fn test_same_inputs_same_figure() {
        let capture = scatter_capture();
        let first = capture.call_with_bound(one_row_frame()).unwrap();
        let second = capture.call_with_bound(one_row_frame()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_nested_updates_one_key() {
        let mut args = ArgumentMap::new();
        args.insert(
            "layout".to_string(),
            json!({"title": {"text": "Iris", "size": 12}, "height": 400}),
        );
        set_nested(
            &mut args,
            &["layout".to_string(), "title".to_string(), "size".to_string()],
            json!(20),
        )
        .unwrap();
        assert_eq!(args["layout"]["title"]["size"], json!(20));
        // Siblings survive the update.
        assert_eq!(args["layout"]["title"]["text"], json!("Iris"));
        assert_eq!(args["layout"]["height"], json!(400));
    }

    #[test]
    fn test_set_nested_top_level() {
        let mut args = ArgumentMap::new();
        args.insert("x".to_string(), json!("a"));
        set_nested(&mut args, &["x".to_string()], json!("b")).unwrap();
        assert_eq!(args["x"], json!("b"));
    }

    #[test]
    fn test_set_nested_missing_segment_fails() {
        let mut args = ArgumentMap::new();
        let err = set_nested(
            &mut args,
            &["layout".to_string(), "size".to_string()],
            json!(1),
        )
        .unwrap_err();
        assert!(err.to_string().contains("layout"));
    }
}
