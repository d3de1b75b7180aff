// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

// Allow unwrap in testing utilities - test code should panic on errors
#![allow(clippy::unwrap_used)]

//! # Dashwire Testing Utilities
//!
//! This crate provides testing utilities for Dashwire dashboards,
//! including:
//!
//! - **Fixture data**: a deterministic iris-shaped data frame (150 rows,
//!   50 per species) and a parametrized sample loader over it
//! - **`CountingLoader`**: a loader wrapper that counts invocations, for
//!   asserting cache behavior
//! - **Figure captures**: ready-made scatter captures for wiring test
//!   dashboards
//!
//! ## Quick Start
//!
//! ```rust
//! use dashwire_testing::{iris, scatter_figure, CountingLoader};
//!
//! let frame = iris();
//! assert_eq!(frame.row_count(), 150);
//!
//! let capture = scatter_figure("iris");
//! assert_eq!(capture.data_source(), "iris");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashwire::captured::{CapturedCallable, Figure};
use dashwire::data_manager::{DataLoader, LoadArguments, LoaderResult};
use dashwire::dataframe::{DataFrame, Value};
use serde_json::Value as JsonValue;

/// The standard iris species, in option order.
pub const IRIS_SPECIES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// A deterministic iris-shaped frame: 150 rows, 50 per species, with
/// `species`, `sepal_length` and `petal_width` columns. Values cycle
/// through small deterministic offsets so repeated constructions are
/// bit-identical.
#[must_use]
pub fn iris() -> DataFrame {
    let mut species = Vec::with_capacity(150);
    let mut sepal_length = Vec::with_capacity(150);
    let mut petal_width = Vec::with_capacity(150);
    for (species_idx, name) in IRIS_SPECIES.iter().enumerate() {
        let base_length = 4.5 + species_idx as f64;
        let base_width = 0.2 + species_idx as f64;
        for row in 0..50 {
            species.push(Value::from(*name));
            sepal_length.push(Value::from(base_length + (row % 10) as f64 * 0.1));
            petal_width.push(Value::from(base_width + (row % 5) as f64 * 0.1));
        }
    }
    DataFrame::new()
        .with_column("species", species)
        .unwrap()
        .with_column("sepal_length", sepal_length)
        .unwrap()
        .with_column("petal_width", petal_width)
        .unwrap()
}

/// The first `number_of_points` rows of [`iris`]. Defaults to 10 when the
/// argument is absent, so the loader also works with empty pre-build
/// arguments.
#[must_use]
pub fn iris_sample(number_of_points: usize) -> DataFrame {
    let full = iris();
    let mask: Vec<bool> = (0..full.row_count()).map(|i| i < number_of_points).collect();
    full.filter(&mask).unwrap()
}

/// A loader serving [`iris_sample`], honoring a `number_of_points`
/// argument.
#[must_use]
pub fn iris_sample_loader() -> Arc<dyn DataLoader> {
    Arc::new(|args: &LoadArguments| -> LoaderResult {
        let n = match args.get("number_of_points") {
            Some(Value::Number(n)) => *n as usize,
            _ => 10,
        };
        Ok(iris_sample(n))
    })
}

/// Wraps a loader and counts how many times it actually runs. The counter
/// only moves on real loader invocations, never on cache hits, which makes
/// it the right probe for reload assertions.
pub struct CountingLoader {
    inner: Arc<dyn DataLoader>,
    calls: AtomicUsize,
}

impl CountingLoader {
    /// Wrap a loader.
    #[must_use]
    pub fn wrap(inner: Arc<dyn DataLoader>) -> Arc<Self> {
        Arc::new(CountingLoader {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of times the wrapped loader ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataLoader for CountingLoader {
    fn load(&self, args: &LoadArguments) -> LoaderResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(args)
    }
}

/// A scatter figure capture over the named data source. The produced
/// figure carries the exact filtered frame plus the merged argument map,
/// so tests can assert on both.
#[must_use]
pub fn scatter_figure(data_source: &str) -> CapturedCallable {
    CapturedCallable::new(data_source, |frame, args| {
        Ok(Figure::new(
            "scatter",
            frame,
            JsonValue::Object(args.clone()),
        ))
    })
    .with_argument("x", JsonValue::String("sepal_length".to_string()))
    .with_argument("y", JsonValue::String("petal_width".to_string()))
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{iris, iris_sample, iris_sample_loader, scatter_figure, CountingLoader};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iris_shape() {
        let frame = iris();
        assert_eq!(frame.row_count(), 150);
        let species = frame.column("species").unwrap();
        for name in IRIS_SPECIES {
            let count = species
                .values
                .iter()
                .filter(|v| **v == Value::from(name))
                .count();
            assert_eq!(count, 50);
        }
    }

    #[test]
    fn test_iris_is_deterministic() {
        assert_eq!(iris(), iris());
    }

    #[test]
    fn test_iris_sample_truncates() {
        assert_eq!(iris_sample(10).row_count(), 10);
        assert_eq!(iris_sample(100).row_count(), 100);
    }

    #[test]
    fn test_counting_loader_counts() {
        let counting = CountingLoader::wrap(iris_sample_loader());
        assert_eq!(counting.call_count(), 0);
        counting.load(&LoadArguments::new()).unwrap();
        counting.load(&LoadArguments::new()).unwrap();
        assert_eq!(counting.call_count(), 2);
    }

    #[test]
    fn test_scatter_capture_builds() {
        let figure = scatter_figure("iris").call_with_bound(iris()).unwrap();
        assert_eq!(figure.kind, "scatter");
        assert_eq!(figure.data.row_count(), 150);
    }
}
