//! Response formatting subsystem.
//!
//! # Data Flow
//! ```text
//! RouteResult
//!     → FormatRegistry lookup by name (json | gpx | kml)
//!     → formatter.format() → body + content type
//! ```
//!
//! # Design Decisions
//! - Formatters are stateless and deterministic: same result, same bytes
//! - All coordinates leave as (lat, lon) except where the target format mandates otherwise (KML)

pub mod gpx;
pub mod json;
pub mod kml;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::routing::{RouteError, RouteOutcome, RouteResult};

pub use gpx::GpxFormatter;
pub use json::JsonFormatter;
pub use kml::KmlFormatter;

/// Serializes a route result into one output representation.
pub trait ResponseFormatter: Send + Sync + std::fmt::Debug {
    /// Format name used in the `format` / `output` query parameter.
    fn name(&self) -> &str;

    /// MIME type of the produced body.
    fn content_type(&self) -> &'static str;

    fn format(&self, result: &RouteResult) -> RouteOutcome<String>;
}

/// Immutable name → formatter lookup.
#[derive(Debug, Default)]
pub struct FormatRegistry {
    formatters: BTreeMap<String, Arc<dyn ResponseFormatter>>,
}

impl FormatRegistry {
    /// Registry with every built-in format.
    pub fn with_defaults() -> Self {
        Self::default()
            .with(JsonFormatter)
            .with(GpxFormatter::default())
            .with(KmlFormatter)
    }

    /// Add a formatter, replacing any with the same name.
    pub fn with(mut self, formatter: impl ResponseFormatter + 'static) -> Self {
        self.formatters
            .insert(formatter.name().to_string(), Arc::new(formatter));
        self
    }

    pub fn get(&self, name: &str) -> RouteOutcome<Arc<dyn ResponseFormatter>> {
        self.formatters
            .get(name)
            .cloned()
            .ok_or_else(|| RouteError::UnsupportedFormat(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }
}
