//! Canonical route models.
//!
//! # Data Flow
//! ```text
//! query string / JSON body / loc list
//!     → query.rs (RouteQueryDraft → validate → RouteQuery)
//!     → [provider adapter]
//!     → result.rs (RouteResult, always (lat, lon))
//!     → [response formatter]
//! ```
//!
//! # Design Decisions
//! - Validation runs once, after the draft is complete
//! - Models are immutable once built
//! - Axis order is fixed here; adapters convert before constructing results

pub mod query;
pub mod result;
pub mod types;

pub use query::{RouteQuery, RouteQueryDraft};
pub use result::{RouteMetadata, RouteResult};
pub use types::{LatLon, Mode, RouteError, RouteOutcome, RouteType};
