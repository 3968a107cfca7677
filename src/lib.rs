pub mod choropleth;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod summary;
pub mod types;

// Layered boundaries: use cases and their adapters
pub mod app;
pub mod infra;

pub mod observability;

pub use error::{Result, TrackerError};
pub use pipeline::processing::reconcile::CountryReconciler;
pub use types::{CanonicalCountry, CovidStats, RawProvinceRecord, RawSnapshotRecord};
