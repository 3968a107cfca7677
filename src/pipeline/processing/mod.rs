// Pipeline processing: province aggregation, filtering, alias resolution and reconciliation

pub mod aggregate;
pub mod alias;
pub mod filter;
pub mod reconcile;
pub mod timeline;

pub use aggregate::aggregate_provinces;
pub use alias::{AliasDirection, AliasResolver, AliasTables};
pub use filter::{filter_non_countries, is_non_country};
pub use reconcile::{CountryReconciler, Reconciliation, ReconciliationReport};
pub use timeline::format_series;
