//! Sales dashboard core: load sales records, filter them and compute the
//! aggregate tables the dashboard renders.

pub mod config;
pub mod data;
pub mod error;

pub use data::aggregate::DashboardTables;
pub use data::filter::{FilterSpec, FilteredView, Selection};
pub use data::model::{Month, SalesDataset, Transaction};
pub use error::{ExportError, LoadError};
