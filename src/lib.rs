//! Campaign table viewer.
//!
//! The engine is [`state::TableState`] with its pure transitions,
//! [`sort::build_comparator`] / [`sort::stable_sort`] and
//! [`view::compute_view`]. Everything else loads data, maps keys and draws.

pub mod columns;
pub mod controller;
pub mod domain;
pub mod loader;
pub mod model;
pub mod record;
pub mod sort;
pub mod state;
pub mod ui;
pub mod view;

pub use domain::{CtConfig, CtError};
pub use record::{FieldKey, Identity, Record, Value};
pub use sort::{build_comparator, stable_sort};
pub use state::{Pagination, SortDirection, TableState};
pub use view::{PageView, ViewRow, compute_view};
