//! Core library for the pair-merge command line application.
//!
//! The library merges up to four spreadsheet exports keyed by location code
//! and item code into one table. Columns are located by header name rather
//! than position: [`normalize`] canonicalises header text, [`resolve`] maps
//! canonical fields onto actual headers, [`key`] and [`numeric`] prepare join
//! keys and values, [`reconcile`] joins the record sets and [`output`] lays
//! out the result. Workbook adapters live under [`io`] and the file-level
//! orchestration in [`merge`].

pub mod error;
pub mod io;
pub mod key;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod numeric;
pub mod output;
pub mod reconcile;
pub mod resolve;

pub use error::{Result, ToolError};
pub use model::{CanonicalField, RecordSet, SourceKind};
pub use reconcile::{ColumnOverrides, ReconcileInputs, Reconciliation, reconcile};
