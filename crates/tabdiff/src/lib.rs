//! Column-level comparison of `CREATE TABLE` definitions.
//!
//! This crate provides:
//! - An [`Extractor`] that scans SQL text for `CREATE TABLE <schema>.<name> (...);`
//!   blocks and reduces each to a sorted, deduplicated set of column names
//! - A [`SchemaSnapshot`] mapping table names to those column sets
//! - A differ ([`compare`]) that reports tables and columns present on only one side
//! - A file-driven entry point ([`check::run`]) that merges a list of hand-written
//!   scripts and compares them against a single migration file
//!
//! # Limitations
//!
//! Extraction is pattern based, not a SQL parser. A table body ends at the first
//! `);` sequence, so a default expression such as `DEFAULT foo();` inside the body
//! truncates it. Types, defaults and constraints are not inspected; only the first
//! token of each body line is kept as the column name.
//!
//! ```
//! let original = tabdiff::extract("CREATE TABLE rsms.orders (\n id BIGINT,\n name TEXT\n);");
//! let migration = tabdiff::extract(
//!     "CREATE TABLE rsms.orders (\n id BIGINT,\n name TEXT,\n created_at TIMESTAMP\n);",
//! );
//!
//! let report = tabdiff::compare(&original, &migration);
//! assert!(report.any_differences_found);
//! ```

pub mod check;
mod diff;
mod error;
mod extract;
mod snapshot;

pub use diff::{DiffReport, TableReport, TableStatus, compare};
pub use error::{Error, Result};
pub use extract::{CONSTRAINT_KEYWORDS, DEFAULT_SCHEMA, Extractor, column_name, extract};
pub use snapshot::{ColumnSet, SchemaSnapshot};
