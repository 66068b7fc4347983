//! Configuration schema for tabdiff.
//!
//! Read from `.config/tabdiff.styx` at the project root:
//!
//! ```styx
//! schema rsms
//! originals (
//!     database/scripts/04.create_table_ledger_order.sql
//!     database/scripts/05.create_table_positions.sql
//! )
//! migration backend/src/main/resources/db/migration/V003__Create_business_tables.sql
//! ```
//!
//! Relative paths are resolved against the project root (the directory that
//! contains `.config/`).

use facet::Facet;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Schema qualifier of the `CREATE TABLE` statements (defaults to `rsms`).
    #[facet(default)]
    pub schema: Option<String>,

    /// Hand-written SQL scripts, merged in this order.
    #[facet(default)]
    pub originals: Vec<String>,

    /// Migration file expected to match the scripts.
    #[facet(default)]
    pub migration: Option<String>,

    /// Also list the columns shared by mismatched tables.
    #[facet(default)]
    pub show_common: Option<bool>,
}
