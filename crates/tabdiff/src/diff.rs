//! Column-set diffing between two snapshots.
//!
//! [`compare`] walks the union of table names in sorted order and classifies each
//! table:
//!
//! ```text
//! orders:        columns differ  (only in original: [..], only in migration: [..])
//! legacy_table:  missing from migration
//! audit_log:     missing from original
//! users:         match
//! ```
//!
//! Two tables match when their column sets are equal. Because an absent table is
//! treated as having no columns, a table with an empty body that exists on only
//! one side still counts as a match.

use crate::snapshot::{ColumnSet, SchemaSnapshot};
use facet::Facet;

/// The result of comparing an original snapshot against a migration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Facet)]
pub struct DiffReport {
    /// One entry per table name seen on either side, sorted by name.
    pub tables: Vec<TableReport>,

    /// True when at least one table is not a match.
    pub any_differences_found: bool,
}

impl DiffReport {
    /// Tables whose column sets differ.
    pub fn mismatches(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| !t.is_match())
    }

    /// Tables whose column sets are equal.
    pub fn matching(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| t.is_match())
    }

    /// Number of mismatched tables.
    pub fn difference_count(&self) -> usize {
        self.mismatches().count()
    }
}

/// Comparison outcome for a single table.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct TableReport {
    pub table: String,
    pub status: TableStatus,
}

impl TableReport {
    pub fn is_match(&self) -> bool {
        matches!(self.status, TableStatus::Match)
    }
}

/// How a table differs between the two sides.
#[derive(Debug, Clone, PartialEq, Facet)]
#[repr(u8)]
pub enum TableStatus {
    /// Column sets are equal.
    Match,

    /// The table only exists in the migration.
    MissingFromOriginal { columns: Vec<String> },

    /// The table only exists in the original scripts.
    MissingFromMigration { columns: Vec<String> },

    /// The table exists on both sides with different columns.
    ColumnsDiffer {
        only_in_original: Vec<String>,
        only_in_migration: Vec<String>,
        common: Vec<String>,
    },
}

/// Compare the `original` snapshot against the `migration` snapshot.
///
/// Every table name present on either side appears exactly once in the report,
/// in sorted order. Column lists in the report are sorted.
pub fn compare(original: &SchemaSnapshot, migration: &SchemaSnapshot) -> DiffReport {
    let empty = ColumnSet::new();

    let mut names: Vec<&str> = original.table_names().chain(migration.table_names()).collect();
    names.sort_unstable();
    names.dedup();

    let tables: Vec<TableReport> = names
        .into_iter()
        .map(|table| {
            let original_cols = original.get(table);
            let migration_cols = migration.get(table);

            let status = classify(
                original_cols.unwrap_or(&empty),
                migration_cols.unwrap_or(&empty),
                original_cols.is_some(),
                migration_cols.is_some(),
            );

            if !matches!(status, TableStatus::Match) {
                tracing::debug!(table, ?status, "table differs");
            }

            TableReport {
                table: table.to_string(),
                status,
            }
        })
        .collect();

    let any_differences_found = tables.iter().any(|t| !t.is_match());

    DiffReport {
        tables,
        any_differences_found,
    }
}

fn classify(
    original: &ColumnSet,
    migration: &ColumnSet,
    in_original: bool,
    in_migration: bool,
) -> TableStatus {
    if original == migration {
        return TableStatus::Match;
    }

    if !in_original {
        return TableStatus::MissingFromOriginal {
            columns: owned(migration.iter()),
        };
    }

    if !in_migration {
        return TableStatus::MissingFromMigration {
            columns: owned(original.iter()),
        };
    }

    TableStatus::ColumnsDiffer {
        only_in_original: owned(original.difference(migration)),
        only_in_migration: owned(migration.difference(original)),
        common: owned(original.intersection(migration)),
    }
}

// BTreeSet iterators yield in order, so the result is sorted.
fn owned<'a>(columns: impl Iterator<Item = &'a String>) -> Vec<String> {
    columns.cloned().collect()
}
