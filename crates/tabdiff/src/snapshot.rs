//! Table name to column set mappings.

use std::collections::{BTreeMap, BTreeSet, btree_map};

/// Column names of one table, sorted and deduplicated.
pub type ColumnSet = BTreeSet<String>;

/// The tables captured from one or more SQL sources.
///
/// Table names are compared exactly as captured (case-sensitive). A name appears
/// at most once; inserting it again replaces the previous column set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSnapshot {
    tables: BTreeMap<String, ColumnSet>,
}

impl SchemaSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, returning the column set it replaced, if any.
    pub fn insert(&mut self, table: impl Into<String>, columns: ColumnSet) -> Option<ColumnSet> {
        self.tables.insert(table.into(), columns)
    }

    /// Fold `other` into this snapshot.
    ///
    /// Tables from `other` replace same-named tables here wholesale; columns are
    /// never unioned.
    pub fn merge(&mut self, other: SchemaSnapshot) {
        for (table, columns) in other.tables {
            if let Some(previous) = self.tables.insert(table.clone(), columns) {
                tracing::debug!(
                    table = %table,
                    replaced_columns = previous.len(),
                    "table redefined, keeping the later definition"
                );
            }
        }
    }

    pub fn get(&self, table: &str) -> Option<&ColumnSet> {
        self.tables.get(table)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ColumnSet> {
        self.tables.iter()
    }
}

impl FromIterator<(String, ColumnSet)> for SchemaSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, ColumnSet)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SchemaSnapshot {
    type Item = (&'a String, &'a ColumnSet);
    type IntoIter = btree_map::Iter<'a, String, ColumnSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}
