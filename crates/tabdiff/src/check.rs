//! File-driven comparison of original scripts against a migration.
//!
//! Original files are read in the order given and merged into one snapshot; a
//! table defined by a later file replaces the same table from an earlier one.
//! The migration file is extracted on its own and the two are compared with
//! [`compare`](crate::compare).
//!
//! Any file that cannot be read aborts the run with [`Error::Read`].

use crate::diff::{DiffReport, compare};
use crate::error::{Error, Result};
use crate::extract::{DEFAULT_SCHEMA, Extractor};
use crate::snapshot::SchemaSnapshot;
use camino::{Utf8Path, Utf8PathBuf};
use facet::Facet;

/// What to compare.
#[derive(Debug, Clone)]
pub struct CheckInput {
    /// Schema qualifier of the `CREATE TABLE` statements.
    pub schema: String,

    /// Hand-written scripts, in merge order.
    pub originals: Vec<Utf8PathBuf>,

    /// The migration expected to match the scripts.
    pub migration: Utf8PathBuf,
}

impl CheckInput {
    pub fn new(originals: Vec<Utf8PathBuf>, migration: impl Into<Utf8PathBuf>) -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            originals,
            migration: migration.into(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }
}

/// Tables found in one source file, in the order they are first defined.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct SourceSummary {
    pub path: String,
    pub tables: Vec<String>,
}

/// Everything a run produced, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct CheckOutcome {
    pub schema: String,

    /// One entry per original file, in the order they were read.
    pub sources: Vec<SourceSummary>,

    /// Number of distinct tables after merging the original files.
    pub original_table_count: usize,

    /// The migration file and the tables it defines.
    pub migration: SourceSummary,

    pub report: DiffReport,
}

impl CheckOutcome {
    pub fn migration_table_count(&self) -> usize {
        self.migration.tables.len()
    }

    pub fn any_differences_found(&self) -> bool {
        self.report.any_differences_found
    }
}

/// Read, extract and compare everything named by `input`.
pub fn run(input: &CheckInput) -> Result<CheckOutcome> {
    let extractor = Extractor::new(&input.schema)?;

    let mut original = SchemaSnapshot::new();
    let mut sources = Vec::with_capacity(input.originals.len());

    for path in &input.originals {
        let (snapshot, tables) = read_file(&extractor, path)?;
        sources.push(SourceSummary {
            path: path.to_string(),
            tables,
        });
        original.merge(snapshot);
    }

    let (migration, tables) = read_file(&extractor, &input.migration)?;
    let migration_summary = SourceSummary {
        path: input.migration.to_string(),
        tables,
    };

    tracing::info!(
        originals = input.originals.len(),
        original_tables = original.len(),
        migration_tables = migration.len(),
        "comparing schemas"
    );

    let report = compare(&original, &migration);

    Ok(CheckOutcome {
        schema: input.schema.clone(),
        sources,
        original_table_count: original.len(),
        migration: migration_summary,
        report,
    })
}

/// Extract and merge several files, later files replacing earlier tables.
pub fn read_snapshot(extractor: &Extractor, paths: &[Utf8PathBuf]) -> Result<SchemaSnapshot> {
    let mut merged = SchemaSnapshot::new();
    for path in paths {
        merged.merge(read_file(extractor, path)?.0);
    }
    Ok(merged)
}

/// Extract one file, returning its tables and their order of first definition.
fn read_file(extractor: &Extractor, path: &Utf8Path) -> Result<(SchemaSnapshot, Vec<String>)> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;

    let (snapshot, order) = extractor.extract_in_order(&text);
    tracing::debug!(%path, tables = snapshot.len(), "extracted");

    Ok((snapshot, order))
}
