//! Human-readable rendering of check results.

use camino::Utf8Path;
use owo_colors::{OwoColorize, Style};
use std::fmt;
use tabdiff::check::CheckOutcome;
use tabdiff::{SchemaSnapshot, TableReport, TableStatus};

const RULE_WIDTH: usize = 80;

/// Rendering options for the text report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    pub color: bool,
    pub show_common: bool,
}

#[derive(Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn ok(&self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    fn bad(&self, text: &str) -> String {
        self.paint(text, Style::new().red().bold())
    }

    fn warn(&self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }
}

struct Rule;

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..RULE_WIDTH {
            f.write_str("=")?;
        }
        Ok(())
    }
}

struct List<'a>(&'a [String]);

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

fn file_name(path: &str) -> &str {
    Utf8Path::new(path).file_name().unwrap_or(path)
}

/// A check outcome rendered as text.
pub struct CheckReport<'a> {
    outcome: &'a CheckOutcome,
    options: TextOptions,
}

impl<'a> CheckReport<'a> {
    pub fn new(outcome: &'a CheckOutcome, options: TextOptions) -> Self {
        Self { outcome, options }
    }
}

impl fmt::Display for CheckReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;
        let p = Palette {
            color: self.options.color,
        };

        writeln!(f, "{}", Rule)?;
        writeln!(
            f,
            "Comparing original scripts with migration (schema: {})",
            outcome.schema
        )?;
        writeln!(f, "{}", Rule)?;

        for source in &outcome.sources {
            writeln!(
                f,
                "{} {}: {}",
                p.ok("✓"),
                file_name(&source.path),
                List(&source.tables)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Original tables: {}", outcome.original_table_count)?;
        writeln!(
            f,
            "Migration tables: {} {}",
            outcome.migration_table_count(),
            p.dim(&List(&outcome.migration.tables).to_string())
        )?;
        writeln!(f, "  from {}", file_name(&outcome.migration.path))?;

        writeln!(f)?;
        writeln!(f, "{}", Rule)?;
        writeln!(f, "Per-table results")?;
        writeln!(f, "{}", Rule)?;

        for table in outcome.report.mismatches() {
            writeln!(f)?;
            write_table(f, p, table, self.options.show_common)?;
        }

        let total = outcome.report.tables.len();
        writeln!(f)?;
        if outcome.any_differences_found() {
            writeln!(f, "{}", Rule)?;
            writeln!(
                f,
                "{} Differences found in {} of {} tables.",
                p.warn("⚠"),
                outcome.report.difference_count(),
                total
            )?;
            writeln!(f, "{}", Rule)
        } else {
            writeln!(f, "{} All {} tables match exactly.", p.ok("✓"), total)
        }
    }
}

fn write_table(
    f: &mut fmt::Formatter<'_>,
    p: Palette,
    table: &TableReport,
    show_common: bool,
) -> fmt::Result {
    writeln!(f, "{} [{}] differs", p.bad("✗"), table.table)?;

    match &table.status {
        TableStatus::Match => {}
        TableStatus::MissingFromOriginal { columns } => {
            writeln!(f, "  {} missing from original (migration only)", p.warn("⚠"))?;
            writeln!(f, "  columns: {}", List(columns))?;
        }
        TableStatus::MissingFromMigration { columns } => {
            writeln!(f, "  {} missing from migration (original only)", p.warn("⚠"))?;
            writeln!(f, "  columns: {}", List(columns))?;
        }
        TableStatus::ColumnsDiffer {
            only_in_original,
            only_in_migration,
            common,
        } => {
            if !only_in_original.is_empty() {
                writeln!(f, "  only in original: {}", List(only_in_original))?;
            }
            if !only_in_migration.is_empty() {
                writeln!(f, "  only in migration: {}", List(only_in_migration))?;
            }
            if show_common {
                writeln!(f, "  common ({}): {}", common.len(), List(common))?;
            }
        }
    }

    Ok(())
}

/// An extracted snapshot rendered as text, one table per line.
pub struct SnapshotListing<'a>(pub &'a SchemaSnapshot);

impl fmt::Display for SnapshotListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (table, columns) in self.0 {
            let columns: Vec<String> = columns.iter().cloned().collect();
            writeln!(f, "{}: {}", table, List(&columns))?;
        }
        writeln!(f, "{} tables", self.0.len())
    }
}

/// Render a full check outcome.
pub fn render_check(outcome: &CheckOutcome, options: TextOptions) -> String {
    CheckReport::new(outcome, options).to_string()
}

/// Render an extracted snapshot.
pub fn render_snapshot(snapshot: &SchemaSnapshot) -> String {
    SnapshotListing(snapshot).to_string()
}
