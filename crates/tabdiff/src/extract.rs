//! `CREATE TABLE` extraction.
//!
//! A table is recognized by the pattern
//!
//! ```text
//! CREATE TABLE <ws> <schema>.<name> <ws?> ( <body> );
//! ```
//!
//! with the keywords and schema matched case-insensitively and the table name
//! limited to ASCII `[A-Za-z0-9_]`, across newlines. The body is matched lazily up to
//! the first `);`, so a body that itself contains `);` is cut short there. Each
//! remaining body line contributes its first token as a column name, unless it is
//! a comment or a table-level constraint.

use crate::error::Result;
use crate::snapshot::{ColumnSet, SchemaSnapshot};
use regex::Regex;
use std::sync::LazyLock;

/// Schema qualifier used by [`extract`].
pub const DEFAULT_SCHEMA: &str = "rsms";

/// First tokens that mark a table-level constraint line rather than a column.
pub const CONSTRAINT_KEYWORDS: [&str; 5] = ["CONSTRAINT", "FOREIGN", "PRIMARY", "UNIQUE", "CHECK"];

const COMMENT_MARKER: &str = "--";

static DEFAULT_EXTRACTOR: LazyLock<Extractor> =
    LazyLock::new(|| Extractor::new(DEFAULT_SCHEMA).expect("valid regex"));

/// Scans SQL text for `CREATE TABLE` blocks qualified by one schema.
#[derive(Debug, Clone)]
pub struct Extractor {
    schema: String,
    pattern: Regex,
}

impl Extractor {
    /// Build an extractor for tables qualified by `schema`.
    ///
    /// The keywords and the schema are matched literally, ignoring case. The
    /// table name is case-sensitive ASCII.
    pub fn new(schema: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"(?s)(?i:CREATE TABLE\s+{}\.)([A-Za-z0-9_]+)\s*\((.*?)\);",
            regex::escape(schema)
        ))?;

        Ok(Self {
            schema: schema.to_string(),
            pattern,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Extract every table defined in `text`.
    ///
    /// Text without any match yields an empty snapshot. When a table name occurs
    /// more than once, the last definition wins.
    pub fn extract(&self, text: &str) -> SchemaSnapshot {
        self.extract_in_order(text).0
    }

    /// Like [`extract`](Self::extract), also returning the table names in the
    /// order they are first defined in `text`.
    pub fn extract_in_order(&self, text: &str) -> (SchemaSnapshot, Vec<String>) {
        let mut snapshot = SchemaSnapshot::new();
        let mut order = Vec::new();

        for captures in self.pattern.captures_iter(text) {
            let (_, [table, body]) = captures.extract();
            let columns: ColumnSet = body
                .lines()
                .filter_map(column_name)
                .map(str::to_string)
                .collect();

            tracing::debug!(
                schema = %self.schema,
                table,
                columns = columns.len(),
                "found CREATE TABLE"
            );

            if snapshot.insert(table, columns).is_some() {
                tracing::debug!(table, "table defined twice, keeping the later definition");
            } else {
                order.push(table.to_string());
            }
        }

        (snapshot, order)
    }
}

/// Extract tables qualified by [`DEFAULT_SCHEMA`].
pub fn extract(text: &str) -> SchemaSnapshot {
    DEFAULT_EXTRACTOR.extract(text)
}

/// The column name declared by one line of a table body, if any.
///
/// Blank lines, `--` comments and lines starting with one of
/// [`CONSTRAINT_KEYWORDS`] (any case) declare nothing. Otherwise a single
/// trailing comma is dropped and the first whitespace-delimited token is the name.
pub fn column_name(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.starts_with(COMMENT_MARKER) {
        return None;
    }

    let line = line.strip_suffix(',').unwrap_or(line);
    let first = line.split_whitespace().next()?;

    if first == COMMENT_MARKER || is_constraint_keyword(first) {
        return None;
    }

    Some(first)
}

fn is_constraint_keyword(token: &str) -> bool {
    CONSTRAINT_KEYWORDS
        .iter()
        .any(|keyword| token.eq_ignore_ascii_case(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn columns(snapshot: &SchemaSnapshot, table: &str) -> Vec<String> {
        snapshot
            .get(table)
            .map(|cols| cols.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_extract_single_table() {
        let snapshot = extract("CREATE TABLE rsms.orders (\n id BIGINT,\n name TEXT\n);");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(columns(&snapshot, "orders"), vec!["id", "name"]);
    }

    #[test]
    fn test_extract_skips_constraint_lines() {
        let sql = "CREATE TABLE rsms.orders (
    id BIGINT,
    name TEXT,
    CONSTRAINT pk_orders PRIMARY KEY (id),
    foreign KEY (name) REFERENCES rsms.names (name),
    Unique (name),
    PRIMARY KEY (id),
    check (id > 0)
);";
        let snapshot = extract(sql);

        assert_eq!(columns(&snapshot, "orders"), vec!["id", "name"]);
    }

    #[test]
    fn test_extract_skips_comments_and_blank_lines() {
        let sql = "CREATE TABLE rsms.users (
    -- primary identifier
    user_id VARCHAR(20) NOT NULL,

    --
    email VARCHAR(100), -- trailing comments are fine
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);";
        let snapshot = extract(sql);

        assert_eq!(
            columns(&snapshot, "users"),
            vec!["created_at", "email", "user_id"]
        );
    }

    #[test]
    fn test_extract_keywords_and_schema_ignore_case() {
        let sql = "create table RSMS.roles\n(\n  role_id BIGINT,\n  role_name TEXT\n);";
        let snapshot = extract(sql);

        assert_eq!(columns(&snapshot, "roles"), vec!["role_id", "role_name"]);
    }

    #[test]
    fn test_extract_requires_schema_qualifier() {
        let sql = "CREATE TABLE orders (id BIGINT);\nCREATE TABLE public.users (\n id BIGINT\n);";
        assert!(extract(sql).is_empty());
    }

    #[test]
    fn test_extract_custom_schema() {
        let extractor = Extractor::new("app").unwrap();
        let sql = "CREATE TABLE app.items (\n sku TEXT\n);\nCREATE TABLE rsms.orders (\n id BIGINT\n);";
        let snapshot = extractor.extract(sql);

        assert_eq!(extractor.schema(), "app");
        assert_eq!(snapshot.table_names().collect::<Vec<_>>(), vec!["items"]);
    }

    #[test]
    fn test_extract_schema_is_matched_literally() {
        let extractor = Extractor::new("a.b").unwrap();
        assert!(extractor.extract("CREATE TABLE axb.t (\n id INT\n);").is_empty());
        assert_eq!(
            extractor.extract("CREATE TABLE a.b.t (\n id INT\n);").len(),
            1
        );
    }

    #[test]
    fn test_extract_multiple_tables_and_redefinition() {
        let sql = "CREATE TABLE rsms.orders (\n id BIGINT\n);
CREATE TABLE rsms.users (\n user_id BIGINT\n);
CREATE TABLE rsms.orders (\n order_id BIGINT,\n status TEXT\n);";
        let snapshot = extract(sql);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(columns(&snapshot, "orders"), vec!["order_id", "status"]);
        assert_eq!(columns(&snapshot, "users"), vec!["user_id"]);
    }

    #[test]
    fn test_extract_single_line_body() {
        let snapshot = extract("CREATE TABLE rsms.flags (enabled BOOLEAN);");
        assert_eq!(columns(&snapshot, "flags"), vec!["enabled"]);
    }

    #[test]
    fn test_extract_truncates_at_first_close_paren_semicolon() {
        // The body stops at `now();`, so `updated_at` is never seen and the
        // remainder of the statement is ignored.
        let sql = "CREATE TABLE rsms.events (
    id BIGINT,
    created_at TIMESTAMP DEFAULT now();
    updated_at TIMESTAMP
);";
        let snapshot = extract(sql);

        assert_eq!(columns(&snapshot, "events"), vec!["created_at", "id"]);
    }

    #[test]
    fn test_extract_table_name_is_ascii_only() {
        assert!(extract("CREATE TABLE rsms.\u{212A}ey (\n id INT\n);").is_empty());
        assert!(extract("CREATE TABLE rsms.\u{17F}eq (\n id INT\n);").is_empty());

        let snapshot = extract("CREATE TABLE rsms.Key (\n id INT\n);");
        assert_eq!(snapshot.table_names().collect::<Vec<_>>(), vec!["Key"]);
    }

    #[test]
    fn test_extract_in_order_keeps_first_definition_position() {
        let sql = "CREATE TABLE rsms.users (\n user_id BIGINT\n);
CREATE TABLE rsms.orders (\n id BIGINT\n);
CREATE TABLE rsms.users (\n login_id TEXT\n);
CREATE TABLE rsms.audit_log (\n log_id BIGINT\n);";
        let (snapshot, order) = Extractor::new(DEFAULT_SCHEMA).unwrap().extract_in_order(sql);

        assert_eq!(order, vec!["users", "orders", "audit_log"]);
        assert_eq!(columns(&snapshot, "users"), vec!["login_id"]);
    }

    #[test]
    fn test_extract_no_matches() {
        assert!(extract("").is_empty());
        assert!(extract("SELECT 1;\nCREATE INDEX idx ON rsms.orders (id);").is_empty());
    }

    #[test]
    fn test_extract_crlf_line_endings() {
        let snapshot = extract("CREATE TABLE rsms.orders (\r\n id BIGINT,\r\n name TEXT\r\n);");
        assert_eq!(columns(&snapshot, "orders"), vec!["id", "name"]);
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name("  id BIGINT NOT NULL,"), Some("id"));
        assert_eq!(column_name("name,"), Some("name"));
        assert_eq!(column_name("\tamount NUMERIC(10, 2)"), Some("amount"));
        assert_eq!(column_name(""), None);
        assert_eq!(column_name("   "), None);
        assert_eq!(column_name(","), None);
        assert_eq!(column_name("-- comment"), None);
        assert_eq!(column_name("--"), None);
        assert_eq!(column_name("CONSTRAINT pk PRIMARY KEY (id),"), None);
        assert_eq!(column_name("Check (x > 0)"), None);
        assert_eq!(column_name("CHECK,"), None);
    }

    #[test]
    fn test_column_name_keyword_must_be_whole_token() {
        assert_eq!(column_name("constraint_name VARCHAR(50),"), Some("constraint_name"));
        assert_eq!(column_name("primary_flag BOOLEAN"), Some("primary_flag"));
        assert_eq!(column_name("unique_code TEXT,"), Some("unique_code"));
    }

    #[test]
    fn test_extractor_accepts_any_schema_text() {
        assert!(Extractor::new("weird(schema)*").is_ok());
        assert!(Extractor::new("").is_ok());
    }

    fn column_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z][a-z0-9_]{0,8}".prop_map(|name| format!("{name} TEXT,")),
            "[a-z][a-z0-9_]{0,8}".prop_map(|name| format!("  {name} BIGINT NOT NULL")),
            "[a-z ]{0,12}".prop_map(|text| format!("-- {text}")),
            prop::sample::select(CONSTRAINT_KEYWORDS.to_vec())
                .prop_map(|kw| format!("{} something (id),", kw.to_lowercase())),
            Just(String::new()),
        ]
    }

    fn table_sql() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9_]{0,8}", prop::collection::vec(column_line(), 0..12)).prop_map(
            |(table, lines)| format!("CREATE TABLE rsms.{table} (\n{}\n);", lines.join("\n")),
        )
    }

    proptest! {
        #[test]
        fn prop_extract_is_idempotent(
            tables in prop::collection::vec(table_sql(), 0..5)
        ) {
            let sql = tables.join("\n\n");
            prop_assert_eq!(extract(&sql), extract(&sql));
        }

        #[test]
        fn prop_columns_sorted_and_unique(
            tables in prop::collection::vec(table_sql(), 0..5)
        ) {
            let sql = tables.join("\n\n");
            for (_, cols) in &extract(&sql) {
                let listed: Vec<&String> = cols.iter().collect();
                prop_assert!(listed.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }

        #[test]
        fn prop_constraint_and_comment_lines_contribute_nothing(
            table in table_sql()
        ) {
            let snapshot = extract(&table);
            for (_, cols) in &snapshot {
                for col in cols {
                    prop_assert!(!col.starts_with("--"));
                    prop_assert!(!CONSTRAINT_KEYWORDS
                        .iter()
                        .any(|kw| col.eq_ignore_ascii_case(kw)));
                }
            }
        }
    }
}
