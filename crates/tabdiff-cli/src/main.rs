use camino::{Utf8Path, Utf8PathBuf};
use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use tabdiff::check::{self, CheckInput};
use tabdiff::{DEFAULT_SCHEMA, Extractor, SchemaSnapshot};
use tracing_subscriber::EnvFilter;

mod config;
mod report;

use config::{ConfigError, Loaded};
use report::TextOptions;

/// Every table matched.
const EXIT_OK: i32 = 0;
/// At least one table differs.
const EXIT_DIFFERENCES: i32 = 1;
/// I/O, configuration or usage error.
const EXIT_ERROR: i32 = 2;

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "tabdiff=warn";

/// Compare CREATE TABLE column sets between SQL scripts and a migration.
#[derive(Facet, Debug)]
struct Cli {
    /// Show version information
    #[facet(args::named, args::short = 'V')]
    version: bool,

    /// Command to run
    #[facet(default, args::subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Facet, Debug)]
#[repr(u8)]
enum Commands {
    /// Compare original scripts against a migration file
    Check {
        /// Config file (default: .config/tabdiff.styx in this or a parent directory)
        #[facet(default, args::named)]
        config: Option<String>,

        /// Schema qualifier of the CREATE TABLE statements
        #[facet(default, args::named)]
        schema: Option<String>,

        /// Migration file expected to match the originals
        #[facet(default, args::named)]
        migration: Option<String>,

        /// Print the result as JSON
        #[facet(args::named)]
        json: bool,

        /// Also list columns shared by mismatched tables
        #[facet(args::named)]
        show_common: bool,

        /// Disable colored output
        #[facet(args::named)]
        no_color: bool,

        /// Original SQL scripts, merged in order
        #[facet(default, args::positional)]
        originals: Vec<String>,
    },
    /// Print the tables and columns found in SQL files
    Extract {
        /// Schema qualifier of the CREATE TABLE statements
        #[facet(default, args::named)]
        schema: Option<String>,

        /// Print the result as JSON
        #[facet(args::named)]
        json: bool,

        /// SQL files, merged in order
        #[facet(default, args::positional)]
        files: Vec<String>,
    },
}

/// Command-line values for `check`, before layering over the config file.
#[derive(Debug, Default)]
struct CheckArgs {
    schema: Option<String>,
    migration: Option<String>,
    show_common: bool,
    originals: Vec<String>,
}

/// One table of `extract --json` output.
#[derive(Facet, Debug)]
struct ExtractedTable {
    table: String,
    columns: Vec<String>,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args_ref: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let result: Result<Cli, _> = args::from_slice(&args_ref);

    match result {
        Ok(cli) => {
            init_tracing();
            std::process::exit(run(cli));
        }
        Err(err) if err.is_help_request() => {
            print!("{}", err.help_text().unwrap_or(""));
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(EXIT_ERROR);
        }
    }
}

/// Logs go to stderr so stdout only carries the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> i32 {
    if cli.version {
        println!("tabdiff {}", env!("CARGO_PKG_VERSION"));
        return EXIT_OK;
    }

    match cli.command {
        Some(Commands::Check {
            config,
            schema,
            migration,
            json,
            show_common,
            no_color,
            originals,
        }) => {
            let stderr_color = use_color(no_color, std::io::stderr().is_terminal());

            let loaded = match load_config(config.as_deref()) {
                Ok(loaded) => loaded,
                Err(e) => return fail(&e, stderr_color),
            };

            let check_args = CheckArgs {
                schema,
                migration,
                show_common,
                originals,
            };

            let (input, show_common) = match resolve_check(check_args, loaded.as_ref()) {
                Ok(resolved) => resolved,
                Err(e) => return fail(&e, stderr_color),
            };

            let options = TextOptions {
                color: use_color(no_color, std::io::stdout().is_terminal()),
                show_common,
            };
            run_check(&input, json, options, stderr_color)
        }
        Some(Commands::Extract {
            schema,
            json,
            files,
        }) => run_extract(
            schema.as_deref().unwrap_or(DEFAULT_SCHEMA),
            &files,
            json,
            use_color(false, std::io::stderr().is_terminal()),
        ),
        None => {
            let config = args::HelpConfig {
                program_name: Some("tabdiff".to_string()),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
                ..Default::default()
            };
            print!("{}", args::generate_help::<Cli>(&config));
            EXIT_OK
        }
    }
}

fn load_config(explicit: Option<&str>) -> Result<Option<Loaded>, ConfigError> {
    let loaded = match explicit {
        Some(path) => Some(config::load_from(Utf8Path::new(path))?),
        None => config::discover()?,
    };

    if let Some(l) = &loaded {
        tracing::info!(config = %l.path, root = %l.root, "using config file");
    }

    Ok(loaded)
}

/// Layer command-line values over the config file.
///
/// Command-line originals replace the configured list rather than extending it.
/// Paths given on the command line are used as-is; paths from the file resolve
/// against the project root.
fn resolve_check(
    args: CheckArgs,
    loaded: Option<&Loaded>,
) -> Result<(CheckInput, bool), ConfigError> {
    let file = loaded.map(|l| &l.config);

    let schema = args
        .schema
        .or_else(|| file.and_then(|c| c.schema.clone()))
        .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

    let migration = match (args.migration, loaded) {
        (Some(path), _) => Utf8PathBuf::from(path),
        (None, Some(l)) => match &l.config.migration {
            Some(path) => l.resolve(path),
            None => return Err(ConfigError::Missing("migration file")),
        },
        (None, None) => return Err(ConfigError::Missing("migration file")),
    };

    let originals: Vec<Utf8PathBuf> = if !args.originals.is_empty() {
        args.originals.into_iter().map(Utf8PathBuf::from).collect()
    } else if let Some(l) = loaded {
        l.config.originals.iter().map(|p| l.resolve(p)).collect()
    } else {
        Vec::new()
    };

    if originals.is_empty() {
        return Err(ConfigError::Missing("original files"));
    }

    let show_common = args.show_common || file.and_then(|c| c.show_common).unwrap_or(false);

    Ok((
        CheckInput::new(originals, migration).with_schema(schema),
        show_common,
    ))
}

/// `stderr_color` only affects the error prefix; `options.color` styles the report.
fn run_check(input: &CheckInput, json: bool, options: TextOptions, stderr_color: bool) -> i32 {
    let outcome = match check::run(input) {
        Ok(outcome) => outcome,
        Err(e) => return fail(&e, stderr_color),
    };

    if json {
        match render_json(&outcome) {
            Ok(text) => println!("{}", text),
            Err(e) => return fail(&e, stderr_color),
        }
    } else {
        print!("{}", report::render_check(&outcome, options));
    }

    if outcome.any_differences_found() {
        EXIT_DIFFERENCES
    } else {
        EXIT_OK
    }
}

fn run_extract(schema: &str, files: &[String], json: bool, stderr_color: bool) -> i32 {
    if files.is_empty() {
        return fail(&ConfigError::Missing("SQL files"), stderr_color);
    }

    let paths: Vec<Utf8PathBuf> = files.iter().map(Utf8PathBuf::from).collect();
    let snapshot = match Extractor::new(schema).and_then(|e| check::read_snapshot(&e, &paths)) {
        Ok(snapshot) => snapshot,
        Err(e) => return fail(&e, stderr_color),
    };

    if json {
        match render_json(&extracted_tables(&snapshot)) {
            Ok(text) => println!("{}", text),
            Err(e) => return fail(&e, stderr_color),
        }
    } else {
        print!("{}", report::render_snapshot(&snapshot));
    }

    EXIT_OK
}

fn extracted_tables(snapshot: &SchemaSnapshot) -> Vec<ExtractedTable> {
    snapshot
        .iter()
        .map(|(table, columns)| ExtractedTable {
            table: table.clone(),
            columns: columns.iter().cloned().collect(),
        })
        .collect()
}

fn render_json<'f, T: Facet<'f>>(value: &T) -> Result<String, String> {
    facet_json::to_string_pretty(value).map_err(|e| e.to_string())
}

/// Color is allowed unless disabled by flag or `NO_COLOR`, and only on a terminal.
fn use_color(no_color: bool, is_terminal: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && is_terminal
}

fn error_prefix(color: bool) -> String {
    if color {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

/// Report `err` on stderr and return the error exit code.
fn fail(err: &dyn std::fmt::Display, color: bool) -> i32 {
    tracing::debug!(error = %err, "exiting with error");
    eprintln!("{} {}", error_prefix(color), err);
    EXIT_ERROR
}
