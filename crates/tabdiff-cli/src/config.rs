//! Configuration file handling for tabdiff.
//!
//! Looks for `.config/tabdiff.styx` in the current directory or any parent directory.

pub use tabdiff_config::Config;

use camino::{Utf8Path, Utf8PathBuf};

const CONFIG_FILE: &str = ".config/tabdiff.styx";

/// A parsed config file and the project root its relative paths resolve against.
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    pub path: Utf8PathBuf,
    pub root: Utf8PathBuf,
}

impl Loaded {
    /// Resolve a path from the config file against the project root.
    pub fn resolve(&self, path: &str) -> Utf8PathBuf {
        resolve(&self.root, path)
    }
}

/// Load `.config/tabdiff.styx`, searching up from the current directory.
///
/// A missing file is not an error: `Ok(None)` means "no config".
pub fn discover() -> Result<Option<Loaded>, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(e.to_string()))?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| ConfigError::Io(format!("non UTF-8 working directory: {}", p.display())))?;

    match find_config_file(&cwd) {
        Some(path) => load_from(&path).map(Some),
        None => Ok(None),
    }
}

/// Load a specific config file.
///
/// The project root is the parent of its `.config` directory when it lives in
/// one, otherwise the directory containing the file.
pub fn load_from(path: &Utf8Path) -> Result<Loaded, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{path}: {e}")))?;

    let config: Config =
        facet_styx::from_str(&content).map_err(|e| ConfigError::Parse(format!("{path}: {e}")))?;

    tracing::debug!(%path, "loaded config");

    Ok(Loaded {
        config,
        path: path.to_owned(),
        root: project_root(path),
    })
}

/// Find `.config/tabdiff.styx` by searching up the directory tree.
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.exists())
}

fn project_root(config_path: &Utf8Path) -> Utf8PathBuf {
    let dir = config_path.parent().unwrap_or(Utf8Path::new("."));
    match dir.file_name() {
        Some(".config") => dir.parent().unwrap_or(dir).to_owned(),
        _ => dir.to_owned(),
    }
}

fn resolve(root: &Utf8Path, path: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(path);
    if path.is_absolute() {
        path.to_owned()
    } else {
        root.join(path)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading the file
    Io(String),
    /// Parse error in the Styx file
    Parse(String),
    /// A required setting was given neither on the command line nor in the file
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Missing(what) => write!(
                f,
                "No {} given: pass it on the command line or set it in {}",
                what, CONFIG_FILE
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
