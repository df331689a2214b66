//! Migration file discovery and ordering.
//!
//! Candidates are the `*.sql` files directly under the migrations root plus
//! those one directory level below it. Each file gets a version label from
//! its directory and a [`SortKey`] that fixes the execution order:
//!
//! 1. the bootstrap file (`complete_setup.sql` at the root),
//! 2. files in the primary version directory (`0.1.0/`),
//! 3. everything else by parent directory, then file name.
//!
//! The full path is the final tie-break, so the result never depends on
//! the order in which the filesystem returns directory entries.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::DiscoveryError;
use crate::types::BASE_VERSION;

/// Schema bootstrap script, always executed first.
pub const BOOTSTRAP_FILE: &str = "complete_setup.sql";

/// Destructive reset script, only run by an explicit fresh install.
pub const RESET_FILE: &str = "RESET_DB.sql";

/// Scripts that are never picked up by a normal run.
pub const UTILITY_FILES: &[&str] = &[RESET_FILE, "backup_database.sql"];

/// Version directory whose files run straight after the bootstrap file.
pub const PRIMARY_VERSION_DIR: &str = "0.1.0";

static VERSION_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"));

/// Coarse ordering bucket of a migration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Bootstrap,
    PrimaryVersion,
    Remaining,
}

/// Total ordering key for a migration file.
///
/// Field order matters: the derived `Ord` compares phase, then parent
/// directory (empty for root-level files), then name, then the full path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub phase: Phase,
    pub parent: String,
    pub name: String,
    pub path: PathBuf,
}

/// A migration candidate found on disk. Recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub path: PathBuf,
    /// File name, the second half of the tracking key.
    pub name: String,
    /// Version label, the first half of the tracking key.
    pub version: String,
    pub sort_key: SortKey,
    pub is_utility: bool,
}

impl MigrationFile {
    /// Build a candidate from a path under `root`.
    ///
    /// Returns `None` for paths outside `root` or without a UTF-8 file name.
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let name = relative.file_name()?.to_str()?.to_string();
        let parent = relative
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let phase = if parent.is_empty() && name == BOOTSTRAP_FILE {
            Phase::Bootstrap
        } else if parent == PRIMARY_VERSION_DIR {
            Phase::PrimaryVersion
        } else {
            Phase::Remaining
        };

        Some(Self {
            path: path.to_path_buf(),
            version: derive_version(relative),
            is_utility: is_utility(&name),
            sort_key: SortKey {
                phase,
                parent,
                name: name.clone(),
                path: path.to_path_buf(),
            },
            name,
        })
    }

    /// Whether this is the destructive reset script.
    pub fn is_reset(&self) -> bool {
        self.name == RESET_FILE
    }
}

/// Whether `name` is one of the utility scripts excluded from normal runs.
pub fn is_utility(name: &str) -> bool {
    UTILITY_FILES.contains(&name)
}

/// Version label for a path relative to the migrations root.
///
/// Uses the nearest ancestor directory whose name looks like `X.Y.Z`;
/// anything else is labelled [`BASE_VERSION`].
pub fn derive_version(relative: &Path) -> String {
    relative
        .parent()
        .into_iter()
        .flat_map(|dir| dir.ancestors())
        .filter_map(|dir| dir.file_name()?.to_str())
        .find(|name| VERSION_DIR_RE.is_match(name))
        .map_or_else(|| BASE_VERSION.to_string(), str::to_string)
}

/// Enumerate and order the migration files under `root`.
///
/// Utility scripts are only included when `fresh` is set, and the reset
/// script is never included: a fresh install runs it separately before the
/// tracking table exists.
pub fn discover(root: &Path, fresh: bool) -> Result<Vec<MigrationFile>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in read_dir(root)? {
        if entry.is_dir() {
            paths.extend(read_dir(&entry)?.into_iter().filter(|p| is_sql_file(p)));
        } else if is_sql_file(&entry) {
            paths.push(entry);
        }
    }

    let mut files: Vec<MigrationFile> = paths
        .iter()
        .filter_map(|path| MigrationFile::from_path(root, path))
        .filter(|file| !file.is_reset())
        .filter(|file| fresh || !file.is_utility)
        .collect();

    files.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

    tracing::debug!(root = %root.display(), count = files.len(), fresh, "Discovered migration files");
    Ok(files)
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let io_err = |source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(io_err))
        .collect()
}

fn is_sql_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}
