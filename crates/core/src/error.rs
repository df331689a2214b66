use std::path::PathBuf;

/// Failure to enumerate the migrations root.
///
/// Callers treat this as "no files found" rather than aborting.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Migrations directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
