use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{context} failed with HTTP {status} for {url}")]
    HttpStatus {
        context: &'static str,
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("{context}: {source}")]
    Zip {
        context: &'static str,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("invalid version pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("no version found on {url}")]
    PatternMismatch { url: String },
    #[error("archive has no top-level directory '{expected}'")]
    MissingVersionedRoot { expected: String },
    #[error("archive directory '{root}' contains no .{extension} files")]
    NoApplicationFiles { root: String, extension: String },
    #[error("archive is missing icon '{source_path}'")]
    MissingIcon { source_path: String },
    #[error("checksum mismatch for {file_name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file_name: String,
        expected: String,
        actual: String,
    },
    #[error("{0}")]
    Config(String),
}

impl InstallError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn http(context: &'static str, source: reqwest::Error) -> Self {
        Self::Http { context, source }
    }

    pub(crate) fn zip(context: &'static str, source: zip::result::ZipError) -> Self {
        Self::Zip { context, source }
    }

    pub(crate) fn io_with_path(context: &'static str, path: &Path, source: &std::io::Error) -> Self {
        Self::io(
            context,
            std::io::Error::new(source.kind(), format!("{}: {source}", path.display())),
        )
    }
}

/// One target that [`crate::remove_installation`] could not delete.
#[derive(Debug)]
pub struct RemoveFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum RemoveError {
    #[error("purge requested but no configuration directory is set")]
    ConfigDirUnset,
    #[error("failed to remove {}", describe_failures(.0))]
    Failed(Vec<RemoveFailure>),
}

fn describe_failures(failures: &[RemoveFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("{} ({})", failure.path.display(), failure.source))
        .collect::<Vec<_>>()
        .join(", ")
}
