use std::path::PathBuf;

use thiserror::Error;

use crate::version::RuntimeVersion;

/// Exit status when no candidate runtime is recent enough.
pub const NO_RUNTIME_EXIT_CODE: i32 = 83;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(
        "no Java runtime {minimum} or newer was found; set JARUP_JAVA_HOME_OVERRIDE to the home of a suitable runtime"
    )]
    NoRuntime { minimum: RuntimeVersion },
    #[error("cannot tell the main jar of {}; pass --main-jar", .app_dir.display())]
    UnknownMainJar { app_dir: PathBuf },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start {}: {source}", .program.display())]
    Exec {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    #[must_use]
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    /// Process exit status matching this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoRuntime { .. } => NO_RUNTIME_EXIT_CODE,
            Self::UnknownMainJar { .. } | Self::Io { .. } | Self::Exec { .. } => 1,
        }
    }
}
