//! Locates a Java runtime for an installed application and starts it.

mod cache;
mod candidates;
mod discovery;
mod error;
mod launch;
mod version;

pub use cache::RuntimeCache;
pub use candidates::{Candidate, CandidateSearch, CandidateSource, OVERRIDE_ENV};
pub use discovery::{CommandProbe, RuntimeProbe, SelectedRuntime, discover, java_executable};
pub use error::{LaunchError, NO_RUNTIME_EXIT_CODE};
pub use launch::{build_command, default_main_jar, run, split_runtime_options};
pub use version::{MINIMUM_RUNTIME, RuntimeInfo, RuntimeVersion, parse_version_output};
