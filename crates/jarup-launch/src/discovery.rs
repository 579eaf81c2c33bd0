use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jarup_platform::QuietCommand;
use log::{debug, info, warn};
use tokio::process::Command;

use crate::cache::RuntimeCache;
use crate::candidates::{Candidate, CandidateSource};
use crate::error::LaunchError;
use crate::version::{RuntimeInfo, RuntimeVersion, parse_version_output};

/// Finds out which runtime version a `java` executable is.
#[async_trait]
pub trait RuntimeProbe: Send + Sync {
    async fn probe(&self, java: &Path) -> Option<RuntimeInfo>;
}

/// Runs `java -version` and parses its banner.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandProbe;

#[async_trait]
impl RuntimeProbe for CommandProbe {
    async fn probe(&self, java: &Path) -> Option<RuntimeInfo> {
        let output = Command::new(java)
            .arg("-version")
            .quiet()
            .output()
            .await
            .ok()?;

        let mut banner = String::from_utf8_lossy(&output.stdout).into_owned();
        banner.push_str(&String::from_utf8_lossy(&output.stderr));
        parse_version_output(&banner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRuntime {
    pub home: PathBuf,
    pub java: PathBuf,
    pub info: RuntimeInfo,
    pub source: CandidateSource,
}

#[must_use]
pub fn java_executable(home: &Path) -> PathBuf {
    let name = if cfg!(windows) { "java.exe" } else { "java" };
    home.join("bin").join(name)
}

/// Pick the first candidate whose runtime is at least `minimum`.
///
/// Cached results are trusted, so a cached entry below the minimum is skipped
/// without running `java` again. Only when nothing qualifies and a cached
/// entry was among the rejects is the cache reset and every candidate checked
/// once more.
///
/// # Errors
/// Returns [`LaunchError::NoRuntime`] when no candidate qualifies.
pub async fn discover(
    candidates: &[Candidate],
    mut cache: Option<&mut RuntimeCache>,
    probe: &dyn RuntimeProbe,
    minimum: RuntimeVersion,
) -> Result<SelectedRuntime, LaunchError> {
    let rejected_cached =
        match select(candidates, cache.as_deref_mut(), true, probe, minimum).await {
            Pass::Selected(selected) => return Ok(selected),
            Pass::Exhausted { rejected_cached } => rejected_cached,
        };

    if rejected_cached && let Some(cache) = cache.as_deref_mut() {
        info!("No cached runtime qualifies, checking candidates again");
        if let Err(error) = cache.reset() {
            warn!("Failed to reset {}: {error}", cache.path().display());
        }
        if let Pass::Selected(selected) =
            select(candidates, Some(cache), false, probe, minimum).await
        {
            return Ok(selected);
        }
    }

    Err(LaunchError::NoRuntime { minimum })
}

enum Pass {
    Selected(SelectedRuntime),
    Exhausted { rejected_cached: bool },
}

/// One walk over the candidates. With `use_cached` off every candidate runs
/// `java -version`; results are still recorded.
async fn select(
    candidates: &[Candidate],
    mut cache: Option<&mut RuntimeCache>,
    use_cached: bool,
    probe: &dyn RuntimeProbe,
    minimum: RuntimeVersion,
) -> Pass {
    let mut rejected_cached = false;

    for candidate in candidates {
        let java = java_executable(&candidate.home);
        if !java.is_file() {
            debug!(
                "Skipping {} ({}): no {}",
                candidate.home.display(),
                candidate.source,
                java.display()
            );
            continue;
        }

        let cached = if use_cached {
            cache
                .as_deref()
                .and_then(|cache| cache.get(&candidate.home))
        } else {
            None
        };

        let info = match cached {
            Some(info) => info,
            None => {
                let Some(probed) = probe.probe(&java).await else {
                    debug!("{} did not report a version", java.display());
                    continue;
                };
                if let Some(cache) = cache.as_deref_mut()
                    && let Err(error) = cache.record(&candidate.home, probed)
                {
                    warn!("Failed to update {}: {error}", cache.path().display());
                }
                probed
            }
        };

        if info.version.satisfies(&minimum) {
            info!(
                "Using runtime {} at {} ({})",
                info.version,
                candidate.home.display(),
                candidate.source
            );
            return Pass::Selected(SelectedRuntime {
                home: candidate.home.clone(),
                java,
                info,
                source: candidate.source,
            });
        }

        rejected_cached |= cached.is_some();
        debug!(
            "Runtime {} at {} is older than {minimum}",
            info.version,
            candidate.home.display()
        );
    }

    Pass::Exhausted { rejected_cached }
}
