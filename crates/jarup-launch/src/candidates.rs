use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

pub const OVERRIDE_ENV: &str = "JARUP_JAVA_HOME_OVERRIDE";
const HOME_ENV_VARS: [&str; 3] = ["JAVA_HOME", "JDK_HOME", "JRE_HOME"];
const PREFERRED_FILE: &str = "pref_runtime.cfg";
const FALLBACK_FILE: &str = "inst_runtime.cfg";

/// Where a candidate runtime home came from, in search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Override,
    Preferred,
    Bundled,
    SearchPath,
    Conventional,
    Environment,
    Fallback,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Override => OVERRIDE_ENV,
            Self::Preferred => PREFERRED_FILE,
            Self::Bundled => "bundled runtime",
            Self::SearchPath => "PATH",
            Self::Conventional => "install location",
            Self::Environment => "environment",
            Self::Fallback => FALLBACK_FILE,
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub home: PathBuf,
    pub source: CandidateSource,
}

/// Builds the ordered list of runtime homes worth probing for one
/// application directory.
#[derive(Debug, Clone)]
pub struct CandidateSearch {
    app_dir: PathBuf,
    home_dir: Option<PathBuf>,
    system_root: PathBuf,
}

impl CandidateSearch {
    #[must_use]
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            home_dir: dirs::home_dir(),
            system_root: PathBuf::from("/"),
        }
    }

    #[must_use]
    pub fn home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    /// Prefix for the conventional system install locations.
    #[must_use]
    pub fn system_root(mut self, system_root: impl Into<PathBuf>) -> Self {
        self.system_root = system_root.into();
        self
    }

    /// Candidates in priority order with duplicates removed.
    ///
    /// `env` looks up environment variables; empty values count as unset.
    pub fn collect(&self, env: impl Fn(&str) -> Option<String>) -> Vec<Candidate> {
        let env = |name: &str| env(name).filter(|value| !value.trim().is_empty());
        let mut found = Vec::new();

        if let Some(home) = env(OVERRIDE_ENV) {
            found.push((PathBuf::from(home), CandidateSource::Override));
        }
        if let Some(home) = self.read_runtime_file(PREFERRED_FILE) {
            found.push((home, CandidateSource::Preferred));
        }
        found.push((self.app_dir.join("jre"), CandidateSource::Bundled));
        found.extend(
            search_path_homes(env("PATH"), &self.app_dir)
                .into_iter()
                .map(|home| (home, CandidateSource::SearchPath)),
        );
        found.extend(
            self.conventional_homes()
                .into_iter()
                .map(|home| (home, CandidateSource::Conventional)),
        );
        found.extend(
            HOME_ENV_VARS
                .iter()
                .filter_map(|name| env(name))
                .map(|home| (PathBuf::from(home), CandidateSource::Environment)),
        );
        if let Some(home) = self.read_runtime_file(FALLBACK_FILE) {
            found.push((home, CandidateSource::Fallback));
        }

        dedupe(found)
    }

    fn read_runtime_file(&self, file_name: &str) -> Option<PathBuf> {
        let path = self.app_dir.join(".jarup").join(file_name);
        let content = std::fs::read_to_string(&path).ok()?;
        let line = content.lines().map(str::trim).find(|line| !line.is_empty())?;
        debug!("{} names runtime {line}", path.display());
        Some(PathBuf::from(line))
    }

    fn conventional_homes(&self) -> Vec<PathBuf> {
        let root = &self.system_root;
        let mut homes = Vec::new();

        for parent in ["usr/lib/jvm", "usr/java", "opt/java"] {
            homes.extend(child_dirs(&root.join(parent), |_| true));
        }
        homes.extend(child_dirs(&root.join("opt"), |name| name.starts_with("jdk")));
        if let Some(home_dir) = &self.home_dir {
            homes.extend(child_dirs(&home_dir.join(".jdks"), |_| true));
        }
        homes.push(root.join("usr/local/java"));

        #[cfg(target_os = "macos")]
        {
            homes.extend(
                child_dirs(&root.join("Library/Java/JavaVirtualMachines"), |_| true)
                    .into_iter()
                    .map(|bundle| bundle.join("Contents").join("Home")),
            );
        }

        homes
    }
}

/// Homes of every `java` on the search path, following symlinks to the
/// real installation.
fn search_path_homes(path_var: Option<String>, cwd: &Path) -> Vec<PathBuf> {
    let Ok(executables) = which::which_in_all("java", path_var.map(OsString::from), cwd) else {
        return Vec::new();
    };

    executables
        .filter_map(|java| {
            let resolved = std::fs::canonicalize(&java).unwrap_or(java);
            let bin = resolved.parent()?;
            Some(bin.parent()?.to_path_buf())
        })
        .collect()
}

fn child_dirs(parent: &Path, keep: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_name().to_str().is_some_and(&keep))
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn dedupe(found: Vec<(PathBuf, CandidateSource)>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|(home, _)| {
            let key = std::fs::canonicalize(home).unwrap_or_else(|_| home.clone());
            seen.insert(key)
        })
        .map(|(home, source)| Candidate { home, source })
        .collect()
}
