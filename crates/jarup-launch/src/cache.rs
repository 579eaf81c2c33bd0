//! Probe results of previously tested runtimes.
//!
//! The cache is a flat tab-separated file; each runtime takes two lines:
//!
//! ```text
//! JRE_VERSION	/usr/lib/jvm/java-17	17	0	9	0
//! JRE_INFO	/usr/lib/jvm/java-17	1
//! ```

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::debug;

use crate::version::{RuntimeInfo, RuntimeVersion};

const VERSION_TAG: &str = "JRE_VERSION";
const INFO_TAG: &str = "JRE_INFO";

#[derive(Debug, Clone)]
pub struct RuntimeCache {
    path: PathBuf,
    entries: Vec<(PathBuf, RuntimeInfo)>,
}

impl RuntimeCache {
    /// `~/.jarup/runtimes`, or a file in the temp directory when there is no
    /// home directory.
    #[must_use]
    pub fn default_location(home: Option<&Path>) -> PathBuf {
        match home {
            Some(home) => home.join(".jarup").join("runtimes"),
            None => std::env::temp_dir().join(".jarup-runtimes"),
        }
    }

    /// Read the cache at `path`; a missing or unreadable file is an empty
    /// cache.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .map(|content| parse_entries(&content))
            .unwrap_or_default();
        Self { path, entries }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, home: &Path) -> Option<RuntimeInfo> {
        self.entries
            .iter()
            .find(|(path, _)| path == home)
            .map(|(_, info)| *info)
    }

    /// Store the probe result for `home`, replacing any previous entry.
    ///
    /// The file is re-read under an exclusive lock so entries written by a
    /// concurrent launcher are kept.
    ///
    /// # Errors
    /// Returns an error if the cache file cannot be created, locked or
    /// written.
    pub fn record(&mut self, home: &Path, info: RuntimeInfo) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let mut entries: Vec<(PathBuf, RuntimeInfo)> = parse_entries(&content)
            .into_iter()
            .filter(|(path, _)| path != home)
            .collect();
        entries.push((home.to_path_buf(), info));

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialize_entries(&entries).as_bytes())?;
        file.flush()?;
        file.unlock()?;

        debug!("Cached runtime {} as {}", home.display(), info.version);
        self.entries = entries;
        Ok(())
    }

    /// Drop every cached entry by recreating the file empty.
    ///
    /// # Errors
    /// Returns an error if the file cannot be deleted or recreated.
    pub fn reset(&mut self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => return Err(error),
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(&self.path)?;
        self.entries.clear();
        debug!("Reset runtime cache {}", self.path.display());
        Ok(())
    }
}

fn parse_entries(content: &str) -> Vec<(PathBuf, RuntimeInfo)> {
    let mut entries: Vec<(PathBuf, RuntimeInfo)> = Vec::new();
    let mut flags: Vec<(PathBuf, bool)> = Vec::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.as_slice() {
            [VERSION_TAG, path, major, minor, micro, patch] => {
                if let Some(version) = parse_version_fields([major, minor, micro, patch]) {
                    let path = PathBuf::from(path);
                    entries.retain(|(existing, _)| *existing != path);
                    entries.push((
                        path,
                        RuntimeInfo {
                            version,
                            is_openjdk: false,
                        },
                    ));
                }
            }
            [INFO_TAG, path, flag] => flags.push((PathBuf::from(path), *flag == "1")),
            _ => {}
        }
    }

    for (path, is_openjdk) in flags {
        if let Some((_, info)) = entries.iter_mut().find(|(existing, _)| *existing == path) {
            info.is_openjdk = is_openjdk;
        }
    }
    entries
}

fn parse_version_fields(fields: [&str; 4]) -> Option<RuntimeVersion> {
    let [major, minor, micro, patch] = fields;
    Some(RuntimeVersion::new(
        major.parse().ok()?,
        minor.parse().ok()?,
        micro.parse().ok()?,
        patch.parse().ok()?,
    ))
}

fn serialize_entries(entries: &[(PathBuf, RuntimeInfo)]) -> String {
    let mut out = String::new();
    for (path, info) in entries {
        let path = path.display();
        let RuntimeVersion {
            major,
            minor,
            micro,
            patch,
        } = info.version;
        out.push_str(&format!(
            "{VERSION_TAG}\t{path}\t{major}\t{minor}\t{micro}\t{patch}\n"
        ));
        out.push_str(&format!(
            "{INFO_TAG}\t{path}\t{}\n",
            u8::from(info.is_openjdk)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::RuntimeCache;
    use crate::version::{RuntimeInfo, RuntimeVersion};

    fn info(major: u32, minor: u32, micro: u32, patch: u32, is_openjdk: bool) -> RuntimeInfo {
        RuntimeInfo {
            version: RuntimeVersion::new(major, minor, micro, patch),
            is_openjdk,
        }
    }

    #[test]
    fn record_persists_two_lines_per_runtime() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join(".jarup").join("runtimes");
        let mut cache = RuntimeCache::load(&path);

        cache
            .record(Path::new("/usr/lib/jvm/java-17"), info(17, 0, 9, 0, true))
            .expect("entry should be recorded");

        let content = std::fs::read_to_string(&path).expect("cache file should exist");
        assert_eq!(
            content,
            "JRE_VERSION\t/usr/lib/jvm/java-17\t17\t0\t9\t0\nJRE_INFO\t/usr/lib/jvm/java-17\t1\n"
        );
    }

    #[test]
    fn load_reads_back_recorded_entries() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("runtimes");
        let mut cache = RuntimeCache::load(&path);
        cache
            .record(Path::new("/opt/jdk8"), info(1, 8, 0, 292, false))
            .expect("first entry recorded");
        cache
            .record(Path::new("/opt/jdk17"), info(17, 0, 2, 0, true))
            .expect("second entry recorded");

        let reloaded = RuntimeCache::load(&path);

        assert_eq!(
            reloaded.get(Path::new("/opt/jdk8")),
            Some(info(1, 8, 0, 292, false))
        );
        assert_eq!(
            reloaded.get(Path::new("/opt/jdk17")),
            Some(info(17, 0, 2, 0, true))
        );
        assert!(reloaded.get(Path::new("/opt/other")).is_none());
    }

    #[test]
    fn record_replaces_previous_entry_for_same_path() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("runtimes");
        let mut cache = RuntimeCache::load(&path);
        cache
            .record(Path::new("/opt/jdk"), info(1, 4, 2, 0, false))
            .expect("old entry recorded");
        cache
            .record(Path::new("/opt/jdk"), info(1, 6, 0, 45, false))
            .expect("new entry recorded");

        let content = std::fs::read_to_string(&path).expect("cache file should exist");
        assert_eq!(content.lines().count(), 2);
        assert_eq!(
            RuntimeCache::load(&path).get(Path::new("/opt/jdk")),
            Some(info(1, 6, 0, 45, false))
        );
    }

    #[test]
    fn record_keeps_entries_written_by_other_processes() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("runtimes");
        let mut first = RuntimeCache::load(&path);
        let mut second = RuntimeCache::load(&path);

        first
            .record(Path::new("/opt/a"), info(1, 8, 0, 0, false))
            .expect("first writer");
        second
            .record(Path::new("/opt/b"), info(11, 0, 0, 0, true))
            .expect("second writer");

        let merged = RuntimeCache::load(&path);
        assert!(merged.get(Path::new("/opt/a")).is_some());
        assert!(merged.get(Path::new("/opt/b")).is_some());
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("runtimes");
        std::fs::write(
            &path,
            "garbage\nJRE_VERSION\t/opt/x\tone\t2\t3\t4\nJRE_INFO\t/opt/y\t1\n",
        )
        .expect("cache file written");

        let cache = RuntimeCache::load(&path);

        assert!(cache.get(Path::new("/opt/x")).is_none());
        assert!(cache.get(Path::new("/opt/y")).is_none());
    }

    #[test]
    fn reset_empties_cache_file() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("runtimes");
        let mut cache = RuntimeCache::load(&path);
        cache
            .record(Path::new("/opt/jdk"), info(1, 5, 0, 0, false))
            .expect("entry recorded");

        cache.reset().expect("cache should reset");

        assert!(cache.get(Path::new("/opt/jdk")).is_none());
        assert_eq!(std::fs::read_to_string(&path).expect("file exists"), "");
    }

    #[test]
    fn default_location_prefers_home() {
        assert_eq!(
            RuntimeCache::default_location(Some(Path::new("/home/ada"))),
            Path::new("/home/ada/.jarup/runtimes")
        );
        assert!(
            RuntimeCache::default_location(None).ends_with(".jarup-runtimes")
        );
    }
}
