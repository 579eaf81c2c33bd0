use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::InstallError;

/// One icon shipped inside the distribution archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSpec {
    /// Path relative to the versioned archive root.
    pub source: String,
    /// Resolution directory, e.g. `48x48`.
    pub size: String,
    #[serde(default = "default_icon_category")]
    pub category: String,
    /// File stem of the installed icon; the extension is kept from `source`.
    pub name: String,
}

impl IconSpec {
    #[must_use]
    pub fn installed_file_name(&self) -> String {
        match Path::new(&self.source).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}.{ext}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A single directory or file name that stays where it is joined.
fn is_plain_segment(part: &str) -> bool {
    !part.is_empty() && !part.contains(['/', '\\']) && !part.contains("..")
}

/// A relative path without `..`, so it cannot leave the directory it is
/// resolved against.
fn is_relative_inside(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with(['/', '\\'])
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn default_icon_category() -> String {
    "apps".to_string()
}

fn default_archive_root_template() -> String {
    "{name}-{version}".to_string()
}

fn default_app_file_extension() -> String {
    "jar".to_string()
}

/// Everything the updater needs to know about the managed application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppProfile {
    pub name: String,
    /// HTML page that announces the latest release.
    pub page_url: String,
    /// Regex whose first capture group is the version string.
    pub version_pattern: String,
    pub download_url_template: String,
    #[serde(default = "default_archive_root_template")]
    pub archive_root_template: String,
    #[serde(default = "default_app_file_extension")]
    pub app_file_extension: String,
    #[serde(default)]
    pub main_jar: Option<String>,
    #[serde(default)]
    pub icons: Vec<IconSpec>,
    #[serde(default)]
    pub checksum_url_template: Option<String>,
}

impl AppProfile {
    /// Load a profile from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid profile.
    pub fn load(path: &Path) -> Result<Self, InstallError> {
        let content = std::fs::read_to_string(path)
            .map_err(|error| InstallError::io_with_path("failed to read profile", path, &error))?;
        let profile: Self = serde_json::from_str(&content).map_err(|error| {
            InstallError::Config(format!("invalid profile {}: {error}", path.display()))
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject profiles whose names or icon paths could escape the install tree
    /// or the unpacked archive.
    ///
    /// # Errors
    /// Returns a configuration error describing the offending field.
    pub fn validate(&self) -> Result<(), InstallError> {
        if !is_plain_segment(&self.name) {
            return Err(InstallError::Config(format!(
                "invalid application name '{}'",
                self.name
            )));
        }
        if !self.download_url_template.contains("{version}") {
            return Err(InstallError::Config(
                "download_url_template must contain {version}".to_string(),
            ));
        }
        if !self.archive_root_template.contains("{version}") {
            return Err(InstallError::Config(
                "archive_root_template must contain {version}".to_string(),
            ));
        }
        for icon in &self.icons {
            let names_ok = [&icon.name, &icon.category, &icon.size]
                .iter()
                .all(|part| is_plain_segment(part));
            if !names_ok || !is_relative_inside(&icon.source) {
                return Err(InstallError::Config(format!(
                    "invalid icon entry '{}'",
                    icon.source
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn render(&self, template: &str, version: &str) -> String {
        template
            .replace("{name}", &self.name)
            .replace("{version}", version)
    }

    #[must_use]
    pub fn download_url(&self, version: &str) -> String {
        self.render(&self.download_url_template, version)
    }

    #[must_use]
    pub fn archive_root(&self, version: &str) -> String {
        self.render(&self.archive_root_template, version)
    }

    #[must_use]
    pub fn checksum_url(&self, version: &str) -> Option<String> {
        self.checksum_url_template
            .as_deref()
            .map(|template| self.render(template, version))
    }

    #[must_use]
    pub fn main_jar(&self) -> String {
        self.main_jar
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.name, self.app_file_extension))
    }

    /// Pull the version back out of an archive directory name produced by
    /// `archive_root_template`.
    #[must_use]
    pub fn version_from_archive_root(&self, dir_name: &str) -> Option<String> {
        let rendered = self.archive_root_template.replace("{name}", &self.name);
        let (prefix, suffix) = rendered.split_once("{version}")?;
        let version = dir_name.strip_prefix(prefix)?.strip_suffix(suffix)?;
        let looks_like_version = !version.is_empty()
            && version.starts_with(|ch: char| ch.is_ascii_digit())
            && version.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '.');
        looks_like_version.then(|| version.to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::{AppProfile, IconSpec};

    pub(crate) fn sample_profile() -> AppProfile {
        serde_json::from_value(json!({
            "name": "viewer",
            "page_url": "https://vendor.test/download.html",
            "version_pattern": "Latest release: ([0-9.]+)",
            "download_url_template": "https://vendor.test/files/{name}-{version}.zip",
            "icons": [
                { "source": "icons/viewer-48.png", "size": "48x48", "name": "viewer" },
                { "source": "icons/viewer-doc-32.png", "size": "32x32", "category": "mimetypes", "name": "application-x-viewer" }
            ]
        }))
        .expect("sample profile should deserialize")
    }

    #[test]
    fn defaults_are_applied() {
        let profile = sample_profile();

        assert_eq!(profile.archive_root_template, "{name}-{version}");
        assert_eq!(profile.app_file_extension, "jar");
        assert_eq!(profile.main_jar(), "viewer.jar");
        assert_eq!(profile.icons[0].category, "apps");
        assert!(profile.checksum_url_template.is_none());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn templates_render_name_and_version() {
        let profile = sample_profile();

        assert_eq!(
            profile.download_url("3.17.1"),
            "https://vendor.test/files/viewer-3.17.1.zip"
        );
        assert_eq!(profile.archive_root("3.17.1"), "viewer-3.17.1");
    }

    #[test]
    fn version_is_recovered_from_archive_root() {
        let profile = sample_profile();

        assert_eq!(
            profile.version_from_archive_root("viewer-3.17.1").as_deref(),
            Some("3.17.1")
        );
        assert!(profile.version_from_archive_root("other-3.17.1").is_none());
        assert!(profile.version_from_archive_root("viewer-docs").is_none());
    }

    #[test]
    fn icon_keeps_source_extension() {
        let icon = IconSpec {
            source: "icons/viewer-48.png".to_string(),
            size: "48x48".to_string(),
            category: "apps".to_string(),
            name: "viewer".to_string(),
        };

        assert_eq!(icon.installed_file_name(), "viewer.png");
    }

    #[test]
    fn validate_rejects_path_like_names() {
        let mut profile = sample_profile();
        profile.name = "../etc".to_string();

        assert!(profile.validate().is_err());
    }

    #[test]
    fn validate_requires_version_placeholder() {
        let mut profile = sample_profile();
        profile.download_url_template = "https://vendor.test/latest.zip".to_string();

        assert!(profile.validate().is_err());
    }

    #[test]
    fn validate_rejects_icon_size_outside_theme() {
        for size in ["../../../etc", "48x48/../..", "a\\b", ""] {
            let mut profile = sample_profile();
            profile.icons[0].size = size.to_string();

            assert!(profile.validate().is_err(), "size {size:?} should be rejected");
        }
    }

    #[test]
    fn validate_rejects_icon_source_outside_archive() {
        for source in ["../../x.png", "icons/../../x.png", "/etc/passwd", "\\share\\x.png"] {
            let mut profile = sample_profile();
            profile.icons[0].source = source.to_string();

            assert!(
                profile.validate().is_err(),
                "source {source:?} should be rejected"
            );
        }

        let mut profile = sample_profile();
        profile.icons[0].source = "./icons/viewer-48.png".to_string();
        assert!(profile.validate().is_ok());
    }
}
