//! Directory layout of an installed application copy.
//!
//! The tree mirrors a filesystem root so that installing into `/` yields
//! system-wide paths and installing into any other directory yields a
//! self-contained prefix:
//!
//! ```text
//! <root>/var/lib/<app>/                                   state (archives, marker)
//! <root>/usr/lib/<app>/*.jar                              application files
//! <root>/usr/bin/<app>                                    launcher script
//! <root>/usr/share/icons/hicolor/<WxH>/<category>/<name>.<ext>
//! ```

use std::path::{Path, PathBuf};

pub const ICON_THEME: &str = "hicolor";

const INSTALLED_VERSION_FILE: &str = "installed-version";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTree {
    root: PathBuf,
    app: String,
}

impl InstallTree {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, app: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            app: app.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app
    }

    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.root.join("var").join("lib").join(&self.app)
    }

    #[must_use]
    pub fn app_dir(&self) -> PathBuf {
        self.root.join("usr").join("lib").join(&self.app)
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("usr").join("bin")
    }

    #[must_use]
    pub fn launcher_script(&self) -> PathBuf {
        self.bin_dir().join(&self.app)
    }

    #[must_use]
    pub fn icon_theme_dir(&self) -> PathBuf {
        self.root
            .join("usr")
            .join("share")
            .join("icons")
            .join(ICON_THEME)
    }

    /// Destination of one icon, `size` being a `WxH` resolution string.
    #[must_use]
    pub fn icon_path(&self, size: &str, category: &str, file_name: &str) -> PathBuf {
        self.icon_theme_dir()
            .join(size)
            .join(category)
            .join(file_name)
    }

    #[must_use]
    pub fn archive_path(&self, file_name: &str) -> PathBuf {
        self.state_dir().join(file_name)
    }

    #[must_use]
    pub fn installed_version_file(&self) -> PathBuf {
        self.state_dir().join(INSTALLED_VERSION_FILE)
    }

    /// Create the state, application and executable directories.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.state_dir())?;
        std::fs::create_dir_all(self.app_dir())?;
        std::fs::create_dir_all(self.bin_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::InstallTree;

    #[test]
    fn layout_follows_filesystem_hierarchy() {
        let tree = InstallTree::new("/opt/root", "viewer");

        assert_eq!(tree.state_dir(), Path::new("/opt/root/var/lib/viewer"));
        assert_eq!(tree.app_dir(), Path::new("/opt/root/usr/lib/viewer"));
        assert_eq!(tree.launcher_script(), Path::new("/opt/root/usr/bin/viewer"));
        assert_eq!(
            tree.archive_path("viewer-1.0.zip"),
            Path::new("/opt/root/var/lib/viewer/viewer-1.0.zip")
        );
    }

    #[test]
    fn icon_path_is_grouped_by_resolution_and_category() {
        let tree = InstallTree::new("/", "viewer");

        assert_eq!(
            tree.icon_path("48x48", "apps", "viewer.png"),
            Path::new("/usr/share/icons/hicolor/48x48/apps/viewer.png")
        );
    }

    #[test]
    fn ensure_dirs_creates_tree() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let tree = InstallTree::new(temp.path(), "viewer");

        tree.ensure_dirs().expect("directories should be created");

        assert!(tree.state_dir().is_dir());
        assert!(tree.app_dir().is_dir());
        assert!(tree.bin_dir().is_dir());
    }
}
