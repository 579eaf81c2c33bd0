use std::path::{Path, PathBuf};

use jarup_platform::InstallTree;
use log::{info, warn};

use crate::check::fetch_latest_version;
use crate::download::{DownloadOutcome, archive_file_name, download_archive, verify_archive_checksum};
use crate::error::InstallError;
use crate::profile::AppProfile;
use crate::unpack::{UnpackReport, detect_archive_version, unpack_archive};
use crate::version::VersionInfo;

#[derive(Debug, Clone)]
pub struct VersionReport {
    pub latest: VersionInfo,
    pub installed: Option<VersionInfo>,
    pub download_url: String,
}

impl VersionReport {
    #[must_use]
    pub fn update_available(&self) -> bool {
        self.installed
            .as_ref()
            .is_none_or(|installed| self.latest > *installed)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub version: VersionInfo,
    /// Version recorded before this install, if any.
    pub previous: Option<VersionInfo>,
    pub download: DownloadOutcome,
    pub report: UnpackReport,
}

impl UpdateOutcome {
    /// The same version was unpacked again over itself.
    #[must_use]
    pub fn reinstalled(&self) -> bool {
        self.previous.as_ref() == Some(&self.version)
    }
}

/// Version check, download and unpack for one application profile and one
/// install tree.
#[derive(Debug, Clone)]
pub struct Installer {
    client: reqwest::Client,
    tree: InstallTree,
    profile: AppProfile,
    launcher: PathBuf,
    force: bool,
    source_override: Option<String>,
}

impl Installer {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        install_root: impl Into<PathBuf>,
        profile: AppProfile,
        launcher: impl Into<PathBuf>,
    ) -> Self {
        let tree = InstallTree::new(install_root, profile.name.clone());
        Self {
            client,
            tree,
            profile,
            launcher: launcher.into(),
            force: false,
            source_override: None,
        }
    }

    /// Re-download archives that are already present.
    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Download URL to use instead of the profile template; `{version}` and
    /// `{name}` are substituted.
    #[must_use]
    pub fn source_override(mut self, source: Option<String>) -> Self {
        self.source_override = source;
        self
    }

    #[must_use]
    pub fn tree(&self) -> &InstallTree {
        &self.tree
    }

    #[must_use]
    pub fn profile(&self) -> &AppProfile {
        &self.profile
    }

    #[must_use]
    pub fn download_url(&self, version: &str) -> String {
        match &self.source_override {
            Some(template) => self.profile.render(template, version),
            None => self.profile.download_url(version),
        }
    }

    /// Version recorded by the last successful unpack, if any.
    #[must_use]
    pub fn installed_version(&self) -> Option<VersionInfo> {
        let content = std::fs::read_to_string(self.tree.installed_version_file()).ok()?;
        let version = content.trim();
        (!version.is_empty()).then(|| VersionInfo::new(version))
    }

    /// Latest published version next to the installed one.
    ///
    /// # Errors
    /// Returns an error if the version check fails.
    pub async fn info(&self) -> Result<VersionReport, InstallError> {
        let latest = fetch_latest_version(&self.client, &self.profile).await?;
        let download_url = self.download_url(latest.as_str());
        Ok(VersionReport {
            latest,
            installed: self.installed_version(),
            download_url,
        })
    }

    /// Fetch the archive of the latest version into the state directory
    /// without installing it.
    ///
    /// # Errors
    /// Returns an error if the version check or the download fails.
    pub async fn download(&self) -> Result<(VersionInfo, PathBuf, DownloadOutcome), InstallError> {
        let latest = fetch_latest_version(&self.client, &self.profile).await?;
        let (archive, outcome) = self.fetch_archive(&latest).await?;
        Ok((latest, archive, outcome))
    }

    /// Unpack the latest version, downloading it only when its archive is
    /// missing or `force` is set. Running it again over a current install
    /// restores the application files.
    ///
    /// # Errors
    /// Returns an error if the version check, download or unpack fails.
    pub async fn update(&self) -> Result<UpdateOutcome, InstallError> {
        let latest = fetch_latest_version(&self.client, &self.profile).await?;
        self.install_version(&latest).await
    }

    /// Download (unless already present) and unpack one specific version.
    ///
    /// An archive that fails verification or unpacking is deleted so the next
    /// run downloads it again. A failed download leaves its partial file.
    ///
    /// # Errors
    /// Returns an error if the download, checksum verification or unpack
    /// fails.
    pub async fn install_version(&self, version: &VersionInfo) -> Result<UpdateOutcome, InstallError> {
        let previous = self.installed_version();
        let (archive, download) = self.fetch_archive(version).await?;

        if let Some(checksum_url) = self.profile.checksum_url(version.as_str())
            && let Err(error) = verify_archive_checksum(&self.client, &checksum_url, &archive).await
        {
            discard_archive(&archive);
            return Err(error);
        }

        let report = match self.unpack(&archive, version) {
            Ok(report) => report,
            Err(error) => {
                discard_archive(&archive);
                return Err(error);
            }
        };

        Ok(UpdateOutcome {
            version: version.clone(),
            previous,
            download,
            report,
        })
    }

    /// Install from an archive the user already has. The archive is never
    /// deleted, even when it turns out to be unusable.
    ///
    /// # Errors
    /// Returns an error if the archive has no recognizable versioned root or
    /// unpacking fails.
    pub fn install_local(&self, archive: &Path) -> Result<(VersionInfo, UnpackReport), InstallError> {
        let version = VersionInfo::new(detect_archive_version(archive, &self.profile)?);
        info!(
            "Installing {} {version} from {}",
            self.profile.name,
            archive.display()
        );
        let report = self.unpack(archive, &version)?;
        Ok((version, report))
    }

    async fn fetch_archive(
        &self,
        version: &VersionInfo,
    ) -> Result<(PathBuf, DownloadOutcome), InstallError> {
        let url = self.download_url(version.as_str());
        let archive = self.tree.archive_path(&archive_file_name(&url));
        let outcome = download_archive(&self.client, &url, &archive, self.force).await?;
        Ok((archive, outcome))
    }

    fn unpack(&self, archive: &Path, version: &VersionInfo) -> Result<UnpackReport, InstallError> {
        let report = unpack_archive(
            archive,
            &self.tree,
            &self.profile,
            version.as_str(),
            &self.launcher,
        )?;
        let marker = self.tree.installed_version_file();
        std::fs::write(&marker, format!("{}\n", version.as_str())).map_err(|error| {
            InstallError::io_with_path("failed to record installed version", &marker, &error)
        })?;
        Ok(report)
    }
}

fn discard_archive(archive: &Path) {
    match std::fs::remove_file(archive) {
        Ok(()) => info!("Removed unusable archive {}", archive.display()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => warn!("Failed to remove archive {}: {error}", archive.display()),
    }
}
