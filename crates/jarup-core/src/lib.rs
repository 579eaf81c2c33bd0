//! Update and install logic of jarup, independent of the command line.
//!
//! - Vendor page scraping for the latest version.
//! - Archive download with optional checksum verification.
//! - Archive unpacking into an [`jarup_platform::InstallTree`].
//! - Removal of an installed copy.

mod check;
mod download;
mod error;
mod installer;
mod profile;
mod remove;
mod script;
mod unpack;
mod version;

pub use check::{compile_version_pattern, extract_version, fetch_latest_version};
pub use download::{
    DownloadOutcome, archive_file_name, download_archive, verify_archive_checksum,
};
pub use error::{InstallError, RemoveError, RemoveFailure};
pub use installer::{Installer, UpdateOutcome, VersionReport};
pub use profile::{AppProfile, IconSpec};
pub use remove::remove_installation;
pub use script::render_launcher_script;
pub use unpack::{UnpackReport, detect_archive_version, unpack_archive};
pub use version::{VersionInfo, version_weight};
