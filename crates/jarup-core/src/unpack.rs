use std::path::{Path, PathBuf};

use jarup_platform::InstallTree;
use log::{debug, info, warn};

use crate::error::InstallError;
use crate::profile::AppProfile;
use crate::script::write_launcher_script;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackReport {
    pub app_files: usize,
    pub icons: usize,
}

/// Install the files of `archive` into `tree`.
///
/// The archive is expanded into a scratch directory inside the state
/// directory which is removed again on every exit path. Only the versioned
/// top-level directory is looked at: its application files go to the app
/// directory, the profile's icons to the icon theme, and a launcher script
/// pointing at `launcher` is written last.
///
/// # Errors
/// Returns an error for unreadable or malformed archives, a missing versioned
/// root, missing application files or icons, and any filesystem failure.
pub fn unpack_archive(
    archive: &Path,
    tree: &InstallTree,
    profile: &AppProfile,
    version: &str,
    launcher: &Path,
) -> Result<UnpackReport, InstallError> {
    tree.ensure_dirs()
        .map_err(|error| InstallError::io("failed to create install directories", error))?;

    let scratch = tempfile::Builder::new()
        .prefix(".unpack")
        .tempdir_in(tree.state_dir())
        .map_err(|error| InstallError::io("failed to create scratch directory", error))?;

    extract_zip(archive, scratch.path())?;

    let root_name = profile.archive_root(version);
    let root = scratch.path().join(&root_name);
    if !root.is_dir() {
        return Err(InstallError::MissingVersionedRoot {
            expected: root_name,
        });
    }

    let app_files = copy_app_files(&root, &tree.app_dir(), &profile.app_file_extension)?;
    if app_files == 0 {
        return Err(InstallError::NoApplicationFiles {
            root: root_name,
            extension: profile.app_file_extension.clone(),
        });
    }

    let mut icons = 0;
    for icon in &profile.icons {
        let source = root.join(&icon.source);
        if !source.is_file() {
            return Err(InstallError::MissingIcon {
                source_path: icon.source.clone(),
            });
        }
        let dest = tree.icon_path(&icon.size, &icon.category, &icon.installed_file_name());
        copy_file(&source, &dest)?;
        icons += 1;
    }

    write_launcher_script(
        &tree.launcher_script(),
        launcher,
        &tree.app_dir(),
        &profile.main_jar(),
    )?;

    info!(
        "Installed {} {version}: {app_files} application files, {icons} icons",
        profile.name
    );
    Ok(UnpackReport { app_files, icons })
}

/// Find the version of a local archive by matching its top-level directory
/// names against the profile's archive root template.
///
/// # Errors
/// Returns an error if the archive cannot be read or has no matching root.
pub fn detect_archive_version(archive: &Path, profile: &AppProfile) -> Result<String, InstallError> {
    let file = std::fs::File::open(archive)
        .map_err(|error| InstallError::io_with_path("failed to open archive", archive, &error))?;
    let archive_reader = zip::ZipArchive::new(file)
        .map_err(|error| InstallError::zip("failed to read zip archive", error))?;

    let mut versions: Vec<String> = archive_reader
        .file_names()
        .filter_map(|name| name.split('/').next())
        .filter_map(|top| profile.version_from_archive_root(top))
        .collect();
    versions.sort();
    versions.dedup();

    match versions.as_slice() {
        [version] => Ok(version.clone()),
        [] => Err(InstallError::MissingVersionedRoot {
            expected: profile.archive_root("<version>"),
        }),
        _ => Err(InstallError::Config(format!(
            "archive contains several versions: {}",
            versions.join(", ")
        ))),
    }
}

pub(crate) fn extract_zip(zip_path: &Path, dest: &Path) -> Result<(), InstallError> {
    let file = std::fs::File::open(zip_path).map_err(|error| {
        InstallError::io_with_path("failed to open zip file", zip_path, &error)
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|error| InstallError::zip("failed to read zip archive", error))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|error| InstallError::zip("failed to read zip entry", error))?;
        let Some(name) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path: {}", entry.name());
            continue;
        };
        let out_path = dest.join(name);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|error| {
                InstallError::io_with_path("failed to create extraction directory", &out_path, &error)
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                InstallError::io_with_path("failed to create extraction directory", parent, &error)
            })?;
        }
        let mut outfile = std::fs::File::create(&out_path).map_err(|error| {
            InstallError::io_with_path("failed to create extracted file", &out_path, &error)
        })?;
        std::io::copy(&mut entry, &mut outfile).map_err(|error| {
            InstallError::io_with_path("failed to extract archive entry", &out_path, &error)
        })?;
    }

    debug!("Extracted {} to {}", zip_path.display(), dest.display());
    Ok(())
}

fn copy_app_files(root: &Path, app_dir: &Path, extension: &str) -> Result<usize, InstallError> {
    let mut sources: Vec<PathBuf> = std::fs::read_dir(root)
        .map_err(|error| InstallError::io_with_path("failed to read archive root", root, &error))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    sources.sort();

    for source in &sources {
        if let Some(file_name) = source.file_name() {
            copy_file(source, &app_dir.join(file_name))?;
        }
    }
    Ok(sources.len())
}

fn copy_file(source: &Path, dest: &Path) -> Result<(), InstallError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            InstallError::io_with_path("failed to create directory", parent, &error)
        })?;
    }
    std::fs::copy(source, dest).map_err(|error| {
        InstallError::io(
            "failed to install file",
            std::io::Error::new(
                error.kind(),
                format!("{} -> {}: {error}", source.display(), dest.display()),
            ),
        )
    })?;
    debug!("Installed {}", dest.display());
    Ok(())
}
