use std::path::{Path, PathBuf};

use jarup_platform::InstallTree;
use log::{info, warn};

use crate::error::{RemoveError, RemoveFailure};

/// Delete an installed copy.
///
/// The state directory, the application directory and the launcher script
/// are always removed; with `purge` the configuration directory goes too and
/// must be given. Every target is attempted even when an earlier one fails.
///
/// # Errors
/// Returns [`RemoveError::ConfigDirUnset`] for a purge without configuration
/// directory (nothing is deleted then), or [`RemoveError::Failed`] listing
/// every target that could not be removed.
pub fn remove_installation(
    tree: &InstallTree,
    purge: bool,
    config_dir: Option<&Path>,
) -> Result<(), RemoveError> {
    let mut targets: Vec<PathBuf> = vec![tree.state_dir(), tree.app_dir(), tree.launcher_script()];
    if purge {
        let config_dir = config_dir.ok_or(RemoveError::ConfigDirUnset)?;
        targets.push(config_dir.to_path_buf());
    }

    let failures: Vec<RemoveFailure> = targets
        .into_iter()
        .filter_map(|path| match remove_path(&path) {
            Ok(true) => {
                info!("Removed {}", path.display());
                None
            }
            Ok(false) => None,
            Err(source) => {
                warn!("Failed to remove {}: {source}", path.display());
                Some(RemoveFailure { path, source })
            }
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(RemoveError::Failed(failures))
    }
}

/// Returns whether something was deleted.
fn remove_path(path: &Path) -> std::io::Result<bool> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(error) => return Err(error),
    };

    if metadata.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use jarup_platform::InstallTree;

    use super::remove_installation;
    use crate::error::RemoveError;

    fn populated_tree(root: &std::path::Path) -> InstallTree {
        let tree = InstallTree::new(root, "viewer");
        tree.ensure_dirs().expect("tree should be created");
        std::fs::write(tree.app_dir().join("viewer.jar"), b"jar").expect("jar written");
        std::fs::write(tree.archive_path("viewer-1.0.zip"), b"zip").expect("archive written");
        std::fs::write(tree.launcher_script(), b"#!/bin/sh\n").expect("script written");
        tree
    }

    #[test]
    fn remove_keeps_config_directory() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let tree = populated_tree(&temp.path().join("root"));
        let config_dir = temp.path().join("config");
        std::fs::create_dir_all(&config_dir).expect("config dir created");

        remove_installation(&tree, false, Some(&config_dir)).expect("remove should succeed");

        assert!(!tree.state_dir().exists());
        assert!(!tree.app_dir().exists());
        assert!(!tree.launcher_script().exists());
        assert!(config_dir.is_dir());
    }

    #[test]
    fn purge_removes_config_directory() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let tree = populated_tree(&temp.path().join("root"));
        let config_dir = temp.path().join("config");
        std::fs::create_dir_all(&config_dir).expect("config dir created");

        remove_installation(&tree, true, Some(&config_dir)).expect("purge should succeed");

        assert!(!tree.app_dir().exists());
        assert!(!config_dir.exists());
    }

    #[test]
    fn purge_without_config_directory_deletes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let tree = populated_tree(&temp.path().join("root"));

        let result = remove_installation(&tree, true, None);

        assert!(matches!(result, Err(RemoveError::ConfigDirUnset)));
        assert!(tree.app_dir().is_dir());
    }

    #[test]
    fn remove_of_missing_tree_succeeds() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let tree = InstallTree::new(temp.path().join("never-installed"), "viewer");

        assert!(remove_installation(&tree, false, None).is_ok());
    }
}
