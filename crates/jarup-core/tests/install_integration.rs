use std::io::Write as _;
use std::path::Path;

use jarup_core::{AppProfile, Installer, RemoveError, remove_installation};
use serde_json::json;
use tempfile::tempdir;

fn profile() -> AppProfile {
    serde_json::from_value(json!({
        "name": "atlas",
        "page_url": "https://vendor.test/atlas/",
        "version_pattern": "atlas-([0-9.]+)\\.zip",
        "download_url_template": "https://vendor.test/atlas/atlas-{version}.zip",
        "main_jar": "atlas-app.jar",
        "icons": [
            { "source": "atlas-128.png", "size": "128x128", "name": "atlas" }
        ]
    }))
    .expect("profile JSON should deserialize")
}

fn write_archive(path: &Path) {
    let file = std::fs::File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in [
        ("atlas-1.4.2/atlas-app.jar", "app"),
        ("atlas-1.4.2/atlas-core.jar", "core"),
        ("atlas-1.4.2/atlas-128.png", "icon"),
        ("atlas-1.4.2/LICENSE", "license"),
    ] {
        writer.start_file(name, options).expect("start entry");
        writer.write_all(content.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish archive");
}

#[test]
fn local_install_then_remove_then_purge() {
    let temp_dir = tempdir().expect("create temp dir");
    let root = temp_dir.path().join("root");
    let archive = temp_dir.path().join("atlas.zip");
    let config_dir = temp_dir.path().join("config");
    write_archive(&archive);
    std::fs::create_dir_all(&config_dir).expect("create config dir");

    let installer = Installer::new(
        reqwest::Client::new(),
        &root,
        profile(),
        "/opt/bin/jarup-launch",
    );
    let (version, report) = installer.install_local(&archive).expect("install archive");
    assert_eq!(version.as_str(), "1.4.2");
    assert_eq!(report.app_files, 2);

    let tree = installer.tree();
    assert!(root.join("usr/lib/atlas/atlas-app.jar").is_file());
    assert!(root.join("usr/lib/atlas/atlas-core.jar").is_file());
    assert!(root.join("usr/share/icons/hicolor/128x128/apps/atlas.png").is_file());
    let script = std::fs::read_to_string(tree.launcher_script()).expect("read launcher script");
    assert!(script.contains("\"/opt/bin/jarup-launch\""));
    assert!(script.contains("--main-jar \"atlas-app.jar\""));

    remove_installation(tree, false, Some(&config_dir)).expect("remove install");
    assert!(!root.join("usr/lib/atlas").exists());
    assert!(!root.join("var/lib/atlas").exists());
    assert!(config_dir.is_dir());
    assert!(archive.is_file());

    assert!(matches!(
        remove_installation(tree, true, None),
        Err(RemoveError::ConfigDirUnset)
    ));
    remove_installation(tree, true, Some(&config_dir)).expect("purge install");
    assert!(!config_dir.exists());
}

#[test]
fn reinstall_overwrites_in_place() {
    let temp_dir = tempdir().expect("create temp dir");
    let root = temp_dir.path().join("root");
    let archive = temp_dir.path().join("atlas.zip");
    write_archive(&archive);

    let installer = Installer::new(reqwest::Client::new(), &root, profile(), "jarup-launch");
    installer.install_local(&archive).expect("first install");
    std::fs::write(root.join("usr/lib/atlas/atlas-app.jar"), "stale").expect("modify jar");

    installer.install_local(&archive).expect("second install");

    let jar = std::fs::read_to_string(root.join("usr/lib/atlas/atlas-app.jar")).expect("read jar");
    assert_eq!(jar, "app");
}
