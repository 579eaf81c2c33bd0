use std::path::{Path, PathBuf};
use std::time::Duration;

use jarup_core::{AppProfile, DownloadOutcome, Installer, UpdateOutcome, remove_installation};
use jarup_platform::AppPaths;
use log::debug;

use crate::cli::{Action, Cli};
use crate::error::AppError;
use crate::settings::AppSettings;

const LAUNCHER_NAME: &str = "jarup-launch";

/// Carry out the requested action. Results go to stdout, progress to the log.
pub async fn run(cli: Cli, settings: AppSettings) -> Result<(), AppError> {
    let profile = resolve_profile(cli.profile.as_deref(), settings.profile.as_ref())?;
    let install_root = cli.dest.unwrap_or_else(|| settings.install_root.clone());
    let config_dir = cli.config_dir.or_else(|| settings.config_dir.clone());
    let launcher = resolve_launcher(
        settings.launcher_bin.as_deref(),
        current_exe_dir().as_deref(),
    );
    debug!(
        "{} into {} with launcher {}",
        profile.name,
        install_root.display(),
        launcher.display()
    );

    let url_override = match cli.action {
        Action::Update | Action::Download => cli.source.clone(),
        _ => None,
    };
    let installer = Installer::new(build_client(&settings)?, install_root, profile, launcher)
        .force(cli.force)
        .source_override(url_override);
    let name = installer.profile().name.clone();

    match cli.action {
        Action::Info => {
            let report = installer.info().await?;
            let installed = report
                .installed
                .as_ref()
                .map_or_else(|| "none".to_string(), ToString::to_string);
            println!("{name}");
            println!("  installed: {installed}");
            println!("  latest:    {}", report.latest);
            println!("  download:  {}", report.download_url);
            if report.update_available() {
                println!("  an update is available");
            } else {
                println!("  up to date");
            }
        }
        Action::Update => {
            let outcome = installer.update().await?;
            print_installed(&name, &outcome);
        }
        Action::Download => {
            let (version, archive, download) = installer.download().await?;
            println!(
                "{name} {version}: {} ({})",
                archive.display(),
                describe_download(download)
            );
        }
        Action::Install => match cli.source.as_deref() {
            Some(source) => {
                let (version, report) = installer.install_local(Path::new(source))?;
                println!(
                    "Installed {name} {version} from {source} ({} application files, {} icons)",
                    report.app_files, report.icons
                );
            }
            None => {
                let report = installer.info().await?;
                let outcome = installer.install_version(&report.latest).await?;
                print_installed(&name, &outcome);
            }
        },
        Action::Remove | Action::Purge => {
            let purge = cli.action == Action::Purge;
            remove_installation(installer.tree(), purge, config_dir.as_deref())?;
            println!(
                "{} {name} from {}",
                if purge { "Purged" } else { "Removed" },
                installer.tree().root().display()
            );
        }
    }

    Ok(())
}

/// `--profile` wins over the profile stored in settings.
fn resolve_profile(
    path: Option<&Path>,
    configured: Option<&AppProfile>,
) -> Result<AppProfile, AppError> {
    if let Some(path) = path {
        return Ok(AppProfile::load(path)?);
    }

    let Some(profile) = configured else {
        let settings = AppPaths::new().map_or_else(
            |_| "settings.json".to_string(),
            |paths| paths.settings_file().display().to_string(),
        );
        return Err(AppError::MissingProfile { settings });
    };
    profile.validate()?;
    Ok(profile.clone())
}

fn current_exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

/// Configured launcher, else the one shipped next to this binary, else
/// whatever `PATH` provides at launch time.
fn resolve_launcher(configured: Option<&Path>, exe_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }

    let file_name = format!("{LAUNCHER_NAME}{}", std::env::consts::EXE_SUFFIX);
    if let Some(sibling) = exe_dir.map(|dir| dir.join(&file_name))
        && sibling.is_file()
    {
        return sibling;
    }

    which::which(LAUNCHER_NAME).unwrap_or_else(|_| PathBuf::from(LAUNCHER_NAME))
}

fn build_client(settings: &AppSettings) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .connect_timeout(Duration::from_secs(settings.http_connect_timeout_secs))
        .user_agent(format!("jarup/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(AppError::ClientBuild)
}

fn print_installed(name: &str, outcome: &UpdateOutcome) {
    println!(
        "{} {name} {} ({}; {} application files, {} icons)",
        if outcome.reinstalled() { "Reinstalled" } else { "Installed" },
        outcome.version,
        describe_download(outcome.download),
        outcome.report.app_files,
        outcome.report.icons
    );
}

fn describe_download(outcome: DownloadOutcome) -> String {
    match outcome {
        DownloadOutcome::Reused => "archive already present".to_string(),
        DownloadOutcome::Downloaded { bytes } => format!("downloaded {bytes} bytes"),
    }
}
