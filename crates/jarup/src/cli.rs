use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "jarup",
    version,
    about = "Install and update a Java desktop application from its vendor's site"
)]
pub struct Cli {
    #[command(subcommand)]
    pub action: Action,

    /// Log debug output to the terminal.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Download archives that are already present and reinstall the
    /// installed version.
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Download URL template for `update`/`download` (`{version}` and
    /// `{name}` are substituted), or a local archive for `install`.
    #[arg(long, global = true, value_name = "URL|FILE")]
    pub source: Option<String>,

    /// Install root instead of the configured one.
    #[arg(long, global = true, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Application profile (JSON) replacing the one in settings.
    #[arg(long, global = true, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Configuration directory deleted by `purge`.
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Show the installed and the latest published version.
    Info,
    /// Install the latest version unless it is already installed.
    Update,
    /// Delete the installed application.
    Remove,
    /// Delete the installed application and its configuration directory.
    Purge,
    /// Fetch the latest archive without installing it.
    Download,
    /// Install from `--source <file>`, or the latest version.
    Install,
}
