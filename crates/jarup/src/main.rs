mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::settings::AppSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let (settings, settings_problem) = AppSettings::load();
    logging::init_logging(cli.verbose, settings.max_log_size_bytes);
    if let Some(problem) = settings_problem {
        log::warn!("{problem}");
    }

    match commands::run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::debug!("{error:?}");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
