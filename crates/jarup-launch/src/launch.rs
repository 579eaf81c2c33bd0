use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::LaunchError;

/// Separate `-J<opt>` arguments, forwarded to the runtime as `<opt>`, from
/// the arguments meant for the application.
#[must_use]
pub fn split_runtime_options(args: Vec<OsString>) -> (Vec<OsString>, Vec<OsString>) {
    let mut runtime_options = Vec::new();
    let mut app_args = Vec::new();

    for arg in args {
        match arg.to_str().and_then(|arg| arg.strip_prefix("-J")) {
            Some(option) if !option.is_empty() => runtime_options.push(OsString::from(option)),
            _ => app_args.push(arg),
        }
    }

    (runtime_options, app_args)
}

/// `<app dir name>.jar`, used when no main jar is given.
#[must_use]
pub fn default_main_jar(app_dir: &Path) -> Option<String> {
    let name = app_dir.file_name()?.to_str()?;
    Some(format!("{name}.jar"))
}

/// `java <runtime options> -jar <app dir>/<main jar> <app args>`
#[must_use]
pub fn build_command(
    java: &Path,
    runtime_options: &[OsString],
    app_dir: &Path,
    main_jar: &str,
    app_args: &[OsString],
) -> Command {
    let mut command = Command::new(java);
    command
        .args(runtime_options)
        .arg("-jar")
        .arg(app_dir.join(main_jar))
        .args(app_args);
    command
}

/// Replace the current process with `command`. Only returns on failure.
///
/// # Errors
/// Returns [`LaunchError::Exec`] when the program cannot be started.
#[cfg(unix)]
pub fn run(mut command: Command) -> Result<i32, LaunchError> {
    use std::os::unix::process::CommandExt;

    let program = PathBuf::from(command.get_program());
    let source = command.exec();
    Err(LaunchError::Exec { program, source })
}

/// Run `command` to completion and return its exit status.
///
/// # Errors
/// Returns [`LaunchError::Exec`] when the program cannot be started.
#[cfg(not(unix))]
pub fn run(mut command: Command) -> Result<i32, LaunchError> {
    let program = PathBuf::from(command.get_program());
    let status = command
        .status()
        .map_err(|source| LaunchError::Exec { program, source })?;
    Ok(status.code().unwrap_or(1))
}
