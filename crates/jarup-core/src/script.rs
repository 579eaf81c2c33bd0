use std::path::Path;

use crate::error::InstallError;

/// Shell script installed as `usr/bin/<app>`; it hands over to the native
/// launcher with the installed application directory.
#[must_use]
pub fn render_launcher_script(launcher: &Path, app_dir: &Path, main_jar: &str) -> String {
    format!(
        "#!/bin/sh\n\
         exec \"{}\" --app-dir \"{}\" --main-jar \"{}\" -- \"$@\"\n",
        escape_double_quoted(&launcher.to_string_lossy()),
        escape_double_quoted(&app_dir.to_string_lossy()),
        escape_double_quoted(main_jar),
    )
}

fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub(crate) fn write_launcher_script(
    path: &Path,
    launcher: &Path,
    app_dir: &Path,
    main_jar: &str,
) -> Result<(), InstallError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            InstallError::io_with_path("failed to create executable directory", parent, &error)
        })?;
    }

    let script = render_launcher_script(launcher, app_dir, main_jar);
    std::fs::write(path, script).map_err(|error| {
        InstallError::io_with_path("failed to write launcher script", path, &error)
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(
            |error| InstallError::io_with_path("failed to make launcher executable", path, &error),
        )?;
    }

    Ok(())
}
