mod commands;
mod layout;
mod paths;

pub use commands::QuietCommand;
pub use layout::{ICON_THEME, InstallTree};
pub use paths::{AppPaths, AppPathsError};
