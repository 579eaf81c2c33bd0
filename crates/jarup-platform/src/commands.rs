use std::process::Stdio;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Configure a child process that only reports back through its output:
/// no inherited stdin and no console window on Windows.
pub trait QuietCommand {
    fn quiet(&mut self) -> &mut Self;
}

impl QuietCommand for tokio::process::Command {
    #[cfg(windows)]
    fn quiet(&mut self) -> &mut Self {
        self.stdin(Stdio::null()).creation_flags(CREATE_NO_WINDOW)
    }

    #[cfg(not(windows))]
    fn quiet(&mut self) -> &mut Self {
        self.stdin(Stdio::null())
    }
}
