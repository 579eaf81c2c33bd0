use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Oldest runtime the application starts on.
pub const MINIMUM_RUNTIME: RuntimeVersion = RuntimeVersion::new(1, 5, 0, 19);

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"version "([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?(?:[._]([0-9]+))?"#)
        .expect("runtime version pattern should compile")
});

/// `major.minor.micro_patch`, compared component by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, micro: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            patch,
        }
    }

    #[must_use]
    pub fn satisfies(&self, minimum: &RuntimeVersion) -> bool {
        self >= minimum
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}_{}",
            self.major, self.minor, self.micro, self.patch
        )
    }
}

/// What a `java -version` invocation told us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub version: RuntimeVersion,
    pub is_openjdk: bool,
}

/// Parse the banner printed by `java -version` (on stderr for most vendors).
#[must_use]
pub fn parse_version_output(output: &str) -> Option<RuntimeInfo> {
    let captures = VERSION_LINE.captures(output)?;
    let component = |index: usize| {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };

    let version = RuntimeVersion::new(component(1), component(2), component(3), component(4));
    let is_openjdk = output.to_ascii_lowercase().contains("openjdk");
    Some(RuntimeInfo {
        version,
        is_openjdk,
    })
}
