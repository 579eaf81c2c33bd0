use log::{debug, info};
use regex::Regex;

use crate::error::InstallError;
use crate::profile::AppProfile;
use crate::version::VersionInfo;

/// Compile the profile's version pattern.
///
/// # Errors
/// Returns an error if the pattern is not a valid regex.
pub fn compile_version_pattern(pattern: &str) -> Result<Regex, InstallError> {
    Regex::new(pattern).map_err(|source| InstallError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// First capture group of `pattern` in `page`, or the whole match when the
/// pattern has no groups.
#[must_use]
pub fn extract_version(page: &str, pattern: &Regex) -> Option<String> {
    let captures = pattern.captures(page)?;
    let matched = captures.get(1).or_else(|| captures.get(0))?;
    let version = matched.as_str().trim();
    (!version.is_empty()).then(|| version.to_string())
}

/// Scrape the vendor page for the latest published version.
///
/// A single attempt is made; any failure is final.
///
/// # Errors
/// Returns an error on connection failure, non-success HTTP status, an
/// unreadable body, an invalid pattern, or when the pattern does not match.
pub async fn fetch_latest_version(
    client: &reqwest::Client,
    profile: &AppProfile,
) -> Result<VersionInfo, InstallError> {
    let pattern = compile_version_pattern(&profile.version_pattern)?;
    let url = profile.page_url.as_str();

    debug!("Checking {url} for the latest version");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|error| InstallError::http("version check request failed", error))?;

    if !response.status().is_success() {
        return Err(InstallError::HttpStatus {
            context: "version check",
            url: url.to_string(),
            status: response.status(),
        });
    }

    let page = response
        .text()
        .await
        .map_err(|error| InstallError::http("failed to read version page", error))?;

    let version = extract_version(&page, &pattern).ok_or_else(|| InstallError::PatternMismatch {
        url: url.to_string(),
    })?;

    info!("Latest {} version is {version}", profile.name);
    Ok(VersionInfo::new(version))
}
