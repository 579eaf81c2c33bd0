use std::io::Read;
use std::path::Path;

use log::{debug, info};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::InstallError;

const FALLBACK_ARCHIVE_NAME: &str = "download.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// An archive with the same name was already present.
    Reused,
    Downloaded { bytes: u64 },
}

/// File name of the archive behind `url`: its last path segment, without
/// query string, or a fixed fallback when that segment is unusable.
#[must_use]
pub fn archive_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let raw_name = path.rsplit('/').next().unwrap_or_default();
    Path::new(raw_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && !n.contains(".."))
        .unwrap_or(FALLBACK_ARCHIVE_NAME)
        .to_string()
}

/// Fetch `url` into `dest` unless `dest` already exists and `force` is off.
///
/// A failed transfer leaves whatever was written in place.
///
/// # Errors
/// Returns an error when the request fails, the server answers with a
/// non-success status, or the file cannot be written.
pub async fn download_archive(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    force: bool,
) -> Result<DownloadOutcome, InstallError> {
    if !force && dest.is_file() {
        info!("Using existing archive {}", dest.display());
        return Ok(DownloadOutcome::Reused);
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|error| {
            InstallError::io_with_path("failed to create state directory", parent, &error)
        })?;
    }

    info!("Downloading {url}");
    let bytes = download_file(client, url, dest).await?;
    Ok(DownloadOutcome::Downloaded { bytes })
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, InstallError> {
    use futures_util::StreamExt;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|error| InstallError::http("download request failed", error))?;

    if !response.status().is_success() {
        return Err(InstallError::HttpStatus {
            context: "download",
            url: url.to_string(),
            status: response.status(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut reported_percent = 0;

    let mut file = tokio::fs::File::create(dest).await.map_err(|error| {
        InstallError::io_with_path("failed to create archive file", dest, &error)
    })?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|error| InstallError::http("download stream error", error))?;
        file.write_all(&chunk).await.map_err(|error| {
            InstallError::io_with_path("failed to write archive data", dest, &error)
        })?;
        downloaded += chunk.len() as u64;

        if total > 0 {
            let percent = downloaded * 100 / total;
            if percent >= reported_percent + 10 {
                reported_percent = percent - percent % 10;
                debug!("Downloaded {downloaded}/{total} bytes ({reported_percent}%)");
            }
        }
    }

    file.flush().await.map_err(|error| {
        InstallError::io_with_path("failed to flush archive file", dest, &error)
    })?;

    info!("Download complete: {downloaded} bytes");
    Ok(downloaded)
}

/// Check `archive` against a `sha256sum`-style listing served at
/// `checksum_url`.
///
/// # Errors
/// Returns an error when the listing cannot be fetched, has no entry for the
/// archive, or the digest differs.
pub async fn verify_archive_checksum(
    client: &reqwest::Client,
    checksum_url: &str,
    archive: &Path,
) -> Result<(), InstallError> {
    let file_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let response = client
        .get(checksum_url)
        .send()
        .await
        .map_err(|error| InstallError::http("failed to download checksums", error))?;
    if !response.status().is_success() {
        return Err(InstallError::HttpStatus {
            context: "checksum download",
            url: checksum_url.to_string(),
            status: response.status(),
        });
    }
    let checksums = response
        .text()
        .await
        .map_err(|error| InstallError::http("failed to read checksums", error))?;

    let expected = parse_expected_checksum(&checksums, &file_name).ok_or_else(|| {
        InstallError::Config(format!(
            "no checksum entry for '{file_name}' at {checksum_url}"
        ))
    })?;
    let actual = sha256_file(archive)?;

    if actual.eq_ignore_ascii_case(&expected) {
        info!("Checksum verified for {file_name}");
        Ok(())
    } else {
        Err(InstallError::ChecksumMismatch {
            file_name,
            expected,
            actual,
        })
    }
}

fn parse_expected_checksum(checksums: &str, file_name: &str) -> Option<String> {
    checksums.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let hash = parts.next()?;
        let name = parts
            .next()?
            .trim_start_matches('*')
            .trim_start_matches("./");
        (name == file_name).then(|| hash.to_ascii_lowercase())
    })
}

pub(crate) fn sha256_file(path: &Path) -> Result<String, InstallError> {
    let mut file = std::fs::File::open(path).map_err(|error| {
        InstallError::io_with_path("failed to open file for checksum", path, &error)
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];

    loop {
        let read = file.read(&mut buffer).map_err(|error| {
            InstallError::io_with_path("failed to read file for checksum", path, &error)
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
