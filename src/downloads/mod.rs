//! Persisting response bodies to disk
//!
//! Target file resolution, in priority order:
//! 1. the explicit `--output` path
//! 2. the `Content-Disposition` filename
//! 3. the URL's last path segment, with its own extension or one derived from `Content-Type`
//! 4. a local timestamp, `yyyyMMdd-HHmmss.tmp`

use bytes::Bytes;
use content_disposition::parse_content_disposition;
use sanitize_filename::Options as SanitizeOptions;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::errors::{QuicpulseError, Result};
use crate::http::HeaderList;

/// Extract the filename of a `Content-Disposition` header, RFC 5987 form included
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    parse_content_disposition(header)
        .filename_full()
        .map(|name| name.trim().trim_matches('.').to_string())
        .filter(|name| !name.is_empty())
}

/// Sanitize a server-supplied filename, keeping only the last path component
pub fn sanitize_filename(name: &str) -> String {
    let name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    sanitize_filename::sanitize_with_options(
        name,
        SanitizeOptions {
            replacement: "_",
            windows: true,
            truncate: true,
        },
    )
}

/// Guess a filename from the URL path, falling back to the MIME type for the extension
pub fn filename_from_url(url: &Url, content_type: Option<&str>) -> Option<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())?;

    let path = Path::new(segment);
    let stem = path.file_stem().and_then(|s| s.to_str())?;
    let extension = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => Some(ext.to_string()),
        None => content_type.and_then(extension_for_mime),
    };

    Some(match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem.to_string(),
    })
}

/// Preferred extension for a `Content-Type` value
fn extension_for_mime(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_lowercase();
    let mime: mime::Mime = essence.parse().ok()?;
    if mime == mime::APPLICATION_JSON {
        return Some("json".to_string());
    }
    if mime == mime::TEXT_PLAIN {
        return Some("txt".to_string());
    }
    mime_guess::get_mime_extensions(&mime)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
}

fn timestamp_filename() -> String {
    format!("{}.tmp", chrono::Local::now().format("%Y%m%d-%H%M%S"))
}

/// Resolve the download target for a response
pub fn resolve_target(output: Option<&Path>, url: &Url, headers: &HeaderList) -> PathBuf {
    if let Some(path) = output {
        return path.to_path_buf();
    }

    let from_header = headers
        .get("Content-Disposition")
        .and_then(filename_from_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty() && name != "_");

    let name = from_header
        .or_else(|| filename_from_url(url, headers.get("Content-Type")).map(|n| sanitize_filename(&n)))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(timestamp_filename);

    PathBuf::from(name)
}

/// Write `body` to `path`, appending when `append` is set
pub async fn write_body(path: &Path, body: &Bytes, append: bool) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .await
        .map_err(|e| QuicpulseError::Download(format!("Cannot open '{}': {}", path.display(), e)))?;

    file.write_all(body)
        .await
        .map_err(|e| QuicpulseError::Download(format!("Cannot write '{}': {}", path.display(), e)))?;
    file.flush().await?;
    Ok(())
}
