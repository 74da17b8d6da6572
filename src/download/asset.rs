//! Single asset downloading.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::DateTime;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, LAST_MODIFIED};
use reqwest::Response;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::api::FantiaApi;
use crate::config::OptionsConfig;
use crate::error::{Error, Result};
use crate::fs::{
    ensure_dir, filename_from_content_disposition, filename_from_url, sanitize_path_component,
};
use crate::media::resolve_extension_or_fallback;
use crate::output::create_download_bar;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The asset was written to this path.
    Saved(PathBuf),
    /// A file already existed at this path and was left alone.
    Skipped(PathBuf),
}

/// Download `url` to `destination`.
///
/// With `use_server_filename`, the file name comes from the server's
/// `Content-Disposition` header or the final URL instead, keeping the
/// destination's directory. The body is streamed to a temporary file next to
/// the destination and only renamed into place once complete.
pub async fn fetch_and_save(
    api: &FantiaApi,
    options: &OptionsConfig,
    url: &str,
    destination: &Path,
    use_server_filename: bool,
) -> Result<FetchOutcome> {
    let response = api.download_file(url).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let destination = if use_server_filename {
        server_destination(&response, destination)
    } else {
        destination.to_path_buf()
    };

    if destination.exists() {
        tracing::info!("File found (skipping): {}", destination.display());
        return Ok(FetchOutcome::Skipped(destination));
    }

    let parent = destination
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    ensure_dir(&parent).await?;

    let last_modified = parse_last_modified(response.headers());
    write_body(api, options, response, &parent, &destination).await?;

    if let Some(modified) = last_modified {
        if let Err(e) = set_modified(&destination, modified) {
            tracing::debug!("Could not set modification time: {}", e);
        }
    }

    tracing::info!("Downloaded: {}", destination.display());
    Ok(FetchOutcome::Saved(destination))
}

/// Stream the response body into `destination` via a temporary file.
async fn write_body(
    api: &FantiaApi,
    options: &OptionsConfig,
    response: Response,
    parent: &Path,
    destination: &Path,
) -> Result<()> {
    // The temp path removes the partial file when dropped on any early return.
    let (file, temp_path) = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(parent)?
        .into_parts();
    let mut writer =
        BufWriter::with_capacity(options.chunk_size, tokio::fs::File::from_std(file));

    let progress = match response.content_length() {
        Some(length) if !options.quiet && length > PROGRESS_THRESHOLD => {
            Some(create_download_bar(length))
        }
        _ => None,
    };

    let cancel = api.cancellation_token();
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                if let Some(pb) = &progress {
                    pb.abandon();
                }
                return Err(Error::Interrupted);
            }
            chunk = stream.next() => chunk,
        };

        let Some(chunk) = chunk else {
            break;
        };
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(pb) = &progress {
            pb.set_position(downloaded);
        }
    }

    writer.flush().await?;
    drop(writer);

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    temp_path.persist(destination).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Replace the file name of `destination` with the server-assigned one.
fn server_destination(response: &Response, destination: &Path) -> PathBuf {
    let from_header = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .and_then(|v| filename_from_content_disposition(&v));

    let name = from_header
        .or_else(|| filename_from_url(response.url()))
        .map(|name| sanitize_path_component(&name))
        .filter(|name| !name.is_empty());

    match (name, destination.parent()) {
        (Some(name), Some(parent)) => parent.join(name),
        (Some(name), None) => PathBuf::from(name),
        (None, _) => destination.to_path_buf(),
    }
}

fn parse_last_modified(headers: &HeaderMap) -> Option<SystemTime> {
    let value = headers.get(LAST_MODIFIED)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(value).ok().map(SystemTime::from)
}

fn set_modified(path: &Path, modified: SystemTime) -> std::io::Result<()> {
    std::fs::File::options()
        .write(true)
        .open(path)?
        .set_modified(modified)
}

/// Download an image into `directory` as `{stem}.{ext}`.
///
/// The extension comes from the declared content type of the image, probed
/// with a HEAD request.
pub async fn fetch_image(
    api: &FantiaApi,
    options: &OptionsConfig,
    url: &str,
    directory: &Path,
    stem: &str,
) -> Result<FetchOutcome> {
    let content_type = api.probe_content_type(url).await?;
    let extension = resolve_extension_or_fallback(url, &content_type);
    let destination = directory.join(format!("{}.{}", stem, extension));

    fetch_and_save(api, options, url, &destination, options.use_server_filenames).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_last_modified() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LAST_MODIFIED,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        let parsed = parse_last_modified(&headers).unwrap();
        let secs = parsed
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert_eq!(secs, 1_445_412_480);

        assert!(parse_last_modified(&HeaderMap::new()).is_none());
    }
}
