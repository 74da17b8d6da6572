//! Crawljob queue file for an external downloader.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Name of the crawljob file in the download root.
pub const CRAWLJOB_FILENAME: &str = "external_links.crawljob";

/// Appends external links to a JDownloader folder-watch crawljob file.
///
/// Entries are only ever appended, so the file accumulates across runs.
#[derive(Debug, Clone)]
pub struct CrawljobWriter {
    path: PathBuf,
}

impl CrawljobWriter {
    /// Writer for the crawljob file inside `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(CRAWLJOB_FILENAME),
        }
    }

    /// Path of the crawljob file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry per link, all targeting `download_folder`.
    pub async fn append(&self, links: &[String], download_folder: &Path) -> Result<()> {
        if links.is_empty() {
            return Ok(());
        }

        let mut content = String::new();
        for link in links {
            content.push_str(&format_entry(link, download_folder));
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            "Appended {} link(s) to {}",
            links.len(),
            self.path.display()
        );

        Ok(())
    }
}

fn format_entry(link: &str, download_folder: &Path) -> String {
    format!(
        "text={}\n\
         downloadFolder={}\n\
         enabled=true\n\
         autoStart=true\n\
         forcedStart=true\n\
         autoConfirm=true\n\
         addOfflineLink=true\n\
         extractAfterDownload=false\n\
         \n",
        link,
        download_folder.display()
    )
}
