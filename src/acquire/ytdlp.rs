use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{scan_downloads, DownloadedAsset, MediaAcquirer};
use crate::Result;

/// YouTube audio acquirer using yt-dlp's search downloader.
///
/// One invocation performs the search and downloads the best available audio
/// stream of every result. Individual download failures are tolerated
/// (`--ignore-errors`); the run proceeds with whatever landed on disk and
/// only a completely empty download directory is treated as a failure by the
/// pipeline.
pub struct YtDlpAcquirer {
    yt_dlp_path: String,
}

impl YtDlpAcquirer {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(matches!(output, Ok(out) if out.status.success()))
    }

    /// Build the yt-dlp search query for an artist's songs
    fn search_query(artist: &str, video_count: u32) -> String {
        format!("ytsearch{}:{} songs", video_count, artist)
    }
}

impl Default for YtDlpAcquirer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaAcquirer for YtDlpAcquirer {
    async fn acquire(
        &self,
        artist: &str,
        video_count: u32,
        download_dir: &Path,
    ) -> Result<Vec<DownloadedAsset>> {
        if !self.check_availability().await? {
            anyhow::bail!(
                "yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp"
            );
        }

        fs_err::create_dir_all(download_dir)?;

        let query = Self::search_query(artist, video_count);
        let output_template = download_dir.join("%(title)s.%(ext)s");

        tracing::info!("Searching and downloading: {}", query);

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &output_template.to_string_lossy(),
                // Audio-only stream when one exists, full stream otherwise
                "--format",
                "bestaudio[ext=m4a]/bestaudio/best",
                "--ignore-errors",
                "--no-warnings",
                "--quiet",
                "--newline",
                &query,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let assets = scan_downloads(download_dir)?;

        // With --ignore-errors a non-zero exit only means some results
        // failed; the run is still viable if anything was downloaded.
        if !output.status.success() && assets.is_empty() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        tracing::info!(
            "Downloaded {} of {} requested result(s)",
            assets.len(),
            video_count
        );

        Ok(assets)
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_format() {
        assert_eq!(
            YtDlpAcquirer::search_query("Test Artist", 11),
            "ytsearch11:Test Artist songs"
        );
    }
}
