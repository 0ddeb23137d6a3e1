use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod ytdlp;

use crate::Result;

/// Audio/container formats the pipeline recognizes in the download
/// directory. Anything else left behind by the downloader is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Webm,
    M4a,
    Mp4,
    Wav,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Webm => "webm",
            SourceFormat::M4a => "m4a",
            SourceFormat::Mp4 => "mp4",
            SourceFormat::Wav => "wav",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "webm" => Some(SourceFormat::Webm),
            "m4a" | "aac" => Some(SourceFormat::M4a),
            "mp4" => Some(SourceFormat::Mp4),
            "wav" => Some(SourceFormat::Wav),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// One successfully downloaded search result, ready for the compositor.
#[derive(Debug, Clone)]
pub struct DownloadedAsset {
    /// Location in the run's download directory
    pub path: PathBuf,

    /// Container/codec family inferred from the file extension
    pub format: SourceFormat,
}

/// Trait for fetching an artist's audio from a media platform.
///
/// The acquirer does not guarantee all requested downloads succeed; it
/// returns however many it obtained, and callers treat zero as a failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaAcquirer: Send + Sync {
    /// Search the platform for `video_count` results matching the artist and
    /// download the best available audio of each into `download_dir`.
    async fn acquire(
        &self,
        artist: &str,
        video_count: u32,
        download_dir: &Path,
    ) -> Result<Vec<DownloadedAsset>>;

    /// Name of the backing platform/tool, for logs and error messages
    fn source_name(&self) -> &'static str;
}

/// Enumerate recognized audio files in a download directory, sorted by file
/// name so concatenation order is stable across filesystems.
pub fn scan_downloads(download_dir: &Path) -> Result<Vec<DownloadedAsset>> {
    let mut assets = Vec::new();

    if !download_dir.is_dir() {
        return Ok(assets);
    }

    for entry in fs_err::read_dir(download_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(format) = SourceFormat::from_path(&path) {
            assets.push(DownloadedAsset { path, format });
        }
    }

    assets.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(assets)
}
