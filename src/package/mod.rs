use anyhow::Context;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::utils;
use crate::Result;

/// Wrap the rendered mashup in a single-entry zip archive at
/// `archive_path`, preserving the input's base name. Any I/O error is fatal
/// to the run.
pub fn package(output_file: &Path, archive_path: &Path) -> Result<()> {
    utils::check_file_accessible(output_file)?;

    let entry_name = output_file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Output file has no usable file name")?;

    let archive = fs_err::File::create(archive_path)
        .context("Failed to create archive file")?;

    let mut writer = ZipWriter::new(archive);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer
        .start_file(entry_name, options)
        .context("Failed to start archive entry")?;

    let mut input = fs_err::File::open(output_file)?;
    std::io::copy(&mut input, &mut writer).context("Failed to write archive entry")?;

    writer.finish().context("Failed to finalize archive")?;

    tracing::info!(
        "Packaged {} into {}",
        output_file.display(),
        archive_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_package_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("mashup.wav");
        fs_err::write(&output, b"fake audio bytes").unwrap();

        let archive_path = dir.path().join("mashup.zip");
        package(&output, &archive_path).unwrap();

        let file = fs_err::File::open(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "mashup.wav");

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"fake audio bytes");
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = package(
            &dir.path().join("does-not-exist.wav"),
            &dir.path().join("mashup.zip"),
        );
        assert!(result.is_err());
    }
}
