//! Thumbnail export.

use crate::Result;
use bgscan_core::ThumbnailRecord;
use log::debug;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes each thumbnail's encoded bytes to `dir/{stem}{index}.{ext}`.
///
/// `dir` is created if missing. Existing files with the same names are
/// overwritten. Returns the written paths in thumbnail order.
///
/// # Errors
/// Returns an error if the directory or a file cannot be written.
pub fn export_thumbnails<P: AsRef<Path>>(
    thumbnails: &[ThumbnailRecord],
    dir: P,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(thumbnails.len());
    for (index, thumbnail) in thumbnails.iter().enumerate() {
        let path = dir.join(thumbnail.file_name(stem, index));
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(&thumbnail.bytes)?;
        writer.flush()?;

        debug!(
            "wrote {}x{} thumbnail to {}",
            thumbnail.params.width,
            thumbnail.params.height,
            path.display()
        );
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgscan_core::{ThumbnailFormat, ThumbnailParams};
    use bgscan_testing::{LARGE_QOI, SMALL_PNG};
    use tempfile::tempdir;

    #[test]
    fn test_export_names_and_contents() {
        let dir = tempdir().unwrap();
        let thumbnails = vec![
            ThumbnailRecord::new(
                ThumbnailParams::new(ThumbnailFormat::Png, 16, 16),
                SMALL_PNG.to_vec(),
            ),
            ThumbnailRecord::new(
                ThumbnailParams::new(ThumbnailFormat::Qoi, 313, 173),
                LARGE_QOI.to_vec(),
            ),
        ];

        let paths = export_thumbnails(&thumbnails, dir.path(), "thumb").unwrap();

        assert_eq!(
            paths,
            vec![dir.path().join("thumb0.png"), dir.path().join("thumb1.qoi")]
        );
        assert_eq!(fs::read(&paths[0]).unwrap(), SMALL_PNG);
        assert_eq!(fs::read(&paths[1]).unwrap(), LARGE_QOI);
    }

    #[test]
    fn test_export_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let thumbnails = vec![ThumbnailRecord::new(
            ThumbnailParams::new(ThumbnailFormat::Jpg, 8, 8),
            vec![0xFF, 0xD8],
        )];

        let paths = export_thumbnails(&thumbnails, &nested, "preview").unwrap();
        assert_eq!(paths, vec![nested.join("preview0.jpg")]);
        assert!(paths[0].exists());
    }

    #[test]
    fn test_export_nothing() {
        let dir = tempdir().unwrap();
        let paths = export_thumbnails(&[], dir.path(), "thumb").unwrap();
        assert!(paths.is_empty());
    }
}
