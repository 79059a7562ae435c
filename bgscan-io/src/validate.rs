//! Canonical block-order check.
//!
//! A well-formed container lays its blocks out as
//!
//! ```text
//! FileMetadata? PrinterMetadata Thumbnail* PrintMetadata SlicerMetadata GCode*
//! ```
//!
//! and nothing follows the slicer metadata except G-code blocks.

use crate::container::Container;
use crate::scanner::BlockScanner;
use crate::{Error, Result};
use bgscan_core::{BlockCodec, BlockType, ScanConfig};
use log::debug;
use std::io::{Read, Seek, SeekFrom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    FileOrPrinter,
    Printer,
    ThumbnailOrPrint,
    Slicer,
    GCodeOrEnd,
}

impl Expect {
    fn next(self, found: BlockType) -> Option<Expect> {
        match (self, found) {
            (Expect::FileOrPrinter, BlockType::FileMetadata) => Some(Expect::Printer),
            (Expect::FileOrPrinter | Expect::Printer, BlockType::PrinterMetadata) => {
                Some(Expect::ThumbnailOrPrint)
            }
            (Expect::ThumbnailOrPrint, BlockType::Thumbnail) => Some(Expect::ThumbnailOrPrint),
            (Expect::ThumbnailOrPrint, BlockType::PrintMetadata) => Some(Expect::Slicer),
            (Expect::Slicer, BlockType::SlicerMetadata) => Some(Expect::GCodeOrEnd),
            (Expect::GCodeOrEnd, BlockType::GCode) => Some(Expect::GCodeOrEnd),
            _ => None,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Expect::FileOrPrinter => "file or printer metadata",
            Expect::Printer => "printer metadata",
            Expect::ThumbnailOrPrint => "thumbnail or print metadata",
            Expect::Slicer => "slicer metadata",
            Expect::GCodeOrEnd => "G-code or end of file",
        }
    }
}

/// Checks that the blocks of `container` follow the canonical order.
///
/// Payloads are skipped, not decoded. The read position is restored
/// afterwards, whether or not the check passes.
///
/// # Errors
/// - [`Error::InvalidSequence`] at the first out-of-order block.
/// - [`Error::TruncatedSequence`] if the file ends before the slicer
///   metadata.
/// - Header and block header decode failures as for any scan.
/// - An I/O error if the read position cannot be restored. A failed check
///   is reported in preference to it.
pub fn validate_block_order<S, C>(
    container: &mut Container<S>,
    codec: &mut C,
    config: &ScanConfig,
) -> Result<()>
where
    S: Read + Seek,
    C: BlockCodec,
{
    let start = container.position()?;
    let outcome = walk(container, codec, config);
    let restored = container
        .stream_mut()
        .and_then(|stream| stream.seek(SeekFrom::Start(start)).map_err(Error::from));
    outcome.and(restored.map(|_| ()))
}

fn walk<S, C>(container: &mut Container<S>, codec: &mut C, config: &ScanConfig) -> Result<()>
where
    S: Read + Seek,
    C: BlockCodec,
{
    let mut scanner = BlockScanner::begin(container, codec, config)?;
    let mut state = Expect::FileOrPrinter;
    let mut blocks = 0usize;

    loop {
        if scanner.at_end()? {
            if state == Expect::GCodeOrEnd {
                debug!("block order valid ({blocks} blocks)");
                return Ok(());
            }
            return Err(Error::TruncatedSequence {
                expected: state.describe().to_string(),
            });
        }

        let header = scanner.advance()?;
        state = state
            .next(header.block_type)
            .ok_or_else(|| Error::InvalidSequence {
                expected: state.describe().to_string(),
                found: header.block_type,
            })?;
        scanner.skip(&header)?;
        blocks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgscan_core::{ResultCode, ThumbnailFormat};
    use bgscan_testing::{prusa_mini_sample, ScriptedCodec};
    use std::io::Cursor;

    /// Cursor that refuses to seek back to one absolute offset.
    struct RefusingSeek {
        inner: Cursor<Vec<u8>>,
        refused: u64,
    }

    impl Read for RefusingSeek {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for RefusingSeek {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            if pos == SeekFrom::Start(self.refused) {
                return Err(std::io::Error::other("seek refused"));
            }
            self.inner.seek(pos)
        }
    }

    fn refusing_restore(codec: &ScriptedCodec) -> Container<RefusingSeek> {
        let mut inner = Cursor::new(codec.stream_bytes());
        inner.set_position(100);
        Container::new(
            RefusingSeek {
                inner,
                refused: 100,
            },
            "refusing",
        )
    }

    fn check(mut codec: ScriptedCodec) -> (Result<()>, ScriptedCodec) {
        let mut container = Container::from_bytes(codec.stream_bytes());
        let result = validate_block_order(&mut container, &mut codec, &ScanConfig::new());
        (result, codec)
    }

    #[test]
    fn test_sample_is_valid() {
        let (result, codec) = check(prusa_mini_sample());
        assert!(result.is_ok());
        assert!(codec.decoded().is_empty());
        assert_eq!(codec.skipped().len(), codec.block_count());
    }

    #[test]
    fn test_file_metadata_is_optional() {
        let codec = ScriptedCodec::new()
            .metadata(BlockType::PrinterMetadata, &[("printer_model", "MINI")])
            .metadata(BlockType::PrintMetadata, &[("filament cost", "0.08")])
            .metadata(BlockType::SlicerMetadata, &[("layer_height", "0.15")])
            .gcode("G28\n");
        assert!(check(codec).0.is_ok());
    }

    #[test]
    fn test_thumbnail_after_print_metadata() {
        let codec = ScriptedCodec::new()
            .metadata(BlockType::PrinterMetadata, &[("printer_model", "MINI")])
            .metadata(BlockType::PrintMetadata, &[("filament cost", "0.08")])
            .thumbnail(ThumbnailFormat::Png, 16, 16, &[1]);

        let err = check(codec).0.unwrap_err();
        match err {
            Error::InvalidSequence { expected, found } => {
                assert_eq!(expected, "slicer metadata");
                assert_eq!(found, BlockType::Thumbnail);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_gcode_blocks_are_optional() {
        let codec = ScriptedCodec::new()
            .metadata(BlockType::PrinterMetadata, &[("printer_model", "MINI")])
            .metadata(BlockType::PrintMetadata, &[("filament cost", "0.08")])
            .metadata(BlockType::SlicerMetadata, &[("layer_height", "0.15")]);

        let (result, codec) = check(codec);
        assert!(result.is_ok());
        assert_eq!(codec.skipped().len(), 3);
    }

    #[test]
    fn test_missing_slicer_metadata_is_truncated() {
        let codec = ScriptedCodec::new()
            .metadata(BlockType::PrinterMetadata, &[("printer_model", "MINI")])
            .metadata(BlockType::PrintMetadata, &[("filament cost", "0.08")]);

        let err = check(codec).0.unwrap_err();
        assert!(
            matches!(err, Error::TruncatedSequence { expected } if expected == "slicer metadata")
        );
    }

    #[test]
    fn test_metadata_after_gcode() {
        let codec = prusa_mini_sample().metadata(BlockType::PrinterMetadata, &[("a", "b")]);
        let err = check(codec).0.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSequence {
                found: BlockType::PrinterMetadata,
                ..
            }
        ));
    }

    #[test]
    fn test_position_restored() {
        let mut codec = prusa_mini_sample();
        let mut container = Container::from_bytes(codec.stream_bytes());
        container.stream_mut().unwrap().set_position(5);

        validate_block_order(&mut container, &mut codec, &ScanConfig::new()).unwrap();
        assert_eq!(container.position().unwrap(), 5);

        let mut codec = ScriptedCodec::new().broken_header(ResultCode::InvalidChecksum);
        let mut container = Container::from_bytes(codec.stream_bytes());
        container.stream_mut().unwrap().set_position(2);
        let err = validate_block_order(&mut container, &mut codec, &ScanConfig::new()).unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::InvalidChecksum));
        assert_eq!(container.position().unwrap(), 2);
    }

    #[test]
    fn test_failed_check_wins_over_failed_restore() {
        let mut codec = ScriptedCodec::new()
            .metadata(BlockType::PrintMetadata, &[("filament cost", "0.08")]);
        let mut container = refusing_restore(&codec);

        let err = validate_block_order(&mut container, &mut codec, &ScanConfig::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSequence {
                found: BlockType::PrintMetadata,
                ..
            }
        ));

        let mut codec = prusa_mini_sample();
        let mut container = refusing_restore(&codec);
        let err = validate_block_order(&mut container, &mut codec, &ScanConfig::new()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
