//! Collaborator contracts for container codecs and converters.
//!
//! The scanning layer never inspects raw container bytes. It drives an
//! implementation of [`BlockCodec`] over a seekable stream and consumes the
//! decoded headers and payloads it returns.

use crate::block::{
    BlockHeader, BlockType, FileHeader, GCodeEncoding, MetadataEncoding, ThumbnailParams,
};
use crate::config::BinarizeConfig;
use crate::result::Outcome;
use std::io::{Read, Seek, Write};

/// Decoded block payload. The variant depends on the block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockPayload {
    /// Contents of a file, printer, print or slicer metadata block.
    Metadata {
        encoding: MetadataEncoding,
        entries: Vec<(String, String)>,
    },
    /// Contents of a thumbnail block.
    Thumbnail {
        params: ThumbnailParams,
        data: Vec<u8>,
    },
    /// Contents of a G-code block, as text.
    GCode { encoding: GCodeEncoding, text: String },
}

impl BlockPayload {
    /// Short name of the payload shape, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BlockPayload::Metadata { .. } => "metadata",
            BlockPayload::Thumbnail { .. } => "thumbnail",
            BlockPayload::GCode { .. } => "gcode",
        }
    }
}

/// Decoder for the binary container format.
///
/// Stream positioning contract:
/// - `decode_file_header` is called with the stream at offset 0 and leaves it
///   at the first block header.
/// - `decode_next_block_header` leaves the stream at the start of the block
///   payload. With `wanted` set it skips non-matching blocks; if none is left
///   it returns [`ResultCode::BlockNotFound`](crate::ResultCode::BlockNotFound)
///   and restores the original position.
/// - `decode_block_payload` and `skip_block_payload` leave the stream at the
///   next block header.
pub trait BlockCodec {
    /// Decodes the file header, rejecting versions above `max_version`.
    fn decode_file_header<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        max_version: Option<u32>,
    ) -> Outcome<FileHeader>;

    /// Decodes the next block header, optionally skipping to a wanted type.
    fn decode_next_block_header<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        file_header: &FileHeader,
        wanted: Option<BlockType>,
    ) -> Outcome<BlockHeader>;

    /// Decodes (and decompresses) the payload of the current block.
    fn decode_block_payload<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        file_header: &FileHeader,
        block_header: &BlockHeader,
    ) -> Outcome<BlockPayload>;

    /// Skips the payload of the current block.
    fn skip_block_payload<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        file_header: &FileHeader,
        block_header: &BlockHeader,
    ) -> Outcome<()> {
        self.decode_block_payload(stream, file_header, block_header)
            .map(|_| ())
    }
}

/// Converter between ASCII G-code and the binary container.
pub trait Converter {
    /// Converts ASCII G-code read from `src` into a binary container.
    fn ascii_to_binary<R: Read + Seek, W: Write + Seek>(
        &mut self,
        src: &mut R,
        dst: &mut W,
        config: &BinarizeConfig,
    ) -> Outcome<()>;

    /// Converts a binary container read from `src` back into ASCII G-code.
    fn binary_to_ascii<R: Read + Seek, W: Write + Seek>(
        &mut self,
        src: &mut R,
        dst: &mut W,
        verify_checksum: bool,
    ) -> Outcome<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ThumbnailFormat;

    #[test]
    fn test_payload_kind() {
        let metadata = BlockPayload::Metadata {
            encoding: MetadataEncoding::Ini,
            entries: vec![("printer_model".to_string(), "MINI".to_string())],
        };
        let thumbnail = BlockPayload::Thumbnail {
            params: ThumbnailParams::new(ThumbnailFormat::Png, 16, 16),
            data: vec![0x89],
        };
        let gcode = BlockPayload::GCode {
            encoding: GCodeEncoding::None,
            text: "G28\n".to_string(),
        };

        assert_eq!(metadata.kind(), "metadata");
        assert_eq!(thumbnail.kind(), "thumbnail");
        assert_eq!(gcode.kind(), "gcode");
    }
}
