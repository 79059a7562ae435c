//! Block and header vocabulary of the binary G-code container.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type of a container block.
///
/// Raw values outside the known range are kept as [`BlockType::Unknown`]
/// so scans can react to block types added by newer writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlockType {
    /// File-level metadata (producer, ...).
    FileMetadata,
    /// G-code instruction stream.
    GCode,
    /// Full slicer configuration.
    SlicerMetadata,
    /// Printer settings.
    PrinterMetadata,
    /// Print statistics.
    PrintMetadata,
    /// Embedded preview image.
    Thumbnail,
    /// Unrecognised raw block type.
    Unknown(u16),
}

impl BlockType {
    /// Creates a block type from its raw value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => BlockType::FileMetadata,
            1 => BlockType::GCode,
            2 => BlockType::SlicerMetadata,
            3 => BlockType::PrinterMetadata,
            4 => BlockType::PrintMetadata,
            5 => BlockType::Thumbnail,
            other => BlockType::Unknown(other),
        }
    }

    /// Returns the raw value of this block type.
    #[must_use]
    pub fn raw(self) -> u16 {
        match self {
            BlockType::FileMetadata => 0,
            BlockType::GCode => 1,
            BlockType::SlicerMetadata => 2,
            BlockType::PrinterMetadata => 3,
            BlockType::PrintMetadata => 4,
            BlockType::Thumbnail => 5,
            BlockType::Unknown(raw) => raw,
        }
    }

    /// Returns true for the four key/value metadata block types.
    #[must_use]
    pub fn is_metadata(self) -> bool {
        matches!(
            self,
            BlockType::FileMetadata
                | BlockType::SlicerMetadata
                | BlockType::PrinterMetadata
                | BlockType::PrintMetadata
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::FileMetadata => f.write_str("FileMetadata"),
            BlockType::GCode => f.write_str("GCode"),
            BlockType::SlicerMetadata => f.write_str("SlicerMetadata"),
            BlockType::PrinterMetadata => f.write_str("PrinterMetadata"),
            BlockType::PrintMetadata => f.write_str("PrintMetadata"),
            BlockType::Thumbnail => f.write_str("Thumbnail"),
            BlockType::Unknown(raw) => write!(f, "Unknown({raw})"),
        }
    }
}

/// Compression applied to a block payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum CompressionType {
    #[default]
    None = 0,
    Deflate = 1,
    Heatshrink11_4 = 2,
    Heatshrink12_4 = 3,
}

impl CompressionType {
    /// Creates a compression type from its raw value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Deflate),
            2 => Some(CompressionType::Heatshrink11_4),
            3 => Some(CompressionType::Heatshrink12_4),
            _ => None,
        }
    }
}

/// Checksum algorithm declared in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum ChecksumType {
    #[default]
    None = 0,
    Crc32 = 1,
}

impl ChecksumType {
    /// Creates a checksum type from its raw value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(ChecksumType::None),
            1 => Some(ChecksumType::Crc32),
            _ => None,
        }
    }

    /// Size in bytes of the checksum trailing each block.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            ChecksumType::None => 0,
            ChecksumType::Crc32 => 4,
        }
    }
}

/// Encoding of metadata block contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum MetadataEncoding {
    #[default]
    Ini = 0,
}

impl MetadataEncoding {
    /// Creates a metadata encoding from its raw value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(MetadataEncoding::Ini),
            _ => None,
        }
    }
}

/// Encoding of G-code block contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum GCodeEncoding {
    #[default]
    None = 0,
    MeatPack = 1,
    MeatPackComments = 2,
}

impl GCodeEncoding {
    /// Creates a G-code encoding from its raw value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(GCodeEncoding::None),
            1 => Some(GCodeEncoding::MeatPack),
            2 => Some(GCodeEncoding::MeatPackComments),
            _ => None,
        }
    }
}

/// Image format of an embedded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum ThumbnailFormat {
    Png = 0,
    Jpg = 1,
    Qoi = 2,
}

impl ThumbnailFormat {
    /// Creates a thumbnail format from its raw value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(ThumbnailFormat::Png),
            1 => Some(ThumbnailFormat::Jpg),
            2 => Some(ThumbnailFormat::Qoi),
            _ => None,
        }
    }

    /// File extension conventionally used for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ThumbnailFormat::Png => "png",
            ThumbnailFormat::Jpg => "jpg",
            ThumbnailFormat::Qoi => "qoi",
        }
    }
}

/// Decoded file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileHeader {
    /// Magic number, `GCDE` in little-endian byte order.
    pub magic: u32,
    /// Container format version.
    pub version: u32,
    /// Checksum algorithm used by every block.
    pub checksum_type: ChecksumType,
}

impl FileHeader {
    /// Magic bytes opening every container.
    pub const MAGIC: [u8; 4] = *b"GCDE";

    /// Highest container version understood by this crate.
    pub const VERSION: u32 = 1;

    /// Creates a header for the current version.
    #[must_use]
    pub fn new(checksum_type: ChecksumType) -> Self {
        Self {
            magic: u32::from_le_bytes(Self::MAGIC),
            version: Self::VERSION,
            checksum_type,
        }
    }

    /// Returns true if the magic number matches [`FileHeader::MAGIC`].
    #[must_use]
    pub fn has_valid_magic(&self) -> bool {
        self.magic == u32::from_le_bytes(Self::MAGIC)
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new(ChecksumType::None)
    }
}

/// Decoded block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockHeader {
    /// Block type.
    pub block_type: BlockType,
    /// Payload compression.
    pub compression: CompressionType,
    /// Payload size after decompression, in bytes.
    pub uncompressed_size: u32,
    /// Payload size on disk when compressed, in bytes.
    pub compressed_size: u32,
    /// Stream offset of this header.
    pub position: u64,
}

impl BlockHeader {
    /// Creates an uncompressed block header.
    #[must_use]
    pub fn new(block_type: BlockType, uncompressed_size: u32, position: u64) -> Self {
        Self {
            block_type,
            compression: CompressionType::None,
            uncompressed_size,
            compressed_size: 0,
            position,
        }
    }

    /// Sets the compression and on-disk size.
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionType, compressed_size: u32) -> Self {
        self.compression = compression;
        self.compressed_size = compressed_size;
        self
    }

    /// Size of the stored payload data, in bytes.
    #[must_use]
    pub fn payload_size(&self) -> u32 {
        match self.compression {
            CompressionType::None => self.uncompressed_size,
            _ => self.compressed_size,
        }
    }
}

/// Format and dimensions of an embedded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThumbnailParams {
    pub format: ThumbnailFormat,
    pub width: u16,
    pub height: u16,
}

impl ThumbnailParams {
    /// Creates thumbnail parameters.
    #[must_use]
    pub fn new(format: ThumbnailFormat, width: u16, height: u16) -> Self {
        Self {
            format,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_raw_round_trip() {
        for raw in 0..6 {
            let ty = BlockType::from_raw(raw);
            assert!(!matches!(ty, BlockType::Unknown(_)));
            assert_eq!(ty.raw(), raw);
        }
        assert_eq!(BlockType::from_raw(42), BlockType::Unknown(42));
        assert_eq!(BlockType::Unknown(42).raw(), 42);
    }

    #[test]
    fn test_block_type_is_metadata() {
        assert!(BlockType::FileMetadata.is_metadata());
        assert!(BlockType::PrinterMetadata.is_metadata());
        assert!(BlockType::PrintMetadata.is_metadata());
        assert!(BlockType::SlicerMetadata.is_metadata());
        assert!(!BlockType::GCode.is_metadata());
        assert!(!BlockType::Thumbnail.is_metadata());
        assert!(!BlockType::Unknown(9).is_metadata());
    }

    #[test]
    fn test_payload_size_depends_on_compression() {
        let plain = BlockHeader::new(BlockType::GCode, 1000, 10);
        assert_eq!(plain.payload_size(), 1000);

        let packed = plain.with_compression(CompressionType::Heatshrink12_4, 400);
        assert_eq!(packed.payload_size(), 400);
    }

    #[test]
    fn test_file_header_defaults() {
        let header = FileHeader::new(ChecksumType::Crc32);
        assert!(header.has_valid_magic());
        assert_eq!(header.version, FileHeader::VERSION);
        assert_eq!(header.checksum_type.size(), 4);
        assert_eq!(FileHeader::default().checksum_type.size(), 0);
    }

    #[test]
    fn test_thumbnail_format_extension() {
        assert_eq!(ThumbnailFormat::from_raw(0).map(ThumbnailFormat::extension), Some("png"));
        assert_eq!(ThumbnailFormat::from_raw(1).map(ThumbnailFormat::extension), Some("jpg"));
        assert_eq!(ThumbnailFormat::from_raw(2).map(ThumbnailFormat::extension), Some("qoi"));
        assert_eq!(ThumbnailFormat::from_raw(3), None);
    }

    #[test]
    fn test_header_field_enums_from_raw() {
        assert_eq!(CompressionType::from_raw(0), Some(CompressionType::None));
        assert_eq!(CompressionType::from_raw(1), Some(CompressionType::Deflate));
        assert_eq!(CompressionType::from_raw(2), Some(CompressionType::Heatshrink11_4));
        assert_eq!(CompressionType::from_raw(3), Some(CompressionType::Heatshrink12_4));
        assert_eq!(CompressionType::from_raw(4), None);

        assert_eq!(ChecksumType::from_raw(0), Some(ChecksumType::None));
        assert_eq!(ChecksumType::from_raw(1), Some(ChecksumType::Crc32));
        assert_eq!(ChecksumType::from_raw(2), None);

        assert_eq!(MetadataEncoding::from_raw(0), Some(MetadataEncoding::Ini));
        assert_eq!(MetadataEncoding::from_raw(1), None);

        assert_eq!(GCodeEncoding::from_raw(0), Some(GCodeEncoding::None));
        assert_eq!(GCodeEncoding::from_raw(1), Some(GCodeEncoding::MeatPack));
        assert_eq!(GCodeEncoding::from_raw(2), Some(GCodeEncoding::MeatPackComments));
        assert_eq!(GCodeEncoding::from_raw(3), None);
    }
}
