//! Codec result vocabulary.
//!
//! Every codec step reports either success or one of the [`ResultCode`]
//! failures below. Raw values follow the container library numbering, with
//! `0` reserved for success.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a single codec step.
pub type Outcome<T> = std::result::Result<T, ResultCode>;

/// Non-success outcome codes reported by a container codec.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum ResultCode {
    #[error("Read error")]
    ReadError = 1,
    #[error("Write error")]
    WriteError = 2,
    #[error("Invalid magic number")]
    InvalidMagicNumber = 3,
    #[error("Invalid version number")]
    InvalidVersionNumber = 4,
    #[error("Invalid checksum type")]
    InvalidChecksumType = 5,
    #[error("Invalid block type")]
    InvalidBlockType = 6,
    #[error("Invalid compression type")]
    InvalidCompressionType = 7,
    #[error("Invalid metadata encoding type")]
    InvalidMetadataEncodingType = 8,
    #[error("Invalid gcode encoding type")]
    InvalidGCodeEncodingType = 9,
    #[error("Data compression error")]
    DataCompressionError = 10,
    #[error("Data uncompression error")]
    DataUncompressionError = 11,
    #[error("Metadata encoding error")]
    MetadataEncodingError = 12,
    #[error("Metadata decoding error")]
    MetadataDecodingError = 13,
    #[error("GCode encoding error")]
    GCodeEncodingError = 14,
    #[error("GCode decoding error")]
    GCodeDecodingError = 15,
    #[error("Block not found")]
    BlockNotFound = 16,
    #[error("Invalid checksum")]
    InvalidChecksum = 17,
    #[error("Invalid thumbnail format")]
    InvalidThumbnailFormat = 18,
    #[error("Invalid thumbnail width")]
    InvalidThumbnailWidth = 19,
    #[error("Invalid thumbnail height")]
    InvalidThumbnailHeight = 20,
    #[error("Invalid thumbnail data size")]
    InvalidThumbnailDataSize = 21,
    #[error("Invalid binary GCode file")]
    InvalidBinaryGCodeFile = 22,
    #[error("Invalid ascii GCode file")]
    InvalidAsciiGCodeFile = 23,
    #[error("Invalid sequence of blocks")]
    InvalidSequenceOfBlocks = 24,
    #[error("Invalid buffer")]
    InvalidBuffer = 25,
    #[error("Already binarized")]
    AlreadyBinarized = 26,
    #[error("Missing printer metadata")]
    MissingPrinterMetadata = 27,
    #[error("Missing print metadata")]
    MissingPrintMetadata = 28,
    #[error("Missing slicer metadata")]
    MissingSlicerMetadata = 29,
}

impl ResultCode {
    /// All failure codes, in raw-value order.
    pub const ALL: [ResultCode; 29] = [
        ResultCode::ReadError,
        ResultCode::WriteError,
        ResultCode::InvalidMagicNumber,
        ResultCode::InvalidVersionNumber,
        ResultCode::InvalidChecksumType,
        ResultCode::InvalidBlockType,
        ResultCode::InvalidCompressionType,
        ResultCode::InvalidMetadataEncodingType,
        ResultCode::InvalidGCodeEncodingType,
        ResultCode::DataCompressionError,
        ResultCode::DataUncompressionError,
        ResultCode::MetadataEncodingError,
        ResultCode::MetadataDecodingError,
        ResultCode::GCodeEncodingError,
        ResultCode::GCodeDecodingError,
        ResultCode::BlockNotFound,
        ResultCode::InvalidChecksum,
        ResultCode::InvalidThumbnailFormat,
        ResultCode::InvalidThumbnailWidth,
        ResultCode::InvalidThumbnailHeight,
        ResultCode::InvalidThumbnailDataSize,
        ResultCode::InvalidBinaryGCodeFile,
        ResultCode::InvalidAsciiGCodeFile,
        ResultCode::InvalidSequenceOfBlocks,
        ResultCode::InvalidBuffer,
        ResultCode::AlreadyBinarized,
        ResultCode::MissingPrinterMetadata,
        ResultCode::MissingPrintMetadata,
        ResultCode::MissingSlicerMetadata,
    ];

    /// Creates a code from its raw value.
    ///
    /// Returns `None` for `0` (success) and for values outside the vocabulary.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => None,
            n => Self::ALL.get(usize::from(n) - 1).copied(),
        }
    }

    /// Returns the raw value of this code.
    #[inline]
    #[must_use]
    pub fn raw(self) -> u16 {
        self as u16
    }

    /// Returns true if this code is the normal "no such block" result.
    #[inline]
    #[must_use]
    pub fn is_not_found(self) -> bool {
        self == ResultCode::BlockNotFound
    }
}

/// Returns the human-readable description of a codec outcome.
#[must_use]
pub fn translate_outcome<T>(outcome: &Outcome<T>) -> String {
    match outcome {
        Ok(_) => "Success".to_string(),
        Err(code) => code.to_string(),
    }
}
