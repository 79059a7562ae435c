//! I/O and scan error types.

use bgscan_core::{BlockType, ResultCode};
use thiserror::Error;

/// Result type for container and scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Container and scan error types.
///
/// Block absence and unexpected block types are not errors; they surface as
/// `Option` values and [`StopReason`](crate::StopReason) respectively.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation attempted on a closed container.
    #[error("container handle is closed")]
    HandleInvalid,

    /// The file header could not be decoded.
    #[error("malformed file header: {0}")]
    MalformedHeader(ResultCode),

    /// A block header could not be decoded.
    #[error("block header decode failed: {0}")]
    BlockHeaderDecodeFailed(ResultCode),

    /// A located block's payload could not be decoded.
    #[error("{block} payload decode failed: {code}")]
    PayloadDecodeFailed { block: BlockType, code: ResultCode },

    /// The block type has no record representation.
    #[error("block type {0} cannot be decoded into a record")]
    UndecodableBlock(BlockType),

    /// Blocks are not in canonical container order.
    #[error("invalid sequence of blocks: expected {expected}, found {found}")]
    InvalidSequence { expected: String, found: BlockType },

    /// The block sequence ended before the canonical order was complete.
    #[error("block sequence ended early: expected {expected}")]
    TruncatedSequence { expected: String },

    /// An external conversion reported failure.
    #[error("conversion failed: {0}")]
    ConversionFailed(ResultCode),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] bgscan_core::Error),
}

impl Error {
    /// Codec result code carried by this error, if any.
    #[must_use]
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Error::MalformedHeader(code)
            | Error::BlockHeaderDecodeFailed(code)
            | Error::PayloadDecodeFailed { code, .. }
            | Error::ConversionFailed(code) => Some(*code),
            _ => None,
        }
    }
}
