//! bgscan-core: Core types and contracts for binary G-code scanning.
//!
//! This crate provides the data model shared by every scan: block and
//! header vocabularies, decoded records, the codec result vocabulary,
//! the collaborator traits a container codec implements, and the pure
//! connect-report filter.
//!

pub mod block;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod record;
pub mod result;

pub use block::{
    BlockHeader, BlockType, ChecksumType, CompressionType, FileHeader, GCodeEncoding,
    MetadataEncoding, ThumbnailFormat, ThumbnailParams,
};
pub use codec::{BlockCodec, BlockPayload, Converter};
pub use config::{BinarizeConfig, CompressionProfile, ConnectKeys, ScanConfig};
pub use error::{Error, Result};
pub use filter::{filter_connect_metadata, EMPTY_MARKER};
pub use record::{ConnectReport, MetadataCategory, MetadataRecord, ThumbnailRecord};
pub use result::{translate_outcome, Outcome, ResultCode};
