//! Typed block decoding.
//!
//! Block type selects the payload decoder; the codec's payload is then
//! normalized into a [`MetadataRecord`] or a [`ThumbnailRecord`]. Records are
//! returned whole or not at all.

use crate::scanner::BlockScanner;
use crate::{Error, Result};
use bgscan_core::{
    BlockCodec, BlockHeader, BlockPayload, BlockType, MetadataRecord, ResultCode, ThumbnailRecord,
};
use log::debug;
use std::io::{Read, Seek};

/// A decoded block payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedBlock {
    /// File, printer, print or slicer metadata.
    Metadata(MetadataRecord),
    /// An embedded thumbnail.
    Thumbnail(ThumbnailRecord),
}

impl DecodedBlock {
    /// Returns the metadata record, if this is one.
    #[must_use]
    pub fn into_metadata(self) -> Option<MetadataRecord> {
        match self {
            DecodedBlock::Metadata(record) => Some(record),
            DecodedBlock::Thumbnail(_) => None,
        }
    }

    /// Returns the thumbnail record, if this is one.
    #[must_use]
    pub fn into_thumbnail(self) -> Option<ThumbnailRecord> {
        match self {
            DecodedBlock::Thumbnail(record) => Some(record),
            DecodedBlock::Metadata(_) => None,
        }
    }
}

/// Normalizes a codec payload for a block of `block_type`.
fn normalize(block_type: BlockType, payload: BlockPayload) -> Result<DecodedBlock> {
    match (block_type, payload) {
        (BlockType::Thumbnail, BlockPayload::Thumbnail { params, data }) => {
            Ok(DecodedBlock::Thumbnail(ThumbnailRecord::new(params, data)))
        }
        (ty, BlockPayload::Metadata { entries, .. }) if ty.is_metadata() => {
            Ok(DecodedBlock::Metadata(MetadataRecord::from_pairs(entries)))
        }
        (block, payload) => {
            debug!("{block} block decoded to a {} payload", payload.kind());
            Err(Error::PayloadDecodeFailed {
                block,
                code: ResultCode::InvalidBlockType,
            })
        }
    }
}

impl<S, C> BlockScanner<'_, S, C>
where
    S: Read + Seek,
    C: BlockCodec,
{
    /// Decodes the payload of the block described by `header`.
    ///
    /// G-code and unrecognized blocks have no record form and are rejected
    /// before any payload is read.
    ///
    /// # Errors
    /// - [`Error::UndecodableBlock`] for G-code and unknown block types.
    /// - [`Error::PayloadDecodeFailed`] if the codec fails or returns a
    ///   payload that does not match the block type.
    pub fn decode_block(&mut self, header: &BlockHeader) -> Result<DecodedBlock> {
        let block_type = header.block_type;
        if matches!(block_type, BlockType::GCode | BlockType::Unknown(_)) {
            return Err(Error::UndecodableBlock(block_type));
        }

        let file_header = *self.file_header();
        let payload = self
            .codec
            .decode_block_payload(self.container.stream_mut()?, &file_header, header)
            .map_err(|code| Error::PayloadDecodeFailed {
                block: block_type,
                code,
            })?;

        normalize(block_type, payload)
    }

    /// Decodes a metadata block.
    ///
    /// # Errors
    /// As [`BlockScanner::decode_block`]; a thumbnail header yields
    /// [`Error::PayloadDecodeFailed`] with [`ResultCode::InvalidBlockType`].
    pub fn decode_metadata(&mut self, header: &BlockHeader) -> Result<MetadataRecord> {
        self.decode_block(header)?
            .into_metadata()
            .ok_or(Error::PayloadDecodeFailed {
                block: header.block_type,
                code: ResultCode::InvalidBlockType,
            })
    }

    /// Decodes a thumbnail block.
    ///
    /// # Errors
    /// As [`BlockScanner::decode_block`]; a metadata header yields
    /// [`Error::PayloadDecodeFailed`] with [`ResultCode::InvalidBlockType`].
    pub fn decode_thumbnail(&mut self, header: &BlockHeader) -> Result<ThumbnailRecord> {
        self.decode_block(header)?
            .into_thumbnail()
            .ok_or(Error::PayloadDecodeFailed {
                block: header.block_type,
                code: ResultCode::InvalidBlockType,
            })
    }
}
