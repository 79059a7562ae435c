//! Header reading and block-by-block cursor over a container.

use crate::container::Container;
use crate::{Error, Result};
use bgscan_core::{BlockCodec, BlockHeader, BlockType, FileHeader, ScanConfig};
use log::{debug, trace};
use std::io::{Read, Seek};

/// Cursor over the block sequence of one container.
///
/// A scanner is created by [`BlockScanner::begin`], which rewinds the
/// container and decodes the file header. Blocks are then consumed strictly
/// in on-disk order. The scanner holds the container mutably for its whole
/// lifetime, so nothing else can move the read position mid-scan.
pub struct BlockScanner<'a, S, C> {
    pub(crate) container: &'a mut Container<S>,
    pub(crate) codec: &'a mut C,
    file_header: FileHeader,
    stream_len: u64,
}

impl<'a, S, C> BlockScanner<'a, S, C>
where
    S: Read + Seek,
    C: BlockCodec,
{
    /// Rewinds `container` and decodes its file header.
    ///
    /// On success the stream is positioned at the first block header.
    ///
    /// # Errors
    /// Returns [`Error::HandleInvalid`] if the container is closed and
    /// [`Error::MalformedHeader`] if the codec rejects the header.
    pub fn begin(
        container: &'a mut Container<S>,
        codec: &'a mut C,
        config: &ScanConfig,
    ) -> Result<Self> {
        container.rewind()?;
        let stream_len = container.stream_len()?;
        debug!(
            "reading file header of {} ({stream_len} bytes)",
            container.label()
        );

        let file_header = codec
            .decode_file_header(container.stream_mut()?, config.max_version)
            .map_err(Error::MalformedHeader)?;

        Ok(Self {
            container,
            codec,
            file_header,
            stream_len,
        })
    }

    /// Header decoded by [`BlockScanner::begin`].
    #[must_use]
    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    /// Decodes the next block header, whatever its type.
    ///
    /// # Errors
    /// Any codec failure, including running out of blocks, is returned as
    /// [`Error::BlockHeaderDecodeFailed`].
    pub fn advance(&mut self) -> Result<BlockHeader> {
        let header = self
            .codec
            .decode_next_block_header(self.container.stream_mut()?, &self.file_header, None)
            .map_err(Error::BlockHeaderDecodeFailed)?;
        trace!("block {} at offset {}", header.block_type, header.position);
        Ok(header)
    }

    /// Skips forward to the next block of `block_type`.
    ///
    /// Returns `Ok(None)` once no further block of that type exists; the
    /// read position is then left where it was.
    ///
    /// # Errors
    /// Returns [`Error::BlockHeaderDecodeFailed`] for any codec failure
    /// other than "block not found".
    pub fn advance_to(&mut self, block_type: BlockType) -> Result<Option<BlockHeader>> {
        match self.codec.decode_next_block_header(
            self.container.stream_mut()?,
            &self.file_header,
            Some(block_type),
        ) {
            Ok(header) => {
                trace!("found {} at offset {}", block_type, header.position);
                Ok(Some(header))
            }
            Err(code) if code.is_not_found() => {
                trace!("no further {block_type} block");
                Ok(None)
            }
            Err(code) => Err(Error::BlockHeaderDecodeFailed(code)),
        }
    }

    /// Discards the payload of the current block.
    ///
    /// # Errors
    /// Returns [`Error::PayloadDecodeFailed`] if the codec cannot skip it.
    pub fn skip(&mut self, header: &BlockHeader) -> Result<()> {
        self.codec
            .skip_block_payload(self.container.stream_mut()?, &self.file_header, header)
            .map_err(|code| Error::PayloadDecodeFailed {
                block: header.block_type,
                code,
            })
    }

    /// Returns true once the read position has reached the end of the stream.
    ///
    /// The stream length is taken once, in [`BlockScanner::begin`].
    ///
    /// # Errors
    /// Returns an error if the position cannot be read.
    pub fn at_end(&mut self) -> Result<bool> {
        Ok(self.container.position()? >= self.stream_len)
    }

    /// Current read position.
    ///
    /// # Errors
    /// Returns an error if the position cannot be read.
    pub fn position(&mut self) -> Result<u64> {
        self.container.position()
    }
}
