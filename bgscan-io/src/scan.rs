//! Scan strategies built on the block cursor.
//!
//! Three traversals are provided:
//!
//! - [`MetadataScanner::enumerate_thumbnails`]: every thumbnail, in order.
//! - [`MetadataScanner::get_metadata`]: one metadata category, or `None`.
//! - [`MetadataScanner::connect_scan`]: printer and print metadata plus
//!   thumbnails, stopping as soon as the metadata region ends.
//!
//! Every strategy starts from a freshly rewound container, so repeated
//! scans over one handle are independent of each other.

use crate::container::Container;
use crate::scanner::BlockScanner;
use crate::Result;
use bgscan_core::{
    filter_connect_metadata, BlockCodec, BlockType, ConnectKeys, ConnectReport, MetadataCategory,
    MetadataRecord, ScanConfig, ThumbnailRecord,
};
use log::{debug, warn};
use std::fmt;
use std::io::{Read, Seek};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a connect scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// Print metadata was read. This is the regular end of the metadata region.
    PrintMetadata,
    /// A G-code block was reached before any print metadata.
    GCode,
    /// Slicer metadata was reached before any print metadata.
    SlicerMetadata,
    /// A block of an unrecognized type was reached.
    UnexpectedBlock(u16),
}

impl StopReason {
    /// Returns true if the scan ended at print metadata.
    #[must_use]
    pub fn is_regular(self) -> bool {
        self == StopReason::PrintMetadata
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::PrintMetadata => write!(f, "print metadata read"),
            StopReason::GCode => write!(f, "reached G-code"),
            StopReason::SlicerMetadata => write!(f, "reached slicer metadata"),
            StopReason::UnexpectedBlock(raw) => write!(f, "unexpected block type {raw}"),
        }
    }
}

/// Raw accumulation of a connect scan, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectScan {
    pub printer: Option<MetadataRecord>,
    pub print: Option<MetadataRecord>,
    pub thumbnails: Vec<ThumbnailRecord>,
    pub stop: StopReason,
}

impl ConnectScan {
    /// Applies the connect filter with `keys`.
    #[must_use]
    pub fn into_report(self, keys: &ConnectKeys) -> ConnectReport {
        filter_connect_metadata(self.printer, self.print, self.thumbnails, keys)
    }
}

/// Runs scan strategies with one codec and one configuration.
///
/// # Example
///
/// ```ignore
/// use bgscan_io::{Container, MetadataScanner};
///
/// let mut container = Container::open("print.bgcode")?;
/// let mut scanner = MetadataScanner::new(codec);
/// let report = scanner.get_connect_report(&mut container)?;
/// println!("{} thumbnails", report.thumbnails.len());
/// ```
#[derive(Debug, Clone)]
pub struct MetadataScanner<C> {
    codec: C,
    config: ScanConfig,
}

impl<C: BlockCodec> MetadataScanner<C> {
    /// Creates a scanner with the default configuration.
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            config: ScanConfig::default(),
        }
    }

    /// Replaces the scan configuration.
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the scan configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Returns the codec.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the codec mutably.
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    /// Consumes the scanner, returning the codec.
    #[must_use]
    pub fn into_codec(self) -> C {
        self.codec
    }

    /// Collects every thumbnail in on-disk order.
    ///
    /// # Errors
    /// Returns an error if the header, a block header or a thumbnail payload
    /// fails to decode. A file without thumbnails yields an empty vector.
    pub fn enumerate_thumbnails<S: Read + Seek>(
        &mut self,
        container: &mut Container<S>,
    ) -> Result<Vec<ThumbnailRecord>> {
        let mut scanner = BlockScanner::begin(container, &mut self.codec, &self.config)?;

        let mut thumbnails = Vec::new();
        while let Some(header) = scanner.advance_to(BlockType::Thumbnail)? {
            thumbnails.push(scanner.decode_thumbnail(&header)?);
        }

        debug!("found {} thumbnails", thumbnails.len());
        Ok(thumbnails)
    }

    /// Reads the first metadata block of `category`.
    ///
    /// Returns `Ok(None)` if the file has no block of that category.
    ///
    /// # Errors
    /// Returns an error if the header, a block header or the located payload
    /// fails to decode.
    pub fn get_metadata<S: Read + Seek>(
        &mut self,
        container: &mut Container<S>,
        category: MetadataCategory,
    ) -> Result<Option<MetadataRecord>> {
        let mut scanner = BlockScanner::begin(container, &mut self.codec, &self.config)?;

        match scanner.advance_to(category.block_type())? {
            Some(header) => scanner.decode_metadata(&header).map(Some),
            None => {
                debug!("no {category} metadata present");
                Ok(None)
            }
        }
    }

    /// Reads the metadata category named `name` ("file", "print", "printer"
    /// or "slicer", case-insensitive).
    ///
    /// # Errors
    /// Returns [`Error::CoreError`](crate::Error::CoreError) for an unknown
    /// name, otherwise as [`MetadataScanner::get_metadata`].
    pub fn get_metadata_by_name<S: Read + Seek>(
        &mut self,
        container: &mut Container<S>,
        name: &str,
    ) -> Result<Option<MetadataRecord>> {
        let category: MetadataCategory = name.parse()?;
        self.get_metadata(container, category)
    }

    /// Reads the metadata category configured as default (printer unless
    /// changed).
    ///
    /// # Errors
    /// As [`MetadataScanner::get_metadata`].
    pub fn get_default_metadata<S: Read + Seek>(
        &mut self,
        container: &mut Container<S>,
    ) -> Result<Option<MetadataRecord>> {
        let category = self.config.default_category;
        self.get_metadata(container, category)
    }

    /// Walks the metadata region, collecting printer and print metadata and
    /// thumbnails.
    ///
    /// The walk stops after print metadata. Reaching G-code or slicer
    /// metadata first also ends it, as does an unrecognized block type; in
    /// every case the blocks read so far are returned.
    ///
    /// # Errors
    /// Any decode failure aborts the scan; nothing accumulated is returned.
    pub fn connect_scan<S: Read + Seek>(
        &mut self,
        container: &mut Container<S>,
    ) -> Result<ConnectScan> {
        let mut scanner = BlockScanner::begin(container, &mut self.codec, &self.config)?;

        let mut printer = None;
        let mut print = None;
        let mut thumbnails = Vec::new();

        let stop = loop {
            let header = scanner.advance()?;
            match header.block_type {
                BlockType::FileMetadata => {
                    scanner.decode_metadata(&header)?;
                }
                BlockType::PrinterMetadata => {
                    printer = Some(scanner.decode_metadata(&header)?);
                }
                BlockType::Thumbnail => {
                    thumbnails.push(scanner.decode_thumbnail(&header)?);
                }
                BlockType::PrintMetadata => {
                    print = Some(scanner.decode_metadata(&header)?);
                    break StopReason::PrintMetadata;
                }
                BlockType::GCode => {
                    warn!("G-code reached before print metadata");
                    break StopReason::GCode;
                }
                BlockType::SlicerMetadata => {
                    warn!("slicer metadata reached before print metadata");
                    break StopReason::SlicerMetadata;
                }
                BlockType::Unknown(raw) => {
                    warn!(
                        "unexpected block type {raw} at offset {}, ending connect scan",
                        header.position
                    );
                    break StopReason::UnexpectedBlock(raw);
                }
            }
        };

        debug!(
            "connect scan stopped ({stop}): {} thumbnails, printer metadata {}, print metadata {}",
            thumbnails.len(),
            if printer.is_some() { "present" } else { "absent" },
            if print.is_some() { "present" } else { "absent" },
        );

        Ok(ConnectScan {
            printer,
            print,
            thumbnails,
            stop,
        })
    }

    /// Runs a connect scan and filters it with the configured allow-list.
    ///
    /// # Errors
    /// As [`MetadataScanner::connect_scan`].
    pub fn get_connect_report<S: Read + Seek>(
        &mut self,
        container: &mut Container<S>,
    ) -> Result<ConnectReport> {
        let scan = self.connect_scan(container)?;
        Ok(scan.into_report(&self.config.connect_keys))
    }

    /// Checks the canonical block order of `container`.
    ///
    /// # Errors
    /// As [`validate_block_order`](crate::validate_block_order).
    pub fn validate_block_order<S: Read + Seek>(
        &mut self,
        container: &mut Container<S>,
    ) -> Result<()> {
        crate::validate::validate_block_order(container, &mut self.codec, &self.config)
    }
}
