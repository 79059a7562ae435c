//! bgscan-io: Container handles and metadata scans for binary G-code.
//!
//! This crate drives a [`BlockCodec`](bgscan_core::BlockCodec) over
//! file-backed, memory-backed or memory-mapped containers to enumerate
//! thumbnails, look up metadata blocks and build connect reports.
//!

mod batch;
mod container;
mod convert;
mod decoder;
mod error;
mod export;
pub mod scan;
pub mod scanner;
mod validate;

pub use batch::{scan_files, FileReport};
pub use container::{Container, FileContainer, MappedContainer, MemoryContainer, SharedMmap};
pub use convert::{convert, convert_file, Direction};
pub use decoder::DecodedBlock;
pub use error::{Error, Result};
pub use export::export_thumbnails;
pub use scan::{ConnectScan, MetadataScanner, StopReason};
pub use scanner::BlockScanner;
pub use validate::validate_block_order;
