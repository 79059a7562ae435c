//! Parallel connect scans over many files.

use crate::container::Container;
use crate::scan::MetadataScanner;
use crate::Result;
use bgscan_core::{BlockCodec, ConnectReport, ScanConfig};
use log::debug;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Connect report (or failure) for one file of a batch.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<ConnectReport>,
}

impl FileReport {
    /// Returns true if the scan succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs one connect scan per path in parallel.
///
/// Each file gets its own container handle and its own codec from
/// `make_codec`. Reports are returned in the order of `paths`; a failure on
/// one file does not affect the others.
#[must_use]
pub fn scan_files<P, F, C>(paths: &[P], make_codec: F, config: &ScanConfig) -> Vec<FileReport>
where
    P: AsRef<Path> + Sync,
    F: Fn() -> C + Sync,
    C: BlockCodec,
{
    debug!("scanning {} files", paths.len());

    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let mut scanner = MetadataScanner::new(make_codec()).with_config(config.clone());
            let result = Container::open(path)
                .and_then(|mut container| scanner.get_connect_report(&mut container));
            FileReport {
                path: path.to_path_buf(),
                result,
            }
        })
        .collect()
}
