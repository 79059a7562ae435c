//! Conversion driver between ASCII G-code and binary containers.
//!
//! The conversion itself is done by a [`Converter`]; this module opens and
//! closes the files around it and maps its outcome into [`Error`].

use crate::{Error, Result};
use bgscan_core::{BinarizeConfig, Converter};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// ASCII G-code to binary container.
    AsciiToBinary(BinarizeConfig),
    /// Binary container to ASCII G-code.
    BinaryToAscii { verify_checksum: bool },
}

/// Converts between two open streams.
///
/// # Errors
/// Returns [`Error::ConversionFailed`] with the converter's result code, or
/// an I/O error if `dst` cannot be flushed.
pub fn convert<V, R, W>(
    converter: &mut V,
    src: &mut R,
    dst: &mut W,
    direction: &Direction,
) -> Result<()>
where
    V: Converter,
    R: Read + Seek,
    W: Write + Seek,
{
    let outcome = match direction {
        Direction::AsciiToBinary(config) => converter.ascii_to_binary(src, dst, config),
        Direction::BinaryToAscii { verify_checksum } => {
            converter.binary_to_ascii(src, dst, *verify_checksum)
        }
    };
    outcome.map_err(Error::ConversionFailed)?;
    dst.flush()?;
    Ok(())
}

/// Converts the file at `src` into a new file at `dst`.
///
/// `dst` is created or truncated, and removed again if the conversion fails.
///
/// # Errors
/// Returns an I/O error if either file cannot be opened, or
/// [`Error::ConversionFailed`] with the converter's result code.
pub fn convert_file<V, P, Q>(
    converter: &mut V,
    src: P,
    dst: Q,
    direction: &Direction,
) -> Result<()>
where
    V: Converter,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (src, dst) = (src.as_ref(), dst.as_ref());
    debug!("converting {} -> {}", src.display(), dst.display());

    let mut reader = BufReader::new(File::open(src)?);
    let mut writer = BufWriter::new(File::create(dst)?);

    let result = convert(converter, &mut reader, &mut writer, direction);
    drop(writer);

    if let Err(err) = &result {
        warn!("conversion of {} failed: {err}", src.display());
        if let Err(remove_err) = fs::remove_file(dst) {
            warn!("could not remove {}: {remove_err}", dst.display());
        }
    }
    result
}
