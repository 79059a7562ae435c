//! Scan and conversion configuration.

use crate::block::{ChecksumType, CompressionType, FileHeader, GCodeEncoding, MetadataEncoding};
use crate::record::MetadataCategory;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keys retained in a connect report, version 1.
const CONNECT_KEYS_V1: &[&str] = &[
    "printer_model",
    "filament_type",
    "nozzle_diameter",
    "bed_temperature",
    "brim_width",
    "fill_density",
    "layer_height",
    "temperature",
    "ironing",
    "support_material",
    "max_layer_z",
    "extruder_colour",
    "filament used [mm]",
    "filament used [cm3]",
    "filament used [g]",
    "filament cost",
    "estimated printing time (normal mode)",
];

/// Versioned allow-list of metadata keys kept by the connect filter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectKeys {
    /// Allow-list version.
    pub version: u32,
    /// Retained keys.
    pub keys: Vec<String>,
}

impl ConnectKeys {
    /// The version 1 allow-list.
    #[must_use]
    pub fn v1() -> Self {
        Self {
            version: 1,
            keys: CONNECT_KEYS_V1.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Creates a custom allow-list.
    ///
    /// # Errors
    /// Returns an error if `keys` is empty or contains a blank key.
    pub fn custom<I, K>(version: u32, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(Error::ConfigError(
                "connect allow-list must not be empty".to_string(),
            ));
        }
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::ConfigError(
                "connect allow-list contains a blank key".to_string(),
            ));
        }
        Ok(Self { version, keys })
    }

    /// Returns true if `key` is allowed.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Returns the number of allowed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the allow-list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for ConnectKeys {
    fn default() -> Self {
        Self::v1()
    }
}

/// Configuration shared by all scan strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfig {
    /// Category used by default metadata lookups.
    pub default_category: MetadataCategory,
    /// Highest accepted container version (`None` accepts any).
    pub max_version: Option<u32>,
    /// Allow-list applied to connect reports.
    pub connect_keys: ConnectKeys,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_category: MetadataCategory::Printer,
            max_version: Some(FileHeader::VERSION),
            connect_keys: ConnectKeys::v1(),
        }
    }
}

impl ScanConfig {
    /// Creates a scan configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default metadata category.
    #[must_use]
    pub fn with_default_category(mut self, category: MetadataCategory) -> Self {
        self.default_category = category;
        self
    }

    /// Sets the highest accepted container version.
    #[must_use]
    pub fn with_max_version(mut self, version: u32) -> Self {
        self.max_version = Some(version);
        self
    }

    /// Accepts containers of any version.
    #[must_use]
    pub fn without_version_check(mut self) -> Self {
        self.max_version = None;
        self
    }

    /// Sets the connect allow-list.
    #[must_use]
    pub fn with_connect_keys(mut self, keys: ConnectKeys) -> Self {
        self.connect_keys = keys;
        self
    }
}

/// Per-block-type compression used when binarizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompressionProfile {
    pub file_metadata: CompressionType,
    pub printer_metadata: CompressionType,
    pub print_metadata: CompressionType,
    pub slicer_metadata: CompressionType,
    pub gcode: CompressionType,
}

impl Default for CompressionProfile {
    fn default() -> Self {
        Self {
            file_metadata: CompressionType::None,
            printer_metadata: CompressionType::None,
            print_metadata: CompressionType::None,
            slicer_metadata: CompressionType::Deflate,
            gcode: CompressionType::Heatshrink12_4,
        }
    }
}

/// Options passed to an ASCII to binary [`Converter`](crate::Converter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinarizeConfig {
    pub compression: CompressionProfile,
    pub gcode_encoding: GCodeEncoding,
    pub metadata_encoding: MetadataEncoding,
    pub checksum: ChecksumType,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            compression: CompressionProfile::default(),
            gcode_encoding: GCodeEncoding::MeatPackComments,
            metadata_encoding: MetadataEncoding::Ini,
            checksum: ChecksumType::Crc32,
        }
    }
}

impl BinarizeConfig {
    /// Creates a binarize configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression profile.
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionProfile) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the G-code encoding.
    #[must_use]
    pub fn with_gcode_encoding(mut self, encoding: GCodeEncoding) -> Self {
        self.gcode_encoding = encoding;
        self
    }

    /// Sets the checksum algorithm.
    #[must_use]
    pub fn with_checksum(mut self, checksum: ChecksumType) -> Self {
        self.checksum = checksum;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::new();
        assert_eq!(config.default_category, MetadataCategory::Printer);
        assert_eq!(config.max_version, Some(FileHeader::VERSION));
        assert_eq!(config.connect_keys.version, 1);
    }

    #[test]
    fn test_scan_config_builder() {
        let config = ScanConfig::new()
            .with_default_category(MetadataCategory::Slicer)
            .with_max_version(3);
        assert_eq!(config.default_category, MetadataCategory::Slicer);
        assert_eq!(config.max_version, Some(3));

        let config = config.without_version_check();
        assert_eq!(config.max_version, None);
    }

    #[test]
    fn test_connect_keys_v1() {
        let keys = ConnectKeys::v1();
        assert_eq!(keys.len(), CONNECT_KEYS_V1.len());
        assert!(keys.contains("printer_model"));
        assert!(keys.contains("filament used [g]"));
        assert!(!keys.contains("total filament used [g]"));
        assert!(!keys.contains("Producer"));
    }

    #[test]
    fn test_connect_keys_custom_validation() {
        let keys = ConnectKeys::custom(2, ["printer_model", "layer_height"]).unwrap();
        assert_eq!(keys.version, 2);
        assert!(keys.contains("layer_height"));

        assert!(matches!(
            ConnectKeys::custom(2, Vec::<String>::new()),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            ConnectKeys::custom(2, ["printer_model", "  "]),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_binarize_config_defaults() {
        let config = BinarizeConfig::default();
        assert_eq!(config.checksum, ChecksumType::Crc32);
        assert_eq!(config.compression.slicer_metadata, CompressionType::Deflate);
        assert_eq!(config.compression.gcode, CompressionType::Heatshrink12_4);
        assert_eq!(config.compression.printer_metadata, CompressionType::None);
        assert_eq!(config.gcode_encoding, GCodeEncoding::MeatPackComments);

        let config = config.with_checksum(ChecksumType::None);
        assert_eq!(config.checksum, ChecksumType::None);
    }

    #[test]
    fn test_binarize_config_builder() {
        let compression = CompressionProfile {
            gcode: CompressionType::Deflate,
            ..CompressionProfile::default()
        };
        let config = BinarizeConfig::new()
            .with_compression(compression)
            .with_gcode_encoding(GCodeEncoding::None);

        assert_eq!(config.compression.gcode, CompressionType::Deflate);
        assert_eq!(config.compression.slicer_metadata, CompressionType::Deflate);
        assert_eq!(config.gcode_encoding, GCodeEncoding::None);
        assert_eq!(config.checksum, ChecksumType::Crc32);
    }
}
