//! Decoded records returned by scans.

use crate::block::{BlockType, ThumbnailFormat, ThumbnailParams};
use crate::{Error, Result};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Key/value metadata decoded from a single metadata block.
///
/// Keys are unique; iteration is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MetadataRecord {
    entries: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from decoded key/value pairs.
    ///
    /// A key repeated in the input keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the record, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl FromIterator<(String, String)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MetadataRecord {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Extend<(String, String)> for MetadataRecord {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// A decoded thumbnail: image descriptor plus encoded image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThumbnailRecord {
    /// Format and dimensions.
    pub params: ThumbnailParams,
    /// Encoded image data (PNG, JPG or QOI stream).
    pub bytes: Vec<u8>,
}

impl ThumbnailRecord {
    /// Creates a thumbnail record.
    #[must_use]
    pub fn new(params: ThumbnailParams, bytes: Vec<u8>) -> Self {
        Self { params, bytes }
    }

    /// Image format of this thumbnail.
    #[must_use]
    pub fn format(&self) -> ThumbnailFormat {
        self.params.format
    }

    /// File extension matching the image format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.params.format.extension()
    }

    /// File name for the `index`-th exported thumbnail, e.g. `thumb0.png`.
    #[must_use]
    pub fn file_name(&self, stem: &str, index: usize) -> String {
        format!("{stem}{index}.{}", self.extension())
    }
}

/// Metadata category selectable by single-category lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MetadataCategory {
    File,
    Print,
    #[default]
    Printer,
    Slicer,
}

impl MetadataCategory {
    /// Lowercase category name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataCategory::File => "file",
            MetadataCategory::Print => "print",
            MetadataCategory::Printer => "printer",
            MetadataCategory::Slicer => "slicer",
        }
    }

    /// Block type holding this category.
    #[must_use]
    pub fn block_type(self) -> BlockType {
        match self {
            MetadataCategory::File => BlockType::FileMetadata,
            MetadataCategory::Print => BlockType::PrintMetadata,
            MetadataCategory::Printer => BlockType::PrinterMetadata,
            MetadataCategory::Slicer => BlockType::SlicerMetadata,
        }
    }
}

impl fmt::Display for MetadataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(MetadataCategory::File),
            "print" => Ok(MetadataCategory::Print),
            "printer" => Ok(MetadataCategory::Printer),
            "slicer" => Ok(MetadataCategory::Slicer),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// Compact report produced by a connect scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectReport {
    /// Thumbnails in on-disk order.
    pub thumbnails: Vec<ThumbnailRecord>,
    /// Printer and print metadata restricted to the connect allow-list.
    pub metadata: MetadataRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_record_last_value_wins() {
        let record = MetadataRecord::from_pairs([
            ("printer_model", "MK4"),
            ("layer_height", "0.2"),
            ("printer_model", "MINI"),
        ]);

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("printer_model"), Some("MINI"));
        assert_eq!(record.get("layer_height"), Some("0.2"));
        assert!(record.get("temperature").is_none());
    }

    #[test]
    fn test_metadata_record_iterates_by_key() {
        let record = MetadataRecord::from_pairs([("b", "2"), ("a", "1"), ("c", "3")]);
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("file".parse::<MetadataCategory>(), Ok(MetadataCategory::File));
        assert_eq!("Print".parse::<MetadataCategory>(), Ok(MetadataCategory::Print));
        assert_eq!(" printer ".parse::<MetadataCategory>(), Ok(MetadataCategory::Printer));
        assert_eq!("SLICER".parse::<MetadataCategory>(), Ok(MetadataCategory::Slicer));
        assert_eq!(
            "gcode".parse::<MetadataCategory>(),
            Err(Error::InvalidCategory("gcode".to_string()))
        );
    }

    #[test]
    fn test_category_default_and_block_type() {
        assert_eq!(MetadataCategory::default(), MetadataCategory::Printer);
        assert_eq!(MetadataCategory::Printer.block_type(), BlockType::PrinterMetadata);
        assert_eq!(MetadataCategory::Print.block_type(), BlockType::PrintMetadata);
        assert_eq!(MetadataCategory::File.block_type(), BlockType::FileMetadata);
        assert_eq!(MetadataCategory::Slicer.block_type(), BlockType::SlicerMetadata);
        assert_eq!(MetadataCategory::Slicer.to_string(), "slicer");
    }

    #[test]
    fn test_thumbnail_file_name() {
        let thumb = ThumbnailRecord::new(
            ThumbnailParams::new(ThumbnailFormat::Qoi, 16, 16),
            vec![1, 2, 3],
        );
        assert_eq!(thumb.format(), ThumbnailFormat::Qoi);
        assert_eq!(thumb.file_name("thumb", 1), "thumb1.qoi");
    }

    #[test]
    fn test_metadata_record_insert() {
        let mut record = MetadataRecord::default();
        assert!(record.is_empty());

        assert_eq!(record.insert("printer_model", "MK4"), None);
        assert_eq!(record.insert("printer_model", "MINI"), Some("MK4".to_string()));
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("printer_model"), Some("MINI"));
    }
}
