//! Connect report filtering.

use crate::config::ConnectKeys;
use crate::record::{ConnectReport, MetadataRecord, ThumbnailRecord};

/// Placeholder written by slicers for values that were left empty.
pub const EMPTY_MARKER: &str = "\"\"";

/// Builds a connect report from raw connect-scan accumulation.
///
/// Printer and print metadata are merged with print entries winning on
/// collision, then restricted to `keys`. Entries holding [`EMPTY_MARKER`]
/// are dropped. Thumbnails pass through unchanged.
#[must_use]
pub fn filter_connect_metadata(
    printer: Option<MetadataRecord>,
    print: Option<MetadataRecord>,
    thumbnails: Vec<ThumbnailRecord>,
    keys: &ConnectKeys,
) -> ConnectReport {
    let mut merged = printer.unwrap_or_default();
    if let Some(print) = print {
        merged.extend(print);
    }

    let metadata = merged
        .into_iter()
        .filter(|(key, value)| keys.contains(key) && value != EMPTY_MARKER)
        .collect();

    ConnectReport {
        thumbnails,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{ThumbnailFormat, ThumbnailParams};

    #[test]
    fn test_keeps_only_allowed_keys() {
        let printer = MetadataRecord::from_pairs([
            ("printer_model", "MINI"),
            ("Producer", "PrusaSlicer 2.6.0"),
            ("layer_height", "0.15"),
        ]);

        let report = filter_connect_metadata(Some(printer), None, Vec::new(), &ConnectKeys::v1());

        assert_eq!(report.metadata.len(), 2);
        assert_eq!(report.metadata.get("printer_model"), Some("MINI"));
        assert_eq!(report.metadata.get("layer_height"), Some("0.15"));
        assert!(!report.metadata.contains_key("Producer"));
    }

    #[test]
    fn test_drops_empty_marker() {
        let printer = MetadataRecord::from_pairs([
            ("printer_model", "MINI"),
            ("extruder_colour", "\"\""),
            ("filament_type", ""),
        ]);

        let report = filter_connect_metadata(Some(printer), None, Vec::new(), &ConnectKeys::v1());

        assert!(!report.metadata.contains_key("extruder_colour"));
        // A genuinely empty string is not the placeholder.
        assert_eq!(report.metadata.get("filament_type"), Some(""));
    }

    #[test]
    fn test_print_values_take_precedence() {
        let printer = MetadataRecord::from_pairs([
            ("filament used [g]", "2.90"),
            ("printer_model", "MINI"),
        ]);
        let print = MetadataRecord::from_pairs([
            ("filament used [g]", "3.01"),
            ("total filament used [g]", "3.01"),
        ]);

        let report =
            filter_connect_metadata(Some(printer), Some(print), Vec::new(), &ConnectKeys::v1());

        assert_eq!(report.metadata.get("filament used [g]"), Some("3.01"));
        assert_eq!(report.metadata.get("printer_model"), Some("MINI"));
        assert!(!report.metadata.contains_key("total filament used [g]"));
    }

    #[test]
    fn test_thumbnails_pass_through_in_order() {
        let thumbs = vec![
            ThumbnailRecord::new(ThumbnailParams::new(ThumbnailFormat::Png, 16, 16), vec![1]),
            ThumbnailRecord::new(ThumbnailParams::new(ThumbnailFormat::Qoi, 313, 173), vec![2]),
        ];

        let report = filter_connect_metadata(None, None, thumbs.clone(), &ConnectKeys::v1());

        assert_eq!(report.thumbnails, thumbs);
        assert!(report.metadata.is_empty());
    }

    #[test]
    fn test_custom_allow_list() {
        let keys = ConnectKeys::custom(2, ["Producer"]).unwrap();
        let printer = MetadataRecord::from_pairs([
            ("printer_model", "MINI"),
            ("Producer", "PrusaSlicer 2.6.0"),
        ]);

        let report = filter_connect_metadata(Some(printer), None, Vec::new(), &keys);

        assert_eq!(report.metadata.len(), 1);
        assert_eq!(report.metadata.get("Producer"), Some("PrusaSlicer 2.6.0"));
    }
}
