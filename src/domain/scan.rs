//! Scanned boxes and the per-session batch awaiting confirmation.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::records::lenient;

/// One handset inside a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub sn: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub imei1: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub imei2: String,
}

impl SnItem {
    #[must_use]
    pub fn new(sn: impl Into<String>, imei1: impl Into<String>, imei2: impl Into<String>) -> Self {
        Self {
            sn: sn.into(),
            imei1: imei1.into(),
            imei2: imei2.into(),
        }
    }
}

/// A box as returned by `/api/InBarcodeCheck`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub box_code: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub color: String,
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub qty: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub pallet_code: String,
    #[serde(default)]
    pub sn_items: Vec<SnItem>,
    /// Set locally when the box is accepted into the batch.
    #[serde(skip)]
    pub scanned_at: Option<DateTime<Local>>,
}

impl BoxRecord {
    #[must_use]
    pub fn new(
        box_code: impl Into<String>,
        model: impl Into<String>,
        qty: u32,
        pallet_code: impl Into<String>,
    ) -> Self {
        Self {
            box_code: box_code.into(),
            model: model.into(),
            color: String::new(),
            qty,
            pallet_code: pallet_code.into(),
            sn_items: Vec::new(),
            scanned_at: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_sn_items(mut self, items: Vec<SnItem>) -> Self {
        self.sn_items = items;
        self
    }
}

/// Totals shown before a batch is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub packages: usize,
    pub units: u64,
}

/// Boxes scanned since the last confirmation, in scan order.
///
/// A box code appears at most once.
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    boxes: Vec<BoxRecord>,
}

impl ScanBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a box. Returns `false` if the box code is already present.
    pub fn push(&mut self, record: BoxRecord) -> bool {
        if self.contains(&record.box_code) {
            return false;
        }
        self.boxes.push(record);
        true
    }

    #[must_use]
    pub fn contains(&self, box_code: &str) -> bool {
        self.boxes.iter().any(|b| b.box_code == box_code)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BoxRecord> {
        self.boxes.get(index)
    }

    #[must_use]
    pub fn boxes(&self) -> &[BoxRecord] {
        &self.boxes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    #[must_use]
    pub fn total_packages(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.boxes.iter().map(|b| u64::from(b.qty)).sum()
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            packages: self.total_packages(),
            units: self.total_units(),
        }
    }

    /// Box codes currently held, for duplicate checks off the UI thread.
    #[must_use]
    pub fn box_codes(&self) -> Vec<String> {
        self.boxes.iter().map(|b| b.box_code.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_record_accepts_string_quantity() {
        let record: BoxRecord = serde_json::from_str(
            r#"{"boxCode":"C4554402","model":"SKU-4402","color":"Black","qty":"48","palletCode":"PLT-77291"}"#,
        )
        .expect("Should parse");

        assert_eq!(record.qty, 48);
        assert_eq!(record.color, "Black");
        assert!(record.sn_items.is_empty());
        assert!(record.scanned_at.is_none());
    }

    #[test]
    fn test_box_record_rejects_garbage_quantity() {
        let result: Result<BoxRecord, _> =
            serde_json::from_str(r#"{"boxCode":"C1","qty":"many"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_box_record_rejects_fractional_quantity() {
        let result: Result<BoxRecord, _> = serde_json::from_str(r#"{"boxCode":"C1","qty":2.5}"#);
        assert!(result.is_err());

        let whole: BoxRecord =
            serde_json::from_str(r#"{"boxCode":"C1","qty":12.0}"#).expect("Should parse");
        assert_eq!(whole.qty, 12);
        assert_eq!(whole.color, "");
    }

    #[test]
    fn test_batch_rejects_duplicate_box() {
        let mut batch = ScanBatch::new();
        assert!(batch.push(BoxRecord::new("C1", "M", 10, "P1")));
        assert!(!batch.push(BoxRecord::new("C1", "M", 10, "P1")));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_batch_totals() {
        let mut batch = ScanBatch::new();
        batch.push(BoxRecord::new("C1", "M", 48, "P1"));
        batch.push(BoxRecord::new("C2", "M", 24, "P1"));

        assert_eq!(
            batch.summary(),
            BatchSummary {
                packages: 2,
                units: 72
            }
        );

        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.total_units(), 0);
    }
}
