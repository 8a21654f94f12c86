//! Currency records located in a decoded save buffer.

pub mod shape;

use serde::{Deserialize, Serialize};

use crate::calibration::derive_offset;
use shape::ShapeMatch;

/// One located currency entry.
///
/// Records are produced by a scan and never mutated afterwards; attaching a
/// known actual value yields a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    pub name: String,
    /// Index of the record tag byte
    pub record_offset: usize,
    /// Declared payload length (the varint after the record tag)
    pub payload_length: usize,
    /// Index of the name field tag, which is also the first payload byte
    pub name_offset: usize,
    pub value_offset: usize,
    pub value_length: usize,
    pub stored_value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<u64>,
}

impl CurrencyRecord {
    /// Attach the known in-game value
    pub fn with_actual(self, actual_value: u64) -> Self {
        Self {
            actual_value: Some(actual_value),
            ..self
        }
    }

    /// `stored_value - actual_value`, if the actual value is known and the
    /// difference fits in `i64`
    pub fn offset(&self) -> Option<i64> {
        self.actual_value
            .and_then(|actual| derive_offset(self.stored_value, actual))
    }

    /// Index of the record length prefix
    pub fn length_prefix_offset(&self) -> usize {
        self.record_offset + 1
    }

    /// Encoded size of the record length prefix
    pub fn length_prefix_len(&self) -> usize {
        self.name_offset - self.length_prefix_offset()
    }

    /// End of the record's payload (exclusive)
    pub fn record_end(&self) -> usize {
        self.name_offset.saturating_add(self.payload_length)
    }

    /// Byte range covered by the whole record, tag included
    pub fn span(&self) -> std::ops::Range<usize> {
        self.record_offset..self.record_end()
    }
}

impl From<ShapeMatch> for CurrencyRecord {
    fn from(m: ShapeMatch) -> Self {
        Self {
            name: m.name,
            record_offset: m.record_offset,
            payload_length: m.payload_length,
            name_offset: m.payload_offset,
            value_offset: m.value_offset,
            value_length: m.value_length,
            stored_value: m.value,
            actual_value: None,
        }
    }
}
