//! Currency offset calibration
//!
//! Stored values are the in-game amount plus a per-currency offset. Knowing
//! the actual amount once is enough to derive the offset; the offsets can be
//! saved and reused for later edits of the same save.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::patcher::Edit;
use crate::scanner::RecordTable;

/// `stored - actual` as a signed offset, or `None` if it does not fit in `i64`
pub fn derive_offset(stored: u64, actual: u64) -> Option<i64> {
    i64::try_from(i128::from(stored) - i128::from(actual)).ok()
}

/// Offsets keyed by currency name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default)]
    offsets: BTreeMap<String, i64>,
}

impl Calibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive offsets for each `(name, actual)` pair from scanned records
    pub fn from_actuals<'a, I>(records: &RecordTable, actuals: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut calibration = Self::new();
        for (name, actual) in actuals {
            let record = records
                .get(name)
                .ok_or_else(|| Error::RecordNotFound(name.to_string()))?;
            let offset =
                derive_offset(record.stored_value, actual).ok_or_else(|| Error::Encoding {
                    name: name.to_string(),
                    message: format!(
                        "offset {} - {} does not fit in a signed 64-bit value",
                        record.stored_value, actual
                    ),
                })?;
            debug!(
                "Offset for '{}': {} - {} = {}",
                name, record.stored_value, actual, offset
            );
            calibration.insert(name, offset);
        }
        Ok(calibration)
    }

    pub fn insert(&mut self, name: &str, offset: i64) {
        self.offsets.insert(name.to_string(), offset);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.offsets.get(name).copied()
    }

    /// Overlay `other` onto this calibration; its offsets take precedence
    pub fn merge(&mut self, other: Calibration) {
        self.offsets.extend(other.offsets);
    }

    /// Build an edit setting `name` to `desired` in-game units
    pub fn edit(&self, name: &str, desired: u64) -> Result<Edit> {
        let offset = self
            .get(name)
            .ok_or_else(|| Error::MissingOffset(name.to_string()))?;
        Ok(Edit::new(name, desired, offset))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.offsets.iter().map(|(name, offset)| (name.as_str(), *offset))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let calibration: Self = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} offset(s) from {}",
            calibration.len(),
            path.as_ref().display()
        );
        Ok(calibration)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved offsets to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSaveBuilder, sample_save};
    use crate::patcher::patch;
    use crate::scanner::discover;
    use tempfile::NamedTempFile;

    #[test]
    fn test_derive_offset() {
        assert_eq!(derive_offset(195_225_736, 75), Some(195_225_661));
        assert_eq!(derive_offset(10, 25), Some(-15));
        assert_eq!(derive_offset(0, 0), Some(0));
        assert_eq!(derive_offset(u64::MAX, 0), None);
        assert_eq!(derive_offset(0, (1 << 63) + 1), None);
        assert_eq!(derive_offset(0, 1 << 63), Some(i64::MIN));
    }

    #[test]
    fn test_from_actuals_rejects_unrepresentable_offset() {
        let buf = MockSaveBuilder::new().currency("gold", 0).build();
        let records = discover(&buf).into_records();

        let err = Calibration::from_actuals(&records, [("gold", (1u64 << 63) + 1)]).unwrap_err();
        assert!(matches!(err, Error::Encoding { ref name, .. } if name == "gold"));

        // Without a wrapped offset, a target below the stored value cannot be written
        let calibration = Calibration::from_actuals(&records, [("gold", 1u64 << 63)]).unwrap();
        let edit = calibration.edit("gold", 0).unwrap();
        let err = patch(&buf, &records, &[edit]).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_from_actuals_sample_save() {
        let records = discover(&sample_save()).into_records();
        let calibration = Calibration::from_actuals(
            &records,
            [("gold", 75), ("lucky_coin", 16), ("friendship_essence", 11)],
        )
        .unwrap();

        assert_eq!(calibration.get("gold"), Some(195_225_661));
        assert_eq!(calibration.get("lucky_coin"), Some(195_225_764));
        assert_eq!(calibration.get("friendship_essence"), Some(195_225_765));
    }

    #[test]
    fn test_from_actuals_unknown_currency() {
        let records = discover(&sample_save()).into_records();
        let err = Calibration::from_actuals(&records, [("gems", 3)]).unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(name) if name == "gems"));
    }

    #[test]
    fn test_edit_requires_offset() {
        let mut calibration = Calibration::new();
        calibration.insert("gold", 195_225_661);

        let edit = calibration.edit("gold", 999).unwrap();
        assert_eq!(edit.name, "gold");
        assert_eq!(edit.desired_value, 999);
        assert_eq!(edit.offset, 195_225_661);

        let err = calibration.edit("lucky_coin", 1).unwrap_err();
        assert!(matches!(err, Error::MissingOffset(name) if name == "lucky_coin"));
    }

    #[test]
    fn test_merge_prefers_new_offsets() {
        let mut saved = Calibration::new();
        saved.insert("gold", 1);
        saved.insert("lucky_coin", 2);

        let mut fresh = Calibration::new();
        fresh.insert("gold", 10);

        saved.merge(fresh);
        assert_eq!(saved.get("gold"), Some(10));
        assert_eq!(saved.get("lucky_coin"), Some(2));
        assert_eq!(saved.len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        let mut calibration = Calibration::new();
        calibration.insert("gold", 195_225_661);
        calibration.insert("debt", -4);
        calibration.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"offsets\""));

        let loaded = Calibration::load(&path).unwrap();
        assert_eq!(loaded, calibration);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Calibration::load(dir.path().join("offsets.json")).unwrap_err();
        assert!(err.is_not_found());
    }
}
