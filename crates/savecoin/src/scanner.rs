//! Record scanner for decoded save buffers.
//!
//! Names are located with a substring search on the name field
//! (`0A <len> <name>`), then the enclosing record is verified against the
//! record shape. Candidates that fail verification are skipped, so a name
//! that merely appears elsewhere in the buffer is never reported.

use std::collections::BTreeMap;

use memchr::memmem;
use serde::Serialize;
use tracing::{debug, warn};

use crate::record::CurrencyRecord;
use crate::record::shape::{CURRENCY_RECORD, NAME_TAG, NameMatch, RECORD_TAG, Shape, ShapeMatch};
use crate::varint;

/// Located records keyed by currency name
pub type RecordTable = BTreeMap<String, CurrencyRecord>;

/// Longest record length prefix tried when walking back from a name hit
const MAX_LENGTH_PREFIX: usize = 3;

/// Result of scanning a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub found: RecordTable,
    /// Requested names with no valid record
    pub missing: Vec<String>,
}

impl ScanReport {
    pub fn get(&self, name: &str) -> Option<&CurrencyRecord> {
        self.found.get(name)
    }

    pub fn is_found(&self, name: &str) -> bool {
        self.found.contains_key(name)
    }

    pub fn records(&self) -> &RecordTable {
        &self.found
    }

    pub fn into_records(self) -> RecordTable {
        self.found
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

pub struct RecordScanner<'a> {
    buffer: &'a [u8],
    shape: Shape,
}

impl<'a> RecordScanner<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_shape(buffer, CURRENCY_RECORD)
    }

    /// Scanner for a custom shape.
    ///
    /// The shape must open with the record tag, the record length and the
    /// name field, in that order; later tokens are free.
    pub fn with_shape(buffer: &'a [u8], shape: Shape) -> Self {
        Self { buffer, shape }
    }

    /// Find the first valid record for `name`
    pub fn find(&self, name: &str) -> Option<CurrencyRecord> {
        if name.is_empty() {
            return None;
        }

        let needle = name_field(name);
        for hit in memmem::find_iter(self.buffer, &needle) {
            if let Some(m) = self.match_enclosing(hit, name.as_bytes()) {
                debug!(
                    "Found '{}' at 0x{:X} (value at 0x{:X}, {} bytes)",
                    name, m.record_offset, m.value_offset, m.value_length
                );
                return Some(m.into());
            }
            debug!("Rejected candidate for '{}' at 0x{:X}", name, hit);
        }
        None
    }

    /// Scan for every requested name.
    ///
    /// Names without a valid record end up in `missing`; they never abort
    /// the scan.
    pub fn scan<I, S>(&self, names: I) -> ScanReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ScanReport::default();
        for name in names {
            let name = name.as_ref();
            if report.is_found(name) || report.missing.iter().any(|m| m == name) {
                continue;
            }
            match self.find(name) {
                Some(record) => {
                    report.found.insert(name.to_string(), record);
                }
                None => {
                    warn!("No record found for '{}'", name);
                    report.missing.push(name.to_string());
                }
            }
        }
        report
    }

    /// Collect every record matching the shape, whatever its name.
    ///
    /// After a match the walk resumes at the end of that record's payload.
    /// The first occurrence of a name wins.
    pub fn discover(&self) -> ScanReport {
        let mut report = ScanReport::default();
        let mut resume = 0;

        for pos in memchr::memchr_iter(RECORD_TAG, self.buffer) {
            if pos < resume {
                continue;
            }
            let Some(m) = self.shape.match_at(self.buffer, pos, NameMatch::Any) else {
                continue;
            };
            resume = m.record_end();
            if report.is_found(&m.name) {
                debug!("Ignoring duplicate '{}' at 0x{:X}", m.name, pos);
                continue;
            }
            report.found.insert(m.name.clone(), m.into());
        }

        debug!("Discovered {} record(s)", report.len());
        report
    }

    /// Match a record whose name field starts at `name_pos`
    fn match_enclosing(&self, name_pos: usize, name: &[u8]) -> Option<ShapeMatch> {
        (1..=MAX_LENGTH_PREFIX)
            .filter_map(|prefix_len| name_pos.checked_sub(prefix_len + 1))
            .find_map(|start| {
                self.shape
                    .match_at(self.buffer, start, NameMatch::Exact(name))
                    .filter(|m| m.payload_offset == name_pos)
            })
    }
}

/// Bytes of the name field for `name`: tag, varint length, name
fn name_field(name: &str) -> Vec<u8> {
    let mut needle = vec![NAME_TAG];
    varint::encode_into(name.len() as u64, &mut needle);
    needle.extend_from_slice(name.as_bytes());
    needle
}

/// Scan `buffer` for each of `names`
pub fn scan<I, S>(buffer: &[u8], names: I) -> ScanReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RecordScanner::new(buffer).scan(names)
}

/// Collect every currency record in `buffer`
pub fn discover(buffer: &[u8]) -> ScanReport {
    RecordScanner::new(buffer).discover()
}
