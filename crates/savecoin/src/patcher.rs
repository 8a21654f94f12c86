//! Value patcher
//!
//! Rewrites the value varint of scanned records. The new encoding may be
//! shorter or longer than the old one; the record's own length prefix is
//! rewritten to match, but enclosing containers are left untouched. The
//! observed save format does not length-check the container around currency
//! records, so a resized record still loads. Use
//! [`PatchConfig::allow_resize`] to refuse size changes instead.
//!
//! Patching is all-or-nothing: every edit is validated before any output is
//! built, and the input buffer is never modified.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::CurrencyRecord;
use crate::record::shape::RECORD_TAG;
use crate::scanner::RecordTable;
use crate::varint;

/// Request to set a currency to a new in-game amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub name: String,
    pub desired_value: u64,
    /// `stored - actual` for this currency, derived by the caller
    pub offset: i64,
}

impl Edit {
    pub fn new(name: impl Into<String>, desired_value: u64, offset: i64) -> Self {
        Self {
            name: name.into(),
            desired_value,
            offset,
        }
    }

    /// Value to store: `desired_value + offset`
    pub fn stored_value(&self) -> Result<u64> {
        self.desired_value
            .checked_add_signed(self.offset)
            .ok_or_else(|| {
                let message = if self.offset < 0 {
                    format!(
                        "{} + ({}) is negative and varints are unsigned",
                        self.desired_value, self.offset
                    )
                } else {
                    format!("{} + {} exceeds 64 bits", self.desired_value, self.offset)
                };
                Error::Encoding {
                    name: self.name.clone(),
                    message,
                }
            })
    }
}

/// Patcher settings
#[derive(Debug, Clone)]
pub struct PatchConfig {
    /// Allow records to change byte size
    pub allow_resize: bool,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self { allow_resize: true }
    }
}

impl PatchConfig {
    pub fn builder() -> PatchConfigBuilder {
        PatchConfigBuilder::default()
    }
}

/// Builder for PatchConfig
#[derive(Debug, Clone, Default)]
pub struct PatchConfigBuilder {
    allow_resize: Option<bool>,
}

impl PatchConfigBuilder {
    /// Allow or refuse edits that change a record's byte size
    pub fn allow_resize(mut self, allowed: bool) -> Self {
        self.allow_resize = Some(allowed);
        self
    }

    pub fn build(self) -> PatchConfig {
        let default = PatchConfig::default();
        PatchConfig {
            allow_resize: self.allow_resize.unwrap_or(default.allow_resize),
        }
    }
}

/// Summary of one applied edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedEdit {
    pub name: String,
    /// Record position in the input buffer
    pub record_offset: usize,
    pub old_stored: u64,
    pub new_stored: u64,
    pub old_length: usize,
    pub new_length: usize,
}

/// Output of a successful patch
#[derive(Debug, Clone)]
pub struct Patched {
    pub buffer: Vec<u8>,
    /// Edits in buffer order
    pub applied: Vec<AppliedEdit>,
}

/// Validated edit waiting to be spliced
struct PlannedEdit<'r> {
    record: &'r CurrencyRecord,
    new_stored: u64,
    length_bytes: Vec<u8>,
    value_bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Patcher {
    config: PatchConfig,
}

impl Patcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PatchConfig) -> Self {
        Self { config }
    }

    /// Apply `edits` to `buffer`, returning a new buffer
    pub fn apply(&self, buffer: &[u8], records: &RecordTable, edits: &[Edit]) -> Result<Patched> {
        let mut planned = edits
            .iter()
            .map(|edit| self.plan(buffer, records, edit))
            .collect::<Result<Vec<_>>>()?;

        planned.sort_by_key(|p| p.record.record_offset);
        check_overlaps(&planned)?;

        let growth: usize = planned
            .iter()
            .map(|p| p.length_bytes.len() + p.value_bytes.len())
            .sum();
        let mut out = Vec::with_capacity(buffer.len() + growth);
        let mut applied = Vec::with_capacity(planned.len());
        let mut cursor = 0;

        for p in &planned {
            let record = p.record;
            out.extend_from_slice(&buffer[cursor..record.length_prefix_offset()]);
            out.extend_from_slice(&p.length_bytes);
            out.extend_from_slice(&buffer[record.name_offset..record.value_offset]);
            out.extend_from_slice(&p.value_bytes);
            cursor = record.value_offset + record.value_length;

            debug!(
                "Spliced '{}' at 0x{:X}: {} -> {} byte(s)",
                record.name,
                record.value_offset,
                record.value_length,
                p.value_bytes.len()
            );
            info!(
                "Updated {}: stored {} -> {}",
                record.name, record.stored_value, p.new_stored
            );

            applied.push(AppliedEdit {
                name: record.name.clone(),
                record_offset: record.record_offset,
                old_stored: record.stored_value,
                new_stored: p.new_stored,
                old_length: record.value_length,
                new_length: p.value_bytes.len(),
            });
        }
        out.extend_from_slice(&buffer[cursor..]);

        Ok(Patched {
            buffer: out,
            applied,
        })
    }

    fn plan<'r>(
        &self,
        buffer: &[u8],
        records: &'r RecordTable,
        edit: &Edit,
    ) -> Result<PlannedEdit<'r>> {
        let record = records.get(&edit.name).ok_or_else(|| Error::MissingRecord {
            name: edit.name.clone(),
        })?;
        verify_record(buffer, record)?;

        let new_stored = edit.stored_value()?;
        let value_bytes = varint::encode(new_stored);
        let payload_length = record.payload_length - record.value_length + value_bytes.len();
        let length_bytes = varint::encode(payload_length as u64);

        let delta = (length_bytes.len() + value_bytes.len()) as isize
            - (record.length_prefix_len() + record.value_length) as isize;
        if delta != 0 && !self.config.allow_resize {
            return Err(Error::OuterLengthMismatch {
                name: record.name.clone(),
                delta,
            });
        }

        Ok(PlannedEdit {
            record,
            new_stored,
            length_bytes,
            value_bytes,
        })
    }
}

/// Check that `record` still describes `buffer`
fn verify_record(buffer: &[u8], record: &CurrencyRecord) -> Result<()> {
    let stale = || Error::StaleRecord {
        name: record.name.clone(),
        offset: record.record_offset,
    };

    let value_end = record
        .value_offset
        .checked_add(record.value_length)
        .ok_or_else(stale)?;
    let record_end = record
        .name_offset
        .checked_add(record.payload_length)
        .ok_or_else(stale)?;
    let well_formed = record.record_offset < record.name_offset
        && record.name_offset < record.value_offset
        && value_end <= record_end
        && record_end <= buffer.len();
    if !well_formed || buffer[record.record_offset] != RECORD_TAG {
        return Err(stale());
    }

    let length = varint::decode(buffer, record.length_prefix_offset());
    if length != Some((record.payload_length as u64, record.length_prefix_len())) {
        return Err(stale());
    }

    let value = varint::decode(buffer, record.value_offset);
    if value != Some((record.stored_value, record.value_length)) {
        return Err(stale());
    }

    Ok(())
}

fn check_overlaps(planned: &[PlannedEdit<'_>]) -> Result<()> {
    for pair in planned.windows(2) {
        let (first, second) = (pair[0].record, pair[1].record);
        if second.record_offset < first.record_end() {
            return Err(Error::Conflict {
                first: first.name.clone(),
                second: second.name.clone(),
                start: second.record_offset,
                end: first.record_end().min(second.record_end()),
            });
        }
    }
    Ok(())
}

/// Apply `edits` with the default configuration
pub fn patch(buffer: &[u8], records: &RecordTable, edits: &[Edit]) -> Result<Vec<u8>> {
    Patcher::new()
        .apply(buffer, records, edits)
        .map(|patched| patched.buffer)
}
