//! # savecoin
//!
//! Currency editor for base64-wrapped binary save files.
//!
//! This crate provides:
//! - Varint codec for the save's base-128 integers
//! - Record scanning for named currency entries
//! - Value patching with per-record length fix-ups
//! - Offset calibration between stored and in-game amounts
//! - Base64 envelope decoding and encoding
//!
//! ## Example
//!
//! ```ignore
//! use savecoin::{Calibration, envelope, patch, scan};
//!
//! let save = envelope::read_save("player")?;
//! let report = scan(&save, ["gold"]);
//! let calibration = Calibration::from_actuals(report.records(), [("gold", 75)])?;
//! let edit = calibration.edit("gold", 999)?;
//! let updated = patch(&save, report.records(), &[edit])?;
//! envelope::write_save("player.new", &updated)?;
//! ```

pub mod calibration;
pub mod envelope;
pub mod error;
pub mod patcher;
pub mod record;
pub mod scanner;
pub mod varint;

#[cfg(test)]
mod mock;

pub use calibration::{Calibration, derive_offset};
pub use error::{Error, Result};
pub use patcher::{AppliedEdit, Edit, PatchConfig, PatchConfigBuilder, Patched, Patcher, patch};
pub use record::CurrencyRecord;
pub use record::shape::{CURRENCY_RECORD, NameMatch, Shape, ShapeMatch, Token};
pub use scanner::{RecordScanner, RecordTable, ScanReport, discover, scan};
