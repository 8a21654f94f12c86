//! Scan command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use savecoin::{Calibration, RecordTable, ScanReport, discover, envelope, scan};
use serde::Serialize;
use tracing::debug;

use super::amount_utils::{Amount, collect_amounts};
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct ScanOutput<'a> {
    found: RecordTable,
    missing: &'a [String],
    offsets: &'a Calibration,
}

/// Run the scan command
pub fn run(
    input: &Path,
    names: &[String],
    actual: &[Amount],
    save_offsets: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let save = envelope::read_save(input)
        .with_context(|| format!("Failed to read save file {}", input.display()))?;

    debug!("Scanning {} ({} bytes decoded)", input.display(), save.len());

    let actuals = collect_amounts(actual);
    let report = if names.is_empty() {
        discover(&save)
    } else {
        let requested = names.iter().chain(actuals.keys());
        scan(&save, requested)
    };

    let calibration = Calibration::from_actuals(
        report.records(),
        actuals.iter().map(|(name, value)| (name.as_str(), *value)),
    )?;

    match format {
        OutputFormat::Text => print_text(&report, &calibration),
        OutputFormat::Json => print_json(&report, &actuals, &calibration)?,
    }

    if let Some(path) = save_offsets {
        calibration
            .save(path)
            .with_context(|| format!("Failed to write offsets to {}", path.display()))?;
        eprintln!("Saved {} offset(s) to {}", calibration.len(), path.display());
    }

    Ok(())
}

fn print_text(report: &ScanReport, calibration: &Calibration) {
    println!("Found entries:");
    for (name, record) in report.records() {
        println!("- {}: stored={}", name, record.stored_value);
    }

    if !report.missing.is_empty() {
        println!();
        println!("{}", "Not found:".yellow());
        for name in &report.missing {
            println!("- {}", name.yellow());
        }
    }

    if !calibration.is_empty() {
        println!();
        println!("Offsets (stored - actual):");
        for (name, offset) in calibration.iter() {
            println!("- {}: {}", name, offset);
        }
    }
}

fn print_json(
    report: &ScanReport,
    actuals: &BTreeMap<String, u64>,
    calibration: &Calibration,
) -> Result<()> {
    let found = report
        .records()
        .iter()
        .map(|(name, record)| {
            let record = match actuals.get(name) {
                Some(&actual) => record.clone().with_actual(actual),
                None => record.clone(),
            };
            (name.clone(), record)
        })
        .collect();

    let output = ScanOutput {
        found,
        missing: &report.missing,
        offsets: calibration,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::amount_utils::parse_amount;

    fn write_player(path: &Path) {
        let mut save = vec![0x1A, 0x0F, 0x0A, 0x04];
        save.extend_from_slice(b"gold");
        save.extend_from_slice(&[0x10, 0x01, 0x18, 0x88, 0xD1, 0x8B, 0x5D, 0x30, 0x01]);
        envelope::write_save(path, &save).unwrap();
    }

    #[test]
    fn test_scan_saves_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("player");
        let offsets = dir.path().join("offsets.json");
        write_player(&input);

        let actual = vec![parse_amount("gold=75").unwrap()];
        run(&input, &[], &actual, Some(offsets.as_path()), OutputFormat::Json).unwrap();

        let calibration = Calibration::load(&offsets).unwrap();
        assert_eq!(calibration.get("gold"), Some(195_225_661));
    }

    #[test]
    fn test_scan_unknown_actual_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("player");
        write_player(&input);

        let actual = vec![parse_amount("gems=3").unwrap()];
        let names = vec!["gold".to_string()];
        let err = run(&input, &names, &actual, None, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("gems"));
    }

    #[test]
    fn test_scan_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(&dir.path().join("player"), &[], &[], None, OutputFormat::Text);
        assert!(result.is_err());
    }
}
