//! Set command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};
use savecoin::{Calibration, PatchConfig, Patcher, envelope, scan};
use tracing::debug;

use super::amount_utils::{Amount, collect_amounts};

pub struct SetArgs<'a> {
    pub input: &'a Path,
    pub desired: &'a [Amount],
    pub actual: &'a [Amount],
    pub offsets: Option<&'a Path>,
    pub output: &'a Path,
    pub strict_length: bool,
}

/// Run the set command
pub fn run(args: SetArgs<'_>) -> Result<()> {
    let save = envelope::read_save(args.input)
        .with_context(|| format!("Failed to read save file {}", args.input.display()))?;

    let desired = collect_amounts(args.desired);
    let actuals = collect_amounts(args.actual);
    let report = scan(&save, desired.keys().chain(actuals.keys()));

    let mut calibration = match args.offsets {
        Some(path) => Calibration::load(path)
            .with_context(|| format!("Failed to load offsets from {}", path.display()))?,
        None => Calibration::new(),
    };
    calibration.merge(Calibration::from_actuals(
        report.records(),
        actuals.iter().map(|(name, value)| (name.as_str(), *value)),
    )?);

    if calibration.is_empty() {
        bail!("Provide --actual values or --offsets to compute offsets before --set");
    }

    let edits = desired
        .iter()
        .map(|(name, value)| calibration.edit(name, *value))
        .collect::<savecoin::Result<Vec<_>>>()?;
    debug!(
        "Applying {} edit(s) with {} known offset(s)",
        edits.len(),
        calibration.len()
    );

    let config = PatchConfig::builder()
        .allow_resize(!args.strict_length)
        .build();
    let patched = Patcher::with_config(config).apply(&save, report.records(), &edits)?;

    for applied in &patched.applied {
        println!("Updated {}: stored={}", applied.name, applied.new_stored);
    }

    envelope::write_save(args.output, &patched.buffer)
        .with_context(|| format!("Failed to write save file {}", args.output.display()))?;
    println!("Wrote updated save to {}", args.output.display());

    Ok(())
}
