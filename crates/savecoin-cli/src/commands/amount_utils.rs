//! `name=value` argument parsing.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, bail};

/// Currency amount given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub name: String,
    pub value: u64,
}

/// Parse a `name=value` pair such as `gold=75`.
///
/// Splits at the first `=`; the value must be a non-negative integer.
pub fn parse_amount(s: &str) -> Result<Amount> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid amount format: {} (expected name=value)", s))?;

    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid amount format: {} (missing currency name)", s);
    }

    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| anyhow!("Invalid amount for {}: {}", name, e))?;

    Ok(Amount {
        name: name.to_string(),
        value,
    })
}

/// Collapse repeated amounts into a map; the last value for a name wins
pub fn collect_amounts(amounts: &[Amount]) -> BTreeMap<String, u64> {
    amounts
        .iter()
        .map(|a| (a.name.clone(), a.value))
        .collect()
}
