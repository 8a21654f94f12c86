//! Hexdump command implementation.
//!
//! Displays the bytes of a currency record and its surroundings in
//! traditional hexdump format, with the value varint highlighted. Useful for
//! checking a save whose records do not scan as expected.
//!
//! # Output Format
//!
//! ```text
//! 0x0000: 1A 0F 0A 04 67 6F 6C 64  10 01 18 88 D1 8B 5D 30  |....gold......]0|
//! ```

use std::io::IsTerminal;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use savecoin::{RecordScanner, envelope};

/// Run the hexdump command
pub fn run(input: &Path, name: &str, context: usize) -> Result<()> {
    let save = envelope::read_save(input)
        .with_context(|| format!("Failed to read save file {}", input.display()))?;

    let Some(record) = RecordScanner::new(&save).find(name) else {
        bail!("No record found for currency '{}'", name);
    };

    let start = record.record_offset.saturating_sub(context);
    let end = record.record_end().saturating_add(context).min(save.len());
    let value = record.value_offset..record.value_offset + record.value_length;
    let color = std::io::stdout().is_terminal();

    println!(
        "Record '{}' at 0x{:X} ({} bytes), value at 0x{:X} ({} bytes, stored={}):",
        record.name,
        record.record_offset,
        record.span().len(),
        record.value_offset,
        record.value_length,
        record.stored_value
    );
    println!();

    for (i, chunk) in save[start..end].chunks(16).enumerate() {
        println!("{}", format_row(start + i * 16, chunk, &value, color));
    }

    Ok(())
}

/// Format one hexdump row starting at `address`
fn format_row(address: usize, chunk: &[u8], value: &Range<usize>, color: bool) -> String {
    let mut line = format!("0x{:04X}: ", address);

    // Hex bytes
    for (j, byte) in chunk.iter().enumerate() {
        if j == 8 {
            line.push(' ');
        }
        let hex = format!("{:02X}", byte);
        if color && value.contains(&(address + j)) {
            line.push_str(&hex.green().to_string());
        } else {
            line.push_str(&hex);
        }
        line.push(' ');
    }

    // Padding for incomplete lines
    for j in chunk.len()..16 {
        if j == 8 {
            line.push(' ');
        }
        line.push_str("   ");
    }

    // ASCII representation
    line.push_str(" |");
    for byte in chunk {
        if (0x20..0x7F).contains(byte) {
            line.push(*byte as char);
        } else {
            line.push('.');
        }
    }
    for _ in chunk.len()..16 {
        line.push(' ');
    }
    line.push('|');

    line
}
