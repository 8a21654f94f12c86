//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::amount_utils::{Amount, parse_amount};

#[derive(Parser)]
#[command(name = "savecoin")]
#[command(version, about = "Inspect and edit currency amounts in a player save")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List currency records and derive offsets from known amounts
    Scan {
        /// Path to the base64-encoded player save
        #[arg(short, long, default_value = "player")]
        input: PathBuf,

        /// Currency to look up (repeatable); lists every record when omitted
        #[arg(short, long = "name")]
        names: Vec<String>,

        /// Actual in-game amount, e.g. gold=75 (repeatable)
        #[arg(short, long, value_parser = parse_amount)]
        actual: Vec<Amount>,

        /// Write the derived offsets to a JSON file
        #[arg(long, requires = "actual")]
        save_offsets: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write new in-game amounts into the save
    Set {
        /// Path to the base64-encoded player save
        #[arg(short, long, default_value = "player")]
        input: PathBuf,

        /// Desired in-game amount, e.g. lucky_coin=999 (repeatable)
        #[arg(short, long = "set", value_parser = parse_amount, required = true)]
        set: Vec<Amount>,

        /// Actual in-game amount used to derive offsets (repeatable)
        #[arg(short, long, value_parser = parse_amount, required_unless_present = "offsets")]
        actual: Vec<Amount>,

        /// Offsets saved by `scan --save-offsets`
        #[arg(long)]
        offsets: Option<PathBuf>,

        /// Output path for the updated save
        #[arg(short, long)]
        output: PathBuf,

        /// Refuse edits that change a record's byte size
        #[arg(long)]
        strict_length: bool,
    },

    /// Hexdump the bytes around a currency record
    Hexdump {
        /// Path to the base64-encoded player save
        #[arg(short, long, default_value = "player")]
        input: PathBuf,

        /// Currency to show
        #[arg(short, long)]
        name: String,

        /// Extra bytes to show before and after the record
        #[arg(short, long, default_value_t = 16)]
        context: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
