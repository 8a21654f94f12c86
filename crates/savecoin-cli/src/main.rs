mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn log_directive(verbose: bool) -> &'static str {
    if verbose {
        "savecoin=debug"
    } else {
        "savecoin=info"
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(log_directive(cli.verbose).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Scan {
            input,
            names,
            actual,
            save_offsets,
            format,
        } => commands::scan::run(&input, &names, &actual, save_offsets.as_deref(), format),
        Command::Set {
            input,
            set,
            actual,
            offsets,
            output,
            strict_length,
        } => commands::set::run(commands::set::SetArgs {
            input: &input,
            desired: &set,
            actual: &actual,
            offsets: offsets.as_deref(),
            output: &output,
            strict_length,
        }),
        Command::Hexdump {
            input,
            name,
            context,
        } => commands::hexdump::run(&input, &name, context),
    }
}
