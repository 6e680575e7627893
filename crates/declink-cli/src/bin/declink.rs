#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use std::io::{IsTerminal, Write};

use declink_cli::args::CliArgs;
use declink_cli::{driver, reporter::Reporter, tracing_config};

fn main() -> Result<()> {
    // Only installs a subscriber when DECLINK_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let outcome = driver::run(&args)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(outcome.output.as_bytes())?;
    stdout.flush()?;

    if !outcome.diagnostics.is_empty() {
        let color = !args.no_color && std::io::stderr().is_terminal();
        eprint!("{}", Reporter::new(color).render(&outcome.diagnostics));
    }
    Ok(())
}
