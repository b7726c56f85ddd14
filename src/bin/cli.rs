// src/bin/cli.rs
use alarm_relay::{cli, logging};
use clap::Parser;

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    let args = cli::Cli::parse();
    logging::init(args.verbose);
    cli::run(args)?;
    Ok(())
}
