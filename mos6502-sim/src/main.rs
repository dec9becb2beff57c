use anyhow::Result;
use clap::Parser;
use mos6502_sim::{run, Cli};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let report = run(&cli)?;
    println!("{}", report);

    Ok(())
}
