use std::path::PathBuf;

use clap::Parser;

/// Runs a headless 6502 program image to completion and reports final
/// register state.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a 32 KiB ROM image, mapped starting at $8000.
    #[arg(long, conflicts_with = "program_image_path")]
    pub rom_image_path: Option<PathBuf>,

    /// Path to a flat, headerless program image, loaded at --program-base.
    #[arg(long, conflicts_with = "rom_image_path")]
    pub program_image_path: Option<PathBuf>,

    /// Address the program image is loaded at.
    #[arg(long, value_parser = parse_u16, default_value = "0x0600")]
    pub program_base: u16,

    /// Override the address execution begins at. Defaults to the program
    /// image's load address, or $8000 for a ROM image.
    #[arg(long, value_parser = parse_u16)]
    pub entry_pc: Option<u16>,

    /// Stop after this many instructions even if the program hasn't
    /// halted, as a guard against runaway loops.
    #[arg(long, default_value_t = 1_000_000)]
    pub max_steps: u64,
}

/// Parses `u16` arguments as hex (`0x...`/`0X...`) or plain decimal.
fn parse_u16(text: &str) -> Result<u16, String> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => text.parse().map_err(|e: std::num::ParseIntError| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_u16("0x0600").unwrap(), 0x0600);
        assert_eq!(parse_u16("1536").unwrap(), 1536);
    }
}
