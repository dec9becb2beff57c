//! The headless execution driver around `mos6502-core`: CLI argument
//! parsing, image loading, the run loop, and the final register/flag
//! report. Everything the core itself has no business doing lives here.

mod cli;
mod loader;

pub use cli::Cli;

use std::fmt;

use anyhow::{bail, Result};
use mos6502_core::{AddressSpace, Cpu, NullIoAdapter};

/// A ROM image's conventional load address.
const ROM_BASE: u16 = 0x8000;

/// The outcome of running a program to completion (or to the step limit).
pub struct Report {
    pub steps_executed: u64,
    pub running: bool,
    pub cpu: Cpu,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "executed {} instructions ({})",
            self.steps_executed,
            if self.running {
                "step limit reached"
            } else {
                "halted"
            }
        )?;
        writeln!(
            f,
            "PC=${:04X} A=${:02X} X=${:02X} Y=${:02X} SP=${:02X}",
            self.cpu.pc, self.cpu.a, self.cpu.x, self.cpu.y, self.cpu.sp
        )?;
        write!(f, "P={:?}", self.cpu.p)
    }
}

/// Load whichever image `cli` names, build the CPU at the resolved entry
/// point, and run it to completion (`Cpu::running` cleared by `BRK`) or
/// until `cli.max_steps` instructions have executed.
pub fn run(cli: &Cli) -> Result<Report> {
    let mut bus = AddressSpace::new(NullIoAdapter);

    let entry_pc = match (&cli.rom_image_path, &cli.program_image_path) {
        (Some(path), None) => {
            let image = loader::read_image(path)?;
            bus.load_rom(&image, ROM_BASE);
            cli.entry_pc.unwrap_or(ROM_BASE)
        }
        (None, Some(path)) => {
            let image = loader::read_image(path)?;
            bus.load_program(&image, cli.program_base);
            cli.entry_pc.unwrap_or(cli.program_base)
        }
        (None, None) => {
            bail!("one of --rom-image-path or --program-image-path is required")
        }
        (Some(_), Some(_)) => {
            unreachable!("clap rejects --rom-image-path and --program-image-path together")
        }
    };

    let mut cpu = Cpu::new(entry_pc);

    let mut steps_executed = 0;
    while cpu.running && steps_executed < cli.max_steps {
        cpu.step(&mut bus);
        steps_executed += 1;
    }

    if cpu.running {
        log::warn!(
            "stopped after {} instructions without halting",
            steps_executed
        );
    }

    Ok(Report {
        steps_executed,
        running: cpu.running,
        cpu,
    })
}
