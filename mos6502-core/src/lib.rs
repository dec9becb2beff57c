//! A software model of the 8-bit MOS 6502 microprocessor: registers,
//! addressing modes, the documented instruction set, and a handful of
//! well-known undocumented opcodes, wired to a flat 64 KiB address space.
//!
//! This crate is deliberately not cycle-accurate. It models the 6502's
//! architectural state and the effect each instruction has on it; it has
//! no notion of clock cycles, DMA, or asynchronous interrupt delivery.
//! [`Cpu::step`] executes exactly one instruction and returns.

mod addressing_mode;
mod bus;
mod cpu;
mod error;
mod instruction;
mod opcode;
mod operand;
mod status;

pub use addressing_mode::AddressingMode;
pub use bus::{AddressSpace, Bus, IoAdapter, NullIoAdapter};
pub use cpu::{Cpu, DEFAULT_ENTRY_PC, IRQ_VECTOR};
pub use error::Error;
pub use opcode::Opcode;
pub use operand::Operand;
pub use status::{Status, StatusFlag};

/// Convenience alias for this crate's fallible internal operations.
pub type Result<T> = std::result::Result<T, Error>;
