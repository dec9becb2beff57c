use thiserror::Error;

use super::operand::Operand;

/// Internal invariant violations inside the instruction layer.
///
/// None of these are expected to occur with a correctly-built opcode
/// table — every table entry pairs an addressing mode with a handler that
/// only ever asks that mode for the kind of operand it's able to produce.
/// They exist so a mistake here is a loud, typed error instead of a panic,
/// and so `Cpu::step` has something concrete to log and swallow rather
/// than a `None`/`unwrap` anywhere in the dispatch path.
#[derive(Error, Debug)]
pub enum Error {
    #[error("operand {0:?} does not address memory")]
    NotAnAddress(Operand),

    #[error("operand {0:?} cannot be written")]
    NotWritable(Operand),
}
