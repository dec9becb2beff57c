use crate::bus::Bus;
use crate::error::Error;
use crate::instruction;
use crate::operand::Operand;
use crate::status::{Status, StatusFlag};

/// Read by `BRK` in place of an asynchronous hardware IRQ, which this core
/// never raises on its own.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Where execution begins when nothing else configures an entry point —
/// the conventional start-of-free-RAM address used by hand-assembled
/// 6502 test programs.
pub const DEFAULT_ENTRY_PC: u16 = 0x0600;

/// The processor's register file and run state.
///
/// `Cpu` only knows how to execute one instruction at a time
/// ([`Cpu::step`]); it has no notion of cycle counts, wall-clock timing, or
/// concurrent access. A caller drives it in a loop, checking `running`
/// between steps.
#[derive(Clone, Copy, Debug)]
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: Status,
    /// Cleared by `BRK` when it reads an unprogrammed (all-zero) IRQ
    /// vector. `step` is a no-op once this is false; a caller starts a new
    /// run by building a fresh `Cpu`.
    pub running: bool,
}

impl Cpu {
    /// Power-on state with execution starting at `entry_pc`:
    /// `A = X = Y = 0`, `SP = 0xFF`, `P` all flags clear, `running = true`.
    pub fn new(entry_pc: u16) -> Cpu {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: entry_pc,
            p: Status(0),
            running: true,
        }
    }

    /// Override the program counter directly. Used by callers that want
    /// to start somewhere other than `entry_pc` without rebuilding `Cpu`.
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    /// Decode and execute the instruction at `PC`, advancing `PC` past it.
    ///
    /// This is the only entry point into the instruction layer. An
    /// unassigned opcode byte is logged and skipped as a single byte; an
    /// internal invariant error from a handler is logged and otherwise
    /// ignored. Neither case is visible to the caller — `step` never
    /// returns an error.
    pub fn step(&mut self, bus: &mut dyn Bus) {
        if !self.running {
            return;
        }

        let opcode_pc = self.pc;
        let byte = bus.read_u8(opcode_pc);

        let entry = match instruction::decode(byte) {
            Some(entry) => entry,
            None => {
                log::warn!("unknown opcode ${:02X} at ${:04X}, skipping", byte, opcode_pc);
                self.pc = opcode_pc.wrapping_add(1);
                return;
            }
        };

        let operand_pc = opcode_pc.wrapping_add(1);
        let operand = Operand::resolve(entry.mode, bus, operand_pc, self.x, self.y);
        self.pc = operand_pc.wrapping_add(entry.mode.operand_len());

        if let Err(err) = (entry.handler)(self, bus, operand) {
            log::error!(
                "{:?} (${:02X}) at ${:04X}: {}",
                entry.opcode,
                byte,
                opcode_pc,
                err
            );
        }
    }

    fn push_u8(&mut self, bus: &mut dyn Bus, value: u8) {
        bus.write_u8(0x0100 + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop_u8(&mut self, bus: &mut dyn Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read_u8(0x0100 + self.sp as u16)
    }

    fn push_u16(&mut self, bus: &mut dyn Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push_u8(bus, hi);
        self.push_u8(bus, lo);
    }

    fn pop_u16(&mut self, bus: &mut dyn Bus) -> u16 {
        let lo = self.pop_u8(bus);
        let hi = self.pop_u8(bus);
        u16::from_le_bytes([lo, hi])
    }
}

/// One function per instruction mnemonic, each matching
/// [`instruction::Handler`](crate::instruction::Handler)'s signature so the
/// opcode table can store them directly as function pointers. Addressing
/// mode is never matched on here — by the time a handler runs, the operand
/// is already a resolved [`Operand`] regardless of which mode produced it.
pub(crate) mod ops {
    use super::{add_with_carry, branch_if, shift_rmw, Cpu};
    use crate::bus::Bus;
    use crate::error::Error;
    use crate::operand::Operand;
    use crate::status::StatusFlag::*;

    pub(crate) fn op_lda(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.a = value;
        cpu.p.set_zn(value);
        Ok(())
    }

    pub(crate) fn op_ldx(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.x = value;
        cpu.p.set_zn(value);
        Ok(())
    }

    pub(crate) fn op_ldy(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.y = value;
        cpu.p.set_zn(value);
        Ok(())
    }

    pub(crate) fn op_sta(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        operand.write(bus, cpu.a)
    }

    pub(crate) fn op_stx(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        operand.write(bus, cpu.x)
    }

    pub(crate) fn op_sty(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        operand.write(bus, cpu.y)
    }

    pub(crate) fn op_tax(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.x = cpu.a;
        cpu.p.set_zn(cpu.x);
        Ok(())
    }

    pub(crate) fn op_tay(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.y = cpu.a;
        cpu.p.set_zn(cpu.y);
        Ok(())
    }

    pub(crate) fn op_txa(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.a = cpu.x;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_tya(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.a = cpu.y;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_tsx(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.x = cpu.sp;
        cpu.p.set_zn(cpu.x);
        Ok(())
    }

    pub(crate) fn op_txs(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.sp = cpu.x;
        Ok(())
    }

    pub(crate) fn op_pha(cpu: &mut Cpu, bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        let a = cpu.a;
        cpu.push_u8(bus, a);
        Ok(())
    }

    pub(crate) fn op_php(cpu: &mut Cpu, bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        let pushed = cpu.p.with(Break, true).with(Unused, true);
        cpu.push_u8(bus, pushed.0);
        Ok(())
    }

    pub(crate) fn op_pla(cpu: &mut Cpu, bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.a = cpu.pop_u8(bus);
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_plp(cpu: &mut Cpu, bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        let value = cpu.pop_u8(bus);
        cpu.p = super::Status(value).with(Unused, false);
        Ok(())
    }

    pub(crate) fn op_and(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.a &= value;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_eor(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.a ^= value;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_ora(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.a |= value;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_bit(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.p.set(Zero, (cpu.a & value) == 0);
        cpu.p.set(Overflow, value & 0x40 != 0);
        cpu.p.set(Negative, value & 0x80 != 0);
        Ok(())
    }

    pub(crate) fn op_adc(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        add_with_carry(cpu, value);
        Ok(())
    }

    pub(crate) fn op_sbc(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        add_with_carry(cpu, !value);
        Ok(())
    }

    pub(crate) fn op_cmp(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.p.set(Carry, cpu.a >= value);
        cpu.p.set_zn(cpu.a.wrapping_sub(value));
        Ok(())
    }

    pub(crate) fn op_cpx(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.p.set(Carry, cpu.x >= value);
        cpu.p.set_zn(cpu.x.wrapping_sub(value));
        Ok(())
    }

    pub(crate) fn op_cpy(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.p.set(Carry, cpu.y >= value);
        cpu.p.set_zn(cpu.y.wrapping_sub(value));
        Ok(())
    }

    pub(crate) fn op_inc(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let address = operand.address()?;
        let value = bus.read_u8(address).wrapping_add(1);
        bus.write_u8(address, value);
        cpu.p.set_zn(value);
        Ok(())
    }

    pub(crate) fn op_inx(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.x = cpu.x.wrapping_add(1);
        cpu.p.set_zn(cpu.x);
        Ok(())
    }

    pub(crate) fn op_iny(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.y = cpu.y.wrapping_add(1);
        cpu.p.set_zn(cpu.y);
        Ok(())
    }

    pub(crate) fn op_dec(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let address = operand.address()?;
        let value = bus.read_u8(address).wrapping_sub(1);
        bus.write_u8(address, value);
        cpu.p.set_zn(value);
        Ok(())
    }

    pub(crate) fn op_dex(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.x = cpu.x.wrapping_sub(1);
        cpu.p.set_zn(cpu.x);
        Ok(())
    }

    pub(crate) fn op_dey(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.y = cpu.y.wrapping_sub(1);
        cpu.p.set_zn(cpu.y);
        Ok(())
    }

    pub(crate) fn op_asl(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        shift_rmw(cpu, bus, operand, |value, p| {
            p.set(Carry, value & 0x80 != 0);
            value << 1
        })
    }

    pub(crate) fn op_lsr(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        shift_rmw(cpu, bus, operand, |value, p| {
            p.set(Carry, value & 0x01 != 0);
            value >> 1
        })
    }

    pub(crate) fn op_rol(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        shift_rmw(cpu, bus, operand, |value, p| {
            let carry_in = p.get(Carry) as u8;
            p.set(Carry, value & 0x80 != 0);
            (value << 1) | carry_in
        })
    }

    pub(crate) fn op_ror(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        shift_rmw(cpu, bus, operand, |value, p| {
            let carry_in = p.get(Carry) as u8;
            p.set(Carry, value & 0x01 != 0);
            (value >> 1) | (carry_in << 7)
        })
    }

    pub(crate) fn op_jmp(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        cpu.pc = operand.address()?;
        Ok(())
    }

    pub(crate) fn op_jsr(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let target = operand.address()?;
        let return_address = cpu.pc.wrapping_sub(1);
        cpu.push_u16(bus, return_address);
        cpu.pc = target;
        Ok(())
    }

    pub(crate) fn op_rts(cpu: &mut Cpu, bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        let address = cpu.pop_u16(bus);
        cpu.pc = address.wrapping_add(1);
        Ok(())
    }

    pub(crate) fn op_bcc(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, !cpu.p.get(Carry))
    }

    pub(crate) fn op_bcs(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, cpu.p.get(Carry))
    }

    pub(crate) fn op_beq(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, cpu.p.get(Zero))
    }

    pub(crate) fn op_bmi(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, cpu.p.get(Negative))
    }

    pub(crate) fn op_bne(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, !cpu.p.get(Zero))
    }

    pub(crate) fn op_bpl(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, !cpu.p.get(Negative))
    }

    pub(crate) fn op_bvc(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, !cpu.p.get(Overflow))
    }

    pub(crate) fn op_bvs(cpu: &mut Cpu, _bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        branch_if(cpu, operand, cpu.p.get(Overflow))
    }

    pub(crate) fn op_clc(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.p.set(Carry, false);
        Ok(())
    }

    pub(crate) fn op_cld(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.p.set(DecimalMode, false);
        Ok(())
    }

    pub(crate) fn op_cli(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.p.set(InterruptDisable, false);
        Ok(())
    }

    pub(crate) fn op_clv(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.p.set(Overflow, false);
        Ok(())
    }

    pub(crate) fn op_sec(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.p.set(Carry, true);
        Ok(())
    }

    pub(crate) fn op_sed(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.p.set(DecimalMode, true);
        Ok(())
    }

    pub(crate) fn op_sei(cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        cpu.p.set(InterruptDisable, true);
        Ok(())
    }

    /// A zeroed IRQ vector means the image never installed a handler; this
    /// is the emulator's sanctioned way to stop a program. In that case
    /// `BRK` clears `running` without touching the stack, leaving register
    /// state exactly as it was at the moment of the halt. Otherwise it
    /// pushes the return address as `PC + 1` (skipping the padding byte
    /// conventionally following the opcode), then a copy of `P` with `B`
    /// and `U` forced set, sets `I`, and jumps to the vector.
    pub(crate) fn op_brk(cpu: &mut Cpu, bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        let vector = bus.read_u16(super::IRQ_VECTOR);
        if vector == 0 {
            log::info!("BRK at unprogrammed IRQ vector, halting");
            cpu.running = false;
            return Ok(());
        }

        let return_address = cpu.pc.wrapping_add(1);
        cpu.push_u16(bus, return_address);
        let pushed = cpu.p.with(Break, true).with(Unused, true);
        cpu.push_u8(bus, pushed.0);
        cpu.p.set(InterruptDisable, true);
        cpu.pc = vector;
        Ok(())
    }

    pub(crate) fn op_nop(_cpu: &mut Cpu, _bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        Ok(())
    }

    pub(crate) fn op_rti(cpu: &mut Cpu, bus: &mut dyn Bus, _operand: Operand) -> Result<(), Error> {
        let status = cpu.pop_u8(bus);
        cpu.p = super::Status(status).with(Break, false);
        cpu.pc = cpu.pop_u16(bus);
        Ok(())
    }

    pub(crate) fn op_lax(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.a = value;
        cpu.x = value;
        cpu.p.set_zn(value);
        Ok(())
    }

    pub(crate) fn op_sax(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = cpu.a & cpu.x;
        operand.write(bus, value)
    }

    pub(crate) fn op_dcp(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let address = operand.address()?;
        let value = bus.read_u8(address).wrapping_sub(1);
        bus.write_u8(address, value);
        cpu.p.set(Carry, cpu.a >= value);
        cpu.p.set_zn(cpu.a.wrapping_sub(value));
        Ok(())
    }

    pub(crate) fn op_isb(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let address = operand.address()?;
        let value = bus.read_u8(address).wrapping_add(1);
        bus.write_u8(address, value);
        add_with_carry(cpu, !value);
        Ok(())
    }

    pub(crate) fn op_slo(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let address = operand.address()?;
        let old = bus.read_u8(address);
        cpu.p.set(Carry, old & 0x80 != 0);
        let shifted = old << 1;
        bus.write_u8(address, shifted);
        cpu.a |= shifted;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_sre(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let address = operand.address()?;
        let old = bus.read_u8(address);
        cpu.p.set(Carry, old & 0x01 != 0);
        let shifted = old >> 1;
        bus.write_u8(address, shifted);
        cpu.a ^= shifted;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_alr(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.a &= value;
        cpu.p.set(Carry, cpu.a & 0x01 != 0);
        cpu.a >>= 1;
        cpu.p.set_zn(cpu.a);
        Ok(())
    }

    pub(crate) fn op_anc(cpu: &mut Cpu, bus: &mut dyn Bus, operand: Operand) -> Result<(), Error> {
        let value = operand.read(cpu.a, bus)?;
        cpu.a &= value;
        cpu.p.set_zn(cpu.a);
        cpu.p.set(Carry, cpu.a & 0x80 != 0);
        Ok(())
    }
}

/// Shared `ADC`/`SBC` core. `SBC` is implemented as `ADC` of the bitwise
/// complement of its operand, which is how the hardware itself computes
/// it — carry-in doubles as "not borrow".
fn add_with_carry(cpu: &mut Cpu, value: u8) {
    let carry_in = cpu.p.get(StatusFlag::Carry) as u16;
    let sum = cpu.a as u16 + value as u16 + carry_in;
    let result = sum as u8;
    cpu.p.set(StatusFlag::Carry, sum > 0xFF);
    cpu.p.set(
        StatusFlag::Overflow,
        (!(cpu.a ^ value) & (cpu.a ^ result) & 0x80) != 0,
    );
    cpu.a = result;
    cpu.p.set_zn(result);
}

/// Shared read-modify-write core for `ASL`/`LSR`/`ROL`/`ROR`, which all
/// operate on either the accumulator or a memory location depending on
/// addressing mode. `f` computes the shifted value and updates `Carry`;
/// `Zero`/`Negative` are always derived from the result afterward.
fn shift_rmw(
    cpu: &mut Cpu,
    bus: &mut dyn Bus,
    operand: Operand,
    f: impl FnOnce(u8, &mut Status) -> u8,
) -> Result<(), Error> {
    let value = operand.read(cpu.a, bus)?;
    let result = f(value, &mut cpu.p);
    match operand {
        Operand::Accumulator => cpu.a = result,
        Operand::Address(_) => operand.write(bus, result)?,
        _ => return Err(Error::NotWritable(operand)),
    }
    cpu.p.set_zn(result);
    Ok(())
}

/// Shared branch core: jump to the operand's resolved address when
/// `condition` holds, otherwise fall through to the already-advanced `PC`.
fn branch_if(cpu: &mut Cpu, operand: Operand, condition: bool) -> Result<(), Error> {
    if condition {
        cpu.pc = operand.address()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{AddressSpace, NullIoAdapter};

    fn cpu_with_program(bytes: &[u8]) -> (Cpu, AddressSpace<NullIoAdapter>) {
        let mut bus = AddressSpace::new(NullIoAdapter);
        bus.load_program(bytes, 0x0200);
        let cpu = Cpu::new(0x0200);
        (cpu, bus)
    }

    #[test]
    fn lda_immediate_sets_accumulator_and_flags() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA9, 0x00]);
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.p.get(StatusFlag::Zero));
        assert_eq!(cpu.pc, 0x0202);
    }

    #[test]
    fn adc_sets_carry_and_overflow_on_signed_overflow() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x69, 0x10]);
        cpu.a = 0x7F;
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x8F);
        assert!(cpu.p.get(StatusFlag::Overflow));
        assert!(!cpu.p.get(StatusFlag::Carry));
    }

    #[test]
    fn sbc_without_borrow_subtracts_cleanly_when_carry_set() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xE9, 0x01]);
        cpu.a = 0x05;
        cpu.p.set(StatusFlag::Carry, true);
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x04);
        assert!(cpu.p.get(StatusFlag::Carry));
    }

    #[test]
    fn jsr_then_rts_round_trips_pc() {
        let mut bus = AddressSpace::new(NullIoAdapter);
        bus.load_program(&[0x20, 0x00, 0x03], 0x0200);
        bus.load_program(&[0x60], 0x0300);
        let mut cpu = Cpu::new(0x0200);

        cpu.step(&mut bus); // JSR $0300
        assert_eq!(cpu.pc, 0x0300);

        cpu.step(&mut bus); // RTS
        assert_eq!(cpu.pc, 0x0203);
    }

    #[test]
    fn branch_not_taken_falls_through() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xF0, 0x10]); // BEQ +16
        cpu.p.set(StatusFlag::Zero, false);
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x0202);
    }

    #[test]
    fn branch_taken_jumps_to_target() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xF0, 0x10]); // BEQ +16
        cpu.p.set(StatusFlag::Zero, true);
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x0212);
    }

    #[test]
    fn brk_with_unprogrammed_vector_halts() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x00, 0x00]);
        cpu.step(&mut bus);
        assert!(!cpu.running);

        let pc_before = cpu.pc;
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, pc_before, "step is a no-op once stopped");
    }

    #[test]
    fn lax_loads_both_accumulator_and_x() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA7, 0x10]);
        bus.write_u8(0x0010, 0x42);
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x42);
        assert_eq!(cpu.x, 0x42);
    }

    #[test]
    fn dcp_decrements_memory_then_compares() {
        let (mut cpu, mut bus) = cpu_with_program(&[0xC7, 0x10]);
        bus.write_u8(0x0010, 0x05);
        cpu.a = 0x05;
        cpu.step(&mut bus);
        assert_eq!(bus.read_u8(0x0010), 0x04);
        assert!(cpu.p.get(StatusFlag::Carry));
    }

    #[test]
    fn php_forces_break_and_unused_bits() {
        let (mut cpu, mut bus) = cpu_with_program(&[0x08]);
        cpu.p = Status(0x00);
        cpu.step(&mut bus);
        let pushed = bus.read_u8(0x01FF);
        assert_eq!(pushed & 0x30, 0x30);
    }

    #[test]
    fn new_starts_at_configured_entry_with_power_on_registers() {
        let cpu = Cpu::new(DEFAULT_ENTRY_PC);
        assert_eq!(cpu.pc, 0x0600);
        assert_eq!(cpu.sp, 0xFF);
        assert_eq!(cpu.a, 0);
        assert!(cpu.running);
    }
}
