use std::sync::OnceLock;

use crate::addressing_mode::AddressingMode;
use crate::addressing_mode::AddressingMode::*;
use crate::cpu::ops;
use crate::cpu::Cpu;
use crate::error::Error;
use crate::opcode::Opcode;
use crate::opcode::Opcode::*;
use crate::bus::Bus;
use crate::operand::Operand;

/// The signature every opcode handler shares: given the CPU, the bus, and
/// an already-resolved operand, apply the instruction's effect and update
/// flags. Errors are internal-invariant violations only (see
/// [`crate::error::Error`]); a handler never fails because of what's in
/// memory.
pub type Handler = fn(&mut Cpu, &mut dyn Bus, Operand) -> Result<(), Error>;

/// One row of the opcode table: the mnemonic and addressing mode an opcode
/// byte decodes to, plus the handler that executes it.
#[derive(Clone, Copy)]
pub struct OpcodeEntry {
    pub opcode: Opcode,
    pub mode: AddressingMode,
    pub handler: Handler,
}

/// Decode `byte` into its table entry, or `None` if the byte isn't
/// assigned to any instruction — including `RLA`/`RRA`, which this core
/// doesn't implement.
pub fn decode(byte: u8) -> Option<OpcodeEntry> {
    table()[byte as usize]
}

fn table() -> &'static [Option<OpcodeEntry>; 256] {
    static TABLE: OnceLock<[Option<OpcodeEntry>; 256]> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

fn build_table() -> [Option<OpcodeEntry>; 256] {
    let mut table: [Option<OpcodeEntry>; 256] = [None; 256];

    macro_rules! entry {
        ($byte:literal, $opcode:expr, $mode:expr, $handler:expr) => {
            table[$byte] = Some(OpcodeEntry {
                opcode: $opcode,
                mode: $mode,
                handler: $handler,
            });
        };
    }

    // Load/store
    entry!(0xA9, LDA, Immediate, ops::op_lda);
    entry!(0xA5, LDA, ZeroPage, ops::op_lda);
    entry!(0xB5, LDA, ZeroPageX, ops::op_lda);
    entry!(0xAD, LDA, Absolute, ops::op_lda);
    entry!(0xBD, LDA, AbsoluteX, ops::op_lda);
    entry!(0xB9, LDA, AbsoluteY, ops::op_lda);
    entry!(0xA1, LDA, IndexedIndirect, ops::op_lda);
    entry!(0xB1, LDA, IndirectIndexed, ops::op_lda);

    entry!(0xA2, LDX, Immediate, ops::op_ldx);
    entry!(0xA6, LDX, ZeroPage, ops::op_ldx);
    entry!(0xB6, LDX, ZeroPageY, ops::op_ldx);
    entry!(0xAE, LDX, Absolute, ops::op_ldx);
    entry!(0xBE, LDX, AbsoluteY, ops::op_ldx);

    entry!(0xA0, LDY, Immediate, ops::op_ldy);
    entry!(0xA4, LDY, ZeroPage, ops::op_ldy);
    entry!(0xB4, LDY, ZeroPageX, ops::op_ldy);
    entry!(0xAC, LDY, Absolute, ops::op_ldy);
    entry!(0xBC, LDY, AbsoluteX, ops::op_ldy);

    entry!(0x85, STA, ZeroPage, ops::op_sta);
    entry!(0x95, STA, ZeroPageX, ops::op_sta);
    entry!(0x8D, STA, Absolute, ops::op_sta);
    entry!(0x9D, STA, AbsoluteX, ops::op_sta);
    entry!(0x99, STA, AbsoluteY, ops::op_sta);
    entry!(0x81, STA, IndexedIndirect, ops::op_sta);
    entry!(0x91, STA, IndirectIndexed, ops::op_sta);

    entry!(0x86, STX, ZeroPage, ops::op_stx);
    entry!(0x96, STX, ZeroPageY, ops::op_stx);
    entry!(0x8E, STX, Absolute, ops::op_stx);

    entry!(0x84, STY, ZeroPage, ops::op_sty);
    entry!(0x94, STY, ZeroPageX, ops::op_sty);
    entry!(0x8C, STY, Absolute, ops::op_sty);

    // Transfers
    entry!(0xAA, TAX, Implied, ops::op_tax);
    entry!(0xA8, TAY, Implied, ops::op_tay);
    entry!(0x8A, TXA, Implied, ops::op_txa);
    entry!(0x98, TYA, Implied, ops::op_tya);
    entry!(0xBA, TSX, Implied, ops::op_tsx);
    entry!(0x9A, TXS, Implied, ops::op_txs);

    // Stack
    entry!(0x48, PHA, Implied, ops::op_pha);
    entry!(0x08, PHP, Implied, ops::op_php);
    entry!(0x68, PLA, Implied, ops::op_pla);
    entry!(0x28, PLP, Implied, ops::op_plp);

    // Logic
    entry!(0x29, AND, Immediate, ops::op_and);
    entry!(0x25, AND, ZeroPage, ops::op_and);
    entry!(0x35, AND, ZeroPageX, ops::op_and);
    entry!(0x2D, AND, Absolute, ops::op_and);
    entry!(0x3D, AND, AbsoluteX, ops::op_and);
    entry!(0x39, AND, AbsoluteY, ops::op_and);
    entry!(0x21, AND, IndexedIndirect, ops::op_and);
    entry!(0x31, AND, IndirectIndexed, ops::op_and);

    entry!(0x49, EOR, Immediate, ops::op_eor);
    entry!(0x45, EOR, ZeroPage, ops::op_eor);
    entry!(0x55, EOR, ZeroPageX, ops::op_eor);
    entry!(0x4D, EOR, Absolute, ops::op_eor);
    entry!(0x5D, EOR, AbsoluteX, ops::op_eor);
    entry!(0x59, EOR, AbsoluteY, ops::op_eor);
    entry!(0x41, EOR, IndexedIndirect, ops::op_eor);
    entry!(0x51, EOR, IndirectIndexed, ops::op_eor);

    entry!(0x09, ORA, Immediate, ops::op_ora);
    entry!(0x05, ORA, ZeroPage, ops::op_ora);
    entry!(0x15, ORA, ZeroPageX, ops::op_ora);
    entry!(0x0D, ORA, Absolute, ops::op_ora);
    entry!(0x1D, ORA, AbsoluteX, ops::op_ora);
    entry!(0x19, ORA, AbsoluteY, ops::op_ora);
    entry!(0x01, ORA, IndexedIndirect, ops::op_ora);
    entry!(0x11, ORA, IndirectIndexed, ops::op_ora);

    entry!(0x24, BIT, ZeroPage, ops::op_bit);
    entry!(0x2C, BIT, Absolute, ops::op_bit);

    // Arithmetic
    entry!(0x69, ADC, Immediate, ops::op_adc);
    entry!(0x65, ADC, ZeroPage, ops::op_adc);
    entry!(0x75, ADC, ZeroPageX, ops::op_adc);
    entry!(0x6D, ADC, Absolute, ops::op_adc);
    entry!(0x7D, ADC, AbsoluteX, ops::op_adc);
    entry!(0x79, ADC, AbsoluteY, ops::op_adc);
    entry!(0x61, ADC, IndexedIndirect, ops::op_adc);
    entry!(0x71, ADC, IndirectIndexed, ops::op_adc);

    entry!(0xE9, SBC, Immediate, ops::op_sbc);
    entry!(0xE5, SBC, ZeroPage, ops::op_sbc);
    entry!(0xF5, SBC, ZeroPageX, ops::op_sbc);
    entry!(0xED, SBC, Absolute, ops::op_sbc);
    entry!(0xFD, SBC, AbsoluteX, ops::op_sbc);
    entry!(0xF9, SBC, AbsoluteY, ops::op_sbc);
    entry!(0xE1, SBC, IndexedIndirect, ops::op_sbc);
    entry!(0xF1, SBC, IndirectIndexed, ops::op_sbc);

    entry!(0xC9, CMP, Immediate, ops::op_cmp);
    entry!(0xC5, CMP, ZeroPage, ops::op_cmp);
    entry!(0xD5, CMP, ZeroPageX, ops::op_cmp);
    entry!(0xCD, CMP, Absolute, ops::op_cmp);
    entry!(0xDD, CMP, AbsoluteX, ops::op_cmp);
    entry!(0xD9, CMP, AbsoluteY, ops::op_cmp);
    entry!(0xC1, CMP, IndexedIndirect, ops::op_cmp);
    entry!(0xD1, CMP, IndirectIndexed, ops::op_cmp);

    entry!(0xE0, CPX, Immediate, ops::op_cpx);
    entry!(0xE4, CPX, ZeroPage, ops::op_cpx);
    entry!(0xEC, CPX, Absolute, ops::op_cpx);

    entry!(0xC0, CPY, Immediate, ops::op_cpy);
    entry!(0xC4, CPY, ZeroPage, ops::op_cpy);
    entry!(0xCC, CPY, Absolute, ops::op_cpy);

    // Increments/decrements
    entry!(0xE6, INC, ZeroPage, ops::op_inc);
    entry!(0xF6, INC, ZeroPageX, ops::op_inc);
    entry!(0xEE, INC, Absolute, ops::op_inc);
    entry!(0xFE, INC, AbsoluteX, ops::op_inc);
    entry!(0xE8, INX, Implied, ops::op_inx);
    entry!(0xC8, INY, Implied, ops::op_iny);

    entry!(0xC6, DEC, ZeroPage, ops::op_dec);
    entry!(0xD6, DEC, ZeroPageX, ops::op_dec);
    entry!(0xCE, DEC, Absolute, ops::op_dec);
    entry!(0xDE, DEC, AbsoluteX, ops::op_dec);
    entry!(0xCA, DEX, Implied, ops::op_dex);
    entry!(0x88, DEY, Implied, ops::op_dey);

    // Shifts
    entry!(0x0A, ASL, Accumulator, ops::op_asl);
    entry!(0x06, ASL, ZeroPage, ops::op_asl);
    entry!(0x16, ASL, ZeroPageX, ops::op_asl);
    entry!(0x0E, ASL, Absolute, ops::op_asl);
    entry!(0x1E, ASL, AbsoluteX, ops::op_asl);

    entry!(0x4A, LSR, Accumulator, ops::op_lsr);
    entry!(0x46, LSR, ZeroPage, ops::op_lsr);
    entry!(0x56, LSR, ZeroPageX, ops::op_lsr);
    entry!(0x4E, LSR, Absolute, ops::op_lsr);
    entry!(0x5E, LSR, AbsoluteX, ops::op_lsr);

    entry!(0x2A, ROL, Accumulator, ops::op_rol);
    entry!(0x26, ROL, ZeroPage, ops::op_rol);
    entry!(0x36, ROL, ZeroPageX, ops::op_rol);
    entry!(0x2E, ROL, Absolute, ops::op_rol);
    entry!(0x3E, ROL, AbsoluteX, ops::op_rol);

    entry!(0x6A, ROR, Accumulator, ops::op_ror);
    entry!(0x66, ROR, ZeroPage, ops::op_ror);
    entry!(0x76, ROR, ZeroPageX, ops::op_ror);
    entry!(0x6E, ROR, Absolute, ops::op_ror);
    entry!(0x7E, ROR, AbsoluteX, ops::op_ror);

    // Jumps/calls
    entry!(0x4C, JMP, Absolute, ops::op_jmp);
    entry!(0x6C, JMP, Indirect, ops::op_jmp);
    entry!(0x20, JSR, Absolute, ops::op_jsr);
    entry!(0x60, RTS, Implied, ops::op_rts);

    // Branches
    entry!(0x90, BCC, Relative, ops::op_bcc);
    entry!(0xB0, BCS, Relative, ops::op_bcs);
    entry!(0xF0, BEQ, Relative, ops::op_beq);
    entry!(0x30, BMI, Relative, ops::op_bmi);
    entry!(0xD0, BNE, Relative, ops::op_bne);
    entry!(0x10, BPL, Relative, ops::op_bpl);
    entry!(0x50, BVC, Relative, ops::op_bvc);
    entry!(0x70, BVS, Relative, ops::op_bvs);

    // Flags
    entry!(0x18, CLC, Implied, ops::op_clc);
    entry!(0xD8, CLD, Implied, ops::op_cld);
    entry!(0x58, CLI, Implied, ops::op_cli);
    entry!(0xB8, CLV, Implied, ops::op_clv);
    entry!(0x38, SEC, Implied, ops::op_sec);
    entry!(0xF8, SED, Implied, ops::op_sed);
    entry!(0x78, SEI, Implied, ops::op_sei);

    // System
    entry!(0x00, BRK, Implied, ops::op_brk);
    entry!(0xEA, NOP, Implied, ops::op_nop);
    entry!(0x40, RTI, Implied, ops::op_rti);

    // Undocumented: multi-byte NOPs. Same handler as the documented NOP;
    // only the addressing mode differs, so the operand's bytes are
    // consumed (and any page-crossing memory read happens) without
    // affecting registers or flags.
    entry!(0x1A, NOP, Implied, ops::op_nop);
    entry!(0x3A, NOP, Implied, ops::op_nop);
    entry!(0x5A, NOP, Implied, ops::op_nop);
    entry!(0x7A, NOP, Implied, ops::op_nop);
    entry!(0xDA, NOP, Implied, ops::op_nop);
    entry!(0xFA, NOP, Implied, ops::op_nop);

    entry!(0x80, NOP, Immediate, ops::op_nop);
    entry!(0x82, NOP, Immediate, ops::op_nop);
    entry!(0x89, NOP, Immediate, ops::op_nop);
    entry!(0xC2, NOP, Immediate, ops::op_nop);
    entry!(0xE2, NOP, Immediate, ops::op_nop);

    entry!(0x04, NOP, ZeroPage, ops::op_nop);
    entry!(0x44, NOP, ZeroPage, ops::op_nop);
    entry!(0x64, NOP, ZeroPage, ops::op_nop);

    entry!(0x14, NOP, ZeroPageX, ops::op_nop);
    entry!(0x34, NOP, ZeroPageX, ops::op_nop);
    entry!(0x54, NOP, ZeroPageX, ops::op_nop);
    entry!(0x74, NOP, ZeroPageX, ops::op_nop);
    entry!(0xD4, NOP, ZeroPageX, ops::op_nop);
    entry!(0xF4, NOP, ZeroPageX, ops::op_nop);

    entry!(0x0C, NOP, Absolute, ops::op_nop);

    entry!(0x1C, NOP, AbsoluteX, ops::op_nop);
    entry!(0x3C, NOP, AbsoluteX, ops::op_nop);
    entry!(0x5C, NOP, AbsoluteX, ops::op_nop);
    entry!(0x7C, NOP, AbsoluteX, ops::op_nop);
    entry!(0xDC, NOP, AbsoluteX, ops::op_nop);
    entry!(0xFC, NOP, AbsoluteX, ops::op_nop);

    // Undocumented: LAX
    entry!(0xA7, LAX, ZeroPage, ops::op_lax);
    entry!(0xB7, LAX, ZeroPageY, ops::op_lax);
    entry!(0xAF, LAX, Absolute, ops::op_lax);
    entry!(0xBF, LAX, AbsoluteY, ops::op_lax);
    entry!(0xA3, LAX, IndexedIndirect, ops::op_lax);
    entry!(0xB3, LAX, IndirectIndexed, ops::op_lax);

    // Undocumented: SAX
    entry!(0x87, SAX, ZeroPage, ops::op_sax);
    entry!(0x97, SAX, ZeroPageY, ops::op_sax);
    entry!(0x8F, SAX, Absolute, ops::op_sax);
    entry!(0x83, SAX, IndexedIndirect, ops::op_sax);

    // Undocumented: DCP (note: 0xDB is AbsoluteY, not AbsoluteX)
    entry!(0xC7, DCP, ZeroPage, ops::op_dcp);
    entry!(0xD7, DCP, ZeroPageX, ops::op_dcp);
    entry!(0xCF, DCP, Absolute, ops::op_dcp);
    entry!(0xDF, DCP, AbsoluteX, ops::op_dcp);
    entry!(0xDB, DCP, AbsoluteY, ops::op_dcp);
    entry!(0xC3, DCP, IndexedIndirect, ops::op_dcp);
    entry!(0xD3, DCP, IndirectIndexed, ops::op_dcp);

    // Undocumented: ISB/ISC
    entry!(0xE7, ISB, ZeroPage, ops::op_isb);
    entry!(0xF7, ISB, ZeroPageX, ops::op_isb);
    entry!(0xEF, ISB, Absolute, ops::op_isb);
    entry!(0xFF, ISB, AbsoluteX, ops::op_isb);
    entry!(0xFB, ISB, AbsoluteY, ops::op_isb);
    entry!(0xE3, ISB, IndexedIndirect, ops::op_isb);
    entry!(0xF3, ISB, IndirectIndexed, ops::op_isb);

    // Undocumented: SLO
    entry!(0x07, SLO, ZeroPage, ops::op_slo);
    entry!(0x17, SLO, ZeroPageX, ops::op_slo);
    entry!(0x0F, SLO, Absolute, ops::op_slo);
    entry!(0x1F, SLO, AbsoluteX, ops::op_slo);
    entry!(0x1B, SLO, AbsoluteY, ops::op_slo);
    entry!(0x03, SLO, IndexedIndirect, ops::op_slo);
    entry!(0x13, SLO, IndirectIndexed, ops::op_slo);

    // Undocumented: SRE
    entry!(0x47, SRE, ZeroPage, ops::op_sre);
    entry!(0x57, SRE, ZeroPageX, ops::op_sre);
    entry!(0x4F, SRE, Absolute, ops::op_sre);
    entry!(0x5F, SRE, AbsoluteX, ops::op_sre);
    entry!(0x5B, SRE, AbsoluteY, ops::op_sre);
    entry!(0x43, SRE, IndexedIndirect, ops::op_sre);
    entry!(0x53, SRE, IndirectIndexed, ops::op_sre);

    // Undocumented: ALR, ANC
    entry!(0x4B, ALR, Immediate, ops::op_alr);
    entry!(0x0B, ANC, Immediate, ops::op_anc);
    entry!(0x2B, ANC, Immediate, ops::op_anc);

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_opcode() {
        let entry = decode(0xA9).expect("LDA immediate should decode");
        assert_eq!(entry.opcode, Opcode::LDA);
        assert_eq!(entry.mode, AddressingMode::Immediate);
    }

    #[test]
    fn dcp_0xdb_is_absolute_y() {
        let entry = decode(0xDB).expect("DCP $DB should decode");
        assert_eq!(entry.mode, AddressingMode::AbsoluteY);
    }

    #[test]
    fn unassigned_byte_decodes_to_none() {
        // 0x02 has never been wired to any opcode in this table, official
        // or undocumented.
        assert!(decode(0x02).is_none());
    }

    #[test]
    fn rla_and_rra_opcode_bytes_are_unassigned() {
        // These bytes are RLA/RRA in the standard undocumented-opcode
        // table, which this core intentionally doesn't implement.
        for byte in [0x23u8, 0x27, 0x2F, 0x33, 0x37, 0x3B, 0x3F] {
            assert!(decode(byte).is_none(), "expected 0x{:02X} unassigned", byte);
        }
    }
}
