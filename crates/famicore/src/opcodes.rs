//! 6502 opcode table
//!
//! A 256-entry lookup keyed by the raw opcode byte. Every entry carries the
//! mnemonic tag, instruction length, base cycle cost, addressing mode and
//! whether a crossed page adds one cycle. Undocumented opcodes are tagged so
//! the tracer can mark them with a `*` prefix.
//!
//! Bytes with no entry (the JAM/unstable group) decode to `None` and the CPU
//! reports them as `UnknownOpcode`.

/// Operand resolution strategy for an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

/// Instruction mnemonic tag used for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx,
    Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay,
    Tsx, Txa, Txs, Tya,
    // Undocumented combined operations
    Lax, Sax, Dcp, Isb, Slo, Rla, Sre, Rra,
}

impl Mnemonic {
    /// Three-letter assembler name, as printed in execution traces
    pub fn name(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC", Mnemonic::And => "AND", Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC", Mnemonic::Bcs => "BCS", Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT", Mnemonic::Bmi => "BMI", Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL", Mnemonic::Brk => "BRK", Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS", Mnemonic::Clc => "CLC", Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI", Mnemonic::Clv => "CLV", Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX", Mnemonic::Cpy => "CPY", Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX", Mnemonic::Dey => "DEY", Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC", Mnemonic::Inx => "INX", Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP", Mnemonic::Jsr => "JSR", Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX", Mnemonic::Ldy => "LDY", Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP", Mnemonic::Ora => "ORA", Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP", Mnemonic::Pla => "PLA", Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL", Mnemonic::Ror => "ROR", Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS", Mnemonic::Sbc => "SBC", Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED", Mnemonic::Sei => "SEI", Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX", Mnemonic::Sty => "STY", Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY", Mnemonic::Tsx => "TSX", Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS", Mnemonic::Tya => "TYA", Mnemonic::Lax => "LAX",
            Mnemonic::Sax => "SAX", Mnemonic::Dcp => "DCP", Mnemonic::Isb => "ISB",
            Mnemonic::Slo => "SLO", Mnemonic::Rla => "RLA", Mnemonic::Sre => "SRE",
            Mnemonic::Rra => "RRA",
        }
    }
}

/// One row of the opcode table
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Total instruction length in bytes, opcode included (1-3)
    pub len: u8,
    /// Base cycle cost before page-cross and branch adjustments
    pub cycles: u8,
    /// Add one cycle when the effective address crosses a page
    pub page_cycle: bool,
    /// Undocumented opcode, printed with a `*` prefix in traces
    pub unofficial: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, len: u8, cycles: u8, page_cycle: bool) -> Option<OpInfo> {
    Some(OpInfo { mnemonic, mode, len, cycles, page_cycle, unofficial: false })
}

const fn ill(mnemonic: Mnemonic, mode: AddressingMode, len: u8, cycles: u8, page_cycle: bool) -> Option<OpInfo> {
    Some(OpInfo { mnemonic, mode, len, cycles, page_cycle, unofficial: true })
}

/// The full decode table, indexed by opcode byte
pub static OPCODE_TABLE: [Option<OpInfo>; 256] = build_table();

/// Number of defined opcodes: 151 official + 80 undocumented
pub const DEFINED_OPCODES: usize = 231;

// Compile-time integrity check: the table must carry exactly the documented
// plus undocumented set, nothing more, nothing less.
const _: () = {
    let table = build_table();
    assert!(count_defined(&table) == DEFINED_OPCODES);
};

const fn count_defined(table: &[Option<OpInfo>; 256]) -> usize {
    let mut n = 0;
    let mut i = 0;
    while i < 256 {
        if table[i].is_some() {
            n += 1;
        }
        i += 1;
    }
    n
}

/// Look up an opcode byte
pub fn lookup(code: u8) -> Option<OpInfo> {
    OPCODE_TABLE[code as usize]
}

#[rustfmt::skip]
const fn build_table() -> [Option<OpInfo>; 256] {
    use AddressingMode::*;
    use Mnemonic::*;

    let mut t: [Option<OpInfo>; 256] = [None; 256];

    t[0x00] = op(Brk, Implied, 1, 7, false);

    t[0x69] = op(Adc, Immediate, 2, 2, false);
    t[0x65] = op(Adc, ZeroPage,  2, 3, false);
    t[0x75] = op(Adc, ZeroPageX, 2, 4, false);
    t[0x6D] = op(Adc, Absolute,  3, 4, false);
    t[0x7D] = op(Adc, AbsoluteX, 3, 4, true);
    t[0x79] = op(Adc, AbsoluteY, 3, 4, true);
    t[0x61] = op(Adc, IndirectX, 2, 6, false);
    t[0x71] = op(Adc, IndirectY, 2, 5, true);

    t[0x29] = op(And, Immediate, 2, 2, false);
    t[0x25] = op(And, ZeroPage,  2, 3, false);
    t[0x35] = op(And, ZeroPageX, 2, 4, false);
    t[0x2D] = op(And, Absolute,  3, 4, false);
    t[0x3D] = op(And, AbsoluteX, 3, 4, true);
    t[0x39] = op(And, AbsoluteY, 3, 4, true);
    t[0x21] = op(And, IndirectX, 2, 6, false);
    t[0x31] = op(And, IndirectY, 2, 5, true);

    t[0x0A] = op(Asl, Accumulator, 1, 2, false);
    t[0x06] = op(Asl, ZeroPage,  2, 5, false);
    t[0x16] = op(Asl, ZeroPageX, 2, 6, false);
    t[0x0E] = op(Asl, Absolute,  3, 6, false);
    t[0x1E] = op(Asl, AbsoluteX, 3, 7, false);

    t[0x90] = op(Bcc, Relative, 2, 2, false);
    t[0xB0] = op(Bcs, Relative, 2, 2, false);
    t[0xF0] = op(Beq, Relative, 2, 2, false);
    t[0x30] = op(Bmi, Relative, 2, 2, false);
    t[0xD0] = op(Bne, Relative, 2, 2, false);
    t[0x10] = op(Bpl, Relative, 2, 2, false);
    t[0x50] = op(Bvc, Relative, 2, 2, false);
    t[0x70] = op(Bvs, Relative, 2, 2, false);

    t[0x24] = op(Bit, ZeroPage, 2, 3, false);
    t[0x2C] = op(Bit, Absolute, 3, 4, false);

    t[0x18] = op(Clc, Implied, 1, 2, false);
    t[0xD8] = op(Cld, Implied, 1, 2, false);
    t[0x58] = op(Cli, Implied, 1, 2, false);
    t[0xB8] = op(Clv, Implied, 1, 2, false);

    t[0xC9] = op(Cmp, Immediate, 2, 2, false);
    t[0xC5] = op(Cmp, ZeroPage,  2, 3, false);
    t[0xD5] = op(Cmp, ZeroPageX, 2, 4, false);
    t[0xCD] = op(Cmp, Absolute,  3, 4, false);
    t[0xDD] = op(Cmp, AbsoluteX, 3, 4, true);
    t[0xD9] = op(Cmp, AbsoluteY, 3, 4, true);
    t[0xC1] = op(Cmp, IndirectX, 2, 6, false);
    t[0xD1] = op(Cmp, IndirectY, 2, 5, true);

    t[0xE0] = op(Cpx, Immediate, 2, 2, false);
    t[0xE4] = op(Cpx, ZeroPage,  2, 3, false);
    t[0xEC] = op(Cpx, Absolute,  3, 4, false);

    t[0xC0] = op(Cpy, Immediate, 2, 2, false);
    t[0xC4] = op(Cpy, ZeroPage,  2, 3, false);
    t[0xCC] = op(Cpy, Absolute,  3, 4, false);

    t[0xC6] = op(Dec, ZeroPage,  2, 5, false);
    t[0xD6] = op(Dec, ZeroPageX, 2, 6, false);
    t[0xCE] = op(Dec, Absolute,  3, 6, false);
    t[0xDE] = op(Dec, AbsoluteX, 3, 7, false);

    t[0xCA] = op(Dex, Implied, 1, 2, false);
    t[0x88] = op(Dey, Implied, 1, 2, false);

    t[0x49] = op(Eor, Immediate, 2, 2, false);
    t[0x45] = op(Eor, ZeroPage,  2, 3, false);
    t[0x55] = op(Eor, ZeroPageX, 2, 4, false);
    t[0x4D] = op(Eor, Absolute,  3, 4, false);
    t[0x5D] = op(Eor, AbsoluteX, 3, 4, true);
    t[0x59] = op(Eor, AbsoluteY, 3, 4, true);
    t[0x41] = op(Eor, IndirectX, 2, 6, false);
    t[0x51] = op(Eor, IndirectY, 2, 5, true);

    t[0xE6] = op(Inc, ZeroPage,  2, 5, false);
    t[0xF6] = op(Inc, ZeroPageX, 2, 6, false);
    t[0xEE] = op(Inc, Absolute,  3, 6, false);
    t[0xFE] = op(Inc, AbsoluteX, 3, 7, false);

    t[0xE8] = op(Inx, Implied, 1, 2, false);
    t[0xC8] = op(Iny, Implied, 1, 2, false);

    t[0x4C] = op(Jmp, Absolute, 3, 3, false);
    t[0x6C] = op(Jmp, Indirect, 3, 5, false);
    t[0x20] = op(Jsr, Absolute, 3, 6, false);

    t[0xA9] = op(Lda, Immediate, 2, 2, false);
    t[0xA5] = op(Lda, ZeroPage,  2, 3, false);
    t[0xB5] = op(Lda, ZeroPageX, 2, 4, false);
    t[0xAD] = op(Lda, Absolute,  3, 4, false);
    t[0xBD] = op(Lda, AbsoluteX, 3, 4, true);
    t[0xB9] = op(Lda, AbsoluteY, 3, 4, true);
    t[0xA1] = op(Lda, IndirectX, 2, 6, false);
    t[0xB1] = op(Lda, IndirectY, 2, 5, true);

    t[0xA2] = op(Ldx, Immediate, 2, 2, false);
    t[0xA6] = op(Ldx, ZeroPage,  2, 3, false);
    t[0xB6] = op(Ldx, ZeroPageY, 2, 4, false);
    t[0xAE] = op(Ldx, Absolute,  3, 4, false);
    t[0xBE] = op(Ldx, AbsoluteY, 3, 4, true);

    t[0xA0] = op(Ldy, Immediate, 2, 2, false);
    t[0xA4] = op(Ldy, ZeroPage,  2, 3, false);
    t[0xB4] = op(Ldy, ZeroPageX, 2, 4, false);
    t[0xAC] = op(Ldy, Absolute,  3, 4, false);
    t[0xBC] = op(Ldy, AbsoluteX, 3, 4, true);

    t[0x4A] = op(Lsr, Accumulator, 1, 2, false);
    t[0x46] = op(Lsr, ZeroPage,  2, 5, false);
    t[0x56] = op(Lsr, ZeroPageX, 2, 6, false);
    t[0x4E] = op(Lsr, Absolute,  3, 6, false);
    t[0x5E] = op(Lsr, AbsoluteX, 3, 7, false);

    t[0xEA] = op(Nop, Implied, 1, 2, false);

    t[0x09] = op(Ora, Immediate, 2, 2, false);
    t[0x05] = op(Ora, ZeroPage,  2, 3, false);
    t[0x15] = op(Ora, ZeroPageX, 2, 4, false);
    t[0x0D] = op(Ora, Absolute,  3, 4, false);
    t[0x1D] = op(Ora, AbsoluteX, 3, 4, true);
    t[0x19] = op(Ora, AbsoluteY, 3, 4, true);
    t[0x01] = op(Ora, IndirectX, 2, 6, false);
    t[0x11] = op(Ora, IndirectY, 2, 5, true);

    t[0x48] = op(Pha, Implied, 1, 3, false);
    t[0x08] = op(Php, Implied, 1, 3, false);
    t[0x68] = op(Pla, Implied, 1, 4, false);
    t[0x28] = op(Plp, Implied, 1, 4, false);

    t[0x2A] = op(Rol, Accumulator, 1, 2, false);
    t[0x26] = op(Rol, ZeroPage,  2, 5, false);
    t[0x36] = op(Rol, ZeroPageX, 2, 6, false);
    t[0x2E] = op(Rol, Absolute,  3, 6, false);
    t[0x3E] = op(Rol, AbsoluteX, 3, 7, false);

    t[0x6A] = op(Ror, Accumulator, 1, 2, false);
    t[0x66] = op(Ror, ZeroPage,  2, 5, false);
    t[0x76] = op(Ror, ZeroPageX, 2, 6, false);
    t[0x6E] = op(Ror, Absolute,  3, 6, false);
    t[0x7E] = op(Ror, AbsoluteX, 3, 7, false);

    t[0x40] = op(Rti, Implied, 1, 6, false);
    t[0x60] = op(Rts, Implied, 1, 6, false);

    t[0xE9] = op(Sbc, Immediate, 2, 2, false);
    t[0xE5] = op(Sbc, ZeroPage,  2, 3, false);
    t[0xF5] = op(Sbc, ZeroPageX, 2, 4, false);
    t[0xED] = op(Sbc, Absolute,  3, 4, false);
    t[0xFD] = op(Sbc, AbsoluteX, 3, 4, true);
    t[0xF9] = op(Sbc, AbsoluteY, 3, 4, true);
    t[0xE1] = op(Sbc, IndirectX, 2, 6, false);
    t[0xF1] = op(Sbc, IndirectY, 2, 5, true);

    t[0x38] = op(Sec, Implied, 1, 2, false);
    t[0xF8] = op(Sed, Implied, 1, 2, false);
    t[0x78] = op(Sei, Implied, 1, 2, false);

    t[0x85] = op(Sta, ZeroPage,  2, 3, false);
    t[0x95] = op(Sta, ZeroPageX, 2, 4, false);
    t[0x8D] = op(Sta, Absolute,  3, 4, false);
    t[0x9D] = op(Sta, AbsoluteX, 3, 5, false);
    t[0x99] = op(Sta, AbsoluteY, 3, 5, false);
    t[0x81] = op(Sta, IndirectX, 2, 6, false);
    t[0x91] = op(Sta, IndirectY, 2, 6, false);

    t[0x86] = op(Stx, ZeroPage,  2, 3, false);
    t[0x96] = op(Stx, ZeroPageY, 2, 4, false);
    t[0x8E] = op(Stx, Absolute,  3, 4, false);

    t[0x84] = op(Sty, ZeroPage,  2, 3, false);
    t[0x94] = op(Sty, ZeroPageX, 2, 4, false);
    t[0x8C] = op(Sty, Absolute,  3, 4, false);

    t[0xAA] = op(Tax, Implied, 1, 2, false);
    t[0xA8] = op(Tay, Implied, 1, 2, false);
    t[0xBA] = op(Tsx, Implied, 1, 2, false);
    t[0x8A] = op(Txa, Implied, 1, 2, false);
    t[0x9A] = op(Txs, Implied, 1, 2, false);
    t[0x98] = op(Tya, Implied, 1, 2, false);

    // Undocumented NOP variants
    t[0x1A] = ill(Nop, Implied, 1, 2, false);
    t[0x3A] = ill(Nop, Implied, 1, 2, false);
    t[0x5A] = ill(Nop, Implied, 1, 2, false);
    t[0x7A] = ill(Nop, Implied, 1, 2, false);
    t[0xDA] = ill(Nop, Implied, 1, 2, false);
    t[0xFA] = ill(Nop, Implied, 1, 2, false);

    t[0x80] = ill(Nop, Immediate, 2, 2, false);
    t[0x82] = ill(Nop, Immediate, 2, 2, false);
    t[0x89] = ill(Nop, Immediate, 2, 2, false);
    t[0xC2] = ill(Nop, Immediate, 2, 2, false);
    t[0xE2] = ill(Nop, Immediate, 2, 2, false);

    t[0x04] = ill(Nop, ZeroPage, 2, 3, false);
    t[0x44] = ill(Nop, ZeroPage, 2, 3, false);
    t[0x64] = ill(Nop, ZeroPage, 2, 3, false);

    t[0x14] = ill(Nop, ZeroPageX, 2, 4, false);
    t[0x34] = ill(Nop, ZeroPageX, 2, 4, false);
    t[0x54] = ill(Nop, ZeroPageX, 2, 4, false);
    t[0x74] = ill(Nop, ZeroPageX, 2, 4, false);
    t[0xD4] = ill(Nop, ZeroPageX, 2, 4, false);
    t[0xF4] = ill(Nop, ZeroPageX, 2, 4, false);

    t[0x0C] = ill(Nop, Absolute, 3, 4, false);

    t[0x1C] = ill(Nop, AbsoluteX, 3, 4, true);
    t[0x3C] = ill(Nop, AbsoluteX, 3, 4, true);
    t[0x5C] = ill(Nop, AbsoluteX, 3, 4, true);
    t[0x7C] = ill(Nop, AbsoluteX, 3, 4, true);
    t[0xDC] = ill(Nop, AbsoluteX, 3, 4, true);
    t[0xFC] = ill(Nop, AbsoluteX, 3, 4, true);

    // LAX = LDA + TAX
    t[0xA7] = ill(Lax, ZeroPage,  2, 3, false);
    t[0xB7] = ill(Lax, ZeroPageY, 2, 4, false);
    t[0xAF] = ill(Lax, Absolute,  3, 4, false);
    t[0xBF] = ill(Lax, AbsoluteY, 3, 4, true);
    t[0xA3] = ill(Lax, IndirectX, 2, 6, false);
    t[0xB3] = ill(Lax, IndirectY, 2, 5, true);

    // SAX: mem <- A & X
    t[0x87] = ill(Sax, ZeroPage,  2, 3, false);
    t[0x97] = ill(Sax, ZeroPageY, 2, 4, false);
    t[0x8F] = ill(Sax, Absolute,  3, 4, false);
    t[0x83] = ill(Sax, IndirectX, 2, 6, false);

    // Alias of the official SBC immediate
    t[0xEB] = ill(Sbc, Immediate, 2, 2, false);

    // DCP = DEC + CMP
    t[0xC7] = ill(Dcp, ZeroPage,  2, 5, false);
    t[0xD7] = ill(Dcp, ZeroPageX, 2, 6, false);
    t[0xCF] = ill(Dcp, Absolute,  3, 6, false);
    t[0xDF] = ill(Dcp, AbsoluteX, 3, 7, false);
    t[0xDB] = ill(Dcp, AbsoluteY, 3, 7, false);
    t[0xC3] = ill(Dcp, IndirectX, 2, 8, false);
    t[0xD3] = ill(Dcp, IndirectY, 2, 8, false);

    // ISB = INC + SBC
    t[0xE7] = ill(Isb, ZeroPage,  2, 5, false);
    t[0xF7] = ill(Isb, ZeroPageX, 2, 6, false);
    t[0xEF] = ill(Isb, Absolute,  3, 6, false);
    t[0xFF] = ill(Isb, AbsoluteX, 3, 7, false);
    t[0xFB] = ill(Isb, AbsoluteY, 3, 7, false);
    t[0xE3] = ill(Isb, IndirectX, 2, 8, false);
    t[0xF3] = ill(Isb, IndirectY, 2, 8, false);

    // SLO = ASL + ORA
    t[0x07] = ill(Slo, ZeroPage,  2, 5, false);
    t[0x17] = ill(Slo, ZeroPageX, 2, 6, false);
    t[0x0F] = ill(Slo, Absolute,  3, 6, false);
    t[0x1F] = ill(Slo, AbsoluteX, 3, 7, false);
    t[0x1B] = ill(Slo, AbsoluteY, 3, 7, false);
    t[0x03] = ill(Slo, IndirectX, 2, 8, false);
    t[0x13] = ill(Slo, IndirectY, 2, 8, false);

    // RLA = ROL + AND
    t[0x27] = ill(Rla, ZeroPage,  2, 5, false);
    t[0x37] = ill(Rla, ZeroPageX, 2, 6, false);
    t[0x2F] = ill(Rla, Absolute,  3, 6, false);
    t[0x3F] = ill(Rla, AbsoluteX, 3, 7, false);
    t[0x3B] = ill(Rla, AbsoluteY, 3, 7, false);
    t[0x23] = ill(Rla, IndirectX, 2, 8, false);
    t[0x33] = ill(Rla, IndirectY, 2, 8, false);

    // SRE = LSR + EOR
    t[0x47] = ill(Sre, ZeroPage,  2, 5, false);
    t[0x57] = ill(Sre, ZeroPageX, 2, 6, false);
    t[0x4F] = ill(Sre, Absolute,  3, 6, false);
    t[0x5F] = ill(Sre, AbsoluteX, 3, 7, false);
    t[0x5B] = ill(Sre, AbsoluteY, 3, 7, false);
    t[0x43] = ill(Sre, IndirectX, 2, 8, false);
    t[0x53] = ill(Sre, IndirectY, 2, 8, false);

    // RRA = ROR + ADC
    t[0x67] = ill(Rra, ZeroPage,  2, 5, false);
    t[0x77] = ill(Rra, ZeroPageX, 2, 6, false);
    t[0x6F] = ill(Rra, Absolute,  3, 6, false);
    t[0x7F] = ill(Rra, AbsoluteX, 3, 7, false);
    t[0x7B] = ill(Rra, AbsoluteY, 3, 7, false);
    t[0x63] = ill(Rra, IndirectX, 2, 8, false);
    t[0x73] = ill(Rra, IndirectY, 2, 8, false);

    t
}
