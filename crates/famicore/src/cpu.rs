//! CPU module - 2A03 (6502 variant) interpreter
//!
//! The NES CPU is a 6502 without decimal mode. This implementation executes
//! one instruction per `step`, table-driven off the raw opcode byte, and
//! reports its cycle cost to the bus which advances the PPU at 3x.
//!
//! Interrupt contract: a pending NMI is consumed before the next opcode
//! fetch, never in the middle of an instruction. IRQ is not wired (NROM
//! titles do not use it).

use std::fmt;

use crate::error::EmuError;
use crate::opcodes::{self, AddressingMode, Mnemonic};

/// NMI vector location
pub const NMI_VECTOR: u16 = 0xFFFA;

/// Reset vector location
pub const RESET_VECTOR: u16 = 0xFFFC;

/// BRK/IRQ vector location
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Power-on status register value (I and U set)
pub const STATUS_AT_RESET: u8 = 0x24;

/// Power-on stack pointer
pub const SP_AT_RESET: u8 = 0xFD;

/// Memory interface the CPU executes against.
///
/// The concrete [`crate::bus::Bus`] implements this; tests substitute flat
/// RAM. `tick` is how the CPU reports instruction cost back to the rest of
/// the machine, and `poll_nmi` is a consuming read of the pending-NMI edge.
pub trait Bus {
    fn read(&mut self, address: u16) -> Result<u8, EmuError>;
    fn write(&mut self, address: u16, value: u8) -> Result<(), EmuError>;
    fn tick(&mut self, cycles: u8);
    fn poll_nmi(&mut self) -> bool;

    /// Little-endian 16-bit read
    fn read_u16(&mut self, address: u16) -> Result<u16, EmuError> {
        let lo = self.read(address)? as u16;
        let hi = self.read(address.wrapping_add(1))? as u16;
        Ok(hi << 8 | lo)
    }
}

/// 2A03 CPU registers
#[derive(Debug, Clone, Copy)]
pub struct CpuRegisters {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
}

impl Default for CpuRegisters {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: SP_AT_RESET,
            pc: 0, // set from the reset vector
        }
    }
}

/// CPU status flags (bit positions C,Z,I,D,B,U,V,N = 0..7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub const CARRY: u8 = 0b0000_0001;
    pub const ZERO: u8 = 0b0000_0010;
    pub const INTERRUPT: u8 = 0b0000_0100;
    pub const DECIMAL: u8 = 0b0000_1000;
    pub const BREAK: u8 = 0b0001_0000;
    pub const UNUSED: u8 = 0b0010_0000;
    pub const OVERFLOW: u8 = 0b0100_0000;
    pub const NEGATIVE: u8 = 0b1000_0000;

    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn carry(&self) -> bool {
        self.0 & Self::CARRY != 0
    }

    pub fn zero(&self) -> bool {
        self.0 & Self::ZERO != 0
    }

    pub fn interrupt(&self) -> bool {
        self.0 & Self::INTERRUPT != 0
    }

    pub fn decimal(&self) -> bool {
        self.0 & Self::DECIMAL != 0
    }

    pub fn overflow(&self) -> bool {
        self.0 & Self::OVERFLOW != 0
    }

    pub fn negative(&self) -> bool {
        self.0 & Self::NEGATIVE != 0
    }

    pub fn set_carry(&mut self, on: bool) {
        self.set(Self::CARRY, on);
    }

    pub fn set_zero(&mut self, on: bool) {
        self.set(Self::ZERO, on);
    }

    pub fn set_interrupt(&mut self, on: bool) {
        self.set(Self::INTERRUPT, on);
    }

    pub fn set_decimal(&mut self, on: bool) {
        self.set(Self::DECIMAL, on);
    }

    pub fn set_overflow(&mut self, on: bool) {
        self.set(Self::OVERFLOW, on);
    }

    pub fn set_negative(&mut self, on: bool) {
        self.set(Self::NEGATIVE, on);
    }

    fn set(&mut self, mask: u8, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "C:{} Z:{} I:{} D:{} V:{} N:{}",
            self.carry() as u8,
            self.zero() as u8,
            self.interrupt() as u8,
            self.decimal() as u8,
            self.overflow() as u8,
            self.negative() as u8
        )
    }
}

/// What BRK does when executed.
///
/// `Interrupt` follows hardware: push PC+2 and status, set I, jump through
/// the $FFFE vector. `Halt` makes `step` report the CPU stopped, which is
/// what test programs that end in $00 expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrkMode {
    #[default]
    Interrupt,
    Halt,
}

/// CPU state
#[derive(Debug, Clone)]
pub struct Cpu {
    registers: CpuRegisters,
    status: StatusFlags,
    brk_mode: BrkMode,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            registers: CpuRegisters::default(),
            status: StatusFlags::new(STATUS_AT_RESET),
            brk_mode: BrkMode::default(),
        }
    }

    /// Reset to power-on state and load PC from the reset vector.
    ///
    /// Charges the canonical 7 startup cycles to the bus so traced cycle
    /// counts line up with reference logs.
    pub fn reset(&mut self, bus: &mut impl Bus) -> Result<(), EmuError> {
        self.registers = CpuRegisters::default();
        self.status = StatusFlags::new(STATUS_AT_RESET);
        self.registers.pc = bus.read_u16(RESET_VECTOR)?;
        bus.tick(7);
        Ok(())
    }

    /// Override PC, used by the nestest automation mode
    pub fn force_pc(&mut self, pc: u16) {
        self.registers.pc = pc;
    }

    pub fn set_brk_mode(&mut self, mode: BrkMode) {
        self.brk_mode = mode;
    }

    pub fn registers(&self) -> &CpuRegisters {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut CpuRegisters {
        &mut self.registers
    }

    pub fn status(&self) -> &StatusFlags {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusFlags {
        &mut self.status
    }

    /// Execute one instruction, servicing a pending NMI first.
    ///
    /// Returns `Ok(false)` only when BRK is reached in [`BrkMode::Halt`].
    pub fn step(&mut self, bus: &mut impl Bus) -> Result<bool, EmuError> {
        if bus.poll_nmi() {
            self.service_nmi(bus)?;
        }

        let opcode_pc = self.registers.pc;
        let code = bus.read(opcode_pc)?;
        self.registers.pc = opcode_pc.wrapping_add(1);

        let op = opcodes::lookup(code).ok_or(EmuError::UnknownOpcode {
            opcode: code,
            pc: opcode_pc,
        })?;

        let (address, page_crossed) = self.operand_address(bus, op.mode)?;
        let pc_before = self.registers.pc;
        let mut extra_cycles: u8 = if page_crossed && op.page_cycle { 1 } else { 0 };

        match op.mnemonic {
            Mnemonic::Lda => {
                self.registers.a = bus.read(address)?;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Ldx => {
                self.registers.x = bus.read(address)?;
                self.set_flags_zn(self.registers.x);
            }
            Mnemonic::Ldy => {
                self.registers.y = bus.read(address)?;
                self.set_flags_zn(self.registers.y);
            }
            Mnemonic::Sta => bus.write(address, self.registers.a)?,
            Mnemonic::Stx => bus.write(address, self.registers.x)?,
            Mnemonic::Sty => bus.write(address, self.registers.y)?,

            Mnemonic::Tax => {
                self.registers.x = self.registers.a;
                self.set_flags_zn(self.registers.x);
            }
            Mnemonic::Tay => {
                self.registers.y = self.registers.a;
                self.set_flags_zn(self.registers.y);
            }
            Mnemonic::Tsx => {
                self.registers.x = self.registers.sp;
                self.set_flags_zn(self.registers.x);
            }
            Mnemonic::Txa => {
                self.registers.a = self.registers.x;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Txs => self.registers.sp = self.registers.x,
            Mnemonic::Tya => {
                self.registers.a = self.registers.y;
                self.set_flags_zn(self.registers.a);
            }

            Mnemonic::Adc => {
                let value = bus.read(address)?;
                self.adc(value);
            }
            Mnemonic::Sbc => {
                let value = bus.read(address)?;
                self.adc(value ^ 0xFF);
            }

            Mnemonic::And => {
                self.registers.a &= bus.read(address)?;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Ora => {
                self.registers.a |= bus.read(address)?;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Eor => {
                self.registers.a ^= bus.read(address)?;
                self.set_flags_zn(self.registers.a);
            }

            Mnemonic::Asl => {
                if op.mode == AddressingMode::Accumulator {
                    let v = self.registers.a;
                    self.status.set_carry(v & 0x80 != 0);
                    self.registers.a = v << 1;
                    self.set_flags_zn(self.registers.a);
                } else {
                    self.asl_mem(bus, address)?;
                }
            }
            Mnemonic::Lsr => {
                if op.mode == AddressingMode::Accumulator {
                    let v = self.registers.a;
                    self.status.set_carry(v & 0x01 != 0);
                    self.registers.a = v >> 1;
                    self.set_flags_zn(self.registers.a);
                } else {
                    self.lsr_mem(bus, address)?;
                }
            }
            Mnemonic::Rol => {
                if op.mode == AddressingMode::Accumulator {
                    let v = self.registers.a;
                    let carry_in = self.status.carry() as u8;
                    self.status.set_carry(v & 0x80 != 0);
                    self.registers.a = v << 1 | carry_in;
                    self.set_flags_zn(self.registers.a);
                } else {
                    self.rol_mem(bus, address)?;
                }
            }
            Mnemonic::Ror => {
                if op.mode == AddressingMode::Accumulator {
                    let v = self.registers.a;
                    let carry_in = self.status.carry() as u8;
                    self.status.set_carry(v & 0x01 != 0);
                    self.registers.a = v >> 1 | carry_in << 7;
                    self.set_flags_zn(self.registers.a);
                } else {
                    self.ror_mem(bus, address)?;
                }
            }

            Mnemonic::Bit => {
                let value = bus.read(address)?;
                self.status.set_zero(value & self.registers.a == 0);
                self.status.set_negative(value & 0x80 != 0);
                self.status.set_overflow(value & 0x40 != 0);
            }

            Mnemonic::Bcc => extra_cycles += self.branch(!self.status.carry(), address),
            Mnemonic::Bcs => extra_cycles += self.branch(self.status.carry(), address),
            Mnemonic::Bne => extra_cycles += self.branch(!self.status.zero(), address),
            Mnemonic::Beq => extra_cycles += self.branch(self.status.zero(), address),
            Mnemonic::Bpl => extra_cycles += self.branch(!self.status.negative(), address),
            Mnemonic::Bmi => extra_cycles += self.branch(self.status.negative(), address),
            Mnemonic::Bvc => extra_cycles += self.branch(!self.status.overflow(), address),
            Mnemonic::Bvs => extra_cycles += self.branch(self.status.overflow(), address),

            Mnemonic::Cmp => {
                let value = bus.read(address)?;
                self.compare(self.registers.a, value);
            }
            Mnemonic::Cpx => {
                let value = bus.read(address)?;
                self.compare(self.registers.x, value);
            }
            Mnemonic::Cpy => {
                let value = bus.read(address)?;
                self.compare(self.registers.y, value);
            }

            Mnemonic::Inc => {
                let value = bus.read(address)?.wrapping_add(1);
                bus.write(address, value)?;
                self.set_flags_zn(value);
            }
            Mnemonic::Dec => {
                let value = bus.read(address)?.wrapping_sub(1);
                bus.write(address, value)?;
                self.set_flags_zn(value);
            }
            Mnemonic::Inx => {
                self.registers.x = self.registers.x.wrapping_add(1);
                self.set_flags_zn(self.registers.x);
            }
            Mnemonic::Iny => {
                self.registers.y = self.registers.y.wrapping_add(1);
                self.set_flags_zn(self.registers.y);
            }
            Mnemonic::Dex => {
                self.registers.x = self.registers.x.wrapping_sub(1);
                self.set_flags_zn(self.registers.x);
            }
            Mnemonic::Dey => {
                self.registers.y = self.registers.y.wrapping_sub(1);
                self.set_flags_zn(self.registers.y);
            }

            Mnemonic::Clc => self.status.set_carry(false),
            Mnemonic::Sec => self.status.set_carry(true),
            Mnemonic::Cld => self.status.set_decimal(false),
            Mnemonic::Sed => self.status.set_decimal(true),
            Mnemonic::Cli => self.status.set_interrupt(false),
            Mnemonic::Sei => self.status.set_interrupt(true),
            Mnemonic::Clv => self.status.set_overflow(false),

            Mnemonic::Jmp => self.registers.pc = address,
            Mnemonic::Jsr => {
                // Return address is the last byte of this instruction
                self.push_u16(bus, self.registers.pc.wrapping_add(1))?;
                self.registers.pc = address;
            }
            Mnemonic::Rts => {
                self.registers.pc = self.pop_u16(bus)?.wrapping_add(1);
            }
            Mnemonic::Rti => {
                let p = self.pop(bus)?;
                self.status = StatusFlags::new(p & !StatusFlags::BREAK | StatusFlags::UNUSED);
                self.registers.pc = self.pop_u16(bus)?;
            }

            Mnemonic::Pha => self.push(bus, self.registers.a)?,
            Mnemonic::Php => {
                self.push(bus, self.status.bits() | StatusFlags::BREAK | StatusFlags::UNUSED)?
            }
            Mnemonic::Pla => {
                self.registers.a = self.pop(bus)?;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Plp => {
                let p = self.pop(bus)?;
                self.status = StatusFlags::new(p & !StatusFlags::BREAK | StatusFlags::UNUSED);
            }

            Mnemonic::Brk => {
                if self.brk_mode == BrkMode::Halt {
                    bus.tick(op.cycles);
                    return Ok(false);
                }
                self.push_u16(bus, self.registers.pc.wrapping_add(1))?;
                self.push(bus, self.status.bits() | StatusFlags::BREAK | StatusFlags::UNUSED)?;
                self.status.set_interrupt(true);
                self.registers.pc = bus.read_u16(IRQ_VECTOR)?;
            }

            Mnemonic::Nop => {}

            Mnemonic::Lax => {
                let value = bus.read(address)?;
                self.registers.a = value;
                self.registers.x = value;
                self.set_flags_zn(value);
            }
            Mnemonic::Sax => bus.write(address, self.registers.a & self.registers.x)?,
            Mnemonic::Dcp => {
                let value = bus.read(address)?.wrapping_sub(1);
                bus.write(address, value)?;
                self.compare(self.registers.a, value);
            }
            Mnemonic::Isb => {
                let value = bus.read(address)?.wrapping_add(1);
                bus.write(address, value)?;
                self.adc(value ^ 0xFF);
            }
            Mnemonic::Slo => {
                let value = self.asl_mem(bus, address)?;
                self.registers.a |= value;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Rla => {
                let value = self.rol_mem(bus, address)?;
                self.registers.a &= value;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Sre => {
                let value = self.lsr_mem(bus, address)?;
                self.registers.a ^= value;
                self.set_flags_zn(self.registers.a);
            }
            Mnemonic::Rra => {
                let value = self.ror_mem(bus, address)?;
                self.adc(value);
            }
        }

        // Instructions that did not touch PC advance past their operands
        if self.registers.pc == pc_before {
            self.registers.pc = pc_before.wrapping_add(op.len as u16 - 1);
        }

        bus.tick(op.cycles + extra_cycles);
        Ok(true)
    }

    /// Resolve the operand address for `mode`, with PC at the first operand
    /// byte. The bool reports a page crossing for the conditional-cycle
    /// modes.
    fn operand_address(
        &mut self,
        bus: &mut impl Bus,
        mode: AddressingMode,
    ) -> Result<(u16, bool), EmuError> {
        let pc = self.registers.pc;
        match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => Ok((0, false)),
            AddressingMode::Immediate => Ok((pc, false)),
            AddressingMode::ZeroPage => Ok((bus.read(pc)? as u16, false)),
            AddressingMode::ZeroPageX => {
                Ok((bus.read(pc)?.wrapping_add(self.registers.x) as u16, false))
            }
            AddressingMode::ZeroPageY => {
                Ok((bus.read(pc)?.wrapping_add(self.registers.y) as u16, false))
            }
            AddressingMode::Absolute => Ok((bus.read_u16(pc)?, false)),
            AddressingMode::AbsoluteX => {
                let base = bus.read_u16(pc)?;
                let addr = base.wrapping_add(self.registers.x as u16);
                Ok((addr, page_crossed(base, addr)))
            }
            AddressingMode::AbsoluteY => {
                let base = bus.read_u16(pc)?;
                let addr = base.wrapping_add(self.registers.y as u16);
                Ok((addr, page_crossed(base, addr)))
            }
            AddressingMode::Indirect => {
                // 6502 bug: a vector at $xxFF wraps within its page when
                // fetching the high byte
                let vector = bus.read_u16(pc)?;
                let addr = if vector & 0x00FF == 0x00FF {
                    let lo = bus.read(vector)? as u16;
                    let hi = bus.read(vector & 0xFF00)? as u16;
                    hi << 8 | lo
                } else {
                    bus.read_u16(vector)?
                };
                Ok((addr, false))
            }
            AddressingMode::IndirectX => {
                let ptr = bus.read(pc)?.wrapping_add(self.registers.x);
                let lo = bus.read(ptr as u16)? as u16;
                let hi = bus.read(ptr.wrapping_add(1) as u16)? as u16;
                Ok((hi << 8 | lo, false))
            }
            AddressingMode::IndirectY => {
                let base = bus.read(pc)?;
                let lo = bus.read(base as u16)? as u16;
                let hi = bus.read(base.wrapping_add(1) as u16)? as u16;
                let deref = hi << 8 | lo;
                let addr = deref.wrapping_add(self.registers.y as u16);
                Ok((addr, page_crossed(deref, addr)))
            }
            AddressingMode::Relative => Ok((bus.read(pc)? as i8 as i16 as u16, false)),
        }
    }

    /// Conditionally take a relative branch; returns the extra cycles
    /// (1 taken, 2 taken across a page)
    fn branch(&mut self, condition: bool, offset: u16) -> u8 {
        if !condition {
            return 0;
        }
        let base = self.registers.pc.wrapping_add(1);
        let target = base.wrapping_add(offset);
        self.registers.pc = target;
        if page_crossed(base, target) {
            2
        } else {
            1
        }
    }

    fn service_nmi(&mut self, bus: &mut impl Bus) -> Result<(), EmuError> {
        self.push_u16(bus, self.registers.pc)?;
        self.push(bus, self.status.bits() & !StatusFlags::BREAK | StatusFlags::UNUSED)?;
        self.status.set_interrupt(true);
        bus.tick(2);
        self.registers.pc = bus.read_u16(NMI_VECTOR)?;
        Ok(())
    }

    fn adc(&mut self, value: u8) {
        let sum = self.registers.a as u16 + value as u16 + self.status.carry() as u16;
        let result = sum as u8;
        self.status.set_carry(sum > 0xFF);
        self.status
            .set_overflow((self.registers.a ^ result) & (value ^ result) & 0x80 != 0);
        self.registers.a = result;
        self.set_flags_zn(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.set_carry(register >= value);
        self.set_flags_zn(register.wrapping_sub(value));
    }

    fn asl_mem(&mut self, bus: &mut impl Bus, address: u16) -> Result<u8, EmuError> {
        let value = bus.read(address)?;
        self.status.set_carry(value & 0x80 != 0);
        let result = value << 1;
        bus.write(address, result)?;
        self.set_flags_zn(result);
        Ok(result)
    }

    fn lsr_mem(&mut self, bus: &mut impl Bus, address: u16) -> Result<u8, EmuError> {
        let value = bus.read(address)?;
        self.status.set_carry(value & 0x01 != 0);
        let result = value >> 1;
        bus.write(address, result)?;
        self.set_flags_zn(result);
        Ok(result)
    }

    fn rol_mem(&mut self, bus: &mut impl Bus, address: u16) -> Result<u8, EmuError> {
        let value = bus.read(address)?;
        let carry_in = self.status.carry() as u8;
        self.status.set_carry(value & 0x80 != 0);
        let result = value << 1 | carry_in;
        bus.write(address, result)?;
        self.set_flags_zn(result);
        Ok(result)
    }

    fn ror_mem(&mut self, bus: &mut impl Bus, address: u16) -> Result<u8, EmuError> {
        let value = bus.read(address)?;
        let carry_in = self.status.carry() as u8;
        self.status.set_carry(value & 0x01 != 0);
        let result = value >> 1 | carry_in << 7;
        bus.write(address, result)?;
        self.set_flags_zn(result);
        Ok(result)
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) -> Result<(), EmuError> {
        bus.write(0x0100 | self.registers.sp as u16, value)?;
        self.registers.sp = self.registers.sp.wrapping_sub(1);
        Ok(())
    }

    fn pop(&mut self, bus: &mut impl Bus) -> Result<u8, EmuError> {
        self.registers.sp = self.registers.sp.wrapping_add(1);
        bus.read(0x0100 | self.registers.sp as u16)
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) -> Result<(), EmuError> {
        self.push(bus, (value >> 8) as u8)?;
        self.push(bus, value as u8)
    }

    fn pop_u16(&mut self, bus: &mut impl Bus) -> Result<u16, EmuError> {
        let lo = self.pop(bus)? as u16;
        let hi = self.pop(bus)? as u16;
        Ok(hi << 8 | lo)
    }

    fn set_flags_zn(&mut self, value: u8) {
        self.status.set_zero(value == 0);
        self.status.set_negative(value & 0x80 != 0);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

fn page_crossed(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}
