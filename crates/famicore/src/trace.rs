//! Execution trace
//!
//! Formats the instruction at the current PC as one nestest-style log line:
//! PC, raw bytes, disassembly with resolved effective address and stored
//! value, registers, PPU position and cumulative CPU cycles. Undocumented
//! opcodes carry a `*` prefix.
//!
//! All memory inspection goes through `Bus::peek`, so tracing never disturbs
//! PPU or joypad latches.

use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcodes::{self, AddressingMode};

/// Produce the trace line for the instruction the CPU is about to execute
pub fn trace(cpu: &Cpu, bus: &Bus) -> String {
    let regs = cpu.registers();
    let begin = regs.pc;
    let code = bus.peek(begin);

    let registers = format!(
        "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} PPU:{:3},{:3} CYC:{}",
        regs.a,
        regs.x,
        regs.y,
        cpu.status().bits(),
        regs.sp,
        bus.ppu().scanline(),
        bus.ppu().dot(),
        bus.cycles()
    );

    let Some(op) = opcodes::lookup(code) else {
        let asm = format!("{:04X}  {:02X}       ???", begin, code);
        return format!("{:<47} {}", asm, registers);
    };

    let mut dump = vec![code];
    for i in 1..op.len as u16 {
        dump.push(bus.peek(begin.wrapping_add(i)));
    }

    let (memory_addr, stored) = match op.mode {
        AddressingMode::Immediate
        | AddressingMode::Implied
        | AddressingMode::Accumulator
        | AddressingMode::Relative
        | AddressingMode::Indirect => (0, 0),
        mode => {
            let addr = absolute_address(cpu, bus, mode, begin.wrapping_add(1));
            (addr, bus.peek(addr))
        }
    };

    let operand = match op.len {
        1 => match code {
            0x0A | 0x2A | 0x4A | 0x6A => "A".to_string(),
            _ => String::new(),
        },
        2 => {
            let address = dump[1];
            match op.mode {
                AddressingMode::Immediate => format!("#${:02X}", address),
                AddressingMode::ZeroPage => format!("${:02X} = {:02X}", memory_addr, stored),
                AddressingMode::ZeroPageX => {
                    format!("${:02X},X @ {:02X} = {:02X}", address, memory_addr, stored)
                }
                AddressingMode::ZeroPageY => {
                    format!("${:02X},Y @ {:02X} = {:02X}", address, memory_addr, stored)
                }
                AddressingMode::IndirectX => format!(
                    "(${:02X},X) @ {:02X} = {:04X} = {:02X}",
                    address,
                    address.wrapping_add(regs.x),
                    memory_addr,
                    stored
                ),
                AddressingMode::IndirectY => format!(
                    "(${:02X}),Y = {:04X} @ {:04X} = {:02X}",
                    address,
                    memory_addr.wrapping_sub(regs.y as u16),
                    memory_addr,
                    stored
                ),
                AddressingMode::Relative => {
                    let target = begin
                        .wrapping_add(2)
                        .wrapping_add(address as i8 as i16 as u16);
                    format!("${:04X}", target)
                }
                _ => format!("${:02X}", address),
            }
        }
        _ => {
            let address = bus.peek_u16(begin.wrapping_add(1));
            match op.mode {
                AddressingMode::Indirect => {
                    // Resolve through the 6502 page-wrap quirk like the CPU
                    let target = if address & 0x00FF == 0x00FF {
                        let lo = bus.peek(address) as u16;
                        let hi = bus.peek(address & 0xFF00) as u16;
                        hi << 8 | lo
                    } else {
                        bus.peek_u16(address)
                    };
                    format!("(${:04X}) = {:04X}", address, target)
                }
                AddressingMode::Absolute => {
                    // JMP/JSR print the target bare
                    if code == 0x4C || code == 0x20 {
                        format!("${:04X}", address)
                    } else {
                        format!("${:04X} = {:02X}", address, stored)
                    }
                }
                AddressingMode::AbsoluteX => {
                    format!("${:04X},X @ {:04X} = {:02X}", address, memory_addr, stored)
                }
                AddressingMode::AbsoluteY => {
                    format!("${:04X},Y @ {:04X} = {:02X}", address, memory_addr, stored)
                }
                _ => format!("${:04X}", address),
            }
        }
    };

    let hex: Vec<String> = dump.iter().map(|b| format!("{:02X}", b)).collect();
    let mnemonic = if op.unofficial {
        format!("*{}", op.mnemonic.name())
    } else {
        op.mnemonic.name().to_string()
    };
    let asm = format!(
        "{:04X}  {:<8} {:>4} {}",
        begin,
        hex.join(" "),
        mnemonic,
        operand
    );

    format!("{:<47} {}", asm.trim_end(), registers)
}

/// Effective address resolution mirroring the CPU, but via side-effect-free
/// peeks
fn absolute_address(cpu: &Cpu, bus: &Bus, mode: AddressingMode, at: u16) -> u16 {
    let regs = cpu.registers();
    match mode {
        AddressingMode::ZeroPage => bus.peek(at) as u16,
        AddressingMode::ZeroPageX => bus.peek(at).wrapping_add(regs.x) as u16,
        AddressingMode::ZeroPageY => bus.peek(at).wrapping_add(regs.y) as u16,
        AddressingMode::Absolute => bus.peek_u16(at),
        AddressingMode::AbsoluteX => bus.peek_u16(at).wrapping_add(regs.x as u16),
        AddressingMode::AbsoluteY => bus.peek_u16(at).wrapping_add(regs.y as u16),
        AddressingMode::IndirectX => {
            let ptr = bus.peek(at).wrapping_add(regs.x);
            let lo = bus.peek(ptr as u16) as u16;
            let hi = bus.peek(ptr.wrapping_add(1) as u16) as u16;
            hi << 8 | lo
        }
        AddressingMode::IndirectY => {
            let base = bus.peek(at);
            let lo = bus.peek(base as u16) as u16;
            let hi = bus.peek(base.wrapping_add(1) as u16) as u16;
            (hi << 8 | lo).wrapping_add(regs.y as u16)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{Cartridge, CHR_ROM_PAGE_SIZE, PRG_ROM_PAGE_SIZE};
    use crate::cpu::Bus as _;

    fn bus_with_program(program: &[u8]) -> Bus {
        let mut prg = vec![0u8; PRG_ROM_PAGE_SIZE];
        prg[..program.len()].copy_from_slice(program);
        prg[0x3FFC] = 0x00;
        prg[0x3FFD] = 0x80;

        let mut rom = Vec::new();
        rom.extend_from_slice(b"NES\x1A");
        rom.push(1);
        rom.push(1);
        rom.extend_from_slice(&[0u8; 10]);
        rom.extend_from_slice(&prg);
        rom.extend_from_slice(&[0u8; CHR_ROM_PAGE_SIZE]);
        Bus::new(Cartridge::from_bytes(&rom).unwrap())
    }

    #[test]
    fn test_trace_format_jmp() {
        let bus = bus_with_program(&[0x4C, 0xF5, 0xC5]);
        let mut cpu = Cpu::new();
        cpu.force_pc(0x8000);
        let line = trace(&cpu, &bus);
        assert!(line.starts_with("8000  4C F5 C5  JMP $C5F5"), "got: {}", line);
        assert!(line.contains("A:00 X:00 Y:00 P:24 SP:FD"), "got: {}", line);
    }

    #[test]
    fn test_trace_resolves_zero_page_value() {
        let mut bus = bus_with_program(&[0xA5, 0x10]);
        bus.write(0x0010, 0x42).unwrap();
        let mut cpu = Cpu::new();
        cpu.force_pc(0x8000);
        let line = trace(&cpu, &bus);
        assert!(line.contains("LDA $10 = 42"), "got: {}", line);
    }

    #[test]
    fn test_trace_marks_unofficial_opcodes() {
        let bus = bus_with_program(&[0xA7, 0x10]);
        let mut cpu = Cpu::new();
        cpu.force_pc(0x8000);
        let line = trace(&cpu, &bus);
        assert!(line.contains("*LAX"), "got: {}", line);
    }

    #[test]
    fn test_trace_registers_column_position() {
        let bus = bus_with_program(&[0xEA]);
        let mut cpu = Cpu::new();
        cpu.force_pc(0x8000);
        let line = trace(&cpu, &bus);
        assert_eq!(line.find("A:"), Some(48), "got: {}", line);
    }
}
