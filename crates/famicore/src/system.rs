//! NES system integration
//!
//! Ties a CPU to the bus and exposes the host-facing loop:
//! `step` until `take_frame_ready`, then render and present.

use crate::bus::Bus;
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::{BrkMode, Cpu};
use crate::error::EmuError;
use crate::joypad::Joypad;
use crate::ppu::Ppu;
use crate::render::{self, Frame};
use crate::trace;

/// Approximate NTSC CPU cycles per frame, used as a bound when a ROM keeps
/// NMI disabled
pub const CYCLES_PER_FRAME: u64 = 29781;

/// Environment variable that forces PC to $C000 after reset, for running
/// nestest-style ROMs in automation mode
pub const AUTOMATION_ENV: &str = "NES_AUTOMATION";

/// Program counter used by automation mode
pub const AUTOMATION_PC: u16 = 0xC000;

/// A complete NES: CPU plus the bus that owns every other device
#[derive(Debug, Clone)]
pub struct Nes {
    cpu: Cpu,
    bus: Bus,
}

impl Nes {
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(cartridge),
        }
    }

    /// Parse an iNES image and build the machine around it
    pub fn from_rom(raw: &[u8]) -> Result<Self, CartridgeError> {
        Ok(Self::new(Cartridge::from_bytes(raw)?))
    }

    /// Reset the CPU through the reset vector. Setting `NES_AUTOMATION` in
    /// the environment forces PC to $C000 instead.
    pub fn reset(&mut self) -> Result<(), EmuError> {
        self.cpu.reset(&mut self.bus)?;
        if std::env::var_os(AUTOMATION_ENV).is_some() {
            self.cpu.force_pc(AUTOMATION_PC);
        }
        Ok(())
    }

    /// Force PC to $C000 regardless of the environment
    pub fn enter_automation(&mut self) {
        self.cpu.force_pc(AUTOMATION_PC);
    }

    pub fn set_brk_mode(&mut self, mode: BrkMode) {
        self.cpu.set_brk_mode(mode);
    }

    /// Execute one instruction (servicing any pending NMI first).
    /// Returns `Ok(false)` when the CPU halted on BRK in halt mode.
    pub fn step(&mut self) -> Result<bool, EmuError> {
        self.cpu.step(&mut self.bus)
    }

    /// Run until the next frame boundary: either the vblank NMI edge or,
    /// with NMI disabled, one frame's worth of CPU cycles.
    pub fn run_frame(&mut self) -> Result<bool, EmuError> {
        let start = self.bus.cycles();
        loop {
            if !self.step()? {
                return Ok(false);
            }
            if self.bus.take_frame_ready() {
                return Ok(true);
            }
            if self.bus.cycles() - start >= CYCLES_PER_FRAME {
                return Ok(true);
            }
        }
    }

    /// Render the current PPU state into `frame`
    pub fn render_frame(&self, frame: &mut Frame) {
        render::render(self.bus.ppu(), frame);
    }

    /// nestest-style trace line for the instruction about to execute
    pub fn trace_line(&self) -> String {
        trace::trace(&self.cpu, &self.bus)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn ppu(&self) -> &Ppu {
        self.bus.ppu()
    }

    pub fn joypad1(&mut self) -> &mut Joypad {
        self.bus.joypad1()
    }

    pub fn joypad2(&mut self) -> &mut Joypad {
        self.bus.joypad2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{CHR_ROM_PAGE_SIZE, PRG_ROM_PAGE_SIZE};

    fn rom_with_program(program: &[u8]) -> Vec<u8> {
        let mut prg = vec![0xEA; PRG_ROM_PAGE_SIZE];
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
        rom
    }

    #[test]
    fn test_reset_reads_vector() {
        let mut nes = Nes::from_rom(&rom_with_program(&[0xEA])).unwrap();
        nes.reset().unwrap();
        assert_eq!(nes.cpu().registers().pc, 0x8000);
        assert_eq!(nes.bus().cycles(), 7);
    }

    #[test]
    fn test_step_executes_instructions() {
        let mut nes = Nes::from_rom(&rom_with_program(&[0xA9, 0x11, 0xAA])).unwrap();
        nes.reset().unwrap();
        nes.step().unwrap();
        nes.step().unwrap();
        assert_eq!(nes.cpu().registers().a, 0x11);
        assert_eq!(nes.cpu().registers().x, 0x11);
    }

    #[test]
    fn test_run_frame_bounded_without_nmi() {
        let mut nes = Nes::from_rom(&rom_with_program(&[0x4C, 0x00, 0x80])).unwrap();
        nes.reset().unwrap();
        let start = nes.bus().cycles();
        assert!(nes.run_frame().unwrap());
        assert!(nes.bus().cycles() - start >= CYCLES_PER_FRAME);
    }

    #[test]
    fn test_automation_forces_pc() {
        let mut nes = Nes::from_rom(&rom_with_program(&[0xEA])).unwrap();
        nes.reset().unwrap();
        nes.enter_automation();
        assert_eq!(nes.cpu().registers().pc, AUTOMATION_PC);
    }
}
