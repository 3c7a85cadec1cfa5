//! Famicore - cycle-synchronized NES emulator core
//!
//! Emulates the NES/Famicom NROM configuration: a 2A03 (6502) CPU, the 2C02
//! PPU running at 3 dots per CPU cycle, the memory bus wiring them to the
//! cartridge and joypads, and a frame-at-a-time renderer. The host drives a
//! single stepping loop and presents 256x240 RGBA frames at each vblank.
//!
//! This crate is the pure emulation core; it has no windowing or I/O
//! dependencies.

#![forbid(unsafe_code)]

/// CPU module containing the 2A03 (6502 variant) implementation
pub mod cpu;
/// 256-entry opcode decode table
pub mod opcodes;
/// Memory bus and mapping
pub mod bus;
/// PPU (Picture Processing Unit) implementation
pub mod ppu;
/// APU (Audio Processing Unit) register stub
pub mod apu;
/// Cartridge (iNES) loading
pub mod cartridge;
/// Joypad shift registers
pub mod joypad;
/// Fixed 2C02 system palette
pub mod palette;
/// Frame renderer (PPU state -> RGBA)
pub mod render;
/// nestest-style execution tracing
pub mod trace;
/// Runtime fatal errors
pub mod error;
/// Integration module for the complete NES system
pub mod system;
