//! Famicore CLI - headless command-line runner
//!
//! Loads an iNES ROM and runs it without a window: a fixed number of frames,
//! or an instruction-traced automation run for nestest-style ROMs.

use clap::Parser;
use famicore::cartridge::Cartridge;
use famicore::system::Nes;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Famicore NES emulator, headless runner
#[derive(Parser, Debug)]
#[command(name = "famicore-cli")]
#[command(about = "Run an iNES ROM without a window", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value = "60")]
    frames: u64,

    /// Print a nestest-style trace line per instruction
    #[arg(short, long)]
    trace: bool,

    /// Force PC to $C000 after reset (nestest automation mode)
    #[arg(short, long)]
    automation: bool,

    /// Number of instructions to run in trace mode
    #[arg(short, long, default_value = "8991")]
    instructions: u64,

    /// Dump CPU state after execution
    #[arg(short = 'c', long)]
    dump_cpu: bool,

    /// Dump PPU state after execution
    #[arg(short = 'p', long)]
    dump_ppu: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let rom_data = match fs::read(&args.rom) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("failed to read {}: {}", args.rom.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let cartridge = match Cartridge::from_bytes(&rom_data) {
        Ok(cart) => cart,
        Err(e) => {
            eprintln!("failed to load cartridge: {}", e);
            return ExitCode::FAILURE;
        }
    };

    eprintln!("loaded cartridge:");
    eprintln!("  PRG ROM: {} bytes", cartridge.prg_rom().len());
    eprintln!("  CHR ROM: {} bytes", cartridge.chr_rom().len());
    eprintln!("  mapper:  {}", cartridge.mapper());
    eprintln!("  mirror:  {:?}", cartridge.mirroring());

    let mut nes = Nes::new(cartridge);
    if let Err(e) = nes.reset() {
        eprintln!("reset failed: {}", e);
        return ExitCode::FAILURE;
    }
    if args.automation {
        nes.enter_automation();
    }

    let result = if args.trace {
        run_traced(&mut nes, args.instructions)
    } else {
        run_frames(&mut nes, args.frames)
    };

    if let Err(e) = result {
        eprintln!("runtime error: {}", e);
        dump_cpu_state(&nes);
        return ExitCode::FAILURE;
    }

    if args.dump_cpu {
        dump_cpu_state(&nes);
    }
    if args.dump_ppu {
        dump_ppu_state(&nes);
    }

    ExitCode::SUCCESS
}

fn run_frames(nes: &mut Nes, frames: u64) -> Result<(), famicore::error::EmuError> {
    for _ in 0..frames {
        if !nes.run_frame()? {
            break;
        }
    }
    Ok(())
}

fn run_traced(nes: &mut Nes, instructions: u64) -> Result<(), famicore::error::EmuError> {
    for _ in 0..instructions {
        println!("{}", nes.trace_line());
        if !nes.step()? {
            break;
        }
    }
    Ok(())
}

fn dump_cpu_state(nes: &Nes) {
    let regs = nes.cpu().registers();
    eprintln!("CPU state:");
    eprintln!("  A:  ${:02X}", regs.a);
    eprintln!("  X:  ${:02X}", regs.x);
    eprintln!("  Y:  ${:02X}", regs.y);
    eprintln!("  SP: ${:02X}", regs.sp);
    eprintln!("  PC: ${:04X}", regs.pc);
    eprintln!(
        "  P:  ${:02X} ({})",
        nes.cpu().status().bits(),
        nes.cpu().status()
    );
    eprintln!("  cycles: {}", nes.bus().cycles());
}

fn dump_ppu_state(nes: &Nes) {
    let ppu = nes.ppu();
    eprintln!("PPU state:");
    eprintln!("  scanline: {}", ppu.scanline());
    eprintln!("  dot:      {}", ppu.dot());
    eprintln!("  vblank:   {}", ppu.status().vblank());
}
