//! Famicore desktop - minifb frontend
//!
//! Hosts the emulator stepping loop and presents each frame at the vblank
//! edge. Keyboard map: A=A, S=B, Space=Select, Enter=Start, arrow keys for
//! the d-pad, Escape quits.

use clap::Parser;
use famicore::cartridge::Cartridge;
use famicore::joypad::Joypad;
use famicore::render::{Frame, HEIGHT, WIDTH};
use famicore::system::Nes;
use minifb::{Key, Window, WindowOptions};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

const KEY_MAP: [(Key, u8); 8] = [
    (Key::A, Joypad::BUTTON_A),
    (Key::S, Joypad::BUTTON_B),
    (Key::Space, Joypad::SELECT),
    (Key::Enter, Joypad::START),
    (Key::Up, Joypad::UP),
    (Key::Down, Joypad::DOWN),
    (Key::Left, Joypad::LEFT),
    (Key::Right, Joypad::RIGHT),
];

/// Famicore NES emulator, desktop frontend
#[derive(Parser, Debug)]
#[command(name = "famicore-desktop")]
#[command(about = "Play an iNES ROM in a window", long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    rom: PathBuf,

    /// Window scale factor (1-4)
    #[arg(short, long, default_value = "2")]
    scale: usize,
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

    let mut nes = Nes::new(cartridge);
    if let Err(e) = nes.reset() {
        eprintln!("reset failed: {}", e);
        return ExitCode::FAILURE;
    }

    let scale = args.scale.clamp(1, 4);
    let mut window = match Window::new(
        "Famicore",
        WIDTH * scale,
        HEIGHT * scale,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    ) {
        Ok(window) => window,
        Err(e) => {
            eprintln!("failed to create window: {}", e);
            return ExitCode::FAILURE;
        }
    };
    window.set_target_fps(60);

    let mut frame = Frame::new();
    let mut pixels = vec![0u32; WIDTH * HEIGHT];

    while window.is_open() && !window.is_key_down(Key::Escape) {
        for (key, button) in KEY_MAP {
            nes.joypad1().set_button(button, window.is_key_down(key));
        }

        if let Err(e) = nes.run_frame() {
            eprintln!("runtime error: {}", e);
            return ExitCode::FAILURE;
        }

        nes.render_frame(&mut frame);
        rgba_to_packed(frame.data(), &mut pixels);

        if let Err(e) = window.update_with_buffer(&pixels, WIDTH, HEIGHT) {
            eprintln!("failed to update window: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// Convert the core's RGBA bytes to minifb's packed 0RGB words
fn rgba_to_packed(rgba: &[u8], out: &mut [u32]) {
    for (pixel, chunk) in out.iter_mut().zip(rgba.chunks_exact(4)) {
        *pixel = (chunk[0] as u32) << 16 | (chunk[1] as u32) << 8 | chunk[2] as u32;
    }
}
