//! CPU behavior tests driven through the public system API
//!
//! Programs are placed in a 16KB NROM image with the reset vector at $8000
//! and run until BRK.

use famicore::cartridge::{CHR_ROM_PAGE_SIZE, PRG_ROM_PAGE_SIZE};
use famicore::cpu::{Bus as _, BrkMode};
use famicore::system::Nes;

fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0x00; PRG_ROM_PAGE_SIZE];
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

fn boot(program: &[u8]) -> Nes {
    let mut nes = Nes::from_rom(&rom_with_program(program)).unwrap();
    nes.set_brk_mode(BrkMode::Halt);
    nes.reset().unwrap();
    nes
}

fn run(program: &[u8]) -> Nes {
    let mut nes = boot(program);
    while nes.step().unwrap() {}
    nes
}

#[test]
fn test_immediate_load_and_transfer() {
    let nes = run(&[0xA9, 0x05, 0xAA, 0x00]);
    assert_eq!(nes.cpu().registers().a, 0x05);
    assert_eq!(nes.cpu().registers().x, 0x05);
    assert!(!nes.cpu().status().zero());
    assert!(!nes.cpu().status().negative());
}

#[test]
fn test_inx_overflow_wraps_to_one() {
    let nes = run(&[0xA9, 0xFF, 0xAA, 0xE8, 0xE8, 0x00]);
    assert_eq!(nes.cpu().registers().x, 0x01);
    assert!(!nes.cpu().status().zero());
    assert!(!nes.cpu().status().negative());
}

#[test]
fn test_adc_carry_out() {
    let nes = run(&[0xA9, 0xFF, 0x69, 0x02, 0x00]);
    assert_eq!(nes.cpu().registers().a, 0x01);
    assert!(nes.cpu().status().carry());
    assert!(!nes.cpu().status().overflow());
}

#[test]
fn test_adc_signed_overflow() {
    let nes = run(&[0xA9, 0x7F, 0x69, 0x01, 0x00]);
    assert_eq!(nes.cpu().registers().a, 0x80);
    assert!(nes.cpu().status().overflow());
    assert!(nes.cpu().status().negative());
}

#[test]
fn test_sbc_with_and_without_borrow() {
    // SEC first: 5 - 3 = 2, no borrow out
    let nes = run(&[0x38, 0xA9, 0x05, 0xE9, 0x03, 0x00]);
    assert_eq!(nes.cpu().registers().a, 0x02);
    assert!(nes.cpu().status().carry());
    assert!(!nes.cpu().status().overflow());

    // CLC first: the clear carry borrows one more
    let nes = run(&[0x18, 0xA9, 0x05, 0xE9, 0x03, 0x00]);
    assert_eq!(nes.cpu().registers().a, 0x01);
    assert!(nes.cpu().status().carry());
}

#[test]
fn test_adc_then_sbc_restores_accumulator() {
    // SEC; ADC #m adds m+1, CLC; SBC #m removes m+1 again
    for (a, m) in [(0x00u8, 0x00u8), (0x12, 0x34), (0x7F, 0x01), (0xFF, 0xFF), (0x80, 0x7F)] {
        let nes = run(&[0xA9, a, 0x38, 0x69, m, 0x18, 0xE9, m, 0x00]);
        assert_eq!(
            nes.cpu().registers().a,
            a,
            "accumulator not restored for a={:02X} m={:02X}",
            a,
            m
        );
    }
}

#[test]
fn test_jmp_indirect_page_boundary_bug() {
    let mut nes = boot(&[0x6C, 0xFF, 0x11, 0x00]);
    // Vector split across the page-wrap: low at $11FF, high from $1100
    nes.bus_mut().write(0x11FF, 0x10).unwrap();
    nes.bus_mut().write(0x1100, 0x70).unwrap();
    nes.step().unwrap();
    assert_eq!(nes.cpu().registers().pc, 0x7010);
}

#[test]
fn test_branch_taken_skips_bytes() {
    // BCC +2 over a BRK, landing on LDA #$42
    let nes = run(&[0x90, 0x02, 0x00, 0x00, 0xA9, 0x42, 0x00]);
    assert_eq!(nes.cpu().registers().a, 0x42);
}

#[test]
fn test_branch_not_taken_after_asl_sets_carry() {
    // ASL of $FF leaves C=1, so BCC falls through to LDA #$33
    let nes = run(&[0xA9, 0xFF, 0x0A, 0x90, 0x02, 0xA9, 0x33, 0x00]);
    assert_eq!(nes.cpu().registers().a, 0x33);
}

#[test]
fn test_branch_pc_arithmetic() {
    // BNE with a negative offset loops DEX until X hits zero
    // LDX #$03; DEX; BNE -3 (back to DEX); BRK
    let nes = run(&[0xA2, 0x03, 0xCA, 0xD0, 0xFD, 0x00]);
    assert_eq!(nes.cpu().registers().x, 0x00);
    assert!(nes.cpu().status().zero());
}

#[test]
fn test_documented_cycle_costs() {
    // (program step costs) checked against the bus cycle counter
    let cases: &[(&[u8], &[u64])] = &[
        // LDA #imm (2), TAX (2), STA zp (3)
        (&[0xA9, 0x05, 0xAA, 0x85, 0x10, 0x00], &[2, 2, 3]),
        // LDA abs (4), JMP abs (3)
        (&[0xAD, 0x00, 0x02, 0x4C, 0x07, 0x80], &[4, 3]),
        // (Indirect,X) load (6), (Indirect),Y store (6)
        (&[0xA1, 0x10, 0x91, 0x12], &[6, 6]),
    ];
    for (program, costs) in cases {
        let mut nes = boot(program);
        for &expected in *costs {
            let before = nes.bus().cycles();
            nes.step().unwrap();
            assert_eq!(
                nes.bus().cycles() - before,
                expected,
                "program {:02X?}",
                program
            );
        }
    }
}

#[test]
fn test_indexed_read_page_cross_costs_extra() {
    // LDY #$01; LDA ($10),Y where the pointer holds $80FF: crossing costs 6
    let mut nes = boot(&[0xA0, 0x01, 0xB1, 0x10, 0x00]);
    nes.bus_mut().write(0x0010, 0xFF).unwrap();
    nes.bus_mut().write(0x0011, 0x80).unwrap();
    nes.step().unwrap();
    let before = nes.bus().cycles();
    nes.step().unwrap();
    assert_eq!(nes.bus().cycles() - before, 6);
}

#[test]
fn test_memory_rmw_through_ram() {
    // INC $10 twice then DEC $10 once
    let mut nes = boot(&[0xE6, 0x10, 0xE6, 0x10, 0xC6, 0x10, 0x00]);
    while nes.step().unwrap() {}
    assert_eq!(nes.bus_mut().read(0x0010).unwrap(), 0x01);
}

#[test]
fn test_undocumented_lax_and_sax() {
    // LAX $10 then SAX $11
    let mut nes = boot(&[0xA7, 0x10, 0x87, 0x11, 0x00]);
    nes.bus_mut().write(0x0010, 0x5A).unwrap();
    while nes.step().unwrap() {}
    assert_eq!(nes.cpu().registers().a, 0x5A);
    assert_eq!(nes.cpu().registers().x, 0x5A);
    assert_eq!(nes.bus_mut().read(0x0011).unwrap(), 0x5A);
}

#[test]
fn test_undocumented_isb() {
    // ISB $10: memory becomes $43, A = $50 - $43 (with SEC)
    let mut nes = boot(&[0x38, 0xA9, 0x50, 0xE7, 0x10, 0x00]);
    nes.bus_mut().write(0x0010, 0x42).unwrap();
    while nes.step().unwrap() {}
    assert_eq!(nes.bus_mut().read(0x0010).unwrap(), 0x43);
    assert_eq!(nes.cpu().registers().a, 0x0D);
}

#[test]
fn test_write_to_rom_is_a_program_error() {
    let mut nes = boot(&[0xA9, 0x01, 0x8D, 0x00, 0x90]);
    nes.step().unwrap();
    let err = nes.step().unwrap_err();
    assert_eq!(err, famicore::error::EmuError::WriteToRom(0x9000));
}

#[test]
fn test_unknown_opcode_is_a_program_error() {
    let mut nes = boot(&[0x02]);
    let err = nes.step().unwrap_err();
    assert_eq!(
        err,
        famicore::error::EmuError::UnknownOpcode {
            opcode: 0x02,
            pc: 0x8000
        }
    );
}
