#![allow(dead_code)]

use ctor::ctor;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_file(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

/// Zero page cells the pad program writes.
pub const PAD1_BITS: usize = 0x10;
pub const PAD2_BITS: usize = 0x11;
pub const LOOP_COUNTER: usize = 0x12;

/// NROM-128 image whose program polls both pads forever. Each pad's eight
/// bits land in its zero page cell with A in bit 7 and Right in bit 0.
pub fn pad_rom() -> Vec<u8> {
    #[rustfmt::skip]
    let program = [
        0x78, 0xD8, 0xA2, 0xFF, 0x9A,       // SEI ; CLD ; LDX #$FF ; TXS
        0xA9, 0x01, 0x8D, 0x16, 0x40,       // loop: strobe
        0xA9, 0x00, 0x8D, 0x16, 0x40,
        0xA2, 0x08,                         // LDX #8
        0xAD, 0x16, 0x40, 0x4A,             // pad1: LDA $4016 ; LSR A
        0x26, PAD1_BITS as u8, 0xCA,        // ROL bits ; DEX
        0xD0, 0xF7,                         // BNE pad1
        0xA2, 0x08,
        0xAD, 0x17, 0x40, 0x4A,             // pad2: LDA $4017 ; LSR A
        0x26, PAD2_BITS as u8, 0xCA,
        0xD0, 0xF7,                         // BNE pad2
        0xE6, LOOP_COUNTER as u8,           // INC counter
        0x4C, 0x05, 0xC0,                   // JMP loop
    ];

    let mut prg = vec![0xEA; 0x4000];
    prg[..program.len()].copy_from_slice(&program);
    for vector in [0x3FFA, 0x3FFC, 0x3FFE] {
        prg[vector] = 0x00;
        prg[vector + 1] = 0xC0;
    }

    let mut rom = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0];
    rom.resize(16, 0);
    rom.extend_from_slice(&prg);
    rom.extend((0..0x2000).map(|i| (i % 251) as u8));
    rom
}
