#![allow(dead_code)]

//! Synthetic cartridges for the integration tests.
//!
//! No commercial ROMs are used. The programs are assembled by hand with a
//! small label-resolving builder so every unit of the console gets traffic:
//! rendering with NMI, OAM DMA, all five audio channels, controller polling,
//! MMC3 bank switching and its scanline IRQ.

use std::collections::HashMap;

use ctor::ctor;
use detnes_core::Console;
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

pub const PRG_BANK: usize = 0x2000;
pub const CHR_SIZE: usize = 0x2000;

/// Zero page cells the stress program keeps its counters in.
pub const LOOP_COUNTER: usize = 0x10;
pub const BANK_READ: usize = 0x11;
pub const PAD_BITS: usize = 0x12;
pub const PAD_SUM: usize = 0x13;
pub const NMI_COUNT: usize = 0x14;
pub const IRQ_COUNT: usize = 0x15;

enum Fixup {
    Absolute(&'static str),
    Relative(&'static str),
}

/// Minimal 6502 assembler: raw bytes plus absolute and branch label fixups.
pub struct Asm {
    origin: u16,
    code: Vec<u8>,
    labels: HashMap<&'static str, u16>,
    fixups: Vec<(usize, Fixup)>,
}

impl Asm {
    pub fn new(origin: u16) -> Self {
        Self {
            origin,
            code: Vec::new(),
            labels: HashMap::new(),
            fixups: Vec::new(),
        }
    }

    pub fn here(&self) -> u16 {
        self.origin + self.code.len() as u16
    }

    pub fn label(&mut self, name: &'static str) -> &mut Self {
        let here = self.here();
        self.labels.insert(name, here);
        self
    }

    pub fn op(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// `opcode` followed by the absolute address of `target`.
    pub fn abs(&mut self, opcode: u8, target: &'static str) -> &mut Self {
        self.code.push(opcode);
        self.fixups.push((self.code.len(), Fixup::Absolute(target)));
        self.code.extend_from_slice(&[0, 0]);
        self
    }

    pub fn branch(&mut self, opcode: u8, target: &'static str) -> &mut Self {
        self.code.push(opcode);
        self.fixups.push((self.code.len(), Fixup::Relative(target)));
        self.code.push(0);
        self
    }

    pub fn address(&self, name: &str) -> u16 {
        self.labels[name]
    }

    pub fn finish(mut self) -> Vec<u8> {
        for (at, fixup) in std::mem::take(&mut self.fixups) {
            match fixup {
                Fixup::Absolute(name) => {
                    let addr = self.labels[name];
                    self.code[at] = addr as u8;
                    self.code[at + 1] = (addr >> 8) as u8;
                }
                Fixup::Relative(name) => {
                    let next = self.origin as i32 + at as i32 + 1;
                    let offset = self.labels[name] as i32 - next;
                    assert!((-128..=127).contains(&offset), "branch to {name} out of range");
                    self.code[at] = offset as i8 as u8;
                }
            }
        }
        self.code
    }
}

/// iNES 1.0 image. `flags6` carries mirroring/battery bits; the mapper
/// number is merged in.
pub fn ines(mapper: u8, flags6: u8, prg: &[u8], chr: &[u8]) -> Vec<u8> {
    let mut image = vec![
        b'N',
        b'E',
        b'S',
        0x1A,
        (prg.len() / 0x4000) as u8,
        (chr.len() / CHR_SIZE) as u8,
        (mapper << 4) | (flags6 & 0x0F),
        mapper & 0xF0,
    ];
    image.resize(16, 0);
    image.extend_from_slice(prg);
    image.extend_from_slice(chr);
    image
}

/// CHR data with a different bit pattern on every row of every tile.
pub fn patterned_chr() -> Vec<u8> {
    (0..CHR_SIZE)
        .map(|i| (i as u32).wrapping_mul(37).wrapping_add((i / 16) as u32) as u8)
        .collect()
}

/// Places `code` at `$E000` of a PRG image whose last 8 KiB bank is fixed
/// there, and points the three vectors at the given labels.
fn with_vectors(mut prg: Vec<u8>, asm: Asm, nmi: &str, reset: &str, irq: &str) -> Vec<u8> {
    let vectors = [asm.address(nmi), asm.address(reset), asm.address(irq)];
    let code = asm.finish();
    let base = prg.len() - PRG_BANK;
    prg[base..base + code.len()].copy_from_slice(&code);
    for (i, vector) in vectors.into_iter().enumerate() {
        let at = prg.len() - 6 + i * 2;
        prg[at] = vector as u8;
        prg[at + 1] = (vector >> 8) as u8;
    }
    prg
}

/// MMC3 cartridge running a program that keeps every unit busy.
///
/// * reset: palette, all four nametables and the sprite page are written,
///   all audio channels including a DMC sample are started, the MMC3
///   scanline IRQ is armed and rendering is enabled with NMI;
/// * main loop: swaps the `$8000` bank, reads from it, polls pad 1 and
///   folds the result into RAM;
/// * NMI: OAM DMA from page 2, scroll update, sprite mutation;
/// * IRQ: acknowledges and re-arms the MMC3 counter.
pub fn stress_rom() -> Vec<u8> {
    let mut asm = Asm::new(0xE000);
    asm.label("reset")
        .op(&[0x78, 0xD8]) // SEI ; CLD
        .op(&[0xA2, 0xFF, 0x9A]) // LDX #$FF ; TXS
        .op(&[0xA9, 0x00, 0x8D, 0x00, 0x20, 0x8D, 0x01, 0x20]) // PPU off
        // Palette.
        .op(&[0xA9, 0x3F, 0x8D, 0x06, 0x20, 0xA9, 0x00, 0x8D, 0x06, 0x20])
        .op(&[0xA2, 0x00])
        .label("palette")
        .op(&[0x8A, 0x8D, 0x07, 0x20, 0xE8, 0xE0, 0x20]) // TXA ; STA $2007 ; INX ; CPX #$20
        .branch(0xD0, "palette")
        // Nametables: 4 KiB of tile indices.
        .op(&[0xA9, 0x20, 0x8D, 0x06, 0x20, 0xA9, 0x00, 0x8D, 0x06, 0x20])
        .op(&[0xA0, 0x10, 0xA2, 0x00]) // LDY #16 ; LDX #0
        .label("nametable")
        .op(&[0x8A, 0x29, 0x3F, 0x8D, 0x07, 0x20, 0xE8]) // TXA ; AND #$3F ; STA $2007 ; INX
        .branch(0xD0, "nametable")
        .op(&[0x88]) // DEY
        .branch(0xD0, "nametable")
        // Sprite page at $0200.
        .op(&[0xA2, 0x00])
        .label("sprites")
        .op(&[0x8A, 0x0A, 0x9D, 0x00, 0x02, 0xE8]) // TXA ; ASL A ; STA $0200,X ; INX
        .branch(0xD0, "sprites")
        // Pulse 1, pulse 2, triangle, noise.
        .op(&[0xA9, 0x0F, 0x8D, 0x15, 0x40])
        .op(&[0xA9, 0xBF, 0x8D, 0x00, 0x40, 0xA9, 0xFD, 0x8D, 0x02, 0x40, 0xA9, 0x00, 0x8D, 0x03, 0x40])
        .op(&[0xA9, 0x87, 0x8D, 0x04, 0x40, 0xA9, 0x89, 0x8D, 0x05, 0x40, 0xA9, 0x40, 0x8D, 0x06, 0x40])
        .op(&[0xA9, 0x01, 0x8D, 0x07, 0x40])
        .op(&[0xA9, 0x81, 0x8D, 0x08, 0x40, 0xA9, 0x40, 0x8D, 0x0A, 0x40, 0xA9, 0x00, 0x8D, 0x0B, 0x40])
        .op(&[0xA9, 0x1F, 0x8D, 0x0C, 0x40, 0xA9, 0x05, 0x8D, 0x0E, 0x40, 0xA9, 0x00, 0x8D, 0x0F, 0x40])
        // DMC: looping 257 byte sample at $C000, fastest rate.
        .op(&[0xA9, 0x4F, 0x8D, 0x10, 0x40, 0xA9, 0x00, 0x8D, 0x12, 0x40, 0xA9, 0x10, 0x8D, 0x13, 0x40])
        .op(&[0xA9, 0x1F, 0x8D, 0x15, 0x40])
        // Frame counter IRQ off; MMC3 IRQ every 16 lines.
        .op(&[0xA9, 0x40, 0x8D, 0x17, 0x40])
        .op(&[0xA9, 0x10, 0x8D, 0x00, 0xC0, 0x8D, 0x01, 0xC0, 0x8D, 0x01, 0xE0])
        .op(&[0x58]) // CLI
        .op(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0xA9, 0x1E, 0x8D, 0x01, 0x20]) // NMI on, render on
        .label("main")
        .op(&[0xE6, LOOP_COUNTER as u8]) // INC counter
        // Bank select R6, bank = counter & 7, read $8000.
        .op(&[0xA9, 0x06, 0x8D, 0x00, 0x80])
        .op(&[0xA5, LOOP_COUNTER as u8, 0x29, 0x07, 0x8D, 0x01, 0x80])
        .op(&[0xAD, 0x00, 0x80, 0x85, BANK_READ as u8])
        // Pad 1 into PAD_BITS.
        .op(&[0xA9, 0x01, 0x8D, 0x16, 0x40, 0xA9, 0x00, 0x8D, 0x16, 0x40])
        .op(&[0xA2, 0x08])
        .label("pad")
        .op(&[0xAD, 0x16, 0x40, 0x4A, 0x26, PAD_BITS as u8, 0xCA]) // LDA $4016 ; LSR A ; ROL bits ; DEX
        .branch(0xD0, "pad")
        .op(&[0xA5, PAD_BITS as u8, 0x18, 0x65, PAD_SUM as u8, 0x85, PAD_SUM as u8])
        .abs(0x4C, "main")
        .label("nmi")
        .op(&[0x48, 0x8A, 0x48]) // PHA ; TXA ; PHA
        .op(&[0xA9, 0x00, 0x8D, 0x03, 0x20, 0xA9, 0x02, 0x8D, 0x14, 0x40]) // OAM DMA
        .op(&[0xE6, NMI_COUNT as u8])
        .op(&[0xA5, NMI_COUNT as u8, 0x8D, 0x05, 0x20, 0xA5, PAD_SUM as u8, 0x8D, 0x05, 0x20])
        .op(&[0xA6, NMI_COUNT as u8, 0xFE, 0x00, 0x02]) // LDX count ; INC $0200,X
        .op(&[0x68, 0xAA, 0x68, 0x40]) // PLA ; TAX ; PLA ; RTI
        .label("irq")
        .op(&[0x48])
        .op(&[0x8D, 0x00, 0xE0, 0x8D, 0x01, 0xE0]) // acknowledge, re-enable
        .op(&[0xE6, IRQ_COUNT as u8])
        .op(&[0x68, 0x40]);

    // Every switchable bank is filled with its own number.
    let prg: Vec<u8> = (0..8 * PRG_BANK).map(|i| (i / PRG_BANK) as u8).collect();
    let prg = with_vectors(prg, asm, "nmi", "reset", "irq");
    ines(4, 0, &prg, &patterned_chr())
}

/// NROM cartridge that spins on `INC $00 ; JMP`.
pub fn nrom_rom() -> Vec<u8> {
    let mut asm = Asm::new(0xE000);
    asm.label("reset")
        .op(&[0xE6, 0x00])
        .abs(0x4C, "reset")
        .label("irq")
        .op(&[0x40]);
    let prg = vec![0xEA; 0x8000];
    // NROM-256 fixes its last 8 KiB at $E000 as well.
    let prg = with_vectors(prg, asm, "irq", "reset", "irq");
    ines(0, 0x01, &prg, &patterned_chr())
}

/// Header claiming `mapper` with otherwise valid contents.
pub fn rom_with_mapper(mapper: u8) -> Vec<u8> {
    let mut rom = nrom_rom();
    rom[6] = (mapper << 4) | (rom[6] & 0x0F);
    rom[7] = mapper & 0xF0;
    rom
}

/// Pad 1 input for step `n` of a scripted run.
pub fn scripted_buttons(step: u64) -> [bool; 8] {
    let phase = (step / 5_000) as u8;
    std::array::from_fn(|bit| phase.wrapping_mul(29) >> bit & 1 == 1)
}

/// Observable machine state compared between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub pc: u16,
    pub cycles: u64,
    pub ram: Vec<u8>,
    pub framebuffer: Vec<u8>,
}

pub fn observe(console: &Console) -> Observation {
    Observation {
        pc: console.cpu().pc(),
        cycles: console.cpu().cycles(),
        ram: console.ram().to_vec(),
        framebuffer: console.buffer().to_vec(),
    }
}

/// Steps `steps` times starting at absolute step `start`, driving pad 1 from
/// [`scripted_buttons`].
pub fn run_scripted(console: &mut Console, start: u64, steps: u64) {
    for step in start..start + steps {
        console.controller1_mut().set_buttons(scripted_buttons(step));
        console.step();
    }
}
