//! Flat 64 KiB memory for unit tests.

use crate::{
    bus::{Bus, PpuBus},
    cartridge::header::Mirroring,
};

#[derive(Debug)]
pub struct MockBus {
    pub mem: Vec<u8>,
    pub irq: bool,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            mem: vec![0; 0x10000],
            irq: false,
        }
    }
}

impl MockBus {
    /// Places `program` at `origin` and points the reset vector at it.
    pub fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut bus = Self::default();
        bus.load(origin, program);
        bus.mem[0xFFFC] = origin as u8;
        bus.mem[0xFFFD] = (origin >> 8) as u8;
        bus
    }

    pub fn load(&mut self, origin: u16, bytes: &[u8]) {
        let start = origin as usize;
        self.mem[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl Bus for MockBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }

    fn irq_line(&mut self) -> bool {
        self.irq
    }
}

/// 8 KiB of pattern RAM with fixed mirroring.
#[derive(Debug)]
pub struct MockPpuBus {
    pub chr: Vec<u8>,
    pub mirroring: Mirroring,
    pub scanlines: u32,
}

impl Default for MockPpuBus {
    fn default() -> Self {
        Self {
            chr: vec![0; 0x2000],
            mirroring: Mirroring::Horizontal,
            scanlines: 0,
        }
    }
}

impl PpuBus for MockPpuBus {
    fn read_pattern(&mut self, addr: u16) -> u8 {
        self.chr[addr as usize & 0x1FFF]
    }

    fn write_pattern(&mut self, addr: u16, value: u8) {
        self.chr[addr as usize & 0x1FFF] = value;
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn scanline(&mut self) {
        self.scanlines += 1;
    }
}
