//! PPU-side pattern memory.
//!
//! A board wires either CHR ROM from the image or writable CHR RAM to the PPU
//! pattern space. Mappers compute an absolute offset into this memory and the
//! storage wraps it to its real length, so every offset resolves in bounds.

/// CHR ROM or CHR RAM, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChrMemory {
    Rom(Box<[u8]>),
    Ram(Box<[u8]>),
}

impl ChrMemory {
    /// Picks ROM when the image carries CHR data, otherwise zeroed RAM of `ram_size`.
    pub fn new(chr_rom: Box<[u8]>, ram_size: usize) -> Self {
        if chr_rom.is_empty() {
            ChrMemory::Ram(vec![0; ram_size.max(1)].into_boxed_slice())
        } else {
            ChrMemory::Rom(chr_rom)
        }
    }

    pub fn read(&self, offset: usize) -> u8 {
        let data = self.as_slice();
        data[offset % data.len()]
    }

    /// Writes land only in CHR RAM; ROM ignores them.
    pub fn write(&mut self, offset: usize, value: u8) {
        if let ChrMemory::Ram(ram) = self {
            let len = ram.len();
            ram[offset % len] = value;
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn is_ram(&self) -> bool {
        matches!(self, ChrMemory::Ram(_))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            ChrMemory::Rom(data) | ChrMemory::Ram(data) => data,
        }
    }

    /// ROM bytes for the static blob; empty for RAM-backed carts.
    pub fn rom(&self) -> &[u8] {
        match self {
            ChrMemory::Rom(data) => data,
            ChrMemory::Ram(_) => &[],
        }
    }

    /// RAM contents for the dynamic blob; empty for ROM-backed carts.
    pub fn ram(&self) -> &[u8] {
        match self {
            ChrMemory::Rom(_) => &[],
            ChrMemory::Ram(data) => data,
        }
    }

    pub(crate) fn ram_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            ChrMemory::Rom(_) => None,
            ChrMemory::Ram(data) => Some(data),
        }
    }
}
