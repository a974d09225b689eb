//! Sprite evaluation and the per-line sprite shifters.

use serde::{Deserialize, Serialize};

use crate::{
    bus::PpuBus,
    ppu::{Ppu, registers::Status},
};

/// Sprites the hardware can draw on one line.
pub const SPRITES_PER_LINE: usize = 8;
const OAM_SPRITES: usize = 64;

const ATTR_PRIORITY: u8 = 0x20;
const ATTR_FLIP_H: u8 = 0x40;
const ATTR_FLIP_V: u8 = 0x80;

/// Sprites selected for the next line, already decoded into 4 bit pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteLine {
    pub count: u8,
    pub patterns: [u32; SPRITES_PER_LINE],
    pub positions: [u8; SPRITES_PER_LINE],
    pub priorities: [u8; SPRITES_PER_LINE],
    /// OAM index of each slot, for sprite 0 hit.
    pub indexes: [u8; SPRITES_PER_LINE],
}

impl Ppu {
    /// Picks the first eight sprites covering the current line, then runs
    /// the overflow scan with the hardware's broken OAM walk: once eight
    /// sprites are found the byte offset `m` is incremented together with
    /// the sprite index `n`, so later checks compare tile, attribute or X
    /// bytes against the scanline.
    pub(crate) fn evaluate_sprites<B: PpuBus>(&mut self, bus: &mut B) {
        let height = self.ctrl.sprite_height();
        let scanline = self.scanline as i16;
        let in_range = |y: u8| {
            let row = scanline - y as i16;
            (0..height).contains(&row)
        };

        let mut count = 0;
        let mut n = 0;
        while n < OAM_SPRITES && count < SPRITES_PER_LINE {
            let base = n * 4;
            let y = self.oam[base];
            if in_range(y) {
                let row = scanline - y as i16;
                let attributes = self.oam[base + 2];
                self.sprites.patterns[count] = self.fetch_sprite_pattern(bus, n, row);
                self.sprites.positions[count] = self.oam[base + 3];
                self.sprites.priorities[count] = (attributes & ATTR_PRIORITY) >> 5;
                self.sprites.indexes[count] = n as u8;
                count += 1;
            }
            n += 1;
        }
        self.sprites.count = count as u8;

        let mut m = 0;
        while n < OAM_SPRITES {
            if in_range(self.oam[n * 4 + m]) {
                self.status.insert(Status::SPRITE_OVERFLOW);
                break;
            }
            n += 1;
            m = (m + 1) & 0x03;
        }
    }

    fn fetch_sprite_pattern<B: PpuBus>(&mut self, bus: &mut B, index: usize, row: i16) -> u32 {
        let tile = self.oam[index * 4 + 1] as u16;
        let attributes = self.oam[index * 4 + 2];
        let mut row = row as u16;
        let addr = if self.ctrl.sprite_height() == 8 {
            if attributes & ATTR_FLIP_V != 0 {
                row = 7 - row;
            }
            self.ctrl.sprite_table() + tile * 16 + row
        } else {
            if attributes & ATTR_FLIP_V != 0 {
                row = 15 - row;
            }
            // 8x16 sprites take the table from bit 0 of the tile index.
            let table = (tile & 0x01) * 0x1000;
            let mut tile = tile & 0xFE;
            if row > 7 {
                tile += 1;
                row -= 8;
            }
            table + tile * 16 + row
        };

        let palette = (attributes & 0x03) << 2;
        let mut low = bus.read_pattern(addr);
        let mut high = bus.read_pattern(addr + 8);
        let mut data = 0u32;
        for _ in 0..8 {
            let (p1, p2) = if attributes & ATTR_FLIP_H != 0 {
                let bits = (low & 0x01, (high & 0x01) << 1);
                low >>= 1;
                high >>= 1;
                bits
            } else {
                let bits = ((low & 0x80) >> 7, (high & 0x80) >> 6);
                low <<= 1;
                high <<= 1;
                bits
            };
            data = data << 4 | (palette | p1 | p2) as u32;
        }
        data
    }

    /// Slot and 4 bit colour of the frontmost opaque sprite pixel at `x`.
    pub(crate) fn sprite_pixel(&self, x: u16) -> Option<(usize, u8)> {
        (0..self.sprites.count as usize).find_map(|slot| {
            let offset = x as i16 - self.sprites.positions[slot] as i16;
            if !(0..8).contains(&offset) {
                return None;
            }
            let shift = (7 - offset) * 4;
            let color = ((self.sprites.patterns[slot] >> shift) & 0x0F) as u8;
            (color & 0x03 != 0).then_some((slot, color))
        })
    }
}
