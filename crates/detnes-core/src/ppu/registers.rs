//! PPU register bit layouts.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// `$2000` PPUCTRL.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Control: u8 {
        const NAMETABLE        = 0b0000_0011;
        const INCREMENT_32     = 0b0000_0100;
        const SPRITE_TABLE     = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16   = 0b0010_0000;
        const MASTER_SLAVE     = 0b0100_0000;
        const GENERATE_NMI     = 0b1000_0000;
    }
}

impl Control {
    pub fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) { 32 } else { 1 }
    }

    pub fn sprite_table(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) { 0x1000 } else { 0x0000 }
    }

    pub fn background_table(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) { 0x1000 } else { 0x0000 }
    }

    pub fn sprite_height(self) -> i16 {
        if self.contains(Control::SPRITE_SIZE_16) { 16 } else { 8 }
    }
}

bitflags! {
    /// `$2001` PPUMASK.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Mask: u8 {
        const GRAYSCALE        = 0b0000_0001;
        const SHOW_BG_LEFT     = 0b0000_0010;
        const SHOW_SPRITES_LEFT= 0b0000_0100;
        const SHOW_BACKGROUND  = 0b0000_1000;
        const SHOW_SPRITES     = 0b0001_0000;
        const EMPHASIZE_RED    = 0b0010_0000;
        const EMPHASIZE_GREEN  = 0b0100_0000;
        const EMPHASIZE_BLUE   = 0b1000_0000;
    }
}

impl Mask {
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }
}

bitflags! {
    /// `$2002` PPUSTATUS. The low five bits are open bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VERTICAL_BLANK  = 0b1000_0000;
    }
}

// Loopy layout of `v`/`t`:
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y][nt][coarse_y ][coarse_x ]
const COARSE_X: u16 = 0x001F;
const COARSE_Y: u16 = 0x03E0;
const NAMETABLE_X: u16 = 0x0400;
const NAMETABLE_Y: u16 = 0x0800;
const FINE_Y: u16 = 0x7000;

/// 15 bit scroll/VRAM address register (`v` and `t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VramAddr(pub u16);

impl VramAddr {
    pub fn get(self) -> u16 {
        self.0
    }

    pub fn fine_y(self) -> u16 {
        (self.0 & FINE_Y) >> 12
    }

    /// Address of the nametable byte for the current tile.
    pub fn tile_addr(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Address of the attribute byte covering the current tile.
    pub fn attribute_addr(self) -> u16 {
        0x23C0 | (self.0 & 0x0C00) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Bit offset of the current 16x16 quadrant inside an attribute byte.
    pub fn attribute_shift(self) -> u16 {
        ((self.0 >> 4) & 0x04) | (self.0 & 0x02)
    }

    pub fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & 0x7FFF;
    }

    pub fn increment_x(&mut self) {
        if self.0 & COARSE_X == 31 {
            self.0 &= !COARSE_X;
            self.0 ^= NAMETABLE_X;
        } else {
            self.0 += 1;
        }
    }

    pub fn increment_y(&mut self) {
        if self.0 & FINE_Y != FINE_Y {
            self.0 += 0x1000;
            return;
        }
        self.0 &= !FINE_Y;
        let mut coarse_y = (self.0 & COARSE_Y) >> 5;
        match coarse_y {
            29 => {
                coarse_y = 0;
                self.0 ^= NAMETABLE_Y;
            }
            31 => coarse_y = 0,
            _ => coarse_y += 1,
        }
        self.0 = (self.0 & !COARSE_Y) | (coarse_y << 5);
    }

    pub fn copy_x(&mut self, from: VramAddr) {
        let bits = COARSE_X | NAMETABLE_X;
        self.0 = (self.0 & !bits) | (from.0 & bits);
    }

    pub fn copy_y(&mut self, from: VramAddr) {
        let bits = FINE_Y | NAMETABLE_Y | COARSE_Y;
        self.0 = (self.0 & !bits) | (from.0 & bits);
    }

    /// `$2000` write: nametable select into bits 10-11.
    pub fn set_nametable(&mut self, value: u8) {
        self.0 = (self.0 & !(NAMETABLE_X | NAMETABLE_Y)) | ((value as u16 & 0x03) << 10);
    }

    /// First `$2005` write.
    pub fn set_scroll_x(&mut self, value: u8) {
        self.0 = (self.0 & !COARSE_X) | (value as u16 >> 3);
    }

    /// Second `$2005` write.
    pub fn set_scroll_y(&mut self, value: u8) {
        let value = value as u16;
        self.0 = (self.0 & !(FINE_Y | COARSE_Y)) | ((value & 0x07) << 12) | ((value & 0xF8) << 2);
    }

    /// First `$2006` write; also clears bit 14.
    pub fn set_addr_high(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | ((value as u16 & 0x3F) << 8);
    }

    /// Second `$2006` write.
    pub fn set_addr_low(&mut self, value: u8) {
        self.0 = (self.0 & 0x7F00) | value as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_x_wraps_into_next_nametable() {
        let mut v = VramAddr(31);
        v.increment_x();
        assert_eq!(v.get(), NAMETABLE_X);
    }

    #[test]
    fn coarse_y_29_flips_vertical_nametable() {
        let mut v = VramAddr(FINE_Y | (29 << 5));
        v.increment_y();
        assert_eq!(v.get(), NAMETABLE_Y);

        // Rows 30/31 are attribute memory and wrap without the flip.
        let mut v = VramAddr(FINE_Y | (31 << 5));
        v.increment_y();
        assert_eq!(v.get(), 0);
    }

    #[test]
    fn scroll_writes_fill_t() {
        let mut t = VramAddr::default();
        t.set_nametable(0b10);
        t.set_scroll_x(0b0111_1101);
        t.set_scroll_y(0b0101_1110);
        assert_eq!(t.get(), 0b110_10_01011_01111);
    }

    #[test]
    fn attribute_address_for_tile() {
        // Tile (coarse_x 5, coarse_y 9) of nametable 1.
        let v = VramAddr(NAMETABLE_X | (9 << 5) | 5);
        assert_eq!(v.attribute_addr(), 0x27C0 + 2 * 8 + 1);
        assert_eq!(v.attribute_shift(), 0);
    }
}
