//! Picture processing unit (2C02 and its PAL/Dendy variants).
//!
//! The PPU is advanced one dot at a time by the console. Each dot first
//! moves the `(scanline, dot)` counters and then performs the work the real
//! chip does on that dot: background fetches into the tile shift register,
//! scroll increments, sprite evaluation at dot 257, and the vertical blank
//! edges. Every visible dot writes one palette index into the framebuffer.
//!
//! Pattern memory and nametable wiring live on the cartridge and are reached
//! through [`PpuBus`]; nametable RAM, palette RAM and OAM are owned here.

use serde::{Deserialize, Serialize};

use crate::{
    bus::PpuBus,
    config::Timing,
    memory::ppu::{
        self as ppu_mem, NAMETABLE_RAM_SIZE, OAM_SIZE, PALETTE_RAM_SIZE, Register,
        SCREEN_HEIGHT, SCREEN_WIDTH,
    },
};

pub mod palette;
pub mod registers;
pub mod sprite;

use registers::{Control, Mask, Status, VramAddr};
use sprite::SpriteLine;

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const FRAME_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;
/// Dot at which boards with a scanline counter see their clock (the first
/// sprite pattern fetch with sprites on `$1000`).
const MAPPER_SCANLINE_DOT: u16 = 260;
/// Power-on position: the post-render line, so the first vblank follows
/// almost immediately.
const POWER_ON_SCANLINE: u16 = 240;
const POWER_ON_DOT: u16 = 340;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ppu {
    ctrl: Control,
    mask: Mask,
    status: Status,
    oam_addr: u8,

    v: VramAddr,
    t: VramAddr,
    /// Fine X scroll.
    x: u8,
    /// First/second write toggle shared by `$2005`/`$2006`.
    w: bool,
    /// `$2007` read buffer.
    read_buffer: u8,
    /// Last value driven onto the PPU data bus, returned for write-only
    /// registers and the low bits of `$2002`.
    io_latch: u8,

    scanline: u16,
    dot: u16,
    frame: u64,
    odd_frame: bool,

    /// Level of `VBLANK && GENERATE_NMI` as of the last update.
    nmi_line: bool,
    /// Rising edge of `nmi_line` not yet handed to the CPU.
    nmi_pending: bool,
    /// Set on entering vertical blank; presentation only.
    #[serde(skip)]
    frame_ready: bool,

    nametable_byte: u8,
    attribute_byte: u8,
    low_tile_byte: u8,
    high_tile_byte: u8,
    /// Two tiles of 4 bit background pixels, the current one in the high half.
    tile_data: u64,
    sprites: SpriteLine,

    ciram: Vec<u8>,
    palette: [u8; PALETTE_RAM_SIZE],
    oam: Vec<u8>,
    framebuffer: Vec<u8>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            ctrl: Control::empty(),
            mask: Mask::empty(),
            status: Status::empty(),
            oam_addr: 0,
            v: VramAddr::default(),
            t: VramAddr::default(),
            x: 0,
            w: false,
            read_buffer: 0,
            io_latch: 0,
            scanline: POWER_ON_SCANLINE,
            dot: POWER_ON_DOT,
            frame: 0,
            odd_frame: false,
            nmi_line: false,
            nmi_pending: false,
            frame_ready: false,
            nametable_byte: 0,
            attribute_byte: 0,
            low_tile_byte: 0,
            high_tile_byte: 0,
            tile_data: 0,
            sprites: SpriteLine::default(),
            ciram: vec![0; NAMETABLE_RAM_SIZE],
            palette: [0; PALETTE_RAM_SIZE],
            oam: vec![0; OAM_SIZE],
            framebuffer: vec![0; FRAME_PIXELS],
        }
    }

    /// Reset line: registers and latches clear, memories and the frame
    /// position survive.
    pub fn reset(&mut self) {
        self.ctrl = Control::empty();
        self.mask = Mask::empty();
        self.w = false;
        self.x = 0;
        self.t = VramAddr::default();
        self.read_buffer = 0;
        self.nmi_line = false;
        self.nmi_pending = false;
    }

    /// Checks the variable-length buffers restored from a snapshot.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.ciram.len() != NAMETABLE_RAM_SIZE {
            return Err("nametable RAM size");
        }
        if self.oam.len() != OAM_SIZE {
            return Err("OAM size");
        }
        if self.framebuffer.len() != FRAME_PIXELS {
            return Err("framebuffer size");
        }
        if self.sprites.count as usize > sprite::SPRITES_PER_LINE {
            return Err("sprite count");
        }
        if self.x > 0x07 {
            return Err("fine X scroll");
        }
        Ok(())
    }

    /// Palette indices of the last rendered pixels, row-major 256x240.
    pub fn frame_buffer(&self) -> &[u8] {
        &self.framebuffer
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    pub fn status_bits(&self) -> u8 {
        self.status.bits()
    }

    /// Hands over a latched NMI edge.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// True once per frame, after the vertical blank flag was raised.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// OAM DMA write.
    pub fn write_oam(&mut self, value: u8) {
        self.oam[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    pub fn read_register<B: PpuBus>(&mut self, addr: u16, bus: &mut B) -> u8 {
        let value = match Register::from_cpu_addr(addr) {
            Register::Status => {
                let value = self.status.bits() | (self.io_latch & 0x1F);
                self.status.remove(Status::VERTICAL_BLANK);
                self.w = false;
                self.update_nmi();
                value
            }
            Register::OamData => {
                let value = self.oam[self.oam_addr as usize];
                // Attribute bits 2-4 do not exist.
                if self.oam_addr & 0x03 == 0x02 {
                    value & 0xE3
                } else {
                    value
                }
            }
            Register::Data => {
                let addr = self.v.get() & ppu_mem::VRAM_MASK;
                let value = if addr >= ppu_mem::PALETTE_BASE {
                    // Palette reads bypass the buffer, which gets the
                    // nametable byte underneath.
                    self.read_buffer = self.read_vram(bus, addr - 0x1000);
                    self.read_palette(addr) | (self.io_latch & 0xC0)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = self.read_vram(bus, addr);
                    buffered
                };
                self.v.increment(self.ctrl.vram_increment());
                value
            }
            Register::Control
            | Register::Mask
            | Register::OamAddr
            | Register::Scroll
            | Register::Addr => return self.io_latch,
        };
        self.io_latch = value;
        value
    }

    pub fn write_register<B: PpuBus>(&mut self, addr: u16, value: u8, bus: &mut B) {
        self.io_latch = value;
        match Register::from_cpu_addr(addr) {
            Register::Control => {
                self.ctrl = Control::from_bits_retain(value);
                self.t.set_nametable(value);
                self.update_nmi();
            }
            Register::Mask => self.mask = Mask::from_bits_retain(value),
            Register::Status => {}
            Register::OamAddr => self.oam_addr = value,
            Register::OamData => self.write_oam(value),
            Register::Scroll => {
                if self.w {
                    self.t.set_scroll_y(value);
                } else {
                    self.t.set_scroll_x(value);
                    self.x = value & 0x07;
                }
                self.w = !self.w;
            }
            Register::Addr => {
                if self.w {
                    self.t.set_addr_low(value);
                    self.v = self.t;
                } else {
                    self.t.set_addr_high(value);
                }
                self.w = !self.w;
            }
            Register::Data => {
                let addr = self.v.get() & ppu_mem::VRAM_MASK;
                self.write_vram(bus, addr, value);
                self.v.increment(self.ctrl.vram_increment());
            }
        }
    }

    fn update_nmi(&mut self) {
        let line = self.status.contains(Status::VERTICAL_BLANK)
            && self.ctrl.contains(Control::GENERATE_NMI);
        if line && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = line;
    }

    fn read_vram<B: PpuBus>(&self, bus: &mut B, addr: u16) -> u8 {
        let addr = addr & ppu_mem::VRAM_MASK;
        match addr {
            0x0000..=ppu_mem::PATTERN_END => bus.read_pattern(addr),
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_END => {
                self.ciram[nametable_offset(bus, addr)]
            }
            _ => self.read_palette(addr),
        }
    }

    fn write_vram<B: PpuBus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        let addr = addr & ppu_mem::VRAM_MASK;
        match addr {
            0x0000..=ppu_mem::PATTERN_END => bus.write_pattern(addr, value),
            ppu_mem::NAMETABLE_BASE..=ppu_mem::NAMETABLE_END => {
                let offset = nametable_offset(bus, addr);
                self.ciram[offset] = value;
            }
            _ => self.palette[palette_index(addr)] = value & 0x3F,
        }
    }

    fn read_palette(&self, addr: u16) -> u8 {
        self.palette[palette_index(addr)]
    }

    /// Advances one dot.
    pub fn tick<B: PpuBus>(&mut self, bus: &mut B, timing: &Timing) {
        let rendering = self.mask.rendering_enabled();
        self.advance(timing, rendering);

        let dot = self.dot;
        let pre_line = self.scanline == timing.pre_render_line();
        let visible_line = (self.scanline as usize) < SCREEN_HEIGHT;
        let visible_dot = (1..=256).contains(&dot);
        let fetch_dot = visible_dot || (321..=336).contains(&dot);

        if visible_line && visible_dot {
            self.render_pixel(rendering);
        }

        if rendering && (visible_line || pre_line) {
            if fetch_dot {
                self.tile_data <<= 4;
                match dot % 8 {
                    1 => self.fetch_nametable_byte(bus),
                    3 => self.fetch_attribute_byte(bus),
                    5 => self.fetch_tile_byte(bus, 0),
                    7 => self.fetch_tile_byte(bus, 8),
                    0 => {
                        self.store_tile_data();
                        self.v.increment_x();
                    }
                    _ => {}
                }
            }
            match dot {
                256 => self.v.increment_y(),
                257 => self.v.copy_x(self.t),
                280..=304 if pre_line => self.v.copy_y(self.t),
                _ => {}
            }
            if dot == MAPPER_SCANLINE_DOT {
                bus.scanline();
            }
        }

        if rendering && dot == 257 {
            if visible_line {
                self.evaluate_sprites(bus);
            } else {
                self.sprites.count = 0;
            }
        }

        if dot == 1 {
            if self.scanline == timing.vblank_line {
                self.status.insert(Status::VERTICAL_BLANK);
                self.frame_ready = true;
                self.update_nmi();
            } else if pre_line {
                self.status.remove(
                    Status::VERTICAL_BLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW,
                );
                self.update_nmi();
            }
        }
    }

    fn advance(&mut self, timing: &Timing, rendering: bool) {
        if timing.odd_frame_skip
            && rendering
            && self.odd_frame
            && self.scanline == timing.pre_render_line()
            && self.dot == DOTS_PER_SCANLINE - 2
        {
            // The idle dot 340 of the pre-render line is dropped.
            self.dot = 0;
            self.scanline = 0;
            self.next_frame();
            return;
        }

        self.dot += 1;
        if self.dot == DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline == timing.scanlines {
                self.scanline = 0;
                self.next_frame();
            }
        }
    }

    fn next_frame(&mut self) {
        self.frame += 1;
        self.odd_frame = !self.odd_frame;
    }

    fn render_pixel(&mut self, rendering: bool) {
        let x = self.dot - 1;
        let color = if rendering {
            self.compose_pixel(x)
        } else {
            0
        };
        let mut index = self.read_palette(color as u16) & 0x3F;
        if self.mask.contains(Mask::GRAYSCALE) {
            index &= 0x30;
        }
        self.framebuffer[self.scanline as usize * SCREEN_WIDTH + x as usize] = index;
    }

    /// Background/sprite priority mux. Returns a palette RAM offset.
    fn compose_pixel(&mut self, x: u16) -> u8 {
        let left_edge = x < 8;
        let mut background = self.background_pixel();
        if left_edge && !self.mask.contains(Mask::SHOW_BG_LEFT) {
            background = 0;
        }
        let mut sprite = self.sprite_pixel(x).filter(|_| self.mask.contains(Mask::SHOW_SPRITES));
        if left_edge && !self.mask.contains(Mask::SHOW_SPRITES_LEFT) {
            sprite = None;
        }

        let opaque_bg = background & 0x03 != 0;
        match sprite {
            None if opaque_bg => background,
            None => 0,
            Some((_, color)) if !opaque_bg => color | 0x10,
            Some((slot, color)) => {
                if self.sprites.indexes[slot] == 0 && x < 255 {
                    self.status.insert(Status::SPRITE_ZERO_HIT);
                }
                if self.sprites.priorities[slot] == 0 {
                    color | 0x10
                } else {
                    background
                }
            }
        }
    }

    fn background_pixel(&self) -> u8 {
        if !self.mask.contains(Mask::SHOW_BACKGROUND) {
            return 0;
        }
        let data = (self.tile_data >> 32) as u32 >> ((7 - self.x) * 4);
        (data & 0x0F) as u8
    }

    fn fetch_nametable_byte<B: PpuBus>(&mut self, bus: &mut B) {
        self.nametable_byte = self.read_vram(bus, self.v.tile_addr());
    }

    fn fetch_attribute_byte<B: PpuBus>(&mut self, bus: &mut B) {
        let byte = self.read_vram(bus, self.v.attribute_addr());
        self.attribute_byte = ((byte >> self.v.attribute_shift()) & 0x03) << 2;
    }

    /// `plane` is 0 for the low bit plane, 8 for the high one.
    fn fetch_tile_byte<B: PpuBus>(&mut self, bus: &mut B, plane: u16) {
        let addr = self.ctrl.background_table()
            + self.nametable_byte as u16 * 16
            + self.v.fine_y()
            + plane;
        let byte = bus.read_pattern(addr);
        if plane == 0 {
            self.low_tile_byte = byte;
        } else {
            self.high_tile_byte = byte;
        }
    }

    fn store_tile_data(&mut self) {
        let mut data = 0u32;
        for bit in (0..8).rev() {
            let p1 = (self.low_tile_byte >> bit) & 0x01;
            let p2 = ((self.high_tile_byte >> bit) & 0x01) << 1;
            data = data << 4 | (self.attribute_byte | p1 | p2) as u32;
        }
        self.tile_data |= data as u64;
    }
}

/// CIRAM offset of a nametable address under the board's mirroring.
fn nametable_offset<B: PpuBus>(bus: &B, addr: u16) -> usize {
    let relative = (addr - ppu_mem::NAMETABLE_BASE) % (4 * ppu_mem::NAMETABLE_SIZE);
    let table = relative / ppu_mem::NAMETABLE_SIZE;
    let page = bus.mirroring().page(table);
    (page * ppu_mem::NAMETABLE_SIZE + relative % ppu_mem::NAMETABLE_SIZE) as usize
}

/// `$3F10/$3F14/$3F18/$3F1C` alias the backdrop entries below them.
fn palette_index(addr: u16) -> usize {
    let index = addr as usize % PALETTE_RAM_SIZE;
    if index >= 16 && index % 4 == 0 {
        index - 16
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bus::mock::MockPpuBus, cartridge::header::Mirroring};

    const NTSC: Timing = Timing::NTSC;

    fn set_addr(ppu: &mut Ppu, bus: &mut MockPpuBus, addr: u16) {
        ppu.write_register(0x2006, (addr >> 8) as u8, bus);
        ppu.write_register(0x2006, addr as u8, bus);
    }

    fn run_dots(ppu: &mut Ppu, bus: &mut MockPpuBus, dots: usize) {
        for _ in 0..dots {
            ppu.tick(bus, &NTSC);
        }
    }

    /// Steps until the counters sit on `(scanline, dot)`.
    fn run_to(ppu: &mut Ppu, bus: &mut MockPpuBus, scanline: u16, dot: u16) {
        while (ppu.scanline, ppu.dot) != (scanline, dot) {
            ppu.tick(bus, &NTSC);
        }
    }

    #[test]
    fn data_reads_are_buffered_except_palette() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        set_addr(&mut ppu, &mut bus, 0x2000);
        ppu.write_register(0x2007, 0x11, &mut bus);
        ppu.write_register(0x2007, 0x22, &mut bus);
        set_addr(&mut ppu, &mut bus, 0x3F00);
        ppu.write_register(0x2007, 0x0F, &mut bus);

        set_addr(&mut ppu, &mut bus, 0x2000);
        let stale = ppu.read_register(0x2007, &mut bus);
        assert_eq!(ppu.read_register(0x2007, &mut bus), 0x11);
        assert_eq!(ppu.read_register(0x2007, &mut bus), 0x22);
        assert_ne!(stale, 0x11);

        set_addr(&mut ppu, &mut bus, 0x3F00);
        assert_eq!(ppu.read_register(0x2007, &mut bus) & 0x3F, 0x0F);
    }

    #[test]
    fn validate_rejects_fine_x_past_seven() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        ppu.write_register(0x2005, 0x07, &mut bus);
        assert_eq!(ppu.x, 7);
        assert_eq!(ppu.validate(), Ok(()));
        let corrupt = Ppu { x: 8, ..ppu };
        assert_eq!(corrupt.validate(), Err("fine X scroll"));
    }

    #[test]
    fn increment_32_walks_down_a_column() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        ppu.write_register(0x2000, Control::INCREMENT_32.bits(), &mut bus);
        set_addr(&mut ppu, &mut bus, 0x2000);
        ppu.write_register(0x2007, 1, &mut bus);
        ppu.write_register(0x2007, 2, &mut bus);
        assert_eq!(ppu.ciram[0], 1);
        assert_eq!(ppu.ciram[32], 2);
    }

    #[test]
    fn status_read_clears_vblank_and_write_toggle() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        run_to(&mut ppu, &mut bus, 241, 1);
        ppu.write_register(0x2005, 0x10, &mut bus);
        assert!(ppu.w);

        let status = ppu.read_register(0x2002, &mut bus);
        assert_eq!(status & 0x80, 0x80);
        assert!(!ppu.w);
        assert_eq!(ppu.read_register(0x2002, &mut bus) & 0x80, 0);
    }

    #[test]
    fn status_low_bits_come_from_the_io_latch() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        ppu.write_register(0x2001, 0x1F, &mut bus);
        assert_eq!(ppu.read_register(0x2002, &mut bus) & 0x1F, 0x1F);
    }

    #[test]
    fn nmi_edge_at_vblank_only_when_enabled() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        run_to(&mut ppu, &mut bus, 241, 1);
        assert!(!ppu.take_nmi());

        // Enabling NMI inside vblank raises the edge immediately.
        ppu.write_register(0x2000, 0x80, &mut bus);
        assert!(ppu.take_nmi());
        assert!(!ppu.take_nmi());

        run_to(&mut ppu, &mut bus, 241, 0);
        run_dots(&mut ppu, &mut bus, 1);
        assert!(ppu.take_nmi());
        assert!(ppu.take_frame());
    }

    #[test]
    fn pre_render_line_clears_flags() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        run_to(&mut ppu, &mut bus, 241, 1);
        ppu.status.insert(Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW);
        run_to(&mut ppu, &mut bus, 261, 1);
        assert_eq!(ppu.status_bits(), 0);
    }

    #[test]
    fn odd_frames_are_one_dot_shorter_while_rendering() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        let full = 262 * 341;

        run_to(&mut ppu, &mut bus, 0, 0);
        let start = ppu.frame;
        run_dots(&mut ppu, &mut bus, full);
        assert_eq!((ppu.frame, ppu.scanline, ppu.dot), (start + 1, 0, 0));

        ppu.write_register(0x2001, Mask::SHOW_BACKGROUND.bits(), &mut bus);
        let (mut dots, frame) = (0, ppu.frame);
        while ppu.frame == frame {
            ppu.tick(&mut bus, &NTSC);
            dots += 1;
        }
        let first = dots;
        let (mut dots, frame) = (0, ppu.frame);
        while ppu.frame == frame {
            ppu.tick(&mut bus, &NTSC);
            dots += 1;
        }
        assert_eq!(first + dots, 2 * full - 1);
    }

    #[test]
    fn palette_mirrors_backdrop_entries() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        set_addr(&mut ppu, &mut bus, 0x3F10);
        ppu.write_register(0x2007, 0x2A, &mut bus);
        assert_eq!(ppu.palette[0], 0x2A);
        set_addr(&mut ppu, &mut bus, 0x3F11);
        ppu.write_register(0x2007, 0x15, &mut bus);
        assert_eq!(ppu.palette[0x11], 0x15);
    }

    #[test]
    fn nametable_mirroring_follows_the_board() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus {
            mirroring: Mirroring::Vertical,
            ..MockPpuBus::default()
        };
        set_addr(&mut ppu, &mut bus, 0x2805);
        ppu.write_register(0x2007, 0x77, &mut bus);
        assert_eq!(ppu.ciram[0x005], 0x77);

        bus.mirroring = Mirroring::Horizontal;
        set_addr(&mut ppu, &mut bus, 0x2405);
        ppu.write_register(0x2007, 0x66, &mut bus);
        assert_eq!(ppu.ciram[0x005], 0x66);
    }

    #[test]
    fn renders_background_tile() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        // Tile 1: every row has the plane 0 bits set, colour 1.
        for row in 0..8 {
            bus.chr[16 + row] = 0xFF;
        }
        set_addr(&mut ppu, &mut bus, 0x2000);
        ppu.write_register(0x2007, 0x01, &mut bus);
        set_addr(&mut ppu, &mut bus, 0x3F00);
        ppu.write_register(0x2007, 0x0F, &mut bus);
        ppu.write_register(0x2007, 0x21, &mut bus);
        set_addr(&mut ppu, &mut bus, 0x0000);
        ppu.write_register(0x2001, (Mask::SHOW_BACKGROUND | Mask::SHOW_BG_LEFT).bits(), &mut bus);

        run_to(&mut ppu, &mut bus, 261, 0);
        run_to(&mut ppu, &mut bus, 1, 0);

        let row = &ppu.frame_buffer()[..16];
        assert!(row[..8].iter().all(|&p| p == 0x21), "{row:?}");
        assert!(row[8..].iter().all(|&p| p == 0x0F), "{row:?}");
    }

    #[test]
    fn scanline_hook_fires_once_per_rendered_line() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        ppu.write_register(0x2001, Mask::SHOW_SPRITES.bits(), &mut bus);
        run_to(&mut ppu, &mut bus, 0, 0);
        bus.scanlines = 0;
        run_dots(&mut ppu, &mut bus, 262 * 341 - 1);
        assert_eq!(bus.scanlines, 241);
    }

    #[test]
    fn sprite_zero_hit_on_overlap() {
        let mut ppu = Ppu::new();
        let mut bus = MockPpuBus::default();
        for row in 0..8 {
            bus.chr[16 + row] = 0xFF;
        }
        // Background: tile 1 everywhere in the first row of tiles.
        set_addr(&mut ppu, &mut bus, 0x2000);
        for _ in 0..32 {
            ppu.write_register(0x2007, 0x01, &mut bus);
        }
        // Sprite 0 at (20, 2) using tile 1.
        ppu.oam[..4].copy_from_slice(&[2, 1, 0, 20]);
        set_addr(&mut ppu, &mut bus, 0x0000);
        ppu.write_register(0x2001, 0x1E, &mut bus);

        run_to(&mut ppu, &mut bus, 0, 0);
        assert_eq!(ppu.status_bits() & 0x40, 0);
        run_to(&mut ppu, &mut bus, 10, 0);
        assert_eq!(ppu.status_bits() & 0x40, 0x40);
    }
}
