//! Address map of the console.
//!
//! Keeping the layout in one place keeps magic numbers out of the units and
//! makes the routing code in [`crate::bus`] read like the hardware docs.

/// CPU address space.
pub mod cpu {
    pub const STACK_PAGE_START: u16 = 0x0100;

    pub const NMI_VECTOR: u16 = 0xFFFA;
    pub const RESET_VECTOR: u16 = 0xFFFC;
    pub const IRQ_VECTOR: u16 = 0xFFFE;

    /// 2 KiB of work RAM, mirrored through `$1FFF`.
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    pub const INTERNAL_RAM_MASK: u16 = (INTERNAL_RAM_SIZE as u16) - 1;
    pub const INTERNAL_RAM_END: u16 = 0x1FFF;

    /// PPU registers, mirrored every 8 bytes through `$3FFF`.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    pub const APU_REGISTER_BASE: u16 = 0x4000;
    pub const APU_REGISTER_END: u16 = 0x4013;
    pub const OAM_DMA: u16 = 0x4014;
    pub const APU_STATUS: u16 = 0x4015;
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Reads poll the second pad, writes program the APU frame counter.
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    pub const PRG_RAM_START: u16 = 0x6000;
    pub const PRG_ROM_START: u16 = 0x8000;
}

/// PPU address space.
pub mod ppu {
    pub const PATTERN_END: u16 = 0x1FFF;
    pub const NAMETABLE_BASE: u16 = 0x2000;
    pub const NAMETABLE_SIZE: u16 = 0x0400;
    pub const NAMETABLE_END: u16 = 0x3EFF;
    /// Nametable RAM sized for four-screen boards; two-table layouts use the
    /// first half only.
    pub const NAMETABLE_RAM_SIZE: usize = 0x1000;

    pub const PALETTE_BASE: u16 = 0x3F00;
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    pub const VRAM_MASK: u16 = 0x3FFF;

    pub const OAM_SIZE: usize = 0x100;
    pub const SECONDARY_OAM_SIZE: usize = 0x20;

    pub const SCREEN_WIDTH: usize = 256;
    pub const SCREEN_HEIGHT: usize = 240;

    /// CPU-visible PPU registers at `$2000 + (addr & 7)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        Control,
        Mask,
        Status,
        OamAddr,
        OamData,
        Scroll,
        Addr,
        Data,
    }

    impl Register {
        pub fn from_cpu_addr(addr: u16) -> Self {
            match addr & 0x0007 {
                0 => Register::Control,
                1 => Register::Mask,
                2 => Register::Status,
                3 => Register::OamAddr,
                4 => Register::OamData,
                5 => Register::Scroll,
                6 => Register::Addr,
                _ => Register::Data,
            }
        }
    }
}
