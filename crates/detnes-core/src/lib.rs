//! Deterministic NES emulation core.
//!
//! [`Console`] owns every unit of the machine and advances them in lock-step
//! one CPU instruction at a time. Its state can be split into a static blob
//! (what the cartridge determines) and a dynamic blob (what running the
//! machine changes); a console rebuilt from the two continues exactly like
//! the one that produced them.

use std::{borrow::Cow, path::Path};

use tracing::{debug, info};

use crate::{
    apu::Apu,
    audio::AudioOutput,
    bus::{Bus, ChrBus, CpuBus},
    cartridge::{Cartridge, Mapper},
    cpu::Cpu,
    error::Blob,
    memory::cpu as cpu_mem,
    ppu::{Ppu, palette},
    state::{DYNAMIC_MAGIC, DynamicState, DynamicStateRef, STATIC_MAGIC, StaticState},
};

pub mod apu;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod ppu;
pub mod state;

pub use config::{ConsoleConfig, Region, Timing};
pub use controller::{Button, Controller};
pub use error::{Error, LoadError, SerializationError};

/// OAM DMA halts the CPU for 513 cycles, plus one to align on odd cycles.
const OAM_DMA_CYCLES: u32 = 513;
const OAM_DMA_LEN: usize = 256;
const RGBA_FRAME_LEN: usize = ppu::FRAME_PIXELS * 4;

/// Borrows the fields behind the CPU bus, leaving `cpu` free.
macro_rules! bus_parts {
    ($console:expr) => {
        BusParts {
            ram: &mut $console.ram,
            ppu: &mut $console.ppu,
            apu: &mut $console.apu,
            cartridge: &mut $console.cartridge,
            mapper: &mut $console.mapper,
            controllers: &mut $console.controllers,
            oam_dma: &mut $console.oam_dma,
        }
    };
}

#[derive(Debug)]
pub struct Console {
    cpu: Cpu,
    ppu: Ppu,
    apu: Apu,
    cartridge: Cartridge,
    mapper: Mapper,
    controllers: [Controller; 2],
    ram: [u8; cpu_mem::INTERNAL_RAM_SIZE],
    /// Page latched by `$4014`, copied after the writing instruction.
    oam_dma: Option<u8>,
    /// Fractional PPU dots owed, in units of `1 / timing.ppu_dots_den`.
    dot_carry: u32,
    region: Region,
    timing: Timing,

    config: ConsoleConfig,
    audio: AudioOutput,
    rgba: Vec<u8>,
}

impl Console {
    /// Powers on a console with the cartridge in `bytes`, an iNES/NES 2.0
    /// image.
    pub fn from_rom_bytes(bytes: &[u8], config: ConsoleConfig) -> Result<Self, LoadError> {
        let cartridge = cartridge::load_cartridge(bytes)?;
        Self::from_cartridge(cartridge, config)
    }

    pub fn from_rom_file<P>(path: P, config: ConsoleConfig) -> Result<Self, LoadError>
    where
        P: AsRef<Path>,
    {
        let cartridge = cartridge::load_cartridge_from_file(path)?;
        Self::from_cartridge(cartridge, config)
    }

    pub fn from_cartridge(cartridge: Cartridge, config: ConsoleConfig) -> Result<Self, LoadError> {
        let mapper = Mapper::new(&cartridge)?;
        let region = config.region.resolve(cartridge.tv_system());
        let mut console = Self::assemble(cartridge, mapper, region, config);
        let mut parts = bus_parts!(console);
        console.cpu.power_on(&mut parts.bus());
        info!(
            mapper = console.mapper.id(),
            %region,
            pc = console.cpu.pc(),
            "console powered on"
        );
        Ok(console)
    }

    /// Rebuilds a console from a static/dynamic blob pair with the headless
    /// profile: no RGBA conversion, samples only when `audio_enabled`.
    pub fn new_headless(
        static_bytes: &[u8],
        dynamic_bytes: &[u8],
        audio_enabled: bool,
    ) -> Result<Self, Error> {
        Self::from_state(
            static_bytes,
            dynamic_bytes,
            ConsoleConfig::headless(audio_enabled),
        )
    }

    /// Rebuilds a console from a static/dynamic blob pair.
    ///
    /// The cartridge, board and every unit are freshly built from the static
    /// blob and then overwritten with the dynamic one. `config.region` is
    /// ignored; the static blob carries the region the state was recorded
    /// with.
    pub fn from_state(
        static_bytes: &[u8],
        dynamic_bytes: &[u8],
        config: ConsoleConfig,
    ) -> Result<Self, Error> {
        let state: StaticState = state::decode(Blob::Static, static_bytes)?;
        state.validate()?;
        let cartridge = Cartridge::new(
            state.board_info(),
            state.prg_rom.into_owned().into_boxed_slice(),
            state.chr_rom.into_owned().into_boxed_slice(),
        );
        let mapper = Mapper::new(&cartridge)?;
        let mut console = Self::assemble(cartridge, mapper, state.region, config);
        console.restore_dynamic(dynamic_bytes)?;
        debug!(
            mapper = console.mapper.id(),
            region = %console.region,
            pc = console.cpu.pc(),
            "console rebuilt from state"
        );
        Ok(console)
    }

    fn assemble(cartridge: Cartridge, mapper: Mapper, region: Region, config: ConsoleConfig) -> Self {
        let timing = region.timing();
        Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            apu: Apu::new(timing.pal_apu),
            cartridge,
            mapper,
            controllers: [Controller::new(); 2],
            ram: [0; cpu_mem::INTERNAL_RAM_SIZE],
            oam_dma: None,
            dot_carry: 0,
            region,
            timing,
            config,
            audio: AudioOutput::new(config.sample_rate, timing.cpu_hz),
            rgba: vec![0; RGBA_FRAME_LEN],
        }
    }

    /// Executes one instruction (or interrupt entry) and advances the PPU and
    /// APU by the CPU cycles it took, including DMA stalls. Returns those CPU
    /// cycles.
    pub fn step(&mut self) -> u32 {
        let mut cycles = {
            let mut parts = bus_parts!(self);
            self.cpu.step(&mut parts.bus())
        };

        if let Some(page) = self.oam_dma.take() {
            let stall = self.oam_dma_copy(page);
            self.cpu.stall(stall);
            cycles += stall;
        }

        let mut pending = cycles;
        while pending > 0 {
            pending -= 1;
            let stall = self.clock_cycle();
            if stall > 0 {
                self.cpu.stall(stall);
                cycles += stall;
                pending += stall;
            }
        }
        cycles
    }

    /// Steps until at least `seconds` worth of CPU cycles have run and
    /// returns the cycles executed. Overshoot is at most one step and is not
    /// carried into the next call.
    pub fn step_seconds(&mut self, seconds: f64) -> u64 {
        let target = self.timing.cycles_for(seconds);
        let mut executed = 0;
        while executed < target {
            executed += self.step() as u64;
        }
        executed
    }

    /// Steps until the PPU starts a new frame. Returns the CPU cycles run.
    pub fn step_frame(&mut self) -> u64 {
        let frame = self.ppu.frame();
        let mut executed = 0;
        while self.ppu.frame() == frame {
            executed += self.step() as u64;
        }
        executed
    }

    /// Reset button. RAM, cartridge RAM and battery RAM survive.
    pub fn reset(&mut self) {
        {
            let mut parts = bus_parts!(self);
            self.cpu.reset(&mut parts.bus());
        }
        self.ppu.reset();
        self.apu.reset();
        self.oam_dma = None;
        info!(pc = self.cpu.pc(), "console reset");
    }

    /// One CPU cycle of PPU and APU work. Returns DMC stall cycles.
    fn clock_cycle(&mut self) -> u32 {
        self.dot_carry += self.timing.ppu_dots_num;
        while self.dot_carry >= self.timing.ppu_dots_den {
            self.dot_carry -= self.timing.ppu_dots_den;
            let mut chr = ChrBus::new(&mut self.cartridge, &mut self.mapper);
            self.ppu.tick(&mut chr, &self.timing);
        }
        if self.ppu.take_nmi() {
            self.cpu.trigger_nmi();
        }
        if self.ppu.take_frame() && self.config.render_pixels {
            palette::indices_to_rgba(self.ppu.frame_buffer(), &mut self.rgba);
        }

        let (cartridge, mapper) = (&self.cartridge, &self.mapper);
        let stall = self.apu.clock(|addr| mapper.cpu_read(cartridge, addr));
        if self.config.audio_enabled {
            let apu = &self.apu;
            self.audio.clock(|| apu.levels());
        }
        stall
    }

    /// Copies a page into OAM through the CPU bus and returns the stall.
    fn oam_dma_copy(&mut self, page: u8) -> u32 {
        let mut data = [0u8; OAM_DMA_LEN];
        {
            let mut parts = bus_parts!(self);
            let mut bus = parts.bus();
            let base = (page as u16) << 8;
            for (offset, byte) in data.iter_mut().enumerate() {
                *byte = bus.read(base | offset as u16);
            }
        }
        for byte in data {
            self.ppu.write_oam(byte);
        }
        OAM_DMA_CYCLES + (self.cpu.cycles() % 2) as u32
    }

    pub fn serialize_static(&self) -> Result<Vec<u8>, SerializationError> {
        let info = self.cartridge.info();
        let state = StaticState {
            mapper_id: info.mapper_id,
            submapper: info.submapper,
            mirroring: info.mirroring,
            battery: info.battery,
            tv_system: info.tv_system,
            region: self.region,
            prg_ram_size: info.prg_ram_size as u32,
            chr_ram_size: info.chr_ram_size as u32,
            prg_rom: Cow::Borrowed(self.cartridge.prg_rom()),
            chr_rom: Cow::Borrowed(self.cartridge.chr().rom()),
        };
        state::encode(STATIC_MAGIC, &state)
    }

    pub fn serialize_dynamic(&self) -> Result<Vec<u8>, SerializationError> {
        let state = DynamicStateRef {
            cpu: &self.cpu,
            ram: &self.ram,
            ppu: &self.ppu,
            apu: &self.apu,
            mapper: &self.mapper,
            prg_ram: self.cartridge.prg_ram(),
            chr_ram: self.cartridge.chr().ram(),
            controllers: &self.controllers,
            dot_carry: self.dot_carry,
            oam_dma: self.oam_dma,
        };
        state::encode(DYNAMIC_MAGIC, &state)
    }

    /// Replaces the running state with a dynamic blob recorded on the same
    /// cartridge. Nothing is modified unless the whole blob is valid.
    pub fn restore_dynamic(&mut self, bytes: &[u8]) -> Result<(), SerializationError> {
        let state: DynamicState = state::decode(Blob::Dynamic, bytes)?;
        let corrupt = |reason| SerializationError::Corrupt {
            blob: Blob::Dynamic,
            reason,
        };

        let mut mapper = self.mapper.clone();
        mapper.restore(state.mapper)?;
        let ram: [u8; cpu_mem::INTERNAL_RAM_SIZE] = state
            .ram
            .as_slice()
            .try_into()
            .map_err(|_| corrupt("RAM size"))?;
        if state.prg_ram.len() != self.cartridge.prg_ram().len() {
            return Err(corrupt("PRG RAM size"));
        }
        if state.chr_ram.len() != self.cartridge.chr().ram().len() {
            return Err(corrupt("CHR RAM size"));
        }
        state.ppu.validate().map_err(corrupt)?;
        if state.apu.pal() != self.timing.pal_apu {
            return Err(corrupt("APU region"));
        }
        state.apu.validate().map_err(corrupt)?;
        if state.ppu.scanline() >= self.timing.scanlines
            || state.ppu.dot() >= ppu::DOTS_PER_SCANLINE
        {
            return Err(corrupt("PPU position"));
        }
        if state.dot_carry >= self.timing.ppu_dots_den {
            return Err(corrupt("PPU dot carry"));
        }

        self.cpu = state.cpu;
        self.ram = ram;
        self.ppu = state.ppu;
        self.apu = state.apu;
        self.mapper = mapper;
        self.cartridge.prg_ram_mut().copy_from_slice(&state.prg_ram);
        if let Some(chr_ram) = self.cartridge.chr_ram_mut() {
            chr_ram.copy_from_slice(&state.chr_ram);
        }
        self.controllers = state.controllers;
        self.dot_carry = state.dot_carry;
        self.oam_dma = state.oam_dma;
        Ok(())
    }

    /// Palette indices of the framebuffer, row-major 256x240.
    pub fn buffer(&self) -> &[u8] {
        self.ppu.frame_buffer()
    }

    /// RGBA8888 picture. With `render_pixels` it is the image captured at the
    /// last vertical blank, otherwise it is converted now.
    pub fn rgba_frame(&mut self) -> &[u8] {
        if !self.config.render_pixels {
            palette::indices_to_rgba(self.ppu.frame_buffer(), &mut self.rgba);
        }
        &self.rgba
    }

    pub fn controller1_mut(&mut self) -> &mut Controller {
        &mut self.controllers[0]
    }

    pub fn controller2_mut(&mut self) -> &mut Controller {
        &mut self.controllers[1]
    }

    /// Pad on `port` 0 or 1; other ports wrap.
    pub fn controller_mut(&mut self, port: usize) -> &mut Controller {
        &mut self.controllers[port & 1]
    }

    pub fn controllers(&self) -> &[Controller; 2] {
        &self.controllers
    }

    /// Drains queued audio samples. Always empty with audio disabled.
    pub fn take_samples(&mut self) -> Vec<f32> {
        self.audio.take()
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.config.audio_enabled = enabled;
    }

    pub fn set_render_pixels(&mut self, enabled: bool) {
        self.config.render_pixels = enabled;
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.cartridge.battery_ram()
    }

    pub fn load_battery_ram(&mut self, data: &[u8]) {
        self.cartridge.load_battery_ram(data);
    }
}

/// Disjoint borrows of everything the CPU bus routes to.
struct BusParts<'a> {
    ram: &'a mut [u8; cpu_mem::INTERNAL_RAM_SIZE],
    ppu: &'a mut Ppu,
    apu: &'a mut Apu,
    cartridge: &'a mut Cartridge,
    mapper: &'a mut Mapper,
    controllers: &'a mut [Controller; 2],
    oam_dma: &'a mut Option<u8>,
}

impl BusParts<'_> {
    fn bus(&mut self) -> CpuBus<'_> {
        CpuBus::new(
            self.ram,
            self.ppu,
            self.apu,
            self.cartridge,
            self.mapper,
            self.controllers,
            self.oam_dma,
        )
    }
}
