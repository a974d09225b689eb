//! Audio processing unit.
//!
//! Two pulse channels, a triangle, a noise generator and the delta modulation
//! channel, all clocked once per CPU cycle, plus the frame sequencer that
//! drives their envelopes, sweeps and length counters. Channel state is
//! advanced identically whether or not the host wants samples; mixing lives in
//! [`crate::audio`] and only reads [`Apu::levels`].

use serde::{Deserialize, Serialize};

mod dmc;
mod envelope;
mod frame_counter;
mod length_counter;
mod noise;
mod pulse;
mod tables;
mod triangle;

use dmc::Dmc;
use frame_counter::{FrameCounter, FrameTick};
use noise::Noise;
use pulse::{Pulse, PulseChannel};
use triangle::Triangle;

use crate::memory::cpu as cpu_mem;

/// Instantaneous channel outputs, the input of the mixer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLevels {
    pub pulse1: u8,
    pub pulse2: u8,
    pub triangle: u8,
    pub noise: u8,
    pub dmc: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apu {
    pulse: [Pulse; 2],
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame_counter: FrameCounter,
    /// PAL period tables for noise, DMC and the sequencer.
    pal: bool,
}

impl Apu {
    pub fn new(pal: bool) -> Self {
        Self {
            pulse: [
                Pulse::new(PulseChannel::Pulse1),
                Pulse::new(PulseChannel::Pulse2),
            ],
            triangle: Triangle::default(),
            noise: Noise::default(),
            dmc: Dmc::default(),
            frame_counter: FrameCounter::default(),
            pal,
        }
    }

    /// Soft reset: behaves as if `$4015` was cleared and the last `$4017`
    /// value written again.
    pub fn reset(&mut self) {
        self.write_status(0x00);
        let tick = self.frame_counter.reset();
        self.apply(tick);
    }

    /// CPU write to `$4000-$4013`, `$4015` or `$4017`. Other addresses are
    /// ignored.
    pub fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000..=0x4003 => self.pulse[0].write(addr, value),
            0x4004..=0x4007 => self.pulse[1].write(addr, value),
            0x4008..=0x400B => self.triangle.write(addr, value),
            0x400C..=0x400F => self.noise.write(addr, value),
            0x4010..=cpu_mem::APU_REGISTER_END => self.dmc.write(addr, value),
            cpu_mem::APU_STATUS => self.write_status(value),
            cpu_mem::CONTROLLER_PORT_2 => {
                let tick = self.frame_counter.write(value);
                self.apply(tick);
            }
            _ => {}
        }
    }

    fn write_status(&mut self, value: u8) {
        self.pulse[0].set_enabled(value & 0x01 != 0);
        self.pulse[1].set_enabled(value & 0x02 != 0);
        self.triangle.set_enabled(value & 0x04 != 0);
        self.noise.set_enabled(value & 0x08 != 0);
        self.dmc.set_enabled(value & 0x10 != 0);
    }

    /// `$4015` read. Acknowledges the frame interrupt but not the DMC one.
    pub fn read_status(&mut self) -> u8 {
        let value = self.peek_status();
        self.frame_counter.acknowledge();
        value
    }

    /// `$4015` without the read side effect.
    pub fn peek_status(&self) -> u8 {
        let mut value = 0;
        value |= self.pulse[0].length_active() as u8;
        value |= (self.pulse[1].length_active() as u8) << 1;
        value |= (self.triangle.length_active() as u8) << 2;
        value |= (self.noise.length_active() as u8) << 3;
        value |= (self.dmc.active() as u8) << 4;
        value |= (self.frame_counter.interrupt() as u8) << 6;
        value |= (self.dmc.interrupt() as u8) << 7;
        value
    }

    pub fn irq_pending(&self) -> bool {
        self.frame_counter.interrupt() || self.dmc.interrupt()
    }

    /// Advances one CPU cycle. `reader` serves DMC sample fetches from CPU
    /// space; the return value is the number of CPU cycles those fetches
    /// stole.
    pub fn clock<F>(&mut self, mut reader: F) -> u32
    where
        F: FnMut(u16) -> u8,
    {
        let tick = self.frame_counter.clock(self.pal);
        self.apply(tick);

        for pulse in &mut self.pulse {
            pulse.clock_timer();
        }
        self.triangle.clock_timer();
        self.noise.clock_timer(self.pal);
        self.dmc.clock(&mut reader, self.pal)
    }

    fn apply(&mut self, tick: FrameTick) {
        if tick.quarter {
            for pulse in &mut self.pulse {
                pulse.clock_quarter();
            }
            self.triangle.clock_quarter();
            self.noise.clock_quarter();
        }
        if tick.half {
            for pulse in &mut self.pulse {
                pulse.clock_half();
            }
            self.triangle.clock_half();
            self.noise.clock_half();
        }
    }

    pub(crate) fn pal(&self) -> bool {
        self.pal
    }

    /// Rejects channel state no register write sequence can produce.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        for pulse in &self.pulse {
            pulse.validate()?;
        }
        self.triangle.validate()?;
        self.noise.validate()?;
        self.dmc.validate()?;
        self.frame_counter.validate(self.pal)
    }

    pub fn levels(&self) -> ChannelLevels {
        ChannelLevels {
            pulse1: self.pulse[0].output(),
            pulse2: self.pulse[1].output(),
            triangle: self.triangle.output(),
            noise: self.noise.output(),
            dmc: self.dmc.output(),
        }
    }
}
