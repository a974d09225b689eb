//! Delta modulation channel.
//!
//! Sample bytes are fetched from CPU space as soon as the one-byte buffer
//! empties. Each fetch steals four CPU cycles; the stall is reported back to
//! the caller which charges it to the CPU.

use serde::{Deserialize, Serialize};

use super::tables::{
    DMC_RATE_NTSC, DMC_RATE_PAL, DMC_SAMPLE_ADDR_STRIDE, DMC_SAMPLE_BASE, DMC_SAMPLE_LEN_STRIDE,
};

pub(super) const FETCH_STALL_CYCLES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(super) struct Dmc {
    irq_enabled: bool,
    loop_flag: bool,
    rate_index: u8,
    timer: u16,
    output_level: u8,
    sample_address: u16,
    sample_length: u16,
    current_address: u16,
    bytes_remaining: u16,
    sample_buffer: Option<u8>,
    shift_register: u8,
    bits_remaining: u8,
    silence: bool,
    interrupt: bool,
}

impl Default for Dmc {
    fn default() -> Self {
        Self {
            irq_enabled: false,
            loop_flag: false,
            rate_index: 0,
            timer: 0,
            output_level: 0,
            sample_address: DMC_SAMPLE_BASE,
            sample_length: 1,
            current_address: DMC_SAMPLE_BASE,
            bytes_remaining: 0,
            sample_buffer: None,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
            interrupt: false,
        }
    }
}

impl Dmc {
    pub(super) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => {
                self.irq_enabled = value & 0x80 != 0;
                self.loop_flag = value & 0x40 != 0;
                self.rate_index = value & 0x0F;
                if !self.irq_enabled {
                    self.interrupt = false;
                }
            }
            1 => self.output_level = value & 0x7F,
            2 => self.sample_address = DMC_SAMPLE_BASE + value as u16 * DMC_SAMPLE_ADDR_STRIDE,
            _ => self.sample_length = value as u16 * DMC_SAMPLE_LEN_STRIDE + 1,
        }
    }

    /// `$4015` bit 4. Always acknowledges the DMC interrupt.
    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.interrupt = false;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart();
        }
    }

    fn restart(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    pub(super) fn active(&self) -> bool {
        self.bytes_remaining > 0
    }

    pub(super) fn interrupt(&self) -> bool {
        self.interrupt
    }

    /// One CPU cycle. Returns the CPU cycles stolen by a sample fetch.
    pub(super) fn clock<F>(&mut self, reader: &mut F, pal: bool) -> u32
    where
        F: FnMut(u16) -> u8,
    {
        let mut stall = 0;
        if self.sample_buffer.is_none() && self.bytes_remaining > 0 {
            self.sample_buffer = Some(reader(self.current_address));
            // Address wraps from $FFFF to $8000.
            self.current_address = self.current_address.wrapping_add(1) | 0x8000;
            self.bytes_remaining -= 1;
            if self.bytes_remaining == 0 {
                if self.loop_flag {
                    self.restart();
                } else if self.irq_enabled {
                    self.interrupt = true;
                }
            }
            stall = FETCH_STALL_CYCLES;
        }

        if self.timer == 0 {
            let table = if pal { &DMC_RATE_PAL } else { &DMC_RATE_NTSC };
            self.timer = table[self.rate_index as usize] - 1;
            self.clock_output();
        } else {
            self.timer -= 1;
        }
        stall
    }

    fn clock_output(&mut self) {
        if !self.silence {
            if self.shift_register & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }
        self.shift_register >>= 1;
        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            match self.sample_buffer.take() {
                Some(byte) => {
                    self.shift_register = byte;
                    self.silence = false;
                }
                None => self.silence = true,
            }
        }
    }

    pub(super) fn output(&self) -> u8 {
        self.output_level
    }

    pub(super) fn validate(&self) -> Result<(), &'static str> {
        if self.rate_index as usize >= DMC_RATE_NTSC.len() {
            return Err("DMC rate index");
        }
        if !(1..=8).contains(&self.bits_remaining) {
            return Err("DMC bits remaining");
        }
        if self.output_level > 0x7F {
            return Err("DMC output level");
        }
        Ok(())
    }
}
