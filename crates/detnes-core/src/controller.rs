//! Standard 8-button joypad read through `$4016/$4017`.

use serde::{Deserialize, Serialize};

/// Buttons in the order the pad shifts them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Upper data lines float to the last value on the bus, which for
/// `LDA $4016` is the `$40` high address byte.
const OPEN_BUS_BITS: u8 = 0x40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    buttons: u8,
    strobe: bool,
    index: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all eight button states at once, A first.
    pub fn set_buttons(&mut self, buttons: [bool; 8]) {
        self.buttons = buttons
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, &pressed)| acc | (pressed as u8) << bit);
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Raw button byte, bit `n` is [`Button`] `n`.
    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    pub fn write_strobe(&mut self, data: u8) {
        self.strobe = data & 0x01 != 0;
        if self.strobe {
            self.index = 0;
        }
    }

    /// Shifts out the next button. After eight reads the pad reports 1.
    pub fn read(&mut self) -> u8 {
        let bit = if self.index < 8 {
            (self.buttons >> self.index) & 0x01
        } else {
            0x01
        };
        if self.strobe {
            self.index = 0;
        } else if self.index < 8 {
            self.index += 1;
        }
        bit | OPEN_BUS_BITS
    }
}
