//! Button timelines replayed against the headless driver.
//!
//! Text form, one record per line in the manner of FM2 movie input logs:
//!
//! ```text
//! # hold Start for 2 ticks, then walk right with A held on pad 1
//! |2|....T...|........|
//! |30|R......A||
//! |10|........|
//! ```
//!
//! The first field is the tick count, then one field per pad in `RLDUTSBA`
//! order (`Right Left Down Up sTart Select B A`). Any character other than
//! `.` or a space marks the button as pressed. An empty pad field leaves that
//! pad unchanged; a field of dots releases everything. Blank lines and lines
//! starting with `#` are ignored.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use detnes_core::Button;

use crate::error::SupportError;

pub const PORTS: usize = 2;

/// Button letters in record order, most significant first.
const RECORD_ORDER: [(char, Button); 8] = [
    ('R', Button::Right),
    ('L', Button::Left),
    ('D', Button::Down),
    ('U', Button::Up),
    ('T', Button::Start),
    ('S', Button::Select),
    ('B', Button::B),
    ('A', Button::A),
];

pub type Buttons = [bool; 8];

pub const RELEASED: Buttons = [false; 8];

/// Holds `buttons` on `port` for `ticks` ticks.
///
/// Zero ticks only latches the buttons, which lets several pads change
/// together before the timeline advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub port: usize,
    pub buttons: Buttons,
    pub ticks: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    actions: Vec<Action>,
}

impl Activity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) -> &mut Self {
        self.actions.push(action);
        self
    }

    pub fn hold(&mut self, port: usize, buttons: &[Button], ticks: u64) -> &mut Self {
        let mut pressed = RELEASED;
        for &button in buttons {
            pressed[button as usize] = true;
        }
        self.push(Action {
            port,
            buttons: pressed,
            ticks,
        })
    }

    pub fn release(&mut self, port: usize, ticks: u64) -> &mut Self {
        self.push(Action {
            port,
            buttons: RELEASED,
            ticks,
        })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn total_ticks(&self) -> u64 {
        self.actions.iter().map(|action| action.ticks).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, SupportError> {
        let mut activity = Activity::new();
        for (index, line) in reader.lines().enumerate() {
            parse_record(&mut activity, index + 1, &line?)?;
        }
        Ok(activity)
    }
}

impl FromStr for Activity {
    type Err = SupportError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_reader(text.as_bytes())
    }
}

fn parse_record(activity: &mut Activity, line: usize, text: &str) -> Result<(), SupportError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(());
    }
    let invalid = |reason: String| SupportError::InvalidActivity { line, reason };

    let body = text
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
        .ok_or_else(|| invalid("record must start and end with '|'".to_string()))?;
    let mut fields = body.split('|');
    let ticks_field = fields.next().unwrap_or_default().trim();
    let ticks: u64 = ticks_field
        .parse()
        .map_err(|_| invalid(format!("bad tick count {ticks_field:?}")))?;

    let mut pads = Vec::with_capacity(PORTS);
    for (port, field) in fields.enumerate() {
        if port >= PORTS {
            return Err(invalid(format!("at most {PORTS} pad fields")));
        }
        if field.is_empty() {
            continue;
        }
        pads.push((port, parse_pad(field).map_err(invalid)?));
    }

    match pads.split_last() {
        Some((&(last_port, last_buttons), rest)) => {
            for &(port, buttons) in rest {
                activity.push(Action {
                    port,
                    buttons,
                    ticks: 0,
                });
            }
            activity.push(Action {
                port: last_port,
                buttons: last_buttons,
                ticks,
            });
        }
        // Without a pad field there is no port to hold the ticks on.
        None if ticks > 0 => {
            return Err(invalid("a waiting record needs at least one pad field".to_string()));
        }
        None => {}
    }
    Ok(())
}

fn parse_pad(field: &str) -> Result<Buttons, String> {
    let chars: Vec<char> = field.chars().collect();
    if chars.len() != RECORD_ORDER.len() {
        return Err(format!("pad field {field:?} must have 8 characters"));
    }
    let mut buttons = RELEASED;
    for (&c, &(_, button)) in chars.iter().zip(RECORD_ORDER.iter()) {
        buttons[button as usize] = c != '.' && c != ' ';
    }
    Ok(buttons)
}

fn format_pad(buttons: &Buttons) -> String {
    RECORD_ORDER
        .iter()
        .map(|&(letter, button)| if buttons[button as usize] { letter } else { '.' })
        .collect()
}

/// Writes one record per action, so `parse(display(a)) == a`.
impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            let pad = format_pad(&action.buttons);
            if action.port == 0 {
                writeln!(f, "|{}|{}||", action.ticks, pad)?;
            } else {
                writeln!(f, "|{}||{}|", action.ticks, pad)?;
            }
        }
        Ok(())
    }
}
