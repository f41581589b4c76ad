use std::time::{Duration, Instant};

use chip::{
    chip8::ChipSet,
    definitions::keyboard::{LAYOUT, SIZE},
};

/// The left hand side of a qwerty keyboard, laid out like the hex keypad
pub const TERMINAL_LAYOUT: [[char; 4]; 4] = [
    ['1', '2', '3', '4'],
    ['q', 'w', 'e', 'r'],
    ['a', 's', 'd', 'f'],
    ['z', 'x', 'c', 'v'],
];

/// The terminal only reports presses, a key counts as held until this much
/// time passed without a repeat.
pub const HOLD: Duration = Duration::from_millis(150);

/// Will look up the keypad key for the terminal key.
pub fn map_key(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    for (i, row) in TERMINAL_LAYOUT.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            if *cell == c {
                return Some(LAYOUT[i][j]);
            }
        }
    }
    None
}

/// Emulates key releases from the stream of key presses.
#[derive(Debug, Default)]
pub struct KeyHold {
    released_at: [Option<Instant>; SIZE],
}

impl KeyHold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will hold the key down, a fresh press also resolves a pending `FX0A`.
    pub fn press(&mut self, chip: &mut ChipSet, key: usize, now: Instant) {
        if self.released_at[key].is_none() {
            chip.key_down(key);
            chip.on_key_press(key);
        }
        self.released_at[key] = Some(now + HOLD);
    }

    /// Will release all the keys that were not repeated in time.
    pub fn release_expired(&mut self, chip: &mut ChipSet, now: Instant) {
        for (key, deadline) in self.released_at.iter_mut().enumerate() {
            if matches!(deadline, Some(at) if *at <= now) {
                *deadline = None;
                chip.key_up(key);
            }
        }
    }

    pub fn release_all(&mut self, chip: &mut ChipSet) {
        for (key, deadline) in self.released_at.iter_mut().enumerate() {
            if deadline.take().is_some() {
                chip.key_up(key);
            }
        }
    }
}
