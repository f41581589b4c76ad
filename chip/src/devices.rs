use crate::{definitions::keyboard, display::DisplayBuffer};

/// Presents the display buffer, implemented by the driver.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayCommands {
    /// Will present the pixels of the buffer
    fn display(&mut self, buffer: &DisplayBuffer);
}

/// Plays the tone, implemented by the driver.
#[cfg_attr(test, mockall::automock)]
pub trait ToneCommands {
    /// Will start (`true`) or stop (`false`) the tone.
    fn set_tone(&mut self, audible: bool);
}

/// The result of a key press that resolved a pending `FX0A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// the register the key has to be written into
    pub register: usize,
    /// the pressed key
    pub key: usize,
}

/// The state of the sixteen keys `0x0-0xF` of the hex keypad.
///
/// `EX9E` and `EXA1` read the held keys, `FX0A` parks its target register here
/// until the driver reports the next press.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
    /// The register that waits for the next key press.
    pending: Option<usize>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn reset(&mut self) {
        *self = Keyboard::default();
    }

    pub fn key_down(&mut self, key: usize) {
        self.set_key(key, true)
    }

    pub fn key_up(&mut self, key: usize) {
        self.set_key(key, false)
    }

    pub fn set_key(&mut self, key: usize, down: bool) {
        debug_assert!(key < keyboard::SIZE);
        self.keys[key] = down;
    }

    /// Keys outside of the keypad are never pressed.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn held_keys(&self) -> &[bool] {
        &self.keys
    }

    /// Registers the continuation of `FX0A`, the next key press will be stored
    /// into the given register.
    pub fn await_key(&mut self, register: usize) {
        self.pending = Some(register);
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves the pending continuation exactly once.
    pub fn on_key_press(&mut self, key: usize) -> Option<KeyPress> {
        self.pending
            .take()
            .map(|register| KeyPress { register, key })
    }
}
