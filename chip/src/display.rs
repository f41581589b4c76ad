//! The monochrome pixel grid the interpreter draws into.
use crate::definitions::display::{COLUMNS, RESOLUTION, ROWS, SPRITE_WIDTH};

/// Will move a coordinate back onto the grid, modulo the grid size.
#[inline]
fn wrap(value: i32, size: usize) -> usize {
    value.rem_euclid(size as i32) as usize
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. The pixels are stored row by row, so the pixel `(x, y)` lives at `y * 64 + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    pixels: Box<[u8; RESOLUTION]>,
    /// set by every change, cleared by the presenting driver
    dirty: bool,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self {
            pixels: Box::new([0; RESOLUTION]),
            dirty: true,
        }
    }

    /// Toggles the pixel at the wrapped coordinate and returns `true` if the pixel
    /// was switched from on to off (a collision).
    ///
    /// # Example
    /// ```rust
    /// # use chip::display::DisplayBuffer;
    /// let mut buffer = DisplayBuffer::new();
    /// assert!(!buffer.set_pixel(-1, 0));
    /// assert!(buffer.get_pixel(63, 0));
    /// assert!(buffer.set_pixel(63, 32));
    /// ```
    pub fn set_pixel(&mut self, x: i32, y: i32) -> bool {
        let location = wrap(x, COLUMNS) + wrap(y, ROWS) * COLUMNS;
        self.pixels[location] ^= 1;
        self.dirty = true;
        self.pixels[location] == 0
    }

    /// XORs the sprite onto the grid with its top left corner at `(x, y)`,
    /// every sprite byte is a single row with the most significant bit on the left.
    ///
    /// Returns `true` if any pixel was erased.
    pub fn draw_sprite(&mut self, x: i32, y: i32, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row, byte) in sprite.iter().enumerate() {
            for column in 0..SPRITE_WIDTH {
                let mask = 0x80 >> column;
                if byte & mask == 0 {
                    continue;
                }
                collision |= self.set_pixel(x + column as i32, y + row as i32);
            }
        }
        collision
    }

    /// Will switch every pixel off.
    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = 0);
        self.dirty = true;
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < COLUMNS && y < ROWS);
        self.pixels[x + y * COLUMNS] == 1
    }

    /// Iterates over all the pixels as `(x, y, is_on)`.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .map(|(i, pixel)| (i % COLUMNS, i / COLUMNS, *pixel == 1))
    }

    /// Iterates over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(COLUMNS)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels[..]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty state and resets it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_collision() {
        let mut buffer = DisplayBuffer::new();
        assert!(!buffer.set_pixel(3, 4));
        assert!(buffer.get_pixel(3, 4));
        assert!(buffer.set_pixel(3, 4));
        assert!(!buffer.get_pixel(3, 4));
    }

    #[test]
    fn test_wrap_single_correction() {
        let mut buffer = DisplayBuffer::new();
        buffer.set_pixel(64, 0);
        assert!(buffer.get_pixel(0, 0));
        buffer.set_pixel(-1, 0);
        assert!(buffer.get_pixel(63, 0));
        buffer.set_pixel(0, 32);
        assert!(!buffer.get_pixel(0, 0));
        buffer.set_pixel(5, -1);
        assert!(buffer.get_pixel(5, 31));
    }

    #[test]
    fn test_draw_sprite() {
        let mut buffer = DisplayBuffer::new();
        // glyph for zero
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];
        assert!(!buffer.draw_sprite(10, 10, &sprite));
        let lit: Vec<_> = buffer.pixels().filter(|(_, _, on)| *on).collect();
        assert_eq!(lit.len(), 14);
        assert!(buffer.get_pixel(10, 10));
        assert!(buffer.get_pixel(13, 11));
        assert!(!buffer.get_pixel(11, 11));

        // drawing the same sprite again erases it
        assert!(buffer.draw_sprite(10, 10, &sprite));
        assert!(buffer.pixels().all(|(_, _, on)| !on));
    }

    #[test]
    fn test_draw_sprite_wraps_edges() {
        let mut buffer = DisplayBuffer::new();
        assert!(!buffer.draw_sprite(60, 31, &[0xFF, 0x81]));
        for x in (60..64).chain(0..4) {
            assert!(buffer.get_pixel(x, 31), "pixel {} should be on", x);
        }
        assert!(buffer.get_pixel(60, 0));
        assert!(buffer.get_pixel(3, 0));
        assert!(!buffer.get_pixel(61, 0));
    }

    #[test]
    fn test_clear_and_dirty() {
        let mut buffer = DisplayBuffer::new();
        assert!(buffer.take_dirty());
        assert!(!buffer.is_dirty());
        buffer.set_pixel(1, 1);
        assert!(buffer.take_dirty());
        buffer.clear();
        assert!(buffer.is_dirty());
        assert!(buffer.as_slice().iter().all(|p| *p == 0));
        assert_eq!(buffer.rows().count(), ROWS);
    }
}
