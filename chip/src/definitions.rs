//! The machine constants of the chip8 system.

/// Layout of the address space
pub mod memory {
    /// Addressable bytes, every address is taken modulo this value
    pub const SIZE: usize = 0x1000;

    pub mod opcodes {
        /// Every opcode is two bytes wide, big-endian
        pub const SIZE: usize = 2;
    }
}

/// Registers, program counter and call stack
pub mod cpu {
    /// Programs are loaded to and started from here
    pub const PROGRAM_COUNTER: usize = 0x0200;
    /// The largest program that can be loaded behind the program counter start
    pub const PROGRAM_SIZE: usize = super::memory::SIZE - PROGRAM_COUNTER;
    /// The default amount of instructions executed per tick
    pub const SPEED: usize = 10;

    pub mod register {
        /// `V0` to `VF`
        pub const SIZE: usize = 16;
        /// The last entry of the registers (`VF`)
        pub const LAST: usize = SIZE - 1;
    }

    pub mod stack {
        /// Maximal subroutine nesting
        pub const SIZE: usize = 16;
    }
}

/// Tick timing
pub mod timer {
    use std::time::Duration;

    /// The rate the timers, the display and the driver tick at
    pub const HERTZ: u32 = 60;
    /// The duration of a single tick
    pub const INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / HERTZ as u64);
}

/// The monochrome screen
pub mod display {
    /// The amount of pixels in a row
    pub const COLUMNS: usize = 64;
    /// The amount of pixel rows
    pub const ROWS: usize = 32;
    /// Pixels in total, stored row major
    pub const RESOLUTION: usize = COLUMNS * ROWS;
    /// A sprite row is always a single byte wide
    pub const SPRITE_WIDTH: usize = 8;

    /// The built in hex digit glyphs `0-F`, `4x5` pixels each
    pub mod fontset {
        /// Where the glyphs are placed inside of the memory
        pub const LOCATION: usize = 0x000;
        /// The amount of bytes used by a single glyph
        pub const GLYPH_SIZE: usize = 5;
        pub const FONTSET: [u8; 80] = [
            0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
            0x20, 0x60, 0x20, 0x20, 0x70, // 1
            0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
            0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
            0x90, 0x90, 0xF0, 0x10, 0x10, // 4
            0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
            0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
            0xF0, 0x10, 0x20, 0x40, 0x40, // 7
            0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
            0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
            0xF0, 0x90, 0xF0, 0x90, 0x90, // A
            0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
            0xF0, 0x80, 0x80, 0x80, 0xF0, // C
            0xE0, 0x90, 0x90, 0x90, 0xE0, // D
            0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
            0xF0, 0x80, 0xF0, 0x80, 0x80, // F
        ];
    }
}

/// The hex keypad
pub mod keyboard {
    /// Keys `0x0` to `0xF`
    pub const SIZE: usize = 16;
    /// The keyboard layout of the hex keypad, row by row
    pub const LAYOUT: [[usize; 4]; 4] = [
        [0x1, 0x2, 0x3, 0xC],
        [0x4, 0x5, 0x6, 0xD],
        [0x7, 0x8, 0x9, 0xE],
        [0xA, 0x0, 0xB, 0xF],
    ];
}
