//! The pretty print implementation of the [`ChipSet`](super::ChipSet), used while debugging roms.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use std::fmt::{self, Write};

use super::ChipSet;
use crate::{definitions::memory, opcode::Opcode};

/// The amount of opcodes printed in a single memory row
const HEX_PRINT_STEP: usize = 8;

/// The amount of bytes in a single memory row
const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;

const INDENT_FILLAMENT: char = '\t';

/// Is used when at least two rows in a row contain only zeros.
const FILLER_BASE: &str = "...";

/// Writes a pointer range formatted as `0x0000 - 0x000F :`
fn pointer_formatter<W: Write>(f: &mut W, from: usize, to: usize) -> fmt::Result {
    write!(f, "{:#06X} - {:#06X} :", from, to)
}

/// Will print the memory with all the repeated zero rows collapsed
fn memory_formatter<W: Write>(f: &mut W, data: &[u8]) -> fmt::Result {
    let mut zeros = false;
    for (i, chunk) in data.chunks(POINTER_INCREMENT).enumerate() {
        let from = i * POINTER_INCREMENT;
        let empty = chunk.iter().all(|byte| *byte == 0);
        if empty && zeros {
            continue;
        }
        if empty {
            // only the first zero row is kept and marked as filler
            zeros = true;
            f.write_char(INDENT_FILLAMENT)?;
            pointer_formatter(f, from, from + chunk.len() - 1)?;
            writeln!(f, " {}", FILLER_BASE)?;
            continue;
        }
        zeros = false;

        f.write_char(INDENT_FILLAMENT)?;
        pointer_formatter(f, from, from + chunk.len() - 1)?;
        for pair in chunk.chunks(memory::opcodes::SIZE) {
            let opcode = match *pair {
                [high, low] => Opcode::from_be_bytes([high, low]),
                [high] => Opcode::from_be_bytes([high, 0]),
                _ => 0,
            };
            write!(f, " {:#06X}", opcode)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chipset {{")?;
        writeln!(f, "{}name : {}", INDENT_FILLAMENT, self.name)?;
        writeln!(
            f,
            "{}pc : {:#06X} opcode : {:#06X} index : {:#06X}",
            INDENT_FILLAMENT, self.program_counter, self.opcode, self.index_register
        )?;
        writeln!(
            f,
            "{}delay : {} sound : {} paused : {}",
            INDENT_FILLAMENT,
            self.delay_timer.get_value(),
            self.sound_timer.get_value(),
            self.paused
        )?;

        write!(f, "{}registers :", INDENT_FILLAMENT)?;
        for (i, register) in self.registers.iter().enumerate() {
            write!(f, " V{:X}={:#04X}", i, register)?;
        }
        writeln!(f)?;

        write!(f, "{}stack :", INDENT_FILLAMENT)?;
        for pointer in self.stack.as_slice() {
            write!(f, " {:#06X}", pointer)?;
        }
        writeln!(f)?;

        writeln!(f, "{}memory :", INDENT_FILLAMENT)?;
        memory_formatter(f, &self.memory[..])?;
        write!(f, "}}")
    }
}
