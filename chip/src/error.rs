use thiserror::Error;

use crate::opcode::Opcode;

/// Every failure that can stop the interpreter.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'")]
    Stack(#[from] StackError),
    #[error("Invalid program '{0}'")]
    Load(#[from] LoadError),
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode {opcode:#06X} was used at {pointer:#06X}.")]
    UnknownOpcode { opcode: Opcode, pointer: usize },
    #[error("Pointer location invalid there can not be an opcode at {pointer:#06X}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("All {} nesting levels are in use", crate::definitions::cpu::stack::SIZE)]
    Overflow,
    #[error("Return without a matching call")]
    Underflow,
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum LoadError {
    #[error("The program is {len} bytes long, but only {max} bytes fit into memory.")]
    ProgramTooLarge { len: usize, max: usize },
}

/// Failures while fetching rom data from outside of the interpreter.
#[derive(Error, Debug)]
pub enum RomError {
    #[error("Unable to read the rom '{0}'")]
    Io(#[from] std::io::Error),
    #[error("Invalid rom archive '{0}'")]
    Zip(#[from] zip::result::ZipError),
    #[error("There is no rom named '{0}' in the archive.")]
    NotFound(String),
}
