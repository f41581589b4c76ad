//! The interpreter, split into the machine state, the opcode handlers, the call stack and
//! a debug printer.
mod chipset;
mod opcodes;
mod print;
mod stack;

pub use chipset::*;
pub use stack::Stack;
