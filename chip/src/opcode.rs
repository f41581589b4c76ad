//! Opcode abstractions, decoding and the dispatch table of the interpreter.
use crate::{
    definitions::memory,
    error::{OpcodeError, ProcessError},
};

const OPCODE_MASK_FFFF: u16 = u16::MAX;
const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;
const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;
const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;
const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;
const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;
const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;
/// bits `4-7`
const OPCODE_MASK_00F0: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
/// bits `8-11`
const OPCODE_MASK_0F00: u16 = OPCODE_MASK_0FFF & OPCODE_MASK_FF00;

const NIBBLE: u16 = 4;

/// A raw two byte instruction
pub type Opcode = u16;

/// Reads the big-endian opcode stored at `data[pointer]` and `data[pointer + 1]`.
///
/// Fails with [`OpcodeError::MemoryInvalid`] when the second byte lies outside of `data`.
///
/// # Example
/// ```rust
/// # use chip::opcode::build_opcode;
/// # use chip::OpcodeError;
/// let memory = [0x00, 0xE0, 0xA2, 0x2A];
/// assert_eq!(build_opcode(&memory, 0), Ok(0x00E0));
/// assert_eq!(build_opcode(&memory, 1), Ok(0xE0A2));
/// assert_eq!(
///     build_opcode(&memory, 3),
///     Err(OpcodeError::MemoryInvalid { pointer: 3, len: 4 })
/// );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    match (data.get(pointer), data.get(pointer + 1)) {
        (Some(high), Some(low)) => Ok(Opcode::from_be_bytes([*high, *low])),
        _ => Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        }),
    }
}

/// Field accessors for the operand layouts of an opcode.
///
/// ```rust
/// # use chip::opcode::*;
/// let opcode: Opcode = 0xD4B3;
/// assert_eq!(opcode.t(), 0xD);
/// assert_eq!(opcode.nnn(), 0x4B3);
/// assert_eq!(opcode.xkk(), (0x4, 0xB3));
/// assert_eq!(opcode.xyn(), (0x4, 0xB, 0x3));
/// ```
pub trait OpcodeTrait {
    /// the family nibble, bits `12-15`
    fn t(&self) -> u8;

    /// the address `NNN`, bits `0-11`
    fn nnn(&self) -> usize;

    /// the register `X` and the byte `KK`, bits `0-7`
    fn xkk(&self) -> (usize, u8);

    /// the registers `X` and `Y` (bits `4-7`) with the nibble `N`, bits `0-3`
    fn xyn(&self) -> (usize, usize, u8);

    /// the register `X`, bits `8-11`
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE)) as u8
    }

    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    fn xkk(&self) -> (usize, u8) {
        (self.x(), (self & OPCODE_MASK_00FF) as u8)
    }

    fn xyn(&self) -> (usize, usize, u8) {
        let y = (self & OPCODE_MASK_00F0) >> NIBBLE;
        (self.x(), y as usize, (self & OPCODE_MASK_000F) as u8)
    }

    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0F00) >> (2 * NIBBLE)) as usize
    }
}

/// How the program counter moves after an opcode ran.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProgramCounterStep {
    /// stay on the current opcode
    None,
    /// continue with the following opcode
    Next,
    /// jump over the following opcode
    Skip,
    /// continue at the absolute address, taken modulo the memory size
    Jump(usize),
}

impl ProgramCounterStep {
    /// `Skip` when the condition holds, `Next` otherwise.
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Calculates the program counter that follows `current`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next.apply(0x200), 0x202);
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
    /// assert_eq!(ProgramCounterStep::Jump(0x1002).apply(0x200), 0x002);
    /// ```
    #[inline]
    pub fn apply(&self, current: usize) -> usize {
        let next = match *self {
            ProgramCounterStep::None => current,
            ProgramCounterStep::Next => current + memory::opcodes::SIZE,
            ProgramCounterStep::Skip => current + 2 * memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => pointer,
        };
        next % memory::SIZE
    }
}

/// The `0NNN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
    /// `0NNN`, a machine code routine of the original hardware, ignored here
    Machine(usize),
}

/// The `8XYN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    /// `8XY0`
    Assign,
    /// `8XY1`
    Or,
    /// `8XY2`
    And,
    /// `8XY3`
    Xor,
    /// `8XY4`
    Add,
    /// `8XY5`
    Sub,
    /// `8XY6`
    ShiftRight,
    /// `8XY7`
    SubReverse,
    /// `8XYE`
    ShiftLeft,
}

/// The `EXKK` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheck {
    /// `EX9E`
    Pressed,
    /// `EXA1`
    NotPressed,
}

/// The `FXKK` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misc {
    /// `FX07`
    GetDelayTimer,
    /// `FX0A`
    AwaitKeyPress,
    /// `FX15`
    SetDelayTimer,
    /// `FX18`
    SetSoundTimer,
    /// `FX1E`
    AddVxToI,
    /// `FX29`
    SetIToSprite,
    /// `FX33`
    StoreBcd,
    /// `FX55`
    StoreV0ToVx,
    /// `FX65`
    FillV0ToVx,
}

/// A fully decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    System(System),
    Jump { nnn: usize },
    Call { nnn: usize },
    SkipEqual { x: usize, kk: u8 },
    SkipNotEqual { x: usize, kk: u8 },
    SkipRegistersEqual { x: usize, y: usize },
    SetRegister { x: usize, kk: u8 },
    AddRegister { x: usize, kk: u8 },
    Arithmetic { op: Arithmetic, x: usize, y: usize },
    SkipRegistersNotEqual { x: usize, y: usize },
    SetIndex { nnn: usize },
    JumpOffset { nnn: usize },
    Random { x: usize, kk: u8 },
    Draw { x: usize, y: usize, n: u8 },
    Key { op: KeyCheck, x: usize },
    Misc { op: Misc, x: usize },
    /// A sub opcode that is not assigned inside of a known family, executed as a no-op.
    Unassigned(Opcode),
}

impl Instruction {
    /// Decodes the `opcode` that was fetched from `pointer`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// assert_eq!(
    ///     Instruction::decode(0x8124, 0x200),
    ///     Ok(Instruction::Arithmetic { op: Arithmetic::Add, x: 1, y: 2 })
    /// );
    /// assert_eq!(Instruction::decode(0x8128, 0x200), Ok(Instruction::Unassigned(0x8128)));
    /// ```
    pub fn decode(opcode: Opcode, pointer: usize) -> Result<Self, OpcodeError> {
        let (x, y, n) = opcode.xyn();
        let (_, kk) = opcode.xkk();
        let nnn = opcode.nnn();

        let instruction = match opcode.t() {
            0x0 => match opcode {
                0x00E0 => Instruction::System(System::Clear),
                0x00EE => Instruction::System(System::Return),
                _ => Instruction::System(System::Machine(nnn)),
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipEqual { x, kk },
            0x4 => Instruction::SkipNotEqual { x, kk },
            0x5 if n == 0 => Instruction::SkipRegistersEqual { x, y },
            0x6 => Instruction::SetRegister { x, kk },
            0x7 => Instruction::AddRegister { x, kk },
            0x8 => {
                let op = match n {
                    0x0 => Arithmetic::Assign,
                    0x1 => Arithmetic::Or,
                    0x2 => Arithmetic::And,
                    0x3 => Arithmetic::Xor,
                    0x4 => Arithmetic::Add,
                    0x5 => Arithmetic::Sub,
                    0x6 => Arithmetic::ShiftRight,
                    0x7 => Arithmetic::SubReverse,
                    0xE => Arithmetic::ShiftLeft,
                    _ => return Ok(Instruction::Unassigned(opcode)),
                };
                Instruction::Arithmetic { op, x, y }
            }
            0x9 if n == 0 => Instruction::SkipRegistersNotEqual { x, y },
            0xA => Instruction::SetIndex { nnn },
            0xB => Instruction::JumpOffset { nnn },
            0xC => Instruction::Random { x, kk },
            0xD => Instruction::Draw { x, y, n },
            0xE => match kk {
                0x9E => Instruction::Key {
                    op: KeyCheck::Pressed,
                    x,
                },
                0xA1 => Instruction::Key {
                    op: KeyCheck::NotPressed,
                    x,
                },
                _ => Instruction::Unassigned(opcode),
            },
            0xF => {
                let op = match kk {
                    0x07 => Misc::GetDelayTimer,
                    0x0A => Misc::AwaitKeyPress,
                    0x15 => Misc::SetDelayTimer,
                    0x18 => Misc::SetSoundTimer,
                    0x1E => Misc::AddVxToI,
                    0x29 => Misc::SetIToSprite,
                    0x33 => Misc::StoreBcd,
                    0x55 => Misc::StoreV0ToVx,
                    0x65 => Misc::FillV0ToVx,
                    _ => return Ok(Instruction::Unassigned(opcode)),
                };
                Instruction::Misc { op, x }
            }
            0x5 | 0x9 => Instruction::Unassigned(opcode),
            _ => return Err(OpcodeError::UnknownOpcode { opcode, pointer }),
        };
        Ok(instruction)
    }
}

/// Anything that owns a program counter.
pub trait ProgramCounter {
    fn advance(&mut self, step: ProgramCounterStep);
}

/// What a single executed opcode asks of the driver.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operation {
    None,
    /// `FX0A` paused the interpreter until the next key press
    Wait,
    /// the display buffer changed
    Draw,
}

/// The opcode table of the interpreter.
///
/// Every method handles a single opcode family and returns where the program
/// counter has to move next, relative to the address of the executed opcode.
pub trait ChipOpcodes: ProgramCounter {
    /// Dispatches a decoded instruction and moves the program counter afterwards.
    fn calc(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        let mut redraw_or_wait = Operation::None;
        let step = match instruction {
            Instruction::System(op) => {
                let (step, op) = self.system(op)?;
                redraw_or_wait = op;
                step
            }
            Instruction::Jump { nnn } => self.jump(nnn),
            Instruction::Call { nnn } => self.call(nnn)?,
            Instruction::SkipEqual { x, kk } => self.skip_equal(x, kk),
            Instruction::SkipNotEqual { x, kk } => self.skip_not_equal(x, kk),
            Instruction::SkipRegistersEqual { x, y } => self.skip_registers_equal(x, y),
            Instruction::SetRegister { x, kk } => self.set_register(x, kk),
            Instruction::AddRegister { x, kk } => self.add_register(x, kk),
            Instruction::Arithmetic { op, x, y } => self.arithmetic(op, x, y),
            Instruction::SkipRegistersNotEqual { x, y } => self.skip_registers_not_equal(x, y),
            Instruction::SetIndex { nnn } => self.set_index(nnn),
            Instruction::JumpOffset { nnn } => self.jump_offset(nnn),
            Instruction::Random { x, kk } => self.random(x, kk),
            Instruction::Draw { x, y, n } => {
                redraw_or_wait = Operation::Draw;
                self.draw(x, y, n)
            }
            Instruction::Key { op, x } => self.key(op, x),
            Instruction::Misc { op, x } => {
                let (step, op) = self.misc(op, x);
                redraw_or_wait = op;
                step
            }
            Instruction::Unassigned(opcode) => {
                log::warn!("Ignoring the unassigned opcode {:#06X}", opcode);
                ProgramCounterStep::Next
            }
        };

        self.advance(step);
        Ok(redraw_or_wait)
    }

    /// `00E0` clears the screen, `00EE` returns from a subroutine and any other
    /// `0NNN` machine code routine is skipped.
    fn system(&mut self, op: System) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// `1NNN`: `pc = NNN`
    fn jump(&self, nnn: usize) -> ProgramCounterStep;

    /// `2NNN`: pushes the return address and continues at `NNN`.
    fn call(&mut self, nnn: usize) -> Result<ProgramCounterStep, ProcessError>;

    /// `3XKK`: skip if `VX == KK`
    fn skip_equal(&self, x: usize, kk: u8) -> ProgramCounterStep;

    /// `4XKK`: skip if `VX != KK`
    fn skip_not_equal(&self, x: usize, kk: u8) -> ProgramCounterStep;

    /// `5XY0`: skip if `VX == VY`
    fn skip_registers_equal(&self, x: usize, y: usize) -> ProgramCounterStep;

    /// `6XKK`: `VX = KK`
    fn set_register(&mut self, x: usize, kk: u8) -> ProgramCounterStep;

    /// `7XKK`: `VX += KK` wrapping, `VF` stays untouched
    fn add_register(&mut self, x: usize, kk: u8) -> ProgramCounterStep;

    /// The `8XYN` register operations:
    ///
    /// | N   | operation      | VF                     |
    /// |-----|----------------|------------------------|
    /// | `0` | `VX = VY`      |                        |
    /// | `1` | `VX \|= VY`    |                        |
    /// | `2` | `VX &= VY`     |                        |
    /// | `3` | `VX ^= VY`     |                        |
    /// | `4` | `VX += VY`     | carry                  |
    /// | `5` | `VX -= VY`     | `1` if `VX > VY`       |
    /// | `6` | `VX >>= 1`     | the shifted out bit    |
    /// | `7` | `VX = VY - VX` | `1` if `VY > VX`       |
    /// | `E` | `VX <<= 1`     | the shifted out bit    |
    fn arithmetic(&mut self, op: Arithmetic, x: usize, y: usize) -> ProgramCounterStep;

    /// `9XY0`: skip if `VX != VY`
    fn skip_registers_not_equal(&self, x: usize, y: usize) -> ProgramCounterStep;

    /// `ANNN`: `I = NNN`
    fn set_index(&mut self, nnn: usize) -> ProgramCounterStep;

    /// `BNNN`: `pc = NNN + V0`
    fn jump_offset(&self, nnn: usize) -> ProgramCounterStep;

    /// `CXKK`: `VX = random() & KK`
    fn random(&mut self, x: usize, kk: u8) -> ProgramCounterStep;

    /// `DXYN`: draws the `N` rows of the sprite at `I` to `(VX, VY)`,
    /// `VF` is set if any pixel got erased.
    fn draw(&mut self, x: usize, y: usize, n: u8) -> ProgramCounterStep;

    /// `EX9E` skips if the key `VX` is down, `EXA1` if it is up.
    fn key(&self, op: KeyCheck, x: usize) -> ProgramCounterStep;

    /// The `FXKK` timer, memory and input operations.
    fn misc(&mut self, op: Misc, x: usize) -> (ProgramCounterStep, Operation);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_families() {
        let tests = [
            (0x00E0, Instruction::System(System::Clear)),
            (0x00EE, Instruction::System(System::Return)),
            (0x0123, Instruction::System(System::Machine(0x123))),
            (0x1919, Instruction::Jump { nnn: 0x919 }),
            (0x2222, Instruction::Call { nnn: 0x222 }),
            (0x3123, Instruction::SkipEqual { x: 0x1, kk: 0x23 }),
            (0x4123, Instruction::SkipNotEqual { x: 0x1, kk: 0x23 }),
            (0x5120, Instruction::SkipRegistersEqual { x: 0x1, y: 0x2 }),
            (0x6123, Instruction::SetRegister { x: 0x1, kk: 0x23 }),
            (0x7123, Instruction::AddRegister { x: 0x1, kk: 0x23 }),
            (
                0x812E,
                Instruction::Arithmetic {
                    op: Arithmetic::ShiftLeft,
                    x: 0x1,
                    y: 0x2,
                },
            ),
            (0x9120, Instruction::SkipRegistersNotEqual { x: 0x1, y: 0x2 }),
            (0xA222, Instruction::SetIndex { nnn: 0x222 }),
            (0xB222, Instruction::JumpOffset { nnn: 0x222 }),
            (0xC123, Instruction::Random { x: 0x1, kk: 0x23 }),
            (
                0xD123,
                Instruction::Draw {
                    x: 0x1,
                    y: 0x2,
                    n: 0x3,
                },
            ),
            (
                0xE19E,
                Instruction::Key {
                    op: KeyCheck::Pressed,
                    x: 0x1,
                },
            ),
            (
                0xE1A1,
                Instruction::Key {
                    op: KeyCheck::NotPressed,
                    x: 0x1,
                },
            ),
            (
                0xF30A,
                Instruction::Misc {
                    op: Misc::AwaitKeyPress,
                    x: 0x3,
                },
            ),
            (
                0xF265,
                Instruction::Misc {
                    op: Misc::FillV0ToVx,
                    x: 0x2,
                },
            ),
        ];
        for (opcode, expected) in tests.iter() {
            assert_eq!(Instruction::decode(*opcode, 0x200), Ok(*expected), "{:#06X}", opcode);
        }
    }

    #[test]
    fn test_decode_unassigned_sub_opcodes() {
        for opcode in [0x5121u16, 0x9121, 0x8128, 0x812F, 0xE111, 0xF0AA].iter() {
            assert_eq!(
                Instruction::decode(*opcode, 0x200),
                Ok(Instruction::Unassigned(*opcode))
            );
        }
    }

    #[test]
    fn test_every_family_is_known() {
        // all 16 possible top nibbles have a family
        for t in 0..=0xFu16 {
            let opcode = t << 12;
            assert!(Instruction::decode(opcode, 0x200).is_ok());
        }
    }

    #[test]
    fn test_jump_wraps_memory() {
        assert_eq!(ProgramCounterStep::Next.apply(0xFFE), 0x000);
        assert_eq!(ProgramCounterStep::Jump(0xFFF + 0xFF).apply(0x200), 0x0FE);
        assert_eq!(ProgramCounterStep::None.apply(0x204), 0x204);
    }
}
