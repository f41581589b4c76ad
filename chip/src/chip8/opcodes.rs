use super::ChipSet;
use crate::{
    definitions::{cpu, display, memory},
    error::ProcessError,
    opcode::{Arithmetic, ChipOpcodes, KeyCheck, Misc, Operation, ProgramCounterStep, System},
};

const FLAG: usize = cpu::register::LAST;

impl ChipOpcodes for ChipSet {
    fn system(&mut self, op: System) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        match op {
            System::Clear => {
                self.display.clear();
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            System::Return => {
                let pc = self.pop_stack()?;
                Ok((ProgramCounterStep::Jump(pc), Operation::None))
            }
            System::Machine(nnn) => {
                log::debug!("ignoring the machine code routine at {:#05X}", nnn);
                Ok((ProgramCounterStep::Next, Operation::None))
            }
        }
    }

    fn jump(&self, nnn: usize) -> ProgramCounterStep {
        ProgramCounterStep::Jump(nnn)
    }

    fn call(&mut self, nnn: usize) -> Result<ProgramCounterStep, ProcessError> {
        // the return address is the opcode after the call
        self.push_stack(self.program_counter + memory::opcodes::SIZE)?;
        Ok(ProgramCounterStep::Jump(nnn))
    }

    fn skip_equal(&self, x: usize, kk: u8) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] == kk)
    }

    fn skip_not_equal(&self, x: usize, kk: u8) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] != kk)
    }

    fn skip_registers_equal(&self, x: usize, y: usize) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] == self.registers[y])
    }

    fn set_register(&mut self, x: usize, kk: u8) -> ProgramCounterStep {
        self.registers[x] = kk;
        ProgramCounterStep::Next
    }

    fn add_register(&mut self, x: usize, kk: u8) -> ProgramCounterStep {
        // let VX overflow, but ignore carry
        self.registers[x] = self.registers[x].wrapping_add(kk);
        ProgramCounterStep::Next
    }

    fn arithmetic(&mut self, op: Arithmetic, x: usize, y: usize) -> ProgramCounterStep {
        let vx = self.registers[x];
        let vy = self.registers[y];
        // VF is written before VX, so with X == F the result wins
        match op {
            Arithmetic::Assign => self.registers[x] = vy,
            Arithmetic::Or => self.registers[x] = vx | vy,
            Arithmetic::And => self.registers[x] = vx & vy,
            Arithmetic::Xor => self.registers[x] = vx ^ vy,
            Arithmetic::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                self.registers[FLAG] = carry as u8;
                self.registers[x] = res;
            }
            Arithmetic::Sub => {
                self.registers[FLAG] = (vx > vy) as u8;
                self.registers[x] = vx.wrapping_sub(vy);
            }
            Arithmetic::ShiftRight => {
                self.registers[FLAG] = vx & 0x01;
                self.registers[x] = vx >> 1;
            }
            Arithmetic::SubReverse => {
                self.registers[FLAG] = (vy > vx) as u8;
                self.registers[x] = vy.wrapping_sub(vx);
            }
            Arithmetic::ShiftLeft => {
                self.registers[FLAG] = (vx & 0x80) >> 7;
                self.registers[x] = vx << 1;
            }
        }
        ProgramCounterStep::Next
    }

    fn skip_registers_not_equal(&self, x: usize, y: usize) -> ProgramCounterStep {
        ProgramCounterStep::cond(self.registers[x] != self.registers[y])
    }

    fn set_index(&mut self, nnn: usize) -> ProgramCounterStep {
        self.index_register = nnn as u16;
        ProgramCounterStep::Next
    }

    fn jump_offset(&self, nnn: usize) -> ProgramCounterStep {
        ProgramCounterStep::Jump(nnn + self.registers[0] as usize)
    }

    fn random(&mut self, x: usize, kk: u8) -> ProgramCounterStep {
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand = [0u8; 1];
        self.rng.fill_bytes(&mut rand);
        self.registers[x] = rand[0] & kk;
        ProgramCounterStep::Next
    }

    fn draw(&mut self, x: usize, y: usize, n: u8) -> ProgramCounterStep {
        let sprite: Vec<u8> = (0..n as usize)
            .map(|row| self.memory[self.address(row)])
            .collect();
        let coorx = self.registers[x] as i32;
        let coory = self.registers[y] as i32;

        let collision = self.display.draw_sprite(coorx, coory, &sprite);
        self.registers[FLAG] = collision as u8;
        ProgramCounterStep::Next
    }

    fn key(&self, op: KeyCheck, x: usize) -> ProgramCounterStep {
        let pressed = self.keyboard.is_pressed(self.registers[x] as usize);
        match op {
            KeyCheck::Pressed => ProgramCounterStep::cond(pressed),
            KeyCheck::NotPressed => ProgramCounterStep::cond(!pressed),
        }
    }

    fn misc(&mut self, op: Misc, x: usize) -> (ProgramCounterStep, Operation) {
        match op {
            Misc::GetDelayTimer => {
                self.registers[x] = self.delay_timer.get_value();
            }
            Misc::AwaitKeyPress => {
                // execution stops until the driver delivers a key press
                self.keyboard.await_key(x);
                self.paused = true;
                log::debug!("waiting for a key press into V{:X}", x);
                return (ProgramCounterStep::Next, Operation::Wait);
            }
            Misc::SetDelayTimer => {
                self.delay_timer.set_value(self.registers[x]);
            }
            Misc::SetSoundTimer => {
                self.sound_timer.set_value(self.registers[x]);
            }
            Misc::AddVxToI => {
                // VF is not affected
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
            }
            Misc::SetIToSprite => {
                let glyph = self.registers[x] as u16 * display::fontset::GLYPH_SIZE as u16;
                self.index_register = display::fontset::LOCATION as u16 + glyph;
            }
            Misc::StoreBcd => {
                let r = self.registers[x];
                let digits = [r / 100, r / 10 % 10, r % 10];
                for (offset, digit) in digits.iter().enumerate() {
                    let address = self.address(offset);
                    self.memory[address] = *digit;
                }
            }
            Misc::StoreV0ToVx => {
                for offset in 0..=x {
                    let address = self.address(offset);
                    self.memory[address] = self.registers[offset];
                }
            }
            Misc::FillV0ToVx => {
                for offset in 0..=x {
                    self.registers[offset] = self.memory[self.address(offset)];
                }
            }
        }
        (ProgramCounterStep::Next, Operation::None)
    }
}
