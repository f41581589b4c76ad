use rand::RngCore;

use super::stack::Stack;
use crate::{
    definitions::{cpu, display, memory},
    devices::Keyboard,
    display::DisplayBuffer,
    error::{LoadError, ProcessError},
    opcode::{self, ChipOpcodes, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
    resources::Rom,
    timer::Timer,
};

/// The report of a single driver tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick {
    /// the tone has to be audible
    pub tone: bool,
    /// the display buffer was changed during the tick
    pub redraw: bool,
    /// the interpreter waits for a key press
    pub waiting: bool,
}

/// The complete machine state of the interpreter.
///
/// Memory map:
/// - `0x000-0x04F` - the hex digit glyphs
/// - `0x050-0x1FF` - unused, zeroed
/// - `0x200-0xFFF` - the loaded program followed by free work memory
pub struct ChipSet {
    pub(super) name: String,
    /// the last fetched opcode
    pub(super) opcode: Opcode,
    pub(super) memory: Box<[u8; memory::SIZE]>,
    /// `V0` to `VF`, where `VF` doubles as carry, borrow and collision flag
    pub(super) registers: [u8; cpu::register::SIZE],
    /// `I`, only the lower twelve bits are used for addressing
    pub(super) index_register: u16,
    pub(super) program_counter: usize,
    pub(super) stack: Stack,
    pub(super) delay_timer: Timer,
    /// the tone plays as long as this timer runs
    pub(super) sound_timer: Timer,
    pub(super) display: DisplayBuffer,
    pub(super) keyboard: Keyboard,
    /// source of `CXKK`, replaceable for deterministic runs
    pub(super) rng: Box<dyn RngCore + Send>,
    /// Set while `FX0A` waits for a key press.
    pub(super) paused: bool,
    /// A copy of the loaded program, used for resets.
    pub(super) program: Vec<u8>,
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSet {
    /// will create a new chipset object with the font already loaded
    pub fn new() -> Self {
        let mut chip = Self {
            name: String::new(),
            opcode: 0,
            memory: Box::new([0; memory::SIZE]),
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: Stack::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            display: DisplayBuffer::new(),
            keyboard: Keyboard::new(),
            rng: Box::new(rand::rngs::OsRng),
            paused: false,
            program: Vec::new(),
        };
        chip.load_font();
        chip
    }

    /// will create a new chipset with the given rom loaded
    pub fn with_rom(rom: &Rom) -> Result<Self, LoadError> {
        let mut chip = Self::new();
        chip.load_rom(rom)?;
        Ok(chip)
    }

    /// Will replace the random number generator used by `CXKK`.
    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
        self
    }

    /// Will write the fontset to the start of the memory.
    pub fn load_font(&mut self) {
        let location = display::fontset::LOCATION;
        self.memory[location..(location + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);
    }

    /// Will copy the program into memory starting at the program counter start.
    ///
    /// Registers and counters are left as they are, an oversized program leaves
    /// the memory untouched.
    pub fn load_program(&mut self, data: &[u8]) -> Result<(), LoadError> {
        if data.len() > cpu::PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                len: data.len(),
                max: cpu::PROGRAM_SIZE,
            });
        }

        let start = cpu::PROGRAM_COUNTER;
        self.memory[start..(start + data.len())].copy_from_slice(data);
        self.program = data.to_vec();
        log::debug!("loaded a program of {} bytes", data.len());
        Ok(())
    }

    pub fn load_rom(&mut self, rom: &Rom) -> Result<(), LoadError> {
        self.load_program(rom.get_data())?;
        self.name = rom.get_name().to_string();
        Ok(())
    }

    /// Restores the power on state, the loaded program stays in memory.
    pub fn reset(&mut self) {
        self.opcode = 0;
        self.memory.iter_mut().for_each(|cell| *cell = 0);
        self.load_font();
        let start = cpu::PROGRAM_COUNTER;
        self.memory[start..(start + self.program.len())].copy_from_slice(&self.program);
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.delay_timer.set_value(0);
        self.sound_timer.set_value(0);
        self.display.clear();
        self.keyboard.reset();
        self.paused = false;
    }

    /// Fetches the opcode at the program counter.
    pub(super) fn set_opcode(&mut self) -> Result<(), ProcessError> {
        self.opcode = opcode::build_opcode(&self.memory[..], self.program_counter)?;
        Ok(())
    }

    /// Will fetch, decode and execute a single opcode.
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        self.set_opcode()?;
        let instruction = Instruction::decode(self.opcode, self.program_counter)?;
        log::trace!(
            "{:#06X}: {:#06X} {:?}",
            self.program_counter,
            self.opcode,
            instruction
        );
        self.calc(instruction)
    }

    /// Will run a full driver tick.
    ///
    /// Executes up to `cycles_per_tick` opcodes, none while waiting for a key press,
    /// afterwards both timers count down once unless the interpreter is paused.
    pub fn cycle(&mut self, cycles_per_tick: usize) -> Result<Tick, ProcessError> {
        let mut redraw = false;
        for _ in 0..cycles_per_tick {
            if self.paused {
                break;
            }
            redraw |= self.step()? == Operation::Draw;
        }

        if !self.paused {
            self.delay_timer.tick();
            self.sound_timer.tick();
        }

        Ok(Tick {
            tone: self.is_tone_active(),
            redraw,
            waiting: self.paused,
        })
    }

    pub fn key_down(&mut self, key: usize) {
        self.keyboard.key_down(key)
    }

    pub fn key_up(&mut self, key: usize) {
        self.keyboard.key_up(key)
    }

    /// Will deliver a key press event, resumes a pending `FX0A`.
    pub fn on_key_press(&mut self, key: usize) {
        if let Some(press) = self.keyboard.on_key_press(key) {
            self.registers[press.register] = press.key as u8;
            self.paused = false;
            log::debug!(
                "key {:#X} resumed execution into V{:X}",
                press.key,
                press.register
            );
        }
    }

    pub fn get_keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn get_stack(&self) -> &[usize] {
        self.stack.as_slice()
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory[..]
    }

    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// `true` as long as the sound timer is running
    pub fn is_tone_active(&self) -> bool {
        self.sound_timer.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayBuffer {
        &mut self.display
    }

    /// Translates a memory address, all accesses are taken modulo the memory size.
    #[inline]
    pub(super) fn address(&self, offset: usize) -> usize {
        (self.index_register as usize + offset) % memory::SIZE
    }

    /// Will push the pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), ProcessError> {
        self.stack.push(pointer)?;
        log::debug!("pushed {:#06X}, depth {}", pointer, self.stack.depth());
        Ok(())
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<usize, ProcessError> {
        let pointer = self.stack.pop()?;
        log::debug!("popped {:#06X}, depth {}", pointer, self.stack.depth());
        Ok(pointer)
    }
}

impl ProgramCounter for ChipSet {
    fn advance(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}
