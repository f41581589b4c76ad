use std::time::{Duration, Instant};

use chip::{
    chip8::ChipSet,
    definitions::{cpu, display},
    devices::{DisplayCommands, ToneCommands},
    display::DisplayBuffer,
    resources::Rom,
    DriverContext, LoadError, Settings,
};

/// Keeps every presented frame.
#[derive(Default)]
struct FrameRecorder {
    frames: Vec<Vec<bool>>,
}

impl DisplayCommands for FrameRecorder {
    fn display(&mut self, buffer: &DisplayBuffer) {
        self.frames.push(buffer.pixels().map(|(_, _, on)| on).collect());
    }
}

#[derive(Default)]
struct ToneRecorder {
    states: Vec<bool>,
}

impl ToneCommands for ToneRecorder {
    fn set_tone(&mut self, audible: bool) {
        self.states.push(audible);
    }
}

fn build_program(parts: &[(usize, &[u8])]) -> Vec<u8> {
    let mut program = Vec::new();
    for (address, data) in parts {
        let offset = address - cpu::PROGRAM_COUNTER;
        if program.len() < offset + data.len() {
            program.resize(offset + data.len(), 0);
        }
        program[offset..offset + data.len()].copy_from_slice(data);
    }
    program
}

fn frame(start: Instant, n: u32) -> Instant {
    start + Duration::from_millis(20) * n
}

#[test]
fn test_score_program() {
    let program = build_program(&[
        (
            0x200,
            &[
                0x6A, 0x7B, // VA = 123
                0xA3, 0x00, // I = 0x300
                0xFA, 0x33, // bcd(VA)
                0xF2, 0x65, // load V0 - V2
                0x22, 0x20, // call draw_digit
                0xF4, 0x0A, // V4 = key()
                0x67, 0x01, // V7 = 1
                0x12, 0x0E, // loop
            ],
        ),
        (
            0x220,
            &[
                0xF0, 0x29, // I = sprite(V0)
                0x65, 0x00, // V5 = 0
                0x66, 0x00, // V6 = 0
                0xD5, 0x65, // draw(V5, V6, 5)
                0x00, 0xEE, // return
            ],
        ),
    ]);
    let rom = Rom::new("SCORE", program);
    let mut chip = ChipSet::with_rom(&rom).unwrap();
    let mut screen = FrameRecorder::default();
    let mut tone = ToneRecorder::default();
    let mut driver = DriverContext::new(Settings::default());
    let start = Instant::now();

    assert_eq!(driver.tick(frame(start, 0), &mut chip, &mut screen, &mut tone), Ok(true));
    assert_eq!(&chip.get_memory()[0x300..0x303], &[1, 2, 3]);
    assert_eq!(&chip.get_registers()[..3], &[1, 2, 3]);
    assert_eq!(chip.get_index_register() as usize, display::fontset::GLYPH_SIZE);
    assert!(chip.get_stack().is_empty());

    // the glyph "1" in the upper left corner
    let first = &screen.frames[0].clone();
    let pixel = |x: usize, y: usize| first[y * display::COLUMNS + x];
    assert!(!pixel(0, 0));
    assert!(pixel(2, 0));
    assert!(pixel(1, 1));
    assert!(pixel(3, 4));
    assert_eq!(first.iter().filter(|on| **on).count(), 8);

    // waiting for a key, nothing moves
    assert_eq!(driver.tick(frame(start, 1), &mut chip, &mut screen, &mut tone), Ok(true));
    assert!(chip.is_paused());
    assert_eq!(driver.tick(frame(start, 2), &mut chip, &mut screen, &mut tone), Ok(true));
    assert_eq!(chip.get_program_counter(), 0x20C);

    chip.on_key_press(0xB);
    assert_eq!(driver.tick(frame(start, 3), &mut chip, &mut screen, &mut tone), Ok(true));
    assert!(!chip.is_paused());
    assert_eq!(chip.get_registers()[0x4], 0xB);
    assert_eq!(chip.get_registers()[0x7], 0x1);
    assert_eq!(chip.get_program_counter(), 0x20E);

    // the display stays presented while paused
    assert_eq!(screen.frames.len(), 4);
    assert!(screen.frames.iter().all(|f| f == first));
    assert_eq!(tone.states, vec![false; 4]);
}

#[test]
fn test_tone_follows_sound_timer() {
    let rom = Rom::new(
        "BEEP",
        vec![
            0x60, 0x03, // V0 = 3
            0xF0, 0x18, // sound timer = V0
            0x12, 0x04, // loop
        ],
    );
    let mut chip = ChipSet::with_rom(&rom).unwrap();
    let mut screen = FrameRecorder::default();
    let mut tone = ToneRecorder::default();
    let mut driver = DriverContext::new(Settings {
        speed: 4,
        frame_rate: 50,
    });
    let start = Instant::now();

    for n in 0..4 {
        assert_eq!(driver.tick(frame(start, n), &mut chip, &mut screen, &mut tone), Ok(true));
    }
    assert_eq!(tone.states, vec![true, true, false, false]);
    assert_eq!(driver.frames(), 4);
}

#[test]
fn test_oversized_rom() {
    let rom = Rom::new("LARGE", vec![0; cpu::PROGRAM_SIZE + 2]);
    assert!(matches!(
        ChipSet::with_rom(&rom),
        Err(LoadError::ProgramTooLarge { len, .. }) if len == cpu::PROGRAM_SIZE + 2
    ));
}

#[test]
fn test_reset_restarts_program() {
    let rom = Rom::new("COUNT", vec![0x70, 0x01, 0x12, 0x00]);
    let mut chip = ChipSet::with_rom(&rom).unwrap();
    chip.cycle(10).unwrap();
    assert_eq!(chip.get_registers()[0x0], 5);

    chip.reset();
    assert_eq!(chip.get_registers()[0x0], 0);
    chip.cycle(4).unwrap();
    assert_eq!(chip.get_registers()[0x0], 2);
    assert_eq!(chip.get_name(), "COUNT");
}
