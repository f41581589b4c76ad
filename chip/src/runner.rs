use std::time::{Duration, Instant};

use crate::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    devices::{DisplayCommands, ToneCommands},
    error::ProcessError,
};

/// The tunables of the driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// The amount of opcodes executed per tick
    pub speed: usize,
    /// The amount of ticks per second
    pub frame_rate: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: cpu::SPEED,
            frame_rate: timer::HERTZ,
        }
    }
}

impl Settings {
    /// The duration between two ticks
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

/// Holds the frame timing of a driver loop.
///
/// The driver calls [`tick`](DriverContext::tick) as often as it likes, a frame
/// only runs once the interval of the configured frame rate has passed.
#[derive(Debug, Clone)]
pub struct DriverContext {
    settings: Settings,
    interval: Duration,
    last_frame: Option<Instant>,
    frames: u64,
}

impl DriverContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            interval: settings.interval(),
            last_frame: None,
            frames: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The amount of frames that have run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The time left until the next frame is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        match self.last_frame {
            Some(last) => self
                .interval
                .checked_sub(now.saturating_duration_since(last))
                .unwrap_or_default(),
            None => Duration::default(),
        }
    }

    /// Will run a single frame if it is due.
    ///
    /// A frame runs the cycle batch of the chip, updates the tone and presents the display.
    /// Returns `true` if a frame ran.
    pub fn tick<D, T>(
        &mut self,
        now: Instant,
        chip: &mut ChipSet,
        display: &mut D,
        tone: &mut T,
    ) -> Result<bool, ProcessError>
    where
        D: DisplayCommands + ?Sized,
        T: ToneCommands + ?Sized,
    {
        if let Some(last) = self.last_frame {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.interval {
                return Ok(false);
            }
            // keep the frame grid, so late frames do not drift the timing
            let behind = elapsed.as_nanos() % self.interval.as_nanos().max(1);
            self.last_frame = Some(now - Duration::from_nanos(behind as u64));
        } else {
            self.last_frame = Some(now);
        }

        let tick = chip.cycle(self.settings.speed)?;
        tone.set_tone(tick.tone);
        display.display(chip.display());
        chip.display_mut().take_dirty();
        self.frames += 1;

        log::trace!("frame {} {:?}", self.frames, tick);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::devices::{MockDisplayCommands, MockToneCommands};

    fn chip_with(program: &[u8]) -> ChipSet {
        let mut chip = ChipSet::new();
        chip.load_program(program).unwrap();
        chip
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.speed, 10);
        assert_eq!(settings.frame_rate, 60);
        assert_eq!(settings.interval(), timer::INTERVAL);
    }

    #[test]
    fn test_tick_presents_and_sets_tone() {
        // V0 = 0x05, sound timer = V0, jump to self
        let mut chip = chip_with(&[0x60, 0x05, 0xF0, 0x18, 0x12, 0x04]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().times(2).return_const(());
        let mut tone = MockToneCommands::new();
        tone.expect_set_tone().with(eq(true)).times(2).return_const(());

        let mut driver = DriverContext::new(Settings::default());
        let start = Instant::now();
        assert_eq!(driver.tick(start, &mut chip, &mut display, &mut tone), Ok(true));
        // not yet due
        assert_eq!(
            driver.tick(start + Duration::from_millis(1), &mut chip, &mut display, &mut tone),
            Ok(false)
        );
        assert_eq!(
            driver.tick(start + Duration::from_millis(20), &mut chip, &mut display, &mut tone),
            Ok(true)
        );
        assert_eq!(driver.frames(), 2);
        // 5 set, minus one per frame
        assert_eq!(chip.get_sound_timer(), 3);
        assert!(!chip.display().is_dirty());
    }

    #[test]
    fn test_tick_stops_tone() {
        let mut chip = chip_with(&[0x12, 0x00]);
        let mut display = MockDisplayCommands::new();
        display.expect_display().times(1).return_const(());
        let mut tone = MockToneCommands::new();
        tone.expect_set_tone().with(eq(false)).times(1).return_const(());

        let mut driver = DriverContext::new(Settings::default());
        assert_eq!(driver.tick(Instant::now(), &mut chip, &mut display, &mut tone), Ok(true));
    }

    #[test]
    fn test_tick_propagates_errors() {
        // return with an empty stack
        let mut chip = chip_with(&[0x00, 0xEE]);
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();
        let mut tone = MockToneCommands::new();
        tone.expect_set_tone().never();

        let mut driver = DriverContext::new(Settings::default());
        assert_eq!(
            driver.tick(Instant::now(), &mut chip, &mut display, &mut tone),
            Err(ProcessError::Stack(crate::StackError::Underflow))
        );
    }

    #[test]
    fn test_until_next() {
        let mut chip = chip_with(&[0x12, 0x00]);
        let mut display = MockDisplayCommands::new();
        display.expect_display().return_const(());
        let mut tone = MockToneCommands::new();
        tone.expect_set_tone().return_const(());

        let mut driver = DriverContext::new(Settings::default());
        let start = Instant::now();
        assert_eq!(driver.until_next(start), Duration::default());
        driver.tick(start, &mut chip, &mut display, &mut tone).unwrap();
        assert_eq!(driver.until_next(start), Settings::default().interval());
        assert_eq!(
            driver.until_next(start + Duration::from_secs(1)),
            Duration::default()
        );
    }
}
