/// Represents a timer inside of the chip infrastructure, it counts down to
/// zero by one on every tick of the driver (60Hz).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    value: u8,
}

impl Timer {
    pub fn new(value: u8) -> Self {
        Self { value }
    }

    /// Restarts the countdown from `value`.
    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Counts down by one, stops at zero.
    pub fn tick(&mut self) {
        self.value = self.value.saturating_sub(1);
    }

    pub fn is_active(&self) -> bool {
        self.value > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::timer::HERTZ;

    #[test]
    fn test_timer() {
        let mut timer = Timer::new(HERTZ as u8);
        assert!(timer.is_active());
        for _ in 0..HERTZ {
            timer.tick();
        }
        assert_eq!(timer.get_value(), 0);
        assert!(!timer.is_active());

        // never below zero
        timer.tick();
        assert_eq!(timer.get_value(), 0);

        timer.set_value(2);
        timer.tick();
        assert_eq!(timer.get_value(), 1);
    }
}
