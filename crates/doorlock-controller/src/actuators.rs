//! Lock motor, status LEDs and buzzer.
//!
//! The bank is a stateless command surface: every call maps directly onto
//! pin operations. Timing-bound commands (motor pulse, tones) block for
//! their whole duration.

use doorlock_core::{Error, Result, Tone};
use doorlock_hardware::{Delay, DigitalPort, Direction, IndicatorPins, MotorPins, PinMask};
use tracing::debug;

/// Status indicator LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Led {
    Red,
    Green,
}

/// Rotation of the lock motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorDirection {
    /// Closes the door.
    Clockwise,
    /// Opens the door.
    Anticlockwise,
}

/// Actuators driven over a digital port.
#[derive(Debug, Clone)]
pub struct ActuatorBank<P, D> {
    port: P,
    delay: D,
    motor: MotorPins,
    indicators: IndicatorPins,
}

impl<P: DigitalPort, D: Delay> ActuatorBank<P, D> {
    pub fn new(port: P, delay: D, motor: MotorPins, indicators: IndicatorPins) -> Self {
        Self {
            port,
            delay,
            motor,
            indicators,
        }
    }

    /// Configure every actuator pin as an output and put it at rest.
    ///
    /// # Errors
    /// Returns an error if the port cannot be configured.
    pub fn init(&mut self) -> Result<()> {
        self.port
            .set_direction(self.motor.all() | self.indicators.all(), Direction::Output)?;
        self.motor_stop()?;
        self.port.clear(self.indicators.all())?;
        debug!("Actuators initialised");
        Ok(())
    }

    pub fn motor_clockwise(&mut self) -> Result<()> {
        self.port.set(self.motor.dir1.mask())?;
        self.port.clear(self.motor.dir2.mask())?;
        self.port.set(self.motor.enable.mask())?;
        Ok(())
    }

    pub fn motor_anticlockwise(&mut self) -> Result<()> {
        self.port.clear(self.motor.dir1.mask())?;
        self.port.set(self.motor.dir2.mask())?;
        self.port.set(self.motor.enable.mask())?;
        Ok(())
    }

    /// Stop the motor. The enable line drops before the direction lines.
    pub fn motor_stop(&mut self) -> Result<()> {
        self.port.clear(self.motor.enable.mask())?;
        self.port.clear(self.motor.dir1.mask() | self.motor.dir2.mask())?;
        Ok(())
    }

    /// Drive the motor in `direction` for `duration_ms`, then stop it.
    ///
    /// # Errors
    /// Returns an error if the port cannot be written.
    pub fn motor_pulse(&mut self, direction: MotorDirection, duration_ms: u32) -> Result<()> {
        match direction {
            MotorDirection::Clockwise => self.motor_clockwise()?,
            MotorDirection::Anticlockwise => self.motor_anticlockwise()?,
        }
        self.delay.delay_ms(duration_ms);
        self.motor_stop()
    }

    pub fn led_on(&mut self, led: Led) -> Result<()> {
        let mask = self.led_pin(led);
        self.port.set(mask)?;
        Ok(())
    }

    pub fn led_off(&mut self, led: Led) -> Result<()> {
        let mask = self.led_pin(led);
        self.port.clear(mask)?;
        Ok(())
    }

    /// Hold the buzzer line high.
    pub fn buzzer_on(&mut self) -> Result<()> {
        self.port.set(self.indicators.buzzer.mask())?;
        Ok(())
    }

    pub fn buzzer_off(&mut self) -> Result<()> {
        self.port.clear(self.indicators.buzzer.mask())?;
        Ok(())
    }

    /// Play a square wave on the buzzer.
    ///
    /// # Errors
    /// Returns `Error::InvalidTone` without touching the buzzer when the
    /// frequency is zero or too high to synthesise.
    pub fn beep(&mut self, duration_ms: u32, frequency_hz: u32) -> Result<()> {
        self.beep_tone(Tone::new(duration_ms, frequency_hz))
    }

    /// Play `tone` on the buzzer, see [`beep`](Self::beep).
    ///
    /// # Errors
    /// Returns `Error::InvalidTone` for an unplayable tone, or a port error.
    pub fn beep_tone(&mut self, tone: Tone) -> Result<()> {
        let half_period_us = tone.half_period_us().ok_or(Error::InvalidTone {
            frequency_hz: tone.frequency_hz,
        })?;
        let buzzer = self.indicators.buzzer.mask();

        for _ in 0..tone.cycles()? {
            self.port.set(buzzer)?;
            self.delay.delay_us(half_period_us);
            self.port.clear(buzzer)?;
            self.delay.delay_us(half_period_us);
        }
        Ok(())
    }

    fn led_pin(&self, led: Led) -> PinMask {
        match led {
            Led::Red => self.indicators.red_led.mask(),
            Led::Green => self.indicators.green_led.mask(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_hardware::PinMap;
    use doorlock_hardware::mock::{PinAction, SimClock, SimulatedPort};
    use rstest::rstest;

    fn bank() -> (ActuatorBank<SimulatedPort, SimClock>, SimulatedPort, SimClock, PinMap) {
        let pins = PinMap::default();
        let clock = SimClock::new();
        let (port, _keypad) = SimulatedPort::new(&pins);
        let port = port.with_clock(clock.clone());
        let mut bank = ActuatorBank::new(port.clone(), clock.clone(), pins.motor, pins.indicators);
        bank.init().unwrap();
        port.clear_log();
        (bank, port, clock, pins)
    }

    #[test]
    fn test_init_configures_outputs_at_rest() {
        let (_bank, port, _clock, pins) = bank();
        assert!(port.is_output(pins.motor.all() | pins.indicators.all()));
        for pin in [
            pins.motor.dir1,
            pins.motor.dir2,
            pins.motor.enable,
            pins.indicators.red_led,
            pins.indicators.green_led,
            pins.indicators.buzzer,
        ] {
            assert!(!port.is_high(pin.mask()), "{pin} should be low");
        }
    }

    #[test]
    fn test_motor_stop_clears_enable_first() {
        let (mut bank, port, _clock, pins) = bank();
        bank.motor_anticlockwise().unwrap();
        port.clear_log();
        bank.motor_stop().unwrap();

        let ops = port.ops();
        assert_eq!(ops[0].action, PinAction::Clear);
        assert_eq!(ops[0].mask, pins.motor.enable.mask());
        assert_eq!(ops[1].mask, pins.motor.dir1.mask() | pins.motor.dir2.mask());
    }

    #[rstest]
    #[case(MotorDirection::Clockwise, true, false)]
    #[case(MotorDirection::Anticlockwise, false, true)]
    fn test_motor_direction_pins(
        #[case] direction: MotorDirection,
        #[case] dir1_high: bool,
        #[case] dir2_high: bool,
    ) {
        let (mut bank, port, _clock, pins) = bank();
        match direction {
            MotorDirection::Clockwise => bank.motor_clockwise().unwrap(),
            MotorDirection::Anticlockwise => bank.motor_anticlockwise().unwrap(),
        }
        assert_eq!(port.is_high(pins.motor.dir1.mask()), dir1_high);
        assert_eq!(port.is_high(pins.motor.dir2.mask()), dir2_high);
        assert!(port.is_high(pins.motor.enable.mask()));

        // Enable goes high last.
        let last = port.ops().last().copied().unwrap();
        assert_eq!(last.mask, pins.motor.enable.mask());
    }

    #[test]
    fn test_motor_pulse_runs_for_duration_then_stops() {
        let (mut bank, port, clock, pins) = bank();
        bank.motor_pulse(MotorDirection::Anticlockwise, 300).unwrap();
        assert_eq!(clock.now_ms(), 300);
        assert!(!port.is_high(pins.motor.enable.mask()));
        assert!(!port.is_high(pins.motor.dir2.mask()));
    }

    #[rstest]
    #[case(Led::Red)]
    #[case(Led::Green)]
    fn test_led_on_off(#[case] led: Led) {
        let (mut bank, port, _clock, pins) = bank();
        let mask = match led {
            Led::Red => pins.indicators.red_led.mask(),
            Led::Green => pins.indicators.green_led.mask(),
        };
        bank.led_on(led).unwrap();
        assert!(port.is_high(mask));
        bank.led_off(led).unwrap();
        assert!(!port.is_high(mask));
    }

    #[rstest]
    #[case(500, 5000, 2500)]
    #[case(500, 1000, 500)]
    #[case(200, 500, 100)]
    #[case(1, 400, 0)]
    fn test_beep_cycle_count(
        #[case] duration_ms: u32,
        #[case] frequency_hz: u32,
        #[case] expected_cycles: u64,
    ) {
        let (mut bank, port, _clock, pins) = bank();
        let buzzer = pins.indicators.buzzer.mask();
        bank.beep(duration_ms, frequency_hz).unwrap();
        assert_eq!(port.rising_edges(buzzer), expected_cycles);
        assert!(!port.is_high(buzzer));
    }

    #[test]
    fn test_beep_takes_about_the_requested_duration() {
        let (mut bank, _port, clock, _pins) = bank();
        bank.beep(500, 1000).unwrap();
        assert_eq!(clock.now_us(), 500_000);
    }

    #[rstest]
    #[case(0)]
    #[case(1_000_001)]
    fn test_beep_rejects_unplayable_frequency(#[case] frequency_hz: u32) {
        let (mut bank, port, clock, _pins) = bank();
        assert!(matches!(
            bank.beep(500, frequency_hz),
            Err(Error::InvalidTone { .. })
        ));
        assert!(port.ops().is_empty());
        assert_eq!(clock.now_us(), 0);
    }

    #[test]
    fn test_buzzer_hold() {
        let (mut bank, port, _clock, pins) = bank();
        let buzzer = pins.indicators.buzzer.mask();
        bank.buzzer_on().unwrap();
        assert!(port.is_high(buzzer));
        bank.buzzer_off().unwrap();
        assert!(!port.is_high(buzzer));
        assert_eq!(port.rising_edges(buzzer), 1);
    }
}
