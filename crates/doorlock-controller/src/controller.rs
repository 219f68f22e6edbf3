//! Access controller and main loop.
//!
//! The controller owns every piece of mutable state of the lock (entry
//! buffer, attempt counter, door state, alarm flag) and sequences the
//! scanner, the actuators and the display through one access cycle at a
//! time:
//!
//! 1. lockout guard: too many wrong codes lock the keypad for the cooldown
//! 2. entry prompt
//! 3. key collection until the buffer is full (`#` starts over)
//! 4. validation, feedback and door actuation
//!
//! Display failures are logged and otherwise ignored so the door keeps
//! working with a dead screen. Keypad and actuator failures end the cycle.

use std::collections::VecDeque;
use std::convert::Infallible;

use doorlock_core::constants::{
    KEYPRESS_PAUSE_MS, MASK_GLYPH, POST_VALIDATION_PAUSE_MS, SPLASH_HOLD_MS, SUCCESS_HOLD_MS,
};
use doorlock_core::{Credential, DoorState, EnteredBuffer, Error, Result};
use doorlock_hardware::{CharacterDisplay, Delay, DigitalPort};
use tracing::{debug, info, warn};

use crate::actuators::{ActuatorBank, MotorDirection};
use crate::alert::Alert;
use crate::config::ControllerConfig;
use crate::keypad::KeypadScanner;
use crate::screens::Screen;
use crate::state_machine::{AccessState, StateMachine, StateTransition};

/// Result of one access cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The code matched; `door` is the state the door was moved to.
    Granted { door: DoorState, after_lockout: bool },
    /// The code did not match; `attempts` counts consecutive mismatches.
    Denied { attempts: u8, after_lockout: bool },
}

impl CycleOutcome {
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, CycleOutcome::Granted { .. })
    }

    /// Whether a lockout ran before the code was collected.
    #[must_use]
    pub fn after_lockout(&self) -> bool {
        match *self {
            CycleOutcome::Granted { after_lockout, .. }
            | CycleOutcome::Denied { after_lockout, .. } => after_lockout,
        }
    }

    fn with_lockout(self, ran: bool) -> Self {
        match self {
            CycleOutcome::Granted { door, .. } => CycleOutcome::Granted {
                door,
                after_lockout: ran,
            },
            CycleOutcome::Denied { attempts, .. } => CycleOutcome::Denied {
                attempts,
                after_lockout: ran,
            },
        }
    }
}

/// Keypad door lock controller.
///
/// Generic over the digital port `P`, the delay `D` and the display `L`.
/// The port and the delay are cloned into the scanner and the actuator
/// bank, so clones must refer to the same hardware.
///
/// # Examples
///
/// ```
/// use doorlock_controller::{AccessController, ControllerConfig};
/// use doorlock_core::DoorState;
/// use doorlock_hardware::ParallelLcd;
/// use doorlock_hardware::mock::{SimClock, SimulatedPort};
///
/// let config = ControllerConfig::default();
/// let clock = SimClock::new();
/// let (port, keypad) = SimulatedPort::new(&config.pins);
/// let lcd = ParallelLcd::new(port.clone(), clock.clone(), config.pins.lcd);
///
/// let mut controller = AccessController::new(port, clock, lcd, &config).unwrap();
/// controller.start().unwrap();
///
/// keypad.press_str("1234").unwrap();
/// let outcome = controller.run_cycle().unwrap();
/// assert!(outcome.is_granted());
/// assert_eq!(controller.door_state(), DoorState::Open);
/// ```
pub struct AccessController<P, D, L> {
    scanner: KeypadScanner<P, D>,
    actuators: ActuatorBank<P, D>,
    display: L,
    delay: D,

    credential: Credential,
    max_wrong_attempts: u8,
    motor_pulse_ms: u32,
    lockout_cooldown_ms: u32,

    buffer: EnteredBuffer,
    attempts: u8,
    door: DoorState,
    alarm_active: bool,
    machine: StateMachine,
}

impl<P, D, L> AccessController<P, D, L>
where
    P: DigitalPort + Clone,
    D: Delay + Clone,
    L: CharacterDisplay,
{
    /// Build a controller from a validated configuration.
    ///
    /// No hardware is touched until [`start`](Self::start).
    ///
    /// # Errors
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(port: P, delay: D, display: L, config: &ControllerConfig) -> Result<Self> {
        config.validate()?;
        let pins = &config.pins;

        Ok(Self {
            scanner: KeypadScanner::new(port.clone(), delay.clone(), pins.keypad, &config.timing),
            actuators: ActuatorBank::new(port, delay.clone(), pins.motor, pins.indicators),
            display,
            delay,
            credential: config.credential()?,
            max_wrong_attempts: config.max_wrong_attempts,
            motor_pulse_ms: config.timing.motor_pulse_ms,
            lockout_cooldown_ms: config.timing.lockout_cooldown_ms,
            buffer: EnteredBuffer::new(),
            attempts: 0,
            door: DoorState::default(),
            alarm_active: false,
            machine: StateMachine::new(),
        })
    }

    /// Initialise the hardware and show the splash screen.
    ///
    /// # Errors
    /// Returns an error if the keypad or actuator pins cannot be configured.
    pub fn start(&mut self) -> Result<()> {
        self.actuators.init()?;
        self.scanner.init()?;
        if let Err(e) = self.display.init() {
            warn!(error = %e, "Display initialisation failed, continuing without it");
        }

        self.show(Screen::Splash);
        self.delay.delay_ms(SPLASH_HOLD_MS);
        info!(
            max_wrong_attempts = self.max_wrong_attempts,
            "Door lock controller ready"
        );
        Ok(())
    }

    /// Start the controller and run access cycles forever.
    ///
    /// Only returns when a collaborator fails, e.g. the keypad input source
    /// goes away.
    ///
    /// # Errors
    /// Returns the error that stopped the loop.
    pub fn run(&mut self) -> Result<Infallible> {
        self.start()?;
        loop {
            let outcome = self.run_cycle()?;
            debug!(?outcome, "Access cycle complete");
        }
    }

    /// Run one access cycle: lockout guard, prompt, entry and validation.
    ///
    /// # Errors
    /// Returns an error if the keypad or the actuators fail.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let locked_out = self.attempts >= self.max_wrong_attempts;
        if locked_out {
            self.lockout()?;
        }

        self.show(Screen::Prompt);
        let outcome = self.process_entry()?;

        if self.alarm_active {
            // A passive alert was cut short; clear the stale flag and replay it.
            warn!("Alarm flag still set after cycle, replaying passive alert");
            self.alarm_active = false;
            self.alert(Alert::Passive)?;
        }

        Ok(outcome.with_lockout(locked_out))
    }

    /// Hold the lockout alarm for the cooldown, then reset the attempt counter.
    ///
    /// If the alarm cannot be driven, the outputs are released, the flow
    /// returns to `AwaitingEntry` and the attempt counter is kept, so the
    /// next cycle locks out again.
    ///
    /// # Errors
    /// Returns an error if the alarm outputs cannot be driven.
    pub fn lockout(&mut self) -> Result<()> {
        self.machine.transition_to(AccessState::Lockout)?;
        warn!(
            attempts = self.attempts,
            cooldown_ms = self.lockout_cooldown_ms,
            "Too many wrong codes, keypad locked"
        );

        let held = self.hold_lockout_alarm();
        let released = self.release_lockout_alarm();
        if let Err(e) = held.and(released) {
            self.abandon_cycle(&e);
            return Err(e);
        }

        self.attempts = 0;
        self.machine.transition_to(AccessState::AwaitingEntry)?;
        info!("Lockout over");
        Ok(())
    }

    /// Collect keypresses until a full code is entered, then validate it.
    ///
    /// Any symbols left over from an interrupted cycle are discarded first.
    /// Every key is acknowledged with the mask glyph. `#` discards the
    /// partial entry and shows the prompt again without counting an attempt.
    ///
    /// # Errors
    /// Returns an error if the keypad or the actuators fail. The flow is back
    /// in `AwaitingEntry` afterwards.
    pub fn process_entry(&mut self) -> Result<CycleOutcome> {
        self.buffer.clear();
        loop {
            let symbol = self.scanner.get_key()?;
            self.acknowledge_key();

            if symbol.is_cancel() {
                debug!(discarded = self.buffer.len(), "Entry cancelled");
                self.buffer.clear();
                self.show(Screen::Prompt);
                continue;
            }

            let filled = self.buffer.push(symbol)?;
            self.alert(Alert::Keypress)?;
            self.delay.delay_ms(KEYPRESS_PAUSE_MS);
            debug!(filled, "Symbol accepted");

            if self.buffer.is_full() {
                break;
            }
        }

        self.machine.transition_to(AccessState::Validating)?;
        let outcome = self.validate();
        self.buffer.clear();
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.abandon_cycle(&e);
                return Err(e);
            }
        };

        self.delay.delay_ms(POST_VALIDATION_PAUSE_MS);
        self.machine.transition_to(AccessState::AwaitingEntry)?;
        Ok(outcome)
    }

    /// Run the feedback sequence for `alert`.
    ///
    /// A passive alert requested while one is already running is ignored.
    ///
    /// # Errors
    /// Returns an error if the LEDs or the buzzer cannot be driven.
    pub fn alert(&mut self, alert: Alert) -> Result<()> {
        match alert {
            Alert::Passive => {
                if self.alarm_active {
                    debug!("Passive alert already running");
                    return Ok(());
                }
                self.alarm_active = true;
                self.flash(alert, 0)?;
                self.alarm_active = false;
            }
            Alert::Success => {
                self.flash(alert, SUCCESS_HOLD_MS)?;
                self.alarm_active = false;
            }
            Alert::Keypress => self.flash(alert, 0)?,
            Alert::Lockout => {
                if let Some(led) = alert.indicator() {
                    self.actuators.led_on(led)?;
                }
                self.actuators.buzzer_on()?;
            }
        }
        Ok(())
    }

    /// Consecutive wrong codes since the last success or lockout.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub fn door_state(&self) -> DoorState {
        self.door
    }

    pub fn state(&self) -> AccessState {
        self.machine.current_state()
    }

    pub fn alarm_active(&self) -> bool {
        self.alarm_active
    }

    /// Number of symbols entered so far in the current cycle.
    pub fn entered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Recent state transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    fn validate(&mut self) -> Result<CycleOutcome> {
        if self.credential.matches(self.buffer.as_slice()) {
            self.attempts = 0;
            let before = self.door;
            info!(door = %before, "Access granted");

            self.show(Screen::Granted { door: before });
            self.alert(Alert::Success)?;
            self.actuate_door()?;

            Ok(CycleOutcome::Granted {
                door: self.door,
                after_lockout: false,
            })
        } else {
            self.attempts = self.attempts.saturating_add(1);
            warn!(
                attempts = self.attempts,
                max = self.max_wrong_attempts,
                "Access denied"
            );

            self.show(Screen::Denied);
            self.alert(Alert::Passive)?;

            Ok(CycleOutcome::Denied {
                attempts: self.attempts,
                after_lockout: false,
            })
        }
    }

    fn hold_lockout_alarm(&mut self) -> Result<()> {
        self.show(Screen::Lockout);
        self.alert(Alert::Lockout)?;
        self.delay.delay_ms(self.lockout_cooldown_ms);
        Ok(())
    }

    /// Switch the alarm outputs off, attempting every output even if one fails.
    fn release_lockout_alarm(&mut self) -> Result<()> {
        let buzzer = self.actuators.buzzer_off();
        let led = match Alert::Lockout.indicator() {
            Some(led) => self.actuators.led_off(led),
            None => Ok(()),
        };
        buzzer.and(led)
    }

    fn abandon_cycle(&mut self, error: &Error) {
        if let Some(transition) = self.machine.reset() {
            warn!(%error, from = %transition.from, "Access cycle abandoned");
        }
    }

    fn actuate_door(&mut self) -> Result<()> {
        let direction = match self.door {
            DoorState::Closed => MotorDirection::Anticlockwise,
            DoorState::Open => MotorDirection::Clockwise,
        };
        self.actuators.motor_pulse(direction, self.motor_pulse_ms)?;
        self.door = self.door.toggled();
        info!(door = %self.door, "Door actuated");
        Ok(())
    }

    /// Light the alert's LED, play its tone, hold, then release the LED.
    fn flash(&mut self, alert: Alert, hold_ms: u32) -> Result<()> {
        let led = alert.indicator();
        if let Some(led) = led {
            self.actuators.led_on(led)?;
        }
        if let Some(tone) = alert.tone() {
            self.actuators.beep_tone(tone)?;
        }
        if hold_ms > 0 {
            self.delay.delay_ms(hold_ms);
        }
        if let Some(led) = led {
            self.actuators.led_off(led)?;
        }
        Ok(())
    }

    fn acknowledge_key(&mut self) {
        if let Err(e) = self.display.write_char(MASK_GLYPH) {
            warn!(error = %e, "Keypress acknowledgment not shown");
        }
    }

    fn show(&mut self, screen: Screen) {
        if let Err(e) = self.draw(screen) {
            warn!(error = %e, ?screen, "Display update failed");
        }
    }

    fn draw(&mut self, screen: Screen) -> doorlock_hardware::Result<()> {
        let [top, bottom] = screen.lines();
        self.display.clear()?;
        self.display.set_cursor(0, 0)?;
        self.display.write_string(&top)?;
        self.display.set_cursor(1, 0)?;
        self.display.write_string(&bottom)?;
        if let Some((row, column)) = screen.cursor() {
            self.display.set_cursor(row, column)?;
        }
        Ok(())
    }
}
