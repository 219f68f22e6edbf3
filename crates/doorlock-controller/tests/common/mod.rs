//! Common test utilities for controller integration tests.
//!
//! A [`Rig`] wires an [`AccessController`] to a simulated pin bank, a
//! virtual clock and the parallel LCD driver, and keeps handles to all of
//! them so tests can press keys and inspect pins, timing and screen text.
//!
//! # Usage
//!
//! ```ignore
//! let mut rig = common::rig();
//! let outcome = rig.enter("1234");
//! assert!(outcome.is_granted());
//! assert_eq!(rig.lcd_text(), [" ACCESS GRANTED ", "  DOOR OPENING  "]);
//! ```
//!
//! Every key sequence handed to [`Rig::enter`] must complete an entry
//! (four symbols after the last `#`); otherwise the scanner keeps polling
//! an empty keypad.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use doorlock_controller::{AccessController, ControllerConfig, CycleOutcome};
use doorlock_hardware::mock::{KeypadHandle, PortOp, SimClock, SimulatedPort};
use doorlock_hardware::{DigitalPort, Direction, HardwareError, ParallelLcd, PinMap, PinMask};

pub type SimLcd = ParallelLcd<SimulatedPort, SimClock>;
pub type SimController = AccessController<SimulatedPort, SimClock, SimLcd>;
pub type FlakyController = AccessController<FlakyPort, SimClock, SimLcd>;

/// Reference code used by the default configuration.
pub const GOOD_CODE: &str = "1234";

/// Codes that never match the default credential.
pub const WRONG_CODES: [&str; 3] = ["1111", "2222", "3333"];

pub struct Rig {
    pub controller: SimController,
    pub port: SimulatedPort,
    pub keypad: KeypadHandle,
    pub clock: SimClock,
    pub pins: PinMap,
}

impl Rig {
    /// Build a rig without starting the controller.
    pub fn new(config: ControllerConfig) -> Self {
        let clock = SimClock::new();
        let (port, keypad) = SimulatedPort::new(&config.pins);
        let port = port.with_clock(clock.clone());
        let lcd = ParallelLcd::new(port.clone(), clock.clone(), config.pins.lcd);
        let controller = AccessController::new(port.clone(), clock.clone(), lcd, &config)
            .expect("valid test configuration");

        Self {
            controller,
            port,
            keypad,
            clock,
            pins: config.pins,
        }
    }

    /// Queue `keys` and run one access cycle.
    pub fn enter(&mut self, keys: &str) -> CycleOutcome {
        self.keypad.press_str(keys).expect("keys queued");
        self.controller.run_cycle().expect("cycle completes")
    }

    /// Both display rows as currently shown.
    pub fn lcd_text(&self) -> [String; 2] {
        self.port.lcd_lines()
    }

    pub fn buzzer(&self) -> PinMask {
        self.pins.indicators.buzzer.mask()
    }

    pub fn red_led(&self) -> PinMask {
        self.pins.indicators.red_led.mask()
    }

    pub fn green_led(&self) -> PinMask {
        self.pins.indicators.green_led.mask()
    }

    /// Recorded operations on the motor pins.
    pub fn motor_ops(&self) -> Vec<PortOp> {
        self.port.ops_touching(self.pins.motor.all())
    }
}

/// A started rig with the default configuration and a clean op log.
pub fn rig() -> Rig {
    rig_with(ControllerConfig::default())
}

/// A started rig with `config` and a clean op log.
pub fn rig_with(config: ControllerConfig) -> Rig {
    let mut rig = Rig::new(config);
    rig.controller.start().expect("controller starts");
    rig.port.clear_log();
    rig
}

/// Port wrapper whose `set` fails on selected pins until healed.
#[derive(Debug, Clone)]
pub struct FlakyPort {
    inner: SimulatedPort,
    stuck: Arc<AtomicU64>,
}

impl FlakyPort {
    pub fn new(inner: SimulatedPort) -> Self {
        Self {
            inner,
            stuck: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make every `set` touching `mask` fail.
    pub fn stick(&self, mask: PinMask) {
        self.stuck.store(mask.bits(), Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.stuck.store(0, Ordering::SeqCst);
    }
}

impl DigitalPort for FlakyPort {
    fn set_direction(
        &mut self,
        mask: PinMask,
        direction: Direction,
    ) -> doorlock_hardware::Result<()> {
        self.inner.set_direction(mask, direction)
    }

    fn set(&mut self, mask: PinMask) -> doorlock_hardware::Result<()> {
        let stuck = PinMask::from_bits(self.stuck.load(Ordering::SeqCst));
        if mask.intersects(stuck) {
            return Err(HardwareError::communication(format!("{mask:?} stuck low")));
        }
        self.inner.set(mask)
    }

    fn clear(&mut self, mask: PinMask) -> doorlock_hardware::Result<()> {
        self.inner.clear(mask)
    }

    fn read(&mut self, mask: PinMask) -> doorlock_hardware::Result<PinMask> {
        self.inner.read(mask)
    }
}

/// Like [`Rig`], but the actuators and the keypad go through a [`FlakyPort`].
///
/// The display is wired to the healthy port.
pub struct FlakyRig {
    pub controller: FlakyController,
    pub port: SimulatedPort,
    pub flaky: FlakyPort,
    pub keypad: KeypadHandle,
    pub pins: PinMap,
}

impl FlakyRig {
    /// A started rig with the default configuration and a clean op log.
    pub fn new() -> Self {
        let config = ControllerConfig::default();
        let clock = SimClock::new();
        let (port, keypad) = SimulatedPort::new(&config.pins);
        let port = port.with_clock(clock.clone());
        let flaky = FlakyPort::new(port.clone());
        let lcd = ParallelLcd::new(port.clone(), clock.clone(), config.pins.lcd);
        let mut controller = AccessController::new(flaky.clone(), clock, lcd, &config)
            .expect("valid test configuration");
        controller.start().expect("controller starts");
        port.clear_log();

        Self {
            controller,
            port,
            flaky,
            keypad,
            pins: config.pins,
        }
    }

    /// Queue `keys` and run one access cycle, returning its result.
    pub fn try_enter(&mut self, keys: &str) -> doorlock_core::Result<CycleOutcome> {
        self.keypad.press_str(keys).expect("keys queued");
        self.controller.run_cycle()
    }

    pub fn buzzer(&self) -> PinMask {
        self.pins.indicators.buzzer.mask()
    }

    pub fn red_led(&self) -> PinMask {
        self.pins.indicators.red_led.mask()
    }
}
