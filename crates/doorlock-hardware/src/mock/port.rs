//! Simulated GPIO bank with an attached keypad matrix and display model.
//!
//! The port keeps output latches and directions for the whole logical pin
//! space. Two peripherals are modelled on top of it:
//!
//! - a keypad matrix: columns read high through pull-ups and read low when
//!   the held key's row is driven low. Key presses arrive through a channel
//!   fed by a [`KeypadHandle`]; each press is sensed once and then released.
//! - a character display: bytes on the data bus are latched on the falling
//!   edge of EN, decoded as commands (RS low) or characters (RS high).
//!
//! Clones share the same state, so every component can own its own handle
//! to the bank while tests inspect it from outside.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use doorlock_core::KeySymbol;
use doorlock_core::constants::{
    DISPLAY_COLUMNS, DISPLAY_ROWS, KEYPAD_COLUMNS, KEYPAD_ROWS, LCD_CMD_CLEAR,
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::trace;

use crate::error::{HardwareError, Result};
use crate::mock::SimClock;
use crate::traits::DigitalPort;
use crate::types::{Direction, LcdPins, PIN_COUNT, PinMap, PinMask};

/// Bytes of display RAM per row.
const DDRAM_ROW_LENGTH: usize = 40;

/// DDRAM address of the first character of the second row.
const DDRAM_ROW1_START: u8 = 0x40;

/// Kind of operation applied to the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    Output,
    Input,
    Set,
    Clear,
}

/// A recorded port operation, stamped with virtual time when a clock is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortOp {
    pub at_us: u64,
    pub action: PinAction,
    pub mask: PinMask,
}

/// Simulated GPIO bank.
///
/// # Examples
///
/// ```
/// use doorlock_core::KeySymbol;
/// use doorlock_hardware::mock::SimulatedPort;
/// use doorlock_hardware::traits::DigitalPort;
/// use doorlock_hardware::types::{Direction, PinMap};
///
/// let pins = PinMap::default();
/// let (mut port, keypad) = SimulatedPort::new(&pins);
/// keypad.press(KeySymbol::Digit(5)).unwrap();
///
/// // Drive row 1 low, others high, and sense the columns.
/// port.set_direction(pins.keypad.row_mask(), Direction::Output).unwrap();
/// port.set(pins.keypad.row_mask()).unwrap();
/// port.clear(pins.keypad.rows[1].mask()).unwrap();
///
/// let levels = port.read(pins.keypad.column_mask()).unwrap();
/// assert!(!levels.contains(pins.keypad.columns[1].mask()));
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedPort {
    state: Arc<Mutex<PortState>>,
}

#[derive(Debug)]
struct PortState {
    outputs: PinMask,
    levels: PinMask,
    clock: Option<SimClock>,
    record_ops: bool,
    ops: Vec<PortOp>,
    rising_edges: [u64; PIN_COUNT as usize],
    keypad: KeypadMatrix,
    display: DisplayModel,
}

#[derive(Debug)]
struct KeypadMatrix {
    rows: [PinMask; KEYPAD_ROWS],
    columns: [PinMask; KEYPAD_COLUMNS],
    presses: mpsc::UnboundedReceiver<KeySymbol>,
    held: Option<(usize, usize)>,
}

#[derive(Debug)]
struct DisplayModel {
    pins: LcdPins,
    ddram: [[u8; DDRAM_ROW_LENGTH]; 2],
    address: u8,
    log_commands: bool,
    commands: Vec<u8>,
}

impl SimulatedPort {
    /// Create a simulated bank wired according to `pins`.
    ///
    /// Returns the port and the handle used to press keys on its keypad.
    /// Once every handle is dropped and all presses are consumed, reading
    /// the keypad columns fails with `HardwareError::Disconnected`.
    pub fn new(pins: &PinMap) -> (Self, KeypadHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let state = PortState {
            outputs: PinMask::EMPTY,
            levels: PinMask::EMPTY,
            clock: None,
            record_ops: true,
            ops: Vec::new(),
            rising_edges: [0; PIN_COUNT as usize],
            keypad: KeypadMatrix {
                rows: pins.keypad.rows.map(|pin| pin.mask()),
                columns: pins.keypad.columns.map(|pin| pin.mask()),
                presses: rx,
                held: None,
            },
            display: DisplayModel::new(pins.lcd),
        };

        let port = Self {
            state: Arc::new(Mutex::new(state)),
        };
        (port, KeypadHandle { tx })
    }

    /// Stamp recorded operations with the time of `clock`.
    pub fn with_clock(self, clock: SimClock) -> Self {
        self.inspect().clock = Some(clock);
        self
    }

    /// Stop recording port operations and display commands.
    ///
    /// Edge counters, the keypad and the visible display text still work.
    pub fn without_op_log(self) -> Self {
        {
            let mut state = self.inspect();
            state.record_ops = false;
            state.ops.clear();
            state.display.log_commands = false;
            state.display.commands.clear();
        }
        self
    }

    /// Returns `true` if every pin in `mask` is driven high.
    pub fn is_high(&self, mask: PinMask) -> bool {
        self.inspect().levels.contains(mask)
    }

    /// Returns `true` if every pin in `mask` is configured as an output.
    pub fn is_output(&self, mask: PinMask) -> bool {
        self.inspect().outputs.contains(mask)
    }

    /// Every recorded operation, oldest first.
    pub fn ops(&self) -> Vec<PortOp> {
        self.inspect().ops.clone()
    }

    /// Recorded operations that touch at least one pin of `mask`.
    pub fn ops_touching(&self, mask: PinMask) -> Vec<PortOp> {
        self.inspect()
            .ops
            .iter()
            .filter(|op| op.mask.intersects(mask))
            .copied()
            .collect()
    }

    /// Number of low-to-high transitions on the pins of `mask`.
    pub fn rising_edges(&self, mask: PinMask) -> u64 {
        let state = self.inspect();
        mask.pins()
            .map(|n| state.rising_edges[usize::from(n)])
            .sum()
    }

    /// Forget recorded operations and edge counts.
    pub fn clear_log(&self) {
        let mut state = self.inspect();
        state.ops.clear();
        state.rising_edges = [0; PIN_COUNT as usize];
    }

    /// Visible text of the display, one string per row.
    pub fn lcd_lines(&self) -> [String; DISPLAY_ROWS as usize] {
        let state = self.inspect();
        [0, 1].map(|row| state.display.visible_row(row))
    }

    /// Instruction bytes the display has latched, oldest first.
    pub fn lcd_commands(&self) -> Vec<u8> {
        self.inspect().display.commands.clone()
    }

    fn lock(&self) -> Result<MutexGuard<'_, PortState>> {
        self.state
            .lock()
            .map_err(|_| HardwareError::communication("Simulated port state poisoned"))
    }

    fn inspect(&self) -> MutexGuard<'_, PortState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PortState {
    fn record(&mut self, action: PinAction, mask: PinMask) {
        if !self.record_ops {
            return;
        }
        let at_us = self.clock.as_ref().map_or(0, SimClock::now_us);
        self.ops.push(PortOp {
            at_us,
            action,
            mask,
        });
    }
}

impl DigitalPort for SimulatedPort {
    fn set_direction(&mut self, mask: PinMask, direction: Direction) -> Result<()> {
        let mut state = self.lock()?;
        match direction {
            Direction::Output => {
                state.outputs = state.outputs | mask;
                state.record(PinAction::Output, mask);
            }
            Direction::Input => {
                state.outputs = state.outputs & !mask;
                state.record(PinAction::Input, mask);
            }
        }
        Ok(())
    }

    fn set(&mut self, mask: PinMask) -> Result<()> {
        let mut state = self.lock()?;
        let rising = mask & !state.levels;
        for n in rising.pins() {
            state.rising_edges[usize::from(n)] += 1;
        }
        state.levels = state.levels | mask;
        state.record(PinAction::Set, mask);
        Ok(())
    }

    fn clear(&mut self, mask: PinMask) -> Result<()> {
        let mut state = self.lock()?;
        let before = state.levels;
        state.levels = state.levels & !mask;
        state.record(PinAction::Clear, mask);

        let en = state.display.pins.en.mask();
        if mask.contains(en) && before.contains(en) {
            let display = &mut state.display;
            let bus = (before & display.pins.data_mask()).bits();
            let byte = (bus >> display.pins.data_shift()) as u8;
            let is_data = before.contains(display.pins.rs.mask());
            display.latch(byte, is_data);
        }
        Ok(())
    }

    fn read(&mut self, mask: PinMask) -> Result<PinMask> {
        let mut state = self.lock()?;
        let column_mask = state
            .keypad
            .columns
            .iter()
            .fold(PinMask::EMPTY, |acc, &c| acc | c);

        // Inputs float high through pull-ups; outputs read back their latch.
        let inputs = mask & !state.outputs;
        let mut levels = (state.levels & state.outputs & mask) | inputs;

        if mask.intersects(column_mask) {
            let outputs = state.outputs;
            let driven = state.levels;
            let keypad = &mut state.keypad;
            keypad.poll()?;

            if let Some((row, column)) = keypad.held {
                let row_mask = keypad.rows[row];
                let column_pin = keypad.columns[column];
                let row_active = outputs.contains(row_mask) && !driven.intersects(row_mask);
                if row_active && mask.contains(column_pin) {
                    levels = levels & !column_pin;
                    keypad.held = None;
                    trace!(row, column, "Simulated key sensed and released");
                }
            }
        }

        Ok(levels)
    }
}

impl KeypadMatrix {
    fn poll(&mut self) -> Result<()> {
        while self.held.is_none() {
            match self.presses.try_recv() {
                Ok(symbol) => self.held = symbol.position(),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(HardwareError::disconnected("simulated keypad"));
                }
            }
        }
        Ok(())
    }
}

impl DisplayModel {
    fn new(pins: LcdPins) -> Self {
        Self {
            pins,
            ddram: [[b' '; DDRAM_ROW_LENGTH]; 2],
            address: 0,
            log_commands: true,
            commands: Vec::new(),
        }
    }

    fn latch(&mut self, byte: u8, is_data: bool) {
        if is_data {
            self.write(byte);
            return;
        }

        if self.log_commands {
            self.commands.push(byte);
        }
        if byte == LCD_CMD_CLEAR {
            self.ddram = [[b' '; DDRAM_ROW_LENGTH]; 2];
            self.address = 0;
        } else if byte & 0x80 != 0 {
            self.address = byte & 0x7F;
        }
    }

    fn write(&mut self, byte: u8) {
        let (row, column) = if self.address >= DDRAM_ROW1_START {
            (1, usize::from(self.address - DDRAM_ROW1_START))
        } else {
            (0, usize::from(self.address))
        };

        if column < DDRAM_ROW_LENGTH {
            self.ddram[row][column] = byte;
        }

        // Address counter runs off the end of row 0 into row 1 and wraps.
        self.address = match self.address + 1 {
            a if a == DDRAM_ROW_LENGTH as u8 => DDRAM_ROW1_START,
            a if a == DDRAM_ROW1_START + DDRAM_ROW_LENGTH as u8 => 0,
            a => a,
        };
    }

    fn visible_row(&self, row: usize) -> String {
        self.ddram[row][..usize::from(DISPLAY_COLUMNS)]
            .iter()
            .map(|&b| char::from(b))
            .collect()
    }
}

/// Handle for pressing keys on a simulated keypad.
///
/// Presses are queued and sensed by the scanner one at a time, in order.
/// The handle can be cloned and moved to another thread.
#[derive(Debug, Clone)]
pub struct KeypadHandle {
    tx: mpsc::UnboundedSender<KeySymbol>,
}

impl KeypadHandle {
    /// Queue a single key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulated port has been dropped.
    pub fn press(&self, symbol: KeySymbol) -> Result<()> {
        self.tx
            .send(symbol)
            .map_err(|_| HardwareError::disconnected("simulated port"))
    }

    /// Queue one press per character of `keys`, ignoring whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if a character is outside the keypad alphabet (nothing
    /// is queued in that case) or the simulated port has been dropped.
    pub fn press_str(&self, keys: &str) -> Result<()> {
        let symbols = keys
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(KeySymbol::from_char)
            .collect::<doorlock_core::Result<Vec<_>>>()
            .map_err(|e| HardwareError::invalid_data(e.to_string()))?;

        for symbol in symbols {
            self.press(symbol)?;
        }
        Ok(())
    }
}
