//! Door lock host emulator.
//!
//! Runs the access controller against the simulated pin bank. Each line
//! read from stdin is typed on the keypad, one key per character; the
//! display contents are printed after every access cycle. The emulator
//! exits when stdin closes.
//!
//! # Usage
//!
//! ```bash
//! # Reference configuration, real-time delays
//! echo "1234" | doorlock
//!
//! # Custom configuration on a virtual clock
//! doorlock --config lock.json --fast
//! ```

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use doorlock_controller::{AccessController, ControllerConfig};
use doorlock_hardware::mock::{KeypadHandle, SimClock, SimulatedPort};
use doorlock_hardware::{Delay, ParallelLcd, StdDelay};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keypad door lock emulator
#[derive(Parser, Debug)]
#[command(name = "doorlock")]
#[command(about = "Keypad door lock controller running on a simulated board")]
#[command(version)]
struct Args {
    /// Path to a JSON controller configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use a virtual clock instead of sleeping
    #[arg(long)]
    fast: bool,

    /// Log level (trace, debug, info, warn, error) when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let config = match &args.config {
        Some(path) => ControllerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ControllerConfig::default(),
    };

    if args.fast {
        emulate(&config, FastDelay::default())
    } else {
        emulate(&config, StdDelay)
    }
}

fn emulate<D: Delay + Clone>(config: &ControllerConfig, delay: D) -> Result<()> {
    let (port, keypad) = SimulatedPort::new(&config.pins);
    let port = port.without_op_log();
    let lcd = ParallelLcd::new(port.clone(), delay.clone(), config.pins.lcd);

    let mut controller = AccessController::new(port.clone(), delay, lcd, config)
        .context("Failed to build controller")?;

    let input_closed = Arc::new(AtomicBool::new(false));
    spawn_keypad_feeder(keypad, Arc::clone(&input_closed));

    controller.start().context("Failed to start controller")?;
    print_display(&port);

    loop {
        match controller.run_cycle() {
            Ok(outcome) => {
                info!(?outcome, door = %controller.door_state(), "Access cycle complete");
                print_display(&port);
            }
            Err(_) if input_closed.load(Ordering::SeqCst) => {
                info!("Keypad input closed, shutting down");
                return Ok(());
            }
            Err(e) => return Err(e).context("Controller stopped"),
        }
    }
}

/// Virtual clock for `--fast`.
///
/// Millisecond waits advance virtual time and yield the CPU briefly, so the
/// idle keypad poll does not spin a core while stdin is quiet.
#[derive(Debug, Clone, Default)]
struct FastDelay {
    clock: SimClock,
}

impl FastDelay {
    const YIELD: Duration = Duration::from_micros(200);
}

impl Delay for FastDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
        thread::sleep(Self::YIELD);
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.delay_us(us);
    }
}

/// Type every character of each stdin line on the keypad.
fn spawn_keypad_feeder(keypad: KeypadHandle, input_closed: Arc<AtomicBool>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if let Err(e) = keypad.press_str(&line) {
                warn!(error = %e, "Ignoring line with keys the keypad does not have");
            }
        }
        input_closed.store(true, Ordering::SeqCst);
    });
}

fn print_display(port: &SimulatedPort) {
    let [top, bottom] = port.lcd_lines();
    println!("+----------------+");
    println!("|{top}|");
    println!("|{bottom}|");
    println!("+----------------+");
}
