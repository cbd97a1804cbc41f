//! Example: two motors sharing one step timer.
//!
//! This example demonstrates how to:
//! - Build a pool from a TOML configuration
//! - Bind lines to each motor and command moves
//! - Drive the update-event callback and watch motors stop on their own
//!
//! Run with: `cargo run --example two_motors --features std`

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use stepper_pool::{parse_config, Direction, Result, StepTimer, StepperLines, StepperPool};

/// Line that prints its transitions.
struct ConsoleLine<'a> {
    name: &'static str,
    level: &'a Cell<bool>,
}

impl ErrorType for ConsoleLine<'_> {
    type Error = Infallible;
}

impl OutputPin for ConsoleLine<'_> {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        if self.level.replace(false) {
            println!("  {} -> low", self.name);
        }
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        if !self.level.replace(true) {
            println!("  {} -> high", self.name);
        }
        Ok(())
    }
}

/// Timer that only records its settings.
#[derive(Default)]
struct SimTimer {
    period_ms: u16,
}

impl StepTimer for SimTimer {
    fn set_period_ms(&mut self, period_ms: u16) {
        self.period_ms = period_ms;
    }

    fn period_ms(&self) -> u16 {
        self.period_ms
    }

    fn enable_output(&mut self) {
        println!("timer output on");
    }

    fn disable_output(&mut self) {
        println!("timer output off");
    }

    fn listen_update(&mut self) {}

    fn unlisten_update(&mut self) {}
}

fn main() -> Result<()> {
    println!("=== Two Motor Example ===\n");

    let config = parse_config(
        r#"
[timer]
period_ms = 20

[motors.pan]
name = "pan"
enable_active_low = true

[motors.tilt]
name = "tilt"
mode = "half"
"#,
    )?;

    let levels: [Cell<bool>; 6] = Default::default();
    let line = |name, index: usize| ConsoleLine {
        name,
        level: &levels[index],
    };

    let mut pool: StepperPool<_, _, _, _> = StepperPool::from_config(SimTimer::default(), &config)?;
    println!("step period: {} ms", pool.period_ms());

    let mut ids = Vec::new();
    for (i, name) in ["pan", "tilt"].into_iter().enumerate() {
        let motor = config.require_motor(name)?;
        let id = pool.create()?;
        println!("binding {}", motor.name);
        pool.init_from_config(
            id,
            StepperLines::new(line("en", i * 3), line("dir", i * 3 + 1), line("ms1", i * 3 + 2)),
            motor,
        )?;
        ids.push(id);
    }

    pool.start();
    pool.rotate(ids[0], 3, Direction::Clockwise)?;
    pool.rotate(ids[1], 5, Direction::CounterClockwise)?;

    let mut tick = 0;
    while pool.running() > 0 {
        tick += 1;
        for id in pool.on_update() {
            println!("tick {}: motor {} done", tick, id.index());
        }
    }

    pool.stop()?;
    println!("\n=== Example Complete ===");
    Ok(())
}
