//! Shared test doubles.

#![allow(dead_code)]

use embedded_hal_mock::eh1::digital::Mock as PinMock;
use stepper_pool::{StepTimer, StepperPool};

/// Register-free stand-in for the shared step timer.
#[derive(Debug, Default)]
pub struct FakeTimer {
    pub period_ms: u16,
    pub output: bool,
    pub listening: bool,
    pub period_writes: u32,
}

impl FakeTimer {
    pub fn with_period(period_ms: u16) -> Self {
        Self {
            period_ms,
            ..Default::default()
        }
    }
}

impl StepTimer for FakeTimer {
    fn set_period_ms(&mut self, period_ms: u16) {
        self.period_ms = period_ms;
        self.period_writes += 1;
    }

    fn period_ms(&self) -> u16 {
        self.period_ms
    }

    fn enable_output(&mut self) {
        self.output = true;
    }

    fn disable_output(&mut self) {
        self.output = false;
    }

    fn listen_update(&mut self) {
        self.listening = true;
    }

    fn unlisten_update(&mut self) {
        self.listening = false;
    }
}

pub type MockPool = StepperPool<PinMock, PinMock, PinMock, FakeTimer>;

/// Mocked enable, direction and microstep lines of one motor.
pub struct MockLines {
    pub en: PinMock,
    pub dir: PinMock,
    pub ms: PinMock,
}

impl MockLines {
    pub fn new(
        en: &[embedded_hal_mock::eh1::digital::Transaction],
        dir: &[embedded_hal_mock::eh1::digital::Transaction],
        ms: &[embedded_hal_mock::eh1::digital::Transaction],
    ) -> Self {
        Self {
            en: PinMock::new(en),
            dir: PinMock::new(dir),
            ms: PinMock::new(ms),
        }
    }

    pub fn done(&mut self) {
        self.en.done();
        self.dir.done();
        self.ms.done();
    }
}
