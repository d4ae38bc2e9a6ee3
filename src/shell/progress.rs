//! Global loading bar shown while a lazy page or a query is in flight.
//!
//! Progress is simulated: while loading, each tick closes a fraction of the
//! gap to `CEILING` so the bar slows down but never reaches the end on its
//! own. `finish` jumps to 100 and the bar fades out after `FADE_AFTER`.

use std::time::Duration;

use serde::Serialize;

pub const TICK: Duration = Duration::from_millis(200);
pub const FADE_AFTER: Duration = Duration::from_millis(300);

const START_PERCENT: f64 = 10.0;
const CEILING: f64 = 90.0;
/// Fraction of the remaining gap closed per tick.
const STEP_FRACTION: f64 = 0.1;
const MIN_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ProgressState {
    Idle,
    Loading { percent: f64 },
    Finishing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadingProgress {
    state: ProgressState,
    pending: Duration,
}

impl Default for LoadingProgress {
    fn default() -> Self {
        Self {
            state: ProgressState::Idle,
            pending: Duration::ZERO,
        }
    }
}

impl LoadingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Width of the bar, 0..=100.
    pub fn percent(&self) -> f64 {
        match self.state {
            ProgressState::Idle => 0.0,
            ProgressState::Loading { percent } => percent,
            ProgressState::Finishing => 100.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state != ProgressState::Idle
    }

    /// Begin (or restart) loading. A bar already loading keeps its progress.
    pub fn start(&mut self) {
        if !matches!(self.state, ProgressState::Loading { .. }) {
            self.state = ProgressState::Loading {
                percent: START_PERCENT,
            };
            self.pending = Duration::ZERO;
        }
    }

    /// Complete the bar. No effect when idle.
    pub fn finish(&mut self) {
        if let ProgressState::Loading { .. } = self.state {
            self.state = ProgressState::Finishing;
            self.pending = Duration::ZERO;
        }
    }

    /// Advance the clock by `dt`.
    pub fn tick(&mut self, dt: Duration) -> ProgressState {
        self.pending += dt;
        match self.state {
            ProgressState::Idle => self.pending = Duration::ZERO,
            ProgressState::Loading { mut percent } => {
                while self.pending >= TICK {
                    self.pending -= TICK;
                    let step = ((CEILING - percent) * STEP_FRACTION).max(MIN_STEP);
                    percent = (percent + step).min(CEILING);
                }
                self.state = ProgressState::Loading { percent };
            }
            ProgressState::Finishing => {
                if self.pending >= FADE_AFTER {
                    self.state = ProgressState::Idle;
                    self.pending = Duration::ZERO;
                }
            }
        }
        self.state
    }
}
