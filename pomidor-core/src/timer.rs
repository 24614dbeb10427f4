//! Countdown state machine.
//!
//! The timer knows nothing about clocks or tasks. The caller invokes
//! [`Timer::tick`] once per second while the timer is running and reacts to
//! the returned [`Transition`]s.
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!         Expired -> (reset | auto-cycle advance) -> Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::settings::Durations;

/// Every fourth completed focus phase earns a long break.
pub const FOCUS_PHASES_PER_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Full duration left, not counting.
    Idle,
    Running,
    Paused,
    /// Reached zero. Waits for a reset or the auto-cycle advance.
    Expired,
}

/// What a command or tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Paused,
    Ticked { remaining_secs: u32 },
    Expired { mode: Mode },
    Reset { mode: Mode },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    durations: Durations,
    mode: Mode,
    remaining_secs: u32,
    phase: Phase,
    /// Completed focus phases, counted when auto-cycle leaves focus.
    completed_focus: u32,
}

impl Timer {
    pub fn new(durations: Durations) -> Self {
        Self {
            durations,
            mode: Mode::Focus,
            remaining_secs: durations[Mode::Focus],
            phase: Phase::Idle,
            completed_focus: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.durations[self.mode]
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    pub fn completed_focus(&self) -> u32 {
        self.completed_focus
    }

    /// The mode auto-cycle would move to from the current one.
    pub fn next_mode(&self) -> Mode {
        match self.mode {
            Mode::Focus => {
                if (self.completed_focus + 1) % FOCUS_PHASES_PER_LONG_BREAK == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Transition> {
        match self.phase {
            Phase::Idle | Phase::Paused if self.remaining_secs > 0 => {
                self.phase = Phase::Running;
                Some(Transition::Started)
            }
            _ => None,
        }
    }

    pub fn pause(&mut self) -> Option<Transition> {
        if self.phase != Phase::Running {
            return None;
        }
        self.phase = Phase::Paused;
        Some(Transition::Paused)
    }

    /// The start/pause/restart button.
    pub fn toggle(&mut self) -> Option<Transition> {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Idle | Phase::Paused if self.remaining_secs > 0 => self.start(),
            _ => Some(self.reset()),
        }
    }

    /// One second elapsed. Only has an effect while running.
    pub fn tick(&mut self) -> Option<Transition> {
        if self.phase != Phase::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.phase = Phase::Expired;
            return Some(Transition::Expired { mode: self.mode });
        }
        Some(Transition::Ticked {
            remaining_secs: self.remaining_secs,
        })
    }

    pub fn reset(&mut self) -> Transition {
        self.phase = Phase::Idle;
        self.remaining_secs = self.durations[self.mode];
        Transition::Reset { mode: self.mode }
    }

    pub fn switch_mode(&mut self, mode: Mode) -> Transition {
        self.mode = mode;
        self.reset()
    }

    /// Moves to [`Timer::next_mode`], counting the focus phase just left.
    pub fn advance(&mut self) -> Mode {
        let next = self.next_mode();
        if self.mode == Mode::Focus {
            self.completed_focus += 1;
        }
        self.switch_mode(next);
        next
    }

    /// New durations take effect immediately and reset the current phase.
    pub fn set_durations(&mut self, durations: Durations) -> Transition {
        self.durations = durations;
        self.reset()
    }
}
