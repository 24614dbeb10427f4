use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of phase the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "pomodoro")]
    Focus,
    #[serde(rename = "shortBreak")]
    ShortBreak,
    #[serde(rename = "longBreak")]
    LongBreak,
}

impl Mode {
    /// Tab order.
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    /// Stable identifier, also used as the sound clip file stem.
    pub fn key(self) -> &'static str {
        match self {
            Mode::Focus => "pomodoro",
            Mode::ShortBreak => "shortBreak",
            Mode::LongBreak => "longBreak",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "pomodoro",
            Mode::ShortBreak => "short break",
            Mode::LongBreak => "long break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Focus)
    }

    pub fn index(self) -> usize {
        match self {
            Mode::Focus => 0,
            Mode::ShortBreak => 1,
            Mode::LongBreak => 2,
        }
    }

    /// Neighbouring tab, wrapping at both ends.
    pub fn cycle_tab(self, forward: bool) -> Mode {
        let len = Self::ALL.len();
        let idx = if forward {
            (self.index() + 1) % len
        } else {
            (self.index() + len - 1) % len
        };
        Self::ALL[idx]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
