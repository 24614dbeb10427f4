//! Duration inputs of the settings form.
//!
//! Inputs are free text. Text that is not a number falls back to the field
//! default; numbers are clamped into the field bounds.

use super::{bounds, Durations};
use crate::mode::Mode;

/// Raw text of the three minute inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationInputs {
    pub focus: String,
    pub short_break: String,
    pub long_break: String,
}

impl DurationInputs {
    pub fn from_durations(durations: &Durations) -> Self {
        Self {
            focus: durations.minutes(Mode::Focus).to_string(),
            short_break: durations.minutes(Mode::ShortBreak).to_string(),
            long_break: durations.minutes(Mode::LongBreak).to_string(),
        }
    }

    pub fn get(&self, mode: Mode) -> &str {
        match mode {
            Mode::Focus => &self.focus,
            Mode::ShortBreak => &self.short_break,
            Mode::LongBreak => &self.long_break,
        }
    }

    pub fn get_mut(&mut self, mode: Mode) -> &mut String {
        match mode {
            Mode::Focus => &mut self.focus,
            Mode::ShortBreak => &mut self.short_break,
            Mode::LongBreak => &mut self.long_break,
        }
    }

    /// Up/down arrow on an input: step by `delta` and write the clamped value back.
    pub fn spin(&mut self, mode: Mode, delta: i64) {
        let value = spin(mode, self.get(mode), delta);
        *self.get_mut(mode) = value.to_string();
    }

    /// The durations these inputs apply, after clamping.
    pub fn to_durations(&self) -> Durations {
        Durations::from_minutes(
            clamp_minutes(Mode::Focus, &self.focus),
            clamp_minutes(Mode::ShortBreak, &self.short_break),
            clamp_minutes(Mode::LongBreak, &self.long_break),
        )
    }
}

fn parse_minutes(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// Minutes to apply for `input`.
pub fn clamp_minutes(mode: Mode, input: &str) -> u32 {
    let b = bounds(mode);
    match parse_minutes(input) {
        Some(n) => n.clamp(b.min as i64, b.max as i64) as u32,
        None => b.default,
    }
}

/// Result of one spinner step. Unparseable text counts as zero.
pub fn spin(mode: Mode, input: &str, delta: i64) -> u32 {
    let b = bounds(mode);
    let current = parse_minutes(input).unwrap_or(0);
    current
        .saturating_add(delta)
        .clamp(b.min as i64, b.max as i64) as u32
}
