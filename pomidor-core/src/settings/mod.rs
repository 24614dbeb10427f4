//! User settings and the persisted settings document.
//!
//! The document is JSON with camelCase keys:
//!
//! ```json
//! {
//!   "durations": { "pomodoro": 1500, "shortBreak": 300, "longBreak": 900 },
//!   "autoCycleEnabled": false,
//!   "soundEnabled": true,
//!   "selectedFont": "Kumbh Sans",
//!   "selectedColor": "#f87070"
//! }
//! ```
//!
//! Every field is optional, and a field that is null or of the wrong type
//! keeps its default without affecting the others. A document that does
//! not parse at all is treated as if nothing had been saved.

pub mod form;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Index, IndexMut};
use tracing::{debug, warn};

use crate::mode::Mode;

pub const FONTS: [&str; 3] = ["Kumbh Sans", "Roboto Slab", "Space Mono"];
pub const COLORS: [&str; 3] = ["#f87070", "#70f3f8", "#d881f8"];

/// Allowed range and fallback for one duration input, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

pub fn bounds(mode: Mode) -> MinuteBounds {
    match mode {
        Mode::Focus => MinuteBounds {
            min: 1,
            max: 60,
            default: 25,
        },
        Mode::ShortBreak => MinuteBounds {
            min: 1,
            max: 30,
            default: 5,
        },
        Mode::LongBreak => MinuteBounds {
            min: 1,
            max: 60,
            default: 15,
        },
    }
}

/// Configured length of each mode, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    #[serde(rename = "pomodoro")]
    pub focus: u32,
    #[serde(rename = "shortBreak")]
    pub short_break: u32,
    #[serde(rename = "longBreak")]
    pub long_break: u32,
}

impl Durations {
    pub fn from_minutes(focus: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            focus: focus * 60,
            short_break: short_break * 60,
            long_break: long_break * 60,
        }
    }

    /// Whole minutes for `mode`, rounded to the nearest minute.
    pub fn minutes(&self, mode: Mode) -> u32 {
        (self[mode] + 30) / 60
    }

    /// Pulls every duration into its allowed range. Zero means "unset".
    pub fn clamped(mut self) -> Self {
        for mode in Mode::ALL {
            let b = bounds(mode);
            let secs = self[mode];
            self[mode] = if secs == 0 {
                b.default * 60
            } else {
                secs.clamp(b.min * 60, b.max * 60)
            };
        }
        self
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::from_minutes(
            bounds(Mode::Focus).default,
            bounds(Mode::ShortBreak).default,
            bounds(Mode::LongBreak).default,
        )
    }
}

impl Index<Mode> for Durations {
    type Output = u32;

    fn index(&self, mode: Mode) -> &u32 {
        match mode {
            Mode::Focus => &self.focus,
            Mode::ShortBreak => &self.short_break,
            Mode::LongBreak => &self.long_break,
        }
    }
}

impl IndexMut<Mode> for Durations {
    fn index_mut(&mut self, mode: Mode) -> &mut u32 {
        match mode {
            Mode::Focus => &mut self.focus,
            Mode::ShortBreak => &mut self.short_break,
            Mode::LongBreak => &mut self.long_break,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub durations: Durations,
    pub auto_cycle_enabled: bool,
    pub sound_enabled: bool,
    pub selected_font: String,
    pub selected_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            durations: Durations::default(),
            auto_cycle_enabled: false,
            sound_enabled: true,
            selected_font: FONTS[0].to_string(),
            selected_color: COLORS[0].to_string(),
        }
    }
}

impl Settings {
    /// Parses a persisted document. Never fails.
    pub fn from_json(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        let doc = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(doc)) => doc,
            Ok(other) => {
                warn!(found = %other, "Ignoring settings document that is not an object");
                return Self::default();
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable settings document");
                return Self::default();
            }
        };

        let mut settings = Self::default();
        if let Some(saved) = doc.get("durations").and_then(Value::as_object) {
            for mode in Mode::ALL {
                if let Some(secs) = saved.get(mode.key()).and_then(seconds) {
                    settings.durations[mode] = secs;
                }
            }
        }
        if let Some(v) = field(&doc, "autoCycleEnabled") {
            settings.auto_cycle_enabled = v;
        }
        if let Some(v) = field(&doc, "soundEnabled") {
            settings.sound_enabled = v;
        }
        if let Some(v) = field(&doc, "selectedFont") {
            settings.selected_font = v;
        }
        if let Some(v) = field(&doc, "selectedColor") {
            settings.selected_color = v;
        }
        settings.sanitized()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replaces out-of-range or unknown values with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.durations = self.durations.clamped();
        if !FONTS.contains(&self.selected_font.as_str()) {
            self.selected_font = defaults.selected_font;
        }
        if !is_hex_color(&self.selected_color) {
            self.selected_color = defaults.selected_color;
        }
        self
    }
}

fn field<T: DeserializeOwned>(doc: &Map<String, Value>, key: &str) -> Option<T> {
    let value = doc.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(key, error = %e, "Ignoring settings field");
            None
        }
    }
}

/// Whole seconds from a JSON number; fractions are rounded.
fn seconds(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return Some(u32::try_from(n).unwrap_or(u32::MAX));
    }
    let f = value.as_f64()?;
    (f.is_finite() && f >= 0.0).then(|| f.round().min(u32::MAX as f64) as u32)
}

/// `#rrggbb`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Splits `#rrggbb` into its channels.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    if !is_hex_color(value) {
        return None;
    }
    let r = u8::from_str_radix(&value[1..3], 16).ok()?;
    let g = u8::from_str_radix(&value[3..5], 16).ok()?;
    let b = u8::from_str_radix(&value[5..7], 16).ok()?;
    Some((r, g, b))
}

/// Position of `current` in `options` moved by one step, wrapping.
pub fn cycle_option<'a>(options: &[&'a str], current: &str, forward: bool) -> &'a str {
    let len = options.len();
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    options[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_document_yields_exact_defaults() {
        let settings = Settings::from_json("{not json");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.durations.focus, 25 * 60);
        assert_eq!(settings.durations.short_break, 5 * 60);
        assert_eq!(settings.durations.long_break, 15 * 60);
        assert!(!settings.auto_cycle_enabled);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn mistyped_fields_keep_their_defaults_alone() {
        let settings = Settings::from_json(
            r##"{"soundEnabled": "yes", "autoCycleEnabled": true, "durations": null, "selectedColor": "#70f3f8"}"##,
        );
        assert!(settings.auto_cycle_enabled);
        assert!(settings.sound_enabled);
        assert_eq!(settings.durations, Durations::default());
        assert_eq!(settings.selected_color, "#70f3f8");
    }

    #[test]
    fn null_duration_keeps_only_that_default() {
        let settings = Settings::from_json(
            r#"{"durations": {"pomodoro": null, "shortBreak": "ten", "longBreak": 1200.4}, "soundEnabled": false}"#,
        );
        assert_eq!(settings.durations.focus, 25 * 60);
        assert_eq!(settings.durations.short_break, 5 * 60);
        assert_eq!(settings.durations.long_break, 1200);
        assert!(!settings.sound_enabled);
    }

    #[test]
    fn non_object_document_yields_defaults() {
        assert_eq!(Settings::from_json("[1, 2, 3]"), Settings::default());
        assert_eq!(Settings::from_json("null"), Settings::default());
    }

    #[test]
    fn missing_fields_fall_back_individually() {
        let settings = Settings::from_json(
            r#"{"autoCycleEnabled": true, "durations": {"shortBreak": 600}}"#,
        );
        assert!(settings.auto_cycle_enabled);
        assert!(settings.sound_enabled);
        assert_eq!(settings.durations.short_break, 600);
        assert_eq!(settings.durations.focus, 25 * 60);
        assert_eq!(settings.selected_font, "Kumbh Sans");
    }

    #[test]
    fn loaded_values_are_sanitized() {
        let settings = Settings::from_json(
            r#"{
                "durations": {"pomodoro": 99999, "shortBreak": 0, "longBreak": 10},
                "selectedFont": "Comic Sans",
                "selectedColor": "red"
            }"#,
        );
        assert_eq!(settings.durations.focus, 60 * 60);
        assert_eq!(settings.durations.short_break, 5 * 60);
        assert_eq!(settings.durations.long_break, 60);
        assert_eq!(settings.selected_font, "Kumbh Sans");
        assert_eq!(settings.selected_color, "#f87070");
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let json = Settings::default().to_json().unwrap();
        assert!(json.contains("\"autoCycleEnabled\""));
        assert!(json.contains("\"selectedColor\""));
        assert!(json.contains("\"pomodoro\": 1500"));
    }

    #[test]
    fn rounds_minutes_for_announcements() {
        let d = Durations {
            focus: 1500,
            short_break: 299,
            long_break: 60,
        };
        assert_eq!(d.minutes(Mode::ShortBreak), 5);
        assert_eq!(d.minutes(Mode::LongBreak), 1);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#70F3F8"), Some((0x70, 0xf3, 0xf8)));
        assert_eq!(parse_hex_color("70f3f8"), None);
        assert_eq!(parse_hex_color("#70f3fz"), None);
    }

    #[test]
    fn cycles_through_fonts() {
        assert_eq!(cycle_option(&FONTS, "Space Mono", true), "Kumbh Sans");
        assert_eq!(cycle_option(&FONTS, "Kumbh Sans", false), "Space Mono");
    }
}
