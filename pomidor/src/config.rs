use anyhow::{Context, Result};
use pomidor_core::paths;
use ratatui::style::Color;
use serde::Deserialize;
use std::fs;

/// The `[theme]` table of `pomidor.toml`. Other tables belong to
/// `pomidor_core::Config` and are ignored here.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    #[serde(deserialize_with = "hex_to_color")]
    pub background: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub muted: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub track: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(30, 33, 64),
            foreground: Color::Rgb(215, 224, 255),
            muted: Color::Rgb(127, 132, 165),
            track: Color::Rgb(22, 25, 50),
        }
    }
}

/// Accent colour for a `#rrggbb` setting.
pub fn accent(hex: &str) -> Color {
    match pomidor_core::settings::parse_hex_color(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Rgb(248, 112, 112),
    }
}

fn hex_to_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    match pomidor_core::settings::parse_hex_color(&s) {
        Some((r, g, b)) => Ok(Color::Rgb(r, g, b)),
        None => Err(serde::de::Error::custom(format!(
            "invalid hex color {s:?}, expected #rrggbb"
        ))),
    }
}

pub fn load_config() -> Result<Config> {
    match paths::config_file() {
        Some(path) if path.exists() => {
            let config_str = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file at {:?}", path))?;
            toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse config file at {:?}", path))
        }
        _ => Ok(Config::default()),
    }
}
