use std::path::PathBuf;
#[cfg(feature = "tray")]
use std::time::Duration;

use anyhow::Result;

use crate::battery::DEFAULT_BATTERY_DIR;
use crate::renderer::{ColorStops, Palette};

pub type Rgba = [u8; 4];

/// Time between the starts of two refresh cycles.
#[cfg(feature = "tray")]
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(1000);

/// Canvas side used when the tray does not report its icon geometry.
pub const DEFAULT_ICON_SIZE: u32 = 22;

/// Everything the meter needs at startup. Built once from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub battery_dir: PathBuf,
    pub icon_size: u32,
    pub palette: Palette,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            battery_dir: PathBuf::from(DEFAULT_BATTERY_DIR),
            icon_size: DEFAULT_ICON_SIZE,
            palette: Palette::default(),
        }
    }
}

// Defaults

pub fn default_background() -> Rgba { [0x00, 0x00, 0x00, 0xFF] }
pub fn default_charging_color() -> Rgba { [0x00, 0x00, 0xFF, 0xFF] }
pub fn default_full_color() -> Rgba { [0x00, 0xFF, 0x00, 0xFF] }
pub fn default_mid_color() -> Rgba { [0xFF, 0xFF, 0x00, 0xFF] }
pub fn default_low_color() -> Rgba { [0xFF, 0x00, 0x00, 0xFF] }

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: default_background(),
            charging: default_charging_color(),
            full: default_full_color(),
            stops: ColorStops::default(),
        }
    }
}

impl Default for ColorStops {
    fn default() -> Self {
        Self {
            full: default_full_color(),
            mid: default_mid_color(),
            low: default_low_color(),
        }
    }
}

pub fn parse_color(s: &str) -> Result<Rgba> {
    let s = s.trim_start_matches('#');
    anyhow::ensure!(s.len() == 6 || s.len() == 8, "Color must be RRGGBB or RRGGBBAA");
    anyhow::ensure!(s.is_ascii(), "Color must be hexadecimal");
    let r = u8::from_str_radix(&s[0..2], 16)?;
    let g = u8::from_str_radix(&s[2..4], 16)?;
    let b = u8::from_str_radix(&s[4..6], 16)?;
    let a = if s.len() == 8 { u8::from_str_radix(&s[6..8], 16)? } else { 0xFF };
    Ok([r, g, b, a])
}

pub fn format_color(c: Rgba) -> String {
    format!("{:02X}{:02X}{:02X}{:02X}", c[0], c[1], c[2], c[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(parse_color("00ff00").unwrap(), [0, 255, 0, 255]);
        assert_eq!(parse_color("#1a1a2eCC").unwrap(), [0x1a, 0x1a, 0x2e, 0xcc]);
    }

    #[test]
    fn rejects_bad_colors() {
        assert!(parse_color("fff").is_err());
        assert!(parse_color("gg0000").is_err());
        assert!(parse_color("ééé").is_err());
    }

    #[test]
    fn format_round_trips_defaults() {
        for c in [default_background(), default_charging_color(), default_low_color()] {
            assert_eq!(parse_color(&format_color(c)).unwrap(), c);
        }
    }
}
