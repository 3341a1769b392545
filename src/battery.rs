use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Full,
    Unknown,
}

impl BatteryStatus {
    /// Classify the raw contents of a `status` file.
    ///
    /// Only a single trailing newline is tolerated; the comparison is exact and
    /// case-sensitive. Anything else is reported with the text as it was read.
    pub fn classify(raw: &str) -> Result<Self, TelemetryError> {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        match line {
            "Charging" => Ok(BatteryStatus::Charging),
            "Discharging" => Ok(BatteryStatus::Discharging),
            "Full" => Ok(BatteryStatus::Full),
            "Unknown" => Ok(BatteryStatus::Unknown),
            _ => Err(TelemetryError::UnrecognizedStatus(raw.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BatteryStatus::Charging => "Charging",
            BatteryStatus::Discharging => "Discharging",
            BatteryStatus::Full => "Full",
            BatteryStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    status: BatteryStatus,
    fraction: f64,
}

impl Reading {
    pub fn new(status: BatteryStatus, fraction: f64) -> Self {
        // NaN collapses to an empty meter
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        Self { status, fraction }
    }

    pub fn status(&self) -> BatteryStatus {
        self.status
    }

    /// Charge in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Battery telemetry is unavailable: {}", .0.display())]
    SourceUnavailable(PathBuf),
    #[error("Unrecognized battery status: {:?}", .0)]
    UnrecognizedStatus(String),
}

pub const DEFAULT_BATTERY_DIR: &str = "/sys/class/power_supply/BAT0";

/// Reads the charge counters and status of a single sysfs power supply.
#[derive(Debug, Clone)]
pub struct TelemetryReader {
    dir: PathBuf,
}

impl TelemetryReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn read(&self) -> Result<Reading, TelemetryError> {
        let (now_name, full_name) = self.counter_names();
        let full = read_counter(&self.dir.join(full_name))?;
        let now = read_counter(&self.dir.join(now_name))?;
        if full == 0 {
            log::warn!("{} reports zero capacity", self.dir.join(full_name).display());
            return Err(TelemetryError::SourceUnavailable(self.dir.join(full_name)));
        }

        let status_path = self.dir.join("status");
        let bytes = fs::read(&status_path).map_err(|e| unavailable(&status_path, &e))?;
        let status = BatteryStatus::classify(&String::from_utf8_lossy(&bytes))?;

        Ok(Reading::new(status, now as f64 / full as f64))
    }

    /// Energy counters (µWh) when present, otherwise the charge counters (µAh).
    fn counter_names(&self) -> (&'static str, &'static str) {
        if !self.dir.join("energy_full").exists() && self.dir.join("charge_full").exists() {
            ("charge_now", "charge_full")
        } else {
            ("energy_now", "energy_full")
        }
    }
}

fn read_counter(path: &Path) -> Result<u64, TelemetryError> {
    let content = fs::read_to_string(path).map_err(|e| unavailable(path, &e))?;
    content.trim().parse::<u64>().map_err(|e| {
        log::warn!("Malformed counter in {}: {:?} ({})", path.display(), content.trim(), e);
        TelemetryError::SourceUnavailable(path.to_path_buf())
    })
}

fn unavailable(path: &Path, err: &io::Error) -> TelemetryError {
    log::warn!("Failed to read {}: {}", path.display(), err);
    TelemetryError::SourceUnavailable(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_battery(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn classifies_known_vocabulary() {
        assert_eq!(BatteryStatus::classify("Charging\n").unwrap(), BatteryStatus::Charging);
        assert_eq!(BatteryStatus::classify("Discharging\n").unwrap(), BatteryStatus::Discharging);
        assert_eq!(BatteryStatus::classify("Full\n").unwrap(), BatteryStatus::Full);
        assert_eq!(BatteryStatus::classify("Unknown\n").unwrap(), BatteryStatus::Unknown);
        assert_eq!(BatteryStatus::classify("Full").unwrap(), BatteryStatus::Full);
    }

    #[test]
    fn rejects_anything_else_with_raw_text() {
        for raw in ["Weird\n", "charging\n", "Full \n", "Full\n\n", " Full\n", "Not charging\n", ""] {
            match BatteryStatus::classify(raw) {
                Err(TelemetryError::UnrecognizedStatus(text)) => assert_eq!(text, raw),
                other => panic!("{:?} classified as {:?}", raw, other),
            }
        }
    }

    #[test]
    fn display_matches_vocabulary() {
        assert_eq!(BatteryStatus::Discharging.to_string(), "Discharging");
        assert_eq!(BatteryStatus::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn reads_half_charged_battery() {
        let dir = fake_battery(&[
            ("energy_now", "3000\n"),
            ("energy_full", "6000\n"),
            ("status", "Discharging\n"),
        ]);
        let reading = TelemetryReader::new(dir.path()).read().unwrap();
        assert_eq!(reading, Reading::new(BatteryStatus::Discharging, 0.5));
    }

    #[test]
    fn fraction_stays_in_unit_interval() {
        for (now, full) in [(0u64, 1u64), (1, 3), (59, 60), (6000, 6000), (7000, 6000)] {
            let dir = fake_battery(&[
                ("energy_now", &now.to_string()),
                ("energy_full", &full.to_string()),
                ("status", "Charging\n"),
            ]);
            let reading = TelemetryReader::new(dir.path()).read().unwrap();
            assert!((0.0..=1.0).contains(&reading.fraction()), "{now}/{full}");
        }
    }

    #[test]
    fn falls_back_to_charge_counters() {
        let dir = fake_battery(&[
            ("charge_now", "1000\n"),
            ("charge_full", "4000\n"),
            ("status", "Full\n"),
        ]);
        let reading = TelemetryReader::new(dir.path()).read().unwrap();
        assert_eq!(reading.status(), BatteryStatus::Full);
        assert_eq!(reading.fraction(), 0.25);
    }

    #[test]
    fn zero_capacity_is_unavailable() {
        let dir = fake_battery(&[
            ("energy_now", "0\n"),
            ("energy_full", "0\n"),
            ("status", "Unknown\n"),
        ]);
        match TelemetryReader::new(dir.path()).read() {
            Err(TelemetryError::SourceUnavailable(path)) => {
                assert_eq!(path, dir.path().join("energy_full"));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let reader = TelemetryReader::new(dir.path().join("BAT9"));
        assert!(matches!(reader.read(), Err(TelemetryError::SourceUnavailable(_))));
    }

    #[test]
    fn malformed_counter_is_unavailable() {
        let dir = fake_battery(&[
            ("energy_now", "lots\n"),
            ("energy_full", "6000\n"),
            ("status", "Discharging\n"),
        ]);
        match TelemetryReader::new(dir.path()).read() {
            Err(TelemetryError::SourceUnavailable(path)) => {
                assert_eq!(path, dir.path().join("energy_now"));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn missing_status_is_unavailable_not_unrecognized() {
        let dir = fake_battery(&[("energy_now", "10\n"), ("energy_full", "20\n")]);
        match TelemetryReader::new(dir.path()).read() {
            Err(TelemetryError::SourceUnavailable(path)) => {
                assert_eq!(path, dir.path().join("status"));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn unexpected_status_is_reported_verbatim() {
        let dir = fake_battery(&[
            ("energy_now", "10\n"),
            ("energy_full", "20\n"),
            ("status", "Weird\n"),
        ]);
        match TelemetryReader::new(dir.path()).read() {
            Err(TelemetryError::UnrecognizedStatus(raw)) => assert_eq!(raw, "Weird\n"),
            other => panic!("expected UnrecognizedStatus, got {:?}", other),
        }
    }

    #[test]
    fn reading_clamps_out_of_range_fractions() {
        assert_eq!(Reading::new(BatteryStatus::Full, 1.4).fraction(), 1.0);
        assert_eq!(Reading::new(BatteryStatus::Full, -0.2).fraction(), 0.0);
        assert_eq!(Reading::new(BatteryStatus::Full, f64::NAN).fraction(), 0.0);
        assert_eq!(Reading::new(BatteryStatus::Full, 1.5).percent(), 100.0);
    }

    #[test]
    fn undecodable_status_is_unrecognized_not_unavailable() {
        let dir = fake_battery(&[("energy_now", "10\n"), ("energy_full", "20\n")]);
        fs::write(dir.path().join("status"), b"Ch\xffrging\n").unwrap();
        match TelemetryReader::new(dir.path()).read() {
            Err(TelemetryError::UnrecognizedStatus(raw)) => {
                assert_eq!(raw, "Ch\u{FFFD}rging\n");
            }
            other => panic!("expected UnrecognizedStatus, got {:?}", other),
        }
    }
}
