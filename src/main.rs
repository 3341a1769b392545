mod battery;
mod canvas;
mod config;
mod monitor;
#[cfg(feature = "tray")]
mod notify;
mod renderer;
mod snapshot;
#[cfg(feature = "tray")]
mod tray;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{Rgba, Settings};
use crate::renderer::{ColorStops, Palette};

#[derive(Parser, Debug)]
#[command(name = "batterymeter", version, about = "Battery charge meter for the system tray")]
pub struct Cli {
    /// Power supply directory to read energy_now, energy_full and status from
    #[arg(long, value_name = "DIR", default_value = battery::DEFAULT_BATTERY_DIR)]
    battery: PathBuf,

    /// Icon size in px when the tray does not report one
    #[arg(long, value_name = "PX", default_value_t = config::DEFAULT_ICON_SIZE,
          value_parser = clap::value_parser!(u32).range(8..=512))]
    size: u32,

    /// Background colour (RRGGBB or RRGGBBAA)
    #[arg(long, value_name = "HEX", default_value = "000000FF", value_parser = config::parse_color)]
    background: Rgba,

    /// Bar colour while charging
    #[arg(long, value_name = "HEX", default_value = "0000FFFF", value_parser = config::parse_color)]
    charging_color: Rgba,

    /// Bar colour when full, and the top of the discharge gradient
    #[arg(long, value_name = "HEX", default_value = "00FF00FF", value_parser = config::parse_color)]
    full_color: Rgba,

    /// Discharge gradient colour at 25%
    #[arg(long, value_name = "HEX", default_value = "FFFF00FF", value_parser = config::parse_color)]
    mid_color: Rgba,

    /// Discharge gradient colour at 0%
    #[arg(long, value_name = "HEX", default_value = "FF0000FF", value_parser = config::parse_color)]
    low_color: Rgba,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Render one icon without a tray and print its tooltip
    Snapshot(snapshot::SnapshotArgs),
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            battery_dir: self.battery.clone(),
            icon_size: self.size,
            palette: Palette {
                background: self.background,
                charging: self.charging_color,
                full: self.full_color,
                stops: ColorStops {
                    full: self.full_color,
                    mid: self.mid_color,
                    low: self.low_color,
                },
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "batterymeter", &mut std::io::stdout());
        return Ok(());
    }

    let settings = cli.settings();
    log::debug!(
        "Palette: background={} charging={} full={} mid={} low={}",
        config::format_color(settings.palette.background),
        config::format_color(settings.palette.charging),
        config::format_color(settings.palette.full),
        config::format_color(settings.palette.stops.mid),
        config::format_color(settings.palette.stops.low),
    );

    match cli.command {
        Some(CliCommand::Snapshot(args)) => snapshot::run(args, settings),
        None => run_tray(settings),
    }
}

#[cfg(feature = "tray")]
fn run_tray(settings: Settings) -> Result<()> {
    log::info!("Starting batterymeter on {}", settings.battery_dir.display());
    tray::run(settings)
}

#[cfg(not(feature = "tray"))]
fn run_tray(_settings: Settings) -> Result<()> {
    anyhow::bail!("Built without tray support; use `batterymeter snapshot` instead")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_builtin_palette() {
        let cli = Cli::parse_from(["batterymeter"]);
        let settings = cli.settings();
        assert_eq!(settings.palette, Palette::default());
        assert_eq!(settings.battery_dir, Settings::default().battery_dir);
        assert_eq!(settings.icon_size, Settings::default().icon_size);
    }

    #[test]
    fn colour_overrides_feed_the_gradient() {
        let cli = Cli::parse_from(["batterymeter", "--full-color", "#112233", "--low-color", "445566"]);
        let settings = cli.settings();
        assert_eq!(settings.palette.full, [0x11, 0x22, 0x33, 0xFF]);
        assert_eq!(settings.palette.stops.full, [0x11, 0x22, 0x33, 0xFF]);
        assert_eq!(settings.palette.stops.low, [0x44, 0x55, 0x66, 0xFF]);
    }

    #[test]
    fn rejects_out_of_range_size() {
        assert!(Cli::try_parse_from(["batterymeter", "--size", "4"]).is_err());
        assert!(Cli::try_parse_from(["batterymeter", "--size", "64", "snapshot"]).is_ok());
    }
}
