use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::battery::TelemetryReader;
use crate::canvas::Canvas;
use crate::config::Settings;
use crate::monitor::{ErrorDialog, Flow, Monitor, TraySink};
use crate::renderer::IconRenderer;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Write the rendered icon to this PNG file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Headless sink: icon to a PNG file, tooltip to stdout, messages to stderr.
struct FileSink {
    output: Option<PathBuf>,
    tooltip: Option<String>,
}

impl TraySink for FileSink {
    fn set_icon(&mut self, canvas: &Canvas, tooltip: &str) -> Result<()> {
        if let Some(path) = &self.output {
            canvas.save_png(path)?;
            log::info!("Wrote {}", path.display());
        }
        self.tooltip = Some(tooltip.to_string());
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        eprintln!("warning: {}", message);
    }
}

#[derive(Default)]
struct CapturedDialog {
    message: Option<String>,
}

impl ErrorDialog for CapturedDialog {
    fn show_blocking(&mut self, message: &str) {
        self.message = Some(message.to_string());
    }
}

/// Run a single refresh cycle without a tray.
pub fn run(args: SnapshotArgs, settings: Settings) -> Result<()> {
    let renderer = IconRenderer::new(settings.icon_size, settings.palette)?;
    let mut monitor = Monitor::new(TelemetryReader::new(&settings.battery_dir), renderer);
    let mut sink = FileSink {
        output: args.output,
        tooltip: None,
    };
    let mut dialog = CapturedDialog::default();

    match monitor.tick(&mut sink, &mut dialog) {
        Flow::Continue => {
            let tooltip = sink
                .tooltip
                .with_context(|| format!("Failed to render icon for {}", settings.battery_dir.display()))?;
            println!("{}", tooltip);
            Ok(())
        }
        Flow::Exit => {
            let message = dialog.message.unwrap_or_else(|| "Battery monitor stopped".into());
            anyhow::bail!(message)
        }
    }
}
