use anyhow::Result;

use crate::battery::{TelemetryError, TelemetryReader};
use crate::canvas::Canvas;
use crate::renderer::{Frame, IconRenderer};

/// Where the rendered icon ends up.
pub trait TraySink {
    fn set_icon(&mut self, canvas: &Canvas, tooltip: &str) -> Result<()>;

    /// Short, non-blocking message shown near the icon.
    fn notify(&mut self, message: &str);
}

/// Modal error surface. `show_blocking` returns once the user has dismissed it.
pub trait ErrorDialog {
    fn show_blocking(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Rendering,
    /// The telemetry source is gone; nothing is rendered any more.
    Stopped,
}

/// What the caller should do with its timer after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Drives one read-render-display cycle per timer tick.
pub struct Monitor {
    reader: TelemetryReader,
    renderer: IconRenderer,
    phase: Phase,
}

impl Monitor {
    pub fn new(reader: TelemetryReader, renderer: IconRenderer) -> Self {
        Self {
            reader,
            renderer,
            phase: Phase::Idle,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&mut self, tray: &mut impl TraySink, dialog: &mut impl ErrorDialog) -> Flow {
        match self.phase {
            Phase::Idle => {}
            Phase::Rendering => {
                log::debug!("Refresh already in progress, skipping tick");
                return Flow::Continue;
            }
            Phase::Stopped => return Flow::Exit,
        }

        self.phase = Phase::Rendering;
        let flow = self.refresh(tray, dialog);
        if self.phase == Phase::Rendering {
            self.phase = Phase::Idle;
        }
        flow
    }

    fn refresh(&mut self, tray: &mut impl TraySink, dialog: &mut impl ErrorDialog) -> Flow {
        let frame = match self.reader.read() {
            Ok(reading) => {
                log::debug!("{:?} at {:.4}", reading.status(), reading.fraction());
                self.renderer.render(reading)
            }
            Err(TelemetryError::UnrecognizedStatus(raw)) => {
                log::warn!("Unrecognized battery status {:?}, showing unknown icon", raw);
                tray.notify(&format!("Unrecognized battery status: {}", raw.trim()));
                self.renderer.render_unknown()
            }
            Err(err @ TelemetryError::SourceUnavailable(_)) => {
                log::error!("{}", err);
                dialog.show_blocking(&err.to_string());
                // Nothing left to display once the dialog is dismissed
                log::info!("Stopping battery monitor");
                self.phase = Phase::Stopped;
                return Flow::Exit;
            }
        };

        push(tray, frame);
        Flow::Continue
    }
}

fn push(tray: &mut impl TraySink, frame: Frame<'_>) {
    if let Err(e) = tray.set_icon(frame.canvas, frame.tooltip) {
        log::warn!("Failed to update tray icon: {:#}", e);
    }
}
