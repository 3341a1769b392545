use std::io;
use std::process::{Command, Stdio};

use crate::monitor::ErrorDialog;

const APP_NAME: &str = "batterymeter";

/// Desktop notifications through the freedesktop helpers.
///
/// Bubbles go through `notify-send` and never block. Errors go through
/// `zenity --error`, which blocks until the user closes the dialog; without
/// zenity a critical notification is sent instead.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn bubble(&self, message: &str) {
        let spawned = Command::new("notify-send")
            .args(["--app-name", APP_NAME, APP_NAME, message])
            .stdin(Stdio::null())
            .spawn();
        match spawned {
            // Reap in the background so the event loop is never held up
            Ok(mut child) => {
                std::thread::spawn(move || child.wait());
            }
            Err(e) => log::warn!("Failed to show notification ({}): {}", e, message),
        }
    }

    fn dialog(&self, message: &str) -> io::Result<()> {
        let status = Command::new("zenity")
            .args(["--error", "--title", APP_NAME, "--no-markup", "--text", message])
            .stdin(Stdio::null())
            .status()?;
        log::debug!("Error dialog closed with {}", status);
        Ok(())
    }

    fn critical(&self, message: &str) -> io::Result<()> {
        Command::new("notify-send")
            .args(["--app-name", APP_NAME, "--urgency", "critical", APP_NAME, message])
            .stdin(Stdio::null())
            .status()
            .map(|_| ())
    }
}

impl ErrorDialog for DesktopNotifier {
    fn show_blocking(&mut self, message: &str) {
        if let Err(e) = self.dialog(message) {
            log::warn!("Failed to open error dialog: {}", e);
            if let Err(e) = self.critical(message) {
                log::warn!("Failed to send critical notification: {}", e);
            }
        }
    }
}
