pub mod gradient;

pub use gradient::ColorStops;

use anyhow::Result;

use crate::battery::{BatteryStatus, Reading};
use crate::canvas::Canvas;
use crate::config::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub charging: Rgba,
    pub full: Rgba,
    pub stops: ColorStops,
}

/// The icon as last painted. Borrowed from the renderer, valid until the next render.
pub struct Frame<'a> {
    pub canvas: &'a Canvas,
    pub tooltip: &'a str,
}

/// Paints battery readings onto a square canvas that is reused every cycle.
pub struct IconRenderer {
    canvas: Canvas,
    tooltip: String,
    palette: Palette,
}

impl IconRenderer {
    pub fn new(canvas_size: u32, palette: Palette) -> Result<Self> {
        Ok(Self {
            canvas: Canvas::new(canvas_size, canvas_size)?,
            tooltip: String::new(),
            palette,
        })
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas.width()
    }

    pub fn render(&mut self, reading: Reading) -> Frame<'_> {
        let size = self.canvas_size();
        let height = bar_height(reading.fraction(), size);
        let top = size - height;

        self.canvas.clear(self.palette.background);
        // Bar grows upward from the bottom edge
        match reading.status() {
            BatteryStatus::Charging => self.fill_rows(top, self.palette.charging),
            BatteryStatus::Full => self.fill_rows(top, self.palette.full),
            BatteryStatus::Discharging | BatteryStatus::Unknown => {
                // Gradient is anchored to the canvas, not to the bar
                for y in top..size {
                    let color = self.palette.stops.color_at(gradient_position(y, size));
                    self.canvas.fill_rect(0.0, y as f32, size as f32, 1.0, color);
                }
            }
        }

        self.tooltip = tooltip_text(&reading);
        self.frame()
    }

    fn fill_rows(&mut self, top: u32, color: Rgba) {
        let size = self.canvas_size();
        self.canvas
            .fill_rect(0.0, top as f32, size as f32, (size - top) as f32, color);
    }

    /// Icon for a cycle whose status could not be classified.
    pub fn render_unknown(&mut self) -> Frame<'_> {
        self.render(Reading::new(BatteryStatus::Unknown, 0.0))
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            canvas: &self.canvas,
            tooltip: &self.tooltip,
        }
    }
}

pub fn bar_height(fraction: f64, canvas_size: u32) -> u32 {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let height = (fraction * canvas_size as f64).round() as u32;
    height.min(canvas_size)
}

pub fn tooltip_text(reading: &Reading) -> String {
    format!("{} {:6.2} %", reading.status(), reading.percent())
}

/// Charge level at the centre of pixel row `y`, counted up from the bottom edge.
fn gradient_position(y: u32, canvas_size: u32) -> f32 {
    (canvas_size as f32 - (y as f32 + 0.5)) / canvas_size as f32
}

/// A cross on a transparent square, used for the Exit menu entry.
#[cfg(any(test, feature = "tray"))]
pub fn close_glyph(size: u32, color: Rgba) -> Result<Canvas> {
    let mut canvas = Canvas::new(size, size)?;
    canvas.clear([0, 0, 0, 0]);
    let inset = size as f32 * 0.2;
    let far = size as f32 - inset;
    let width = (size as f32 / 8.0).max(1.5);
    canvas.draw_line(inset, inset, far, far, color, width);
    canvas.draw_line(far, inset, inset, far, color, width);
    Ok(canvas)
}
