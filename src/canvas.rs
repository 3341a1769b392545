use std::path::Path;

use anyhow::{Context, Result};
#[cfg(any(test, feature = "tray"))]
use tiny_skia::{PathBuilder, Stroke};
use tiny_skia::{Color, Paint, Pixmap, Rect, Shader, Transform};

use crate::config::Rgba;

pub struct Canvas {
    pub pixmap: Pixmap,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .with_context(|| format!("Invalid canvas size {}x{}", width, height))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixmap.fill(to_color(color));
    }

    /// Pixel-aligned fill, no anti-aliasing.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(x, y, w, h) else { return };
        let paint = Paint {
            shader: Shader::SolidColor(to_color(color)),
            anti_alias: false,
            ..Paint::default()
        };
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    #[cfg(any(test, feature = "tray"))]
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(x1, y1);
        pb.line_to(x2, y2);
        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(to_color(color));
            paint.anti_alias = true;
            let stroke = Stroke { width, ..Stroke::default() };
            self.pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Pixel at `(x, y)` as straight (non-premultiplied) RGBA.
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Straight RGBA bytes, row-major, as expected by tray icon backends.
    #[cfg(any(test, feature = "tray"))]
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixmap
            .save_png(path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], c[3])
}
