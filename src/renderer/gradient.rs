use crate::config::Rgba;

/// Charge-level gradient: `low` at an empty battery, `mid` at a quarter charge,
/// `full` at a full battery. Colours are interpolated linearly in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorStops {
    pub full: Rgba,
    pub mid: Rgba,
    pub low: Rgba,
}

pub const LOW_STOP: f32 = 0.0;
pub const MID_STOP: f32 = 0.25;
pub const FULL_STOP: f32 = 1.0;

impl ColorStops {
    pub fn color_at(&self, fraction: f32) -> Rgba {
        let t = fraction.clamp(LOW_STOP, FULL_STOP);
        if t <= MID_STOP {
            lerp(self.low, self.mid, (t - LOW_STOP) / (MID_STOP - LOW_STOP))
        } else {
            lerp(self.mid, self.full, (t - MID_STOP) / (FULL_STOP - MID_STOP))
        }
    }
}

fn lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = a[i] as f32 + (b[i] as f32 - a[i] as f32) * t;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}
