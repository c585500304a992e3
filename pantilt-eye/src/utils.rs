//! Overlay drawing helpers

use crate::frame::Frame;
use image::Rgb;

pub(crate) const MARKER_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Paint a list of points, ignoring any outside the frame.
pub(crate) fn draw_points(frame: &mut Frame, points: &[(u32, u32)], color: Rgb<u8>) {
    for &(x, y) in points {
        if x < frame.width() && y < frame.height() {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Filled disc.
pub(crate) fn draw_disc(frame: &mut Frame, center: (u32, u32), radius: u32, color: Rgb<u8>) {
    let (cx, cy, r) = (center.0 as i64, center.1 as i64, radius as i64);
    for y in (cy - r)..=(cy + r) {
        for x in (cx - r)..=(cx + r) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                put_clipped(frame, x, y, color);
            }
        }
    }
}

/// One-pixel circle outline.
pub(crate) fn draw_ring(frame: &mut Frame, center: (u32, u32), radius: u32, color: Rgb<u8>) {
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    let r = radius as f64;
    // Enough samples that neighbouring points touch.
    let steps = ((2.0 * std::f64::consts::PI * r).ceil() as usize).max(8) * 2;
    for i in 0..steps {
        let theta = i as f64 * 2.0 * std::f64::consts::PI / steps as f64;
        let x = cx + (r * theta.cos()).round() as i64;
        let y = cy + (r * theta.sin()).round() as i64;
        put_clipped(frame, x, y, color);
    }
}

fn put_clipped(frame: &mut Frame, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < frame.width() as u64 && (y as u64) < frame.height() as u64 {
        frame.put_pixel(x as u32, y as u32, color);
    }
}
