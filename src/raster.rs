//! Software rasterizer: a borrowed RGBA framebuffer plus the anti-aliased
//! primitives the watch layers are built from.

use image::RgbaImage;
use rusttype::{point, Font, PositionedGlyph, Scale};

/// Color representation for dial elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Piecewise-linear gradient lookup over `(position, color)` stops.
/// Stops must be sorted by position; `t` is clamped to the stop range.
pub fn gradient(stops: &[(f32, Color)], t: f32) -> Color {
    match stops {
        [] => Color::new(0, 0, 0),
        [only] => only.1,
        _ => {
            if t <= stops[0].0 {
                return stops[0].1;
            }
            for pair in stops.windows(2) {
                let (p0, c0) = pair[0];
                let (p1, c1) = pair[1];
                if t <= p1 {
                    let span = (p1 - p0).max(1e-6);
                    return c0.lerp(c1, (t - p0) / span);
                }
            }
            stops[stops.len() - 1].1
        }
    }
}

/// Converts a dial angle (zero at 12 o'clock, clockwise) to the screen
/// angle convention used by `cos`/`sin`. The only place the quarter-turn
/// correction lives.
pub fn screen_angle(dial_angle: f64) -> f64 {
    dial_angle - std::f64::consts::FRAC_PI_2
}

/// Point at `radius` from `(cx, cy)` along a dial angle.
pub fn polar_point(cx: f64, cy: f64, dial_angle: f64, radius: f64) -> (f64, f64) {
    let a = screen_angle(dial_angle);
    (cx + a.cos() * radius, cy + a.sin() * radius)
}

pub struct Canvas<'a> {
    pub frame: &'a mut [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Source-over blend of one pixel; out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        if alpha <= 0.0 {
            return;
        }
        let a = alpha.min(1.0);
        let idx = (y as usize * self.width + x as usize) * 4;
        let dst = &mut self.frame[idx..idx + 4];
        dst[0] = (color.r as f32 * a + dst[0] as f32 * (1.0 - a)).round() as u8;
        dst[1] = (color.g as f32 * a + dst[1] as f32 * (1.0 - a)).round() as u8;
        dst[2] = (color.b as f32 * a + dst[2] as f32 * (1.0 - a)).round() as u8;
        dst[3] = 0xff;
    }
}

// ============================================================================
// FILLED SHAPES
// ============================================================================

pub fn fill_disc(canvas: &mut Canvas, cx: f64, cy: f64, radius: f64, color: Color, alpha: f32) {
    let r_ceil = radius.ceil() as i32 + 1;
    let (icx, icy) = (cx.round() as i32, cy.round() as i32);
    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let dist = f64::hypot(icx as f64 + dx as f64 - cx, icy as f64 + dy as f64 - cy);
            let aa = (radius + 0.5 - dist).clamp(0.0, 1.0) as f32;
            if aa > 0.0 {
                canvas.blend_pixel(icx + dx, icy + dy, color, alpha * aa);
            }
        }
    }
}

/// Disk filled with a radial gradient: `t = dist / radius` into `stops`.
pub fn fill_disc_radial(canvas: &mut Canvas, cx: f64, cy: f64, radius: f64, stops: &[(f32, Color)]) {
    let r_ceil = radius.ceil() as i32 + 1;
    let (icx, icy) = (cx.round() as i32, cy.round() as i32);
    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let dist = f64::hypot(icx as f64 + dx as f64 - cx, icy as f64 + dy as f64 - cy);
            let aa = (radius + 0.5 - dist).clamp(0.0, 1.0) as f32;
            if aa > 0.0 {
                let color = gradient(stops, (dist / radius) as f32);
                canvas.blend_pixel(icx + dx, icy + dy, color, aa);
            }
        }
    }
}

/// Annular stroke centered on `radius`, anti-aliased on both edges.
pub fn stroke_ring(
    canvas: &mut Canvas,
    cx: f64,
    cy: f64,
    radius: f64,
    thickness: f64,
    color: Color,
    alpha: f32,
) {
    let outer = radius + thickness / 2.0;
    let inner = (radius - thickness / 2.0).max(0.0);
    let r_ceil = outer.ceil() as i32 + 1;
    let (icx, icy) = (cx.round() as i32, cy.round() as i32);
    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let dist = f64::hypot(icx as f64 + dx as f64 - cx, icy as f64 + dy as f64 - cy);
            let aa_outer = (outer + 0.5 - dist).clamp(0.0, 1.0);
            let aa_inner = (dist - inner + 0.5).clamp(0.0, 1.0);
            let aa = (aa_outer * aa_inner) as f32;
            if aa > 0.0 {
                canvas.blend_pixel(icx + dx, icy + dy, color, alpha * aa);
            }
        }
    }
}

// ============================================================================
// LINES
// ============================================================================

pub fn draw_thick_line_aa(
    canvas: &mut Canvas,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    thickness: f32,
    color: Color,
    alpha: f32,
) {
    stroke_segment(canvas, x0, y0, x1, y1, thickness, color, alpha, false);
}

/// Same as [`draw_thick_line_aa`] but the width tapers towards the far end,
/// which is what a watch hand shaft wants.
pub fn draw_thick_line_tapered_aa(
    canvas: &mut Canvas,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    thickness: f32,
    color: Color,
    alpha: f32,
) {
    stroke_segment(canvas, x0, y0, x1, y1, thickness, color, alpha, true);
}

#[allow(clippy::too_many_arguments)]
fn stroke_segment(
    canvas: &mut Canvas,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    thickness: f32,
    color: Color,
    alpha: f32,
    tapered: bool,
) {
    let pad = thickness.ceil() as i32 + 1;
    let min_x = x0.min(x1).floor() as i32 - pad;
    let max_x = x0.max(x1).ceil() as i32 + pad;
    let min_y = y0.min(y1).floor() as i32 - pad;
    let max_y = y0.max(y1).ceil() as i32 + pad;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = (dx * dx + dy * dy).max(1e-9);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f64 - x0;
            let py = y as f64 - y0;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 + t * dx;
            let ly = y0 + t * dy;
            let dist = f64::hypot(lx - x as f64, ly - y as f64);
            let local = if tapered {
                thickness * (1.0 - t as f32 * 0.95) // keeps a sliver at the tip
            } else {
                thickness
            };
            let aa = (1.0 - (dist as f32 - local / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.blend_pixel(x, y, color, alpha * aa);
            }
        }
    }
}

/// Radial bar between `r_inner` and `r_outer` at a dial angle, shaded with a
/// linear gradient running *across* the bar (perpendicular to its axis).
#[allow(clippy::too_many_arguments)]
pub fn draw_gradient_bar(
    canvas: &mut Canvas,
    cx: f64,
    cy: f64,
    dial_angle: f64,
    r_inner: f64,
    r_outer: f64,
    bar_width: f64,
    stops: &[(f32, Color)],
) {
    let a = screen_angle(dial_angle);
    let (ux, uy) = (a.cos(), a.sin());
    let (px, py) = (-uy, ux);
    let (sx, sy) = (cx + ux * r_inner, cy + uy * r_inner);
    let (ex, ey) = (cx + ux * r_outer, cy + uy * r_outer);
    let pad = (bar_width / 2.0).ceil() as i32 + 1;
    let min_x = sx.min(ex).floor() as i32 - pad;
    let max_x = sx.max(ex).ceil() as i32 + pad;
    let min_y = sy.min(ey).floor() as i32 - pad;
    let max_y = sy.max(ey).ceil() as i32 + pad;
    let len = r_outer - r_inner;
    let half = bar_width / 2.0;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let rx = x as f64 - sx;
            let ry = y as f64 - sy;
            let along = rx * ux + ry * uy;
            let across = rx * px + ry * py;
            let aa_axis = (along + 0.5).clamp(0.0, 1.0) * ((len - along) + 0.5).clamp(0.0, 1.0);
            let aa_side = ((half - across.abs()) + 0.5).clamp(0.0, 1.0);
            let aa = (aa_axis * aa_side) as f32;
            if aa > 0.01 {
                let t = ((across + half) / bar_width) as f32;
                canvas.blend_pixel(x, y, gradient(stops, t), aa);
            }
        }
    }
}

// ============================================================================
// IMAGE BLITS
// ============================================================================

/// Draws `img` scaled to fill a circular aperture, clipped and edge
/// anti-aliased. Image alpha is honored.
pub fn blit_circle_image(canvas: &mut Canvas, img: &RgbaImage, cx: f64, cy: f64, radius: f64) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let r_ceil = radius.ceil() as i32 + 1;
    let (icx, icy) = (cx.round() as i32, cy.round() as i32);
    let diameter = radius * 2.0;
    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let fx = icx as f64 + dx as f64;
            let fy = icy as f64 + dy as f64;
            let dist = f64::hypot(fx - cx, fy - cy);
            let aa = (radius + 0.5 - dist).clamp(0.0, 1.0) as f32;
            if aa <= 0.0 {
                continue;
            }
            let u = ((fx - (cx - radius)) / diameter).clamp(0.0, 1.0);
            let v = ((fy - (cy - radius)) / diameter).clamp(0.0, 1.0);
            let sx = ((u * (img.width() - 1) as f64).round() as u32).min(img.width() - 1);
            let sy = ((v * (img.height() - 1) as f64).round() as u32).min(img.height() - 1);
            let [r, g, b, a] = img.get_pixel(sx, sy).0;
            canvas.blend_pixel(
                icx + dx,
                icy + dy,
                Color::new(r, g, b),
                aa * a as f32 / 255.0,
            );
        }
    }
}

/// Draws `img` stretched over the whole canvas, honoring image alpha.
pub fn blit_full_image(canvas: &mut Canvas, img: &RgbaImage) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let (w, h) = (canvas.width, canvas.height);
    for y in 0..h {
        let sy = ((y as f64 / h as f64) * (img.height() - 1) as f64).round() as u32;
        for x in 0..w {
            let sx = ((x as f64 / w as f64) * (img.width() - 1) as f64).round() as u32;
            let [r, g, b, a] = img.get_pixel(sx.min(img.width() - 1), sy.min(img.height() - 1)).0;
            if a > 0 {
                canvas.blend_pixel(x as i32, y as i32, Color::new(r, g, b), a as f32 / 255.0);
            }
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

pub fn text_width(text: &str, font: &Font, scale: Scale) -> i32 {
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, 0.0)).collect();
    let (min_x, max_x) = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold((i32::MAX, i32::MIN), |(lo, hi), bb| {
            (lo.min(bb.min.x), hi.max(bb.max.x))
        });
    if min_x < max_x {
        max_x - min_x
    } else {
        0
    }
}

/// Draws `text` centered on `(x, y)`.
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    scale: Scale,
    color: Color,
    alpha: f32,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(lo_x, hi_x, lo_y, hi_y), bb| {
            (
                lo_x.min(bb.min.x),
                hi_x.max(bb.max.x),
                lo_y.min(bb.min.y),
                hi_y.max(bb.max.y),
            )
        },
    );
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let height_px = if min_y < max_y { max_y - min_y } else { 0 };
    let offset_x = x - width_px / 2;
    let offset_y = y - height_px / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.blend_pixel(px, py, color, v * alpha);
            });
        }
    }
}

/// Lays `text` letter by letter along a circular arc centered on
/// `center_dial_angle`. With `Upright` the glyph tops face the dial center
/// (lower arcs): iteration runs in reverse and each glyph gets a half-turn
/// of rotation compensation so the string still reads left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcOrientation {
    /// Glyph tops face outward; natural for text on the upper half.
    Outward,
    /// Glyph tops face the center; natural for text on the lower half.
    Upright,
}

#[allow(clippy::too_many_arguments)]
pub fn draw_curved_text(
    canvas: &mut Canvas,
    cx: f64,
    cy: f64,
    radius: f64,
    text: &str,
    font: &Font,
    scale: Scale,
    arc_span: f64,
    center_dial_angle: f64,
    orientation: ArcOrientation,
    color: Color,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (Some(first), Some(last)) = (glyphs.first(), glyphs.last()) else {
        return;
    };
    let total_width = (last.position().x - first.position().x
        + last.unpositioned().h_metrics().advance_width) as f64;
    if total_width <= 0.0 || radius <= 0.0 {
        return;
    }

    let actual_span = (total_width / radius).min(arc_span);
    let first_position = first.position().x as f64;

    for glyph in &glyphs {
        if glyph.pixel_bounding_box().is_none() {
            continue;
        }
        let advance = glyph.unpositioned().h_metrics().advance_width as f64;
        let relative = glyph.position().x as f64 - first_position + advance / 2.0;
        // fraction of the string consumed, 0 at the first glyph
        let frac = relative / total_width;
        let dial_angle = match orientation {
            ArcOrientation::Outward => center_dial_angle - actual_span / 2.0 + frac * actual_span,
            // reverse iteration: the first glyph sits at the *most clockwise* end
            ArcOrientation::Upright => center_dial_angle + actual_span / 2.0 - frac * actual_span,
        };
        let (gx, gy) = polar_point(cx, cy, dial_angle, radius);
        let rotation = match orientation {
            ArcOrientation::Outward => screen_angle(dial_angle) + std::f64::consts::FRAC_PI_2,
            ArcOrientation::Upright => screen_angle(dial_angle) - std::f64::consts::FRAC_PI_2,
        };
        draw_rotated_glyph(canvas, glyph, gx, gy, rotation, color);
    }
}

fn draw_rotated_glyph(
    canvas: &mut Canvas,
    glyph: &PositionedGlyph,
    center_x: f64,
    center_y: f64,
    rotation: f64,
    color: Color,
) {
    let Some(bb) = glyph.pixel_bounding_box() else {
        return;
    };
    let cos_r = rotation.cos();
    let sin_r = rotation.sin();
    let glyph_center_x = (bb.min.x + bb.max.x) as f64 / 2.0;
    let glyph_center_y = (bb.min.y + bb.max.y) as f64 / 2.0;
    glyph.draw(|gx, gy, v| {
        if v > 0.001 {
            let local_x = gx as f64 + bb.min.x as f64 - glyph_center_x;
            let local_y = gy as f64 + bb.min.y as f64 - glyph_center_y;
            let rotated_x = local_x * cos_r - local_y * sin_r;
            let rotated_y = local_x * sin_r + local_y * cos_r;
            draw_subpixel(canvas, center_x + rotated_x, center_y + rotated_y, color, v);
        }
    });
}

/// Bilinear distribution of one coverage sample over the four nearest pixels.
fn draw_subpixel(canvas: &mut Canvas, x: f64, y: f64, color: Color, alpha: f32) {
    let x_floor = x.floor() as i32;
    let y_floor = y.floor() as i32;
    let x_frac = (x - x_floor as f64) as f32;
    let y_frac = (y - y_floor as f64) as f32;
    let samples = [
        (x_floor, y_floor, (1.0 - x_frac) * (1.0 - y_frac)),
        (x_floor + 1, y_floor, x_frac * (1.0 - y_frac)),
        (x_floor, y_floor + 1, (1.0 - x_frac) * y_frac),
        (x_floor + 1, y_floor + 1, x_frac * y_frac),
    ];
    for (px, py, weight) in samples {
        let a = alpha * weight;
        if a > 0.001 {
            canvas.blend_pixel(px, py, color, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_buf(w: usize, h: usize) -> Vec<u8> {
        vec![0u8; w * h * 4]
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [
            (0.0, Color::new(0, 0, 0)),
            (1.0, Color::new(200, 100, 50)),
        ];
        assert_eq!(gradient(&stops, -1.0), Color::new(0, 0, 0));
        assert_eq!(gradient(&stops, 2.0), Color::new(200, 100, 50));
        assert_eq!(gradient(&stops, 0.5), Color::new(100, 50, 25));
    }

    #[test]
    fn polar_zero_points_up() {
        let (x, y) = polar_point(50.0, 50.0, 0.0, 10.0);
        assert!((x - 50.0).abs() < 1e-9);
        assert!((y - 40.0).abs() < 1e-9);

        let quarter = std::f64::consts::TAU / 4.0;
        let (x, y) = polar_point(50.0, 50.0, quarter, 10.0);
        assert!((x - 60.0).abs() < 1e-9, "3 o'clock is +x");
        assert!((y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn blend_pixel_ignores_out_of_bounds() {
        let mut buf = canvas_buf(4, 4);
        let mut canvas = Canvas::new(&mut buf, 4, 4);
        canvas.blend_pixel(-1, 0, Color::new(255, 255, 255), 1.0);
        canvas.blend_pixel(0, 99, Color::new(255, 255, 255), 1.0);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_disc_covers_center_not_corner() {
        let mut buf = canvas_buf(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20);
        canvas.clear(Color::new(0, 0, 0));
        fill_disc(&mut canvas, 10.0, 10.0, 6.0, Color::new(255, 0, 0), 1.0);
        let center = (10 * 20 + 10) * 4;
        assert_eq!(buf[center], 255);
        assert_eq!(buf[0], 0, "corner untouched");
    }

    #[test]
    fn ring_leaves_center_untouched() {
        let mut buf = canvas_buf(30, 30);
        let mut canvas = Canvas::new(&mut buf, 30, 30);
        canvas.clear(Color::new(0, 0, 0));
        stroke_ring(&mut canvas, 15.0, 15.0, 10.0, 2.0, Color::new(0, 255, 0), 1.0);
        let center = (15 * 30 + 15) * 4;
        assert_eq!(buf[center + 1], 0);
        let on_ring = (15 * 30 + 25) * 4;
        assert!(buf[on_ring + 1] > 200);
    }

    #[test]
    fn circle_blit_clips_to_aperture() {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
        let mut buf = canvas_buf(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20);
        canvas.clear(Color::new(0, 0, 0));
        blit_circle_image(&mut canvas, &img, 10.0, 10.0, 5.0);
        let center = (10 * 20 + 10) * 4;
        assert_eq!(buf[center], 255);
        let outside = (10 * 20 + 17) * 4;
        assert_eq!(buf[outside], 0);
    }
}
