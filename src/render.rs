//! Layer renderer: one routine per visual layer of the watch face, composed
//! in a fixed order by [`render_watch`].
//!
//! Every routine is a pure function of the canvas, the per-frame
//! [`FrameContext`] and the configuration. Nothing here keeps state between
//! frames, so rendering the same context twice produces identical pixels.

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use image::RgbaImage;
use rusttype::{Font, Scale};

use crate::astro::{self, ClockAngles};
use crate::raster::{
    blit_circle_image, blit_full_image, draw_curved_text, draw_gradient_bar, draw_text,
    draw_thick_line_aa, draw_thick_line_tapered_aa, fill_disc, fill_disc_radial, polar_point,
    stroke_ring, ArcOrientation, Canvas, Color,
};
use crate::WatchConfig;

const TAU: f64 = std::f64::consts::TAU;

// ============================================================================
// PALETTE
// ============================================================================

const DIAL_GRADIENT: [(f32, Color); 3] = [
    (0.0, Color::new(246, 243, 233)),
    (0.72, Color::new(231, 226, 211)),
    (1.0, Color::new(202, 196, 178)),
];
const DIAL_RING: Color = Color::new(62, 58, 50);
const TRACK_COLOR: Color = Color::new(38, 38, 44);
const NUMERAL_COLOR: Color = Color::new(44, 41, 36);
const METAL_STOPS: [(f32, Color); 5] = [
    (0.0, Color::new(92, 92, 102)),
    (0.25, Color::new(228, 228, 238)),
    (0.5, Color::new(148, 148, 160)),
    (0.75, Color::new(240, 240, 248)),
    (1.0, Color::new(84, 84, 96)),
];
const MOON_FALLBACK: Color = Color::new(18, 24, 48);
const SIDEREAL_GRADIENT: [(f32, Color); 3] = [
    (0.0, Color::new(54, 60, 78)),
    (0.7, Color::new(38, 44, 60)),
    (1.0, Color::new(24, 28, 40)),
];
const DATE_PANEL: Color = Color::new(250, 248, 240);
const DATE_OUTLINE: Color = Color::new(70, 64, 54);
const GMT_HAND_COLOR: Color = Color::new(152, 30, 42);
const SECOND_HAND_COLOR: Color = Color::new(46, 62, 140);
const SPARKLE_COLOR: Color = Color::new(255, 255, 252);

/// Fixed angular correction added to the sidereal hand, degrees. Calibration
/// constant chosen so the hand lines up with the intended reference marker;
/// cosmetic, not derived from the astronomy.
const SIDEREAL_HAND_OFFSET_DEG: f64 = 30.0;

// ============================================================================
// FRAME CONTEXT
// ============================================================================

/// Everything a layer routine needs for one frame, captured once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub angles: ClockAngles,
    pub moon_age: f64,
    pub moon_phase: usize,
    pub sidereal: f64,
    pub day_of_month: u32,
    /// Seconds since local midnight including the sub-second fraction;
    /// drives the sparkle and breathing modulation.
    pub wall_seconds: f64,
}

impl FrameContext {
    pub fn capture(
        now: DateTime<Local>,
        gmt_offset_hours: i64,
        width: usize,
        height: usize,
        dial_margin: f64,
    ) -> Self {
        let utc = now.with_timezone(&Utc);
        let age = astro::moon_age(utc);
        Self {
            cx: width as f64 / 2.0,
            cy: height as f64 / 2.0,
            radius: (width.min(height) as f64) / 2.0 - dial_margin,
            angles: astro::clock_angles(&now, gmt_offset_hours),
            moon_age: age,
            moon_phase: astro::moon_phase_index(age),
            sidereal: astro::sidereal_angle(utc),
            day_of_month: now.day(),
            wall_seconds: f64::from(now.num_seconds_from_midnight())
                + f64::from(now.nanosecond()) / 1e9,
        }
    }
}

/// Read-only view of the loaded assets for one frame.
pub struct FrameAssets<'a> {
    pub moon: Option<&'a RgbaImage>,
    pub case: Option<&'a RgbaImage>,
}

// ============================================================================
// SPARKLE / BREATHING MODULATION
// ============================================================================

/// Deterministic per-element glint. One-sided: below the threshold the
/// intensity is exactly zero, so highlights flash rather than glow.
pub fn sparkle(wall_seconds: f64, index: usize) -> f32 {
    const THRESHOLD: f64 = 0.96;
    // 2.39996 rad spacing desynchronizes neighboring elements
    let v = (wall_seconds * 0.9 + index as f64 * 2.39996).sin();
    if v > THRESHOLD {
        ((v - THRESHOLD) / (1.0 - THRESHOLD)) as f32
    } else {
        0.0
    }
}

fn breathe(wall_seconds: f64, rate: f64, phase: f64) -> f32 {
    (0.5 + 0.5 * (wall_seconds * rate + phase).sin()) as f32
}

// ============================================================================
// LAYER ROUTINES (in compositing order)
// ============================================================================

/// 1. Dial plate: radial gradient disk plus a thin rim stroke.
pub fn draw_dial_background(canvas: &mut Canvas, ctx: &FrameContext) {
    fill_disc_radial(canvas, ctx.cx, ctx.cy, ctx.radius, &DIAL_GRADIENT);
    stroke_ring(canvas, ctx.cx, ctx.cy, ctx.radius - 1.0, 2.0, DIAL_RING, 1.0);
}

/// 2. Minute track: 60 radial ticks, every fifth one heavier.
pub fn draw_minute_track(canvas: &mut Canvas, ctx: &FrameContext) {
    let r_outer = ctx.radius * 0.955;
    for i in 0..60 {
        let angle = i as f64 / 60.0 * TAU;
        let major = i % 5 == 0;
        let len = if major { 0.06 } else { 0.03 } * ctx.radius;
        let thickness = if major { 2.4 } else { 1.1 };
        let (x0, y0) = polar_point(ctx.cx, ctx.cy, angle, r_outer - len);
        let (x1, y1) = polar_point(ctx.cx, ctx.cy, angle, r_outer);
        draw_thick_line_aa(canvas, x0, y0, x1, y1, thickness, TRACK_COLOR, 1.0);
    }
}

/// 3. Hour batons: beveled metallic bars; 3, 6 and 9 are shortened to clear
/// the date window and the subdials. Each baton carries its own glint clock.
pub fn draw_hour_batons(canvas: &mut Canvas, ctx: &FrameContext) {
    for h in 0..12 {
        let angle = h as f64 / 12.0 * TAU;
        let shortened = matches!(h, 3 | 6 | 9);
        let r_inner = if shortened { 0.86 } else { 0.74 } * ctx.radius;
        let r_outer = 0.925 * ctx.radius;
        let width = 0.045 * ctx.radius;
        draw_gradient_bar(
            canvas, ctx.cx, ctx.cy, angle, r_inner, r_outer, width, &METAL_STOPS,
        );
        let glint = sparkle(ctx.wall_seconds, h);
        if glint > 0.0 {
            let mid = (r_inner + r_outer) / 2.0;
            let (gx, gy) = polar_point(ctx.cx, ctx.cy, angle, mid);
            fill_disc(canvas, gx, gy, 0.013 * ctx.radius, SPARKLE_COLOR, glint);
        }
    }
}

/// 4. Roman numerals; XII is rendered larger and further out.
pub fn draw_roman_numerals(canvas: &mut Canvas, ctx: &FrameContext, font: &Font) {
    const ROMAN: [&str; 12] = [
        "XII", "I", "II", "III", "IIII", "V", "VI", "VII", "VIII", "IX", "X", "XI",
    ];
    for (h, numeral) in ROMAN.iter().enumerate() {
        let angle = h as f64 / 12.0 * TAU;
        let (label_r, size) = if h == 0 {
            (0.655 * ctx.radius, 0.155 * ctx.radius)
        } else {
            (0.62 * ctx.radius, 0.105 * ctx.radius)
        };
        let (x, y) = polar_point(ctx.cx, ctx.cy, angle, label_r);
        draw_text(
            canvas,
            x.round() as i32,
            y.round() as i32,
            numeral,
            font,
            Scale::uniform(size as f32),
            NUMERAL_COLOR,
            1.0,
        );
    }
}

/// 5. Brand block under 12 o'clock.
pub fn draw_brand_text(canvas: &mut Canvas, ctx: &FrameContext, cfg: &WatchConfig, font: &Font) {
    let x = ctx.cx.round() as i32;
    draw_text(
        canvas,
        x,
        (ctx.cy - 0.315 * ctx.radius).round() as i32,
        &cfg.brand_name,
        font,
        Scale::uniform((0.10 * ctx.radius) as f32),
        NUMERAL_COLOR,
        1.0,
    );
    draw_text(
        canvas,
        x,
        (ctx.cy - 0.225 * ctx.radius).round() as i32,
        &cfg.brand_line,
        font,
        Scale::uniform((0.055 * ctx.radius) as f32),
        NUMERAL_COLOR,
        0.9,
    );
}

/// 6. Small labels laid letter by letter along arcs in the lower half.
pub fn draw_arc_labels(canvas: &mut Canvas, ctx: &FrameContext, cfg: &WatchConfig, font: &Font) {
    let scale = Scale::uniform((0.048 * ctx.radius) as f32);
    for (text, center_angle) in [
        (cfg.arc_label_a.as_str(), 0.605 * TAU),
        (cfg.arc_label_b.as_str(), 0.395 * TAU),
    ] {
        draw_curved_text(
            canvas,
            ctx.cx,
            ctx.cy,
            0.80 * ctx.radius,
            text,
            font,
            scale,
            0.16 * TAU,
            center_angle,
            ArcOrientation::Upright,
            NUMERAL_COLOR,
        );
    }
}

/// 7. Moon-phase subdial at 9 o'clock: clipped phase image (or flat night
/// sky while images are still loading) framed by a silver and a dark ring.
pub fn draw_moon_subdial(
    canvas: &mut Canvas,
    ctx: &FrameContext,
    cfg: &WatchConfig,
    moon: Option<&RgbaImage>,
) {
    let (cx, cy) = polar_point(
        ctx.cx,
        ctx.cy,
        0.75 * TAU,
        cfg.moon_distance_factor * ctx.radius,
    );
    let r_sub = cfg.moon_radius_factor * ctx.radius;
    match moon {
        Some(img) => blit_circle_image(canvas, img, cx, cy, r_sub),
        None => fill_disc(canvas, cx, cy, r_sub, MOON_FALLBACK, 1.0),
    }
    stroke_ring(canvas, cx, cy, r_sub + 1.5, 3.0, Color::new(208, 208, 216), 1.0);
    stroke_ring(canvas, cx, cy, r_sub - 1.0, 2.0, Color::new(24, 24, 30), 0.8);
}

/// 8. Sidereal-time subdial at 6 o'clock with a 24-hour style hand.
pub fn draw_sidereal_subdial(
    canvas: &mut Canvas,
    ctx: &FrameContext,
    cfg: &WatchConfig,
    font: &Font,
) {
    let (cx, cy) = polar_point(
        ctx.cx,
        ctx.cy,
        0.5 * TAU,
        cfg.sidereal_distance_factor * ctx.radius,
    );
    let r_sub = cfg.sidereal_radius_factor * ctx.radius;
    fill_disc_radial(canvas, cx, cy, r_sub, &SIDEREAL_GRADIENT);
    stroke_ring(canvas, cx, cy, r_sub, 1.8, Color::new(180, 184, 198), 1.0);

    let scale = Scale::uniform((0.42 * r_sub) as f32);
    let pale = Color::new(214, 218, 230);
    for (label, angle) in [("12", 0.0), ("3", 0.25), ("6", 0.5), ("9", 0.75)] {
        let (x, y) = polar_point(cx, cy, angle * TAU, 0.68 * r_sub);
        draw_text(canvas, x.round() as i32, y.round() as i32, label, font, scale, pale, 1.0);
    }

    let hand_angle = ctx.sidereal + SIDEREAL_HAND_OFFSET_DEG.to_radians();
    let (tip_x, tip_y) = polar_point(cx, cy, hand_angle, 0.82 * r_sub);
    draw_thick_line_tapered_aa(canvas, cx, cy, tip_x, tip_y, 2.6, pale, 1.0);
    fill_disc(canvas, cx, cy, 0.09 * r_sub, pale, 1.0);
}

/// 9. Date window at 3 o'clock: a recessed trapezoid panel (left edge
/// shorter than right) with inner shadows on the top and left edges.
pub fn draw_date_window(canvas: &mut Canvas, ctx: &FrameContext, cfg: &WatchConfig, font: &Font) {
    let center_x = ctx.cx + cfg.date_distance_factor * ctx.radius;
    let half_w = 0.10 * ctx.radius;
    let half_left = 0.065 * ctx.radius;
    let half_right = 0.085 * ctx.radius;
    let x0 = (center_x - half_w).round() as i32;
    let x1 = (center_x + half_w).round() as i32;
    let shadow_depth = 0.035 * ctx.radius;
    let shadow = Color::new(60, 54, 44);

    for x in x0..=x1 {
        let t = (x - x0) as f64 / (x1 - x0).max(1) as f64;
        let half_h = half_left + (half_right - half_left) * t;
        let top = ctx.cy - half_h;
        let bottom = ctx.cy + half_h;
        for y in top.floor() as i32..=bottom.ceil() as i32 {
            let fy = y as f64;
            let aa = ((fy - top + 0.5).clamp(0.0, 1.0) * (bottom - fy + 0.5).clamp(0.0, 1.0)) as f32;
            if aa <= 0.0 {
                continue;
            }
            canvas.blend_pixel(x, y, DATE_PANEL, aa);
            // recessed look: shadows falling from the top and left edges
            let from_top = ((fy - top) / shadow_depth).clamp(0.0, 1.0);
            let from_left = ((x - x0) as f64 / shadow_depth).clamp(0.0, 1.0);
            let shade = (1.0 - from_top) * 0.38 + (1.0 - from_left) * 0.22;
            if shade > 0.0 {
                canvas.blend_pixel(x, y, shadow, shade as f32 * aa);
            }
        }
    }

    let corners = [
        (x0 as f64, ctx.cy - half_left),
        (x1 as f64, ctx.cy - half_right),
        (x1 as f64, ctx.cy + half_right),
        (x0 as f64, ctx.cy + half_left),
    ];
    for i in 0..4 {
        let (ax, ay) = corners[i];
        let (bx, by) = corners[(i + 1) % 4];
        draw_thick_line_aa(canvas, ax, ay, bx, by, 1.6, DATE_OUTLINE, 1.0);
    }

    draw_text(
        canvas,
        center_x.round() as i32,
        ctx.cy.round() as i32,
        &ctx.day_of_month.to_string(),
        font,
        Scale::uniform((0.115 * ctx.radius) as f32),
        Color::new(20, 18, 14),
        1.0,
    );
}

/// 10. Origin marking split around 6 o'clock, letters following the rim.
pub fn draw_swiss_marking(canvas: &mut Canvas, ctx: &FrameContext, font: &Font) {
    let scale = Scale::uniform((0.042 * ctx.radius) as f32);
    for (text, center_angle) in [("SWISS", 0.47 * TAU), ("MADE", 0.53 * TAU)] {
        draw_curved_text(
            canvas,
            ctx.cx,
            ctx.cy,
            0.975 * ctx.radius,
            text,
            font,
            scale,
            0.05 * TAU,
            center_angle,
            ArcOrientation::Upright,
            TRACK_COLOR,
        );
    }
}

/// 11. Hands, drawn GMT first so the local hands stack above it.
pub fn draw_hands(canvas: &mut Canvas, ctx: &FrameContext) {
    draw_gmt_hand(canvas, ctx);
    draw_pomme_hand(canvas, ctx, ctx.angles.hour, 0.52, 0.030, 12);
    draw_pomme_hand(canvas, ctx, ctx.angles.minute, 0.78, 0.024, 13);
    draw_second_hand(canvas, ctx);
}

fn draw_gmt_hand(canvas: &mut Canvas, ctx: &FrameContext) {
    let angle = ctx.angles.gmt;
    let reach = 0.58 * ctx.radius;
    let (tip_x, tip_y) = polar_point(ctx.cx, ctx.cy, angle, reach);
    let (base_x, base_y) = polar_point(ctx.cx, ctx.cy, angle, reach - 0.07 * ctx.radius);
    draw_thick_line_tapered_aa(
        canvas,
        ctx.cx,
        ctx.cy,
        base_x,
        base_y,
        (0.016 * ctx.radius) as f32,
        GMT_HAND_COLOR,
        1.0,
    );
    // arrow tip: two strokes widening back from the point
    let a = crate::raster::screen_angle(angle);
    let (px, py) = (-a.sin(), a.cos());
    let spread = 0.028 * ctx.radius;
    for side in [-1.0, 1.0] {
        draw_thick_line_aa(
            canvas,
            tip_x,
            tip_y,
            base_x + px * spread * side,
            base_y + py * spread * side,
            (0.012 * ctx.radius) as f32,
            GMT_HAND_COLOR,
            1.0,
        );
    }
}

/// Shared hour/minute hand shape: metallic tapered shaft with a hollow ring
/// ornament partway along ("pomme"), plus a short back extension.
fn draw_pomme_hand(
    canvas: &mut Canvas,
    ctx: &FrameContext,
    angle: f64,
    length_factor: f64,
    width_factor: f64,
    sparkle_index: usize,
) {
    let length = length_factor * ctx.radius;
    let width = width_factor * ctx.radius;
    let ornament_r = 0.68 * length;

    draw_gradient_bar(
        canvas,
        ctx.cx,
        ctx.cy,
        angle,
        -0.08 * ctx.radius,
        ornament_r - width * 1.4,
        width,
        &METAL_STOPS,
    );

    let (ox, oy) = polar_point(ctx.cx, ctx.cy, angle, ornament_r);
    stroke_ring(canvas, ox, oy, width * 1.5, width * 0.8, Color::new(226, 226, 236), 1.0);
    stroke_ring(canvas, ox, oy, width * 1.5, 1.0, Color::new(80, 80, 92), 0.7);

    let (start_x, start_y) = polar_point(ctx.cx, ctx.cy, angle, ornament_r + width * 1.4);
    let (tip_x, tip_y) = polar_point(ctx.cx, ctx.cy, angle, length);
    draw_thick_line_tapered_aa(
        canvas,
        start_x,
        start_y,
        tip_x,
        tip_y,
        width as f32 * 0.9,
        Color::new(150, 150, 162),
        1.0,
    );

    let glint = sparkle(ctx.wall_seconds, sparkle_index);
    if glint > 0.0 {
        fill_disc(canvas, ox, oy, width * 0.6, SPARKLE_COLOR, glint);
    }
}

fn draw_second_hand(canvas: &mut Canvas, ctx: &FrameContext) {
    let angle = ctx.angles.second;
    let (tip_x, tip_y) = polar_point(ctx.cx, ctx.cy, angle, 0.88 * ctx.radius);
    draw_thick_line_tapered_aa(canvas, ctx.cx, ctx.cy, tip_x, tip_y, 2.2, SECOND_HAND_COLOR, 1.0);

    // counterweight disk on the opposite side of the pivot
    let (cw_x, cw_y) = polar_point(ctx.cx, ctx.cy, angle + TAU / 2.0, 0.16 * ctx.radius);
    draw_thick_line_aa(canvas, ctx.cx, ctx.cy, cw_x, cw_y, 2.2, SECOND_HAND_COLOR, 1.0);
    fill_disc(canvas, cw_x, cw_y, 0.028 * ctx.radius, SECOND_HAND_COLOR, 1.0);
    fill_disc(canvas, cw_x, cw_y, 0.012 * ctx.radius, Color::new(170, 180, 226), 1.0);

    let glint = sparkle(ctx.wall_seconds, 14);
    if glint > 0.0 {
        let (gx, gy) = polar_point(ctx.cx, ctx.cy, angle, 0.55 * ctx.radius);
        fill_disc(canvas, gx, gy, 0.010 * ctx.radius, SPARKLE_COLOR, glint);
    }
}

/// 12. Center pivot.
pub fn draw_center_pin(canvas: &mut Canvas, ctx: &FrameContext) {
    fill_disc(canvas, ctx.cx, ctx.cy, 0.030 * ctx.radius, Color::new(50, 50, 58), 1.0);
    fill_disc(canvas, ctx.cx, ctx.cy, 0.016 * ctx.radius, Color::new(210, 210, 220), 1.0);
}

/// 13. Case overlay, stretched over the whole canvas above dial and hands.
pub fn draw_case_overlay(canvas: &mut Canvas, case: Option<&RgbaImage>) {
    if let Some(img) = case {
        blit_full_image(canvas, img);
    }
}

/// 14. Crystal: four translucent passes whose opacity breathes with slow
/// sines of wall-clock time.
pub fn draw_crystal(canvas: &mut Canvas, ctx: &FrameContext) {
    let t = ctx.wall_seconds;
    let white = Color::new(255, 255, 255);

    // pass 1: edge highlight hugging the rim
    let edge_alpha = 0.07 + 0.05 * breathe(t, 0.21, 0.0);
    stroke_ring(
        canvas,
        ctx.cx,
        ctx.cy,
        0.965 * ctx.radius,
        0.05 * ctx.radius,
        white,
        edge_alpha,
    );

    // pass 2: reflection band sweeping across the dome
    let band_alpha = 0.035 + 0.045 * breathe(t, 0.13, 1.3);
    let band_offset = (t * 0.07).sin() * 0.55 * ctx.radius;
    let band_half = 0.16 * ctx.radius;
    let band_dir = 0.62_f64; // fixed diagonal, radians
    let (nx, ny) = (-band_dir.sin(), band_dir.cos());
    let r_ceil = ctx.radius.ceil() as i32 + 1;
    let (icx, icy) = (ctx.cx.round() as i32, ctx.cy.round() as i32);
    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let fx = (icx + dx) as f64 - ctx.cx;
            let fy = (icy + dy) as f64 - ctx.cy;
            if fx.hypot(fy) > ctx.radius {
                continue;
            }
            let line_dist = (fx * nx + fy * ny - band_offset).abs();
            if line_dist < band_half {
                let falloff = (1.0 - line_dist / band_half) as f32;
                canvas.blend_pixel(icx + dx, icy + dy, white, band_alpha * falloff * falloff);
            }
        }
    }

    // pass 3: faint cool tint over the whole crystal
    let tint_alpha = 0.025 + 0.02 * breathe(t, 0.11, 2.6);
    fill_disc(canvas, ctx.cx, ctx.cy, ctx.radius, Color::new(205, 215, 235), tint_alpha);

    // pass 4: dome-curvature vignette darkening towards the rim
    let vignette = Color::new(10, 12, 20);
    let vignette_alpha = 0.12 + 0.04 * breathe(t, 0.09, 4.1);
    for dy in -r_ceil..=r_ceil {
        for dx in -r_ceil..=r_ceil {
            let fx = (icx + dx) as f64 - ctx.cx;
            let fy = (icy + dy) as f64 - ctx.cy;
            let frac = fx.hypot(fy) / ctx.radius;
            if (0.78..=1.0).contains(&frac) {
                let edge = ((frac - 0.78) / 0.22) as f32;
                canvas.blend_pixel(icx + dx, icy + dy, vignette, vignette_alpha * edge * edge);
            }
        }
    }
}

/// Guilloche engine-turned texture: a dense grid of tiny clipped circles
/// whose opacity follows angle and time. Kept available but not part of the
/// default compositing order; enabling it changes the dial's baseline look.
pub fn draw_guilloche(canvas: &mut Canvas, ctx: &FrameContext) {
    let spacing = 0.055 * ctx.radius;
    let cell_r = 0.034 * ctx.radius;
    let extent = (0.62 * ctx.radius / spacing) as i32;
    for gy in -extent..=extent {
        for gx in -extent..=extent {
            let px = ctx.cx + gx as f64 * spacing;
            let py = ctx.cy + gy as f64 * spacing;
            let dist = (px - ctx.cx).hypot(py - ctx.cy);
            if dist > 0.60 * ctx.radius {
                continue;
            }
            let angle = (py - ctx.cy).atan2(px - ctx.cx);
            let wave = (angle * 6.0 + dist / ctx.radius * 14.0 + ctx.wall_seconds * 0.25).sin();
            let alpha = (0.05 + 0.04 * wave as f32).max(0.0);
            if alpha > 0.005 {
                stroke_ring(canvas, px, py, cell_r, 1.0, Color::new(120, 114, 100), alpha);
            }
        }
    }
}

// ============================================================================
// COMPOSITOR
// ============================================================================

/// Draws one complete frame in the mandatory layer order. A canvas that
/// cannot host a font (corrupt embedded data) renders nothing at all rather
/// than a partial face.
pub fn render_watch(
    canvas: &mut Canvas,
    ctx: &FrameContext,
    cfg: &WatchConfig,
    assets: &FrameAssets,
) {
    let Some(font) = Font::try_from_bytes(cfg.font_data) else {
        return;
    };

    canvas.clear(Color::new(8, 8, 10));
    draw_dial_background(canvas, ctx);
    draw_minute_track(canvas, ctx);
    draw_hour_batons(canvas, ctx);
    draw_roman_numerals(canvas, ctx, &font);
    draw_brand_text(canvas, ctx, cfg, &font);
    draw_arc_labels(canvas, ctx, cfg, &font);
    draw_moon_subdial(canvas, ctx, cfg, assets.moon);
    draw_sidereal_subdial(canvas, ctx, cfg, &font);
    draw_date_window(canvas, ctx, cfg, &font);
    draw_swiss_marking(canvas, ctx, &font);
    draw_hands(canvas, ctx);
    draw_center_pin(canvas, ctx);
    draw_case_overlay(canvas, assets.case);
    draw_crystal(canvas, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::clock_angles;
    use chrono::NaiveTime;

    fn test_context() -> FrameContext {
        let t = NaiveTime::from_hms_nano_opt(10, 9, 30, 250_000_000).unwrap();
        FrameContext {
            cx: 100.0,
            cy: 100.0,
            radius: 84.0,
            angles: clock_angles(&t, 2),
            moon_age: 3.2,
            moon_phase: 1,
            sidereal: 1.234,
            day_of_month: 19,
            wall_seconds: 36_570.25,
        }
    }

    fn render_to_buf(ctx: &FrameContext, assets: &FrameAssets) -> Vec<u8> {
        let cfg = WatchConfig::builder().build();
        let mut buf = vec![0u8; 200 * 200 * 4];
        let mut canvas = Canvas::new(&mut buf, 200, 200);
        render_watch(&mut canvas, ctx, &cfg, assets);
        buf
    }

    #[test]
    fn identical_contexts_render_identical_frames() {
        let ctx = test_context();
        let assets = FrameAssets {
            moon: None,
            case: None,
        };
        let a = render_to_buf(&ctx, &assets);
        let b = render_to_buf(&ctx, &assets);
        assert_eq!(a, b);
    }

    #[test]
    fn moon_image_changes_the_frame_but_missing_image_still_renders() {
        let ctx = test_context();
        let moon = RgbaImage::from_pixel(16, 16, image::Rgba([255, 0, 0, 255]));
        let with = render_to_buf(
            &ctx,
            &FrameAssets {
                moon: Some(&moon),
                case: None,
            },
        );
        let without = render_to_buf(
            &ctx,
            &FrameAssets {
                moon: None,
                case: None,
            },
        );
        assert_ne!(with, without);
    }

    #[test]
    fn sparkle_is_one_sided() {
        // sin(0) = 0 is far below the threshold
        assert_eq!(sparkle(0.0, 0), 0.0);
        // peak of the sine maps to full intensity
        let peak_t = std::f64::consts::FRAC_PI_2 / 0.9;
        assert!((sparkle(peak_t, 0) - 1.0).abs() < 1e-3);
        // per-index phases differ
        assert_ne!(sparkle(peak_t, 0), sparkle(peak_t, 1));
    }

    #[test]
    fn guilloche_marks_the_dial_when_invoked() {
        let ctx = test_context();
        let mut buf = vec![0u8; 200 * 200 * 4];
        let mut canvas = Canvas::new(&mut buf, 200, 200);
        canvas.clear(Color::new(0, 0, 0));
        draw_guilloche(&mut canvas, &ctx);
        assert!(buf.chunks_exact(4).any(|p| p[0] > 0));
    }

    #[test]
    fn capture_derives_geometry_from_the_surface() {
        let now = Local::now();
        let ctx = FrameContext::capture(now, 0, 600, 600, 16.0);
        assert_eq!(ctx.cx, 300.0);
        assert_eq!(ctx.cy, 300.0);
        assert_eq!(ctx.radius, 284.0);
        assert!(ctx.moon_phase < 8);
        assert!((0.0..TAU).contains(&ctx.sidereal));
    }

    #[test]
    fn date_window_accepts_every_day_of_month() {
        let mut ctx = test_context();
        let cfg = WatchConfig::builder().build();
        for day in [1, 9, 19, 28, 31] {
            ctx.day_of_month = day;
            let mut buf = vec![0u8; 200 * 200 * 4];
            let mut canvas = Canvas::new(&mut buf, 200, 200);
            render_watch(
                &mut canvas,
                &ctx,
                &cfg,
                &FrameAssets {
                    moon: None,
                    case: None,
                },
            );
        }
    }
}
