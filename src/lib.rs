//! Photorealistic analog watch face rendered in a desktop window.
//!
//! The library splits into a pure time/astronomy layer ([`astro`]), a
//! software rasterizer ([`raster`]), the per-layer face compositor
//! ([`render`]), an asset provider for the moon-phase images and case art
//! ([`assets`]), and the window/frame loop in this module. Left/right arrow
//! keys nudge the GMT hand by whole hours.

pub mod assets;
pub mod astro;
pub mod error;
pub mod raster;
pub mod render;

pub use assets::{AssetLoader, MOON_PHASE_NAMES};
pub use astro::{clock_angles, moon_age, moon_phase_index, sidereal_angle, ClockAngles};
pub use error::{WatchError, WatchResult};
pub use raster::{Canvas, Color};
pub use render::{render_watch, FrameAssets, FrameContext};

use std::path::PathBuf;
use std::time::Instant;

use bon::Builder;
use chrono::Local;
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, error, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Builder)]
pub struct WatchConfig {
    #[builder(default = "Meridian".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 600)]
    pub window_size: u32,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Dial geometry
    #[builder(default = 16.0)]
    pub dial_margin: f64,
    #[builder(default = 0.45)]
    pub moon_distance_factor: f64,
    #[builder(default = 0.20)]
    pub moon_radius_factor: f64,
    #[builder(default = 0.45)]
    pub sidereal_distance_factor: f64,
    #[builder(default = 0.20)]
    pub sidereal_radius_factor: f64,
    #[builder(default = 0.55)]
    pub date_distance_factor: f64,

    // Dial text
    #[builder(default = "MERIDIAN".to_string())]
    pub brand_name: String,
    #[builder(default = "Genève".to_string())]
    pub brand_line: String,
    #[builder(default = "AUTOMATIC".to_string())]
    pub arc_label_a: String,
    #[builder(default = "SIDEREAL".to_string())]
    pub arc_label_b: String,

    // Assets
    #[builder(default = PathBuf::from("assets/moon"))]
    pub assets_dir: PathBuf,
    #[builder(default = 0)]
    pub initial_gmt_offset: i64,
    #[builder(default = include_bytes!("DejaVuSerif.ttf"))]
    pub font_data: &'static [u8],
}

// ============================================================================
// VIEW MODEL
// ============================================================================

/// Mutable per-instance state read once per frame by the draw loop.
/// The offset is an unbounded whole number of hours; it is reduced modulo
/// 24 only where it meets the clock math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchState {
    pub gmt_offset_hours: i64,
}

impl WatchState {
    pub fn new(gmt_offset_hours: i64) -> Self {
        Self { gmt_offset_hours }
    }

    pub fn increase_gmt_offset(&mut self) {
        self.gmt_offset_hours += 1;
    }

    pub fn decrease_gmt_offset(&mut self) {
        self.gmt_offset_hours -= 1;
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Main watch struct - owns the configuration and view model and drives the
/// window loop.
#[derive(Debug, Clone)]
pub struct Watch {
    config: WatchConfig,
    state: WatchState,
}

impl Watch {
    pub fn new(config: WatchConfig) -> Self {
        let state = WatchState::new(config.initial_gmt_offset);
        Self { config, state }
    }

    /// Opens the window and runs until it is closed. Each redraw samples the
    /// wall clock, recomputes every derived angle and composites the full
    /// layer stack; the loop never waits on asset loading.
    pub fn run(self) -> WatchResult<()> {
        let config = self.config;
        let mut state = self.state;

        let event_loop = EventLoop::new().map_err(|e| WatchError::window(e.to_string()))?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(
                config.window_size as f64,
                config.window_size as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(|e| WatchError::window(e.to_string()))?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)
            .map_err(|e| WatchError::window(e.to_string()))?;

        let mut loader = AssetLoader::spawn(config.assets_dir.clone(), config.window_size);
        info!(title = %config.title, size = config.window_size, "watch face starting");

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / config.max_framerate);
        let mut last_frame = Instant::now();

        event_loop
            .run(move |event, window_target| {
                window_target.set_control_flow(ControlFlow::Poll);
                match event {
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::CloseRequested => {
                            window_target.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            fb_width = new_size.width as usize;
                            fb_height = new_size.height as usize;
                            let _ = pixels.resize_buffer(new_size.width, new_size.height);
                            let _ = pixels.resize_surface(new_size.width, new_size.height);
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed {
                                match event.logical_key {
                                    Key::Named(NamedKey::ArrowRight) => {
                                        state.increase_gmt_offset();
                                        debug!(offset = state.gmt_offset_hours, "gmt offset");
                                    }
                                    Key::Named(NamedKey::ArrowLeft) => {
                                        state.decrease_gmt_offset();
                                        debug!(offset = state.gmt_offset_hours, "gmt offset");
                                    }
                                    _ => {}
                                }
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            loader.poll();
                            let ctx = FrameContext::capture(
                                Local::now(),
                                state.gmt_offset_hours,
                                fb_width,
                                fb_height,
                                config.dial_margin,
                            );
                            let assets = FrameAssets {
                                moon: loader.moon(ctx.moon_phase),
                                case: Some(loader.case()),
                            };
                            let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                            render_watch(&mut canvas, &ctx, &config, &assets);
                            if let Err(err) = pixels.render() {
                                error!(%err, "present failed, dropping frame");
                            }
                        }
                        _ => {}
                    },
                    Event::AboutToWait => {
                        // Limit redraws to the target frame rate
                        let elapsed = last_frame.elapsed();
                        if elapsed < frame_duration {
                            std::thread::sleep(frame_duration - elapsed);
                        }
                        last_frame = Instant::now();
                        window_clone.request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|e| WatchError::window(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmt_offset_follows_key_presses() {
        let mut state = WatchState::new(0);
        state.increase_gmt_offset();
        state.increase_gmt_offset();
        state.decrease_gmt_offset();
        assert_eq!(state.gmt_offset_hours, 1);
    }

    #[test]
    fn gmt_offset_is_unbounded() {
        let mut state = WatchState::new(0);
        for _ in 0..30 {
            state.increase_gmt_offset();
        }
        assert_eq!(state.gmt_offset_hours, 30);
        // wrap happens downstream in the clock math
        let t = chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let wrapped = clock_angles(&t, state.gmt_offset_hours);
        let direct = clock_angles(&t, 6);
        assert!((wrapped.gmt - direct.gmt).abs() < 1e-12);
    }

    #[test]
    fn config_defaults_are_sane() {
        let cfg = WatchConfig::builder().build();
        assert_eq!(cfg.window_size, 600);
        assert!(cfg.max_framerate > 0.0);
        assert!(!cfg.font_data.is_empty());
        assert_eq!(cfg.initial_gmt_offset, 0);
    }

    #[test]
    fn watch_new_seeds_state_from_config() {
        let watch = Watch::new(WatchConfig::builder().initial_gmt_offset(-3).build());
        assert_eq!(watch.state.gmt_offset_hours, -3);
    }
}
