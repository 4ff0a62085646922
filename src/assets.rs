//! Asset provider: the eight moon-phase images plus the decorative case
//! overlay.
//!
//! Moon images are decoded on a background thread and published to the draw
//! loop over an mpsc channel, so the first frames render (with the flat-fill
//! moon fallback) before decoding finishes. A missing or broken image only
//! degrades its own slot. The case overlay is synthesized in-process and is
//! available from the first frame.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};

/// Canonical moon-phase slot names, index 0..=7. Slot `i` resolves to
/// `<dir>/<name>.png`.
pub const MOON_PHASE_NAMES: [&str; 8] = [
    "New_Moon",
    "Waxing_Crescent",
    "First_Quarter",
    "Waxing_Gibbous",
    "Full_Moon",
    "Waning_Gibbous",
    "Last_Quarter",
    "Waning_Crescent",
];

type MoonSet = [Option<RgbaImage>; 8];

/// Owns the asset table consumed by the renderer.
///
/// `poll` must be called once per frame until `is_ready` flips; after that
/// the table is immutable for the life of the loader.
pub struct AssetLoader {
    case: RgbaImage,
    rx: Receiver<MoonSet>,
    moons: Option<MoonSet>,
}

impl AssetLoader {
    /// Starts decoding the moon images from `dir` on a background thread
    /// and synthesizes the case overlay immediately.
    pub fn spawn(dir: PathBuf, case_size: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let set = load_moon_set(&dir);
            // the receiver may already be gone on shutdown
            let _ = tx.send(set);
        });
        Self {
            case: case_overlay(case_size),
            rx,
            moons: None,
        }
    }

    /// Drains the loader channel; cheap to call every frame.
    pub fn poll(&mut self) {
        if self.moons.is_none() {
            if let Ok(set) = self.rx.try_recv() {
                let loaded = set.iter().filter(|s| s.is_some()).count();
                info!(loaded, "moon phase images ready");
                self.moons = Some(set);
            }
        }
    }

    /// True once the background load has finished, even if some slots failed.
    pub fn is_ready(&self) -> bool {
        self.moons.is_some()
    }

    /// The phase image for slot `index`, if loaded and decoded.
    pub fn moon(&self, index: usize) -> Option<&RgbaImage> {
        self.moons.as_ref()?.get(index)?.as_ref()
    }

    /// The decorative case overlay; always present.
    pub fn case(&self) -> &RgbaImage {
        &self.case
    }
}

fn load_moon_set(dir: &Path) -> MoonSet {
    let mut set: MoonSet = std::array::from_fn(|_| None);
    for (slot, name) in MOON_PHASE_NAMES.into_iter().enumerate() {
        let path = dir.join(format!("{name}.png"));
        match image::open(&path) {
            Ok(img) => {
                debug!(phase = name, "decoded moon phase image");
                set[slot] = Some(img.to_rgba8());
            }
            Err(err) => {
                warn!(phase = name, path = %path.display(), %err, "moon phase image unavailable");
            }
        }
    }
    set
}

/// Builds the brushed-metal bezel that frames the dial. The interior is
/// fully transparent so the dial and hands show through; the annulus gets a
/// radial sheen plus a faint angular striation.
pub fn case_overlay(size: u32) -> RgbaImage {
    let center = size as f64 / 2.0;
    let r_outer = center;
    let r_inner = size as f64 * 0.455;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f64 + 0.5 - center;
        let dy = y as f64 + 0.5 - center;
        let dist = dx.hypot(dy);
        if dist < r_inner - 0.5 || dist > r_outer + 0.5 {
            return Rgba([0, 0, 0, 0]);
        }
        // position across the bezel, 0 at the dial edge, 1 at the rim
        let t = ((dist - r_inner) / (r_outer - r_inner)).clamp(0.0, 1.0);
        let sheen = (1.0 - (t - 0.35).abs() * 2.2).clamp(0.0, 1.0);
        let striation = (dy.atan2(dx) * 90.0).sin() * 6.0;
        let base = 120.0 + sheen * 110.0 + striation;
        let shade = (base * (1.0 - t * 0.45)).clamp(0.0, 255.0) as u8;
        let aa_in = ((dist - (r_inner - 0.5)).clamp(0.0, 1.0) * 255.0) as u8;
        let aa_out = (((r_outer + 0.5) - dist).clamp(0.0, 1.0) * 255.0) as u8;
        Rgba([shade, shade, shade.saturating_add(6), aa_in.min(aa_out)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn phase_names_follow_canonical_order() {
        assert_eq!(MOON_PHASE_NAMES.len(), 8);
        assert_eq!(MOON_PHASE_NAMES[0], "New_Moon");
        assert_eq!(MOON_PHASE_NAMES[4], "Full_Moon");
        assert_eq!(MOON_PHASE_NAMES[7], "Waning_Crescent");
    }

    #[test]
    fn case_overlay_is_transparent_in_the_middle_and_opaque_on_the_bezel() {
        let img = case_overlay(128);
        assert_eq!(img.dimensions(), (128, 128));
        assert_eq!(img.get_pixel(64, 64).0[3], 0, "dial area is see-through");
        // mid-bezel sample along +x
        let bezel_x = (64.0 + 128.0 * 0.48) as u32;
        assert_eq!(img.get_pixel(bezel_x.min(127), 64).0[3], 255);
        assert_eq!(img.get_pixel(0, 0).0[3], 0, "corners are see-through");
    }

    #[test]
    fn loader_becomes_ready_with_empty_slots_when_directory_is_missing() {
        let mut loader = AssetLoader::spawn(PathBuf::from("/nonexistent/moons"), 64);
        assert!(loader.case().width() == 64);
        for _ in 0..200 {
            loader.poll();
            if loader.is_ready() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(loader.is_ready());
        for slot in 0..8 {
            assert!(loader.moon(slot).is_none());
        }
        assert!(loader.moon(99).is_none());
    }
}
