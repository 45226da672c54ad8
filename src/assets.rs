//! Static photo assets. Panels address their photos by a sequential
//! filename convention: one designated `top.jpg` plus `1.jpg ..= N.jpg`.
//! Everything is loaded once at startup and reduced to an average-color
//! tint for the splat renderer; files are never reloaded.

use crate::config::{Rgb, NUMBERED_PHOTOS};
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

pub struct PhotoSet {
    /// One averaged color per photo, `top` first.
    pub tints: Vec<Rgb>,
}

impl PhotoSet {
    /// Load the full photo set from `dir`. A missing or malformed file is a
    /// load-time fatal error; only a missing directory falls back to a
    /// builtin palette so the scene stays runnable without assets.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            log::warn!(
                "photo directory {} not found, using builtin tints",
                dir.display()
            );
            return Ok(Self::builtin());
        }
        let mut tints = Vec::with_capacity(NUMBERED_PHOTOS + 1);
        for path in photo_paths(dir, NUMBERED_PHOTOS) {
            let img = image::open(&path)
                .with_context(|| format!("loading photo {}", path.display()))?
                .to_rgb8();
            tints.push(average_color(&img));
        }
        log::info!("loaded {} photos from {}", tints.len(), dir.display());
        Ok(Self { tints })
    }

    /// Warm paper-like tints used when no photo directory is present.
    pub fn builtin() -> Self {
        let base = [
            [0.86, 0.78, 0.66],
            [0.75, 0.70, 0.62],
            [0.80, 0.72, 0.58],
            [0.70, 0.66, 0.60],
        ];
        let tints = (0..=NUMBERED_PHOTOS)
            .map(|i| base[i % base.len()])
            .collect();
        Self { tints }
    }

    pub fn len(&self) -> usize {
        self.tints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tints.is_empty()
    }
}

/// `top.jpg` followed by the numbered body photos, in order.
pub fn photo_paths(dir: &Path, numbered: usize) -> Vec<PathBuf> {
    let mut paths = vec![dir.join("top.jpg")];
    paths.extend((1..=numbered).map(|i| dir.join(format!("{i}.jpg"))));
    paths
}

fn average_color(img: &RgbImage) -> Rgb {
    let mut sum = [0.0f64; 3];
    let mut n = 0u64;
    // Sample a grid rather than every pixel; tints don't need precision.
    let step = (img.width().max(img.height()) / 64).max(1);
    for y in (0..img.height()).step_by(step as usize) {
        for x in (0..img.width()).step_by(step as usize) {
            let p = img.get_pixel(x, y);
            sum[0] += p[0] as f64;
            sum[1] += p[1] as f64;
            sum[2] += p[2] as f64;
            n += 1;
        }
    }
    if n == 0 {
        return [0.5, 0.5, 0.5];
    }
    [
        (sum[0] / n as f64 / 255.0) as f32,
        (sum[1] / n as f64 / 255.0) as f32,
        (sum[2] / n as f64 / 255.0) as f32,
    ]
}
