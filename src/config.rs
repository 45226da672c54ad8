//! Scene configuration: instance counts, tree dimensions, palettes, and the
//! forest layout. Defaults mirror the tuned values the scene was designed
//! around; a JSON file can override them without rebuilding.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub type Rgb = [f32; 3];

/// Number of photo files addressed by the `N.jpg` naming convention,
/// in addition to the designated `top.jpg`.
pub const NUMBERED_PHOTOS: usize = 31;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counts {
    pub foliage: usize,
    pub ornaments: usize,
    pub elements: usize,
    pub lights: usize,
    pub gifts_per_tree: usize,
}

impl Default for Counts {
    fn default() -> Self {
        Self {
            foliage: 7000,
            ornaments: 200,
            elements: 150,
            lights: 300,
            gifts_per_tree: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeShape {
    pub height: f32,
    pub base_radius: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: 32.0,
            base_radius: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub emerald: Rgb,
    pub gold: Rgb,
    pub warm_light: Rgb,
    /// Fairy-light emissive colors.
    pub lights: Vec<Rgb>,
    /// Photo-panel border colors.
    pub borders: Vec<Rgb>,
    /// Gift box / decorative solid colors.
    pub gifts: Vec<Rgb>,
    /// Gift ribbon colors.
    pub ribbons: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            emerald: rgb8(0x00, 0x42, 0x25),
            gold: rgb8(0xFF, 0xD7, 0x00),
            warm_light: rgb8(0xFF, 0xD5, 0x4F),
            lights: vec![
                rgb8(0xFF, 0x00, 0x00),
                rgb8(0x00, 0xFF, 0x00),
                rgb8(0x00, 0x00, 0xFF),
                rgb8(0xFF, 0xFF, 0x00),
            ],
            borders: vec![
                rgb8(0xFF, 0xFA, 0xF0),
                rgb8(0xF0, 0xE6, 0x8C),
                rgb8(0xE6, 0xE6, 0xFA),
                rgb8(0xFF, 0xB6, 0xC1),
                rgb8(0x98, 0xFB, 0x98),
                rgb8(0x87, 0xCE, 0xFA),
                rgb8(0xFF, 0xDA, 0xB9),
            ],
            gifts: vec![
                rgb8(0xB7, 0x1C, 0x1C),
                rgb8(0x1A, 0x23, 0x7E),
                rgb8(0x00, 0x4D, 0x40),
                rgb8(0xF5, 0x7F, 0x17),
                rgb8(0x4A, 0x14, 0x8C),
            ],
            ribbons: vec![
                rgb8(0xFF, 0xD7, 0x00),
                rgb8(0xC0, 0xC0, 0xC0),
                rgb8(0xFF, 0xFF, 0xFF),
            ],
        }
    }
}

/// Placement of a single tree within the forest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreePlacement {
    pub offset: [f32; 3],
    pub scale: f32,
    /// Whether this tree hosts the singleton figure. Exactly one placement
    /// must set this.
    pub hosts_figure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub counts: Counts,
    pub tree: TreeShape,
    pub palette: Palette,
    pub forest: Vec<TreePlacement>,
    /// Directory holding `top.jpg` and `1.jpg ..= N.jpg`.
    pub photo_dir: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            counts: Counts::default(),
            tree: TreeShape::default(),
            palette: Palette::default(),
            // Main tree in front, two smaller trees behind.
            forest: vec![
                TreePlacement {
                    offset: [0.0, -10.0, 0.0],
                    scale: 1.0,
                    hosts_figure: true,
                },
                TreePlacement {
                    offset: [-25.0, -10.0, -15.0],
                    scale: 0.7,
                    hosts_figure: false,
                },
                TreePlacement {
                    offset: [25.0, -10.0, -15.0],
                    scale: 0.7,
                    hosts_figure: false,
                },
            ],
            photo_dir: "assets/photos".to_string(),
        }
    }
}

impl SceneConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: SceneConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.tree.height > 0.0, "tree height must be positive");
        anyhow::ensure!(self.tree.base_radius > 0.0, "tree radius must be positive");
        anyhow::ensure!(!self.forest.is_empty(), "forest layout is empty");
        let hosts = self.forest.iter().filter(|t| t.hosts_figure).count();
        anyhow::ensure!(hosts == 1, "exactly one tree must host the figure, got {hosts}");
        // Category constructors pick colors with gen_range; an empty palette
        // would panic at forest construction.
        anyhow::ensure!(!self.palette.lights.is_empty(), "palette.lights is empty");
        anyhow::ensure!(!self.palette.borders.is_empty(), "palette.borders is empty");
        anyhow::ensure!(!self.palette.gifts.is_empty(), "palette.gifts is empty");
        anyhow::ensure!(!self.palette.ribbons.is_empty(), "palette.ribbons is empty");
        Ok(())
    }
}

const fn rgb8_channel(v: u8) -> f32 {
    v as f32 / 255.0
}

pub const fn rgb8(r: u8, g: u8, b: u8) -> Rgb {
    [rgb8_channel(r), rgb8_channel(g), rgb8_channel(b)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_multiple_figure_hosts() {
        let mut cfg = SceneConfig::default();
        cfg.forest[1].hosts_figure = true;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_palette_arrays() {
        let clears: [fn(&mut Palette); 4] = [
            |p| p.lights.clear(),
            |p| p.borders.clear(),
            |p| p.gifts.clear(),
            |p| p.ribbons.clear(),
        ];
        for clear in clears {
            let mut cfg = SceneConfig::default();
            clear(&mut cfg.palette);
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = SceneConfig::default();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: SceneConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.counts.foliage, cfg.counts.foliage);
        assert_eq!(back.forest.len(), cfg.forest.len());
    }
}
