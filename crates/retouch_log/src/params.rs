//! Parameter records carried by actions and by the live edit state.
//!
//! Every type here is plain data with value semantics; `Clone` is a deep
//! copy.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default erase brush size, as a fraction of the image height
pub const DEFAULT_BRUSH_SIZE: f32 = 0.1;
/// Default repair brush size
pub const DEFAULT_REPAIR_BRUSH_SIZE: f32 = DEFAULT_BRUSH_SIZE / 2.0;
/// Default hardness-mode feather
pub const DEFAULT_FEATHER: f32 = 1.0;
/// Default feather-mode feather size
pub const DEFAULT_FEATHER_SIZE: f32 = 0.015;
/// Default patch-brush hardness
pub const DEFAULT_PATCH_FEATHER: f32 = 10.0;

/// One of the two layer slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// Slot A, the front layer by default
    A,
    /// Slot B
    B,
}

impl Slot {
    /// The other slot
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Input/output levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    /// Input black point
    pub black: f32,
    /// Midtone gamma
    pub mid: f32,
    /// Input white point
    pub white: f32,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            black: 0.0,
            mid: 1.0,
            white: 255.0,
        }
    }
}

/// Per-channel colour balance offsets
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorBalance {
    /// Red offset
    pub r: f32,
    /// Green offset
    pub g: f32,
    /// Blue offset
    pub b: f32,
}

/// Hue and luminance bands for selective colour tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    /// Red hues
    Red,
    /// Orange hues
    Orange,
    /// Yellow hues
    Yellow,
    /// Green hues
    Green,
    /// Aqua hues
    Aqua,
    /// Blue hues
    Blue,
    /// Purple hues
    Purple,
    /// Magenta hues
    Magenta,
    /// Bright pixels
    Lights,
    /// Midtone pixels
    Mids,
    /// Dark pixels
    Darks,
}

impl ColorBand {
    /// All bands in canonical order
    pub const ALL: [ColorBand; 11] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Aqua,
        Self::Blue,
        Self::Purple,
        Self::Magenta,
        Self::Lights,
        Self::Mids,
        Self::Darks,
    ];
}

/// Tuning offsets for one colour band
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandTuning {
    /// Hue shift
    pub hue: f32,
    /// Saturation offset
    pub saturation: f32,
    /// Vibrance offset
    pub vibrance: f32,
    /// Luminance offset
    pub luminance: f32,
    /// Shadow lift
    pub shadows: f32,
    /// Highlight recovery
    pub highlights: f32,
}

impl BandTuning {
    /// True if this band changes nothing
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

/// The full set of colour adjustment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustments {
    /// Global gamma
    pub gamma: f32,
    /// Input/output levels
    pub levels: Levels,
    /// Shadow lift
    pub shadows: f32,
    /// Highlight recovery
    pub highlights: f32,
    /// Global saturation
    pub saturation: f32,
    /// Global vibrance
    pub vibrance: f32,
    /// White balance shift
    pub wb: f32,
    /// Per-channel balance
    pub color_bal: ColorBalance,
    /// Selective tuning per colour band
    pub color_tuning: IndexMap<ColorBand, BandTuning>,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            levels: Levels::default(),
            shadows: 0.0,
            highlights: 0.0,
            saturation: 0.0,
            vibrance: 0.0,
            wb: 0.0,
            color_bal: ColorBalance::default(),
            color_tuning: ColorBand::ALL
                .iter()
                .map(|band| (*band, BandTuning::default()))
                .collect(),
        }
    }
}

impl Adjustments {
    /// True if no adjustment is active
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Replace one band's tuning, inserting the band if missing
    pub fn set_band(&mut self, band: ColorBand, tuning: BandTuning) {
        self.color_tuning.insert(band, tuning);
    }
}

/// Brush tool mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// Erase brush
    Erase,
    /// Repair brush
    Repair,
    /// Patch brush
    Patch,
}

/// Persistent settings for one brush mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushParams {
    /// Diameter, proportional to image height
    pub brush_size: f32,
    /// Hardness (0..=20) outside feather mode
    pub feather: f32,
    /// Feather radius in feather mode, proportional
    pub feather_size: f32,
}

/// Brush settings for every mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Erase brush settings
    pub erase: BrushParams,
    /// Repair brush settings
    pub repair: BrushParams,
    /// Patch brush settings
    pub patch: BrushParams,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            erase: BrushParams {
                brush_size: DEFAULT_BRUSH_SIZE,
                feather: DEFAULT_FEATHER,
                feather_size: DEFAULT_FEATHER_SIZE,
            },
            repair: BrushParams {
                brush_size: DEFAULT_REPAIR_BRUSH_SIZE,
                feather: DEFAULT_FEATHER,
                feather_size: DEFAULT_FEATHER_SIZE,
            },
            patch: BrushParams {
                brush_size: DEFAULT_REPAIR_BRUSH_SIZE,
                feather: DEFAULT_PATCH_FEATHER,
                feather_size: DEFAULT_FEATHER_SIZE,
            },
        }
    }
}

impl BrushSettings {
    /// Settings for `mode`
    #[must_use]
    pub const fn for_mode(&self, mode: BrushMode) -> &BrushParams {
        match mode {
            BrushMode::Erase => &self.erase,
            BrushMode::Repair => &self.repair,
            BrushMode::Patch => &self.patch,
        }
    }
}

/// Brush settings captured with a single stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushStroke {
    /// Diameter, proportional to image height
    pub size: f32,
    /// Feather radius (feather mode, proportional) or hardness (0..=20)
    pub feather: f32,
    /// Selects how `feather` is interpreted
    #[serde(default)]
    pub feather_mode: bool,
    /// Erasing raises mask coverage; repairing lowers it
    #[serde(default = "default_erasing")]
    pub erasing: bool,
}

fn default_erasing() -> bool {
    true
}
