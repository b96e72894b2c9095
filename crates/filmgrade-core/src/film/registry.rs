//! Static film stock registry.
//!
//! One immutable [`FilmProfile`] per [`FilmType`]. Profiles carry the
//! stock's colour character (shadow/highlight shifts, contrast and
//! saturation multipliers, optional 3×3 dye-crosstalk matrix), grain
//! defaults, and optional recipe overrides that are merged into
//! `GradingParams` when the stock is selected.

use glam::Mat3;

use crate::grading::curves::CurvePoint;

/// Film stock selector. `None` disables film emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilmType {
    #[default]
    None,
    // Kodak colour negative
    AmberGold,
    Portrait160,
    Portrait400,
    Portrait800,
    Vivid100,
    Max400,
    BudgetColor,
    // Kodak slide
    VintageChrome,
    Chrome100,
    // Fujifilm colour negative
    Verdant400,
    FPortrait400,
    FC200,
    // Fujifilm slide
    Natural100,
    Vivid50,
    Soft100,
    // Cinema
    Motion800T,
    Motion50D,
    // Black and white
    MonoClassic400,
    MonoClassicTx,
    MonoGrain3200,
    MonoFine100,
    MonoFineAc,
    MonoFinePf,
    // Print and specialty
    Cinema2383,
    LomochromePurple,
    RealaAce,
}

impl FilmType {
    /// Every stock except `None`, in registry order.
    pub const ALL: [FilmType; 26] = [
        Self::AmberGold,
        Self::Portrait160,
        Self::Portrait400,
        Self::Portrait800,
        Self::Vivid100,
        Self::Max400,
        Self::BudgetColor,
        Self::VintageChrome,
        Self::Chrome100,
        Self::Verdant400,
        Self::FPortrait400,
        Self::FC200,
        Self::Natural100,
        Self::Vivid50,
        Self::Soft100,
        Self::Motion800T,
        Self::Motion50D,
        Self::MonoClassic400,
        Self::MonoClassicTx,
        Self::MonoGrain3200,
        Self::MonoFine100,
        Self::MonoFineAc,
        Self::MonoFinePf,
        Self::Cinema2383,
        Self::LomochromePurple,
        Self::RealaAce,
    ];

    /// Stable string id used in saved parameters.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AmberGold => "amber-gold",
            Self::Portrait160 => "portrait-160",
            Self::Portrait400 => "portrait-400",
            Self::Portrait800 => "portrait-800",
            Self::Vivid100 => "vivid-100",
            Self::Max400 => "max-400",
            Self::BudgetColor => "budget-color",
            Self::VintageChrome => "vintage-chrome",
            Self::Chrome100 => "chrome-100",
            Self::Verdant400 => "verdant-400",
            Self::FPortrait400 => "f-portrait-400",
            Self::FC200 => "f-c200",
            Self::Natural100 => "natural-100",
            Self::Vivid50 => "vivid-50",
            Self::Soft100 => "soft-100",
            Self::Motion800T => "motion-800t",
            Self::Motion50D => "motion-50d",
            Self::MonoClassic400 => "mono-classic-400",
            Self::MonoClassicTx => "mono-classic-tx",
            Self::MonoGrain3200 => "mono-grain-3200",
            Self::MonoFine100 => "mono-fine-100",
            Self::MonoFineAc => "mono-fine-ac",
            Self::MonoFinePf => "mono-fine-pf",
            Self::Cinema2383 => "cinema-2383",
            Self::LomochromePurple => "lomochrome-purple",
            Self::RealaAce => "reala-ace",
        }
    }

    /// Parse an id. Legacy ids from older presets are accepted as aliases.
    pub fn from_id(id: &str) -> Option<Self> {
        let legacy = match id {
            "kodak-gold" => Some(Self::AmberGold),
            "portra-160" => Some(Self::Portrait160),
            "portra-400" => Some(Self::Portrait400),
            "portra-800" => Some(Self::Portrait800),
            "ektar" => Some(Self::Vivid100),
            "ultramax" => Some(Self::Max400),
            "colorplus" => Some(Self::BudgetColor),
            "kodachrome" => Some(Self::VintageChrome),
            "ektachrome" => Some(Self::Chrome100),
            "superia" => Some(Self::Verdant400),
            "fuji-400h" => Some(Self::FPortrait400),
            "fuji-c200" => Some(Self::FC200),
            "provia" => Some(Self::Natural100),
            "velvia" => Some(Self::Vivid50),
            "astia" => Some(Self::Soft100),
            "cinestill-800t" => Some(Self::Motion800T),
            "cinestill-50d" => Some(Self::Motion50D),
            "hp5" => Some(Self::MonoClassic400),
            "trix" => Some(Self::MonoClassicTx),
            "delta" => Some(Self::MonoGrain3200),
            "tmax" => Some(Self::MonoFine100),
            "acros" => Some(Self::MonoFineAc),
            "pan-f" => Some(Self::MonoFinePf),
            "kodak-2383" => Some(Self::Cinema2383),
            _ => None,
        };
        legacy.or_else(|| {
            std::iter::once(Self::None)
                .chain(Self::ALL)
                .find(|f| f.id() == id)
        })
    }

    /// Registry entry, `None` for [`FilmType::None`].
    pub fn profile(&self) -> Option<&'static FilmProfile> {
        let index = Self::ALL.iter().position(|f| f == self)?;
        REGISTRY.get(index)
    }

    /// Display name, "None" when emulation is off.
    pub fn label(&self) -> &'static str {
        self.profile().map_or("None", |p| p.name)
    }
}

lenient_string_enum!(FilmType, FilmType::None, "film type");

/// Colour family of a stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmCategory {
    ColorNegative,
    Slide,
    Cinema,
    BlackAndWhite,
}

/// Parameter values forced when a stock is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilmOverrides {
    /// Master tone curve replacing the `rgb` curve.
    pub curve: Option<&'static [CurvePoint]>,
    pub shadow_lift: Option<[f32; 3]>,
    pub midtone_gamma: Option<[f32; 3]>,
    pub highlight_gain: Option<[f32; 3]>,
    pub saturation: Option<f32>,
    pub contrast: Option<f32>,
    pub halation: Option<f32>,
    pub halation_color: Option<&'static str>,
    pub halation_threshold: Option<f32>,
    pub halation_radius: Option<f32>,
}

impl FilmOverrides {
    const NONE: Self = Self {
        curve: None,
        shadow_lift: None,
        midtone_gamma: None,
        highlight_gain: None,
        saturation: None,
        contrast: None,
        halation: None,
        halation_color: None,
        halation_threshold: None,
        halation_radius: None,
    };
}

/// Static description of one film stock.
#[derive(Debug, Clone, Copy)]
pub struct FilmProfile {
    pub film: FilmType,
    pub name: &'static str,
    pub category: FilmCategory,
    /// Additive RGB shift weighted toward shadows.
    pub shadow_shift: [f32; 3],
    /// Additive RGB shift weighted toward highlights.
    pub highlight_shift: [f32; 3],
    /// Contrast multiplier, 1.0 = neutral.
    pub contrast: f32,
    /// Saturation multiplier, 1.0 = neutral.
    pub saturation: f32,
    pub warmth: f32,
    /// Grain strength on the stock's native scale (0.05 is heavy).
    pub grain_amount: f32,
    /// Relative grain size, 1.0 = full slider.
    pub grain_size: f32,
    pub acutance: Option<f32>,
    pub black_and_white: bool,
    /// Row-major 3×3 dye-crosstalk matrix.
    pub color_matrix: Option<[f32; 9]>,
    pub overrides: FilmOverrides,
}

/// Native grain amount to slider percent: 0.05 maps to 50.
pub(crate) const GRAIN_AMOUNT_SCALE: f32 = 1000.0;

impl FilmProfile {
    /// Grain amount on the 0–100 slider scale.
    pub fn grain_amount_percent(&self) -> f32 {
        (self.grain_amount * GRAIN_AMOUNT_SCALE).clamp(0.0, 100.0)
    }

    /// Grain size on the 0–100 slider scale.
    pub fn grain_size_percent(&self) -> f32 {
        (self.grain_size * 100.0).clamp(0.0, 100.0)
    }

    /// The crosstalk matrix as a `glam` matrix (rows as authored).
    pub fn matrix(&self) -> Option<Mat3> {
        self.color_matrix
            .map(|m| Mat3::from_cols_array(&m).transpose())
    }
}

const MAT_WARM: [f32; 9] = [1.05, -0.05, 0.0, 0.0, 1.02, -0.02, -0.05, 0.05, 1.0];
const MAT_PORTRAIT: [f32; 9] = [1.02, -0.01, -0.01, 0.01, 1.01, -0.02, -0.01, 0.01, 1.0];
const MAT_FUJI: [f32; 9] = [0.95, 0.05, 0.0, 0.0, 1.02, -0.02, 0.0, 0.05, 1.05];

/// Gentle print-film S-curve for the 2383 recipe.
const PRINT_CURVE: [CurvePoint; 5] = [
    CurvePoint::new(0.0, 0.0),
    CurvePoint::new(48.0, 36.0),
    CurvePoint::new(128.0, 128.0),
    CurvePoint::new(208.0, 220.0),
    CurvePoint::new(255.0, 250.0),
];

const fn stock(
    film: FilmType,
    name: &'static str,
    category: FilmCategory,
    shadow_shift: [f32; 3],
    highlight_shift: [f32; 3],
    contrast: f32,
    saturation: f32,
    warmth: f32,
    grain: (f32, f32),
) -> FilmProfile {
    FilmProfile {
        film,
        name,
        category,
        shadow_shift,
        highlight_shift,
        contrast,
        saturation,
        warmth,
        grain_amount: grain.0,
        grain_size: grain.1,
        acutance: None,
        black_and_white: false,
        color_matrix: None,
        overrides: FilmOverrides::NONE,
    }
}

const fn mono(film: FilmType, name: &'static str, contrast: f32, grain: (f32, f32)) -> FilmProfile {
    let mut p = stock(
        film,
        name,
        FilmCategory::BlackAndWhite,
        [0.0; 3],
        [0.0; 3],
        contrast,
        0.0,
        0.0,
        grain,
    );
    p.black_and_white = true;
    p
}

const fn with_matrix(mut p: FilmProfile, m: [f32; 9]) -> FilmProfile {
    p.color_matrix = Some(m);
    p
}

const fn with_acutance(mut p: FilmProfile, a: f32) -> FilmProfile {
    p.acutance = Some(a);
    p
}

const fn with_overrides(mut p: FilmProfile, o: FilmOverrides) -> FilmProfile {
    p.overrides = o;
    p
}

use FilmCategory::{Cinema, ColorNegative, Slide};

/// Indexed in [`FilmType::ALL`] order.
static REGISTRY: [FilmProfile; 26] = [
    with_matrix(
        with_acutance(
            stock(FilmType::AmberGold, "Kodak Gold 200", ColorNegative, [0.04, 0.02, -0.01], [0.06, 0.03, -0.03], 1.12, 1.25, 0.18, (0.025, 0.8)),
            0.1,
        ),
        MAT_WARM,
    ),
    stock(FilmType::Portrait160, "Kodak Portra 160", ColorNegative, [0.01, 0.015, 0.01], [0.02, 0.01, -0.01], 0.92, 0.85, 0.03, (0.01, 0.6)),
    with_matrix(
        stock(FilmType::Portrait400, "Kodak Portra 400", ColorNegative, [0.015, 0.02, 0.01], [0.025, 0.015, -0.01], 0.95, 0.88, 0.05, (0.018, 0.9)),
        MAT_PORTRAIT,
    ),
    stock(FilmType::Portrait800, "Kodak Portra 800", ColorNegative, [0.02, 0.025, 0.015], [0.03, 0.02, 0.0], 0.98, 0.9, 0.08, (0.035, 1.1)),
    stock(FilmType::Vivid100, "Kodak Ektar 100", ColorNegative, [-0.01, 0.0, 0.02], [0.03, 0.01, -0.02], 1.18, 1.35, 0.02, (0.008, 0.4)),
    stock(FilmType::Max400, "Kodak Ultramax 400", ColorNegative, [0.03, 0.02, -0.02], [0.05, 0.02, -0.03], 1.1, 1.2, 0.12, (0.028, 0.85)),
    stock(FilmType::BudgetColor, "Kodak ColorPlus 200", ColorNegative, [0.03, 0.015, -0.015], [0.04, 0.02, -0.02], 1.08, 1.15, 0.1, (0.022, 0.75)),
    stock(FilmType::VintageChrome, "Kodachrome 64", Slide, [0.02, 0.0, -0.02], [0.04, 0.01, -0.03], 1.25, 1.4, 0.15, (0.012, 0.5)),
    stock(FilmType::Chrome100, "Ektachrome E100", Slide, [0.0, 0.01, 0.02], [0.01, 0.0, 0.01], 1.15, 1.2, -0.05, (0.01, 0.45)),
    stock(FilmType::Verdant400, "Fujifilm Superia 400", ColorNegative, [-0.02, 0.035, 0.01], [0.0, 0.025, -0.01], 1.08, 1.12, -0.05, (0.025, 0.85)),
    with_matrix(
        stock(FilmType::FPortrait400, "Fujifilm Pro 400H", ColorNegative, [-0.01, 0.02, 0.02], [0.01, 0.015, 0.01], 0.9, 0.82, -0.02, (0.015, 0.8)),
        MAT_FUJI,
    ),
    stock(FilmType::FC200, "Fujifilm C200", ColorNegative, [-0.01, 0.025, 0.0], [0.01, 0.02, -0.01], 1.05, 1.1, -0.03, (0.02, 0.7)),
    stock(FilmType::Natural100, "Fujifilm Provia 100F", Slide, [0.0, 0.005, 0.01], [0.01, 0.005, 0.005], 1.08, 1.15, 0.0, (0.008, 0.5)),
    with_acutance(
        stock(FilmType::Vivid50, "Fujifilm Velvia 50", Slide, [0.01, 0.0, 0.03], [0.03, 0.01, 0.02], 1.25, 1.6, 0.02, (0.006, 0.4)),
        0.3,
    ),
    stock(FilmType::Soft100, "Fujifilm Astia 100F", Slide, [0.005, 0.01, 0.01], [0.015, 0.01, 0.005], 1.02, 1.0, 0.02, (0.007, 0.45)),
    with_overrides(
        with_matrix(
            stock(FilmType::Motion800T, "CineStill 800T", Cinema, [-0.03, 0.01, 0.05], [0.0, 0.0, 0.03], 1.05, 1.1, -0.15, (0.04, 1.0)),
            [1.0, 0.0, 0.0, 0.0, 0.95, 0.05, 0.0, 0.05, 1.15],
        ),
        FilmOverrides {
            halation: Some(35.0),
            halation_color: Some("#FF3300"),
            halation_threshold: Some(60.0),
            ..FilmOverrides::NONE
        },
    ),
    stock(FilmType::Motion50D, "CineStill 50D", Cinema, [-0.01, 0.005, 0.02], [0.02, 0.01, 0.01], 1.12, 1.2, 0.0, (0.01, 0.5)),
    mono(FilmType::MonoClassic400, "Ilford HP5 Plus 400", 1.2, (0.035, 0.85)),
    mono(FilmType::MonoClassicTx, "Kodak Tri-X 400", 1.18, (0.03, 0.9)),
    mono(FilmType::MonoGrain3200, "Ilford Delta 3200", 1.28, (0.055, 1.3)),
    with_acutance(mono(FilmType::MonoFine100, "Kodak T-Max 100", 1.15, (0.012, 0.5)), 0.4),
    mono(FilmType::MonoFineAc, "Fujifilm Acros 100", 1.1, (0.01, 0.45)),
    mono(FilmType::MonoFinePf, "Ilford Pan F Plus 50", 1.22, (0.006, 0.35)),
    with_overrides(
        with_matrix(
            with_acutance(
                stock(FilmType::Cinema2383, "Kodak 2383 Print Film", Cinema, [-0.02, -0.01, 0.02], [0.02, 0.01, -0.01], 1.25, 1.1, 0.05, (0.015, 0.4)),
                0.1,
            ),
            [1.1, -0.05, -0.05, -0.05, 1.1, -0.05, -0.05, -0.05, 1.1],
        ),
        FilmOverrides {
            curve: Some(&PRINT_CURVE),
            ..FilmOverrides::NONE
        },
    ),
    with_matrix(
        with_acutance(
            stock(FilmType::LomochromePurple, "LomoChrome Purple", ColorNegative, [0.05, 0.0, 0.05], [0.0, 0.0, 0.0], 1.1, 1.2, 0.0, (0.03, 0.7)),
            0.1,
        ),
        [1.0, 1.0, 0.0, 0.0, 0.1, 0.0, 0.0, 0.8, 1.0],
    ),
    with_acutance(
        stock(FilmType::RealaAce, "Fujifilm Reala Ace", ColorNegative, [0.0, 0.01, 0.0], [0.0, 0.0, 0.0], 1.05, 1.0, -0.02, (0.01, 0.3)),
        0.3,
    ),
];
