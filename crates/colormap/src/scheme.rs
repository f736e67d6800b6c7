//! Color ramps and multi-stop interpolation.

use serde::{Deserialize, Serialize};

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form used by web map palettes.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    /// Brown -> Yellow -> Green (vegetation)
    Ndvi,
    /// White -> Cyan -> Blue (water)
    Water,
    /// Blue-gray -> Sand -> Rust (clay and iron oxide ratios)
    Mineral,
    /// Blue -> White -> Red (signed data)
    Divergent,
    /// Black -> White
    Grayscale,
    /// Discrete palette for class labels
    Classes,
}

impl ColorScheme {
    pub const ALL: &[ColorScheme] = &[
        Self::Ndvi,
        Self::Water,
        Self::Mineral,
        Self::Divergent,
        Self::Grayscale,
        Self::Classes,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ndvi => "NDVI",
            Self::Water => "Water",
            Self::Mineral => "Mineral",
            Self::Divergent => "Divergent",
            Self::Grayscale => "Grayscale",
            Self::Classes => "Classes",
        }
    }

    /// Whether the ramp is a set of discrete colors rather than a gradient.
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Classes)
    }
}

const NDVI_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 120, 70, 20),
    ColorStop::new(0.3, 200, 170, 60),
    ColorStop::new(0.5, 240, 230, 100),
    ColorStop::new(0.7, 100, 180, 50),
    ColorStop::new(1.0, 10, 100, 20),
];

const WATER_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 240, 249, 255),
    ColorStop::new(0.25, 186, 228, 250),
    ColorStop::new(0.50, 80, 180, 230),
    ColorStop::new(0.75, 30, 120, 200),
    ColorStop::new(1.00, 8, 48, 107),
];

const MINERAL_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 70, 90, 120),
    ColorStop::new(0.35, 190, 180, 150),
    ColorStop::new(0.65, 225, 170, 90),
    ColorStop::new(1.00, 160, 50, 20),
];

const DIVERGENT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 33, 102, 172),
    ColorStop::new(0.25, 103, 169, 207),
    ColorStop::new(0.50, 247, 247, 247),
    ColorStop::new(0.75, 239, 138, 98),
    ColorStop::new(1.00, 178, 24, 43),
];

/// Palette for class labels; label `n` uses entry `n % len`.
///
/// Entry 0 is the unclassified gray.
pub const CLASS_PALETTE: &[Rgb] = &[
    Rgb::new(200, 200, 200),
    Rgb::new(31, 120, 180),
    Rgb::new(51, 160, 44),
    Rgb::new(227, 26, 28),
    Rgb::new(255, 127, 0),
    Rgb::new(106, 61, 154),
    Rgb::new(177, 89, 40),
    Rgb::new(251, 154, 153),
    Rgb::new(166, 206, 227),
    Rgb::new(178, 223, 138),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let (first, last) = (stops[0], stops[stops.len() - 1]);
    if t <= first.t {
        return first.color;
    }
    for pair in stops.windows(2) {
        if t <= pair[1].t {
            let ratio = (t - pair[0].t) / (pair[1].t - pair[0].t);
            return lerp_color(pair[0].color, pair[1].color, ratio);
        }
    }
    last.color
}

/// Color of a class label.
pub fn class_color(label: i32) -> Rgb {
    CLASS_PALETTE[label.rem_euclid(CLASS_PALETTE.len() as i32) as usize]
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Gradients interpolate between their stops and clamp outside [0, 1].
/// `Classes` maps `t` onto one of the palette entries.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Ndvi => multi_stop(NDVI_STOPS, t),
        ColorScheme::Water => multi_stop(WATER_STOPS, t),
        ColorScheme::Mineral => multi_stop(MINERAL_STOPS, t),
        ColorScheme::Divergent => multi_stop(DIVERGENT_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
        ColorScheme::Classes => {
            let n = CLASS_PALETTE.len();
            let idx = (t.clamp(0.0, 1.0) * n as f64).floor().min((n - 1) as f64) as usize;
            CLASS_PALETTE[idx]
        }
    }
}
