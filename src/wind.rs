//! Wind barbs and wind speed units.
use crate::scene::{Scene, Shape, Symbol};
use metfor::{Knots, MetersPSec, Quantity, WindSpdDir};
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};

/// Speed represented by a pennant, knots.
const PENNANT: u32 = 50;
/// Speed represented by a full barb, knots.
const FULL_BARB: u32 = 10;
/// Speed represented by a half barb, knots.
const HALF_BARB: u32 = 5;
/// Fastest wind with its own glyph, knots.
pub const MAX_BARB_SPEED: u32 = 200;

/// Units for displaying wind speed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
pub enum WindUnit {
    /// Knots
    #[serde(rename = "kt")]
    #[strum(serialize = "kt")]
    Knots,
    /// Kilometers per hour
    #[serde(rename = "kmh")]
    #[strum(serialize = "km/h")]
    KilometersPerHour,
    /// Meters per second
    #[serde(rename = "ms")]
    #[strum(serialize = "m/s")]
    MetersPerSecond,
}

impl Default for WindUnit {
    fn default() -> Self {
        WindUnit::Knots
    }
}

impl WindUnit {
    /// Convert a speed into this unit.
    pub fn convert(self, speed: MetersPSec) -> f64 {
        match self {
            WindUnit::Knots => Knots::from(speed).unpack(),
            WindUnit::KilometersPerHour => speed.unpack() * 3.6,
            WindUnit::MetersPerSecond => speed.unpack(),
        }
    }

    /// Label for the unit.
    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// The glyph bin for a wind speed, speeds are rounded down to a multiple of 5 knots.
///
/// Returns `None` for negative or non-finite speeds. Speeds faster than 200 knots use the 200
/// knot glyph.
///
/// ```
/// use metfor::{Knots, MetersPSec};
/// use sounding_skewt::wind::speed_bin;
///
/// assert_eq!(speed_bin(MetersPSec::from(Knots(27.0))), Some(25));
/// assert_eq!(speed_bin(MetersPSec::from(Knots(3.0))), Some(0));
/// assert_eq!(speed_bin(MetersPSec::from(Knots(500.0))), Some(200));
/// assert_eq!(speed_bin(MetersPSec(-1.0)), None);
/// ```
pub fn speed_bin(speed: MetersPSec) -> Option<u32> {
    let kt = Knots::from(speed).unpack();
    if !kt.is_finite() || kt < 0.0 {
        return None;
    }

    let bin = (kt / f64::from(HALF_BARB)).floor() * f64::from(HALF_BARB);
    Some((bin as u32).min(MAX_BARB_SPEED))
}

/// Rotation in degrees of a barb instance for a wind blowing from `direction`.
///
/// Glyphs are built with the stem pointing down, so the stem must end up pointing into the wind.
#[inline]
pub fn barb_rotation(wind: WindSpdDir<MetersPSec>) -> f64 {
    wind.direction + 180.0
}

/// Symbol id of the glyph for a speed bin.
pub fn symbol_id(bin: u32) -> String {
    format!("barb{}", bin)
}

/// The parts of a barb glyph of `size` pixels for a speed in knots.
///
/// The stem runs vertically through the origin. Pennants, full barbs and then half barbs are
/// stacked from the bottom end of the stem upward.
pub fn barb_parts(speed_kt: u32, size: f64) -> Vec<(Shape, Option<&'static str>)> {
    let pennants = speed_kt / PENNANT;
    let full_barbs = (speed_kt - pennants * PENNANT) / FULL_BARB;
    let half_barbs = (speed_kt - pennants * PENNANT - full_barbs * FULL_BARB) / HALF_BARB;

    let mut px = size / 2.0;
    let mut parts = Vec::with_capacity((1 + pennants + full_barbs + half_barbs) as usize);

    parts.push((
        Shape::Line {
            x1: 0.0,
            y1: -size / 2.0,
            x2: 0.0,
            y2: size / 2.0,
        },
        None,
    ));

    for _ in 0..pennants {
        parts.push((
            Shape::Polyline {
                points: vec![(0.0, px), (-6.0, px), (0.0, px - 2.0)],
            },
            Some("flag"),
        ));
        px -= 5.0;
    }

    for _ in 0..full_barbs {
        parts.push((
            Shape::Line {
                x1: 0.0,
                y1: px,
                x2: -6.0,
                y2: px + 2.0,
            },
            None,
        ));
        px -= 3.0;
    }

    for _ in 0..half_barbs {
        parts.push((
            Shape::Line {
                x1: 0.0,
                y1: px,
                x2: -3.0,
                y2: px + 1.0,
            },
            None,
        ));
        px -= 3.0;
    }

    parts
}

/// Pre-built barb glyphs for every 5 knot bin from calm to 200 knots.
#[derive(Debug, Clone)]
pub struct BarbLibrary {
    size: f64,
    glyphs: Vec<Symbol>,
}

impl BarbLibrary {
    /// Build the library for barbs `size` pixels long.
    pub fn new(size: f64) -> Self {
        let glyphs = (0..=MAX_BARB_SPEED)
            .step_by(HALF_BARB as usize)
            .map(|bin| Symbol {
                id: symbol_id(bin),
                parts: barb_parts(bin, size),
            })
            .collect();

        BarbLibrary { size, glyphs }
    }

    /// Length of the barb stems.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// All of the glyphs.
    pub fn glyphs(&self) -> &[Symbol] {
        &self.glyphs
    }

    /// The glyph for a wind, `None` if the wind can't be drawn.
    pub fn glyph_for(&self, wind: WindSpdDir<MetersPSec>) -> Option<&Symbol> {
        if !wind.direction.is_finite() || wind.direction < 0.0 {
            return None;
        }

        speed_bin(wind.speed).and_then(|bin| self.glyphs.get((bin / HALF_BARB) as usize))
    }

    /// Define every glyph as a symbol in the scene.
    pub fn install(&self, scene: &mut Scene) {
        for glyph in &self.glyphs {
            scene.define_symbol(glyph.clone());
        }
    }
}
