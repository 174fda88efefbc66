use metfor::{HectoPascal, Kelvin, Meters, MetersPSec, Quantity, WindSpdDir};
use optional::Optioned;

/// Bit flags marking the significance of a level, as reported by the radiosonde decoder.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct LevelFlags(pub u32);

impl LevelFlags {
    /// No flags set.
    pub const NONE: LevelFlags = LevelFlags(0);
    /// Surface level.
    pub const SURFACE: LevelFlags = LevelFlags(1 << 0);
    /// Standard (mandatory) pressure level.
    pub const STANDARD_LEVEL: LevelFlags = LevelFlags(1 << 1);
    /// Tropopause level.
    pub const TROPOPAUSE: LevelFlags = LevelFlags(1 << 2);
    /// Maximum wind level.
    pub const MAX_WIND: LevelFlags = LevelFlags(1 << 3);
    /// Significant temperature level.
    pub const SIGNIFICANT_TEMPERATURE: LevelFlags = LevelFlags(1 << 4);
    /// Significant wind level.
    pub const SIGNIFICANT_WIND: LevelFlags = LevelFlags(1 << 5);
    /// Some value at this level was reported as missing.
    pub const MISSING_DATA: LevelFlags = LevelFlags(1 << 6);

    /// Are all the flags in `other` set in `self`?
    #[inline]
    pub fn contains(self, other: LevelFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set all the flags in `other`.
    #[inline]
    pub fn insert(&mut self, other: LevelFlags) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for LevelFlags {
    type Output = LevelFlags;

    fn bitor(self, rhs: LevelFlags) -> LevelFlags {
        LevelFlags(self.0 | rhs.0)
    }
}

/// One level of a sounding.
///
/// Temperatures are in Kelvin. The caller is responsible for converting legacy encodings (Pa,
/// knots, Celsius) before handing samples to the diagram.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Sample {
    /// Pressure in hPa
    pub pressure: Optioned<HectoPascal>,
    /// Geopotential height in meters
    pub height: Optioned<Meters>,
    /// Temperature in Kelvin
    pub temperature: Optioned<Kelvin>,
    /// Dew point in Kelvin
    pub dew_point: Optioned<Kelvin>,
    /// Wind, direction is where the wind blows from.
    pub wind: Optioned<WindSpdDir<MetersPSec>>,
    /// Level significance
    pub flags: LevelFlags,
    /// Free text shown with this level.
    pub tooltip: Option<String>,
}

impl Sample {
    /// Create a sample with only the pressure set.
    pub fn new(pressure: HectoPascal) -> Self {
        Sample {
            pressure: Optioned::from(pressure),
            ..Sample::default()
        }
    }

    /// Builder method for the height.
    pub fn with_height(mut self, height: Meters) -> Self {
        self.height = Optioned::from(height);
        self
    }

    /// Builder method for the temperature.
    pub fn with_temperature(mut self, temperature: Kelvin) -> Self {
        self.temperature = Optioned::from(temperature);
        self
    }

    /// Builder method for the dew point.
    pub fn with_dew_point(mut self, dew_point: Kelvin) -> Self {
        self.dew_point = Optioned::from(dew_point);
        self
    }

    /// Builder method for the wind, `direction` in degrees the wind is blowing from.
    pub fn with_wind(mut self, direction: f64, speed: MetersPSec) -> Self {
        self.wind = Optioned::from(WindSpdDir { speed, direction });
        self
    }

    /// Builder method for the level flags.
    pub fn with_flags(mut self, flags: LevelFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Builder method for the tooltip text.
    pub fn with_tooltip<S: Into<String>>(mut self, tooltip: S) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// The pressure, only if it is usable on a log scale.
    #[inline]
    pub fn valid_pressure(&self) -> Option<HectoPascal> {
        self.pressure
            .into_option()
            .filter(|p| p.unpack().is_finite() && p.unpack() > 0.0)
    }

    /// The temperature, if present and finite.
    #[inline]
    pub fn valid_temperature(&self) -> Option<Kelvin> {
        self.temperature
            .into_option()
            .filter(|t| t.unpack().is_finite())
    }

    /// The dew point, if present and finite.
    #[inline]
    pub fn valid_dew_point(&self) -> Option<Kelvin> {
        self.dew_point.into_option().filter(|t| t.unpack().is_finite())
    }

    /// The wind, if present with a finite, non-negative speed and direction.
    #[inline]
    pub fn valid_wind(&self) -> Option<WindSpdDir<MetersPSec>> {
        self.wind.into_option().filter(|w| {
            let spd = w.speed.unpack();
            spd.is_finite() && spd >= 0.0 && w.direction.is_finite() && w.direction >= 0.0
        })
    }
}
