//! Meteorological formulas used for drawing the diagram background and lifting parcels.
//!
//! These are deliberately simple approximations (Bolton/Magnus saturation vapor pressure, constant
//! specific heats and latent heat) so that the background lines, the parcel trajectory, and the
//! dew point inversion are all consistent with each other. Temperatures are in Kelvin, pressures
//! are in hPa and mixing ratios are in kg/kg.
use metfor::{HectoPascal, Kelvin, Quantity};

/// Gas constant for dry air, J / (kg K).
pub const RD: f64 = 287.0;
/// Specific heat of dry air at constant pressure, J / (kg K).
pub const CPD: f64 = 1005.0;
/// Ratio of the molecular weight of water to that of dry air.
pub const EPSILON: f64 = 18.01528 / 28.9644;
/// Latent heat of vaporization of water, J / kg.
pub const LV: f64 = 2_501_000.0;
/// Saturation vapor pressure at 0C in hPa.
pub const SAT_PRESSURE_0C: f64 = 6.112;
/// Add to a Celsius value to get Kelvin.
pub const CELSIUS_TO_K: f64 = 273.15;

/// Temperature of a parcel moved dry adiabatically from `p0`, where it had temperature `t0`, to
/// `p`.
#[inline]
pub fn dry_lapse(p: HectoPascal, t0: Kelvin, p0: HectoPascal) -> Kelvin {
    Kelvin(t0.unpack() * (p.unpack() / p0.unpack()).powf(RD / CPD))
}

/// Saturation vapor pressure over liquid water.
#[inline]
pub fn saturation_vapor_pressure(t: Kelvin) -> HectoPascal {
    let t_c = t.unpack() - CELSIUS_TO_K;
    HectoPascal(SAT_PRESSURE_0C * ((17.67 * t_c) / (t_c + 243.5)).exp())
}

/// Mixing ratio of a gas with partial pressure `e` in air with total pressure `p`.
#[inline]
pub fn mixing_ratio(e: HectoPascal, p: HectoPascal) -> f64 {
    mixing_ratio_with_epsilon(e, p, EPSILON)
}

/// Same as `mixing_ratio`, but with a caller supplied molecular weight ratio.
#[inline]
pub fn mixing_ratio_with_epsilon(e: HectoPascal, p: HectoPascal, epsilon: f64) -> f64 {
    let e = e.unpack();
    (epsilon * e) / (p.unpack() - e)
}

/// Saturation mixing ratio of water vapor at pressure `p` and temperature `t`.
#[inline]
pub fn saturation_mixing_ratio(p: HectoPascal, t: Kelvin) -> f64 {
    mixing_ratio(saturation_vapor_pressure(t), p)
}

/// Water vapor partial pressure given the total pressure and the mixing ratio.
#[inline]
pub fn vapor_pressure(p: HectoPascal, mixing_ratio: f64) -> HectoPascal {
    HectoPascal(p.unpack() * mixing_ratio / (EPSILON + mixing_ratio))
}

/// Dew point for a given vapor pressure. This is the inverse of `saturation_vapor_pressure`.
#[inline]
pub fn dew_point(e: HectoPascal) -> Kelvin {
    let val = (e.unpack() / SAT_PRESSURE_0C).ln();
    Kelvin(CELSIUS_TO_K + (243.5 * val) / (17.67 - val))
}

/// The rate of change of temperature with pressure (K / hPa) along a saturated adiabat.
#[inline]
pub fn moist_gradient_t(p: HectoPascal, t: Kelvin) -> f64 {
    let t = t.unpack();
    let rs = saturation_mixing_ratio(p, Kelvin(t));
    let n = RD * t + LV * rs;
    let d = CPD + (LV.powi(2) * rs * EPSILON) / (RD * t.powi(2));

    (1.0 / p.unpack()) * (n / d)
}
