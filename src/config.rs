//! Configuration for a [`SkewT`](crate::SkewT) diagram.
//!
//! Everything that was a tuning constant of the interactive diagram lives here so hosts can
//! override it from a file. Missing fields take their default.
use crate::{
    error::{Result, SkewTError},
    wind::WindUnit,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Space around the plot area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    /// Above the plot
    pub top: f64,
    /// Right of the plot, the wind barbs are drawn here.
    pub right: f64,
    /// Below the plot
    pub bottom: f64,
    /// Left of the plot, the pressure labels are drawn here.
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 10.0,
            right: 25.0,
            bottom: 10.0,
            left: 25.0,
        }
    }
}

/// Diagram configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewTConfig {
    /// Space around the plot area.
    pub margins: Margins,
    /// Pressure at the bottom of the diagram, hPa.
    pub base_pressure_hpa: f64,
    /// Initial pressure at the top of the diagram, hPa.
    pub top_pressure_hpa: f64,
    /// Initial skew gradient, degrees.
    pub gradient_deg: f64,
    /// Temperature at the center of the temperature axis, °C.
    pub mid_temp_c: f64,
    /// Half width of the temperature axis, °C.
    pub temp_range_c: f64,
    /// Pressures of the labeled isobars, hPa, from the bottom up.
    pub isobars_hpa: Vec<f64>,
    /// Spacing of the minor pressure ticks, hPa.
    pub tick_interval_hpa: f64,
    /// Start with the top pressure control also adjusting the gradient.
    pub adjust_gradient: bool,
    /// Length of the wind barb stems, pixels.
    pub barb_size: f64,
    /// Horizontal spacing between the barb columns of overlaid soundings, pixels.
    pub barb_spacing: f64,
    /// Unit for the wind speed read out.
    pub wind_unit: WindUnit,
    /// Longest sounding drawn at full resolution while moving.
    pub moving_sample_cap: usize,
    /// Number of pressure intervals in the background curves while moving.
    pub moving_background_steps: usize,
    /// Integration steps for the parcel trajectory.
    pub parcel_steps: usize,
    /// Integration steps for the parcel trajectory while moving.
    pub moving_parcel_steps: usize,
    /// Idle time after the last interaction before the full resolution redraw, milliseconds.
    pub settle_delay_ms: u64,
    /// Approximate number of isotherms.
    pub isotherm_ticks: usize,
    /// Approximate number of dry adiabats, moist adiabats and isohumes.
    pub adiabat_ticks: usize,
    /// Approximate number of temperature axis labels.
    pub axis_ticks: usize,
}

impl Default for SkewTConfig {
    fn default() -> Self {
        SkewTConfig {
            margins: Margins::default(),
            base_pressure_hpa: 1000.0,
            top_pressure_hpa: 100.0,
            gradient_deg: 55.0,
            mid_temp_c: 0.0,
            temp_range_c: 50.0,
            isobars_hpa: vec![
                1000.0, 900.0, 800.0, 700.0, 600.0, 500.0, 400.0, 300.0, 200.0, 100.0,
            ],
            tick_interval_hpa: 25.0,
            adjust_gradient: false,
            barb_size: 15.0,
            barb_spacing: 15.0,
            wind_unit: WindUnit::Knots,
            moving_sample_cap: 50,
            moving_background_steps: 4,
            parcel_steps: 40,
            moving_parcel_steps: 5,
            settle_delay_ms: 1000,
            isotherm_ticks: 15,
            adiabat_ticks: 30,
            axis_ticks: 20,
        }
    }
}

impl SkewTConfig {
    /// Set the pressure range of the diagram.
    ///
    /// ```
    /// use sounding_skewt::config::SkewTConfig;
    ///
    /// let config = SkewTConfig::default().with_pressure_range(1050.0, 200.0);
    /// assert!(config.validate().is_ok());
    /// assert!(config.with_pressure_range(200.0, 1050.0).validate().is_err());
    /// ```
    pub fn with_pressure_range(self, base_hpa: f64, top_hpa: f64) -> Self {
        SkewTConfig {
            base_pressure_hpa: base_hpa,
            top_pressure_hpa: top_hpa,
            ..self
        }
    }

    /// Set the initial skew gradient in degrees.
    pub fn with_gradient(self, gradient_deg: f64) -> Self {
        SkewTConfig {
            gradient_deg,
            ..self
        }
    }

    /// Set the unit for the wind speed read out.
    pub fn with_wind_unit(self, wind_unit: WindUnit) -> Self {
        SkewTConfig { wind_unit, ..self }
    }

    /// Set the settle delay.
    pub fn with_settle_delay(self, delay: Duration) -> Self {
        SkewTConfig {
            settle_delay_ms: delay.as_millis() as u64,
            ..self
        }
    }

    /// The settle delay as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Check that the configuration describes a drawable diagram.
    pub fn validate(&self) -> Result<()> {
        let finite_positive = |val: f64| val.is_finite() && val > 0.0;

        let Margins {
            top,
            right,
            bottom,
            left,
        } = self.margins;
        let margins_ok = [top, right, bottom, left]
            .iter()
            .all(|&m| m.is_finite() && m >= 0.0);

        let pressures_ok = finite_positive(self.top_pressure_hpa)
            && finite_positive(self.base_pressure_hpa)
            && self.base_pressure_hpa > self.top_pressure_hpa;

        let ok = margins_ok
            && pressures_ok
            && self.gradient_deg.is_finite()
            && self.mid_temp_c.is_finite()
            && finite_positive(self.temp_range_c)
            && self.isobars_hpa.iter().all(|&p| finite_positive(p))
            && finite_positive(self.tick_interval_hpa)
            && finite_positive(self.barb_size)
            && self.barb_spacing.is_finite()
            && self.barb_spacing >= 0.0
            && self.moving_background_steps > 0
            && self.parcel_steps > 0
            && self.moving_parcel_steps > 0
            && self.isotherm_ticks > 0
            && self.adiabat_ticks > 0
            && self.axis_ticks > 0;

        if ok {
            Ok(())
        } else {
            Err(SkewTError::InvalidInput)
        }
    }

    /// Minor tick pressures for the right hand pressure axis.
    ///
    /// Every `tick_interval_hpa` from one interval below the first isobar, down to but not
    /// including the last isobar.
    pub fn pressure_ticks(&self) -> Vec<f64> {
        let (first, last) = match (self.isobars_hpa.first(), self.isobars_hpa.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return vec![],
        };
        if !(self.tick_interval_hpa > 0.0) {
            return vec![];
        }

        let count = ((first + self.tick_interval_hpa - last) / self.tick_interval_hpa).ceil();
        (0..count.max(0.0) as usize)
            .map(|i| first + self.tick_interval_hpa - i as f64 * self.tick_interval_hpa)
            .filter(|&p| p > last)
            .collect()
    }
}
