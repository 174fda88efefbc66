//! The skewed, log-pressure coordinate system of the diagram.
//!
//! Pressure maps to the vertical pixel coordinate on a log scale, temperature maps to the
//! horizontal pixel coordinate on a linear scale, and then every point is sheared to the right in
//! proportion to its height above the base of the diagram. Isobars are horizontal and isotherms
//! slant up and to the right at the skew gradient.
use crate::error::{Result, SkewTError};
use metfor::{Celsius, HectoPascal, Quantity};
use tracing::debug;

/// Smallest allowed skew gradient in degrees. The shear divides by `tan(gradient)`.
pub const MIN_GRADIENT: f64 = 1.0;
/// Largest allowed skew gradient in degrees.
pub const MAX_GRADIENT: f64 = 89.0;

/// A linear map from a domain to a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Create a new scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale { domain, range }
    }

    /// Map a domain value into the range.
    #[inline]
    pub fn apply(&self, val: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d0 == d1 {
            return r0;
        }
        r0 + (val - d0) * (r1 - r0) / (d1 - d0)
    }

    /// Map a range value back into the domain.
    #[inline]
    pub fn invert(&self, val: f64) -> f64 {
        LinearScale::new(self.range, self.domain).apply(val)
    }
}

/// A logarithmic map from a strictly positive domain to a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    log_domain: (f64, f64),
    range: (f64, f64),
}

impl LogScale {
    /// Create a new scale, both ends of the domain must be positive.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !(domain.0 > 0.0 && domain.1 > 0.0) {
            return Err(SkewTError::InvalidInput);
        }

        Ok(LogScale {
            log_domain: (domain.0.ln(), domain.1.ln()),
            range,
        })
    }

    /// Map a domain value into the range, `None` for values that have no logarithm.
    #[inline]
    pub fn apply(&self, val: f64) -> Option<f64> {
        if !(val > 0.0) || !val.is_finite() {
            return None;
        }
        Some(LinearScale::new(self.log_domain, self.range).apply(val.ln()))
    }

    /// Map a range value back into the domain.
    #[inline]
    pub fn invert(&self, val: f64) -> f64 {
        LinearScale::new(self.range, self.log_domain)
            .apply(val)
            .exp()
    }
}

/// The projection state shared by everything drawn on the diagram.
#[derive(Debug, Clone)]
pub struct Projection {
    gradient: f64,
    base_pressure: HectoPascal,
    top_pressure: HectoPascal,
    mid_temp: Celsius,
    temp_range: f64,
    width: f64,
    height: f64,
    x_offset: f64,

    // Derived
    tan: f64,
    x: LinearScale,
    y: LogScale,
}

impl Projection {
    /// Create a projection for a plot area `width` by `height` pixels.
    pub fn new(
        width: f64,
        height: f64,
        gradient: f64,
        base_pressure: HectoPascal,
        top_pressure: HectoPascal,
        mid_temp: Celsius,
        temp_range: f64,
    ) -> Result<Self> {
        validate_pressures(base_pressure, top_pressure)?;
        if !(temp_range > 0.0) {
            return Err(SkewTError::InvalidInput);
        }

        let y = LogScale::new((top_pressure.unpack(), base_pressure.unpack()), (0.0, height))?;
        let mut proj = Projection {
            gradient: clamp_gradient(gradient),
            base_pressure,
            top_pressure,
            mid_temp,
            temp_range,
            width: width.max(0.0),
            height: height.max(0.0),
            x_offset: 0.0,
            tan: 1.0,
            x: LinearScale::new((0.0, 1.0), (0.0, 1.0)),
            y,
        };
        proj.update()?;

        Ok(proj)
    }

    // Recompute the derived scales. Everything that changes the state goes through here.
    fn update(&mut self) -> Result<()> {
        let mid = self.mid_temp.unpack();
        let (w, h) = (self.width, self.height);

        let y = LogScale::new(
            (self.top_pressure.unpack(), self.base_pressure.unpack()),
            (0.0, h),
        )?;

        self.tan = self.gradient.to_radians().tan();
        self.x = LinearScale::new(
            (mid - self.temp_range * 2.0, mid + self.temp_range * 2.0),
            (-w / 2.0, w + w / 2.0),
        );
        self.y = y;

        Ok(())
    }

    /// Skew gradient in degrees.
    #[inline]
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    /// Set the skew gradient. Values outside `MIN_GRADIENT..=MAX_GRADIENT` are clamped.
    pub fn set_gradient(&mut self, gradient: f64) {
        let clamped = clamp_gradient(gradient);
        if clamped != gradient {
            debug!(requested = gradient, used = clamped, "skew gradient clamped");
        }
        self.gradient = clamped;
        self.tan = self.gradient.to_radians().tan();
    }

    /// Pressure at the bottom of the diagram.
    #[inline]
    pub fn base_pressure(&self) -> HectoPascal {
        self.base_pressure
    }

    /// Pressure at the top of the diagram.
    #[inline]
    pub fn top_pressure(&self) -> HectoPascal {
        self.top_pressure
    }

    /// Set the pressure range. The base must be greater than the top, and the top greater than 0.
    /// On error the projection is unchanged.
    pub fn set_pressure_range(&mut self, base: HectoPascal, top: HectoPascal) -> Result<()> {
        validate_pressures(base, top)?;
        self.base_pressure = base;
        self.top_pressure = top;
        self.update()
    }

    /// Center of the temperature axis.
    #[inline]
    pub fn mid_temp(&self) -> Celsius {
        self.mid_temp
    }

    /// Half width of the visible temperature axis in degrees.
    #[inline]
    pub fn temp_range(&self) -> f64 {
        self.temp_range
    }

    /// Set the temperature axis. On error the projection is unchanged.
    pub fn set_temperature_range(&mut self, mid_temp: Celsius, temp_range: f64) -> Result<()> {
        if !(temp_range > 0.0) || !temp_range.is_finite() || !mid_temp.unpack().is_finite() {
            return Err(SkewTError::InvalidInput);
        }
        self.mid_temp = mid_temp;
        self.temp_range = temp_range;
        self.update()
    }

    /// Width of the plot area.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height of the plot area.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Change the size of the plot area.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        // Pressures were validated when they were set
        let _ = self.update();
    }

    /// Horizontal pan offset in pixels.
    #[inline]
    pub fn x_offset(&self) -> f64 {
        self.x_offset
    }

    /// Set the horizontal pan offset.
    #[inline]
    pub fn set_x_offset(&mut self, x_offset: f64) {
        if x_offset.is_finite() {
            self.x_offset = x_offset;
        }
    }

    /// Vertical pixel of a pressure, `None` for non-positive pressures.
    #[inline]
    pub fn pressure_to_y(&self, p: HectoPascal) -> Option<f64> {
        self.y.apply(p.unpack())
    }

    /// Pressure at a vertical pixel.
    #[inline]
    pub fn y_to_pressure(&self, y: f64) -> HectoPascal {
        HectoPascal(self.y.invert(y))
    }

    /// Horizontal pixel of a temperature at the base of the diagram, before shearing.
    #[inline]
    pub fn temperature_to_x(&self, t: Celsius) -> f64 {
        self.x.apply(t.unpack())
    }

    /// Temperature at a horizontal pixel on the base of the diagram.
    #[inline]
    pub fn x_to_temperature(&self, x: f64) -> Celsius {
        Celsius(self.x.invert(x))
    }

    /// Horizontal shear at a pressure level.
    #[inline]
    pub fn skew(&self, p: HectoPascal) -> Option<f64> {
        let y_base = self.pressure_to_y(self.base_pressure)?;
        let y = self.pressure_to_y(p)?;
        Some((y_base - y) / self.tan)
    }

    /// Screen coordinates of a temperature and pressure, not including the pan offset.
    #[inline]
    pub fn to_screen(&self, t: Celsius, p: HectoPascal) -> Option<(f64, f64)> {
        let t_val = t.unpack();
        if !t_val.is_finite() {
            return None;
        }

        let y = self.pressure_to_y(p)?;
        let skew = self.skew(p)?;
        Some((self.temperature_to_x(t) + skew, y))
    }

    /// Ratio of the log-pressure depth of the diagram if the top were moved to `new_top` to the
    /// current depth.
    pub fn depth_ratio(&self, new_top: HectoPascal) -> Result<f64> {
        validate_pressures(self.base_pressure, new_top)?;
        let base = self.base_pressure.unpack();
        let old_depth = (base / self.top_pressure.unpack()).ln();
        let new_depth = (base / new_top.unpack()).ln();

        Ok(new_depth / old_depth)
    }
}

#[inline]
fn clamp_gradient(gradient: f64) -> f64 {
    if gradient.is_nan() {
        MIN_GRADIENT
    } else {
        gradient.max(MIN_GRADIENT).min(MAX_GRADIENT)
    }
}

fn validate_pressures(base: HectoPascal, top: HectoPascal) -> Result<()> {
    let (base, top) = (base.unpack(), top.unpack());
    if top > 0.0 && base > top && base.is_finite() {
        Ok(())
    } else {
        Err(SkewTError::InvalidInput)
    }
}

/// Evenly spaced, round valued ticks covering `start..=stop`, about `count` of them.
///
/// The spacing is 1, 2, or 5 times a power of ten.
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return vec![];
    }
    if start == stop {
        return vec![start];
    }

    let (lo, hi, reverse) = if start < stop {
        (start, stop, false)
    } else {
        (stop, start, true)
    };

    let step = (hi - lo) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let mut ticks: Vec<f64> = if power >= 0.0 {
        let inc = factor * 10f64.powf(power);
        let (first, last) = ((lo / inc).ceil() as i64, (hi / inc).floor() as i64);
        (first..=last).map(|i| i as f64 * inc).collect()
    } else {
        // Divide by the inverse to keep fractional ticks exact
        let inv = 10f64.powf(-power) / factor;
        let (first, last) = ((lo * inv).ceil() as i64, (hi * inv).floor() as i64);
        (first..=last).map(|i| i as f64 / inv).collect()
    };

    if reverse {
        ticks.reverse();
    }
    ticks
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;

    fn default_projection() -> Projection {
        Projection::new(
            400.0,
            400.0,
            55.0,
            HectoPascal(1000.0),
            HectoPascal(100.0),
            Celsius(0.0),
            50.0,
        )
        .unwrap()
    }

    #[test]
    fn test_log_scale() {
        let y = LogScale::new((100.0, 1000.0), (0.0, 400.0)).unwrap();
        assert!(approx_equal(y.apply(100.0).unwrap(), 0.0, 1.0e-9));
        assert!(approx_equal(y.apply(1000.0).unwrap(), 400.0, 1.0e-9));
        assert!(approx_equal(y.apply(316.227766).unwrap(), 200.0, 1.0e-4));
        assert!(approx_equal(y.invert(200.0), 316.227766, 1.0e-4));

        assert!(y.apply(0.0).is_none());
        assert!(y.apply(-5.0).is_none());
        assert!(y.apply(std::f64::NAN).is_none());
        assert!(LogScale::new((0.0, 1000.0), (0.0, 400.0)).is_err());
    }

    #[test]
    fn test_linear_scale() {
        let x = LinearScale::new((-100.0, 100.0), (-200.0, 600.0));
        assert_eq!(x.apply(0.0), 200.0);
        assert_eq!(x.invert(200.0), 0.0);
    }

    #[test]
    fn test_skew_shear() {
        let proj = default_projection();

        // No shear at the base
        let (x_base, y_base) = proj.to_screen(Celsius(0.0), HectoPascal(1000.0)).unwrap();
        assert!(approx_equal(x_base, proj.temperature_to_x(Celsius(0.0)), 1.0e-9));
        assert!(approx_equal(y_base, 400.0, 1.0e-9));

        // Full shear at the top
        let (x_top, y_top) = proj.to_screen(Celsius(0.0), HectoPascal(100.0)).unwrap();
        let expected = x_base + 400.0 / 55f64.to_radians().tan();
        assert!(approx_equal(x_top, expected, 1.0e-9));
        assert!(approx_equal(y_top, 0.0, 1.0e-9));

        // Isotherms lean right going up
        assert!(x_top > x_base);

        assert!(proj.to_screen(Celsius(0.0), HectoPascal(0.0)).is_none());
        assert!(proj.to_screen(Celsius(std::f64::NAN), HectoPascal(500.0)).is_none());
    }

    #[test]
    fn test_gradient_clamped() {
        let mut proj = default_projection();

        proj.set_gradient(0.0);
        assert_eq!(proj.gradient(), MIN_GRADIENT);
        let (x, _) = proj.to_screen(Celsius(0.0), HectoPascal(100.0)).unwrap();
        assert!(x.is_finite());

        proj.set_gradient(90.0);
        assert_eq!(proj.gradient(), MAX_GRADIENT);

        proj.set_gradient(std::f64::NAN);
        assert_eq!(proj.gradient(), MIN_GRADIENT);
    }

    #[test]
    fn test_pressure_range_validation() {
        let mut proj = default_projection();

        assert!(proj
            .set_pressure_range(HectoPascal(1000.0), HectoPascal(1000.0))
            .is_err());
        assert!(proj
            .set_pressure_range(HectoPascal(1000.0), HectoPascal(0.0))
            .is_err());
        assert_eq!(proj.top_pressure(), HectoPascal(100.0));

        proj.set_pressure_range(HectoPascal(1050.0), HectoPascal(300.0))
            .unwrap();
        assert!(approx_equal(
            proj.pressure_to_y(HectoPascal(300.0)).unwrap(),
            0.0,
            1.0e-9
        ));
    }

    #[test]
    fn test_pressure_round_trip() {
        let proj = default_projection();
        for &p in &[950.0, 700.0, 432.1, 150.0] {
            let y = proj.pressure_to_y(HectoPascal(p)).unwrap();
            assert!(approx_equal(proj.y_to_pressure(y).unpack(), p, 1.0e-9));
        }
        assert!(approx_equal(
            proj.x_to_temperature(proj.temperature_to_x(Celsius(-23.0)))
                .unpack(),
            -23.0,
            1.0e-9
        ));
    }

    #[test]
    fn test_depth_ratio() {
        let proj = default_projection();
        assert!(approx_equal(
            proj.depth_ratio(HectoPascal(100.0)).unwrap(),
            1.0,
            1.0e-12
        ));
        assert!(approx_equal(
            proj.depth_ratio(HectoPascal(316.227766)).unwrap(),
            0.5,
            1.0e-6
        ));
        assert!(proj.depth_ratio(HectoPascal(1200.0)).is_err());
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(
            nice_ticks(-100.0, 50.0, 15),
            (0..16).map(|i| -100.0 + 10.0 * f64::from(i)).collect::<Vec<_>>()
        );
        assert_eq!(nice_ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(nice_ticks(-150.0, 150.0, 30).len(), 31);
        assert_eq!(nice_ticks(10.0, 0.0, 2), vec![10.0, 5.0, 0.0]);
        assert!(nice_ticks(0.0, 10.0, 0).is_empty());
    }
}
