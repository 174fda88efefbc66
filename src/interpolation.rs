//! Linear interpolation along curves and between sounding levels.
use crate::{
    error::{Result, SkewTError},
    sounding::Sample,
};
use itertools::Itertools;
use metfor::{HectoPascal, MetersPSec, Quantity, WindSpdDir, WindUV};
use optional::Optioned;
use std::cmp::Ordering;

/// Interpolate a whole level from a list of samples sorted by decreasing pressure.
///
/// Returns a `Sample` with interpolated values. Levels without a usable pressure are skipped.
pub fn linear_interpolate_samples(samples: &[Sample], tgt_p: HectoPascal) -> Result<Sample> {
    // What kind of bracket is this?
    enum BracketType<'a> {
        Bracket(&'a Sample, &'a Sample),
        EndEquals(&'a Sample),
    }

    // Map this pair of levels to a BracketType
    fn make_bracket<'a>(
        pnt_0: (&'a Sample, HectoPascal),
        pnt_1: (&'a Sample, HectoPascal),
        tgt_p: HectoPascal,
    ) -> Option<BracketType<'a>> {
        let (row0, p0) = pnt_0;
        let (row1, p1) = pnt_1;

        if (p0 - tgt_p).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEquals(row0))
        } else if (p1 - tgt_p).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEquals(row1))
        } else if (p0 > tgt_p && p1 < tgt_p) || (p0 < tgt_p && p1 > tgt_p) {
            Some(BracketType::Bracket(row0, row1))
        } else {
            None
        }
    }

    samples
        .iter()
        .filter_map(|smpl| smpl.valid_pressure().map(|p| (smpl, p)))
        // Look at the levels two at a time...
        .tuple_windows::<(_, _)>()
        // Map these pairs to brackets and remove anything that isn't a bracket.
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1, tgt_p))
        .next()
        .and_then(|bracket| match bracket {
            BracketType::Bracket(row0, row1) => linear_interp_samples(row0, row1, tgt_p),
            BracketType::EndEquals(row) => Some(row.clone()),
        })
        .ok_or(SkewTError::InterpolationError)
}

/// Interpolate between two levels that bracket `tgt_p`, linear in pressure.
///
/// Wind is interpolated by its u and v components. Flags are not interpolated, the tooltip of the
/// nearer level is kept.
pub(crate) fn linear_interp_samples(
    row0: &Sample,
    row1: &Sample,
    tgt_p: HectoPascal,
) -> Option<Sample> {
    let p0 = row0.valid_pressure()?.unpack();
    let p1 = row1.valid_pressure()?.unpack();

    let run = p1 - p0;
    let dp = tgt_p.unpack() - p0;

    if run == 0.0 {
        return Some(row0.clone());
    }

    let mut result = Sample::new(tgt_p);

    result.temperature = eval_linear_interp(row0.temperature, row1.temperature, run, dp);
    result.dew_point = eval_linear_interp(row0.dew_point, row1.dew_point, run, dp);
    result.height = eval_linear_interp(row0.height, row1.height, run, dp);

    // Special interpolation for vectors
    if let (Some(w_below), Some(w_above)) = (row0.valid_wind(), row1.valid_wind()) {
        let WindUV::<MetersPSec> {
            u: x_below,
            v: y_below,
        } = WindUV::from(w_below);
        let WindUV::<MetersPSec> {
            u: x_above,
            v: y_above,
        } = WindUV::from(w_above);

        let rise_x = x_above - x_below;
        let rise_y = y_above - y_below;

        let x = x_below + rise_x * (dp / run);
        let y = y_below + rise_y * (dp / run);

        let interped_wind = WindSpdDir::<MetersPSec>::from(WindUV { u: x, v: y });

        result.wind = interped_wind.into();
    }

    result.tooltip = if (dp / run) < 0.5 {
        row0.tooltip.clone()
    } else {
        row1.tooltip.clone()
    };

    Some(result)
}

#[inline]
fn eval_linear_interp<Y>(low_val: Optioned<Y>, high_val: Optioned<Y>, run: f64, dp: f64) -> Optioned<Y>
where
    Y: Quantity + optional::Noned,
{
    if let (Some(val_below), Some(val_above)) = (low_val.into_option(), high_val.into_option()) {
        let (val_below, val_above) = (val_below.unpack(), val_above.unpack());
        let rise: f64 = val_above - val_below;
        Optioned::from(Y::pack(val_below + dp * rise / run))
    } else {
        Optioned::default()
    }
}

/// Linear interpolation of `y` at `x` between the points `(x1, y1)` and `(x2, y2)`.
///
/// If `x1 == x2` then `y1` is returned.
#[inline]
pub(crate) fn linear_interp(x: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> f64 {
    if x1 == x2 {
        return y1;
    }

    let w = (x - x1) / (x2 - x1);
    y1 * (1.0 - w) + y2 * w
}

/// Sample the curve `(xs, ys)` at `target_x`.
///
/// `xs` must be monotonic, but it may be ascending or descending. Outside the range of `xs` the end
/// segments are extrapolated. Returns `None` if there are fewer than 2 points.
pub fn sample_at(xs: &[f64], ys: &[f64], target_x: f64) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());

    if xs.len() < 2 || ys.len() < xs.len() {
        return None;
    }

    let desc_order = xs[0] > xs[1];
    let idx = match xs
        .iter()
        .position(|&x| if desc_order { x <= target_x } else { x >= target_x })
    {
        None => xs.len() - 1,
        Some(0) => 1,
        Some(i) => i,
    };

    Some(linear_interp(
        target_x,
        xs[idx - 1],
        xs[idx],
        ys[idx - 1],
        ys[idx],
    ))
}

/// Find the first point, in order of increasing x, where two curves cross.
///
/// The curves may be sampled at different x values and in either x order, but each must be
/// monotonic in x. Only the overlapping part of the two x ranges is searched. Both curves are
/// interpolated onto the union of their x values in that overlap, an exact match at one of those
/// points is returned as is, otherwise the crossing is solved for within the first segment where
/// the difference between the curves changes sign.
///
/// Returns `None` if the curves do not cross.
///
/// # Examples
///
/// ```rust
/// use sounding_skewt::first_intersection;
///
/// let xs = [-5.0, -2.5, 0.0, 2.5, 5.0];
/// let zeros = [0.0; 5];
///
/// assert_eq!(first_intersection(&xs, &zeros, &xs, &xs), Some((0.0, 0.0)));
/// assert_eq!(first_intersection(&xs, &[1.0; 5], &xs, &[2.0; 5]), None);
/// ```
pub fn first_intersection(
    xs_a: &[f64],
    ys_a: &[f64],
    xs_b: &[f64],
    ys_b: &[f64],
) -> Option<(f64, f64)> {
    if xs_a.len() < 2 || xs_b.len() < 2 || ys_a.len() != xs_a.len() || ys_b.len() != xs_b.len() {
        return None;
    }

    let domain = |xs: &[f64]| -> (f64, f64) {
        let (first, last) = (xs[0], xs[xs.len() - 1]);
        (first.min(last), first.max(last))
    };

    let (min_a, max_a) = domain(xs_a);
    let (min_b, max_b) = domain(xs_b);
    let min = min_a.max(min_b);
    let max = max_a.min(max_b);
    if !(min <= max) {
        return None;
    }

    let mut xs: Vec<f64> = xs_a
        .iter()
        .chain(xs_b.iter())
        .cloned()
        .filter(|&x| x.is_finite() && x >= min && x <= max)
        .collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    xs.dedup();

    let iy_as: Vec<f64> = xs.iter().filter_map(|&x| sample_at(xs_a, ys_a, x)).collect();
    let iy_bs: Vec<f64> = xs.iter().filter_map(|&x| sample_at(xs_b, ys_b, x)).collect();

    for i in 0..xs.len() {
        let (x1, y_a1, y_b1) = (xs[i], iy_as[i], iy_bs[i]);
        if y_a1 == y_b1 {
            return Some((x1, y_a1));
        }

        if i + 1 == xs.len() {
            break;
        }

        let (x2, y_a2, y_b2) = (xs[i + 1], iy_as[i + 1], iy_bs[i + 1]);
        let d1 = y_b1 - y_a1;
        let d2 = y_b2 - y_a2;

        // An exact match at the next point is picked up on the next pass.
        if !d1.is_finite() || !d2.is_finite() || d2 == 0.0 {
            continue;
        }

        if d1.signum() != d2.signum() {
            let width = x2 - x1;
            let slope_a = (y_a2 - y_a1) / width;
            let slope_b = (y_b2 - y_b1) / width;
            let dx = d1 / (slope_a - slope_b);
            let dy = dx * slope_a;
            return Some((x1 + dx, y_a1 + dy));
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;
    use metfor::{Kelvin, Meters};

    #[test]
    fn test_linear_interp() {
        assert_eq!(linear_interp(0.5, 0.0, 1.0, 10.0, 20.0), 15.0);
        assert_eq!(linear_interp(2.0, 0.0, 1.0, 10.0, 20.0), 30.0);
        assert_eq!(linear_interp(2.0, 1.0, 1.0, 10.0, 20.0), 10.0);
    }

    #[test]
    fn test_sample_at_both_orders() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 10.0, 20.0, 30.0];
        assert!(approx_equal(sample_at(&xs, &ys, 1.5).unwrap(), 15.0, 1.0e-12));
        // extrapolate
        assert!(approx_equal(sample_at(&xs, &ys, 4.0).unwrap(), 40.0, 1.0e-12));
        assert!(approx_equal(sample_at(&xs, &ys, -1.0).unwrap(), -10.0, 1.0e-12));

        let xs = [3.0, 2.0, 1.0, 0.0];
        let ys = [30.0, 20.0, 10.0, 0.0];
        assert!(approx_equal(sample_at(&xs, &ys, 1.5).unwrap(), 15.0, 1.0e-12));
        assert!(approx_equal(sample_at(&xs, &ys, 4.0).unwrap(), 40.0, 1.0e-12));

        assert!(sample_at(&[1.0], &[1.0], 1.0).is_none());
    }

    #[test]
    fn test_first_intersection_crossing() {
        let xs: Vec<f64> = (-5..=5).map(f64::from).collect();
        let zeros = vec![0.0; xs.len()];

        assert_eq!(
            first_intersection(&xs, &zeros, &xs, &xs),
            Some((0.0, 0.0))
        );
        assert_eq!(
            first_intersection(&xs, &xs, &xs, &zeros),
            Some((0.0, 0.0))
        );
    }

    #[test]
    fn test_first_intersection_solves_between_points() {
        let xs_a = [0.0, 2.0];
        let ys_a = [0.0, 2.0];
        let xs_b = [0.0, 2.0];
        let ys_b = [1.0, 0.0];

        let (x, y) = first_intersection(&xs_a, &ys_a, &xs_b, &ys_b).unwrap();
        assert!(approx_equal(x, 2.0 / 3.0, 1.0e-12));
        assert!(approx_equal(y, 2.0 / 3.0, 1.0e-12));
    }

    #[test]
    fn test_first_intersection_parallel() {
        let xs: Vec<f64> = (-5..=5).map(f64::from).collect();
        let ones = vec![1.0; xs.len()];
        let twos = vec![2.0; xs.len()];

        assert_eq!(first_intersection(&xs, &ones, &xs, &twos), None);
    }

    #[test]
    fn test_first_intersection_tangent() {
        let xs: Vec<f64> = (-5..=5).map(f64::from).collect();
        let parabola: Vec<f64> = xs.iter().map(|x| x * x).collect();
        let zeros = vec![0.0; xs.len()];

        assert_eq!(
            first_intersection(&xs, &parabola, &xs, &zeros),
            Some((0.0, 0.0))
        );
    }

    #[test]
    fn test_first_intersection_descending_and_different_grids() {
        let xs_a = [10.0, 5.0, 0.0];
        let ys_a = [10.0, 5.0, 0.0];
        let xs_b = [1.0, 3.0, 7.0, 12.0];
        let ys_b = [4.0, 4.0, 4.0, 4.0];

        let (x, y) = first_intersection(&xs_a, &ys_a, &xs_b, &ys_b).unwrap();
        assert!(approx_equal(x, 4.0, 1.0e-12));
        assert!(approx_equal(y, 4.0, 1.0e-12));
    }

    #[test]
    fn test_first_intersection_no_overlap() {
        assert_eq!(
            first_intersection(&[0.0, 1.0], &[0.0, 1.0], &[2.0, 3.0], &[0.0, 1.0]),
            None
        );
    }

    #[test]
    fn test_first_intersection_idempotent() {
        let xs_a: Vec<f64> = (0..40).map(|i| f64::from(i) * 0.37).collect();
        let ys_a: Vec<f64> = xs_a.iter().map(|x| x.sin()).collect();
        let xs_b = [0.0, 5.0, 14.0];
        let ys_b = [0.2, 0.1, -0.3];

        let first = first_intersection(&xs_a, &ys_a, &xs_b, &ys_b);
        for _ in 0..10 {
            let again = first_intersection(&xs_a, &ys_a, &xs_b, &ys_b);
            assert_eq!(
                first.map(|(x, y)| (x.to_bits(), y.to_bits())),
                again.map(|(x, y)| (x.to_bits(), y.to_bits()))
            );
        }
    }

    fn test_samples() -> Vec<Sample> {
        vec![
            Sample::new(HectoPascal(1000.0))
                .with_height(Meters(0.0))
                .with_temperature(Kelvin(288.15))
                .with_dew_point(Kelvin(283.15))
                .with_wind(270.0, MetersPSec(10.0)),
            Sample::new(HectoPascal(500.0))
                .with_height(Meters(5500.0))
                .with_temperature(Kelvin(253.15))
                .with_dew_point(Kelvin(243.15))
                .with_wind(270.0, MetersPSec(20.0)),
            Sample::new(HectoPascal(200.0))
                .with_height(Meters(11800.0))
                .with_temperature(Kelvin(223.15)),
        ]
    }

    #[test]
    fn test_linear_interpolate_samples() {
        let snd = test_samples();

        let lvl = linear_interpolate_samples(&snd, HectoPascal(750.0)).unwrap();
        assert!(approx_equal(lvl.temperature.unpack().unpack(), 270.65, 1.0e-9));
        assert!(approx_equal(lvl.dew_point.unpack().unpack(), 263.15, 1.0e-9));
        assert!(approx_equal(lvl.height.unpack().unpack(), 2750.0, 1.0e-9));

        let wind = lvl.wind.unpack();
        assert!(approx_equal(wind.speed.unpack(), 15.0, 1.0e-6));
        assert!(approx_equal(wind.direction, 270.0, 1.0e-6));

        // Missing dew point above 500 hPa, but temperature is still there.
        let lvl = linear_interpolate_samples(&snd, HectoPascal(350.0)).unwrap();
        assert!(lvl.temperature.is_some());
        assert!(lvl.dew_point.is_none());
        assert!(lvl.wind.is_none());

        let lvl = linear_interpolate_samples(&snd, HectoPascal(500.0)).unwrap();
        assert_eq!(lvl, snd[1]);

        assert_eq!(
            linear_interpolate_samples(&snd, HectoPascal(1050.0)),
            Err(SkewTError::InterpolationError)
        );
    }
}
