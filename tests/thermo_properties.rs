//! Property tests for the thermodynamics and the parcel lift.
use metfor::{HectoPascal, Kelvin, Quantity};
use proptest::prelude::*;
use sounding_skewt::{
    first_intersection,
    met_formulas::{dew_point, dry_lapse, saturation_vapor_pressure},
    parcel_trajectory,
    projection::nice_ticks,
    surface_parcel, EnvironmentProfile,
};

mod utils;

use crate::utils::*;

proptest! {
    #[test]
    fn dry_lapse_at_start_is_identity(t in 200.0f64..330.0, p0 in 500.0f64..1050.0) {
        let t1 = dry_lapse(HectoPascal(p0), Kelvin(t), HectoPascal(p0));
        prop_assert!(approx_equal(t1.unpack(), t, 1.0e-9));
    }

    #[test]
    fn dry_lapse_cools_with_height(
        t in 200.0f64..330.0,
        p0 in 500.0f64..1050.0,
        dp in 1.0f64..400.0,
    ) {
        let lower = dry_lapse(HectoPascal(p0), Kelvin(t), HectoPascal(p0));
        let upper = dry_lapse(HectoPascal(p0 - dp), Kelvin(t), HectoPascal(p0));
        prop_assert!(upper.unpack() < lower.unpack());
    }

    #[test]
    fn dew_point_inverts_vapor_pressure(t in 200.0f64..330.0) {
        let td = dew_point(saturation_vapor_pressure(Kelvin(t)));
        prop_assert!(approx_equal(td.unpack(), t, 0.01));
    }

    #[test]
    fn first_intersection_is_deterministic(
        ys_a in prop::collection::vec(-50.0f64..50.0, 2..30),
        ys_b in prop::collection::vec(-50.0f64..50.0, 2..30),
    ) {
        let xs_a: Vec<f64> = (0..ys_a.len()).map(|i| i as f64).collect();
        let xs_b: Vec<f64> = (0..ys_b.len()).map(|i| i as f64 * 0.7).collect();

        let first = first_intersection(&xs_a, &ys_a, &xs_b, &ys_b);
        let second = first_intersection(&xs_a, &ys_a, &xs_b, &ys_b);

        match (first, second) {
            (Some((x1, y1)), Some((x2, y2))) => {
                prop_assert_eq!(x1.to_bits(), x2.to_bits());
                prop_assert_eq!(y1.to_bits(), y2.to_bits());
            }
            (None, None) => {}
            _ => prop_assert!(false, "results differ"),
        }
    }

    #[test]
    fn crossing_lines_meet(slope in 0.1f64..10.0, offset in -5.0f64..5.0) {
        let xs = [-10.0, 10.0];
        let ys_a = [-10.0 * slope + offset, 10.0 * slope + offset];
        let ys_b = [offset, offset];

        let (x, y) = first_intersection(&xs, &ys_a, &xs, &ys_b).unwrap();
        prop_assert!(approx_equal(x, 0.0, 1.0e-9));
        prop_assert!(approx_equal(y, offset, 1.0e-9));
    }

    #[test]
    fn nice_ticks_are_ordered_and_bounded(
        start in -200.0f64..200.0,
        span in 1.0f64..400.0,
        count in 1usize..40,
    ) {
        let stop = start + span;
        let ticks = nice_ticks(start, stop, count);

        prop_assert!(ticks.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(ticks.iter().all(|&t| t >= start - 1.0e-9 && t <= stop + 1.0e-9));
    }

    #[test]
    fn warm_parcel_has_thermal_top(excess in 0.5f64..5.0, levels in 10usize..60) {
        let snd = synthetic_sounding("warm", levels);
        let samples = snd.sorted_samples();

        let pcl = surface_parcel(&samples).unwrap();
        let start = Kelvin(pcl.temperature.unpack() + excess);
        let env = EnvironmentProfile::from_samples(&samples);

        let traj = parcel_trajectory(&env, 40, pcl.with_temperature(start)).unwrap();
        let p_top = traj.p_thermal_top().unpack();
        prop_assert!(p_top < 1000.0 && p_top > 100.0, "thermal top {}", p_top);
        prop_assert!(!traj.dry().is_empty());
    }
}
