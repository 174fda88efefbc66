//! Run these benches with `cargo bench --bench parcel_trajectory -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(parcel_trajectory_benches);

criterion_group!(
    name = parcel_trajectory_benches;
    config = build_tester();
    targets = parcel_trajectory_bench, moving_parcel_trajectory_bench, first_intersection_bench
);

fn parcel_trajectory_bench(c: &mut Criterion) {
    use sounding_skewt::{EnvironmentProfile, Parcel};

    let snds = utils::load_all_test_soundings();

    let pairs: Vec<(EnvironmentProfile, Parcel)> = snds
        .iter()
        .map(|snd| {
            let samples = snd.sorted_samples();
            let parcel = sounding_skewt::surface_parcel(&samples).unwrap();
            (EnvironmentProfile::from_samples(&samples), parcel)
        })
        .collect();

    c.bench_function("parcel_trajectory", |b| {
        b.iter(|| {
            for (env, parcel) in &pairs {
                let _x = sounding_skewt::parcel_trajectory(env, 40, *parcel).expect("oops");
            }
        });
    });
}

fn moving_parcel_trajectory_bench(c: &mut Criterion) {
    use sounding_skewt::{EnvironmentProfile, Parcel};

    let snds = utils::load_all_test_soundings();

    let pairs: Vec<(EnvironmentProfile, Parcel)> = snds
        .iter()
        .map(|snd| {
            let samples = snd.sorted_samples();
            let parcel = sounding_skewt::surface_parcel(&samples).unwrap();
            (EnvironmentProfile::from_samples(&samples), parcel)
        })
        .collect();

    c.bench_function("moving_parcel_trajectory", |b| {
        b.iter(|| {
            for (env, parcel) in &pairs {
                let _x = sounding_skewt::parcel_trajectory(env, 5, *parcel).expect("oops");
            }
        });
    });
}

fn first_intersection_bench(c: &mut Criterion) {
    let xs: Vec<f64> = (0..2000).map(|i| i as f64 * 6.0).collect();
    let ys_a: Vec<f64> = xs.iter().map(|x| 300.0 - 0.0098 * x).collect();
    let ys_b: Vec<f64> = xs.iter().map(|x| 290.0 - 0.0065 * x).collect();

    c.bench_function("first_intersection", |b| {
        b.iter(|| sounding_skewt::first_intersection(&xs, &ys_a, &xs, &ys_b));
    });
}
