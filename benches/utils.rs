use metfor::{HectoPascal, Kelvin, Meters, MetersPSec};
use sounding_skewt::{Sample, Sounding};

/// Soundings of increasing resolution, from a mandatory levels report to a high resolution
/// radiosonde.
pub fn load_all_test_soundings() -> [Sounding; 4] {
    [
        build_sounding("mandatory", 12),
        build_sounding("significant", 40),
        build_sounding("dense", 200),
        build_sounding("high_res", 2000),
    ]
}

fn build_sounding(id: &str, levels: usize) -> Sounding {
    let samples = (0..levels)
        .map(|i| {
            let frac = i as f64 / (levels - 1) as f64;
            let p = 1000.0 * 0.1f64.powf(frac);
            let h = 7400.0 * (1000.0 / p).ln();
            let t = (290.15 - 0.0065 * h).max(216.65);
            // A moist boundary layer under a dry layer aloft
            let spread = if h < 1500.0 { 3.0 } else { 15.0 + 10.0 * frac };

            Sample::new(HectoPascal(p))
                .with_height(Meters(h))
                .with_temperature(Kelvin(t))
                .with_dew_point(Kelvin(t - spread))
                .with_wind((180.0 + 120.0 * frac) % 360.0, MetersPSec(3.0 + 50.0 * frac))
        })
        .collect();

    Sounding::new(id).with_samples(samples)
}
