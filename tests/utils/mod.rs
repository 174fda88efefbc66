use metfor::{HectoPascal, Kelvin, Meters, MetersPSec};
use sounding_skewt::{Sample, Sounding};

#[allow(dead_code)] // Not every test binary uses every helper
pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    assert!(eps > 0.0);

    (val1 - val2).abs() < eps
}

/// A short sounding with a warm, moist surface and a cold top.
#[allow(dead_code)]
pub fn three_level_sounding(id: &str) -> Sounding {
    Sounding::new(id).with_samples(vec![
        Sample::new(HectoPascal(1000.0))
            .with_height(Meters(0.0))
            .with_temperature(Kelvin(288.15))
            .with_dew_point(Kelvin(283.15))
            .with_wind(180.0, MetersPSec(5.0)),
        Sample::new(HectoPascal(500.0))
            .with_height(Meters(5500.0))
            .with_temperature(Kelvin(253.15))
            .with_dew_point(Kelvin(243.15))
            .with_wind(250.0, MetersPSec(20.0)),
        Sample::new(HectoPascal(200.0))
            .with_height(Meters(11800.0))
            .with_temperature(Kelvin(223.15))
            .with_dew_point(Kelvin(213.15))
            .with_wind(270.0, MetersPSec(45.0)),
    ])
}

/// A standard atmosphere like sounding with `levels` levels spaced evenly in log-pressure from
/// 1000 hPa to 100 hPa.
#[allow(dead_code)]
pub fn synthetic_sounding(id: &str, levels: usize) -> Sounding {
    assert!(levels > 1);

    let samples = (0..levels)
        .map(|i| {
            let frac = i as f64 / (levels - 1) as f64;
            let p = 1000.0 * 0.1f64.powf(frac);
            let h = 7400.0 * (1000.0 / p).ln();
            let t = (288.15 - 0.0065 * h).max(216.65);
            let td = t - 20.0 - 10.0 * frac;

            Sample::new(HectoPascal(p))
                .with_height(Meters(h))
                .with_temperature(Kelvin(t))
                .with_dew_point(Kelvin(td))
                .with_wind((200.0 + 100.0 * frac) % 360.0, MetersPSec(5.0 + 40.0 * frac))
        })
        .collect();

    Sounding::new(id).with_samples(samples)
}
