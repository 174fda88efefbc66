//! The parcel lifted on the diagram.

use crate::{
    error::{Result, SkewTError},
    met_formulas::{mixing_ratio, saturation_vapor_pressure},
    sounding::Sample,
};
use metfor::{HectoPascal, Kelvin};

/// Variables defining a parcel as used in parcel analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcel {
    /// Temperature in Kelvin
    pub temperature: Kelvin,
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Dew point in Kelvin
    pub dew_point: Kelvin,
}

impl Parcel {
    /// Get the mixing ratio of the parcel, kg/kg.
    #[inline]
    pub fn mixing_ratio(&self) -> f64 {
        mixing_ratio(saturation_vapor_pressure(self.dew_point), self.pressure)
    }

    /// The same parcel with a different starting temperature.
    #[inline]
    pub fn with_temperature(self, temperature: Kelvin) -> Self {
        Parcel {
            temperature,
            ..self
        }
    }
}

/// Get a surface parcel.
///
/// This is the lowest level with a usable pressure. It must also have a temperature and dew point,
/// levels higher up are not searched.
pub fn surface_parcel(samples: &[Sample]) -> Result<Parcel> {
    let sfc = samples
        .iter()
        .find(|smpl| smpl.valid_pressure().is_some())
        .ok_or(SkewTError::NotEnoughData)?;

    sfc.valid_pressure()
        .and_then(|pressure| {
            sfc.valid_temperature().and_then(|temperature| {
                sfc.valid_dew_point().map(|dew_point| Parcel {
                    temperature,
                    pressure,
                    dew_point,
                })
            })
        })
        .ok_or(SkewTError::MissingValue)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;
    use metfor::Quantity;

    #[test]
    fn test_surface_parcel() {
        let samples = vec![
            Sample::default(),
            Sample::new(HectoPascal(1000.0))
                .with_temperature(Kelvin(288.15))
                .with_dew_point(Kelvin(283.15)),
            Sample::new(HectoPascal(500.0))
                .with_temperature(Kelvin(253.15))
                .with_dew_point(Kelvin(243.15)),
        ];

        let pcl = surface_parcel(&samples).unwrap();
        assert_eq!(pcl.pressure, HectoPascal(1000.0));
        assert_eq!(pcl.temperature, Kelvin(288.15));
        assert_eq!(pcl.dew_point, Kelvin(283.15));

        // About 7.7 g/kg
        assert!(approx_equal(pcl.mixing_ratio(), 0.0077, 0.0003));
        assert_eq!(
            pcl.with_temperature(Kelvin(290.0)).temperature.unpack(),
            290.0
        );
    }

    #[test]
    fn test_surface_parcel_missing_dew_point() {
        let samples = vec![Sample::new(HectoPascal(1000.0)).with_temperature(Kelvin(288.15))];
        assert_eq!(surface_parcel(&samples), Err(SkewTError::MissingValue));
        assert_eq!(surface_parcel(&[]), Err(SkewTError::NotEnoughData));
    }
}
