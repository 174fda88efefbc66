//! Lift a parcel through the environment to find the thermal top, cloud base and cloud top.
use crate::{
    error::{Result, SkewTError},
    interpolation::{first_intersection, sample_at},
    met_formulas::{dew_point, dry_lapse, moist_gradient_t, vapor_pressure},
    parcel::Parcel,
    sounding::Sample,
};
use itertools::izip;
use metfor::{HectoPascal, Kelvin, Meters, Quantity};
use optional::{none, Optioned};

/// A point on a parcel path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    /// Parcel temperature (or dew point for the isohume branch).
    pub temperature: Kelvin,
    /// Pressure
    pub pressure: HectoPascal,
}

/// The environment a parcel is lifted through, as parallel profiles ordered bottom up.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentProfile {
    pressure: Vec<HectoPascal>,
    height: Vec<Meters>,
    temperature: Vec<Kelvin>,
}

impl EnvironmentProfile {
    /// Build the profile from parallel vectors. They must all be the same length.
    pub fn new(
        pressure: Vec<HectoPascal>,
        height: Vec<Meters>,
        temperature: Vec<Kelvin>,
    ) -> Result<Self> {
        if pressure.len() != height.len() || pressure.len() != temperature.len() {
            return Err(SkewTError::InvalidInput);
        }

        Ok(EnvironmentProfile {
            pressure,
            height,
            temperature,
        })
    }

    /// Build the profile from the levels that have a pressure, height, and temperature.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut env = EnvironmentProfile::default();

        samples
            .iter()
            .filter_map(|smpl| {
                let p = smpl.valid_pressure()?;
                let h = smpl.height.into_option().filter(|h| h.unpack().is_finite())?;
                let t = smpl.valid_temperature()?;
                Some((p, h, t))
            })
            .for_each(|(p, h, t)| {
                env.pressure.push(p);
                env.height.push(h);
                env.temperature.push(t);
            });

        env
    }

    /// Number of levels in the profile.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Does the profile have no levels?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }
}

/// Maps between pressure and height using the levels of a sounding.
///
/// Height is linear in the log of pressure between levels, and the end segments are extended
/// beyond the first and last levels.
#[derive(Debug, Clone)]
pub struct PressureHeightScale {
    log_p: Vec<f64>,
    height: Vec<f64>,
}

impl PressureHeightScale {
    /// Build a scale from parallel pressure and height profiles.
    pub fn new(pressure: &[HectoPascal], height: &[Meters]) -> Result<Self> {
        if pressure.len() < 2 || pressure.len() != height.len() {
            return Err(SkewTError::NotEnoughData);
        }

        if pressure.iter().any(|p| !(p.unpack() > 0.0)) {
            return Err(SkewTError::InvalidInput);
        }

        Ok(PressureHeightScale {
            log_p: pressure.iter().map(|p| p.unpack().ln()).collect(),
            height: height.iter().map(|h| h.unpack()).collect(),
        })
    }

    /// Height of a pressure level.
    pub fn height_at(&self, p: HectoPascal) -> Meters {
        Meters(sample_at(&self.log_p, &self.height, p.unpack().ln()).unwrap_or(std::f64::NAN))
    }

    /// Pressure at a height.
    pub fn pressure_at(&self, h: Meters) -> HectoPascal {
        HectoPascal(
            sample_at(&self.height, &self.log_p, h.unpack())
                .unwrap_or(std::f64::NAN)
                .exp(),
        )
    }
}

/// The path of a parcel lifted from its starting level.
#[derive(Debug, Clone)]
pub struct ParcelTrajectory {
    dry: Vec<TrajectoryPoint>,
    moist: Vec<TrajectoryPoint>,
    isohume: Vec<TrajectoryPoint>,
    p_thermal_top: HectoPascal,
    elev_thermal_top: Meters,
    p_cloud_base: Optioned<HectoPascal>,
    p_cloud_top: Optioned<HectoPascal>,
}

impl ParcelTrajectory {
    /// The dry adiabatic part of the ascent, bottom up, ending at the thermal top or cloud base.
    #[inline]
    pub fn dry(&self) -> &[TrajectoryPoint] {
        &self.dry
    }

    /// The saturated part of the ascent, from cloud base to the equilibrium level or top of the
    /// sounding. Empty if the parcel never condenses before hitting the thermal top.
    #[inline]
    pub fn moist(&self) -> &[TrajectoryPoint] {
        &self.moist
    }

    /// The parcel dew point below the cloud base. Empty when there is no cloud.
    #[inline]
    pub fn isohume(&self) -> &[TrajectoryPoint] {
        &self.isohume
    }

    /// Pressure at the top of the dry ascent. This is the cloud base if there is a cloud.
    #[inline]
    pub fn p_thermal_top(&self) -> HectoPascal {
        self.p_thermal_top
    }

    /// Height of the top of the dry ascent.
    #[inline]
    pub fn elev_thermal_top(&self) -> Meters {
        self.elev_thermal_top
    }

    /// Pressure of the lifting condensation level, if it is reached before the thermal top.
    #[inline]
    pub fn p_cloud_base(&self) -> Optioned<HectoPascal> {
        self.p_cloud_base
    }

    /// Pressure at the cloud top. This is the equilibrium level, or the top of the sounding if the
    /// parcel is still buoyant there.
    #[inline]
    pub fn p_cloud_top(&self) -> Optioned<HectoPascal> {
        self.p_cloud_top
    }

    /// The full path, dry then moist.
    pub fn points(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.dry.iter().chain(self.moist.iter())
    }
}

/// A parcel within this many Kelvin of the environment at its start level is touching it.
const START_TOUCH_TOLERANCE: f64 = 1.0e-6;

/// Lift `parcel` through the environment in `steps` equal height increments.
///
/// The parcel rises dry adiabatically, conserving its mixing ratio, until it either becomes colder
/// than the environment (the thermal top) or saturates (the lifting condensation level). When it
/// saturates first it continues moist adiabatically until it becomes colder than the environment
/// again (the equilibrium level), or the top of the environment is reached.
///
/// Fails with `NoIntersection` when the dry ascent never meets the environment temperature curve.
pub fn parcel_trajectory(
    env: &EnvironmentProfile,
    steps: usize,
    parcel: Parcel,
) -> Result<ParcelTrajectory> {
    if steps == 0 || !(parcel.pressure.unpack() > 0.0) {
        return Err(SkewTError::InvalidInput);
    }

    let scale = PressureHeightScale::new(&env.pressure, &env.height)?;

    let env_hgt: Vec<f64> = env.height.iter().map(|h| h.unpack()).collect();
    let env_t: Vec<f64> = env.temperature.iter().map(|t| t.unpack()).collect();

    let mw = parcel.mixing_ratio();

    let min_el = scale.height_at(parcel.pressure).unpack();
    let top_el = *env_hgt.last().ok_or(SkewTError::NotEnoughData)?;
    let max_el = min_el.max(top_el);
    let step_el = (max_el - min_el) / steps as f64;
    if !(step_el > 0.0) {
        return Err(SkewTError::NotEnoughData);
    }

    let mut dry_ghs: Vec<f64> = Vec::with_capacity(steps + 1);
    let mut dry_pressures: Vec<f64> = Vec::with_capacity(steps + 1);
    let mut dry_temps: Vec<f64> = Vec::with_capacity(steps + 1);
    let mut dry_dew_points: Vec<f64> = Vec::with_capacity(steps + 1);

    for i in 0..=steps {
        let elevation = min_el + step_el * i as f64;
        // The start level is exact, not a round trip through the height scale.
        let (p, t) = if i == 0 {
            (parcel.pressure, parcel.temperature)
        } else {
            let p = scale.pressure_at(Meters(elevation));
            (p, dry_lapse(p, parcel.temperature, parcel.pressure))
        };
        let dp = dew_point(vapor_pressure(p, mw));

        dry_ghs.push(elevation);
        dry_pressures.push(p.unpack());
        dry_temps.push(t.unpack());
        dry_dew_points.push(dp.unpack());
    }

    let cloud_base = first_intersection(&dry_ghs, &dry_temps, &dry_ghs, &dry_dew_points);

    // A parcel starting at the environment temperature touches it at the start. Give it one
    // step of depth so there is a dry branch to draw.
    let env_t_start = sample_at(&env_hgt, &env_t, min_el).ok_or(SkewTError::NotEnoughData)?;
    let mut thermal_top = if (dry_temps[0] - env_t_start).abs() <= START_TOUCH_TOLERANCE {
        (dry_ghs[1], dry_temps[1])
    } else {
        first_intersection(&dry_ghs, &dry_temps, &env_hgt, &env_t)
            .ok_or(SkewTError::NoIntersection)?
    };
    if thermal_top.0 <= min_el + step_el * 1.0e-6 {
        thermal_top = (dry_ghs[1], dry_temps[1]);
    }

    let mut moist = vec![];
    let mut isohume = vec![];
    let mut p_cloud_base = none();
    let mut p_cloud_top = none();

    if let Some(cloud_base) = cloud_base.filter(|cb| cb.0 < thermal_top.0) {
        thermal_top = cloud_base;

        let p_cb = scale.pressure_at(Meters(cloud_base.0));
        p_cloud_base = Optioned::from(p_cb);

        let mut moist_ghs: Vec<f64> = vec![];
        let mut moist_temps: Vec<f64> = vec![];
        let mut t = cloud_base.1;
        let mut prev_p = p_cb.unpack();

        let mut i: u32 = 0;
        loop {
            let elevation = cloud_base.0 + step_el * f64::from(i);
            if elevation >= max_el + step_el {
                break;
            }

            let p = scale.pressure_at(Meters(elevation));
            t += (p.unpack() - prev_p) * moist_gradient_t(p, Kelvin(t));
            prev_p = p.unpack();

            moist_ghs.push(elevation);
            moist_temps.push(t);
            moist.push(TrajectoryPoint {
                temperature: Kelvin(t),
                pressure: p,
            });
            i += 1;
        }

        isohume = izip!(&dry_dew_points, &dry_pressures)
            .filter(|&(_, &p)| p > p_cb.unpack())
            .map(|(&td, &p)| TrajectoryPoint {
                temperature: Kelvin(td),
                pressure: HectoPascal(p),
            })
            .collect();
        isohume.push(TrajectoryPoint {
            temperature: Kelvin(cloud_base.1),
            pressure: p_cb,
        });

        let mut p_ct = *env.pressure.last().ok_or(SkewTError::NotEnoughData)?;
        if let Some(equilibrium) = first_intersection(&moist_ghs, &moist_temps, &env_hgt, &env_t)
        {
            p_ct = scale.pressure_at(Meters(equilibrium.0));
            moist.retain(|pt| pt.pressure >= p_ct);
            moist.push(TrajectoryPoint {
                temperature: Kelvin(equilibrium.1),
                pressure: p_ct,
            });
        }
        p_cloud_top = Optioned::from(p_ct);
    }

    let p_thermal_top = scale.pressure_at(Meters(thermal_top.0));
    let mut dry: Vec<TrajectoryPoint> = izip!(&dry_temps, &dry_pressures)
        .filter(|&(_, &p)| p > p_thermal_top.unpack())
        .map(|(&t, &p)| TrajectoryPoint {
            temperature: Kelvin(t),
            pressure: HectoPascal(p),
        })
        .collect();
    dry.push(TrajectoryPoint {
        temperature: Kelvin(thermal_top.1),
        pressure: p_thermal_top,
    });

    Ok(ParcelTrajectory {
        dry,
        moist,
        isohume,
        p_thermal_top,
        elev_thermal_top: Meters(thermal_top.0),
        p_cloud_base,
        p_cloud_top,
    })
}
