#![warn(missing_docs)]
//! A Skew-T/Log-P diagram engine for radiosonde soundings.
//!
//! The diagram draws overlaid soundings on a skewed, log-pressure grid of isotherms, isobars, dry
//! adiabats, moist adiabats and isohumes, lifts a parcel from the surface of each sounding, and
//! places wind barbs beside the plot. Everything is drawn into a retained [`scene`] that can be
//! written out as SVG.
//!
//! ```
//! use metfor::{HectoPascal, Kelvin, Meters};
//! use sounding_skewt::{PlotOptions, Sample, SkewT, Sounding};
//!
//! let snd = Sounding::new("OAX 2024-05-06 00Z").with_samples(vec![
//!     Sample::new(HectoPascal(1000.0))
//!         .with_height(Meters(0.0))
//!         .with_temperature(Kelvin(288.15))
//!         .with_dew_point(Kelvin(283.15)),
//!     Sample::new(HectoPascal(500.0))
//!         .with_height(Meters(5500.0))
//!         .with_temperature(Kelvin(253.15))
//!         .with_dew_point(Kelvin(243.15)),
//! ]);
//!
//! let mut skewt = SkewT::with_width(600.0).unwrap();
//! assert_eq!(skewt.plot(&snd, PlotOptions::default()), 1);
//!
//! let reading = skewt.move_to_pressure(HectoPascal(700.0)).unwrap();
//! assert!(reading.temperature.is_some());
//! assert!(skewt.to_svg().starts_with("<svg"));
//! ```

//
// API
//
pub use crate::{
    config::SkewTConfig,
    controls::ControlInput,
    diagram::{DataSet, DataSetNodes, PlotOptions, ProbeReading, SkewT},
    error::{Result, SkewTError},
    interpolation::{first_intersection, linear_interpolate_samples, sample_at},
    parcel::{surface_parcel, Parcel},
    parcel_profile::{parcel_trajectory, EnvironmentProfile, ParcelTrajectory},
    sounding::{LevelFlags, Sample, Sounding, SoundingId},
    wind::WindUnit,
};

pub mod background;
pub mod config;
pub mod controls;
pub mod debounce;
pub mod met_formulas;
pub mod parcel_profile;
pub mod projection;
pub mod scene;
pub mod wind;

/// Utility functions and types.
pub mod utility;

//
// Internal use only
//

// Modules
mod diagram;
mod error;
mod interpolation;
mod parcel;
mod sounding;
