//! Data types describing a sounding handed to the diagram.

use chrono::NaiveDateTime;
use std::fmt::Display;

pub use self::sample::{LevelFlags, Sample};

mod sample;

/// Caller supplied identity of a sounding.
///
/// Plotting a sounding with an id that is already on the diagram redraws that sounding instead of
/// adding a second copy of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundingId(String);

impl SoundingId {
    /// Create a new id.
    pub fn new<S: Into<String>>(id: S) -> Self {
        SoundingId(id.into())
    }

    /// View the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SoundingId {
    fn from(id: &str) -> Self {
        SoundingId::new(id)
    }
}

impl From<String> for SoundingId {
    fn from(id: String) -> Self {
        SoundingId(id)
    }
}

impl Display for SoundingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ascent as handed over by the data layer.
#[derive(Clone, Debug)]
pub struct Sounding {
    id: SoundingId,

    // Description of the source of the sounding.
    source: Option<String>,

    // Launch time of the balloon
    valid_time: Option<NaiveDateTime>,

    samples: Vec<Sample>,
}

impl Sounding {
    /// Create a new, empty sounding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_skewt::Sounding;
    ///
    /// let snd = Sounding::new("11035-2020081600");
    /// assert!(snd.samples().is_empty());
    /// assert_eq!(snd.id().as_str(), "11035-2020081600");
    /// ```
    #[inline]
    pub fn new<I: Into<SoundingId>>(id: I) -> Self {
        Sounding {
            id: id.into(),
            source: None,
            valid_time: None,
            samples: vec![],
        }
    }

    /// Builder method for the levels.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{HectoPascal, Kelvin, Meters};
    /// use sounding_skewt::{Sample, Sounding};
    ///
    /// let snd = Sounding::new("test").with_samples(vec![
    ///     Sample::new(HectoPascal(1000.0))
    ///         .with_height(Meters(0.0))
    ///         .with_temperature(Kelvin(288.15))
    ///         .with_dew_point(Kelvin(283.15)),
    ///     Sample::new(HectoPascal(500.0))
    ///         .with_height(Meters(5500.0))
    ///         .with_temperature(Kelvin(253.15))
    ///         .with_dew_point(Kelvin(243.15)),
    /// ]);
    /// assert_eq!(snd.samples().len(), 2);
    /// ```
    #[inline]
    pub fn with_samples(mut self, samples: Vec<Sample>) -> Self {
        self.samples = samples;
        self
    }

    /// Add a source description to this sounding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_skewt::Sounding;
    ///
    /// let snd = Sounding::new("a").with_source_description("BUFR, fm94".to_owned());
    /// assert_eq!(snd.source_description().unwrap(), "BUFR, fm94");
    ///
    /// let snd = snd.with_source_description(None);
    /// assert!(snd.source_description().is_none());
    /// ```
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Builder method for the launch time.
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// The id of this sounding.
    #[inline]
    pub fn id(&self) -> &SoundingId {
        &self.id
    }

    /// Retrieve a source description for this sounding.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Launch time of the sounding.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    /// The levels in the order they were supplied.
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// A short label for legends, built from the valid time and source description.
    pub fn label(&self) -> String {
        match (self.valid_time, self.source.as_deref()) {
            (Some(vt), Some(src)) => format!("{} {}", vt.format("%Y-%m-%d %H:%MZ"), src),
            (Some(vt), None) => format!("{}", vt.format("%Y-%m-%d %H:%MZ")),
            (None, Some(src)) => src.to_owned(),
            (None, None) => self.id.to_string(),
        }
    }

    /// Copy of the levels with usable pressure, sorted by decreasing pressure.
    ///
    /// The sort is stable so levels reported at the same pressure keep their order.
    pub fn sorted_samples(&self) -> Vec<Sample> {
        let mut samples: Vec<Sample> = self
            .samples
            .iter()
            .filter(|s| s.valid_pressure().is_some())
            .cloned()
            .collect();

        samples.sort_by(|a, b| {
            // Filtered above, so both are valid
            let pa = a.pressure.unpack();
            let pb = b.pressure.unpack();
            pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
        });

        samples
    }
}
