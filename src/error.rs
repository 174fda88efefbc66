//! Error types for the sounding-skewt crate.
use thiserror::Error;

/// Error type for the crate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum SkewTError {
    /// Not enough data available for the computation.
    #[error("not enough data available for analysis")]
    NotEnoughData,
    /// Bad or invalid input.
    #[error("invalid input")]
    InvalidInput,
    /// Two curves that were expected to cross never did.
    #[error("curves do not intersect")]
    NoIntersection,
    /// A value (surface value, level, etc) that is required is not available.
    #[error("missing value required for analysis")]
    MissingValue,
    /// Missing data during interpolation, or it would have been extrapolation.
    #[error("none value encountered during interpolation")]
    InterpolationError,
    /// No sounding with the requested id is plotted.
    #[error("no sounding with that id is plotted")]
    UnknownSounding,
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, SkewTError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(SkewTError::NoIntersection.to_string(), "curves do not intersect");
        assert_eq!(
            SkewTError::UnknownSounding.to_string(),
            "no sounding with that id is plotted"
        );

        let err: Box<dyn std::error::Error> = Box::new(SkewTError::InvalidInput);
        assert_eq!(err.to_string(), "invalid input");
    }
}
