//! The user adjustable parameters of the diagram.
//!
//! The controls only hold and validate values; [`SkewT::handle_input`](crate::SkewT::handle_input)
//! applies them to the projection and redraws.
use crate::background::BackgroundLayer;
use std::collections::BTreeSet;

/// A bounded value that moves in fixed steps, like a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeControl {
    min: f64,
    max: f64,
    step: f64,
    value: f64,
}

impl RangeControl {
    /// Create a control. The initial value is clamped but not snapped to a step.
    pub fn new(min: f64, max: f64, step: f64, value: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        RangeControl {
            min,
            max,
            step,
            value: clamp(value, min, max),
        }
    }

    /// Set the value from user input. It is snapped to the nearest step above the minimum and
    /// clamped to the range, the value actually used is returned.
    ///
    /// ```
    /// use sounding_skewt::controls::RangeControl;
    ///
    /// let mut top = RangeControl::new(100.0, 900.0, 50.0, 100.0);
    /// assert_eq!(top.set(322.0), 300.0);
    /// assert_eq!(top.set(2000.0), 900.0);
    /// ```
    pub fn set(&mut self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.value;
        }

        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        self.value = clamp(snapped, self.min, self.max);

        self.value
    }

    /// Set the value without snapping, for values derived from other controls.
    pub fn force(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value;
        }
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Smallest value.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Step size.
    pub fn step(&self) -> f64 {
        self.step
    }
}

fn clamp(val: f64, min: f64, max: f64) -> f64 {
    val.max(min).min(max)
}

/// An input event from the control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    /// Skew gradient slider, degrees.
    Gradient(f64),
    /// Top pressure slider, hPa.
    TopPressure(f64),
    /// Parcel start temperature slider, °C. Applies to the selected sounding.
    ParcelTemperature(f64),
    /// Flip the highlight of a kind of background line.
    ToggleHighlight(BackgroundLayer),
    /// Whether changing the top pressure also changes the gradient.
    AdjustGradient(bool),
}

impl ControlInput {
    /// Range inputs put the diagram into its coarse moving mode until they settle.
    pub fn is_range(self) -> bool {
        matches!(
            self,
            ControlInput::Gradient(_)
                | ControlInput::TopPressure(_)
                | ControlInput::ParcelTemperature(_)
        )
    }
}

/// State of all of the controls.
#[derive(Debug, Clone)]
pub struct ControlSurface {
    /// Skew gradient, degrees.
    pub gradient: RangeControl,
    /// Top pressure, hPa.
    pub top_pressure: RangeControl,
    /// Parcel start temperature of the selected sounding, °C.
    pub parcel_temperature: RangeControl,
    /// Changing the top pressure keeps the visual slope of the isotherms.
    pub adjust_gradient: bool,
    highlighted: BTreeSet<BackgroundLayer>,
}

/// Half width of the parcel temperature control around the surface temperature, °C.
pub const PARCEL_TEMPERATURE_SPAN: f64 = 50.0;

impl ControlSurface {
    /// Controls with the given initial gradient and top pressure.
    pub fn new(gradient: f64, top_pressure: f64, adjust_gradient: bool) -> Self {
        ControlSurface {
            gradient: RangeControl::new(0.0, 85.0, 5.0, gradient),
            top_pressure: RangeControl::new(100.0, 900.0, 50.0, top_pressure),
            parcel_temperature: RangeControl::new(
                -PARCEL_TEMPERATURE_SPAN,
                PARCEL_TEMPERATURE_SPAN,
                2.0,
                0.0,
            ),
            adjust_gradient,
            highlighted: BTreeSet::new(),
        }
    }

    /// Center the parcel temperature control on a surface temperature and set its value.
    pub fn reset_parcel_temperature(&mut self, surface_c: f64, value_c: f64) {
        self.parcel_temperature = RangeControl::new(
            surface_c - PARCEL_TEMPERATURE_SPAN,
            surface_c + PARCEL_TEMPERATURE_SPAN,
            2.0,
            (value_c * 10.0).round() / 10.0,
        );
    }

    /// Flip the highlight of a kind of background line, returns the new state.
    pub fn toggle_highlight(&mut self, layer: BackgroundLayer) -> bool {
        if self.highlighted.remove(&layer) {
            false
        } else {
            self.highlighted.insert(layer);
            true
        }
    }

    /// Is this kind of background line highlighted?
    pub fn is_highlighted(&self, layer: BackgroundLayer) -> bool {
        self.highlighted.contains(&layer)
    }

    /// All of the highlighted kinds of background line.
    pub fn highlighted(&self) -> &BTreeSet<BackgroundLayer> {
        &self.highlighted
    }
}

/// The gradient that keeps isotherms at the same visual slope when the log-pressure depth of the
/// diagram is scaled by `depth_ratio` (new depth over old depth).
///
/// ```
/// use sounding_skewt::controls::adjusted_gradient;
///
/// assert!((adjusted_gradient(45.0, 1.0) - 45.0).abs() < 1.0e-9);
/// // Half the depth, the same pixels now cover twice the pressure range
/// assert!((adjusted_gradient(45.0, 0.5) - 63.434948822922).abs() < 1.0e-9);
/// ```
pub fn adjusted_gradient(gradient_deg: f64, depth_ratio: f64) -> f64 {
    (gradient_deg.to_radians().tan() / depth_ratio)
        .atan()
        .to_degrees()
}

/// The temperature range that keeps isotherms at the same visual slope when the log-pressure
/// depth of the diagram is scaled by `depth_ratio`.
pub fn adjusted_temp_range(temp_range: f64, depth_ratio: f64) -> f64 {
    temp_range * depth_ratio
}
