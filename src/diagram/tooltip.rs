use crate::{
    projection::Projection,
    scene::{Layer, NodeId, Scene, Shape, TextAnchor},
    sounding::Sample,
    utility::round_to,
    wind::WindUnit,
};
use metfor::{Celsius, HectoPascal, Meters, MetersPSec, Quantity, WindSpdDir};
use optional::Optioned;

/// The values under the pointer probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReading {
    /// Pressure probed.
    pub pressure: HectoPascal,
    /// Interpolated height.
    pub height: Optioned<Meters>,
    /// Interpolated temperature.
    pub temperature: Optioned<Celsius>,
    /// Interpolated dew point.
    pub dew_point: Optioned<Celsius>,
    /// Interpolated wind.
    pub wind: Optioned<WindSpdDir<MetersPSec>>,
    /// Wind speed in the display unit, rounded to 0.1.
    pub wind_speed: Optioned<f64>,
    /// The display unit of `wind_speed`.
    pub wind_unit: WindUnit,
    /// Free text attached to the nearest level.
    pub note: Option<String>,
}

impl ProbeReading {
    pub(crate) fn from_sample(pressure: HectoPascal, sample: &Sample, unit: WindUnit) -> Self {
        let wind = sample.valid_wind();

        ProbeReading {
            pressure,
            height: sample.height,
            temperature: sample.valid_temperature().map(Celsius::from).into(),
            dew_point: sample.valid_dew_point().map(Celsius::from).into(),
            wind: wind.into(),
            wind_speed: wind
                .map(|w| round_to(unit.convert(w.speed), 1))
                .into(),
            wind_unit: unit,
            note: sample.tooltip.clone(),
        }
    }
}

/// The nodes of the synchronized multi-field read out.
#[derive(Debug, Clone)]
pub(crate) struct Tooltip {
    temp_focus: NodeId,
    temp_text: NodeId,
    dwpt_focus: NodeId,
    dwpt_text: NodeId,
    height_text: NodeId,
    wind_text: NodeId,
    wind_arrow: NodeId,
    note_text: NodeId,
}

impl Tooltip {
    /// Create the nodes, hidden.
    pub(crate) fn new(scene: &mut Scene) -> Self {
        let circle = || Shape::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 4.0,
        };
        let text = |anchor| Shape::Text {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            anchor,
            content: String::new(),
        };

        let tooltip = Tooltip {
            temp_focus: scene.add(Layer::Tooltips, circle(), "focus tmpc"),
            temp_text: scene.add(Layer::Tooltips, text(TextAnchor::Start), "focus tmpc"),
            dwpt_focus: scene.add(Layer::Tooltips, circle(), "focus dwpc"),
            dwpt_text: scene.add(Layer::Tooltips, text(TextAnchor::End), "focus dwpc"),
            height_text: scene.add(Layer::Tooltips, text(TextAnchor::Start), "focus"),
            wind_text: scene.add(Layer::Tooltips, text(TextAnchor::Start), "focus windspeed"),
            wind_arrow: scene.add(
                Layer::Tooltips,
                text(TextAnchor::Middle),
                "skewt-wind-arrow",
            ),
            note_text: scene.add(Layer::Tooltips, text(TextAnchor::Start), "focus note"),
        };
        tooltip.hide(scene);

        tooltip
    }

    fn nodes(&self) -> [NodeId; 8] {
        [
            self.temp_focus,
            self.temp_text,
            self.dwpt_focus,
            self.dwpt_text,
            self.height_text,
            self.wind_text,
            self.wind_arrow,
            self.note_text,
        ]
    }

    pub(crate) fn hide(&self, scene: &mut Scene) {
        for &id in &self.nodes() {
            scene.set_hidden(id, true);
        }
    }

    /// Move the read out to the reading and show the fields that have values.
    ///
    /// The tooltip layer does not pan, so the pan offset is added to x positions here.
    pub(crate) fn update(&self, scene: &mut Scene, proj: &Projection, reading: &ProbeReading) {
        let p = reading.pressure;
        let y = match proj.pressure_to_y(p) {
            Some(y) => y,
            None => return self.hide(scene),
        };
        let x_offset = proj.x_offset();

        let mut place_point = |focus: NodeId, text: NodeId, t: Optioned<Celsius>, dx: f64| {
            match t.into_option().and_then(|t| proj.to_screen(t, p)) {
                Some((x, _)) => {
                    let x = x + x_offset;
                    scene.set_shape(
                        focus,
                        Shape::Circle {
                            cx: x,
                            cy: y,
                            r: 4.0,
                        },
                    );
                    let anchor = if dx < 0.0 {
                        TextAnchor::End
                    } else {
                        TextAnchor::Start
                    };
                    scene.set_shape(
                        text,
                        Shape::Text {
                            x: x + dx,
                            y,
                            rotation: 0.0,
                            anchor,
                            content: format!("{:.0}°C", t.unpack().unpack()),
                        },
                    );
                    scene.set_hidden(focus, false);
                    scene.set_hidden(text, false);
                }
                None => {
                    scene.set_hidden(focus, true);
                    scene.set_hidden(text, true);
                }
            }
        };

        place_point(self.temp_focus, self.temp_text, reading.temperature, 9.0);
        place_point(self.dwpt_focus, self.dwpt_text, reading.dew_point, -9.0);

        match reading.height.into_option() {
            Some(h) => {
                scene.set_shape(
                    self.height_text,
                    Shape::Text {
                        x: 0.0,
                        y,
                        rotation: 0.0,
                        anchor: TextAnchor::Start,
                        content: format!("- {:.0} m", h.unpack()),
                    },
                );
                scene.set_hidden(self.height_text, false);
            }
            None => scene.set_hidden(self.height_text, true),
        }

        let wind_x = proj.width() - 60.0;
        match (reading.wind.into_option(), reading.wind_speed.into_option()) {
            (Some(wind), Some(speed)) => {
                scene.set_shape(
                    self.wind_text,
                    Shape::Text {
                        x: wind_x + 10.0,
                        y,
                        rotation: 0.0,
                        anchor: TextAnchor::Start,
                        content: format!("{} {}", speed, reading.wind_unit.label()),
                    },
                );
                scene.set_shape(
                    self.wind_arrow,
                    Shape::Text {
                        x: wind_x,
                        y,
                        rotation: wind.direction,
                        anchor: TextAnchor::Middle,
                        content: "\u{21e9}".to_owned(),
                    },
                );
                scene.set_hidden(self.wind_text, false);
                scene.set_hidden(self.wind_arrow, false);
            }
            _ => {
                scene.set_hidden(self.wind_text, true);
                scene.set_hidden(self.wind_arrow, true);
            }
        }

        match reading.note.as_ref().filter(|note| !note.is_empty()) {
            Some(note) => {
                scene.set_shape(
                    self.note_text,
                    Shape::Text {
                        x: 0.0,
                        y: y + 14.0,
                        rotation: 0.0,
                        anchor: TextAnchor::Start,
                        content: note.clone(),
                    },
                );
                scene.set_hidden(self.note_text, false);
            }
            None => scene.set_hidden(self.note_text, true),
        }
    }

    /// Are any of the fields showing?
    pub(crate) fn is_visible(&self, scene: &Scene) -> bool {
        self.nodes()
            .iter()
            .any(|&id| scene.get(id).map(|n| !n.hidden).unwrap_or(false))
    }
}
