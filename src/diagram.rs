//! The Skew-T diagram: plotted soundings, their overlays, and the pointer probe.
pub use self::tooltip::ProbeReading;

use crate::{
    background::{project_curve, Background, BackgroundLayer},
    config::SkewTConfig,
    controls::{adjusted_gradient, adjusted_temp_range, ControlInput, ControlSurface},
    debounce::SettleTimer,
    error::{Result, SkewTError},
    interpolation::linear_interp_samples,
    parcel::surface_parcel,
    parcel_profile::{parcel_trajectory, EnvironmentProfile, ParcelTrajectory},
    projection::Projection,
    scene::{Layer, NodeId, Scene, Shape, TextAnchor},
    sounding::{Sample, Sounding, SoundingId},
    utility::decimate,
    wind::{barb_rotation, BarbLibrary},
};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
use std::time::Instant;
use strum::IntoEnumIterator;
use tracing::{debug, trace};

mod tooltip;

use self::tooltip::Tooltip;

/// Options for [`SkewT::plot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlotOptions {
    /// Keep the soundings already plotted. When false they are all cleared first.
    pub add: bool,
    /// Make this the selected sounding.
    pub select: bool,
}

impl PlotOptions {
    /// Options to overlay a sounding on those already plotted.
    pub fn add() -> Self {
        PlotOptions {
            add: true,
            select: false,
        }
    }

    /// Builder method to also select the sounding.
    pub fn and_select(self) -> Self {
        PlotOptions {
            select: true,
            ..self
        }
    }
}

/// Handles to the rendered parts of a plotted sounding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSetNodes {
    /// Temperature curve.
    pub temperature: Option<NodeId>,
    /// Dew point curve.
    pub dew_point: Option<NodeId>,
    /// Lifted parcel curve, only when the parcel could be lifted.
    pub parcel: Option<NodeId>,
    /// Label at the top of the wind barb column.
    pub label: Option<NodeId>,
    /// Wind barb instances.
    pub barbs: Vec<NodeId>,
}

impl DataSetNodes {
    fn all(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.temperature
            .iter()
            .chain(self.dew_point.iter())
            .chain(self.parcel.iter())
            .chain(self.label.iter())
            .chain(self.barbs.iter())
            .copied()
    }

    fn remove_from(&mut self, scene: &mut Scene) {
        for id in self.all() {
            scene.remove(id);
        }
        *self = DataSetNodes::default();
    }
}

/// A sounding plotted on the diagram.
#[derive(Debug, Clone)]
pub struct DataSet {
    id: SoundingId,
    label: String,
    samples: Vec<Sample>,
    surface_temperature: Option<Celsius>,
    parcel_temperature: Option<Celsius>,
    trajectory: Option<ParcelTrajectory>,
    nodes: DataSetNodes,
}

impl DataSet {
    fn new(snd: &Sounding, samples: Vec<Sample>) -> Self {
        let surface_temperature = surface_temperature(&samples);

        DataSet {
            id: snd.id().clone(),
            label: snd.label(),
            samples,
            surface_temperature,
            parcel_temperature: surface_temperature,
            trajectory: None,
            nodes: DataSetNodes::default(),
        }
    }

    /// The sounding id.
    pub fn id(&self) -> &SoundingId {
        &self.id
    }

    /// Label drawn with the sounding.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The levels with usable pressure, sorted by decreasing pressure.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Temperature the parcel is lifted from.
    pub fn parcel_temperature(&self) -> Option<Celsius> {
        self.parcel_temperature
    }

    /// The parcel path from the last draw.
    pub fn trajectory(&self) -> Option<&ParcelTrajectory> {
        self.trajectory.as_ref()
    }

    /// Handles to the rendered parts.
    pub fn nodes(&self) -> &DataSetNodes {
        &self.nodes
    }
}

fn surface_temperature(samples: &[Sample]) -> Option<Celsius> {
    samples
        .first()
        .and_then(Sample::valid_temperature)
        .map(Celsius::from)
}

/// A Skew-T/Log-P diagram.
#[derive(Debug)]
pub struct SkewT {
    config: SkewTConfig,
    proj: Projection,
    scene: Scene,
    background: Background,
    barbs: BarbLibrary,
    tooltip: Tooltip,
    capture: NodeId,
    controls: ControlSurface,

    data_sets: Vec<DataSet>,
    selected: Option<SoundingId>,
    // Selected sounding by increasing pressure, for the probe
    probe: Vec<Sample>,

    moving: bool,
    settle: SettleTimer,
    drag_anchor: Option<f64>,
}

// Plot area for an outer width. The diagram is square.
fn plot_size(width: f64, config: &SkewTConfig) -> (f64, f64) {
    let m = &config.margins;
    (
        (width - m.left - m.right).max(0.0),
        (width - m.top - m.bottom).max(0.0),
    )
}

impl SkewT {
    /// Create an empty diagram `width` pixels wide, with the background drawn.
    pub fn new(width: f64, config: SkewTConfig) -> Result<Self> {
        config.validate()?;
        if !width.is_finite() {
            return Err(SkewTError::InvalidInput);
        }

        let (w, h) = plot_size(width, &config);
        let proj = Projection::new(
            w,
            h,
            config.gradient_deg,
            HectoPascal(config.base_pressure_hpa),
            HectoPascal(config.top_pressure_hpa),
            Celsius(config.mid_temp_c),
            config.temp_range_c,
        )?;

        let m = config.margins;
        let mut scene = Scene::new(w, h).with_margins(m.top, m.right, m.bottom, m.left);

        let barbs = BarbLibrary::new(config.barb_size);
        barbs.install(&mut scene);

        let tooltip = Tooltip::new(&mut scene);
        let capture = scene.add(
            Layer::Tooltips,
            Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: w,
                height: h,
            },
            "overlay",
        );

        let controls = ControlSurface::new(
            config.gradient_deg,
            config.top_pressure_hpa,
            config.adjust_gradient,
        );
        let settle = SettleTimer::new(config.settle_delay());

        let mut skewt = SkewT {
            config,
            proj,
            scene,
            background: Background::default(),
            barbs,
            tooltip,
            capture,
            controls,
            data_sets: vec![],
            selected: None,
            probe: vec![],
            moving: false,
            settle,
            drag_anchor: None,
        };
        skewt.draw_background();

        Ok(skewt)
    }

    /// Create a diagram with the default configuration.
    pub fn with_width(width: f64) -> Result<Self> {
        SkewT::new(width, SkewTConfig::default())
    }

    /// Plot a sounding and return the number of soundings plotted.
    ///
    /// A sounding whose id is already plotted is redrawn with the new samples and keeps its parcel
    /// temperature, otherwise a new data set is created. Soundings with no samples are ignored.
    pub fn plot(&mut self, snd: &Sounding, opts: PlotOptions) -> usize {
        let samples = snd.sorted_samples();
        if samples.is_empty() {
            debug!(id = %snd.id(), "ignoring sounding with no usable samples");
            return self.data_sets.len();
        }

        if !opts.add {
            self.clear();
        }

        let idx = match self.index_of(snd.id()) {
            Some(idx) => {
                let ds = &mut self.data_sets[idx];
                ds.surface_temperature = surface_temperature(&samples);
                if ds.parcel_temperature.is_none() {
                    ds.parcel_temperature = ds.surface_temperature;
                }
                ds.samples = samples;
                ds.label = snd.label();
                debug!(id = %snd.id(), "redrawing sounding");
                idx
            }
            None => {
                self.data_sets.push(DataSet::new(snd, samples));
                debug!(id = %snd.id(), "new sounding");
                self.data_sets.len() - 1
            }
        };

        self.draw_data_set(idx);

        // Reselecting also refreshes the probe samples of a redrawn selected sounding
        let reselect = self.selected.as_ref() == Some(snd.id());
        if opts.select || reselect || self.data_sets.len() == 1 {
            // The id was just plotted
            let _ = self.select_skewt(snd.id());
        } else {
            self.apply_highlights();
        }

        self.data_sets.len()
    }

    /// Remove every sounding, keeping the background.
    pub fn clear(&mut self) {
        for ds in &mut self.data_sets {
            ds.nodes.remove_from(&mut self.scene);
        }
        self.data_sets.clear();
        self.selected = None;
        self.probe.clear();
        self.tooltip.hide(&mut self.scene);

        debug!("cleared all soundings");
    }

    /// Remove only the background grid and axes.
    pub fn clear_background(&mut self) {
        self.background.clear(&mut self.scene);
    }

    /// Redraw the background grid and axes.
    pub fn draw_background(&mut self) {
        self.background.clear(&mut self.scene);
        self.background = Background::draw(
            &mut self.scene,
            &self.proj,
            &self.config,
            self.moving,
            self.controls.highlighted(),
        );
    }

    /// Remove one sounding. If it was selected the first remaining sounding becomes selected.
    pub fn remove(&mut self, id: &SoundingId) -> Result<()> {
        let idx = self.index_of(id).ok_or(SkewTError::UnknownSounding)?;

        let mut ds = self.data_sets.remove(idx);
        ds.nodes.remove_from(&mut self.scene);

        // Barb columns are placed by index
        for i in idx..self.data_sets.len() {
            self.draw_data_set(i);
        }
        self.apply_highlights();

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            self.probe.clear();
            self.tooltip.hide(&mut self.scene);
            if let Some(first) = self.data_sets.first().map(|ds| ds.id.clone()) {
                self.select_skewt(&first)?;
            }
        }

        debug!(id = %id, remaining = self.data_sets.len(), "removed sounding");
        Ok(())
    }

    /// Select a plotted sounding. It is highlighted, the probe samples it, and the parcel
    /// temperature control is moved to it.
    pub fn select_skewt(&mut self, id: &SoundingId) -> Result<()> {
        let idx = self.index_of(id).ok_or(SkewTError::UnknownSounding)?;

        self.selected = Some(id.clone());
        self.apply_highlights();

        let ds = &self.data_sets[idx];
        self.probe = ds.samples.iter().rev().cloned().collect();

        if let (Some(sfc), Some(parcel)) = (ds.surface_temperature, ds.parcel_temperature) {
            self.controls
                .reset_parcel_temperature(sfc.unpack(), parcel.unpack());
        }

        self.tooltip.hide(&mut self.scene);
        trace!(id = %id, "selected sounding");
        Ok(())
    }

    /// Apply a control surface input.
    ///
    /// Range inputs hide the tooltip, switch to the coarse moving mode, and schedule the full
    /// redraw for when input settles.
    pub fn handle_input(&mut self, input: ControlInput, now: Instant) {
        if input.is_range() {
            self.tooltip.hide(&mut self.scene);
            self.moving = true;
            self.settle.reschedule(now);
        }

        match input {
            ControlInput::Gradient(val) => {
                let val = self.controls.gradient.set(val);
                self.proj.set_gradient(val);
                self.redraw();
            }
            ControlInput::TopPressure(val) => {
                let new_top = self.controls.top_pressure.set(val);
                self.set_top_pressure(HectoPascal(new_top));
                self.redraw();
            }
            ControlInput::ParcelTemperature(val) => {
                let val = self.controls.parcel_temperature.set(val);
                if let Some(idx) = self.selected_index() {
                    self.data_sets[idx].parcel_temperature = Some(Celsius(val));
                    self.draw_parcel(idx);
                }
            }
            ControlInput::ToggleHighlight(layer) => {
                let on = self.controls.toggle_highlight(layer);
                self.background.set_highlight(&mut self.scene, layer, on);
            }
            ControlInput::AdjustGradient(on) => self.controls.adjust_gradient = on,
        }
    }

    fn set_top_pressure(&mut self, new_top: HectoPascal) {
        let ratio = match self.proj.depth_ratio(new_top) {
            Ok(ratio) => ratio,
            Err(err) => {
                debug!(top = new_top.unpack(), %err, "top pressure rejected");
                return;
            }
        };

        if self.controls.adjust_gradient {
            let gradient = adjusted_gradient(self.proj.gradient(), ratio);
            self.proj.set_gradient(gradient);
            self.controls.gradient.force(self.proj.gradient());
        } else {
            let range = adjusted_temp_range(self.proj.temp_range(), ratio);
            let mid = self.proj.mid_temp();
            if let Err(err) = self.proj.set_temperature_range(mid, range) {
                debug!(%err, "temperature range rejected");
                return;
            }
        }

        let base = self.proj.base_pressure();
        if let Err(err) = self.proj.set_pressure_range(base, new_top) {
            debug!(%err, "pressure range rejected");
        }
    }

    /// Run the settle task if it is due: leave moving mode and redraw at full resolution.
    /// Returns whether it ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.settle.poll(now) {
            return false;
        }

        self.moving = false;
        self.redraw();
        debug!("interaction settled, full redraw");
        true
    }

    /// Resize the diagram to a new outer width and redraw everything.
    pub fn resize(&mut self, width: f64) {
        if !width.is_finite() {
            return;
        }

        let (w, h) = plot_size(width, &self.config);
        self.proj.set_size(w, h);
        self.scene.set_size(w, h);
        self.scene.set_shape(
            self.capture,
            Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: w,
                height: h,
            },
        );

        self.redraw();
    }

    /// Resize during a continuous resize, drawing coarsely until the resize settles.
    pub fn resize_interactive(&mut self, width: f64, now: Instant) {
        self.moving = true;
        self.settle.reschedule(now);
        self.resize(width);
    }

    // The first-render path for everything: background, every data set, then selection.
    fn redraw(&mut self) {
        self.draw_background();

        for idx in 0..self.data_sets.len() {
            self.draw_data_set(idx);
        }

        match self.selected.clone() {
            Some(id) => {
                let _ = self.select_skewt(&id);
            }
            None => self.apply_highlights(),
        }

        self.apply_offset();
        trace!(
            moving = self.moving,
            soundings = self.data_sets.len(),
            "redraw"
        );
    }

    fn draw_data_set(&mut self, idx: usize) {
        let Self {
            ref mut scene,
            ref mut data_sets,
            ref proj,
            ref config,
            ref barbs,
            moving,
            ..
        } = *self;
        let ds = &mut data_sets[idx];

        ds.nodes.remove_from(scene);

        let drawn: Vec<Sample> = if moving && ds.samples.len() > config.moving_sample_cap {
            decimate(&ds.samples, config.moving_sample_cap)
        } else {
            ds.samples.clone()
        };

        let curve_points = |pick: fn(&Sample) -> Option<Kelvin>| -> Vec<(f64, f64)> {
            let curve: Vec<(Celsius, HectoPascal)> = drawn
                .iter()
                .filter_map(|s| Some((Celsius::from(pick(s)?), s.valid_pressure()?)))
                .collect();
            if curve.len() < 2 {
                vec![]
            } else {
                project_curve(proj, &curve)
            }
        };

        let temperature = curve_points(Sample::valid_temperature);
        let dew_point = curve_points(Sample::valid_dew_point);
        ds.nodes.temperature = Some(scene.add(
            Layer::Curves,
            Shape::Polyline {
                points: temperature,
            },
            "temp",
        ));
        ds.nodes.dew_point = Some(scene.add(
            Layer::Curves,
            Shape::Polyline { points: dew_point },
            "dwpt",
        ));

        let column_x = proj.width() + config.barb_spacing * idx as f64;
        ds.nodes.barbs = drawn
            .iter()
            .filter_map(|s| {
                let wind = s.valid_wind()?;
                let y = proj.pressure_to_y(s.valid_pressure()?)?;
                let glyph = barbs.glyph_for(wind)?;
                Some(scene.add(
                    Layer::Barbs,
                    Shape::Instance {
                        symbol: glyph.id.clone(),
                        x: column_x,
                        y,
                        rotation: barb_rotation(wind),
                    },
                    "barb",
                ))
            })
            .collect();

        ds.nodes.label = Some(scene.add(
            Layer::Barbs,
            Shape::Text {
                x: column_x,
                y: -2.0,
                rotation: -90.0,
                anchor: TextAnchor::End,
                content: ds.label.clone(),
            },
            "label",
        ));

        trace!(
            id = %ds.id,
            samples = ds.samples.len(),
            drawn = drawn.len(),
            barbs = ds.nodes.barbs.len(),
            "drew sounding"
        );

        self.draw_parcel(idx);
    }

    fn draw_parcel(&mut self, idx: usize) {
        let steps = if self.moving {
            self.config.moving_parcel_steps
        } else {
            self.config.parcel_steps
        };

        let ds = &mut self.data_sets[idx];
        if let Some(id) = ds.nodes.parcel.take() {
            self.scene.remove(id);
        }
        ds.trajectory = None;

        let start = match ds.parcel_temperature {
            Some(t) => Kelvin::from(t),
            None => return,
        };

        let result = surface_parcel(&ds.samples).and_then(|pcl| {
            let env = EnvironmentProfile::from_samples(&ds.samples);
            parcel_trajectory(&env, steps, pcl.with_temperature(start))
        });

        match result {
            Ok(traj) => {
                let curve: Vec<(Celsius, HectoPascal)> = traj
                    .points()
                    .map(|pnt| (Celsius::from(pnt.temperature), pnt.pressure))
                    .collect();
                let id = self.scene.add(
                    Layer::Curves,
                    Shape::Polyline {
                        points: project_curve(&self.proj, &curve),
                    },
                    "parcel",
                );
                self.scene.set_highlighted(id, true);

                ds.nodes.parcel = Some(id);
                ds.trajectory = Some(traj);
            }
            Err(err) => debug!(id = %ds.id, %err, "parcel overlay omitted"),
        }
    }

    // Highlight the selected data set. Parcels are always highlighted.
    fn apply_highlights(&mut self) {
        for ds in &self.data_sets {
            let on = self.selected.as_ref() == Some(&ds.id);
            for id in ds
                .nodes
                .temperature
                .iter()
                .chain(ds.nodes.dew_point.iter())
                .chain(ds.nodes.barbs.iter())
            {
                self.scene.set_highlighted(*id, on);
            }
        }
    }

    fn apply_offset(&mut self) {
        let offset = self.proj.x_offset();
        for layer in Layer::iter() {
            self.scene.set_layer_offset(layer, offset);
        }
    }

    /// Start a drag at pointer position `(x, y)` on the plot area.
    pub fn drag_start(&mut self, x: f64, y: f64) {
        self.drag_anchor = Some(x - self.proj.x_offset());
        self.move_to_y(y);
    }

    /// Continue a drag. Pans the diagram and moves the probe.
    pub fn drag_move(&mut self, x: f64, y: f64) {
        if let Some(anchor) = self.drag_anchor {
            self.proj.set_x_offset(x - anchor);
            self.apply_offset();
        }
        self.move_to_y(y);
    }

    /// End a drag.
    pub fn drag_end(&mut self) {
        self.drag_anchor = None;
    }

    /// The pointer left the plot area.
    pub fn pointer_leave(&mut self) {
        self.tooltip.hide(&mut self.scene);
    }

    fn move_to_y(&mut self, y: f64) {
        let p = self.proj.y_to_pressure(y);
        self.move_to_pressure(p);
    }

    /// Probe the selected sounding at a pressure and update the tooltip.
    ///
    /// Values are interpolated between the bracketing levels, linear in pressure. Outside the
    /// sounding the nearest end level is read. `None` if nothing is selected.
    pub fn move_to_pressure(&mut self, p: HectoPascal) -> Option<ProbeReading> {
        if !p.unpack().is_finite() || self.probe.is_empty() {
            return None;
        }

        let probe = &self.probe;
        let last = probe.len() - 1;
        // Samples in the probe all have a valid pressure
        let idx = probe.partition_point(|s| s.pressure.unpack() < p);

        let (p, sample) = match idx {
            0 => (probe[0].pressure.unpack(), probe[0].clone()),
            i if i > last => (probe[last].pressure.unpack(), probe[last].clone()),
            i => (p, linear_interp_samples(&probe[i - 1], &probe[i], p)?),
        };

        let reading = ProbeReading::from_sample(p, &sample, self.config.wind_unit);
        self.tooltip.update(&mut self.scene, &self.proj, &reading);

        Some(reading)
    }

    /// Number of plotted soundings.
    pub fn len(&self) -> usize {
        self.data_sets.len()
    }

    /// True if no soundings are plotted.
    pub fn is_empty(&self) -> bool {
        self.data_sets.is_empty()
    }

    /// The plotted soundings, in the order they were first plotted.
    pub fn data_sets(&self) -> &[DataSet] {
        &self.data_sets
    }

    /// Look up a plotted sounding.
    pub fn data_set(&self, id: &SoundingId) -> Option<&DataSet> {
        self.data_sets.iter().find(|ds| &ds.id == id)
    }

    /// The selected sounding.
    pub fn selected(&self) -> Option<&SoundingId> {
        self.selected.as_ref()
    }

    /// Whether the diagram is drawing coarsely during interaction.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether any tooltip field is showing.
    pub fn tooltip_visible(&self) -> bool {
        self.tooltip.is_visible(&self.scene)
    }

    /// The projection.
    pub fn projection(&self) -> &Projection {
        &self.proj
    }

    /// The state of the controls.
    pub fn controls(&self) -> &ControlSurface {
        &self.controls
    }

    /// The configuration.
    pub fn config(&self) -> &SkewTConfig {
        &self.config
    }

    /// The rendered scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Handles to the background lines of a kind.
    pub fn background_lines(&self, layer: BackgroundLayer) -> &[NodeId] {
        self.background.lines(layer)
    }

    /// Render the diagram as SVG.
    pub fn to_svg(&self) -> String {
        self.scene.to_svg()
    }

    fn index_of(&self, id: &SoundingId) -> Option<usize> {
        self.data_sets.iter().position(|ds| &ds.id == id)
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected.as_ref().and_then(|id| self.index_of(id))
    }
}
