//! The background grid of the diagram: isotherms, isobars, dry adiabats, moist adiabats and
//! isohumes, plus the axes.
use crate::{
    config::SkewTConfig,
    met_formulas::{
        dew_point, dry_lapse, mixing_ratio, moist_gradient_t, saturation_vapor_pressure,
        vapor_pressure,
    },
    projection::{nice_ticks, Projection},
    scene::{Layer, NodeId, Scene, Shape, TextAnchor},
};
use itertools::Itertools;
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::{EnumIter, IntoStaticStr};
use tracing::trace;

/// The kinds of background lines that can be highlighted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr,
)]
pub enum BackgroundLayer {
    /// Lines of constant potential temperature.
    #[strum(serialize = "dryadiabat")]
    DryAdiabat,
    /// Lines of constant equivalent potential temperature.
    #[strum(serialize = "moistadiabat")]
    MoistAdiabat,
    /// Lines of constant mixing ratio.
    #[strum(serialize = "isohume")]
    Isohume,
    /// Lines of constant temperature.
    #[strum(serialize = "templine")]
    Isotherm,
    /// Lines of constant pressure.
    #[strum(serialize = "pressure")]
    Isobar,
}

impl BackgroundLayer {
    /// Style class of the lines in this layer.
    pub fn class(self) -> &'static str {
        self.into()
    }
}

/// A curve as (temperature, pressure) pairs.
pub type Curve = Vec<(Celsius, HectoPascal)>;

/// Pressure levels the background curves are evaluated at, from the base up.
///
/// While moving the depth of the diagram is split into `moving_steps` equal intervals. Otherwise
/// levels run from the base to above `top - 50` hPa. That is every 50 hPa ending at the top, or,
/// when the top is above 500 hPa, every 25 hPa ending one level past the top.
pub fn pressure_steps(
    base: HectoPascal,
    top: HectoPascal,
    moving: bool,
    moving_steps: usize,
) -> Vec<HectoPascal> {
    let (base, top) = (base.unpack(), top.unpack());

    if moving && moving_steps > 0 {
        let depth = base - top;
        return (0..=moving_steps)
            .map(|k| HectoPascal(base - depth * k as f64 / moving_steps as f64))
            .collect();
    }

    let increment = if top > 500.0 { 25.0 } else { 50.0 };
    let stop = top - 50.0;
    let count = ((base - stop) / increment).ceil().max(0.0) as usize;

    (0..count)
        .map(|i| base - i as f64 * increment)
        .filter(|&p| p > 0.0)
        .map(HectoPascal)
        .collect()
}

/// A dry adiabat through `t0` at the first pressure level.
pub fn dry_adiabat(t0: Celsius, levels: &[HectoPascal]) -> Curve {
    let p0 = match levels.first() {
        Some(&p0) => p0,
        None => return vec![],
    };
    let t0 = Kelvin::from(t0);

    levels
        .iter()
        .map(|&p| (Celsius::from(dry_lapse(p, t0, p0)), p))
        .collect()
}

/// A moist adiabat through `t0` at the first pressure level.
pub fn moist_adiabat(t0: Celsius, levels: &[HectoPascal]) -> Curve {
    let first = match levels.first() {
        Some(&p0) => (t0, p0),
        None => return vec![],
    };

    let mut t = Kelvin::from(t0);
    let mut curve = Vec::with_capacity(levels.len());
    curve.push(first);
    curve.extend(levels.iter().tuple_windows::<(_, _)>().map(|(&p0, &p1)| {
        let dp = p1.unpack() - p0.unpack();
        t = Kelvin(t.unpack() + moist_gradient_t(p1, t) * dp);
        (Celsius::from(t), p1)
    }));

    curve
}

/// An isohume with the saturation mixing ratio of `t0` at the first pressure level.
pub fn isohume(t0: Celsius, levels: &[HectoPascal]) -> Curve {
    let p0 = match levels.first() {
        Some(&p0) => p0,
        None => return vec![],
    };
    let mw = mixing_ratio(saturation_vapor_pressure(Kelvin::from(t0)), p0);

    levels
        .iter()
        .map(|&p| (Celsius::from(dew_point(vapor_pressure(p, mw))), p))
        .collect()
}

/// Project a curve to screen space, dropping points that can't be projected.
pub(crate) fn project_curve(proj: &Projection, curve: &[(Celsius, HectoPascal)]) -> Vec<(f64, f64)> {
    curve
        .iter()
        .filter_map(|&(t, p)| proj.to_screen(t, p))
        .collect()
}

/// Handles to the nodes of a drawn background.
#[derive(Debug, Clone, Default)]
pub struct Background {
    lines: BTreeMap<BackgroundLayer, Vec<NodeId>>,
    decorations: Vec<NodeId>,
}

impl Background {
    /// Draw the background into the scene.
    ///
    /// `highlighted` layers have their lines drawn highlighted. While `moving` the curves are
    /// evaluated at only a few pressure levels.
    pub fn draw(
        scene: &mut Scene,
        proj: &Projection,
        config: &SkewTConfig,
        moving: bool,
        highlighted: &BTreeSet<BackgroundLayer>,
    ) -> Self {
        let mut bg = Background::default();

        let (w, h) = (proj.width(), proj.height());
        let base = proj.base_pressure();
        let mid = proj.mid_temp().unpack();
        let range = proj.temp_range();
        let full_skew = proj.skew(proj.top_pressure()).unwrap_or(0.0);

        // Isotherms
        for t in nice_ticks(mid - range * 2.0, mid + range, config.isotherm_ticks) {
            let x = proj.temperature_to_x(Celsius(t)) - 0.5;
            let class = if t == 0.0 { "tempzero" } else { "templine" };
            bg.add_line(
                scene,
                BackgroundLayer::Isotherm,
                Shape::Line {
                    x1: x + full_skew,
                    y1: 0.0,
                    x2: x,
                    y2: h,
                },
                class,
            );
        }

        // Isobars
        for &p in &config.isobars_hpa {
            if let Some(y) = proj.pressure_to_y(HectoPascal(p)) {
                bg.add_line(
                    scene,
                    BackgroundLayer::Isobar,
                    Shape::Line {
                        x1: -w,
                        y1: y,
                        x2: 2.0 * w,
                        y2: y,
                    },
                    BackgroundLayer::Isobar.class(),
                );
            }
        }

        // Dry adiabats, moist adiabats and isohumes all start from the same temperatures
        let levels = pressure_steps(
            base,
            proj.top_pressure(),
            moving,
            config.moving_background_steps,
        );
        let starts = nice_ticks(mid - range * 3.0, mid + range * 3.0, config.adiabat_ticks);

        let generators: [(BackgroundLayer, fn(Celsius, &[HectoPascal]) -> Curve); 3] = [
            (BackgroundLayer::DryAdiabat, dry_adiabat),
            (BackgroundLayer::MoistAdiabat, moist_adiabat),
            (BackgroundLayer::Isohume, isohume),
        ];
        for &(layer, generator) in &generators {
            for &t0 in &starts {
                let points = project_curve(proj, &generator(Celsius(t0), &levels));
                bg.add_line(scene, layer, Shape::Polyline { points }, layer.class());
            }
        }

        for (layer, ids) in &bg.lines {
            let on = highlighted.contains(layer);
            for &id in ids {
                scene.set_highlighted(id, on);
            }
        }

        bg.draw_axes(scene, proj, config);

        trace!(
            moving,
            levels = levels.len(),
            nodes = bg.len(),
            "background drawn"
        );

        bg
    }

    fn add_line(
        &mut self,
        scene: &mut Scene,
        layer: BackgroundLayer,
        shape: Shape,
        class: &'static str,
    ) {
        let id = scene.add(Layer::Background, shape, class);
        self.lines.entry(layer).or_insert_with(Vec::new).push(id);
    }

    fn draw_axes(&mut self, scene: &mut Scene, proj: &Projection, config: &SkewTConfig) {
        let (w, h) = (proj.width(), proj.height());
        let mid = proj.mid_temp().unpack();
        let range = proj.temp_range();

        // Right edge of the plot
        self.decorations.push(scene.add(
            Layer::Background,
            Shape::Line {
                x1: w - 0.5,
                y1: 0.0,
                x2: w - 0.5,
                y2: h,
            },
            "gridline",
        ));

        // Temperature labels along the bottom, these pan with the grid
        for t in nice_ticks(mid - range * 2.0, mid + range * 2.0, config.axis_ticks) {
            self.decorations.push(scene.add(
                Layer::Background,
                Shape::Text {
                    x: proj.temperature_to_x(Celsius(t)),
                    y: h - 0.5,
                    rotation: 0.0,
                    anchor: TextAnchor::Middle,
                    content: format!("{}", t),
                },
                "x axis",
            ));
        }

        // Pressure labels and minor ticks on the left
        for &p in &config.isobars_hpa {
            if let Some(y) = proj.pressure_to_y(HectoPascal(p)) {
                self.decorations.push(scene.add(
                    Layer::Axes,
                    Shape::Text {
                        x: -3.5,
                        y,
                        rotation: 0.0,
                        anchor: TextAnchor::End,
                        content: format!("{:.0}", p),
                    },
                    "y axis",
                ));
            }
        }
        for p in config.pressure_ticks() {
            if let Some(y) = proj.pressure_to_y(HectoPascal(p)) {
                self.decorations.push(scene.add(
                    Layer::Axes,
                    Shape::Line {
                        x1: -0.5,
                        y1: y,
                        x2: 4.5,
                        y2: y,
                    },
                    "y axis ticks",
                ));
            }
        }
    }

    /// Handles of the lines of one kind.
    pub fn lines(&self, layer: BackgroundLayer) -> &[NodeId] {
        self.lines.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Flip the highlight of every line of one kind in place.
    pub fn set_highlight(&self, scene: &mut Scene, layer: BackgroundLayer, on: bool) {
        for &id in self.lines(layer) {
            scene.set_highlighted(id, on);
        }
    }

    /// Number of nodes in the background.
    pub fn len(&self) -> usize {
        self.lines.values().map(Vec::len).sum::<usize>() + self.decorations.len()
    }

    /// True if nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all of the nodes from the scene.
    pub fn clear(&mut self, scene: &mut Scene) {
        for id in self
            .lines
            .values()
            .flat_map(|ids| ids.iter())
            .chain(self.decorations.iter())
        {
            scene.remove(*id);
        }

        self.lines.clear();
        self.decorations.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::met_formulas::{saturation_mixing_ratio, CELSIUS_TO_K};
    use crate::utility::test_tools::*;

    fn to_celsius(t: Kelvin) -> f64 {
        t.unpack() - CELSIUS_TO_K
    }

    fn projection() -> Projection {
        Projection::new(
            400.0,
            400.0,
            55.0,
            HectoPascal(1000.0),
            HectoPascal(100.0),
            Celsius(0.0),
            50.0,
        )
        .unwrap()
    }

    #[test]
    fn test_pressure_steps() {
        let full = pressure_steps(HectoPascal(1000.0), HectoPascal(100.0), false, 4);
        assert_eq!(full.len(), 19);
        assert_eq!(full[0], HectoPascal(1000.0));
        assert_eq!(*full.last().unwrap(), HectoPascal(100.0));

        let deep = pressure_steps(HectoPascal(1000.0), HectoPascal(600.0), false, 4);
        assert_eq!(deep[1], HectoPascal(975.0));
        assert_eq!(*deep.last().unwrap(), HectoPascal(575.0));

        let moving = pressure_steps(HectoPascal(1000.0), HectoPascal(100.0), true, 4);
        assert_eq!(
            moving,
            vec![
                HectoPascal(1000.0),
                HectoPascal(775.0),
                HectoPascal(550.0),
                HectoPascal(325.0),
                HectoPascal(100.0)
            ]
        );

        // Never below zero
        let shallow = pressure_steps(HectoPascal(1000.0), HectoPascal(20.0), false, 4);
        assert!(shallow.iter().all(|p| p.unpack() > 0.0));
    }

    #[test]
    fn test_dry_adiabat() {
        let levels = [HectoPascal(1000.0), HectoPascal(500.0)];
        let curve = dry_adiabat(Celsius(20.0), &levels);
        assert_eq!(curve.len(), 2);
        assert!(approx_equal(curve[0].0.unpack(), 20.0, 1.0e-9));
        let expected = to_celsius(dry_lapse(
            HectoPascal(500.0),
            Kelvin(293.15),
            HectoPascal(1000.0),
        ));
        assert!(approx_equal(curve[1].0.unpack(), expected, 1.0e-9));
        assert!(dry_adiabat(Celsius(0.0), &[]).is_empty());
    }

    #[test]
    fn test_moist_adiabat_cools_slower_than_dry() {
        let levels = pressure_steps(HectoPascal(1000.0), HectoPascal(100.0), false, 4);
        let moist = moist_adiabat(Celsius(20.0), &levels);
        let dry = dry_adiabat(Celsius(20.0), &levels);

        assert_eq!(moist.len(), levels.len());
        assert!(moist.windows(2).all(|w| w[1].0.unpack() < w[0].0.unpack()));
        assert!(moist[5].0.unpack() > dry[5].0.unpack());
    }

    #[test]
    fn test_isohume_constant_mixing_ratio() {
        let levels = [HectoPascal(1000.0), HectoPascal(700.0), HectoPascal(400.0)];
        let curve = isohume(Celsius(10.0), &levels);
        let mw0 = saturation_mixing_ratio(HectoPascal(1000.0), Kelvin(283.15));

        for &(t, p) in &curve {
            let mw = saturation_mixing_ratio(p, Kelvin::from(t));
            assert!(approx_equal(mw, mw0, 1.0e-6));
        }
    }

    #[test]
    fn test_draw_and_highlight() {
        let proj = projection();
        let config = SkewTConfig::default();
        let mut scene = Scene::new(400.0, 400.0);
        let mut highlighted = BTreeSet::new();
        highlighted.insert(BackgroundLayer::Isohume);

        let mut bg = Background::draw(&mut scene, &proj, &config, false, &highlighted);

        assert_eq!(bg.lines(BackgroundLayer::Isobar).len(), 10);
        assert_eq!(bg.lines(BackgroundLayer::Isotherm).len(), 16);
        let n_adiabats = bg.lines(BackgroundLayer::DryAdiabat).len();
        assert_eq!(n_adiabats, 31);
        assert_eq!(bg.lines(BackgroundLayer::MoistAdiabat).len(), n_adiabats);

        let iso = bg.lines(BackgroundLayer::Isohume)[0];
        assert!(scene.get(iso).unwrap().highlighted);
        let dry = bg.lines(BackgroundLayer::DryAdiabat)[0];
        assert!(!scene.get(dry).unwrap().highlighted);

        bg.set_highlight(&mut scene, BackgroundLayer::DryAdiabat, true);
        assert!(scene.get(dry).unwrap().highlighted);

        match &scene.get(dry).unwrap().shape {
            Shape::Polyline { points } => assert_eq!(points.len(), 19),
            _ => panic!("dry adiabat is not a polyline"),
        }

        assert_eq!(scene.len(), bg.len());
        bg.clear(&mut scene);
        assert!(scene.is_empty());
        assert!(bg.is_empty());
    }

    #[test]
    fn test_moving_background_is_coarse() {
        let proj = projection();
        let config = SkewTConfig::default();
        let mut scene = Scene::new(400.0, 400.0);

        let bg = Background::draw(&mut scene, &proj, &config, true, &BTreeSet::new());
        let dry = bg.lines(BackgroundLayer::DryAdiabat)[0];
        match &scene.get(dry).unwrap().shape {
            Shape::Polyline { points } => assert_eq!(points.len(), 5),
            _ => panic!("dry adiabat is not a polyline"),
        }
    }
}
