//! A small retained vector scene.
//!
//! Everything the diagram draws ends up here as a node in one of a few layers. Nodes are addressed
//! by an opaque [`NodeId`] so the renderer can restyle, hide, move or remove them later without
//! redrawing. The scene can be written out as SVG for display.
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Write},
};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

/// Handle to a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// The layers of the scene, listed in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
pub enum Layer {
    /// The background grid. Pans and is clipped to the plot area.
    #[strum(serialize = "skewtbg")]
    Background,
    /// Pressure axis labels. Fixed.
    #[strum(serialize = "axes")]
    Axes,
    /// Sounding and parcel curves. Pans and is clipped to the plot area.
    #[strum(serialize = "skewt")]
    Curves,
    /// Wind barb instances. Pans.
    #[strum(serialize = "windbarb")]
    Barbs,
    /// The pointer probe read out. Fixed.
    #[strum(serialize = "tooltips")]
    Tooltips,
}

impl Layer {
    /// Whether the layer moves with the horizontal pan offset.
    pub fn pans(self) -> bool {
        matches!(self, Layer::Background | Layer::Curves | Layer::Barbs)
    }

    /// Whether the layer is clipped to the plot area.
    pub fn clipped(self) -> bool {
        matches!(self, Layer::Background | Layer::Curves)
    }
}

/// Horizontal alignment of text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the anchor.
    Start,
    /// Text is centered on the anchor.
    Middle,
    /// Text ends at the anchor.
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Geometry of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A straight line segment.
    Line {
        /// Start x
        x1: f64,
        /// Start y
        y1: f64,
        /// End x
        x2: f64,
        /// End y
        y2: f64,
    },
    /// An open path through the points. Fewer than 2 points draws nothing.
    Polyline {
        /// The vertices, in screen coordinates.
        points: Vec<(f64, f64)>,
    },
    /// A circle.
    Circle {
        /// Center x
        cx: f64,
        /// Center y
        cy: f64,
        /// Radius
        r: f64,
    },
    /// An axis aligned rectangle.
    Rect {
        /// Left
        x: f64,
        /// Top
        y: f64,
        /// Width
        width: f64,
        /// Height
        height: f64,
    },
    /// A text label.
    Text {
        /// Anchor x
        x: f64,
        /// Anchor y
        y: f64,
        /// Rotation about the anchor in degrees, clockwise.
        rotation: f64,
        /// Alignment relative to the anchor.
        anchor: TextAnchor,
        /// The text.
        content: String,
    },
    /// A placed copy of a symbol defined with [`Scene::define_symbol`].
    Instance {
        /// The symbol id.
        symbol: String,
        /// Placement x
        x: f64,
        /// Placement y
        y: f64,
        /// Rotation in degrees, clockwise.
        rotation: f64,
    },
}

/// A node in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The layer the node belongs to.
    pub layer: Layer,
    /// Geometry
    pub shape: Shape,
    /// Style class.
    pub class: &'static str,
    /// Drawn with emphasis.
    pub highlighted: bool,
    /// Not drawn.
    pub hidden: bool,
}

/// A reusable group of shapes, drawn around its own origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Identifier referenced by [`Shape::Instance`].
    pub id: String,
    /// The parts of the symbol with their style class.
    pub parts: Vec<(Shape, Option<&'static str>)>,
}

/// The retained scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    width: f64,
    height: f64,
    margin_left: f64,
    margin_top: f64,
    margin_right: f64,
    margin_bottom: f64,

    next_id: u64,
    nodes: BTreeMap<NodeId, Node>,
    offsets: BTreeMap<Layer, f64>,
    symbols: Vec<Symbol>,
}

impl Scene {
    /// Create an empty scene with a plot area of `width` by `height`.
    pub fn new(width: f64, height: f64) -> Self {
        Scene {
            width,
            height,
            ..Scene::default()
        }
    }

    /// Set the margins around the plot area, as top, right, bottom, left.
    pub fn with_margins(self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Scene {
            margin_top: top,
            margin_right: right,
            margin_bottom: bottom,
            margin_left: left,
            ..self
        }
    }

    /// Change the size of the plot area.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Width of the plot area.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height of the plot area.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Add a node, it is drawn after every node already in its layer.
    pub fn add(&mut self, layer: Layer, shape: Shape, class: &'static str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(
            id,
            Node {
                layer,
                shape,
                class,
                highlighted: false,
                hidden: false,
            },
        );

        id
    }

    /// Remove a node, returns whether it existed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    /// Remove every node in a layer.
    pub fn clear_layer(&mut self, layer: Layer) {
        self.nodes.retain(|_, node| node.layer != layer);
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Replace the geometry of a node.
    pub fn set_shape(&mut self, id: NodeId, shape: Shape) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.shape = shape;
        }
    }

    /// Set or clear the highlight flag of a node.
    pub fn set_highlighted(&mut self, id: NodeId, highlighted: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.highlighted = highlighted;
        }
    }

    /// Hide or show a node.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.hidden = hidden;
        }
    }

    /// Translate a layer horizontally. Only layers that pan are affected.
    pub fn set_layer_offset(&mut self, layer: Layer, dx: f64) {
        if layer.pans() {
            self.offsets.insert(layer, dx);
        }
    }

    /// Current horizontal translation of a layer.
    pub fn layer_offset(&self, layer: Layer) -> f64 {
        self.offsets.get(&layer).copied().unwrap_or(0.0)
    }

    /// Define a symbol, replacing any existing symbol with the same id.
    pub fn define_symbol(&mut self, symbol: Symbol) {
        match self.symbols.iter_mut().find(|s| s.id == symbol.id) {
            Some(existing) => *existing = symbol,
            None => self.symbols.push(symbol),
        }
    }

    /// Look up a symbol.
    pub fn symbol(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Iterate over the nodes of a layer in drawing order.
    pub fn layer_nodes(&self, layer: Layer) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.layer == layer)
            .map(|(&id, node)| (id, node))
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render the scene as an SVG document.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

fn write_shape<W: Write>(
    out: &mut W,
    shape: &Shape,
    class: Option<&str>,
    hidden: bool,
) -> fmt::Result {
    let mut attrs = String::new();
    if let Some(class) = class {
        write!(attrs, r#" class="{}""#, class)?;
    }
    if hidden {
        attrs.push_str(r#" style="display:none""#);
    }

    match shape {
        Shape::Line { x1, y1, x2, y2 } => writeln!(
            out,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"{}/>"#,
            x1, y1, x2, y2, attrs
        ),
        Shape::Polyline { points } => {
            if points.len() < 2 {
                return Ok(());
            }
            write!(out, r#"<polyline fill="none" points=""#)?;
            for (i, (x, y)) in points.iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                write!(out, "{:.2},{:.2}", x, y)?;
            }
            writeln!(out, r#""{}/>"#, attrs)
        }
        Shape::Circle { cx, cy, r } => writeln!(
            out,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}"{}/>"#,
            cx, cy, r, attrs
        ),
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => writeln!(
            out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"{}/>"#,
            x, y, width, height, attrs
        ),
        Shape::Text {
            x,
            y,
            rotation,
            anchor,
            content,
        } => writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="{}" dy=".35em" transform="rotate({:.1} {:.2} {:.2})"{}>{}</text>"#,
            x,
            y,
            anchor.as_str(),
            rotation,
            x,
            y,
            attrs,
            escape(content)
        ),
        Shape::Instance {
            symbol,
            x,
            y,
            rotation,
        } => writeln!(
            out,
            r##"<use href="#{}" transform="translate({:.2},{:.2}) rotate({:.1})"{}/>"##,
            symbol, x, y, rotation, attrs
        ),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}">"#,
            self.width + self.margin_left + self.margin_right,
            self.height + self.margin_top + self.margin_bottom
        )?;

        writeln!(f, "<defs>")?;
        writeln!(
            f,
            r#"<clipPath id="clipper"><rect x="0" y="0" width="{:.2}" height="{:.2}"/></clipPath>"#,
            self.width, self.height
        )?;
        for symbol in &self.symbols {
            writeln!(f, r#"<g id="{}">"#, symbol.id)?;
            for (shape, class) in &symbol.parts {
                write_shape(f, shape, *class, false)?;
            }
            writeln!(f, "</g>")?;
        }
        writeln!(f, "</defs>")?;

        writeln!(
            f,
            r#"<g id="container" transform="translate({:.2},{:.2})">"#,
            self.margin_left, self.margin_top
        )?;
        for layer in Layer::iter() {
            let name: &'static str = layer.into();
            if layer.clipped() {
                writeln!(f, r#"<g class="{}" clip-path="url(#clipper)">"#, name)?;
            } else {
                writeln!(f, r#"<g class="{}">"#, name)?;
            }
            writeln!(
                f,
                r#"<g transform="translate({:.2},0)">"#,
                self.layer_offset(layer)
            )?;

            for (_, node) in self.layer_nodes(layer) {
                let class = if node.highlighted {
                    format!("{} highlight-line", node.class)
                } else {
                    node.class.to_owned()
                };
                write_shape(f, &node.shape, Some(&class), node.hidden)?;
            }

            writeln!(f, "</g>\n</g>")?;
        }
        writeln!(f, "</g>")?;

        writeln!(f, "</svg>")
    }
}
