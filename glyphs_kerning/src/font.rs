//! The in-memory font model the tools operate on.
//!
//! This mirrors the shape of a Glyphs.app font closely enough that the
//! kerning conventions (`@MMK_` groups, per-master tables, layer-per-master
//! glyphs) carry over, but it is filled from UFO sources instead of a plist.

use std::collections::HashMap;

use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::kerning::KerningTable;

/// Components nested deeper than this are ignored when computing bounds.
const MAX_COMPONENT_DEPTH: usize = 16;

#[derive(Clone, Debug, Default)]
pub struct Font {
    pub glyphs: Vec<Glyph>,
    pub font_master: Vec<FontMaster>,
    /// Kerning tables keyed by master id.
    pub kerning: HashMap<String, KerningTable>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub glyphname: String,
    /// Opaque identifier, as used by kerning tables that key literal glyphs
    /// by id rather than by name.
    pub id: String,
    pub category: Option<String>,
    pub left_kerning_group: Option<String>,
    pub right_kerning_group: Option<String>,
    /// Working time booked by the glyph timer, in seconds.
    pub timer: Option<f64>,
    pub layers: Vec<Layer>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub master_id: String,
    pub width: f64,
    pub paths: Vec<Path>,
    pub components: Vec<Component>,
    pub anchors: Vec<Anchor>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub closed: bool,
    pub nodes: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub pt: Point,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeType {
    Line,
    LineSmooth,
    OffCurve,
    Curve,
    CurveSmooth,
    QCurve,
    QCurveSmooth,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub name: String,
    pub transform: Option<Affine>,
    /// The anchor on the base glyph this component is attached to, if it
    /// was placed on a specific one (e.g. `top_viet`).
    pub anchor: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    pub name: String,
    pub position: Point,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontMaster {
    pub id: String,
    pub name: String,
}

impl Font {
    /// Add a master with an empty kerning table and return its id.
    pub fn add_master(&mut self, name: impl Into<String>) -> String {
        let id = uuid::Uuid::new_v4().to_string().to_uppercase();
        self.font_master.push(FontMaster {
            id: id.clone(),
            name: name.into(),
        });
        self.kerning.insert(id.clone(), KerningTable::default());
        id
    }

    /// Look up a master by id, falling back to its name.
    pub fn master(&self, id_or_name: &str) -> Option<&FontMaster> {
        self.font_master
            .iter()
            .find(|m| m.id == id_or_name)
            .or_else(|| self.font_master.iter().find(|m| m.name == id_or_name))
    }

    pub fn get_glyph(&self, glyphname: &str) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.name() == glyphname)
    }

    pub fn get_glyph_mut(&mut self, glyphname: &str) -> Option<&mut Glyph> {
        self.glyphs.iter_mut().find(|g| g.name() == glyphname)
    }

    pub fn glyph_by_id(&self, id: &str) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.id.eq_ignore_ascii_case(id))
    }

    pub fn kerning_for(&self, master_id: &str) -> Option<&KerningTable> {
        self.kerning.get(master_id)
    }
}

impl Glyph {
    pub fn new(name: impl Into<String>) -> Self {
        Glyph {
            glyphname: name.into(),
            id: uuid::Uuid::new_v4().to_string().to_uppercase(),
            category: None,
            left_kerning_group: None,
            right_kerning_group: None,
            timer: None,
            layers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.glyphname
    }

    pub fn is_mark(&self) -> bool {
        self.category
            .as_deref()
            .map_or(false, |c| c.eq_ignore_ascii_case("mark"))
    }

    pub fn get_layer(&self, master_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.master_id == master_id)
    }

    pub fn get_layer_mut(&mut self, master_id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.master_id == master_id)
    }

    /// The layer of the first master, which is the one single-layer
    /// reports look at.
    pub fn first_layer(&self) -> Option<&Layer> {
        self.layers.first()
    }

    pub fn first_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.first_mut()
    }
}

impl Layer {
    pub fn new(master_id: impl Into<String>, width: f64) -> Self {
        Layer {
            master_id: master_id.into(),
            width,
            paths: Vec::new(),
            components: Vec::new(),
            anchors: Vec::new(),
        }
    }

    pub fn anchor(&self, name: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.name == name)
    }

    /// Bounding box of the outlines, including components resolved through
    /// `font` on the same master. `None` for an empty layer.
    pub fn bounds(&self, font: &Font) -> Option<Rect> {
        self.bounds_at_depth(font, 0)
    }

    fn bounds_at_depth(&self, font: &Font, depth: usize) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        let mut extend = |rect: Rect| {
            bounds = Some(match bounds {
                Some(b) => b.union(rect),
                None => rect,
            });
        };

        for path in self.paths.iter().filter(|p| !p.nodes.is_empty()) {
            extend(path.to_bez_path().bounding_box());
        }

        if depth < MAX_COMPONENT_DEPTH {
            for component in &self.components {
                let base_bounds = font
                    .get_glyph(&component.name)
                    .and_then(|g| g.get_layer(&self.master_id))
                    .and_then(|l| l.bounds_at_depth(font, depth + 1));
                if let Some(rect) = base_bounds {
                    let transform = component.transform.unwrap_or_default();
                    extend(transform.transform_rect_bbox(rect));
                }
            }
        } else if !self.components.is_empty() {
            log::warn!(
                "Component nesting deeper than {} levels, ignoring the rest",
                MAX_COMPONENT_DEPTH
            );
        }

        bounds
    }

    /// Shift everything drawn on the layer horizontally. The width is left
    /// alone.
    pub fn translate_x(&mut self, dx: f64) {
        for path in &mut self.paths {
            for node in &mut path.nodes {
                node.pt.x += dx;
            }
        }
        for anchor in &mut self.anchors {
            anchor.position.x += dx;
        }
        for component in &mut self.components {
            let transform = component.transform.unwrap_or_default();
            component.transform = Some(Affine::translate((dx, 0.0)) * transform);
        }
    }
}

impl Path {
    pub fn new(closed: bool) -> Path {
        Path {
            nodes: Vec::new(),
            closed,
        }
    }

    pub fn add(&mut self, pt: impl Into<Point>, node_type: NodeType) {
        let pt = pt.into();
        self.nodes.push(Node { pt, node_type });
    }

    /// Build the drawn outline. In Glyphs.app order the starting node of a
    /// closed path is stored at the end of the nodes list.
    pub fn to_bez_path(&self) -> BezPath {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        if self.closed {
            nodes.rotate_right(1);
        }

        let mut bez = BezPath::new();
        let mut nodes = nodes.into_iter();
        let Some(start) = nodes.next() else {
            return bez;
        };
        bez.move_to(start.pt);

        let mut off_curve: Vec<Point> = Vec::new();
        for node in nodes {
            if node.node_type == NodeType::OffCurve {
                off_curve.push(node.pt);
            } else {
                push_segment(&mut bez, &off_curve, node.pt);
                off_curve.clear();
            }
        }
        if self.closed {
            if !off_curve.is_empty() {
                push_segment(&mut bez, &off_curve, start.pt);
            }
            bez.close_path();
        }
        bez
    }
}

fn push_segment(bez: &mut BezPath, off_curve: &[Point], to: Point) {
    match off_curve {
        [] => bez.line_to(to),
        [c] => bez.quad_to(*c, to),
        [c1, c2] => bez.curve_to(*c1, *c2, to),
        [.., last] => {
            // TrueType-style runs of off-curve points with implied on-curves.
            for pair in off_curve.windows(2) {
                bez.quad_to(pair[0], pair[0].midpoint(pair[1]));
            }
            bez.quad_to(*last, to);
        }
    }
}
