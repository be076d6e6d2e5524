//! Reading the font model out of norad glyphs and writing edits back.

use norad::error::NamingError;

use crate::font::{Anchor, Component, Layer, Node, NodeType, Path};

/// Glyph lib key glyphsLib stores per-component attachment anchors under.
const COMPONENT_INFO_KEY: &str = "com.schriftgestaltung.Glyphs.ComponentInfo";
/// Glyph lib key glyphsLib stores the Glyphs.app category under.
const GLYPH_CATEGORY_KEY: &str = "com.schriftgestaltung.Glyphs.category";
/// Font lib key mapping glyph names to OpenType categories.
const OPENTYPE_CATEGORIES_KEY: &str = "public.openTypeCategories";
/// Glyph lib key holding the seconds booked by the glyph timer.
const GLYPH_TIMER_KEY: &str = "timer";

impl NodeType {
    fn from_point(point: &norad::ContourPoint) -> Self {
        use norad::PointType as P;
        match point.typ {
            P::Move => NodeType::Line,
            P::OffCurve => NodeType::OffCurve,
            P::Line if point.smooth => NodeType::LineSmooth,
            P::Line => NodeType::Line,
            P::Curve if point.smooth => NodeType::CurveSmooth,
            P::Curve => NodeType::Curve,
            P::QCurve if point.smooth => NodeType::QCurveSmooth,
            P::QCurve => NodeType::QCurve,
        }
    }

    fn point_type(self) -> (norad::PointType, bool) {
        use norad::PointType as P;
        match self {
            NodeType::Line => (P::Line, false),
            NodeType::LineSmooth => (P::Line, true),
            NodeType::OffCurve => (P::OffCurve, false),
            NodeType::Curve => (P::Curve, false),
            NodeType::CurveSmooth => (P::Curve, true),
            NodeType::QCurve => (P::QCurve, false),
            NodeType::QCurveSmooth => (P::QCurve, true),
        }
    }
}

impl From<&norad::Contour> for Path {
    fn from(contour: &norad::Contour) -> Self {
        let mut nodes: Vec<Node> = contour
            .points
            .iter()
            .map(|point| Node {
                pt: kurbo::Point::new(point.x, point.y),
                node_type: NodeType::from_point(point),
            })
            .collect();
        let closed = contour.is_closed();
        if closed {
            // Glyphs.app keeps the start node of a closed path last.
            nodes.rotate_left(1);
        }
        Path { closed, nodes }
    }
}

/// The path's nodes as UFO points, in UFO order.
fn path_points(path: &Path) -> Vec<norad::ContourPoint> {
    let mut points: Vec<norad::ContourPoint> = path
        .nodes
        .iter()
        .map(|node| {
            let (typ, smooth) = node.node_type.point_type();
            norad::ContourPoint::new(node.pt.x, node.pt.y, typ, smooth, None, None, None)
        })
        .collect();
    if path.closed {
        points.rotate_right(1);
    } else if let Some(start) = points.first_mut() {
        start.typ = norad::PointType::Move;
        start.smooth = false;
    }
    points
}

impl From<&norad::Component> for Component {
    fn from(component: &norad::Component) -> Self {
        let transform: kurbo::Affine = component.transform.into();
        Component {
            name: component.base.to_string(),
            transform: (transform != kurbo::Affine::IDENTITY).then_some(transform),
            anchor: None,
        }
    }
}

impl Layer {
    /// Convert a UFO glyph into the layer for `master_id`, picking up the
    /// component attachment anchors glyphsLib leaves in the glyph lib.
    /// Unnamed anchors are not part of the model.
    pub fn from_norad(glyph: &norad::Glyph, master_id: &str) -> Self {
        let mut components: Vec<Component> =
            glyph.components.iter().map(Component::from).collect();
        for (index, anchor) in component_anchors(glyph) {
            if let Some(component) = components.get_mut(index) {
                component.anchor = Some(anchor);
            }
        }

        let anchors = glyph
            .anchors
            .iter()
            .filter_map(|anchor| {
                Some(Anchor {
                    name: anchor.name.as_ref()?.to_string(),
                    position: kurbo::Point::new(anchor.x, anchor.y),
                })
            })
            .collect();

        Layer {
            master_id: master_id.to_string(),
            width: glyph.width,
            paths: glyph.contours.iter().map(Path::from).collect(),
            components,
            anchors,
        }
    }

    /// Write width and geometry into a UFO glyph.
    ///
    /// Contours, components and named anchors whose count still matches are
    /// updated in place, so point names, identifiers, colors and lib data
    /// stay with them. Only a structural change rebuilds that part.
    pub fn write_to_norad(&self, glyph: &mut norad::Glyph) -> Result<(), NamingError> {
        glyph.width = self.width;
        self.write_contours(glyph);
        self.write_components(glyph)?;
        self.write_anchors(glyph)
    }

    fn write_contours(&self, glyph: &mut norad::Glyph) {
        let same_shape = glyph.contours.len() == self.paths.len()
            && glyph
                .contours
                .iter()
                .zip(&self.paths)
                .all(|(contour, path)| contour.points.len() == path.nodes.len());
        if !same_shape {
            glyph.contours = self
                .paths
                .iter()
                .map(|path| norad::Contour::new(path_points(path), None, None))
                .collect();
            return;
        }
        for (contour, path) in glyph.contours.iter_mut().zip(&self.paths) {
            for (point, new) in contour.points.iter_mut().zip(path_points(path)) {
                point.x = new.x;
                point.y = new.y;
                point.typ = new.typ;
                point.smooth = new.smooth;
            }
        }
    }

    fn write_components(&self, glyph: &mut norad::Glyph) -> Result<(), NamingError> {
        if glyph.components.len() == self.components.len() {
            for (ufo_component, component) in glyph.components.iter_mut().zip(&self.components) {
                ufo_component.base = norad::Name::new(&component.name)?;
                ufo_component.transform = component.transform.unwrap_or_default().into();
            }
            return Ok(());
        }
        glyph.components = self
            .components
            .iter()
            .map(|component| {
                Ok(norad::Component::new(
                    norad::Name::new(&component.name)?,
                    component.transform.unwrap_or_default().into(),
                    None,
                    None,
                ))
            })
            .collect::<Result<_, NamingError>>()?;
        Ok(())
    }

    fn write_anchors(&self, glyph: &mut norad::Glyph) -> Result<(), NamingError> {
        let named = glyph.anchors.iter().filter(|a| a.name.is_some()).count();
        if named == self.anchors.len() {
            let ufo_anchors = glyph.anchors.iter_mut().filter(|a| a.name.is_some());
            for (ufo_anchor, anchor) in ufo_anchors.zip(&self.anchors) {
                ufo_anchor.name = Some(norad::Name::new(&anchor.name)?);
                ufo_anchor.x = anchor.position.x;
                ufo_anchor.y = anchor.position.y;
            }
            return Ok(());
        }
        glyph.anchors.retain(|a| a.name.is_none());
        for anchor in &self.anchors {
            glyph.anchors.push(norad::Anchor::new(
                anchor.position.x,
                anchor.position.y,
                Some(norad::Name::new(&anchor.name)?),
                None,
                None,
                None,
            ));
        }
        Ok(())
    }
}

/// Component index to attachment anchor name.
fn component_anchors(glyph: &norad::Glyph) -> Vec<(usize, String)> {
    let Some(infos) = glyph.lib.get(COMPONENT_INFO_KEY).and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    infos
        .iter()
        .filter_map(|info| info.as_dictionary())
        .filter_map(|info| {
            let index = info.get("index")?.as_unsigned_integer()?;
            let anchor = info.get("anchor")?.as_string()?;
            Some((index as usize, anchor.to_string()))
        })
        .collect()
}

/// The glyph's category, from the font's OpenType categories or else the
/// Glyphs.app category glyphsLib stores in the glyph lib.
pub(crate) fn glyph_category(font: &norad::Font, glyph: &norad::Glyph) -> Option<String> {
    let opentype = font
        .lib
        .get(OPENTYPE_CATEGORIES_KEY)
        .and_then(|v| v.as_dictionary())
        .and_then(|categories| categories.get(glyph.name().as_str()))
        .and_then(|v| v.as_string())
        .and_then(|category| match category {
            "base" => Some("Letter"),
            "mark" => Some("Mark"),
            "ligature" => Some("Letter"),
            "component" => Some("Component"),
            _ => None,
        });
    opentype.map(str::to_string).or_else(|| {
        glyph
            .lib
            .get(GLYPH_CATEGORY_KEY)
            .and_then(|v| v.as_string())
            .map(str::to_string)
    })
}

/// Seconds booked on the glyph, if any.
pub(crate) fn glyph_timer(glyph: &norad::Glyph) -> Option<f64> {
    let value = glyph.lib.get(GLYPH_TIMER_KEY)?;
    value
        .as_real()
        .or_else(|| value.as_signed_integer().map(|seconds| seconds as f64))
}

/// Store or clear the booked seconds. Returns whether the lib changed.
pub(crate) fn set_glyph_timer(glyph: &mut norad::Glyph, seconds: Option<f64>) -> bool {
    if glyph_timer(glyph) == seconds {
        return false;
    }
    match seconds {
        Some(seconds) => {
            glyph.lib.insert(GLYPH_TIMER_KEY.to_string(), seconds.into());
        }
        None => {
            glyph.lib.remove(GLYPH_TIMER_KEY);
        }
    }
    true
}
