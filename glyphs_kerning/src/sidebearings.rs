//! Copy sidebearings from one font to another.

use log::{debug, warn};

use crate::error::KerningError;
use crate::font::Font;

/// Which source glyphs to copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GlyphScope {
    All,
    Selected(Vec<String>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SidebearingReport {
    pub copied: Vec<String>,
    /// Source glyphs the destination does not have; skipped.
    pub not_in_destination: Vec<String>,
    /// Destination glyphs the source does not have. Only filled for
    /// [`GlyphScope::All`].
    pub not_in_source: Vec<String>,
}

/// Left and right sidebearing of a layer with outlines.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Metrics {
    lsb: f64,
    rsb: f64,
}

/// Make the first layer of each destination glyph match the source's
/// sidebearings. Source glyphs without paths only pass on their width.
pub fn copy_sidebearings(
    source: &Font,
    destination: &mut Font,
    scope: &GlyphScope,
) -> Result<SidebearingReport, KerningError> {
    let glyph_names: Vec<&str> = match scope {
        GlyphScope::All => source.glyphs.iter().map(|g| g.name()).collect(),
        GlyphScope::Selected(names) => {
            let found: Vec<&str> = names
                .iter()
                .map(String::as_str)
                .filter(|name| {
                    let found = source.get_glyph(name).is_some();
                    if !found {
                        warn!("Selected glyph {} is not in the source font", name);
                    }
                    found
                })
                .collect();
            if found.is_empty() {
                return Err(KerningError::EmptySelection);
            }
            found
        }
    };

    let mut report = SidebearingReport::default();

    for name in glyph_names {
        let Some(source_layer) = source.get_glyph(name).and_then(|g| g.first_layer()) else {
            warn!("Source glyph {} has no layers, skipping", name);
            continue;
        };
        let Some(dest_glyph) = destination.get_glyph(name) else {
            report.not_in_destination.push(name.to_string());
            continue;
        };
        let Some(dest_layer) = dest_glyph.first_layer() else {
            warn!("Destination glyph {} has no layers, skipping", name);
            continue;
        };

        let source_metrics = if source_layer.paths.is_empty() {
            None
        } else {
            source_layer.bounds(source).map(|b| Metrics {
                lsb: b.x0,
                rsb: source_layer.width - b.x1,
            })
        };
        let dest_bounds = dest_layer.bounds(destination);

        let Some(dest_layer) = destination
            .get_glyph_mut(name)
            .and_then(|g| g.first_layer_mut())
        else {
            continue;
        };
        match (source_metrics, dest_bounds) {
            (Some(metrics), Some(bounds)) => {
                dest_layer.translate_x(metrics.lsb - bounds.x0);
                dest_layer.width = metrics.lsb + bounds.width() + metrics.rsb;
                debug!(
                    "{}: LSB {} RSB {} width {}",
                    name, metrics.lsb, metrics.rsb, dest_layer.width
                );
            }
            _ => {
                dest_layer.width = source_layer.width;
                debug!("{}: width {}", name, dest_layer.width);
            }
        }
        report.copied.push(name.to_string());
    }

    if *scope == GlyphScope::All {
        report.not_in_source = destination
            .glyphs
            .iter()
            .map(|g| g.name())
            .filter(|name| source.get_glyph(name).is_none())
            .map(str::to_string)
            .collect();
    }

    report.copied.sort();
    report.not_in_destination.sort();
    report.not_in_source.sort();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::font::{Anchor, Glyph, Layer, NodeType, Path};

    fn rectangle(x0: f64, x1: f64) -> Path {
        let mut path = Path::new(true);
        path.add((x1, 0.0), NodeType::Line);
        path.add((x1, 500.0), NodeType::Line);
        path.add((x0, 500.0), NodeType::Line);
        path.add((x0, 0.0), NodeType::Line);
        path
    }

    fn font(glyphs: &[(&str, f64, Option<(f64, f64)>)]) -> Font {
        let mut font = Font::default();
        let master = font.add_master("Regular");
        for (name, width, outline) in glyphs {
            let mut glyph = Glyph::new(*name);
            let mut layer = Layer::new(&master, *width);
            if let Some((x0, x1)) = outline {
                layer.paths.push(rectangle(*x0, *x1));
            }
            glyph.layers.push(layer);
            font.glyphs.push(glyph);
        }
        font
    }

    #[test]
    fn copies_lsb_and_rsb() {
        let source = font(&[("H", 700.0, Some((80.0, 620.0)))]);
        let mut destination = font(&[("H", 640.0, Some((40.0, 560.0)))]);
        destination.glyphs[0].layers[0].anchors.push(Anchor {
            name: "top".into(),
            position: Point::new(300.0, 700.0),
        });

        let report = copy_sidebearings(&source, &mut destination, &GlyphScope::All).unwrap();

        assert_eq!(report.copied, vec!["H"]);
        let layer = &destination.glyphs[0].layers[0];
        let bounds = layer.bounds(&destination).unwrap();
        assert_eq!(bounds.x0, 80.0);
        assert_eq!(layer.width - bounds.x1, 80.0);
        assert_eq!(layer.width, 680.0);
        assert_eq!(layer.anchors[0].position.x, 340.0);
    }

    #[test]
    fn empty_glyphs_copy_width_only() {
        let source = font(&[("space", 250.0, None)]);
        let mut destination = font(&[("space", 200.0, None)]);

        copy_sidebearings(&source, &mut destination, &GlyphScope::All).unwrap();

        assert_eq!(destination.glyphs[0].layers[0].width, 250.0);
    }

    #[test]
    fn reports_missing_glyphs_on_both_sides() {
        let source = font(&[("A", 600.0, Some((10.0, 590.0))), ("B", 600.0, None)]);
        let mut destination = font(&[("A", 600.0, Some((20.0, 580.0))), ("C", 500.0, None)]);

        let report = copy_sidebearings(&source, &mut destination, &GlyphScope::All).unwrap();

        assert_eq!(report.copied, vec!["A"]);
        assert_eq!(report.not_in_destination, vec!["B"]);
        assert_eq!(report.not_in_source, vec!["C"]);
    }

    #[test]
    fn selected_scope_skips_the_reverse_check() {
        let source = font(&[("A", 600.0, None), ("B", 610.0, None)]);
        let mut destination = font(&[("A", 500.0, None), ("B", 500.0, None), ("C", 1.0, None)]);

        let report = copy_sidebearings(
            &source,
            &mut destination,
            &GlyphScope::Selected(vec!["B".into(), "Zzz".into()]),
        )
        .unwrap();

        assert_eq!(report.copied, vec!["B"]);
        assert!(report.not_in_source.is_empty());
        assert_eq!(destination.glyphs[0].layers[0].width, 500.0);
        assert_eq!(destination.glyphs[1].layers[0].width, 610.0);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let source = font(&[("A", 600.0, None)]);
        let mut destination = font(&[("A", 500.0, None)]);

        assert!(matches!(
            copy_sidebearings(
                &source,
                &mut destination,
                &GlyphScope::Selected(vec!["Zzz".into()])
            ),
            Err(KerningError::EmptySelection)
        ));
    }
}
