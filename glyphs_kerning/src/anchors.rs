//! Find anchors on base glyphs that nothing attaches to.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::font::Font;

/// Base glyph name to its unused anchor names, both sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnusedAnchorReport {
    pub glyphs: BTreeMap<String, Vec<String>>,
}

impl UnusedAnchorReport {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn unused(&self, glyph: &str) -> Option<&[String]> {
        self.glyphs.get(glyph).map(Vec::as_slice)
    }
}

/// Report anchors defined on base (non-mark) glyphs that are neither
/// attached to by a component nor matched by a mark's `_name` anchor.
///
/// Only each glyph's first layer is looked at, so an anchor is counted once
/// regardless of how many masters there are.
pub fn find_unused_anchors(font: &Font) -> UnusedAnchorReport {
    let bases: Vec<_> = font.glyphs.iter().filter(|g| !g.is_mark()).collect();
    let mut used: HashMap<&str, HashSet<&str>> =
        bases.iter().map(|g| (g.name(), HashSet::new())).collect();

    for glyph in &bases {
        let Some(layer) = glyph.first_layer() else {
            continue;
        };
        for component in &layer.components {
            if let (Some(anchor), Some(base_used)) =
                (&component.anchor, used.get_mut(component.name.as_str()))
            {
                base_used.insert(anchor.as_str());
            }
        }
    }

    for mark in font.glyphs.iter().filter(|g| g.is_mark()) {
        let Some(layer) = mark.first_layer() else {
            continue;
        };
        for anchor in &layer.anchors {
            let name = anchor.name.strip_prefix('_').unwrap_or(&anchor.name);
            for base in &bases {
                let Some(base_anchor) = base.first_layer().and_then(|l| l.anchor(name)) else {
                    continue;
                };
                if let Some(base_used) = used.get_mut(base.name()) {
                    base_used.insert(base_anchor.name.as_str());
                }
            }
        }
    }

    let mut report = UnusedAnchorReport::default();
    for glyph in &bases {
        let Some(layer) = glyph.first_layer() else {
            continue;
        };
        let unused: BTreeSet<&str> = layer
            .anchors
            .iter()
            .map(|a| a.name.as_str())
            .filter(|name| !used[glyph.name()].contains(name))
            .collect();
        if !unused.is_empty() {
            report.glyphs.insert(
                glyph.name().to_string(),
                unused.into_iter().map(str::to_string).collect(),
            );
        }
    }

    log::info!(
        "{} of {} base glyphs have unused anchors",
        report.glyphs.len(),
        bases.len()
    );
    report
}
