//! Shift every kerning pair that involves a glyph's kerning groups.

use log::{debug, info, warn};

use crate::error::KerningError;
use crate::font::Font;
use crate::key::{KerningKey, Side};

/// Per-glyph outcome of [`adjust_pairs_involving`].
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphAdjustment {
    pub glyph: String,
    /// False when the name is not in the font; such glyphs touch nothing.
    pub found: bool,
    pub pairs: usize,
    /// Pairs that matched on both sides, e.g. kerning a group against
    /// itself. They are adjusted and counted once.
    pub both_sides: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdjustmentReport {
    pub master: String,
    pub delta: f64,
    pub glyphs: Vec<GlyphAdjustment>,
    pub total: usize,
}

impl AdjustmentReport {
    pub fn missing_glyphs(&self) -> impl Iterator<Item = &str> {
        self.glyphs
            .iter()
            .filter(|g| !g.found)
            .map(|g| g.glyph.as_str())
    }
}

/// The group keys a glyph is kerned by. A glyph without an explicit group
/// on a side is its own group on that side.
pub fn resolve_effective_keys(
    font: &Font,
    glyph_name: &str,
) -> Result<(KerningKey, KerningKey), KerningError> {
    let glyph = font
        .get_glyph(glyph_name)
        .ok_or_else(|| KerningError::GlyphNotFound(glyph_name.to_string()))?;
    let left = glyph.left_kerning_group.as_deref().unwrap_or(glyph_name);
    let right = glyph.right_kerning_group.as_deref().unwrap_or(glyph_name);
    Ok((
        KerningKey::group(Side::Left, left),
        KerningKey::group(Side::Right, right),
    ))
}

/// Add `delta` to every existing pair in `master` whose left or right key is
/// one of the effective group keys of each glyph in `glyph_names`.
///
/// Glyphs are handled one after the other, so two names sharing a group
/// shift that group's pairs twice. Unknown glyph names are reported and
/// skipped. No pair is ever created or removed.
pub fn adjust_pairs_involving<S: AsRef<str>>(
    font: &mut Font,
    master: &str,
    glyph_names: &[S],
    delta: f64,
) -> Result<AdjustmentReport, KerningError> {
    if !delta.is_finite() {
        return Err(KerningError::InvalidNumericInput(delta.to_string()));
    }
    let master = font
        .master(master)
        .cloned()
        .ok_or_else(|| KerningError::MasterNotFound(master.to_string()))?;

    let mut report = AdjustmentReport {
        master: master.name.clone(),
        delta,
        glyphs: Vec::with_capacity(glyph_names.len()),
        total: 0,
    };

    for glyph_name in glyph_names {
        let glyph_name = glyph_name.as_ref();
        let (left_group, right_group) = match resolve_effective_keys(font, glyph_name) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("{}, skipping", e);
                report.glyphs.push(GlyphAdjustment {
                    glyph: glyph_name.to_string(),
                    found: false,
                    pairs: 0,
                    both_sides: 0,
                });
                continue;
            }
        };
        let matches = |key: &KerningKey| *key == left_group || *key == right_group;

        let table = font.kerning.entry(master.id.clone()).or_default();
        let mut pairs = 0;
        let mut both_sides = 0;
        for (left, right, value) in table.iter_mut() {
            let (left_matches, right_matches) = (matches(left), matches(right));
            if !left_matches && !right_matches {
                continue;
            }
            if left_matches && right_matches {
                both_sides += 1;
            }
            let old = *value;
            *value += delta;
            pairs += 1;
            debug!("{} {}: {} -> {}", left, right, old, *value);
        }

        if pairs > 0 {
            info!(
                "Adjusted {} pairs for {} ({}, {}) by {} in {}",
                pairs, glyph_name, left_group, right_group, delta, master.name
            );
        } else {
            info!("No kerning pairs found for {} in {}", glyph_name, master.name);
        }
        report.total += pairs;
        report.glyphs.push(GlyphAdjustment {
            glyph: glyph_name.to_string(),
            found: true,
            pairs,
            both_sides,
        });
    }

    Ok(report)
}

/// Parse a caller-supplied adjustment value.
pub fn parse_delta(input: &str) -> Result<f64, KerningError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(KerningError::InvalidNumericInput(trimmed.to_string())),
    }
}

/// Split a glyph list like `"A, o  v"`; commas count as whitespace.
pub fn parse_glyph_list(input: &str) -> Vec<String> {
    input
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
