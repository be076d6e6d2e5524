//! Copy the kerning of one kerning group name onto another.

use log::{debug, info, warn};

use crate::error::KerningError;
use crate::font::Font;
use crate::key::{KerningKey, Side};

#[derive(Debug)]
pub struct CopyFailure {
    pub master: String,
    pub left: KerningKey,
    pub right: KerningKey,
    pub reason: KerningError,
}

#[derive(Debug, Default)]
pub struct CopyReport {
    /// Pairs written to the target group.
    pub copied: usize,
    /// Pairs that were created or got a different value. A second identical
    /// run reports 0 here.
    pub changed: usize,
    pub failures: Vec<CopyFailure>,
    pub missing_masters: Vec<String>,
}

impl CopyReport {
    pub fn merge(&mut self, other: CopyReport) {
        self.copied += other.copied;
        self.changed += other.changed;
        self.failures.extend(other.failures);
        for master in other.missing_masters {
            if !self.missing_masters.contains(&master) {
                self.missing_masters.push(master);
            }
        }
    }
}

/// Map a table key to one that can be written back: group and glyph name
/// keys as they are, glyph ids to the name of the glyph they refer to.
/// `None` for an id no glyph carries anymore.
pub fn resolve_key(font: &Font, key: &KerningKey) -> Option<KerningKey> {
    match key {
        KerningKey::Glyph(_) | KerningKey::Group(..) => Some(key.clone()),
        KerningKey::GlyphId(id) => match font.glyph_by_id(&id.to_string()) {
            Some(glyph) => Some(KerningKey::glyph(glyph.name())),
            None => {
                warn!("Kerning key {} refers to no glyph, skipping", key);
                None
            }
        },
    }
}

/// Copy every pair of `source_group` onto `target_group`, on both sides,
/// in each of `masters` (ids or names).
///
/// Existing target pairs are overwritten, missing ones created; the source
/// pairs stay as they are. Per-pair failures and unknown masters end up in
/// the report.
pub fn copy_group_values<S: AsRef<str>>(
    font: &mut Font,
    masters: &[S],
    source_group: &str,
    target_group: &str,
) -> CopyReport {
    let left_source = KerningKey::group(Side::Left, source_group);
    let left_target = KerningKey::group(Side::Left, target_group);
    let right_source = KerningKey::group(Side::Right, source_group);
    let right_target = KerningKey::group(Side::Right, target_group);

    let mut report = CopyReport::default();

    for master in masters {
        let master = master.as_ref();
        let Some(master) = font.master(master).cloned() else {
            warn!("Master {} not found, skipping", master);
            report.missing_masters.push(master.to_string());
            continue;
        };
        let before = report.copied;

        // Left side: the source group's row, written under the target group.
        let mut sets = Vec::new();
        match font.kerning_for(&master.id).and_then(|t| t.row(&left_source)) {
            Some(row) => {
                for (right, value) in row {
                    match resolve_key(font, right) {
                        Some(right) => sets.push((left_target.clone(), right, *value)),
                        None => report.failures.push(CopyFailure {
                            master: master.name.clone(),
                            left: left_source.clone(),
                            right: right.clone(),
                            reason: KerningError::KeyResolutionFailure(right.clone()),
                        }),
                    }
                }
            }
            None => info!(
                "No left kerning found for {} in master {}",
                left_source, master.name
            ),
        }
        apply(font, &master.id, sets, &mut report);

        // Right side: every row kerning against the source group gets the
        // same value against the target group.
        let mut sets = Vec::new();
        if let Some(table) = font.kerning_for(&master.id) {
            for (left, row) in table.rows() {
                let Some(value) = row.get(&right_source) else {
                    continue;
                };
                match resolve_key(font, left) {
                    Some(left) => sets.push((left, right_target.clone(), *value)),
                    None => report.failures.push(CopyFailure {
                        master: master.name.clone(),
                        left: left.clone(),
                        right: right_source.clone(),
                        reason: KerningError::KeyResolutionFailure(left.clone()),
                    }),
                }
            }
        }
        apply(font, &master.id, sets, &mut report);

        info!(
            "Copied {} pairs from {} to {} in master {}",
            report.copied - before,
            source_group,
            target_group,
            master.name
        );
    }

    report
}

fn apply(
    font: &mut Font,
    master_id: &str,
    sets: Vec<(KerningKey, KerningKey, f64)>,
    report: &mut CopyReport,
) {
    if sets.is_empty() {
        return;
    }
    let table = font.kerning.entry(master_id.to_string()).or_default();
    for (left, right, value) in sets {
        debug!("{} {} = {}", left, right, value);
        let previous = table.set(left, right, value);
        report.copied += 1;
        if previous != Some(value) {
            report.changed += 1;
        }
    }
}

/// Parse lines like `A = AE` into (source, target) group names. Lines
/// without `=` or with an empty side are ignored.
pub fn parse_group_pairs(input: &str) -> Vec<(String, String)> {
    input
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(source, target)| (source.trim(), target.trim()))
        .filter(|(source, target)| !source.is_empty() && !target.is_empty())
        .map(|(source, target)| (source.to_string(), target.to_string()))
        .collect()
}
