use std::path::Path;

use anyhow::{bail, Context};
use glyphs_kerning::{
    adjust_pairs_involving, copy_group_values, parse_delta, parse_glyph_list,
    parse_group_pairs, CopyReport,
};

use crate::{load_font, save_font};

pub fn command_adjust(
    font_path: &Path,
    master: Option<&str>,
    glyphs: &str,
    value: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let delta = parse_delta(value).context("Invalid --value")?;
    let glyph_names = parse_glyph_list(glyphs);
    if glyph_names.is_empty() {
        bail!("No glyph names given in --glyphs");
    }

    let (sources, mut font) = load_font(font_path)?;
    let master = match master {
        Some(master) => master.to_string(),
        None => font
            .font_master
            .first()
            .map(|m| m.id.clone())
            .context("The font has no masters")?,
    };

    let report = adjust_pairs_involving(&mut font, &master, &glyph_names, delta)?;
    for glyph in &report.glyphs {
        if glyph.found {
            println!("{}: {} pairs", glyph.glyph, glyph.pairs);
        }
    }
    let missing: Vec<&str> = report.missing_glyphs().collect();
    if !missing.is_empty() {
        println!("Not in font: {}", missing.join(", "));
    }
    println!(
        "Adjusted {} pairs by {} in {}",
        report.total, report.delta, report.master
    );

    if dry_run || report.total == 0 {
        return Ok(());
    }
    save_font(sources, &font, font_path)
}

pub fn command_copy_groups(
    font_path: &Path,
    pairs: &[String],
    masters: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let group_pairs = parse_group_pairs(&pairs.join("\n"));
    if group_pairs.len() != pairs.len() {
        bail!("Every --pair must look like SOURCE=TARGET");
    }

    let (sources, mut font) = load_font(font_path)?;
    let masters: Vec<String> = if masters.is_empty() {
        font.font_master.iter().map(|m| m.id.clone()).collect()
    } else {
        masters.to_vec()
    };

    let mut report = CopyReport::default();
    for (source_group, target_group) in &group_pairs {
        report.merge(copy_group_values(
            &mut font,
            &masters,
            source_group,
            target_group,
        ));
    }

    for failure in &report.failures {
        println!(
            "{}: {} {} not copied: {}",
            failure.master, failure.left, failure.right, failure.reason
        );
    }
    if !report.missing_masters.is_empty() {
        println!("Unknown masters: {}", report.missing_masters.join(", "));
    }
    println!(
        "Copied {} pairs, {} changed",
        report.copied, report.changed
    );

    if dry_run || report.changed == 0 {
        return Ok(());
    }
    save_font(sources, &font, font_path)
}
