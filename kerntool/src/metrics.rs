use std::path::Path;

use glyphs_kerning::{copy_sidebearings, find_unused_anchors, parse_glyph_list, GlyphScope};

use crate::{load_font, save_font};

pub fn command_lost_anchors(font_path: &Path) -> anyhow::Result<()> {
    let (_, font) = load_font(font_path)?;
    let report = find_unused_anchors(&font);
    if report.is_empty() {
        println!("No lost anchors");
    }
    for (glyph, anchors) in &report.glyphs {
        println!("{}: {}", glyph, anchors.join(", "));
    }
    Ok(())
}

pub fn command_copy_sidebearings(
    source_path: &Path,
    destination_path: &Path,
    glyphs: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let scope = match glyphs {
        Some(glyphs) => GlyphScope::Selected(parse_glyph_list(glyphs)),
        None => GlyphScope::All,
    };

    let (_, source) = load_font(source_path)?;
    let (destination_sources, mut destination) = load_font(destination_path)?;

    let report = copy_sidebearings(&source, &mut destination, &scope)?;
    println!("Copied sidebearings of {} glyphs", report.copied.len());
    if !report.not_in_destination.is_empty() {
        println!(
            "Not in {}: {}",
            destination_path.display(),
            report.not_in_destination.join(", ")
        );
    }
    if !report.not_in_source.is_empty() {
        println!(
            "Not in {}: {}",
            source_path.display(),
            report.not_in_source.join(", ")
        );
    }

    if dry_run || report.copied.is_empty() {
        return Ok(());
    }
    save_font(destination_sources, &destination, destination_path)
}
