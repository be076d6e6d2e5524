use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use glyphs_kerning::{format_duration, GlyphTimer};

use crate::{load_font, save_font};

/// Read selected glyph names from stdin, one per line, and book the time
/// between lines on the glyph that was selected.
pub fn command_race(font_path: &Path, reset: bool, dry_run: bool) -> anyhow::Result<()> {
    let (sources, mut font) = load_font(font_path)?;
    let mut timer = GlyphTimer::new(None, Instant::now());
    timer.load_totals(&font);
    if reset {
        timer.reset(Instant::now());
        println!("All glyph timers reset");
    }

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let glyph = line.trim();
        if glyph.is_empty() {
            continue;
        }
        if font.get_glyph(glyph).is_none() {
            log::warn!("{} is not in the font", glyph);
        }
        if let Some((previous, total)) = timer.select(glyph, Instant::now()) {
            println!("{} ⏱ {}", previous, format_duration(total));
        }
    }

    let now = Instant::now();
    let summary = timer.summary(&font, now);
    if let Some((glyph, total)) = timer.finish(now) {
        println!("{} ⏱ {}", glyph, format_duration(total));
    }
    for (glyph, total) in summary {
        println!("{:>8}  {}", format_duration(total), glyph);
    }

    if dry_run {
        return Ok(());
    }
    timer.store_totals(&mut font);
    save_font(sources, &font, font_path)
}
