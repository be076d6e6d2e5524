//! Track how long is spent on each glyph between selection changes.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::font::Font;

/// How many recently worked-on glyphs the history keeps.
pub const HISTORY_LEN: usize = 40;

/// Accumulates working time per glyph name.
///
/// The caller feeds selection changes together with the time they happened,
/// so the timer itself never reads a clock. Totals carry over between
/// sessions through [`Glyph::timer`](crate::Glyph::timer), see
/// [`GlyphTimer::load_totals`] and [`GlyphTimer::store_totals`].
#[derive(Debug)]
pub struct GlyphTimer {
    current: Option<String>,
    started: Instant,
    totals: HashMap<String, Duration>,
    /// Unique glyph names, oldest first.
    history: VecDeque<String>,
    /// Glyphs booked on since the totals were loaded.
    booked: HashSet<String>,
    /// Set by [`GlyphTimer::reset`]: stored totals have to be cleared too.
    cleared: bool,
}

impl GlyphTimer {
    pub fn new(selected: Option<&str>, now: Instant) -> Self {
        GlyphTimer {
            current: selected.map(str::to_string),
            started: now,
            totals: HashMap::new(),
            history: VecDeque::new(),
            booked: HashSet::new(),
            cleared: false,
        }
    }

    /// Continue from the totals stored in `font`.
    pub fn load_totals(&mut self, font: &Font) {
        for glyph in &font.glyphs {
            let Some(total) = glyph.timer.and_then(|s| Duration::try_from_secs_f64(s).ok()) else {
                continue;
            };
            self.totals.insert(glyph.name().to_string(), total);
        }
    }

    /// Write the totals booked this session into `font`. After a
    /// [`GlyphTimer::reset`] every stored total not booked since is removed.
    pub fn store_totals(&self, font: &mut Font) {
        for glyph in &mut font.glyphs {
            if self.booked.contains(glyph.name()) {
                glyph.timer = Some(self.total(glyph.name()).as_secs_f64());
            } else if self.cleared {
                glyph.timer = None;
            }
        }
    }

    /// Record that `glyph` is selected at `now`. When this is a different
    /// glyph than before, the time since the last change is booked on the
    /// previous glyph and its new total is returned.
    pub fn select(&mut self, glyph: &str, now: Instant) -> Option<(String, Duration)> {
        if self.current.as_deref() == Some(glyph) {
            return None;
        }
        let previous = self.current.replace(glyph.to_string());
        self.book(previous, now)
    }

    /// End the session: book the running time on the selected glyph, which
    /// is deselected.
    pub fn finish(&mut self, now: Instant) -> Option<(String, Duration)> {
        let previous = self.current.take();
        self.book(previous, now)
    }

    fn book(&mut self, previous: Option<String>, now: Instant) -> Option<(String, Duration)> {
        let elapsed = now.saturating_duration_since(self.started);
        self.started = now;
        let previous = previous?;

        self.booked.insert(previous.clone());
        let total = self.totals.entry(previous.clone()).or_default();
        *total += elapsed;
        let total = *total;

        self.history.retain(|name| *name != previous);
        self.history.push_back(previous.clone());
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }

        log::info!("{} ⏱ {}", previous, format_duration(total));
        Some((previous, total))
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Booked time for a glyph, not counting a running session.
    pub fn total(&self, glyph: &str) -> Duration {
        self.totals.get(glyph).copied().unwrap_or_default()
    }

    /// The selected glyph and its time including the running session.
    pub fn current_total(&self, now: Instant) -> Option<(&str, Duration)> {
        let current = self.current.as_deref()?;
        Some((current, self.live_total(current, now)))
    }

    /// Recently worked-on glyphs still in `font`, newest first.
    pub fn summary(&self, font: &Font, now: Instant) -> Vec<(String, Duration)> {
        self.history
            .iter()
            .rev()
            .filter(|name| font.get_glyph(name).is_some())
            .map(|name| (name.clone(), self.live_total(name, now)))
            .collect()
    }

    /// Forget all booked time and history. The current selection keeps
    /// running from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.totals.clear();
        self.history.clear();
        self.booked.clear();
        self.cleared = true;
        self.started = now;
        log::info!("All glyph timers reset");
    }

    fn live_total(&self, glyph: &str, now: Instant) -> Duration {
        let mut total = self.total(glyph);
        if self.current.as_deref() == Some(glyph) {
            total += now.saturating_duration_since(self.started);
        }
        total
    }
}

/// `mm:ss`, minutes are not wrapped into hours.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
