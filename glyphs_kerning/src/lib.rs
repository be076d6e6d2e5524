//! Kerning group and metrics tools for multi-master fonts.
//!
//! The font is an explicit [`Font`] value, loaded from UFO sources with a
//! [`SourceSet`] and passed to every operation:
//!
//! - [`adjust_pairs_involving`] shifts every pair that involves the kerning
//!   groups of some glyphs,
//! - [`copy_group_values`] copies the kerning of one group name to another,
//! - [`find_unused_anchors`] lists base glyph anchors nothing attaches to,
//! - [`copy_sidebearings`] copies sidebearings from one font to another,
//! - [`GlyphTimer`] books working time per glyph on selection changes.

mod adjust;
mod anchors;
mod copy_groups;
mod error;
mod font;
mod kerning;
mod key;
mod norad_interop;
mod sidebearings;
mod sources;
mod timer;

pub use adjust::{
    adjust_pairs_involving, parse_delta, parse_glyph_list, resolve_effective_keys,
    AdjustmentReport, GlyphAdjustment,
};
pub use anchors::{find_unused_anchors, UnusedAnchorReport};
pub use copy_groups::{
    copy_group_values, parse_group_pairs, resolve_key, CopyFailure, CopyReport,
};
pub use error::KerningError;
pub use font::{Anchor, Component, Font, FontMaster, Glyph, Layer, Node, NodeType, Path};
pub use kerning::KerningTable;
pub use key::{KerningKey, Side};
pub use sidebearings::{copy_sidebearings, GlyphScope, SidebearingReport};
pub use sources::SourceSet;
pub use timer::{format_duration, GlyphTimer, HISTORY_LEN};
