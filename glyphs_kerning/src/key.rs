//! Kerning table keys.
//!
//! Glyphs.app spells group keys as `@MMK_L_<group>` / `@MMK_R_<group>` and
//! UFO as `public.kern1.<group>` / `public.kern2.<group>`. Inside the crate
//! both are the same tagged value, and the prefixes only exist when parsing
//! or printing.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

const GLYPHS_LEFT_PREFIX: &str = "@MMK_L_";
const GLYPHS_RIGHT_PREFIX: &str = "@MMK_R_";
const UFO_LEFT_PREFIX: &str = "public.kern1.";
const UFO_RIGHT_PREFIX: &str = "public.kern2.";

/// Which side of a pair a kerning group applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The first glyph of a pair.
    Left,
    /// The second glyph of a pair.
    Right,
}

/// One side of a kerning pair: a glyph or a kerning group. Ordering puts
/// glyph names before ids before groups, which keeps table rows stable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KerningKey {
    /// A single glyph, by name.
    Glyph(String),
    /// A single glyph, by its opaque id.
    GlyphId(Uuid),
    /// Every glyph assigned to the named kerning group on `Side`.
    Group(Side, String),
}

impl Side {
    fn glyphs_prefix(self) -> &'static str {
        match self {
            Side::Left => GLYPHS_LEFT_PREFIX,
            Side::Right => GLYPHS_RIGHT_PREFIX,
        }
    }

    fn ufo_prefix(self) -> &'static str {
        match self {
            Side::Left => UFO_LEFT_PREFIX,
            Side::Right => UFO_RIGHT_PREFIX,
        }
    }
}

impl KerningKey {
    pub fn glyph(name: impl Into<String>) -> Self {
        KerningKey::Glyph(name.into())
    }

    pub fn group(side: Side, name: impl Into<String>) -> Self {
        KerningKey::Group(side, name.into())
    }

    pub fn left_group(name: impl Into<String>) -> Self {
        KerningKey::Group(Side::Left, name.into())
    }

    pub fn right_group(name: impl Into<String>) -> Self {
        KerningKey::Group(Side::Right, name.into())
    }

    pub fn is_group(&self) -> bool {
        matches!(self, KerningKey::Group(..))
    }

    /// Parse a key as written in a UFO `kerning.plist`.
    pub fn from_ufo_name(name: &str) -> Self {
        for side in [Side::Left, Side::Right] {
            if let Some(group) = name.strip_prefix(side.ufo_prefix()) {
                return KerningKey::Group(side, group.to_string());
            }
        }
        KerningKey::Glyph(name.to_string())
    }

    /// The key as written in a UFO `kerning.plist`. Glyph ids have no UFO
    /// spelling and must be resolved to a name first.
    pub fn to_ufo_name(&self) -> Option<String> {
        match self {
            KerningKey::Glyph(name) => Some(name.clone()),
            KerningKey::GlyphId(_) => None,
            KerningKey::Group(side, group) => Some(format!("{}{}", side.ufo_prefix(), group)),
        }
    }
}

impl FromStr for KerningKey {
    type Err = Infallible;

    /// Glyphs.app spelling: `@MMK_L_x`, `@MMK_R_x`, a hyphenated UUID for a
    /// glyph id, or a plain glyph name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for side in [Side::Left, Side::Right] {
            if let Some(group) = s.strip_prefix(side.glyphs_prefix()) {
                return Ok(KerningKey::Group(side, group.to_string()));
            }
        }
        if s.len() == 36 {
            if let Ok(id) = Uuid::parse_str(s) {
                return Ok(KerningKey::GlyphId(id));
            }
        }
        Ok(KerningKey::Glyph(s.to_string()))
    }
}

impl fmt::Display for KerningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KerningKey::Glyph(name) => f.write_str(name),
            KerningKey::GlyphId(id) => write!(f, "{:X}", id),
            KerningKey::Group(side, group) => write!(f, "{}{}", side.glyphs_prefix(), group),
        }
    }
}
