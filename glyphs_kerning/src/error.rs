use std::path::PathBuf;

use crate::key::KerningKey;

#[derive(Debug, thiserror::Error)]
pub enum KerningError {
    #[error("glyph '{0}' not found")]
    GlyphNotFound(String),
    #[error("kerning key '{0}' no longer refers to a glyph")]
    KeyResolutionFailure(KerningKey),
    #[error("'{0}' is not a valid number")]
    InvalidNumericInput(String),
    #[error("master '{0}' not found")]
    MasterNotFound(String),
    #[error("none of the selected glyphs exist in the source font")]
    EmptySelection,
    #[error("unsupported source '{}', expected a .ufo or .designspace", .0.display())]
    UnsupportedSource(PathBuf),
    #[error("cannot load UFO '{}'", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: norad::error::FontLoadError,
    },
    #[error("cannot load Designspace")]
    Designspace(#[from] norad::error::DesignSpaceLoadError),
    #[error("cannot save UFO '{}'", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: norad::error::FontWriteError,
    },
    #[error(transparent)]
    Naming(#[from] norad::error::NamingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
