//! Errors produced while loading fonts and decoding glyphs.

use thiserror::Error;

use crate::outline::path::ToPathError;
use crate::types::{GlyphId, Tag};

pub use glyphcast_read::{tables::postscript::Error as CffError, ReadError};

/// An error that prevents a font from loading.
///
/// Nothing is returned alongside these; a font either loads completely or
/// not at all.
#[derive(Clone, Debug, Error)]
pub enum FontError {
    /// The table directory or collection header could not be read.
    #[error("malformed font container: {0}")]
    Container(ReadError),
    /// One of `head`, `hhea`, `maxp` or `hmtx` (or half of the `loca`/`glyf`
    /// pair) is absent from the directory.
    #[error("missing required table '{0}'")]
    MissingRequiredTable(Tag),
    /// A table is present but could not be parsed.
    #[error("malformed '{tag}' table: {source}")]
    MalformedTable {
        tag: Tag,
        #[source]
        source: ReadError,
    },
    /// The `CFF ` table could not be parsed.
    #[error("malformed 'CFF ' table: {0}")]
    MalformedCff(#[source] CffError),
    /// The requested font is not in the collection.
    #[error("no font at index {0} in the collection")]
    InvalidCollectionIndex(u32),
}

/// An error that prevents a single glyph from being decoded.
///
/// The rest of the font remains usable.
#[derive(Clone, Debug, Error)]
pub enum DrawError {
    /// The requested glyph was not present in the font.
    #[error("glyph {0} was not found in the font")]
    GlyphNotFound(GlyphId),
    /// Error occurred when reading font data.
    #[error("{0}")]
    Read(#[from] ReadError),
    /// Error occurred while evaluating a CFF charstring.
    #[error("{0}")]
    PostScript(#[from] CffError),
    /// A composite glyph refers back to itself through its components.
    #[error("composite glyph {0} refers to itself")]
    CompositeCycle(GlyphId),
    /// Composite glyphs are nested too deeply.
    #[error(
        "recursion limit ({}) exceeded when loading composite component {}",
        crate::outline::GLYF_COMPOSITE_RECURSION_LIMIT,
        .0.to_u32()
    )]
    RecursionLimitExceeded(GlyphId),
    /// An anchor point had invalid indices.
    #[error("invalid anchor point index ({1}) for composite glyph {0}")]
    InvalidAnchorPoint(GlyphId, u16),
    /// The outline could not be replayed into a pen.
    #[error("{0}")]
    ToPath(#[from] ToPathError),
}
