//! Common scalar data types used in font files.
//!
//! Everything here reads and writes big-endian bytes; the table parsers in
//! `glyphcast-read` are built on these types.

#![cfg_attr(not(feature = "bytemuck"), forbid(unsafe_code))]
#![deny(rustdoc::broken_intra_doc_links)]

mod fixed;
mod glyph_id;
mod longdatetime;
mod name_id;
mod pen;
mod point;
pub mod raw;
mod tag;
mod version;

pub use fixed::{F2Dot14, Fixed};
pub use glyph_id::{GlyphId, GlyphId16};
pub use longdatetime::LongDateTime;
pub use name_id::NameId;
pub use pen::{Pen, PenCommand};
pub use point::Point;
pub use raw::{BigEndian, FixedSize, Scalar};
pub use tag::{InvalidTag, Tag};
pub use version::{MajorMinor, Version16Dot16};

/// The header tag for a font collection file.
pub const TTC_HEADER_TAG: Tag = Tag::new(b"ttcf");

/// The sfnt version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The sfnt version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
/// The legacy Apple sfnt version for TrueType outlines.
pub const TRUE_SFNT_VERSION: u32 = 0x74727565;
