//! Font loading, metrics and glyph outlines for OpenType fonts.
//!
//! Glyphcast sits above the table parsers in
//! [`glyphcast-read`](glyphcast_read). A [`Font`] reads every table it
//! understands, in dependency order, when it is created, and then answers
//! queries about metrics, names, character mapping and kerning. Glyph
//! outlines are decoded on request from either `glyf` or `CFF ` into a
//! common [`Outline`] representation that can be replayed into any
//! [`Pen`](types::Pen).
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use glyphcast::{types::PenCommand, Font, PathStyle};
//!
//! let data = std::fs::read("font.ttf")?;
//! let font = Font::new(&data)?;
//! if let Some(gid) = font.map_codepoint('A') {
//!     let glyph = font.try_glyph(gid)?;
//!     let mut commands: Vec<PenCommand> = Vec::new();
//!     glyph.outline.draw(PathStyle::default(), &mut commands)?;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

/// Expose our underlying parser crate.
pub extern crate glyphcast_read as read;

mod collection;
mod decycler;
mod dump;
mod error;
mod font;
pub mod outline;
mod string;

pub use collection::FontCollection;
pub use error::{CffError, DrawError, FontError, ReadError};
pub use font::{Font, Glyph, OutlineFormat};
pub use outline::{Contour, Outline, OutlinePoint, PathStyle, PointKind, ToPathError};
pub use string::NameEntry;

/// Public re-export of the glyphcast-types crate.
pub use glyphcast_read::types;
