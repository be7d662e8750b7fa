//! Reading OpenType tables
//!
//! This crate provides memory safe zero-allocation parsing of font files.
//! It attempts to provide raw access to the underlying font data as it is
//! described in the [OpenType specification][spec], plus the algorithms
//! needed to make that data useful: [mapping codepoints][cmap-impl] through
//! `cmap`, decoding `name` strings and evaluating CFF [charstrings].
//!
//! For higher level access to glyph outlines and metrics, use the
//! `glyphcast` crate instead.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use glyphcast_read::{FontRef, TableProvider};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! // Single fonts only. for font collections (.ttc) use FontRef::from_index
//! let font = FontRef::new(&font_bytes).expect("failed to read font data");
//! let head = font.head().expect("missing 'head' table");
//! let maxp = font.maxp().expect("missing 'maxp' table");
//!
//! println!("font revision {} containing {} glyphs", head.font_revision(), maxp.num_glyphs());
//! ```
//!
//! [spec]: https://learn.microsoft.com/en-us/typography/opentype/spec/
//! [cmap-impl]: tables::cmap::Cmap::map_codepoint
//! [charstrings]: tables::postscript::charstring

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod dispatch;
mod font_data;
mod read;
mod table_provider;
pub mod tables;

pub use dispatch::AnyTable;
pub use font_data::{Cursor, FontData};
pub use read::{FontRead, FontReadWithArgs, ReadArgs, ReadError};
pub use table_provider::{TableProvider, TopLevelTable};
pub use tables::directory::{TTCHeader, TableDirectory, TableRecord};

/// Public re-export of the glyphcast-types crate.
pub extern crate glyphcast_types as types;

use types::{Tag, CFF_SFNT_VERSION, TRUE_SFNT_VERSION, TTC_HEADER_TAG, TT_SFNT_VERSION};

#[derive(Clone)]
/// Reference to the content of a font or font collection file.
pub enum FileRef<'a> {
    /// A single font.
    Font(FontRef<'a>),
    /// A collection of fonts.
    Collection(CollectionRef<'a>),
}

impl<'a> FileRef<'a> {
    /// Creates a new reference to a file representing a font or font collection.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        Ok(if let Ok(collection) = CollectionRef::new(data) {
            Self::Collection(collection)
        } else {
            Self::Font(FontRef::new(data)?)
        })
    }

    /// Returns an iterator over the fonts contained in the file.
    pub fn fonts(&self) -> impl Iterator<Item = Result<FontRef<'a>, ReadError>> + 'a + Clone {
        let (iter_one, iter_two) = match self {
            Self::Font(font) => (Some(Ok(font.clone())), None),
            Self::Collection(collection) => (None, Some(collection.iter())),
        };
        iter_two.into_iter().flatten().chain(iter_one)
    }
}

/// Reference to the content of a font collection file.
///
/// Every member shares the collection's byte buffer; table offsets in each
/// member's directory are relative to the start of the file.
#[derive(Clone)]
pub struct CollectionRef<'a> {
    data: FontData<'a>,
    header: TTCHeader<'a>,
}

impl<'a> CollectionRef<'a> {
    /// Creates a new reference to a font collection.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        let data = FontData::new(data);
        let header = TTCHeader::read(data)?;
        if header.ttc_tag() != TTC_HEADER_TAG {
            Err(ReadError::InvalidTtc(header.ttc_tag()))
        } else {
            Ok(Self { data, header })
        }
    }

    /// Returns the number of fonts in the collection.
    pub fn len(&self) -> u32 {
        self.header.num_fonts()
    }

    /// Returns true if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The parsed collection header.
    pub fn header(&self) -> &TTCHeader<'a> {
        &self.header
    }

    /// Returns the font in the collection at the specified index.
    pub fn get(&self, index: u32) -> Result<FontRef<'a>, ReadError> {
        let offset = self
            .header
            .table_directory_offsets()
            .get(index as usize)
            .ok_or(ReadError::InvalidCollectionIndex(index))?
            .get() as usize;
        FontRef::with_offsets_impl(self.data, offset, 0, Some(index))
    }

    /// Returns an iterator over the fonts in the collection.
    pub fn iter(&self) -> impl Iterator<Item = Result<FontRef<'a>, ReadError>> + 'a + Clone {
        let copy = self.clone();
        (0..self.len()).map(move |ix| copy.get(ix))
    }
}

/// Reference to an in-memory font.
///
/// This is a simple implementation of the [`TableProvider`] trait backed
/// by a borrowed slice containing font data.
#[derive(Clone)]
pub struct FontRef<'a> {
    data: FontData<'a>,
    table_directory: TableDirectory<'a>,
    /// Offset of the table directory within `data`.
    directory_offset: usize,
    /// Table record offsets are relative to this position in `data`.
    tables_origin: usize,
    /// The index of this font in a TrueType collection
    ttc_index: Option<u32>,
    // In principle, fonts are required to have a sorted table directory,
    // but certain fonts don't seem to follow that requirement.
    table_directory_sorted: bool,
}

impl<'a> FontRef<'a> {
    /// Creates a new reference to an in-memory font backed by the given data.
    ///
    /// The data must be a single font (not a font collection) and must begin
    /// with a table directory to be considered valid.
    ///
    /// To load a font from a font collection, use [`FontRef::from_index`] instead.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        Self::with_offsets_impl(FontData::new(data), 0, 0, None)
    }

    /// Creates a reference to a font whose table directory begins at
    /// `directory_offset` and whose table offsets are relative to
    /// `tables_origin`.
    ///
    /// This is used for fonts embedded in other containers, where both
    /// positions may be non-zero.
    pub fn with_offsets(
        data: &'a [u8],
        directory_offset: usize,
        tables_origin: usize,
    ) -> Result<Self, ReadError> {
        Self::with_offsets_impl(FontData::new(data), directory_offset, tables_origin, None)
    }

    /// Creates a new reference to an in-memory font at the specified index
    /// backed by the given data.
    ///
    /// This accepts either font collection (ttc) or single font (ttf/otf)
    /// files. If a single font file is provided, the index parameter must be 0.
    pub fn from_index(data: &'a [u8], index: u32) -> Result<Self, ReadError> {
        match FileRef::new(data)? {
            FileRef::Font(font) => {
                if index == 0 {
                    Ok(font)
                } else {
                    Err(ReadError::InvalidCollectionIndex(index))
                }
            }
            FileRef::Collection(collection) => collection.get(index),
        }
    }

    /// Returns an iterator over all of the available fonts in
    /// the given font data.
    pub fn fonts(
        data: &'a [u8],
    ) -> impl Iterator<Item = Result<FontRef<'a>, ReadError>> + 'a + Clone {
        let count = match FileRef::new(data) {
            Ok(FileRef::Font(_)) => 1,
            Ok(FileRef::Collection(ttc)) => ttc.len(),
            _ => 0,
        };
        (0..count).map(move |idx| FontRef::from_index(data, idx))
    }

    fn with_offsets_impl(
        data: FontData<'a>,
        directory_offset: usize,
        tables_origin: usize,
        ttc_index: Option<u32>,
    ) -> Result<Self, ReadError> {
        let directory_data = data
            .split_off(directory_offset)
            .ok_or(ReadError::OutOfBounds)?;
        let table_directory = TableDirectory::read(directory_data)?;
        let sfnt_version = table_directory.sfnt_version();
        if ![TT_SFNT_VERSION, CFF_SFNT_VERSION, TRUE_SFNT_VERSION].contains(&sfnt_version) {
            return Err(ReadError::InvalidSfnt(sfnt_version));
        }
        let available = data.len().saturating_sub(tables_origin);
        for record in table_directory.table_records() {
            let end = record.offset() as u64 + record.length() as u64;
            if tables_origin > data.len() || end > available as u64 {
                return Err(ReadError::TableOutOfBounds(record.tag()));
            }
        }
        let table_directory_sorted = table_directory.is_sorted();
        Ok(FontRef {
            data,
            table_directory,
            directory_offset,
            tables_origin,
            ttc_index,
            table_directory_sorted,
        })
    }

    /// Returns the underlying font data.
    ///
    /// This is the base from which tables are loaded, meaning that for
    /// TrueType collection files, this will be the entire font file data.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }

    /// If the font is in a TrueType collection (ttc) file, returns the index
    /// of the font in that collection.
    pub fn ttc_index(&self) -> Option<u32> {
        self.ttc_index
    }

    /// Offset of the table directory in the underlying data.
    pub fn directory_offset(&self) -> usize {
        self.directory_offset
    }

    /// Position that table offsets are relative to.
    pub fn tables_origin(&self) -> usize {
        self.tables_origin
    }

    /// Returns the associated table directory.
    pub fn table_directory(&self) -> &TableDirectory<'a> {
        &self.table_directory
    }

    /// Returns the directory record for the table with the given tag.
    pub fn table_record(&self, tag: Tag) -> Option<&'a TableRecord> {
        let records = self.table_directory.table_records();
        let idx = if self.table_directory_sorted {
            records.binary_search_by(|rec| rec.tag().cmp(&tag)).ok()
        } else {
            records.iter().position(|rec| rec.tag() == tag)
        };
        idx.and_then(|idx| records.get(idx))
    }

    /// Returns the data for the table with the specified tag, if present.
    pub fn table_data(&self, tag: Tag) -> Option<FontData<'a>> {
        let record = self.table_record(tag)?;
        let start = self.tables_origin.checked_add(record.offset() as usize)?;
        let len = record.length() as usize;
        self.data.slice(start..start.checked_add(len)?)
    }
}

impl<'a> TableProvider<'a> for FontRef<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_data(tag)
    }
}
