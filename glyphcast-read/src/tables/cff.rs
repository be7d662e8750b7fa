//! The [CFF](https://learn.microsoft.com/en-us/typography/opentype/spec/cff) table

use types::{GlyphId, Tag};

use super::postscript::{
    charstring::{self, CommandSink},
    dict::{PrivateDict, TopDict},
    Charset, Error, Index, Latin1String, StringId,
};
use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// 'CFF '
pub const TAG: Tag = Tag::new(b"CFF ");

/// The fixed header at the start of a CFF table.
///
/// See "Header" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=13>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CffHeader {
    pub major: u8,
    pub minor: u8,
    /// Size of the header in bytes; the Name INDEX follows it.
    pub hdr_size: u8,
    /// Size of absolute offsets in the table.
    pub off_size: u8,
}

/// The [Compact Font Format](https://learn.microsoft.com/en-us/typography/opentype/spec/cff) table.
#[derive(Clone, Copy)]
pub struct Cff<'a> {
    data: FontData<'a>,
    header: CffHeader,
    names: Index<'a>,
    top_dicts: Index<'a>,
    strings: Index<'a>,
    global_subrs: Index<'a>,
}

impl<'a> Cff<'a> {
    /// Parses the header and the four INDEX structures that follow it.
    pub fn new(data: FontData<'a>) -> Result<Self, Error> {
        let mut cursor = data.cursor();
        let header = CffHeader {
            major: cursor.read()?,
            minor: cursor.read()?,
            hdr_size: cursor.read()?,
            off_size: cursor.read()?,
        };
        if header.major != 1 {
            return Err(ReadError::InvalidFormat(header.major as i64).into());
        }
        let mut pos = header.hdr_size as usize;
        let mut next_index = || -> Result<Index<'a>, Error> {
            let index_data = data.split_off(pos).ok_or(ReadError::OutOfBounds)?;
            let index = Index::new(index_data.as_bytes())?;
            pos += index.size_in_bytes();
            Ok(index)
        };
        let names = next_index()?;
        let top_dicts = next_index()?;
        let strings = next_index()?;
        let global_subrs = next_index()?;
        Ok(Self {
            data,
            header,
            names,
            top_dicts,
            strings,
            global_subrs,
        })
    }

    /// The raw table data; DICT offsets are relative to its start.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    pub fn header(&self) -> CffHeader {
        self.header
    }

    /// Returns the name index.
    ///
    /// This contains the PostScript names of all fonts in the font set.
    ///
    /// See "Name INDEX" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=13>
    pub fn names(&self) -> Index<'a> {
        self.names
    }

    /// Returns the PostScript name for the font in the font set at the
    /// given index.
    pub fn name(&self, index: usize) -> Option<Latin1String<'a>> {
        Some(Latin1String::new(self.names.get(index).ok()?))
    }

    /// Returns the top dict index.
    ///
    /// This contains the top-level DICTs of all fonts in the font set. The
    /// objects here correspond to those in the name index.
    ///
    /// See "Top DICT INDEX" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=14>
    pub fn top_dicts(&self) -> Index<'a> {
        self.top_dicts
    }

    /// Parses the top dict of the font at the given index.
    pub fn top_dict(&self, index: usize) -> Result<TopDict, Error> {
        TopDict::parse(self.top_dicts.get(index)?)
    }

    /// Returns the string index.
    ///
    /// This contains all of the strings used by fonts within the font set.
    /// They are referenced by string identifiers represented by the
    /// [`StringId`] type.
    ///
    /// See "String INDEX" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=17>
    pub fn strings(&self) -> Index<'a> {
        self.strings
    }

    /// Returns the associated string for the given identifier.
    ///
    /// If the identifier does not represent a standard string, the result is
    /// looked up in the string index.
    pub fn string(&self, id: StringId) -> Option<Latin1String<'a>> {
        match id.standard_string() {
            Ok(name) => Some(name),
            Err(ix) => self.strings.get(ix).ok().map(Latin1String::new),
        }
    }

    /// Returns the global subroutine index.
    ///
    /// This contains sub-programs that are referenced by one or more
    /// charstrings in the font set.
    ///
    /// See "Local/Global Subrs INDEXes" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=25>
    pub fn global_subrs(&self) -> Index<'a> {
        self.global_subrs
    }

    /// Number of fonts in the font set.
    pub fn num_fonts(&self) -> u32 {
        self.top_dicts.count()
    }

    /// Resolves everything needed to draw the glyphs of the font at the
    /// given index.
    pub fn font(&self, index: usize) -> Result<CffFont<'a>, Error> {
        CffFont::new(*self, index)
    }
}

impl TopLevelTable for Cff<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Cff<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Cff::new(data).map_err(|e| match e {
            Error::Read(e) => e,
            _ => ReadError::MalformedData("invalid CFF INDEX"),
        })
    }
}

impl std::fmt::Debug for Cff<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cff")
            .field("header", &self.header)
            .field("names", &self.names.iter().map(Latin1String::new).collect::<Vec<_>>())
            .field("top_dicts", &self.top_dicts)
            .field("strings", &self.strings)
            .field("global_subrs", &self.global_subrs)
            .finish()
    }
}

/// A single font of a CFF font set, with its dictionaries resolved.
#[derive(Clone)]
pub struct CffFont<'a> {
    cff: Cff<'a>,
    index: usize,
    top_dict: TopDict,
    charstrings: Index<'a>,
    private_dict: PrivateDict,
    subrs: Option<Index<'a>>,
    charset: Option<Charset<'a>>,
}

impl<'a> CffFont<'a> {
    fn new(cff: Cff<'a>, index: usize) -> Result<Self, Error> {
        let data = cff.offset_data();
        let top_dict = cff.top_dict(index)?;
        let charstrings = Index::new(
            data.split_off(top_dict.charstrings_offset)
                .ok_or(ReadError::OutOfBounds)?
                .as_bytes(),
        )?;
        let (private_dict, subrs) = match &top_dict.private_dict_range {
            Some(range) => {
                let private_data = data.slice(range.clone()).ok_or(ReadError::OutOfBounds)?;
                let private_dict = PrivateDict::parse(private_data.as_bytes())?;
                // the Subrs offset is relative to the Private DICT
                let subrs = match private_dict.subrs_offset {
                    Some(offset) => {
                        let start = range
                            .start
                            .checked_add(offset)
                            .ok_or(ReadError::OutOfBounds)?;
                        let subrs_data = data.split_off(start).ok_or(ReadError::OutOfBounds)?;
                        Some(Index::new(subrs_data.as_bytes())?)
                    }
                    None => None,
                };
                (private_dict, subrs)
            }
            None => (PrivateDict::default(), None),
        };
        // CID-keyed charsets map to CIDs, which have no glyph names
        let charset = if top_dict.is_cid {
            None
        } else {
            Some(Charset::new(
                data,
                top_dict.charset_offset,
                charstrings.count(),
            )?)
        };
        Ok(Self {
            cff,
            index,
            top_dict,
            charstrings,
            private_dict,
            subrs,
            charset,
        })
    }

    /// The position of this font in the font set.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cff(&self) -> &Cff<'a> {
        &self.cff
    }

    pub fn name(&self) -> Option<Latin1String<'a>> {
        self.cff.name(self.index)
    }

    pub fn top_dict(&self) -> &TopDict {
        &self.top_dict
    }

    pub fn private_dict(&self) -> &PrivateDict {
        &self.private_dict
    }

    /// Returns the charstrings index.
    ///
    /// See "CharStrings INDEX" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=23>
    pub fn charstrings(&self) -> Index<'a> {
        self.charstrings
    }

    /// The number of glyphs, as given by the CharStrings INDEX.
    pub fn num_glyphs(&self) -> u32 {
        self.charstrings.count()
    }

    /// Local subroutines from the Private DICT, if any.
    pub fn subrs(&self) -> Option<Index<'a>> {
        self.subrs
    }

    /// The character set; `None` for CID-keyed fonts.
    ///
    /// See "Charsets" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=21>
    pub fn charset(&self) -> Option<&Charset<'a>> {
        self.charset.as_ref()
    }

    /// Returns the name of the given glyph, as mapped by the charset.
    pub fn glyph_name(&self, glyph_id: GlyphId) -> Option<Latin1String<'a>> {
        let sid = self.charset.as_ref()?.string_id(glyph_id).ok()?;
        self.cff.string(sid)
    }

    /// Width of glyphs whose charstring has no width operand.
    pub fn default_width(&self) -> f64 {
        self.private_dict.default_width_x
    }

    /// Base added to the width operand of a charstring.
    pub fn nominal_width(&self) -> f64 {
        self.private_dict.nominal_width_x
    }

    /// Evaluates the charstring of the given glyph into `sink`.
    pub fn evaluate_glyph(
        &self,
        glyph_id: GlyphId,
        sink: &mut impl CommandSink,
    ) -> Result<(), Error> {
        let charstring = self.charstrings.get(glyph_id.to_u32() as usize)?;
        charstring::evaluate(charstring, self.cff.global_subrs, self.subrs, sink)
    }
}

impl std::fmt::Debug for CffFont<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CffFont")
            .field("index", &self.index)
            .field("top_dict", &self.top_dict)
            .field("private_dict", &self.private_dict)
            .field("num_glyphs", &self.num_glyphs())
            .field("subrs", &self.subrs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fixed;
    use glyphcast_test_data::fonts;

    #[derive(Default)]
    struct Sink {
        widths: Vec<Fixed>,
        points: Vec<(Fixed, Fixed)>,
    }

    impl CommandSink for Sink {
        fn move_to(&mut self, x: Fixed, y: Fixed) {
            self.points.push((x, y));
        }

        fn line_to(&mut self, x: Fixed, y: Fixed) {
            self.points.push((x, y));
        }

        fn curve_to(&mut self, _: Fixed, _: Fixed, _: Fixed, _: Fixed, x: Fixed, y: Fixed) {
            self.points.push((x, y));
        }

        fn close(&mut self) {}

        fn width(&mut self, width: Fixed) {
            self.widths.push(width);
        }
    }

    #[test]
    fn read_header_and_indexes() {
        let data = fonts::cff_table();
        let cff = Cff::read(FontData::new(&data)).unwrap();
        assert_eq!(
            cff.header(),
            CffHeader {
                major: 1,
                minor: 0,
                hdr_size: 4,
                off_size: 4
            }
        );
        assert_eq!(cff.num_fonts(), 1);
        assert_eq!(cff.name(0).unwrap(), "GlyphcastCFF");
        assert!(cff.name(1).is_none());
        assert_eq!(cff.strings().count(), 244);
        assert_eq!(cff.global_subrs().count(), 1);
    }

    #[test]
    fn strings() {
        let data = fonts::cff_table();
        let cff = Cff::read(FontData::new(&data)).unwrap();
        assert_eq!(cff.string(StringId::new(34)).unwrap(), "A");
        assert_eq!(cff.string(StringId::new(391)).unwrap(), "glyph256");
        assert_eq!(cff.string(StringId::new(634)).unwrap(), "glyph499");
        assert!(cff.string(StringId::new(635)).is_none());
    }

    #[test]
    fn top_and_private_dicts() {
        let data = fonts::cff_table();
        let cff = Cff::read(FontData::new(&data)).unwrap();
        let font = cff.font(0).unwrap();
        let top_dict = font.top_dict();
        assert_eq!(top_dict.font_bbox, [0.0, 0.0, 500.0, 700.0]);
        assert_eq!(top_dict.font_matrix, [0.001, 0.0, 0.0, 0.001, 0.0, 0.0]);
        assert!(!top_dict.is_cid);
        assert_eq!(font.num_glyphs(), fonts::CFF_NUM_GLYPHS as u32);
        assert_eq!(font.default_width(), 500.0);
        assert_eq!(font.nominal_width(), 500.0);
        assert_eq!(font.subrs().unwrap().count(), 1);
        assert!(cff.font(1).is_err());
    }

    #[test]
    fn glyph_names_from_charset() {
        let data = fonts::cff_table();
        let font = Cff::read(FontData::new(&data)).unwrap().font(0).unwrap();
        let name = |gid: u32| font.glyph_name(GlyphId::new(gid)).unwrap().to_string();
        assert_eq!(name(0), ".notdef");
        assert_eq!(name(34), "A");
        assert_eq!(name(255), "centsuperior");
        assert_eq!(name(256), "glyph256");
        assert_eq!(name(499), "glyph499");
        assert!(font.glyph_name(GlyphId::new(500)).is_none());
    }

    #[test]
    fn evaluate_glyphs() {
        let data = fonts::cff_table();
        let font = Cff::read(FontData::new(&data)).unwrap().font(0).unwrap();
        let mut sink = Sink::default();
        font.evaluate_glyph(GlyphId::new(0), &mut sink).unwrap();
        assert_eq!(sink.widths, [Fixed::from_i32(100)]);
        let points: Vec<_> = sink
            .points
            .iter()
            .map(|(x, y)| (x.to_i32(), y.to_i32()))
            .collect();
        assert_eq!(points, [(50, 0), (450, 0), (450, 700), (50, 700)]);

        // move, two lines from the local subr, one curve from the global
        let mut sink = Sink::default();
        font.evaluate_glyph(GlyphId::new(7), &mut sink).unwrap();
        assert_eq!(sink.widths, [Fixed::from_i32(-100)]);
        let points: Vec<_> = sink
            .points
            .iter()
            .map(|(x, y)| (x.to_i32(), y.to_i32()))
            .collect();
        assert_eq!(points, [(50, 7), (450, 7), (250, 707), (50, 7)]);

        let mut sink = Sink::default();
        font.evaluate_glyph(GlyphId::new(8), &mut sink).unwrap();
        assert!(sink.widths.is_empty());
        assert!(font.evaluate_glyph(GlyphId::new(500), &mut sink).is_err());
    }

    #[test]
    fn unsupported_major_version() {
        let mut data = fonts::cff_table();
        data[0] = 2;
        assert_eq!(
            Cff::new(FontData::new(&data)).unwrap_err(),
            Error::Read(ReadError::InvalidFormat(2))
        );
    }

    #[test]
    fn truncated_table() {
        let data = fonts::cff_table();
        // cut inside the Top DICT INDEX
        assert!(Cff::new(FontData::new(&data[..24])).is_err());
        assert!(Cff::read(FontData::new(&data[..2])).is_err());
    }
}
