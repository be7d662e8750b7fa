//! the [post (PostScript)](https://docs.microsoft.com/en-us/typography/opentype/spec/post#header) table

use types::{BigEndian, Fixed, FixedSize, GlyphId, Tag, Version16Dot16};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// `post`
pub const TAG: Tag = Tag::new(b"post");

#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
struct RawPost {
    version: BigEndian<Version16Dot16>,
    italic_angle: BigEndian<Fixed>,
    underline_position: BigEndian<i16>,
    underline_thickness: BigEndian<i16>,
    is_fixed_pitch: BigEndian<u32>,
    min_mem_type42: BigEndian<u32>,
    max_mem_type42: BigEndian<u32>,
    min_mem_type1: BigEndian<u32>,
    max_mem_type1: BigEndian<u32>,
}

impl FixedSize for RawPost {
    const RAW_BYTE_LEN: usize = 32;
}

/// How glyph names are stored.
#[derive(Clone, Copy)]
enum Names<'a> {
    /// Version 1.0: the standard Macintosh ordering.
    Standard,
    /// Version 2.0: an index per glyph into the standard names followed by
    /// the Pascal strings in `string_data`.
    Indexed {
        glyph_name_index: &'a [BigEndian<u16>],
        string_data: FontData<'a>,
    },
    /// Version 2.5: a signed offset per glyph into the standard names.
    Offsets(&'a [u8]),
    /// Version 3.0: no names.
    None,
}

/// [post (PostScript)](https://docs.microsoft.com/en-us/typography/opentype/spec/post#header) table
#[derive(Clone, Copy)]
pub struct Post<'a> {
    raw: &'a RawPost,
    names: Names<'a>,
}

impl<'a> Post<'a> {
    record_getters! { raw;
        /// 1.0, 2.0, 2.5 or 3.0
        version: Version16Dot16,
        /// Italic angle in counter-clockwise degrees from the vertical.
        italic_angle: Fixed,
        /// Suggested distance of the top of the underline from the baseline
        underline_position: i16,
        /// Suggested values for the underline thickness.
        underline_thickness: i16,
        /// Set to 0 if the font is proportionally spaced, non-zero if the
        /// font is not proportionally spaced (i.e. monospaced).
        is_fixed_pitch: u32,
        min_mem_type42: u32,
        max_mem_type42: u32,
        min_mem_type1: u32,
        max_mem_type1: u32,
    }

    /// The number of glyph names covered by this table
    pub fn num_names(&self) -> usize {
        match self.names {
            Names::Standard => DEFAULT_GLYPH_NAMES.len(),
            Names::Indexed {
                glyph_name_index, ..
            } => glyph_name_index.len(),
            Names::Offsets(offsets) => offsets.len(),
            Names::None => 0,
        }
    }

    /// The Pascal strings following the name index, in version 2.0 tables.
    pub fn string_data(&self) -> Option<impl Iterator<Item = Result<PString<'a>, ReadError>> + 'a> {
        match self.names {
            Names::Indexed { string_data, .. } => Some(PStringIter { data: string_data }),
            _ => None,
        }
    }

    /// The name of the glyph, or `None` if the table has none for it.
    pub fn glyph_name(&self, glyph_id: GlyphId) -> Option<&'a str> {
        let glyph_id = glyph_id.to_u32() as usize;
        match self.names {
            Names::Standard => DEFAULT_GLYPH_NAMES.get(glyph_id).copied(),
            Names::Indexed {
                glyph_name_index,
                string_data,
            } => {
                let idx = glyph_name_index.get(glyph_id)?.get() as usize;
                if idx < DEFAULT_GLYPH_NAMES.len() {
                    return DEFAULT_GLYPH_NAMES.get(idx).copied();
                }
                let idx = idx - DEFAULT_GLYPH_NAMES.len();
                match (PStringIter { data: string_data }).nth(idx) {
                    Some(Ok(s)) => Some(s.0),
                    _ => None,
                }
            }
            Names::Offsets(offsets) => {
                let offset = *offsets.get(glyph_id)? as i8;
                let idx = (glyph_id as isize).checked_add(offset as isize)?;
                DEFAULT_GLYPH_NAMES.get(usize::try_from(idx).ok()?).copied()
            }
            Names::None => None,
        }
    }
}

impl TopLevelTable for Post<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Post<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let raw: &RawPost = data.read_ref_at(0)?;
        let mut cursor = data.cursor();
        cursor.advance_by(RawPost::RAW_BYTE_LEN);
        let names = match raw.version.get() {
            Version16Dot16::VERSION_1_0 => Names::Standard,
            Version16Dot16::VERSION_2_0 => {
                let num_glyphs: u16 = cursor.read()?;
                let glyph_name_index = cursor.read_array(num_glyphs as usize)?;
                let string_data = cursor.remaining().unwrap_or_default();
                Names::Indexed {
                    glyph_name_index,
                    string_data,
                }
            }
            Version16Dot16::VERSION_2_5 => {
                let num_glyphs: u16 = cursor.read()?;
                Names::Offsets(cursor.read_array(num_glyphs as usize)?)
            }
            Version16Dot16::VERSION_3_0 => Names::None,
            other => return Err(ReadError::InvalidFormat(other.to_bits() as i64)),
        };
        Ok(Post { raw, names })
    }
}

impl std::fmt::Debug for Post<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Post")
            .field("version", &self.version())
            .field("italic_angle", &self.italic_angle())
            .field("underline_position", &self.underline_position())
            .field("underline_thickness", &self.underline_thickness())
            .field("is_fixed_pitch", &self.is_fixed_pitch())
            .field("num_names", &self.num_names())
            .finish()
    }
}

/// A string in the post table.
///
/// This is basically just a newtype that knows how to parse from a Pascal-style
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PString<'a>(&'a str);

impl<'a> PString<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl std::ops::Deref for PString<'_> {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl PartialEq<&str> for PString<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'a> FontRead<'a> for PString<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let len: u8 = data.read_at(0)?;
        let pstring = data
            .as_bytes()
            .get(1..len as usize + 1)
            .ok_or(ReadError::OutOfBounds)?;
        if !pstring.is_ascii() {
            return Err(ReadError::MalformedData("post glyph names must be ascii"));
        }
        std::str::from_utf8(pstring)
            .map(PString)
            .map_err(|_| ReadError::MalformedData("post glyph names must be ascii"))
    }
}

#[derive(Clone)]
struct PStringIter<'a> {
    data: FontData<'a>,
}

impl<'a> Iterator for PStringIter<'a> {
    type Item = Result<PString<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let item = PString::read(self.data);
        let len = self.data.read_at::<u8>(0).unwrap_or_default() as usize + 1;
        self.data = self.data.split_off(len).unwrap_or_default();
        Some(item)
    }
}

/// The 258 glyph names defined for Macintosh TrueType fonts
#[rustfmt::skip]
pub static DEFAULT_GLYPH_NAMES: [&str; 258] = [
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign", "dollar",
    "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk", "plus", "comma",
    "hyphen", "period", "slash", "zero", "one", "two", "three", "four", "five", "six", "seven",
    "eight", "nine", "colon", "semicolon", "less", "equal", "greater", "question", "at", "A", "B",
    "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U",
    "V", "W", "X", "Y", "Z", "bracketleft", "backslash", "bracketright", "asciicircum",
    "underscore", "grave", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
    "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar", "braceright",
    "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis", "Udieresis",
    "aacute", "agrave", "acircumflex", "adieresis", "atilde", "aring", "ccedilla", "eacute",
    "egrave", "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis", "ntilde",
    "oacute", "ograve", "ocircumflex", "odieresis", "otilde", "uacute", "ugrave", "ucircumflex",
    "udieresis", "dagger", "degree", "cent", "sterling", "section", "bullet", "paragraph",
    "germandbls", "registered", "copyright", "trademark", "acute", "dieresis", "notequal", "AE",
    "Oslash", "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff",
    "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae",
    "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin", "approxequal",
    "Delta", "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft",
    "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency",
    "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered", "quotesinglbase",
    "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis", "Egrave",
    "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex", "apple", "Ograve",
    "Uacute", "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde", "macron", "breve",
    "dotaccent", "ring", "cedilla", "hungarumlaut", "ogonek", "caron", "Lslash", "lslash",
    "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth", "Yacute", "yacute", "Thorn",
    "thorn", "minus", "multiply", "onesuperior", "twosuperior", "threesuperior", "onehalf",
    "onequarter", "threequarters", "franc", "Gbreve", "gbreve", "Idotaccent", "Scedilla",
    "scedilla", "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::{fonts, post as test_data};

    #[test]
    fn version_2() {
        let table = Post::read(test_data::SIMPLE.into()).unwrap();
        assert_eq!(table.version(), Version16Dot16::VERSION_2_0);
        assert_eq!(table.underline_position(), -75);
        assert_eq!(table.num_names(), 10);
        assert_eq!(table.glyph_name(GlyphId::new(1)), Some(".notdef"));
        assert_eq!(table.glyph_name(GlyphId::new(2)), Some("space"));
        assert_eq!(table.glyph_name(GlyphId::new(7)), Some("hello"));
        assert_eq!(table.glyph_name(GlyphId::new(8)), Some("hi"));
        assert_eq!(table.glyph_name(GlyphId::new(9)), Some("hola"));
        assert_eq!(table.glyph_name(GlyphId::new(10)), None);
        let strings: Vec<_> = table.string_data().unwrap().map(Result::unwrap).collect();
        assert_eq!(strings, ["hello", "hi", "hola"]);
    }

    #[test]
    fn synthetic_names() {
        let buf = fonts::post_v2();
        let table = Post::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.italic_angle(), Fixed::from_f64(-11.5));
        let names: Vec<_> = (0..6)
            .map(|gid| table.glyph_name(GlyphId::new(gid)).unwrap())
            .collect();
        assert_eq!(
            names,
            [".notdef", "space", "A", "A.comp", "cycleA", "cycleB"]
        );
    }

    #[test]
    fn version_1_uses_standard_order() {
        let buf = fonts::post_header(0x00010000);
        let table = Post::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.num_names(), 258);
        assert_eq!(table.glyph_name(GlyphId::new(36)), Some("A"));
        assert_eq!(table.glyph_name(GlyphId::new(257)), Some("dcroat"));
        assert_eq!(table.glyph_name(GlyphId::new(258)), None);
    }

    #[test]
    fn version_2_5_offsets() {
        // glyph 0 -> .notdef, glyph 1 -> A (1 + 35), glyph 2 -> B (2 + 35)
        let buf = fonts::post_header(0x00025000)
            .push(3u16)
            .extend([0i8, 35, 35]);
        let table = Post::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.num_names(), 3);
        assert_eq!(table.glyph_name(GlyphId::new(0)), Some(".notdef"));
        assert_eq!(table.glyph_name(GlyphId::new(1)), Some("A"));
        assert_eq!(table.glyph_name(GlyphId::new(2)), Some("B"));
    }

    #[test]
    fn version_3_has_no_names() {
        let buf = fonts::post_header(0x00030000);
        let table = Post::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.num_names(), 0);
        assert_eq!(table.glyph_name(GlyphId::new(0)), None);
    }

    #[test]
    fn unknown_version() {
        let buf = fonts::post_header(0x00040000);
        assert!(matches!(
            Post::read(FontData::new(&buf)),
            Err(ReadError::InvalidFormat(0x40000))
        ));
    }

    #[test]
    fn truncated_index() {
        let buf = fonts::post_v2();
        assert!(Post::read(FontData::new(&buf[..40])).is_err());
    }
}
