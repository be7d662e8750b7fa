//! CFF charset support.

use types::{BigEndian, FixedSize, GlyphId};

use super::{Error, StringId};
use crate::{FontData, ReadError};

/// A range in a format 1 charset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct CharsetRange1 {
    pub first: BigEndian<u16>,
    pub n_left: u8,
}

impl FixedSize for CharsetRange1 {
    const RAW_BYTE_LEN: usize = u16::RAW_BYTE_LEN + u8::RAW_BYTE_LEN;
}

/// A range in a format 2 charset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct CharsetRange2 {
    pub first: BigEndian<u16>,
    pub n_left: BigEndian<u16>,
}

impl FixedSize for CharsetRange2 {
    const RAW_BYTE_LEN: usize = 2 * u16::RAW_BYTE_LEN;
}

trait CharsetRange: bytemuck::AnyBitPattern + FixedSize {
    fn first(&self) -> u32;
    fn n_left(&self) -> u32;
}

impl CharsetRange for CharsetRange1 {
    fn first(&self) -> u32 {
        self.first.get() as u32
    }

    fn n_left(&self) -> u32 {
        self.n_left as u32
    }
}

impl CharsetRange for CharsetRange2 {
    fn first(&self) -> u32 {
        self.first.get() as u32
    }

    fn n_left(&self) -> u32 {
        self.n_left.get() as u32
    }
}

/// Predefined and custom character sets.
#[derive(Clone, Debug)]
pub enum CharsetKind<'a> {
    IsoAdobe,
    Expert,
    ExpertSubset,
    Format0(&'a [BigEndian<u16>]),
    Format1(&'a [CharsetRange1]),
    Format2(&'a [CharsetRange2]),
}

/// Character set for mapping from glyph to string identifiers.
///
/// See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=21>
#[derive(Clone, Debug)]
pub struct Charset<'a> {
    kind: CharsetKind<'a>,
    num_glyphs: u32,
}

impl<'a> Charset<'a> {
    /// Reads the charset at `charset_offset` in the CFF table.
    ///
    /// Offsets 0, 1 and 2 select the predefined charsets. The `.notdef`
    /// glyph is never stored, so custom charsets describe `num_glyphs - 1`
    /// glyphs; range formats that cover more or fewer are rejected.
    pub fn new(
        cff_data: FontData<'a>,
        charset_offset: usize,
        num_glyphs: u32,
    ) -> Result<Self, Error> {
        let kind = match charset_offset {
            0 => CharsetKind::IsoAdobe,
            1 => CharsetKind::Expert,
            2 => CharsetKind::ExpertSubset,
            _ => {
                let data = cff_data
                    .split_off(charset_offset)
                    .ok_or(ReadError::OutOfBounds)?;
                let mut cursor = data.cursor();
                let format: u8 = cursor.read()?;
                let num_encoded = num_glyphs.saturating_sub(1);
                let ranges = cursor.remaining().unwrap_or(FontData::EMPTY);
                match format {
                    0 => {
                        let len = num_encoded as usize * u16::RAW_BYTE_LEN;
                        CharsetKind::Format0(ranges.read_array(0..len)?)
                    }
                    1 => CharsetKind::Format1(read_ranges(ranges, num_encoded)?),
                    2 => CharsetKind::Format2(read_ranges(ranges, num_encoded)?),
                    _ => return Err(ReadError::InvalidFormat(format as i64).into()),
                }
            }
        };
        Ok(Self { kind, num_glyphs })
    }

    pub fn kind(&self) -> &CharsetKind<'a> {
        &self.kind
    }

    pub fn num_glyphs(&self) -> u32 {
        self.num_glyphs
    }

    /// Returns the string identifier for the given glyph identifier.
    pub fn string_id(&self, glyph_id: GlyphId) -> Result<StringId, ReadError> {
        let gid = glyph_id.to_u32();
        if gid >= self.num_glyphs {
            return Err(ReadError::OutOfBounds);
        }
        match &self.kind {
            // identity mapping for the first 229 glyphs
            CharsetKind::IsoAdobe => (gid <= 228)
                .then(|| StringId::new(gid as u16))
                .ok_or(ReadError::OutOfBounds),
            CharsetKind::Expert => predefined(EXPERT_CHARSET, gid),
            CharsetKind::ExpertSubset => predefined(EXPERT_SUBSET_CHARSET, gid),
            CharsetKind::Format0(glyphs) => match gid {
                0 => Ok(StringId::new(0)),
                _ => glyphs
                    .get(gid as usize - 1)
                    .map(|sid| StringId::new(sid.get()))
                    .ok_or(ReadError::OutOfBounds),
            },
            CharsetKind::Format1(ranges) => string_id_from_ranges(ranges, gid),
            CharsetKind::Format2(ranges) => string_id_from_ranges(ranges, gid),
        }
    }

    /// Returns an iterator over all of the glyph and string identifier
    /// mappings.
    pub fn iter(&self) -> CharsetIter<'a> {
        CharsetIter {
            charset: self.clone(),
            gid: 0,
        }
    }
}

fn predefined(table: &[u16], gid: u32) -> Result<StringId, ReadError> {
    table
        .get(gid as usize)
        .map(|sid| StringId::new(*sid))
        .ok_or(ReadError::OutOfBounds)
}

/// Reads ranges until exactly `num_encoded` glyphs are covered.
fn read_ranges<'a, T: CharsetRange>(
    data: FontData<'a>,
    num_encoded: u32,
) -> Result<&'a [T], Error> {
    let mut covered = 0u32;
    let mut count = 0usize;
    while covered < num_encoded {
        let range: &T = data
            .read_ref_at(count * T::RAW_BYTE_LEN)
            .map_err(|_| Error::InvalidCharsetCoverage)?;
        covered += range.n_left() + 1;
        count += 1;
    }
    if covered != num_encoded {
        return Err(Error::InvalidCharsetCoverage);
    }
    Ok(data.read_array(0..count * T::RAW_BYTE_LEN)?)
}

fn string_id_from_ranges<T: CharsetRange>(ranges: &[T], gid: u32) -> Result<StringId, ReadError> {
    // .notdef is not part of any range
    if gid == 0 {
        return Ok(StringId::new(0));
    }
    // `count` is the first glyph covered by the current range; each range
    // maps `n_left + 1` glyphs to consecutive string ids starting at `first`
    let mut count = 1u32;
    for range in ranges {
        if gid <= count + range.n_left() {
            return u16::try_from(gid - count + range.first())
                .map(StringId::new)
                .map_err(|_| ReadError::OutOfBounds);
        }
        count += range.n_left() + 1;
    }
    Err(ReadError::OutOfBounds)
}

/// Iterator over the glyph and string identifier mappings in a character set.
#[derive(Clone)]
pub struct CharsetIter<'a> {
    charset: Charset<'a>,
    gid: u32,
}

impl Iterator for CharsetIter<'_> {
    type Item = (GlyphId, StringId);

    fn next(&mut self) -> Option<Self::Item> {
        let gid = GlyphId::new(self.gid);
        let sid = self.charset.string_id(gid).ok()?;
        self.gid += 1;
        Some((gid, sid))
    }
}

/// See "Expert" charset at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=47>
#[rustfmt::skip]
const EXPERT_CHARSET: &[u16] = &[
      0,    1,  229,  230,  231,  232,  233,  234,  235,  236,  237,  238,   13,   14,   15,   99,
    239,  240,  241,  242,  243,  244,  245,  246,  247,  248,   27,   28,  249,  250,  251,  252,
    253,  254,  255,  256,  257,  258,  259,  260,  261,  262,  263,  264,  265,  266,  109,  110,
    267,  268,  269,  270,  271,  272,  273,  274,  275,  276,  277,  278,  279,  280,  281,  282,
    283,  284,  285,  286,  287,  288,  289,  290,  291,  292,  293,  294,  295,  296,  297,  298,
    299,  300,  301,  302,  303,  304,  305,  306,  307,  308,  309,  310,  311,  312,  313,  314,
    315,  316,  317,  318,  158,  155,  163,  319,  320,  321,  322,  323,  324,  325,  326,  150,
    164,  169,  327,  328,  329,  330,  331,  332,  333,  334,  335,  336,  337,  338,  339,  340,
    341,  342,  343,  344,  345,  346,  347,  348,  349,  350,  351,  352,  353,  354,  355,  356,
    357,  358,  359,  360,  361,  362,  363,  364,  365,  366,  367,  368,  369,  370,  371,  372,
    373,  374,  375,  376,  377,  378,
];

/// See "Expert Subset" charset at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=49>
#[rustfmt::skip]
const EXPERT_SUBSET_CHARSET: &[u16] = &[
      0,    1,  231,  232,  235,  236,  237,  238,   13,   14,   15,   99,  239,  240,  241,  242,
    243,  244,  245,  246,  247,  248,   27,   28,  249,  250,  251,  253,  254,  255,  256,  257,
    258,  259,  260,  261,  262,  263,  264,  265,  266,  109,  110,  267,  268,  269,  270,  272,
    300,  301,  302,  305,  314,  315,  158,  155,  163,  320,  321,  322,  323,  324,  325,  326,
    150,  164,  169,  327,  328,  329,  330,  331,  332,  333,  334,  335,  336,  337,  338,  339,
    340,  341,  342,  343,  344,  345,  346
];
