//! The [kern](https://docs.microsoft.com/en-us/typography/opentype/spec/kern) table

use types::{BigEndian, FixedSize, GlyphId, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// `kern`
pub const TAG: Tag = Tag::new(b"kern");

flags! {
    /// The low byte of a subtable's coverage field.
    KernCoverage(u16) {
        /// Bit 0: the table has horizontal data, otherwise vertical.
        const HORIZONTAL = 0x0001;
        /// Bit 1: the table has minimum values, otherwise kerning values.
        const MINIMUM = 0x0002;
        /// Bit 2: kerning is perpendicular to the flow of the text.
        const CROSS_STREAM = 0x0004;
        /// Bit 3: the value replaces the accumulated value.
        const OVERRIDE = 0x0008;
        /// Bits 8-15: the subtable format.
        const FORMAT_MASK = 0xFF00;
    }
}

/// A kerning pair in a format 0 subtable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct KernPair {
    /// The glyph index for the left-hand glyph in the kerning pair.
    pub left: BigEndian<u16>,
    /// The glyph index for the right-hand glyph in the kerning pair.
    pub right: BigEndian<u16>,
    /// The kerning value, in font design units.
    pub value: BigEndian<i16>,
}

impl FixedSize for KernPair {
    const RAW_BYTE_LEN: usize = 3 * u16::RAW_BYTE_LEN;
}

impl KernPair {
    fn key(&self) -> u32 {
        ((self.left.get() as u32) << 16) | self.right.get() as u32
    }
}

/// The [kern (Kerning)](https://docs.microsoft.com/en-us/typography/opentype/spec/kern) table
#[derive(Clone)]
pub struct Kern<'a> {
    subtables: Vec<Subtable<'a>>,
}

impl<'a> Kern<'a> {
    /// Table version number, always 0.
    pub fn version(&self) -> u16 {
        0
    }

    /// The number of subtables.
    pub fn num_tables(&self) -> u16 {
        self.subtables.len() as u16
    }

    pub fn subtables(&self) -> &[Subtable<'a>] {
        &self.subtables
    }

    /// The kerning adjustment between two glyphs.
    ///
    /// Values from every horizontal format 0 subtable that holds kerning
    /// values along the flow of text are summed; an override subtable
    /// replaces the running total.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> i32 {
        let (Ok(left), Ok(right)) = (u16::try_from(left.to_u32()), u16::try_from(right.to_u32()))
        else {
            return 0;
        };
        let mut total = 0i32;
        for subtable in &self.subtables {
            let coverage = subtable.coverage();
            if !coverage.contains(KernCoverage::HORIZONTAL)
                || coverage.contains(KernCoverage::MINIMUM)
                || coverage.contains(KernCoverage::CROSS_STREAM)
            {
                continue;
            }
            if let Some(value) = subtable.kerning(left, right) {
                if coverage.contains(KernCoverage::OVERRIDE) {
                    total = value as i32;
                } else {
                    total += value as i32;
                }
            }
        }
        total
    }
}

impl TopLevelTable for Kern<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Kern<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version != 0 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let num_tables: u16 = cursor.read()?;
        let mut pos = cursor.position()?;
        let mut subtables = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            let subtable_data = data.split_off(pos).ok_or(ReadError::OutOfBounds)?;
            let subtable = Subtable::read(subtable_data)?;
            pos += subtable.byte_len();
            subtables.push(subtable);
        }
        Ok(Kern { subtables })
    }
}

impl std::fmt::Debug for Kern<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kern")
            .field("version", &self.version())
            .field("subtables", &self.subtables)
            .finish()
    }
}

/// A kerning subtable. Only format 0 pairs are decoded.
#[derive(Clone)]
pub struct Subtable<'a> {
    length: u16,
    coverage: KernCoverage,
    pairs: &'a [KernPair],
    search_params: [u16; 3],
}

impl<'a> Subtable<'a> {
    /// The length field as stored.
    pub fn length(&self) -> u16 {
        self.length
    }

    /// The coverage bits, without the format.
    pub fn coverage(&self) -> KernCoverage {
        KernCoverage::from_bits_truncate(self.coverage.bits() & 0x00FF)
    }

    /// The format, from the high byte of the coverage field.
    pub fn format(&self) -> u8 {
        (self.coverage.bits() >> 8) as u8
    }

    /// Stored `searchRange`, `entrySelector` and `rangeShift` of a format 0
    /// subtable.
    pub fn search_params(&self) -> [u16; 3] {
        self.search_params
    }

    /// The kerning pairs of a format 0 subtable, sorted by left then right
    /// glyph; empty for other formats.
    pub fn kerning_pairs(&self) -> &'a [KernPair] {
        self.pairs
    }

    /// Binary search for the pair value.
    pub fn kerning(&self, left: u16, right: u16) -> Option<i16> {
        let key = ((left as u32) << 16) | right as u32;
        self.pairs
            .binary_search_by_key(&key, KernPair::key)
            .ok()
            .map(|idx| self.pairs[idx].value.get())
    }

    // a format 0 length is derived from the pair count, since the stored
    // 16-bit length overflows for large subtables.
    fn byte_len(&self) -> usize {
        if self.format() == 0 {
            14 + self.pairs.len() * KernPair::RAW_BYTE_LEN
        } else {
            self.length as usize
        }
    }
}

impl<'a> FontRead<'a> for Subtable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let _version: u16 = cursor.read()?;
        let length: u16 = cursor.read()?;
        let coverage: KernCoverage = cursor.read()?;
        let mut subtable = Subtable {
            length,
            coverage,
            pairs: &[],
            search_params: [0; 3],
        };
        if subtable.format() == 0 {
            let num_pairs: u16 = cursor.read()?;
            subtable.search_params = [cursor.read()?, cursor.read()?, cursor.read()?];
            subtable.pairs = cursor.read_array(num_pairs as usize)?;
        } else if (length as usize) < 6 {
            return Err(ReadError::MalformedData("kern subtable length too small"));
        }
        Ok(subtable)
    }
}

impl std::fmt::Debug for Subtable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subtable")
            .field("format", &self.format())
            .field("coverage", &self.coverage())
            .field("pairs", &self.pairs)
            .finish()
    }
}
