//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use crate::{
    read::{FontRead, FontReadWithArgs, ReadArgs, ReadError},
    table_provider::TopLevelTable,
    FontData,
};
use types::{BigEndian, GlyphId, Tag};

use super::glyf::{Glyf, Glyph};

/// `loca`
pub const TAG: Tag = Tag::new(b"loca");

/// The [loca] table.
///
/// Holds `num_glyphs + 1` offsets into `glyf`; any trailing padding in the
/// table data is ignored.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug)]
pub enum Loca<'a> {
    Short(&'a [BigEndian<u16>]),
    Long(&'a [BigEndian<u32>]),
}

impl TopLevelTable for Loca<'_> {
    const TAG: Tag = TAG;
}

impl<'a> Loca<'a> {
    pub fn read(data: FontData<'a>, is_long: bool, num_glyphs: u16) -> Result<Self, ReadError> {
        Self::read_with_args(data, &(is_long, num_glyphs))
    }

    /// The number of glyphs covered.
    pub fn len(&self) -> usize {
        match self {
            Loca::Short(data) => data.len().saturating_sub(1),
            Loca::Long(data) => data.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt to return the offset for a given glyph id.
    pub fn get_raw(&self, idx: usize) -> Option<u32> {
        match self {
            Loca::Short(data) => data.get(idx).map(|x| x.get() as u32 * 2),
            Loca::Long(data) => data.get(idx).map(|x| x.get()),
        }
    }

    /// Iterate over all offsets, in bytes.
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        (0..=self.len()).filter_map(|idx| self.get_raw(idx))
    }

    /// The byte range of the glyph in `glyf`; empty for glyphs without an
    /// outline.
    pub fn glyph_range(&self, gid: GlyphId) -> Result<std::ops::Range<usize>, ReadError> {
        let idx = gid.to_u32() as usize;
        let start = self.get_raw(idx).ok_or(ReadError::OutOfBounds)?;
        let end = self.get_raw(idx + 1).ok_or(ReadError::OutOfBounds)?;
        if start > end {
            return Err(ReadError::MalformedData("loca offsets decrease"));
        }
        Ok(start as usize..end as usize)
    }

    /// Returns the glyph data for `gid`, or `None` if the glyph is empty.
    pub fn get_glyf(&self, gid: GlyphId, glyf: &Glyf<'a>) -> Result<Option<Glyph<'a>>, ReadError> {
        let range = self.glyph_range(gid)?;
        if range.is_empty() {
            return Ok(None);
        }
        let data = glyf
            .offset_data()
            .slice(range)
            .ok_or(ReadError::OutOfBounds)?;
        Glyph::read(data).map(Some)
    }
}

impl ReadArgs for Loca<'_> {
    /// Whether the offsets are 32-bit, and the number of glyphs.
    type Args = (bool, u16);
}

impl<'a> FontReadWithArgs<'a> for Loca<'a> {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        let (is_long, num_glyphs) = *args;
        let n_offsets = num_glyphs as usize + 1;
        let mut cursor = data.cursor();
        if is_long {
            cursor.read_array(n_offsets).map(Loca::Long)
        } else {
            cursor.read_array(n_offsets).map(Loca::Short)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::{fonts, BeBuffer};

    #[test]
    fn short_offsets_are_doubled() {
        let buf = BeBuffer::new().extend([0u16, 13, 13, 32, 0xFFFF]);
        let loca = Loca::read(FontData::new(&buf), false, 3).unwrap();
        assert_eq!(loca.len(), 3);
        assert_eq!(loca.offsets().collect::<Vec<_>>(), [0, 26, 26, 64]);
        assert_eq!(loca.glyph_range(GlyphId::new(1)).unwrap(), 26..26);
        assert!(loca.glyph_range(GlyphId::new(3)).is_err());
    }

    #[test]
    fn long_offsets() {
        let buf = BeBuffer::new().extend([0u32, 100, 100_000]);
        let loca = Loca::read(FontData::new(&buf), true, 2).unwrap();
        assert_eq!(loca.glyph_range(GlyphId::new(1)).unwrap(), 100..100_000);
    }

    #[test]
    fn decreasing_offsets() {
        let buf = BeBuffer::new().extend([0u32, 100, 50]);
        let loca = Loca::read(FontData::new(&buf), true, 2).unwrap();
        assert!(matches!(
            loca.glyph_range(GlyphId::new(1)),
            Err(ReadError::MalformedData(_))
        ));
    }

    #[test]
    fn too_short_for_glyph_count() {
        let buf = BeBuffer::new().extend([0u16, 13]);
        assert!(Loca::read(FontData::new(&buf), false, 2).is_err());
    }

    #[test]
    fn glyph_lookup_through_glyf() {
        let (glyf_buf, loca_buf) = fonts::glyf_and_loca(&fonts::glyf_glyphs());
        let glyf = Glyf::read(FontData::new(&glyf_buf)).unwrap();
        let loca = Loca::read(FontData::new(&loca_buf), false, 6).unwrap();
        assert!(matches!(
            loca.get_glyf(GlyphId::new(0), &glyf),
            Ok(Some(Glyph::Simple(_)))
        ));
        assert!(loca.get_glyf(GlyphId::new(1), &glyf).unwrap().is_none());
        assert!(matches!(
            loca.get_glyf(GlyphId::new(3), &glyf),
            Ok(Some(Glyph::Composite(_)))
        ));
        assert!(loca.get_glyf(GlyphId::new(6), &glyf).is_err());
    }
}
