//! The Horizontal/Vertical Metrics tables.
//!
//! The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx)
//! and [vmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/vmtx)
//! tables have the same structure and so we define them in the same module.

use types::{BigEndian, FixedSize, GlyphId, Tag};

use crate::{FontData, FontReadWithArgs, ReadArgs, ReadError};

/// `hmtx`
pub const HMTX_TAG: Tag = Tag::new(b"hmtx");
/// `vmtx`
pub const VMTX_TAG: Tag = Tag::new(b"vmtx");

/// An advance paired with a side bearing.
#[derive(Clone, Debug, Copy, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct LongMetric {
    /// Advance width/height, in font design units.
    pub advance: BigEndian<u16>,
    /// Glyph left/top side bearing, in font design units.
    pub side_bearing: BigEndian<i16>,
}

impl LongMetric {
    /// Advance width/height, in font design units.
    pub fn advance(&self) -> u16 {
        self.advance.get()
    }

    /// Glyph left/top side bearing, in font design units.
    pub fn side_bearing(&self) -> i16 {
        self.side_bearing.get()
    }
}

impl FixedSize for LongMetric {
    const RAW_BYTE_LEN: usize = u16::RAW_BYTE_LEN + i16::RAW_BYTE_LEN;
}

/// The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx)
/// or vmtx table.
///
/// Glyphs past the last long metric share its advance and have only a side
/// bearing stored.
#[derive(Clone, Copy)]
pub struct HVmtx<'a> {
    long_metrics: &'a [LongMetric],
    bearings: &'a [BigEndian<i16>],
}

impl<'a> HVmtx<'a> {
    /// The paired advance and side bearing records.
    pub fn long_metrics(&self) -> &'a [LongMetric] {
        self.long_metrics
    }

    /// Side bearings for the glyphs past the long metrics.
    pub fn bearings(&self) -> &'a [BigEndian<i16>] {
        self.bearings
    }

    /// The number of glyphs covered by the table.
    pub fn num_glyphs(&self) -> usize {
        self.long_metrics.len() + self.bearings.len()
    }

    /// Returns the advance for the given glyph identifier.
    ///
    /// Glyphs at or past the number of long metrics use the last advance.
    pub fn advance(&self, glyph_id: GlyphId) -> Option<u16> {
        let ix = glyph_id.to_u32() as usize;
        if ix >= self.num_glyphs() {
            return None;
        }
        let last = self.long_metrics.len().checked_sub(1)?;
        self.long_metrics
            .get(ix.min(last))
            .map(|metric| metric.advance())
    }

    /// Returns the side bearing for the given glyph identifier.
    pub fn side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        let ix = glyph_id.to_u32() as usize;
        if let Some(metric) = self.long_metrics.get(ix) {
            Some(metric.side_bearing())
        } else {
            self.bearings
                .get(ix - self.long_metrics.len())
                .map(|bearing| bearing.get())
        }
    }
}

impl ReadArgs for HVmtx<'_> {
    /// The number of long metrics and the number of glyphs.
    type Args = (u16, u16);
}

impl<'a> FontReadWithArgs<'a> for HVmtx<'a> {
    fn read_with_args(data: FontData<'a>, args: &(u16, u16)) -> Result<Self, ReadError> {
        let (number_of_long_metrics, num_glyphs) = *args;
        if number_of_long_metrics == 0 && num_glyphs > 0 {
            return Err(ReadError::MalformedData("no long metrics"));
        }
        let num_bearings = num_glyphs.saturating_sub(number_of_long_metrics);
        let mut cursor = data.cursor();
        let long_metrics = cursor.read_array(number_of_long_metrics as usize)?;
        let bearings = cursor.read_array(num_bearings as usize)?;
        Ok(HVmtx {
            long_metrics,
            bearings,
        })
    }
}

impl std::fmt::Debug for HVmtx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HVmtx")
            .field("long_metrics", &self.long_metrics)
            .field("bearings", &self.bearings)
            .finish()
    }
}
