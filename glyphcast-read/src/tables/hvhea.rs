//! The Horizontal/Vertical Header tables.
//!
//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea)
//! and [vhea](https://docs.microsoft.com/en-us/typography/opentype/spec/vhea)
//! tables have the same structure and so we define them in the same module.

use types::{BigEndian, FixedSize, Tag, Version16Dot16};

use crate::{FontData, FontRead, ReadError};

/// `hhea`
pub const HHEA_TAG: Tag = Tag::new(b"hhea");
/// `vhea`
pub const VHEA_TAG: Tag = Tag::new(b"vhea");

#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
struct RawHVhea {
    version: BigEndian<Version16Dot16>,
    ascender: BigEndian<i16>,
    descender: BigEndian<i16>,
    line_gap: BigEndian<i16>,
    advance_max: BigEndian<u16>,
    min_leading_bearing: BigEndian<i16>,
    min_trailing_bearing: BigEndian<i16>,
    max_extent: BigEndian<i16>,
    caret_slope_rise: BigEndian<i16>,
    caret_slope_run: BigEndian<i16>,
    caret_offset: BigEndian<i16>,
    _reserved0: BigEndian<i16>,
    _reserved1: BigEndian<i16>,
    _reserved2: BigEndian<i16>,
    _reserved3: BigEndian<i16>,
    metric_data_format: BigEndian<i16>,
    number_of_long_metrics: BigEndian<u16>,
}

impl FixedSize for RawHVhea {
    const RAW_BYTE_LEN: usize = 36;
}

/// The horizontal or vertical header table.
///
/// In `vhea` the ascender, descender and line gap are the vertical typo
/// values, "leading" means top and "trailing" means bottom.
#[derive(Clone, Copy)]
pub struct HVhea<'a> {
    raw: &'a RawHVhea,
}

impl HVhea<'_> {
    record_getters! { raw;
        /// 1.0 for `hhea`; 1.0 or 1.1 for `vhea`.
        version: Version16Dot16,
        /// Typographic ascent.
        ascender: i16,
        /// Typographic descent.
        descender: i16,
        /// Typographic line gap.
        line_gap: i16,
        /// Maximum advance width or height in `hmtx` or `vmtx`.
        advance_max: u16,
        /// Minimum left or top side bearing.
        min_leading_bearing: i16,
        /// Minimum right or bottom side bearing.
        min_trailing_bearing: i16,
        max_extent: i16,
        caret_slope_rise: i16,
        caret_slope_run: i16,
        caret_offset: i16,
        /// 0 for current format.
        metric_data_format: i16,
        /// Number of long metric records in the matching metrics table.
        number_of_long_metrics: u16,
    }
}

impl<'a> FontRead<'a> for HVhea<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(HVhea {
            raw: data.read_ref_at(0)?,
        })
    }
}

impl std::fmt::Debug for HVhea<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HVhea")
            .field("version", &self.version())
            .field("ascender", &self.ascender())
            .field("descender", &self.descender())
            .field("line_gap", &self.line_gap())
            .field("advance_max", &self.advance_max())
            .field("min_leading_bearing", &self.min_leading_bearing())
            .field("min_trailing_bearing", &self.min_trailing_bearing())
            .field("max_extent", &self.max_extent())
            .field("number_of_long_metrics", &self.number_of_long_metrics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::fonts;

    #[test]
    fn hhea_fields() {
        let buf = fonts::hhea(3);
        let hhea = HVhea::read(FontData::new(&buf)).unwrap();
        assert_eq!(hhea.version(), Version16Dot16::VERSION_1_0);
        assert_eq!(hhea.ascender(), 800);
        assert_eq!(hhea.descender(), -200);
        assert_eq!(hhea.line_gap(), 90);
        assert_eq!(hhea.advance_max(), 600);
        assert_eq!(hhea.number_of_long_metrics(), 3);
    }

    #[test]
    fn fields_after_reserved_block() {
        let mut buf = fonts::hhea(7).to_vec();
        buf[24..32].copy_from_slice(&[0xAA; 8]);
        let hhea = HVhea::read(FontData::new(&buf)).unwrap();
        assert_eq!(hhea.caret_offset(), 0);
        assert_eq!(hhea.metric_data_format(), 0);
        assert_eq!(hhea.number_of_long_metrics(), 7);
        assert_eq!(buf.len(), RawHVhea::RAW_BYTE_LEN);
    }

    #[test]
    fn vhea_version_1_1() {
        let buf = fonts::vhea(1);
        let vhea = HVhea::read(FontData::new(&buf)).unwrap();
        assert_eq!(vhea.version(), Version16Dot16::new(1, 1));
        assert_eq!(vhea.descender(), -500);
        assert_eq!(vhea.number_of_long_metrics(), 1);
    }
}
