//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use types::{BigEndian, FixedSize, Tag, Version16Dot16};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// `maxp`
pub const TAG: Tag = Tag::new(b"maxp");

/// The fields present only in version 1.0 tables.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct MaxpV1 {
    pub max_points: BigEndian<u16>,
    pub max_contours: BigEndian<u16>,
    pub max_composite_points: BigEndian<u16>,
    pub max_composite_contours: BigEndian<u16>,
    pub max_zones: BigEndian<u16>,
    pub max_twilight_points: BigEndian<u16>,
    pub max_storage: BigEndian<u16>,
    pub max_function_defs: BigEndian<u16>,
    pub max_instruction_defs: BigEndian<u16>,
    pub max_stack_elements: BigEndian<u16>,
    pub max_size_of_instructions: BigEndian<u16>,
    pub max_component_elements: BigEndian<u16>,
    pub max_component_depth: BigEndian<u16>,
}

impl FixedSize for MaxpV1 {
    const RAW_BYTE_LEN: usize = 13 * u16::RAW_BYTE_LEN;
}

/// [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp)
///
/// Version 0.5 (CFF fonts) stores only the glyph count; version 1.0 adds
/// the TrueType limits.
#[derive(Clone, Copy, Debug)]
pub struct Maxp<'a> {
    version: Version16Dot16,
    num_glyphs: u16,
    v1: Option<&'a MaxpV1>,
}

impl<'a> Maxp<'a> {
    /// The version: 0.5 or 1.0
    pub fn version(&self) -> Version16Dot16 {
        self.version
    }

    /// The number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// The TrueType limits, present in version 1.0.
    pub fn v1(&self) -> Option<&'a MaxpV1> {
        self.v1
    }

    /// Maximum levels of recursion; 1 for simple components.
    pub fn max_component_depth(&self) -> Option<u16> {
        self.v1.map(|v1| v1.max_component_depth.get())
    }
}

impl TopLevelTable for Maxp<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Maxp<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: Version16Dot16 = cursor.read()?;
        let num_glyphs: u16 = cursor.read()?;
        let v1 = match version {
            Version16Dot16::VERSION_0_5 => None,
            Version16Dot16::VERSION_1_0 => Some(data.read_ref_at(cursor.position()?)?),
            other => return Err(ReadError::InvalidFormat(other.to_bits() as i64)),
        };
        Ok(Maxp {
            version,
            num_glyphs,
            v1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::fonts;

    #[test]
    fn version_0_5() {
        let buf = fonts::maxp_v0_5(500);
        let maxp = Maxp::read(FontData::new(&buf)).unwrap();
        assert_eq!(maxp.num_glyphs(), 500);
        assert!(maxp.v1().is_none());
    }

    #[test]
    fn version_1_0() {
        let buf = fonts::maxp_v1(6);
        let maxp = Maxp::read(FontData::new(&buf)).unwrap();
        assert_eq!(maxp.version(), Version16Dot16::VERSION_1_0);
        assert_eq!(maxp.num_glyphs(), 6);
        assert_eq!(maxp.v1().unwrap().max_stack_elements.get(), 64);
        assert_eq!(maxp.max_component_depth(), Some(2));
        // version 1.0 needs all of its fields
        assert!(Maxp::read(FontData::new(&buf[..20])).is_err());
    }

    #[test]
    fn unknown_version() {
        let data = [0u8, 2, 0, 0, 0, 1];
        assert!(matches!(
            Maxp::read(FontData::new(&data)),
            Err(ReadError::InvalidFormat(0x20000))
        ));
    }
}
