//! The [gasp](https://learn.microsoft.com/en-us/typography/opentype/spec/gasp) table

use types::{BigEndian, FixedSize, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// `gasp`
pub const TAG: Tag = Tag::new(b"gasp");

flags! {
    /// Rasterizer behavior for a range of sizes.
    GaspRangeBehavior(u16) {
        /// Use gridfitting
        const GASP_GRIDFIT = 0x0001;
        /// Use grayscale rendering
        const GASP_DOGRAY = 0x0002;
        /// Use gridfitting with ClearType symmetric smoothing (version 1)
        const GASP_SYMMETRIC_GRIDFIT = 0x0004;
        /// Use smoothing along multiple axes with ClearType (version 1)
        const GASP_SYMMETRIC_SMOOTHING = 0x0008;
    }
}

/// A size range and the behavior to use within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct GaspRange {
    /// Upper limit of range, in PPEM
    pub range_max_ppem: BigEndian<u16>,
    /// Flags describing desired rasterizer behavior.
    pub range_gasp_behavior: BigEndian<GaspRangeBehavior>,
}

impl FixedSize for GaspRange {
    const RAW_BYTE_LEN: usize = 2 * u16::RAW_BYTE_LEN;
}

/// [gasp](https://learn.microsoft.com/en-us/typography/opentype/spec/gasp#gasp-table-formats)
#[derive(Clone, Copy, Debug)]
pub struct Gasp<'a> {
    version: u16,
    gasp_ranges: &'a [GaspRange],
}

impl<'a> Gasp<'a> {
    /// Version number (set to 1)
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Sorted by ppem
    pub fn gasp_ranges(&self) -> &'a [GaspRange] {
        self.gasp_ranges
    }

    /// The behavior for the first range whose upper limit is at or above
    /// `ppem`.
    pub fn behavior_for_ppem(&self, ppem: u16) -> Option<GaspRangeBehavior> {
        self.gasp_ranges
            .iter()
            .find(|range| range.range_max_ppem.get() >= ppem)
            .map(|range| range.range_gasp_behavior.get())
    }
}

impl TopLevelTable for Gasp<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Gasp<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version > 1 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let num_ranges: u16 = cursor.read()?;
        let gasp_ranges = cursor.read_array(num_ranges as usize)?;
        Ok(Gasp {
            version,
            gasp_ranges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::{fonts, BeBuffer};

    #[test]
    fn smoke_test() {
        let buf = BeBuffer::new()
            .push(1u16) // version
            .push(2u16) // number of records
            .push(404u16) // record 1 ppem
            .push(GaspRangeBehavior::GASP_GRIDFIT | GaspRangeBehavior::GASP_DOGRAY)
            .push(u16::MAX)
            .push(
                GaspRangeBehavior::GASP_SYMMETRIC_GRIDFIT
                    | GaspRangeBehavior::GASP_SYMMETRIC_SMOOTHING,
            );

        let gasp = Gasp::read(FontData::new(&buf)).unwrap();
        assert_eq!(gasp.version(), 1);
        assert_eq!(
            gasp.gasp_ranges()[0],
            GaspRange {
                range_max_ppem: 404.into(),
                range_gasp_behavior: (GaspRangeBehavior::GASP_GRIDFIT
                    | GaspRangeBehavior::GASP_DOGRAY)
                    .into(),
            }
        );
        assert_eq!(
            gasp.gasp_ranges()[1],
            GaspRange {
                range_max_ppem: u16::MAX.into(),
                range_gasp_behavior: (GaspRangeBehavior::GASP_SYMMETRIC_GRIDFIT
                    | GaspRangeBehavior::GASP_SYMMETRIC_SMOOTHING)
                    .into(),
            }
        );
    }

    #[test]
    fn behavior_lookup() {
        let buf = fonts::gasp();
        let gasp = Gasp::read(FontData::new(&buf)).unwrap();
        let small = GaspRangeBehavior::GASP_DOGRAY | GaspRangeBehavior::GASP_SYMMETRIC_SMOOTHING;
        assert_eq!(gasp.behavior_for_ppem(1), Some(small));
        assert_eq!(gasp.behavior_for_ppem(8), Some(small));
        let large = gasp.behavior_for_ppem(9).unwrap();
        assert!(large.contains(GaspRangeBehavior::GASP_GRIDFIT));
        assert_eq!(large.bits(), 0x000F);
    }

    #[test]
    fn unknown_version() {
        let buf = BeBuffer::new().extend([2u16, 0]);
        assert!(Gasp::read(FontData::new(&buf)).is_err());
    }
}
