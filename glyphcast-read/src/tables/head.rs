//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use types::{BigEndian, Fixed, FixedSize, LongDateTime, MajorMinor, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// `head`
pub const TAG: Tag = Tag::new(b"head");

/// The value of [`Head::magic_number`] in every valid font.
pub const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
struct RawHead {
    version: BigEndian<MajorMinor>,
    font_revision: BigEndian<Fixed>,
    checksum_adjustment: BigEndian<u32>,
    magic_number: BigEndian<u32>,
    flags: BigEndian<u16>,
    units_per_em: BigEndian<u16>,
    created: BigEndian<LongDateTime>,
    modified: BigEndian<LongDateTime>,
    x_min: BigEndian<i16>,
    y_min: BigEndian<i16>,
    x_max: BigEndian<i16>,
    y_max: BigEndian<i16>,
    mac_style: BigEndian<u16>,
    lowest_rec_ppem: BigEndian<u16>,
    font_direction_hint: BigEndian<i16>,
    index_to_loc_format: BigEndian<i16>,
    glyph_data_format: BigEndian<i16>,
}

impl FixedSize for RawHead {
    const RAW_BYTE_LEN: usize = 54;
}

/// The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head)
/// (font header) table.
#[derive(Clone, Copy)]
pub struct Head<'a> {
    raw: &'a RawHead,
}

impl Head<'_> {
    record_getters! { raw;
        /// Version number of the font header table, set to (1, 0)
        version: MajorMinor,
        /// Set by font manufacturer.
        font_revision: Fixed,
        /// To compute: set it to 0, sum the entire font as uint32, then
        /// store 0xB1B0AFBA - sum.
        checksum_adjustment: u32,
        /// Set to 0x5F0F3CF5.
        magic_number: u32,
        /// See the bit descriptions in the OpenType specification.
        flags: u16,
        /// Set to a value from 16 to 16384.
        units_per_em: u16,
        /// Number of seconds since 12:00 midnight that started January 1st
        /// 1904 in GMT/UTC time zone.
        created: LongDateTime,
        /// Number of seconds since 12:00 midnight that started January 1st
        /// 1904 in GMT/UTC time zone.
        modified: LongDateTime,
        /// Minimum x coordinate across all glyph bounding boxes.
        x_min: i16,
        /// Minimum y coordinate across all glyph bounding boxes.
        y_min: i16,
        /// Maximum x coordinate across all glyph bounding boxes.
        x_max: i16,
        /// Maximum y coordinate across all glyph bounding boxes.
        y_max: i16,
        /// Bold, italic and friends.
        mac_style: u16,
        /// Smallest readable size in pixels.
        lowest_rec_ppem: u16,
        /// Deprecated (Set to 2).
        font_direction_hint: i16,
        /// 0 for short offsets (Offset16), 1 for long (Offset32).
        index_to_loc_format: i16,
        /// 0 for current format.
        glyph_data_format: i16,
    }
}

impl TopLevelTable for Head<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Head<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let raw: &RawHead = data.read_ref_at(0)?;
        if raw.magic_number.get() != MAGIC_NUMBER {
            return Err(ReadError::MalformedData("bad magic number in 'head'"));
        }
        Ok(Head { raw })
    }
}

impl std::fmt::Debug for Head<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Head")
            .field("version", &self.version())
            .field("font_revision", &self.font_revision())
            .field("flags", &format_args!("{:#06X}", self.flags()))
            .field("units_per_em", &self.units_per_em())
            .field("created", &self.created())
            .field("modified", &self.modified())
            .field(
                "bbox",
                &[self.x_min(), self.y_min(), self.x_max(), self.y_max()],
            )
            .field("mac_style", &self.mac_style())
            .field("lowest_rec_ppem", &self.lowest_rec_ppem())
            .field("index_to_loc_format", &self.index_to_loc_format())
            .finish()
    }
}
