//! The [os2](https://docs.microsoft.com/en-us/typography/opentype/spec/os2) table

use types::{BigEndian, FixedSize, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// 'os/2'
pub const TAG: Tag = Tag::new(b"OS/2");

flags! {
    /// OS/2 [selection flags](https://learn.microsoft.com/en-us/typography/opentype/spec/os2#fsselection)
    SelectionFlags(u16) {
        /// Bit 0: Font contains italic or oblique glyphs.
        const ITALIC = 0x0001;
        /// Bit 1: Glyphs are underscored.
        const UNDERSCORE = 0x0002;
        /// Bit 2: Glyphs have their foreground and background reversed.
        const NEGATIVE = 0x0004;
        /// Bit 3: Outline (hollow) glyphs, otherwise they are solid.
        const OUTLINED = 0x0008;
        /// Bit 4: Glyphs are overstruck.
        const STRIKEOUT = 0x0010;
        /// Bit 5: Glyphs are emboldened.
        const BOLD = 0x0020;
        /// Bit 6: Glyphs are in the standard weight/style for the font.
        const REGULAR = 0x0040;
        /// Bit 7: Use the typo metrics for line spacing.
        const USE_TYPO_METRICS = 0x0080;
        /// Bit 8: The font has 'name' table strings consistent with a
        /// weight/width/slope family without requiring use of name IDs 21 and 22.
        const WWS = 0x0100;
        /// Bit 9: Font contains oblique glyphs.
        const OBLIQUE = 0x0200;
    }
}

#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
struct RawOs2 {
    version: BigEndian<u16>,
    x_avg_char_width: BigEndian<i16>,
    us_weight_class: BigEndian<u16>,
    us_width_class: BigEndian<u16>,
    fs_type: BigEndian<u16>,
    y_subscript_x_size: BigEndian<i16>,
    y_subscript_y_size: BigEndian<i16>,
    y_subscript_x_offset: BigEndian<i16>,
    y_subscript_y_offset: BigEndian<i16>,
    y_superscript_x_size: BigEndian<i16>,
    y_superscript_y_size: BigEndian<i16>,
    y_superscript_x_offset: BigEndian<i16>,
    y_superscript_y_offset: BigEndian<i16>,
    y_strikeout_size: BigEndian<i16>,
    y_strikeout_position: BigEndian<i16>,
    s_family_class: BigEndian<i16>,
    panose_10: [u8; 10],
    ul_unicode_range_1: BigEndian<u32>,
    ul_unicode_range_2: BigEndian<u32>,
    ul_unicode_range_3: BigEndian<u32>,
    ul_unicode_range_4: BigEndian<u32>,
    ach_vend_id: BigEndian<Tag>,
    fs_selection: BigEndian<SelectionFlags>,
    us_first_char_index: BigEndian<u16>,
    us_last_char_index: BigEndian<u16>,
    s_typo_ascender: BigEndian<i16>,
    s_typo_descender: BigEndian<i16>,
    s_typo_line_gap: BigEndian<i16>,
    us_win_ascent: BigEndian<u16>,
    us_win_descent: BigEndian<u16>,
}

impl FixedSize for RawOs2 {
    const RAW_BYTE_LEN: usize = 78;
}

#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
struct RawOs2V1 {
    ul_code_page_range_1: BigEndian<u32>,
    ul_code_page_range_2: BigEndian<u32>,
}

impl FixedSize for RawOs2V1 {
    const RAW_BYTE_LEN: usize = 8;
}

#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
struct RawOs2V2 {
    sx_height: BigEndian<i16>,
    s_cap_height: BigEndian<i16>,
    us_default_char: BigEndian<u16>,
    us_break_char: BigEndian<u16>,
    us_max_context: BigEndian<u16>,
}

impl FixedSize for RawOs2V2 {
    const RAW_BYTE_LEN: usize = 10;
}

#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
struct RawOs2V5 {
    us_lower_optical_point_size: BigEndian<u16>,
    us_upper_optical_point_size: BigEndian<u16>,
}

impl FixedSize for RawOs2V5 {
    const RAW_BYTE_LEN: usize = 4;
}

/// [`OS/2`](https://docs.microsoft.com/en-us/typography/opentype/spec/os2)
///
/// Fields added after version 0 are `None` when the version predates them.
#[derive(Clone, Copy)]
pub struct Os2<'a> {
    raw: &'a RawOs2,
    v1: Option<&'a RawOs2V1>,
    v2: Option<&'a RawOs2V2>,
    v5: Option<&'a RawOs2V5>,
}

macro_rules! versioned_getters {
    ($src:ident; $( $(#[$attr:meta])* $name:ident: $ty:ty ),* $(,)?) => {
        $(
            $(#[$attr])*
            pub fn $name(&self) -> Option<$ty> {
                self.$src.map(|raw| raw.$name.get())
            }
        )*
    };
}

impl<'a> Os2<'a> {
    record_getters! { raw;
        version: u16,
        /// [Average weighted escapement](https://learn.microsoft.com/en-us/typography/opentype/spec/os2#xavgcharwidth).
        x_avg_char_width: i16,
        /// [Visual weight class](https://learn.microsoft.com/en-us/typography/opentype/spec/os2#usweightclass),
        /// 1 to 1000.
        us_weight_class: u16,
        /// Relative change from the normal aspect ratio, 1 to 9.
        us_width_class: u16,
        /// Font embedding licensing rights.
        fs_type: u16,
        y_subscript_x_size: i16,
        y_subscript_y_size: i16,
        y_subscript_x_offset: i16,
        y_subscript_y_offset: i16,
        y_superscript_x_size: i16,
        y_superscript_y_size: i16,
        y_superscript_x_offset: i16,
        y_superscript_y_offset: i16,
        /// Thickness of the strikeout stroke.
        y_strikeout_size: i16,
        /// The position of the top of the strikeout stroke relative to the
        /// baseline.
        y_strikeout_position: i16,
        /// The IBM font family class and subclass.
        s_family_class: i16,
        ul_unicode_range_1: u32,
        ul_unicode_range_2: u32,
        ul_unicode_range_3: u32,
        ul_unicode_range_4: u32,
        /// The four-character identifier for the vendor of the given type face.
        ach_vend_id: Tag,
        /// Font selection flags.
        fs_selection: SelectionFlags,
        /// The minimum Unicode index in this font.
        us_first_char_index: u16,
        /// The maximum Unicode index in this font.
        us_last_char_index: u16,
        /// The typographic ascender for this font.
        s_typo_ascender: i16,
        /// The typographic descender for this font.
        s_typo_descender: i16,
        /// The typographic line gap for this font.
        s_typo_line_gap: i16,
        /// The "Windows ascender" metric.
        us_win_ascent: u16,
        /// The "Windows descender" metric, as a positive value.
        us_win_descent: u16,
    }

    /// The PANOSE classification digits.
    pub fn panose_10(&self) -> &'a [u8; 10] {
        &self.raw.panose_10
    }

    versioned_getters! { v1;
        /// Code page character range bits 0-31 (version 1 and later).
        ul_code_page_range_1: u32,
        /// Code page character range bits 32-63 (version 1 and later).
        ul_code_page_range_2: u32,
    }

    versioned_getters! { v2;
        /// Height of lowercase x above the baseline (version 2 and later).
        sx_height: i16,
        /// Height of uppercase letters above the baseline (version 2 and later).
        s_cap_height: i16,
        us_default_char: u16,
        us_break_char: u16,
        /// The maximum length of a target glyph context for any feature.
        us_max_context: u16,
    }

    versioned_getters! { v5;
        /// Lower end of the optical size range, in TWIPs (version 5).
        us_lower_optical_point_size: u16,
        /// Upper end of the optical size range, in TWIPs (version 5).
        us_upper_optical_point_size: u16,
    }
}

impl TopLevelTable for Os2<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Os2<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let raw: &RawOs2 = data.read_ref_at(0)?;
        let version = raw.version.get();
        if version > 5 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let mut pos = RawOs2::RAW_BYTE_LEN;
        let v1: Option<&RawOs2V1> = match version {
            1.. => Some(data.read_ref_at(pos)?),
            _ => None,
        };
        pos += RawOs2V1::RAW_BYTE_LEN;
        let v2: Option<&RawOs2V2> = match version {
            2.. => Some(data.read_ref_at(pos)?),
            _ => None,
        };
        pos += RawOs2V2::RAW_BYTE_LEN;
        let v5 = match version {
            5 => Some(data.read_ref_at(pos)?),
            _ => None,
        };
        Ok(Os2 { raw, v1, v2, v5 })
    }
}

impl std::fmt::Debug for Os2<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Os2")
            .field("version", &self.version())
            .field("x_avg_char_width", &self.x_avg_char_width())
            .field("us_weight_class", &self.us_weight_class())
            .field("us_width_class", &self.us_width_class())
            .field("fs_type", &self.fs_type())
            .field("panose_10", self.panose_10())
            .field("ach_vend_id", &self.ach_vend_id())
            .field("fs_selection", &self.fs_selection())
            .field("s_typo_ascender", &self.s_typo_ascender())
            .field("s_typo_descender", &self.s_typo_descender())
            .field("s_typo_line_gap", &self.s_typo_line_gap())
            .field("us_win_ascent", &self.us_win_ascent())
            .field("us_win_descent", &self.us_win_descent())
            .field("sx_height", &self.sx_height())
            .field("s_cap_height", &self.s_cap_height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::fonts;

    #[test]
    fn version_4() {
        let buf = fonts::os2();
        let os2 = Os2::read(FontData::new(&buf)).unwrap();
        assert_eq!(os2.version(), 4);
        assert_eq!(os2.us_weight_class(), 400);
        assert_eq!(os2.panose_10(), &[2, 0, 5, 3, 0, 0, 0, 0, 0, 0]);
        assert_eq!(os2.ach_vend_id(), Tag::new(b"GLYC"));
        assert_eq!(os2.fs_selection(), SelectionFlags::REGULAR);
        assert_eq!(os2.s_typo_ascender(), 800);
        assert_eq!(os2.s_typo_descender(), -200);
        assert_eq!(os2.us_win_descent(), 250);
        assert_eq!(os2.ul_code_page_range_1(), Some(1));
        assert_eq!(os2.sx_height(), Some(500));
        assert_eq!(os2.s_cap_height(), Some(700));
        assert_eq!(os2.us_max_context(), Some(2));
        assert_eq!(os2.us_lower_optical_point_size(), None);
    }

    #[test]
    fn version_0_has_no_later_fields() {
        let mut buf = fonts::os2().into_vec();
        buf.truncate(78);
        buf[1] = 0;
        let os2 = Os2::read(FontData::new(&buf)).unwrap();
        assert_eq!(os2.us_win_ascent(), 900);
        assert_eq!(os2.ul_code_page_range_1(), None);
        assert_eq!(os2.sx_height(), None);
    }

    #[test]
    fn version_5_needs_optical_sizes() {
        let mut buf = fonts::os2().into_vec();
        buf[1] = 5;
        assert!(Os2::read(FontData::new(&buf)).is_err());
        buf.extend([0, 80, 0, 160]);
        let os2 = Os2::read(FontData::new(&buf)).unwrap();
        assert_eq!(os2.us_lower_optical_point_size(), Some(80));
        assert_eq!(os2.us_upper_optical_point_size(), Some(160));
    }

    #[test]
    fn truncated_for_version() {
        let buf = fonts::os2();
        assert!(Os2::read(FontData::new(&buf[..90])).is_err());
    }
}
