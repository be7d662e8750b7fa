//! Synthetic fonts.
//!
//! `glyf_font` has six glyphs:
//!
//! | gid | name | outline |
//! |-----|------|---------|
//! | 0 | `.notdef` | rectangle (50,0)..(450,700) |
//! | 1 | `space` | empty |
//! | 2 | `A` | two contours, one off-curve point |
//! | 3 | `A.comp` | composite: gid 2 at (10, 20) + gid 0 scaled by 0.5 at (-100, 300) |
//! | 4 | `cycleA` | composite referencing gid 5 |
//! | 5 | `cycleB` | composite referencing gid 4 |
//!
//! `cff_font` has 500 glyphs whose charstrings call a local and a global
//! subroutine.

use glyphcast_types::{Tag, CFF_SFNT_VERSION, TT_SFNT_VERSION};

use crate::{
    be_buffer,
    bebuffer::BeBuffer,
    cff::{self, op, CffBuilder, CharsetData, CharstringBuilder},
    sfnt::SfntBuilder,
};

pub const GLYF_NUM_GLYPHS: u16 = 6;
pub const CFF_NUM_GLYPHS: u16 = 500;

/// `head` with the given glyph offset format.
pub fn head(index_to_loc_format: i16) -> BeBuffer {
    be_buffer! {
        0x00010000u32,          // version
        0x00018000u32,          // font revision 1.5
        0u32,                   // checksum adjustment
        0x5F0F3CF5u32,          // magic
        0x000Bu16,              // flags
        1000u16,                // units per em
        3600i64,                // created
        7200i64,                // modified
        (-100i16),              // x min
        0i16,                   // y min
        600i16,                 // x max
        800i16,                 // y max
        0u16,                   // mac style
        8u16,                   // lowest rec ppem
        2i16,                   // direction hint
        index_to_loc_format,
        0i16                    // glyph data format
    }
}

pub fn hhea(number_of_h_metrics: u16) -> BeBuffer {
    be_buffer! {
        0x00010000u32,
        800i16,                 // ascender
        (-200i16),              // descender
        90i16,                  // line gap
        600u16,                 // advance width max
        (-100i16),              // min lsb
        0i16,                   // min rsb
        600i16,                 // x max extent
        1i16,                   // caret slope rise
        0i16,                   // caret slope run
        0i16,                   // caret offset
        [0i16, 0, 0, 0],        // reserved
        0i16,                   // metric data format
        number_of_h_metrics
    }
}

pub fn vhea(number_of_long_ver_metrics: u16) -> BeBuffer {
    be_buffer! {
        0x00011000u32,
        500i16,                 // vert typo ascender
        (-500i16),              // vert typo descender
        0i16,                   // vert typo line gap
        1000u16,                // advance height max
        0i16,                   // min top side bearing
        0i16,                   // min bottom side bearing
        800i16,                 // y max extent
        0i16,                   // caret slope rise
        1i16,                   // caret slope run
        0i16,                   // caret offset
        [0i16, 0, 0, 0],        // reserved
        0i16,                   // metric data format
        number_of_long_ver_metrics
    }
}

pub fn maxp_v1(num_glyphs: u16) -> BeBuffer {
    be_buffer! {
        0x00010000u32,
        num_glyphs,
        10u16,                  // max points
        2u16,                   // max contours
        12u16,                  // max composite points
        3u16,                   // max composite contours
        2u16,                   // max zones
        0u16,                   // max twilight points
        0u16,                   // max storage
        0u16,                   // max function defs
        0u16,                   // max instruction defs
        64u16,                  // max stack elements
        2u16,                   // max size of instructions
        2u16,                   // max component elements
        2u16                    // max component depth
    }
}

pub fn maxp_v0_5(num_glyphs: u16) -> BeBuffer {
    be_buffer! { 0x00005000u32, num_glyphs }
}

/// Glyph data for `glyf_font`, one entry per glyph.
pub fn glyf_glyphs() -> Vec<Vec<u8>> {
    let notdef = be_buffer! {
        1i16,                           // one contour
        50i16, 0i16, 450i16, 700i16,    // bbox
        3u16,                           // end points
        0u16,                           // no instructions
        [0x33u8, 0x11, 0x21, 0x11],     // flags
        [50u8, 0x01, 0x90],             // x: +50, 0, +400, 0
        [0x02u8, 0xBC, 0xFD, 0x44],     // y: 0, +700, 0, -700
        0u8                             // pad
    };
    let a = be_buffer! {
        2i16,
        100i16, 0i16, 500i16, 700i16,
        [3u16, 6],
        2u16,
        [0xB0u8, 0x01],                 // instructions
        // on, off, on, on, on, on (repeated once)
        [0x33u8, 0x12, 0x13, 0x27, 0x27, 0x3B, 0x01],
        [100u8, 200, 200, 200, 50, 10, 10],
        [0x02u8, 0xBC, 0xFD, 0x44, 100, 100]
    };
    let composite = be_buffer! {
        (-1i16),
        (-100i16), 0i16, 600i16, 800i16,
        0x0022u16,                      // ARGS_ARE_XY_VALUES | MORE_COMPONENTS
        2u16,
        [10i8, 20],
        0x000Bu16,                      // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | WE_HAVE_A_SCALE
        0u16,
        (-100i16), 300i16,
        0x2000u16                       // 0.5
    };
    let cycle = |target: u16| {
        be_buffer! {
            (-1i16),
            0i16, 0i16, 0i16, 0i16,
            0x0002u16,
            target,
            [0i8, 0]
        }
        .into_vec()
    };
    vec![
        notdef.into_vec(),
        Vec::new(),
        a.into_vec(),
        composite.into_vec(),
        cycle(5),
        cycle(4),
    ]
}

/// Concatenate glyphs into `glyf` and build the matching short `loca`.
pub fn glyf_and_loca(glyphs: &[Vec<u8>]) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = Vec::new();
    let mut loca = BeBuffer::new().push(0u16);
    for glyph in glyphs {
        glyf.extend_from_slice(glyph);
        assert!(glyf.len() % 2 == 0, "short loca needs even glyph lengths");
        loca = loca.push((glyf.len() / 2) as u16);
    }
    (glyf, loca.into_vec())
}

/// Format 4 (3,1) and format 12 (3,10) subtables.
pub fn cmap() -> BeBuffer {
    let format4 = be_buffer! {
        4u16,                           // format
        44u16,                          // length
        0u16,                           // language
        6u16,                           // seg count x2
        4u16,                           // search range
        1u16,                           // entry selector
        2u16,                           // range shift
        [0x20u16, 0x42, 0xFFFF],        // end codes
        0u16,                           // reserved pad
        [0x20u16, 0x41, 0xFFFF],        // start codes
        [0xFFE1u16, 0, 1],              // id deltas: -31, 0, 1
        [0u16, 4, 0],                   // id range offsets
        [2u16, 3]                       // glyph id array
    };
    let format12 = be_buffer! {
        12u16,                          // format
        0u16,                           // reserved
        52u32,                          // length
        0u32,                           // language
        3u32,                           // num groups
        [0x20u32, 0x20, 1],
        [0x41u32, 0x42, 2],
        [0x1F600u32, 0x1F600, 2]
    };
    be_buffer! {
        0u16,                           // version
        2u16,                           // num tables
        [3u16, 1],
        20u32,
        [3u16, 10],
        64u32
    }
    .extend_bytes(&format4)
    .extend_bytes(&format12)
}

/// A format 4 subtable mapping 'A'..='Z' to 1..=26.
pub fn cmap_alphabet() -> BeBuffer {
    be_buffer! {
        0u16,
        1u16,
        [3u16, 1],
        12u32,
        4u16,                           // format
        32u16,                          // length
        0u16,                           // language
        4u16,                           // seg count x2
        4u16,                           // search range
        1u16,                           // entry selector
        0u16,                           // range shift
        [0x5Au16, 0xFFFF],
        0u16,
        [0x41u16, 0xFFFF],
        [0xFFC0u16, 1],                 // -64
        [0u16, 0]
    }
}

/// post version 2.0 naming the glyphs of `glyf_font`.
pub fn post_v2() -> BeBuffer {
    let mut buf = post_header(0x00020000)
        .push(GLYF_NUM_GLYPHS)
        .extend([0u16, 3, 36, 258, 259, 260]);
    for name in ["A.comp", "cycleA", "cycleB"] {
        buf = buf.push(name.len() as u8).extend_bytes(name.as_bytes());
    }
    buf
}

pub fn post_header(version: u32) -> BeBuffer {
    be_buffer! {
        version,
        0xFFF48000u32,                  // italic angle -11.5
        (-75i16),                       // underline position
        50i16,                          // underline thickness
        0u32,                           // is fixed pitch
        [0u32, 0, 0, 0]                 // memory usage
    }
}

/// Name records; the strings are written in record order.
pub fn name() -> BeBuffer {
    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect()
    }
    let records: Vec<(u16, u16, u16, u16, Vec<u8>)> = vec![
        (1, 0, 0, 0, b"\xA9 Glyphcast".to_vec()),
        (1, 0, 0, 1, b"Glyphcast Mac".to_vec()),
        (1, 0, 0, 2, b"Caf\x8E".to_vec()),
        (3, 1, 0x0407, 1, utf16("Glyphcast Probe")),
        (3, 1, 0x0409, 1, utf16("Glyphcast Test")),
        (3, 1, 0x0409, 4, utf16("Glyphcast Test Regular")),
    ];
    name_table(&records)
}

/// A format 0 name table from `(platform, encoding, language, name id, bytes)`.
pub fn name_table(records: &[(u16, u16, u16, u16, Vec<u8>)]) -> BeBuffer {
    let mut buf = be_buffer! {
        0u16,
        (records.len() as u16),
        ((6 + 12 * records.len()) as u16)
    };
    let mut offset = 0u16;
    for (platform, encoding, language, name_id, bytes) in records {
        buf = buf
            .extend([*platform, *encoding, *language, *name_id])
            .push(bytes.len() as u16)
            .push(offset);
        offset += bytes.len() as u16;
    }
    for (.., bytes) in records {
        buf = buf.extend_bytes(bytes);
    }
    buf
}

/// OS/2 version 4.
pub fn os2() -> BeBuffer {
    be_buffer! {
        4u16,                           // version
        480i16,                         // x avg char width
        400u16,                         // weight class
        5u16,                           // width class
        0u16,                           // fs type
        [650i16, 600, 0, 75],           // subscript
        [650i16, 600, 0, 350],          // superscript
        50i16,                          // strikeout size
        300i16,                         // strikeout position
        0i16,                           // family class
        [2u8, 0, 5, 3, 0, 0, 0, 0, 0, 0], // panose
        [1u32, 0, 0, 0],                // unicode ranges
        (Tag::new(b"GLYC")),
        0x0040u16,                      // fs selection: REGULAR
        0x20u16,                        // first char
        0xFFFFu16,                      // last char
        800i16,                         // typo ascender
        (-200i16),                      // typo descender
        90i16,                          // typo line gap
        900u16,                         // win ascent
        250u16,                         // win descent
        [1u32, 0],                      // code page ranges
        500i16,                         // x height
        700i16,                         // cap height
        0u16,                           // default char
        0x20u16,                        // break char
        2u16                            // max context
    }
}

/// Three format 0 subtables; the middle one holds minimum values.
pub fn kern() -> BeBuffer {
    let subtable = |coverage: u16, pairs: &[(u16, u16, i16)]| {
        let n = pairs.len() as u16;
        let entry_selector = 15 - n.leading_zeros() as u16;
        let search_range = (1u16 << entry_selector) * 6;
        let mut buf = be_buffer! {
            0u16,
            ((14 + 6 * pairs.len()) as u16),
            coverage,
            n,
            search_range,
            entry_selector,
            (n * 6 - search_range)
        };
        for (left, right, value) in pairs {
            buf = buf.extend([*left, *right]).push(*value);
        }
        buf.into_vec()
    };
    be_buffer! { 0u16, 3u16 }
        .extend_bytes(&subtable(0x0001, &[(2, 2, -20), (2, 3, -50), (3, 2, 15)]))
        .extend_bytes(&subtable(0x0003, &[(2, 3, 100)]))
        .extend_bytes(&subtable(0x0001, &[(2, 3, -5)]))
}

pub fn gasp() -> BeBuffer {
    be_buffer! {
        1u16,
        2u16,
        [8u16, 0x000A],
        [0xFFFFu16, 0x000F]
    }
}

/// A TrueType font with every table the reader understands.
pub fn glyf_font_builder() -> SfntBuilder {
    let (glyf, loca) = glyf_and_loca(&glyf_glyphs());
    let hmtx = be_buffer! {
        [500u16, 50], [250u16, 0], [600u16, 100],
        [0i16, 0, 0]
    };
    let vmtx = be_buffer! { [1000u16, 100], [0i16, 0, 0, 0, 0] };
    SfntBuilder::new(TT_SFNT_VERSION)
        .add_table(Tag::new(b"head"), head(0).into_vec())
        .add_table(Tag::new(b"hhea"), hhea(3).into_vec())
        .add_table(Tag::new(b"maxp"), maxp_v1(GLYF_NUM_GLYPHS).into_vec())
        .add_table(Tag::new(b"vhea"), vhea(1).into_vec())
        .add_table(Tag::new(b"post"), post_v2().into_vec())
        .add_table(Tag::new(b"cmap"), cmap().into_vec())
        .add_table(Tag::new(b"hmtx"), hmtx.into_vec())
        .add_table(Tag::new(b"vmtx"), vmtx.into_vec())
        .add_table(Tag::new(b"name"), name().into_vec())
        .add_table(Tag::new(b"OS/2"), os2().into_vec())
        .add_table(Tag::new(b"kern"), kern().into_vec())
        .add_table(Tag::new(b"gasp"), gasp().into_vec())
        .add_table(Tag::new(b"loca"), loca)
        .add_table(Tag::new(b"glyf"), glyf)
        .add_table(Tag::new(b"DSIG"), vec![0, 0, 0, 1, 0, 0, 0, 0])
}

pub fn glyf_font() -> Vec<u8> {
    glyf_font_builder().build()
}

/// `glyf_font` without a `head` table.
pub fn missing_head() -> Vec<u8> {
    glyf_font_builder()
        .remove_table(Tag::new(b"head"))
        .build()
}

/// `glyf_font` with a `glyf` table cut short after the first glyph.
///
/// `loca` still points past the end, so only gid 0 and the empty gid 1 can
/// be read.
pub fn truncated_glyf() -> Vec<u8> {
    let (glyf, _) = glyf_and_loca(&glyf_glyphs());
    glyf_font_builder()
        .add_table(Tag::new(b"glyf"), glyf[..40].to_vec())
        .build()
}

/// Name of the glyph `gid` in `cff_font`, for gids above 255.
pub fn cff_custom_glyph_name(gid: u16) -> String {
    format!("glyph{gid}")
}

/// The charstring of glyph `gid` in `cff_font`.
pub fn cff_charstring(gid: u16) -> Vec<u8> {
    if gid == 0 {
        // width 100 + nominal, then a rectangle
        return CharstringBuilder::new()
            .cmd(&[100, 50, 0], op::RMOVETO)
            .cmd(&[400, 0], op::RLINETO)
            .cmd(&[0, 700], op::RLINETO)
            .cmd(&[-400, 0], op::RLINETO)
            .op(op::ENDCHAR)
            .build();
    }
    let stems = if gid % 2 == 1 {
        // odd glyphs carry a width delta before the first hint
        CharstringBuilder::new().cmd(&[-100, 0, 20], op::HSTEMHM)
    } else {
        CharstringBuilder::new().cmd(&[0, 20], op::HSTEMHM)
    };
    stems
        .cmd(&[100, 30], op::VSTEMHM)
        .op(op::HINTMASK)
        .bytes(&[0xC0])
        .cmd(&[50, (gid % 100) as i32], op::RMOVETO)
        .cmd(&[-107], op::CALLSUBR)
        .cmd(&[-107], op::CALLGSUBR)
        .op(op::ENDCHAR)
        .build()
}

/// A 500 glyph CFF table with a format 1 charset.
pub fn cff_table() -> Vec<u8> {
    let mut builder = CffBuilder::new("GlyphcastCFF");
    builder.strings = (256..CFF_NUM_GLYPHS).map(cff_custom_glyph_name).collect();
    builder.local_subrs = vec![CharstringBuilder::new()
        .cmd(&[400, 0], op::RLINETO)
        .cmd(&[-200, 700], op::RLINETO)
        .op(op::RETURN)
        .build()];
    builder.global_subrs = vec![CharstringBuilder::new()
        .cmd(&[-60, -200, -70, -250, -70, -250], op::RRCURVETO)
        .op(op::RETURN)
        .build()];
    builder.charstrings = (0..CFF_NUM_GLYPHS).map(cff_charstring).collect();
    // gids 1..=255 use standard strings 1..=255, the rest custom strings
    builder.charset = Some(CharsetData::Format1(vec![(1, 254), (391, 243)]));
    builder.default_width = 500;
    builder.nominal_width = 500;
    let mut extra = cff::DictBuilder::new().entry(5, &[0, 0, 500, 700]).build();
    // FontMatrix
    for operand in ["0.001", "0", "0", "0.001", "0", "0"] {
        extra.extend(cff::real(operand));
    }
    extra.extend(cff::operator(0x0C07));
    builder.top_dict_extra = extra;
    builder.build()
}

/// An `OTTO` font wrapping `cff_table`.
pub fn cff_font() -> Vec<u8> {
    let hmtx = BeBuffer::new()
        .extend([500u16, 50, 600, 50])
        .extend(std::iter::repeat(0i16).take(CFF_NUM_GLYPHS as usize - 2));
    let name = name_table(&[(
        3,
        1,
        0x0409,
        1,
        "Glyphcast CFF"
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect(),
    )]);
    SfntBuilder::new(CFF_SFNT_VERSION)
        .add_table(Tag::new(b"head"), head(0).into_vec())
        .add_table(Tag::new(b"hhea"), hhea(2).into_vec())
        .add_table(Tag::new(b"maxp"), maxp_v0_5(CFF_NUM_GLYPHS).into_vec())
        .add_table(Tag::new(b"post"), post_header(0x00030000).into_vec())
        .add_table(Tag::new(b"cmap"), cmap_alphabet().into_vec())
        .add_table(Tag::new(b"hmtx"), hmtx.into_vec())
        .add_table(Tag::new(b"name"), name.into_vec())
        .add_table(Tag::new(b"CFF "), cff_table())
        .build()
}

/// A collection holding `glyf_font` and `cff_font`.
pub fn collection() -> Vec<u8> {
    SfntBuilder::collection(&[glyf_font(), cff_font()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_lengths_are_even() {
        let glyphs = glyf_glyphs();
        assert_eq!(glyphs.len(), GLYF_NUM_GLYPHS as usize);
        assert_eq!(
            glyphs.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![26, 0, 38, 26, 16, 16]
        );
    }

    #[test]
    fn declared_lengths_match() {
        assert_eq!(cmap().len(), 116);
        assert_eq!(os2().len(), 96);
        assert_eq!(head(0).len(), 54);
        assert_eq!(hhea(1).len(), 36);
        assert_eq!(maxp_v1(1).len(), 32);
    }
}
