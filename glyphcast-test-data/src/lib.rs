//! test data shared between the glyphcast crates.

pub mod bebuffer;
pub mod cff;
pub mod fonts;
pub mod sfnt;

pub use bebuffer::BeBuffer;
pub use sfnt::SfntBuilder;

/// A version 2.0 'post' table naming ten glyphs.
pub mod post {
    #[rustfmt::skip]
    pub static SIMPLE: &[u8] = &[
        0x00, 0x02, 0x00, 0x00, // version 2.0
        0x00, 0x00, 0x00, 0x00, // italic angle
        0xFF, 0xb5,             // underlinePosition -75
        0x00, 0x32,             // underlineThickness 50
        0x00, 0x00, 0x00, 0x00, // fixedpitch
        0x00, 0x00, 0x00, 0x00, // min/max mem:
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x0A,             // numGlyphs 10
                                // glyph name index:
        0x00, 0x00,             // glyph 0 -> name 0
        0x00, 0x00,             // glyph 1 -> name 0
        0x00, 0x03,             // glyph 2 -> name 3 ('space')
        0x00, 0x04,             // glyph 3 -> name 4 ('exclam')
        0x00, 0x06,
        0x00, 0x07,
        0x00, 0x08,
        0x01, 0x02,             // glyph 7 -> name 258 first custom
        0x01, 0x03,             // glyph 8 -> name 259
        0x01, 0x04,             // glyph 9 -> name 260
        0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f, // 5, h e l l o
        0x02, 0x68, 0x69,                   // 2, h i
        0x04, 0x68, 0x6f, 0x6c, 0x61,       // 4, h o l a
    ];
}
