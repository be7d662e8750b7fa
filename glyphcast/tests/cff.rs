//! End to end queries against a CFF font.

use glyphcast::{
    types::{GlyphId, NameId, PenCommand},
    DrawError, Font, OutlineFormat, OutlinePoint, PathStyle, PointKind,
};
use glyphcast_test_data::fonts;
use pretty_assertions::assert_eq;

fn gid(id: u32) -> GlyphId {
    GlyphId::new(id)
}

#[test]
fn loads_every_table() {
    let _ = env_logger::builder().is_test(true).try_init();
    let data = fonts::cff_font();
    let font = Font::new(&data).unwrap();
    assert_eq!(font.outline_format(), Some(OutlineFormat::Cff));
    assert_eq!(font.num_glyphs(), 500);
    assert_eq!(font.cff().unwrap().num_glyphs(), 500);
    assert_eq!(
        font.name(NameId::FAMILY_NAME).as_deref(),
        Some("Glyphcast CFF")
    );
    assert_eq!(font.map_codepoint('A'), Some(gid(1)));
    assert_eq!(font.map_codepoint('Z'), Some(gid(26)));
    assert_eq!(font.charmap().count(), 26);
    assert_eq!(font.kerning(gid(1), gid(2)), 0);
}

#[test]
fn notdef_rectangle() {
    let data = fonts::cff_font();
    let font = Font::new(&data).unwrap();
    let glyph = font.try_glyph(gid(0)).unwrap();
    assert_eq!(glyph.advance_width, 500);
    assert_eq!(glyph.left_side_bearing, 50);
    assert_eq!(glyph.charstring_width, Some(600.0));
    let mut commands: Vec<PenCommand> = Vec::new();
    glyph.outline.draw(PathStyle::FreeType, &mut commands).unwrap();
    assert_eq!(
        commands,
        [
            PenCommand::MoveTo { x: 50.0, y: 0.0 },
            PenCommand::LineTo { x: 450.0, y: 0.0 },
            PenCommand::LineTo { x: 450.0, y: 700.0 },
            PenCommand::LineTo { x: 50.0, y: 700.0 },
            PenCommand::Close,
        ]
    );
}

#[test]
fn subroutine_glyphs() {
    let data = fonts::cff_font();
    let font = Font::new(&data).unwrap();
    let glyph = font.try_glyph(gid(1)).unwrap();
    assert_eq!(glyph.advance_width, 600);
    assert_eq!(glyph.charstring_width, Some(400.0));
    assert_eq!(glyph.outline.contours().len(), 1);
    let points = glyph.outline.contours()[0].points();
    assert!(points.len() >= 3);
    assert_eq!(
        points,
        [
            OutlinePoint::on_curve(50.0, 1.0),
            OutlinePoint::on_curve(450.0, 1.0),
            OutlinePoint::on_curve(250.0, 701.0),
            OutlinePoint::new(190.0, 501.0, PointKind::OffCurveCubic),
            OutlinePoint::new(120.0, 251.0, PointKind::OffCurveCubic),
        ]
    );
    let mut commands: Vec<PenCommand> = Vec::new();
    glyph.outline.draw(PathStyle::HarfBuzz, &mut commands).unwrap();
    assert_eq!(
        commands[3],
        PenCommand::CurveTo {
            cx0: 190.0,
            cy0: 501.0,
            cx1: 120.0,
            cy1: 251.0,
            x: 50.0,
            y: 1.0
        }
    );
}

#[test]
fn every_glyph_decodes() {
    let data = fonts::cff_font();
    let font = Font::new(&data).unwrap();
    for id in 0..font.num_glyphs() {
        let glyph = font.try_glyph(gid(id)).unwrap();
        let expected_width = match id {
            0 => 600.0,
            _ if id % 2 == 1 => 400.0,
            _ => 500.0,
        };
        assert_eq!(glyph.charstring_width, Some(expected_width), "gid {id}");
        assert_eq!(glyph.outline.num_points(), if id == 0 { 4 } else { 5 });
    }
    assert!(matches!(
        font.try_glyph(gid(500)),
        Err(DrawError::GlyphNotFound(_))
    ));
}

#[test]
fn glyph_names_from_charset() {
    let data = fonts::cff_font();
    let font = Font::new(&data).unwrap();
    assert_eq!(font.glyph_name(gid(0)).as_deref(), Some(".notdef"));
    assert_eq!(font.glyph_name(gid(1)).as_deref(), Some("space"));
    assert_eq!(font.glyph_name(gid(34)).as_deref(), Some("A"));
    assert_eq!(
        font.glyph_name(gid(300)),
        Some(fonts::cff_custom_glyph_name(300))
    );
    assert_eq!(font.glyph_name(gid(500)), None);
    assert_eq!(font.glyph_names().count(), 500);
}
