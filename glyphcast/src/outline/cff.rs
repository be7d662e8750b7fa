//! Outlines from the `CFF ` table.

use glyphcast_read::tables::{cff::CffFont, postscript::charstring::CommandSink};

use super::{Contour, Outline, OutlinePoint, PointKind};
use crate::{
    types::{Fixed, GlyphId},
    DrawError,
};

/// Builds outlines for CFF glyphs.
#[derive(Clone)]
pub(crate) struct CffOutlines<'a> {
    font: CffFont<'a>,
}

impl<'a> CffOutlines<'a> {
    pub fn new(font: CffFont<'a>) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &CffFont<'a> {
        &self.font
    }

    pub fn num_glyphs(&self) -> u32 {
        self.font.num_glyphs()
    }

    /// Evaluates the charstring of `gid`, returning the outline and the
    /// advance width it encodes.
    pub fn outline(&self, gid: GlyphId) -> Result<(Outline, f32), DrawError> {
        if gid.to_u32() >= self.num_glyphs() {
            return Err(DrawError::GlyphNotFound(gid));
        }
        let mut sink = OutlineSink::default();
        self.font.evaluate_glyph(gid, &mut sink)?;
        let width = match sink.width {
            Some(delta) => self.font.nominal_width() + delta.to_f64(),
            None => self.font.default_width(),
        };
        Ok((sink.finish(), width as f32))
    }
}

/// Collects charstring commands into contours.
#[derive(Default)]
struct OutlineSink {
    contours: Vec<Contour>,
    current: Vec<OutlinePoint>,
    width: Option<Fixed>,
}

impl OutlineSink {
    fn push(&mut self, x: Fixed, y: Fixed, kind: PointKind) {
        self.current
            .push(OutlinePoint::new(x.to_f32(), y.to_f32(), kind));
    }

    fn close_contour(&mut self) {
        let mut points = std::mem::take(&mut self.current);
        // the segment back to the start is implied by closing
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if !points.is_empty() {
            self.contours.push(Contour::new(points));
        }
    }

    fn finish(mut self) -> Outline {
        self.close_contour();
        Outline::new(self.contours)
    }
}

impl CommandSink for OutlineSink {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.close_contour();
        self.push(x, y, PointKind::OnCurve);
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.push(x, y, PointKind::OnCurve);
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.push(cx0, cy0, PointKind::OffCurveCubic);
        self.push(cx1, cy1, PointKind::OffCurveCubic);
        self.push(x, y, PointKind::OnCurve);
    }

    fn close(&mut self) {
        self.close_contour();
    }

    fn width(&mut self, width: Fixed) {
        self.width = Some(width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{outline::PathStyle, types::PenCommand};
    use glyphcast_read::{tables::cff::Cff, FontData, FontRead};
    use glyphcast_test_data::fonts;

    fn fixed(v: i32) -> Fixed {
        Fixed::from_i32(v)
    }

    #[test]
    fn sink_drops_closing_point() {
        let mut sink = OutlineSink::default();
        sink.move_to(fixed(0), fixed(0));
        sink.line_to(fixed(10), fixed(0));
        sink.curve_to(fixed(10), fixed(5), fixed(5), fixed(10), fixed(0), fixed(0));
        sink.close();
        let outline = sink.finish();
        assert_eq!(outline.contours().len(), 1);
        let kinds: Vec<_> = outline.points().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [
                PointKind::OnCurve,
                PointKind::OnCurve,
                PointKind::OffCurveCubic,
                PointKind::OffCurveCubic
            ]
        );
        let mut commands: Vec<PenCommand> = Vec::new();
        outline.draw(PathStyle::FreeType, &mut commands).unwrap();
        assert_eq!(
            commands.last(),
            Some(&PenCommand::Close),
            "curve back to the start is still emitted"
        );
        assert!(matches!(
            commands[2],
            PenCommand::CurveTo { x, y, .. } if x == 0.0 && y == 0.0
        ));
    }

    #[test]
    fn sink_without_close() {
        let mut sink = OutlineSink::default();
        sink.move_to(fixed(0), fixed(0));
        sink.line_to(fixed(10), fixed(0));
        sink.move_to(fixed(20), fixed(0));
        sink.line_to(fixed(30), fixed(0));
        let outline = sink.finish();
        assert_eq!(outline.contours().len(), 2);
        assert_eq!(outline.num_points(), 4);
    }

    #[test]
    fn glyph_outlines_and_widths() {
        let data = fonts::cff_table();
        let cff = Cff::read(FontData::new(&data)).unwrap();
        let outlines = CffOutlines::new(cff.font(0).unwrap());
        assert_eq!(outlines.num_glyphs(), 500);

        let (notdef, width) = outlines.outline(GlyphId::new(0)).unwrap();
        assert_eq!(width, 600.0);
        let points: Vec<_> = notdef.points().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            points,
            [(50.0, 0.0), (450.0, 0.0), (450.0, 700.0), (50.0, 700.0)]
        );

        // even glyphs use the default width, odd glyphs carry a delta
        let (outline, width) = outlines.outline(GlyphId::new(42)).unwrap();
        assert_eq!(width, 500.0);
        assert_eq!(outline.contours().len(), 1);
        assert_eq!(outline.num_points(), 5);
        assert_eq!(
            outline.contours()[0].points()[2],
            OutlinePoint::on_curve(250.0, 742.0)
        );
        let (_, width) = outlines.outline(GlyphId::new(43)).unwrap();
        assert_eq!(width, 400.0);
    }

    #[test]
    fn glyph_out_of_range() {
        let data = fonts::cff_table();
        let cff = Cff::read(FontData::new(&data)).unwrap();
        let outlines = CffOutlines::new(cff.font(0).unwrap());
        assert!(matches!(
            outlines.outline(GlyphId::new(500)),
            Err(DrawError::GlyphNotFound(_))
        ));
    }
}
