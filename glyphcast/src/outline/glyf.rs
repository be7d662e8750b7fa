//! Outlines from the `glyf` and `loca` tables.

use glyphcast_read::tables::{
    glyf::{Anchor, CompositeGlyph, CompositeGlyphFlags, Glyf, Glyph, SimpleGlyph, Transform},
    loca::Loca,
};

use super::{Contour, Outline, OutlinePoint, PointKind, GLYF_COMPOSITE_RECURSION_LIMIT};
use crate::{
    decycler::{Decycler, DecyclerError},
    types::GlyphId,
    DrawError,
};

type GlyfDecycler = Decycler<GlyphId, GLYF_COMPOSITE_RECURSION_LIMIT>;

/// Builds outlines for TrueType glyphs.
#[derive(Clone)]
pub(crate) struct GlyfOutlines<'a> {
    loca: Loca<'a>,
    glyf: Glyf<'a>,
    num_glyphs: u32,
}

/// Points of the glyph being assembled, with contours stored as end point
/// indices as in `glyf`.
#[derive(Default)]
struct Scratch {
    points: Vec<OutlinePoint>,
    contour_ends: Vec<usize>,
}

impl Scratch {
    fn into_outline(self) -> Outline {
        let mut start = 0;
        let contours = self
            .contour_ends
            .iter()
            .map(|&end| {
                let contour = Contour::new(self.points[start..=end].to_vec());
                start = end + 1;
                contour
            })
            .collect();
        Outline::new(contours)
    }
}

impl<'a> GlyfOutlines<'a> {
    pub fn new(loca: Loca<'a>, glyf: Glyf<'a>, num_glyphs: u32) -> Self {
        Self {
            loca,
            glyf,
            num_glyphs,
        }
    }

    /// Loads the outline of `gid`, resolving composite components.
    pub fn outline(&self, gid: GlyphId) -> Result<Outline, DrawError> {
        let mut scratch = Scratch::default();
        self.load(gid, &mut scratch, &mut GlyfDecycler::new())?;
        Ok(scratch.into_outline())
    }

    fn load(
        &self,
        gid: GlyphId,
        scratch: &mut Scratch,
        decycler: &mut GlyfDecycler,
    ) -> Result<(), DrawError> {
        let mut decycler = decycler.enter(gid).map_err(|e| match e {
            DecyclerError::CycleDetected => DrawError::CompositeCycle(gid),
            DecyclerError::DepthLimitExceeded => DrawError::RecursionLimitExceeded(gid),
        })?;
        if gid.to_u32() >= self.num_glyphs {
            return Err(DrawError::GlyphNotFound(gid));
        }
        match self.loca.get_glyf(gid, &self.glyf)? {
            None => Ok(()),
            Some(Glyph::Simple(glyph)) => load_simple(&glyph, scratch),
            Some(Glyph::Composite(glyph)) => {
                self.load_composite(gid, &glyph, scratch, &mut decycler)
            }
        }
    }

    fn load_composite(
        &self,
        gid: GlyphId,
        glyph: &CompositeGlyph,
        scratch: &mut Scratch,
        decycler: &mut GlyfDecycler,
    ) -> Result<(), DrawError> {
        // anchor base points are numbered from the first point of this glyph
        let glyph_start = scratch.points.len();
        for component in glyph.components() {
            let component = component?;
            let component_start = scratch.points.len();
            self.load(component.glyph.into(), scratch, decycler)?;
            let transform = component.transform;
            let has_transform = transform != Transform::default();
            if has_transform {
                for point in &mut scratch.points[component_start..] {
                    (point.x, point.y) = apply(&transform, point.x, point.y);
                }
            }
            let (dx, dy) = match component.anchor {
                Anchor::Offset { x, y } => {
                    let (x, y) = (x as f32, y as f32);
                    let scaled = component
                        .flags
                        .contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET)
                        && !component
                            .flags
                            .contains(CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET);
                    if scaled && has_transform {
                        apply(&transform, x, y)
                    } else {
                        (x, y)
                    }
                }
                Anchor::Point { base, component } => {
                    let base_point = scratch
                        .points
                        .get(glyph_start + base as usize)
                        .filter(|_| glyph_start + (base as usize) < component_start)
                        .ok_or(DrawError::InvalidAnchorPoint(gid, base))?;
                    let component_point = scratch
                        .points
                        .get(component_start + component as usize)
                        .ok_or(DrawError::InvalidAnchorPoint(gid, component))?;
                    (
                        base_point.x - component_point.x,
                        base_point.y - component_point.y,
                    )
                }
            };
            if dx != 0.0 || dy != 0.0 {
                for point in &mut scratch.points[component_start..] {
                    point.x += dx;
                    point.y += dy;
                }
            }
        }
        Ok(())
    }
}

fn load_simple(glyph: &SimpleGlyph, scratch: &mut Scratch) -> Result<(), DrawError> {
    let base = scratch.points.len();
    scratch
        .points
        .extend(glyph.points()?.into_iter().map(|point| {
            let kind = if point.on_curve {
                PointKind::OnCurve
            } else {
                PointKind::OffCurveQuad
            };
            OutlinePoint::new(point.x as f32, point.y as f32, kind)
        }));
    scratch.contour_ends.extend(
        glyph
            .end_pts_of_contours()
            .iter()
            .map(|end| base + end.get() as usize),
    );
    Ok(())
}

fn apply(transform: &Transform, x: f32, y: f32) -> (f32, f32) {
    let [xx, yx, xy, yy] =
        [transform.xx, transform.yx, transform.xy, transform.yy].map(|v| v.to_f32());
    (xx * x + xy * y, yx * x + yy * y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_read::{FontRef, TableProvider};
    use glyphcast_test_data::fonts;

    fn outlines(data: &[u8]) -> GlyfOutlines<'_> {
        let font = FontRef::new(data).unwrap();
        GlyfOutlines::new(
            font.loca(None).unwrap(),
            font.glyf().unwrap(),
            font.maxp().unwrap().num_glyphs() as u32,
        )
    }

    fn coords(contour: &Contour) -> Vec<(f32, f32, bool)> {
        contour
            .points()
            .iter()
            .map(|p| (p.x, p.y, p.is_on_curve()))
            .collect()
    }

    #[test]
    fn simple_glyph() {
        let data = fonts::glyf_font();
        let outline = outlines(&data).outline(GlyphId::new(2)).unwrap();
        assert_eq!(outline.contours().len(), 2);
        assert_eq!(
            coords(&outline.contours()[0]),
            vec![
                (100.0, 0.0, true),
                (300.0, 700.0, false),
                (500.0, 0.0, true),
                (300.0, 100.0, true)
            ]
        );
        assert_eq!(
            coords(&outline.contours()[1]),
            vec![(250.0, 200.0, true), (260.0, 200.0, true), (270.0, 200.0, true)]
        );
    }

    #[test]
    fn empty_glyph() {
        let data = fonts::glyf_font();
        let outline = outlines(&data).outline(GlyphId::new(1)).unwrap();
        assert!(outline.is_empty());
    }

    #[test]
    fn composite_offsets_and_scale() {
        let data = fonts::glyf_font();
        let outline = outlines(&data).outline(GlyphId::new(3)).unwrap();
        assert_eq!(outline.contours().len(), 3);
        assert_eq!(
            coords(&outline.contours()[0])[..2],
            [(110.0, 20.0, true), (310.0, 720.0, false)]
        );
        // the .notdef rectangle at half size, offset without scaling
        assert_eq!(
            coords(&outline.contours()[2]),
            vec![
                (-75.0, 300.0, true),
                (-75.0, 650.0, true),
                (125.0, 650.0, true),
                (125.0, 300.0, true)
            ]
        );
    }

    #[test]
    fn composite_cycle() {
        let data = fonts::glyf_font();
        let outlines = outlines(&data);
        assert!(matches!(
            outlines.outline(GlyphId::new(4)),
            Err(DrawError::CompositeCycle(gid)) if gid == GlyphId::new(4)
        ));
        assert!(matches!(
            outlines.outline(GlyphId::new(5)),
            Err(DrawError::CompositeCycle(gid)) if gid == GlyphId::new(5)
        ));
    }

    #[test]
    fn out_of_range_glyph() {
        let data = fonts::glyf_font();
        assert!(matches!(
            outlines(&data).outline(GlyphId::new(6)),
            Err(DrawError::GlyphNotFound(_))
        ));
    }

    #[test]
    fn truncated_glyph_data() {
        let data = fonts::truncated_glyf();
        let outlines = outlines(&data);
        assert_eq!(outlines.outline(GlyphId::new(0)).unwrap().num_points(), 4);
        assert!(matches!(
            outlines.outline(GlyphId::new(2)),
            Err(DrawError::Read(_))
        ));
        assert!(matches!(
            outlines.outline(GlyphId::new(3)),
            Err(DrawError::Read(_))
        ));
    }

    #[test]
    fn transform_application() {
        let transform = Transform {
            xx: glyphcast_read::types::F2Dot14::from_f32(0.0),
            yx: glyphcast_read::types::F2Dot14::from_f32(1.0),
            xy: glyphcast_read::types::F2Dot14::from_f32(-1.0),
            yy: glyphcast_read::types::F2Dot14::from_f32(0.0),
        };
        // a quarter turn
        assert_eq!(apply(&transform, 10.0, 0.0), (0.0, 10.0));
        assert_eq!(apply(&transform, 0.0, 10.0), (-10.0, 0.0));
    }
}
