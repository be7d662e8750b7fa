//! Contour to path conversion.

use super::{OutlinePoint, PathStyle, PointKind};
use crate::types::Pen;

/// Errors that can occur when converting a contour to a path.
///
/// Point indices are relative to the start of the contour.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ToPathError {
    /// A cubic control point appeared where a quadratic control point or an
    /// on-curve point was required.
    #[error("expected quadratic off-curve or on-curve point at index {point} of contour {contour}")]
    ExpectedQuadOrOnCurve { contour: usize, point: usize },
    /// A cubic control point was not followed by a second one.
    #[error("expected cubic off-curve point at index {point} of contour {contour}")]
    ExpectedCubic { contour: usize, point: usize },
}

impl ToPathError {
    pub(crate) fn in_contour(self, contour: usize) -> Self {
        match self {
            Self::ExpectedQuadOrOnCurve { point, .. } => {
                Self::ExpectedQuadOrOnCurve { contour, point }
            }
            Self::ExpectedCubic { point, .. } => Self::ExpectedCubic { contour, point },
        }
    }
}

fn midpoint(a: OutlinePoint, b: OutlinePoint) -> OutlinePoint {
    OutlinePoint::on_curve((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Emits a single closed contour to `pen`.
///
/// This is roughly equivalent to [`FT_Outline_Decompose`](https://freetype.org/freetype2/docs/reference/ft2-outline_processing.html#ft_outline_decompose)
/// for one contour. Quadratic control points may be chained, with an implied
/// on-curve point between each pair. Cubic control points must come in pairs.
pub(crate) fn contour_to_path(
    points: &[OutlinePoint],
    style: PathStyle,
    pen: &mut impl Pen,
) -> Result<(), ToPathError> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Ok(());
    };
    if first.kind == PointKind::OffCurveCubic {
        return Err(ToPathError::ExpectedQuadOrOnCurve {
            contour: 0,
            point: 0,
        });
    }
    // the start point, the range emitted after it and the points emitted
    // last to wrap around
    let (start, body, trailing) = if first.kind == PointKind::OffCurveQuad {
        match style {
            PathStyle::FreeType => {
                if last.is_on_curve() {
                    (last, 0..points.len() - 1, 0..0)
                } else {
                    (midpoint(last, first), 0..points.len(), 0..0)
                }
            }
            PathStyle::HarfBuzz => {
                let Some(&second) = points.get(1) else {
                    return Ok(());
                };
                if second.is_on_curve() {
                    (second, 2..points.len(), 0..2)
                } else {
                    (midpoint(first, second), 1..points.len(), 0..1)
                }
            }
        }
    } else {
        (first, 1..points.len(), 0..0)
    };
    pen.move_to(start.x, start.y);
    let mut state = PendingState::Empty;
    for ix in body.chain(trailing) {
        state.emit(ix, points[ix], pen)?;
    }
    state.finish(start, pen)
}

#[derive(Copy, Clone)]
enum PendingState {
    Empty,
    PendingQuad(OutlinePoint),
    PendingCubic(OutlinePoint),
    TwoPendingCubics(OutlinePoint, OutlinePoint),
}

impl PendingState {
    fn emit(
        &mut self,
        ix: usize,
        point: OutlinePoint,
        pen: &mut impl Pen,
    ) -> Result<(), ToPathError> {
        *self = match (*self, point.kind) {
            (Self::Empty, PointKind::OnCurve) => {
                pen.line_to(point.x, point.y);
                Self::Empty
            }
            (Self::Empty, PointKind::OffCurveQuad) => Self::PendingQuad(point),
            (Self::Empty, PointKind::OffCurveCubic) => Self::PendingCubic(point),
            (Self::PendingQuad(c0), PointKind::OnCurve) => {
                pen.quad_to(c0.x, c0.y, point.x, point.y);
                Self::Empty
            }
            (Self::PendingQuad(c0), PointKind::OffCurveQuad) => {
                let p = midpoint(c0, point);
                pen.quad_to(c0.x, c0.y, p.x, p.y);
                Self::PendingQuad(point)
            }
            (Self::PendingQuad(_), PointKind::OffCurveCubic) => {
                return Err(ToPathError::ExpectedQuadOrOnCurve {
                    contour: 0,
                    point: ix,
                })
            }
            (Self::PendingCubic(c0), PointKind::OffCurveCubic) => Self::TwoPendingCubics(c0, point),
            (Self::PendingCubic(_), _) | (Self::TwoPendingCubics(..), PointKind::OffCurveQuad) => {
                return Err(ToPathError::ExpectedCubic {
                    contour: 0,
                    point: ix,
                })
            }
            (Self::TwoPendingCubics(c0, c1), PointKind::OnCurve) => {
                pen.curve_to(c0.x, c0.y, c1.x, c1.y, point.x, point.y);
                Self::Empty
            }
            (Self::TwoPendingCubics(c0, c1), PointKind::OffCurveCubic) => {
                let p = midpoint(c1, point);
                pen.curve_to(c0.x, c0.y, c1.x, c1.y, p.x, p.y);
                Self::PendingCubic(point)
            }
        };
        Ok(())
    }

    fn finish(mut self, start: OutlinePoint, pen: &mut impl Pen) -> Result<(), ToPathError> {
        if !matches!(self, Self::Empty) {
            // end on the start point
            self.emit(0, OutlinePoint::on_curve(start.x, start.y), pen)?;
        }
        pen.close();
        Ok(())
    }
}
