//! Glyph outlines.
//!
//! An [`Outline`] is a list of closed contours in font units. Contours from
//! `glyf` keep the TrueType on/off-curve structure, where two consecutive
//! off-curve points imply an on-curve point at their midpoint. Contours from
//! CFF hold fully resolved cubic segments: each curve is two
//! [`PointKind::OffCurveCubic`] points followed by its end point.
//!
//! Outlines are replayed into any [`Pen`] with [`Outline::draw`].

pub(crate) mod cff;
pub(crate) mod glyf;
pub(crate) mod path;

pub use path::ToPathError;

use crate::{types::Pen, DrawError};

/// Maximum nesting depth of composite glyphs.
pub const GLYF_COMPOSITE_RECURSION_LIMIT: usize = 32;

/// Where to begin a TrueType contour whose first point is off-curve.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathStyle {
    /// Start at the last point if it is on-curve, or at the midpoint of the
    /// last and first points. This matches FreeType.
    #[default]
    FreeType,
    /// Start at the second point if it is on-curve, or at the midpoint of
    /// the first and second points. This matches HarfBuzz.
    HarfBuzz,
}

/// The role of a point in a contour.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointKind {
    OnCurve,
    /// Control point of a quadratic segment.
    OffCurveQuad,
    /// One of the two control points of a cubic segment.
    OffCurveCubic,
}

/// A point of a contour, in font units.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlinePoint {
    pub x: f32,
    pub y: f32,
    pub kind: PointKind,
}

impl OutlinePoint {
    pub const fn new(x: f32, y: f32, kind: PointKind) -> Self {
        Self { x, y, kind }
    }

    pub const fn on_curve(x: f32, y: f32) -> Self {
        Self::new(x, y, PointKind::OnCurve)
    }

    pub fn is_on_curve(&self) -> bool {
        self.kind == PointKind::OnCurve
    }
}

/// A closed sequence of points.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contour {
    points: Vec<OutlinePoint>,
}

impl Contour {
    pub fn new(points: Vec<OutlinePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[OutlinePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The contours of a glyph.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outline {
    contours: Vec<Contour>,
}

impl Outline {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// True for glyphs without contours, such as a space.
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Total number of points over all contours.
    pub fn num_points(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Iterates over every point of every contour.
    pub fn points(&self) -> impl Iterator<Item = &OutlinePoint> + '_ {
        self.contours.iter().flat_map(|contour| contour.points.iter())
    }

    /// Emits the outline as path commands.
    ///
    /// Each contour produces a `move_to`, its segments and a `close`.
    pub fn draw(&self, style: PathStyle, pen: &mut impl Pen) -> Result<(), DrawError> {
        for (contour_ix, contour) in self.contours.iter().enumerate() {
            path::contour_to_path(&contour.points, style, pen)
                .map_err(|e| e.in_contour(contour_ix))?;
        }
        Ok(())
    }
}
