//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use types::{BigEndian, F2Dot14, FixedSize, GlyphId16, Tag};

use crate::{Cursor, FontData, FontRead, ReadError, TopLevelTable};

/// `glyf`
pub const TAG: Tag = Tag::new(b"glyf");

/// The [glyf] table: glyph outlines addressed through `loca`.
///
/// [glyf]: https://docs.microsoft.com/en-us/typography/opentype/spec/glyf
#[derive(Clone, Copy)]
pub struct Glyf<'a> {
    data: FontData<'a>,
}

impl<'a> Glyf<'a> {
    /// The data that `loca` offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }
}

impl TopLevelTable for Glyf<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Glyf<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(Glyf { data })
    }
}

impl std::fmt::Debug for Glyf<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glyf").field("len", &self.data.len()).finish()
    }
}

flags! {
    /// Flags used in [SimpleGlyph]
    SimpleGlyphFlags(u8) {
        /// Bit 0: If set, the point is on the curve; otherwise, it is off
        /// the curve.
        const ON_CURVE_POINT = 0x01;
        /// Bit 1: If set, the corresponding x-coordinate is 1 byte long,
        /// and the sign is given by the next flag.
        const X_SHORT_VECTOR = 0x02;
        /// Bit 2: If set, the corresponding y-coordinate is 1 byte long,
        /// and the sign is given by the next flag.
        const Y_SHORT_VECTOR = 0x04;
        /// Bit 3: If set, the next byte specifies the number of additional
        /// times this flag byte is to be repeated.
        const REPEAT_FLAG = 0x08;
        /// Bit 4: With X_SHORT_VECTOR, the sign of the x delta; without
        /// it, the x coordinate repeats the previous one.
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        /// Bit 5: With Y_SHORT_VECTOR, the sign of the y delta; without
        /// it, the y coordinate repeats the previous one.
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        /// Bit 6: If set, contours in the glyph description may overlap.
        const OVERLAP_SIMPLE = 0x40;
    }
}

flags! {
    /// Flags used in [CompositeGlyph]
    CompositeGlyphFlags(u16) {
        /// Bit 0: If this is set, the arguments are 16-bit (uint16 or int16);
        /// otherwise, they are bytes (uint8 or int8).
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// Bit 1: If this is set, the arguments are signed xy values;
        /// otherwise, they are unsigned point numbers.
        const ARGS_ARE_XY_VALUES = 0x0002;
        /// Bit 2: Round the xy offset to the grid.
        const ROUND_XY_TO_GRID = 0x0004;
        /// Bit 3: The component has a simple scale.
        const WE_HAVE_A_SCALE = 0x0008;
        /// Bit 5: Indicates at least one more glyph after this one.
        const MORE_COMPONENTS = 0x0020;
        /// Bit 6: The x direction will use a different scale from the y
        /// direction.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// Bit 7: There is a 2 by 2 transformation that will be used to
        /// scale the component.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Bit 8: Following the last component are instructions for the
        /// composite character.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        /// Bit 9: Use the metrics of this component for the composite.
        const USE_MY_METRICS = 0x0200;
        /// Bit 10: The components of the compound glyph overlap.
        const OVERLAP_COMPOUND = 0x0400;
        /// Bit 11: The composite is designed to have the component offset
        /// scaled.
        const SCALED_COMPONENT_OFFSET = 0x0800;
        /// Bit 12: The composite is designed not to have the component
        /// offset scaled.
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

/// The header shared by simple and composite glyphs.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct GlyphHeader {
    pub number_of_contours: BigEndian<i16>,
    pub x_min: BigEndian<i16>,
    pub y_min: BigEndian<i16>,
    pub x_max: BigEndian<i16>,
    pub y_max: BigEndian<i16>,
}

impl FixedSize for GlyphHeader {
    const RAW_BYTE_LEN: usize = 5 * i16::RAW_BYTE_LEN;
}

/// A glyph in the `glyf` table.
#[derive(Clone, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

macro_rules! field_getter {
    ($field:ident, $ty:ty) => {
        pub fn $field(&self) -> $ty {
            self.header().$field.get()
        }
    };
}

impl<'a> Glyph<'a> {
    fn header(&self) -> &'a GlyphHeader {
        match self {
            Self::Simple(glyph) => glyph.header,
            Self::Composite(glyph) => glyph.header,
        }
    }

    field_getter!(number_of_contours, i16);
    field_getter!(x_min, i16);
    field_getter!(x_max, i16);
    field_getter!(y_min, i16);
    field_getter!(y_max, i16);
}

impl<'a> FontRead<'a> for Glyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let header: &GlyphHeader = data.read_ref_at(0)?;
        let rest = data
            .split_off(GlyphHeader::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        let number_of_contours = header.number_of_contours.get();
        if number_of_contours >= 0 {
            let mut cursor = rest.cursor();
            let end_pts_of_contours = cursor.read_array(number_of_contours as usize)?;
            let instruction_length: u16 = cursor.read()?;
            let instructions = cursor.read_array(instruction_length as usize)?;
            let glyph_data = cursor.remaining().ok_or(ReadError::OutOfBounds)?;
            Ok(Glyph::Simple(SimpleGlyph {
                header,
                end_pts_of_contours,
                instructions,
                glyph_data: glyph_data.as_bytes(),
            }))
        } else if number_of_contours == -1 {
            Ok(Glyph::Composite(CompositeGlyph {
                header,
                component_data: rest.as_bytes(),
            }))
        } else {
            Err(ReadError::InvalidFormat(number_of_contours as i64))
        }
    }
}

/// A glyph made of contours of quadratic segments.
#[derive(Clone)]
pub struct SimpleGlyph<'a> {
    header: &'a GlyphHeader,
    end_pts_of_contours: &'a [BigEndian<u16>],
    instructions: &'a [u8],
    glyph_data: &'a [u8],
}

/// Point with an associated on-curve flag in a simple glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurvePoint {
    /// X coordinate.
    pub x: i16,
    /// Y coordinate.
    pub y: i16,
    /// True if this is an on-curve point.
    pub on_curve: bool,
}

impl CurvePoint {
    /// Construct a new `CurvePoint`
    pub fn new(x: i16, y: i16, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    /// Convenience method to construct an on-curve point
    pub fn on_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, true)
    }

    /// Convenience method to construct an off-curve point
    pub fn off_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, false)
    }
}

impl<'a> SimpleGlyph<'a> {
    pub fn header(&self) -> &'a GlyphHeader {
        self.header
    }

    /// Array of point indices for the last point of each contour, in
    /// increasing numeric order.
    pub fn end_pts_of_contours(&self) -> &'a [BigEndian<u16>] {
        self.end_pts_of_contours
    }

    /// The TrueType hinting program, which is never executed here.
    pub fn instructions(&self) -> &'a [u8] {
        self.instructions
    }

    /// The packed flags and coordinates.
    pub fn glyph_data(&self) -> &'a [u8] {
        self.glyph_data
    }

    /// Returns the total number of points.
    pub fn num_points(&self) -> usize {
        self.end_pts_of_contours
            .last()
            .map(|last| last.get() as usize + 1)
            .unwrap_or(0)
    }

    /// Decode the flags and delta-encoded coordinates into points.
    ///
    /// Fails if the end points decrease or the data ends before every point
    /// is decoded.
    pub fn points(&self) -> Result<Vec<CurvePoint>, ReadError> {
        let n_points = self.num_points();
        let mut prev_end = None;
        for end in self.end_pts_of_contours {
            let end = end.get();
            if prev_end.is_some_and(|prev| end <= prev) {
                return Err(ReadError::MalformedData("glyf contour end points decrease"));
            }
            prev_end = Some(end);
        }
        let mut cursor = FontData::new(self.glyph_data).cursor();
        let mut flags = Vec::with_capacity(n_points);
        while flags.len() < n_points {
            let flag: SimpleGlyphFlags = cursor.read()?;
            let repeats = if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                cursor.read::<u8>()? as usize + 1
            } else {
                1
            };
            if flags.len() + repeats > n_points {
                return Err(ReadError::MalformedData("repeat count too large in glyf"));
            }
            flags.extend(std::iter::repeat_n(flag, repeats));
        }
        let xs = read_deltas(
            &mut cursor,
            &flags,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
        )?;
        let ys = read_deltas(
            &mut cursor,
            &flags,
            SimpleGlyphFlags::Y_SHORT_VECTOR,
            SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
        )?;
        Ok(flags
            .iter()
            .zip(xs.into_iter().zip(ys))
            .map(|(flag, (x, y))| {
                CurvePoint::new(x, y, flag.contains(SimpleGlyphFlags::ON_CURVE_POINT))
            })
            .collect())
    }
}

fn read_deltas(
    cursor: &mut Cursor,
    flags: &[SimpleGlyphFlags],
    short: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<Vec<i16>, ReadError> {
    let mut value = 0i16;
    flags
        .iter()
        .map(|flag| {
            let delta = match (flag.contains(short), flag.contains(same_or_positive)) {
                (true, true) => cursor.read::<u8>()? as i16,
                (true, false) => -(cursor.read::<u8>()? as i16),
                (false, false) => cursor.read::<i16>()?,
                (false, true) => 0,
            };
            value = value.wrapping_add(delta);
            Ok(value)
        })
        .collect()
}

impl std::fmt::Debug for SimpleGlyph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleGlyph")
            .field("header", self.header)
            .field("end_pts_of_contours", &self.end_pts_of_contours)
            .field("instructions_len", &self.instructions.len())
            .finish()
    }
}

/// A glyph assembled from transformed references to other glyphs.
#[derive(Clone)]
pub struct CompositeGlyph<'a> {
    header: &'a GlyphHeader,
    component_data: &'a [u8],
}

/// Transform for a composite component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

/// Anchor position for a composite component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The component is moved by this offset.
    Offset { x: i16, y: i16 },
    /// Point `component` of the component is aligned with point `base` of
    /// the glyph assembled so far.
    Point { base: u16, component: u16 },
}

/// A reference to another glyph. Part of [CompositeGlyph].
#[derive(Clone, Debug)]
pub struct Component {
    /// Component flags.
    pub flags: CompositeGlyphFlags,
    /// Glyph identifier.
    pub glyph: GlyphId16,
    /// Anchor for component placement.
    pub anchor: Anchor,
    /// Component transformation matrix.
    pub transform: Transform,
}

impl<'a> CompositeGlyph<'a> {
    pub fn header(&self) -> &'a GlyphHeader {
        self.header
    }

    /// The raw component records, followed by any instructions.
    pub fn component_data(&self) -> &'a [u8] {
        self.component_data
    }

    /// Returns an iterator over the components of the composite glyph.
    ///
    /// A truncated record yields an error and ends the iteration.
    pub fn components(&self) -> impl Iterator<Item = Result<Component, ReadError>> + 'a + Clone {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::empty(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
    }

    /// Returns the TrueType interpreter instructions.
    pub fn instructions(&self) -> Option<&'a [u8]> {
        let mut iter = ComponentIter {
            cur_flags: CompositeGlyphFlags::empty(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        };
        for component in iter.by_ref() {
            component.ok()?;
        }
        iter.instructions()
    }
}

impl std::fmt::Debug for CompositeGlyph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeGlyph")
            .field("header", self.header)
            .field("components", &self.components().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone)]
struct ComponentIter<'a> {
    cur_flags: CompositeGlyphFlags,
    done: bool,
    cursor: Cursor<'a>,
}

impl<'a> ComponentIter<'a> {
    fn instructions(&mut self) -> Option<&'a [u8]> {
        if self
            .cur_flags
            .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
        {
            let len = self.cursor.read::<u16>().ok()? as usize;
            self.cursor.read_array(len).ok()
        } else {
            None
        }
    }

    fn read_component(&mut self) -> Result<Component, ReadError> {
        let flags: CompositeGlyphFlags = self.cursor.read()?;
        self.cur_flags = flags;
        let glyph = self.cursor.read::<GlyphId16>()?;
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let anchor = match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: self.cursor.read()?,
                y: self.cursor.read()?,
            },
            (true, false) => Anchor::Offset {
                x: self.cursor.read::<i8>()? as _,
                y: self.cursor.read::<i8>()? as _,
            },
            (false, true) => Anchor::Point {
                base: self.cursor.read()?,
                component: self.cursor.read()?,
            },
            (false, false) => Anchor::Point {
                base: self.cursor.read::<u8>()? as _,
                component: self.cursor.read::<u8>()? as _,
            },
        };
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.cursor.read()?;
            transform.yx = self.cursor.read()?;
            transform.xy = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        }
        Ok(Component {
            flags,
            glyph,
            anchor,
            transform,
        })
    }
}

impl Iterator for ComponentIter<'_> {
    type Item = Result<Component, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let component = self.read_component();
        self.done = match &component {
            Ok(component) => !component
                .flags
                .contains(CompositeGlyphFlags::MORE_COMPONENTS),
            Err(_) => true,
        };
        Some(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::fonts;

    fn glyph(gid: usize) -> Vec<u8> {
        fonts::glyf_glyphs()[gid].clone()
    }

    #[test]
    fn simple_glyph() {
        let data = glyph(2);
        let Glyph::Simple(simple) = Glyph::read(FontData::new(&data)).unwrap() else {
            panic!("expected simple glyph");
        };
        assert_eq!(simple.header().number_of_contours.get(), 2);
        assert_eq!(
            simple
                .end_pts_of_contours()
                .iter()
                .map(|x| x.get())
                .collect::<Vec<_>>(),
            &[3, 6]
        );
        assert_eq!(simple.instructions(), &[0xB0, 0x01]);
        assert_eq!(
            simple
                .points()
                .unwrap()
                .iter()
                .map(|pt| (pt.x, pt.y, pt.on_curve))
                .collect::<Vec<_>>(),
            &[
                (100, 0, true),
                (300, 700, false),
                (500, 0, true),
                (300, 100, true),
                (250, 200, true),
                (260, 200, true),
                (270, 200, true),
            ]
        );
    }

    #[test]
    fn truncated_coordinates() {
        let data = glyph(0);
        // drop the pad byte and the last y delta
        let glyph = Glyph::read(FontData::new(&data[..data.len() - 3])).unwrap();
        let Glyph::Simple(simple) = glyph else {
            panic!("expected simple glyph");
        };
        assert!(matches!(simple.points(), Err(ReadError::OutOfBounds)));
    }

    #[test]
    fn composite_glyph() {
        let data = glyph(3);
        let glyph = Glyph::read(FontData::new(&data)).unwrap();
        assert_eq!(glyph.number_of_contours(), -1);
        assert_eq!(glyph.x_min(), -100);
        let Glyph::Composite(composite) = glyph else {
            panic!("expected composite glyph");
        };
        let components: Vec<_> = composite.components().map(Result::unwrap).collect();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].glyph, GlyphId16::new(2));
        assert_eq!(components[0].anchor, Anchor::Offset { x: 10, y: 20 });
        assert_eq!(components[0].transform, Transform::default());
        assert_eq!(components[1].glyph, GlyphId16::new(0));
        assert_eq!(components[1].anchor, Anchor::Offset { x: -100, y: 300 });
        assert_eq!(components[1].transform.xx, F2Dot14::from_f32(0.5));
        assert_eq!(components[1].transform.yy, F2Dot14::from_f32(0.5));
        assert!(composite.instructions().is_none());
    }

    #[test]
    fn truncated_component() {
        let data = glyph(3);
        let glyph = Glyph::read(FontData::new(&data[..data.len() - 1])).unwrap();
        let Glyph::Composite(composite) = glyph else {
            panic!("expected composite glyph");
        };
        let components: Vec<_> = composite.components().collect();
        assert_eq!(components.len(), 2);
        assert!(components[1].is_err());
    }

    #[test]
    fn unknown_contour_count() {
        let data = [0xFFu8, 0xFE, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            Glyph::read(FontData::new(&data)),
            Err(ReadError::InvalidFormat(-2))
        ));
    }

    #[test]
    fn flags_debug() {
        let flags = CompositeGlyphFlags::ARGS_ARE_XY_VALUES | CompositeGlyphFlags::MORE_COMPONENTS;
        assert_eq!(format!("{flags:?}"), "ARGS_ARE_XY_VALUES | MORE_COMPONENTS");
    }
}
