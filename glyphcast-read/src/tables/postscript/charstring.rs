//! Parsing for PostScript Type 2 charstrings.

use super::{Error, Index, Stack};
use crate::{
    types::{Fixed, Pen},
    Cursor, FontData,
};

/// Maximum nesting depth for subroutine calls.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const NESTING_DEPTH_LIMIT: u32 = 10;

/// Trait for processing commands resulting from charstring evaluation.
///
/// During processing, the path construction operators (see "4.1 Path
/// Construction Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=15>)
/// are simplified into the basic move, line, curve and close commands.
///
/// This also has optional callbacks for processing hint operators. See "4.3
/// Hint Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=21>
/// for more detail.
#[allow(unused_variables)]
pub trait CommandSink {
    // Path construction operators.
    fn move_to(&mut self, x: Fixed, y: Fixed);
    fn line_to(&mut self, x: Fixed, y: Fixed);
    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed);
    fn close(&mut self);
    // Hint operators.
    /// Horizontal stem hint at `y` with height `dy`.
    fn hstem(&mut self, y: Fixed, dy: Fixed) {}
    /// Vertical stem hint at `x` with width `dx`.
    fn vstem(&mut self, x: Fixed, dx: Fixed) {}
    /// Bitmask defining the hints that should be made active for the
    /// commands that follow.
    fn hint_mask(&mut self, mask: &[u8]) {}
    /// Bitmask defining the counter hints that should be made active for the
    /// commands that follow.
    fn counter_mask(&mut self, mask: &[u8]) {}
    /// The width operand that may precede the first stack clearing
    /// operator.
    ///
    /// This is a delta from the `nominalWidthX` of the Private DICT. It is
    /// reported at most once, and not at all for glyphs that use
    /// `defaultWidthX`.
    fn width(&mut self, width: Fixed) {}
}

/// Command sink that sends the results of charstring evaluation to a [Pen].
pub struct PenSink<'a, P>(&'a mut P);

impl<'a, P> PenSink<'a, P> {
    pub fn new(pen: &'a mut P) -> Self {
        Self(pen)
    }
}

impl<P> CommandSink for PenSink<'_, P>
where
    P: Pen,
{
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.0.move_to(x.to_f32(), y.to_f32());
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.0.line_to(x.to_f32(), y.to_f32());
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.0.curve_to(
            cx0.to_f32(),
            cy0.to_f32(),
            cx1.to_f32(),
            cy1.to_f32(),
            x.to_f32(),
            y.to_f32(),
        );
    }

    fn close(&mut self) {
        self.0.close();
    }
}

/// Evaluates the given charstring and emits the resulting commands to the
/// specified sink.
///
/// If the Private DICT associated with this charstring contains local
/// subroutines, then the `subrs` index must be provided, otherwise
/// `Error::MissingSubroutines` will be returned if a callsubr operator
/// is present.
///
/// The charstring must be terminated by `endchar` (or a `return` at the top
/// level), either directly or from within a subroutine.
pub fn evaluate(
    charstring_data: &[u8],
    global_subrs: Index,
    subrs: Option<Index>,
    sink: &mut impl CommandSink,
) -> Result<(), Error> {
    let mut evaluator = Evaluator::new(global_subrs, subrs, sink);
    match evaluator.evaluate(charstring_data, 0)? {
        Flow::Exhausted => Err(Error::MissingEndChar),
        Flow::Return | Flow::EndChar => Ok(()),
    }
}

/// How evaluation of a charstring or subroutine came to a stop.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Flow {
    /// Ran out of bytes.
    Exhausted,
    /// Hit a `return` operator.
    Return,
    /// Hit an `endchar` operator; the glyph is complete.
    EndChar,
}

/// Transient state for evaluating a charstring and handling recursive
/// subroutine calls.
struct Evaluator<'a, S> {
    global_subrs: Index<'a>,
    subrs: Option<Index<'a>>,
    sink: &'a mut S,
    is_open: bool,
    have_read_width: bool,
    stem_count: usize,
    x: Fixed,
    y: Fixed,
    stack: Stack,
}

impl<'a, S> Evaluator<'a, S>
where
    S: CommandSink,
{
    fn new(global_subrs: Index<'a>, subrs: Option<Index<'a>>, sink: &'a mut S) -> Self {
        Self {
            global_subrs,
            subrs,
            sink,
            is_open: false,
            have_read_width: false,
            stem_count: 0,
            stack: Stack::new(),
            x: Fixed::ZERO,
            y: Fixed::ZERO,
        }
    }

    fn evaluate(&mut self, charstring_data: &[u8], nesting_depth: u32) -> Result<Flow, Error> {
        if nesting_depth > NESTING_DEPTH_LIMIT {
            return Err(Error::CharstringNestingDepthLimitExceeded);
        }
        let mut cursor = FontData::new(charstring_data).cursor();
        while cursor.remaining_bytes() != 0 {
            let b0 = cursor.read::<u8>()?;
            match b0 {
                // See "3.2 Charstring Number Encoding" <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=12>
                //
                // Push an integer to the stack
                28 | 32..=254 => {
                    self.stack
                        .push_i32(super::dict::parse_int(&mut cursor, b0)?)?;
                }
                // Push a fixed point value to the stack
                255 => {
                    let num = Fixed::from_bits(cursor.read::<i32>()?);
                    self.stack.push(num)?;
                }
                _ => {
                    let operator = Operator::read(&mut cursor, b0)?;
                    match self.evaluate_operator(operator, &mut cursor, nesting_depth)? {
                        Flow::Exhausted => {}
                        flow => return Ok(flow),
                    }
                }
            }
        }
        Ok(Flow::Exhausted)
    }

    /// Evaluates a single charstring operator.
    ///
    /// Returns `Flow::Exhausted` if evaluation should continue with the next
    /// byte of the current charstring.
    fn evaluate_operator(
        &mut self,
        operator: Operator,
        cursor: &mut Cursor,
        nesting_depth: u32,
    ) -> Result<Flow, Error> {
        use Operator::*;
        match operator {
            // The following "flex" operators are intended to emit
            // either two curves or a straight line depending on
            // a "flex depth" parameter and the distance from the
            // joining point to the chord connecting the two
            // end points. In practice, we just emit the two curves,
            // following FreeType:
            // <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L335>
            //
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            Flex => {
                let args = self.stack.get_array::<12>(0)?;
                self.ensure_open();
                let dx1 = self.x + args[0];
                let dy1 = self.y + args[1];
                let dx2 = dx1 + args[2];
                let dy2 = dy1 + args[3];
                let dx3 = dx2 + args[4];
                let dy3 = dy2 + args[5];
                let dx4 = dx3 + args[6];
                let dy4 = dy3 + args[7];
                let dx5 = dx4 + args[8];
                let dy5 = dy4 + args[9];
                self.x = dx5 + args[10];
                self.y = dy5 + args[11];
                self.sink.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
                self.sink.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);
                self.stack.clear();
            }
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=19>
            HFlex => {
                let args = self.stack.get_array::<7>(0)?;
                self.ensure_open();
                let dx1 = self.x + args[0];
                let dy1 = self.y;
                let dx2 = dx1 + args[1];
                let dy2 = dy1 + args[2];
                let dx3 = dx2 + args[3];
                let dy3 = dy2;
                let dx4 = dx3 + args[4];
                let dy4 = dy2;
                let dx5 = dx4 + args[5];
                let dy5 = self.y;
                self.x = dx5 + args[6];
                self.sink.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
                self.sink.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);
                self.stack.clear();
            }
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=19>
            HFlex1 => {
                let args = self.stack.get_array::<9>(0)?;
                self.ensure_open();
                let dx1 = self.x + args[0];
                let dy1 = self.y + args[1];
                let dx2 = dx1 + args[2];
                let dy2 = dy1 + args[3];
                let dx3 = dx2 + args[4];
                let dy3 = dy2;
                let dx4 = dx3 + args[5];
                let dy4 = dy2;
                let dx5 = dx4 + args[6];
                let dy5 = dy4 + args[7];
                self.x = dx5 + args[8];
                self.sink.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
                self.sink.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);
                self.stack.clear();
            }
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=20>
            Flex1 => {
                let args = self.stack.get_array::<11>(0)?;
                self.ensure_open();
                let dx1 = self.x + args[0];
                let dy1 = self.y + args[1];
                let dx2 = dx1 + args[2];
                let dy2 = dy1 + args[3];
                let dx3 = dx2 + args[4];
                let dy3 = dy2 + args[5];
                let dx4 = dx3 + args[6];
                let dy4 = dy3 + args[7];
                let dx5 = dx4 + args[8];
                let dy5 = dy4 + args[9];
                // the last operand moves along the axis with the larger
                // total displacement; the other returns to the start
                if (dx5 - self.x).abs() > (dy5 - self.y).abs() {
                    self.x = dx5 + args[10];
                } else {
                    self.y = dy5 + args[10];
                }
                self.sink.curve_to(dx1, dy1, dx2, dy2, dx3, dy3);
                self.sink.curve_to(dx4, dy4, dx5, dy5, self.x, self.y);
                self.stack.clear();
            }
            // Deprecated; has no effect.
            DotSection => {
                self.stack.clear();
            }
            // Return from the current subroutine
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=29>
            Return => {
                return Ok(Flow::Return);
            }
            // End the current charstring
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=21>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L2463>
            EndChar => {
                let has_width = self.stack.len_is_odd();
                self.read_width(has_width)?;
                if self.is_open {
                    self.is_open = false;
                    self.sink.close();
                }
                self.stack.clear();
                return Ok(Flow::EndChar);
            }
            // Emits a sequence of stem hints
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=21>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L777>
            HStem | VStem | HStemHm | VStemHm => {
                let is_horizontal = matches!(operator, HStem | HStemHm);
                self.emit_stems(is_horizontal)?;
                self.stack.clear();
            }
            // Applies a hint or counter mask.
            // If there are arguments on the stack, this is also an
            // implied series of VSTEMHM operators.
            // Hint and counter masks are bitstrings that determine
            // the currently active set of hints.
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=24>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L2580>
            HintMask | CntrMask => {
                self.emit_stems(false)?;
                let count = self.stem_count.div_ceil(8);
                let mask = cursor.read_array::<u8>(count)?;
                if operator == HintMask {
                    self.sink.hint_mask(mask);
                } else {
                    self.sink.counter_mask(mask);
                }
                self.stack.clear();
            }
            // Starts a new subpath
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=16>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L2653>
            RMoveTo => {
                let has_width = self.stack.len() == 3;
                let i = self.read_width(has_width)?;
                let [dx, dy] = self.stack.get_array::<2>(i)?;
                self.x += dx;
                self.y += dy;
                self.begin_subpath();
                self.stack.clear();
            }
            // Starts a new subpath by moving the current point in the
            // horizontal or vertical direction
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=16>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L839>
            HMoveTo | VMoveTo => {
                let has_width = self.stack.len() == 2;
                let i = self.read_width(has_width)?;
                let delta = self.stack.get(i)?;
                if operator == HMoveTo {
                    self.x += delta;
                } else {
                    self.y += delta;
                }
                self.begin_subpath();
                self.stack.clear();
            }
            // Emits a sequence of lines
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=16>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L863>
            RLineTo => {
                self.stack.verify_at_least_len(2)?;
                self.ensure_open();
                let mut i = 0;
                while i < self.stack.len() {
                    let [dx, dy] = self.stack.get_array::<2>(i)?;
                    self.x += dx;
                    self.y += dy;
                    self.sink.line_to(self.x, self.y);
                    i += 2;
                }
                self.stack.clear();
            }
            // Emits a sequence of alternating horizontal and vertical
            // lines
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=16>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L885>
            HLineTo | VLineTo => {
                self.stack.verify_at_least_len(1)?;
                self.ensure_open();
                let mut is_x = operator == HLineTo;
                for i in 0..self.stack.len() {
                    let delta = self.stack.get(i)?;
                    if is_x {
                        self.x += delta;
                    } else {
                        self.y += delta;
                    }
                    is_x = !is_x;
                    self.sink.line_to(self.x, self.y);
                }
                self.stack.clear();
            }
            // Emits curves that start and end horizontal, unless
            // the stack count is odd, in which case the first
            // curve may start with a vertical tangent
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=17>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L2789>
            HhCurveTo => {
                self.stack.verify_at_least_len(4)?;
                self.ensure_open();
                let mut i = 0;
                let mut dy1 = Fixed::ZERO;
                if self.stack.len_is_odd() {
                    dy1 = self.stack.get(0)?;
                    i += 1;
                }
                while i < self.stack.len() {
                    let args = self.stack.get_array::<4>(i)?;
                    let x1 = self.x + args[0];
                    let y1 = self.y + dy1;
                    let x2 = x1 + args[1];
                    let y2 = y1 + args[2];
                    self.x = x2 + args[3];
                    self.y = y2;
                    self.sink.curve_to(x1, y1, x2, y2, self.x, self.y);
                    dy1 = Fixed::ZERO;
                    i += 4;
                }
                self.stack.clear();
            }
            // Emits curves that start and end vertical, unless
            // the stack count is odd, in which case the first
            // curve may start with a horizontal tangent
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L2744>
            VvCurveTo => {
                self.stack.verify_at_least_len(4)?;
                self.ensure_open();
                let mut i = 0;
                let mut dx1 = Fixed::ZERO;
                if self.stack.len_is_odd() {
                    dx1 = self.stack.get(0)?;
                    i += 1;
                }
                while i < self.stack.len() {
                    let args = self.stack.get_array::<4>(i)?;
                    let x1 = self.x + dx1;
                    let y1 = self.y + args[0];
                    let x2 = x1 + args[1];
                    let y2 = y1 + args[2];
                    self.x = x2;
                    self.y = y2 + args[3];
                    self.sink.curve_to(x1, y1, x2, y2, self.x, self.y);
                    dx1 = Fixed::ZERO;
                    i += 4;
                }
                self.stack.clear();
            }
            // Alternates between curves with horizontal and vertical
            // tangents. A fifth operand on the final curve moves its end
            // point off the axis of the end tangent.
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=17>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L2834>
            HvCurveTo | VhCurveTo => {
                self.stack.verify_at_least_len(4)?;
                self.ensure_open();
                let count = self.stack.len();
                let mut i = 0;
                let mut horizontal = operator == HvCurveTo;
                while i < count {
                    let args = self.stack.get_array::<4>(i)?;
                    let last = if count - i == 5 {
                        self.stack.get(i + 4)?
                    } else {
                        Fixed::ZERO
                    };
                    let (x1, y1, x2, y2, x3, y3);
                    if horizontal {
                        x1 = self.x + args[0];
                        y1 = self.y;
                        x2 = x1 + args[1];
                        y2 = y1 + args[2];
                        x3 = x2 + last;
                        y3 = y2 + args[3];
                    } else {
                        x1 = self.x;
                        y1 = self.y + args[0];
                        x2 = x1 + args[1];
                        y2 = y1 + args[2];
                        x3 = x2 + args[3];
                        y3 = y2 + last;
                    }
                    self.sink.curve_to(x1, y1, x2, y2, x3, y3);
                    self.x = x3;
                    self.y = y3;
                    horizontal = !horizontal;
                    i += if count - i == 5 { 5 } else { 4 };
                }
                self.stack.clear();
            }
            // Emits a sequence of curves possibly followed by a line
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=17>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L915>
            RrCurveTo | RCurveLine => {
                let count = self.stack.len();
                let curve_count = if operator == RCurveLine {
                    self.stack.verify_at_least_len(8)?;
                    count - 2
                } else {
                    self.stack.verify_at_least_len(6)?;
                    count
                };
                self.ensure_open();
                let mut i = 0;
                while i + 6 <= curve_count {
                    let args = self.stack.get_array::<6>(i)?;
                    let x1 = self.x + args[0];
                    let y1 = self.y + args[1];
                    let x2 = x1 + args[2];
                    let y2 = y1 + args[3];
                    self.x = x2 + args[4];
                    self.y = y2 + args[5];
                    self.sink.curve_to(x1, y1, x2, y2, self.x, self.y);
                    i += 6;
                }
                if operator == RCurveLine {
                    let [dx, dy] = self.stack.get_array::<2>(i)?;
                    self.x += dx;
                    self.y += dy;
                    self.sink.line_to(self.x, self.y);
                }
                self.stack.clear();
            }
            // Emits a sequence of lines followed by a curve
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L2702>
            RLineCurve => {
                self.stack.verify_at_least_len(8)?;
                self.ensure_open();
                let line_count = self.stack.len() - 6;
                let mut i = 0;
                while i + 2 <= line_count {
                    let [dx, dy] = self.stack.get_array::<2>(i)?;
                    self.x += dx;
                    self.y += dy;
                    self.sink.line_to(self.x, self.y);
                    i += 2;
                }
                let args = self.stack.get_array::<6>(i)?;
                let x1 = self.x + args[0];
                let y1 = self.y + args[1];
                let x2 = x1 + args[2];
                let y2 = y1 + args[3];
                self.x = x2 + args[4];
                self.y = y2 + args[5];
                self.sink.curve_to(x1, y1, x2, y2, self.x, self.y);
                self.stack.clear();
            }
            // Call local or global subroutine
            // Spec: <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=29>
            // FT: <https://gitlab.freedesktop.org/freetype/freetype/-/blob/80a507a6b8e3d2906ad2c8ba69329bd2fb2a85ef/src/psaux/psintrp.c#L972>
            CallSubr | CallGsubr => {
                let subrs_index = if operator == CallSubr {
                    self.subrs.ok_or(Error::MissingSubroutines)?
                } else {
                    self.global_subrs
                };
                let biased_index = self
                    .stack
                    .pop_i32()?
                    .saturating_add(subrs_index.subr_bias());
                let subr_charstring_data = usize::try_from(biased_index)
                    .ok()
                    .and_then(|index| subrs_index.get(index).ok())
                    .ok_or(Error::InvalidSubroutineIndex(biased_index))?;
                // falling off the end of a subroutine is an implicit return
                if self.evaluate(subr_charstring_data, nesting_depth + 1)? == Flow::EndChar {
                    return Ok(Flow::EndChar);
                }
            }
        }
        Ok(Flow::Exhausted)
    }

    /// Handles the optional width operand at the bottom of the stack.
    ///
    /// Only the first stack clearing operator may carry a width. Returns
    /// the index of the first argument of the operator.
    fn read_width(&mut self, has_width: bool) -> Result<usize, Error> {
        let first_arg = if has_width && !self.have_read_width {
            self.sink.width(self.stack.get(0)?);
            1
        } else {
            0
        };
        self.have_read_width = true;
        Ok(first_arg)
    }

    /// Emits the stem hints on the stack, after any width operand.
    fn emit_stems(&mut self, is_horizontal: bool) -> Result<(), Error> {
        let has_width = self.stack.len_is_odd();
        let mut i = self.read_width(has_width)?;
        // the first edge is absolute, each following one is relative to
        // the end of the previous stem
        let mut edge = Fixed::ZERO;
        while i < self.stack.len() {
            let [delta, extent] = self.stack.get_array::<2>(i)?;
            edge += delta;
            if is_horizontal {
                self.sink.hstem(edge, extent);
            } else {
                self.sink.vstem(edge, extent);
            }
            edge += extent;
            self.stem_count += 1;
            i += 2;
        }
        Ok(())
    }

    /// Closes any open subpath and starts a new one at the current point.
    fn begin_subpath(&mut self) {
        if self.is_open {
            self.sink.close();
        }
        self.is_open = true;
        self.sink.move_to(self.x, self.y);
    }

    /// Drawing before the first moveto starts a subpath at the current
    /// point.
    fn ensure_open(&mut self) {
        if !self.is_open {
            self.is_open = true;
            self.sink.move_to(self.x, self.y);
        }
    }
}

/// PostScript charstring operator.
///
/// See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=40>
// The arithmetic, storage and conditional operators of the original Type 2
// format are rejected; fonttools doesn't implement these either:
// <https://github.com/fonttools/fonttools/blob/65598197c8afd415781f6667a7fb647c2c987fff/Lib/fontTools/misc/psCharStrings.py#L409>
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Operator {
    HStem,
    VStem,
    VMoveTo,
    RLineTo,
    HLineTo,
    VLineTo,
    RrCurveTo,
    CallSubr,
    Return,
    EndChar,
    HStemHm,
    HintMask,
    CntrMask,
    RMoveTo,
    HMoveTo,
    VStemHm,
    RCurveLine,
    RLineCurve,
    VvCurveTo,
    HhCurveTo,
    CallGsubr,
    VhCurveTo,
    HvCurveTo,
    DotSection,
    HFlex,
    Flex,
    HFlex1,
    Flex1,
}

impl Operator {
    fn read(cursor: &mut Cursor, b0: u8) -> Result<Self, Error> {
        // Escape opcode for accessing two byte operators
        const ESCAPE: u8 = 12;
        let (opcode, operator) = if b0 == ESCAPE {
            let b1 = cursor.read::<u8>()?;
            (
                (ESCAPE as u16) << 8 | b1 as u16,
                Self::from_two_byte_opcode(b1),
            )
        } else {
            (b0 as u16, Self::from_opcode(b0))
        };
        operator.ok_or(Error::InvalidCharstringOperator(opcode))
    }

    /// Creates an operator from the given opcode.
    fn from_opcode(opcode: u8) -> Option<Self> {
        use Operator::*;
        Some(match opcode {
            1 => HStem,
            3 => VStem,
            4 => VMoveTo,
            5 => RLineTo,
            6 => HLineTo,
            7 => VLineTo,
            8 => RrCurveTo,
            10 => CallSubr,
            11 => Return,
            14 => EndChar,
            18 => HStemHm,
            19 => HintMask,
            20 => CntrMask,
            21 => RMoveTo,
            22 => HMoveTo,
            23 => VStemHm,
            24 => RCurveLine,
            25 => RLineCurve,
            26 => VvCurveTo,
            27 => HhCurveTo,
            29 => CallGsubr,
            30 => VhCurveTo,
            31 => HvCurveTo,
            _ => return None,
        })
    }

    /// Creates an operator from the given extended opcode.
    ///
    /// These are preceded by a byte containing the escape value of 12.
    fn from_two_byte_opcode(opcode: u8) -> Option<Self> {
        use Operator::*;
        Some(match opcode {
            0 => DotSection,
            34 => HFlex,
            35 => Flex,
            36 => HFlex1,
            37 => Flex1,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::cff::{self, op, CharstringBuilder};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[derive(Copy, Clone, PartialEq, Debug)]
    enum Command {
        MoveTo(Fixed, Fixed),
        LineTo(Fixed, Fixed),
        CurveTo(Fixed, Fixed, Fixed, Fixed, Fixed, Fixed),
        Close,
        HStem(Fixed, Fixed),
        VStem(Fixed, Fixed),
        HintMask(u8),
        Width(Fixed),
    }

    #[derive(PartialEq, Default, Debug)]
    struct CaptureCommandSink(Vec<Command>);

    impl CaptureCommandSink {
        fn path(&self) -> Vec<Command> {
            self.0
                .iter()
                .copied()
                .filter(|cmd| {
                    matches!(
                        cmd,
                        Command::MoveTo(..)
                            | Command::LineTo(..)
                            | Command::CurveTo(..)
                            | Command::Close
                    )
                })
                .collect()
        }

        fn widths(&self) -> Vec<Fixed> {
            self.0
                .iter()
                .filter_map(|cmd| match cmd {
                    Command::Width(w) => Some(*w),
                    _ => None,
                })
                .collect()
        }
    }

    impl CommandSink for CaptureCommandSink {
        fn move_to(&mut self, x: Fixed, y: Fixed) {
            self.0.push(Command::MoveTo(x, y))
        }

        fn line_to(&mut self, x: Fixed, y: Fixed) {
            self.0.push(Command::LineTo(x, y))
        }

        fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
            self.0.push(Command::CurveTo(cx0, cy0, cx1, cy1, x, y))
        }

        fn close(&mut self) {
            self.0.push(Command::Close)
        }

        fn hstem(&mut self, y: Fixed, dy: Fixed) {
            self.0.push(Command::HStem(y, dy))
        }

        fn vstem(&mut self, x: Fixed, dx: Fixed) {
            self.0.push(Command::VStem(x, dx))
        }

        fn hint_mask(&mut self, mask: &[u8]) {
            self.0.extend(mask.iter().map(|b| Command::HintMask(*b)))
        }

        fn width(&mut self, width: Fixed) {
            self.0.push(Command::Width(width))
        }
    }

    fn fx(value: i32) -> Fixed {
        Fixed::from_i32(value)
    }

    fn move_to(x: i32, y: i32) -> Command {
        Command::MoveTo(fx(x), fx(y))
    }

    fn line_to(x: i32, y: i32) -> Command {
        Command::LineTo(fx(x), fx(y))
    }

    fn curve_to(points: [i32; 6]) -> Command {
        let [a, b, c, d, e, f] = points.map(fx);
        Command::CurveTo(a, b, c, d, e, f)
    }

    fn run(charstring: &[u8]) -> Result<CaptureCommandSink, Error> {
        run_with_subrs(charstring, &[], None)
    }

    fn run_with_subrs(
        charstring: &[u8],
        global_subrs: &[Vec<u8>],
        local_subrs: Option<&[Vec<u8>]>,
    ) -> Result<CaptureCommandSink, Error> {
        let global = cff::index(global_subrs);
        let local = local_subrs.map(|subrs| cff::index(subrs));
        let global = Index::new(&global)?;
        let local = local.as_deref().map(Index::new).transpose()?;
        let mut sink = CaptureCommandSink::default();
        evaluate(charstring, global, local, &mut sink)?;
        Ok(sink)
    }

    #[test]
    fn simple_path_with_width() {
        let charstring = CharstringBuilder::new()
            .cmd(&[100, 50, 0], op::RMOVETO)
            .cmd(&[100, 0, 0, 100, -100, 0], op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(sink.widths(), [fx(100)]);
        assert_eq!(
            sink.path(),
            [
                move_to(50, 0),
                line_to(150, 0),
                line_to(150, 100),
                line_to(50, 100),
                Command::Close,
            ]
        );
    }

    #[test]
    fn no_width_without_extra_operand() {
        let charstring = CharstringBuilder::new()
            .cmd(&[10, 20], op::RMOVETO)
            // an odd count here is not a width: only the first clearing
            // operator may carry one
            .cmd(&[5], op::HMOVETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert!(sink.widths().is_empty());
        assert_eq!(
            sink.path(),
            [move_to(10, 20), Command::Close, move_to(15, 20), Command::Close]
        );
    }

    #[test]
    fn width_on_moves_and_endchar() {
        let sink = run(&CharstringBuilder::new()
            .cmd(&[-20, 30], op::HMOVETO)
            .op(op::ENDCHAR)
            .build())
        .unwrap();
        assert_eq!(sink.widths(), [fx(-20)]);
        assert_eq!(sink.path(), [move_to(30, 0), Command::Close]);

        let sink = run(&CharstringBuilder::new()
            .cmd(&[7, 30], op::VMOVETO)
            .op(op::ENDCHAR)
            .build())
        .unwrap();
        assert_eq!(sink.widths(), [fx(7)]);
        assert_eq!(sink.path(), [move_to(0, 30), Command::Close]);

        // an empty glyph with only a width
        let sink = run(&CharstringBuilder::new().cmd(&[250], op::ENDCHAR).build()).unwrap();
        assert_eq!(sink.0, [Command::Width(fx(250))]);
    }

    #[test]
    fn fixed_operands() {
        let charstring = CharstringBuilder::new()
            .fixed(1.5)
            .fixed(-2.25)
            .op(op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(
            sink.path(),
            [
                Command::MoveTo(Fixed::from_f64(1.5), Fixed::from_f64(-2.25)),
                Command::Close
            ]
        );
    }

    #[test]
    fn alternating_lines() {
        let charstring = CharstringBuilder::new()
            .cmd(&[0, 0], op::RMOVETO)
            .cmd(&[10, 20, 30], op::HLINETO)
            .cmd(&[5, 6], op::VLINETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(
            sink.path(),
            [
                move_to(0, 0),
                line_to(10, 0),
                line_to(10, 20),
                line_to(40, 20),
                line_to(40, 25),
                line_to(46, 25),
                Command::Close,
            ]
        );
    }

    #[test]
    fn hv_and_vh_curves() {
        let charstring = CharstringBuilder::new()
            .cmd(&[100, 100], op::RMOVETO)
            // horizontal start, vertical end; then vertical start with
            // a final x offset
            .cmd(&[10, 20, 30, 40, 1, 2, 3, 4, 5], op::HVCURVETO)
            .cmd(&[10, 20, 30, 40], op::VHCURVETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(
            sink.path(),
            [
                move_to(100, 100),
                curve_to([110, 100, 130, 130, 130, 170]),
                curve_to([130, 171, 132, 174, 136, 179]),
                curve_to([136, 189, 156, 219, 196, 219]),
                Command::Close,
            ]
        );
    }

    #[test]
    fn hh_and_vv_curves() {
        let charstring = CharstringBuilder::new()
            .cmd(&[0, 0], op::RMOVETO)
            .cmd(&[5, 10, 20, 30, 40], op::HHCURVETO)
            .cmd(&[7, 10, 20, 30, 40], op::VVCURVETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(
            sink.path(),
            [
                move_to(0, 0),
                curve_to([10, 5, 30, 35, 70, 35]),
                curve_to([77, 45, 97, 75, 97, 115]),
                Command::Close,
            ]
        );
    }

    #[test]
    fn curve_line_combinations() {
        let charstring = CharstringBuilder::new()
            .cmd(&[0, 0], op::RMOVETO)
            .cmd(&[1, 2, 3, 4, 5, 6, 10, 0], op::RCURVELINE)
            .cmd(&[0, 10, 1, 1, 1, 1, 1, 1], op::RLINECURVE)
            .cmd(&[1, 1, 1, 1, 1, 1], op::RRCURVETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(
            sink.path(),
            [
                move_to(0, 0),
                curve_to([1, 2, 4, 6, 9, 12]),
                line_to(19, 12),
                line_to(19, 22),
                curve_to([20, 23, 21, 24, 22, 25]),
                curve_to([23, 26, 24, 27, 25, 28]),
                Command::Close,
            ]
        );
    }

    #[test]
    fn flex_operators() {
        let charstring = CharstringBuilder::new()
            .cmd(&[0, 0], op::RMOVETO)
            .args(&[10, 0, 10, 5, 10, 0, 10, 0, 10, -5, 10, 0, 50])
            .op2(op::FLEX)
            .args(&[10, 10, 5, 10, 10, 10, 10])
            .op2(op::HFLEX)
            .args(&[10, 1, 10, 5, 10, 10, 10, -6, 10])
            .op2(op::HFLEX1)
            .args(&[10, 1, 10, 1, 10, 1, 10, 1, 10, 1, 7])
            .op2(op::FLEX1)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(
            sink.path(),
            [
                move_to(0, 0),
                curve_to([10, 0, 20, 5, 30, 5]),
                curve_to([40, 5, 50, 0, 60, 0]),
                curve_to([70, 0, 80, 5, 90, 5]),
                curve_to([100, 5, 110, 0, 120, 0]),
                curve_to([130, 1, 140, 6, 150, 6]),
                curve_to([160, 6, 170, 0, 180, 0]),
                // horizontal displacement dominates, so the last operand is dx
                curve_to([190, 1, 200, 2, 210, 3]),
                curve_to([220, 4, 230, 5, 237, 0]),
                Command::Close,
            ]
        );
    }

    #[test]
    fn stems_and_hintmask() {
        let charstring = CharstringBuilder::new()
            .cmd(&[-10, 0, 20, 100, 30], op::HSTEMHM)
            // implied vstems before the mask; three stems need one byte
            .cmd(&[50, 10], op::HINTMASK)
            .bytes(&[0b1110_0000])
            .cmd(&[0, 0], op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        assert_eq!(
            sink.0,
            [
                Command::Width(fx(-10)),
                Command::HStem(fx(0), fx(20)),
                Command::HStem(fx(120), fx(30)),
                Command::VStem(fx(50), fx(10)),
                Command::HintMask(0b1110_0000),
                move_to(0, 0),
                Command::Close,
            ]
        );
    }

    #[test]
    fn hintmask_with_many_stems() {
        let stems: Vec<i32> = (0..18).map(|i| if i % 2 == 0 { 5 } else { 10 }).collect();
        let charstring = CharstringBuilder::new()
            .cmd(&stems, op::VSTEMHM)
            .op(op::HINTMASK)
            .bytes(&[0xFF, 0x80])
            .cmd(&[0, 0], op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        let sink = run(&charstring).unwrap();
        let masks: Vec<_> = sink
            .0
            .iter()
            .filter(|cmd| matches!(cmd, Command::HintMask(_)))
            .collect();
        assert_eq!(masks, [&Command::HintMask(0xFF), &Command::HintMask(0x80)]);
        assert_eq!(sink.path(), [move_to(0, 0), Command::Close]);
    }

    #[test]
    fn truncated_hintmask() {
        let charstring = CharstringBuilder::new()
            .cmd(&[0, 20], op::HSTEM)
            .op(op::HINTMASK)
            .build();
        assert!(matches!(run(&charstring), Err(Error::Read(_))));
    }

    #[test]
    fn local_and_global_subrs() {
        let local = [CharstringBuilder::new()
            .cmd(&[10, 0, 0, 10], op::RLINETO)
            .op(op::RETURN)
            .build()];
        // no trailing return: the end of a subroutine returns implicitly
        let global = [
            CharstringBuilder::new().cmd(&[5], op::HLINETO).build(),
            CharstringBuilder::new().op(op::ENDCHAR).build(),
        ];
        let charstring = CharstringBuilder::new()
            .cmd(&[0, 0], op::RMOVETO)
            .cmd(&[-107], op::CALLSUBR)
            .cmd(&[-107], op::CALLGSUBR)
            .cmd(&[-106], op::CALLGSUBR)
            // never reached
            .cmd(&[1, 1], op::RLINETO)
            .build();
        let sink = run_with_subrs(&charstring, &global, Some(local.as_slice())).unwrap();
        assert_eq!(
            sink.path(),
            [
                move_to(0, 0),
                line_to(10, 0),
                line_to(10, 10),
                line_to(15, 10),
                Command::Close,
            ]
        );
    }

    #[test]
    fn large_subr_bias() {
        let mut global = vec![Vec::new(); 1240];
        global[0] = CharstringBuilder::new().cmd(&[0, 5], op::RMOVETO).build();
        let charstring = CharstringBuilder::new()
            .cmd(&[-1131], op::CALLGSUBR)
            .op(op::ENDCHAR)
            .build();
        let sink = run_with_subrs(&charstring, &global, None).unwrap();
        assert_eq!(sink.path(), [move_to(0, 5), Command::Close]);
    }

    #[test]
    fn subroutine_errors() {
        let charstring = CharstringBuilder::new()
            .cmd(&[-107], op::CALLSUBR)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(run(&charstring).unwrap_err(), Error::MissingSubroutines);
        let charstring = CharstringBuilder::new()
            .cmd(&[-106], op::CALLGSUBR)
            .op(op::ENDCHAR)
            .build();
        let global = [CharstringBuilder::new().op(op::RETURN).build()];
        assert_eq!(
            run_with_subrs(&charstring, &global, None).unwrap_err(),
            Error::InvalidSubroutineIndex(1)
        );
        let charstring = CharstringBuilder::new()
            .cmd(&[-108], op::CALLGSUBR)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            run_with_subrs(&charstring, &global, None).unwrap_err(),
            Error::InvalidSubroutineIndex(-1)
        );
    }

    #[test]
    fn recursion_limit() {
        // a global subroutine that calls itself
        let global = [CharstringBuilder::new()
            .cmd(&[-107], op::CALLGSUBR)
            .op(op::RETURN)
            .build()];
        let charstring = CharstringBuilder::new()
            .cmd(&[-107], op::CALLGSUBR)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            run_with_subrs(&charstring, &global, None).unwrap_err(),
            Error::CharstringNestingDepthLimitExceeded
        );
    }

    #[test]
    fn nesting_at_the_limit() {
        // subr i calls subr i + 1; the last one draws
        let depth = NESTING_DEPTH_LIMIT as usize;
        let mut global: Vec<Vec<u8>> = (0..depth - 1)
            .map(|i| {
                CharstringBuilder::new()
                    .cmd(&[i as i32 + 1 - 107], op::CALLGSUBR)
                    .build()
            })
            .collect();
        global.push(CharstringBuilder::new().cmd(&[1, 2], op::RMOVETO).build());
        let charstring = CharstringBuilder::new()
            .cmd(&[-107], op::CALLGSUBR)
            .op(op::ENDCHAR)
            .build();
        let sink = run_with_subrs(&charstring, &global, None).unwrap();
        assert_eq!(sink.path(), [move_to(1, 2), Command::Close]);
    }

    #[test]
    fn missing_endchar() {
        let charstring = CharstringBuilder::new()
            .cmd(&[0, 0], op::RMOVETO)
            .cmd(&[10, 10], op::RLINETO)
            .build();
        assert_eq!(run(&charstring).unwrap_err(), Error::MissingEndChar);
        assert_eq!(run(&[]).unwrap_err(), Error::MissingEndChar);
    }

    #[test]
    fn invalid_operators() {
        assert_eq!(
            run(&[op::ESCAPE, 10]).unwrap_err(),
            Error::InvalidCharstringOperator(0x0C0A)
        );
        assert_eq!(
            run(&[2]).unwrap_err(),
            Error::InvalidCharstringOperator(2)
        );
        // CFF2 blend is not valid in CFF charstrings
        assert_eq!(
            run(&[139, 139, 16]).unwrap_err(),
            Error::InvalidCharstringOperator(16)
        );
    }

    #[test]
    fn stack_limits() {
        let mut charstring = CharstringBuilder::new()
            .args(&[1; 49])
            .op(op::RLINETO)
            .build();
        assert_eq!(run(&charstring).unwrap_err(), Error::StackOverflow);
        charstring = CharstringBuilder::new().cmd(&[1], op::RLINETO).build();
        assert_eq!(run(&charstring).unwrap_err(), Error::StackUnderflow);
        charstring = CharstringBuilder::new()
            .cmd(&[1, 2, 3, 4, 5], op::RLINECURVE)
            .build();
        assert_eq!(run(&charstring).unwrap_err(), Error::StackUnderflow);
        charstring = CharstringBuilder::new().op(op::RMOVETO).build();
        assert_eq!(run(&charstring).unwrap_err(), Error::StackUnderflow);
    }

    #[test]
    fn pen_sink() {
        use crate::types::PenCommand;
        let charstring = CharstringBuilder::new()
            .cmd(&[10, 20], op::RMOVETO)
            .cmd(&[5, 0], op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        let mut commands: Vec<PenCommand> = Vec::new();
        evaluate(
            &charstring,
            Index::default(),
            None,
            &mut PenSink::new(&mut commands),
        )
        .unwrap();
        assert_eq!(
            commands,
            [
                PenCommand::MoveTo { x: 10.0, y: 20.0 },
                PenCommand::LineTo { x: 15.0, y: 20.0 },
                PenCommand::Close,
            ]
        );
    }

    #[test]
    fn random_charstrings_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let global = [CharstringBuilder::new()
            .cmd(&[1, 1], op::RLINETO)
            .op(op::RETURN)
            .build()];
        let global = cff::index(&global);
        let global = Index::new(&global).unwrap();
        for _ in 0..2000 {
            let len = rng.gen_range(0..64);
            let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let mut sink = CaptureCommandSink::default();
            let _ = evaluate(&data, global, Some(global), &mut sink);
        }
    }
}
