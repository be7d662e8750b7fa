//! Receiving outlines.

/// Interface for accepting a sequence of path commands.
///
/// This unifies the output of the TrueType and CFF outline decoders.
pub trait Pen {
    /// Emit a command to begin a new subpath at (x, y).
    fn move_to(&mut self, x: f32, y: f32);

    /// Emit a line segment from the current point to (x, y).
    fn line_to(&mut self, x: f32, y: f32);

    /// Emit a quadratic bezier segment from the current point with a control
    /// point at (cx0, cy0) and ending at (x, y).
    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32);

    /// Emit a cubic bezier segment from the current point with control
    /// points at (cx0, cy0) and (cx1, cy1) and ending at (x, y).
    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32);

    /// Emit a command to close the current subpath.
    fn close(&mut self);
}

/// A single command emitted to a [`Pen`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PenCommand {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    QuadTo { cx0: f32, cy0: f32, x: f32, y: f32 },
    CurveTo { cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32 },
    Close,
}

impl PenCommand {
    /// Replay this command into a pen.
    pub fn apply_to(&self, pen: &mut impl Pen) {
        match *self {
            PenCommand::MoveTo { x, y } => pen.move_to(x, y),
            PenCommand::LineTo { x, y } => pen.line_to(x, y),
            PenCommand::QuadTo { cx0, cy0, x, y } => pen.quad_to(cx0, cy0, x, y),
            PenCommand::CurveTo {
                cx0,
                cy0,
                cx1,
                cy1,
                x,
                y,
            } => pen.curve_to(cx0, cy0, cx1, cy1, x, y),
            PenCommand::Close => pen.close(),
        }
    }
}

/// Collects pen commands into a vector. Mostly useful for testing.
impl Pen for Vec<PenCommand> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(PenCommand::MoveTo { x, y })
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(PenCommand::LineTo { x, y })
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.push(PenCommand::QuadTo { cx0, cy0, x, y })
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.push(PenCommand::CurveTo {
            cx0,
            cy0,
            cx1,
            cy1,
            x,
            y,
        })
    }

    fn close(&mut self) {
        self.push(PenCommand::Close)
    }
}
