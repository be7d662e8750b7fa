//! PostScript (CFF) common structures.

use std::fmt;

use crate::ReadError;

mod charset;
pub mod charstring;
pub mod dict;
mod index;
mod stack;
mod string;

pub use charset::{Charset, CharsetIter, CharsetKind};
pub use index::Index;
pub use stack::Stack;
pub use string::{Latin1String, StringId, STANDARD_STRINGS};

/// Errors that are specific to PostScript processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The `off_size` field in an INDEX contained an invalid value.
    InvalidIndexOffsetSize(u8),
    /// An INDEX contained a zero offset.
    ZeroOffsetInIndex,
    /// An INDEX offset array was not monotonic, or pointed past the data.
    InvalidIndexOffsets,
    /// A DICT contained a reserved operator byte.
    InvalidDictOperator(u8),
    /// An operand could not be decoded.
    InvalidNumber,
    /// A required DICT entry was absent.
    MissingDictEntry(u16),
    /// A DICT ended with operands that no operator consumed.
    MissingDictOperator,
    /// A DICT operator had the wrong number of operands.
    InvalidDictOperandCount(u16),
    /// A charstring contained an unknown or unsupported operator.
    InvalidCharstringOperator(u16),
    /// More operands were pushed than the stack can hold.
    StackOverflow,
    /// An operator needed more operands than were on the stack.
    StackUnderflow,
    /// A subroutine call referenced an index outside the subroutine INDEX.
    InvalidSubroutineIndex(i32),
    /// A `callsubr` operator was used without a local subroutine INDEX.
    MissingSubroutines,
    /// The charstring ended without `endchar` or `return`.
    MissingEndChar,
    /// Subroutine calls were nested too deeply.
    CharstringNestingDepthLimitExceeded,
    /// The charset ranges did not map exactly the glyphs in the font.
    InvalidCharsetCoverage,
    /// Underlying parsing error.
    Read(ReadError),
}

impl From<ReadError> for Error {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndexOffsetSize(size) => {
                write!(f, "invalid offset size of {size} for INDEX (expected 1-4)")
            }
            Self::ZeroOffsetInIndex => {
                write!(f, "invalid offset of 0 in INDEX (must be >= 1)")
            }
            Self::InvalidIndexOffsets => {
                write!(f, "INDEX offsets are decreasing or exceed the data")
            }
            Self::InvalidDictOperator(op) => write!(f, "reserved DICT operator {op}"),
            Self::InvalidNumber => write!(f, "invalid number in DICT or charstring"),
            Self::MissingDictEntry(op) => write!(f, "required DICT entry {op:#06x} is missing"),
            Self::MissingDictOperator => write!(f, "DICT ended with unconsumed operands"),
            Self::InvalidDictOperandCount(op) => {
                write!(f, "wrong number of operands for DICT entry {op:#06x}")
            }
            Self::InvalidCharstringOperator(op) => {
                write!(f, "unsupported charstring operator {op:#06x}")
            }
            Self::StackOverflow => write!(f, "operand stack overflow"),
            Self::StackUnderflow => write!(f, "operand stack underflow"),
            Self::InvalidSubroutineIndex(index) => {
                write!(f, "subroutine index {index} is out of bounds")
            }
            Self::MissingSubroutines => {
                write!(f, "callsubr used without a local subroutine INDEX")
            }
            Self::MissingEndChar => write!(f, "charstring ended without endchar"),
            Self::CharstringNestingDepthLimitExceeded => {
                write!(
                    f,
                    "exceeded subroutine nesting limit of {}",
                    charstring::NESTING_DEPTH_LIMIT
                )
            }
            Self::InvalidCharsetCoverage => {
                write!(f, "charset ranges do not cover the glyph count exactly")
            }
            Self::Read(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}
