//! Parsing for PostScript DICTs.
//!
//! A DICT is a sequence of operands, each run terminated by an operator that
//! acts as the key for those operands.

use std::ops::Range;

use super::{stack::MAX_STACK, Error, StringId};
use crate::{Cursor, FontData, ReadError};

/// DICT operator codes.
///
/// Two byte operators are escaped with a leading 12 and are represented as
/// `0x0C00 | b`.
///
/// See "Table 9 Top DICT Operator Entries" and "Table 23 Private DICT
/// Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf>
pub mod op {
    pub const VERSION: u16 = 0;
    pub const NOTICE: u16 = 1;
    pub const FULL_NAME: u16 = 2;
    pub const FAMILY_NAME: u16 = 3;
    pub const WEIGHT: u16 = 4;
    pub const FONT_BBOX: u16 = 5;
    pub const BLUE_VALUES: u16 = 6;
    pub const OTHER_BLUES: u16 = 7;
    pub const FAMILY_BLUES: u16 = 8;
    pub const FAMILY_OTHER_BLUES: u16 = 9;
    pub const STD_HW: u16 = 10;
    pub const STD_VW: u16 = 11;
    pub const ESCAPE: u16 = 12;
    pub const UNIQUE_ID: u16 = 13;
    pub const XUID: u16 = 14;
    pub const CHARSET: u16 = 15;
    pub const ENCODING: u16 = 16;
    pub const CHARSTRINGS: u16 = 17;
    pub const PRIVATE: u16 = 18;
    pub const SUBRS: u16 = 19;
    pub const DEFAULT_WIDTH_X: u16 = 20;
    pub const NOMINAL_WIDTH_X: u16 = 21;

    pub const COPYRIGHT: u16 = 0x0C00;
    pub const IS_FIXED_PITCH: u16 = 0x0C01;
    pub const ITALIC_ANGLE: u16 = 0x0C02;
    pub const UNDERLINE_POSITION: u16 = 0x0C03;
    pub const UNDERLINE_THICKNESS: u16 = 0x0C04;
    pub const PAINT_TYPE: u16 = 0x0C05;
    pub const CHARSTRING_TYPE: u16 = 0x0C06;
    pub const FONT_MATRIX: u16 = 0x0C07;
    pub const STROKE_WIDTH: u16 = 0x0C08;
    pub const BLUE_SCALE: u16 = 0x0C09;
    pub const BLUE_SHIFT: u16 = 0x0C0A;
    pub const BLUE_FUZZ: u16 = 0x0C0B;
    pub const STEM_SNAP_H: u16 = 0x0C0C;
    pub const STEM_SNAP_V: u16 = 0x0C0D;
    pub const FORCE_BOLD: u16 = 0x0C0E;
    pub const LANGUAGE_GROUP: u16 = 0x0C11;
    pub const EXPANSION_FACTOR: u16 = 0x0C12;
    pub const INITIAL_RANDOM_SEED: u16 = 0x0C13;
    pub const SYNTHETIC_BASE: u16 = 0x0C14;
    pub const POSTSCRIPT: u16 = 0x0C15;
    pub const BASE_FONT_NAME: u16 = 0x0C16;
    pub const BASE_FONT_BLEND: u16 = 0x0C17;
    pub const ROS: u16 = 0x0C1E;
    pub const CID_FONT_VERSION: u16 = 0x0C1F;
    pub const CID_FONT_REVISION: u16 = 0x0C20;
    pub const CID_FONT_TYPE: u16 = 0x0C21;
    pub const CID_COUNT: u16 = 0x0C22;
    pub const UID_BASE: u16 = 0x0C23;
    pub const FD_ARRAY: u16 = 0x0C24;
    pub const FD_SELECT: u16 = 0x0C25;
    pub const FONT_NAME: u16 = 0x0C26;
}

/// Returns the name of a DICT operator, if it is a known one.
pub fn operator_name(operator: u16) -> Option<&'static str> {
    Some(match operator {
        op::VERSION => "version",
        op::NOTICE => "Notice",
        op::FULL_NAME => "FullName",
        op::FAMILY_NAME => "FamilyName",
        op::WEIGHT => "Weight",
        op::FONT_BBOX => "FontBBox",
        op::BLUE_VALUES => "BlueValues",
        op::OTHER_BLUES => "OtherBlues",
        op::FAMILY_BLUES => "FamilyBlues",
        op::FAMILY_OTHER_BLUES => "FamilyOtherBlues",
        op::STD_HW => "StdHW",
        op::STD_VW => "StdVW",
        op::UNIQUE_ID => "UniqueID",
        op::XUID => "XUID",
        op::CHARSET => "charset",
        op::ENCODING => "Encoding",
        op::CHARSTRINGS => "CharStrings",
        op::PRIVATE => "Private",
        op::SUBRS => "Subrs",
        op::DEFAULT_WIDTH_X => "defaultWidthX",
        op::NOMINAL_WIDTH_X => "nominalWidthX",
        op::COPYRIGHT => "Copyright",
        op::IS_FIXED_PITCH => "isFixedPitch",
        op::ITALIC_ANGLE => "ItalicAngle",
        op::UNDERLINE_POSITION => "UnderlinePosition",
        op::UNDERLINE_THICKNESS => "UnderlineThickness",
        op::PAINT_TYPE => "PaintType",
        op::CHARSTRING_TYPE => "CharstringType",
        op::FONT_MATRIX => "FontMatrix",
        op::STROKE_WIDTH => "StrokeWidth",
        op::BLUE_SCALE => "BlueScale",
        op::BLUE_SHIFT => "BlueShift",
        op::BLUE_FUZZ => "BlueFuzz",
        op::STEM_SNAP_H => "StemSnapH",
        op::STEM_SNAP_V => "StemSnapV",
        op::FORCE_BOLD => "ForceBold",
        op::LANGUAGE_GROUP => "LanguageGroup",
        op::EXPANSION_FACTOR => "ExpansionFactor",
        op::INITIAL_RANDOM_SEED => "initialRandomSeed",
        op::SYNTHETIC_BASE => "SyntheticBase",
        op::POSTSCRIPT => "PostScript",
        op::BASE_FONT_NAME => "BaseFontName",
        op::BASE_FONT_BLEND => "BaseFontBlend",
        op::ROS => "ROS",
        op::CID_FONT_VERSION => "CIDFontVersion",
        op::CID_FONT_REVISION => "CIDFontRevision",
        op::CID_FONT_TYPE => "CIDFontType",
        op::CID_COUNT => "CIDCount",
        op::UID_BASE => "UIDBase",
        op::FD_ARRAY => "FDArray",
        op::FD_SELECT => "FDSelect",
        op::FONT_NAME => "FontName",
        _ => return None,
    })
}

/// A numeric DICT operand.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Number {
    Integer(i32),
    Real(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Real(value) => value,
        }
    }

    /// The value as an integer; reals are truncated toward zero.
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Integer(value) => value,
            Self::Real(value) => value as i32,
        }
    }

    /// The value as a byte offset, failing for negative values.
    pub fn to_offset(self) -> Result<usize, Error> {
        usize::try_from(self.to_i32()).map_err(|_| ReadError::OutOfBounds.into())
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

/// Either a PostScript DICT operator or a (numeric) operand.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Token {
    Operator(u16),
    Operand(Number),
}

/// Given a byte slice containing DICT data, returns an iterator yielding
/// raw operands and operators.
pub fn tokens(dict_data: &[u8]) -> impl Iterator<Item = Result<Token, Error>> + '_ + Clone {
    let mut cursor = FontData::new(dict_data).cursor();
    std::iter::from_fn(move || {
        if cursor.remaining_bytes() == 0 {
            None
        } else {
            Some(parse_token(&mut cursor))
        }
    })
}

fn parse_token(cursor: &mut Cursor) -> Result<Token, Error> {
    let b0 = cursor.read::<u8>()?;
    Ok(match b0 {
        12 => Token::Operator(op::ESCAPE << 8 | cursor.read::<u8>()? as u16),
        0..=21 => Token::Operator(b0 as u16),
        28 | 29 | 32..=254 => Token::Operand(Number::Integer(parse_int(cursor, b0)?)),
        30 => Token::Operand(Number::Real(parse_real(cursor)?)),
        _ => return Err(Error::InvalidDictOperator(b0)),
    })
}

/// Decodes the integer operand that starts with `b0`.
///
/// Shared with charstrings, which use the same forms except 29.
pub(crate) fn parse_int(cursor: &mut Cursor, b0: u8) -> Result<i32, Error> {
    // Size   b0 range     Value range              Value calculation
    //--------------------------------------------------------------------------------
    // 1      32 to 246    -107 to +107             b0 - 139
    // 2      247 to 250   +108 to +1131            (b0 - 247) * 256 + b1 + 108
    // 2      251 to 254   -1131 to -108            -(b0 - 251) * 256 - b1 - 108
    // 3      28           -32768 to +32767         b1 << 8 | b2
    // 5      29           -(2^31) to +(2^31 - 1)   b1 << 24 | b2 << 16 | b3 << 8 | b4
    Ok(match b0 {
        32..=246 => b0 as i32 - 139,
        247..=250 => (b0 as i32 - 247) * 256 + cursor.read::<u8>()? as i32 + 108,
        251..=254 => -(b0 as i32 - 251) * 256 - cursor.read::<u8>()? as i32 - 108,
        28 => cursor.read::<i16>()? as i32,
        29 => cursor.read::<i32>()?,
        _ => return Err(Error::InvalidNumber),
    })
}

/// Decodes a packed decimal real number.
///
/// Nibble    Represents
/// ----------------------
/// 0 to 9    0 to 9
/// a         . (decimal point)
/// b         E
/// c         E-
/// d         <reserved>
/// e         - (minus)
/// f         end of number
fn parse_real(cursor: &mut Cursor) -> Result<f64, Error> {
    let mut text = String::with_capacity(16);
    'outer: loop {
        let b = cursor.read::<u8>()?;
        for nibble in [b >> 4, b & 0xF] {
            match nibble {
                0x0..=0x9 => text.push((b'0' + nibble) as char),
                0xA => text.push('.'),
                0xB => text.push('E'),
                0xC => text.push_str("E-"),
                0xD => {}
                0xE => text.push('-'),
                _ => break 'outer,
            }
        }
    }
    if text.is_empty() {
        return Ok(0.0);
    }
    text.parse().map_err(|_| Error::InvalidNumber)
}

/// The operands attached to a DICT key.
#[derive(Clone, PartialEq, Debug)]
pub enum Operands {
    /// A key with exactly one operand.
    Single(Number),
    /// A key with zero or several operands, in stream order.
    List(Vec<Number>),
}

impl Operands {
    fn new(mut operands: Vec<Number>) -> Self {
        match operands.len() {
            1 => Self::Single(operands.remove(0)),
            _ => Self::List(operands),
        }
    }

    pub fn as_slice(&self) -> &[Number] {
        match self {
            Self::Single(number) => std::slice::from_ref(number),
            Self::List(list) => list,
        }
    }
}

/// A decoded DICT: keys with their operands, in stream order.
#[derive(Clone, Default, PartialEq)]
pub struct Dict {
    entries: Vec<(u16, Operands)>,
}

impl Dict {
    pub fn parse(dict_data: &[u8]) -> Result<Self, Error> {
        let mut entries = Vec::new();
        let mut operands = Vec::new();
        for token in tokens(dict_data) {
            match token? {
                Token::Operand(number) => {
                    if operands.len() == MAX_STACK {
                        return Err(Error::StackOverflow);
                    }
                    operands.push(number);
                }
                Token::Operator(operator) => {
                    entries.push((operator, Operands::new(std::mem::take(&mut operands))));
                }
            }
        }
        if !operands.is_empty() {
            return Err(Error::MissingDictOperator);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(u16, Operands)] {
        &self.entries
    }

    /// The operands for `operator`; a repeated key takes its last value.
    pub fn get(&self, operator: u16) -> Option<&Operands> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| *key == operator)
            .map(|(_, operands)| operands)
    }

    /// The scalar value of `operator`.
    ///
    /// A key that unexpectedly holds a list yields its last operand.
    pub fn number(&self, operator: u16) -> Option<Number> {
        self.get(operator)?.as_slice().last().copied()
    }

    pub fn array(&self, operator: u16) -> Option<&[Number]> {
        self.get(operator).map(Operands::as_slice)
    }

    fn sid(&self, operator: u16) -> Option<StringId> {
        self.number(operator)
            .map(|n| StringId::new(n.to_i32().clamp(0, u16::MAX as i32) as u16))
    }

    fn f64_or(&self, operator: u16, default: f64) -> f64 {
        self.number(operator).map(Number::to_f64).unwrap_or(default)
    }

    fn f64_array<const N: usize>(&self, operator: u16) -> Option<[f64; N]> {
        let values = self.array(operator)?;
        let mut result = [0.0; N];
        if values.len() < N {
            return None;
        }
        for (dest, value) in result.iter_mut().zip(values) {
            *dest = value.to_f64();
        }
        Some(result)
    }

    fn offset(&self, operator: u16) -> Result<Option<usize>, Error> {
        self.number(operator).map(Number::to_offset).transpose()
    }

    // delta encoded arrays store each value as the difference from the
    // previous one
    fn delta_array(&self, operator: u16) -> Vec<f64> {
        let mut sum = 0.0;
        self.array(operator)
            .unwrap_or_default()
            .iter()
            .map(|value| {
                sum += value.to_f64();
                sum
            })
            .collect()
    }
}

impl std::fmt::Debug for Dict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (operator, operands) in &self.entries {
            let values: Vec<f64> = operands.as_slice().iter().map(|n| n.to_f64()).collect();
            match operator_name(*operator) {
                Some(name) => map.entry(&name, &values),
                None => map.entry(operator, &values),
            };
        }
        map.finish()
    }
}

/// The default font matrix, mapping 1000 units to the em.
pub const DEFAULT_FONT_MATRIX: [f64; 6] = [0.001, 0.0, 0.0, 0.001, 0.0, 0.0];

/// The entries of a Top DICT, with defaults applied.
///
/// Offsets are relative to the start of the CFF table.
#[derive(Clone, PartialEq, Debug)]
pub struct TopDict {
    pub version: Option<StringId>,
    pub notice: Option<StringId>,
    pub copyright: Option<StringId>,
    pub full_name: Option<StringId>,
    pub family_name: Option<StringId>,
    pub weight: Option<StringId>,
    pub is_fixed_pitch: bool,
    pub italic_angle: f64,
    pub underline_position: f64,
    pub underline_thickness: f64,
    pub paint_type: i32,
    pub charstring_type: i32,
    pub font_matrix: [f64; 6],
    pub unique_id: Option<i32>,
    pub font_bbox: [f64; 4],
    pub stroke_width: f64,
    /// 0, 1 and 2 select the predefined ISOAdobe, Expert and ExpertSubset
    /// charsets.
    pub charset_offset: usize,
    /// Recorded only; encodings are not decoded.
    pub encoding_offset: usize,
    pub charstrings_offset: usize,
    pub private_dict_range: Option<Range<usize>>,
    /// True for CID-keyed fonts, whose charset maps to CIDs rather than SIDs.
    pub is_cid: bool,
}

impl TopDict {
    pub fn parse(dict_data: &[u8]) -> Result<Self, Error> {
        Self::new(&Dict::parse(dict_data)?)
    }

    pub fn new(dict: &Dict) -> Result<Self, Error> {
        let charstrings_offset = dict
            .offset(op::CHARSTRINGS)?
            .ok_or(Error::MissingDictEntry(op::CHARSTRINGS))?;
        let private_dict_range = match dict.array(op::PRIVATE) {
            Some([size, offset]) => {
                let (size, start) = (size.to_offset()?, offset.to_offset()?);
                let end = start.checked_add(size).ok_or(ReadError::OutOfBounds)?;
                Some(start..end)
            }
            Some(_) => return Err(Error::InvalidDictOperandCount(op::PRIVATE)),
            None => None,
        };
        Ok(Self {
            version: dict.sid(op::VERSION),
            notice: dict.sid(op::NOTICE),
            copyright: dict.sid(op::COPYRIGHT),
            full_name: dict.sid(op::FULL_NAME),
            family_name: dict.sid(op::FAMILY_NAME),
            weight: dict.sid(op::WEIGHT),
            is_fixed_pitch: dict.number(op::IS_FIXED_PITCH).map(Number::to_i32) == Some(1),
            italic_angle: dict.f64_or(op::ITALIC_ANGLE, 0.0),
            underline_position: dict.f64_or(op::UNDERLINE_POSITION, -100.0),
            underline_thickness: dict.f64_or(op::UNDERLINE_THICKNESS, 50.0),
            paint_type: dict.number(op::PAINT_TYPE).map_or(0, Number::to_i32),
            charstring_type: dict.number(op::CHARSTRING_TYPE).map_or(2, Number::to_i32),
            font_matrix: dict
                .f64_array(op::FONT_MATRIX)
                .unwrap_or(DEFAULT_FONT_MATRIX),
            unique_id: dict.number(op::UNIQUE_ID).map(Number::to_i32),
            font_bbox: dict.f64_array(op::FONT_BBOX).unwrap_or_default(),
            stroke_width: dict.f64_or(op::STROKE_WIDTH, 0.0),
            charset_offset: dict.offset(op::CHARSET)?.unwrap_or(0),
            encoding_offset: dict.offset(op::ENCODING)?.unwrap_or(0),
            charstrings_offset,
            private_dict_range,
            is_cid: dict.get(op::ROS).is_some(),
        })
    }
}

/// The entries of a Private DICT, with defaults applied.
#[derive(Clone, PartialEq, Debug)]
pub struct PrivateDict {
    pub blue_values: Vec<f64>,
    pub other_blues: Vec<f64>,
    pub std_hw: Option<f64>,
    pub std_vw: Option<f64>,
    pub blue_scale: f64,
    pub blue_shift: f64,
    pub blue_fuzz: f64,
    /// Offset of the local subroutines, relative to the Private DICT.
    pub subrs_offset: Option<usize>,
    pub default_width_x: f64,
    pub nominal_width_x: f64,
}

impl PrivateDict {
    pub fn parse(dict_data: &[u8]) -> Result<Self, Error> {
        let dict = Dict::parse(dict_data)?;
        Ok(Self {
            blue_values: dict.delta_array(op::BLUE_VALUES),
            other_blues: dict.delta_array(op::OTHER_BLUES),
            std_hw: dict.number(op::STD_HW).map(Number::to_f64),
            std_vw: dict.number(op::STD_VW).map(Number::to_f64),
            blue_scale: dict.f64_or(op::BLUE_SCALE, 0.039625),
            blue_shift: dict.f64_or(op::BLUE_SHIFT, 7.0),
            blue_fuzz: dict.f64_or(op::BLUE_FUZZ, 1.0),
            subrs_offset: dict.offset(op::SUBRS)?,
            default_width_x: dict.f64_or(op::DEFAULT_WIDTH_X, 0.0),
            nominal_width_x: dict.f64_or(op::NOMINAL_WIDTH_X, 0.0),
        })
    }
}

impl Default for PrivateDict {
    fn default() -> Self {
        Self {
            blue_values: Vec::new(),
            other_blues: Vec::new(),
            std_hw: None,
            std_vw: None,
            blue_scale: 0.039625,
            blue_shift: 7.0,
            blue_fuzz: 1.0,
            subrs_offset: None,
            default_width_x: 0.0,
            nominal_width_x: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::cff::{self, DictBuilder};

    fn operands(data: &[u8]) -> Vec<Number> {
        tokens(data)
            .map(|token| match token.unwrap() {
                Token::Operand(number) => number,
                Token::Operator(op) => panic!("unexpected operator {op}"),
            })
            .collect()
    }

    #[test]
    fn integer_forms() {
        let mut data = Vec::new();
        for value in [0, 107, -107, 108, -108, 1131, -1131, 2000, -32768, 100_000] {
            data.extend(cff::int(value));
        }
        data.extend(cff::int32(7));
        assert_eq!(
            operands(&data),
            [0, 107, -107, 108, -108, 1131, -1131, 2000, -32768, 100_000, 7].map(Number::Integer)
        );
    }

    #[test]
    fn explicit_int_bytes() {
        assert_eq!(operands(&[139]), [Number::Integer(0)]);
        assert_eq!(operands(&[247, 0]), [Number::Integer(108)]);
        assert_eq!(operands(&[251, 0]), [Number::Integer(-108)]);
        assert_eq!(operands(&[28, 0xFF, 0xFF]), [Number::Integer(-1)]);
        assert_eq!(
            operands(&[29, 0x80, 0, 0, 0]),
            [Number::Integer(i32::MIN)]
        );
    }

    #[test]
    fn real_nibbles() {
        // E 1 2 A 5 F
        assert_eq!(operands(&[30, 0xE1, 0x2A, 0x5F]), [Number::Real(-12.5)]);
        assert_eq!(operands(&cff::real("1E-3")), [Number::Real(0.001)]);
        assert_eq!(operands(&cff::real("2.5E2")), [Number::Real(250.0)]);
        assert_eq!(operands(&cff::real("0.001")), [Number::Real(0.001)]);
        // an empty nibble string is zero
        assert_eq!(operands(&[30, 0xFF]), [Number::Real(0.0)]);
        // reserved nibble d is skipped
        assert_eq!(operands(&[30, 0x1D, 0x2F]), [Number::Real(12.0)]);
    }

    #[test]
    fn bad_real() {
        // "E" alone is not a number
        assert_eq!(
            tokens(&[30, 0xBF]).next().unwrap(),
            Err(Error::InvalidNumber)
        );
        // no terminating nibble
        assert!(matches!(
            tokens(&[30, 0x12]).next().unwrap(),
            Err(Error::Read(ReadError::OutOfBounds))
        ));
    }

    #[test]
    fn operators() {
        let data = [cff::operator(op::CHARSTRINGS), cff::operator(op::FONT_MATRIX)].concat();
        let ops: Vec<_> = tokens(&data).map(Result::unwrap).collect();
        assert_eq!(
            ops,
            [Token::Operator(17), Token::Operator(0x0C07)]
        );
        assert_eq!(operator_name(0x0C07), Some("FontMatrix"));
        assert_eq!(operator_name(0x0CFF), None);
    }

    #[test]
    fn reserved_operators() {
        for b0 in [22u8, 27, 31, 255] {
            assert_eq!(
                tokens(&[b0]).next().unwrap(),
                Err(Error::InvalidDictOperator(b0))
            );
        }
    }

    #[test]
    fn single_and_list_operands() {
        let data = DictBuilder::new()
            .entry(op::CHARSTRINGS, &[1234])
            .entry(op::FONT_BBOX, &[-10, -20, 500, 700])
            .entry(op::PRIVATE, &[30, 2000])
            .build();
        let dict = Dict::parse(&data).unwrap();
        assert_eq!(
            dict.get(op::CHARSTRINGS),
            Some(&Operands::Single(Number::Integer(1234)))
        );
        assert_eq!(
            dict.get(op::FONT_BBOX),
            Some(&Operands::List(
                [-10, -20, 500, 700].map(Number::Integer).to_vec()
            ))
        );
        assert_eq!(dict.number(op::CHARSTRINGS), Some(Number::Integer(1234)));
        assert_eq!(dict.array(op::PRIVATE).unwrap().len(), 2);
        assert!(dict.get(op::CHARSET).is_none());
        assert_eq!(dict.entries().len(), 3);
    }

    #[test]
    fn too_many_operands() {
        let operands: Vec<i32> = (0..49).collect();
        let data = DictBuilder::new().entry(op::BLUE_VALUES, &operands).build();
        assert_eq!(Dict::parse(&data), Err(Error::StackOverflow));
    }

    #[test]
    fn trailing_operands() {
        // charstrings at 100, then two stray operands
        assert_eq!(
            Dict::parse(&[239, 17, 139, 140]),
            Err(Error::MissingDictOperator)
        );
        assert!(Dict::parse(&[239, 17]).is_ok());
    }

    #[test]
    fn top_dict_defaults() {
        let data = DictBuilder::new()
            .entry(op::FULL_NAME, &[391])
            .entry(op::CHARSTRINGS, &[100])
            .entry(op::PRIVATE, &[12, 300])
            .build();
        let top = TopDict::parse(&data).unwrap();
        assert_eq!(top.full_name, Some(StringId::new(391)));
        assert_eq!(top.charstrings_offset, 100);
        assert_eq!(top.private_dict_range, Some(300..312));
        assert_eq!(top.charset_offset, 0);
        assert_eq!(top.encoding_offset, 0);
        assert_eq!(top.charstring_type, 2);
        assert_eq!(top.font_matrix, DEFAULT_FONT_MATRIX);
        assert_eq!(top.underline_position, -100.0);
        assert!(!top.is_cid);
    }

    #[test]
    fn top_dict_font_matrix() {
        let mut matrix = Vec::new();
        for operand in ["0.0005", "0", "0", "0.0005", "0", "0"] {
            matrix.extend(cff::real(operand));
        }
        let data = DictBuilder::new()
            .raw_entry(op::FONT_MATRIX, &matrix)
            .entry(op::CHARSTRINGS, &[1])
            .entry(op::ROS, &[391, 392, 0])
            .build();
        let top = TopDict::parse(&data).unwrap();
        assert_eq!(top.font_matrix, [0.0005, 0.0, 0.0, 0.0005, 0.0, 0.0]);
        assert!(top.is_cid);
    }

    #[test]
    fn top_dict_requires_charstrings() {
        let data = DictBuilder::new().entry(op::CHARSET, &[0]).build();
        assert_eq!(
            TopDict::parse(&data),
            Err(Error::MissingDictEntry(op::CHARSTRINGS))
        );
    }

    #[test]
    fn private_needs_size_and_offset() {
        for operands in [&[300][..], &[12, 300, 4][..]] {
            let data = DictBuilder::new()
                .entry(op::CHARSTRINGS, &[100])
                .entry(op::PRIVATE, operands)
                .build();
            assert_eq!(
                TopDict::parse(&data),
                Err(Error::InvalidDictOperandCount(op::PRIVATE))
            );
        }
    }

    #[test]
    fn negative_offset() {
        let data = DictBuilder::new().entry(op::CHARSTRINGS, &[-5]).build();
        assert_eq!(
            TopDict::parse(&data),
            Err(Error::Read(ReadError::OutOfBounds))
        );
    }

    #[test]
    fn private_dict() {
        let data = DictBuilder::new()
            .entry(op::BLUE_VALUES, &[-15, 15, 485, 15])
            .entry(op::DEFAULT_WIDTH_X, &[500])
            .entry(op::NOMINAL_WIDTH_X, &[600])
            .entry(op::SUBRS, &[40])
            .build();
        let private = PrivateDict::parse(&data).unwrap();
        assert_eq!(private.blue_values, [-15.0, 0.0, 485.0, 500.0]);
        assert_eq!(private.default_width_x, 500.0);
        assert_eq!(private.nominal_width_x, 600.0);
        assert_eq!(private.subrs_offset, Some(40));
        assert_eq!(private.blue_scale, 0.039625);

        let empty = PrivateDict::parse(&[]).unwrap();
        assert_eq!(empty, PrivateDict::default());
    }
}
