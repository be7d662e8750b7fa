//! Encoders for the compact structures of CFF tables.

/// Encode items as an INDEX using the smallest offset size that fits.
pub fn index<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
    let data_len: usize = items.iter().map(|item| item.as_ref().len()).sum();
    let off_size = match data_len + 1 {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x10000..=0xFFFFFF => 3,
        _ => 4,
    };
    index_with_off_size(items, off_size)
}

/// Encode items as an INDEX with an explicit offset size.
pub fn index_with_off_size<T: AsRef<[u8]>>(items: &[T], off_size: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend((items.len() as u16).to_be_bytes());
    if items.is_empty() {
        return out;
    }
    out.push(off_size);
    let mut offset = 1u32;
    let push_offset = |out: &mut Vec<u8>, offset: u32| {
        out.extend(&offset.to_be_bytes()[4 - off_size as usize..]);
    };
    push_offset(&mut out, offset);
    for item in items {
        offset += item.as_ref().len() as u32;
        push_offset(&mut out, offset);
    }
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    out
}

/// Encode an integer DICT or charstring operand in its shortest form.
pub fn int(value: i32) -> Vec<u8> {
    match value {
        -107..=107 => vec![(value + 139) as u8],
        108..=1131 => {
            let v = value - 108;
            vec![((v >> 8) + 247) as u8, (v & 0xFF) as u8]
        }
        -1131..=-108 => {
            let v = -value - 108;
            vec![((v >> 8) + 251) as u8, (v & 0xFF) as u8]
        }
        -32768..=32767 => {
            let [a, b] = (value as i16).to_be_bytes();
            vec![28, a, b]
        }
        _ => int32(value),
    }
}

/// Encode a DICT operand in the fixed five byte form.
///
/// Useful for offsets, since the encoded size does not depend on the value.
pub fn int32(value: i32) -> Vec<u8> {
    let mut out = vec![29];
    out.extend(value.to_be_bytes());
    out
}

/// Encode a DICT real number operand from its decimal text.
pub fn real(text: &str) -> Vec<u8> {
    let mut nibbles = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let nibble = match c {
            '0'..='9' => c as u8 - b'0',
            '.' => 0xA,
            'E' | 'e' if chars.peek() == Some(&'-') => {
                chars.next();
                0xC
            }
            'E' | 'e' => 0xB,
            '-' => 0xE,
            _ => panic!("unexpected character '{c}' in real number"),
        };
        nibbles.push(nibble);
    }
    nibbles.push(0xF);
    if nibbles.len() % 2 == 1 {
        nibbles.push(0xF);
    }
    let mut out = vec![30];
    out.extend(nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]));
    out
}

/// Encode a DICT operator; escaped operators are passed as `0x0C00 | b`.
pub fn operator(op: u16) -> Vec<u8> {
    if op >> 8 == 12 {
        vec![12, op as u8]
    } else {
        vec![op as u8]
    }
}

/// Accumulates DICT entries.
#[derive(Clone, Debug, Default)]
pub struct DictBuilder {
    data: Vec<u8>,
}

impl DictBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An entry with integer operands in their shortest encoding.
    pub fn entry(mut self, op: u16, operands: &[i32]) -> Self {
        for operand in operands {
            self.data.extend(int(*operand));
        }
        self.data.extend(operator(op));
        self
    }

    /// An entry with operands in the fixed five byte encoding.
    pub fn entry32(mut self, op: u16, operands: &[i32]) -> Self {
        for operand in operands {
            self.data.extend(int32(*operand));
        }
        self.data.extend(operator(op));
        self
    }

    /// An entry with pre-encoded operand bytes.
    pub fn raw_entry(mut self, op: u16, operands: &[u8]) -> Self {
        self.data.extend_from_slice(operands);
        self.data.extend(operator(op));
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Type 2 charstring operators.
pub mod op {
    pub const HSTEM: u8 = 1;
    pub const VSTEM: u8 = 3;
    pub const VMOVETO: u8 = 4;
    pub const RLINETO: u8 = 5;
    pub const HLINETO: u8 = 6;
    pub const VLINETO: u8 = 7;
    pub const RRCURVETO: u8 = 8;
    pub const CALLSUBR: u8 = 10;
    pub const RETURN: u8 = 11;
    pub const ESCAPE: u8 = 12;
    pub const ENDCHAR: u8 = 14;
    pub const HSTEMHM: u8 = 18;
    pub const HINTMASK: u8 = 19;
    pub const CNTRMASK: u8 = 20;
    pub const RMOVETO: u8 = 21;
    pub const HMOVETO: u8 = 22;
    pub const VSTEMHM: u8 = 23;
    pub const RCURVELINE: u8 = 24;
    pub const RLINECURVE: u8 = 25;
    pub const VVCURVETO: u8 = 26;
    pub const HHCURVETO: u8 = 27;
    pub const CALLGSUBR: u8 = 29;
    pub const VHCURVETO: u8 = 30;
    pub const HVCURVETO: u8 = 31;
    // escaped
    pub const HFLEX: u8 = 34;
    pub const FLEX: u8 = 35;
    pub const HFLEX1: u8 = 36;
    pub const FLEX1: u8 = 37;
}

/// Builds a Type 2 charstring.
#[derive(Clone, Debug, Default)]
pub struct CharstringBuilder {
    data: Vec<u8>,
}

impl CharstringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push integer operands.
    pub fn args(mut self, values: &[i32]) -> Self {
        for value in values {
            self.data.extend(int(*value));
        }
        self
    }

    /// Push a 16.16 fixed point operand.
    pub fn fixed(mut self, value: f64) -> Self {
        self.data.push(255);
        self.data
            .extend(((value * 65536.0).round() as i32).to_be_bytes());
        self
    }

    /// Append an operator.
    pub fn op(mut self, op: u8) -> Self {
        self.data.push(op);
        self
    }

    /// Append an escaped operator.
    pub fn op2(mut self, op: u8) -> Self {
        self.data.extend([12, op]);
        self
    }

    /// Append raw bytes, e.g. the mask following a hintmask.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Operands followed by an operator.
    pub fn cmd(self, values: &[i32], op: u8) -> Self {
        self.args(values).op(op)
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// A charset as it is stored in the table.
#[derive(Clone, Debug)]
pub enum CharsetData {
    Format0(Vec<u16>),
    Format1(Vec<(u16, u8)>),
    Format2(Vec<(u16, u16)>),
}

impl CharsetData {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            CharsetData::Format0(sids) => {
                out.push(0);
                sids.iter().for_each(|sid| out.extend(sid.to_be_bytes()));
            }
            CharsetData::Format1(ranges) => {
                out.push(1);
                for (first, left) in ranges {
                    out.extend(first.to_be_bytes());
                    out.push(*left);
                }
            }
            CharsetData::Format2(ranges) => {
                out.push(2);
                for (first, left) in ranges {
                    out.extend(first.to_be_bytes());
                    out.extend(left.to_be_bytes());
                }
            }
        }
        out
    }
}

/// Assembles a complete, single font CFF table.
///
/// Layout: header, Name INDEX, Top DICT INDEX, String INDEX, Global Subr
/// INDEX, charset, CharStrings INDEX, Private DICT, local Subrs INDEX.
#[derive(Clone, Debug)]
pub struct CffBuilder {
    pub name: String,
    pub strings: Vec<String>,
    pub global_subrs: Vec<Vec<u8>>,
    pub local_subrs: Vec<Vec<u8>>,
    pub charstrings: Vec<Vec<u8>>,
    pub charset: Option<CharsetData>,
    pub default_width: i32,
    pub nominal_width: i32,
    /// Extra Top DICT entries written before the offsets.
    pub top_dict_extra: Vec<u8>,
}

impl CffBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            strings: Vec::new(),
            global_subrs: Vec::new(),
            local_subrs: Vec::new(),
            charstrings: Vec::new(),
            charset: None,
            default_width: 0,
            nominal_width: 0,
            top_dict_extra: Vec::new(),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let header = [1u8, 0, 4, 4];
        let name_index = index(&[self.name.as_bytes()]);
        let string_index = index(&self.strings);
        let gsubr_index = index(&self.global_subrs);
        let charset = self.charset.as_ref().map(CharsetData::encode);
        let charstrings = index(&self.charstrings);

        let mut private_dict = DictBuilder::new()
            .entry(20, &[self.default_width])
            .entry(21, &[self.nominal_width]);
        if !self.local_subrs.is_empty() {
            // the subrs offset is relative to the private dict and the
            // subrs follow it immediately, so the offset is its own size
            let without = private_dict.clone().entry32(19, &[0]).build().len();
            private_dict = private_dict.entry32(19, &[without as i32]);
        }
        let private_dict = private_dict.build();
        let local_subrs = if self.local_subrs.is_empty() {
            Vec::new()
        } else {
            index(&self.local_subrs)
        };

        let top_dict = |charset_offset: i32, charstrings_offset: i32, private_offset: i32| {
            let mut builder = DictBuilder {
                data: self.top_dict_extra.clone(),
            };
            if charset.is_some() {
                builder = builder.entry32(15, &[charset_offset]);
            }
            builder
                .entry32(17, &[charstrings_offset])
                .entry32(18, &[private_dict.len() as i32, private_offset])
                .build()
        };
        let top_dict_len = index(&[top_dict(0, 0, 0)]).len();
        let mut offset =
            header.len() + name_index.len() + top_dict_len + string_index.len() + gsubr_index.len();
        let charset_offset = offset;
        offset += charset.as_ref().map(Vec::len).unwrap_or(0);
        let charstrings_offset = offset;
        offset += charstrings.len();
        let private_offset = offset;

        let top_dict_index = index(&[top_dict(
            charset_offset as i32,
            charstrings_offset as i32,
            private_offset as i32,
        )]);
        let mut out = Vec::new();
        out.extend_from_slice(&header);
        out.extend(name_index);
        out.extend(top_dict_index);
        out.extend(string_index);
        out.extend(gsubr_index);
        if let Some(charset) = charset {
            out.extend(charset);
        }
        out.extend(charstrings);
        out.extend(private_dict);
        out.extend(local_subrs);
        out
    }
}
