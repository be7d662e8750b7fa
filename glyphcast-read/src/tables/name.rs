//! The [name (Naming)](https://docs.microsoft.com/en-us/typography/opentype/spec/name) table

use types::{BigEndian, FixedSize, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

pub use types::NameId;

/// `name`
pub const TAG: Tag = Tag::new(b"name");

/// Part of [Name]
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct NameRecord {
    platform_id: BigEndian<u16>,
    encoding_id: BigEndian<u16>,
    language_id: BigEndian<u16>,
    name_id: BigEndian<NameId>,
    length: BigEndian<u16>,
    string_offset: BigEndian<u16>,
}

impl FixedSize for NameRecord {
    const RAW_BYTE_LEN: usize = 6 * u16::RAW_BYTE_LEN;
}

/// Part of [Name], present in format 1 tables.
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct LangTagRecord {
    length: BigEndian<u16>,
    lang_tag_offset: BigEndian<u16>,
}

impl FixedSize for LangTagRecord {
    const RAW_BYTE_LEN: usize = 2 * u16::RAW_BYTE_LEN;
}

/// [Naming table version 1](https://docs.microsoft.com/en-us/typography/opentype/spec/name#naming-table-version-1)
#[derive(Clone, Copy)]
pub struct Name<'a> {
    version: u16,
    name_record: &'a [NameRecord],
    lang_tag_record: Option<&'a [LangTagRecord]>,
    string_data: FontData<'a>,
}

impl<'a> Name<'a> {
    /// Table version number (0 or 1)
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The name records, in storage order.
    pub fn name_record(&self) -> &'a [NameRecord] {
        self.name_record
    }

    /// The language-tag records (version 1 only).
    pub fn lang_tag_record(&self) -> Option<&'a [LangTagRecord]> {
        self.lang_tag_record
    }

    /// The FontData containing the encoded name strings.
    pub fn string_data(&self) -> FontData<'a> {
        self.string_data
    }
}

impl TopLevelTable for Name<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Name<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version > 1 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let count: u16 = cursor.read()?;
        let storage_offset: u16 = cursor.read()?;
        let name_record = cursor.read_array(count as usize)?;
        let lang_tag_record = if version == 1 {
            let lang_tag_count: u16 = cursor.read()?;
            Some(cursor.read_array(lang_tag_count as usize)?)
        } else {
            None
        };
        let string_data = data
            .split_off(storage_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(Name {
            version,
            name_record,
            lang_tag_record,
            string_data,
        })
    }
}

impl std::fmt::Debug for Name<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let records: Vec<_> = self
            .name_record
            .iter()
            .map(|record| {
                (
                    record.platform_id(),
                    record.encoding_id(),
                    record.language_id(),
                    record.name_id(),
                    record.string(self.string_data),
                )
            })
            .collect();
        f.debug_struct("Name")
            .field("version", &self.version)
            .field("name_record", &records)
            .finish()
    }
}

impl NameRecord {
    record_getters! { self;
        /// Platform ID.
        platform_id: u16,
        /// Platform-specific encoding ID.
        encoding_id: u16,
        /// Language ID.
        language_id: u16,
        /// Name ID.
        name_id: NameId,
        /// String length (in bytes).
        length: u16,
        /// String offset from start of storage area (in bytes).
        string_offset: u16,
    }

    /// Return a type that can decode the string data for this name entry.
    pub fn string<'a>(&self, data: FontData<'a>) -> Result<NameString<'a>, ReadError> {
        let start = self.string_offset() as usize;
        let end = start + self.length() as usize;

        let data = data
            .as_bytes()
            .get(start..end)
            .ok_or(ReadError::OutOfBounds)?;

        let encoding = Encoding::new(self.platform_id(), self.encoding_id());
        Ok(NameString { data, encoding })
    }

    // reference from fonttools:
    // https://github.com/fonttools/fonttools/blob/c2119229cfb02cdb7c5a63374ef29d3d514259e8/Lib/fontTools/ttLib/tables/_n_a_m_e.py#L509
    pub fn is_unicode(&self) -> bool {
        self.platform_id() == 0
            || (self.platform_id() == 3 && [0, 1, 10].contains(&self.encoding_id()))
    }
}

impl LangTagRecord {
    record_getters! { self;
        /// Language-tag string length (in bytes)
        length: u16,
        /// Language-tag string offset from start of storage area (in bytes).
        lang_tag_offset: u16,
    }

    /// Return a type that can decode the string data for this name entry.
    pub fn lang_tag<'a>(&self, data: FontData<'a>) -> Result<NameString<'a>, ReadError> {
        let start = self.lang_tag_offset() as usize;
        let end = start + self.length() as usize;

        let data = data
            .as_bytes()
            .get(start..end)
            .ok_or(ReadError::OutOfBounds)?;

        let encoding = Encoding::Utf16Be;
        Ok(NameString { data, encoding })
    }
}

/// Entry for a name in the naming table.
///
/// This provides an iterator over characters.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct NameString<'a> {
    data: &'a [u8],
    encoding: Encoding,
}

impl<'a> NameString<'a> {
    /// An iterator over the `char`s in this name.
    pub fn chars(&self) -> CharIter<'a> {
        CharIter {
            data: self.data,
            encoding: self.encoding,
            pos: 0,
        }
    }

    /// The encoding of the raw bytes.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// `false` if this string's encoding cannot be decoded.
    pub fn is_decodable(&self) -> bool {
        self.encoding != Encoding::Unknown
    }
}

impl<'a> IntoIterator for NameString<'a> {
    type Item = char;
    type IntoIter = CharIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.chars()
    }
}

impl std::fmt::Display for NameString<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for c in self.chars() {
            c.fmt(f)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for NameString<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// An iterator over the chars of a name record.
#[derive(Clone)]
pub struct CharIter<'a> {
    data: &'a [u8],
    encoding: Encoding,
    pos: usize,
}

impl CharIter<'_> {
    fn bump_u16(&mut self) -> Option<u16> {
        let bytes = self.data.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn bump_u8(&mut self) -> Option<u8> {
        let result = self.data.get(self.pos)?;
        self.pos += 1;
        Some(*result)
    }
}

impl Iterator for CharIter<'_> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rep = core::char::REPLACEMENT_CHARACTER;
        let raw_c = match self.encoding {
            Encoding::Utf16Be => {
                let Some(c1) = self.bump_u16() else {
                    // odd trailing byte
                    self.pos = self.data.len();
                    return Some(rep);
                };
                let c1 = c1 as u32;
                if (0xD800..0xDC00).contains(&c1) {
                    let Some(c2) = self.bump_u16() else {
                        return Some(rep);
                    };
                    ((c1 & 0x3FF) << 10) + (c2 as u32 & 0x3FF) + 0x10000
                } else {
                    c1
                }
            }
            Encoding::MacRoman => {
                let c = self.bump_u8()?;
                return Some(MacRomanMapping.decode(c));
            }
            Encoding::Unknown => return None,
        };
        Some(std::char::from_u32(raw_c).unwrap_or(rep))
    }
}

/// The encoding used by the name table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    Utf16Be,
    MacRoman,
    Unknown,
}

impl Encoding {
    /// Determine the coding from the platform and encoding id.
    pub fn new(platform_id: u16, encoding_id: u16) -> Encoding {
        match (platform_id, encoding_id) {
            (0, _) => Encoding::Utf16Be,
            (1, 0) => Encoding::MacRoman,
            (3, 0) => Encoding::Utf16Be,
            (3, 1) => Encoding::Utf16Be,
            (3, 10) => Encoding::Utf16Be,
            _ => Encoding::Unknown,
        }
    }
}

/// Decodes Mac OS Roman bytes.
pub struct MacRomanMapping;

impl MacRomanMapping {
    const START_REMAP: u8 = 128;

    /// Convert from a mac-roman encoded byte to a `char`
    pub fn decode(self, raw: u8) -> char {
        if raw < Self::START_REMAP {
            raw as char
        } else {
            let idx = raw - Self::START_REMAP;
            char::from_u32(MAC_ROMAN_DECODE[idx as usize] as u32)
                .unwrap_or(core::char::REPLACEMENT_CHARACTER)
        }
    }
}

/// a lookup table for the Mac Roman encoding. this matches the values 128..=255
/// to specific unicode values.
#[rustfmt::skip]
static MAC_ROMAN_DECODE: [u16; 128] = [
    196, 197, 199, 201, 209, 214, 220, 225, 224, 226, 228, 227, 229, 231, 233,
    232, 234, 235, 237, 236, 238, 239, 241, 243, 242, 244, 246, 245, 250, 249,
    251, 252, 8224, 176, 162, 163, 167, 8226, 182, 223, 174, 169, 8482, 180,
    168, 8800, 198, 216, 8734, 177, 8804, 8805, 165, 181, 8706, 8721, 8719,
    960, 8747, 170, 186, 937, 230, 248, 191, 161, 172, 8730, 402, 8776, 8710,
    171, 187, 8230, 160, 192, 195, 213, 338, 339, 8211, 8212, 8220, 8221, 8216,
    8217, 247, 9674, 255, 376, 8260, 8364, 8249, 8250, 64257, 64258, 8225, 183,
    8218, 8222, 8240, 194, 202, 193, 203, 200, 205, 206, 207, 204, 211, 212,
    63743, 210, 218, 219, 217, 305, 710, 732, 175, 728, 729, 730, 184, 733,
    731, 711,
];
