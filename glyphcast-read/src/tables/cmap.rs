//! The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap) table

use std::ops::Range;

use types::{BigEndian, FixedSize, GlyphId, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// `cmap`
pub const TAG: Tag = Tag::new(b"cmap");

/// Encoding records tried first by [`Cmap::map_codepoint`], most preferred
/// first: Windows full repertoire, Unicode full repertoire, Windows BMP,
/// Unicode BMP.
pub const PREFERRED_ENCODINGS: [(u16, u16); 4] = [(3, 10), (0, 4), (3, 1), (0, 3)];

/// The largest Unicode scalar value.
const MAX_CODEPOINT: u32 = 0x10FFFF;

/// [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#overview)
#[derive(Clone, Copy)]
pub struct Cmap<'a> {
    data: FontData<'a>,
    encoding_records: &'a [EncodingRecord],
}

/// [Encoding Record](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#encoding-records-and-encodings)
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct EncodingRecord {
    platform_id: BigEndian<u16>,
    encoding_id: BigEndian<u16>,
    subtable_offset: BigEndian<u32>,
}

impl FixedSize for EncodingRecord {
    const RAW_BYTE_LEN: usize = 8;
}

impl EncodingRecord {
    record_getters! { self;
        /// Platform ID.
        platform_id: u16,
        /// Platform-specific encoding ID.
        encoding_id: u16,
        /// Byte offset from beginning of the cmap table to the subtable.
        subtable_offset: u32,
    }

    /// Resolve the subtable, given the cmap table data.
    pub fn subtable<'a>(&self, cmap_data: FontData<'a>) -> Result<CmapSubtable<'a>, ReadError> {
        let data = cmap_data
            .split_off(self.subtable_offset() as usize)
            .ok_or(ReadError::OutOfBounds)?;
        CmapSubtable::read(data)
    }
}

impl<'a> Cmap<'a> {
    /// Table version number (0).
    pub fn version(&self) -> u16 {
        0
    }

    pub fn encoding_records(&self) -> &'a [EncodingRecord] {
        self.encoding_records
    }

    /// The data that subtable offsets are relative to.
    pub fn offset_data(&self) -> FontData<'a> {
        self.data
    }

    /// Encoding records in lookup order: the preferred encodings first, then
    /// the rest in record order.
    pub fn records_by_preference(&self) -> impl Iterator<Item = &'a EncodingRecord> + 'a {
        let records = self.encoding_records;
        let rank = |record: &EncodingRecord| {
            PREFERRED_ENCODINGS
                .iter()
                .position(|ids| *ids == (record.platform_id(), record.encoding_id()))
                .unwrap_or(PREFERRED_ENCODINGS.len())
        };
        let mut ordered: Vec<_> = records.iter().collect();
        // stable, so ties keep record order
        ordered.sort_by_key(|record| rank(*record));
        ordered.into_iter()
    }

    /// Map a codepoint to a nominal glyph identifier
    ///
    /// This uses the first available subtable that provides a valid mapping,
    /// trying the preferred encodings first. Subtables that fail to parse or
    /// use an unsupported format are skipped, as are mappings to `.notdef`.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        self.records_by_preference()
            .filter_map(|record| record.subtable(self.data).ok())
            .find_map(|subtable| {
                subtable
                    .map_codepoint(codepoint)
                    .filter(|gid| *gid != GlyphId::NOTDEF)
            })
    }

    /// The most preferred subtable that parses.
    pub fn best_subtable(&self) -> Option<(&'a EncodingRecord, CmapSubtable<'a>)> {
        self.records_by_preference()
            .find_map(|record| Some((record, record.subtable(self.data).ok()?)))
    }
}

impl TopLevelTable for Cmap<'_> {
    const TAG: Tag = TAG;
}

impl<'a> FontRead<'a> for Cmap<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version != 0 {
            return Err(ReadError::InvalidFormat(version as i64));
        }
        let num_tables: u16 = cursor.read()?;
        let encoding_records = cursor.read_array(num_tables as usize)?;
        Ok(Cmap {
            data,
            encoding_records,
        })
    }
}

impl std::fmt::Debug for Cmap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let records: Vec<_> = self
            .encoding_records
            .iter()
            .map(|record| {
                (
                    record.platform_id(),
                    record.encoding_id(),
                    record.subtable(self.data).map(|sub| sub.format()),
                )
            })
            .collect();
        f.debug_struct("Cmap")
            .field("encoding_records", &records)
            .finish()
    }
}

/// A character mapping subtable.
#[derive(Clone, Debug)]
pub enum CmapSubtable<'a> {
    Format0(Cmap0<'a>),
    Format4(Cmap4<'a>),
    Format6(Cmap6<'a>),
    Format12(Cmap12<'a>),
    Format13(Cmap13<'a>),
}

impl<'a> CmapSubtable<'a> {
    pub fn format(&self) -> u16 {
        match self {
            Self::Format0(_) => 0,
            Self::Format4(_) => 4,
            Self::Format6(_) => 6,
            Self::Format12(_) => 12,
            Self::Format13(_) => 13,
        }
    }

    /// Maps a codepoint to a nominal glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        match self {
            Self::Format0(table) => table.map_codepoint(codepoint),
            Self::Format4(table) => table.map_codepoint(codepoint),
            Self::Format6(table) => table.map_codepoint(codepoint),
            Self::Format12(table) => table.map_codepoint(codepoint),
            Self::Format13(table) => table.map_codepoint(codepoint),
        }
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable, skipping those mapped to `.notdef`.
    pub fn iter(&self) -> CmapSubtableIter<'a> {
        match self {
            Self::Format0(table) => CmapSubtableIter::Indexed(IndexedIter {
                first_code: 0,
                glyphs: IndexedGlyphs::Bytes(table.glyph_id_array),
                pos: 0,
            }),
            Self::Format4(table) => CmapSubtableIter::Format4(table.iter()),
            Self::Format6(table) => CmapSubtableIter::Indexed(IndexedIter {
                first_code: table.first_code as u32,
                glyphs: IndexedGlyphs::Words(table.glyph_id_array),
                pos: 0,
            }),
            Self::Format12(table) => CmapSubtableIter::Groups(GroupsIter::new(table.groups, false)),
            Self::Format13(table) => CmapSubtableIter::Groups(GroupsIter::new(table.groups, true)),
        }
    }
}

impl<'a> FontRead<'a> for CmapSubtable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            0 => Cmap0::read(data).map(Self::Format0),
            4 => Cmap4::read(data).map(Self::Format4),
            6 => Cmap6::read(data).map(Self::Format6),
            12 => Cmap12::read(data).map(Self::Format12),
            13 => Cmap13::read(data).map(Self::Format13),
            other => Err(ReadError::InvalidFormat(other as i64)),
        }
    }
}

/// [cmap Format 0](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-0-byte-encoding-table): Byte encoding table
#[derive(Clone, Debug)]
pub struct Cmap0<'a> {
    language: u16,
    glyph_id_array: &'a [u8],
}

impl<'a> Cmap0<'a> {
    pub fn language(&self) -> u16 {
        self.language
    }

    /// An array that maps character codes to glyph index values.
    pub fn glyph_id_array(&self) -> &'a [u8] {
        self.glyph_id_array
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let idx = usize::try_from(codepoint.into()).ok()?;
        self.glyph_id_array
            .get(idx)
            .map(|gid| GlyphId::new(*gid as u32))
    }
}

impl<'a> FontRead<'a> for Cmap0<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let _format: u16 = cursor.read()?;
        let _length: u16 = cursor.read()?;
        let language = cursor.read()?;
        let glyph_id_array = cursor.read_array(256)?;
        Ok(Cmap0 {
            language,
            glyph_id_array,
        })
    }
}

/// [cmap Format 4](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values): Segment mapping to delta values
#[derive(Clone)]
pub struct Cmap4<'a> {
    language: u16,
    seg_count_x2: u16,
    end_code: &'a [BigEndian<u16>],
    start_code: &'a [BigEndian<u16>],
    id_delta: &'a [BigEndian<i16>],
    id_range_offsets: &'a [BigEndian<u16>],
    glyph_id_array: &'a [BigEndian<u16>],
}

impl<'a> Cmap4<'a> {
    pub fn language(&self) -> u16 {
        self.language
    }

    /// 2 × segCount.
    pub fn seg_count_x2(&self) -> u16 {
        self.seg_count_x2
    }

    /// End characterCode for each segment, last=0xFFFF.
    pub fn end_code(&self) -> &'a [BigEndian<u16>] {
        self.end_code
    }

    /// Start character code for each segment.
    pub fn start_code(&self) -> &'a [BigEndian<u16>] {
        self.start_code
    }

    /// Delta for all character codes in segment.
    pub fn id_delta(&self) -> &'a [BigEndian<i16>] {
        self.id_delta
    }

    /// Offsets into glyphIdArray or 0
    pub fn id_range_offsets(&self) -> &'a [BigEndian<u16>] {
        self.id_range_offsets
    }

    /// Glyph index array (arbitrary length)
    pub fn glyph_id_array(&self) -> &'a [BigEndian<u16>] {
        self.glyph_id_array
    }

    /// Maps a codepoint to a nominal glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        if codepoint > 0xFFFF {
            return None;
        }
        let codepoint = codepoint as u16;
        let mut lo = 0;
        let mut hi = self.seg_count_x2 as usize / 2;
        while lo < hi {
            let i = (lo + hi) / 2;
            let start_code = self.start_code.get(i)?.get();
            if codepoint < start_code {
                hi = i;
            } else if codepoint > self.end_code.get(i)?.get() {
                lo = i + 1;
            } else {
                return self.lookup_glyph_id(codepoint, i, start_code);
            }
        }
        None
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable.
    pub fn iter(&self) -> Cmap4Iter<'a> {
        Cmap4Iter::new(self.clone())
    }

    /// Does the final phase of glyph id lookup.
    ///
    /// Shared between Self::map and Cmap4Iter.
    fn lookup_glyph_id(&self, codepoint: u16, index: usize, start_code: u16) -> Option<GlyphId> {
        let delta = self.id_delta.get(index)?.get() as i32;
        let range_offset = self.id_range_offsets.get(index)?.get() as usize;
        if range_offset == 0 {
            return Some(GlyphId::new((codepoint as i32 + delta) as u16 as u32));
        }
        // the offset is relative to the range offset's own position
        let mut offset = range_offset / 2 + (codepoint - start_code) as usize;
        offset = offset.checked_sub(self.id_range_offsets.len() - index)?;
        let gid = self.glyph_id_array.get(offset)?.get();
        (gid != 0).then_some(GlyphId::new((gid as i32 + delta) as u16 as u32))
    }

    /// Returns the [start_code, end_code] range at the given index.
    fn code_range(&self, index: usize) -> Option<Range<u32>> {
        // Extend to u32 to ensure we don't overflow on the end + 1 bound
        // below.
        let start = self.start_code.get(index)?.get() as u32;
        let end = self.end_code.get(index)?.get() as u32;
        // Use end + 1 here because the range in the table is inclusive
        Some(start..end + 1)
    }
}

impl<'a> FontRead<'a> for Cmap4<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let _format: u16 = cursor.read()?;
        let length: u16 = cursor.read()?;
        let language: u16 = cursor.read()?;
        let seg_count_x2: u16 = cursor.read()?;
        let seg_count = seg_count_x2 as usize / 2;
        // search range, entry selector, range shift
        cursor.advance_by(3 * u16::RAW_BYTE_LEN);
        let end_code = cursor.read_array(seg_count)?;
        let _reserved_pad: u16 = cursor.read()?;
        let start_code = cursor.read_array(seg_count)?;
        let id_delta = cursor.read_array(seg_count)?;
        let id_range_offsets = cursor.read_array(seg_count)?;
        // the glyph id array runs to the end of the subtable; some fonts
        // declare a length past the end of the data.
        let start = cursor.position()?;
        let end = (length as usize).clamp(start, data.len());
        let n_glyphs = (end - start) / u16::RAW_BYTE_LEN;
        let glyph_id_array =
            data.read_array(start..start + n_glyphs * u16::RAW_BYTE_LEN)?;
        Ok(Cmap4 {
            language,
            seg_count_x2,
            end_code,
            start_code,
            id_delta,
            id_range_offsets,
            glyph_id_array,
        })
    }
}

impl std::fmt::Debug for Cmap4<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmap4")
            .field("language", &self.language)
            .field("seg_count", &(self.seg_count_x2 / 2))
            .field("end_code", &self.end_code)
            .field("start_code", &self.start_code)
            .field("id_delta", &self.id_delta)
            .field("id_range_offsets", &self.id_range_offsets)
            .finish()
    }
}

/// Iterator over all (codepoint, glyph identifier) pairs in
/// the subtable.
#[derive(Clone)]
pub struct Cmap4Iter<'a> {
    subtable: Cmap4<'a>,
    cur_range: Range<u32>,
    cur_start_code: u16,
    cur_range_ix: usize,
}

impl<'a> Cmap4Iter<'a> {
    fn new(subtable: Cmap4<'a>) -> Self {
        let cur_range = subtable.code_range(0).unwrap_or_default();
        let cur_start_code = cur_range.start as u16;
        Self {
            subtable,
            cur_range,
            cur_start_code,
            cur_range_ix: 0,
        }
    }
}

impl Iterator for Cmap4Iter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(codepoint) = self.cur_range.next() {
                let Some(glyph_id) = self.subtable.lookup_glyph_id(
                    codepoint as u16,
                    self.cur_range_ix,
                    self.cur_start_code,
                ) else {
                    continue;
                };
                // The table might explicitly map some codepoints to 0. Avoid
                // returning those here.
                if glyph_id == GlyphId::NOTDEF {
                    continue;
                }
                return Some((codepoint, glyph_id));
            } else {
                self.cur_range_ix += 1;
                self.cur_range = self.subtable.code_range(self.cur_range_ix)?;
                self.cur_start_code = self.cur_range.start as u16;
            }
        }
    }
}

/// [cmap Format 6](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-6-trimmed-table-mapping): Trimmed table mapping
#[derive(Clone, Debug)]
pub struct Cmap6<'a> {
    language: u16,
    first_code: u16,
    glyph_id_array: &'a [BigEndian<u16>],
}

impl<'a> Cmap6<'a> {
    pub fn language(&self) -> u16 {
        self.language
    }

    /// First character code of subrange.
    pub fn first_code(&self) -> u16 {
        self.first_code
    }

    /// Array of glyph index values for character codes in the range.
    pub fn glyph_id_array(&self) -> &'a [BigEndian<u16>] {
        self.glyph_id_array
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let idx = codepoint.into().checked_sub(self.first_code as u32)?;
        self.glyph_id_array
            .get(idx as usize)
            .map(|gid| GlyphId::from(gid.get()))
    }
}

impl<'a> FontRead<'a> for Cmap6<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let _format: u16 = cursor.read()?;
        let _length: u16 = cursor.read()?;
        let language = cursor.read()?;
        let first_code = cursor.read()?;
        let entry_count: u16 = cursor.read()?;
        let glyph_id_array = cursor.read_array(entry_count as usize)?;
        Ok(Cmap6 {
            language,
            first_code,
            glyph_id_array,
        })
    }
}

/// Part of [Cmap12] and [Cmap13]
#[derive(Clone, Copy, Debug, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct SequentialMapGroup {
    start_char_code: BigEndian<u32>,
    end_char_code: BigEndian<u32>,
    start_glyph_id: BigEndian<u32>,
}

impl FixedSize for SequentialMapGroup {
    const RAW_BYTE_LEN: usize = 12;
}

impl SequentialMapGroup {
    record_getters! { self;
        /// First character code in this group.
        start_char_code: u32,
        /// Last character code in this group; same condition as listed
        /// for the start code.
        end_char_code: u32,
        /// Glyph index corresponding to the starting character code.
        start_glyph_id: u32,
    }

    /// The codepoints of the group, clamped to the Unicode range.
    fn code_range(&self) -> Range<u32> {
        let end = self.end_char_code().min(MAX_CODEPOINT);
        self.start_char_code()..end.saturating_add(1).max(self.start_char_code())
    }
}

fn read_groups<'a>(data: FontData<'a>) -> Result<(u32, &'a [SequentialMapGroup]), ReadError> {
    let mut cursor = data.cursor();
    let _format: u16 = cursor.read()?;
    let _reserved: u16 = cursor.read()?;
    let _length: u32 = cursor.read()?;
    let language: u32 = cursor.read()?;
    let num_groups: u32 = cursor.read()?;
    let groups = cursor.read_array(num_groups as usize)?;
    Ok((language, groups))
}

fn find_group(groups: &[SequentialMapGroup], codepoint: u32) -> Option<&SequentialMapGroup> {
    let mut lo = 0;
    let mut hi = groups.len();
    while lo < hi {
        let i = (lo + hi) / 2;
        let group = groups.get(i)?;
        if codepoint < group.start_char_code() {
            hi = i;
        } else if codepoint > group.end_char_code() {
            lo = i + 1;
        } else {
            return Some(group);
        }
    }
    None
}

/// [cmap Format 12](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-12-segmented-coverage): Segmented coverage
#[derive(Clone, Debug)]
pub struct Cmap12<'a> {
    language: u32,
    groups: &'a [SequentialMapGroup],
}

impl<'a> Cmap12<'a> {
    pub fn language(&self) -> u32 {
        self.language
    }

    /// Array of SequentialMapGroup records.
    pub fn groups(&self) -> &'a [SequentialMapGroup] {
        self.groups
    }

    /// Maps a codepoint to a nominal glyph identifier.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        let codepoint = codepoint.into();
        let group = find_group(self.groups, codepoint)?;
        Some(GlyphId::new(
            group
                .start_glyph_id()
                .wrapping_add(codepoint.wrapping_sub(group.start_char_code())),
        ))
    }
}

impl<'a> FontRead<'a> for Cmap12<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let (language, groups) = read_groups(data)?;
        Ok(Cmap12 { language, groups })
    }
}

/// [cmap Format 13](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-13-many-to-one-range-mappings): Many-to-one range mappings
///
/// Every codepoint in a group maps to the same glyph.
#[derive(Clone, Debug)]
pub struct Cmap13<'a> {
    language: u32,
    groups: &'a [SequentialMapGroup],
}

impl<'a> Cmap13<'a> {
    pub fn language(&self) -> u32 {
        self.language
    }

    pub fn groups(&self) -> &'a [SequentialMapGroup] {
        self.groups
    }

    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        find_group(self.groups, codepoint.into()).map(|group| GlyphId::new(group.start_glyph_id()))
    }
}

impl<'a> FontRead<'a> for Cmap13<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let (language, groups) = read_groups(data)?;
        Ok(Cmap13 { language, groups })
    }
}

/// Iterator over the mappings of any [CmapSubtable].
#[derive(Clone)]
pub enum CmapSubtableIter<'a> {
    Indexed(IndexedIter<'a>),
    Format4(Cmap4Iter<'a>),
    Groups(GroupsIter<'a>),
}

impl Iterator for CmapSubtableIter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Indexed(iter) => iter.next(),
            Self::Format4(iter) => iter.next(),
            Self::Groups(iter) => iter.next(),
        }
    }
}

#[derive(Clone)]
enum IndexedGlyphs<'a> {
    Bytes(&'a [u8]),
    Words(&'a [BigEndian<u16>]),
}

/// Iterator over the array-based formats 0 and 6.
#[derive(Clone)]
pub struct IndexedIter<'a> {
    first_code: u32,
    glyphs: IndexedGlyphs<'a>,
    pos: usize,
}

impl Iterator for IndexedIter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let gid = match self.glyphs {
                IndexedGlyphs::Bytes(bytes) => *bytes.get(self.pos)? as u32,
                IndexedGlyphs::Words(words) => words.get(self.pos)?.get() as u32,
            };
            let codepoint = self.first_code + self.pos as u32;
            self.pos += 1;
            if gid != 0 {
                return Some((codepoint, GlyphId::new(gid)));
            }
        }
    }
}

/// Iterator over the group-based formats 12 and 13.
#[derive(Clone)]
pub struct GroupsIter<'a> {
    groups: &'a [SequentialMapGroup],
    many_to_one: bool,
    cur_range: Range<u32>,
    cur_group_ix: usize,
}

impl<'a> GroupsIter<'a> {
    fn new(groups: &'a [SequentialMapGroup], many_to_one: bool) -> Self {
        let cur_range = groups
            .first()
            .map(SequentialMapGroup::code_range)
            .unwrap_or_default();
        Self {
            groups,
            many_to_one,
            cur_range,
            cur_group_ix: 0,
        }
    }
}

impl Iterator for GroupsIter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(codepoint) = self.cur_range.next() {
                let group = self.groups.get(self.cur_group_ix)?;
                let gid = if self.many_to_one {
                    group.start_glyph_id()
                } else {
                    group
                        .start_glyph_id()
                        .wrapping_add(codepoint - group.start_char_code())
                };
                if gid == 0 {
                    continue;
                }
                return Some((codepoint, GlyphId::new(gid)));
            } else {
                self.cur_group_ix += 1;
                self.cur_range = self.groups.get(self.cur_group_ix)?.code_range();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::{fonts, BeBuffer};

    fn gid(raw: u32) -> Option<GlyphId> {
        Some(GlyphId::new(raw))
    }

    #[test]
    fn map_codepoints() {
        let buf = fonts::cmap();
        let cmap = Cmap::read(FontData::new(&buf)).unwrap();
        assert_eq!(cmap.encoding_records().len(), 2);
        assert_eq!(cmap.map_codepoint(' '), gid(1));
        assert_eq!(cmap.map_codepoint('A'), gid(2));
        assert_eq!(cmap.map_codepoint('B'), gid(3));
        assert_eq!(cmap.map_codepoint('C'), None);
        // only in the format 12 subtable
        assert_eq!(cmap.map_codepoint(0x1F600u32), gid(2));
    }

    #[test]
    fn preference_order() {
        let buf = fonts::cmap();
        let cmap = Cmap::read(FontData::new(&buf)).unwrap();
        let order: Vec<_> = cmap
            .records_by_preference()
            .map(|record| (record.platform_id(), record.encoding_id()))
            .collect();
        assert_eq!(order, [(3, 10), (3, 1)]);
        let (record, subtable) = cmap.best_subtable().unwrap();
        assert_eq!(record.encoding_id(), 10);
        assert_eq!(subtable.format(), 12);
    }

    #[test]
    fn format4_lookup_and_iter() {
        let buf = fonts::cmap();
        let cmap = Cmap::read(FontData::new(&buf)).unwrap();
        let CmapSubtable::Format4(format4) = cmap.encoding_records()[0]
            .subtable(cmap.offset_data())
            .unwrap()
        else {
            panic!("expected format 4");
        };
        assert_eq!(format4.map_codepoint('B'), gid(3));
        assert_eq!(format4.map_codepoint(0x1F600u32), None);
        let mappings: Vec<_> = format4.iter().map(|(c, g)| (c, g.to_u32())).collect();
        assert_eq!(mappings, [(0x20, 1), (0x41, 2), (0x42, 3)]);
    }

    #[test]
    fn format12_iter() {
        let buf = fonts::cmap();
        let cmap = Cmap::read(FontData::new(&buf)).unwrap();
        let subtable = cmap.encoding_records()[1]
            .subtable(cmap.offset_data())
            .unwrap();
        let mappings: Vec<_> = subtable.iter().map(|(c, g)| (c, g.to_u32())).collect();
        assert_eq!(mappings, [(0x20, 1), (0x41, 2), (0x42, 3), (0x1F600, 2)]);
    }

    #[test]
    fn format0() {
        let mut glyphs = [0u8; 256];
        glyphs[b'a' as usize] = 7;
        let buf = BeBuffer::new()
            .extend([0u16, 262, 0])
            .extend_bytes(&glyphs);
        let subtable = CmapSubtable::read(FontData::new(&buf)).unwrap();
        assert_eq!(subtable.map_codepoint('a'), gid(7));
        assert_eq!(subtable.map_codepoint('b'), gid(0));
        assert_eq!(subtable.map_codepoint(0x100u32), None);
        assert_eq!(subtable.iter().collect::<Vec<_>>(), [(0x61, GlyphId::new(7))]);
    }

    #[test]
    fn format6() {
        let buf = BeBuffer::new().extend([6u16, 16, 0, 0x30, 3, 10, 0, 12]);
        let subtable = CmapSubtable::read(FontData::new(&buf)).unwrap();
        assert_eq!(subtable.map_codepoint('0'), gid(10));
        assert_eq!(subtable.map_codepoint('2'), gid(12));
        assert_eq!(subtable.map_codepoint('3'), None);
        assert_eq!(subtable.map_codepoint('/'), None);
        let codepoints: Vec<_> = subtable.iter().map(|(c, _)| c).collect();
        assert_eq!(codepoints, [0x30, 0x32]);
    }

    #[test]
    fn format13_many_to_one() {
        let buf = BeBuffer::new()
            .extend([13u16, 0])
            .extend([28u32, 0, 1])
            .extend([0x4E00u32, 0x4E02, 9]);
        let subtable = CmapSubtable::read(FontData::new(&buf)).unwrap();
        assert_eq!(subtable.map_codepoint(0x4E00u32), gid(9));
        assert_eq!(subtable.map_codepoint(0x4E02u32), gid(9));
        assert_eq!(subtable.iter().count(), 3);
    }

    #[test]
    fn unsupported_format() {
        let buf = BeBuffer::new().extend([2u16, 6, 0]);
        assert!(matches!(
            CmapSubtable::read(FontData::new(&buf)),
            Err(ReadError::InvalidFormat(2))
        ));
    }

    #[test]
    fn skips_unreadable_subtables() {
        // the preferred record points at a format 14 subtable
        let alphabet = fonts::cmap_alphabet();
        let subtable = alphabet.as_slice()[12..].to_vec();
        let buf = BeBuffer::new()
            .extend([0u16, 2])
            .extend([3u16, 10])
            .push(20u32)
            .extend([3u16, 1])
            .push(22u32)
            .extend([14u16])
            .extend_bytes(&subtable);
        let cmap = Cmap::read(FontData::new(&buf)).unwrap();
        assert_eq!(cmap.map_codepoint('Z'), gid(26));
    }
}
