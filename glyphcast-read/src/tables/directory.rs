//! The sfnt [table directory] and [TTC header].
//!
//! [table directory]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory
//! [TTC header]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#ttc-header

use types::{BigEndian, FixedSize, MajorMinor, Tag};

use crate::{FontData, FontRead, ReadError};

/// A record in the table directory.
#[derive(Clone, Debug, Copy, bytemuck::AnyBitPattern)]
#[repr(C)]
#[repr(packed)]
pub struct TableRecord {
    /// Table identifier.
    pub tag: BigEndian<Tag>,
    /// Checksum for the table.
    pub checksum: BigEndian<u32>,
    /// Offset from the tables origin.
    pub offset: BigEndian<u32>,
    /// Length of the table.
    pub length: BigEndian<u32>,
}

impl TableRecord {
    /// Table identifier.
    pub fn tag(&self) -> Tag {
        self.tag.get()
    }

    /// Checksum for the table.
    pub fn checksum(&self) -> u32 {
        self.checksum.get()
    }

    /// Offset from the tables origin.
    pub fn offset(&self) -> u32 {
        self.offset.get()
    }

    /// Length of the table.
    pub fn length(&self) -> u32 {
        self.length.get()
    }
}

impl FixedSize for TableRecord {
    const RAW_BYTE_LEN: usize = Tag::RAW_BYTE_LEN + 3 * u32::RAW_BYTE_LEN;
}

/// The binary search parameters stored in (or derived for) a directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchParams {
    /// Compute the parameters for a directory of `num_tables` 16-byte records.
    pub fn for_count(num_tables: u16) -> Self {
        if num_tables == 0 {
            return Self::default();
        }
        let entry_selector = 15 - num_tables.leading_zeros() as u16;
        let search_range = (1u32 << entry_selector) * 16;
        let range_shift = (num_tables as u32 * 16).saturating_sub(search_range);
        Self {
            search_range: search_range.min(u16::MAX as u32) as u16,
            entry_selector,
            range_shift: range_shift.min(u16::MAX as u32) as u16,
        }
    }
}

/// The [table directory](https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory)
#[derive(Clone)]
pub struct TableDirectory<'a> {
    sfnt_version: u32,
    search_params: SearchParams,
    table_records: &'a [TableRecord],
}

impl<'a> TableDirectory<'a> {
    /// Size of the fixed header preceding the records.
    pub const HEADER_LEN: usize = 12;

    /// 0x00010000, 'OTTO' or 'true'
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// Number of tables.
    pub fn num_tables(&self) -> u16 {
        self.table_records.len() as u16
    }

    /// The search parameters as stored in the font.
    ///
    /// These are informational only; lookups never rely on them.
    pub fn search_params(&self) -> SearchParams {
        self.search_params
    }

    /// The search parameters implied by the number of tables.
    pub fn computed_search_params(&self) -> SearchParams {
        SearchParams::for_count(self.num_tables())
    }

    /// Table records array, one for each top-level table in the font.
    pub fn table_records(&self) -> &'a [TableRecord] {
        self.table_records
    }

    pub(crate) fn is_sorted(&self) -> bool {
        self.table_records
            .windows(2)
            .all(|pair| pair[0].tag() < pair[1].tag())
    }
}

impl<'a> FontRead<'a> for TableDirectory<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let sfnt_version = cursor.read::<u32>()?;
        let num_tables = cursor.read::<u16>()?;
        let search_params = SearchParams {
            search_range: cursor.read()?,
            entry_selector: cursor.read()?,
            range_shift: cursor.read()?,
        };
        let table_records = cursor
            .read_array(num_tables as usize)
            .map_err(|_| ReadError::TruncatedDirectory { num_tables })?;
        Ok(TableDirectory {
            sfnt_version,
            search_params,
            table_records,
        })
    }
}

impl std::fmt::Debug for TableDirectory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDirectory")
            .field("sfnt_version", &format_args!("0x{:08X}", self.sfnt_version))
            .field("num_tables", &self.num_tables())
            .field("search_params", &self.search_params)
            .field("table_records", &self.table_records)
            .finish()
    }
}

/// [TTC Header](https://learn.microsoft.com/en-us/typography/opentype/spec/otff#ttc-header)
#[derive(Clone, Debug)]
pub struct TTCHeader<'a> {
    ttc_tag: Tag,
    version: MajorMinor,
    table_directory_offsets: &'a [BigEndian<u32>],
}

impl<'a> TTCHeader<'a> {
    /// Font Collection ID string: "ttcf"
    pub fn ttc_tag(&self) -> Tag {
        self.ttc_tag
    }

    /// Major/minor version of the TTC Header
    pub fn version(&self) -> MajorMinor {
        self.version
    }

    /// Number of fonts in TTC
    pub fn num_fonts(&self) -> u32 {
        self.table_directory_offsets.len() as u32
    }

    /// Array of offsets to the table directory for each font from the
    /// beginning of the file
    pub fn table_directory_offsets(&self) -> &'a [BigEndian<u32>] {
        self.table_directory_offsets
    }
}

impl<'a> FontRead<'a> for TTCHeader<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ttc_tag = cursor.read::<Tag>()?;
        let version = cursor.read::<MajorMinor>()?;
        let num_fonts = cursor.read::<u32>()?;
        let table_directory_offsets = cursor.read_array(num_fonts as usize)?;
        Ok(TTCHeader {
            ttc_tag,
            version,
            table_directory_offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_from_count() {
        assert_eq!(
            SearchParams::for_count(4),
            SearchParams {
                search_range: 64,
                entry_selector: 2,
                range_shift: 0
            }
        );
        assert_eq!(
            SearchParams::for_count(11),
            SearchParams {
                search_range: 128,
                entry_selector: 3,
                range_shift: 48
            }
        );
    }

    #[test]
    fn truncated_records() {
        let bytes = [
            0, 1, 0, 0, // sfnt version
            0, 2, // two tables
            0, 32, 0, 1, 0, 0, // search params
            b'h', b'e', b'a', b'd', 0, 0, 0, 0, 0, 0, 0, 28, 0, 0, 0, 54,
        ];
        assert!(matches!(
            TableDirectory::read(FontData::new(&bytes)),
            Err(ReadError::TruncatedDirectory { num_tables: 2 })
        ));
    }
}
