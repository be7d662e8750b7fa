//! Assembling tables into sfnt containers.

use glyphcast_types::Tag;

/// Collects tables and writes them out behind a table directory.
///
/// Records are written sorted by tag, tables are padded to four bytes and
/// checksums are filled in. The search parameters are derived from the
/// number of tables unless overridden.
#[derive(Clone, Debug)]
pub struct SfntBuilder {
    sfnt_version: u32,
    tables: Vec<(Tag, Vec<u8>)>,
    sorted: bool,
}

impl SfntBuilder {
    pub fn new(sfnt_version: u32) -> Self {
        Self {
            sfnt_version,
            tables: Vec::new(),
            sorted: true,
        }
    }

    /// Add (or replace) the table with this tag.
    pub fn add_table(mut self, tag: Tag, data: impl Into<Vec<u8>>) -> Self {
        self.tables.retain(|(existing, _)| *existing != tag);
        self.tables.push((tag, data.into()));
        self
    }

    /// Drop the table with this tag, if present.
    pub fn remove_table(mut self, tag: Tag) -> Self {
        self.tables.retain(|(existing, _)| *existing != tag);
        self
    }

    /// Keep the records in insertion order instead of sorting them.
    pub fn unsorted(mut self) -> Self {
        self.sorted = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tables = self.tables.clone();
        if self.sorted {
            tables.sort_by_key(|(tag, _)| *tag);
        }
        let num_tables = tables.len() as u16;
        let (search_range, entry_selector, range_shift) = search_params(num_tables);
        let mut out = Vec::new();
        out.extend(self.sfnt_version.to_be_bytes());
        out.extend(num_tables.to_be_bytes());
        out.extend(search_range.to_be_bytes());
        out.extend(entry_selector.to_be_bytes());
        out.extend(range_shift.to_be_bytes());

        let mut offset = 12 + 16 * tables.len();
        for (tag, data) in &tables {
            out.extend(tag.to_be_bytes());
            out.extend(checksum(data).to_be_bytes());
            out.extend((offset as u32).to_be_bytes());
            out.extend((data.len() as u32).to_be_bytes());
            offset += padded_len(data.len());
        }
        for (_, data) in &tables {
            out.extend_from_slice(data);
            out.resize(padded_len(out.len()), 0);
        }
        out
    }

    /// Combine complete fonts into a TrueType collection.
    ///
    /// Each member's table offsets are rebased so they are relative to the
    /// start of the collection.
    pub fn collection(fonts: &[Vec<u8>]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(b"ttcf");
        out.extend(1u16.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend((fonts.len() as u32).to_be_bytes());
        let mut offset = padded_len(12 + 4 * fonts.len());
        for font in fonts {
            out.extend((offset as u32).to_be_bytes());
            offset += padded_len(font.len());
        }
        out.resize(padded_len(out.len()), 0);
        for font in fonts {
            let base = out.len();
            out.extend_from_slice(font);
            out.resize(padded_len(out.len()), 0);
            let num_tables = u16::from_be_bytes([font[4], font[5]]) as usize;
            for i in 0..num_tables {
                let pos = base + 12 + 16 * i + 8;
                let old = u32::from_be_bytes([out[pos], out[pos + 1], out[pos + 2], out[pos + 3]]);
                let new = old + base as u32;
                out[pos..pos + 4].copy_from_slice(&new.to_be_bytes());
            }
        }
        out
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

fn search_params(num_tables: u16) -> (u16, u16, u16) {
    if num_tables == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = (1u16 << entry_selector) * 16;
    let range_shift = num_tables * 16 - search_range;
    (search_range, entry_selector, range_shift)
}

/// The sfnt table checksum: the wrapping sum of big-endian u32 words.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0u32, u32::wrapping_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_sorted_and_padded() {
        let font = SfntBuilder::new(0x00010000)
            .add_table(Tag::new(b"zzzz"), vec![1, 2, 3])
            .add_table(Tag::new(b"aaaa"), vec![4; 5])
            .build();
        assert_eq!(&font[12..16], b"aaaa");
        assert_eq!(&font[28..32], b"zzzz");
        // 12 byte header, 2 records, 8 bytes for aaaa, 4 for zzzz
        assert_eq!(font.len(), 12 + 32 + 8 + 4);
    }

    #[test]
    fn collection_rebases_offsets() {
        let font = SfntBuilder::new(0x00010000)
            .add_table(Tag::new(b"test"), vec![9; 4])
            .build();
        let ttc = SfntBuilder::collection(&[font.clone(), font.clone()]);
        let second = u32::from_be_bytes([ttc[16], ttc[17], ttc[18], ttc[19]]) as usize;
        let table_offset = u32::from_be_bytes([
            ttc[second + 20],
            ttc[second + 21],
            ttc[second + 22],
            ttc[second + 23],
        ]) as usize;
        assert_eq!(&ttc[table_offset..table_offset + 4], &[9; 4]);
    }
}
