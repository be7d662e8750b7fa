//! Parsing for PostScript INDEX objects.
//!
//! See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=12>

use super::Error;
use crate::{FontData, FontRead, ReadError};

/// An array of variable length objects addressed through an offset table.
///
/// Offsets are validated when the INDEX is read, so every object returned
/// by [`Index::get`] lies inside the data blob.
#[derive(Clone, Copy, Default)]
pub struct Index<'a> {
    count: u16,
    off_size: u8,
    offsets: &'a [u8],
    data: &'a [u8],
}

impl<'a> Index<'a> {
    /// Creates a new index from the given data.
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        let mut cursor = FontData::new(data).cursor();
        let count: u16 = cursor.read()?;
        if count == 0 {
            return Ok(Self::default());
        }
        let off_size: u8 = cursor.read()?;
        if !(1..=4).contains(&off_size) {
            return Err(Error::InvalidIndexOffsetSize(off_size));
        }
        let offsets_len = (count as usize + 1) * off_size as usize;
        let offsets = cursor.read_array::<u8>(offsets_len)?;
        let mut index = Self {
            count,
            off_size,
            offsets,
            data: &[],
        };
        let mut prev = 0;
        for i in 0..=count as usize {
            let offset = index.get_offset(i)?;
            if offset < prev {
                return Err(Error::InvalidIndexOffsets);
            }
            prev = offset;
        }
        let blob = cursor.remaining().unwrap_or(FontData::EMPTY).as_bytes();
        index.data = blob.get(..prev).ok_or(Error::InvalidIndexOffsets)?;
        Ok(index)
    }

    /// Returns the number of objects in the index.
    pub fn count(&self) -> u32 {
        self.count as u32
    }

    /// Returns true if the index holds no objects.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Size of each entry in the offset array.
    pub fn off_size(&self) -> u8 {
        self.off_size
    }

    /// Computes a bias that is added to a subroutine operator in a
    /// charstring.
    ///
    /// See "Local/Global Subrs INDEXes" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=25>
    pub fn subr_bias(&self) -> i32 {
        let count = self.count();
        if count < 1240 {
            107
        } else if count < 33900 {
            1131
        } else {
            32768
        }
    }

    /// Returns the total size in bytes of the index.
    pub fn size_in_bytes(&self) -> usize {
        // 2 byte count + 1 byte off_size
        const HEADER_SIZE: usize = 3;
        // An empty CFF index contains only a 2 byte count field
        const EMPTY_SIZE: usize = 2;
        match self.count {
            0 => EMPTY_SIZE,
            _ => HEADER_SIZE + self.offsets.len() + self.data.len(),
        }
    }

    /// Returns the offset of the object at the given index, relative to the
    /// start of the data blob.
    pub fn get_offset(&self, index: usize) -> Result<usize, Error> {
        read_offset(index, self.count as usize, self.off_size, self.offsets)
    }

    /// Returns the data for the object at the given index.
    pub fn get(&self, index: usize) -> Result<&'a [u8], Error> {
        if index >= self.count as usize {
            return Err(ReadError::OutOfBounds.into());
        }
        self.data
            .get(self.get_offset(index)?..self.get_offset(index + 1)?)
            .ok_or(Error::InvalidIndexOffsets)
    }

    /// Returns an iterator over the objects in the index.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + 'a + Clone {
        let index = *self;
        (0..self.count as usize).filter_map(move |i| index.get(i).ok())
    }
}

impl<'a> FontRead<'a> for Index<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Index::new(data.as_bytes()).map_err(|e| match e {
            Error::Read(e) => e,
            _ => ReadError::MalformedData("invalid INDEX offsets"),
        })
    }
}

impl std::fmt::Debug for Index<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("count", &self.count)
            .field("off_size", &self.off_size)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Reads an offset which is encoded as a variable sized integer.
fn read_offset(
    index: usize,
    count: usize,
    offset_size: u8,
    offset_data: &[u8],
) -> Result<usize, Error> {
    // There are count + 1 entries in the offset array, and offsets are
    // relative to the byte preceding the object data, so the first is 1.
    if index > count {
        Err(ReadError::OutOfBounds)?;
    }
    let start = index * offset_size as usize;
    let bytes = offset_data
        .get(start..start + offset_size as usize)
        .ok_or(ReadError::OutOfBounds)?;
    if !(1..=4).contains(&offset_size) {
        return Err(Error::InvalidIndexOffsetSize(offset_size));
    }
    bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize)
        .checked_sub(1)
        .ok_or(Error::ZeroOffsetInIndex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::cff;

    // `count` objects, each `(i + 1) * 10` bytes of the value `i`
    fn make_items(count: usize) -> Vec<Vec<u8>> {
        (0..count).map(|i| vec![i as u8; (i + 1) * 10]).collect()
    }

    fn test_index(off_size: u8, count: usize) {
        let items = make_items(count);
        let buf = cff::index_with_off_size(&items, off_size);
        let index = Index::new(&buf).unwrap();
        assert_eq!(index.off_size(), off_size);
        assert_eq!(index.count(), count as u32);
        assert_eq!(index.size_in_bytes(), buf.len());
        for (i, item) in items.iter().enumerate() {
            let object = index.get(i).unwrap();
            assert_eq!(object, item.as_slice());
            assert_eq!(
                object.len(),
                index.get_offset(i + 1).unwrap() - index.get_offset(i).unwrap()
            );
        }
        assert!(index.get(count).is_err());
        assert_eq!(index.iter().count(), count);
    }

    #[test]
    fn offsize1_count4() {
        test_index(1, 4);
    }

    #[test]
    fn offsize2_count64() {
        test_index(2, 64);
    }

    #[test]
    fn offsize3_count128() {
        test_index(3, 128);
    }

    #[test]
    fn offsize4_count256() {
        test_index(4, 256);
    }

    #[test]
    fn empty_index() {
        let index = Index::new(&[0, 0, 0xFF]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.size_in_bytes(), 2);
        assert!(index.get(0).is_err());
    }

    #[test]
    fn subr_bias() {
        let bias = |count: usize| {
            let items = vec![Vec::<u8>::new(); count];
            let buf = cff::index_with_off_size(&items, 1);
            Index::new(&buf).unwrap().subr_bias()
        };
        assert_eq!(bias(0), 107);
        assert_eq!(bias(200), 107);
        assert_eq!(bias(1239), 107);
        assert_eq!(bias(1240), 1131);
        assert_eq!(bias(5000), 1131);
        assert_eq!(bias(40000), 32768);
    }

    #[test]
    fn bad_off_size() {
        assert_eq!(
            Index::new(&[0, 1, 5, 0, 0]).unwrap_err(),
            Error::InvalidIndexOffsetSize(5)
        );
        assert_eq!(
            Index::new(&[0, 1, 0]).unwrap_err(),
            Error::InvalidIndexOffsetSize(0)
        );
    }

    #[test]
    fn zero_offset() {
        assert_eq!(
            Index::new(&[0, 1, 1, 0, 1]).unwrap_err(),
            Error::ZeroOffsetInIndex
        );
    }

    #[test]
    fn offsets_past_data() {
        // last offset claims 4 bytes of data but only 2 follow
        assert_eq!(
            Index::new(&[0, 1, 1, 1, 5, b'a', b'b']).unwrap_err(),
            Error::InvalidIndexOffsets
        );
    }

    #[test]
    fn decreasing_offsets() {
        assert_eq!(
            Index::new(&[0, 2, 1, 1, 3, 2, b'a', b'b']).unwrap_err(),
            Error::InvalidIndexOffsets
        );
    }

    #[test]
    fn truncated_offsets() {
        assert!(matches!(
            Index::new(&[0, 3, 1, 1, 2]),
            Err(Error::Read(ReadError::OutOfBounds))
        ));
    }
}
