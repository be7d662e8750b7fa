//! Fonts and font collections.

use glyphcast_read::{FileRef, ReadError};

use crate::{Font, FontError};

/// A font file, which may hold one font or a TrueType collection.
///
/// A single font is treated as a collection of one.
#[derive(Clone)]
pub struct FontCollection<'a> {
    file: FileRef<'a>,
}

impl<'a> FontCollection<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, FontError> {
        let file = FileRef::new(data).map_err(FontError::Container)?;
        Ok(Self { file })
    }

    /// Returns `true` if the file has a `ttcf` header.
    pub fn is_collection(&self) -> bool {
        matches!(self.file, FileRef::Collection(_))
    }

    /// The number of fonts in the file.
    pub fn len(&self) -> u32 {
        match &self.file {
            FileRef::Font(_) => 1,
            FileRef::Collection(collection) => collection.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads the font at `index`.
    pub fn get(&self, index: u32) -> Result<Font<'a>, FontError> {
        let font = match &self.file {
            FileRef::Font(font) if index == 0 => font.clone(),
            FileRef::Font(_) => return Err(FontError::InvalidCollectionIndex(index)),
            FileRef::Collection(collection) => match collection.get(index) {
                Ok(font) => font,
                Err(ReadError::InvalidCollectionIndex(index)) => {
                    return Err(FontError::InvalidCollectionIndex(index))
                }
                Err(e) => return Err(FontError::Container(e)),
            },
        };
        Font::from_font_ref(font)
    }

    /// Loads every font in the file, in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Font<'a>, FontError>> + '_ {
        (0..self.len()).map(|index| self.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutlineFormat;
    use glyphcast_test_data::fonts;

    #[test]
    fn single_font() {
        let data = fonts::glyf_font();
        let fonts = FontCollection::new(&data).unwrap();
        assert!(!fonts.is_collection());
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts.get(0).unwrap().num_glyphs(), 6);
        assert!(matches!(
            fonts.get(1),
            Err(FontError::InvalidCollectionIndex(1))
        ));
    }

    #[test]
    fn collection_members() {
        let data = fonts::collection();
        let fonts = FontCollection::new(&data).unwrap();
        assert!(fonts.is_collection());
        let formats: Vec<_> = fonts
            .iter()
            .map(|font| font.unwrap().outline_format())
            .collect();
        assert_eq!(formats, [Some(OutlineFormat::Glyf), Some(OutlineFormat::Cff)]);
        assert!(matches!(
            fonts.get(2),
            Err(FontError::InvalidCollectionIndex(2))
        ));
    }

    #[test]
    fn not_a_font() {
        assert!(matches!(
            FontCollection::new(&[0, 1, 2]),
            Err(FontError::Container(_))
        ));
    }
}
