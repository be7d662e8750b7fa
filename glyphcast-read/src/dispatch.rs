//! Tag based table dispatch.

use std::fmt;

use types::Tag;

use crate::{
    tables::{cff, cmap, gasp, glyf, head, hvhea, hvmtx, kern, loca, maxp, name, os2, post},
    FontData, ReadError, TableProvider,
};

/// Any table that can be found in a font, parsed according to its tag.
///
/// Tables without a parser are kept as raw bytes.
#[derive(Clone)]
pub enum AnyTable<'a> {
    Head(head::Head<'a>),
    Hhea(hvhea::HVhea<'a>),
    Vhea(hvhea::HVhea<'a>),
    Maxp(maxp::Maxp<'a>),
    Hmtx(hvmtx::HVmtx<'a>),
    Vmtx(hvmtx::HVmtx<'a>),
    Loca(loca::Loca<'a>),
    Glyf(glyf::Glyf<'a>),
    Post(post::Post<'a>),
    Name(name::Name<'a>),
    Os2(os2::Os2<'a>),
    Cmap(cmap::Cmap<'a>),
    Kern(kern::Kern<'a>),
    Gasp(gasp::Gasp<'a>),
    Cff(cff::Cff<'a>),
    Raw { tag: Tag, data: FontData<'a> },
}

impl<'a> AnyTable<'a> {
    /// Reads the table with the given tag from `provider`.
    ///
    /// Tables that depend on others (`hmtx`, `vmtx`, `loca`) read their
    /// dependencies through the same provider.
    pub fn read(provider: &impl TableProvider<'a>, tag: Tag) -> Result<Self, ReadError> {
        Ok(match tag {
            head::TAG => Self::Head(provider.head()?),
            hvhea::HHEA_TAG => Self::Hhea(provider.hhea()?),
            hvhea::VHEA_TAG => Self::Vhea(provider.vhea()?),
            maxp::TAG => Self::Maxp(provider.maxp()?),
            hvmtx::HMTX_TAG => Self::Hmtx(provider.hmtx()?),
            hvmtx::VMTX_TAG => Self::Vmtx(provider.vmtx()?),
            loca::TAG => Self::Loca(provider.loca(None)?),
            glyf::TAG => Self::Glyf(provider.glyf()?),
            post::TAG => Self::Post(provider.post()?),
            name::TAG => Self::Name(provider.name()?),
            os2::TAG => Self::Os2(provider.os2()?),
            cmap::TAG => Self::Cmap(provider.cmap()?),
            kern::TAG => Self::Kern(provider.kern()?),
            gasp::TAG => Self::Gasp(provider.gasp()?),
            cff::TAG => Self::Cff(provider.cff()?),
            _ => Self::Raw {
                tag,
                data: provider.expect_data_for_tag(tag)?,
            },
        })
    }

    /// The tag this table was read for.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Head(_) => head::TAG,
            Self::Hhea(_) => hvhea::HHEA_TAG,
            Self::Vhea(_) => hvhea::VHEA_TAG,
            Self::Maxp(_) => maxp::TAG,
            Self::Hmtx(_) => hvmtx::HMTX_TAG,
            Self::Vmtx(_) => hvmtx::VMTX_TAG,
            Self::Loca(_) => loca::TAG,
            Self::Glyf(_) => glyf::TAG,
            Self::Post(_) => post::TAG,
            Self::Name(_) => name::TAG,
            Self::Os2(_) => os2::TAG,
            Self::Cmap(_) => cmap::TAG,
            Self::Kern(_) => kern::TAG,
            Self::Gasp(_) => gasp::TAG,
            Self::Cff(_) => cff::TAG,
            Self::Raw { tag, .. } => *tag,
        }
    }

    /// Returns true if the tag has no parser.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw { .. })
    }
}

impl fmt::Debug for AnyTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head(table) => fmt::Debug::fmt(table, f),
            Self::Hhea(table) | Self::Vhea(table) => fmt::Debug::fmt(table, f),
            Self::Maxp(table) => fmt::Debug::fmt(table, f),
            Self::Hmtx(table) | Self::Vmtx(table) => fmt::Debug::fmt(table, f),
            Self::Loca(table) => fmt::Debug::fmt(table, f),
            Self::Glyf(table) => fmt::Debug::fmt(table, f),
            Self::Post(table) => fmt::Debug::fmt(table, f),
            Self::Name(table) => fmt::Debug::fmt(table, f),
            Self::Os2(table) => fmt::Debug::fmt(table, f),
            Self::Cmap(table) => fmt::Debug::fmt(table, f),
            Self::Kern(table) => fmt::Debug::fmt(table, f),
            Self::Gasp(table) => fmt::Debug::fmt(table, f),
            Self::Cff(table) => fmt::Debug::fmt(table, f),
            Self::Raw { tag, data } => f
                .debug_struct("Raw")
                .field("tag", tag)
                .field("len", &data.len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FontRef;
    use glyphcast_test_data::fonts;

    #[test]
    fn dispatch_every_table() {
        let data = fonts::glyf_font();
        let font = FontRef::new(&data).unwrap();
        for record in font.table_directory().table_records() {
            let table = AnyTable::read(&font, record.tag()).unwrap();
            assert_eq!(table.tag(), record.tag());
            assert_eq!(table.is_raw(), record.tag() == Tag::new(b"DSIG"));
        }
    }

    #[test]
    fn dispatch_cff() {
        let data = fonts::cff_font();
        let font = FontRef::new(&data).unwrap();
        let table = AnyTable::read(&font, cff::TAG).unwrap();
        assert!(matches!(table, AnyTable::Cff(_)));
        assert!(format!("{table:?}").starts_with("Cff"));
    }

    #[test]
    fn unknown_tag_is_raw() {
        let data = glyphcast_test_data::SfntBuilder::new(types::TT_SFNT_VERSION)
            .add_table(Tag::new(b"zzzz"), vec![1, 2, 3])
            .build();
        let font = FontRef::new(&data).unwrap();
        let table = AnyTable::read(&font, Tag::new(b"zzzz")).unwrap();
        assert!(table.is_raw());
        assert_eq!(format!("{table:?}"), "Raw { tag: Tag(zzzz), len: 3 }");
    }

    #[test]
    fn missing_tag() {
        let data = fonts::glyf_font();
        let font = FontRef::new(&data).unwrap();
        assert!(matches!(
            AnyTable::read(&font, Tag::new(b"abcd")),
            Err(ReadError::TableIsMissing(_))
        ));
    }
}
