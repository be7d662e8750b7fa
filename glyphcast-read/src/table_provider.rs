//! a trait for things that can serve font tables

use types::Tag;

use crate::{
    tables::{cff, cmap, gasp, glyf, head, hvhea, hvmtx, kern, loca, maxp, name, os2, post},
    FontData, FontRead, FontReadWithArgs, ReadError,
};

/// A table that has an associated tag.
///
/// This is true of top-level tables, but not their various subtables.
pub trait TopLevelTable {
    /// The table's tag.
    const TAG: Tag;
}

/// An interface for accessing tables from a font (or font-like object)
///
/// Tables that cannot be interpreted on their own (`hmtx`, `vmtx`, `loca`)
/// look up the tables they depend on through the same provider.
pub trait TableProvider<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>>;

    fn expect_data_for_tag(&self, tag: Tag) -> Result<FontData<'a>, ReadError> {
        self.data_for_tag(tag).ok_or(ReadError::TableIsMissing(tag))
    }

    fn expect_table<T: TopLevelTable + FontRead<'a>>(&self) -> Result<T, ReadError> {
        self.expect_data_for_tag(T::TAG).and_then(FontRead::read)
    }

    fn head(&self) -> Result<head::Head<'a>, ReadError> {
        self.expect_table()
    }

    fn name(&self) -> Result<name::Name<'a>, ReadError> {
        self.expect_table()
    }

    fn hhea(&self) -> Result<hvhea::HVhea<'a>, ReadError> {
        self.expect_data_for_tag(hvhea::HHEA_TAG)
            .and_then(FontRead::read)
    }

    fn vhea(&self) -> Result<hvhea::HVhea<'a>, ReadError> {
        self.expect_data_for_tag(hvhea::VHEA_TAG)
            .and_then(FontRead::read)
    }

    fn hmtx(&self) -> Result<hvmtx::HVmtx<'a>, ReadError> {
        let num_glyphs = self.maxp()?.num_glyphs();
        let number_of_h_metrics = self.hhea()?.number_of_long_metrics();
        self.expect_data_for_tag(hvmtx::HMTX_TAG).and_then(|data| {
            FontReadWithArgs::read_with_args(data, &(number_of_h_metrics, num_glyphs))
        })
    }

    fn vmtx(&self) -> Result<hvmtx::HVmtx<'a>, ReadError> {
        let num_glyphs = self.maxp()?.num_glyphs();
        let number_of_v_metrics = self.vhea()?.number_of_long_metrics();
        self.expect_data_for_tag(hvmtx::VMTX_TAG).and_then(|data| {
            FontReadWithArgs::read_with_args(data, &(number_of_v_metrics, num_glyphs))
        })
    }

    fn maxp(&self) -> Result<maxp::Maxp<'a>, ReadError> {
        self.expect_table()
    }

    fn os2(&self) -> Result<os2::Os2<'a>, ReadError> {
        self.expect_table()
    }

    fn post(&self) -> Result<post::Post<'a>, ReadError> {
        self.expect_table()
    }

    /// is_long can be optionally provided, if known, otherwise we look it up in head.
    fn loca(&self, is_long: impl Into<Option<bool>>) -> Result<loca::Loca<'a>, ReadError> {
        let is_long = match is_long.into() {
            Some(val) => val,
            None => self.head()?.index_to_loc_format() == 1,
        };
        let num_glyphs = self.maxp()?.num_glyphs();
        self.expect_data_for_tag(loca::Loca::TAG)
            .and_then(|data| FontReadWithArgs::read_with_args(data, &(is_long, num_glyphs)))
    }

    fn glyf(&self) -> Result<glyf::Glyf<'a>, ReadError> {
        self.expect_table()
    }

    fn cmap(&self) -> Result<cmap::Cmap<'a>, ReadError> {
        self.expect_table()
    }

    fn kern(&self) -> Result<kern::Kern<'a>, ReadError> {
        self.expect_table()
    }

    fn gasp(&self) -> Result<gasp::Gasp<'a>, ReadError> {
        self.expect_table()
    }

    fn cff(&self) -> Result<cff::Cff<'a>, ReadError> {
        self.expect_table()
    }
}
