//! Font assembly and the query surface.

use std::fmt;

use glyphcast_read::{
    tables::{
        cff::{self, Cff, CffFont},
        cmap::{self, Cmap},
        gasp::{self, Gasp},
        glyf, head,
        head::Head,
        hvhea::{self, HVhea},
        hvmtx::{self, HVmtx},
        kern::{self, Kern},
        loca, maxp,
        maxp::Maxp,
        name::{self, Name},
        os2::{self, Os2},
        post::{self, Post},
    },
    FontRef, ReadError, TableProvider,
};

use crate::{
    outline::{cff::CffOutlines, glyf::GlyfOutlines, Outline},
    string::{self, NameEntry},
    types::{GlyphId, NameId, Tag, Version16Dot16, CFF_SFNT_VERSION},
    DrawError, FontError,
};

/// Which table a font's outlines come from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutlineFormat {
    /// TrueType quadratic outlines in `glyf`, located through `loca`.
    Glyf,
    /// Type 2 charstrings in `CFF `.
    Cff,
}

#[derive(Clone)]
enum OutlineSource<'a> {
    Glyf(GlyfOutlines<'a>),
    Cff(CffOutlines<'a>),
    None,
}

/// A glyph's outline and horizontal metrics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    pub index: GlyphId,
    /// Advance width from `hmtx`.
    pub advance_width: i32,
    /// Left side bearing from `hmtx`.
    pub left_side_bearing: i32,
    pub outline: Outline,
    /// For CFF outlines, the advance width encoded in the charstring: the
    /// nominal width plus the charstring's width operand, or the default
    /// width when it has none.
    pub charstring_width: Option<f32>,
}

/// A loaded font.
///
/// All tables are parsed up front, in dependency order, when the font is
/// created; glyphs are decoded on request.
#[derive(Clone)]
pub struct Font<'a> {
    font: FontRef<'a>,
    head: Head<'a>,
    hhea: HVhea<'a>,
    maxp: Maxp<'a>,
    vhea: Option<HVhea<'a>>,
    post: Option<Post<'a>>,
    cmap: Option<Cmap<'a>>,
    hmtx: HVmtx<'a>,
    vmtx: Option<HVmtx<'a>>,
    name: Option<Name<'a>>,
    os2: Option<Os2<'a>>,
    kern: Option<Kern<'a>>,
    gasp: Option<Gasp<'a>>,
    outlines: OutlineSource<'a>,
}

impl<'a> Font<'a> {
    /// Loads a single font file.
    ///
    /// For collections use [`FontCollection`](crate::FontCollection).
    pub fn new(data: &'a [u8]) -> Result<Self, FontError> {
        FontRef::new(data)
            .map_err(FontError::Container)
            .and_then(Self::from_font_ref)
    }

    /// Loads a font whose table directory starts at `directory_offset`, with
    /// table offsets relative to `tables_origin`.
    pub fn with_offsets(
        data: &'a [u8],
        directory_offset: usize,
        tables_origin: usize,
    ) -> Result<Self, FontError> {
        FontRef::with_offsets(data, directory_offset, tables_origin)
            .map_err(FontError::Container)
            .and_then(Self::from_font_ref)
    }

    /// Loads every table of an already located font.
    pub fn from_font_ref(font: FontRef<'a>) -> Result<Self, FontError> {
        let head = required(&font, head::TAG, font.head())?;
        let hhea = required(&font, hvhea::HHEA_TAG, font.hhea())?;
        let maxp = required(&font, maxp::TAG, font.maxp())?;
        let vhea = optional(&font, hvhea::VHEA_TAG, font.vhea())?;
        let post = optional(&font, post::TAG, font.post())?;
        let cmap = optional(&font, cmap::TAG, font.cmap())?;
        let hmtx = required(&font, hvmtx::HMTX_TAG, font.hmtx())?;
        let vmtx = match vhea {
            Some(_) => optional(&font, hvmtx::VMTX_TAG, font.vmtx())?,
            None => None,
        };
        let name = optional(&font, name::TAG, font.name())?;
        let os2 = optional(&font, os2::TAG, font.os2())?;
        let outlines = load_outlines(&font, &head, maxp.num_glyphs() as u32)?;
        let kern = optional(&font, kern::TAG, font.kern())?;
        let gasp = optional(&font, gasp::TAG, font.gasp())?;
        Ok(Self {
            font,
            head,
            hhea,
            maxp,
            vhea,
            post,
            cmap,
            hmtx,
            vmtx,
            name,
            os2,
            kern,
            gasp,
            outlines,
        })
    }

    /// The underlying font data and table directory.
    pub fn font_ref(&self) -> &FontRef<'a> {
        &self.font
    }

    pub fn head(&self) -> &Head<'a> {
        &self.head
    }

    pub fn hhea(&self) -> &HVhea<'a> {
        &self.hhea
    }

    pub fn vhea(&self) -> Option<&HVhea<'a>> {
        self.vhea.as_ref()
    }

    pub fn maxp(&self) -> &Maxp<'a> {
        &self.maxp
    }

    pub fn hmtx(&self) -> &HVmtx<'a> {
        &self.hmtx
    }

    pub fn post(&self) -> Option<&Post<'a>> {
        self.post.as_ref()
    }

    pub fn os2(&self) -> Option<&Os2<'a>> {
        self.os2.as_ref()
    }

    pub fn gasp(&self) -> Option<&Gasp<'a>> {
        self.gasp.as_ref()
    }

    /// The `name` table, if present.
    pub fn name_table(&self) -> Option<&Name<'a>> {
        self.name.as_ref()
    }

    /// The CFF font providing outlines, if this is a CFF font.
    pub fn cff(&self) -> Option<&CffFont<'a>> {
        match &self.outlines {
            OutlineSource::Cff(outlines) => Some(outlines.font()),
            _ => None,
        }
    }

    /// The source of glyph outlines, or `None` for fonts with neither `glyf`
    /// nor `CFF `.
    pub fn outline_format(&self) -> Option<OutlineFormat> {
        match self.outlines {
            OutlineSource::Glyf(_) => Some(OutlineFormat::Glyf),
            OutlineSource::Cff(_) => Some(OutlineFormat::Cff),
            OutlineSource::None => None,
        }
    }

    pub fn num_glyphs(&self) -> u32 {
        self.maxp.num_glyphs() as u32
    }

    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em()
    }

    pub fn ascender(&self) -> i16 {
        self.hhea.ascender()
    }

    pub fn descender(&self) -> i16 {
        self.hhea.descender()
    }

    pub fn line_gap(&self) -> i16 {
        self.hhea.line_gap()
    }

    pub fn advance_width(&self, gid: GlyphId) -> Option<u16> {
        self.contains(gid).then(|| self.hmtx.advance(gid)).flatten()
    }

    pub fn left_side_bearing(&self, gid: GlyphId) -> Option<i16> {
        self.contains(gid)
            .then(|| self.hmtx.side_bearing(gid))
            .flatten()
    }

    /// Advance height from `vmtx`, for fonts with vertical metrics.
    pub fn vertical_advance(&self, gid: GlyphId) -> Option<u16> {
        let vmtx = self.vmtx.as_ref()?;
        self.contains(gid).then(|| vmtx.advance(gid)).flatten()
    }

    fn contains(&self, gid: GlyphId) -> bool {
        gid.to_u32() < self.num_glyphs()
    }

    /// Decodes the glyph's outline and looks up its metrics.
    pub fn try_glyph(&self, gid: GlyphId) -> Result<Glyph, DrawError> {
        if !self.contains(gid) {
            return Err(DrawError::GlyphNotFound(gid));
        }
        let (outline, charstring_width) = match &self.outlines {
            OutlineSource::Glyf(outlines) => (outlines.outline(gid)?, None),
            OutlineSource::Cff(outlines) => {
                let (outline, width) = outlines.outline(gid)?;
                (outline, Some(width))
            }
            OutlineSource::None => (Outline::default(), None),
        };
        Ok(Glyph {
            index: gid,
            advance_width: self.hmtx.advance(gid).unwrap_or_default() as i32,
            left_side_bearing: self.hmtx.side_bearing(gid).unwrap_or_default() as i32,
            outline,
            charstring_width,
        })
    }

    /// Like [`try_glyph`](Self::try_glyph), logging the failure.
    pub fn glyph(&self, gid: GlyphId) -> Option<Glyph> {
        match self.try_glyph(gid) {
            Ok(glyph) => Some(glyph),
            Err(e) => {
                log::warn!("failed to load glyph {gid}: {e}");
                None
            }
        }
    }

    /// The best string for `id` in the `name` table.
    ///
    /// Windows English records are preferred, then Unicode, then Mac Roman.
    pub fn name(&self, id: NameId) -> Option<String> {
        string::best_name(self.name.as_ref()?, id)
    }

    /// Every decodable record in the `name` table.
    pub fn all_names(&self) -> Vec<NameEntry> {
        self.name
            .as_ref()
            .map(string::all_names)
            .unwrap_or_default()
    }

    /// The glyph's name from `post`, or from the CFF charset when `post`
    /// carries no names.
    pub fn glyph_name(&self, gid: GlyphId) -> Option<String> {
        if !self.contains(gid) {
            return None;
        }
        let from_post = self
            .post
            .as_ref()
            .filter(|post| post.version() != Version16Dot16::VERSION_3_0)
            .and_then(|post| post.glyph_name(gid));
        if let Some(name) = from_post {
            return Some(name.to_owned());
        }
        self.cff()?.glyph_name(gid).map(|name| name.to_string())
    }

    /// Every named glyph, in glyph order.
    pub fn glyph_names(&self) -> impl Iterator<Item = (GlyphId, String)> + '_ {
        (0..self.num_glyphs()).filter_map(|gid| {
            let gid = GlyphId::new(gid);
            Some((gid, self.glyph_name(gid)?))
        })
    }

    /// Maps a codepoint to its nominal glyph through `cmap`.
    pub fn map_codepoint(&self, codepoint: impl Into<u32>) -> Option<GlyphId> {
        self.cmap.as_ref()?.map_codepoint(codepoint)
    }

    /// All `(codepoint, glyph)` mappings of the preferred `cmap` subtable.
    pub fn charmap(&self) -> impl Iterator<Item = (u32, GlyphId)> + 'a {
        self.cmap
            .as_ref()
            .and_then(|cmap| cmap.best_subtable())
            .into_iter()
            .flat_map(|(_, subtable)| subtable.iter())
    }

    /// The `kern` adjustment between two glyphs; zero without a `kern`
    /// table.
    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> i16 {
        let value = self
            .kern
            .as_ref()
            .map(|kern| kern.kerning(left, right))
            .unwrap_or_default();
        value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    /// Writes the table directory and every table's decoded fields.
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        crate::dump::dump(&self.font, out)
    }
}

impl fmt::Debug for Font<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables: Vec<_> = self
            .font
            .table_directory()
            .table_records()
            .iter()
            .map(|record| record.tag())
            .collect();
        f.debug_struct("Font")
            .field("num_glyphs", &self.num_glyphs())
            .field("outline_format", &self.outline_format())
            .field("tables", &tables)
            .finish()
    }
}

fn log_loaded(font: &FontRef, tag: Tag) {
    if let Some(record) = font.table_record(tag) {
        log::debug!(
            "loaded '{tag}' at offset {} ({} bytes)",
            record.offset(),
            record.length()
        );
    }
}

fn required<T>(font: &FontRef, tag: Tag, table: Result<T, ReadError>) -> Result<T, FontError> {
    match table {
        Ok(table) => {
            log_loaded(font, tag);
            Ok(table)
        }
        Err(ReadError::TableIsMissing(missing)) => Err(FontError::MissingRequiredTable(missing)),
        Err(source) => Err(FontError::MalformedTable { tag, source }),
    }
}

fn optional<T>(
    font: &FontRef,
    tag: Tag,
    table: Result<T, ReadError>,
) -> Result<Option<T>, FontError> {
    match table {
        Err(ReadError::TableIsMissing(missing)) if missing == tag => {
            log::debug!("no '{tag}' table");
            Ok(None)
        }
        table => required(font, tag, table).map(Some),
    }
}

fn load_outlines<'a>(
    font: &FontRef<'a>,
    head: &Head,
    num_glyphs: u32,
) -> Result<OutlineSource<'a>, FontError> {
    let has_glyf = font.table_record(glyf::TAG).is_some() || font.table_record(loca::TAG).is_some();
    let has_cff = font.table_record(cff::TAG).is_some();
    let use_cff =
        has_cff && (!has_glyf || font.table_directory().sfnt_version() == CFF_SFNT_VERSION);
    if has_glyf && has_cff {
        log::warn!(
            "font has both 'glyf' and 'CFF ' tables, using {}",
            if use_cff { "'CFF '" } else { "'glyf'" }
        );
    }
    if use_cff {
        let data = font
            .data_for_tag(cff::TAG)
            .ok_or(FontError::MissingRequiredTable(cff::TAG))?;
        let cff_font = Cff::new(data)
            .and_then(|cff| cff.font(0))
            .map_err(FontError::MalformedCff)?;
        log_loaded(font, cff::TAG);
        if cff_font.num_glyphs() != num_glyphs {
            log::warn!(
                "'CFF ' has {} charstrings but 'maxp' declares {num_glyphs} glyphs",
                cff_font.num_glyphs()
            );
        }
        return Ok(OutlineSource::Cff(CffOutlines::new(cff_font)));
    }
    if has_glyf {
        let is_long = match head.index_to_loc_format() {
            0 => false,
            1 => true,
            format => {
                return Err(FontError::MalformedTable {
                    tag: head::TAG,
                    source: ReadError::InvalidFormat(format as i64),
                })
            }
        };
        let loca = required(font, loca::TAG, font.loca(is_long))?;
        let glyf = required(font, glyf::TAG, font.glyf())?;
        return Ok(OutlineSource::Glyf(GlyfOutlines::new(loca, glyf, num_glyphs)));
    }
    log::debug!("no outline tables");
    Ok(OutlineSource::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::{fonts, SfntBuilder};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn load_order_requires_core_tables() {
        init_logging();
        for tag in [b"head", b"hhea", b"maxp", b"hmtx"] {
            let tag = Tag::new(tag);
            let data = fonts::glyf_font_builder().remove_table(tag).build();
            assert!(
                matches!(Font::new(&data), Err(FontError::MissingRequiredTable(t)) if t == tag),
                "{tag}"
            );
        }
    }

    #[test]
    fn optional_tables_may_be_absent() {
        init_logging();
        let data = fonts::glyf_font_builder()
            .remove_table(Tag::new(b"vhea"))
            .remove_table(Tag::new(b"vmtx"))
            .remove_table(Tag::new(b"kern"))
            .remove_table(Tag::new(b"post"))
            .remove_table(Tag::new(b"name"))
            .build();
        let font = Font::new(&data).unwrap();
        assert!(font.vhea().is_none());
        assert_eq!(font.vertical_advance(GlyphId::new(0)), None);
        assert_eq!(font.kerning(GlyphId::new(2), GlyphId::new(3)), 0);
        assert_eq!(font.glyph_name(GlyphId::new(2)), None);
        assert_eq!(font.name(NameId::FAMILY_NAME), None);
        assert!(font.all_names().is_empty());
    }

    #[test]
    fn loca_without_glyf() {
        let data = fonts::glyf_font_builder()
            .remove_table(Tag::new(b"glyf"))
            .build();
        assert!(matches!(
            Font::new(&data),
            Err(FontError::MissingRequiredTable(tag)) if tag == glyf::TAG
        ));
    }

    #[test]
    fn bad_loc_format() {
        let data = fonts::glyf_font_builder()
            .add_table(head::TAG, fonts::head(2).into_vec())
            .build();
        assert!(matches!(
            Font::new(&data),
            Err(FontError::MalformedTable {
                tag,
                source: ReadError::InvalidFormat(2)
            }) if tag == head::TAG
        ));
    }

    #[test]
    fn malformed_optional_table_fails_the_load() {
        let data = fonts::glyf_font_builder()
            .add_table(Tag::new(b"OS/2"), vec![0, 1])
            .build();
        assert!(matches!(
            Font::new(&data),
            Err(FontError::MalformedTable { tag, .. }) if tag == os2::TAG
        ));
    }

    #[test]
    fn malformed_cff() {
        let data = SfntBuilder::new(CFF_SFNT_VERSION)
            .add_table(head::TAG, fonts::head(0).into_vec())
            .add_table(hvhea::HHEA_TAG, fonts::hhea(1).into_vec())
            .add_table(maxp::TAG, fonts::maxp_v0_5(1).into_vec())
            .add_table(hvmtx::HMTX_TAG, vec![0, 0, 0, 0])
            .add_table(cff::TAG, vec![1, 0, 4, 1, 0])
            .build();
        assert!(matches!(Font::new(&data), Err(FontError::MalformedCff(_))));
    }

    #[test]
    fn cff_wins_in_otto_fonts() {
        init_logging();
        let (glyf, loca) = fonts::glyf_and_loca(&fonts::glyf_glyphs());
        let cff_data = fonts::cff_font();
        let cff_font = FontRef::new(&cff_data).unwrap();
        let mut builder = SfntBuilder::new(CFF_SFNT_VERSION);
        for record in cff_font.table_directory().table_records() {
            let data = cff_font.table_data(record.tag()).unwrap();
            builder = builder.add_table(record.tag(), data.as_bytes().to_vec());
        }
        let data = builder
            .add_table(loca::TAG, loca)
            .add_table(glyf::TAG, glyf)
            .build();
        let font = Font::new(&data).unwrap();
        assert_eq!(font.outline_format(), Some(OutlineFormat::Cff));
    }

    #[test]
    fn no_outlines() {
        let data = fonts::glyf_font_builder()
            .remove_table(Tag::new(b"glyf"))
            .remove_table(Tag::new(b"loca"))
            .build();
        let font = Font::new(&data).unwrap();
        assert_eq!(font.outline_format(), None);
        let glyph = font.try_glyph(GlyphId::new(2)).unwrap();
        assert!(glyph.outline.is_empty());
        assert_eq!(glyph.advance_width, 600);
    }

    #[test]
    fn out_of_range_queries() {
        let data = fonts::glyf_font();
        let font = Font::new(&data).unwrap();
        let gid = GlyphId::new(font.num_glyphs());
        assert_eq!(font.advance_width(gid), None);
        assert_eq!(font.left_side_bearing(gid), None);
        assert_eq!(font.glyph_name(gid), None);
        assert!(font.glyph(gid).is_none());
        assert!(matches!(
            font.try_glyph(gid),
            Err(DrawError::GlyphNotFound(g)) if g == gid
        ));
    }

    #[test]
    fn debug_lists_tables() {
        let data = fonts::cff_font();
        let font = Font::new(&data).unwrap();
        let debug = format!("{font:?}");
        assert!(debug.starts_with("Font { num_glyphs: 500, outline_format: Some(Cff)"));
    }
}
