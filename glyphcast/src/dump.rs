//! A textual dump of a font's tables.

use std::fmt::Write;

use glyphcast_read::{AnyTable, FontRef, TableRecord};

pub(crate) fn dump(font: &FontRef, out: &mut impl Write) -> std::fmt::Result {
    let directory = font.table_directory();
    writeln!(out, "sfnt version: 0x{:08X}", directory.sfnt_version())?;
    writeln!(out, "tables: {}", directory.num_tables())?;
    let stored = directory.search_params();
    let computed = directory.computed_search_params();
    writeln!(
        out,
        "search range: {} entry selector: {} range shift: {}",
        stored.search_range, stored.entry_selector, stored.range_shift
    )?;
    if stored != computed {
        writeln!(
            out,
            "warning: expected search range: {} entry selector: {} range shift: {}",
            computed.search_range, computed.entry_selector, computed.range_shift
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Tag  Offset  Length  Checksum")?;
    writeln!(out, "-------------------------------")?;
    let offset_pad = hex_width(
        directory
            .table_records()
            .iter()
            .map(TableRecord::offset)
            .max()
            .unwrap_or_default(),
    );
    for record in directory.table_records() {
        writeln!(
            out,
            "{0} 0x{1:02$X} {3:8} 0x{4:08X}",
            record.tag(),
            record.offset(),
            offset_pad,
            record.length(),
            record.checksum()
        )?;
    }
    for record in directory.table_records() {
        let tag = record.tag();
        writeln!(out)?;
        match AnyTable::read(font, tag) {
            Ok(table) => writeln!(out, "{table:#?}")?,
            Err(e) => writeln!(out, "'{tag}': error {e}")?,
        }
    }
    Ok(())
}

fn hex_width(val: u32) -> usize {
    match val {
        0..=0xffff => 4,
        0x10000..=0xffffff => 6,
        _ => 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_test_data::{fonts, SfntBuilder};
    use glyphcast_read::types::{Tag, TT_SFNT_VERSION};

    #[test]
    fn directory_listing() {
        let data = fonts::glyf_font();
        let font = FontRef::new(&data).unwrap();
        let mut out = String::new();
        dump(&font, &mut out).unwrap();
        assert!(out.starts_with("sfnt version: 0x00010000\ntables: 15\n"));
        assert!(!out.contains("warning"));
        let record = font.table_record(Tag::new(b"head")).unwrap();
        let line = format!(
            "head 0x{:04X} {:8} 0x{:08X}",
            record.offset(),
            record.length(),
            record.checksum()
        );
        assert!(out.contains(&line), "{out}");
        assert!(out.contains("Raw {\n    tag: Tag(DSIG),\n    len: 8,\n}"));
    }

    #[test]
    fn unreadable_tables_are_reported() {
        let data = SfntBuilder::new(TT_SFNT_VERSION)
            .add_table(Tag::new(b"maxp"), vec![0, 0])
            .build();
        let font = FontRef::new(&data).unwrap();
        let mut out = String::new();
        dump(&font, &mut out).unwrap();
        assert!(out.contains("'maxp': error"), "{out}");
    }

    #[test]
    fn hex_widths() {
        assert_eq!(hex_width(0xfff0), 4);
        assert_eq!(hex_width(0x10000), 6);
        assert_eq!(hex_width(0x1000000), 8);
    }
}
