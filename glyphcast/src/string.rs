//! Strings from the `name` table.

use glyphcast_read::tables::name::{Encoding, Name, NameRecord};

use crate::types::NameId;

/// A decoded `name` table record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameEntry {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: NameId,
    pub value: String,
}

const WINDOWS_PLATFORM: u16 = 3;
const MAC_PLATFORM: u16 = 1;
const UNICODE_PLATFORM: u16 = 0;
const WINDOWS_ENGLISH_US: u16 = 0x0409;

/// Lower is better; `None` for records that can't be decoded.
fn rank(record: &NameRecord) -> Option<u8> {
    let encoding = Encoding::new(record.platform_id(), record.encoding_id());
    match (record.platform_id(), record.language_id(), encoding) {
        (_, _, Encoding::Unknown) => None,
        (WINDOWS_PLATFORM, WINDOWS_ENGLISH_US, _) => Some(0),
        // any other language on Windows, including other English variants
        (WINDOWS_PLATFORM, _, _) if record.language_id() & 0xFF == 0x09 => Some(1),
        (WINDOWS_PLATFORM | UNICODE_PLATFORM, _, _) => Some(2),
        (MAC_PLATFORM, _, Encoding::MacRoman) => Some(3),
        _ => None,
    }
}

/// Returns the best string for `id`.
///
/// Windows US English is preferred, then other Windows English records, then
/// any Unicode record, then Mac Roman. Ties keep record order.
pub(crate) fn best_name(name: &Name, id: NameId) -> Option<String> {
    name.name_record()
        .iter()
        .filter(|record| record.name_id() == id)
        .filter_map(|record| Some((rank(record)?, record)))
        .min_by_key(|(rank, _)| *rank)
        .and_then(|(_, record)| record.string(name.string_data()).ok())
        .map(|string| string.to_string())
}

/// Every record with a decodable encoding, in storage order.
pub(crate) fn all_names(name: &Name) -> Vec<NameEntry> {
    name.name_record()
        .iter()
        .filter_map(|record| {
            let string = record.string(name.string_data()).ok()?;
            if !string.is_decodable() {
                log::debug!(
                    "skipping name {} with platform {} encoding {}",
                    record.name_id(),
                    record.platform_id(),
                    record.encoding_id()
                );
                return None;
            }
            Some(NameEntry {
                platform_id: record.platform_id(),
                encoding_id: record.encoding_id(),
                language_id: record.language_id(),
                name_id: record.name_id(),
                value: string.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast_read::{FontData, FontRead};
    use glyphcast_test_data::fonts;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect()
    }

    #[test]
    fn windows_english_wins() {
        let data = fonts::name();
        let name = Name::read(FontData::new(&data)).unwrap();
        assert_eq!(
            best_name(&name, NameId::FAMILY_NAME).as_deref(),
            Some("Glyphcast Test")
        );
        assert_eq!(
            best_name(&name, NameId::FULL_NAME).as_deref(),
            Some("Glyphcast Test Regular")
        );
    }

    #[test]
    fn mac_roman_fallback() {
        let data = fonts::name();
        let name = Name::read(FontData::new(&data)).unwrap();
        assert_eq!(
            best_name(&name, NameId::COPYRIGHT_NOTICE).as_deref(),
            Some("\u{a9} Glyphcast")
        );
        assert_eq!(
            best_name(&name, NameId::SUBFAMILY_NAME).as_deref(),
            Some("Caf\u{e9}")
        );
        assert_eq!(best_name(&name, NameId::POSTSCRIPT_NAME), None);
    }

    #[test]
    fn unicode_before_mac() {
        let data = fonts::name_table(&[
            (1, 0, 0, 1, b"Mac".to_vec()),
            (0, 3, 0, 1, utf16("Unicode")),
            (3, 1, 0x0411, 1, utf16("Japanese")),
        ]);
        let name = Name::read(FontData::new(&data)).unwrap();
        // Windows non-English and Unicode share a rank, so record order wins
        assert_eq!(
            best_name(&name, NameId::FAMILY_NAME).as_deref(),
            Some("Unicode")
        );
    }

    #[test]
    fn other_english_before_other_languages() {
        let data = fonts::name_table(&[
            (3, 1, 0x0411, 1, utf16("Japanese")),
            (3, 1, 0x0809, 1, utf16("British")),
        ]);
        let name = Name::read(FontData::new(&data)).unwrap();
        assert_eq!(
            best_name(&name, NameId::FAMILY_NAME).as_deref(),
            Some("British")
        );
    }

    #[test]
    fn undecodable_records_are_skipped() {
        let data = fonts::name_table(&[
            (2, 0, 0, 1, b"ISO".to_vec()),
            (3, 1, 0x0409, 2, utf16("Bold")),
        ]);
        let name = Name::read(FontData::new(&data)).unwrap();
        assert_eq!(best_name(&name, NameId::FAMILY_NAME), None);
        let all = all_names(&name);
        assert_eq!(
            all,
            vec![NameEntry {
                platform_id: 3,
                encoding_id: 1,
                language_id: 0x0409,
                name_id: NameId::SUBFAMILY_NAME,
                value: "Bold".into(),
            }]
        );
    }
}
