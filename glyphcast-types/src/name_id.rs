//! Name identifiers.

use std::fmt;

/// Identifier for an informational string (or name) in the `name` table.
///
/// IDs 26 to 255 are reserved for future standard names; IDs 256 to 32767
/// are font specific.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NameId(u16);

impl NameId {
    /// Copyright notice.
    pub const COPYRIGHT_NOTICE: Self = Self(0);
    /// Font family name.
    pub const FAMILY_NAME: Self = Self(1);
    /// Font subfamily name.
    pub const SUBFAMILY_NAME: Self = Self(2);
    /// Unique font identifier.
    pub const UNIQUE_ID: Self = Self(3);
    /// Full font name.
    pub const FULL_NAME: Self = Self(4);
    /// Version string.
    pub const VERSION_STRING: Self = Self(5);
    /// PostScript name for the font.
    pub const POSTSCRIPT_NAME: Self = Self(6);
    /// Trademark notice.
    pub const TRADEMARK: Self = Self(7);
    /// Manufacturer name.
    pub const MANUFACTURER: Self = Self(8);
    /// Name of the designer of the typeface.
    pub const DESIGNER: Self = Self(9);
    /// Description of the typeface.
    pub const DESCRIPTION: Self = Self(10);
    /// URL of the font vendor.
    pub const VENDOR_URL: Self = Self(11);
    /// URL of the typeface designer.
    pub const DESIGNER_URL: Self = Self(12);
    /// License description.
    pub const LICENSE_DESCRIPTION: Self = Self(13);
    /// URL where additional licensing information can be found.
    pub const LICENSE_URL: Self = Self(14);
    /// Typographic family name.
    pub const TYPOGRAPHIC_FAMILY_NAME: Self = Self(16);
    /// Typographic subfamily name.
    pub const TYPOGRAPHIC_SUBFAMILY_NAME: Self = Self(17);
    /// Sample text.
    pub const SAMPLE_TEXT: Self = Self(19);

    /// Create a new identifier from a raw u16 value.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw u16 value.
    pub const fn to_u16(self) -> u16 {
        self.0
    }
}

impl From<u16> for NameId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Debug for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

crate::newtype_scalar!(NameId, [u8; 2]);
