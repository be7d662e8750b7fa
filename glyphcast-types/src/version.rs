//! Table version numbers.

/// A 32-bit version number whose major part is in the high 16 bits.
///
/// Some tables (`maxp`, `post`) encode fractional versions such as 0.5 or
/// 2.5 as `0x00005000` and `0x00025000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version16Dot16(u32);

impl Version16Dot16 {
    /// Version 0.5
    pub const VERSION_0_5: Version16Dot16 = Self::new(0, 5);
    /// Version 1.0
    pub const VERSION_1_0: Version16Dot16 = Self::new(1, 0);
    /// Version 2.0
    pub const VERSION_2_0: Version16Dot16 = Self::new(2, 0);
    /// Version 2.5
    pub const VERSION_2_5: Version16Dot16 = Self::new(2, 5);
    /// Version 3.0
    pub const VERSION_3_0: Version16Dot16 = Self::new(3, 0);

    /// Create a version from a major and minor number. The minor number is
    /// a single hex digit, as written in the OpenType documentation.
    pub const fn new(major: u16, minor: u16) -> Self {
        let major = (major as u32) << 16;
        let minor = ((minor as u32) & 0xF) << 12;
        Version16Dot16(major | minor)
    }

    /// Create from the raw 32-bit representation.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw 32-bit representation.
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// The major and minor parts.
    pub const fn to_major_minor(self) -> (u16, u16) {
        ((self.0 >> 16) as u16, ((self.0 & 0xFFFF) >> 12) as u16)
    }
}

impl std::fmt::Display for Version16Dot16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (major, minor) = self.to_major_minor();
        write!(f, "{major}.{minor}")
    }
}

crate::newtype_scalar!(Version16Dot16, [u8; 4]);

/// A version with separate 16-bit major and minor fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MajorMinor {
    /// The major version number
    pub major: u16,
    /// The minor version number
    pub minor: u16,
}

impl MajorMinor {
    /// Version 1.0
    pub const VERSION_1_0: MajorMinor = MajorMinor::new(1, 0);

    /// Create a new version with the provided major and minor parts.
    pub const fn new(major: u16, minor: u16) -> Self {
        MajorMinor { major, minor }
    }
}

impl crate::raw::Scalar for MajorMinor {
    type Raw = [u8; 4];

    fn from_raw(raw: Self::Raw) -> Self {
        let major = u16::from_be_bytes([raw[0], raw[1]]);
        let minor = u16::from_be_bytes([raw[2], raw[3]]);
        Self { major, minor }
    }

    fn to_raw(self) -> Self::Raw {
        let [a, b] = self.major.to_be_bytes();
        let [c, d] = self.minor.to_be_bytes();
        [a, b, c, d]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_versions() {
        assert_eq!(Version16Dot16::VERSION_2_5.to_bits(), 0x00025000);
        assert_eq!(Version16Dot16::VERSION_0_5.to_bits(), 0x00005000);
        assert_eq!(Version16Dot16::from_bits(0x00030000).to_string(), "3.0");
    }
}
