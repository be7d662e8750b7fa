//! small utilities used in tests

use std::collections::HashMap;

use glyphcast_types::Scalar;

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
    tagged_locations: HashMap<String, usize>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer contains zero bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return a reference to the contents of the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write a scalar and remember its position under `tag`.
    pub fn push_with_tag(mut self, item: impl Scalar, tag: &str) -> Self {
        self.tagged_locations
            .insert(tag.to_string(), self.data.len());
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    /// Append raw bytes.
    pub fn extend_bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn offset_for(&self, tag: &str) -> usize {
        // panic on unrecognized tags
        self.tagged_locations.get(tag).copied().unwrap()
    }

    /// Overwrite the scalar previously written with `tag`.
    pub fn write_at(&mut self, tag: &str, item: impl Scalar) {
        let offset = self.offset_for(tag);
        let raw = item.to_raw();
        let new_data: &[u8] = raw.as_ref();
        let data = &mut self.data[offset..];
        if data.len() < new_data.len() {
            panic!("not enough room left in buffer for the requested write.");
        }
        data[..new_data.len()].copy_from_slice(new_data);
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl From<BeBuffer> for Vec<u8> {
    fn from(src: BeBuffer) -> Vec<u8> {
        src.data
    }
}

/// Build a [`BeBuffer`] from a comma separated list of items.
///
/// Each item is one of:
/// - a literal or identifier holding a scalar: `1u16`, `TT_SFNT_VERSION`
/// - a parenthesized expression: `(Tag::new(b"head"))`
/// - an array of scalars of one type: `[1u8, 2, 3]`
/// - a tagged scalar whose position can be looked up later: `{0u32: "offset"}`
#[macro_export]
macro_rules! be_buffer {
    ( $( $item:tt ),* $(,)? ) => {{
        let builder = $crate::bebuffer::BeBuffer::new();
        $(
            let builder = $crate::be_buffer_add!(builder, $item);
        )*
        builder
    }};
}

/// Append a single item to a [`BeBuffer`]; see [`be_buffer!`].
#[macro_export]
macro_rules! be_buffer_add {
    ($b:ident, { $v:tt : $tag:literal }) => {
        $b.push_with_tag($v, $tag)
    };
    ($b:ident, [ $( $x:expr ),+ $(,)? ]) => {
        $b.extend([ $( $x ),+ ])
    };
    ($b:ident, ( $x:expr )) => {
        $b.push($x)
    };
    ($b:ident, $x:literal) => {
        $b.push($x)
    };
    ($b:ident, $x:ident) => {
        $b.push($x)
    };
}

#[cfg(test)]
mod tests {
    use glyphcast_types::Tag;

    #[test]
    fn macro_forms() {
        let mut buf = be_buffer! {
            1u16,
            (Tag::new(b"abcd")),
            [1u8, 2],
            {0u32: "later"}
        };
        assert_eq!(buf.len(), 2 + 4 + 2 + 4);
        buf.write_at("later", 0x01020304u32);
        assert_eq!(&buf[8..], &[1, 2, 3, 4]);
        assert_eq!(&buf[2..6], b"abcd");
    }
}
