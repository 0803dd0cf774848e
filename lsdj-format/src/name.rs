//! Fixed-width names (projects, instruments, speech words)

use std::borrow::Cow;
use std::fmt;

/// NUL-padded name stored in exactly `N` bytes
///
/// Names fill their field completely when they are `N` characters long, so
/// there is no guaranteed terminator. The raw bytes are kept as read, which
/// makes writing a name back lossless.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name<const N: usize>([u8; N]);

impl<const N: usize> Name<N> {
    /// Empty (all NUL) name
    pub const EMPTY: Self = Self([0; N]);

    /// Name from a string, truncated to `N` bytes
    pub fn new(name: &str) -> Self {
        Self::from_bytes(name.as_bytes())
    }

    /// Name from raw bytes, truncated or NUL-padded to `N` bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; N];
        let len = bytes.len().min(N);
        raw[..len].copy_from_slice(&bytes[..len]);
        Self(raw)
    }

    /// All `N` stored bytes, padding included
    pub fn raw(&self) -> &[u8; N] {
        &self.0
    }

    /// Bytes up to the first NUL
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        &self.0[..end]
    }

    /// Name as text (non-UTF-8 bytes are replaced)
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Number of characters before the padding
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// True when the name has no characters
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl<const N: usize> Default for Name<N> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<const N: usize> From<&str> for Name<N> {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl<const N: usize> fmt::Display for Name<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_str())
    }
}

impl<const N: usize> fmt::Debug for Name<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_name_has_no_terminator() {
        let name = Name::<8>::new("NOSTALGA");
        assert_eq!(name.raw(), b"NOSTALGA");
        assert_eq!(name.as_str(), "NOSTALGA");
        assert_eq!(name.len(), 8);
    }

    #[test]
    fn test_short_and_long_names() {
        let short = Name::<8>::new("YOKAI");
        assert_eq!(short.raw(), b"YOKAI\0\0\0");
        assert_eq!(short.to_string(), "YOKAI");

        let long = Name::<5>::new("SQUAREWAVE");
        assert_eq!(long.as_str(), "SQUAR");
    }

    #[test]
    fn test_bytes_after_terminator_are_kept() {
        let name = Name::<4>::from_bytes(&[b'A', 0, b'Z', 0]);
        assert_eq!(name.as_str(), "A");
        assert_eq!(name.raw(), &[b'A', 0, b'Z', 0]);
        assert_ne!(name, Name::<4>::new("A"));
    }

    #[test]
    fn test_empty_and_padding() {
        assert!(Name::<8>::default().is_empty());
        assert_eq!(format!("{:<6}|", Name::<4>::new("HI")), "HI    |");
    }
}
