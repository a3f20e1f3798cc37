//! Byte buffers that render as escaped byte-string literals.
//!
//! `DisplayBytesVec::from(vec![b'N', b'B', 0x00])` displays as `b"NB\0"`, which keeps dumps of
//! binary payloads readable without resorting to decimal arrays.


use std::fmt;
use std::ops::Deref;


fn write_escaped(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "b\"")?;
    for &b in bytes {
        match b {
            0x00 => write!(f, "\\0")?,
            0x09 => write!(f, "\\t")?,
            0x0A => write!(f, "\\n")?,
            0x0D => write!(f, "\\r")?,
            0x22 => write!(f, "\\\"")?,
            // no need to escape 0x27
            0x5C => write!(f, "\\\\")?,
            0x20..=0x7E => write!(f, "{}", char::from(b))?,
            other => write!(f, "\\x{:02X}", other)?,
        }
    }
    write!(f, "\"")
}


/// An owned byte buffer.
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DisplayBytesVec(Vec<u8>);
impl DisplayBytesVec {
    pub fn as_slice(&self) -> &[u8] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
impl fmt::Debug for DisplayBytesVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayBytesVec({})", self)
    }
}
impl fmt::Display for DisplayBytesVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, &self.0)
    }
}
impl From<Vec<u8>> for DisplayBytesVec {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}
impl From<&[u8]> for DisplayBytesVec {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}
impl AsRef<[u8]> for DisplayBytesVec {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
impl Deref for DisplayBytesVec {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for DisplayBytesVec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


/// A borrowed byte buffer, mostly useful for logging.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DisplayBytesSlice<'a>(&'a [u8]);
impl<'a> fmt::Debug for DisplayBytesSlice<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayBytesSlice({})", self)
    }
}
impl<'a> fmt::Display for DisplayBytesSlice<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, self.0)
    }
}
impl<'a> From<&'a [u8]> for DisplayBytesSlice<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self(value)
    }
}
