use std::fmt;
use std::io;

use display_bytes::DisplayBytesVec;

use crate::code_view::SubsectionType;


#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    SignatureNotFound,
    TruncatedRead { offset: u64, requested: usize, available: usize },
    TruncatedPayload { subsection_type: SubsectionType, offset: usize, requested: usize, available: usize },
    InvalidSubsectionType { value: u16 },
    InvalidEncoding { subsection_type: Option<SubsectionType>, module_index: Option<u16>, bytes: DisplayBytesVec },
}
impl Error {
    /// Whether this error only means that the file carries no CodeView data.
    pub fn is_signature_not_found(&self) -> bool {
        matches!(self, Self::SignatureNotFound)
    }

    /// Whether CodeView data was found but violates the format.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::Io(_) => false,
            Self::SignatureNotFound => false,
            Self::TruncatedRead { .. } => true,
            Self::TruncatedPayload { .. } => true,
            Self::InvalidSubsectionType { .. } => true,
            Self::InvalidEncoding { .. } => true,
        }
    }

    /// Records which kind of subsection held the offending name.
    pub(crate) fn in_subsection(self, subsection_type: SubsectionType) -> Self {
        match self {
            Self::InvalidEncoding { module_index, bytes, .. } => Self::InvalidEncoding {
                subsection_type: Some(subsection_type),
                module_index,
                bytes,
            },
            other => other,
        }
    }

    /// Records which module the subsection holding the offending name belongs to.
    pub(crate) fn in_module(self, module_index: u16) -> Self {
        match self {
            Self::InvalidEncoding { subsection_type, bytes, .. } => Self::InvalidEncoding {
                subsection_type,
                module_index: Some(module_index),
                bytes,
            },
            other => other,
        }
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)
                => write!(f, "I/O error: {}", e),
            Self::SignatureNotFound
                => write!(f, "no CodeView signature found near the end of the file"),
            Self::TruncatedRead { offset, requested, available }
                => write!(f, "file truncated: wanted {} bytes at offset {:#X}, got {}", requested, offset, available),
            Self::TruncatedPayload { subsection_type, offset, requested, available }
                => write!(f, "{:?} subsection truncated: wanted {} bytes at payload offset {}, only {} remain", subsection_type, requested, offset, available),
            Self::InvalidSubsectionType { value }
                => write!(f, "invalid subsection type {:#06X}", value),
            Self::InvalidEncoding { subsection_type: None, bytes, .. }
                => write!(f, "name is not valid ASCII: {}", bytes),
            Self::InvalidEncoding { subsection_type: Some(subsection_type), module_index: None, bytes }
                => write!(f, "name in {:?} subsection is not valid ASCII: {}", subsection_type, bytes),
            Self::InvalidEncoding { subsection_type: Some(subsection_type), module_index: Some(module_index), bytes }
                => write!(f, "name in {:?} subsection of module {} is not valid ASCII: {}", subsection_type, module_index, bytes),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::SignatureNotFound => None,
            Self::TruncatedRead { .. } => None,
            Self::TruncatedPayload { .. } => None,
            Self::InvalidSubsectionType { .. } => None,
            Self::InvalidEncoding { .. } => None,
        }
    }
}
impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self { Self::Io(value) }
}
