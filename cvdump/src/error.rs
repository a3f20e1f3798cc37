use std::fmt;
use std::io;
use std::path::PathBuf;


#[derive(Debug)]
pub enum Error {
    Open { path: PathBuf, error: io::Error },
    Write { path: PathBuf, error: io::Error },
    CodeView(cvnb00::Error),
    Json(serde_json::Error),
    NoSuchSubsection { index: usize, count: usize },
}
impl Error {
    pub fn is_signature_not_found(&self) -> bool {
        match self {
            Self::CodeView(e) => e.is_signature_not_found(),
            _ => false,
        }
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, error }
                => write!(f, "failed to open {}: {}", path.display(), error),
            Self::Write { path, error }
                => write!(f, "failed to write {}: {}", path.display(), error),
            Self::CodeView(e)
                => write!(f, "failed to read CodeView data: {}", e),
            Self::Json(e)
                => write!(f, "failed to serialize to JSON: {}", e),
            Self::NoSuchSubsection { index, count }
                => write!(f, "no subsection {} (the directory has {} entries)", index, count),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { error, .. } => Some(error),
            Self::Write { error, .. } => Some(error),
            Self::CodeView(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::NoSuchSubsection { .. } => None,
        }
    }
}
impl From<cvnb00::Error> for Error {
    fn from(value: cvnb00::Error) -> Self { Self::CodeView(value) }
}
impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self { Self::Json(value) }
}
