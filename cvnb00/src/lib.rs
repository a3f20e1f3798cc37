//! Decoding of CodeView "NB00" debug information appended to 16-bit MZ executables.
//!
//! The linker appends the debug data to the end of the executable and closes the file with a
//! trailer pointing back at its start. [`locate`] finds that trailer, [`read_directory`] walks the
//! subsection directory, and [`decode`] turns each subsection payload into a typed record.
//! [`read_debug_info`] strings the three together.


pub mod code_view;
mod error;
mod payload;
mod read_ext;


use std::io::{Read, Seek};

pub use crate::code_view::{
    DebugInfo, InvalidNamePolicy, ReadOptions, Signature, SubsectionType, locate,
};
pub use crate::code_view::directory::{
    SubsectionHeader, read_directory, read_directory_with_options,
};
pub use crate::code_view::subsections::{
    ModuleSubsection, PublicSymbol, PublicsSubsection, SubsectionContent, SubsectionRecord, decode,
    decode_content,
};
pub use crate::error::Error;


/// Locates the CodeView data in `reader` and decodes its whole subsection directory.
pub fn read_debug_info<R: Read + Seek>(reader: &mut R, options: &ReadOptions) -> Result<DebugInfo, Error> {
    DebugInfo::read(reader, options)
}


pub(crate) fn decode_ascii(bytes: &[u8]) -> Result<String, Error> {
    if !bytes.is_ascii() {
        return Err(Error::InvalidEncoding {
            subsection_type: None,
            module_index: None,
            bytes: bytes.into(),
        });
    }
    Ok(bytes.iter().copied().map(char::from).collect())
}
