//! Debug information in the CodeView NB00 format.
//!
//! NB00 is written by Microsoft LINK 3.x through 5.03. The debug data is appended to the end of
//! an MZ executable and laid out as follows (all integers little-endian, "base" being the file
//! offset of the debug data header):
//!
//! ```text
//! base + 0:  b"NB00", u32 directory offset relative to base
//! ...        subsection payloads
//! directory: u16 count, then count * { u16 type, u16 module, u32 offset from base, u16 length }
//! EOF - 8:   b"NB00", u32 distance from the end of this trailer back to base
//! ```
//!
//! Later linkers (NB01, NB02) keep the same trailer, so the locator accepts any signature in the
//! `NB0` family.
//!
//! The structures follow chapter 3 ("Extended .EXE Format for Debug Information") of the
//! Microsoft C 6.0 Developer's Toolkit Reference Manual.


pub mod directory;
mod signature;
pub mod subsections;
#[cfg(test)]
pub(crate) mod test_image;


use std::io::{Read, Seek, SeekFrom};

use from_to_repr::from_to_other;
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, instrument};

use crate::Error;
use crate::code_view::directory::read_directory_with_options;
use crate::code_view::subsections::{
    ModuleSubsection, PublicSymbol, SubsectionContent, SubsectionRecord,
};

pub use crate::code_view::signature::{Signature, locate};


#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[from_to_other(base_type = u16, derive_compare = "as_int")]
pub enum SubsectionType {
    Modules = 0x101,
    Publics = 0x102,
    Types = 0x103,
    Symbols = 0x104,
    SourceLines = 0x105,
    Libraries = 0x106,
    Imports = 0x107,
    Compacted = 0x108,
    SourceLineSegment = 0x109,
    Other(u16),
}
impl SubsectionType {
    /// Whether this is one of the nine subsection types NB00 defines.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}


/// What to do with a subsection whose name is not ASCII.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum InvalidNamePolicy {
    /// Fail the whole read.
    #[default]
    Abort,

    /// Keep the subsection as an opaque record and carry on with the rest of the directory.
    KeepRaw,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ReadOptions {
    pub invalid_names: InvalidNamePolicy,
}


#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DebugInfo {
    pub signature: Signature,
    pub subsections: Vec<SubsectionRecord>, // in directory order
}
impl DebugInfo {
    #[instrument(skip_all)]
    pub fn read<R: Read + Seek>(reader: &mut R, options: &ReadOptions) -> Result<Self, Error> {
        let signature = locate(reader)?;

        debug!("seeking to subsection directory at {:#X}", signature.directory_offset);
        reader.seek(SeekFrom::Start(signature.directory_offset))?;
        let subsections = read_directory_with_options(reader, signature.base_offset, options)?;

        Ok(Self {
            signature,
            subsections,
        })
    }

    /// The decoded module subsections along with their module indexes.
    pub fn modules(&self) -> impl Iterator<Item = (u16, &ModuleSubsection)> + '_ {
        self.subsections
            .iter()
            .filter_map(|record| match &record.content {
                SubsectionContent::Module(module) => Some((record.module_index, module)),
                _ => None,
            })
    }

    /// All public symbols, in directory order, along with the index of the module exporting them.
    pub fn public_symbols(&self) -> impl Iterator<Item = (u16, &PublicSymbol)> + '_ {
        self.subsections
            .iter()
            .filter_map(|record| match &record.content {
                SubsectionContent::Publics(publics) => Some((record.module_index, publics)),
                _ => None,
            })
            .flat_map(|(module_index, publics)| {
                publics.symbols
                    .iter()
                    .map(move |symbol| (module_index, symbol))
            })
    }

    pub fn module_name(&self, module_index: u16) -> Option<&str> {
        self.modules()
            .find(|(index, _)| *index == module_index)
            .map(|(_, module)| module.name.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::{DebugInfo, InvalidNamePolicy, ReadOptions, SubsectionType};
    use crate::Error;
    use crate::code_view::subsections::SubsectionContent;
    use crate::code_view::test_image::{ImageBuilder, encode_module, encode_publics};
    use std::io::Cursor;
    use tracing_test::traced_test;

    #[test]
    fn test_subsection_type_values() {
        assert_eq!(SubsectionType::from_base_type(0x101), SubsectionType::Modules);
        assert_eq!(SubsectionType::from_base_type(0x107), SubsectionType::Imports);
        assert_eq!(SubsectionType::from_base_type(0x109), SubsectionType::SourceLineSegment);
        assert_eq!(SubsectionType::Compacted.to_base_type(), 0x108);
        assert!(SubsectionType::Types.is_known());
        assert!(!SubsectionType::from_base_type(0x10A).is_known());
        assert!(!SubsectionType::from_base_type(0x120).is_known());
    }

    #[test]
    #[traced_test]
    fn test_read_main_module() {
        let image = ImageBuilder::new()
            .subsection(0x101, 1, encode_module(0x0010, 0x0000, 0x0123, 0, 0, 1, b"MAIN"))
            .build();
        let mut cursor = Cursor::new(image);

        let info = DebugInfo::read(&mut cursor, &ReadOptions::default())
            .expect("failed to read debug info");
        assert_eq!(info.signature.signature, "NB00");
        assert_eq!(info.subsections.len(), 1);

        let record = &info.subsections[0];
        assert_eq!(record.subsection_type, SubsectionType::Modules);
        assert_eq!(record.module_index, 1);
        match &record.content {
            SubsectionContent::Module(module) => {
                assert_eq!(module.name, "MAIN");
                assert_eq!(module.code_base, 0x10);
                assert_eq!(module.code_length, 0x0123);
                assert_eq!(module.segment_count, 1);
            },
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    #[traced_test]
    fn test_queries() {
        let image = ImageBuilder::new()
            .subsection(0x101, 1, encode_module(0x0010, 0, 0x40, 0, 0, 1, b"MAIN"))
            .subsection(0x101, 2, encode_module(0x0010, 0x40, 0x20, 0, 1, 1, b"UTIL"))
            .subsection(0x103, 1, vec![0xAA; 5])
            .subsection(0x102, 1, encode_publics(&[(0x0000, 0x0010, 0, "_main")]))
            .subsection(0x102, 2, encode_publics(&[
                (0x0040, 0x0010, 0, "_util_init"),
                (0x0050, 0x0010, 0, "_util_run"),
            ]))
            .build();
        let mut cursor = Cursor::new(image);
        let info = DebugInfo::read(&mut cursor, &ReadOptions::default())
            .expect("failed to read debug info");

        let module_names: Vec<(u16, &str)> = info.modules()
            .map(|(index, module)| (index, module.name.as_str()))
            .collect();
        assert_eq!(module_names, vec![(1, "MAIN"), (2, "UTIL")]);

        let publics: Vec<(u16, &str)> = info.public_symbols()
            .map(|(index, symbol)| (index, symbol.name.as_str()))
            .collect();
        assert_eq!(publics, vec![(1, "_main"), (2, "_util_init"), (2, "_util_run")]);

        assert_eq!(info.module_name(2), Some("UTIL"));
        assert_eq!(info.module_name(3), None);
    }

    #[test]
    #[traced_test]
    fn test_invalid_name_policy() {
        let image = ImageBuilder::new()
            .subsection(0x101, 1, encode_module(0x0010, 0, 0x40, 0, 0, 1, b"M\xC4IN"))
            .subsection(0x101, 2, encode_module(0x0010, 0x40, 0x20, 0, 0, 1, b"UTIL"))
            .build();

        let mut cursor = Cursor::new(image.clone());
        match DebugInfo::read(&mut cursor, &ReadOptions::default()) {
            Err(e @ Error::InvalidEncoding { .. }) => {
                assert_eq!(e.to_string(), "name in Modules subsection of module 1 is not valid ASCII: b\"M\\xC4IN\"");
            },
            other => panic!("unexpected result {:?}", other),
        }

        let lenient = ReadOptions {
            invalid_names: InvalidNamePolicy::KeepRaw,
        };
        let mut cursor = Cursor::new(image);
        let info = DebugInfo::read(&mut cursor, &lenient)
            .expect("failed to read debug info leniently");
        assert_eq!(info.subsections.len(), 2);
        assert_eq!(info.subsections[0].content, SubsectionContent::Opaque);
        assert_eq!(info.subsections[0].subsection_type, SubsectionType::Modules);
        assert_eq!(info.subsections[0].module_index, 1);
        assert!(logs_contain("keeping it as raw bytes"));
        assert_eq!(info.module_name(2), Some("UTIL"));
    }

    #[test]
    fn test_no_codeview_data() {
        let mut image = b"MZ".to_vec();
        image.resize(600, 0x00);
        let mut cursor = Cursor::new(image);
        let error = DebugInfo::read(&mut cursor, &ReadOptions::default())
            .expect_err("read debug info from a plain executable");
        assert!(error.is_signature_not_found());
        assert!(!error.is_malformed());
    }
}
