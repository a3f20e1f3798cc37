//! Subsection records and the decoders for the subsection types that have one.


use display_bytes::DisplayBytesVec;
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::Error;
use crate::code_view::SubsectionType;
use crate::payload::PayloadReader;


/// One entry of the subsection directory along with its payload.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SubsectionRecord {
    pub subsection_type: SubsectionType,
    pub module_index: u16, // 0 if not specific to a module
    pub data: DisplayBytesVec,
    pub content: SubsectionContent,
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SubsectionContent {
    Module(ModuleSubsection),
    Publics(PublicsSubsection),

    /// No decoder for this type; see `SubsectionRecord::data`.
    Opaque,
}


type DecodeFn = fn(&[u8]) -> Result<SubsectionContent, Error>;

const DECODERS: [(SubsectionType, DecodeFn); 2] = [
    (SubsectionType::Modules, decode_module as DecodeFn),
    (SubsectionType::Publics, decode_publics as DecodeFn),
];

fn decode_module(data: &[u8]) -> Result<SubsectionContent, Error> {
    ModuleSubsection::decode(data)
        .map(SubsectionContent::Module)
}

fn decode_publics(data: &[u8]) -> Result<SubsectionContent, Error> {
    PublicsSubsection::decode(data)
        .map(SubsectionContent::Publics)
}


/// Decodes the payload of a subsection of the given type.
///
/// Types without a decoder yield [`SubsectionContent::Opaque`]. Types outside the nine known ones
/// are rejected.
pub fn decode_content(subsection_type: SubsectionType, data: &[u8]) -> Result<SubsectionContent, Error> {
    if !subsection_type.is_known() {
        error!("refusing to decode {:?}, which is not one of the known types", subsection_type);
        return Err(Error::InvalidSubsectionType { value: subsection_type.to_base_type() });
    }

    let decoder = DECODERS
        .iter()
        .find(|(decoder_type, _)| *decoder_type == subsection_type)
        .map(|(_, decoder)| *decoder);
    match decoder {
        Some(decoder) => decoder(data),
        None => {
            debug!("no decoder for {:?}, keeping {} bytes as they are", subsection_type, data.len());
            Ok(SubsectionContent::Opaque)
        },
    }
}

/// Decodes a subsection payload into a record.
#[instrument(skip(data))]
pub fn decode(subsection_type: SubsectionType, module_index: u16, data: Vec<u8>) -> Result<SubsectionRecord, Error> {
    let content = decode_content(subsection_type, &data)
        .map_err(|e| e.in_module(module_index))?;
    Ok(SubsectionRecord {
        subsection_type,
        module_index,
        data: DisplayBytesVec::from(data),
        content,
    })
}


/// Describes one module (compilation unit) and where its code lives.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ModuleSubsection {
    pub code_base: u16,
    pub code_offset: u16,
    pub code_length: u16,
    pub overlay_number: u16,
    pub library_index: u8,
    pub library_flags: u8,
    pub segment_count: u8,
    pub reserved: u8,
    // name_length: u8,
    // padding
    pub name: String, // [u8; name_length], at the very end of the payload
}
impl ModuleSubsection {
    pub const FIXED_SIZE: usize = 13;

    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut reader = PayloadReader::new(SubsectionType::Modules, data);

        let code_base = reader.read_u16_le()?;
        let code_offset = reader.read_u16_le()?;
        let code_length = reader.read_u16_le()?;
        let overlay_number = reader.read_u16_le()?;
        let [library_index, library_flags] = reader.read_u16_le()?.to_le_bytes();
        let segment_count = reader.read_u8()?;
        let reserved = reader.read_u8()?;
        let name_length = usize::from(reader.read_u8()?);

        // anchored to the end; anything between the fixed part and the name is padding
        let padding_length = reader.remaining().checked_sub(name_length)
            .ok_or_else(|| reader.truncated(name_length))?;
        reader.skip(padding_length)?;
        let name = reader.read_ascii(name_length)?;

        Ok(Self {
            code_base,
            code_offset,
            code_length,
            overlay_number,
            library_index,
            library_flags,
            segment_count,
            reserved,
            name,
        })
    }
}


#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PublicSymbol {
    pub offset: u16,
    pub segment: u16,
    pub type_index: u16,
    // name_length: u8,
    pub name: String, // [u8; name_length]
}
impl PublicSymbol {
    pub const FIXED_SIZE: usize = 7;

    fn read(reader: &mut PayloadReader<'_>) -> Result<Self, Error> {
        let offset = reader.read_u16_le()?;
        let segment = reader.read_u16_le()?;
        let type_index = reader.read_u16_le()?;
        let name_length = reader.read_u8()?;
        let name = reader.read_ascii(name_length.into())?;

        Ok(Self {
            offset,
            segment,
            type_index,
            name,
        })
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PublicsSubsection {
    pub symbols: Vec<PublicSymbol>, // until the payload runs out
}
impl PublicsSubsection {
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut reader = PayloadReader::new(SubsectionType::Publics, data);

        let mut symbols = Vec::new();
        while !reader.is_at_end() {
            let symbol = PublicSymbol::read(&mut reader)?;
            symbols.push(symbol);
        }

        Ok(Self {
            symbols,
        })
    }
}
