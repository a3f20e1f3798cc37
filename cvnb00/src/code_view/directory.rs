//! The subsection directory.


use std::io::{Read, Seek, SeekFrom};

use display_bytes::{DisplayBytesSlice, DisplayBytesVec};
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::Error;
use crate::code_view::{InvalidNamePolicy, ReadOptions, SubsectionType};
use crate::code_view::subsections::{SubsectionContent, SubsectionRecord, decode_content};
use crate::read_ext::ReadSeekExt;


/// A directory entry pointing at one subsection payload.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SubsectionHeader {
    pub subsection_type: SubsectionType, // u16, never Other
    pub module_index: u16,
    pub offset: u32, // relative to the debug data base
    pub size_bytes: u16,
}
impl SubsectionHeader {
    pub const SIZE: usize = 10;

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, Error> {
        let mut header_buf = [0u8; Self::SIZE];
        reader.read_exact_checked(&mut header_buf)?;

        let subsection_type_u16 = u16::from_le_bytes(header_buf[0..2].try_into().unwrap());
        let subsection_type = SubsectionType::from_base_type(subsection_type_u16);
        if !subsection_type.is_known() {
            error!("subsection type {:#06X} is not one of the known types", subsection_type_u16);
            return Err(Error::InvalidSubsectionType { value: subsection_type_u16 });
        }
        let module_index = u16::from_le_bytes(header_buf[2..4].try_into().unwrap());
        let offset = u32::from_le_bytes(header_buf[4..8].try_into().unwrap());
        let size_bytes = u16::from_le_bytes(header_buf[8..10].try_into().unwrap());

        Ok(Self {
            subsection_type,
            module_index,
            offset,
            size_bytes,
        })
    }

    /// The absolute file offset of the payload.
    pub fn payload_position(&self, base_offset: u64) -> u64 {
        base_offset + u64::from(self.offset)
    }

    /// Reads the payload, leaving the stream where it was.
    pub fn read_payload<R: Read + Seek>(&self, reader: &mut R, base_offset: u64) -> Result<Vec<u8>, Error> {
        reader.with_saved_position(|r| {
            let position = self.payload_position(base_offset);
            debug!("seeking to {:#X} to read {} bytes", position, self.size_bytes);
            r.seek(SeekFrom::Start(position))?;
            let mut data = vec![0u8; self.size_bytes.into()];
            r.read_exact_checked(&mut data)?;
            Ok(data)
        })
    }
}


/// Reads the subsection directory and decodes every subsection with the default options.
///
/// See [`read_directory_with_options`].
pub fn read_directory<R: Read + Seek>(reader: &mut R, base_offset: u64) -> Result<Vec<SubsectionRecord>, Error> {
    read_directory_with_options(reader, base_offset, &ReadOptions::default())
}

/// Reads the subsection directory at the current position of `reader` and decodes every
/// subsection, returning them in directory order.
///
/// `base_offset` is the file offset of the debug data header; payload offsets are relative to it.
/// After each entry has been handled, the stream is positioned right behind that entry's header.
#[instrument(skip(reader, options))]
pub fn read_directory_with_options<R: Read + Seek>(
    reader: &mut R,
    base_offset: u64,
    options: &ReadOptions,
) -> Result<Vec<SubsectionRecord>, Error> {
    let mut count_buf = [0u8; 2];
    reader.read_exact_checked(&mut count_buf)?;
    let count = u16::from_le_bytes(count_buf);
    debug!("subsection directory has {} entries", count);

    let mut records = Vec::with_capacity(count.into());
    for _ in 0..count {
        let header = SubsectionHeader::read(reader)?;
        debug!("about to decode {:?}", header);

        let data = header.read_payload(reader, base_offset)?;
        debug!("payload: {}", DisplayBytesSlice::from(data.as_slice()));

        let decoded = decode_content(header.subsection_type, &data)
            .map_err(|e| e.in_module(header.module_index));
        let content = match decoded {
            Ok(content) => content,
            Err(Error::InvalidEncoding { bytes, .. }) if options.invalid_names == InvalidNamePolicy::KeepRaw => {
                warn!(
                    "{:?} subsection of module {} contains the non-ASCII name {}; keeping it as raw bytes",
                    header.subsection_type, header.module_index, bytes,
                );
                SubsectionContent::Opaque
            },
            Err(e) => return Err(e),
        };
        records.push(SubsectionRecord {
            subsection_type: header.subsection_type,
            module_index: header.module_index,
            data: DisplayBytesVec::from(data),
            content,
        });
    }

    Ok(records)
}
