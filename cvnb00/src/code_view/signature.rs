use std::io::{Read, Seek, SeekFrom};

#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{Error, decode_ascii};
use crate::read_ext::{ReadExt, ReadSeekExt};


pub const SIGNATURE_PREFIX: &[u8; 3] = b"NB0";

/// Distances from the end of the file at which a trailer may start, nearest first.
const TRAILER_DISTANCES: std::ops::RangeInclusive<u64> = 8..=255;


/// The CodeView header found by [`locate`].
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Signature {
    pub signature: String, // e.g. "NB00"
    pub base_offset: u64,
    pub directory_offset: u64,
}


fn split_header(buf: &[u8; 8]) -> ([u8; 4], u32) {
    let signature = buf[0..4].try_into().unwrap();
    let value = u32::from_le_bytes(buf[4..8].try_into().unwrap());
    (signature, value)
}


/// Finds the CodeView trailer near the end of the file and follows it back to the debug data.
///
/// Every byte position between 8 and 255 bytes before EOF is tried, nearest first. A candidate
/// must start with `NB0`, its back-pointer must land inside the file, and the header at that
/// location must start with `NB0` as well.
///
/// Fails with [`Error::SignatureNotFound`] if no candidate checks out; this is the normal outcome
/// for executables linked without debug information.
#[instrument(skip_all)]
pub fn locate<R: Read + Seek>(reader: &mut R) -> Result<Signature, Error> {
    let file_size = reader.seek(SeekFrom::End(0))?;

    for distance in TRAILER_DISTANCES {
        let Some(trailer_pos) = file_size.checked_sub(distance) else {
            // the file is shorter than this, so every farther candidate is out as well
            break;
        };

        reader.seek(SeekFrom::Start(trailer_pos))?;
        let mut trailer_buf = [0u8; 8];
        reader.read_exact_checked(&mut trailer_buf)?;
        let (signature, back_offset) = split_header(&trailer_buf);
        if !signature.starts_with(SIGNATURE_PREFIX) {
            continue;
        }

        let read_pos = trailer_pos + 8;
        let Some(base_offset) = read_pos.checked_sub(back_offset.into()) else {
            debug!("candidate at {:#X} points {:#X} bytes back, before the start of the file", trailer_pos, back_offset);
            continue;
        };
        if base_offset > file_size {
            debug!("candidate at {:#X} points past the end of the file", trailer_pos);
            continue;
        }

        reader.seek(SeekFrom::Start(base_offset))?;
        let mut header_buf = [0u8; 8];
        let header_bytes_read = reader.read_exact_or_eof(&mut header_buf)?;
        if header_bytes_read < header_buf.len() {
            debug!("candidate at {:#X} points to {:#X}, too close to the end of the file", trailer_pos, base_offset);
            continue;
        }
        let (nested_signature, directory_relative_offset) = split_header(&header_buf);
        if !nested_signature.starts_with(SIGNATURE_PREFIX) {
            debug!("candidate at {:#X} points to {:#X}, which has no signature", trailer_pos, base_offset);
            continue;
        }

        let signature = decode_ascii(&signature)?;
        let directory_offset = base_offset + u64::from(directory_relative_offset);
        debug!(
            "found {} trailer at {:#X}: base {:#X}, directory {:#X}",
            signature, trailer_pos, base_offset, directory_offset,
        );
        return Ok(Signature {
            signature,
            base_offset,
            directory_offset,
        });
    }

    Err(Error::SignatureNotFound)
}
