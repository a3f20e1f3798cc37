//! Bounds-checked reading from an in-memory subsection payload.


use tracing::error;

use crate::{Error, decode_ascii};
use crate::code_view::SubsectionType;


#[derive(Clone, Debug)]
pub(crate) struct PayloadReader<'a> {
    subsection_type: SubsectionType,
    data: &'a [u8],
    pos: usize,
}
impl<'a> PayloadReader<'a> {
    pub fn new(subsection_type: SubsectionType, data: &'a [u8]) -> Self {
        Self {
            subsection_type,
            data,
            pos: 0,
        }
    }

    pub fn remaining(&self) -> usize { self.data.len() - self.pos }
    pub fn is_at_end(&self) -> bool { self.pos == self.data.len() }

    pub fn truncated(&self, requested: usize) -> Error {
        error!(
            "{:?} payload needs {} bytes at offset {} but only {} remain",
            self.subsection_type, requested, self.pos, self.remaining(),
        );
        Error::TruncatedPayload {
            subsection_type: self.subsection_type,
            offset: self.pos,
            requested,
            available: self.remaining(),
        }
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], Error> {
        if count > self.remaining() {
            return Err(self.truncated(count));
        }
        let ret = &self.data[self.pos..self.pos+count];
        self.pos += count;
        Ok(ret)
    }

    pub fn skip(&mut self, count: usize) -> Result<(), Error> {
        self.read_bytes(count)?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, Error> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a name of `count` ASCII bytes.
    pub fn read_ascii(&mut self, count: usize) -> Result<String, Error> {
        let bytes = self.read_bytes(count)?;
        decode_ascii(bytes)
            .map_err(|e| e.in_subsection(self.subsection_type))
    }
}
