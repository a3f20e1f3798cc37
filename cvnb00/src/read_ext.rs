use std::io::{self, Read, Seek, SeekFrom};

use tracing::error;

use crate::Error;


pub(crate) trait ReadExt {
    fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<usize, io::Error>;
}
impl<R: Read + ?Sized> ReadExt for R {
    fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        let mut total_bytes_read = 0;
        while total_bytes_read < buf.len() {
            let bytes_read_this_time = match self.read(&mut buf[total_bytes_read..]) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if bytes_read_this_time == 0 {
                // EOF, break out
                break;
            }
            total_bytes_read += bytes_read_this_time;
        }
        Ok(total_bytes_read)
    }
}


pub(crate) trait ReadSeekExt : Read + Seek {
    /// Fills `buf` completely or fails with [`Error::TruncatedRead`].
    fn read_exact_checked(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let offset = self.stream_position()?;
        let available = self.read_exact_or_eof(buf)?;
        if available < buf.len() {
            error!("wanted {} bytes at offset {:#X}, file ends after {}", buf.len(), offset, available);
            return Err(Error::TruncatedRead {
                offset,
                requested: buf.len(),
                available,
            });
        }
        Ok(())
    }

    /// Runs `f`, then returns the stream to where it was before, whether `f` succeeded or not.
    fn with_saved_position<T, F>(&mut self, f: F) -> Result<T, Error>
        where
            Self : Sized,
            F : FnOnce(&mut Self) -> Result<T, Error> {
        let saved_position = self.stream_position()?;
        let result = f(self);
        let restored = self.seek(SeekFrom::Start(saved_position));
        let value = result?;
        restored?;
        Ok(value)
    }
}
impl<R: Read + Seek> ReadSeekExt for R {}
