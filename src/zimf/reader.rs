//! Module implement random access binary reader for zim archives.

use std::io::{self, Read, Seek};

use crate::Result;

/// Little-endian reader over the zim archive content. All multi-byte
/// integers in a zim file are little-endian, strings are zero-terminated
/// UTF-8.
pub struct Reader<R> {
    inner: R,
}

impl<R> Reader<R>
where
    R: Read + Seek,
{
    pub fn new(inner: R) -> Reader<R> {
        Reader { inner }
    }

    /// Seek to absolute offset `fpos`.
    pub fn seek(&mut self, fpos: u64) -> Result<u64> {
        err_at!(IOError, self.inner.seek(io::SeekFrom::Start(fpos)))
    }

    /// Seek relative to the current position.
    pub fn seek_rel(&mut self, delta: i64) -> Result<u64> {
        err_at!(IOError, self.inner.seek(io::SeekFrom::Current(delta)))
    }

    /// Read exactly `n` bytes from the current position.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; n];
        err_at!(IOError, self.inner.read_exact(&mut buf))?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0_u8; 1];
        err_at!(IOError, self.inner.read_exact(&mut buf))?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0_u8; 2];
        err_at!(IOError, self.inner.read_exact(&mut buf))?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0_u8; 4];
        err_at!(IOError, self.inner.read_exact(&mut buf))?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0_u8; 8];
        err_at!(IOError, self.inner.read_exact(&mut buf))?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read bytes until NUL or end-of-file, decode them as UTF-8.
    pub fn read_cstring(&mut self) -> Result<String> {
        let mut bs = vec![];
        let mut buf = [0_u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => break,
                Ok(_) if buf[0] == 0 => break,
                Ok(_) => bs.push(buf[0]),
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
                Err(err) => err_at!(IOError, msg: "{}", err)?,
            }
        }
        match String::from_utf8(bs) {
            Ok(s) => Ok(s),
            Err(err) => err_at!(DecodeFail, msg: "bad cstring {}", err),
        }
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod reader_test;
