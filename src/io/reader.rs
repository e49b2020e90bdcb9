//! Sequential reader over a buffered byte source.
//!
//! Wraps any [`BufRead`] so that columns and the result decoder can consume
//! primitives in stream order. The only non-consuming operation is
//! [`Reader::peek`], which looks at already buffered data.

use crate::{
    Error,
    Result,
};
use std::io::{
    BufRead,
    ErrorKind,
    Read,
};

/// Upper bound for length-prefixed strings.
const MAX_STRING_LEN: usize = 0x00FF_FFFF;

pub const BOOL_FALSE: u8 = 0;
pub const BOOL_TRUE: u8 = 1;

pub struct Reader<'a> {
    raw: Box<dyn BufRead + 'a>,
    offset: u64,
}

impl<'a> Reader<'a> {
    pub fn new<R: BufRead + 'a>(raw: R) -> Self {
        Self { raw: Box::new(raw), offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Look at the next byte without consuming it.
    ///
    /// Fails with `UnexpectedEof` when the source has no more buffered data.
    pub fn peek(&mut self) -> Result<u8> {
        let buf = self.raw.fill_buf()?;
        buf.first().copied().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "peek: no buffered data",
            ))
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.raw.read_exact(&mut b)?;
        self.offset += 1;
        Ok(b[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            BOOL_FALSE => Ok(false),
            BOOL_TRUE => Ok(true),
            v => Err(Error::Protocol(format!("unexpected value {} for boolean", v))),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let mut b = [0u8; 4];
        self.raw.read_exact(&mut b)?;
        self.offset += 4;
        Ok(i32::from_le_bytes(b))
    }

    /// Read a varint-encoded u64
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0;

        loop {
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as u64) << shift;

            if byte & 0x80 == 0 {
                break;
            }

            shift += 7;
            if shift >= 64 {
                return Err(Error::Protocol("Varint overflow".to_string()));
            }
        }

        Ok(result)
    }

    /// Read exactly `n` bytes.
    ///
    /// Reads incrementally, so a bogus length on a short stream fails with
    /// `UnexpectedEof` instead of allocating `n` bytes up front.
    pub fn read_raw(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let got = (&mut self.raw).take(n as u64).read_to_end(&mut buf)?;
        self.offset += got as u64;
        if got < n {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("read {} of {} bytes", got, n),
            )));
        }
        Ok(buf)
    }

    /// Read a length-prefixed string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_varint()? as usize;

        if len > MAX_STRING_LEN {
            return Err(Error::Protocol(format!(
                "String length too large: {}",
                len
            )));
        }

        let buf = self.read_raw(len)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl std::fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader").field("offset", &self.offset).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::buffer_utils::{
        write_string,
        write_varint,
    };
    use bytes::{
        BufMut,
        BytesMut,
    };

    #[test]
    fn test_peek_does_not_consume() {
        let data = [7u8, 8];
        let mut r = Reader::new(&data[..]);

        assert_eq!(r.peek().unwrap(), 7);
        assert_eq!(r.peek().unwrap(), 7);
        assert_eq!(r.offset(), 0);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.peek().unwrap(), 8);
    }

    #[test]
    fn test_peek_on_empty_source_fails() {
        let mut r = Reader::new(&[][..]);
        let err = r.peek().unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_read_bool() {
        let mut r = Reader::new(&[1u8, 0, 2][..]);
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());
        assert!(r.read_bool().is_err());
    }

    #[test]
    fn test_read_string_and_varint() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 300);
        write_string(&mut buf, "Time64(3)");
        buf.put_i32_le(-5);

        let mut r = Reader::new(&buf[..]);
        assert_eq!(r.read_varint().unwrap(), 300);
        assert_eq!(r.read_string().unwrap(), "Time64(3)");
        assert_eq!(r.read_i32().unwrap(), -5);
        assert_eq!(r.offset(), buf.len() as u64);
    }

    #[test]
    fn test_read_raw_short_stream() {
        let mut r = Reader::new(&[1u8, 2, 3][..]);
        let err = r.read_raw(8).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_read_string_truncated() {
        let mut buf = BytesMut::new();
        write_varint(&mut buf, 100);
        buf.put_slice(b"only10");

        let mut r = Reader::new(&buf[..]);
        assert!(r.read_string().is_err());
    }

    #[test]
    fn test_varint_overflow() {
        let data = [0xFFu8; 10];
        let mut r = Reader::new(&data[..]);
        assert!(r.read_varint().is_err());
    }
}
