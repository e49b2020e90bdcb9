//! Encode-side helpers for varints, strings and booleans over `BytesMut`.
//!
//! The decode side lives in [`Reader`](super::Reader).

use bytes::{
    BufMut,
    BytesMut,
};

use super::reader::{
    BOOL_FALSE,
    BOOL_TRUE,
};

/// Write a varint-encoded u64 to a byte buffer
pub fn write_varint(buffer: &mut BytesMut, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80;
        }

        buffer.put_u8(byte);

        if value == 0 {
            break;
        }
    }
}

/// Write a length-prefixed string to a byte buffer
pub fn write_string(buffer: &mut BytesMut, s: &str) {
    write_varint(buffer, s.len() as u64);
    buffer.put_slice(s.as_bytes());
}

pub fn write_bool(buffer: &mut BytesMut, v: bool) {
    buffer.put_u8(if v { BOOL_TRUE } else { BOOL_FALSE });
}
