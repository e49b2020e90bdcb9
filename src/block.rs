//! Data block headers.
//!
//! ## Wire Format
//!
//! ```text
//! [table name: String]        // data packets only, if TempTables
//! [block info]                // if BlockInfo
//! [columns: VarUInt]
//! [rows:    VarUInt]
//! [column headers and data]   // see crate::result and crate::input
//! ```
//!
//! Block info is a list of numbered fields terminated by field 0:
//!
//! ```text
//! 1 [is_overflows: Bool]
//! 2 [bucket_num:   Int32]
//! 0
//! ```

use crate::{
    input::{
        Input,
        TypeEncoding,
    },
    io::{
        buffer_utils,
        Reader,
    },
    protocol::{
        Feature,
        ProtocolVersion,
    },
    result::DecodeResult,
    Error,
    Result,
    ResultExt,
};
use bytes::{
    BufMut,
    BytesMut,
};
use tracing::debug;

/// Block metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub is_overflows: bool,
    pub bucket_num: i32,
}

impl Default for BlockInfo {
    fn default() -> Self {
        Self { is_overflows: false, bucket_num: -1 }
    }
}

impl BlockInfo {
    pub fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut info = BlockInfo::default();
        loop {
            match reader.read_varint()? {
                0 => return Ok(info),
                1 => info.is_overflows = reader.read_bool()?,
                2 => info.bucket_num = reader.read_i32()?,
                n => {
                    return Err(Error::Protocol(format!(
                        "unknown block info field {}",
                        n
                    )))
                }
            }
        }
    }

    pub fn encode(&self, buffer: &mut BytesMut) {
        buffer_utils::write_varint(buffer, 1);
        buffer_utils::write_bool(buffer, self.is_overflows);
        buffer_utils::write_varint(buffer, 2);
        buffer.put_i32_le(self.bucket_num);
        buffer_utils::write_varint(buffer, 0);
    }
}

/// Shape of a data block: how many columns and rows its body carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Block {
    pub info: BlockInfo,
    pub columns: usize,
    pub rows: usize,
}

impl Block {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { info: BlockInfo::default(), columns, rows }
    }

    pub fn decode_header(
        reader: &mut Reader<'_>,
        proto: &ProtocolVersion,
    ) -> Result<Self> {
        let info = if proto.supports(Feature::BlockInfo) {
            BlockInfo::decode(reader).context(|| "block info")?
        } else {
            BlockInfo::default()
        };
        let columns = reader.read_varint().context(|| "columns")? as usize;
        let rows = reader.read_varint().context(|| "rows")? as usize;
        Ok(Self { info, columns, rows })
    }

    pub fn encode_header(&self, buffer: &mut BytesMut, proto: &ProtocolVersion) {
        if proto.supports(Feature::BlockInfo) {
            self.info.encode(buffer);
        }
        buffer_utils::write_varint(buffer, self.columns as u64);
        buffer_utils::write_varint(buffer, self.rows as u64);
    }

    /// Read a block header, then hand the body to `target`.
    pub fn decode(
        reader: &mut Reader<'_>,
        proto: &ProtocolVersion,
        target: &mut dyn DecodeResult,
    ) -> Result<Self> {
        let block = Self::decode_header(reader, proto)?;
        debug!(
            columns = block.columns,
            rows = block.rows,
            revision = proto.revision,
            "read block header"
        );
        target.decode_result(reader, proto, &block)?;
        Ok(block)
    }

    /// Write the header for `input` followed by its columns.
    pub fn encode(
        buffer: &mut BytesMut,
        proto: &ProtocolVersion,
        input: &Input,
        encoding: TypeEncoding,
    ) -> Result<Self> {
        let block = input.block()?;
        debug!(
            columns = block.columns,
            rows = block.rows,
            revision = proto.revision,
            "writing block"
        );
        block.encode_header(buffer, proto);
        input.encode(buffer, proto, encoding);
        Ok(block)
    }
}

/// Decode the body of a data packet: table name, then a block.
pub fn decode_data(
    reader: &mut Reader<'_>,
    proto: &ProtocolVersion,
    target: &mut dyn DecodeResult,
) -> Result<(String, Block)> {
    let table = if proto.supports(Feature::TempTables) {
        reader.read_string().context(|| "table name")?
    } else {
        String::new()
    };
    let block = Block::decode(reader, proto, target)?;
    Ok((table, block))
}

/// Encode the body of a data packet for `input` under `table`.
///
/// The table name is dropped when the revision predates temporary tables.
pub fn encode_data(
    buffer: &mut BytesMut,
    proto: &ProtocolVersion,
    table: &str,
    input: &Input,
    encoding: TypeEncoding,
) -> Result<Block> {
    if proto.supports(Feature::TempTables) {
        buffer_utils::write_string(buffer, table);
    }
    Block::encode(buffer, proto, input, encoding)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_block_info_round_trip() {
        let info = BlockInfo { is_overflows: true, bucket_num: 42 };
        let mut buf = BytesMut::new();
        info.encode(&mut buf);
        assert_eq!(&buf[..], &[1, 1, 2, 42, 0, 0, 0, 0]);

        let decoded = BlockInfo::decode(&mut Reader::new(&buf[..])).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn test_block_info_defaults_and_unknown_field() {
        let decoded = BlockInfo::decode(&mut Reader::new(&[0u8][..])).unwrap();
        assert_eq!(decoded, BlockInfo::default());
        assert_eq!(decoded.bucket_num, -1);

        assert!(BlockInfo::decode(&mut Reader::new(&[3u8, 0][..])).is_err());
    }

    #[test]
    fn test_header_round_trip() {
        let block = Block::new(3, 1000);
        for proto in [ProtocolVersion::CURRENT, ProtocolVersion::new(51_000)] {
            let mut buf = BytesMut::new();
            block.encode_header(&mut buf, &proto);

            let mut reader = Reader::new(&buf[..]);
            let decoded = Block::decode_header(&mut reader, &proto).unwrap();
            assert_eq!(decoded, block);
            assert_eq!(reader.offset(), buf.len() as u64);
        }
    }

    #[test]
    fn test_header_without_block_info() {
        let mut buf = BytesMut::new();
        Block::new(2, 5).encode_header(&mut buf, &ProtocolVersion::new(51_000));
        assert_eq!(&buf[..], &[2, 5]);
    }

    #[test]
    fn test_truncated_header_has_context() {
        let err = Block::decode_header(
            &mut Reader::new(&[2u8][..]),
            &ProtocolVersion::new(51_000),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("rows"));
    }
}
