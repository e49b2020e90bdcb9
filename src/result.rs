//! Decoding of query result blocks into columns.
//!
//! A data block body is a sequence of column headers, each followed by the
//! column's row data:
//!
//! ```text
//! for each column:
//!     [name: String]
//!     [type header]
//!     [state: column specific]   // rows > 0 only
//!     [data:  column specific]   // rows > 0 only
//! ```
//!
//! The type header is a plain type name, unless the connection negotiated
//! custom serialization. Then it starts with a boolean flag: `false` is
//! followed by the type name, `true` by a one-byte [`BinaryTypeCode`] and the
//! fields that code carries.
//!
//! [`Results`] decodes against a known schema (strict mode) and
//! [`AutoResults`] builds the schema from the first block it sees.

use crate::{
    block::Block,
    column::{
        new_column,
        Column,
    },
    io::{
        reader::{
            BOOL_FALSE,
            BOOL_TRUE,
        },
        Reader,
    },
    protocol::{
        Feature,
        ProtocolVersion,
    },
    types::{
        BinaryTypeCode,
        ColumnType,
    },
    Error,
    Result,
    ResultExt,
};
use tracing::{
    debug,
    trace,
};

/// Consumer of data block bodies.
pub trait DecodeResult {
    /// Decode the body of `block` from `reader`.
    fn decode_result(
        &mut self,
        reader: &mut Reader<'_>,
        proto: &ProtocolVersion,
        block: &Block,
    ) -> Result<()>;
}

/// Named column of a result set.
pub struct ResultColumn {
    /// Empty to accept whatever name the server sends.
    pub name: String,
    pub data: Box<dyn Column>,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, data: Box<dyn Column>) -> Self {
        Self { name: name.into(), data }
    }
}

impl std::fmt::Debug for ResultColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultColumn")
            .field("name", &self.name)
            .field("type", &self.data.column_type())
            .field("rows", &self.data.rows())
            .finish()
    }
}

/// Ordered result columns.
///
/// Decoding replaces the rows of every column with the rows of the current
/// block; it never accumulates across blocks.
#[derive(Debug, Default)]
pub struct Results {
    columns: Vec<ResultColumn>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column (builder pattern)
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data: Box<dyn Column>,
    ) -> Self {
        self.push(name, data);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, data: Box<dyn Column>) {
        self.columns.push(ResultColumn::new(name, data));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Row count of the first column, 0 when there are no columns.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.rows())
    }

    pub fn get(&self, index: usize) -> Option<&ResultColumn> {
        self.columns.get(index)
    }

    /// Column data by name.
    pub fn column(&self, name: &str) -> Option<&dyn Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.data.as_ref())
    }

    /// Column data by name, downcast to `C`.
    pub fn column_as<C: 'static>(&self, name: &str) -> Option<&C> {
        self.column(name)?.as_any().downcast_ref::<C>()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultColumn> {
        self.columns.iter()
    }

    pub fn into_inner(self) -> Vec<ResultColumn> {
        self.columns
    }

    /// Decoder that discovers the schema when `self` is empty.
    pub fn auto(&mut self) -> AutoResults<'_> {
        AutoResults { results: self }
    }
}

impl From<Vec<ResultColumn>> for Results {
    fn from(columns: Vec<ResultColumn>) -> Self {
        Self { columns }
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a ResultColumn;
    type IntoIter = std::slice::Iter<'a, ResultColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl std::ops::Index<usize> for Results {
    type Output = ResultColumn;

    fn index(&self, index: usize) -> &ResultColumn {
        &self.columns[index]
    }
}

impl DecodeResult for Results {
    /// Strict decode against the columns already present.
    ///
    /// An empty `Results` with a zero-row block only consumes the headers;
    /// this is how the server announces a schema before any data.
    fn decode_result(
        &mut self,
        reader: &mut Reader<'_>,
        proto: &ProtocolVersion,
        block: &Block,
    ) -> Result<()> {
        let no_target = self.columns.is_empty();
        let no_rows = block.rows == 0;
        if block.columns != self.columns.len() && !(no_target && no_rows) {
            return Err(Error::ColumnCount {
                block: block.columns,
                target: self.columns.len(),
            });
        }
        debug!(
            columns = block.columns,
            rows = block.rows,
            "decoding result block"
        );

        for i in 0..block.columns {
            let (name, column_type) = read_column_header(reader, proto, i)?;
            if no_target {
                trace!(index = i, name = %name, column_type = %column_type, "skipping column");
                continue;
            }

            let target = &mut self.columns[i];
            if target.name.is_empty() {
                target.name = name.clone();
            }
            if target.name != name {
                return Err(Error::ColumnName {
                    index: i,
                    expected: target.name.clone(),
                    actual: name,
                });
            }
            if let Some(inferable) = target.data.as_inferable() {
                inferable
                    .infer(&column_type)
                    .context(|| format!("column [{}] {}: infer", i, name))?;
            }
            let declared = target.data.column_type();
            if column_type.conflicts(&declared) {
                return Err(Error::TypeConflict {
                    index: i,
                    column: name,
                    expected: declared.to_string(),
                    actual: column_type.to_string(),
                });
            }

            target.data.reset();
            if no_rows {
                continue;
            }
            decode_data(&mut *target.data, reader, &name, block.rows)?;
        }
        Ok(())
    }
}

/// Schema-discovering decoder over a [`Results`].
///
/// The first block fills the empty target with one column per header, built
/// by [`new_column`]. Once the target has columns, decoding is strict.
pub struct AutoResults<'a> {
    results: &'a mut Results,
}

impl DecodeResult for AutoResults<'_> {
    fn decode_result(
        &mut self,
        reader: &mut Reader<'_>,
        proto: &ProtocolVersion,
        block: &Block,
    ) -> Result<()> {
        if !self.results.is_empty() {
            return self.results.decode_result(reader, proto, block);
        }
        debug!(
            columns = block.columns,
            rows = block.rows,
            "discovering result columns"
        );

        // Column count comes off the wire; grow as headers are read.
        let mut columns = Vec::new();
        for i in 0..block.columns {
            let (name, column_type) = read_column_header(reader, proto, i)?;
            let mut data = new_column(&column_type).context(|| {
                format!("column [{}] {}: type inference", i, name)
            })?;
            data.reset();
            if block.rows > 0 {
                decode_data(&mut *data, reader, &name, block.rows)?;
            }
            columns.push(ResultColumn { name, data });
        }
        self.results.columns.extend(columns);
        Ok(())
    }
}

/// Read optional state, then `rows` rows, into `data`.
fn decode_data(
    data: &mut dyn Column,
    reader: &mut Reader<'_>,
    name: &str,
    rows: usize,
) -> Result<()> {
    if let Some(state) = data.as_state_decoder() {
        state
            .decode_state(reader)
            .context(|| format!("{} state", name))?;
    }
    data.decode_column(reader, rows).context(|| name)
}

/// Read a column's name and type header.
pub(crate) fn read_column_header(
    reader: &mut Reader<'_>,
    proto: &ProtocolVersion,
    index: usize,
) -> Result<(String, ColumnType)> {
    let name = reader
        .read_string()
        .context(|| format!("column [{}] name", index))?;
    let column_type = read_column_type(reader, proto, index)?;
    trace!(index, name = %name, column_type = %column_type, "column header");
    Ok((name, column_type))
}

fn read_type_name(reader: &mut Reader<'_>, index: usize) -> Result<ColumnType> {
    reader
        .read_string()
        .map(ColumnType::from)
        .context(|| format!("column [{}] type", index))
}

fn read_column_type(
    reader: &mut Reader<'_>,
    proto: &ProtocolVersion,
    index: usize,
) -> Result<ColumnType> {
    if !proto.supports(Feature::CustomSerialization) {
        return read_type_name(reader, index);
    }

    let peeked = match reader.peek() {
        Ok(b) => b,
        Err(e) => {
            trace!(index, error = %e, "peek failed, reading type name");
            return read_type_name(reader, index);
        }
    };
    if peeked != BOOL_TRUE && peeked != BOOL_FALSE {
        trace!(index, byte = peeked, "no serialization flag, reading type name");
        return read_type_name(reader, index);
    }

    let custom = reader
        .read_bool()
        .context(|| format!("column [{}] custom serialization flag", index))?;
    if !custom {
        return read_type_name(reader, index);
    }

    let code = reader
        .read_u8()
        .context(|| format!("column [{}] type code", index))?;
    let code = BinaryTypeCode::from_u8(code)
        .ok_or(Error::UnknownTypeCode { index, code })?;

    let precision = if code.has_precision() {
        reader
            .read_u8()
            .context(|| format!("column [{}] Time64 precision", index))?
    } else {
        0
    };
    let timezone = if code.has_timezone() {
        let what = if code.has_precision() { "Time64" } else { "Time" };
        Some(
            reader
                .read_string()
                .context(|| format!("column [{}] {} timezone", index, what))?,
        )
    } else {
        None
    };

    if code == BinaryTypeCode::TimeWithTimezone {
        debug!(index, timezone = ?timezone, "dropping Time timezone");
    }
    Ok(code.column_type(precision, timezone.as_deref()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::io::buffer_utils::{
        write_bool,
        write_string,
    };
    use bytes::{
        BufMut,
        BytesMut,
    };

    fn header(buf: &mut BytesMut, code: u8) {
        write_string(buf, "t");
        write_bool(buf, true);
        buf.put_u8(code);
    }

    fn read(buf: &BytesMut) -> Result<(String, ColumnType)> {
        let mut r = Reader::new(&buf[..]);
        read_column_header(&mut r, &ProtocolVersion::CURRENT, 0)
    }

    #[test]
    fn test_binary_codes() {
        let mut buf = BytesMut::new();
        header(&mut buf, 0x32);
        assert_eq!(read(&buf).unwrap().1, "Time");

        let mut buf = BytesMut::new();
        header(&mut buf, 0x33);
        write_string(&mut buf, "Europe/Berlin");
        assert_eq!(read(&buf).unwrap().1, "Time");

        let mut buf = BytesMut::new();
        header(&mut buf, 0x34);
        buf.put_u8(3);
        assert_eq!(
            read(&buf).unwrap(),
            ("t".to_string(), ColumnType::from("Time64(3)"))
        );

        let mut buf = BytesMut::new();
        header(&mut buf, 0x35);
        buf.put_u8(6);
        write_string(&mut buf, "UTC");
        assert_eq!(read(&buf).unwrap().1, "Time64(6, 'UTC')");
    }

    #[test]
    fn test_time_timezone_is_consumed() {
        let mut buf = BytesMut::new();
        header(&mut buf, 0x33);
        write_string(&mut buf, "Asia/Tokyo");
        buf.put_u8(0xAB);

        let mut r = Reader::new(&buf[..]);
        read_column_header(&mut r, &ProtocolVersion::CURRENT, 0).unwrap();
        assert_eq!(r.read_u8().unwrap(), 0xAB);
    }

    #[test]
    fn test_unknown_code() {
        let mut buf = BytesMut::new();
        header(&mut buf, 0x99);
        let err = read(&buf).unwrap_err();
        assert!(matches!(err, Error::UnknownTypeCode { index: 0, code: 0x99 }));
        assert!(err.to_string().contains("0x99"));
    }

    #[test]
    fn test_flag_false_reads_name() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "t");
        write_bool(&mut buf, false);
        write_string(&mut buf, "Time64(9)");
        assert_eq!(read(&buf).unwrap().1, "Time64(9)");
    }

    #[test]
    fn test_non_flag_byte_reads_name() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "t");
        write_string(&mut buf, "Int32");
        assert_eq!(read(&buf).unwrap().1, "Int32");
    }

    #[test]
    fn test_legacy_revision_reads_name() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "t");
        write_string(&mut buf, "Time");

        let proto = ProtocolVersion::new(54_453);
        let mut r = Reader::new(&buf[..]);
        let (_, t) = read_column_header(&mut r, &proto, 0).unwrap();
        assert_eq!(t, "Time");
    }

    #[test]
    fn test_truncated_precision_has_context() {
        let mut buf = BytesMut::new();
        header(&mut buf, 0x34);
        let err = read(&buf).unwrap_err();
        assert_eq!(
            err.to_string().split(':').next(),
            Some("column [0] Time64 precision")
        );
        assert!(matches!(err.root(), Error::Io(_)));
    }

    #[test]
    fn test_missing_header_has_context() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "t");
        let err = read(&buf).unwrap_err();
        assert!(err.to_string().starts_with("column [0] type"));
    }
}
