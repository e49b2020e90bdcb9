//! Encoding of client-side columns into a data block body.
//!
//! The counterpart of [`Results`](crate::result::Results): every column is
//! written as a header followed by its state and rows, in the layout the
//! result decoder reads back.

use crate::{
    block::Block,
    column::Column,
    io::buffer_utils,
    protocol::{
        Feature,
        ProtocolVersion,
    },
    types::{
        unquote,
        BinaryTypeCode,
        ColumnType,
    },
    Error,
    Result,
};
use bytes::{
    BufMut,
    BytesMut,
};
use tracing::trace;

/// How column types are written when custom serialization is negotiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeEncoding {
    /// A `false` flag followed by the type name.
    #[default]
    Name,
    /// A `true` flag and a binary type code where one exists; otherwise as
    /// [`TypeEncoding::Name`].
    Binary,
}

/// Named column to send.
pub struct InputColumn {
    pub name: String,
    pub data: Box<dyn Column>,
}

/// Columns of one outgoing block.
#[derive(Default)]
pub struct Input {
    columns: Vec<InputColumn>,
}

impl Input {
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
        self.columns.push(InputColumn { name: name.into(), data });
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

    pub fn iter(&self) -> std::slice::Iter<'_, InputColumn> {
        self.columns.iter()
    }

    /// Block header describing these columns.
    ///
    /// Fails when the columns disagree on the number of rows.
    pub fn block(&self) -> Result<Block> {
        let rows = self.rows();
        for c in &self.columns {
            if c.data.rows() != rows {
                return Err(Error::Validation(format!(
                    "All columns in block must have same count of rows. Name: '{}', expected rows: {}, got: {}",
                    c.name,
                    rows,
                    c.data.rows()
                )));
            }
        }
        Ok(Block::new(self.columns.len(), rows))
    }

    /// Write every column's header, state and rows.
    ///
    /// State and rows are omitted for a zero-row input.
    pub fn encode(
        &self,
        buffer: &mut BytesMut,
        proto: &ProtocolVersion,
        encoding: TypeEncoding,
    ) {
        let rows = self.rows();
        for c in &self.columns {
            buffer_utils::write_string(buffer, &c.name);
            encode_type(buffer, proto, &c.data.column_type(), encoding);
            if rows == 0 {
                continue;
            }
            if let Some(state) = c.data.as_state_encoder() {
                state.encode_state(buffer);
            }
            c.data.encode_column(buffer);
        }
    }
}

fn encode_type(
    buffer: &mut BytesMut,
    proto: &ProtocolVersion,
    t: &ColumnType,
    encoding: TypeEncoding,
) {
    if !proto.supports(Feature::CustomSerialization) {
        buffer_utils::write_string(buffer, t.as_str());
        return;
    }

    let binary = match encoding {
        TypeEncoding::Binary => BinaryTypeCode::for_type(t),
        TypeEncoding::Name => None,
    };
    let Some((code, precision)) = binary else {
        buffer_utils::write_bool(buffer, false);
        buffer_utils::write_string(buffer, t.as_str());
        return;
    };

    trace!(column_type = %t, code = code as u8, "binary type code");
    buffer_utils::write_bool(buffer, true);
    buffer.put_u8(code as u8);
    if let Some(p) = precision {
        buffer.put_u8(p.digits());
    }
    if code.has_timezone() {
        let params = t.params();
        let tz = params.get(1).map_or("", |tz| unquote(tz));
        buffer_utils::write_string(buffer, tz);
    }
}
