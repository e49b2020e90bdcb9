//! # Column Module
//!
//! Columns are homogeneous, append-only sequences of values that know how to
//! move their rows to and from the native wire format.
//!
//! ## Capabilities
//!
//! Every column implements [`Column`], the narrow contract used by the
//! generic decode plumbing. Two optional capabilities are queried per
//! instance:
//!
//! - [`Inferable`]: the column can configure itself from the descriptor the
//!   server sent (for example `Time64` picks up its precision).
//! - [`StateDecoder`] / [`StateEncoder`]: the column carries a per-block
//!   header that precedes its row data.
//!
//! Typed access goes through [`ColumnOf<T>`].
//!
//! ## Wire Format
//!
//! ```text
//! [state: column specific, optional]  // once per block, only when rows > 0
//! [rows:  column specific]            // e.g. 8 bytes LE per Time64 row
//! ```
//!
//! ## ClickHouse Documentation
//!
//! - [Data Types Overview](https://clickhouse.com/docs/en/sql-reference/data-types)

pub mod array;
pub mod auto;
pub mod nullable;
pub mod numeric;
pub mod time;
pub mod time64;

pub use array::ColumnArray;
pub use auto::{
    new_column,
    ColumnAuto,
};
pub use nullable::ColumnNullable;
pub use numeric::*;
pub use time::{
    ColumnTime,
    ColumnTimeRaw,
};
pub use time64::{
    ColumnTime64,
    ColumnTime64Raw,
};

use crate::{
    io::Reader,
    types::ColumnType,
    Result,
};
use bytes::BytesMut;

/// Base trait for all column types
pub trait Column: Send + Sync {
    /// Current wire type, including any configured parameters.
    fn column_type(&self) -> ColumnType;

    /// Number of rows currently stored.
    fn rows(&self) -> usize;

    /// Drop all rows, keeping allocated capacity.
    fn reset(&mut self);

    /// Append `rows` rows read from `reader`.
    fn decode_column(&mut self, reader: &mut Reader<'_>, rows: usize)
        -> Result<()>;

    /// Append all rows to the end of `buffer`.
    fn encode_column(&self, buffer: &mut BytesMut);

    fn as_inferable(&mut self) -> Option<&mut dyn Inferable> {
        None
    }

    fn as_state_decoder(&mut self) -> Option<&mut dyn StateDecoder> {
        None
    }

    fn as_state_encoder(&self) -> Option<&dyn StateEncoder> {
        None
    }

    /// Downcast to a concrete column type
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to a mutable concrete column type
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Column that configures itself from a wire descriptor.
pub trait Inferable {
    fn infer(&mut self, t: &ColumnType) -> Result<()>;
}

/// Column with a per-block header read before its rows.
pub trait StateDecoder {
    fn decode_state(&mut self, reader: &mut Reader<'_>) -> Result<()>;
}

/// Column with a per-block header written before its rows.
pub trait StateEncoder {
    fn encode_state(&self, buffer: &mut BytesMut);
}

/// Typed row access.
pub trait ColumnOf<T>: Column {
    fn append(&mut self, value: T);

    fn append_arr(&mut self, values: Vec<T>) {
        for v in values {
            self.append(v);
        }
    }

    /// Value at `index`; panics if out of bounds.
    fn row(&self, index: usize) -> T;
}

/// Configure `col` from `t`, returning it.
pub(crate) fn inferred<C: Inferable>(mut col: C, t: &ColumnType) -> Result<C> {
    col.infer(t)?;
    Ok(col)
}
