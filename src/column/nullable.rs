//! Nullable column implementation
//!
//! **ClickHouse Documentation:** <https://clickhouse.com/docs/en/sql-reference/data-types/nullable>
//!
//! ## Wire Format
//!
//! ```text
//! [null map: UInt8 * rows]    // 1 = null, 0 = value
//! [nested column data]        // one value per row, placeholder for nulls
//! ```

use super::{
    Column,
    ColumnOf,
    Inferable,
    StateDecoder,
    StateEncoder,
};
use crate::{
    io::Reader,
    types::ColumnType,
    Error,
    Result,
};
use bytes::BytesMut;

/// Column for nullable values
/// Stores a nested column and a map of null flags
pub struct ColumnNullable<T> {
    nulls: Vec<u8>,
    values: Box<dyn ColumnOf<T>>,
}

impl<T: Default + 'static> ColumnNullable<T> {
    /// Wrap `values`, which must be empty.
    pub fn new(values: Box<dyn ColumnOf<T>>) -> Self {
        Self { nulls: Vec::new(), values }
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.nulls.get(index).is_some_and(|&n| n != 0)
    }

    /// Nested column, with a placeholder value for every null row
    pub fn values(&self) -> &dyn ColumnOf<T> {
        self.values.as_ref()
    }
}

impl<T: Default + 'static> Column for ColumnNullable<T> {
    fn column_type(&self) -> ColumnType {
        self.values.column_type().nullable()
    }

    fn rows(&self) -> usize {
        self.nulls.len()
    }

    fn reset(&mut self) {
        self.nulls.clear();
        self.values.reset();
    }

    fn decode_column(
        &mut self,
        reader: &mut Reader<'_>,
        rows: usize,
    ) -> Result<()> {
        let nulls = reader.read_raw(rows)?;
        self.values.decode_column(reader, rows)?;
        self.nulls.extend(nulls);
        Ok(())
    }

    fn encode_column(&self, buffer: &mut BytesMut) {
        buffer.extend_from_slice(&self.nulls);
        self.values.encode_column(buffer);
    }

    fn as_inferable(&mut self) -> Option<&mut dyn Inferable> {
        Some(self)
    }

    fn as_state_decoder(&mut self) -> Option<&mut dyn StateDecoder> {
        if self.values.as_state_decoder().is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_state_encoder(&self) -> Option<&dyn StateEncoder> {
        if self.values.as_state_encoder().is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl<T: Default + 'static> Inferable for ColumnNullable<T> {
    fn infer(&mut self, t: &ColumnType) -> Result<()> {
        if t.base() != ColumnType::NULLABLE || !t.is_parametrized() {
            return Err(Error::invalid_type(t.as_str(), "expected Nullable(T)"));
        }
        match self.values.as_inferable() {
            Some(values) => values.infer(&ColumnType::new(t.elem())),
            None => Ok(()),
        }
    }
}

impl<T: Default + 'static> StateDecoder for ColumnNullable<T> {
    fn decode_state(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        match self.values.as_state_decoder() {
            Some(values) => values.decode_state(reader),
            None => Ok(()),
        }
    }
}

impl<T: Default + 'static> StateEncoder for ColumnNullable<T> {
    fn encode_state(&self, buffer: &mut BytesMut) {
        if let Some(values) = self.values.as_state_encoder() {
            values.encode_state(buffer);
        }
    }
}

impl<T: Default + 'static> ColumnOf<Option<T>> for ColumnNullable<T> {
    fn append(&mut self, value: Option<T>) {
        match value {
            Some(v) => {
                self.nulls.push(0);
                self.values.append(v);
            }
            None => {
                self.nulls.push(1);
                self.values.append(T::default());
            }
        }
    }

    fn row(&self, index: usize) -> Option<T> {
        if self.nulls[index] != 0 {
            return None;
        }
        Some(self.values.row(index))
    }
}
