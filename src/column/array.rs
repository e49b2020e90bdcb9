//! Array column implementation
//!
//! **ClickHouse Documentation:** <https://clickhouse.com/docs/en/sql-reference/data-types/array>
//!
//! ## Overview
//!
//! Array columns store variable-length arrays of elements. All elements are
//! stored in a single nested column (flattened), with offsets tracking where
//! each array ends.
//!
//! ## Wire Format
//!
//! ```text
//! [offsets: UInt64 * num_arrays]  // Cumulative element counts
//! [nested_column_data]            // All elements concatenated
//! ```
//!
//! Example: `[[1,2], [3], [4,5,6]]`
//! - Offsets: `[2, 3, 6]`
//! - Nested data: `[1, 2, 3, 4, 5, 6]`

use super::{
    numeric::{
        decode_fixed,
        encode_fixed,
    },
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

/// Column for arrays of variable length
pub struct ColumnArray<T> {
    offsets: Vec<u64>,
    data: Box<dyn ColumnOf<T>>,
}

impl<T: 'static> ColumnArray<T> {
    /// Wrap `data`, which must be empty.
    pub fn new(data: Box<dyn ColumnOf<T>>) -> Self {
        Self { offsets: Vec::new(), data }
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Flattened elements of all arrays
    pub fn data(&self) -> &dyn ColumnOf<T> {
        self.data.as_ref()
    }

    fn bounds(&self, index: usize) -> (usize, usize) {
        let start = if index == 0 { 0 } else { self.offsets[index - 1] };
        (start as usize, self.offsets[index] as usize)
    }

    /// Number of elements in the array at `index`.
    pub fn array_len(&self, index: usize) -> usize {
        let (start, end) = self.bounds(index);
        end - start
    }
}

impl<T: 'static> Column for ColumnArray<T> {
    fn column_type(&self) -> ColumnType {
        self.data.column_type().array()
    }

    fn rows(&self) -> usize {
        self.offsets.len()
    }

    fn reset(&mut self) {
        self.offsets.clear();
        self.data.reset();
    }

    fn decode_column(
        &mut self,
        reader: &mut Reader<'_>,
        rows: usize,
    ) -> Result<()> {
        let mut offsets: Vec<u64> = Vec::with_capacity(rows);
        decode_fixed(reader, rows, &mut offsets)?;

        let mut prev = 0;
        for &off in &offsets {
            if off < prev {
                return Err(Error::Protocol(format!(
                    "array offsets decrease: {} after {}",
                    off, prev
                )));
            }
            prev = off;
        }

        let base = self.offsets.last().copied().unwrap_or(0);
        self.data.decode_column(reader, prev as usize)?;
        self.offsets.extend(offsets.into_iter().map(|off| base + off));
        Ok(())
    }

    fn encode_column(&self, buffer: &mut BytesMut) {
        encode_fixed(&self.offsets, buffer);
        self.data.encode_column(buffer);
    }

    fn as_inferable(&mut self) -> Option<&mut dyn Inferable> {
        Some(self)
    }

    fn as_state_decoder(&mut self) -> Option<&mut dyn StateDecoder> {
        if self.data.as_state_decoder().is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_state_encoder(&self) -> Option<&dyn StateEncoder> {
        if self.data.as_state_encoder().is_some() {
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

impl<T: 'static> Inferable for ColumnArray<T> {
    fn infer(&mut self, t: &ColumnType) -> Result<()> {
        if t.base() != ColumnType::ARRAY || !t.is_parametrized() {
            return Err(Error::invalid_type(t.as_str(), "expected Array(T)"));
        }
        match self.data.as_inferable() {
            Some(data) => data.infer(&ColumnType::new(t.elem())),
            None => Ok(()),
        }
    }
}

impl<T: 'static> StateDecoder for ColumnArray<T> {
    fn decode_state(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        match self.data.as_state_decoder() {
            Some(data) => data.decode_state(reader),
            None => Ok(()),
        }
    }
}

impl<T: 'static> StateEncoder for ColumnArray<T> {
    fn encode_state(&self, buffer: &mut BytesMut) {
        if let Some(data) = self.data.as_state_encoder() {
            data.encode_state(buffer);
        }
    }
}

impl<T: 'static> ColumnOf<Vec<T>> for ColumnArray<T> {
    fn append(&mut self, value: Vec<T>) {
        self.data.append_arr(value);
        self.offsets.push(self.data.rows() as u64);
    }

    fn row(&self, index: usize) -> Vec<T> {
        let (start, end) = self.bounds(index);
        (start..end).map(|i| self.data.row(i)).collect()
    }
}
