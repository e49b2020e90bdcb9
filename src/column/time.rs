//! Time Column Implementation
//!
//! **ClickHouse Documentation:** <https://clickhouse.com/docs/en/sql-reference/data-types/time>
//!
//! ## Wire Format
//!
//! ```text
//! [i64 LE] * rows    // nanoseconds since midnight
//! ```
//!
//! Rows are exposed as `Option<DateTime<Local>>` anchored to today's date,
//! with `None` standing for the raw value 0. Use [`ColumnTimeRaw`] to work
//! with the stored integers directly.

use super::{
    numeric::{
        decode_fixed,
        encode_fixed,
    },
    Column,
    ColumnArray,
    ColumnNullable,
    ColumnOf,
    Inferable,
};
use crate::{
    io::Reader,
    types::{
        ColumnType,
        Time,
    },
    Error,
    Result,
};
use bytes::BytesMut;
use chrono::{
    DateTime,
    Local,
    Timelike,
};

#[derive(Debug, Clone, Default)]
pub struct ColumnTime {
    data: Vec<Time>,
}

impl ColumnTime {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    /// Append the time-of-day part of `t`.
    pub fn append_time<T: Timelike>(&mut self, t: &T) {
        self.data.push(Time::from_time(t));
    }

    pub fn append_raw(&mut self, value: Time) {
        self.data.push(value);
    }

    pub fn data(&self) -> &[Time] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View the column as raw [`Time`] values.
    pub fn raw(self) -> ColumnTimeRaw {
        ColumnTimeRaw { inner: self }
    }

    pub fn nullable(self) -> ColumnNullable<Option<DateTime<Local>>> {
        ColumnNullable::new(Box::new(self))
    }

    pub fn array(self) -> ColumnArray<Option<DateTime<Local>>> {
        ColumnArray::new(Box::new(self))
    }
}

impl Column for ColumnTime {
    fn column_type(&self) -> ColumnType {
        ColumnType::TIME
    }

    fn rows(&self) -> usize {
        self.data.len()
    }

    fn reset(&mut self) {
        self.data.clear();
    }

    fn decode_column(
        &mut self,
        reader: &mut Reader<'_>,
        rows: usize,
    ) -> Result<()> {
        decode_fixed(reader, rows, &mut self.data)
    }

    fn encode_column(&self, buffer: &mut BytesMut) {
        encode_fixed(&self.data, buffer);
    }

    fn as_inferable(&mut self) -> Option<&mut dyn Inferable> {
        Some(self)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl Inferable for ColumnTime {
    fn infer(&mut self, t: &ColumnType) -> Result<()> {
        if t.base() != ColumnType::TIME {
            return Err(Error::invalid_type(t.as_str(), "expected Time"));
        }
        Ok(())
    }
}

impl ColumnOf<Option<DateTime<Local>>> for ColumnTime {
    fn append(&mut self, value: Option<DateTime<Local>>) {
        self.data.push(Time::from_datetime(value.as_ref()));
    }

    fn row(&self, index: usize) -> Option<DateTime<Local>> {
        self.data[index].to_datetime()
    }
}

/// [`ColumnTime`] with rows exposed as [`Time`].
#[derive(Debug, Clone, Default)]
pub struct ColumnTimeRaw {
    inner: ColumnTime,
}

impl ColumnTimeRaw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> ColumnTime {
        self.inner
    }

    pub fn nullable(self) -> ColumnNullable<Time> {
        ColumnNullable::new(Box::new(self))
    }

    pub fn array(self) -> ColumnArray<Time> {
        ColumnArray::new(Box::new(self))
    }
}

impl Column for ColumnTimeRaw {
    fn column_type(&self) -> ColumnType {
        self.inner.column_type()
    }

    fn rows(&self) -> usize {
        self.inner.rows()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn decode_column(
        &mut self,
        reader: &mut Reader<'_>,
        rows: usize,
    ) -> Result<()> {
        self.inner.decode_column(reader, rows)
    }

    fn encode_column(&self, buffer: &mut BytesMut) {
        self.inner.encode_column(buffer);
    }

    fn as_inferable(&mut self) -> Option<&mut dyn Inferable> {
        Some(&mut self.inner)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl ColumnOf<Time> for ColumnTimeRaw {
    fn append(&mut self, value: Time) {
        self.inner.append_raw(value);
    }

    fn append_arr(&mut self, values: Vec<Time>) {
        self.inner.data.extend(values);
    }

    fn row(&self, index: usize) -> Time {
        self.inner.data[index]
    }
}
