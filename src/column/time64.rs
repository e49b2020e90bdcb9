//! Time64 Column Implementation
//!
//! **ClickHouse Documentation:** <https://clickhouse.com/docs/en/sql-reference/data-types/time64>
//!
//! ## Wire Format
//!
//! ```text
//! [i64 LE] * rows    // units of 10^-p seconds since midnight
//! ```
//!
//! The precision `p` is not on the wire. It comes from the type descriptor
//! (`Time64(3)`), either set up front with [`ColumnTime64::with_precision`]
//! or picked up through [`Inferable::infer`]. A descriptor may also carry a
//! timezone (`Time64(3, 'UTC')`); it is kept so that the column reports the
//! same descriptor back, but does not affect values.
//!
//! Converting between rows and timestamps needs the precision. The
//! [`ColumnOf`] methods panic when it is missing; use
//! [`ColumnTime64::try_append_time`] and [`ColumnTime64::try_row`] to get
//! [`Error::PrecisionNotSet`] instead.

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
        unquote,
        ColumnType,
        Precision,
        Time64,
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
pub struct ColumnTime64 {
    data: Vec<Time64>,
    precision: Option<Precision>,
    timezone: Option<String>,
}

impl ColumnTime64 {
    /// Column without precision; configure it before converting rows.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = Some(precision);
    }

    pub fn precision(&self) -> Option<Precision> {
        self.precision
    }

    /// Timezone taken from the last inferred descriptor.
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    fn required_precision(&self) -> Precision {
        match self.precision {
            Some(p) => p,
            None => panic!("Time64: no precision set"),
        }
    }

    pub fn append_time<T: Timelike>(&mut self, t: &T) {
        let p = self.required_precision();
        self.data.push(Time64::from_time(t, p));
    }

    pub fn try_append_time<T: Timelike>(&mut self, t: &T) -> Result<()> {
        let p = self.precision.ok_or(Error::PrecisionNotSet)?;
        self.data.push(Time64::from_time(t, p));
        Ok(())
    }

    pub fn append_raw(&mut self, value: Time64) {
        self.data.push(value);
    }

    pub fn try_row(&self, index: usize) -> Result<Option<DateTime<Local>>> {
        let p = self.precision.ok_or(Error::PrecisionNotSet)?;
        Ok(self.data[index].to_datetime(p))
    }

    pub fn data(&self) -> &[Time64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn raw(self) -> ColumnTime64Raw {
        ColumnTime64Raw { inner: self }
    }

    pub fn nullable(self) -> ColumnNullable<Option<DateTime<Local>>> {
        ColumnNullable::new(Box::new(self))
    }

    pub fn array(self) -> ColumnArray<Option<DateTime<Local>>> {
        ColumnArray::new(Box::new(self))
    }
}

impl Column for ColumnTime64 {
    fn column_type(&self) -> ColumnType {
        let Some(p) = self.precision else {
            return ColumnType::TIME64;
        };
        match &self.timezone {
            Some(tz) => ColumnType::TIME64.with([p.to_string(), format!("'{}'", tz)]),
            None => ColumnType::TIME64.with([p.to_string()]),
        }
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

impl Inferable for ColumnTime64 {
    /// Configure precision (and timezone, if present) from `t`.
    ///
    /// The column is left unchanged on error.
    fn infer(&mut self, t: &ColumnType) -> Result<()> {
        if t.base() != ColumnType::TIME64 {
            return Err(Error::invalid_type(t.as_str(), "expected Time64"));
        }
        let params = t.params();
        let Some(first) = params.first() else {
            return Err(Error::invalid_type(t.as_str(), "no elements"));
        };
        let digits: u8 = unquote(first).parse().map_err(|e| {
            Error::invalid_type(t.as_str(), format!("parse precision: {}", e))
        })?;
        let precision = Precision::new(digits).ok_or_else(|| {
            Error::invalid_type(
                t.as_str(),
                format!("precision {} is invalid", digits),
            )
        })?;

        self.precision = Some(precision);
        self.timezone = params.get(1).map(|tz| unquote(tz).to_string());
        Ok(())
    }
}

impl ColumnOf<Option<DateTime<Local>>> for ColumnTime64 {
    /// Panics if no precision is set.
    fn append(&mut self, value: Option<DateTime<Local>>) {
        let p = self.required_precision();
        self.data.push(Time64::from_datetime(value.as_ref(), p));
    }

    /// Panics if no precision is set.
    fn row(&self, index: usize) -> Option<DateTime<Local>> {
        self.data[index].to_datetime(self.required_precision())
    }
}

/// [`ColumnTime64`] with rows exposed as [`Time64`]; needs no precision.
#[derive(Debug, Clone, Default)]
pub struct ColumnTime64Raw {
    inner: ColumnTime64,
}

impl ColumnTime64Raw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(self, precision: Precision) -> Self {
        Self { inner: self.inner.with_precision(precision) }
    }

    pub fn precision(&self) -> Option<Precision> {
        self.inner.precision
    }

    pub fn into_inner(self) -> ColumnTime64 {
        self.inner
    }

    pub fn nullable(self) -> ColumnNullable<Time64> {
        ColumnNullable::new(Box::new(self))
    }

    pub fn array(self) -> ColumnArray<Time64> {
        ColumnArray::new(Box::new(self))
    }
}

impl Column for ColumnTime64Raw {
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

impl ColumnOf<Time64> for ColumnTime64Raw {
    fn append(&mut self, value: Time64) {
        self.inner.append_raw(value);
    }

    fn append_arr(&mut self, values: Vec<Time64>) {
        self.inner.data.extend(values);
    }

    fn row(&self, index: usize) -> Time64 {
        self.inner.data[index]
    }
}
