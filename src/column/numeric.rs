use super::{
    Column,
    ColumnOf,
};
use crate::{
    io::Reader,
    types::{
        ColumnType,
        Time,
        Time64,
    },
    Error,
    Result,
};
use bytes::{
    Buf,
    BufMut,
    BytesMut,
};

/// Values stored as a fixed number of little-endian bytes per row.
pub trait FixedSize: Sized + Copy + Send + Sync + 'static {
    const SIZE: usize;

    fn read_from(buffer: &mut &[u8]) -> Result<Self>;
    fn write_to(&self, buffer: &mut BytesMut);
}

macro_rules! impl_fixed_size {
    ($type:ty, $get:ident, $put:ident) => {
        impl FixedSize for $type {
            const SIZE: usize = std::mem::size_of::<$type>();

            fn read_from(buffer: &mut &[u8]) -> Result<Self> {
                if buffer.len() < Self::SIZE {
                    return Err(Error::Protocol("Buffer underflow".to_string()));
                }
                Ok(buffer.$get())
            }

            fn write_to(&self, buffer: &mut BytesMut) {
                buffer.$put(*self);
            }
        }
    };
}

impl_fixed_size!(u8, get_u8, put_u8);
impl_fixed_size!(u16, get_u16_le, put_u16_le);
impl_fixed_size!(u32, get_u32_le, put_u32_le);
impl_fixed_size!(u64, get_u64_le, put_u64_le);
impl_fixed_size!(i8, get_i8, put_i8);
impl_fixed_size!(i16, get_i16_le, put_i16_le);
impl_fixed_size!(i32, get_i32_le, put_i32_le);
impl_fixed_size!(i64, get_i64_le, put_i64_le);
impl_fixed_size!(f32, get_f32_le, put_f32_le);
impl_fixed_size!(f64, get_f64_le, put_f64_le);

impl FixedSize for Time {
    const SIZE: usize = 8;

    fn read_from(buffer: &mut &[u8]) -> Result<Self> {
        i64::read_from(buffer).map(Time)
    }

    fn write_to(&self, buffer: &mut BytesMut) {
        self.0.write_to(buffer)
    }
}

impl FixedSize for Time64 {
    const SIZE: usize = 8;

    fn read_from(buffer: &mut &[u8]) -> Result<Self> {
        i64::read_from(buffer).map(Time64)
    }

    fn write_to(&self, buffer: &mut BytesMut) {
        self.0.write_to(buffer)
    }
}

/// Append `rows` values to `data`.
///
/// The whole payload is read before anything is appended, so a short
/// stream leaves `data` untouched.
pub(crate) fn decode_fixed<T: FixedSize>(
    reader: &mut Reader<'_>,
    rows: usize,
    data: &mut Vec<T>,
) -> Result<()> {
    if rows == 0 {
        return Ok(());
    }
    let len = rows.checked_mul(T::SIZE).ok_or_else(|| {
        Error::Protocol(format!("row count {} overflows payload size", rows))
    })?;
    let raw = reader.read_raw(len)?;

    let mut buffer = &raw[..];
    data.reserve(rows);
    for _ in 0..rows {
        data.push(T::read_from(&mut buffer)?);
    }
    Ok(())
}

pub(crate) fn encode_fixed<T: FixedSize>(data: &[T], buffer: &mut BytesMut) {
    buffer.reserve(data.len() * T::SIZE);
    for value in data {
        value.write_to(buffer);
    }
}

/// Numeric value with a fixed ClickHouse type name.
pub trait Numeric: FixedSize + Default {
    const TYPE: ColumnType;
}

macro_rules! impl_numeric {
    ($type:ty, $name:ident) => {
        impl Numeric for $type {
            const TYPE: ColumnType = ColumnType::$name;
        }
    };
}

impl_numeric!(u8, UINT8);
impl_numeric!(u16, UINT16);
impl_numeric!(u32, UINT32);
impl_numeric!(u64, UINT64);
impl_numeric!(i8, INT8);
impl_numeric!(i16, INT16);
impl_numeric!(i32, INT32);
impl_numeric!(i64, INT64);
impl_numeric!(f32, FLOAT32);
impl_numeric!(f64, FLOAT64);

/// Generic column for numeric types
#[derive(Debug, Clone, Default)]
pub struct ColumnVector<T: Numeric> {
    data: Vec<T>,
}

impl<T: Numeric> ColumnVector<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.data.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: Numeric> Column for ColumnVector<T> {
    fn column_type(&self) -> ColumnType {
        T::TYPE
    }

    fn rows(&self) -> usize {
        self.data.len()
    }

    fn reset(&mut self) {
        self.data.clear()
    }

    fn decode_column(
        &mut self,
        reader: &mut Reader<'_>,
        rows: usize,
    ) -> Result<()> {
        decode_fixed(reader, rows, &mut self.data)
    }

    fn encode_column(&self, buffer: &mut BytesMut) {
        encode_fixed(&self.data, buffer)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl<T: Numeric> ColumnOf<T> for ColumnVector<T> {
    fn append(&mut self, value: T) {
        self.data.push(value);
    }

    fn append_arr(&mut self, values: Vec<T>) {
        self.data.extend(values);
    }

    fn row(&self, index: usize) -> T {
        self.data[index]
    }
}

// Type aliases for common numeric columns
pub type ColumnUInt8 = ColumnVector<u8>;
pub type ColumnUInt16 = ColumnVector<u16>;
pub type ColumnUInt32 = ColumnVector<u32>;
pub type ColumnUInt64 = ColumnVector<u64>;

pub type ColumnInt8 = ColumnVector<i8>;
pub type ColumnInt16 = ColumnVector<i16>;
pub type ColumnInt32 = ColumnVector<i32>;
pub type ColumnInt64 = ColumnVector<i64>;

pub type ColumnFloat32 = ColumnVector<f32>;
pub type ColumnFloat64 = ColumnVector<f64>;
