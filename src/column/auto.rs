//! Columns built from a type descriptor at runtime.
//!
//! [`new_column`] maps a descriptor to a configured column. Supported
//! descriptors are `Time`, `Time64(p[, 'tz'])`, the fixed-width numerics
//! (`Int8` through `UInt64`, `Float32`, `Float64`) and one level of
//! `Nullable(..)` or `Array(..)` around any of them.
//!
//! [`ColumnAuto`] defers the choice to the first [`Inferable::infer`] call,
//! which lets a result column accept whatever type the server sends.

use super::{
    inferred,
    Column,
    ColumnArray,
    ColumnFloat32,
    ColumnFloat64,
    ColumnInt16,
    ColumnInt32,
    ColumnInt64,
    ColumnInt8,
    ColumnNullable,
    ColumnOf,
    ColumnTime,
    ColumnTime64,
    ColumnUInt16,
    ColumnUInt32,
    ColumnUInt64,
    ColumnUInt8,
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
use chrono::{
    DateTime,
    Local,
};
use tracing::trace;

type Timestamp = Option<DateTime<Local>>;

/// How a freshly built leaf column is wrapped.
trait Wrap {
    fn wrap<T, C>(self, col: C) -> Box<dyn Column>
    where
        T: Default + 'static,
        C: ColumnOf<T> + 'static;
}

struct Plain;
struct Nullable;
struct Array;

impl Wrap for Plain {
    fn wrap<T, C>(self, col: C) -> Box<dyn Column>
    where
        T: Default + 'static,
        C: ColumnOf<T> + 'static,
    {
        Box::new(col)
    }
}

impl Wrap for Nullable {
    fn wrap<T, C>(self, col: C) -> Box<dyn Column>
    where
        T: Default + 'static,
        C: ColumnOf<T> + 'static,
    {
        Box::new(ColumnNullable::<T>::new(Box::new(col)))
    }
}

impl Wrap for Array {
    fn wrap<T, C>(self, col: C) -> Box<dyn Column>
    where
        T: Default + 'static,
        C: ColumnOf<T> + 'static,
    {
        Box::new(ColumnArray::<T>::new(Box::new(col)))
    }
}

fn unparametrized(t: &ColumnType) -> Result<()> {
    if t.is_parametrized() {
        return Err(Error::invalid_type(t.as_str(), "unexpected parameters"));
    }
    Ok(())
}

fn leaf<W: Wrap>(t: &ColumnType, w: W) -> Result<Box<dyn Column>> {
    let base = t.base();
    if base == ColumnType::TIME {
        return Ok(w.wrap::<Timestamp, _>(inferred(ColumnTime::new(), t)?));
    }
    if base == ColumnType::TIME64 {
        return Ok(w.wrap::<Timestamp, _>(inferred(ColumnTime64::new(), t)?));
    }

    unparametrized(t)?;
    let col = match base {
        "Int8" => w.wrap::<i8, _>(ColumnInt8::new()),
        "Int16" => w.wrap::<i16, _>(ColumnInt16::new()),
        "Int32" => w.wrap::<i32, _>(ColumnInt32::new()),
        "Int64" => w.wrap::<i64, _>(ColumnInt64::new()),
        "UInt8" => w.wrap::<u8, _>(ColumnUInt8::new()),
        "UInt16" => w.wrap::<u16, _>(ColumnUInt16::new()),
        "UInt32" => w.wrap::<u32, _>(ColumnUInt32::new()),
        "UInt64" => w.wrap::<u64, _>(ColumnUInt64::new()),
        "Float32" => w.wrap::<f32, _>(ColumnFloat32::new()),
        "Float64" => w.wrap::<f64, _>(ColumnFloat64::new()),
        _ => {
            return Err(Error::invalid_type(t.as_str(), "unsupported column type"))
        }
    };
    Ok(col)
}

fn wrapped_elem(t: &ColumnType) -> Result<ColumnType> {
    if !t.is_parametrized() {
        return Err(Error::invalid_type(t.as_str(), "no elements"));
    }
    Ok(ColumnType::new(t.elem().trim()))
}

/// Build an empty column configured for `t`.
pub fn new_column(t: &ColumnType) -> Result<Box<dyn Column>> {
    trace!(column_type = %t, "creating column");
    match t.base() {
        "Nullable" => leaf(&wrapped_elem(t)?, Nullable),
        "Array" => leaf(&wrapped_elem(t)?, Array),
        _ => leaf(t, Plain),
    }
}

/// Column whose concrete type is chosen on inference.
#[derive(Default)]
pub struct ColumnAuto {
    data: Option<Box<dyn Column>>,
    data_type: ColumnType,
}

impl ColumnAuto {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inferred column, if any.
    pub fn inner(&self) -> Option<&dyn Column> {
        self.data.as_deref()
    }

    pub fn into_inner(self) -> Option<Box<dyn Column>> {
        self.data
    }
}

impl Inferable for ColumnAuto {
    fn infer(&mut self, t: &ColumnType) -> Result<()> {
        self.data = Some(new_column(t)?);
        self.data_type = t.clone();
        Ok(())
    }
}

impl Column for ColumnAuto {
    /// Empty until inferred.
    fn column_type(&self) -> ColumnType {
        self.data_type.clone()
    }

    fn rows(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.rows())
    }

    fn reset(&mut self) {
        if let Some(data) = self.data.as_mut() {
            data.reset();
        }
    }

    fn decode_column(
        &mut self,
        reader: &mut Reader<'_>,
        rows: usize,
    ) -> Result<()> {
        match self.data.as_mut() {
            Some(data) => data.decode_column(reader, rows),
            None if rows == 0 => Ok(()),
            None => Err(Error::Protocol(
                "column type was not inferred".to_string(),
            )),
        }
    }

    fn encode_column(&self, buffer: &mut BytesMut) {
        if let Some(data) = self.data.as_ref() {
            data.encode_column(buffer);
        }
    }

    fn as_inferable(&mut self) -> Option<&mut dyn Inferable> {
        Some(self)
    }

    fn as_state_decoder(&mut self) -> Option<&mut dyn StateDecoder> {
        self.data.as_mut().and_then(|d| d.as_state_decoder())
    }

    fn as_state_encoder(&self) -> Option<&dyn StateEncoder> {
        self.data.as_ref().and_then(|d| d.as_state_encoder())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
