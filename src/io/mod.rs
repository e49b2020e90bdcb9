//! Byte-stream plumbing between the transport and the column layer.
//!
//! [`Reader`] consumes primitives from any buffered source in stream order;
//! [`buffer_utils`] appends them to an output `BytesMut`.

pub mod buffer_utils;
pub mod reader;

pub use reader::Reader;
