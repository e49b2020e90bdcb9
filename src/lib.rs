//! Column codec and result decoding for the ClickHouse native protocol.
//!
//! ```
//! use clickhouse_native_proto::{
//!     column::{Column, ColumnTime64},
//!     types::Precision,
//!     Block, Input, ProtocolVersion, Results, TypeEncoding,
//! };
//! use chrono::NaiveTime;
//!
//! let proto = ProtocolVersion::CURRENT;
//!
//! let mut col = ColumnTime64::new().with_precision(Precision::MILLI);
//! col.append_time(&NaiveTime::from_hms_milli_opt(12, 30, 0, 250).unwrap());
//! let input = Input::new().with_column("t", Box::new(col));
//!
//! let mut buf = bytes::BytesMut::new();
//! Block::encode(&mut buf, &proto, &input, TypeEncoding::Binary).unwrap();
//!
//! let mut results = Results::new();
//! let mut reader = clickhouse_native_proto::io::Reader::new(&buf[..]);
//! Block::decode(&mut reader, &proto, &mut results.auto()).unwrap();
//!
//! let t = results.column_as::<ColumnTime64>("t").unwrap();
//! assert_eq!(t.column_type().as_str(), "Time64(3)");
//! ```

pub mod block;
pub mod column;
pub mod error;
pub mod input;
pub mod io;
pub mod protocol;
pub mod result;
pub mod types;

pub use block::{
    Block,
    BlockInfo,
};
pub use error::{
    Error,
    Result,
    ResultExt,
};
pub use input::{
    Input,
    InputColumn,
    TypeEncoding,
};
pub use protocol::{
    Feature,
    FeatureTable,
    ProtocolVersion,
};
pub use result::{
    AutoResults,
    DecodeResult,
    ResultColumn,
    Results,
};
pub use types::{
    ColumnType,
    Precision,
};
