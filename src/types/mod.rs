//! # Column Type Descriptors
//!
//! The native protocol names a column's wire type with a textual token such
//! as `Time`, `Time64(3)` or `Array(Nullable(Time64(6, 'UTC')))`. This
//! module keeps that token as-is in [`ColumnType`] and offers the few
//! structural operations the decoder needs: splitting off the base name and
//! the parameter list, building parametrized descriptors, and the conflict
//! check used to validate a declared schema against the wire.
//!
//! ## ClickHouse Documentation References
//!
//! - [Time](https://clickhouse.com/docs/en/sql-reference/data-types/time)
//! - [Time64](https://clickhouse.com/docs/en/sql-reference/data-types/time64)
//! - [Nullable](https://clickhouse.com/docs/en/sql-reference/data-types/nullable)
//! - [Array](https://clickhouse.com/docs/en/sql-reference/data-types/array)
//!
//! ## Conflict Rules
//!
//! | Left | Right | Conflict |
//! |------|-------|----------|
//! | `""` | anything | no |
//! | `Time` | `Int32` | yes (bases differ) |
//! | `Time64` | `Time64(3)` | no (one side unparametrized) |
//! | `Time64(3)` | `Time64(6)` | yes |
//! | `Array(Time64(3))` | `Array(Time64)` | no (checked per parameter) |

mod binary;
mod precision;
mod time;

pub use binary::BinaryTypeCode;
pub use precision::Precision;
pub use time::{
    Time,
    Time64,
    NANOS_PER_HOUR,
    NANOS_PER_MINUTE,
    NANOS_PER_SECOND,
};

use std::borrow::Cow;

/// Textual wire type of a column, possibly parametrized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ColumnType(Cow<'static, str>);

impl ColumnType {
    pub const TIME: ColumnType = ColumnType(Cow::Borrowed("Time"));
    pub const TIME64: ColumnType = ColumnType(Cow::Borrowed("Time64"));
    pub const NULLABLE: ColumnType = ColumnType(Cow::Borrowed("Nullable"));
    pub const ARRAY: ColumnType = ColumnType(Cow::Borrowed("Array"));

    pub const INT8: ColumnType = ColumnType(Cow::Borrowed("Int8"));
    pub const INT16: ColumnType = ColumnType(Cow::Borrowed("Int16"));
    pub const INT32: ColumnType = ColumnType(Cow::Borrowed("Int32"));
    pub const INT64: ColumnType = ColumnType(Cow::Borrowed("Int64"));
    pub const UINT8: ColumnType = ColumnType(Cow::Borrowed("UInt8"));
    pub const UINT16: ColumnType = ColumnType(Cow::Borrowed("UInt16"));
    pub const UINT32: ColumnType = ColumnType(Cow::Borrowed("UInt32"));
    pub const UINT64: ColumnType = ColumnType(Cow::Borrowed("UInt64"));
    pub const FLOAT32: ColumnType = ColumnType(Cow::Borrowed("Float32"));
    pub const FLOAT64: ColumnType = ColumnType(Cow::Borrowed("Float64"));

    pub fn new(name: impl Into<String>) -> Self {
        ColumnType(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the descriptor carries no type information at all.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Byte range of the parameter list, parentheses excluded.
    fn param_range(&self) -> Option<(usize, usize)> {
        let v = self.as_str();
        match (v.find('('), v.rfind(')')) {
            (Some(start), Some(end)) if start > 0 && end > start => {
                Some((start, end))
            }
            _ => None,
        }
    }

    /// Leading identifier, before any parameter list.
    ///
    /// ```
    /// use clickhouse_native_proto::types::ColumnType;
    ///
    /// assert_eq!(ColumnType::from("Time64(3)").base(), "Time64");
    /// assert_eq!(ColumnType::from("Time").base(), "Time");
    /// ```
    pub fn base(&self) -> &str {
        match self.param_range() {
            Some((start, _)) => &self.0[..start],
            None => self.as_str(),
        }
    }

    /// Raw contents of the parameter list, empty if there is none.
    ///
    /// ```
    /// use clickhouse_native_proto::types::ColumnType;
    ///
    /// assert_eq!(ColumnType::from("Time64(6, 'UTC')").elem(), "6, 'UTC'");
    /// assert_eq!(ColumnType::from("Time").elem(), "");
    /// ```
    pub fn elem(&self) -> &str {
        match self.param_range() {
            Some((start, end)) => &self.0[start + 1..end],
            None => "",
        }
    }

    pub fn is_parametrized(&self) -> bool {
        !self.elem().trim().is_empty()
    }

    /// Top-level parameters, trimmed. Commas inside nested parentheses or
    /// quotes do not split.
    pub fn params(&self) -> Vec<&str> {
        split_params(self.elem())
    }

    /// New descriptor with this base name and `parts` as parameters.
    ///
    /// An empty `parts` yields the bare base name.
    pub fn with<I, S>(&self, parts: I) -> ColumnType
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<S> = parts.into_iter().collect();
        if parts.is_empty() {
            return ColumnType::new(self.base());
        }
        let joined = parts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(", ");
        ColumnType::new(format!("{}({})", self.base(), joined))
    }

    /// `self(inner)`, e.g. `ColumnType::ARRAY.sub(&ColumnType::TIME)`.
    pub fn sub(&self, inner: &ColumnType) -> ColumnType {
        self.with([inner.as_str()])
    }

    pub fn array(&self) -> ColumnType {
        ColumnType::ARRAY.sub(self)
    }

    pub fn nullable(&self) -> ColumnType {
        ColumnType::NULLABLE.sub(self)
    }

    /// Reports whether a column declared as `self` cannot hold data sent as
    /// `other`.
    ///
    /// Only used to reject a declared schema; never to merge information.
    pub fn conflicts(&self, other: &ColumnType) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.base().trim() != other.base().trim() {
            return true;
        }
        if !self.is_parametrized() || !other.is_parametrized() {
            return false;
        }
        let (a, b) = (self.params(), other.params());
        a.len() != b.len()
            || a.iter().zip(&b).any(|(x, y)| {
                ColumnType::new(*x).conflicts(&ColumnType::new(*y))
            })
    }
}

/// Strip the quotes and spaces around a single parameter, e.g. `'UTC'`.
pub(crate) fn unquote(param: &str) -> &str {
    param.trim_matches(&['\'', ' '][..])
}

fn split_params(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    if s.trim().is_empty() {
        return out;
    }

    let mut depth = 0i32;
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            ',' if !quoted && depth == 0 => {
                out.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(s[start..].trim());
    out
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        ColumnType::new(s)
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        ColumnType(Cow::Owned(s))
    }
}

impl AsRef<str> for ColumnType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ColumnType {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ColumnType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<ColumnType> for str {
    fn eq(&self, other: &ColumnType) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<ColumnType> for &str {
    fn eq(&self, other: &ColumnType) -> bool {
        *self == other.as_str()
    }
}
