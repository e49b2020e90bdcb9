//! One-byte type codes used when a column header is sent with custom
//! serialization.
//!
//! Codes `0x33` and `0x35` carry a timezone. For `0x35` it is part of the
//! resulting descriptor; for `0x33` it is read off the wire and dropped,
//! since `Time` has no timezone parameter.

use super::{
    unquote,
    ColumnType,
    Precision,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BinaryTypeCode {
    /// `Time`, no extra fields.
    TimeUtc = 0x32,
    /// `Time`, followed by a timezone string.
    TimeWithTimezone = 0x33,
    /// `Time64(p)`, followed by a UInt8 precision.
    Time64Utc = 0x34,
    /// `Time64(p, 'tz')`, followed by a UInt8 precision and a timezone
    /// string.
    Time64WithTimezone = 0x35,
}

impl BinaryTypeCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x32 => Some(BinaryTypeCode::TimeUtc),
            0x33 => Some(BinaryTypeCode::TimeWithTimezone),
            0x34 => Some(BinaryTypeCode::Time64Utc),
            0x35 => Some(BinaryTypeCode::Time64WithTimezone),
            _ => None,
        }
    }

    pub fn has_precision(self) -> bool {
        matches!(
            self,
            BinaryTypeCode::Time64Utc | BinaryTypeCode::Time64WithTimezone
        )
    }

    pub fn has_timezone(self) -> bool {
        matches!(
            self,
            BinaryTypeCode::TimeWithTimezone
                | BinaryTypeCode::Time64WithTimezone
        )
    }

    /// Descriptor for this code given its decoded fields.
    ///
    /// The precision is rendered as read, without range validation; column
    /// inference rejects invalid digits. An empty timezone is omitted.
    pub fn column_type(self, precision: u8, timezone: Option<&str>) -> ColumnType {
        match self {
            BinaryTypeCode::TimeUtc | BinaryTypeCode::TimeWithTimezone => {
                ColumnType::TIME
            }
            BinaryTypeCode::Time64Utc => {
                ColumnType::TIME64.with([precision.to_string()])
            }
            BinaryTypeCode::Time64WithTimezone => match timezone {
                Some(tz) if !tz.is_empty() => ColumnType::TIME64
                    .with([precision.to_string(), format!("'{}'", tz)]),
                _ => ColumnType::TIME64.with([precision.to_string()]),
            },
        }
    }

    /// Code describing `t`, if it has a binary form.
    pub fn for_type(t: &ColumnType) -> Option<(Self, Option<Precision>)> {
        if t.base() == ColumnType::TIME {
            return Some((BinaryTypeCode::TimeUtc, None));
        }
        if t.base() != ColumnType::TIME64 {
            return None;
        }
        let params = t.params();
        let precision = params
            .first()
            .and_then(|p| unquote(p).parse().ok())
            .and_then(Precision::new)?;
        let code = if params.len() > 1 {
            BinaryTypeCode::Time64WithTimezone
        } else {
            BinaryTypeCode::Time64Utc
        };
        Some((code, Some(precision)))
    }
}
