use crate::Error;

/// Sub-second precision of a `Time64` value: the number of decimal digits
/// after the second, from 0 (seconds) to 9 (nanoseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precision(u8);

impl Precision {
    pub const SECOND: Precision = Precision(0);
    pub const MILLI: Precision = Precision(3);
    pub const MICRO: Precision = Precision(6);
    pub const NANO: Precision = Precision(9);
    pub const MAX: Precision = Precision::NANO;

    /// Returns `None` for digits above [`Precision::MAX`].
    pub const fn new(digits: u8) -> Option<Precision> {
        if Self::is_valid(digits) {
            Some(Precision(digits))
        } else {
            None
        }
    }

    /// Reports whether `digits` is a recognized precision.
    pub const fn is_valid(digits: u8) -> bool {
        digits <= Self::MAX.0
    }

    pub const fn digits(self) -> u8 {
        self.0
    }

    /// Nanoseconds per unit at this precision.
    pub const fn scale(self) -> i64 {
        10i64.pow((Self::MAX.0 - self.0) as u32)
    }
}

impl TryFrom<u8> for Precision {
    type Error = Error;

    fn try_from(digits: u8) -> Result<Self, Self::Error> {
        Precision::new(digits).ok_or_else(|| {
            Error::Validation(format!("precision {} is invalid", digits))
        })
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
