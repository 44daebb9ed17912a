//! Time representation for exact timeline arithmetic
//!
//! Uses rational numbers to avoid floating-point accumulation errors when
//! elements are split and trimmed repeatedly. Values cross the wire as float
//! seconds and are snapped to microseconds on the way in.

use num_rational::Rational64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Microsecond resolution used when converting from float seconds.
const PRECISION: i64 = 1_000_000;

/// Largest magnitude, in whole seconds, accepted from float input. Sums of a
/// few such values still fit in the numerator at microsecond resolution.
pub const MAX_SECONDS: i64 = i64::MAX / PRECISION / 4;

/// A rational time value in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RationalTime {
    value: Rational64,
}

impl RationalTime {
    /// `numerator / denominator` seconds.
    #[inline]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            value: Rational64::new(numerator, denominator),
        }
    }

    /// Whole seconds.
    #[inline]
    pub fn from_secs(seconds: i64) -> Self {
        Self::new(seconds, 1)
    }

    /// Create a RationalTime from seconds as a float, rounded to microseconds.
    /// Non-finite input maps to zero; magnitudes past [`MAX_SECONDS`] are
    /// clamped.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        if !seconds.is_finite() {
            return Self::ZERO;
        }
        if seconds.abs() > MAX_SECONDS as f64 {
            return Self::from_secs(MAX_SECONDS) * seconds.signum() as i64;
        }
        Self::new((seconds * PRECISION as f64).round() as i64, PRECISION)
    }

    /// Float seconds, as sent on the wire.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        *self.value.numer() as f64 / *self.value.denom() as f64
    }

    pub const ZERO: Self = Self {
        value: Rational64::new_raw(0, 1),
    };

    #[inline]
    pub fn is_negative(self) -> bool {
        *self.value.numer() < 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        *self.value.numer() > 0
    }

    /// Clamp negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        self.max(Self::ZERO)
    }

    /// Scale by a float factor (e.g. pixels per second), returning a float.
    #[inline]
    pub fn scale_f64(self, factor: f64) -> f64 {
        self.to_seconds_f64() * factor
    }
}

impl Default for RationalTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for RationalTime {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
        }
    }
}

impl Sub for RationalTime {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
        }
    }
}

impl Neg for RationalTime {
    type Output = Self;
    fn neg(self) -> Self {
        Self { value: -self.value }
    }
}

impl Mul<i64> for RationalTime {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self {
            value: self.value * rhs,
        }
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.to_seconds_f64())
    }
}

impl Serialize for RationalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_seconds_f64())
    }
}

impl<'de> Deserialize<'de> for RationalTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() {
            return Err(serde::de::Error::custom("time must be a finite number"));
        }
        if seconds.abs() > MAX_SECONDS as f64 {
            return Err(serde::de::Error::custom(format!(
                "time {seconds} is out of range (max {MAX_SECONDS}s)"
            )));
        }
        Ok(Self::from_seconds_f64(seconds))
    }
}

/// Half-open span `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: RationalTime,
    /// Duration of the range
    pub duration: RationalTime,
}

impl TimeRange {
    /// Create a new time range from start and duration.
    #[inline]
    pub fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    /// Create a time range from start and end times.
    #[inline]
    pub fn from_start_end(start: RationalTime, end: RationalTime) -> Self {
        Self {
            start,
            duration: end - start,
        }
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> RationalTime {
        self.start + self.duration
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: RationalTime) -> bool {
        time >= self.start && time < self.end()
    }

    /// Check if a time lies strictly between start and end.
    #[inline]
    pub fn strictly_contains(self, time: RationalTime) -> bool {
        time > self.start && time < self.end()
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Empty range starting at zero.
    pub const EMPTY: Self = Self {
        start: RationalTime::ZERO,
        duration: RationalTime::ZERO,
    };
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}
