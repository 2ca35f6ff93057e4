//! Common types used across the platform

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The grade value that counts as a failing mark on the 1-5 scale
pub const FAILING_GRADE: u8 = 2;

/// Lowest and highest grade values
pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 5;

/// Number of grading periods in an academic year
pub const QUARTERS_PER_YEAR: u8 = 4;

/// Error raised when a raw number does not fit a bounded school value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Grade must be a number from 1 to 5, got {0}")]
    GradeOutOfRange(i64),

    #[error("Quarter must be a number from 1 to 4, got {0}")]
    QuarterOutOfRange(i64),
}

/// A grade value guaranteed to lie in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct GradeValue(u8);

impl GradeValue {
    pub fn new(value: i64) -> Result<Self, ValueError> {
        if (MIN_GRADE as i64..=MAX_GRADE as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValueError::GradeOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_failing(self) -> bool {
        self.0 == FAILING_GRADE
    }
}

impl TryFrom<i64> for GradeValue {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GradeValue> for i64 {
    fn from(value: GradeValue) -> Self {
        value.0 as i64
    }
}

impl std::fmt::Display for GradeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four grading periods of an academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quarter(u8);

impl Quarter {
    pub fn new(value: i64) -> Result<Self, ValueError> {
        if (1..=QUARTERS_PER_YEAR as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValueError::QuarterOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All quarters in calendar order
    pub fn all() -> impl Iterator<Item = Quarter> {
        (1..=QUARTERS_PER_YEAR).map(Quarter)
    }
}

impl TryFrom<i64> for Quarter {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quarter> for i64 {
    fn from(value: Quarter) -> Self {
        value.0 as i64
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Quarter {
    type Err = ValueError;

    /// Parses the decimal digits of a form or query field
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValueError::QuarterOutOfRange(0));
        }
        let value = trimmed.parse::<i64>().unwrap_or(0);
        Self::new(value)
    }
}

/// Deserialize an optional whole number that a form may send either as a
/// JSON number or as digits in a string. `null` and blank text read as absent.
///
/// Use together with `#[serde(default)]` so a missing field is `None`.
pub fn deserialize_form_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FormIntVisitor)
}

struct FormIntVisitor;

impl<'de> Visitor<'de> for FormIntVisitor {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a whole number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // 5.0 is still a whole number; 2.5 is not
        if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 {
            Ok(Some(v as i64))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<i64>()
            .map(Some)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_value_bounds() {
        assert!(GradeValue::new(1).is_ok());
        assert!(GradeValue::new(5).is_ok());
        assert_eq!(GradeValue::new(0), Err(ValueError::GradeOutOfRange(0)));
        assert_eq!(GradeValue::new(6), Err(ValueError::GradeOutOfRange(6)));
        assert!(GradeValue::new(-3).is_err());
    }

    #[test]
    fn test_failing_grade() {
        assert!(GradeValue::new(2).unwrap().is_failing());
        assert!(!GradeValue::new(1).unwrap().is_failing());
        assert!(!GradeValue::new(3).unwrap().is_failing());
    }

    #[test]
    fn test_quarter_bounds() {
        assert_eq!(Quarter::all().count(), 4);
        assert!(Quarter::new(0).is_err());
        assert!(Quarter::new(5).is_err());
        assert_eq!(Quarter::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_quarter_from_str() {
        assert_eq!("2".parse::<Quarter>().unwrap().get(), 2);
        assert_eq!(" 4 ".parse::<Quarter>().unwrap().get(), 4);
        assert!("".parse::<Quarter>().is_err());
        assert!("two".parse::<Quarter>().is_err());
        assert!("-1".parse::<Quarter>().is_err());
        assert!("7".parse::<Quarter>().is_err());
        assert!("99999999999999999999999".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<GradeValue>("4").is_ok());
        assert!(serde_json::from_str::<GradeValue>("9").is_err());
        assert!(serde_json::from_str::<Quarter>("0").is_err());
        assert_eq!(serde_json::to_string(&Quarter::new(2).unwrap()).unwrap(), "2");
    }

    #[derive(Debug, Deserialize)]
    struct Submitted {
        #[serde(default, deserialize_with = "deserialize_form_int")]
        grade: Option<i64>,
    }

    fn submitted(json: &str) -> Result<Option<i64>, serde_json::Error> {
        serde_json::from_str::<Submitted>(json).map(|s| s.grade)
    }

    #[test]
    fn test_form_int_accepts_numbers_and_digits() {
        assert_eq!(submitted(r#"{"grade": 5}"#).unwrap(), Some(5));
        assert_eq!(submitted(r#"{"grade": "5"}"#).unwrap(), Some(5));
        assert_eq!(submitted(r#"{"grade": " 3 "}"#).unwrap(), Some(3));
        assert_eq!(submitted(r#"{"grade": 4.0}"#).unwrap(), Some(4));
    }

    #[test]
    fn test_form_int_absent_values() {
        assert_eq!(submitted("{}").unwrap(), None);
        assert_eq!(submitted(r#"{"grade": null}"#).unwrap(), None);
        assert_eq!(submitted(r#"{"grade": ""}"#).unwrap(), None);
    }

    #[test]
    fn test_form_int_rejects_fractions_and_words() {
        assert!(submitted(r#"{"grade": 2.5}"#).is_err());
        assert!(submitted(r#"{"grade": "2.5"}"#).is_err());
        assert!(submitted(r#"{"grade": "five"}"#).is_err());
        assert!(submitted(r#"{"grade": true}"#).is_err());
    }
}
