//! Validation utilities for the Gradebook platform
//!
//! Form-level checks shared by the server and the browser helpers.

use std::borrow::Cow;

use validator::ValidationErrors;

use crate::models::{NewGrade, ValidGrade};
use crate::types::{GradeValue, Quarter};

/// A validation failure tied to a single input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Reduce `validator` output to the first failing field (by name, so the
/// reported field is stable across runs).
pub fn first_field_error(errors: &ValidationErrors) -> FieldError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by_key(|(name, _)| **name);

    fields
        .into_iter()
        .find_map(|(name, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .clone()
                    .unwrap_or_else(|| Cow::Owned(format!("Invalid value for {}", name)));
                FieldError::new(*name, message)
            })
        })
        .unwrap_or_else(|| FieldError::new("input", "Invalid input"))
}

// ============================================================================
// Grade Validations
// ============================================================================

/// Validate that a grade lies on the 1-5 scale
pub fn validate_grade_value(value: i64) -> Result<GradeValue, FieldError> {
    GradeValue::new(value).map_err(|e| FieldError::new("grade", e.to_string()))
}

/// Validate that a quarter is one of 1-4
pub fn validate_quarter(value: i64) -> Result<Quarter, FieldError> {
    Quarter::new(value).map_err(|e| FieldError::new("quarter", e.to_string()))
}

/// Validate a quarter typed into a form or query string
pub fn parse_quarter(raw: Option<&str>) -> Result<Quarter, FieldError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        FieldError::new("quarter", "Please enter a quarter number from 1 to 4")
    })?;
    raw.parse::<Quarter>()
        .map_err(|_| FieldError::new("quarter", "Please enter a quarter number from 1 to 4"))
}

/// Validate a grade submission: every field present, value and quarter in range
pub fn validate_new_grade(input: &NewGrade) -> Result<ValidGrade, FieldError> {
    let (Some(student_id), Some(subject_id), Some(grade), Some(quarter)) =
        (input.student_id, input.subject_id, input.grade, input.quarter)
    else {
        let missing = [
            ("student_id", input.student_id.is_none()),
            ("subject_id", input.subject_id.is_none()),
            ("grade", input.grade.is_none()),
            ("quarter", input.quarter.is_none()),
        ]
        .into_iter()
        .find(|(_, absent)| *absent)
        .map(|(field, _)| field)
        .unwrap_or("input");
        return Err(FieldError::new(missing, "Please fill in all fields"));
    };

    Ok(ValidGrade {
        student_id,
        subject_id,
        value: validate_grade_value(grade)?,
        quarter: validate_quarter(quarter)?,
    })
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate that a trimmed text field is not blank
pub fn validate_required(field: &str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, "Please fill in all fields"));
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate username format (3-50 visible characters, no whitespace)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if len < 3 {
        return Err("Username must be at least 3 characters");
    }
    if len > 50 {
        return Err("Username must be at most 50 characters");
    }
    if username.chars().any(char::is_whitespace) {
        return Err("Username must not contain spaces");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_grade() -> NewGrade {
        NewGrade {
            student_id: Some(1),
            subject_id: Some(2),
            grade: Some(4),
            quarter: Some(3),
        }
    }

    #[test]
    fn test_validate_new_grade_valid() {
        let grade = validate_new_grade(&full_grade()).unwrap();
        assert_eq!(grade.value.get(), 4);
        assert_eq!(grade.quarter.get(), 3);
    }

    #[test]
    fn test_validate_new_grade_missing_field() {
        let input = NewGrade {
            grade: None,
            ..full_grade()
        };
        let err = validate_new_grade(&input).unwrap_err();
        assert_eq!(err.field, "grade");
    }

    #[test]
    fn test_validate_new_grade_out_of_range() {
        let bad_value = NewGrade {
            grade: Some(6),
            ..full_grade()
        };
        assert_eq!(validate_new_grade(&bad_value).unwrap_err().field, "grade");

        let bad_quarter = NewGrade {
            quarter: Some(0),
            ..full_grade()
        };
        assert_eq!(validate_new_grade(&bad_quarter).unwrap_err().field, "quarter");
    }

    #[test]
    fn test_parse_quarter() {
        assert_eq!(parse_quarter(Some("1")).unwrap().get(), 1);
        assert!(parse_quarter(None).is_err());
        assert!(parse_quarter(Some(" ")).is_err());
        assert!(parse_quarter(Some("5")).is_err());
        assert!(parse_quarter(Some("1.5")).is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("first_name", "Anna").is_ok());
        assert!(validate_required("first_name", "   ").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("two words").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
    }
}
