//! WebAssembly module for Gradebook
//!
//! Provides client-side checks so forms can reject bad input before a
//! round trip:
//! - Grade and quarter range checks
//! - Role-based operation visibility
//! - Average preview for entered grades

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"Gradebook client module loaded".into());
}

/// Check that a grade lies on the 1-5 scale
#[wasm_bindgen]
pub fn is_valid_grade(value: i32) -> bool {
    GradeValue::new(value as i64).is_ok()
}

/// Check that a quarter is one of 1-4
#[wasm_bindgen]
pub fn is_valid_quarter(value: i32) -> bool {
    Quarter::new(value as i64).is_ok()
}

/// Check a quarter typed into a text field
#[wasm_bindgen]
pub fn parse_quarter_input(raw: &str) -> Result<u8, JsValue> {
    parse_quarter(Some(raw))
        .map(Quarter::get)
        .map_err(|e| JsValue::from_str(&e.message))
}

/// Whether a grade counts as failing
#[wasm_bindgen]
pub fn is_failing_grade(value: i32) -> bool {
    GradeValue::new(value as i64).is_ok_and(GradeValue::is_failing)
}

/// Whether a role may perform an operation, so the UI can hide
/// links the server would refuse anyway
#[wasm_bindgen]
pub fn is_operation_allowed(role: &str, operation: &str) -> bool {
    let Ok(role) = role.parse::<Role>() else {
        return false;
    };
    let Ok(operation) = serde_json::from_value::<Operation>(serde_json::Value::String(operation.to_string()))
    else {
        return false;
    };
    is_allowed(role, operation)
}

/// Operations available to a role, as a JSON array of names
#[wasm_bindgen]
pub fn operations_for_role(role: &str) -> String {
    let operations = role
        .parse::<Role>()
        .map(allowed_operations)
        .unwrap_or_default();
    serde_json::to_string(&operations).unwrap_or_else(|_| "[]".to_string())
}

/// Mean of grades given as a JSON array, rounded to 2 places.
/// Returns an empty string when there is nothing to average.
#[wasm_bindgen]
pub fn preview_average(grades_json: &str) -> Result<String, JsValue> {
    let grades: Vec<GradeValue> = serde_json::from_str(grades_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid grades JSON: {}", e)))?;

    let sum: i64 = grades.iter().map(|g| i64::from(*g)).sum();
    Ok(mean_rounded(sum, grades.len() as i64)
        .map(|avg| avg.to_string())
        .unwrap_or_default())
}

/// Check a password against the account rules.
/// Returns an empty string when acceptable.
#[wasm_bindgen]
pub fn password_problem(password: &str) -> String {
    validate_password(password)
        .err()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_and_quarter_ranges() {
        assert!(is_valid_grade(1));
        assert!(is_valid_grade(5));
        assert!(!is_valid_grade(0));
        assert!(!is_valid_grade(6));
        assert!(is_valid_quarter(4));
        assert!(!is_valid_quarter(5));
    }

    #[test]
    fn test_is_failing_grade() {
        assert!(is_failing_grade(2));
        assert!(!is_failing_grade(3));
        assert!(!is_failing_grade(9));
    }

    #[test]
    fn test_operation_visibility() {
        assert!(is_operation_allowed("admin", "register_user"));
        assert!(!is_operation_allowed("teacher", "register_user"));
        assert!(is_operation_allowed("student", "view_grades"));
        assert!(!is_operation_allowed("student", "add_grade"));
        assert!(!is_operation_allowed("janitor", "view_grades"));
        assert!(!is_operation_allowed("admin", "drop_tables"));
    }

    #[test]
    fn test_operations_for_role() {
        let ops: Vec<String> = serde_json::from_str(&operations_for_role("student")).unwrap();
        assert_eq!(
            ops,
            vec!["view_students", "view_subjects", "view_grades", "average_grade"]
        );
        assert_eq!(operations_for_role("nobody"), "[]");
    }

    #[test]
    fn test_password_problem() {
        assert_eq!(password_problem("longenough"), "");
        assert!(!password_problem("short").is_empty());
    }
}
