//! Student models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A student enrolled in a class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Class label such as "10A"
    pub class_label: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "First Last (Class)", used to group grade listings
    pub fn label(&self) -> String {
        student_label(&self.first_name, &self.last_name, &self.class_label)
    }
}

pub fn student_label(first_name: &str, last_name: &str, class_label: &str) -> String {
    format!("{} {} ({})", first_name, last_name, class_label)
}

/// Input for creating a student
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStudent {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[serde(default, alias = "class")]
    #[validate(length(min = 1, max = 20, message = "Class is required"))]
    pub class_label: String,
}

impl NewStudent {
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            class_label: self.class_label.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let student = Student {
            id: 1,
            first_name: "Anna".to_string(),
            last_name: "Ivanova".to_string(),
            class_label: "10A".to_string(),
        };
        assert_eq!(student.full_name(), "Anna Ivanova");
        assert_eq!(student.label(), "Anna Ivanova (10A)");
    }

    #[test]
    fn test_blank_fields_fail_after_trim() {
        let input = NewStudent {
            first_name: "  ".to_string(),
            last_name: "Ivanova".to_string(),
            class_label: "10A".to_string(),
        }
        .normalized();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }
}
