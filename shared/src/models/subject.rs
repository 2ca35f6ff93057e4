//! School subject models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A subject grades are given in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

/// Input for creating a subject
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSubject {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Subject name is required"))]
    pub name: String,
}

impl NewSubject {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}

/// Subjects seeded into an empty database
pub fn default_subjects() -> Vec<String> {
    [
        "Mathematics",
        "Russian Language",
        "Physics",
        "History",
        "English Language",
        "Chemistry",
        "Biology",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
