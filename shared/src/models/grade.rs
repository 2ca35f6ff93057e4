//! Grade models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{deserialize_form_int, GradeValue, Quarter};

use super::student::student_label;

/// A single grade given to a student in a subject
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub value: GradeValue,
    pub date: NaiveDate,
    pub quarter: Quarter,
}

/// Raw grade submission; every field is optional so that missing
/// fields surface as validation errors instead of decode failures.
/// Numbers may arrive as JSON numbers or as form text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGrade {
    #[serde(default, deserialize_with = "deserialize_form_int")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_form_int")]
    pub subject_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_form_int")]
    pub grade: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_form_int")]
    pub quarter: Option<i64>,
}

/// A grade submission whose fields passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidGrade {
    pub student_id: i64,
    pub subject_id: i64,
    pub value: GradeValue,
    pub quarter: Quarter,
}

/// A grade joined with student and subject names for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradeEntry {
    pub grade_id: i64,
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class_label: String,
    pub subject: String,
    pub grade: GradeValue,
    pub date: NaiveDate,
    pub quarter: Quarter,
}

/// Grades of one student, labelled "First Last (Class)"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentGrades {
    pub student_id: i64,
    pub student: String,
    pub grades: Vec<GradeEntry>,
}

/// Group grade rows per student, keeping the order in which students
/// first appear and the row order within each student.
pub fn group_by_student(entries: &[GradeEntry]) -> Vec<StudentGrades> {
    let mut groups: Vec<StudentGrades> = Vec::new();

    for entry in entries {
        match groups.iter_mut().find(|g| g.student_id == entry.student_id) {
            Some(group) => group.grades.push(entry.clone()),
            None => groups.push(StudentGrades {
                student_id: entry.student_id,
                student: student_label(&entry.first_name, &entry.last_name, &entry.class_label),
                grades: vec![entry.clone()],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(grade_id: i64, student_id: i64, first: &str, subject: &str, value: i64) -> GradeEntry {
        GradeEntry {
            grade_id,
            student_id,
            first_name: first.to_string(),
            last_name: "Smirnov".to_string(),
            class_label: "9B".to_string(),
            subject: subject.to_string(),
            grade: GradeValue::new(value).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
            quarter: Quarter::new(1).unwrap(),
        }
    }

    #[test]
    fn test_group_by_student_keeps_order() {
        let rows = vec![
            entry(1, 7, "Oleg", "Physics", 4),
            entry(2, 3, "Pavel", "History", 5),
            entry(3, 7, "Oleg", "History", 2),
        ];

        let groups = group_by_student(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].student, "Oleg Smirnov (9B)");
        assert_eq!(groups[0].grades.len(), 2);
        assert_eq!(groups[0].grades[1].subject, "History");
        assert_eq!(groups[1].student_id, 3);
    }

    #[test]
    fn test_group_by_student_empty() {
        assert!(group_by_student(&[]).is_empty());
    }
}
