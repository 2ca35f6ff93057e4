//! Reporting models: averages and failing-grade summaries

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::Quarter;

/// Average grade of one student in one subject for a quarter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageGrade {
    pub student_id: i64,
    pub student_name: String,
    pub subject_id: i64,
    pub subject: String,
    pub quarter: Quarter,
    /// Mean rounded to two decimal places
    pub average: Decimal,
    pub grade_count: i64,
}

/// Arithmetic mean of `count` grades summing to `sum`, rounded to 2 places.
///
/// Returns `None` when there is nothing to average.
pub fn mean_rounded(sum: i64, count: i64) -> Option<Decimal> {
    if count <= 0 {
        return None;
    }
    let mean = Decimal::from(sum) / Decimal::from(count);
    Some(mean.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Failing-grade count for one class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassFailingCount {
    pub class_label: String,
    pub failing_count: i64,
}

/// Failing grades per class for a quarter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailingByClassReport {
    pub quarter: Quarter,
    pub classes: Vec<ClassFailingCount>,
    pub total: i64,
}

impl FailingByClassReport {
    pub fn new(quarter: Quarter, classes: Vec<ClassFailingCount>) -> Self {
        let total = classes.iter().map(|c| c.failing_count).sum();
        Self {
            quarter,
            classes,
            total,
        }
    }
}

/// Failing grades of one student in one subject, as aggregated by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingSubjectRow {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class_label: String,
    pub subject: String,
    pub failing_count: i64,
}

/// A student with at least one failing grade in a quarter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailingStudent {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub class_label: String,
    pub failing_count: i64,
    /// Distinct subjects failed, alphabetically
    pub subjects: Vec<String>,
}

/// Fold per-subject rows into one entry per student.
///
/// Rows with a zero count are dropped. The result is ordered by descending
/// failing count, then class, last name and first name.
pub fn collate_failing_students(rows: Vec<FailingSubjectRow>) -> Vec<FailingStudent> {
    let mut students: Vec<FailingStudent> = Vec::new();

    for row in rows.into_iter().filter(|r| r.failing_count > 0) {
        match students.iter_mut().find(|s| s.student_id == row.student_id) {
            Some(student) => {
                student.failing_count += row.failing_count;
                if !student.subjects.contains(&row.subject) {
                    student.subjects.push(row.subject);
                }
            }
            None => students.push(FailingStudent {
                student_id: row.student_id,
                first_name: row.first_name,
                last_name: row.last_name,
                class_label: row.class_label,
                failing_count: row.failing_count,
                subjects: vec![row.subject],
            }),
        }
    }

    for student in &mut students {
        student.subjects.sort();
    }

    students.sort_by(|a, b| {
        b.failing_count
            .cmp(&a.failing_count)
            .then_with(|| a.class_label.cmp(&b.class_label))
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.first_name.cmp(&b.first_name))
    });

    students
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(student_id: i64, last: &str, class: &str, subject: &str, count: i64) -> FailingSubjectRow {
        FailingSubjectRow {
            student_id,
            first_name: "Test".to_string(),
            last_name: last.to_string(),
            class_label: class.to_string(),
            subject: subject.to_string(),
            failing_count: count,
        }
    }

    #[test]
    fn test_mean_rounded() {
        assert_eq!(mean_rounded(11, 3), Some(Decimal::new(367, 2)));
        assert_eq!(mean_rounded(8, 2), Some(Decimal::from(4)));
        assert_eq!(mean_rounded(0, 0), None);
    }

    #[test]
    fn test_mean_rounds_midpoint_away_from_zero() {
        // 25 / 8 = 3.125
        assert_eq!(mean_rounded(25, 8), Some(Decimal::new(313, 2)));
    }

    #[test]
    fn test_failing_by_class_total() {
        let quarter = Quarter::new(1).unwrap();
        let report = FailingByClassReport::new(
            quarter,
            vec![
                ClassFailingCount {
                    class_label: "10A".to_string(),
                    failing_count: 2,
                },
                ClassFailingCount {
                    class_label: "10B".to_string(),
                    failing_count: 1,
                },
            ],
        );
        assert_eq!(report.total, 3);

        let empty = FailingByClassReport::new(quarter, vec![]);
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn test_collate_failing_students() {
        let rows = vec![
            row(1, "Orlov", "10A", "Physics", 1),
            row(2, "Belov", "10B", "History", 2),
            row(1, "Orlov", "10A", "Chemistry", 2),
            row(3, "Zaitsev", "10A", "History", 0),
        ];

        let students = collate_failing_students(rows);
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].student_id, 1);
        assert_eq!(students[0].failing_count, 3);
        assert_eq!(students[0].subjects, vec!["Chemistry", "Physics"]);
        assert_eq!(students[1].student_id, 2);
        assert_eq!(students[1].failing_count, 2);
    }

    #[test]
    fn test_collate_ties_ordered_by_class_then_name() {
        let rows = vec![
            row(5, "Kuznetsov", "11A", "Biology", 1),
            row(6, "Alekseev", "10C", "Biology", 1),
            row(7, "Borisov", "10C", "Biology", 1),
        ];
        let ids: Vec<i64> = collate_failing_students(rows)
            .iter()
            .map(|s| s.student_id)
            .collect();
        assert_eq!(ids, vec![6, 7, 5]);
    }
}
