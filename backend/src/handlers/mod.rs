//! HTTP request handlers

pub mod auth;
pub mod grades;
pub mod health;
pub mod reporting;
pub mod students;
pub mod subjects;

pub use auth::{login, logout, register};
pub use grades::{add_grade, add_grade_form, view_grades};
pub use health::{health_check, index};
pub use reporting::{
    average_grade, average_grade_form, count_twos, count_twos_submit, failing_students,
    failing_students_submit,
};
pub use students::{add_student, list_students};
pub use subjects::{add_subject, list_subjects};
