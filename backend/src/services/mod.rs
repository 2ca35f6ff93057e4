//! Business logic services for the Gradebook server

pub mod auth;
pub mod grade;
pub mod reporting;
pub mod student;
pub mod subject;

pub use auth::AuthService;
pub use grade::GradeService;
pub use reporting::ReportingService;
pub use student::StudentService;
pub use subject::SubjectService;
