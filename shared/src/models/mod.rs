//! Domain models for the Gradebook platform

mod access;
mod grade;
mod report;
mod student;
mod subject;
mod user;

pub use access::*;
pub use grade::*;
pub use report::*;
pub use student::*;
pub use subject::*;
pub use user::*;
