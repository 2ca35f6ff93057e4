//! Static role-based access policy
//!
//! Every protected operation has a fixed set of roles allowed to perform it.
//! There is no conditional permission beyond role membership.

use serde::{Deserialize, Serialize};

use super::user::Role;

/// Operations exposed by the service that require an authenticated role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ViewStudents,
    AddStudent,
    ViewSubjects,
    AddSubject,
    AddGrade,
    ViewGrades,
    AverageGrade,
    CountFailing,
    FailingStudents,
    RegisterUser,
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Staff, Role::Teacher, Role::Student];
const SCHOOL_STAFF: &[Role] = &[Role::Admin, Role::Staff, Role::Teacher];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::ViewStudents,
        Operation::AddStudent,
        Operation::ViewSubjects,
        Operation::AddSubject,
        Operation::AddGrade,
        Operation::ViewGrades,
        Operation::AverageGrade,
        Operation::CountFailing,
        Operation::FailingStudents,
        Operation::RegisterUser,
    ];

    /// Roles allowed to perform this operation
    pub fn permitted_roles(&self) -> &'static [Role] {
        match self {
            Operation::ViewStudents
            | Operation::ViewSubjects
            | Operation::ViewGrades
            | Operation::AverageGrade => EVERYONE,
            Operation::AddStudent
            | Operation::AddSubject
            | Operation::AddGrade
            | Operation::CountFailing
            | Operation::FailingStudents => SCHOOL_STAFF,
            Operation::RegisterUser => ADMIN_ONLY,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::ViewStudents => "view_students",
            Operation::AddStudent => "add_student",
            Operation::ViewSubjects => "view_subjects",
            Operation::AddSubject => "add_subject",
            Operation::AddGrade => "add_grade",
            Operation::ViewGrades => "view_grades",
            Operation::AverageGrade => "average_grade",
            Operation::CountFailing => "count_failing",
            Operation::FailingStudents => "failing_students",
            Operation::RegisterUser => "register_user",
        };
        f.write_str(name)
    }
}

/// Authorization policy: may `role` perform `operation`?
pub fn is_allowed(role: Role, operation: Operation) -> bool {
    operation.permitted_roles().contains(&role)
}

/// Every operation the role may perform, in declaration order
pub fn allowed_operations(role: Role) -> Vec<Operation> {
    Operation::ALL
        .into_iter()
        .filter(|op| is_allowed(role, *op))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_can_do_everything() {
        assert_eq!(allowed_operations(Role::Admin).len(), Operation::ALL.len());
    }

    #[test]
    fn test_only_admin_registers_users() {
        assert!(is_allowed(Role::Admin, Operation::RegisterUser));
        assert!(!is_allowed(Role::Staff, Operation::RegisterUser));
        assert!(!is_allowed(Role::Teacher, Operation::RegisterUser));
        assert!(!is_allowed(Role::Student, Operation::RegisterUser));
    }

    #[test]
    fn test_student_is_read_only() {
        assert_eq!(
            allowed_operations(Role::Student),
            vec![
                Operation::ViewStudents,
                Operation::ViewSubjects,
                Operation::ViewGrades,
                Operation::AverageGrade,
            ]
        );
    }

    #[test]
    fn test_staff_and_teacher_share_permissions() {
        assert_eq!(allowed_operations(Role::Staff), allowed_operations(Role::Teacher));
        assert!(is_allowed(Role::Teacher, Operation::AddGrade));
        assert!(is_allowed(Role::Staff, Operation::CountFailing));
    }
}
