//! Access policy tests
//!
//! Property-based checks that the role table is applied exactly:
//! - Administrators may do everything
//! - Only administrators register users
//! - Students are read-only and never add records

use proptest::prelude::*;
use shared::{allowed_operations, is_allowed, Operation, Role};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

/// Expected permission, written out independently of the policy table
fn expected(role: Role, operation: Operation) -> bool {
    use Operation::*;
    match role {
        Role::Admin => true,
        Role::Staff | Role::Teacher => operation != RegisterUser,
        Role::Student => matches!(operation, ViewStudents | ViewSubjects | ViewGrades | AverageGrade),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_policy_matches_role_table(role in role_strategy(), operation in operation_strategy()) {
        prop_assert_eq!(is_allowed(role, operation), expected(role, operation));
    }

    #[test]
    fn prop_only_admin_registers_users(role in role_strategy()) {
        prop_assert_eq!(is_allowed(role, Operation::RegisterUser), role == Role::Admin);
    }

    #[test]
    fn prop_allowed_operations_agree_with_is_allowed(role in role_strategy()) {
        let allowed = allowed_operations(role);
        for operation in Operation::ALL {
            prop_assert_eq!(allowed.contains(&operation), is_allowed(role, operation));
        }
    }

    #[test]
    fn prop_role_names_parse_case_insensitively(role in role_strategy(), upper in any::<bool>()) {
        let name = if upper { role.as_str().to_uppercase() } else { role.as_str().to_string() };
        prop_assert_eq!(name.parse::<Role>().unwrap(), role);
    }
}

#[test]
fn test_students_cannot_write() {
    for operation in [
        Operation::AddStudent,
        Operation::AddSubject,
        Operation::AddGrade,
        Operation::CountFailing,
        Operation::FailingStudents,
        Operation::RegisterUser,
    ] {
        assert!(!is_allowed(Role::Student, operation), "{}", operation);
    }
}

#[test]
fn test_staff_and_teacher_have_equal_rights() {
    assert_eq!(allowed_operations(Role::Staff), allowed_operations(Role::Teacher));
    assert_eq!(allowed_operations(Role::Admin).len(), Operation::ALL.len());
}
