//! # Validation
//!
//! Field rules for records entering the registry. Each rule appends to a
//! [`ValidationErrors`] so a record reports all of its problems at once.

use crate::error::ValidationErrors;
use regex::Regex;
use std::sync::LazyLock;

// =============================================================================
// LIMITS
// =============================================================================

pub const MODULE_CODE_MAX: usize = 7;
pub const MODULE_CRN_MAX: usize = 50;
pub const COURSE_CODE_MAX: usize = 100;
pub const USERNAME_MAX: usize = 150;
pub const FIRST_NAME_MAX: usize = 30;
pub const LAST_NAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;
pub const DEVICE_ID_LEN: usize = 6;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_MODULE_CODE: &str = "Must be a valid module code e.g. COM101";
pub const INVALID_DEVICE_ID: &str = "Must be a valid device ID e.g. 10101C";
pub const INVALID_STUDENT_CODE: &str = "Must be a valid student code e.g. B00112233";
pub const INVALID_STAFF_CODE: &str = "Must be a valid staff code e.g. E00112233";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

// =============================================================================
// PATTERNS
// =============================================================================

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static MODULE_CODE: Pattern = LazyLock::new(|| Regex::new(r"^[A-Z]{3,4}[0-9]{3}$"));
static DEVICE_ID: Pattern = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6}$"));
static STUDENT_CODE: Pattern = LazyLock::new(|| Regex::new(r"^[Bb][0-9]{8}$"));
static STAFF_CODE: Pattern = LazyLock::new(|| Regex::new(r"^[Ee][0-9]{8}$"));
static USERNAME: Pattern = LazyLock::new(|| Regex::new(r"^[\w.@+-]+$"));
static EMAIL: Pattern =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$"));

fn matches(pattern: &Pattern, value: &str) -> bool {
    pattern.as_ref().is_ok_and(|re| re.is_match(value))
}

#[must_use]
pub fn is_module_code(value: &str) -> bool {
    matches(&MODULE_CODE, value)
}

#[must_use]
pub fn is_device_id(value: &str) -> bool {
    matches(&DEVICE_ID, value)
}

#[must_use]
pub fn is_student_code(value: &str) -> bool {
    matches(&STUDENT_CODE, value)
}

#[must_use]
pub fn is_staff_code(value: &str) -> bool {
    matches(&STAFF_CODE, value)
}

/// Letters, digits and `@ . + - _`, as admin account names allow.
#[must_use]
pub fn is_username(value: &str) -> bool {
    matches(&USERNAME, value)
}

#[must_use]
pub fn is_email(value: &str) -> bool {
    matches(&EMAIL, value)
}

// =============================================================================
// RULES
// =============================================================================

/// Checks `value` is present and within `max` characters.
///
/// Returns `true` when the value passed, so callers can skip pattern checks
/// on a value that already failed.
pub fn text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) -> bool {
    if value.trim().is_empty() {
        errors.push(field, REQUIRED);
        return false;
    }
    let len = value.chars().count();
    if len > max {
        errors.push(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
        return false;
    }
    true
}

/// Runs [`text`] and then `check`, pushing `message` when the check fails.
pub fn pattern(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max: usize,
    check: fn(&str) -> bool,
    message: &str,
) {
    if text(errors, field, value, max) && !check(value) {
        errors.push(field, message);
    }
}

/// Validates the account fields shared by students and staff.
///
/// `username_check`/`username_message` select the student or staff code rule.
pub fn person(
    errors: &mut ValidationErrors,
    person: &crate::Person,
    username_check: fn(&str) -> bool,
    username_message: &str,
) {
    pattern(
        errors,
        "username",
        &person.username,
        USERNAME_MAX,
        username_check,
        username_message,
    );
    text(errors, "first_name", &person.first_name, FIRST_NAME_MAX);
    text(errors, "last_name", &person.last_name, LAST_NAME_MAX);
    pattern(errors, "email", &person.email, EMAIL_MAX, is_email, INVALID_EMAIL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Person;

    #[test]
    fn module_codes() {
        assert!(is_module_code("COM101"));
        assert!(is_module_code("EEEE312"));
        assert!(!is_module_code("ABCDEF"));
        assert!(!is_module_code("com101"));
        assert!(!is_module_code("CO101"));
    }

    #[test]
    fn device_ids() {
        assert!(is_device_id("10101C"));
        assert!(is_device_id("abcdef"));
        assert!(!is_device_id("10101"));
        assert!(!is_device_id("10101-C"));
    }

    #[test]
    fn user_codes() {
        assert!(is_student_code("B00112233"));
        assert!(is_student_code("b00112233"));
        assert!(!is_student_code("E00112233"));
        assert!(is_staff_code("E00112233"));
        assert!(is_staff_code("e00987654"));
        assert!(!is_staff_code("B00112233"));
    }

    #[test]
    fn usernames() {
        assert!(is_username("admin"));
        assert!(is_username("jo.bloggs+ops@uni-x_1"));
        assert!(is_username("s\u{e9}amus"));
        assert!(!is_username("../escaped"));
        assert!(!is_username("dir\\name"));
        assert!(!is_username("two words"));
    }

    #[test]
    fn emails() {
        assert!(is_email("test@email.com"));
        assert!(!is_email("test@email"));
        assert!(!is_email("@email.com"));
        assert!(!is_email("test@@email.com"));
    }

    #[test]
    fn length_message_counts_characters() {
        let mut errors = ValidationErrors::new();
        pattern(
            &mut errors,
            "module_code",
            "COM12000",
            MODULE_CODE_MAX,
            is_module_code,
            INVALID_MODULE_CODE,
        );
        assert_eq!(
            errors.for_field("module_code").collect::<Vec<_>>(),
            vec!["Ensure this value has at most 7 characters (it has 8)."]
        );
    }

    #[test]
    fn empty_person_reports_every_field() {
        let mut errors = ValidationErrors::new();
        person(
            &mut errors,
            &Person::new("", "", "", ""),
            is_student_code,
            INVALID_STUDENT_CODE,
        );
        assert_eq!(errors.len(), 4);
        assert!(errors.0.iter().all(|e| e.message == REQUIRED));
    }

    #[test]
    fn invalid_student_person() {
        let mut errors = ValidationErrors::new();
        person(
            &mut errors,
            &Person::new("E00112233", "First Name", "Last Name", "test@email"),
            is_student_code,
            INVALID_STUDENT_CODE,
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.for_field("username").collect::<Vec<_>>(),
            vec![INVALID_STUDENT_CODE]
        );
        assert_eq!(
            errors.for_field("email").collect::<Vec<_>>(),
            vec![INVALID_EMAIL]
        );
    }
}
