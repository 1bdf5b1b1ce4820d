//! Client-side form checks, run before any request is built.
//!
//! Each `check_*` function reports every violated field at once, so a form can
//! show all messages inline in one pass.

use crate::outcome::{FieldErrors, Outcome};

/// Minimum length for a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Number of digits in an OTP code.
pub const OTP_LEN: usize = 6;

/// Validates a simple `local@domain.tld` email shape.
///
/// - No whitespace anywhere
/// - Non-empty local part before the last `@`
/// - Domain contains a `.` with text on both sides
#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validates an OTP code: exactly six ASCII digits.
#[must_use]
pub fn is_valid_otp(s: &str) -> bool {
    s.len() == OTP_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

fn check_email_field(errors: &mut FieldErrors, email: &str) {
    require(errors, "email", email, "Email is required");
    if !is_valid_email(email) {
        errors.insert("email", "Email is invalid");
    }
}

fn check_otp_field(errors: &mut FieldErrors, otp: &str) {
    if !is_valid_otp(otp) {
        errors.insert("otp", "OTP must be exactly 6 digits");
    }
}

fn check_new_password(
    errors: &mut FieldErrors,
    field: &str,
    password: &str,
    confirm_password: &str,
) {
    require(errors, field, password, "Password is required");
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(field, "Password must be at least 6 characters");
    }
    require(
        errors,
        "confirmPassword",
        confirm_password,
        "Password confirmation is required",
    );
    if password != confirm_password {
        errors.insert("confirmPassword", "Passwords do not match");
    }
}

/// # Errors
///
/// Returns [`AuthError::Validation`](crate::AuthError::Validation) listing every
/// empty field.
pub fn check_login(identifier: &str, password: &str) -> Outcome<()> {
    let mut errors = FieldErrors::default();
    require(
        &mut errors,
        "identifier",
        identifier,
        "Email or username is required",
    );
    require(&mut errors, "password", password, "Password is required");
    errors.into_result()
}

/// # Errors
///
/// Returns [`AuthError::Validation`](crate::AuthError::Validation) listing every
/// violated field.
pub fn check_register(
    identifier: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Outcome<()> {
    let mut errors = FieldErrors::default();
    require(&mut errors, "identifier", identifier, "Username is required");
    check_email_field(&mut errors, email);
    check_new_password(&mut errors, "password", password, confirm_password);
    errors.into_result()
}

/// # Errors
///
/// Returns [`AuthError::Validation`](crate::AuthError::Validation) if the email
/// or the code is malformed.
pub fn check_verify_otp(email: &str, otp: &str) -> Outcome<()> {
    let mut errors = FieldErrors::default();
    check_email_field(&mut errors, email);
    check_otp_field(&mut errors, otp);
    errors.into_result()
}

/// # Errors
///
/// Returns [`AuthError::Validation`](crate::AuthError::Validation) if the email
/// is empty or malformed.
pub fn check_email(email: &str) -> Outcome<()> {
    let mut errors = FieldErrors::default();
    check_email_field(&mut errors, email);
    errors.into_result()
}

/// # Errors
///
/// Returns [`AuthError::Validation`](crate::AuthError::Validation) listing every
/// violated field.
pub fn check_reset_password(
    email: &str,
    otp: &str,
    new_password: &str,
    confirm_password: &str,
) -> Outcome<()> {
    let mut errors = FieldErrors::default();
    check_email_field(&mut errors, email);
    check_otp_field(&mut errors, otp);
    check_new_password(&mut errors, "newPassword", new_password, confirm_password);
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::AuthError;

    fn fields(outcome: Outcome<()>) -> FieldErrors {
        match outcome {
            Err(AuthError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.vn"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("alice@example."));
        assert!(!is_valid_email("ali ce@example.com"));
    }

    #[test]
    fn test_valid_otp() {
        assert!(is_valid_otp("123456"));
        assert!(is_valid_otp("000000"));
    }

    #[test]
    fn test_invalid_otp() {
        assert!(!is_valid_otp("12345"));
        assert!(!is_valid_otp("1234567"));
        assert!(!is_valid_otp("12a456"));
        assert!(!is_valid_otp(""));
        assert!(!is_valid_otp("１２３４５６"));
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = fields(check_login("", "  "));
        assert!(errors.contains("identifier"));
        assert!(errors.contains("password"));
        assert!(check_login("alice", "secret1").is_ok());
    }

    #[test]
    fn register_reports_every_violation() {
        let errors = fields(check_register("", "not-an-email", "abc", "abd"));
        assert!(errors.contains("identifier"));
        assert_eq!(errors.get("email"), Some("Email is invalid"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
    }

    #[test]
    fn register_accepts_valid_form() {
        assert!(check_register("alice", "alice@example.com", "secret1", "secret1").is_ok());
    }

    #[test]
    fn empty_email_reports_required_first() {
        let errors = fields(check_email(""));
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn verify_otp_rejects_short_code() {
        let errors = fields(check_verify_otp("alice@example.com", "12345"));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("otp"));
    }

    #[test]
    fn reset_password_checks_length_and_confirmation() {
        let errors = fields(check_reset_password(
            "alice@example.com",
            "123456",
            "12345",
            "12345",
        ));
        assert!(errors.contains("newPassword"));
        assert!(!errors.contains("confirmPassword"));

        let errors = fields(check_reset_password(
            "alice@example.com",
            "123456",
            "secret1",
            "secret2",
        ));
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));

        assert!(
            check_reset_password("alice@example.com", "123456", "secret1", "secret1").is_ok()
        );
    }
}
