//! Field rules for the login, registration and profile update bodies.
//!
//! Every field reports at most one message: the first rule it breaks.
//! Lengths are counted in characters, not bytes.

use crate::types::{LoginRequest, RegisterRequest, UpdateUserRequest, ValidationErrors};

pub const GENERAL_ERROR_KEY: &str = "general";

pub const PHONE_PREFIX: &str = "+62";
const PHONE_MIN: usize = 10;
const PHONE_MAX: usize = 13;
const FULL_NAME_MIN: usize = 3;
const FULL_NAME_MAX: usize = 60;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 64;

struct Field<'a> {
    key: &'static str,
    label: &'static str,
    value: &'a str,
}

impl Field<'_> {
    fn required(&self) -> Option<String> {
        self.value
            .is_empty()
            .then(|| format!("{} is required", self.label))
    }

    fn min(&self, min: usize) -> Option<String> {
        (self.value.chars().count() < min)
            .then(|| format!("{} must have minimum {} characters long", self.label, min))
    }

    fn max(&self, max: usize) -> Option<String> {
        (self.value.chars().count() > max)
            .then(|| format!("{} must have maximum {} characters long", self.label, max))
    }

    fn starts_with(&self, prefix: &str) -> Option<String> {
        (!self.value.starts_with(prefix))
            .then(|| format!("{} must starts with {}", self.label, prefix))
    }

    fn capitals(&self, count: usize) -> Option<String> {
        (self.value.chars().filter(char::is_ascii_uppercase).count() < count).then(|| {
            format!(
                "{} must contains at least {} capital characters",
                self.label, count
            )
        })
    }

    fn specials(&self, count: usize) -> Option<String> {
        (self.value.chars().filter(|c| is_special(*c)).count() < count).then(|| {
            format!(
                "{} must contains at least {} special characters",
                self.label, count
            )
        })
    }
}

/// Anything that is not an ASCII letter or digit, whitespace or `:`.
fn is_special(c: char) -> bool {
    !(c.is_ascii_alphanumeric() || c.is_whitespace() || c == ':')
}

fn phone(value: &str) -> Field<'_> {
    Field {
        key: "phone_number",
        label: "Phone number",
        value,
    }
}

fn full_name(value: &str) -> Field<'_> {
    Field {
        key: "full_name",
        label: "Full name",
        value,
    }
}

fn password(value: &str) -> Field<'_> {
    Field {
        key: "password",
        label: "Password",
        value,
    }
}

fn check_phone(errors: &mut ValidationErrors, field: Field<'_>) {
    let failure = field
        .min(PHONE_MIN)
        .or_else(|| field.max(PHONE_MAX))
        .or_else(|| field.starts_with(PHONE_PREFIX));
    if let Some(message) = failure {
        errors.add(field.key, message);
    }
}

fn check_full_name(errors: &mut ValidationErrors, field: Field<'_>) {
    let failure = field.min(FULL_NAME_MIN).or_else(|| field.max(FULL_NAME_MAX));
    if let Some(message) = failure {
        errors.add(field.key, message);
    }
}

pub fn validate_login(form: &LoginRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for field in [phone(&form.phone_number), password(&form.password)] {
        if let Some(message) = field.required() {
            errors.add(field.key, message);
        }
    }

    errors
}

pub fn validate_register(form: &RegisterRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let field = phone(&form.phone_number);
    match field.required() {
        Some(message) => errors.add(field.key, message),
        None => check_phone(&mut errors, field),
    }

    let field = full_name(&form.full_name);
    match field.required() {
        Some(message) => errors.add(field.key, message),
        None => check_full_name(&mut errors, field),
    }

    let field = password(&form.password);
    let failure = field
        .required()
        .or_else(|| field.min(PASSWORD_MIN))
        .or_else(|| field.max(PASSWORD_MAX))
        .or_else(|| field.capitals(1))
        .or_else(|| field.specials(1));
    if let Some(message) = failure {
        errors.add(field.key, message);
    }

    errors
}

/// Both fields are optional, but at least one has to be present.
pub fn validate_update(form: &UpdateUserRequest) -> ValidationErrors {
    if form.phone_number.is_empty() && form.full_name.is_empty() {
        return ValidationErrors::single(GENERAL_ERROR_KEY, "Phone number or Full Name is required");
    }

    let mut errors = ValidationErrors::new();
    if !form.phone_number.is_empty() {
        check_phone(&mut errors, phone(&form.phone_number));
    }
    if !form.full_name.is_empty() {
        check_full_name(&mut errors, full_name(&form.full_name));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn register(phone: &str, name: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            phone_number: phone.to_string(),
            full_name: name.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let errors = validate_register(&register("+628329328932", "Budi Santoso", "Asdasd123#"));
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_empty_registration_reports_every_field() {
        let errors = validate_register(&RegisterRequest::default());

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("phone_number"), Some("Phone number is required"));
        assert_eq!(errors.get("full_name"), Some("Full name is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[rstest]
    #[case("+62812", "Phone number must have minimum 10 characters long")]
    #[case("+6281234567890", "Phone number must have maximum 13 characters long")]
    #[case("0812345678", "Phone number must starts with +62")]
    #[case("+1812345678", "Phone number must starts with +62")]
    fn test_phone_rules(#[case] phone: &str, #[case] expected: &str) {
        let errors = validate_register(&register(phone, "Budi", "Asdasd123#"));
        assert_eq!(errors.get("phone_number"), Some(expected));
    }

    #[rstest]
    #[case("Bo", "Full name must have minimum 3 characters long")]
    #[case("xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx", "Full name must have maximum 60 characters long")]
    fn test_full_name_rules(#[case] name: &str, #[case] expected: &str) {
        let errors = validate_register(&register("+628329328932", name, "Asdasd123#"));
        assert_eq!(errors.get("full_name"), Some(expected));
    }

    #[rstest]
    #[case("Ab#1", "Password must have minimum 6 characters long")]
    #[case("A#aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "Password must have maximum 64 characters long")]
    #[case("asdasd123#", "Password must contains at least 1 capital characters")]
    #[case("Asdasd123", "Password must contains at least 1 special characters")]
    #[case("Asdasd 123:", "Password must contains at least 1 special characters")]
    fn test_password_rules(#[case] password: &str, #[case] expected: &str) {
        let errors = validate_register(&register("+628329328932", "Budi", password));
        assert_eq!(errors.get("password"), Some(expected));
    }

    #[test]
    fn test_lengths_count_characters() {
        // 3 characters, 6 bytes
        let errors = validate_register(&register("+628329328932", "ééé", "Asdasd123#"));
        assert!(errors.get("full_name").is_none());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = validate_login(&LoginRequest::default());
        assert_eq!(errors.get("phone_number"), Some("Phone number is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));

        let errors = validate_login(&LoginRequest {
            phone_number: "+628329328932".to_string(),
            password: "x".to_string(),
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn test_update_needs_one_field() {
        let errors = validate_update(&UpdateUserRequest::default());

        assert_eq!(
            errors.get(GENERAL_ERROR_KEY),
            Some("Phone number or Full Name is required")
        );
        assert_eq!(errors.len(), 1);
    }

    #[rstest]
    #[case("+628329328932", "", None, None)]
    #[case("", "New Name", None, None)]
    #[case("0812345678", "", Some("Phone number must starts with +62"), None)]
    #[case("", "Al", None, Some("Full name must have minimum 3 characters long"))]
    fn test_update_rules(
        #[case] phone: &str,
        #[case] name: &str,
        #[case] phone_error: Option<&str>,
        #[case] name_error: Option<&str>,
    ) {
        let errors = validate_update(&UpdateUserRequest {
            phone_number: phone.to_string(),
            full_name: name.to_string(),
        });

        assert_eq!(errors.get("phone_number"), phone_error);
        assert_eq!(errors.get("full_name"), name_error);
    }
}
