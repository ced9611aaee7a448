use super::*;

#[test]
fn accepts_ordinary_addresses() {
    assert!(is_valid_email("demo@example.com"));
    assert!(is_valid_email("  first.last+tag@mail.example.org  "));
}

#[test]
fn rejects_malformed_addresses() {
    for email in ["", "demo", "demo@", "@example.com", "demo@example", "de mo@example.com", "a@b@c.com"] {
        assert!(!is_valid_email(email), "accepted {email:?}");
    }
}

#[test]
fn password_length_ignores_surrounding_whitespace() {
    assert!(is_valid_password("demo123456"));
    assert!(is_valid_password("123456"));
    assert!(!is_valid_password("12345"));
    assert!(!is_valid_password("  12345   "));
}

#[test]
fn title_must_have_visible_characters() {
    assert!(is_valid_title("Todo"));
    assert!(!is_valid_title(""));
    assert!(!is_valid_title(" \t\n"));
}

#[test]
fn credentials_report_every_failing_field() {
    let errors = validate_credentials("nope", "123").expect_err("invalid");
    assert!(errors.email);
    assert!(errors.password);
    assert_eq!(
        errors.to_string(),
        "Please enter a valid email address. Password must be at least 6 characters."
    );

    let errors = validate_credentials("demo@example.com", "123").expect_err("invalid");
    assert_eq!(errors.email_message(), None);
    assert_eq!(errors.password_message(), Some(SHORT_PASSWORD_MESSAGE));
}

#[test]
fn credentials_trim_email_but_keep_password() {
    let creds = validate_credentials(" demo@example.com ", " demo123456 ").expect("valid");
    assert_eq!(creds.email, "demo@example.com");
    assert_eq!(creds.password, " demo123456 ");
}
