//! Email address format check.

use invotech_core::DomainError;

/// Accepts `local@domain.tld`: exactly one `@`, no whitespace anywhere, a
/// non-empty local part, and a domain with a dot that has text on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "invalid email address: {email:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_standard_addresses() {
        for email in [
            "billing@techcorp.com",
            "finance@cloudfirst.io",
            "a.b+tag@sub.example.co.uk",
            "x@y.z",
        ] {
            assert!(is_valid_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "not-an-email",
            "@example.com",
            "user@",
            "user@example",
            "user@.com",
            "user@example.",
            "us er@example.com",
            "user@exa mple.com",
            "a@b@example.com",
            "",
        ] {
            assert!(!is_valid_email(email), "{email:?} should be invalid");
        }
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = validate_email("nope").unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn simple_addresses_are_accepted(
            local in "[a-z0-9._+-]{1,12}",
            domain in "[a-z0-9-]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{local}@{domain}.{tld}");
            prop_assert!(is_valid_email(&email));
        }

        #[test]
        fn whitespace_is_never_accepted(
            head in "[a-z]{1,8}",
            gap in "[ \t\n]{1,3}",
            tail in "[a-z]{1,8}",
        ) {
            let email = format!("{head}{gap}{tail}@example.com");
            prop_assert!(!is_valid_email(&email));
        }
    }
}
