//! Local credential checks run before the identity provider is called.

use crate::CredentialError;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Rejects obviously malformed addresses: exactly one `@`, something on
/// both sides, and a dot in the domain. The provider has the final word.
pub fn check_email(email: &str) -> Result<(), CredentialError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(CredentialError::InvalidEmail);
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || domain.contains('@') || !domain_ok || email.contains(char::is_whitespace) {
        return Err(CredentialError::InvalidEmail);
    }
    Ok(())
}

/// The registration policy: at least six characters, with an uppercase
/// and a lowercase letter.
pub fn check_password(password: &str) -> Result<(), CredentialError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::WeakPassword("must be at least 6 characters"));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(CredentialError::WeakPassword("must contain an uppercase letter"));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(CredentialError::WeakPassword("must contain a lowercase letter"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_email_accepts_plain_address() {
        assert_eq!(check_email("alice@example.com"), Ok(()));
    }

    #[test]
    fn test_check_email_rejects_malformed() {
        for bad in ["", "alice", "@example.com", "alice@", "alice@com", "a@b@c.com", "a b@c.com"] {
            assert_eq!(check_email(bad), Err(CredentialError::InvalidEmail), "{bad:?}");
        }
    }

    #[test]
    fn test_check_password_enforces_each_rule() {
        assert!(matches!(check_password("Ab1"), Err(CredentialError::WeakPassword(_))));
        assert!(matches!(check_password("abcdef"), Err(CredentialError::WeakPassword(_))));
        assert!(matches!(check_password("ABCDEF"), Err(CredentialError::WeakPassword(_))));
        assert_eq!(check_password("Abcdef"), Ok(()));
    }
}
