//! Account registration model and its field rules.
//!
//! Rules run in declaration order (first name, last name, email, password) and
//! every failing rule is reported, so clients can fix all fields at once.

use coursehub_core::rules::required_text;
use coursehub_core::{DomainError, DomainResult, Violation};

use std::sync::Arc;

use crate::{hash_blocking, HashError, PasswordHash, SecretHasher};

/// Password as received at registration, hashed before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordInput {
    /// No `password` field was sent.
    Missing,
    /// The field was sent but empty or whitespace only.
    Blank,
    /// A non-empty password, already hashed.
    Hashed(PasswordHash),
}

impl PasswordInput {
    /// Hash a plaintext password field, keeping track of absent/blank input.
    /// Only a usable password is hashed, on the blocking pool.
    pub async fn from_plain(
        plain: Option<String>,
        hasher: &Arc<dyn SecretHasher>,
    ) -> Result<Self, HashError> {
        match plain {
            None => Ok(Self::Missing),
            Some(p) if p.trim().is_empty() => Ok(Self::Blank),
            Some(p) => Ok(Self::Hashed(hash_blocking(hasher.clone(), p).await?)),
        }
    }
}

/// Unvalidated account data, as submitted to `POST /api/users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password: PasswordInput,
}

/// Account data that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: PasswordHash,
}

impl AccountDraft {
    /// Apply the field rules, yielding a storable account or every violation found.
    pub fn validate(self) -> DomainResult<NewAccount> {
        let mut violations = Vec::new();

        let first_name = required_text(
            &mut violations,
            "firstName",
            self.first_name,
            "A first name is required",
            "Please provide a first name",
        );
        let last_name = required_text(
            &mut violations,
            "lastName",
            self.last_name,
            "A last name is required",
            "Please provide a last name",
        );
        let email_address = required_text(
            &mut violations,
            "emailAddress",
            self.email_address.map(|e| e.trim().to_string()),
            "An email address is required",
            "Please provide an email address",
        );
        if let Some(email) = &email_address {
            if !is_valid_email(email) {
                violations.push(Violation::new(
                    "emailAddress",
                    "Please provide a valid email address",
                ));
            }
        }
        let password_hash = match self.password {
            PasswordInput::Missing => {
                violations.push(Violation::new("password", "A password is required"));
                None
            }
            PasswordInput::Blank => {
                violations.push(Violation::new("password", "Please provide a password"));
                None
            }
            PasswordInput::Hashed(hash) => Some(hash),
        };

        match (first_name, last_name, email_address, password_hash) {
            (Some(first_name), Some(last_name), Some(email_address), Some(password_hash))
                if violations.is_empty() =>
            {
                Ok(NewAccount {
                    first_name,
                    last_name,
                    email_address,
                    password_hash,
                })
            }
            _ => Err(DomainError::Validation(violations)),
        }
    }
}

/// Pragmatic address check: one `@`, a non-empty local part, a dotted domain,
/// no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashed() -> PasswordInput {
        PasswordInput::Hashed(PasswordHash::from_encoded("$2b$04$stored"))
    }

    fn draft() -> AccountDraft {
        AccountDraft {
            first_name: Some("Joe".to_string()),
            last_name: Some("Smith".to_string()),
            email_address: Some("joe@smith.com".to_string()),
            password: hashed(),
        }
    }

    fn messages(err: DomainError) -> Vec<String> {
        let DomainError::Validation(v) = err else {
            panic!("expected validation error, got {err:?}");
        };
        v.into_iter().map(|v| v.message).collect()
    }

    #[test]
    fn valid_draft_becomes_account() {
        let account = draft().validate().unwrap();
        assert_eq!(account.first_name, "Joe");
        assert_eq!(account.email_address, "joe@smith.com");
    }

    #[test]
    fn email_is_trimmed() {
        let mut d = draft();
        d.email_address = Some("  joe@smith.com ".to_string());
        assert_eq!(d.validate().unwrap().email_address, "joe@smith.com");
    }

    #[test]
    fn empty_body_reports_every_field_in_order() {
        let d = AccountDraft {
            first_name: None,
            last_name: None,
            email_address: None,
            password: PasswordInput::Missing,
        };
        assert_eq!(
            messages(d.validate().unwrap_err()),
            vec![
                "A first name is required",
                "A last name is required",
                "An email address is required",
                "A password is required",
            ]
        );
    }

    #[test]
    fn blank_values_use_the_empty_message() {
        let d = AccountDraft {
            first_name: Some("  ".to_string()),
            last_name: Some(String::new()),
            email_address: Some(String::new()),
            password: PasswordInput::Blank,
        };
        assert_eq!(
            messages(d.validate().unwrap_err()),
            vec![
                "Please provide a first name",
                "Please provide a last name",
                "Please provide an email address",
                "Please provide a password",
            ]
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in ["joe", "joe@", "@smith.com", "joe@smith", "joe@@smith.com", "jo e@smith.com"] {
            let mut d = draft();
            d.email_address = Some(bad.to_string());
            assert_eq!(
                messages(d.validate().unwrap_err()),
                vec!["Please provide a valid email address"],
                "{bad}"
            );
        }
    }

    async fn classify(plain: Option<&str>) -> PasswordInput {
        let hasher: Arc<dyn SecretHasher> = Arc::new(crate::BcryptHasher::fastest());
        PasswordInput::from_plain(plain.map(str::to_string), &hasher)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn password_input_tracks_absent_and_empty() {
        assert_eq!(classify(None).await, PasswordInput::Missing);
        assert_eq!(classify(Some("")).await, PasswordInput::Blank);
        assert!(matches!(classify(Some("pw")).await, PasswordInput::Hashed(_)));
    }

    #[tokio::test]
    async fn whitespace_only_password_is_blank() {
        for plain in [" ", "   ", "\t\n"] {
            assert_eq!(classify(Some(plain)).await, PasswordInput::Blank, "{plain:?}");
        }
        let draft = AccountDraft {
            password: classify(Some("  ")).await,
            ..draft()
        };
        assert_eq!(messages(draft.validate().unwrap_err()), vec!["Please provide a password"]);
    }

    #[tokio::test]
    async fn padded_password_is_hashed_as_sent() {
        let hasher = crate::BcryptHasher::fastest();
        let PasswordInput::Hashed(hash) = classify(Some(" pw ")).await else {
            panic!("expected a hash");
        };
        assert!(crate::SecretVerifier::verify(&hasher, " pw ", &hash));
        assert!(!crate::SecretVerifier::verify(&hasher, "pw", &hash));
    }
}
