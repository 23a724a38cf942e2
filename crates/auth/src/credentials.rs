//! HTTP Basic credential decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Why a request could not be authenticated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable credential was presented (absent or malformed header).
    #[error("auth header not found")]
    Missing,

    /// A credential was presented but the user is unknown or the secret is wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The user lookup collaborator failed; not a client error.
    #[error("user lookup failed: {0}")]
    Lookup(String),

    /// The secret could not be checked (hashing task failed).
    #[error("credential check failed: {0}")]
    Verification(String),
}

/// Decoded `email:secret` pair from a Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub email: String,
    pub secret: String,
}

impl core::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl BasicCredentials {
    pub fn new(email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            secret: secret.into(),
        }
    }

    /// Parse the raw header value (`Basic <base64(email:secret)>`).
    ///
    /// The scheme is matched case-insensitively. The secret is everything
    /// after the first `:` and may itself contain colons.
    pub fn parse(header: Option<&str>) -> Result<Self, AuthError> {
        let header = header.ok_or(AuthError::Missing)?.trim();

        let (scheme, encoded) = header.split_once(' ').ok_or(AuthError::Missing)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::Missing);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::Missing)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Missing)?;

        let (email, secret) = decoded.split_once(':').ok_or(AuthError::Missing)?;
        if email.is_empty() {
            return Err(AuthError::Missing);
        }

        Ok(Self::new(email, secret))
    }

    /// Encode as a header value; the inverse of [`BasicCredentials::parse`].
    pub fn to_header_value(&self) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", self.email, self.secret))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_a_well_formed_header() {
        // "joe@smith.com:joepassword"
        let creds =
            BasicCredentials::parse(Some("Basic am9lQHNtaXRoLmNvbTpqb2VwYXNzd29yZA==")).unwrap();
        assert_eq!(creds.email, "joe@smith.com");
        assert_eq!(creds.secret, "joepassword");
    }

    #[test]
    fn missing_header_is_missing() {
        assert_eq!(BasicCredentials::parse(None), Err(AuthError::Missing));
    }

    #[test]
    fn malformed_headers_are_missing() {
        let no_colon = format!("Basic {}", STANDARD.encode("nocolon"));
        let empty_email = format!("Basic {}", STANDARD.encode(":secret"));
        let not_utf8 = format!("Basic {}", STANDARD.encode([0xff, 0xfe, b':', b'a']));
        for header in [
            "",
            "Basic",
            "Bearer abc.def",
            "Basic !!!not-base64!!!",
            no_colon.as_str(),
            empty_email.as_str(),
            not_utf8.as_str(),
        ] {
            assert_eq!(
                BasicCredentials::parse(Some(header)),
                Err(AuthError::Missing),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn scheme_is_case_insensitive_and_secret_keeps_colons() {
        let header = format!("basic {}", STANDARD.encode("a@b.com:pa:ss"));
        let creds = BasicCredentials::parse(Some(&header)).unwrap();
        assert_eq!(creds.secret, "pa:ss");
    }

    #[test]
    fn debug_hides_the_secret() {
        let creds = BasicCredentials::new("a@b.com", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    proptest! {
        #[test]
        fn header_value_parses_back(
            email in "[a-z0-9.]{1,20}@[a-z]{1,10}\\.[a-z]{2,3}",
            secret in "[ -~]{0,40}",
        ) {
            let creds = BasicCredentials::new(email, secret);
            let parsed = BasicCredentials::parse(Some(&creds.to_header_value())).unwrap();
            prop_assert_eq!(parsed, creds);
        }
    }
}
