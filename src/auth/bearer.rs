//! Constant bearer token check.
//!
//! This compares the presented token with one configured string. It is a placeholder,
//! not an authentication protocol.

use super::error::BearerError;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Validates an `Authorization` header value against the expected token.
pub fn check_bearer(header: Option<&str>, expected: &str) -> Result<(), BearerError> {
    let token = header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(BearerError::MissingOrMalformed)?;

    if token == expected {
        Ok(())
    } else {
        Err(BearerError::InvalidToken)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_matching_token() {
        assert_eq!(check_bearer(Some("Bearer abc"), "abc"), Ok(()));
    }

    #[test]
    fn rejects_missing_or_malformed() {
        assert_eq!(check_bearer(None, "abc"), Err(BearerError::MissingOrMalformed));
        assert_eq!(check_bearer(Some("Basic abc"), "abc"), Err(BearerError::MissingOrMalformed));
        assert_eq!(check_bearer(Some("bearer abc"), "abc"), Err(BearerError::MissingOrMalformed));
    }

    #[test]
    fn rejects_wrong_token() {
        assert_eq!(check_bearer(Some("Bearer abd"), "abc"), Err(BearerError::InvalidToken));
        assert_eq!(check_bearer(Some("Bearer "), "abc"), Err(BearerError::InvalidToken));
    }
}
