//! Per-request bearer token handling.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::ApiError;

/// The logged-in operator's API credentials for the duration of one request.
///
/// A response may hand back a refreshed token; it replaces the current one
/// and is picked up by the auth middleware via [`ApiSession::take_refreshed`].
#[derive(Debug)]
pub struct ApiSession {
    token: Mutex<SecretString>,
    refreshed: Mutex<bool>,
    rejected: Mutex<bool>,
}

impl ApiSession {
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self {
            token: Mutex::new(token),
            refreshed: Mutex::new(false),
            rejected: Mutex::new(false),
        }
    }

    /// The `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TokenExpired` if the token has expired or cannot be
    /// decoded. Nothing is sent in that case.
    pub fn bearer(&self) -> Result<String, ApiError> {
        let token = self.token.lock();
        let raw = token.expose_secret();
        if is_expired(raw, Utc::now()) {
            return Err(ApiError::TokenExpired);
        }
        Ok(format!("Bearer {raw}"))
    }

    /// Whether the current token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        is_expired(self.token.lock().expose_secret(), Utc::now())
    }

    /// Replace the token with one issued by the API.
    pub fn replace_token(&self, token: SecretString) {
        *self.token.lock() = token;
        *self.refreshed.lock() = true;
    }

    /// Record that the API refused the token.
    pub fn mark_rejected(&self) {
        *self.rejected.lock() = true;
    }

    /// Whether the operator has to log in again: the API refused the token
    /// or it has expired.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        *self.rejected.lock() || self.is_expired()
    }

    /// The refreshed token, if the API issued one since the last call.
    pub fn take_refreshed(&self) -> Option<SecretString> {
        let mut refreshed = self.refreshed.lock();
        if *refreshed {
            *refreshed = false;
            Some(self.token.lock().clone())
        } else {
            None
        }
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry time encoded in a JWT's payload, if any.
#[must_use]
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    token_expiry(token).is_none_or(|exp| exp <= now)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Unsigned JWT with the given `exp` claim.
    pub(crate) fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"admin-1","exp":{exp}}}"#));
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn test_valid_token_produces_bearer() {
        let token = jwt_with_exp(Utc::now().timestamp() + 3600);
        let session = ApiSession::new(SecretString::from(token.clone()));
        assert_eq!(session.bearer().unwrap(), format!("Bearer {token}"));
    }

    #[test]
    fn test_expired_token_is_refused() {
        let session = ApiSession::new(SecretString::from(jwt_with_exp(1_000)));
        assert!(session.is_expired());
        assert!(session.requires_login());
        assert!(matches!(session.bearer(), Err(ApiError::TokenExpired)));
    }

    #[test]
    fn test_rejected_token_requires_login() {
        let session = ApiSession::new(SecretString::from(jwt_with_exp(Utc::now().timestamp() + 60)));
        assert!(!session.requires_login());
        session.mark_rejected();
        assert!(session.requires_login());
    }

    #[test]
    fn test_garbage_token_is_treated_as_expired() {
        let session = ApiSession::new(SecretString::from("not-a-jwt"));
        assert!(matches!(session.bearer(), Err(ApiError::TokenExpired)));
    }

    #[test]
    fn test_token_expiry_decodes_claim() {
        let expiry = token_expiry(&jwt_with_exp(1_700_000_000)).unwrap();
        assert_eq!(expiry.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_refreshed_token_is_taken_once() {
        let session = ApiSession::new(SecretString::from(jwt_with_exp(i64::from(i32::MAX))));
        assert!(session.take_refreshed().is_none());

        let fresh = jwt_with_exp(i64::from(i32::MAX) + 1);
        session.replace_token(SecretString::from(fresh.clone()));
        assert_eq!(session.take_refreshed().unwrap().expose_secret(), fresh);
        assert!(session.take_refreshed().is_none());
    }
}
