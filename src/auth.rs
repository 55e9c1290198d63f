use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, store::Store};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 access tokens with the server secret.
pub struct Credentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Credentials {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Sign `{email}` for the configured validity window.
    pub fn sign(&self, email: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token signing error: {e}")))
    }

    /// Bad signature, malformed token and expiry all map to the same rejection.
    /// Expiry is checked here only; tokens are never extended.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "access token rejected");
                ApiError::invalid_credentials()
            })
    }

    /// Issue a token only for a known identity. `Ok(None)` means no such user.
    pub async fn issue(&self, store: &dyn Store, email: &str) -> Result<Option<String>, ApiError> {
        match store.find_user_by_email(email).await? {
            Some(_) => self.sign(email).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::NewUser, store::MemoryStore};

    const SECRET: &str = "test-secret";

    #[test]
    fn test_sign_then_verify_returns_email() {
        let creds = Credentials::new(SECRET, Duration::hours(1));
        let token = creds.sign("patient@example.com").unwrap();
        let claims = creds.verify(&token).unwrap();
        assert_eq!(claims.email, "patient@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let creds = Credentials::new(SECRET, Duration::minutes(-5));
        let token = creds.sign("patient@example.com").unwrap();
        assert!(matches!(
            creds.verify(&token),
            Err(ApiError::Unauthorized("INVALID_TOKEN", _))
        ));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let ours = Credentials::new(SECRET, Duration::hours(1));
        let theirs = Credentials::new("another-secret", Duration::hours(1));
        let token = theirs.sign("patient@example.com").unwrap();
        assert!(ours.verify(&token).is_err());
        assert!(ours.verify("not-a-token").is_err());
    }

    #[tokio::test]
    async fn test_issue_requires_known_user() {
        let store = MemoryStore::default();
        let creds = Credentials::new(SECRET, Duration::hours(1));

        assert!(creds.issue(&store, "ghost@example.com").await.unwrap().is_none());

        store
            .insert_user(NewUser {
                email: "patient@example.com".into(),
                name: None,
            })
            .await
            .unwrap();
        let token = creds
            .issue(&store, "patient@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.verify(&token).unwrap().email, "patient@example.com");
    }
}
