//! Identity resolution
//!
//! An [`IdentityVerifier`] turns a bearer credential into a verified subject.
//! Every failure, whatever its cause, is reported as `Unauthenticated`.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Identity asserted by a verified credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Stable subject identifier
    pub subject: String,
    /// Email claim, empty when the provider omits it
    pub email: String,
}

/// Verifies bearer credentials
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a credential and return the identity it asserts
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity>;
}

/// Extract the credential from an `Authorization` header value
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Signing algorithms accepted for identity tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256, shared secret
    HS256,
    /// RSA with SHA-256, provider public key
    RS256,
}

impl Default for JwtAlgorithm {
    fn default() -> Self {
        Self::HS256
    }
}

/// Settings for [`JwtVerifier`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwtSettings {
    /// Signing algorithm
    #[serde(default)]
    pub algorithm: JwtAlgorithm,
    /// Shared secret (HS256)
    #[serde(default)]
    pub secret: Option<String>,
    /// PEM-encoded public key (RS256)
    #[serde(default)]
    pub public_key_pem: Option<String>,
    /// Required `iss` claim
    #[serde(default)]
    pub issuer: Option<String>,
    /// Required `aud` claim
    #[serde(default)]
    pub audience: Option<String>,
    /// Clock skew tolerance in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

fn default_leeway() -> u64 {
    60
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies signed JWTs issued by an external identity provider
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Build a verifier from settings
    ///
    /// Fails when the key material required by the algorithm is missing or
    /// cannot be parsed.
    pub fn from_settings(settings: &JwtSettings) -> Result<Self> {
        let (key, algorithm) = match settings.algorithm {
            JwtAlgorithm::HS256 => {
                let secret = settings
                    .secret
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| Error::internal("auth.secret is required for HS256"))?;
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
            JwtAlgorithm::RS256 => {
                let pem = settings
                    .public_key_pem
                    .as_deref()
                    .ok_or_else(|| Error::internal("auth.public_key_pem is required for RS256"))?;
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| Error::internal(format!("invalid RS256 public key: {e}")))?;
                (key, Algorithm::RS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = settings.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match &settings.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "identity token rejected");
            Error::unauthenticated("Invalid or expired token")
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(Error::unauthenticated("Invalid or expired token"));
        }

        Ok(VerifiedIdentity {
            subject: data.claims.sub,
            email: data.claims.email.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: Some(SECRET.to_string()),
            issuer: Some("https://issuer.example".to_string()),
            leeway_secs: 0,
            ..Default::default()
        }
    }

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_valid_token() {
        let verifier = JwtVerifier::from_settings(&settings()).unwrap();
        let jwt = token(
            json!({
                "sub": "u-1",
                "email": "ada@example.com",
                "iss": "https://issuer.example",
                "exp": future_exp()
            }),
            SECRET,
        );
        let identity = tokio_test::block_on(verifier.verify(&jwt)).unwrap();
        assert_eq!(identity.subject, "u-1");
        assert_eq!(identity.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_wrong_secret_is_unauthenticated() {
        let verifier = JwtVerifier::from_settings(&settings()).unwrap();
        let jwt = token(
            json!({"sub": "u-1", "iss": "https://issuer.example", "exp": future_exp()}),
            "other-secret",
        );
        let err = verifier.verify(&jwt).await.unwrap_err();
        assert_eq!(err.code(), "unauthenticated");
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthenticated() {
        let verifier = JwtVerifier::from_settings(&settings()).unwrap();
        let jwt = token(
            json!({
                "sub": "u-1",
                "iss": "https://issuer.example",
                "exp": chrono::Utc::now().timestamp() - 600
            }),
            SECRET,
        );
        assert!(verifier.verify(&jwt).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_issuer_is_unauthenticated() {
        let verifier = JwtVerifier::from_settings(&settings()).unwrap();
        let jwt = token(
            json!({"sub": "u-1", "iss": "https://elsewhere", "exp": future_exp()}),
            SECRET,
        );
        assert!(verifier.verify(&jwt).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_is_unauthenticated() {
        let verifier = JwtVerifier::from_settings(&settings()).unwrap();
        assert!(verifier.verify("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_email_defaults_to_empty() {
        let verifier = JwtVerifier::from_settings(&settings()).unwrap();
        let jwt = token(
            json!({"sub": "u-2", "iss": "https://issuer.example", "exp": future_exp()}),
            SECRET,
        );
        let identity = verifier.verify(&jwt).await.unwrap();
        assert_eq!(identity.email, "");
    }

    #[test]
    fn test_missing_secret_is_a_setup_error() {
        let result = JwtVerifier::from_settings(&JwtSettings::default());
        assert!(result.is_err());
    }
}
