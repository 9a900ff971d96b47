//! Admin bearer tokens (HS256)
//!
//! Tokens carry the admin id, username and role, are scoped to the admin API
//! through the `aud` claim and expire after `JwtConfig::expiration_hours`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";
const ISSUER: &str = "parkspace";
const AUDIENCE: &str = "parkspace-admin";

#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing key
    pub secret: String,
    pub expiration_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expiration_hours: 24,
        }
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }

    /// Token lifetime as reported to clients on login.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiration_hours.max(0) * 3600
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.leeway = 0;
        validation
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Admin user id
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    fn issue(user_id: &str, username: &str, role: &str, lifetime: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

pub fn create_token(
    user_id: &str,
    username: &str,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::issue(
        user_id,
        username,
        role,
        Duration::hours(config.expiration_hours),
    );
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, issuer, audience and expiry.
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let config = JwtConfig::new("test-secret", 1);
        let token = create_token("id-1", "root", ADMIN_ROLE, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "id-1");
        assert_eq!(claims.aud, AUDIENCE);
        assert!(claims.is_admin());
        assert_eq!(config.expires_in_secs(), 3600);
    }

    #[test]
    fn foreign_key_is_rejected() {
        let token = create_token("id-1", "root", ADMIN_ROLE, &JwtConfig::new("a", 1)).unwrap();
        assert!(verify_token(&token, &JwtConfig::new("b", 1)).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig::new("test-secret", -1);
        let token = create_token("id-1", "root", ADMIN_ROLE, &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn token_for_another_audience_is_rejected() {
        let config = JwtConfig::new("test-secret", 1);
        let mut claims = TokenClaims::issue("id-1", "root", ADMIN_ROLE, Duration::hours(1));
        claims.aud = "checkout".to_string();
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
