//! Credentials: admin JWTs, password hashing and shared-secret checks

pub mod jwt;
pub mod password;

pub use jwt::{create_token, verify_token, JwtConfig, TokenClaims};
pub use password::{hash_password, secrets_match, verify_password};
