//! JWT access and refresh tokens.

use chrono::{Duration, Utc};
use engine::{User, UserRole};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ServerError;

/// Token settings read from the `auth` configuration section.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: i64,
}

fn default_access_ttl() -> i64 {
    60
}

fn default_refresh_ttl() -> i64 {
    24 * 30
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub token_type: TokenType,
}

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies tokens with a shared HS256 secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::hours(config.refresh_ttl_hours),
        }
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, ServerError> {
        Ok(TokenPair {
            access_token: self.issue(user.id, user.role, TokenType::Access)?,
            refresh_token: self.issue(user.id, user.role, TokenType::Refresh)?,
        })
    }

    pub fn issue_access(&self, user: &User) -> Result<String, ServerError> {
        self.issue(user.id, user.role, TokenType::Access)
    }

    fn issue(
        &self,
        user_id: Uuid,
        role: UserRole,
        token_type: TokenType,
    ) -> Result<String, ServerError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|err| {
            tracing::error!("failed to encode token: {err}");
            ServerError::Internal
        })
    }

    /// Verifies signature, expiry and token type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, ServerError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            ServerError::Unauthorized(match err.kind() {
                ErrorKind::ExpiredSignature => "token has expired".to_string(),
                _ => "invalid token".to_string(),
            })
        })?;

        if data.claims.token_type != expected {
            return Err(ServerError::Unauthorized("invalid token type".to_string()));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(access_ttl_minutes: i64) -> JwtKeys {
        JwtKeys::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_ttl_minutes,
            refresh_ttl_hours: 1,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "staff@test.com".to_string(),
            full_name: "Staff".to_string(),
            phone: None,
            role: UserRole::Staff,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_carries_user_and_role() {
        let keys = keys(15);
        let user = user();
        let pair = keys.issue_pair(&user).unwrap();

        let claims = keys.verify(&pair.access_token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::Staff);
        assert!(claims.exp > claims.iat);

        let refresh = keys.verify(&pair.refresh_token, TokenType::Refresh).unwrap();
        assert_ne!(refresh.jti, claims.jti);
    }

    #[test]
    fn token_type_is_enforced() {
        let keys = keys(15);
        let pair = keys.issue_pair(&user()).unwrap();
        assert!(keys.verify(&pair.refresh_token, TokenType::Access).is_err());
        assert!(keys.verify(&pair.access_token, TokenType::Refresh).is_err());
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let expired = keys(-10).issue_access(&user()).unwrap();
        assert!(keys(15).verify(&expired, TokenType::Access).is_err());

        let other = JwtKeys::new(&AuthConfig {
            jwt_secret: "another-secret".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_hours: 1,
        });
        let foreign = other.issue_access(&user()).unwrap();
        assert!(keys(15).verify(&foreign, TokenType::Access).is_err());
    }
}
