use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::TokenKind;

pub const ACCESS_TOKEN_MINUTES: i64 = 30;
pub const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub exp: usize, // Expiration timestamp
    pub jti: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        TokenIssuer {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn lifetime(kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::minutes(ACCESS_TOKEN_MINUTES),
            TokenKind::Refresh => Duration::days(REFRESH_TOKEN_DAYS),
        }
    }

    pub fn generate_token(&self, user_id: i32, kind: TokenKind, lifetime: Duration) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::InternalServerError("Invalid timestamp".to_string()))?
            .timestamp()
            .max(0) as usize;

        let claims = Claims {
            user_id,
            kind,
            exp: expiration,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            log::error!("Token generation error: {:?}", err);
            AppError::InternalServerError("Token generation error".to_string())
        })
    }

    pub fn validate_token(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?.claims;
        if claims.kind != expected {
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }
        Ok(claims)
    }
}

/// Lowercase hex SHA-256 of a token, the only form tokens are stored in.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates_with_same_secret() {
        let issuer = TokenIssuer::new("secret");
        let token = issuer
            .generate_token(5, TokenKind::Access, TokenIssuer::lifetime(TokenKind::Access))
            .unwrap();
        let claims = issuer.validate_token(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id, 5);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn token_kind_is_enforced() {
        let issuer = TokenIssuer::new("secret");
        let refresh = issuer
            .generate_token(5, TokenKind::Refresh, TokenIssuer::lifetime(TokenKind::Refresh))
            .unwrap();
        assert!(issuer.validate_token(&refresh, TokenKind::Access).is_err());
    }

    #[test]
    fn foreign_secret_and_expired_tokens_fail() {
        let issuer = TokenIssuer::new("secret");
        let other = TokenIssuer::new("other");
        let token = other.generate_token(1, TokenKind::Access, Duration::minutes(5)).unwrap();
        assert!(issuer.validate_token(&token, TokenKind::Access).is_err());

        let expired = issuer.generate_token(1, TokenKind::Access, Duration::hours(-2)).unwrap();
        match issuer.validate_token(&expired, TokenKind::Access) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("unexpected result: {:?}", other.map(|c| c.user_id)),
        }
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let issuer = TokenIssuer::new("secret");
        let a = issuer.generate_token(1, TokenKind::Access, Duration::minutes(5)).unwrap();
        let b = issuer.generate_token(1, TokenKind::Access, Duration::minutes(5)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            token_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
