use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // admin username
    pub jti: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, session_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_expires_in,
        }
    }

    pub fn issue_session_token(&self, username: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.session_expires_in);

        let claims = SessionClaims {
            sub: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_session_token(&self, token: &str) -> AppResult<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)?.claims;

        if claims.role != ADMIN_ROLE {
            return Err(AppError::AuthError("Invalid session role".to_string()));
        }

        Ok(claims)
    }

    pub fn session_expires_in(&self) -> i64 {
        self.session_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_session() {
        let jwt = JwtService::new("secret", 3600);
        let token = jwt.issue_session_token("owner").unwrap();
        let claims = jwt.verify_session_token(&token).unwrap();
        assert_eq!(claims.sub, "owner");
        assert_eq!(claims.role, ADMIN_ROLE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = JwtService::new("secret", 3600)
            .issue_session_token("owner")
            .unwrap();
        let other = JwtService::new("another-secret", 3600);
        assert!(other.verify_session_token(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_session() {
        // 超出 jsonwebtoken 默认 60 秒 leeway
        let jwt = JwtService::new("secret", -120);
        let token = jwt.issue_session_token("owner").unwrap();
        assert!(jwt.verify_session_token(&token).is_err());
    }
}
