use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;

#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    admin_username: String,
    admin_password_hash: String,
}

impl AuthService {
    pub fn new(config: &AuthConfig, jwt_service: JwtService) -> Self {
        Self {
            jwt_service,
            admin_username: config.admin_username.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
        }
    }

    /// 校验管理员账号密码, 成功后签发会话令牌
    pub fn login(&self, request: LoginRequest) -> AppResult<(String, SessionResponse)> {
        let username = request.username.trim();

        // 用户名不匹配时也走一次 bcrypt, 避免通过响应时间区分
        let password_ok = verify_password(&request.password, &self.admin_password_hash);
        if username != self.admin_username || !password_ok {
            log::warn!("Failed admin login attempt for user '{username}'");
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.jwt_service.issue_session_token(username)?;
        log::info!("Admin '{username}' signed in");

        Ok((
            token,
            SessionResponse {
                username: username.to_string(),
                expires_in: self.jwt_service.session_expires_in(),
            },
        ))
    }

    pub fn verify_session(&self, token: &str) -> AppResult<AdminSession> {
        let claims = self.jwt_service.verify_session_token(token)?;
        if claims.sub != self.admin_username {
            return Err(AppError::AuthError("Session user no longer exists".to_string()));
        }
        Ok(AdminSession {
            username: claims.sub,
        })
    }

    pub fn session_expires_in(&self) -> i64 {
        self.jwt_service.session_expires_in()
    }
}
