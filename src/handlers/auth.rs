use crate::config::AuthConfig;
use crate::middlewares::extract_session_token;
use crate::models::*;
use crate::services::AuthService;
use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn session_cookie<'c>(config: &AuthConfig, value: String, max_age: Duration) -> Cookie<'c> {
    Cookie::build(config.cookie_name.clone(), value)
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
}

#[utoipa::path(
    post,
    path = "/auth",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功, 会话写入 Cookie", body = SessionResponse),
        (status = 401, description = "用户名或密码错误")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    auth_config: web::Data<AuthConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()) {
        Ok((token, session)) => {
            let cookie = session_cookie(
                &auth_config,
                token,
                Duration::seconds(auth_service.session_expires_in()),
            );
            Ok(HttpResponse::Ok().cookie(cookie).json(json!({
                "success": true,
                "data": session
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/auth",
    tag = "auth",
    responses(
        (status = 200, description = "已退出, 会话 Cookie 已清除")
    )
)]
pub async fn logout(auth_config: web::Data<AuthConfig>) -> Result<HttpResponse> {
    let mut cookie = session_cookie(&auth_config, String::new(), Duration::ZERO);
    cookie.make_removal();
    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Signed out"
    })))
}

#[utoipa::path(
    get,
    path = "/auth",
    tag = "auth",
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "当前会话", body = SessionResponse),
        (status = 401, description = "未登录或会话已过期")
    )
)]
pub async fn current_session(
    auth_service: web::Data<AuthService>,
    auth_config: web::Data<AuthConfig>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(token) = extract_session_token(&req, &auth_config.cookie_name) else {
        return Ok(crate::error::AppError::AuthError("Not signed in".to_string()).error_response());
    };
    match auth_service.verify_session(&token) {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": SessionResponse {
                username: session.username,
                expires_in: auth_service.session_expires_in(),
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/auth")
            .route(web::post().to(login))
            .route(web::delete().to(logout))
            .route(web::get().to(current_session)),
    );
}
