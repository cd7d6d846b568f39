use crate::error::AppError;
use crate::services::AuthService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

enum PathMatch {
    Exact(&'static str),
    Prefix(&'static str),
}

/// 公开路由; method 为 None 表示任意方法
struct PublicRoute {
    method: Option<Method>,
    path: PathMatch,
}

impl PublicRoute {
    fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(m) = &self.method {
            if m != method {
                return false;
            }
        }
        match self.path {
            PathMatch::Exact(p) => path == p,
            PathMatch::Prefix(p) => path.starts_with(p),
        }
    }
}

fn route(method: Option<Method>, path: PathMatch) -> PublicRoute {
    PublicRoute { method, path }
}

// 公开路径配置
struct PublicRoutes {
    routes: Vec<PublicRoute>,
}

impl PublicRoutes {
    fn new() -> Self {
        use PathMatch::*;
        Self {
            routes: vec![
                // 文档
                route(None, Exact("/swagger-ui")),
                route(None, Prefix("/swagger-ui/")),
                route(None, Prefix("/api-docs/")),
                // 登录 / 退出 / 会话查询
                route(None, Exact("/api/v1/auth")),
                // 前台预约流程
                route(Some(Method::POST), Exact("/api/v1/bookings")),
                route(Some(Method::POST), Exact("/api/v1/bookings/quote")),
                route(Some(Method::GET), Prefix("/api/v1/bookings/by-code/")),
                route(Some(Method::POST), Prefix("/api/v1/bookings/by-code/")),
                route(Some(Method::GET), Exact("/api/v1/services")),
                route(Some(Method::GET), Prefix("/api/v1/services/")),
                route(Some(Method::GET), Exact("/api/v1/branches")),
                route(Some(Method::GET), Prefix("/api/v1/branches/")),
                route(Some(Method::GET), Exact("/api/v1/customers/points")),
            ],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        self.routes.iter().any(|r| r.matches(method, path))
    }
}

pub struct AuthMiddleware {
    auth_service: AuthService,
    cookie_name: String,
}

impl AuthMiddleware {
    pub fn new(auth_service: AuthService, cookie_name: impl Into<String>) -> Self {
        Self {
            auth_service,
            cookie_name: cookie_name.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            auth_service: self.auth_service.clone(),
            cookie_name: self.cookie_name.clone(),
            public_routes: PublicRoutes::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    auth_service: AuthService,
    cookie_name: String,
    public_routes: PublicRoutes,
}

/// 会话令牌: 优先读取会话 Cookie, 其次 Authorization: Bearer
pub fn extract_session_token(req: &actix_web::HttpRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_routes.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let Some(token) = extract_session_token(req.request(), &self.cookie_name) else {
            log::debug!("Rejected {} {}: no session", req.method(), req.path());
            let error = AppError::AuthError("Authentication required".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        match self.auth_service.verify_session(&token) {
            Ok(session) => {
                // 管理员身份写入请求扩展, 供处理函数读取
                req.extensions_mut().insert(session);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(e) => {
                log::warn!("Rejected {} {}: {e}", req.method(), req.path());
                let error = AppError::AuthError("Invalid or expired session".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes_are_method_aware() {
        let routes = PublicRoutes::new();
        assert!(routes.is_public(&Method::POST, "/api/v1/bookings"));
        assert!(routes.is_public(&Method::POST, "/api/v1/bookings/"));
        assert!(!routes.is_public(&Method::GET, "/api/v1/bookings"));
        assert!(!routes.is_public(&Method::GET, "/api/v1/bookings/42"));
        assert!(routes.is_public(&Method::GET, "/api/v1/bookings/by-code/BCW2610200930"));
        assert!(routes.is_public(
            &Method::POST,
            "/api/v1/bookings/by-code/BCW2610200930/payment-proof"
        ));

        assert!(routes.is_public(&Method::GET, "/api/v1/services"));
        assert!(routes.is_public(&Method::GET, "/api/v1/services/3"));
        assert!(!routes.is_public(&Method::POST, "/api/v1/services"));
        assert!(!routes.is_public(&Method::DELETE, "/api/v1/branches/3"));

        assert!(routes.is_public(&Method::GET, "/api/v1/customers/points"));
        assert!(!routes.is_public(&Method::GET, "/api/v1/customers"));
        assert!(!routes.is_public(&Method::GET, "/api/v1/reports"));

        assert!(routes.is_public(&Method::POST, "/api/v1/auth"));
        assert!(routes.is_public(&Method::DELETE, "/api/v1/auth"));
        assert!(routes.is_public(&Method::GET, "/swagger-ui/index.html"));
    }
}
