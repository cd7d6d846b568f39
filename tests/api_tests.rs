use actix_web::http::{Method, StatusCode};
use actix_web::{App, test};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};

use washbook_backend::AppServices;
use washbook_backend::config::{
    AuthConfig, BookingConfig, Config, DatabaseConfig, LoyaltyConfig, ServerConfig,
};
use washbook_backend::entities::wash_service_entity;
use washbook_backend::middlewares::AuthMiddleware;

fn test_config(password_hash: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: Vec::new(),
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "integration-secret".to_string(),
            session_expires_in: 3600,
            admin_username: "admin".to_string(),
            admin_password_hash: password_hash.to_string(),
            cookie_name: "wash_session".to_string(),
            cookie_secure: false,
        },
        loyalty: LoyaltyConfig::default(),
        booking: BookingConfig::default(),
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

macro_rules! init_app {
    ($db:expr, $config:expr) => {{
        let services = AppServices::new($db, &$config);
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(
                    services.auth.clone(),
                    services.cookie_name(),
                ))
                .configure(|cfg| services.configure(cfg)),
        )
        .await
    }};
}

/// 中间件拒绝时返回的是 Err, 转成响应再比较
macro_rules! status_of {
    ($app:expr, $req:expr) => {{
        match test::try_call_service(&$app, $req.to_request()).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        }
    }};
}

#[actix_web::test]
async fn test_invalid_public_booking_is_rejected_with_all_errors() {
    let app = init_app!(empty_db(), test_config("unused"));

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .set_json(json!({ "customer_phone": "12" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let message = body["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("phone"), "unexpected message: {message}");
}

#[actix_web::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = init_app!(empty_db(), test_config("unused"));

    let req = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_admin_routes_require_session() {
    let app = init_app!(empty_db(), test_config("unused"));

    for (method, uri) in [
        (Method::GET, "/api/v1/bookings"),
        (Method::PUT, "/api/v1/bookings/1"),
        (Method::DELETE, "/api/v1/bookings/1"),
        (Method::POST, "/api/v1/services"),
        (Method::GET, "/api/v1/customers"),
        (Method::GET, "/api/v1/reports"),
    ] {
        let req = test::TestRequest::default().method(method.clone()).uri(uri);
        assert_eq!(
            status_of!(app, req),
            StatusCode::UNAUTHORIZED,
            "{method} {uri}"
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/bookings")
        .insert_header(("Authorization", "Bearer not-a-token"));
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_service_catalog_is_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<wash_service_entity::Model>::new()])
        .into_connection();
    let app = init_app!(db, test_config("unused"));

    let req = test::TestRequest::get().uri("/api/v1/services").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn test_login_sets_session_cookie_and_unlocks_admin_routes() {
    let hash = bcrypt::hash("s3cret", 4).unwrap();
    let app = init_app!(empty_db(), test_config(&hash));

    // 密码错误
    let req = test::TestRequest::post()
        .uri("/api/v1/auth")
        .set_json(json!({ "username": "admin", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.response().cookies().next().is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth")
        .set_json(json!({ "username": "admin", "password": "s3cret" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "wash_session")
        .map(|c| c.into_owned())
        .unwrap();
    assert!(cookie.http_only().unwrap_or(false));
    assert!(!cookie.value().is_empty());

    // 携带会话查询当前管理员
    let req = test::TestRequest::get()
        .uri("/api/v1/auth")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], "admin");
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let app = init_app!(empty_db(), test_config("unused"));

    let req = test::TestRequest::delete().uri("/api/v1/auth").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "wash_session")
        .map(|c| c.into_owned())
        .unwrap();
    assert!(cookie.value().is_empty());
}
