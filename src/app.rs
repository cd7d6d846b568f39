use actix_web::web;
use std::sync::Arc;

use crate::config::{AuthConfig, Config};
use crate::database::DbPool;
use crate::error::AppError;
use crate::handlers;
use crate::services::*;
use crate::swagger::swagger_config;
use crate::utils::{JwtService, LoyaltyRules};

/// 请求体上限
const JSON_LIMIT_BYTES: usize = 64 * 1024;

/// 解析失败的请求体也返回统一的错误结构
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            AppError::ValidationError(format!("Invalid request body: {err}")).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid query string: {err}")).into()
    })
}

/// 所有业务服务, 每个 worker 克隆一份
#[derive(Clone)]
pub struct AppServices {
    pub auth_config: AuthConfig,
    pub auth: AuthService,
    pub bookings: BookingService,
    pub catalog: CatalogService,
    pub branches: BranchService,
    pub customers: CustomerService,
    pub reports: ReportService,
}

impl AppServices {
    pub fn new(pool: DbPool, config: &Config) -> Self {
        let jwt_service = JwtService::new(&config.auth.jwt_secret, config.auth.session_expires_in);
        let loyalty = LoyaltyRules::from(&config.loyalty);
        let utc_offset_hours = config.booking.utc_offset_hours;
        // 各服务共享同一个连接池
        let pool = Arc::new(pool);

        Self {
            auth_config: config.auth.clone(),
            auth: AuthService::new(&config.auth, jwt_service),
            bookings: BookingService::new(pool.clone(), loyalty, utc_offset_hours),
            catalog: CatalogService::new(pool.clone()),
            branches: BranchService::new(pool.clone()),
            customers: CustomerService::new(pool.clone(), loyalty),
            reports: ReportService::new(pool, utc_offset_hours),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.auth_config.cookie_name
    }

    /// 注册共享数据与全部路由 (鉴权中间件由调用方包裹)
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(json_config())
            .app_data(query_config())
            .app_data(web::Data::new(self.auth_config.clone()))
            .app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.bookings.clone()))
            .app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.branches.clone()))
            .app_data(web::Data::new(self.customers.clone()))
            .app_data(web::Data::new(self.reports.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::api_config));
    }
}
