pub mod auth;
pub mod booking;
pub mod branch;
pub mod customer;
pub mod report;
pub mod wash_service;

pub use auth::auth_config;
pub use booking::booking_config;
pub use branch::branch_config;
pub use customer::customer_config;
pub use report::report_config;
pub use wash_service::wash_service_config;

use actix_web::web;

/// /api/v1 下的全部路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth_config)
        .configure(booking_config)
        .configure(wash_service_config)
        .configure(branch_config)
        .configure(customer_config)
        .configure(report_config);
}
