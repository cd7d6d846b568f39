use crate::models::*;
use crate::services::ReportService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/reports",
    tag = "report",
    params(
        ("startDate" = Option<String>, Query, description = "起始日期 YYYY-MM-DD, 默认结束日期前 30 天"),
        ("endDate" = Option<String>, Query, description = "结束日期 YYYY-MM-DD, 默认今天"),
        ("branchId" = Option<i64>, Query, description = "分店")
    ),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "已完成预约统计", body = ReportResponse),
        (status = 400, description = "日期格式错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_report(
    report_service: web::Data<ReportService>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    match report_service.report(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/dashboard",
    tag = "report",
    params(
        ("date" = Option<String>, Query, description = "日期 YYYY-MM-DD, 默认今天"),
        ("branchId" = Option<i64>, Query, description = "分店")
    ),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "当日概览", body = DashboardResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_dashboard(
    report_service: web::Data<ReportService>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    match report_service.dashboard(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn report_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("", web::get().to(get_report))
            .route("/dashboard", web::get().to(get_dashboard)),
    );
}
