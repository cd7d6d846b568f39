use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/services",
    tag = "service",
    params(
        ("active" = Option<bool>, Query, description = "按启用状态过滤")
    ),
    responses(
        (status = 200, description = "服务列表", body = [ServiceResponse])
    )
)]
pub async fn list_services(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<ServiceQuery>,
) -> Result<HttpResponse> {
    match catalog_service.list_services(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "service",
    params(("id" = i64, Path, description = "服务ID")),
    responses(
        (status = 200, description = "服务详情", body = ServiceResponse),
        (status = 404, description = "服务不存在")
    )
)]
pub async fn get_service(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog_service.get_service(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/services",
    tag = "service",
    request_body = CreateServiceRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 201, description = "创建成功", body = ServiceResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_service(
    catalog_service: web::Data<CatalogService>,
    request: web::Json<CreateServiceRequest>,
) -> Result<HttpResponse> {
    match catalog_service.create_service(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "service",
    params(("id" = i64, Path, description = "服务ID")),
    request_body = UpdateServiceRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = ServiceResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "服务不存在")
    )
)]
pub async fn update_service(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
    request: web::Json<UpdateServiceRequest>,
) -> Result<HttpResponse> {
    match catalog_service
        .update_service(path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "service",
    params(("id" = i64, Path, description = "服务ID")),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "服务不存在"),
        (status = 409, description = "服务仍被预约引用")
    )
)]
pub async fn delete_service(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog_service.delete_service(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Service deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wash_service_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(list_services))
            .route("", web::post().to(create_service))
            .route("/{id}", web::get().to(get_service))
            .route("/{id}", web::put().to(update_service))
            .route("/{id}", web::delete().to(delete_service)),
    );
}
