use crate::models::*;
use crate::services::BranchService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/branches",
    tag = "branch",
    params(
        ("status" = Option<String>, Query, description = "active / inactive")
    ),
    responses(
        (status = 200, description = "分店列表", body = [BranchResponse])
    )
)]
pub async fn list_branches(
    branch_service: web::Data<BranchService>,
    query: web::Query<BranchQuery>,
) -> Result<HttpResponse> {
    match branch_service.list_branches(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/branches/{id}",
    tag = "branch",
    params(("id" = i64, Path, description = "分店ID")),
    responses(
        (status = 200, description = "分店详情", body = BranchResponse),
        (status = 404, description = "分店不存在")
    )
)]
pub async fn get_branch(
    branch_service: web::Data<BranchService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match branch_service.get_branch(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/branches",
    tag = "branch",
    request_body = CreateBranchRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 201, description = "创建成功", body = BranchResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_branch(
    branch_service: web::Data<BranchService>,
    request: web::Json<CreateBranchRequest>,
) -> Result<HttpResponse> {
    match branch_service.create_branch(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/branches/{id}",
    tag = "branch",
    params(("id" = i64, Path, description = "分店ID")),
    request_body = UpdateBranchRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = BranchResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "分店不存在")
    )
)]
pub async fn update_branch(
    branch_service: web::Data<BranchService>,
    path: web::Path<i64>,
    request: web::Json<UpdateBranchRequest>,
) -> Result<HttpResponse> {
    match branch_service
        .update_branch(path.into_inner(), request.into_inner())
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
    path = "/branches/{id}",
    tag = "branch",
    params(("id" = i64, Path, description = "分店ID")),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "分店不存在"),
        (status = 409, description = "分店仍有预约")
    )
)]
pub async fn delete_branch(
    branch_service: web::Data<BranchService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match branch_service.delete_branch(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Branch deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn branch_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/branches")
            .route("", web::get().to(list_branches))
            .route("", web::post().to(create_branch))
            .route("/{id}", web::get().to(get_branch))
            .route("/{id}", web::put().to(update_branch))
            .route("/{id}", web::delete().to(delete_branch)),
    );
}
