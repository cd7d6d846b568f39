use crate::models::*;
use crate::services::CustomerService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/customers",
    tag = "customer",
    params(
        ("search" = Option<String>, Query, description = "姓名 / 手机号 / 邮箱"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "客户列表", body = CustomerPage),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_customers(
    customer_service: web::Data<CustomerService>,
    query: web::Query<CustomerQuery>,
) -> Result<HttpResponse> {
    match customer_service.list_customers(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/points",
    tag = "customer",
    params(("phone" = String, Query, description = "手机号")),
    responses(
        (status = 200, description = "积分余额", body = CustomerPointsResponse),
        (status = 400, description = "手机号格式错误")
    )
)]
pub async fn get_points(
    customer_service: web::Data<CustomerService>,
    query: web::Query<CustomerPointsQuery>,
) -> Result<HttpResponse> {
    match customer_service.get_points_by_phone(&query.phone).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customer",
    params(("id" = i64, Path, description = "客户ID")),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "客户详情", body = CustomerResponse),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn get_customer(
    customer_service: web::Data<CustomerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match customer_service.get_customer(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/customers",
    tag = "customer",
    request_body = CreateCustomerRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 201, description = "创建成功", body = CustomerResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "手机号已存在")
    )
)]
pub async fn create_customer(
    customer_service: web::Data<CustomerService>,
    request: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse> {
    match customer_service.create_customer(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customer",
    params(("id" = i64, Path, description = "客户ID")),
    request_body = UpdateCustomerRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = CustomerResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "客户不存在"),
        (status = 409, description = "手机号已被其他客户使用")
    )
)]
pub async fn update_customer(
    customer_service: web::Data<CustomerService>,
    path: web::Path<i64>,
    request: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse> {
    match customer_service
        .update_customer(path.into_inner(), request.into_inner())
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
    get,
    path = "/customers/{id}/loyalty-transactions",
    tag = "customer",
    params(
        ("id" = i64, Path, description = "客户ID"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "积分流水", body = LoyaltyTransactionPage),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn list_loyalty_transactions(
    customer_service: web::Data<CustomerService>,
    path: web::Path<i64>,
    query: web::Query<LoyaltyTransactionQuery>,
) -> Result<HttpResponse> {
    match customer_service
        .list_loyalty_transactions(path.into_inner(), &query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn customer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::get().to(list_customers))
            .route("", web::post().to(create_customer))
            // 必须在 /{id} 之前注册
            .route("/points", web::get().to(get_points))
            .route("/{id}", web::get().to(get_customer))
            .route("/{id}", web::put().to(update_customer))
            .route(
                "/{id}/loyalty-transactions",
                web::get().to(list_loyalty_transactions),
            ),
    );
}
