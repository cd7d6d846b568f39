use crate::models::*;
use crate::services::{BookingOrigin, BookingService};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn admin_name(req: &HttpRequest) -> String {
    req.extensions()
        .get::<AdminSession>()
        .map(|s| s.username.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

#[utoipa::path(
    post,
    path = "/bookings",
    tag = "booking",
    request_body = BookingPayload,
    responses(
        (status = 201, description = "预约创建成功 (待确认)", body = BookingResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "服务或分店不存在")
    )
)]
pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    request: web::Json<BookingPayload>,
) -> Result<HttpResponse> {
    match booking_service
        .create_booking(request.into_inner(), BookingOrigin::Public)
        .await
    {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": response,
            "message": "Booking received"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/bookings/manual",
    tag = "booking",
    request_body = BookingPayload,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 201, description = "后台录入预约成功 (已确认)", body = BookingResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_manual_booking(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    request: web::Json<BookingPayload>,
) -> Result<HttpResponse> {
    match booking_service
        .create_booking(request.into_inner(), BookingOrigin::Admin)
        .await
    {
        Ok(response) => {
            log::info!(
                "Admin '{}' entered booking {}",
                admin_name(&req),
                response.booking_code
            );
            Ok(HttpResponse::Created().json(json!({
                "success": true,
                "data": response
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/bookings/quote",
    tag = "booking",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "价格试算", body = QuoteResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "服务不存在")
    )
)]
pub async fn quote(
    booking_service: web::Data<BookingService>,
    request: web::Json<QuoteRequest>,
) -> Result<HttpResponse> {
    match booking_service.quote(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "booking",
    params(
        ("branchId" = Option<i64>, Query, description = "分店"),
        ("status" = Option<String>, Query, description = "状态: pending/confirmed/picked-up/in-progress/completed/cancelled"),
        ("date" = Option<String>, Query, description = "预约日期 YYYY-MM-DD"),
        ("dateFrom" = Option<String>, Query, description = "起始日期"),
        ("dateTo" = Option<String>, Query, description = "结束日期"),
        ("search" = Option<String>, Query, description = "预约编号 / 客户姓名 / 手机号"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量 (最大 100)")
    ),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "预约列表", body = BookingPage),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_bookings(
    booking_service: web::Data<BookingService>,
    query: web::Query<BookingQuery>,
) -> Result<HttpResponse> {
    match booking_service.list_bookings(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "booking",
    params(("id" = i64, Path, description = "预约ID")),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "预约详情", body = BookingResponse),
        (status = 404, description = "预约不存在")
    )
)]
pub async fn get_booking(
    booking_service: web::Data<BookingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match booking_service.get_booking(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings/by-code/{code}",
    tag = "booking",
    params(("code" = String, Path, description = "预约编号 BCW + YYMMDDHHmm")),
    responses(
        (status = 200, description = "预约详情", body = BookingResponse),
        (status = 404, description = "预约不存在")
    )
)]
pub async fn get_booking_by_code(
    booking_service: web::Data<BookingService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match booking_service.get_booking_by_code(&path).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/bookings/by-code/{code}/payment-proof",
    tag = "booking",
    params(("code" = String, Path, description = "预约编号")),
    request_body = PaymentProofRequest,
    responses(
        (status = 200, description = "付款凭证已提交", body = BookingResponse),
        (status = 404, description = "预约不存在"),
        (status = 409, description = "预约已不在待确认状态")
    )
)]
pub async fn attach_payment_proof(
    booking_service: web::Data<BookingService>,
    path: web::Path<String>,
    request: web::Json<PaymentProofRequest>,
) -> Result<HttpResponse> {
    match booking_service
        .attach_payment_proof(&path, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Payment proof received"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/bookings/{id}",
    tag = "booking",
    params(("id" = i64, Path, description = "预约ID")),
    request_body = UpdateBookingRequest,
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "修改成功", body = BookingResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "预约不存在"),
        (status = 409, description = "不允许的状态变更")
    )
)]
pub async fn update_booking(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateBookingRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    match booking_service
        .update_booking(id, request.into_inner())
        .await
    {
        Ok(response) => {
            log::info!("Admin '{}' updated booking {id}", admin_name(&req));
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": response
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "booking",
    params(("id" = i64, Path, description = "预约ID")),
    security(
        ("session_cookie" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "预约不存在"),
        (status = 409, description = "当前状态不允许删除")
    )
)]
pub async fn delete_booking(
    booking_service: web::Data<BookingService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    match booking_service.delete_booking(id).await {
        Ok(()) => {
            log::info!("Admin '{}' deleted booking {id}", admin_name(&req));
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Booking deleted"
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn booking_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("", web::post().to(create_booking))
            .route("/manual", web::post().to(create_manual_booking))
            .route("/quote", web::post().to(quote))
            .route("/by-code/{code}", web::get().to(get_booking_by_code))
            .route(
                "/by-code/{code}/payment-proof",
                web::post().to(attach_payment_proof),
            )
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}", web::put().to(update_booking))
            .route("/{id}", web::delete().to(delete_booking)),
    );
}
