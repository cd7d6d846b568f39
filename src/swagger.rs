use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    BookingSource, BookingStatus, BranchStatus, LoyaltyTransactionType, ServiceCategory,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("wash_session"))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::current_session,
        handlers::booking::create_booking,
        handlers::booking::create_manual_booking,
        handlers::booking::quote,
        handlers::booking::list_bookings,
        handlers::booking::get_booking,
        handlers::booking::get_booking_by_code,
        handlers::booking::attach_payment_proof,
        handlers::booking::update_booking,
        handlers::booking::delete_booking,
        handlers::wash_service::list_services,
        handlers::wash_service::get_service,
        handlers::wash_service::create_service,
        handlers::wash_service::update_service,
        handlers::wash_service::delete_service,
        handlers::branch::list_branches,
        handlers::branch::get_branch,
        handlers::branch::create_branch,
        handlers::branch::update_branch,
        handlers::branch::delete_branch,
        handlers::customer::list_customers,
        handlers::customer::get_points,
        handlers::customer::get_customer,
        handlers::customer::create_customer,
        handlers::customer::update_customer,
        handlers::customer::list_loyalty_transactions,
        handlers::report::get_report,
        handlers::report::get_dashboard,
    ),
    components(
        schemas(
            ApiError,
            BookingStatus,
            BookingSource,
            ServiceCategory,
            BranchStatus,
            LoyaltyTransactionType,
            BookingPayload,
            UpdateBookingRequest,
            BookingQuery,
            PaymentProofRequest,
            QuoteRequest,
            QuoteResponse,
            BookingResponse,
            BookingPage,
            CreateServiceRequest,
            UpdateServiceRequest,
            ServiceResponse,
            CreateBranchRequest,
            UpdateBranchRequest,
            BankAccount,
            BranchResponse,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CustomerResponse,
            CustomerPointsResponse,
            CustomerPage,
            LoyaltyTransactionResponse,
            LoyaltyTransactionPage,
            ReportSummary,
            GroupStat,
            ReportData,
            ReportResponse,
            StatusCount,
            DashboardResponse,
            LoginRequest,
            SessionResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin session API"),
        (name = "booking", description = "Booking API"),
        (name = "service", description = "Wash service catalog API"),
        (name = "branch", description = "Branch API"),
        (name = "customer", description = "Customer and loyalty API"),
        (name = "report", description = "Report API"),
    ),
    info(
        title = "Washbook Backend API",
        version = "1.0.0",
        description = "Car and motorcycle wash booking REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
