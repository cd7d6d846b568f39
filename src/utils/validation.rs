//! 请求数据校验
//!
//! 所有校验函数都是纯函数: 不访问数据库, 不修改输入,
//! 一次性收集全部错误而不是遇到第一个就返回。

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

use super::phone::{is_valid_id_phone, normalize_id_phone};
use super::vehicle_plate::{normalize_plate, normalize_plates};
use crate::entities::BranchStatus;
use crate::models::{
    BookingPayload, BranchDraft, CreateBranchRequest, CreateCustomerRequest, CreateServiceRequest,
    NewBooking, NewCustomer, ServiceDraft, UpdateBookingRequest,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid time regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// YYYY-MM-DD 且为真实存在的日期
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// HH:MM 且为合法时刻
pub fn is_valid_time(value: &str) -> bool {
    let value = value.trim();
    TIME_RE.is_match(value) && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

fn required(value: &Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(format!("{field} is required"));
            None
        }
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_phone(phone: &str, field: &str, errors: &mut Vec<String>) -> bool {
    if is_valid_id_phone(phone) {
        true
    } else {
        errors.push(format!(
            "{field} must be an Indonesian mobile number (+62, 62 or 0 followed by 9-13 digits)"
        ));
        false
    }
}

fn check_email(email: &str, field: &str, errors: &mut Vec<String>) -> bool {
    if is_valid_email(email) {
        true
    } else {
        errors.push(format!("{field} must be a valid email address"));
        false
    }
}

/// 校验创建预约的请求
pub fn validate_booking(payload: &BookingPayload) -> Result<NewBooking, Vec<String>> {
    let mut errors = Vec::new();

    let customer_name = required(&payload.customer_name, "customer_name", &mut errors);
    let customer_phone = required(&payload.customer_phone, "customer_phone", &mut errors)
        .filter(|p| check_phone(p, "customer_phone", &mut errors))
        .map(|p| normalize_id_phone(&p));
    let customer_email = required(&payload.customer_email, "customer_email", &mut errors)
        .filter(|e| check_email(e, "customer_email", &mut errors));

    let service_id = match payload.service_id {
        Some(id) if id > 0 => Some(id),
        Some(_) => {
            errors.push("service_id must be a positive id".to_string());
            None
        }
        None => {
            errors.push("service_id is required".to_string());
            None
        }
    };
    let branch_id = match payload.branch_id {
        Some(id) if id > 0 => Some(id),
        Some(_) => {
            errors.push("branch_id must be a positive id".to_string());
            None
        }
        None => {
            errors.push("branch_id is required".to_string());
            None
        }
    };

    let booking_date = required(&payload.booking_date, "booking_date", &mut errors).and_then(|d| {
        let parsed = parse_date(&d);
        if parsed.is_none() {
            errors.push("booking_date must be a valid date in YYYY-MM-DD format".to_string());
        }
        parsed
    });
    let booking_time = required(&payload.booking_time, "booking_time", &mut errors).filter(|t| {
        let ok = is_valid_time(t);
        if !ok {
            errors.push("booking_time must be a valid time in HH:MM format".to_string());
        }
        ok
    });

    let total_price = match payload.total_price {
        Some(p) if p.is_finite() && p > 0.0 && p.fract() == 0.0 => Some(p as i64),
        Some(_) => {
            errors.push("total_price must be a positive whole number".to_string());
            None
        }
        None => {
            errors.push("total_price is required".to_string());
            None
        }
    };

    let is_pickup_service = payload.is_pickup_service;
    if is_pickup_service.is_none() {
        errors.push("is_pickup_service is required".to_string());
    }
    let pickup_address = optional_text(&payload.pickup_address);
    if is_pickup_service == Some(true) && pickup_address.is_none() {
        errors.push("pickup_address is required for pickup service".to_string());
    }

    let vehicle_plate = required(&payload.vehicle_plate, "vehicle_plate", &mut errors)
        .map(|p| normalize_plate(&p));
    let payment_method = required(&payload.payment_method, "payment_method", &mut errors);

    let loyalty_points_used = payload.loyalty_points_used.unwrap_or(0);
    if loyalty_points_used < 0 {
        errors.push("loyalty_points_used must not be negative".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    match (
        customer_name,
        customer_phone,
        customer_email,
        service_id,
        branch_id,
        booking_date,
        booking_time,
        total_price,
        is_pickup_service,
        vehicle_plate,
        payment_method,
    ) {
        (
            Some(customer_name),
            Some(customer_phone),
            Some(customer_email),
            Some(service_id),
            Some(branch_id),
            Some(booking_date),
            Some(booking_time),
            Some(total_price),
            Some(is_pickup_service),
            Some(vehicle_plate),
            Some(payment_method),
        ) => Ok(NewBooking {
            customer_name,
            customer_phone,
            customer_email,
            service_id,
            branch_id,
            booking_date,
            booking_time,
            total_price,
            is_pickup_service,
            pickup_address: if is_pickup_service { pickup_address } else { None },
            pickup_notes: if is_pickup_service {
                optional_text(&payload.pickup_notes)
            } else {
                None
            },
            vehicle_plate,
            payment_method,
            loyalty_points_used,
            notes: optional_text(&payload.notes),
        }),
        _ => Err(vec!["Invalid booking payload".to_string()]),
    }
}

/// 校验后台修改预约时提交的字段格式 (状态流转由服务层检查)
pub fn validate_booking_update(req: &UpdateBookingRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(date) = &req.booking_date {
        if parse_date(date).is_none() {
            errors.push("booking_date must be a valid date in YYYY-MM-DD format".to_string());
        }
    }
    if let Some(time) = &req.booking_time {
        if !is_valid_time(time) {
            errors.push("booking_time must be a valid time in HH:MM format".to_string());
        }
    }
    if let Some(id) = req.branch_id {
        if id <= 0 {
            errors.push("branch_id must be a positive id".to_string());
        }
    }
    if let Some(name) = &req.customer_name {
        if name.trim().is_empty() {
            errors.push("customer_name must not be empty".to_string());
        }
    }
    if let Some(email) = &req.customer_email {
        check_email(email, "customer_email", &mut errors);
    }
    if let Some(plate) = &req.vehicle_plate {
        if normalize_plate(plate).is_empty() {
            errors.push("vehicle_plate must not be empty".to_string());
        }
    }
    if let Some(method) = &req.payment_method {
        if method.trim().is_empty() {
            errors.push("payment_method must not be empty".to_string());
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// 由创建请求生成服务草稿 (填充默认值) 并校验
pub fn build_service_draft(req: CreateServiceRequest) -> Result<ServiceDraft, Vec<String>> {
    let mut errors = Vec::new();
    let name = required(&req.name, "name", &mut errors);
    if req.category.is_none() {
        errors.push("category is required".to_string());
    }
    if req.price.is_none() {
        errors.push("price is required".to_string());
    }
    if req.duration_minutes.is_none() {
        errors.push("duration_minutes is required".to_string());
    }

    let draft = match (name, req.category, req.price, req.duration_minutes) {
        (Some(name), Some(category), Some(price), Some(duration_minutes)) => ServiceDraft {
            name,
            category,
            description: optional_text(&req.description),
            price,
            pickup_fee: req.pickup_fee.unwrap_or(0),
            supports_pickup: req.supports_pickup.unwrap_or(false),
            duration_minutes,
            features: req.features.unwrap_or_default(),
            loyalty_points: req.loyalty_points,
            is_active: req.is_active.unwrap_or(true),
        },
        _ => {
            // 同时报告已提供字段的取值错误
            let partial = ServiceDraft {
                name: "-".to_string(),
                category: crate::entities::ServiceCategory::RegularCar,
                description: None,
                price: req.price.unwrap_or(1),
                pickup_fee: req.pickup_fee.unwrap_or(0),
                supports_pickup: false,
                duration_minutes: req.duration_minutes.unwrap_or(1),
                features: Vec::new(),
                loyalty_points: req.loyalty_points,
                is_active: true,
            };
            if let Err(more) = validate_service_draft(&partial) {
                errors.extend(more);
            }
            return Err(errors);
        }
    };

    validate_service_draft(&draft)?;
    Ok(draft)
}

/// 校验完整的服务记录 (新建, 或已有记录合并修改之后)
pub fn validate_service_draft(draft: &ServiceDraft) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if draft.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if draft.price <= 0 {
        errors.push("price must be a positive number".to_string());
    }
    if draft.pickup_fee < 0 {
        errors.push("pickup_fee must not be negative".to_string());
    }
    if draft.duration_minutes <= 0 {
        errors.push("duration_minutes must be a positive number".to_string());
    }
    if matches!(draft.loyalty_points, Some(points) if points < 0) {
        errors.push("loyalty_points must not be negative".to_string());
    }
    if draft.features.iter().any(|f| f.trim().is_empty()) {
        errors.push("features must not contain empty entries".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// 由创建请求生成分店草稿 (填充默认值) 并校验
pub fn build_branch_draft(req: CreateBranchRequest) -> Result<BranchDraft, Vec<String>> {
    let mut errors = Vec::new();
    let name = required(&req.name, "name", &mut errors);
    let address = required(&req.address, "address", &mut errors);
    let phone = required(&req.phone, "phone", &mut errors);
    let open_time = required(&req.open_time, "open_time", &mut errors);
    let close_time = required(&req.close_time, "close_time", &mut errors);

    let (Some(name), Some(address), Some(phone), Some(open_time), Some(close_time)) =
        (name, address, phone, open_time, close_time)
    else {
        // 同时报告已提供字段的取值错误
        if let Some(phone) = &req.phone {
            if !phone.trim().is_empty() {
                check_phone(phone, "phone", &mut errors);
            }
        }
        check_branch_hours(
            optional_text(&req.open_time).as_deref(),
            optional_text(&req.close_time).as_deref(),
            &mut errors,
        );
        check_branch_numbers(
            req.staff_count.unwrap_or(0),
            req.pickup_radius_km.unwrap_or(0.0),
            req.latitude,
            req.longitude,
            &mut errors,
        );
        return Err(errors);
    };

    let draft = BranchDraft {
        name,
        address,
        phone,
        manager: optional_text(&req.manager),
        staff_count: req.staff_count.unwrap_or(0),
        bank_name: optional_text(&req.bank_name),
        bank_account_number: optional_text(&req.bank_account_number),
        bank_account_name: optional_text(&req.bank_account_name),
        open_time,
        close_time,
        pickup_radius_km: req.pickup_radius_km.unwrap_or(0.0),
        latitude: req.latitude,
        longitude: req.longitude,
        status: req.status.unwrap_or(BranchStatus::Active),
    };
    validate_branch_draft(&draft)?;
    Ok(draft)
}

pub fn validate_branch_draft(draft: &BranchDraft) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if draft.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if draft.address.trim().is_empty() {
        errors.push("address must not be empty".to_string());
    }
    check_phone(&draft.phone, "phone", &mut errors);

    check_branch_hours(Some(&draft.open_time), Some(&draft.close_time), &mut errors);
    check_branch_numbers(
        draft.staff_count,
        draft.pickup_radius_km,
        draft.latitude,
        draft.longitude,
        &mut errors,
    );

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_branch_hours(open_time: Option<&str>, close_time: Option<&str>, errors: &mut Vec<String>) {
    let open_ok = open_time.map(is_valid_time);
    let close_ok = close_time.map(is_valid_time);
    if open_ok == Some(false) {
        errors.push("open_time must be a valid time in HH:MM format".to_string());
    }
    if close_ok == Some(false) {
        errors.push("close_time must be a valid time in HH:MM format".to_string());
    }
    // HH:MM 定长, 字符串比较即时间先后
    if let (Some(open), Some(close), Some(true), Some(true)) = (open_time, close_time, open_ok, close_ok)
    {
        if open.trim() >= close.trim() {
            errors.push("open_time must be earlier than close_time".to_string());
        }
    }
}

fn check_branch_numbers(
    staff_count: i32,
    pickup_radius_km: f64,
    latitude: Option<f64>,
    longitude: Option<f64>,
    errors: &mut Vec<String>,
) {
    if staff_count < 0 {
        errors.push("staff_count must not be negative".to_string());
    }
    if !pickup_radius_km.is_finite() || pickup_radius_km < 0.0 {
        errors.push("pickup_radius_km must not be negative".to_string());
    }
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            errors.push("latitude must be between -90 and 90".to_string());
        }
    }
    if let Some(lng) = longitude {
        if !(-180.0..=180.0).contains(&lng) {
            errors.push("longitude must be between -180 and 180".to_string());
        }
    }
    if latitude.is_some() != longitude.is_some() {
        errors.push("latitude and longitude must be provided together".to_string());
    }
}

pub fn validate_new_customer(req: &CreateCustomerRequest) -> Result<NewCustomer, Vec<String>> {
    let mut errors = Vec::new();
    let name = required(&req.name, "name", &mut errors);
    let phone = required(&req.phone, "phone", &mut errors)
        .filter(|p| check_phone(p, "phone", &mut errors))
        .map(|p| normalize_id_phone(&p));
    let email = optional_text(&req.email).filter(|e| check_email(e, "email", &mut errors));
    if req.total_loyalty_points < 0 {
        errors.push("total_loyalty_points must not be negative".to_string());
    }

    match (name, phone) {
        (Some(name), Some(phone)) if errors.is_empty() => Ok(NewCustomer {
            name,
            phone,
            email,
            vehicle_plates: normalize_plates(&req.vehicle_plates),
            total_loyalty_points: req.total_loyalty_points,
        }),
        _ => Err(errors),
    }
}
