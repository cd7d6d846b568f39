use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::nullable;
use crate::entities::{BookingSource, BookingStatus, booking_entity};

/// 创建预约请求 (前台预约流程 / 后台手工录入共用)
///
/// 所有字段都是可选的, 由校验器统一检查并一次性返回全部错误。
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BookingPayload {
    #[schema(example = "Budi Santoso")]
    pub customer_name: Option<String>,
    #[schema(example = "081234567890")]
    pub customer_phone: Option<String>,
    #[schema(example = "budi@example.com")]
    pub customer_email: Option<String>,
    pub service_id: Option<i64>,
    pub branch_id: Option<i64>,
    #[schema(example = "2026-10-20")]
    pub booking_date: Option<String>, // YYYY-MM-DD
    #[schema(example = "09:30")]
    pub booking_time: Option<String>, // HH:MM
    /// 客户端显示的服务价格 (+ 接车费), 服务端会按服务目录重新计算
    #[schema(example = 45000)]
    pub total_price: Option<f64>,
    pub is_pickup_service: Option<bool>,
    pub pickup_address: Option<String>,
    pub pickup_notes: Option<String>,
    #[schema(example = "B 1234 XYZ")]
    pub vehicle_plate: Option<String>,
    #[schema(example = "transfer")]
    pub payment_method: Option<String>,
    /// 希望使用的积分
    pub loyalty_points_used: Option<i64>,
    pub notes: Option<String>,
}

/// 校验通过后的预约数据
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub customer_name: String,
    /// 已规范化为 +62...
    pub customer_phone: String,
    pub customer_email: String,
    pub service_id: i64,
    pub branch_id: i64,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub total_price: i64,
    pub is_pickup_service: bool,
    pub pickup_address: Option<String>,
    pub pickup_notes: Option<String>,
    /// 大写, 空白已合并
    pub vehicle_plate: String,
    pub payment_method: String,
    pub loyalty_points_used: i64,
    pub notes: Option<String>,
}

/// 后台修改预约, 只允许白名单内的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBookingRequest {
    pub status: Option<BookingStatus>,
    pub booking_date: Option<String>,
    pub booking_time: Option<String>,
    pub branch_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub vehicle_plate: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub pickup_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub pickup_notes: Option<Option<String>>,
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub payment_proof_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl UpdateBookingRequest {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.booking_date.is_none()
            && self.booking_time.is_none()
            && self.branch_id.is_none()
            && self.customer_name.is_none()
            && self.customer_email.is_none()
            && self.vehicle_plate.is_none()
            && self.pickup_address.is_none()
            && self.pickup_notes.is_none()
            && self.payment_method.is_none()
            && self.payment_proof_url.is_none()
            && self.notes.is_none()
    }
}

/// 预约列表查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    pub branch_id: Option<i64>,
    pub status: Option<BookingStatus>,
    /// 单日 (YYYY-MM-DD)
    pub date: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// 匹配预约编号 / 客户姓名 / 手机号
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentProofRequest {
    /// 外部存储中的付款凭证图片地址
    pub payment_proof_url: String,
}

/// 价格试算请求 (前台与后台录入表单共用同一套计算)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub service_id: i64,
    #[serde(default)]
    pub is_pickup_service: bool,
    #[serde(default)]
    pub loyalty_points_used: i64,
    /// 提供手机号时按客户当前余额限制可用积分
    pub customer_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    pub subtotal: i64,
    pub points_applied: i64,
    pub discount: i64,
    pub total_price: i64,
    pub points_earned: i64,
    /// 未提供手机号时为 null
    pub available_points: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub booking_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub service_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub branch_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    pub booking_date: NaiveDate,
    pub booking_time: String,
    pub total_price: i64,
    pub is_pickup_service: bool,
    pub pickup_address: Option<String>,
    pub pickup_notes: Option<String>,
    pub vehicle_plate: String,
    pub payment_method: String,
    pub payment_proof_url: Option<String>,
    pub notes: Option<String>,
    pub loyalty_points_used: i64,
    pub loyalty_points_earned: i64,
    pub status: BookingStatus,
    pub source: BookingSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<booking_entity::Model> for BookingResponse {
    fn from(m: booking_entity::Model) -> Self {
        Self {
            id: m.id,
            booking_code: m.booking_code,
            customer_name: m.customer_name,
            customer_phone: m.customer_phone,
            customer_email: m.customer_email,
            service_id: m.service_id,
            service_name: None,
            branch_id: m.branch_id,
            branch_name: None,
            booking_date: m.booking_date,
            booking_time: m.booking_time,
            total_price: m.total_price,
            is_pickup_service: m.is_pickup_service,
            pickup_address: m.pickup_address,
            pickup_notes: m.pickup_notes,
            vehicle_plate: m.vehicle_plate,
            payment_method: m.payment_method,
            payment_proof_url: m.payment_proof_url,
            notes: m.notes,
            loyalty_points_used: m.loyalty_points_used,
            loyalty_points_earned: m.loyalty_points_earned,
            status: m.status,
            source: m.source,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
