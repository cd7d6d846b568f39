use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::nullable;
use crate::entities::{LoyaltyTransactionType, customer_entity, loyalty_transaction_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_plates: Vec<String>,
    pub total_bookings: i64,
    pub total_loyalty_points: i64,
    pub joined_at: DateTime<Utc>,
}

impl From<customer_entity::Model> for CustomerResponse {
    fn from(m: customer_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            phone: m.phone,
            email: m.email,
            vehicle_plates: m.vehicle_plates,
            total_bookings: m.total_bookings,
            total_loyalty_points: m.total_loyalty_points,
            joined_at: m.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    #[schema(example = "Siti Rahma")]
    pub name: Option<String>,
    #[schema(example = "081298765432")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub vehicle_plates: Vec<String>,
    /// 初始积分 (迁移旧会员时使用)
    #[serde(default)]
    pub total_loyalty_points: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    /// 整体替换车牌列表
    pub vehicle_plates: Option<Vec<String>>,
    /// 手工调整积分: 正数增加, 负数扣减 (记录到积分流水)
    pub points_adjustment: Option<i64>,
    pub adjustment_note: Option<String>,
}

impl UpdateCustomerRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.vehicle_plates.is_none()
            && self.points_adjustment.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CustomerQuery {
    /// 匹配姓名 / 手机号 / 邮箱
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerPointsQuery {
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerPointsResponse {
    pub phone: String,
    pub total_loyalty_points: i64,
    /// 1 积分抵扣的金额
    pub point_value: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoyaltyTransactionQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoyaltyTransactionResponse {
    pub id: i64,
    pub booking_id: Option<i64>,
    pub transaction_type: LoyaltyTransactionType,
    pub points: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<loyalty_transaction_entity::Model> for LoyaltyTransactionResponse {
    fn from(m: loyalty_transaction_entity::Model) -> Self {
        Self {
            id: m.id,
            booking_id: m.booking_id,
            transaction_type: m.transaction_type,
            points: m.points,
            balance_after: m.balance_after,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

/// 校验通过的新客户
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    /// 已规范化为 +62...
    pub phone: String,
    pub email: Option<String>,
    pub vehicle_plates: Vec<String>,
    pub total_loyalty_points: i64,
}
