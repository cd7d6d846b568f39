use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::nullable;
use crate::entities::{ServiceCategory, wash_service_entity};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    #[schema(example = "Cuci Mobil Reguler")]
    pub name: Option<String>,
    pub category: Option<ServiceCategory>,
    pub description: Option<String>,
    #[schema(example = 45000)]
    pub price: Option<i64>,
    pub pickup_fee: Option<i64>,
    pub supports_pickup: Option<bool>,
    #[schema(example = 45)]
    pub duration_minutes: Option<i32>,
    pub features: Option<Vec<String>>,
    /// 奖励积分, 不填则按价格计算
    pub loyalty_points: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub category: Option<ServiceCategory>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<i64>,
    pub pickup_fee: Option<i64>,
    pub supports_pickup: Option<bool>,
    pub duration_minutes: Option<i32>,
    pub features: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub loyalty_points: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

impl UpdateServiceRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.pickup_fee.is_none()
            && self.supports_pickup.is_none()
            && self.duration_minutes.is_none()
            && self.features.is_none()
            && self.loyalty_points.is_none()
            && self.is_active.is_none()
    }
}

/// 完整的服务记录 (新建或合并修改之后), 写库前统一校验
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub name: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    pub price: i64,
    pub pickup_fee: i64,
    pub supports_pickup: bool,
    pub duration_minutes: i32,
    pub features: Vec<String>,
    pub loyalty_points: Option<i64>,
    pub is_active: bool,
}

impl From<&wash_service_entity::Model> for ServiceDraft {
    fn from(m: &wash_service_entity::Model) -> Self {
        Self {
            name: m.name.clone(),
            category: m.category,
            description: m.description.clone(),
            price: m.price,
            pickup_fee: m.pickup_fee,
            supports_pickup: m.supports_pickup,
            duration_minutes: m.duration_minutes,
            features: m.features.clone(),
            loyalty_points: m.loyalty_points,
            is_active: m.is_active,
        }
    }
}

impl ServiceDraft {
    pub fn apply(mut self, patch: UpdateServiceRequest) -> Self {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = patch.pickup_fee {
            self.pickup_fee = v;
        }
        if let Some(v) = patch.supports_pickup {
            self.supports_pickup = v;
        }
        if let Some(v) = patch.duration_minutes {
            self.duration_minutes = v;
        }
        if let Some(v) = patch.features {
            self.features = v;
        }
        if let Some(v) = patch.loyalty_points {
            self.loyalty_points = v;
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ServiceQuery {
    /// 只返回启用/停用的服务
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceResponse {
    pub id: i64,
    pub name: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    pub price: i64,
    pub pickup_fee: i64,
    pub supports_pickup: bool,
    pub duration_minutes: i32,
    pub features: Vec<String>,
    pub loyalty_points: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<wash_service_entity::Model> for ServiceResponse {
    fn from(m: wash_service_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            category: m.category,
            description: m.description,
            price: m.price,
            pickup_fee: m.pickup_fee,
            supports_pickup: m.supports_pickup,
            duration_minutes: m.duration_minutes,
            features: m.features,
            loyalty_points: m.loyalty_points,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
