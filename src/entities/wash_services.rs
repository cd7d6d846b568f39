use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "service_category")]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    #[sea_orm(string_value = "regular_car")]
    RegularCar,
    #[sea_orm(string_value = "premium_car")]
    PremiumCar,
    #[sea_orm(string_value = "motorcycle")]
    Motorcycle,
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceCategory::RegularCar => write!(f, "regular_car"),
            ServiceCategory::PremiumCar => write!(f, "premium_car"),
            ServiceCategory::Motorcycle => write!(f, "motorcycle"),
        }
    }
}

/// 洗车服务项目
/// - price / pickup_fee: 整数货币单位 (IDR)
/// - loyalty_points: 完成后奖励积分, NULL 表示按预约金额计算
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
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

impl Model {
    /// 服务价格 + 接车费 (仅当请求接车且服务支持时)
    pub fn subtotal(&self, is_pickup: bool) -> i64 {
        if is_pickup && self.supports_pickup {
            self.price + self.pickup_fee
        } else {
            self.price
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
