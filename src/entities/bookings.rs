use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 预约状态
///
/// 流转表:
/// - pending -> confirmed | cancelled
/// - confirmed -> picked-up (接车服务) | in-progress (到店) | cancelled
/// - picked-up -> in-progress
/// - in-progress -> completed
/// - completed / cancelled 为终态
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    #[serde(rename = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "picked-up")]
    #[serde(rename = "picked-up")]
    PickedUp,
    #[sea_orm(string_value = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    #[serde(rename = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    /// 当前状态允许进入的下一状态。picked-up 只对接车预约开放。
    pub fn allowed_next(self, is_pickup: bool) -> &'static [BookingStatus] {
        use BookingStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed if is_pickup => &[PickedUp, Cancelled],
            Confirmed => &[InProgress, Cancelled],
            PickedUp => &[InProgress],
            InProgress => &[Completed],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: BookingStatus, is_pickup: bool) -> bool {
        self.allowed_next(is_pickup).contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// 只有 pending / cancelled 的预约可以删除
    pub fn is_deletable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::PickedUp => "picked-up",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "picked-up" => Ok(BookingStatus::PickedUp),
            "in-progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("Unknown booking status '{other}'")),
        }
    }
}

/// 预约来源: online = 前台预约流程, offline = 后台手工录入
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_source")]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "offline")]
    Offline,
}

impl std::fmt::Display for BookingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingSource::Online => write!(f, "online"),
            BookingSource::Offline => write!(f, "offline"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub booking_code: String,
    pub customer_name: String,
    /// 规范化后的手机号 (+62...)
    pub customer_phone: String,
    pub customer_email: String,
    pub service_id: i64,
    pub branch_id: i64,
    pub booking_date: NaiveDate,
    /// HH:MM
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
    /// 创建时确定, 之后不再重新计算
    pub loyalty_points_earned: i64,
    /// 完成积分是否已经发放
    pub points_credited: bool,
    pub status: BookingStatus,
    pub source: BookingSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wash_services::Entity",
        from = "Column::ServiceId",
        to = "super::wash_services::Column::Id"
    )]
    Service,
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::BranchId",
        to = "super::branches::Column::Id"
    )]
    Branch,
}

impl Related<super::wash_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
