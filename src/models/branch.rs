use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::nullable;
use crate::entities::{BranchStatus, branch_entity};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateBranchRequest {
    #[schema(example = "Cabang Kemang")]
    pub name: Option<String>,
    pub address: Option<String>,
    #[schema(example = "0217654321")]
    pub phone: Option<String>,
    pub manager: Option<String>,
    pub staff_count: Option<i32>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_name: Option<String>,
    #[schema(example = "08:00")]
    pub open_time: Option<String>,
    #[schema(example = "20:00")]
    pub close_time: Option<String>,
    pub pickup_radius_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<BranchStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBranchRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub manager: Option<Option<String>>,
    pub staff_count: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub bank_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub bank_account_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub bank_account_name: Option<Option<String>>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub pickup_radius_km: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<Option<f64>>,
    pub status: Option<BranchStatus>,
}

impl UpdateBranchRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.manager.is_none()
            && self.staff_count.is_none()
            && self.bank_name.is_none()
            && self.bank_account_number.is_none()
            && self.bank_account_name.is_none()
            && self.open_time.is_none()
            && self.close_time.is_none()
            && self.pickup_radius_km.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchDraft {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub manager: Option<String>,
    pub staff_count: i32,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_name: Option<String>,
    pub open_time: String,
    pub close_time: String,
    pub pickup_radius_km: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: BranchStatus,
}

impl From<&branch_entity::Model> for BranchDraft {
    fn from(m: &branch_entity::Model) -> Self {
        Self {
            name: m.name.clone(),
            address: m.address.clone(),
            phone: m.phone.clone(),
            manager: m.manager.clone(),
            staff_count: m.staff_count,
            bank_name: m.bank_name.clone(),
            bank_account_number: m.bank_account_number.clone(),
            bank_account_name: m.bank_account_name.clone(),
            open_time: m.open_time.clone(),
            close_time: m.close_time.clone(),
            pickup_radius_km: m.pickup_radius_km,
            latitude: m.latitude,
            longitude: m.longitude,
            status: m.status,
        }
    }
}

impl BranchDraft {
    pub fn apply(mut self, patch: UpdateBranchRequest) -> Self {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.address {
            self.address = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.manager {
            self.manager = v;
        }
        if let Some(v) = patch.staff_count {
            self.staff_count = v;
        }
        if let Some(v) = patch.bank_name {
            self.bank_name = v;
        }
        if let Some(v) = patch.bank_account_number {
            self.bank_account_number = v;
        }
        if let Some(v) = patch.bank_account_name {
            self.bank_account_name = v;
        }
        if let Some(v) = patch.open_time {
            self.open_time = v;
        }
        if let Some(v) = patch.close_time {
            self.close_time = v;
        }
        if let Some(v) = patch.pickup_radius_km {
            self.pickup_radius_km = v;
        }
        if let Some(v) = patch.latitude {
            self.latitude = v;
        }
        if let Some(v) = patch.longitude {
            self.longitude = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BranchQuery {
    pub status: Option<BranchStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BankAccount {
    pub bank: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BranchResponse {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub manager: Option<String>,
    pub staff_count: i32,
    pub bank_account: BankAccount,
    pub open_time: String,
    pub close_time: String,
    pub pickup_radius_km: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: BranchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<branch_entity::Model> for BranchResponse {
    fn from(m: branch_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            address: m.address,
            phone: m.phone,
            manager: m.manager,
            staff_count: m.staff_count,
            bank_account: BankAccount {
                bank: m.bank_name,
                account_number: m.bank_account_number,
                account_name: m.bank_account_name,
            },
            open_time: m.open_time,
            close_time: m.close_time,
            pickup_radius_km: m.pickup_radius_km,
            latitude: m.latitude,
            longitude: m.longitude,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
