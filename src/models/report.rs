use chrono::NaiveDate;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::BookingStatus;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[schema(example = "2026-10-01")]
    pub start_date: Option<String>,
    #[schema(example = "2026-10-31")]
    pub end_date: Option<String>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub date: Option<String>,
    pub branch_id: Option<i64>,
}

/// 参与统计的已完成预约 (名称已解析)
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct CompletedBookingRow {
    pub service_id: i64,
    pub service_name: String,
    pub branch_id: i64,
    pub branch_name: String,
    pub total_price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub id: i64,
    pub name: String,
    pub count: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_revenue: i64,
    pub total_bookings: i64,
    pub average_booking_value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub summary: ReportSummary,
    pub service_stats: Vec<GroupStat>,
    pub branch_stats: Vec<GroupStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub branch_id: Option<i64>,
    #[serde(flatten)]
    pub report: ReportData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: BookingStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub branch_id: Option<i64>,
    pub status_counts: Vec<StatusCount>,
    pub total_bookings: i64,
    #[serde(flatten)]
    pub report: ReportData,
}
