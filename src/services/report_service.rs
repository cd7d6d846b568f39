use crate::entities::{
    BookingStatus, booking_entity as bookings, branch_entity as branches,
    wash_service_entity as services,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::parse_date;
use chrono::{Duration, FixedOffset, NaiveDate, Offset, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 默认统计最近 30 天
const DEFAULT_RANGE_DAYS: i64 = 30;

/// 单次遍历, 按服务与分店分组统计已完成预约
///
/// 分组按营收降序, 营收相同按名称升序。平均客单价四舍五入, 无数据时为 0。
pub fn aggregate_completed(rows: &[CompletedBookingRow]) -> ReportData {
    let mut by_service: HashMap<i64, GroupStat> = HashMap::new();
    let mut by_branch: HashMap<i64, GroupStat> = HashMap::new();
    let mut total_revenue = 0i64;

    for row in rows {
        total_revenue += row.total_price;

        let stat = by_service.entry(row.service_id).or_insert_with(|| GroupStat {
            id: row.service_id,
            name: row.service_name.clone(),
            count: 0,
            revenue: 0,
        });
        stat.count += 1;
        stat.revenue += row.total_price;

        let stat = by_branch.entry(row.branch_id).or_insert_with(|| GroupStat {
            id: row.branch_id,
            name: row.branch_name.clone(),
            count: 0,
            revenue: 0,
        });
        stat.count += 1;
        stat.revenue += row.total_price;
    }

    let total_bookings = rows.len() as i64;
    let average_booking_value = if total_bookings == 0 {
        0
    } else {
        (total_revenue as f64 / total_bookings as f64).round() as i64
    };

    ReportData {
        summary: ReportSummary {
            total_revenue,
            total_bookings,
            average_booking_value,
        },
        service_stats: sorted_stats(by_service),
        branch_stats: sorted_stats(by_branch),
    }
}

fn sorted_stats(groups: HashMap<i64, GroupStat>) -> Vec<GroupStat> {
    let mut stats: Vec<GroupStat> = groups.into_values().collect();
    stats.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    stats
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: BookingStatus,
    count: i64,
}

#[derive(Clone)]
pub struct ReportService {
    pool: Arc<DatabaseConnection>,
    utc_offset_hours: i32,
}

impl ReportService {
    pub fn new(pool: Arc<DatabaseConnection>, utc_offset_hours: i32) -> Self {
        Self {
            pool,
            utc_offset_hours,
        }
    }

    /// 营业所在时区的今天
    fn local_today(&self) -> NaiveDate {
        let offset =
            FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
        Utc::now().with_timezone(&offset).date_naive()
    }

    fn parse_query_date(value: Option<&str>, field: &str) -> AppResult<Option<NaiveDate>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(v) => parse_date(v).map(Some).ok_or_else(|| {
                AppError::ValidationError(format!("{field} must be a valid date in YYYY-MM-DD format"))
            }),
        }
    }

    pub async fn report(&self, query: &ReportQuery) -> AppResult<ReportResponse> {
        let end_date = Self::parse_query_date(query.end_date.as_deref(), "endDate")?
            .unwrap_or_else(|| self.local_today());
        let start_date = Self::parse_query_date(query.start_date.as_deref(), "startDate")?
            .unwrap_or_else(|| end_date - Duration::days(DEFAULT_RANGE_DAYS - 1));
        if start_date > end_date {
            return Err(AppError::ValidationError(
                "startDate must not be after endDate".to_string(),
            ));
        }

        let rows = self
            .completed_rows(start_date, end_date, query.branch_id)
            .await?;

        Ok(ReportResponse {
            start_date,
            end_date,
            branch_id: query.branch_id,
            report: aggregate_completed(&rows),
        })
    }

    /// 仪表盘: 当天各状态数量 + 当天已完成预约的统计 (与报表共用同一聚合)
    pub async fn dashboard(&self, query: &DashboardQuery) -> AppResult<DashboardResponse> {
        let date = Self::parse_query_date(query.date.as_deref(), "date")?
            .unwrap_or_else(|| self.local_today());

        let mut select = bookings::Entity::find()
            .select_only()
            .column(bookings::Column::Status)
            .column_as(Expr::val(1).count(), "count")
            .filter(bookings::Column::BookingDate.eq(date))
            .group_by(bookings::Column::Status);
        if let Some(branch_id) = query.branch_id {
            select = select.filter(bookings::Column::BranchId.eq(branch_id));
        }
        let counts = select.into_model::<StatusCountRow>().all(self.pool.as_ref()).await?;

        let mut status_counts: Vec<StatusCount> = counts
            .into_iter()
            .map(|r| StatusCount {
                status: r.status,
                count: r.count,
            })
            .collect();
        status_counts.sort_by_key(|c| c.status.as_str());
        let total_bookings = status_counts.iter().map(|c| c.count).sum();

        let rows = self.completed_rows(date, date, query.branch_id).await?;

        Ok(DashboardResponse {
            date,
            branch_id: query.branch_id,
            status_counts,
            total_bookings,
            report: aggregate_completed(&rows),
        })
    }

    async fn completed_rows(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        branch_id: Option<i64>,
    ) -> AppResult<Vec<CompletedBookingRow>> {
        let mut select = bookings::Entity::find()
            .select_only()
            .column(bookings::Column::ServiceId)
            .column_as(services::Column::Name, "service_name")
            .column(bookings::Column::BranchId)
            .column_as(branches::Column::Name, "branch_name")
            .column(bookings::Column::TotalPrice)
            .join(JoinType::InnerJoin, bookings::Relation::Service.def())
            .join(JoinType::InnerJoin, bookings::Relation::Branch.def())
            .filter(bookings::Column::Status.eq(BookingStatus::Completed))
            .filter(bookings::Column::BookingDate.between(start_date, end_date));
        if let Some(branch_id) = branch_id {
            select = select.filter(bookings::Column::BranchId.eq(branch_id));
        }

        Ok(select
            .order_by_asc(bookings::Column::BookingDate)
            .into_model::<CompletedBookingRow>()
            .all(self.pool.as_ref())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(service_id: i64, service: &str, branch_id: i64, branch: &str, price: i64) -> CompletedBookingRow {
        CompletedBookingRow {
            service_id,
            service_name: service.to_string(),
            branch_id,
            branch_name: branch.to_string(),
            total_price: price,
        }
    }

    #[test]
    fn test_aggregate_groups_by_service_and_branch() {
        let rows = vec![
            row(1, "A", 10, "Kemang", 45_000),
            row(1, "A", 11, "Depok", 45_000),
            row(2, "B", 10, "Kemang", 15_000),
        ];
        let report = aggregate_completed(&rows);

        let services: Vec<(&str, i64, i64)> = report
            .service_stats
            .iter()
            .map(|s| (s.name.as_str(), s.count, s.revenue))
            .collect();
        assert_eq!(services, vec![("A", 2, 90_000), ("B", 1, 15_000)]);

        let branches: Vec<(&str, i64, i64)> = report
            .branch_stats
            .iter()
            .map(|s| (s.name.as_str(), s.count, s.revenue))
            .collect();
        assert_eq!(branches, vec![("Kemang", 2, 60_000), ("Depok", 1, 45_000)]);

        assert_eq!(report.summary.total_revenue, 105_000);
        assert_eq!(report.summary.total_bookings, 3);
        assert_eq!(report.summary.average_booking_value, 35_000);
    }

    #[test]
    fn test_aggregate_empty() {
        let report = aggregate_completed(&[]);
        assert_eq!(report.summary, ReportSummary::default());
        assert!(report.service_stats.is_empty());
        assert!(report.branch_stats.is_empty());
    }

    #[test]
    fn test_average_is_rounded() {
        let rows = vec![
            row(1, "A", 1, "X", 10_000),
            row(1, "A", 1, "X", 10_000),
            row(2, "B", 1, "X", 10_001),
        ];
        // 30001 / 3 = 10000.33
        assert_eq!(aggregate_completed(&rows).summary.average_booking_value, 10_000);

        let rows = vec![row(1, "A", 1, "X", 1), row(1, "A", 1, "X", 2)];
        // 1.5 四舍五入
        assert_eq!(aggregate_completed(&rows).summary.average_booking_value, 2);
    }

    #[test]
    fn test_equal_revenue_ordered_by_name() {
        let rows = vec![row(2, "Wax", 1, "X", 20_000), row(1, "Polish", 1, "X", 20_000)];
        let report = aggregate_completed(&rows);
        assert_eq!(report.service_stats[0].name, "Polish");
        assert_eq!(report.service_stats[1].name, "Wax");
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let data = aggregate_completed(&[row(1, "A", 1, "X", 45_000)]);
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["summary"]["averageBookingValue"], 45_000);
        assert_eq!(value["serviceStats"][0]["revenue"], 45_000);
        assert!(value.get("branchStats").is_some());
    }

    #[tokio::test]
    async fn test_report_rejects_inverted_range() {
        let db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection();
        let service = ReportService::new(Arc::new(db), 7);
        let err = service
            .report(&ReportQuery {
                start_date: Some("2026-10-31".into()),
                end_date: Some("2026-10-01".into()),
                branch_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
