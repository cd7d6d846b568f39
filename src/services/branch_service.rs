use crate::entities::{BranchStatus, booking_entity as bookings, branch_entity as branches};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{build_branch_draft, validate_branch_draft};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct BranchService {
    pool: Arc<DatabaseConnection>,
}

impl BranchService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn list_branches(&self, query: &BranchQuery) -> AppResult<Vec<BranchResponse>> {
        let mut select = branches::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(branches::Column::Status.eq(status));
        }
        let list = select
            .order_by_asc(branches::Column::Name)
            .order_by_asc(branches::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_branch(&self, id: i64) -> AppResult<BranchResponse> {
        Ok(self.find_branch(id).await?.into())
    }

    pub(crate) async fn find_branch(&self, id: i64) -> AppResult<branches::Model> {
        branches::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Branch {id} not found")))
    }

    pub async fn create_branch(&self, request: CreateBranchRequest) -> AppResult<BranchResponse> {
        let draft = build_branch_draft(request).map_err(AppError::validation)?;
        let now = Utc::now();

        let model = branches::ActiveModel {
            name: Set(draft.name),
            address: Set(draft.address),
            phone: Set(draft.phone),
            manager: Set(draft.manager),
            staff_count: Set(draft.staff_count),
            bank_name: Set(draft.bank_name),
            bank_account_number: Set(draft.bank_account_number),
            bank_account_name: Set(draft.bank_account_name),
            open_time: Set(draft.open_time),
            close_time: Set(draft.close_time),
            pickup_radius_km: Set(draft.pickup_radius_km),
            latitude: Set(draft.latitude),
            longitude: Set(draft.longitude),
            status: Set(draft.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Branch {} '{}' created", model.id, model.name);
        Ok(model.into())
    }

    pub async fn update_branch(
        &self,
        id: i64,
        request: UpdateBranchRequest,
    ) -> AppResult<BranchResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let current = self.find_branch(id).await?;
        let draft = BranchDraft::from(&current).apply(request);
        validate_branch_draft(&draft).map_err(AppError::validation)?;

        if current.status == BranchStatus::Active && draft.status == BranchStatus::Inactive {
            log::info!("Branch {id} deactivated, new bookings will be refused");
        }

        let mut am = current.into_active_model();
        am.name = Set(draft.name.trim().to_string());
        am.address = Set(draft.address.trim().to_string());
        am.phone = Set(draft.phone.trim().to_string());
        am.manager = Set(draft.manager);
        am.staff_count = Set(draft.staff_count);
        am.bank_name = Set(draft.bank_name);
        am.bank_account_number = Set(draft.bank_account_number);
        am.bank_account_name = Set(draft.bank_account_name);
        am.open_time = Set(draft.open_time.trim().to_string());
        am.close_time = Set(draft.close_time.trim().to_string());
        am.pickup_radius_km = Set(draft.pickup_radius_km);
        am.latitude = Set(draft.latitude);
        am.longitude = Set(draft.longitude);
        am.status = Set(draft.status);
        am.updated_at = Set(Utc::now());
        let updated = am.update(self.pool.as_ref()).await?;

        Ok(updated.into())
    }

    pub async fn delete_branch(&self, id: i64) -> AppResult<()> {
        self.find_branch(id).await?;

        let references = bookings::Entity::find()
            .filter(bookings::Column::BranchId.eq(id))
            .count(self.pool.as_ref())
            .await?;
        if references > 0 {
            return Err(AppError::Conflict(format!(
                "Branch {id} has {references} booking(s) and cannot be deleted; set it inactive instead"
            )));
        }

        branches::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        log::info!("Branch {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn sample_branch() -> branches::Model {
        let now = Utc::now();
        branches::Model {
            id: 2,
            name: "Cabang Kemang".into(),
            address: "Jl. Kemang Raya 10".into(),
            phone: "0217654321".into(),
            manager: Some("Andi".into()),
            staff_count: 6,
            bank_name: Some("BCA".into()),
            bank_account_number: Some("1234567890".into()),
            bank_account_name: Some("PT Cuci Bersih".into()),
            open_time: "08:00".into(),
            close_time: "20:00".into(),
            pickup_radius_km: 5.0,
            latitude: Some(-6.26),
            longitude: Some(106.81),
            status: BranchStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_missing_branch_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<branches::Model>::new()])
            .into_connection();
        let err = BranchService::new(Arc::new(db)).get_branch(9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_branch_with_bookings_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_branch()]])
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                sea_orm::Value::from(1i64),
            )])]])
            .into_connection();
        let err = BranchService::new(Arc::new(db)).delete_branch(2).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_inverted_hours() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_branch()]])
            .into_connection();
        let err = BranchService::new(Arc::new(db))
            .update_branch(
                2,
                UpdateBranchRequest {
                    close_time: Some("07:00".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_response_groups_bank_account() {
        let response = BranchResponse::from(sample_branch());
        assert_eq!(response.bank_account.bank.as_deref(), Some("BCA"));
        assert_eq!(
            response.bank_account.account_name.as_deref(),
            Some("PT Cuci Bersih")
        );
    }
}
