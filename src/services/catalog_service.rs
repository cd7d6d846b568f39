use crate::entities::{booking_entity as bookings, wash_service_entity as services};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{build_service_draft, validate_service_draft};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

/// 洗车服务目录
#[derive(Clone)]
pub struct CatalogService {
    pool: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn list_services(&self, query: &ServiceQuery) -> AppResult<Vec<ServiceResponse>> {
        let mut select = services::Entity::find();
        if let Some(active) = query.active {
            select = select.filter(services::Column::IsActive.eq(active));
        }
        let list = select
            .order_by_asc(services::Column::Category)
            .order_by_asc(services::Column::Price)
            .order_by_asc(services::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_service(&self, id: i64) -> AppResult<ServiceResponse> {
        Ok(self.find_service(id).await?.into())
    }

    pub(crate) async fn find_service(&self, id: i64) -> AppResult<services::Model> {
        services::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {id} not found")))
    }

    pub async fn create_service(&self, request: CreateServiceRequest) -> AppResult<ServiceResponse> {
        let draft = build_service_draft(request).map_err(AppError::validation)?;
        let now = Utc::now();

        let model = services::ActiveModel {
            name: Set(draft.name),
            category: Set(draft.category),
            description: Set(draft.description),
            price: Set(draft.price),
            pickup_fee: Set(draft.pickup_fee),
            supports_pickup: Set(draft.supports_pickup),
            duration_minutes: Set(draft.duration_minutes),
            features: Set(draft.features),
            loyalty_points: Set(draft.loyalty_points),
            is_active: Set(draft.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Service {} '{}' created", model.id, model.name);
        Ok(model.into())
    }

    pub async fn update_service(
        &self,
        id: i64,
        request: UpdateServiceRequest,
    ) -> AppResult<ServiceResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let current = self.find_service(id).await?;
        // 合并后整体校验, 保证记录始终有效
        let draft = ServiceDraft::from(&current).apply(request);
        validate_service_draft(&draft).map_err(AppError::validation)?;

        let mut am = current.into_active_model();
        am.name = Set(draft.name.trim().to_string());
        am.category = Set(draft.category);
        am.description = Set(draft.description);
        am.price = Set(draft.price);
        am.pickup_fee = Set(draft.pickup_fee);
        am.supports_pickup = Set(draft.supports_pickup);
        am.duration_minutes = Set(draft.duration_minutes);
        am.features = Set(draft.features);
        am.loyalty_points = Set(draft.loyalty_points);
        am.is_active = Set(draft.is_active);
        am.updated_at = Set(Utc::now());
        let updated = am.update(self.pool.as_ref()).await?;

        Ok(updated.into())
    }

    /// 仍被预约引用的服务不能删除 (可改为停用)
    pub async fn delete_service(&self, id: i64) -> AppResult<()> {
        self.find_service(id).await?;

        let references = bookings::Entity::find()
            .filter(bookings::Column::ServiceId.eq(id))
            .count(self.pool.as_ref())
            .await?;
        if references > 0 {
            return Err(AppError::Conflict(format!(
                "Service {id} is used by {references} booking(s) and cannot be deleted; deactivate it instead"
            )));
        }

        services::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        log::info!("Service {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ServiceCategory;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;

    fn sample_service() -> services::Model {
        let now = Utc::now();
        services::Model {
            id: 1,
            name: "Cuci Mobil Reguler".into(),
            category: ServiceCategory::RegularCar,
            description: None,
            price: 35_000,
            pickup_fee: 10_000,
            supports_pickup: true,
            duration_minutes: 45,
            features: vec!["Vacuum".into()],
            loyalty_points: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", n.into())])
    }

    #[tokio::test]
    async fn test_delete_referenced_service_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_service()]])
            .append_query_results([vec![count_row(3)]])
            .into_connection();
        let catalog = CatalogService::new(Arc::new(db));

        let err = catalog.delete_service(1).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_delete_unreferenced_service() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_service()]])
            .append_query_results([vec![count_row(0)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let catalog = CatalogService::new(Arc::new(db));

        assert!(catalog.delete_service(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_update_rejected_without_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let catalog = CatalogService::new(Arc::new(db));

        let err = catalog
            .update_service(1, UpdateServiceRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_revalidates_merged_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_service()]])
            .into_connection();
        let catalog = CatalogService::new(Arc::new(db));

        let err = catalog
            .update_service(
                1,
                UpdateServiceRequest {
                    price: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
