use crate::entities::{
    LoyaltyTransactionType, booking_entity as bookings, customer_entity as customers,
    loyalty_transaction_entity as ledger,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{
    LoyaltyRules, is_valid_email, is_valid_id_phone, normalize_id_phone, normalize_plates,
    validate_id_phone, validate_new_customer,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct CustomerService {
    pool: Arc<DatabaseConnection>,
    loyalty: LoyaltyRules,
}

/// 小写模糊匹配
pub(crate) fn lower_like<C: ColumnTrait>(column: C, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", pattern.to_lowercase()))
}

/// 以 0 开头的纯数字搜索词同时按 +62 格式匹配
pub(crate) fn phone_search_variants(search: &str) -> Vec<String> {
    let mut variants = vec![search.to_string()];
    if search.chars().all(|c| c.is_ascii_digit()) {
        if let Some(rest) = search.strip_prefix('0') {
            variants.push(format!("+62{rest}"));
        }
    }
    variants
}

impl CustomerService {
    pub fn new(pool: Arc<DatabaseConnection>, loyalty: LoyaltyRules) -> Self {
        Self { pool, loyalty }
    }

    pub async fn list_customers(
        &self,
        query: &CustomerQuery,
    ) -> AppResult<PaginatedResponse<CustomerResponse>> {
        let params = PaginationParams::new(query.page, query.limit);

        let mut select = customers::Entity::find();
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let mut condition = Condition::any()
                .add(lower_like(customers::Column::Name, search))
                .add(lower_like(customers::Column::Email, search));
            for variant in phone_search_variants(search) {
                condition = condition.add(customers::Column::Phone.contains(&variant));
            }
            select = select.filter(condition);
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let items = select
            .order_by_desc(customers::Column::JoinedAt)
            .order_by_desc(customers::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    pub async fn get_customer(&self, id: i64) -> AppResult<CustomerResponse> {
        Ok(self.find_customer(id).await?.into())
    }

    async fn find_customer(&self, id: i64) -> AppResult<customers::Model> {
        customers::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {id} not found")))
    }

    /// 前台查询积分余额; 未登记的手机号余额为 0
    pub async fn get_points_by_phone(&self, phone: &str) -> AppResult<CustomerPointsResponse> {
        validate_id_phone(phone)?;
        let phone = normalize_id_phone(phone);

        let balance = customers::Entity::find()
            .filter(customers::Column::Phone.eq(phone.as_str()))
            .one(self.pool.as_ref())
            .await?
            .map(|c| c.total_loyalty_points)
            .unwrap_or(0);

        Ok(CustomerPointsResponse {
            phone,
            total_loyalty_points: balance,
            point_value: self.loyalty.point_value,
        })
    }

    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> AppResult<CustomerResponse> {
        let customer = validate_new_customer(&request).map_err(AppError::validation)?;

        let existing = customers::Entity::find()
            .filter(customers::Column::Phone.eq(customer.phone.as_str()))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "A customer with phone {} already exists",
                customer.phone
            )));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let model = customers::ActiveModel {
            name: Set(customer.name),
            phone: Set(customer.phone),
            email: Set(customer.email),
            vehicle_plates: Set(customer.vehicle_plates),
            total_bookings: Set(0),
            total_loyalty_points: Set(customer.total_loyalty_points),
            joined_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 迁移进来的初始积分也记一笔流水
        if model.total_loyalty_points > 0 {
            ledger::Entity::insert(ledger::ActiveModel {
                customer_id: Set(model.id),
                booking_id: Set(None),
                transaction_type: Set(LoyaltyTransactionType::Earn),
                points: Set(model.total_loyalty_points),
                balance_after: Set(model.total_loyalty_points),
                description: Set(Some("Opening balance".to_string())),
                created_at: Set(now),
                ..Default::default()
            })
            .exec_without_returning(&txn)
            .await?;
        }
        txn.commit().await?;

        log::info!("Customer {} created ({})", model.id, model.phone);
        Ok(model.into())
    }

    pub async fn update_customer(
        &self,
        id: i64,
        request: UpdateCustomerRequest,
    ) -> AppResult<CustomerResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut errors = Vec::new();
        if matches!(&request.name, Some(name) if name.trim().is_empty()) {
            errors.push("name must not be empty".to_string());
        }
        if matches!(&request.phone, Some(phone) if !is_valid_id_phone(phone)) {
            errors.push("phone must be an Indonesian mobile number".to_string());
        }
        if matches!(&request.email, Some(Some(email)) if !is_valid_email(email)) {
            errors.push("email must be a valid email address".to_string());
        }
        if request.points_adjustment == Some(0) {
            errors.push("points_adjustment must not be zero".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        let txn = self.pool.begin().await?;
        let current = customers::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {id} not found")))?;

        let phone = request.phone.as_deref().map(normalize_id_phone);
        if let Some(phone) = &phone {
            if *phone != current.phone {
                let taken = customers::Entity::find()
                    .filter(customers::Column::Phone.eq(phone.as_str()))
                    .filter(customers::Column::Id.ne(id))
                    .one(&txn)
                    .await?;
                if taken.is_some() {
                    return Err(AppError::Conflict(format!(
                        "A customer with phone {phone} already exists"
                    )));
                }
            }
        }

        let now = Utc::now();
        let adjustment = request.points_adjustment.unwrap_or(0);
        let new_balance = current.total_loyalty_points + adjustment;
        if new_balance < 0 {
            return Err(AppError::ValidationError(format!(
                "points_adjustment would make the balance negative (current balance {})",
                current.total_loyalty_points
            )));
        }

        let previous_phone = current.phone.clone();
        let mut am = current.into_active_model();
        if let Some(name) = request.name {
            am.name = Set(name.trim().to_string());
        }
        if let Some(phone) = phone {
            am.phone = Set(phone);
        }
        if let Some(email) = request.email {
            am.email = Set(email.map(|e| e.trim().to_string()));
        }
        if let Some(plates) = request.vehicle_plates {
            am.vehicle_plates = Set(normalize_plates(&plates));
        }
        if adjustment != 0 {
            am.total_loyalty_points = Set(new_balance);
        }
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        // 预约按手机号关联客户, 换号后一并迁移, 完成积分仍能找到该客户
        if updated.phone != previous_phone {
            let moved = bookings::Entity::update_many()
                .col_expr(bookings::Column::CustomerPhone, Expr::value(updated.phone.clone()))
                .filter(bookings::Column::CustomerPhone.eq(previous_phone.as_str()))
                .exec(&txn)
                .await?;
            log::info!(
                "Customer {id} phone changed, {} bookings moved to the new number",
                moved.rows_affected
            );
        }

        if adjustment != 0 {
            let transaction_type = if adjustment > 0 {
                LoyaltyTransactionType::Earn
            } else {
                LoyaltyTransactionType::Redeem
            };
            let description = request
                .adjustment_note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Manual adjustment".to_string());
            ledger::Entity::insert(ledger::ActiveModel {
                customer_id: Set(updated.id),
                booking_id: Set(None),
                transaction_type: Set(transaction_type),
                points: Set(adjustment.abs()),
                balance_after: Set(new_balance),
                description: Set(Some(description)),
                created_at: Set(now),
                ..Default::default()
            })
            .exec_without_returning(&txn)
            .await?;
            log::info!("Customer {id} points adjusted by {adjustment}, balance {new_balance}");
        }

        txn.commit().await?;
        Ok(updated.into())
    }

    pub async fn list_loyalty_transactions(
        &self,
        customer_id: i64,
        query: &LoyaltyTransactionQuery,
    ) -> AppResult<PaginatedResponse<LoyaltyTransactionResponse>> {
        self.find_customer(customer_id).await?;
        let params = PaginationParams::new(query.page, query.limit);

        let select = ledger::Entity::find().filter(ledger::Column::CustomerId.eq(customer_id));
        let total = select.clone().count(self.pool.as_ref()).await?;
        let items = select
            .order_by_desc(ledger::Column::CreatedAt)
            .order_by_desc(ledger::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn sample_customer(points: i64) -> customers::Model {
        let now = Utc::now();
        customers::Model {
            id: 5,
            name: "Budi".into(),
            phone: "+6281234567890".into(),
            email: Some("budi@example.com".into()),
            vehicle_plates: vec!["B 1234 XYZ".into()],
            total_bookings: 3,
            total_loyalty_points: points,
            joined_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_phone_search_variants() {
        assert_eq!(
            phone_search_variants("0812"),
            vec!["0812".to_string(), "+62812".to_string()]
        );
        assert_eq!(phone_search_variants("budi"), vec!["budi".to_string()]);
    }

    #[tokio::test]
    async fn test_points_for_unknown_phone_is_zero() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();
        let service = CustomerService::new(Arc::new(db), LoyaltyRules::default());

        let points = service.get_points_by_phone("081234567890").await.unwrap();
        assert_eq!(points.phone, "+6281234567890");
        assert_eq!(points.total_loyalty_points, 0);
        assert_eq!(points.point_value, 1_000);
    }

    #[tokio::test]
    async fn test_points_lookup_rejects_bad_phone() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = CustomerService::new(Arc::new(db), LoyaltyRules::default());
        assert!(matches!(
            service.get_points_by_phone("12345").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_phone_conflicts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_customer(0)]])
            .into_connection();
        let service = CustomerService::new(Arc::new(db), LoyaltyRules::default());

        let err = service
            .create_customer(CreateCustomerRequest {
                name: Some("Budi".into()),
                phone: Some("0812 3456 7890".into()),
                email: None,
                vehicle_plates: vec![],
                total_loyalty_points: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_adjustment_cannot_go_negative() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_customer(4)]])
            .into_connection();
        let service = CustomerService::new(Arc::new(db), LoyaltyRules::default());

        let err = service
            .update_customer(
                5,
                UpdateCustomerRequest {
                    points_adjustment: Some(-10),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_phone_change_moves_bookings_to_new_number() {
        let mut renumbered = sample_customer(4);
        renumbered.phone = "+6281111112222".into();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![sample_customer(4)]])
                .append_query_results([Vec::<customers::Model>::new()])
                .append_query_results([vec![renumbered]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );
        let service = CustomerService::new(db.clone(), LoyaltyRules::default());

        let updated = service
            .update_customer(
                5,
                UpdateCustomerRequest {
                    phone: Some("081111112222".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone, "+6281111112222");
        drop(service);

        let log = Arc::try_unwrap(db)
            .ok()
            .expect("connection still shared")
            .into_transaction_log();
        assert_eq!(log.len(), 1);
        let txn = format!("{:?}", log[0]).replace("\\\"", "\"");
        assert!(txn.contains(r#"UPDATE "bookings" SET "customer_phone""#), "{txn}");
        assert!(txn.contains(r#"String(Some("+6281234567890"))"#), "{txn}");
        assert!(txn.contains(r#"String(Some("+6281111112222"))"#), "{txn}");
    }
}
