use crate::entities::{
    BookingSource, BookingStatus, BranchStatus, LoyaltyTransactionType,
    booking_entity as bookings, branch_entity as branches, customer_entity as customers,
    loyalty_transaction_entity as ledger, wash_service_entity as services,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::customer_service::{lower_like, phone_search_variants};
use crate::utils::*;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, PostgresQueryBuilder, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 预约来源: 前台预约流程或后台手工录入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOrigin {
    Public,
    Admin,
}

impl BookingOrigin {
    pub fn initial_status(self) -> BookingStatus {
        match self {
            BookingOrigin::Public => BookingStatus::Pending,
            BookingOrigin::Admin => BookingStatus::Confirmed,
        }
    }

    pub fn source(self) -> BookingSource {
        match self {
            BookingOrigin::Public => BookingSource::Online,
            BookingOrigin::Admin => BookingSource::Offline,
        }
    }
}

#[derive(Clone)]
pub struct BookingService {
    pool: Arc<DatabaseConnection>,
    loyalty: LoyaltyRules,
    utc_offset_hours: i32,
}

impl BookingService {
    pub fn new(pool: Arc<DatabaseConnection>, loyalty: LoyaltyRules, utc_offset_hours: i32) -> Self {
        Self {
            pool,
            loyalty,
            utc_offset_hours,
        }
    }

    /// 创建预约
    ///
    /// 1. 校验请求 (一次返回全部错误)
    /// 2. 按服务目录计算金额与积分抵扣, 积分不超过客户当前余额
    /// 3. 写入预约
    /// 4. 按手机号更新客户资料 (失败只记录日志, 不影响预约结果)
    pub async fn create_booking(
        &self,
        payload: BookingPayload,
        origin: BookingOrigin,
    ) -> AppResult<BookingResponse> {
        let booking = validate_booking(&payload).map_err(AppError::validation)?;

        let service = self.find_bookable_service(booking.service_id).await?;
        let branch = self.find_bookable_branch(booking.branch_id).await?;
        if booking.is_pickup_service && !service.supports_pickup {
            return Err(AppError::ValidationError(format!(
                "Service '{}' does not offer pickup",
                service.name
            )));
        }

        let balance = self.customer_balance(&booking.customer_phone).await?;
        let quote = self.loyalty.redeem(
            service.subtotal(booking.is_pickup_service),
            booking.loyalty_points_used,
            balance,
        );
        if booking.total_price != quote.subtotal && booking.total_price != quote.total_price {
            log::warn!(
                "Client total {} differs from catalog price {} for service {}, using catalog price",
                booking.total_price,
                quote.subtotal,
                service.id
            );
        }
        let points_earned = self
            .loyalty
            .points_earned(quote.total_price, service.loyalty_points);

        let now = Utc::now();
        let model = bookings::ActiveModel {
            booking_code: Set(booking_code_now(self.utc_offset_hours)),
            customer_name: Set(booking.customer_name),
            customer_phone: Set(booking.customer_phone),
            customer_email: Set(booking.customer_email),
            service_id: Set(service.id),
            branch_id: Set(branch.id),
            booking_date: Set(booking.booking_date),
            booking_time: Set(booking.booking_time),
            total_price: Set(quote.total_price),
            is_pickup_service: Set(booking.is_pickup_service),
            pickup_address: Set(booking.pickup_address),
            pickup_notes: Set(booking.pickup_notes),
            vehicle_plate: Set(booking.vehicle_plate),
            payment_method: Set(booking.payment_method),
            payment_proof_url: Set(None),
            notes: Set(booking.notes),
            loyalty_points_used: Set(quote.points_applied),
            loyalty_points_earned: Set(points_earned),
            points_credited: Set(false),
            status: Set(origin.initial_status()),
            source: Set(origin.source()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!(
            "Booking {} ({}) created: {} {} at branch {}, total {}",
            model.id,
            model.booking_code,
            model.source,
            model.status,
            model.branch_id,
            model.total_price
        );

        if let Err(e) = self.upsert_customer(&model).await {
            log::error!(
                "Customer upsert failed for booking {} ({}): {e}",
                model.id,
                model.customer_phone
            );
        }

        let mut response = BookingResponse::from(model);
        response.service_name = Some(service.name);
        response.branch_name = Some(branch.name);
        Ok(response)
    }

    /// 价格试算, 与创建预约使用同一套规则
    pub async fn quote(&self, request: QuoteRequest) -> AppResult<QuoteResponse> {
        if request.loyalty_points_used < 0 {
            return Err(AppError::ValidationError(
                "loyalty_points_used must not be negative".to_string(),
            ));
        }
        let service = self.find_service(request.service_id).await?;

        let available_points = match request.customer_phone.as_deref() {
            Some(phone) if !phone.trim().is_empty() => {
                validate_id_phone(phone)?;
                Some(self.customer_balance(&normalize_id_phone(phone)).await?)
            }
            _ => None,
        };

        let subtotal = service.subtotal(request.is_pickup_service);
        let balance = available_points.unwrap_or(request.loyalty_points_used);
        let quote = self
            .loyalty
            .redeem(subtotal, request.loyalty_points_used, balance);

        Ok(QuoteResponse {
            subtotal: quote.subtotal,
            points_applied: quote.points_applied,
            discount: quote.discount,
            total_price: quote.total_price,
            points_earned: self
                .loyalty
                .points_earned(quote.total_price, service.loyalty_points),
            available_points,
        })
    }

    pub async fn get_booking(&self, id: i64) -> AppResult<BookingResponse> {
        let model = self.find_booking(id).await?;
        self.with_names(model).await
    }

    /// 编号可能在同一分钟内重复, 返回最新的一条
    pub async fn get_booking_by_code(&self, code: &str) -> AppResult<BookingResponse> {
        let code = code.trim().to_uppercase();
        if !is_booking_code(&code) {
            return Err(AppError::ValidationError(format!(
                "Invalid booking code '{code}'"
            )));
        }
        let model = self.find_latest_by_code(&code).await?;
        self.with_names(model).await
    }

    pub async fn list_bookings(
        &self,
        query: &BookingQuery,
    ) -> AppResult<PaginatedResponse<BookingResponse>> {
        let params = PaginationParams::new(query.page, query.limit);

        let mut errors = Vec::new();
        let mut date_param = |value: &Option<String>, field: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| {
                    let parsed = parse_date(v);
                    if parsed.is_none() {
                        errors.push(format!("{field} must be a valid date in YYYY-MM-DD format"));
                    }
                    parsed
                })
        };
        let date = date_param(&query.date, "date");
        let date_from = date_param(&query.date_from, "dateFrom");
        let date_to = date_param(&query.date_to, "dateTo");
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        let mut select = bookings::Entity::find();
        if let Some(branch_id) = query.branch_id {
            select = select.filter(bookings::Column::BranchId.eq(branch_id));
        }
        if let Some(status) = query.status {
            select = select.filter(bookings::Column::Status.eq(status));
        }
        if let Some(date) = date {
            select = select.filter(bookings::Column::BookingDate.eq(date));
        }
        if let Some(from) = date_from {
            select = select.filter(bookings::Column::BookingDate.gte(from));
        }
        if let Some(to) = date_to {
            select = select.filter(bookings::Column::BookingDate.lte(to));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let mut condition = Condition::any()
                .add(bookings::Column::BookingCode.contains(search.to_uppercase()))
                .add(lower_like(bookings::Column::CustomerName, search));
            for variant in phone_search_variants(search) {
                condition = condition.add(bookings::Column::CustomerPhone.contains(&variant));
            }
            select = select.filter(condition);
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let models = select
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;

        let items = self.with_names_batch(models).await?;
        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// 后台修改预约
    ///
    /// 状态变更必须符合流转表; 进入 completed 时发放积分 (每个预约只发放一次)。
    pub async fn update_booking(
        &self,
        id: i64,
        request: UpdateBookingRequest,
    ) -> AppResult<BookingResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }
        validate_booking_update(&request).map_err(AppError::validation)?;

        let txn = self.pool.begin().await?;
        let current = bookings::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))?;

        let mut entering_completed = false;
        if let Some(next) = request.status {
            if next != current.status {
                if !current
                    .status
                    .can_transition_to(next, current.is_pickup_service)
                {
                    return Err(AppError::Conflict(format!(
                        "Cannot change booking status from '{}' to '{}'",
                        current.status, next
                    )));
                }
                entering_completed = next == BookingStatus::Completed;
            }
        }

        if let Some(branch_id) = request.branch_id {
            if branch_id != current.branch_id {
                let branch = branches::Entity::find_by_id(branch_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Branch {branch_id} not found")))?;
                if branch.status != BranchStatus::Active {
                    return Err(AppError::ValidationError(format!(
                        "Branch '{}' is not accepting bookings",
                        branch.name
                    )));
                }
            }
        }

        let previous_status = current.status;
        let mut am = current.into_active_model();
        if let Some(status) = request.status {
            am.status = Set(status);
        }
        if let Some(date) = request.booking_date.as_deref().and_then(parse_date) {
            am.booking_date = Set(date);
        }
        if let Some(time) = request.booking_time {
            am.booking_time = Set(time.trim().to_string());
        }
        if let Some(branch_id) = request.branch_id {
            am.branch_id = Set(branch_id);
        }
        if let Some(name) = request.customer_name {
            am.customer_name = Set(name.trim().to_string());
        }
        if let Some(email) = request.customer_email {
            am.customer_email = Set(email.trim().to_string());
        }
        if let Some(plate) = request.vehicle_plate {
            am.vehicle_plate = Set(normalize_plate(&plate));
        }
        if let Some(address) = request.pickup_address {
            am.pickup_address = Set(address);
        }
        if let Some(notes) = request.pickup_notes {
            am.pickup_notes = Set(notes);
        }
        if let Some(method) = request.payment_method {
            am.payment_method = Set(method.trim().to_string());
        }
        if let Some(url) = request.payment_proof_url {
            am.payment_proof_url = Set(url);
        }
        if let Some(notes) = request.notes {
            am.notes = Set(notes);
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;

        if entering_completed {
            self.credit_completion(&txn, &updated).await?;
        }
        txn.commit().await?;

        if updated.status != previous_status {
            log::info!(
                "Booking {} status {} -> {}",
                updated.id,
                previous_status,
                updated.status
            );
        }

        self.with_names(updated).await
    }

    /// 前台上传付款凭证后回写地址 (仅限待确认的预约)
    pub async fn attach_payment_proof(
        &self,
        code: &str,
        request: PaymentProofRequest,
    ) -> AppResult<BookingResponse> {
        let url = request.payment_proof_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::ValidationError(
                "payment_proof_url must be an http(s) URL".to_string(),
            ));
        }
        let code = code.trim().to_uppercase();
        if !is_booking_code(&code) {
            return Err(AppError::ValidationError(format!(
                "Invalid booking code '{code}'"
            )));
        }

        let current = self.find_latest_by_code(&code).await?;
        if current.status != BookingStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Payment proof can only be attached to a pending booking (current status '{}')",
                current.status
            )));
        }

        let mut am = current.into_active_model();
        am.payment_proof_url = Set(Some(url.to_string()));
        am.updated_at = Set(Utc::now());
        let updated = am.update(self.pool.as_ref()).await?;
        log::info!("Payment proof attached to booking {}", updated.id);

        self.with_names(updated).await
    }

    /// 只有 pending / cancelled 的预约可以删除
    pub async fn delete_booking(&self, id: i64) -> AppResult<()> {
        let booking = self.find_booking(id).await?;
        if !booking.status.is_deletable() {
            return Err(AppError::Conflict(format!(
                "Cannot delete booking {} with status '{}'; only pending or cancelled bookings can be deleted",
                booking.booking_code, booking.status
            )));
        }

        bookings::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        log::info!("Booking {} ({}) deleted", id, booking.booking_code);
        Ok(())
    }

    /// 完成积分发放
    ///
    /// 先锁定客户行, 再用条件更新把 points_credited 从 false 改为 true, 只有真正改到一行时才加分,
    /// 重复请求不会重复发放。找不到客户时按预约的联系信息建档, 积分不会丢失。
    /// 需在调用方的事务中执行。返回本次是否发放。
    async fn credit_completion<C: ConnectionTrait>(
        &self,
        db: &C,
        booking: &bookings::Model,
    ) -> AppResult<bool> {
        if booking.loyalty_points_earned <= 0 {
            return Self::claim_credit(db, booking.id).await;
        }

        let customer = customers::Entity::find()
            .filter(customers::Column::Phone.eq(booking.customer_phone.as_str()))
            .lock_exclusive()
            .one(db)
            .await?;

        if !Self::claim_credit(db, booking.id).await? {
            log::info!("Points for booking {} already credited", booking.id);
            return Ok(false);
        }

        let now = Utc::now();
        let (customer_id, balance_after) = match customer {
            Some(customer) => {
                let balance_after = customer.total_loyalty_points + booking.loyalty_points_earned;
                let customer_id = customer.id;
                let mut am = customer.into_active_model();
                am.total_loyalty_points = Set(balance_after);
                am.updated_at = Set(now);
                am.update(db).await?;
                (customer_id, balance_after)
            }
            None => {
                log::warn!(
                    "No customer with phone {} for booking {}, creating one from the booking",
                    booking.customer_phone,
                    booking.id
                );
                let created = customers::ActiveModel {
                    name: Set(booking.customer_name.clone()),
                    phone: Set(booking.customer_phone.clone()),
                    email: Set(Some(booking.customer_email.clone())),
                    vehicle_plates: Set(vec![booking.vehicle_plate.clone()]),
                    total_bookings: Set(1),
                    total_loyalty_points: Set(booking.loyalty_points_earned),
                    joined_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                (created.id, created.total_loyalty_points)
            }
        };

        ledger::Entity::insert(ledger::ActiveModel {
            customer_id: Set(customer_id),
            booking_id: Set(Some(booking.id)),
            transaction_type: Set(LoyaltyTransactionType::Earn),
            points: Set(booking.loyalty_points_earned),
            balance_after: Set(balance_after),
            description: Set(Some(format!("Completed booking {}", booking.booking_code))),
            created_at: Set(now),
            ..Default::default()
        })
        .exec_without_returning(db)
        .await?;

        log::info!(
            "Credited {} points to customer {} for booking {}",
            booking.loyalty_points_earned,
            customer_id,
            booking.id
        );
        Ok(true)
    }

    /// points_credited: false -> true, 命中一行才算取得发放权
    async fn claim_credit<C: ConnectionTrait>(db: &C, booking_id: i64) -> AppResult<bool> {
        let guard = bookings::Entity::update_many()
            .col_expr(bookings::Column::PointsCredited, Expr::value(true))
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::PointsCredited.eq(false))
            .exec(db)
            .await?;
        Ok(guard.rows_affected > 0)
    }

    /// 按手机号创建或更新客户
    ///
    /// 插入冲突时锁定已有记录再更新, 同一手机号的并发预约不会产生重复客户。
    async fn upsert_customer(&self, booking: &bookings::Model) -> AppResult<()> {
        let txn = self.pool.begin().await?;
        let now = Utc::now();

        let insert = Query::insert()
            .into_table(customers::Entity)
            .columns([
                customers::Column::Name,
                customers::Column::Phone,
                customers::Column::Email,
                customers::Column::VehiclePlates,
                customers::Column::TotalBookings,
                customers::Column::TotalLoyaltyPoints,
                customers::Column::JoinedAt,
                customers::Column::UpdatedAt,
            ])
            .values_panic([
                booking.customer_name.clone().into(),
                booking.customer_phone.clone().into(),
                booking.customer_email.clone().into(),
                vec![booking.vehicle_plate.clone()].into(),
                1i64.into(),
                0i64.into(),
                now.into(),
                now.into(),
            ])
            .on_conflict(
                OnConflict::column(customers::Column::Phone)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        let (sql, values) = insert.build(PostgresQueryBuilder);
        let stmt = sea_orm::Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            values,
        );
        let res = txn.execute(stmt).await?;
        if res.rows_affected() > 0 {
            // 新客户余额为 0, 不会有积分抵扣
            txn.commit().await?;
            log::info!("New customer {} created from booking", booking.customer_phone);
            return Ok(());
        }

        let existing = customers::Entity::find()
            .filter(customers::Column::Phone.eq(booking.customer_phone.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Customer {} vanished during upsert",
                    booking.customer_phone
                ))
            })?;

        let debit = booking
            .loyalty_points_used
            .min(existing.total_loyalty_points)
            .max(0);
        if debit < booking.loyalty_points_used {
            log::warn!(
                "Customer {} balance {} below redeemed {} for booking {}",
                existing.id,
                existing.total_loyalty_points,
                booking.loyalty_points_used,
                booking.id
            );
        }
        let balance_after = existing.total_loyalty_points - debit;
        let customer_id = existing.id;
        let plates = merge_vehicle_plates(&existing.vehicle_plates, &booking.vehicle_plate);
        let total_bookings = existing.total_bookings + 1;

        let mut am = existing.into_active_model();
        am.name = Set(booking.customer_name.clone());
        am.email = Set(Some(booking.customer_email.clone()));
        am.vehicle_plates = Set(plates);
        am.total_bookings = Set(total_bookings);
        am.total_loyalty_points = Set(balance_after);
        am.updated_at = Set(now);
        am.update(&txn).await?;

        if debit > 0 {
            ledger::Entity::insert(ledger::ActiveModel {
                customer_id: Set(customer_id),
                booking_id: Set(Some(booking.id)),
                transaction_type: Set(LoyaltyTransactionType::Redeem),
                points: Set(debit),
                balance_after: Set(balance_after),
                description: Set(Some(format!("Redeemed on booking {}", booking.booking_code))),
                created_at: Set(now),
                ..Default::default()
            })
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn customer_balance(&self, phone: &str) -> AppResult<i64> {
        Ok(customers::Entity::find()
            .filter(customers::Column::Phone.eq(phone))
            .one(self.pool.as_ref())
            .await?
            .map(|c| c.total_loyalty_points)
            .unwrap_or(0))
    }

    async fn find_booking(&self, id: i64) -> AppResult<bookings::Model> {
        bookings::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))
    }

    async fn find_latest_by_code(&self, code: &str) -> AppResult<bookings::Model> {
        bookings::Entity::find()
            .filter(bookings::Column::BookingCode.eq(code))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {code} not found")))
    }

    async fn find_service(&self, id: i64) -> AppResult<services::Model> {
        services::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service {id} not found")))
    }

    async fn find_bookable_service(&self, id: i64) -> AppResult<services::Model> {
        let service = self.find_service(id).await?;
        if !service.is_active {
            return Err(AppError::ValidationError(format!(
                "Service '{}' is not available",
                service.name
            )));
        }
        Ok(service)
    }

    async fn find_bookable_branch(&self, id: i64) -> AppResult<branches::Model> {
        let branch = branches::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Branch {id} not found")))?;
        if branch.status != BranchStatus::Active {
            return Err(AppError::ValidationError(format!(
                "Branch '{}' is not accepting bookings",
                branch.name
            )));
        }
        Ok(branch)
    }

    async fn with_names(&self, model: bookings::Model) -> AppResult<BookingResponse> {
        let mut items = self.with_names_batch(vec![model]).await?;
        items
            .pop()
            .ok_or_else(|| AppError::InternalError("Booking lost while loading names".to_string()))
    }

    /// 批量补充服务名与分店名
    async fn with_names_batch(&self, models: Vec<bookings::Model>) -> AppResult<Vec<BookingResponse>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let mut service_ids: Vec<i64> = models.iter().map(|m| m.service_id).collect();
        service_ids.sort_unstable();
        service_ids.dedup();
        let mut branch_ids: Vec<i64> = models.iter().map(|m| m.branch_id).collect();
        branch_ids.sort_unstable();
        branch_ids.dedup();

        let service_names: HashMap<i64, String> = services::Entity::find()
            .filter(services::Column::Id.is_in(service_ids))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();
        let branch_names: HashMap<i64, String> = branches::Entity::find()
            .filter(branches::Column::Id.is_in(branch_ids))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect();

        Ok(models
            .into_iter()
            .map(|m| {
                let service_name = service_names.get(&m.service_id).cloned();
                let branch_name = branch_names.get(&m.branch_id).cloned();
                let mut response = BookingResponse::from(m);
                response.service_name = service_name;
                response.branch_name = branch_name;
                response
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ServiceCategory;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn sample_booking(status: BookingStatus, is_pickup: bool) -> bookings::Model {
        let now = Utc::now();
        bookings::Model {
            id: 42,
            booking_code: "BCW2610200930".into(),
            customer_name: "Budi Santoso".into(),
            customer_phone: "+6281234567890".into(),
            customer_email: "budi@example.com".into(),
            service_id: 1,
            branch_id: 2,
            booking_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            booking_time: "09:30".into(),
            total_price: 45_000,
            is_pickup_service: is_pickup,
            pickup_address: is_pickup.then(|| "Jl. Sudirman 1".to_string()),
            pickup_notes: None,
            vehicle_plate: "B 1234 XYZ".into(),
            payment_method: "transfer".into(),
            payment_proof_url: None,
            notes: None,
            loyalty_points_used: 0,
            loyalty_points_earned: 4,
            points_credited: false,
            status,
            source: BookingSource::Online,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_service(is_active: bool, supports_pickup: bool) -> services::Model {
        let now = Utc::now();
        services::Model {
            id: 1,
            name: "Cuci Mobil Reguler".into(),
            category: ServiceCategory::RegularCar,
            description: None,
            price: 35_000,
            pickup_fee: 10_000,
            supports_pickup,
            duration_minutes: 45,
            features: vec![],
            loyalty_points: None,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn booking_service(db: DatabaseConnection) -> BookingService {
        BookingService::new(Arc::new(db), LoyaltyRules::default(), 7)
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[test]
    fn test_origin_sets_status_and_source() {
        assert_eq!(BookingOrigin::Public.initial_status(), BookingStatus::Pending);
        assert_eq!(BookingOrigin::Public.source(), BookingSource::Online);
        assert_eq!(BookingOrigin::Admin.initial_status(), BookingStatus::Confirmed);
        assert_eq!(BookingOrigin::Admin.source(), BookingSource::Offline);
    }

    #[tokio::test]
    async fn test_create_with_invalid_payload_touches_no_storage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = booking_service(db)
            .create_booking(BookingPayload::default(), BookingOrigin::Public)
            .await
            .unwrap_err();
        match err {
            AppError::ValidationError(msg) => {
                assert!(msg.contains("customer_name is required"));
                assert!(msg.contains("; "));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_inactive_service() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_service(false, true)]])
            .into_connection();
        let payload = BookingPayload {
            customer_name: Some("Budi".into()),
            customer_phone: Some("081234567890".into()),
            customer_email: Some("budi@example.com".into()),
            service_id: Some(1),
            branch_id: Some(2),
            booking_date: Some("2026-10-20".into()),
            booking_time: Some("09:30".into()),
            total_price: Some(35_000.0),
            is_pickup_service: Some(false),
            vehicle_plate: Some("B 1 A".into()),
            payment_method: Some("cash".into()),
            ..Default::default()
        };
        let err = booking_service(db)
            .create_booking(payload, BookingOrigin::Public)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_quote_caps_points_by_balance() {
        let now = Utc::now();
        let customer = customers::Model {
            id: 5,
            name: "Budi".into(),
            phone: "+6281234567890".into(),
            email: None,
            vehicle_plates: vec![],
            total_bookings: 2,
            total_loyalty_points: 12,
            joined_at: now,
            updated_at: now,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_service(true, true)]])
            .append_query_results([vec![customer]])
            .into_connection();

        let quote = booking_service(db)
            .quote(QuoteRequest {
                service_id: 1,
                is_pickup_service: true,
                loyalty_points_used: 30,
                customer_phone: Some("081234567890".into()),
            })
            .await
            .unwrap();
        assert_eq!(quote.subtotal, 45_000);
        assert_eq!(quote.points_applied, 12);
        assert_eq!(quote.discount, 12_000);
        assert_eq!(quote.total_price, 33_000);
        assert_eq!(quote.points_earned, 3);
        assert_eq!(quote.available_points, Some(12));
    }

    #[tokio::test]
    async fn test_delete_rejects_active_statuses() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::PickedUp,
            BookingStatus::InProgress,
            BookingStatus::Completed,
        ] {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![sample_booking(status, true)]])
                .into_connection();
            match booking_service(db).delete_booking(42).await {
                Err(AppError::Conflict(msg)) => assert!(msg.contains(status.as_str()), "{msg}"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_delete_pending_booking() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_booking(BookingStatus::Pending, false)]])
            .append_exec_results([exec(1)])
            .into_connection();
        assert!(booking_service(db).delete_booking(42).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_disallowed_transition() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_booking(BookingStatus::Completed, false)]])
            .into_connection();
        let err = booking_service(db)
            .update_booking(
                42,
                UpdateBookingRequest {
                    status: Some(BookingStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(msg) => {
                assert!(msg.contains("completed") && msg.contains("cancelled"), "{msg}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_rejects_skipping_pickup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_booking(BookingStatus::Confirmed, true)]])
            .into_connection();
        let err = booking_service(db)
            .update_booking(
                42,
                UpdateBookingRequest {
                    status: Some(BookingStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = booking_service(db)
            .update_booking(42, UpdateBookingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    fn sample_customer(balance: i64, plates: &[&str]) -> customers::Model {
        let now = Utc::now();
        customers::Model {
            id: 5,
            name: "Budi".into(),
            phone: "+6281234567890".into(),
            email: None,
            vehicle_plates: plates.iter().map(|p| p.to_string()).collect(),
            total_bookings: 3,
            total_loyalty_points: balance,
            joined_at: now,
            updated_at: now,
        }
    }

    fn idle_service() -> BookingService {
        booking_service(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    /// 事务日志转成便于断言的文本 (SQL 中的引号去掉转义)
    fn statements(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .map(|t| format!("{t:?}").replace("\\\"", "\""))
            .collect()
    }

    fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<String> {
        statements(Arc::try_unwrap(db).ok().expect("connection still shared"))
    }

    #[tokio::test]
    async fn test_completion_credit_is_skipped_when_already_credited() {
        // 条件更新没有命中任何行: 不改客户, 也不写流水
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_customer(10, &[])]])
            .append_exec_results([exec(0)])
            .into_connection();
        let mut booking = sample_booking(BookingStatus::Completed, false);
        booking.points_credited = true;

        let credited = idle_service().credit_completion(&db, &booking).await.unwrap();
        assert!(!credited);

        assert_eq!(statements(db).len(), 2);
    }

    #[tokio::test]
    async fn test_completion_credit_without_points_only_sets_flag() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1)])
            .into_connection();
        let mut booking = sample_booking(BookingStatus::Completed, false);
        booking.loyalty_points_earned = 0;

        assert!(idle_service().credit_completion(&db, &booking).await.unwrap());
        assert_eq!(statements(db).len(), 1);
    }

    #[tokio::test]
    async fn test_completion_credits_customer_and_writes_earn_row() {
        let mut credited_customer = sample_customer(14, &["B 1234 XYZ"]);
        credited_customer.updated_at = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_customer(10, &["B 1234 XYZ"])]])
            .append_exec_results([exec(1)])
            .append_query_results([vec![credited_customer]])
            .append_exec_results([exec(1)])
            .into_connection();
        let booking = sample_booking(BookingStatus::Completed, false);

        assert!(idle_service().credit_completion(&db, &booking).await.unwrap());

        let log = statements(db);
        assert_eq!(log.len(), 4);
        assert!(log[0].contains(r#"FROM "customers""#), "{}", log[0]);
        assert!(log[0].contains("FOR UPDATE"), "{}", log[0]);
        assert!(log[1].contains(r#"UPDATE "bookings""#), "{}", log[1]);
        assert!(log[1].contains(r#""points_credited""#), "{}", log[1]);
        // 10 + 4
        assert!(log[2].contains(r#"UPDATE "customers""#), "{}", log[2]);
        assert!(log[2].contains("BigInt(Some(14))"), "{}", log[2]);
        assert!(log[3].contains(r#"INSERT INTO "loyalty_transactions""#), "{}", log[3]);
        assert!(log[3].contains(r#"String(Some("earn"))"#), "{}", log[3]);
        assert!(log[3].contains("BigInt(Some(14))"), "{}", log[3]);
    }

    #[tokio::test]
    async fn test_completion_for_unknown_phone_creates_customer_with_points() {
        let mut created = sample_customer(4, &["B 1234 XYZ"]);
        created.id = 9;
        created.total_bookings = 1;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .append_exec_results([exec(1)])
            .append_query_results([vec![created]])
            .append_exec_results([exec(1)])
            .into_connection();
        let booking = sample_booking(BookingStatus::Completed, false);

        assert!(idle_service().credit_completion(&db, &booking).await.unwrap());

        let log = statements(db);
        assert_eq!(log.len(), 4);
        assert!(log[2].contains(r#"INSERT INTO "customers""#), "{}", log[2]);
        assert!(log[2].contains(r#"String(Some("+6281234567890"))"#), "{}", log[2]);
        assert!(log[2].contains("BigInt(Some(4))"), "{}", log[2]);
        assert!(log[3].contains(r#"INSERT INTO "loyalty_transactions""#), "{}", log[3]);
        assert!(log[3].contains("BigInt(Some(9))"), "{}", log[3]);
    }

    #[tokio::test]
    async fn test_create_booking_stores_code_price_and_points() {
        let mut service = sample_service(true, false);
        service.price = 45_000;
        let now = Utc::now();
        let branch = branches::Model {
            id: 2,
            name: "Cabang Kemang".into(),
            address: "Jl. Kemang Raya 10".into(),
            phone: "0217654321".into(),
            manager: None,
            staff_count: 4,
            bank_name: None,
            bank_account_number: None,
            bank_account_name: None,
            open_time: "08:00".into(),
            close_time: "20:00".into(),
            pickup_radius_km: 5.0,
            latitude: None,
            longitude: None,
            status: BranchStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![service]])
                .append_query_results([vec![branch]])
                .append_query_results([Vec::<customers::Model>::new()])
                .append_query_results([vec![sample_booking(BookingStatus::Pending, false)]])
                // 新手机号, 插入客户成功
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let bookings_service = BookingService::new(db.clone(), LoyaltyRules::default(), 7);

        let payload = BookingPayload {
            customer_name: Some("Budi Santoso".into()),
            customer_phone: Some("081234567890".into()),
            customer_email: Some("budi@example.com".into()),
            service_id: Some(1),
            branch_id: Some(2),
            booking_date: Some("2026-10-20".into()),
            booking_time: Some("09:30".into()),
            total_price: Some(45_000.0),
            is_pickup_service: Some(false),
            vehicle_plate: Some("b 1234 xyz".into()),
            payment_method: Some("transfer".into()),
            ..Default::default()
        };
        let response = bookings_service
            .create_booking(payload, BookingOrigin::Public)
            .await
            .unwrap();
        assert_eq!(response.branch_name.as_deref(), Some("Cabang Kemang"));
        drop(bookings_service);

        let log = transaction_log(db);
        assert_eq!(log.len(), 5);
        let insert = &log[3];
        assert!(insert.contains(r#"INSERT INTO "bookings""#), "{insert}");
        let code = regex::Regex::new(r#"String\(Some\("BCW\d{10}"\)\)"#).unwrap();
        assert!(code.is_match(insert), "{insert}");
        assert!(insert.contains(r#"String(Some("+6281234567890"))"#), "{insert}");
        assert!(insert.contains("BigInt(Some(45000))"), "{insert}");
        // floor(45000 / 10000)
        assert!(insert.contains("BigInt(Some(4))"), "{insert}");
        assert!(insert.contains(r#"String(Some("pending"))"#), "{insert}");
        assert!(insert.contains(r#"String(Some("online"))"#), "{insert}");
        assert!(log[4].contains(r#"ON CONFLICT ("phone") DO NOTHING"#), "{}", log[4]);
    }

    #[tokio::test]
    async fn test_repeat_phone_updates_single_customer() {
        // (已有车牌, 本次车牌, 合并后的车牌)
        let cases = [
            (vec!["B 1 A"], "D 2 C", r#"[String(Some("B 1 A")), String(Some("D 2 C"))]"#),
            (vec!["B 1 A", "D 2 C"], "D 2 C", r#"[String(Some("B 1 A")), String(Some("D 2 C"))]"#),
        ];
        for (existing_plates, plate, merged) in cases {
            let existing = sample_customer(10, &existing_plates);
            let mut updated = existing.clone();
            updated.total_bookings = 4;
            updated.total_loyalty_points = 7;
            let db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    // 手机号已存在, ON CONFLICT 未插入
                    .append_exec_results([exec(0)])
                    .append_query_results([vec![existing]])
                    .append_query_results([vec![updated]])
                    .append_exec_results([exec(1)])
                    .into_connection(),
            );
            let service = BookingService::new(db.clone(), LoyaltyRules::default(), 7);
            let mut booking = sample_booking(BookingStatus::Pending, false);
            booking.vehicle_plate = plate.to_string();
            booking.loyalty_points_used = 3;

            service.upsert_customer(&booking).await.unwrap();
            drop(service);

            let log = transaction_log(db);
            // 整个 upsert 在同一个事务中
            assert_eq!(log.len(), 1);
            let txn = &log[0];
            assert!(txn.contains(r#"ON CONFLICT ("phone") DO NOTHING"#), "{txn}");
            assert!(txn.contains("FOR UPDATE"), "{txn}");
            assert!(txn.contains(r#"UPDATE "customers""#), "{txn}");
            assert!(txn.contains(merged), "{txn}");
            assert!(!txn.contains(r#"String(Some("D 2 C")), String(Some("D 2 C"))"#), "{txn}");
            // total_bookings 3 -> 4, 余额 10 - 3
            assert!(txn.contains("BigInt(Some(4))"), "{txn}");
            assert!(txn.contains("BigInt(Some(7))"), "{txn}");
            assert!(txn.contains(r#"String(Some("redeem"))"#), "{txn}");
        }
    }

    #[tokio::test]
    async fn test_by_code_rejects_malformed_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = booking_service(db)
            .get_booking_by_code("ABC123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_payment_proof_only_for_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_booking(BookingStatus::Confirmed, false)]])
            .into_connection();
        let err = booking_service(db)
            .attach_payment_proof(
                "bcw2610200930",
                PaymentProofRequest {
                    payment_proof_url: "https://files.example.com/proof.jpg".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
