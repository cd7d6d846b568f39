use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    BookingCode,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    ServiceId,
    BranchId,
    BookingDate,
    BookingTime,
    TotalPrice,
    IsPickupService,
    PickupAddress,
    PickupNotes,
    VehiclePlate,
    PaymentMethod,
    PaymentProofUrl,
    Notes,
    LoyaltyPointsUsed,
    LoyaltyPointsEarned,
    PointsCredited,
    Status,
    Source,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Branches {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 状态流转: pending -> confirmed -> (picked-up) -> in-progress -> completed,
/// pending/confirmed 可取消。points_credited 保证完成时积分只发放一次。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("booking_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("confirmed"),
                        Alias::new("picked-up"),
                        Alias::new("in-progress"),
                        Alias::new("completed"),
                        Alias::new("cancelled"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("booking_source"))
                    .values(vec![Alias::new("online"), Alias::new("offline")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Bookings::BookingCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CustomerName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CustomerPhone)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::CustomerEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::ServiceId).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::BranchId).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::BookingDate).date().not_null())
                    .col(ColumnDef::new(Bookings::BookingTime).string_len(5).not_null())
                    .col(ColumnDef::new(Bookings::TotalPrice).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::IsPickupService)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Bookings::PickupAddress).text().null())
                    .col(ColumnDef::new(Bookings::PickupNotes).text().null())
                    .col(
                        ColumnDef::new(Bookings::VehiclePlate)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::PaymentMethod)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::PaymentProofUrl).text().null())
                    .col(ColumnDef::new(Bookings::Notes).text().null())
                    .col(
                        ColumnDef::new(Bookings::LoyaltyPointsUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bookings::LoyaltyPointsEarned)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Bookings::PointsCredited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .custom(Alias::new("booking_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::booking_status")),
                    )
                    .col(
                        ColumnDef::new(Bookings::Source)
                            .custom(Alias::new("booking_source"))
                            .not_null()
                            .default(Expr::cust("'online'::booking_source")),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    // 有预约引用时不允许删除服务/门店
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_service")
                            .from(Bookings::Table, Bookings::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_branch")
                            .from(Bookings::Table, Bookings::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一分钟内生成的编号可能重复, 所以这里不是唯一索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_code")
                    .table(Bookings::Table)
                    .col(Bookings::BookingCode)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_branch_date")
                    .table(Bookings::Table)
                    .col(Bookings::BranchId)
                    .col(Bookings::BookingDate)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_status_date")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .col(Bookings::BookingDate)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_customer_phone")
                    .table(Bookings::Table)
                    .col(Bookings::CustomerPhone)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("booking_source")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("booking_status")).to_owned())
            .await?;
        Ok(())
    }
}
