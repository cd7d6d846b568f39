use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

/// 洗车服务项目
#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    Name,
    Category,
    Description,
    Price,
    PickupFee,
    SupportsPickup,
    DurationMinutes,
    Features,
    LoyaltyPoints,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Branches {
    Table,
    Id,
    Name,
    Address,
    Phone,
    Manager,
    StaffCount,
    BankName,
    BankAccountNumber,
    BankAccountName,
    OpenTime,
    CloseTime,
    PickupRadiusKm,
    Latitude,
    Longitude,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("service_category"))
                    .values(vec![
                        Alias::new("regular_car"),
                        Alias::new("premium_car"),
                        Alias::new("motorcycle"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("branch_status"))
                    .values(vec![Alias::new("active"), Alias::new("inactive")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Services::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Services::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Services::Category)
                            .custom(Alias::new("service_category"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Services::Description).text().null())
                    .col(ColumnDef::new(Services::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(Services::PickupFee)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Services::SupportsPickup)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Services::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Services::Features)
                            .array(ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("'{}'::text[]")),
                    )
                    // NULL = 按预约金额计算积分
                    .col(ColumnDef::new(Services::LoyaltyPoints).big_integer().null())
                    .col(
                        ColumnDef::new(Services::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Services::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Services::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Branches::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Branches::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Branches::Address).text().not_null())
                    .col(ColumnDef::new(Branches::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(Branches::Manager).string_len(255).null())
                    .col(
                        ColumnDef::new(Branches::StaffCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Branches::BankName).string_len(100).null())
                    .col(
                        ColumnDef::new(Branches::BankAccountNumber)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Branches::BankAccountName)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(Branches::OpenTime).string_len(5).not_null())
                    .col(ColumnDef::new(Branches::CloseTime).string_len(5).not_null())
                    .col(
                        ColumnDef::new(Branches::PickupRadiusKm)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Branches::Latitude).double().null())
                    .col(ColumnDef::new(Branches::Longitude).double().null())
                    .col(
                        ColumnDef::new(Branches::Status)
                            .custom(Alias::new("branch_status"))
                            .not_null()
                            .default(Expr::cust("'active'::branch_status")),
                    )
                    .col(
                        ColumnDef::new(Branches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Branches::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Branches::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("branch_status"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("service_category"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
