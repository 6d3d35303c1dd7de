use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::HashedPassword).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Users::StartupName).string())
                    .col(ColumnDef::new(Users::StartupSegment).string())
                    .col(ColumnDef::new(Users::StartupTrl).integer())
                    .col(ColumnDef::new(Users::StartupArea).string())
                    .col(ColumnDef::new(Users::StartupDescription).text())
                    .col(ColumnDef::new(Users::PreferredRegions).text())
                    .col(ColumnDef::new(Users::PreferredCategories).text())
                    .col(ColumnDef::new(Users::MinAmount).string())
                    .col(
                        ColumnDef::new(Users::AlertFrequency)
                            .string()
                            .not_null()
                            .default("weekly"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Opportunities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Opportunities::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Opportunities::ExternalId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Opportunities::Title).string().not_null())
                    .col(ColumnDef::new(Opportunities::Description).text())
                    .col(ColumnDef::new(Opportunities::Category).string())
                    .col(ColumnDef::new(Opportunities::Kind).string())
                    .col(ColumnDef::new(Opportunities::Region).string())
                    .col(ColumnDef::new(Opportunities::Deadline).date_time())
                    .col(ColumnDef::new(Opportunities::Amount).string())
                    .col(ColumnDef::new(Opportunities::Source).string())
                    .col(ColumnDef::new(Opportunities::SourceUrl).string())
                    .col(
                        ColumnDef::new(Opportunities::RelevanceScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Opportunities::Tags).text())
                    .col(
                        ColumnDef::new(Opportunities::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Opportunities::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Opportunities::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Opportunities::VectorId).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserFavorites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserFavorites::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserFavorites::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserFavorites::OpportunityId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserFavorites::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorites_user_id")
                            .from(UserFavorites::Table, UserFavorites::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorites_opportunity_id")
                            .from(UserFavorites::Table, UserFavorites::OpportunityId)
                            .to(Opportunities::Table, Opportunities::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alerts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alerts::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Alerts::OpportunityId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alerts::Kind).string().not_null())
                    .col(ColumnDef::new(Alerts::SentAt).date_time().not_null())
                    .col(
                        ColumnDef::new(Alerts::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_user_id")
                            .from(Alerts::Table, Alerts::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_opportunity_id")
                            .from(Alerts::Table, Alerts::OpportunityId)
                            .to(Opportunities::Table, Opportunities::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AgentLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AgentLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AgentLogs::AgentName).string().not_null())
                    .col(ColumnDef::new(AgentLogs::Action).string().not_null())
                    .col(ColumnDef::new(AgentLogs::Status).string().not_null())
                    .col(ColumnDef::new(AgentLogs::Details).text())
                    .col(ColumnDef::new(AgentLogs::ExecutionTime).double())
                    .col(ColumnDef::new(AgentLogs::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agent_logs_agent_name")
                    .table(AgentLogs::Table)
                    .col(AgentLogs::AgentName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_opportunities_category")
                    .table(Opportunities::Table)
                    .col(Opportunities::Category)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AgentLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alerts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserFavorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Opportunities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    HashedPassword,
    Name,
    IsActive,
    CreatedAt,
    StartupName,
    StartupSegment,
    StartupTrl,
    StartupArea,
    StartupDescription,
    PreferredRegions,
    PreferredCategories,
    MinAmount,
    AlertFrequency,
}

#[derive(DeriveIden)]
enum Opportunities {
    Table,
    Id,
    ExternalId,
    Title,
    Description,
    Category,
    Kind,
    Region,
    Deadline,
    Amount,
    Source,
    SourceUrl,
    RelevanceScore,
    Tags,
    IsActive,
    CreatedAt,
    UpdatedAt,
    VectorId,
}

#[derive(DeriveIden)]
enum UserFavorites {
    Table,
    Id,
    UserId,
    OpportunityId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Alerts {
    Table,
    Id,
    UserId,
    OpportunityId,
    Kind,
    SentAt,
    IsRead,
}

#[derive(DeriveIden)]
enum AgentLogs {
    Table,
    Id,
    AgentName,
    Action,
    Status,
    Details,
    ExecutionTime,
    CreatedAt,
}
