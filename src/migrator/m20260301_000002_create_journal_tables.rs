use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Food journal
        manager
            .create_table(
                Table::create()
                    .table(FoodEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FoodEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FoodEntries::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(FoodEntries::Date)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(FoodEntries::Description).string().not_null())
                    .col(ColumnDef::new(FoodEntries::Calories).double().not_null())
                    .col(ColumnDef::new(FoodEntries::MealType).string().not_null())
                    .col(ColumnDef::new(FoodEntries::ImageUrl).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-food_entries-user_id")
                            .from(FoodEntries::Table, FoodEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Exercise log
        manager
            .create_table(
                Table::create()
                    .table(ExerciseEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExerciseEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExerciseEntries::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(ExerciseEntries::Date)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ExerciseEntries::Activity).string().not_null())
                    .col(
                        ColumnDef::new(ExerciseEntries::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExerciseEntries::CaloriesBurned)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(ExerciseEntries::GifUrl).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exercise_entries-user_id")
                            .from(ExerciseEntries::Table, ExerciseEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Weight history
        manager
            .create_table(
                Table::create()
                    .table(WeightRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeightRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WeightRecords::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(WeightRecords::Date)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(WeightRecords::WeightKg).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-weight_records-user_id")
                            .from(WeightRecords::Table, WeightRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Water intake, one row per day
        manager
            .create_table(
                Table::create()
                    .table(WaterIntake::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WaterIntake::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WaterIntake::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(WaterIntake::Date)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WaterIntake::AmountMl)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-water_intake-user_id")
                            .from(WaterIntake::Table, WaterIntake::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(user_date_index("idx-food_entries-user_id-date", FoodEntries::Table))
            .await?;
        manager
            .create_index(user_date_index(
                "idx-exercise_entries-user_id-date",
                ExerciseEntries::Table,
            ))
            .await?;
        manager
            .create_index(user_date_index(
                "idx-weight_records-user_id-date",
                WeightRecords::Table,
            ))
            .await?;
        manager
            .create_index(user_date_index("idx-water_intake-user_id-date", WaterIntake::Table))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WaterIntake::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WeightRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExerciseEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FoodEntries::Table).to_owned())
            .await
    }
}

// Per-user day lookups drive every upsert and dashboard query.
fn user_date_index<T: Iden + 'static>(name: &str, table: T) -> IndexCreateStatement {
    Index::create()
        .name(name)
        .table(table)
        .col(Alias::new("user_id"))
        .col(Alias::new("date"))
        .if_not_exists()
        .to_owned()
}

#[derive(DeriveIden)]
enum FoodEntries {
    Table,
    Id,
    UserId,
    Date,
    Description,
    Calories,
    MealType,
    ImageUrl,
}

#[derive(DeriveIden)]
enum ExerciseEntries {
    Table,
    Id,
    UserId,
    Date,
    Activity,
    DurationMinutes,
    CaloriesBurned,
    GifUrl,
}

#[derive(DeriveIden)]
enum WeightRecords {
    Table,
    Id,
    UserId,
    Date,
    WeightKg,
}

#[derive(DeriveIden)]
enum WaterIntake {
    Table,
    Id,
    UserId,
    Date,
    AmountMl,
}
