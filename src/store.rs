//! Database reads and writes for the journal collections.
//!
//! Per-day collections (weight, water) are read for the day in question and
//! handed to the ledger, which decides whether the submission updates the
//! existing row or creates a new one.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{exercise_entry, food_entry, user, water_intake, weight_record};
use crate::ledger::{self, Upsert, WEEK};
use crate::onboarding::Registration;
use crate::summary::Journal;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Email already exists")]
    EmailTaken,
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub struct NewFood {
    pub description: String,
    pub calories: f64,
    pub meal_type: String,
    pub image_url: Option<String>,
}

pub struct NewExercise {
    pub activity: String,
    pub duration_minutes: i32,
    pub calories_burned: f64,
    pub gif_url: Option<String>,
}

pub async fn create_account(
    db: &DatabaseConnection,
    registration: &Registration,
    password_hash: String,
    now: DateTime<Utc>,
    zone: &FixedOffset,
) -> Result<user::Model, AccountError> {
    let txn = db.begin().await?;

    if find_user_by_email(&txn, &registration.email).await?.is_some() {
        txn.rollback().await?;
        return Err(AccountError::EmailTaken);
    }

    let stamp = now.naive_utc();
    let account = user::ActiveModel {
        email: Set(registration.email.clone()),
        password_hash: Set(password_hash),
        name: Set(registration.name.clone()),
        goal_weight_kg: Set(registration.goal_weight_kg),
        activity_level: Set(registration.activity_level.map(|a| a.as_str().to_string())),
        created_at: Set(stamp),
        updated_at: Set(stamp),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| match e.sql_err() {
        // Lost a race with another signup for the same address.
        Some(SqlErr::UniqueConstraintViolation(_)) => AccountError::EmailTaken,
        _ => AccountError::Database(e),
    })?;

    if let Some(weight_kg) = registration.current_weight_kg {
        weight_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(account.id),
            date: Set(now.with_timezone(zone)),
            weight_kg: Set(weight_kg),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(account)
}

pub async fn find_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
}

pub async fn log_food(
    db: &DatabaseConnection,
    user_id: i32,
    food: NewFood,
    now: DateTime<Utc>,
    zone: &FixedOffset,
) -> Result<food_entry::Model, DbErr> {
    food_entry::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        date: Set(now.with_timezone(zone)),
        description: Set(food.description),
        calories: Set(food.calories),
        meal_type: Set(food.meal_type),
        image_url: Set(food.image_url),
    }
    .insert(db)
    .await
}

pub async fn food_log(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<food_entry::Model>, DbErr> {
    food_entry::Entity::find()
        .filter(food_entry::Column::UserId.eq(user_id))
        .order_by_desc(food_entry::Column::Date)
        .all(db)
        .await
}

pub async fn log_exercise(
    db: &DatabaseConnection,
    user_id: i32,
    exercise: NewExercise,
    now: DateTime<Utc>,
    zone: &FixedOffset,
) -> Result<exercise_entry::Model, DbErr> {
    exercise_entry::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        date: Set(now.with_timezone(zone)),
        activity: Set(exercise.activity),
        duration_minutes: Set(exercise.duration_minutes),
        calories_burned: Set(exercise.calories_burned),
        gif_url: Set(exercise.gif_url),
    }
    .insert(db)
    .await
}

pub async fn exercise_log(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<exercise_entry::Model>, DbErr> {
    exercise_entry::Entity::find()
        .filter(exercise_entry::Column::UserId.eq(user_id))
        .order_by_desc(exercise_entry::Column::Date)
        .all(db)
        .await
}

/// Full weight history, oldest first.
pub async fn weight_history(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<weight_record::Model>, DbErr> {
    weight_record::Entity::find()
        .filter(weight_record::Column::UserId.eq(user_id))
        .order_by_asc(weight_record::Column::Date)
        .all(db)
        .await
}

fn bounds(day: NaiveDate, zone: &FixedOffset) -> Result<(DateTime<Utc>, DateTime<Utc>), DbErr> {
    ledger::day_bounds(day, zone)
        .ok_or_else(|| DbErr::Custom(format!("{day} is outside the supported calendar")))
}

/// Logs today's weight, replacing an earlier reading from the same day.
pub async fn record_weight(
    db: &DatabaseConnection,
    user_id: i32,
    weight_kg: f64,
    now: DateTime<Utc>,
    zone: &FixedOffset,
) -> Result<weight_record::Model, DbErr> {
    let today = ledger::calendar_day(now, zone);
    let (start, end) = bounds(today, zone)?;
    let same_day = weight_record::Entity::find()
        .filter(weight_record::Column::UserId.eq(user_id))
        .filter(weight_record::Column::Date.gte(start))
        .filter(weight_record::Column::Date.lt(end))
        .order_by_asc(weight_record::Column::Date)
        .all(db)
        .await?;

    match ledger::upsert_for_day(&same_day, today, zone, weight_kg, |w| w.weight_kg, ledger::replace) {
        Upsert::Update { id, value } => {
            weight_record::ActiveModel {
                id: Unchanged(id),
                weight_kg: Set(value),
                ..Default::default()
            }
            .update(db)
            .await
        }
        Upsert::Create { value } => {
            weight_record::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                date: Set(now.with_timezone(zone)),
                weight_kg: Set(value),
            }
            .insert(db)
            .await
        }
    }
}

/// Water logs from the week ending on `day`, oldest first.
pub async fn water_week(
    db: &DatabaseConnection,
    user_id: i32,
    day: NaiveDate,
    zone: &FixedOffset,
) -> Result<Vec<water_intake::Model>, DbErr> {
    let first = day
        .checked_sub_days(Days::new(WEEK as u64 - 1))
        .ok_or_else(|| DbErr::Custom(format!("{day} is outside the supported calendar")))?;
    let (start, _) = bounds(first, zone)?;
    let (_, end) = bounds(day, zone)?;
    water_intake::Entity::find()
        .filter(water_intake::Column::UserId.eq(user_id))
        .filter(water_intake::Column::Date.gte(start))
        .filter(water_intake::Column::Date.lt(end))
        .order_by_asc(water_intake::Column::Date)
        .all(db)
        .await
}

/// Adds `delta_ml` (negative to undo) to today's water total, never below zero.
pub async fn add_water(
    db: &DatabaseConnection,
    user_id: i32,
    delta_ml: i32,
    now: DateTime<Utc>,
    zone: &FixedOffset,
) -> Result<water_intake::Model, DbErr> {
    let today = ledger::calendar_day(now, zone);
    let (start, end) = bounds(today, zone)?;
    let same_day = water_intake::Entity::find()
        .filter(water_intake::Column::UserId.eq(user_id))
        .filter(water_intake::Column::Date.gte(start))
        .filter(water_intake::Column::Date.lt(end))
        .order_by_asc(water_intake::Column::Date)
        .all(db)
        .await?;

    let decision = ledger::upsert_for_day(
        &same_day,
        today,
        zone,
        f64::from(delta_ml),
        |w| f64::from(w.amount_ml),
        ledger::accumulate_clamped,
    );

    match decision {
        Upsert::Update { id, value } => {
            water_intake::ActiveModel {
                id: Unchanged(id),
                amount_ml: Set(value.round() as i32),
                ..Default::default()
            }
            .update(db)
            .await
        }
        Upsert::Create { value } => {
            water_intake::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                date: Set(now.with_timezone(zone)),
                amount_ml: Set(value.max(0.0).round() as i32),
            }
            .insert(db)
            .await
        }
    }
}

/// Loads what the dashboard needs for `day`: that day's food and exercise,
/// the surrounding week of water, and the whole weight history.
pub async fn load_journal(
    db: &DatabaseConnection,
    user_id: i32,
    day: NaiveDate,
    zone: &FixedOffset,
) -> Result<Journal, DbErr> {
    let (start, end) = bounds(day, zone)?;

    let food = food_entry::Entity::find()
        .filter(food_entry::Column::UserId.eq(user_id))
        .filter(food_entry::Column::Date.gte(start))
        .filter(food_entry::Column::Date.lt(end))
        .order_by_desc(food_entry::Column::Date)
        .all(db);
    let exercise = exercise_entry::Entity::find()
        .filter(exercise_entry::Column::UserId.eq(user_id))
        .filter(exercise_entry::Column::Date.gte(start))
        .filter(exercise_entry::Column::Date.lt(end))
        .order_by_desc(exercise_entry::Column::Date)
        .all(db);

    let (food, exercise, water, weights) = futures::try_join!(
        food,
        exercise,
        water_week(db, user_id, day, zone),
        weight_history(db, user_id),
    )?;

    Ok(Journal {
        food,
        exercise,
        water,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T18:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn add_water_updates_the_days_row() -> Result<(), DbErr> {
        let id = Uuid::new_v4();
        let existing = water_intake::Model {
            id,
            user_id: 1,
            date: DateTime::parse_from_rfc3339("2026-03-02T08:00:00Z").unwrap(),
            amount_ml: 250,
        };
        let updated = water_intake::Model {
            amount_ml: 500,
            ..existing.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![updated.clone()]])
            .into_connection();

        let saved = add_water(&db, 1, 250, now(), &utc()).await?;
        assert_eq!(saved, updated);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn add_water_creates_first_row_of_the_day() -> Result<(), DbErr> {
        let created = water_intake::Model {
            id: Uuid::new_v4(),
            user_id: 1,
            date: now().with_timezone(&utc()),
            amount_ml: 500,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<water_intake::Model>::new()])
            .append_query_results([vec![created.clone()]])
            .into_connection();

        let saved = add_water(&db, 1, 500, now(), &utc()).await?;
        assert_eq!(saved.amount_ml, 500);
        Ok(())
    }

    fn weight(day_time: &str, weight_kg: f64) -> weight_record::Model {
        weight_record::Model {
            id: Uuid::new_v4(),
            user_id: 3,
            date: DateTime::parse_from_rfc3339(day_time).unwrap(),
            weight_kg,
        }
    }

    #[tokio::test]
    async fn same_day_weight_replaces_the_reading() -> Result<(), DbErr> {
        let morning = weight("2026-03-02T07:00:00Z", 82.0);
        let replaced = weight_record::Model {
            weight_kg: 81.2,
            ..morning.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![morning.clone()]])
            .append_query_results([vec![replaced.clone()]])
            .into_connection();

        let saved = record_weight(&db, 3, 81.2, now(), &utc()).await?;
        assert_eq!(saved, replaced);
        assert_eq!(saved.id, morning.id);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("UPDATE"));
        Ok(())
    }

    #[tokio::test]
    async fn first_weight_of_the_day_is_inserted() -> Result<(), DbErr> {
        let created = weight("2026-03-02T18:30:00Z", 81.2);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<weight_record::Model>::new()])
            .append_query_results([vec![created.clone()]])
            .into_connection();

        let saved = record_weight(&db, 3, 81.2, now(), &utc()).await?;
        assert_eq!(saved.weight_kg, 81.2);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("INSERT"));
        Ok(())
    }

    fn registration() -> Registration {
        Registration {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
            current_weight_kg: None,
            goal_weight_kg: 68.0,
            activity_level: None,
        }
    }

    fn account() -> user::Model {
        let stamp = now().naive_utc();
        user::Model {
            id: 5,
            email: "ana@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: "Ana".to_string(),
            goal_weight_kg: 68.0,
            activity_level: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[tokio::test]
    async fn taken_email_is_refused_before_insert() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account()]])
            .into_connection();

        let result = create_account(&db, &registration(), "hash".into(), now(), &utc()).await;
        assert!(matches!(result, Err(AccountError::EmailTaken)));
    }

    #[tokio::test]
    async fn new_email_creates_the_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![account()]])
            .into_connection();

        let created = create_account(&db, &registration(), "hash".into(), now(), &utc())
            .await
            .unwrap();
        assert_eq!(created.id, 5);
    }

    #[tokio::test]
    async fn weight_history_passes_rows_through() -> Result<(), DbErr> {
        let rows = vec![
            weight_record::Model {
                id: Uuid::new_v4(),
                user_id: 3,
                date: DateTime::parse_from_rfc3339("2026-03-01T07:00:00Z").unwrap(),
                weight_kg: 82.0,
            },
            weight_record::Model {
                id: Uuid::new_v4(),
                user_id: 3,
                date: DateTime::parse_from_rfc3339("2026-03-02T07:00:00Z").unwrap(),
                weight_kg: 81.6,
            },
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows.clone()])
            .into_connection();

        assert_eq!(weight_history(&db, 3).await?, rows);
        Ok(())
    }
}
