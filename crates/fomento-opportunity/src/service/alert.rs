//! Alert bookkeeping service
//!
//! Every delivered notification leaves an alerts row, which feeds the
//! dashboard feed and the per-user stats endpoint.

use fomento_persistence::entity::alerts;
use fomento_persistence::sea_orm::*;

/// Record a delivered alert
pub async fn record(
    db: &DatabaseConnection,
    user_id: i64,
    opportunity_id: i64,
    kind: &str,
) -> anyhow::Result<()> {
    let entity = alerts::ActiveModel {
        user_id: Set(user_id),
        opportunity_id: Set(opportunity_id),
        kind: Set(kind.to_string()),
        sent_at: Set(chrono::Utc::now().naive_utc()),
        is_read: Set(false),
        ..Default::default()
    };

    alerts::Entity::insert(entity).exec(db).await?;

    Ok(())
}

pub async fn count_for_user(db: &DatabaseConnection, user_id: i64) -> anyhow::Result<u64> {
    Ok(alerts::Entity::find()
        .filter(alerts::Column::UserId.eq(user_id))
        .count(db)
        .await?)
}

/// Recent alerts for a user, newest first
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    limit: u64,
) -> anyhow::Result<Vec<alerts::Model>> {
    Ok(alerts::Entity::find()
        .filter(alerts::Column::UserId.eq(user_id))
        .order_by_desc(alerts::Column::SentAt)
        .limit(limit)
        .all(db)
        .await?)
}
