//! User favorites service

use std::collections::HashSet;

use fomento_persistence::entity::user_favorites;
use fomento_persistence::sea_orm::*;

/// Toggle a favorite. Returns the new state (true = now favorited).
pub async fn toggle(
    db: &DatabaseConnection,
    user_id: i64,
    opportunity_id: i64,
) -> anyhow::Result<bool> {
    let existing = user_favorites::Entity::find()
        .filter(user_favorites::Column::UserId.eq(user_id))
        .filter(user_favorites::Column::OpportunityId.eq(opportunity_id))
        .one(db)
        .await?;

    match existing {
        Some(entity) => {
            entity.delete(db).await?;
            Ok(false)
        }
        None => {
            let entity = user_favorites::ActiveModel {
                user_id: Set(user_id),
                opportunity_id: Set(opportunity_id),
                created_at: Set(chrono::Utc::now().naive_utc()),
                ..Default::default()
            };
            user_favorites::Entity::insert(entity).exec(db).await?;
            Ok(true)
        }
    }
}

/// Opportunity ids the user has favorited
pub async fn ids_for_user(db: &DatabaseConnection, user_id: i64) -> anyhow::Result<HashSet<i64>> {
    let ids = user_favorites::Entity::find()
        .select_only()
        .column(user_favorites::Column::OpportunityId)
        .filter(user_favorites::Column::UserId.eq(user_id))
        .into_tuple::<i64>()
        .all(db)
        .await?;

    Ok(ids.into_iter().collect())
}

pub async fn count_for_user(db: &DatabaseConnection, user_id: i64) -> anyhow::Result<u64> {
    Ok(user_favorites::Entity::find()
        .filter(user_favorites::Column::UserId.eq(user_id))
        .count(db)
        .await?)
}
