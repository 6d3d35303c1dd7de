//! Opportunity query and upsert service

use sea_orm::sea_query::{Expr, Func};

use fomento_common::error::FomentoError;
use fomento_persistence::entity::opportunities;
use fomento_persistence::sea_orm::*;

use crate::model::{NewOpportunity, OpportunityFilter};

/// Active opportunities matching the given filters, newest first
pub async fn search(
    db: &DatabaseConnection,
    filter: &OpportunityFilter,
) -> anyhow::Result<Vec<opportunities::Model>> {
    let mut select = opportunities::Entity::find()
        .filter(opportunities::Column::IsActive.eq(true))
        .order_by_desc(opportunities::Column::CreatedAt);

    if let Some(category) = &filter.category {
        select = select.filter(opportunities::Column::Category.eq(category));
    }
    if let Some(kind) = &filter.kind {
        select = select.filter(opportunities::Column::Kind.eq(kind));
    }
    if let Some(region) = &filter.region {
        select = select.filter(opportunities::Column::Region.eq(region));
    }

    Ok(select.all(db).await?)
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> anyhow::Result<Option<opportunities::Model>> {
    Ok(opportunities::Entity::find_by_id(id).one(db).await?)
}

pub async fn find_by_ids(
    db: &DatabaseConnection,
    ids: &[i64],
) -> anyhow::Result<Vec<opportunities::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(opportunities::Entity::find()
        .filter(opportunities::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?)
}

pub async fn find_by_external_ids(
    db: &DatabaseConnection,
    external_ids: &[String],
) -> anyhow::Result<Vec<opportunities::Model>> {
    if external_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(opportunities::Entity::find()
        .filter(opportunities::Column::ExternalId.is_in(external_ids.iter().map(String::as_str)))
        .all(db)
        .await?)
}

/// Case-insensitive keyword search over title and description.
/// Fallback for the semantic search endpoint when retrieval is disabled.
pub async fn keyword_search(
    db: &DatabaseConnection,
    query: &str,
    limit: u64,
) -> anyhow::Result<Vec<opportunities::Model>> {
    let pattern = format!("%{}%", query.to_lowercase());

    Ok(opportunities::Entity::find()
        .filter(opportunities::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(opportunities::Column::Title)))
                        .like(&pattern),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(opportunities::Column::Description)))
                        .like(&pattern),
                ),
        )
        .order_by_desc(opportunities::Column::RelevanceScore)
        .limit(limit)
        .all(db)
        .await?)
}

/// Counts returned by [`upsert_batch`]
#[derive(Debug, Default, Clone, Copy)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
}

/// Insert collected opportunities, updating rows whose external_id already exists.
pub async fn upsert_batch(
    db: &DatabaseConnection,
    batch: &[NewOpportunity],
) -> anyhow::Result<UpsertStats> {
    let mut stats = UpsertStats::default();
    let now = chrono::Utc::now().naive_utc();

    for item in batch {
        let tags = if item.tags.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&item.tags)?)
        };

        let existing = opportunities::Entity::find()
            .filter(opportunities::Column::ExternalId.eq(&item.external_id))
            .one(db)
            .await?;

        match existing {
            Some(entity) => {
                let mut active: opportunities::ActiveModel = entity.into();
                active.title = Set(item.title.clone());
                active.description = Set(item.description.clone());
                active.category = Set(item.category.clone());
                active.kind = Set(item.kind.clone());
                active.region = Set(item.region.clone());
                active.deadline = Set(item.deadline);
                active.amount = Set(item.amount.clone());
                active.source = Set(item.source.clone());
                active.source_url = Set(item.source_url.clone());
                active.relevance_score = Set(item.relevance_score);
                active.tags = Set(tags);
                active.updated_at = Set(now);
                active.update(db).await?;
                stats.updated += 1;
            }
            None => {
                let active = opportunities::ActiveModel {
                    external_id: Set(item.external_id.clone()),
                    title: Set(item.title.clone()),
                    description: Set(item.description.clone()),
                    category: Set(item.category.clone()),
                    kind: Set(item.kind.clone()),
                    region: Set(item.region.clone()),
                    deadline: Set(item.deadline),
                    amount: Set(item.amount.clone()),
                    source: Set(item.source.clone()),
                    source_url: Set(item.source_url.clone()),
                    relevance_score: Set(item.relevance_score),
                    tags: Set(tags),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                opportunities::Entity::insert(active).exec(db).await?;
                stats.inserted += 1;
            }
        }
    }

    Ok(stats)
}

/// Record the external vector index id after an embedding upsert
pub async fn set_vector_id(
    db: &DatabaseConnection,
    id: i64,
    vector_id: &str,
) -> anyhow::Result<()> {
    match opportunities::Entity::find_by_id(id).one(db).await? {
        Some(entity) => {
            let mut active: opportunities::ActiveModel = entity.into();
            active.vector_id = Set(Some(vector_id.to_string()));
            active.update(db).await?;
            Ok(())
        }
        None => Err(FomentoError::OpportunityNotExist(id).into()),
    }
}

/// Deactivate opportunities whose deadline has passed. Returns affected rows.
pub async fn deactivate_expired(db: &DatabaseConnection) -> anyhow::Result<u64> {
    let now = chrono::Utc::now().naive_utc();

    let result = opportunities::Entity::update_many()
        .col_expr(opportunities::Column::IsActive, Expr::value(false))
        .col_expr(opportunities::Column::UpdatedAt, Expr::value(now))
        .filter(opportunities::Column::IsActive.eq(true))
        .filter(opportunities::Column::Deadline.is_not_null())
        .filter(opportunities::Column::Deadline.lt(now))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Number of active opportunities
pub async fn count_active(db: &DatabaseConnection) -> anyhow::Result<u64> {
    Ok(opportunities::Entity::find()
        .filter(opportunities::Column::IsActive.eq(true))
        .count(db)
        .await?)
}
