//! User account service

use fomento_common::error::FomentoError;
use fomento_common::is_valid_email;
use fomento_persistence::entity::users;
use fomento_persistence::sea_orm::*;

use crate::model::{ProfileUpdate, UserAccount};

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> anyhow::Result<Option<users::Model>> {
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?;

    Ok(user)
}

pub async fn find_account_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> anyhow::Result<Option<UserAccount>> {
    Ok(find_by_email(db, email).await?.map(UserAccount::from))
}

/// Register a new account. Fails on an invalid or already registered email.
pub async fn create(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    name: &str,
) -> anyhow::Result<UserAccount> {
    if !is_valid_email(email) {
        return Err(FomentoError::IllegalArgument(format!("invalid email '{}'", email)).into());
    }

    if find_by_email(db, email).await?.is_some() {
        return Err(FomentoError::EmailAlreadyRegistered(email.to_string()).into());
    }

    let hashed_password = bcrypt::hash(password, 10u32)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let entity = users::ActiveModel {
        email: Set(email.to_string()),
        hashed_password: Set(hashed_password),
        name: Set(name.to_string()),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now().naive_utc()),
        alert_frequency: Set("weekly".to_string()),
        ..Default::default()
    };

    let model = users::Entity::insert(entity).exec_with_returning(db).await?;

    Ok(UserAccount::from(model))
}

/// Verify a password against the stored bcrypt hash
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    bcrypt::verify(password, hashed_password).unwrap_or(false)
}

/// Apply a partial profile update; unset fields keep their current value.
pub async fn update_profile(
    db: &DatabaseConnection,
    email: &str,
    update: ProfileUpdate,
) -> anyhow::Result<UserAccount> {
    let entity = find_by_email(db, email)
        .await?
        .ok_or_else(|| FomentoError::UserNotExist(email.to_string()))?;

    let mut user: users::ActiveModel = entity.into();

    if let Some(v) = update.name {
        user.name = Set(v);
    }
    if let Some(v) = update.startup_name {
        user.startup_name = Set(Some(v));
    }
    if let Some(v) = update.startup_segment {
        user.startup_segment = Set(Some(v));
    }
    if let Some(v) = update.startup_trl {
        user.startup_trl = Set(Some(v));
    }
    if let Some(v) = update.startup_area {
        user.startup_area = Set(Some(v));
    }
    if let Some(v) = update.startup_description {
        user.startup_description = Set(Some(v));
    }
    if let Some(v) = update.preferred_regions {
        user.preferred_regions = Set(Some(serde_json::to_string(&v)?));
    }
    if let Some(v) = update.preferred_categories {
        user.preferred_categories = Set(Some(serde_json::to_string(&v)?));
    }
    if let Some(v) = update.min_amount {
        user.min_amount = Set(Some(v));
    }
    if let Some(v) = update.alert_frequency {
        user.alert_frequency = Set(v);
    }

    let model = user.update(db).await?;

    Ok(UserAccount::from(model))
}

/// Active accounts with the given alert frequency, for scheduled digests
pub async fn list_by_alert_frequency(
    db: &DatabaseConnection,
    frequency: &str,
) -> anyhow::Result<Vec<UserAccount>> {
    let users = users::Entity::find()
        .filter(users::Column::IsActive.eq(true))
        .filter(users::Column::AlertFrequency.eq(frequency))
        .all(db)
        .await?
        .into_iter()
        .map(UserAccount::from)
        .collect();

    Ok(users)
}

/// All active accounts
pub async fn list_active(db: &DatabaseConnection) -> anyhow::Result<Vec<UserAccount>> {
    let users = users::Entity::find()
        .filter(users::Column::IsActive.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(UserAccount::from)
        .collect();

    Ok(users)
}
