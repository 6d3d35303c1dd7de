//! `SeaORM` Entity for the users table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub hashed_password: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime,

    // Startup profile
    pub startup_name: Option<String>,
    pub startup_segment: Option<String>,
    pub startup_trl: Option<i32>,
    pub startup_area: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub startup_description: Option<String>,

    // Alert preferences; region/category lists are stored as JSON text
    #[sea_orm(column_type = "Text", nullable)]
    pub preferred_regions: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub preferred_categories: Option<String>,
    pub min_amount: Option<String>,
    pub alert_frequency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_favorites::Entity")]
    UserFavorites,
    #[sea_orm(has_many = "super::alerts::Entity")]
    Alerts,
}

impl Related<super::user_favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserFavorites.def()
    }
}

impl Related<super::alerts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alerts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
