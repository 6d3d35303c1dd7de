//! SeaORM entity definitions

pub mod agent_logs;
pub mod alerts;
pub mod opportunities;
pub mod user_favorites;
pub mod users;

pub mod prelude {
    pub use super::agent_logs::Entity as AgentLogs;
    pub use super::alerts::Entity as Alerts;
    pub use super::opportunities::Entity as Opportunities;
    pub use super::user_favorites::Entity as UserFavorites;
    pub use super::users::Entity as Users;
}
