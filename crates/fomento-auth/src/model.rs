//! Authentication and account models

use serde::{Deserialize, Serialize};

use fomento_persistence::entity::users;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";
pub const ACCESS_TOKEN: &str = "accessToken";
pub const DEFAULT_TOKEN_EXPIRE_SECONDS: i64 = 18000;
pub const USER_NOT_FOUND_MESSAGE: &str =
    "User not found! Please check user exist or password is right!";

/// JWT payload; `sub` carries the account email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FomentoJwtPayload {
    pub sub: String,
    pub exp: i64,
}

/// Account data exposed over the API and consumed by the notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: chrono::NaiveDateTime,
    pub startup_name: Option<String>,
    pub startup_segment: Option<String>,
    pub startup_trl: Option<i32>,
    pub startup_area: Option<String>,
    pub startup_description: Option<String>,
    pub preferred_regions: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub min_amount: Option<String>,
    pub alert_frequency: String,
}

impl From<users::Model> for UserAccount {
    fn from(value: users::Model) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            is_active: value.is_active,
            created_at: value.created_at,
            startup_name: value.startup_name,
            startup_segment: value.startup_segment,
            startup_trl: value.startup_trl,
            startup_area: value.startup_area,
            startup_description: value.startup_description,
            preferred_regions: parse_json_list(value.preferred_regions.as_deref()),
            preferred_categories: parse_json_list(value.preferred_categories.as_deref()),
            min_amount: value.min_amount,
            alert_frequency: value.alert_frequency,
        }
    }
}

/// Startup profile used by the ranking stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupProfile {
    pub startup_segment: Option<String>,
    pub startup_trl: Option<i32>,
    pub startup_area: Option<String>,
    pub preferred_regions: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub min_amount: Option<String>,
}

impl From<&UserAccount> for StartupProfile {
    fn from(value: &UserAccount) -> Self {
        Self {
            startup_segment: value.startup_segment.clone(),
            startup_trl: value.startup_trl,
            startup_area: value.startup_area.clone(),
            preferred_regions: value.preferred_regions.clone(),
            preferred_categories: value.preferred_categories.clone(),
            min_amount: value.min_amount.clone(),
        }
    }
}

/// Authentication state extracted from a request by the middleware
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    /// Account email from the token subject; empty when unauthenticated
    pub username: String,
    pub token_provided: bool,
    pub jwt_error: Option<String>,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        !self.username.is_empty() && self.jwt_error.is_none()
    }
}

/// Partial profile update; unset fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub startup_name: Option<String>,
    pub startup_segment: Option<String>,
    pub startup_trl: Option<i32>,
    pub startup_area: Option<String>,
    pub startup_description: Option<String>,
    pub preferred_regions: Option<Vec<String>>,
    pub preferred_categories: Option<Vec<String>>,
    pub min_amount: Option<String>,
    pub alert_frequency: Option<String>,
}

/// Parse a JSON text column holding a string array
pub(crate) fn parse_json_list(value: Option<&str>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_str(v).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_list() {
        assert_eq!(
            parse_json_list(Some(r#"["Brasil","Europa"]"#)),
            vec!["Brasil".to_string(), "Europa".to_string()]
        );
        assert!(parse_json_list(Some("not json")).is_empty());
        assert!(parse_json_list(None).is_empty());
    }

    #[test]
    fn test_auth_constants() {
        assert_eq!(AUTHORIZATION_HEADER, "Authorization");
        assert_eq!(TOKEN_PREFIX, "Bearer ");
        assert_eq!(DEFAULT_TOKEN_EXPIRE_SECONDS, 18000);
    }
}
