//! Current-user profile endpoints

use actix_web::{HttpRequest, Responder, Scope, get, put, web};
use serde::Serialize;

use fomento_auth::{ProfileUpdate, UserAccount};
use fomento_opportunity::service::{alert, favorite, opportunity};

use crate::model::AppState;
use crate::model::response::Result;
use crate::secured;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserStats {
    favorites_count: u64,
    alerts_received: u64,
    active_opportunities: u64,
}

#[get("/me")]
async fn me(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let current_user = secured!(req, data);

    Result::<UserAccount>::http_success(current_user)
}

#[put("/me")]
async fn update_me(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<ProfileUpdate>,
) -> impl Responder {
    let current_user = secured!(req, data);

    match fomento_auth::service::user::update_profile(
        data.db(),
        &current_user.email,
        body.into_inner(),
    )
    .await
    {
        Ok(account) => Result::<UserAccount>::http_success(account),
        Err(e) => {
            tracing::error!("Failed to update profile for '{}': {}", current_user.email, e);
            Result::<()>::http_internal_error(e.to_string())
        }
    }
}

#[get("/stats")]
async fn stats(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let current_user = secured!(req, data);

    let favorites_count = favorite::count_for_user(data.db(), current_user.id)
        .await
        .unwrap_or_default();
    let alerts_received = alert::count_for_user(data.db(), current_user.id)
        .await
        .unwrap_or_default();
    let active_opportunities = opportunity::count_active(data.db()).await.unwrap_or_default();

    Result::<UserStats>::http_success(UserStats {
        favorites_count,
        alerts_received,
        active_opportunities,
    })
}

pub fn routes() -> Scope {
    web::scope("/users")
        .service(me)
        .service(update_me)
        .service(stats)
}
