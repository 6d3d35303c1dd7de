//! Opportunity listing, detail, favorite, and export endpoints

use actix_web::{HttpRequest, HttpResponse, Responder, Scope, get, post, web};
use serde::Deserialize;

use fomento_auth::{StartupProfile, UserAccount};
use fomento_opportunity::service::{export, favorite, opportunity};
use fomento_opportunity::{OpportunityFilter, OpportunityInfo};

use crate::model::AppState;
use crate::model::response::Result;
use crate::secured;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct ListParams {
    category: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    region: Option<String>,
    limit: Option<usize>,
}

impl ListParams {
    fn filter(&self) -> OpportunityFilter {
        OpportunityFilter {
            category: self.category.clone(),
            kind: self.kind.clone(),
            region: self.region.clone(),
        }
    }
}

/// Load the active opportunities for a user: filtered, favorite-flagged, and
/// ranked against the startup profile.
async fn ranked_for_user(
    data: &web::Data<AppState>,
    current_user: &UserAccount,
    filter: &OpportunityFilter,
) -> anyhow::Result<Vec<OpportunityInfo>> {
    let models = opportunity::search(data.db(), filter).await?;
    let favorite_ids = favorite::ids_for_user(data.db(), current_user.id).await?;

    let infos = models
        .into_iter()
        .map(OpportunityInfo::from)
        .map(|info| {
            let is_favorite = favorite_ids.contains(&info.id);
            info.with_favorite(is_favorite)
        })
        .collect::<Vec<_>>();

    let profile = StartupProfile::from(current_user);

    Ok(data.agents().run_ranking_pipeline(infos, Some(&profile)))
}

#[get("")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> impl Responder {
    let current_user = secured!(req, data);

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    match ranked_for_user(&data, &current_user, &params.filter()).await {
        Ok(mut ranked) => {
            ranked.truncate(limit);
            Result::<Vec<OpportunityInfo>>::http_success(ranked)
        }
        Err(e) => {
            tracing::error!("Failed to list opportunities: {}", e);
            Result::<()>::http_internal_error(e.to_string())
        }
    }
}

#[get("/export/csv")]
async fn export_csv(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let current_user = secured!(req, data);

    let ranked = match ranked_for_user(&data, &current_user, &OpportunityFilter::default()).await {
        Ok(ranked) => ranked,
        Err(e) => {
            tracing::error!("Failed to load opportunities for export: {}", e);
            return Result::<()>::http_internal_error(e.to_string());
        }
    };

    match export::to_csv(&ranked) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"opportunities.csv\"",
            ))
            .body(csv),
        Err(e) => {
            tracing::error!("Failed to render CSV export: {}", e);
            Result::<()>::http_internal_error(e.to_string())
        }
    }
}

#[get("/{id}")]
async fn find_one(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let current_user = secured!(req, data);
    let id = path.into_inner();

    match opportunity::find_by_id(data.db(), id).await {
        Ok(Some(model)) => {
            let is_favorite = favorite::ids_for_user(data.db(), current_user.id)
                .await
                .map(|ids| ids.contains(&id))
                .unwrap_or(false);

            Result::<OpportunityInfo>::http_success(
                OpportunityInfo::from(model).with_favorite(is_favorite),
            )
        }
        Ok(None) => Result::<()>::http_not_found("Opportunity not found".to_string()),
        Err(e) => {
            tracing::error!("Failed to load opportunity {}: {}", id, e);
            Result::<()>::http_internal_error(e.to_string())
        }
    }
}

#[post("/{id}/favorite")]
async fn toggle_favorite(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let current_user = secured!(req, data);
    let id = path.into_inner();

    match opportunity::find_by_id(data.db(), id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Result::<()>::http_not_found("Opportunity not found".to_string()),
        Err(e) => return Result::<()>::http_internal_error(e.to_string()),
    }

    match favorite::toggle(data.db(), current_user.id, id).await {
        Ok(is_favorite) => Result::<serde_json::Value>::http_success(
            serde_json::json!({ "isFavorite": is_favorite }),
        ),
        Err(e) => {
            tracing::error!("Failed to toggle favorite {}: {}", id, e);
            Result::<()>::http_internal_error(e.to_string())
        }
    }
}

pub fn routes() -> Scope {
    // export/csv must be registered before the {id} matcher
    web::scope("/opportunities")
        .service(list)
        .service(export_csv)
        .service(toggle_favorite)
        .service(find_one)
}
