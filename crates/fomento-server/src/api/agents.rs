//! Agent status and manual pipeline trigger endpoints

use actix_web::{HttpRequest, Responder, Scope, get, post, web};
use serde::Deserialize;

use fomento_agents::model::{AgentLogEntry, AgentStatus, CollectionReport, DeliveryReport};
use fomento_opportunity::service::opportunity;
use fomento_opportunity::{OpportunityFilter, OpportunityInfo};

use crate::model::AppState;
use crate::model::response::Result;
use crate::secured;

const DEFAULT_LOG_LIMIT: u64 = 50;

#[derive(Debug, Deserialize)]
struct LogsParams {
    limit: Option<u64>,
}

#[get("/status")]
async fn status(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let _current_user = secured!(req, data);

    match data.agents().agent_status().await {
        Ok(statuses) => Result::<Vec<AgentStatus>>::http_success(statuses),
        Err(e) => {
            tracing::error!("Failed to derive agent status: {}", e);
            Result::<()>::http_internal_error(e.to_string())
        }
    }
}

#[get("/logs")]
async fn logs(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<LogsParams>,
) -> impl Responder {
    let _current_user = secured!(req, data);

    let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT);

    match data.agents().recent_logs(limit).await {
        Ok(entries) => Result::<Vec<AgentLogEntry>>::http_success(entries),
        Err(e) => {
            tracing::error!("Failed to load agent logs: {}", e);
            Result::<()>::http_internal_error(e.to_string())
        }
    }
}

/// Manually trigger the collection pipeline
#[post("/run-collection")]
async fn run_collection(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let _current_user = secured!(req, data);

    let report = data.agents().run_collection_pipeline().await;

    Result::<CollectionReport>::http_success(report)
}

/// Manually trigger the notification pipeline for the current user
#[post("/run-notifications")]
async fn run_notifications(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let current_user = secured!(req, data);

    let opportunities = match opportunity::search(data.db(), &OpportunityFilter::default()).await {
        Ok(models) => models
            .into_iter()
            .map(OpportunityInfo::from)
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::error!("Failed to load opportunities for notification run: {}", e);
            return Result::<()>::http_internal_error(e.to_string());
        }
    };

    let report = data
        .agents()
        .run_notification_pipeline(std::slice::from_ref(&current_user), &opportunities)
        .await;

    Result::<DeliveryReport>::http_success(report)
}

pub fn routes() -> Scope {
    web::scope("/agents")
        .service(status)
        .service(logs)
        .service(run_collection)
        .service(run_notifications)
}
