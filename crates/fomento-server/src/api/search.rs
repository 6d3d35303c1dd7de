//! Search endpoints: semantic search, suggestions, category catalog

use std::collections::HashMap;

use actix_web::{HttpRequest, Responder, Scope, get, post, web};
use serde::{Deserialize, Serialize};

use fomento_opportunity::OpportunityInfo;
use fomento_opportunity::service::{favorite, opportunity};

use crate::model::AppState;
use crate::model::response::Result;
use crate::secured;

const DEFAULT_TOP_K: usize = 10;
const MAX_TOP_K: usize = 50;
const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: String,
    #[serde(default)]
    filters: Option<serde_json::Value>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    query: String,
    results: Vec<OpportunityInfo>,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionParams {
    q: Option<String>,
}

#[post("/semantic")]
async fn semantic(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<SearchQuery>,
) -> impl Responder {
    let current_user = secured!(req, data);
    let search = body.into_inner();
    let top_k = search.limit.unwrap_or(DEFAULT_TOP_K).min(MAX_TOP_K);

    let favorite_ids = favorite::ids_for_user(data.db(), current_user.id)
        .await
        .unwrap_or_default();

    let (results, response_text) = if data.agents().retrieval_enabled() {
        let outcome = data
            .agents()
            .semantic_search(&search.query, search.filters.clone(), top_k)
            .await;

        let ids = outcome
            .matches
            .iter()
            .map(|m| m.opportunity_id)
            .collect::<Vec<_>>();

        let mut by_id = match opportunity::find_by_ids(data.db(), &ids).await {
            Ok(models) => models
                .into_iter()
                .map(|m| (m.id, m))
                .collect::<HashMap<_, _>>(),
            Err(e) => {
                tracing::error!("Failed to load matched opportunities: {}", e);
                HashMap::new()
            }
        };

        let results = outcome
            .matches
            .iter()
            .filter_map(|m| by_id.remove(&m.opportunity_id).map(|model| (m.score, model)))
            .map(|(score, model)| {
                let mut info = OpportunityInfo::from(model);
                info.relevance_score = score * 100.0;
                let is_favorite = favorite_ids.contains(&info.id);
                info.with_favorite(is_favorite)
            })
            .collect::<Vec<_>>();

        (results, outcome.response_text)
    } else {
        // No retrieval credentials: plain keyword search over the database
        let results = match opportunity::keyword_search(data.db(), &search.query, top_k as u64)
            .await
        {
            Ok(models) => models
                .into_iter()
                .map(OpportunityInfo::from)
                .map(|info| {
                    let is_favorite = favorite_ids.contains(&info.id);
                    info.with_favorite(is_favorite)
                })
                .collect(),
            Err(e) => {
                tracing::error!("Keyword search failed: {}", e);
                return Result::<()>::http_internal_error(e.to_string());
            }
        };

        (results, None)
    };

    Result::<SearchResponse>::http_success(SearchResponse {
        total: results.len(),
        query: search.query,
        results,
        response_text,
    })
}

#[get("/suggestions")]
async fn suggestions(
    req: HttpRequest,
    data: web::Data<AppState>,
    params: web::Query<SuggestionParams>,
) -> impl Responder {
    let current_user = secured!(req, data);

    let mut suggestions = Vec::new();

    if let Some(segment) = &current_user.startup_segment
        && !segment.is_empty()
    {
        suggestions.push(format!("Editais de {}", segment));
        suggestions.push(format!("Bolsas para {}", segment));
    }

    for region in current_user.preferred_regions.iter().take(2) {
        suggestions.push(format!("Oportunidades em {}", region));
    }

    suggestions.extend(
        [
            "Editais FINEP abertos",
            "Bolsas CNPq para startups",
            "Investimentos em IA",
            "Financiamento para healthtech",
            "Oportunidades Horizonte Europa",
            "Subvenção econômica",
        ]
        .map(String::from),
    );

    if let Some(q) = params.q.as_deref().filter(|q| !q.is_empty()) {
        let q = q.to_lowercase();
        suggestions.retain(|s| s.to_lowercase().contains(&q));
    }

    suggestions.truncate(MAX_SUGGESTIONS);

    Result::<serde_json::Value>::http_success(serde_json::json!({ "suggestions": suggestions }))
}

#[get("/categories")]
async fn categories(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let _current_user = secured!(req, data);

    Result::<serde_json::Value>::http_success(serde_json::json!({
        "categories": [
            "Inteligência Artificial",
            "Saúde",
            "Energia",
            "Fintech",
            "Agtech",
            "Educação",
            "Mobilidade",
            "Indústria 4.0"
        ],
        "types": ["edital", "bolsa", "investimento"],
        "regions": ["Brasil", "América Latina", "Europa", "América do Norte", "Ásia"]
    }))
}

pub fn routes() -> Scope {
    web::scope("/search")
        .service(semantic)
        .service(suggestions)
        .service(categories)
}
