//! Member pages: profile, stats, contract board and school-only content

use crate::alchemy::{alchemy_items, filter_items, parse_filter};
use crate::api::ApiError;
use crate::auth::{models::PrincipalResponse, ActiveSession};
use crate::contracts::{contract_board, render_csv_report, total_gold, Contract};
use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Json},
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Health check - GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /profile
pub async fn profile(Extension(active): Extension<ActiveSession>) -> Json<PrincipalResponse> {
    Json(PrincipalResponse::from_principal(&active.principal))
}

#[derive(Debug, Serialize)]
pub struct WitcherStats {
    pub name: String,
    pub school: String,
    pub rank: String,
    pub equipment: Vec<String>,
    pub toxicity: String,
    pub active_quests: Vec<String>,
}

/// GET /witcher/stats
pub async fn witcher_stats(Extension(active): Extension<ActiveSession>) -> Json<WitcherStats> {
    let principal = &active.principal;
    Json(WitcherStats {
        name: principal.display_name.clone(),
        school: active.session.school.to_string(),
        rank: principal.rank.to_string(),
        equipment: vec!["No equipment".to_string()],
        toxicity: principal
            .profile
            .stats
            .get("Toxicity")
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string()),
        active_quests: Vec::new(),
    })
}

#[derive(Debug, Serialize)]
pub struct ContractBoard {
    pub contracts: Vec<Contract>,
    pub total_gold: u64,
}

/// GET /contracts (masters only)
pub async fn contracts() -> Json<ContractBoard> {
    let contracts = contract_board();
    let total_gold = total_gold(&contracts);
    Json(ContractBoard {
        contracts,
        total_gold,
    })
}

/// GET /contracts/report (masters only)
pub async fn contracts_report() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=contracts_report.csv",
            ),
        ],
        render_csv_report(&contract_board()),
    )
}

#[derive(Debug, Deserialize)]
pub struct AlchemyQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub toxicity: Option<String>,
}

/// GET /alchemy?type=..&toxicity=..
///
/// Names of matching items; 400 unless both parameters are given.
pub async fn alchemy(Query(query): Query<AlchemyQuery>) -> Result<Json<Vec<String>>, ApiError> {
    let (kind, max_toxicity) = parse_filter(query.kind.as_deref(), query.toxicity.as_deref())?;
    Ok(Json(filter_items(&alchemy_items(), &kind, max_toxicity)))
}

/// GET /kaermorhen (Wolf school only)
pub async fn kaermorhen(Extension(active): Extension<ActiveSession>) -> Json<serde_json::Value> {
    Json(json!({
        "welcome": format!("Welcome home to Kaer Morhen, {}", active.principal.display_name),
        "school": active.session.school,
    }))
}
