// src/api/search.rs

use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::search::{self as search_mod, SearchResponse};
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchParams {
    /// Free-text query; empty returns the newest products.
    pub q: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Catalog search. Backend failures degrade to an empty result set with a
/// warning instead of an error response, so this path never breaks the
/// storefront UI.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchParams),
    responses((status = 200, body = SearchResponse)),
    tag = "catalog"
)]
#[get("/api/search")]
pub async fn search(state: web::Data<AppState>, params: web::Query<SearchParams>) -> impl Responder {
    let q = params.q.as_deref().unwrap_or("");
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(12).clamp(1, 100);

    let result = match state.catalog() {
        Ok(backend) => search_mod::buscar(backend, q, page, limit).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => {
            log::warn!("search degraded to empty results: {e}");
            HttpResponse::Ok().json(SearchResponse {
                items: Vec::new(),
                count: 0,
                warning: Some(e.to_string()),
            })
        }
    }
}
