// src/api/ping.rs

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;
use std::time::Duration;

use crate::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// Backend reachability probe. Always answers 200; the body says whether
/// the backend host accepted a connection within the 4-second abort.
#[utoipa::path(
    get,
    path = "/api/ping",
    responses((status = 200, description = "Probe result, ok flag in body")),
    tag = "ops"
)]
#[get("/api/ping")]
pub async fn ping(state: web::Data<AppState>) -> impl Responder {
    let backend = state.catalog.as_ref().or(state.backend.as_ref());

    let Some(backend) = backend else {
        return HttpResponse::Ok().json(json!({
            "ok": false,
            "error": "backend credentials are not configured"
        }));
    };

    match backend.probe(PROBE_TIMEOUT).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "ok": true })),
        Err(e) => HttpResponse::Ok().json(json!({ "ok": false, "error": e.to_string() })),
    }
}
