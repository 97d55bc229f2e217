// src/api/admin/pedidos.rs

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::auth::require_admin;
use crate::api::pedidos::page_range;
use crate::backend::identity::AuthUser;
use crate::error::Error;
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListParams {
    /// Substring filter over the delivery address and status.
    pub q: Option<String>,
    /// Inclusive lower bound on creation time (RFC 3339).
    pub from: Option<String>,
    /// Inclusive upper bound on creation time (RFC 3339).
    pub to: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Back-office order listing with the customer's profile embedded.
#[utoipa::path(
    get,
    path = "/api/admin/pedidos",
    params(ListParams),
    responses((status = 200, description = "Paginated orders with exact count")),
    tag = "admin"
)]
#[get("/pedidos")]
pub async fn list_pedidos(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let (from_idx, to_idx) = page_range(page, limit);

    let mut query = state
        .service()?
        .from("pedidos")
        .select("*,perfiles(nombre,telefono)")
        .order("creado_at.desc");

    if let Some(q) = params.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = crate::backend::quote_or_pattern(q.trim());
        query = query.or(&[
            format!("direccion_entrega.ilike.{pattern}"),
            format!("estado.ilike.{pattern}"),
        ]);
    }
    if let Some(from) = params.from.as_deref() {
        query = query.gte("creado_at", from);
    }
    if let Some(to) = params.to.as_deref() {
        query = query.lte("creado_at", to);
    }

    let result = query.range(from_idx, to_idx).fetch::<Value>().await?;
    let count = result.count.unwrap_or(result.items.len() as u64);
    Ok(HttpResponse::Ok().json(json!({ "data": result.items, "count": count })))
}
