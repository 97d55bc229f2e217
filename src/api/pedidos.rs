// src/api/pedidos.rs

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::backend::identity::AuthUser;
use crate::error::Error;
use crate::models::Pedido;
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Inclusive row offsets for a 1-based page. Saturating so an absurd
/// `page` from the query string cannot overflow the offset arithmetic.
pub fn page_range(page: usize, limit: usize) -> (usize, usize) {
    let from = page.saturating_sub(1).saturating_mul(limit);
    (from, from.saturating_add(limit.saturating_sub(1)))
}

/// The authenticated customer's own orders, newest first.
#[utoipa::path(
    get,
    path = "/api/pedidos",
    params(ListParams),
    responses((status = 200, description = "Paginated orders with exact count")),
    tag = "storefront"
)]
#[get("/pedidos")]
pub async fn list_pedidos(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, Error> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let (from, to) = page_range(page, limit);

    let result = state
        .service()?
        .from("pedidos")
        .select("*")
        .eq("cliente_id", user.id)
        .order("creado_at.desc")
        .range(from, to)
        .fetch::<Pedido>()
        .await?;

    let count = result.count.unwrap_or(result.items.len() as u64);
    Ok(HttpResponse::Ok().json(json!({ "data": result.items, "count": count })))
}
