// src/api/devoluciones.rs

use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::pedidos::page_range;
use crate::backend::identity::AuthUser;
use crate::error::Error;
use crate::models::{Devolucion, Pedido};
use crate::returns;
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PedidoId {
    id: Uuid,
}

/// The authenticated customer's return requests, newest first. Returns
/// hang off orders, so the listing goes through the customer's order ids.
#[utoipa::path(
    get,
    path = "/api/devoluciones",
    params(ListParams),
    responses((status = 200, description = "Paginated returns with exact count")),
    tag = "returns"
)]
#[get("/devoluciones")]
pub async fn list_devoluciones(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, Error> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let backend = state.service()?;

    let pedidos = backend
        .from("pedidos")
        .select("id")
        .eq("cliente_id", user.id)
        .fetch::<PedidoId>()
        .await?;

    if pedidos.items.is_empty() {
        return Ok(HttpResponse::Ok().json(json!({ "data": [], "count": 0 })));
    }

    let ids: Vec<String> = pedidos.items.iter().map(|p| p.id.to_string()).collect();
    let (from, to) = page_range(page, limit);

    let result = backend
        .from("devoluciones")
        .select("*")
        .in_list("pedido_id", &ids)
        .order("fecha_solicitud.desc")
        .range(from, to)
        .fetch::<Devolucion>()
        .await?;

    let count = result.count.unwrap_or(result.items.len() as u64);
    Ok(HttpResponse::Ok().json(json!({ "data": result.items, "count": count })))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CrearDevolucionRequest {
    pub pedido_id: Uuid,
    pub producto_id: i64,
    pub cantidad: u32,
    pub motivo: Option<String>,
}

/// Return request creation, fail-fast in this order: ownership, 30-day
/// window (inclusive), no pending duplicate for the (order, product) pair,
/// quantity within the purchased amount.
#[utoipa::path(
    post,
    path = "/api/devoluciones",
    request_body = CrearDevolucionRequest,
    responses(
        (status = 201, body = Devolucion),
        (status = 400, description = "Window expired or quantity out of range"),
        (status = 403, description = "Order does not belong to the caller"),
        (status = 409, description = "A pending return already exists")
    ),
    tag = "returns"
)]
#[post("/devoluciones")]
pub async fn create_devolucion(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<CrearDevolucionRequest>,
) -> Result<HttpResponse, Error> {
    let payload = payload.into_inner();
    let backend = state.service()?;

    // 1. The order must exist and belong to the requester.
    let pedido = backend
        .from("pedidos")
        .select("*")
        .eq("id", payload.pedido_id)
        .fetch_optional::<Pedido>()
        .await?;

    let pedido = match pedido {
        Some(p) if p.cliente_id == user.id => p,
        _ => return Err(Error::Forbidden),
    };

    // 2. Within the admission window.
    if !returns::within_return_window(pedido.creado_at, Utc::now()) {
        return Err(Error::WindowExpired);
    }

    // 3. At most one pending return per (order, product).
    let pendiente = backend
        .from("devoluciones")
        .select("id")
        .eq("pedido_id", payload.pedido_id)
        .eq("producto_id", payload.producto_id)
        .eq("estado", "Pendiente")
        .fetch_optional::<serde_json::Value>()
        .await?;

    if pendiente.is_some() {
        return Err(Error::DuplicatePending);
    }

    // 4. Quantity against the order's snapshot, not the client form.
    returns::validate_cantidad(&pedido.articulos, payload.producto_id, payload.cantidad)?;

    let motivo = payload
        .motivo
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "No especificado".to_string());

    let devolucion = backend
        .insert::<Devolucion, _>(
            "devoluciones",
            &json!({
                "pedido_id": payload.pedido_id,
                "producto_id": payload.producto_id,
                "cantidad": payload.cantidad,
                "motivo": motivo,
                "estado": "Pendiente",
                "fecha_limite": returns::fecha_limite(pedido.creado_at),
            }),
        )
        .await?;

    Ok(HttpResponse::Created().json(devolucion))
}
