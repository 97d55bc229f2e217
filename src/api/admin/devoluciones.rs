// src/api/admin/devoluciones.rs

use actix_web::{get, patch, web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::auth::require_admin;
use crate::api::pedidos::page_range;
use crate::backend::identity::AuthUser;
use crate::error::Error;
use crate::models::{Devolucion, EstadoDevolucion};
use crate::returns;
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListParams {
    pub q: Option<String>,
    pub estado: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Back-office return listing with embedded order and product rows.
#[utoipa::path(
    get,
    path = "/api/admin/devoluciones",
    params(ListParams),
    responses((status = 200, description = "Paginated returns with exact count")),
    tag = "admin"
)]
#[get("/devoluciones")]
pub async fn list_devoluciones(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let (from, to) = page_range(page, limit);

    let mut query = state
        .service()?
        .from("devoluciones")
        .select("*,pedidos(id,cliente_id,creado_at,total),productos(id,nombre,precio)")
        .order("fecha_solicitud.desc");

    if let Some(q) = params.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = crate::backend::quote_or_pattern(q.trim());
        query = query.or(&[
            format!("motivo.ilike.{pattern}"),
            format!("observaciones_admin.ilike.{pattern}"),
        ]);
    }
    if let Some(estado) = params.estado.as_deref().filter(|e| !e.is_empty()) {
        query = query.eq("estado", estado);
    }

    let result = query.range(from, to).fetch::<Value>().await?;
    let count = result.count.unwrap_or(result.items.len() as u64);
    Ok(HttpResponse::Ok().json(json!({ "data": result.items, "count": count })))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevisarDevolucionRequest {
    pub id: Uuid,
    pub estado: EstadoDevolucion,
    pub observaciones_admin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EstadoRow {
    estado: EstadoDevolucion,
}

/// Review transition. The state machine is enforced here before the write:
/// only Pendiente->Aprobada, Pendiente->Rechazada and Aprobada->Completada
/// are legal; anything else answers 409 without touching the row.
#[utoipa::path(
    patch,
    path = "/api/admin/devoluciones",
    request_body = RevisarDevolucionRequest,
    responses(
        (status = 200, body = Devolucion),
        (status = 409, description = "Illegal status transition")
    ),
    tag = "admin"
)]
#[patch("/devoluciones")]
pub async fn review_devolucion(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<RevisarDevolucionRequest>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;
    let payload = payload.into_inner();
    let backend = state.service()?;

    let current = backend
        .from("devoluciones")
        .select("estado")
        .eq("id", payload.id)
        .fetch_optional::<EstadoRow>()
        .await?
        .ok_or_else(|| Error::validation("return request not found"))?;

    if !returns::transition_allowed(current.estado, payload.estado) {
        return Err(Error::InvalidTransition {
            from: current.estado,
            to: payload.estado,
        });
    }

    let mut update = Map::new();
    update.insert("estado".to_string(), json!(payload.estado));
    if let Some(obs) = payload.observaciones_admin {
        update.insert("observaciones_admin".to_string(), json!(obs));
    }

    let updated = backend
        .from("devoluciones")
        .eq("id", payload.id)
        .patch::<Devolucion, _>(&Value::Object(update))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::validation("return request not found"))?;

    Ok(HttpResponse::Ok().json(updated))
}
