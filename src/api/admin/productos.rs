// src/api/admin/productos.rs
//
// Inventory back-office: product and family CRUD. The legacy `categoria`
// text column is a cache of the assigned family name, written only here so
// there is a single write path keeping the two in sync.

use actix_web::{delete, get, post, put, web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::api::auth::require_admin;
use crate::backend::identity::AuthUser;
use crate::backend::Backend;
use crate::error::Error;
use crate::models::{Familia, Producto};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/productos",
    responses((status = 200, description = "Catalog with embedded families")),
    tag = "admin"
)]
#[get("/productos")]
pub async fn list_productos(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;

    let result = state
        .service()?
        .from("productos")
        .select("*,familias(id,nombre)")
        .order("id.desc")
        .fetch::<Value>()
        .await?;

    Ok(HttpResponse::Ok().json(result.items))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NuevoProductoRequest {
    pub nombre: String,
    pub precio: Decimal,
    pub descripcion: Option<String>,
    pub imagen_url: Option<String>,
    pub familia_id: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/admin/productos",
    request_body = NuevoProductoRequest,
    responses((status = 201, body = Producto)),
    tag = "admin"
)]
#[post("/productos")]
pub async fn create_producto(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<NuevoProductoRequest>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;
    let payload = payload.into_inner();

    if payload.nombre.trim().is_empty() {
        return Err(Error::validation("nombre is required"));
    }

    let backend = state.service()?;
    let categoria = familia_nombre(backend, payload.familia_id).await?;

    let producto = backend
        .insert::<Producto, _>(
            "productos",
            &json!({
                "nombre": payload.nombre.trim(),
                "precio": payload.precio,
                "descripcion": payload.descripcion,
                "imagen_url": payload.imagen_url,
                "familia_id": payload.familia_id,
                "categoria": categoria,
            }),
        )
        .await?;

    Ok(HttpResponse::Created().json(producto))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActualizarProductoRequest {
    pub nombre: Option<String>,
    pub precio: Option<Decimal>,
    pub descripcion: Option<String>,
    pub imagen_url: Option<String>,
    pub familia_id: Option<i64>,
}

#[utoipa::path(
    put,
    path = "/api/admin/productos/{id}",
    request_body = ActualizarProductoRequest,
    responses((status = 200, body = Producto)),
    tag = "admin"
)]
#[put("/productos/{id}")]
pub async fn update_producto(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    id: web::Path<i64>,
    payload: web::Json<ActualizarProductoRequest>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;
    let payload = payload.into_inner();
    let backend = state.service()?;

    let mut update = Map::new();
    if let Some(nombre) = payload.nombre {
        update.insert("nombre".to_string(), json!(nombre.trim()));
    }
    if let Some(precio) = payload.precio {
        update.insert("precio".to_string(), json!(precio));
    }
    if let Some(descripcion) = payload.descripcion {
        update.insert("descripcion".to_string(), json!(descripcion));
    }
    if let Some(imagen_url) = payload.imagen_url {
        update.insert("imagen_url".to_string(), json!(imagen_url));
    }
    if let Some(familia_id) = payload.familia_id {
        // Reassigning the family refreshes the categoria cache in the
        // same write.
        let categoria = familia_nombre(backend, Some(familia_id)).await?;
        update.insert("familia_id".to_string(), json!(familia_id));
        update.insert("categoria".to_string(), json!(categoria));
    }

    if update.is_empty() {
        return Err(Error::validation("no fields to update"));
    }

    let producto = backend
        .from("productos")
        .eq("id", *id)
        .patch::<Producto, _>(&Value::Object(update))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::validation("producto not found"))?;

    Ok(HttpResponse::Ok().json(producto))
}

#[utoipa::path(
    delete,
    path = "/api/admin/productos/{id}",
    responses((status = 200, description = "Product removed")),
    tag = "admin"
)]
#[delete("/productos/{id}")]
pub async fn delete_producto(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    id: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;

    state
        .service()?
        .from("productos")
        .eq("id", *id)
        .delete()
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "producto eliminado" })))
}

#[utoipa::path(
    get,
    path = "/api/admin/familias",
    responses((status = 200, body = [Familia])),
    tag = "admin"
)]
#[get("/familias")]
pub async fn list_familias(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;

    let result = state
        .service()?
        .from("familias")
        .select("*")
        .order("nombre.asc")
        .fetch::<Familia>()
        .await?;

    Ok(HttpResponse::Ok().json(result.items))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NuevaFamiliaRequest {
    pub nombre: String,
}

#[utoipa::path(
    post,
    path = "/api/admin/familias",
    request_body = NuevaFamiliaRequest,
    responses((status = 201, body = Familia)),
    tag = "admin"
)]
#[post("/familias")]
pub async fn create_familia(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<NuevaFamiliaRequest>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;

    let nombre = payload.nombre.trim();
    if nombre.is_empty() {
        return Err(Error::validation("nombre is required"));
    }

    let familia = state
        .service()?
        .insert::<Familia, _>("familias", &json!({ "nombre": nombre }))
        .await?;

    Ok(HttpResponse::Created().json(familia))
}

#[utoipa::path(
    delete,
    path = "/api/admin/familias/{id}",
    responses((status = 200, description = "Family removed")),
    tag = "admin"
)]
#[delete("/familias/{id}")]
pub async fn delete_familia(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    id: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;
    let backend = state.service()?;

    // Detach assigned products first: no dangling familia_id and no stale
    // categoria cache left behind.
    backend
        .from("productos")
        .eq("familia_id", *id)
        .patch::<Value, _>(&json!({ "familia_id": null, "categoria": null }))
        .await?;

    backend.from("familias").eq("id", *id).delete().await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "familia eliminada" })))
}

async fn familia_nombre(backend: &Backend, familia_id: Option<i64>) -> Result<Option<String>, Error> {
    let Some(id) = familia_id else {
        return Ok(None);
    };

    #[derive(Deserialize)]
    struct NombreRow {
        nombre: String,
    }

    let familia = backend
        .from("familias")
        .select("nombre")
        .eq("id", id)
        .fetch_optional::<NombreRow>()
        .await?
        .ok_or_else(|| Error::validation("familia not found"))?;

    Ok(Some(familia.nombre))
}
