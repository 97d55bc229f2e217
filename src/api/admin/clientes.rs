// src/api/admin/clientes.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::auth::require_admin;
use crate::backend::identity::AuthUser;
use crate::error::Error;
use crate::AppState;

/// Profile listing with embedded addresses, merged with the identity
/// provider's account records for the last-sign-in timestamp. An identity
/// API failure only drops that column, it does not fail the listing.
#[utoipa::path(
    get,
    path = "/api/admin/clientes",
    responses((status = 200, description = "Profiles with addresses and sign-in info")),
    tag = "admin"
)]
#[get("/clientes")]
pub async fn list_clientes(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;

    let perfiles = state
        .service()?
        .from("perfiles")
        .select("*,direcciones(*)")
        .order("nombre.asc")
        .fetch::<Value>()
        .await?;

    let accounts = match state.identity()?.admin_list_users().await {
        Ok(accounts) => accounts,
        Err(e) => {
            log::warn!("identity account listing failed: {e}");
            Vec::new()
        }
    };

    let clientes: Vec<Value> = perfiles
        .items
        .into_iter()
        .map(|mut perfil| {
            if let Some(obj) = perfil.as_object_mut() {
                let last_sign_in = obj
                    .get("id")
                    .and_then(|id| id.as_str())
                    .and_then(|id| Uuid::parse_str(id).ok())
                    .and_then(|id| accounts.iter().find(|a| a.id == id))
                    .and_then(|a| a.last_sign_in_at);
                obj.insert("last_sign_in_at".to_string(), json!(last_sign_in));
                obj.insert("password_placeholder".to_string(), json!("********"));
            }
            perfil
        })
        .collect();

    Ok(HttpResponse::Ok().json(clientes))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActualizarClienteRequest {
    pub id: Uuid,
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

/// Typed partial profile update. An email change goes through the identity
/// admin API before the profile row is touched.
#[utoipa::path(
    put,
    path = "/api/admin/clientes",
    request_body = ActualizarClienteRequest,
    responses((status = 200, description = "Profile updated")),
    tag = "admin"
)]
#[put("/clientes")]
pub async fn update_cliente(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<ActualizarClienteRequest>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;
    let payload = payload.into_inner();

    if let Some(email) = payload.email.as_deref() {
        validate_email(email)?;
        state.identity()?.admin_update_email(payload.id, email).await?;
    }

    let mut update = Map::new();
    update.insert("updated_at".to_string(), json!(Utc::now()));
    if let Some(nombre) = payload.nombre {
        update.insert("nombre".to_string(), json!(nombre));
    }
    if let Some(email) = payload.email {
        update.insert("email".to_string(), json!(email));
    }
    if let Some(telefono) = payload.telefono {
        update.insert("telefono".to_string(), json!(telefono));
    }
    if let Some(direccion) = payload.direccion {
        update.insert("direccion".to_string(), json!(direccion));
    }

    state
        .service()?
        .from("perfiles")
        .eq("id", payload.id)
        .patch::<Value, _>(&Value::Object(update))
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "cliente actualizado" })))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DeleteParams {
    pub id: Uuid,
}

/// Customer deletion cascade: addresses, then the profile row, then the
/// identity account. The facade has no cross-table transaction, so each
/// completed step is reported; a partial failure is repairable by
/// re-running the request.
#[utoipa::path(
    delete,
    path = "/api/admin/clientes",
    params(DeleteParams),
    responses((status = 200, description = "Cascade completed")),
    tag = "admin"
)]
#[delete("/clientes")]
pub async fn delete_cliente(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;
    let id = params.id;
    let backend = state.service()?;
    let mut completed: Vec<&str> = Vec::new();

    backend
        .from("direcciones")
        .eq("cliente_id", id)
        .delete()
        .await
        .map_err(|e| cascade_error("direcciones", &completed, e))?;
    completed.push("direcciones");

    backend
        .from("perfiles")
        .eq("id", id)
        .delete()
        .await
        .map_err(|e| cascade_error("perfiles", &completed, e))?;
    completed.push("perfiles");

    state
        .identity()?
        .admin_delete_user(id)
        .await
        .map_err(|e| cascade_error("identity account", &completed, e))?;
    completed.push("identity account");

    Ok(HttpResponse::Ok().json(json!({
        "message": "cliente eliminado",
        "steps": completed,
    })))
}

fn cascade_error(step: &str, completed: &[&str], e: crate::backend::BackendError) -> Error {
    log::error!("customer deletion cascade failed at {step} (completed: {completed:?}): {e}");
    Error::BackendUnavailable(format!(
        "deletion cascade failed at {step}; completed steps: [{}]; re-run to finish: {e}",
        completed.join(", ")
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CrearClienteRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

/// Admin account creation: identity account first, then the linked profile
/// row. A profile insert failure compensates by deleting the fresh account
/// so no orphaned login remains.
#[utoipa::path(
    post,
    path = "/api/admin/create-user",
    request_body = CrearClienteRequest,
    responses(
        (status = 200, description = "Account and profile created"),
        (status = 400, description = "Missing field or malformed email")
    ),
    tag = "admin"
)]
#[post("/create-user")]
pub async fn create_user(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<CrearClienteRequest>,
) -> Result<HttpResponse, Error> {
    require_admin(&state, &user).await?;
    let payload = payload.into_inner();

    if payload.nombre.trim().is_empty() || payload.password.is_empty() {
        return Err(Error::validation("nombre, email and password are required"));
    }
    validate_email(&payload.email)?;

    let identity = state.identity()?;
    let account = identity
        .admin_create_user(&payload.email, &payload.password)
        .await?;

    let perfil_result = state
        .service()?
        .insert::<Value, _>(
            "perfiles",
            &json!({
                "id": account.id,
                "nombre": payload.nombre,
                "email": payload.email,
                "telefono": payload.telefono,
                "direccion": payload.direccion,
                "rol": "cliente",
            }),
        )
        .await;

    let perfil = match perfil_result {
        Ok(p) => p,
        Err(e) => {
            if let Err(cleanup) = identity.admin_delete_user(account.id).await {
                log::error!(
                    "compensating account delete failed for {}: {cleanup}",
                    account.id
                );
            }
            return Err(e.into());
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "user": { "id": account.id, "email": account.email },
        "perfil": perfil,
    })))
}

fn validate_email(email: &str) -> Result<(), Error> {
    let email = email.trim();
    if !email.contains('@') || !email.contains('.') {
        return Err(Error::validation("malformed email"));
    }
    Ok(())
}
