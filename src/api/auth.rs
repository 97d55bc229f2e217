// src/api/auth.rs

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error as ActixError, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde::Deserialize;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::backend::identity::AuthUser;
use crate::error::Error;
use crate::AppState;

/// Validates a bearer token against the identity provider. The provider
/// owns sessions entirely; this service never mints or decodes tokens
/// itself.
pub async fn validate_token(state: &AppState, token: &str) -> Result<AuthUser, Error> {
    let identity = state.identity()?;
    match identity.get_user(token).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(Error::NotAuthenticated),
        Err(e) => Err(Error::BackendUnavailable(e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct RolRow {
    rol: String,
}

/// Role gate for the back-office surface: the caller's profile must carry
/// the `admin` role.
pub async fn require_admin(state: &AppState, user: &AuthUser) -> Result<(), Error> {
    let perfil = state
        .service()?
        .from("perfiles")
        .select("rol")
        .eq("id", user.id)
        .fetch_optional::<RolRow>()
        .await?;

    match perfil {
        Some(p) if p.rol == "admin" => Ok(()),
        _ => Err(Error::Forbidden),
    }
}

/// Middleware for the authenticated `/api` scope:
/// - takes `Authorization: Bearer <token>`
/// - validates the session against the identity provider
/// - puts the resulting `AuthUser` into `req.extensions_mut()`
pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Transform = SessionMiddlewareInner<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareInner {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionMiddlewareInner<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareInner<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                return Err(actix_web::error::ErrorInternalServerError(
                    "application state missing",
                ));
            };

            let token = req
                .headers()
                .get(actix_web::http::header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|t| t.to_string());

            let Some(token) = token else {
                return Err(Error::NotAuthenticated.into());
            };

            let user = validate_token(&state, &token).await?;
            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}
