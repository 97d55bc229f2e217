// src/backend/identity.rs
//
// Client for the hosted identity provider (GoTrue dialect). Sessions are
// minted and stored by the provider; this service only forwards bearer
// tokens for validation and uses the admin API for account CRUD.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::BackendError;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAccount {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<AuthAccount>,
}

#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    anon_key: Option<String>,
}

impl IdentityClient {
    pub fn new(base_url: String, service_key: String, anon_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            service_key,
            anon_key,
        }
    }

    /// Validates a session token against the provider. `Ok(None)` means the
    /// token was rejected; transport failures surface as errors.
    pub async fn get_user(&self, token: &str) -> Result<Option<AuthUser>, BackendError> {
        let apikey = self.anon_key.as_deref().unwrap_or(&self.service_key);
        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", apikey)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str::<AuthUser>(&body)
            .map(Some)
            .map_err(|e| BackendError::InvalidResponse(format!("{e}; body={body}")))
    }

    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        let resp = self
            .admin_request(reqwest::Method::POST, "users")
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true
            }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str::<AuthUser>(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("{e}; body={body}")))
    }

    pub async fn admin_update_email(&self, id: Uuid, email: &str) -> Result<(), BackendError> {
        let resp = self
            .admin_request(reqwest::Method::PUT, &format!("users/{id}"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        expect_success(resp).await
    }

    pub async fn admin_delete_user(&self, id: Uuid) -> Result<(), BackendError> {
        let resp = self
            .admin_request(reqwest::Method::DELETE, &format!("users/{id}"))
            .send()
            .await?;
        expect_success(resp).await
    }

    pub async fn admin_list_users(&self) -> Result<Vec<AuthAccount>, BackendError> {
        let resp = self
            .admin_request(reqwest::Method::GET, "users")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str::<UserList>(&body)
            .map(|l| l.users)
            .map_err(|e| BackendError::InvalidResponse(format!("{e}; body={body}")))
    }

    fn admin_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(
                method,
                format!("{}/auth/v1/admin/{}", self.base_url, path),
            )
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }
}

async fn expect_success(resp: reqwest::Response) -> Result<(), BackendError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}
