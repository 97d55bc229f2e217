// src/backend/mod.rs
//
// Client for the hosted backend's table REST facade (PostgREST dialect).
// The service implements no storage of its own; every read and write goes
// through this client with either the anon or the service credential tier.

pub mod identity;
pub mod realtime;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum BackendError {
    Http(reqwest::Error),
    Api { status: u16, body: String },
    InvalidResponse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(e) => write!(f, "http error: {e}"),
            BackendError::Api { status, body } => {
                write!(f, "backend api error status={status} body={body}")
            }
            BackendError::InvalidResponse(e) => write!(f, "invalid response: {e}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// A page of rows plus the exact total row count when one was requested
/// (parsed from the `Content-Range` response header).
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: Option<u64>,
}

#[derive(Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: String,
}

impl Backend {
    pub fn new(base_url: String, api_key: String) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&api_key) {
            headers.insert("apikey", v);
        }
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
            headers.insert(reqwest::header::AUTHORIZATION, v);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a query against one table, PostgREST-style.
    pub fn from(&self, table: &str) -> Query<'_> {
        Query {
            backend: self,
            table: table.to_string(),
            params: Vec::new(),
            range: None,
            count: false,
        }
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = parse_rows(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidResponse("empty insert response".to_string()))
    }

    /// Inserts one row without asking for the representation back.
    pub async fn insert_only<B>(&self, table: &str, body: &B) -> Result<(), BackendError>
    where
        B: Serialize + ?Sized,
    {
        let resp = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }

    /// Upserts keyed on `on_conflict`, merging duplicate rows.
    pub async fn upsert<B>(&self, table: &str, on_conflict: &str, body: &B) -> Result<(), BackendError>
    where
        B: Serialize + ?Sized,
    {
        let resp = self
            .http
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(body)
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }

    /// Reachability probe against the backend base URL with an explicit
    /// abort timeout. Used only by the ping endpoint.
    pub async fn probe(&self, timeout: Duration) -> Result<(), BackendError> {
        let resp = self
            .http
            .get(&self.base_url)
            .timeout(timeout)
            .send()
            .await?;
        // Any HTTP answer means the host resolves and accepts connections.
        let _ = resp.status();
        Ok(())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[must_use]
pub struct Query<'a> {
    backend: &'a Backend,
    table: String,
    params: Vec<(String, String)>,
    range: Option<(usize, usize)>,
    count: bool,
}

impl Query<'_> {
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Case-insensitive substring match, with `%`/`_` escaped in the term.
    pub fn ilike_contains(mut self, column: &str, term: &str) -> Self {
        self.params.push((
            column.to_string(),
            format!("ilike.*{}*", escape_like(term)),
        ));
        self
    }

    /// Combined OR filter; each part is a full `col.op.value` expression.
    pub fn or(mut self, parts: &[String]) -> Self {
        self.params
            .push(("or".to_string(), format!("({})", parts.join(","))));
        self
    }

    pub fn in_list(mut self, column: &str, values: &[String]) -> Self {
        self.params
            .push((column.to_string(), format!("in.({})", values.join(","))));
        self
    }

    pub fn gte(mut self, column: &str, value: &str) -> Self {
        self.params
            .push((column.to_string(), format!("gte.{value}")));
        self
    }

    pub fn lte(mut self, column: &str, value: &str) -> Self {
        self.params
            .push((column.to_string(), format!("lte.{value}")));
        self
    }

    /// Order expression such as `creado_at.desc`.
    pub fn order(mut self, expr: &str) -> Self {
        self.params.push(("order".to_string(), expr.to_string()));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".to_string(), n.to_string()));
        self
    }

    /// Row range (inclusive offsets) with an exact total count.
    pub fn range(mut self, from: usize, to: usize) -> Self {
        self.range = Some((from, to));
        self.count = true;
        self
    }

    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Page<T>, BackendError> {
        let mut req = self
            .backend
            .http
            .get(self.backend.table_url(&self.table))
            .query(&self.params);

        if let Some((from, to)) = self.range {
            req = req
                .header("Range-Unit", "items")
                .header("Range", format!("{from}-{to}"));
        }
        if self.count {
            req = req.header("Prefer", "count=exact");
        }

        let resp = req.send().await?;
        let count = content_range_total(&resp);
        let items = parse_rows(resp).await?;
        Ok(Page { items, count })
    }

    /// Fetches at most one row.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, BackendError> {
        let page = self.limit(1).fetch::<T>().await?;
        Ok(page.items.into_iter().next())
    }

    /// Applies a partial update to every row matching the filters and
    /// returns the updated representations.
    pub async fn patch<T, B>(self, body: &B) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .backend
            .http
            .patch(self.backend.table_url(&self.table))
            .query(&self.params)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        parse_rows(resp).await
    }

    /// Deletes every row matching the filters.
    pub async fn delete(self) -> Result<(), BackendError> {
        let resp = self
            .backend
            .http
            .delete(self.backend.table_url(&self.table))
            .query(&self.params)
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }
}

pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Double-quoted `*term*` pattern for use inside an `or=(...)` expression,
/// where a bare comma or parenthesis would be parsed as a clause delimiter.
pub fn quote_or_pattern(term: &str) -> String {
    let escaped = escape_like(term).replace('"', "\\\"");
    format!("\"*{escaped}*\"")
}

fn content_range_total(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit_once('/'))
        .and_then(|(_, total)| total.parse::<u64>().ok())
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

async fn parse_rows<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, BackendError> {
    let resp = check_status(resp).await?;
    let body = resp.text().await?;
    serde_json::from_str::<Vec<T>>(&body)
        .map_err(|e| BackendError::InvalidResponse(format!("{e}; body={body}")))
}
