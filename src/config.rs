// src/config.rs

use std::env;

/// Backend connection settings, read once from the process environment.
///
/// Missing values do not abort startup: endpoints that need the absent
/// credential answer with a `NotConfigured` error payload instead.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub anon_key: Option<String>,
    pub service_key: Option<String>,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            backend_url: read_trimmed("BACKEND_URL"),
            anon_key: read_trimmed("BACKEND_ANON_KEY"),
            service_key: read_trimmed("BACKEND_SERVICE_KEY"),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        }
    }

    pub fn service_credentials(&self) -> Option<(String, String)> {
        match (&self.backend_url, &self.service_key) {
            (Some(url), Some(key)) => Some((url.clone(), key.clone())),
            _ => None,
        }
    }

    pub fn anon_credentials(&self) -> Option<(String, String)> {
        match (&self.backend_url, &self.anon_key) {
            (Some(url), Some(key)) => Some((url.clone(), key.clone())),
            _ => None,
        }
    }
}

fn read_trimmed(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}
