use crate::errors::TrackError;
use reqwest::Client;
use serde_json::Value;
use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

/// Inserts one record into a named remote table.
pub trait Transport: Send + Sync + 'static {
    fn insert<'a>(
        &'a self,
        table: &'a str,
        record: &'a Value,
    ) -> impl Future<Output = Result<(), TrackError>> + Send + 'a;
}

#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Hosted-database client speaking the `/rest/v1/{table}` insert protocol.
///
/// Cheap to clone; the inner [`reqwest::Client`] is shared.
#[derive(Clone)]
pub struct RestTransport {
    client: Client,
    config: RestConfig,
}

impl RestTransport {
    pub fn new(config: RestConfig) -> Result<Self, TrackError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url.trim_end_matches('/'), table)
    }
}

impl Transport for RestTransport {
    fn insert<'a>(
        &'a self,
        table: &'a str,
        record: &'a Value,
    ) -> impl Future<Output = Result<(), TrackError>> + Send + 'a {
        async move {
            let resp = self
                .client
                .post(self.url(table))
                .header("apikey", &self.config.api_key)
                .bearer_auth(&self.config.api_key)
                .header("Prefer", "return=minimal")
                .json(record)
                .send()
                .await?;

            let status = resp.status();
            if status.is_success() {
                return Ok(());
            }
            let body = resp.text().await.unwrap_or_default();
            Err(TrackError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Keeps inserted rows in memory. Can be told to fail its first calls.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    rows: Vec<(String, Value)>,
    attempts: usize,
    failures_left: usize,
    failure_status: Option<u16>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `count` inserts with a retryable transport error.
    pub fn failing(count: usize) -> Self {
        let transport = Self::default();
        transport.lock().failures_left = count;
        transport
    }

    /// Rejects every insert with `status`.
    pub fn rejecting(status: u16) -> Self {
        let transport = Self::default();
        transport.lock().failure_status = Some(status);
        transport
    }

    pub fn rows(&self) -> Vec<(String, Value)> {
        self.lock().rows.clone()
    }

    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    fn insert<'a>(
        &'a self,
        table: &'a str,
        record: &'a Value,
    ) -> impl Future<Output = Result<(), TrackError>> + Send + 'a {
        let result = {
            let mut inner = self.lock();
            inner.attempts += 1;
            if let Some(status) = inner.failure_status {
                Err(TrackError::Rejected {
                    status,
                    body: "rejected".to_string(),
                })
            } else if inner.failures_left > 0 {
                inner.failures_left -= 1;
                Err(TrackError::Transport("connection reset".to_string()))
            } else {
                inner.rows.push((table.to_string(), record.clone()));
                Ok(())
            }
        };
        std::future::ready(result)
    }
}
