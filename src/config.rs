use crate::errors::TrackError;
use crate::outbox::OutboxConfig;
use crate::tracker::DEFAULT_EVENTS_TABLE;
use crate::transport::RestConfig;
use std::env;

/// Tracker settings read from the environment.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub rest: RestConfig,
    pub events_table: String,
    pub outbox: OutboxConfig,
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self, TrackError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TrackError> {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(TrackError::MissingConfig(key))
        };
        let base_url = require("SUPABASE_URL")?;
        let api_key = require("SUPABASE_ANON_KEY")?;

        Ok(Self {
            rest: RestConfig { base_url, api_key },
            events_table: table_or_default(lookup("EVENTS_TABLE")),
            outbox: OutboxConfig::default(),
        })
    }
}

pub fn events_table() -> String {
    table_or_default(env::var("EVENTS_TABLE").ok())
}

fn table_or_default(value: Option<String>) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EVENTS_TABLE.to_string())
}

pub fn port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080)
}

/// Key the collector expects in the `apikey` header, if any.
pub fn collector_key() -> Option<String> {
    env::var("COLLECTOR_ANON_KEY")
        .ok()
        .filter(|value| !value.is_empty())
}
