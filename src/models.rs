use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything the collector holds: rows per table, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub tables: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsertResponse {
    pub table: String,
    pub inserted: usize,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub events: u64,
    pub page_views: u64,
    pub sessions: u64,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub events: u64,
    pub page_views: u64,
    pub sessions: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub table: String,
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
    pub event_types: BTreeMap<String, u64>,
}
