use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub events_table: String,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, events_table: String) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            events_table,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}
