use std::path::PathBuf;

use crate::config::SubjectRoster;
use crate::store::RecordStore;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: RecordStore,
    pub subjects: SubjectRoster,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            store: RecordStore::new(),
            subjects: SubjectRoster::default(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
