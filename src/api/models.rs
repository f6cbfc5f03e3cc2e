use serde::{Deserialize, Serialize};

use crate::summary::SourceType;

#[derive(Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub source_type: SourceType,
    pub source: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
