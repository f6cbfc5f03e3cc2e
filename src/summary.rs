use serde::Serialize;
use tracing::info;
use std::time::Instant;

use crate::error::Result;
use crate::llm::SummaryModel;

const PREVIEW_CHARS: usize = 100;

/// Where the text handed to the model came from. Selects the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Url,
    Text,
}

impl ContentKind {
    pub fn prompt(self, content: &str) -> String {
        let instructions = match self {
            ContentKind::Url => "Please provide a comprehensive summary of the following web content. Focus on the main points, key insights, and important information:",
            ContentKind::Text => "Please provide a clear and concise summary of the following text. Extract the main points and key information:",
        };

        let mut result = String::with_capacity(instructions.len() + 2 + content.len());
        result.push_str(instructions);
        result.push_str("\n\n");
        result.push_str(content);
        result
    }

    pub fn source_type(self) -> SourceType {
        match self {
            ContentKind::Url => SourceType::Url,
            ContentKind::Text => SourceType::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceType {
    #[serde(rename = "URL")]
    Url,
    Text,
}

/// Human-readable origin returned with a summary: the URL as submitted, or a
/// preview of the text capped at 100 characters plus `...`.
pub fn source_label(input: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Url => input.to_string(),
        ContentKind::Text => match input.char_indices().nth(PREVIEW_CHARS) {
            Some((idx, _)) => format!("{}...", &input[..idx]),
            None => input.to_string(),
        },
    }
}

/// Builds the prompt for `kind` and asks the model once.
pub async fn generate_summary(model: &dyn SummaryModel, content: &str, kind: ContentKind) -> Result<String> {
    let prompt = kind.prompt(content);
    let start = Instant::now();
    let summary = model.generate(&prompt).await?;
    info!(?kind, prompt_chars = prompt.chars().count(), elapsed = ?start.elapsed(), "summary generated");
    Ok(summary)
}
