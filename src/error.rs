use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Fetch(String),

    #[error("An error occurred: Error generating summary with Gemini: {0}")]
    Model(String),

    #[error("An error occurred: {0}")]
    Unhandled(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Fetch(_) => StatusCode::BAD_REQUEST,
            AppError::Model(_) | AppError::Unhandled(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error(self.status(), self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
