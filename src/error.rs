use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Failures talking to the hosted inference endpoint. None of them are
/// retried.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to send request to inference endpoint {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("inference endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse inference response")]
    Decode(#[source] reqwest::Error),

    #[error("inference response contained no generated text")]
    Empty,
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("no suggestion at index {0}")]
    SuggestionNotFound(usize),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Inference(e) => {
                error!(error = ?e, "Inference request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "MindMate could not get a reply from the model. Please go back and try again.",
                )
            }
            AppError::Template(e) => {
                error!("Failed to get or render template: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            AppError::SuggestionNotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
        };
        let body = format!(
            "<!doctype html><html><body><p>{message}</p><p><a href=\"/\">Back to MindMate</a></p></body></html>"
        );
        (status, Html(body)).into_response()
    }
}
