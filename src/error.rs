use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub const PROXY_FAILURE_MESSAGE: &str = "Failed to fetch from Perplexity API";
pub const MISSING_FIELDS_MESSAGE: &str = "Query and location are required";
pub const SEARCH_FAILED_MESSAGE: &str = "AI search failed";

/// Failure of a single call to the upstream API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON from upstream: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Every way a request can fail, mapped to a status code in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{}", PROXY_FAILURE_MESSAGE)]
    Proxy(#[source] UpstreamError),
    /// The upstream answered, but with an error object.
    #[error("{0}")]
    SearchRejected(String),
    #[error("Erro ao fazer pesquisa IA: {0}")]
    Search(#[source] UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Proxy(_) | ApiError::SearchRejected(_) | ApiError::Search(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::BadRequest(msg) => log::warn!("rejected request: {msg}"),
            ApiError::Proxy(e) => log::error!("perplexity proxy error: {e}"),
            ApiError::SearchRejected(msg) => log::error!("perplexity reported an error: {msg}"),
            ApiError::Search(e) => log::error!("ai search error: {e}"),
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
