use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde_json::{Map, Value};

use crate::error::{ApiError, MISSING_FIELDS_MESSAGE};
use crate::research::{self, SearchRequest, SearchResponse};

use super::AppState;
use super::models::ConfigResponse;

pub async fn config_handler(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;
    let perplexity_api_key = if config.expose_perplexity_key {
        config.perplexity_api_key.clone()
    } else {
        String::new()
    };

    Json(ConfigResponse {
        supabase_url: config.supabase_url(),
        supabase_key: config.supabase_anon_key.clone(),
        perplexity_api_key,
    })
}

pub async fn perplexity_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(&headers, &body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let reply = state
        .upstream
        .forward(&body)
        .await
        .map_err(ApiError::Proxy)?;

    Ok(Json(reply))
}

pub async fn ai_search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SearchResponse>, ApiError> {
    // an unreadable body is missing its required fields by definition
    let request = match json_body(&headers, &body) {
        Ok(object @ Value::Object(_)) => serde_json::from_value::<SearchRequest>(object).ok(),
        _ => None,
    }
    .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()))?;

    let response = research::search(&state.upstream, request).await?;
    Ok(Json(response))
}

/// Read a request body the way a JSON body parser does: bodies that are not
/// declared as JSON, and empty JSON bodies, read as `{}`.
fn json_body(headers: &HeaderMap, body: &[u8]) -> Result<Value, serde_json::Error> {
    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        headers
    }

    #[test]
    fn undeclared_or_empty_bodies_read_as_empty_object() {
        assert_eq!(json_body(&headers(None), br#"{"a":1}"#).unwrap(), json!({}));
        assert_eq!(
            json_body(&headers(Some("text/plain")), br#"{"a":1}"#).unwrap(),
            json!({})
        );
        assert_eq!(
            json_body(&headers(Some("application/json")), b"  ").unwrap(),
            json!({})
        );
    }

    #[test]
    fn json_bodies_are_parsed() {
        let body = br#"{"model":"sonar"}"#;
        assert_eq!(
            json_body(&headers(Some("application/json; charset=utf-8")), body).unwrap(),
            json!({ "model": "sonar" })
        );
        assert_eq!(
            json_body(&headers(Some("application/vnd.api+json")), body).unwrap(),
            json!({ "model": "sonar" })
        );
        assert!(json_body(&headers(Some("application/json")), b"{not json").is_err());
    }
}
