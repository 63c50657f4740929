//! Market research searches for the "Everywhere Digital School" tour.
//!
//! A search wraps the user's query in a fixed Portuguese system prompt, sends
//! it upstream with fixed generation parameters and reshapes the reply into
//! the small contract the dashboard consumes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::data_models::{ChatMessage, ChatRequest, ChatResponse};
use crate::error::{ApiError, MISSING_FIELDS_MESSAGE, SEARCH_FAILED_MESSAGE};
use crate::upstream::PerplexityClient;

pub const MODEL: &str = "sonar";
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 4000;
pub const RECENCY_FILTER: &str = "month";
pub const NO_RESULTS: &str = "Sem resultados disponíveis";

pub const SYSTEM_PROMPT: &str = "És um assistente especializado em análise de mercado e estratégia para a Lisbon Digital School (LDS),
uma escola de formação em competências digitais com sede em Lisboa, Portugal.
A LDS está a realizar uma digressão chamada \"Everywhere Digital School\" por várias cidades de Portugal.

O teu objectivo é fornecer informação detalhada, actualizada e accionável para ajudar a planear eventos em diferentes localidades.
Responde sempre em Português de Portugal.
Usa formatação Markdown para estruturar a resposta.
Sê específico com nomes de empresas, instituições, contactos e links quando possível.
Baseia as tuas respostas em dados reais e actualizados.";

/// Inbound search body. `query` and `location` only need to be truthy, so
/// every field is taken as raw JSON. An explicit `null` in `level` or `type`
/// is kept as `Some(Value::Null)` and echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub level: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "present")]
    pub kind: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub content: String,
    pub location: Value,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub level: Option<Value>,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<Value>,
    pub timestamp: String,
    pub citations: Value,
}

/// A search request whose required fields are known to be present.
#[derive(Debug, Clone)]
pub struct ValidSearch {
    pub query: String,
    pub location: Value,
    pub level: Option<Value>,
    pub kind: Option<Value>,
}

impl SearchRequest {
    pub fn validate(self) -> Result<ValidSearch, ApiError> {
        let query = self.query.filter(is_truthy);
        let location = self.location.filter(is_truthy);
        match (query, location) {
            (Some(query), Some(location)) => Ok(ValidSearch {
                query: match query {
                    Value::String(q) => q,
                    other => other.to_string(),
                },
                location,
                level: self.level,
                kind: self.kind,
            }),
            _ => Err(ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// Deserialize a field that was present in the body, `null` included.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

pub fn build_chat_request(query: &str) -> ChatRequest {
    ChatRequest {
        model: MODEL.to_string(),
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(query)],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        search_recency_filter: RECENCY_FILTER.to_string(),
    }
}

/// Turn an upstream reply into the outbound contract, or the upstream's own error.
pub fn shape_response(
    search: ValidSearch,
    reply: ChatResponse,
    now: DateTime<Utc>,
) -> Result<SearchResponse, ApiError> {
    if let Some(error) = reply.error.as_ref().filter(|e| is_truthy(e)) {
        return Err(ApiError::SearchRejected(upstream_error_message(error)));
    }

    let content = reply.first_content().unwrap_or(NO_RESULTS).to_string();

    Ok(SearchResponse {
        content,
        location: search.location,
        level: search.level,
        kind: search.kind,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        citations: reply
            .citations
            .filter(is_truthy)
            .unwrap_or_else(|| Value::Array(Vec::new())),
    })
}

pub async fn search(
    client: &PerplexityClient,
    request: SearchRequest,
) -> Result<SearchResponse, ApiError> {
    let search = request.validate()?;
    log::info!("ai search for {:?} in {}", search.query, search.location);

    let reply = client
        .chat(&build_chat_request(&search.query))
        .await
        .map_err(ApiError::Search)?;

    shape_response(search, reply, Utc::now())
}

fn upstream_error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(SEARCH_FAILED_MESSAGE)
        .to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn braga() -> ValidSearch {
        ValidSearch {
            query: "eventos em Braga".to_string(),
            location: json!("Braga"),
            level: None,
            kind: None,
        }
    }

    fn reply(value: Value) -> ChatResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn falsy_error_fields_are_ignored() {
        for error in [json!(null), json!(false), json!(0), json!("")] {
            let res = shape_response(braga(), reply(json!({ "error": error })), Utc::now());
            assert_eq!(res.unwrap().content, NO_RESULTS);
        }
    }

    #[test]
    fn error_without_message_falls_back() {
        let res = shape_response(braga(), reply(json!({ "error": "boom" })), Utc::now());
        match res {
            Err(ApiError::SearchRejected(msg)) => assert_eq!(msg, SEARCH_FAILED_MESSAGE),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_content_falls_back() {
        let value = json!({ "choices": [{ "message": { "content": "" } }] });
        let res = shape_response(braga(), reply(value), Utc::now()).unwrap();
        assert_eq!(res.content, NO_RESULTS);
    }

    #[test]
    fn null_first_choice_falls_back() {
        let value = json!({ "choices": [null], "citations": ["u"] });
        let res = shape_response(braga(), reply(value), Utc::now()).unwrap();
        assert_eq!(res.content, NO_RESULTS);
        assert_eq!(res.citations, json!(["u"]));
    }

    #[test]
    fn only_the_first_choice_is_read() {
        let value = json!({ "choices": [{ "message": { "content": "primeiro" } }, 7, "x"] });
        let res = shape_response(braga(), reply(value), Utc::now()).unwrap();
        assert_eq!(res.content, "primeiro");
    }

    #[test]
    fn non_string_query_is_stringified() {
        let request: SearchRequest =
            serde_json::from_value(json!({ "query": 2025, "location": 4700 })).unwrap();
        let search = request.validate().unwrap();
        assert_eq!(search.query, "2025");
        assert_eq!(search.location, json!(4700));
    }

    #[test]
    fn falsy_required_fields_are_missing() {
        for (query, location) in [
            (json!(false), json!("Braga")),
            (json!("q"), json!(0)),
            (json!("q"), json!(null)),
            (json!(""), json!("Braga")),
        ] {
            let request: SearchRequest =
                serde_json::from_value(json!({ "query": query, "location": location })).unwrap();
            assert!(matches!(request.validate(), Err(ApiError::BadRequest(_))));
        }
    }

    #[test]
    fn explicit_null_level_is_echoed() {
        let request: SearchRequest = serde_json::from_value(
            json!({ "query": "q", "location": "Braga", "level": null }),
        )
        .unwrap();
        let search = request.validate().unwrap();
        let res = shape_response(search, ChatResponse::default(), Utc::now()).unwrap();

        let out = serde_json::to_value(&res).unwrap();
        assert_eq!(out["level"], Value::Null);
        assert!(out.as_object().unwrap().contains_key("level"));
        assert!(!out.as_object().unwrap().contains_key("type"));
    }
}
