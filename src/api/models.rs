use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub supabase_url: String,
    pub supabase_key: String,
    pub perplexity_api_key: String,
}
