use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Runtime configuration, built once at startup and shared with every handler.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase_project_ref: String,
    pub supabase_anon_key: String,
    pub perplexity_api_key: String,
    pub upstream_url: String,
    pub public_dir: PathBuf,
    pub brand_dir: PathBuf,
    /// Whether `/api/config` hands the Perplexity key to callers.
    pub expose_perplexity_key: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            supabase_project_ref: String::new(),
            supabase_anon_key: String::new(),
            perplexity_api_key: String::new(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            public_dir: PathBuf::from("public"),
            brand_dir: PathBuf::from("brand"),
            expose_perplexity_key: false,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment, loading `.env` first if present.
    pub fn from_env() -> Config {
        dotenv().ok();

        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("ignoring invalid PORT value {raw:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        Config {
            port,
            supabase_project_ref: get_env_or_default("SUPABASE_PROJECT_REF", ""),
            supabase_anon_key: get_env_or_default("SUPABASE_ANON_KEY", ""),
            perplexity_api_key: get_env_or_default("PERPLEXITY_API_KEY", ""),
            upstream_url: get_env_or_default("PERPLEXITY_API_URL", DEFAULT_UPSTREAM_URL),
            public_dir: PathBuf::from(get_env_or_default("PUBLIC_DIR", "public")),
            brand_dir: PathBuf::from(get_env_or_default("BRAND_DIR", "brand")),
            expose_perplexity_key: parse_flag(&get_env_or_default("EXPOSE_PERPLEXITY_KEY", "")),
        }
    }

    /// Supabase project URL, empty when no project ref is configured.
    pub fn supabase_url(&self) -> String {
        if self.supabase_project_ref.is_empty() {
            return String::new();
        }
        format!("https://{}.supabase.co", self.supabase_project_ref)
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
