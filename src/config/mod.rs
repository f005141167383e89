use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration injected by the hosting page as `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub log_level: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .map(JsValue::from)
            .filter(|env| !env.is_undefined() && env.is_object());

        // Both `SUPABASE_URL` and `supabase_url` spellings are accepted.
        let lookup = |keys: &[&str]| -> Option<String> {
            let env = env.as_ref()?;
            keys.iter().find_map(|k| {
                js_sys::Reflect::get(env, &JsValue::from_str(k))
                    .ok()
                    .and_then(|v| v.as_string())
            })
        };

        Self::from_lookup(lookup)
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&[&str]) -> Option<String>) -> Self {
        let supabase_url = lookup(&["SUPABASE_URL", "supabase_url"])
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string());

        Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key: lookup(&["SUPABASE_ANON_KEY", "supabase_anon_key"])
                .unwrap_or_default(),
            log_level: lookup(&["LOG_LEVEL", "log_level"])
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    pub fn max_log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}
