//! Environment-sourced configuration
//!
//! All knobs come from the process environment; a `.env` file is loaded
//! first when present. Unset or unparseable values fall back to the
//! defaults below. The config is built once in `main` and handed to the
//! relay through `AppState` - there is no global.

use std::str::FromStr;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct Config {
    /// `GEMINI_API_KEY`. Absence disables live completions entirely; the
    /// relay then serves canned replies only.
    pub gemini_api_key: Option<String>,
    /// `GEMINI_BASE_URL` - completion API base. Overridable so tests and
    /// proxies can point the client elsewhere.
    pub api_base: String,
    /// `AI_MODEL` - completion model identifier.
    pub model: String,
    /// `AI_MAX_TOKENS` - max output tokens per completion.
    pub max_output_tokens: u32,
    /// `AI_TEMPERATURE` - sampling temperature.
    pub temperature: f32,
    /// `AI_PROVIDER` - label reported in responses and logs.
    pub provider_label: String,
    /// `AI_TIMEOUT_SECS` - per-request timeout on vendor calls. On expiry
    /// the current fallback tier fails and the next one runs.
    pub provider_timeout_secs: u64,
    /// `MENTOR_HOST`
    pub host: String,
    /// `MENTOR_PORT`
    pub port: u16,
}

/// Parse an environment variable, trimming whitespace and trailing
/// comments, falling back to `default` when unset or unparseable.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    tracing::warn!(key, value = %val, "Failed to parse config value, using default");
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        // Best effort - a missing .env just means plain env vars
        let _ = dotenvy::dotenv();

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            gemini_api_key,
            api_base: env_var_or("GEMINI_BASE_URL", DEFAULT_API_BASE.to_string()),
            model: env_var_or("AI_MODEL", "gemini-2.0-flash".to_string()),
            max_output_tokens: env_var_or("AI_MAX_TOKENS", 1000),
            temperature: env_var_or("AI_TEMPERATURE", 0.7),
            provider_label: env_var_or("AI_PROVIDER", "gemini".to_string()),
            provider_timeout_secs: env_var_or("AI_TIMEOUT_SECS", 30),
            host: env_var_or("MENTOR_HOST", "0.0.0.0".to_string()),
            port: env_var_or("MENTOR_PORT", 3001),
        }
    }
}

impl Default for Config {
    /// Defaults with no API key - useful for tests and offline runs.
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: "gemini-2.0-flash".to_string(),
            max_output_tokens: 1000,
            temperature: 0.7,
            provider_label: "gemini".to_string(),
            provider_timeout_secs: 30,
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_or_parses_clean_values() {
        // SAFETY: test-local env mutation
        unsafe { std::env::set_var("MENTOR_TEST_PORT", "8080") };
        let port: u16 = env_var_or("MENTOR_TEST_PORT", 3001);
        assert_eq!(port, 8080);
        unsafe { std::env::remove_var("MENTOR_TEST_PORT") };
    }

    #[test]
    fn test_env_var_or_strips_comments() {
        unsafe { std::env::set_var("MENTOR_TEST_TOKENS", "500 # lower for dev") };
        let tokens: u32 = env_var_or("MENTOR_TEST_TOKENS", 1000);
        assert_eq!(tokens, 500);
        unsafe { std::env::remove_var("MENTOR_TEST_TOKENS") };
    }

    #[test]
    fn test_env_var_or_falls_back_on_garbage() {
        unsafe { std::env::set_var("MENTOR_TEST_TEMP", "hot") };
        let temp: f32 = env_var_or("MENTOR_TEST_TEMP", 0.7);
        assert_eq!(temp, 0.7);
        unsafe { std::env::remove_var("MENTOR_TEST_TEMP") };
    }

    #[test]
    fn test_default_has_no_key() {
        let config = Config::default();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.max_output_tokens, 1000);
        assert_eq!(config.temperature, 0.7);
    }
}
