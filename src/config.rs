use anyhow::{Result, bail};
use std::env;
use std::fmt;

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TYPING_INDICATOR: bool = true;
const DEFAULT_TYPING_INTERVAL_MS: u64 = 500;

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: Option<u64>,
    pub typing_indicator: bool,
    pub typing_interval_ms: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("typing_indicator", &self.typing_indicator)
            .field("typing_interval_ms", &self.typing_interval_ms)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let api_key = match get_var(API_KEY_VAR) {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!("{} environment variable not set", API_KEY_VAR),
        };

        Ok(Self {
            api_key,
            base_url: parse_non_empty(get_var("OPENAI_BASE_URL").as_deref(), DEFAULT_BASE_URL),
            model: parse_non_empty(get_var("OPENAI_MODEL").as_deref(), DEFAULT_MODEL),
            request_timeout_secs: parse_positive_u64(get_var("OPENAI_TIMEOUT_SECS").as_deref()),
            typing_indicator: parse_bool(
                get_var("TYPING_INDICATOR").as_deref(),
                DEFAULT_TYPING_INDICATOR,
            ),
            typing_interval_ms: parse_typing_interval_ms(get_var("TYPING_INTERVAL_MS").as_deref()),
        })
    }
}

fn parse_non_empty(raw: Option<&str>, default: &str) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn parse_positive_u64(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

fn parse_typing_interval_ms(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw).unwrap_or(DEFAULT_TYPING_INTERVAL_MS)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
