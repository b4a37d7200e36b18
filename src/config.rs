use std::env;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4-0613";
const DEFAULT_MODEL_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_SYSTEM_PROMPT: &str =
    "전문의사. 말이많고 친절하고 환자진단과 치료방안 제시를 목적. 10번 안에 대화를 끝내야 해.";
const DEFAULT_MAX_TURNS: usize = 10;
const DEFAULT_CHAT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_CHAT_RETRY_BACKOFF_MS: u64 = 500;
const DEFAULT_CHAT_RETRY_MAX_BACKOFF_MS: u64 = 8_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_CHAT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_CHAT_RETRY_BACKOFF_MS,
            max_backoff_ms: DEFAULT_CHAT_RETRY_MAX_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(32);
        let delay = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub model_api_url: String,
    pub api_key_var: String,
    pub system_prompt: String,
    pub max_turns: usize,
    pub model_timeout_secs: Option<u64>,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let max_attempts = parse_positive_u64(
            get_var("CHAT_MAX_ATTEMPTS").as_deref(),
            u64::from(DEFAULT_CHAT_MAX_ATTEMPTS),
        );
        let initial_backoff_ms = parse_u64(
            get_var("CHAT_RETRY_BACKOFF_MS").as_deref(),
            DEFAULT_CHAT_RETRY_BACKOFF_MS,
        );
        let max_backoff_ms = parse_u64(
            get_var("CHAT_RETRY_MAX_BACKOFF_MS").as_deref(),
            DEFAULT_CHAT_RETRY_MAX_BACKOFF_MS,
        );

        Self {
            model: non_empty(get_var("MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_api_url: non_empty(get_var("MODEL_API_URL"))
                .unwrap_or_else(|| DEFAULT_MODEL_API_URL.to_string()),
            api_key_var: non_empty(get_var("API_KEY_VAR"))
                .unwrap_or_else(|| DEFAULT_API_KEY_VAR.to_string()),
            system_prompt: get_var("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            max_turns: parse_max_turns(get_var("MAX_TURNS").as_deref()),
            model_timeout_secs: parse_optional_timeout_secs(
                get_var("MODEL_TIMEOUT_SECS").as_deref(),
            ),
            retry: RetryPolicy {
                max_attempts: u32::try_from(max_attempts).unwrap_or(u32::MAX),
                initial_backoff_ms,
                max_backoff_ms,
            },
        }
    }

    pub fn model_timeout(&self) -> Option<Duration> {
        self.model_timeout_secs.map(Duration::from_secs)
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_max_turns(raw: Option<&str>) -> usize {
    let turns = parse_positive_u64(raw, DEFAULT_MAX_TURNS as u64);
    usize::try_from(turns).unwrap_or(DEFAULT_MAX_TURNS)
}

fn parse_optional_timeout_secs(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
