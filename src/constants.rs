// Runtime defaults, loaded from the environment (or `.env`) on first use.

use std::env;

lazy_static::lazy_static! {
    /// Token for the hosted inference provider. Empty when unset.
    pub static ref HF_TOKEN: String = env::var("HF_TOKEN").unwrap_or_default();
    pub static ref HF_INFERENCE_URL: String = env::var("HF_INFERENCE_URL")
        .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string());
    pub static ref TEMPLATES_DIR: String = env::var("MINDMATE_TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("MINDMATE_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
}

/// Cookie carrying the browser's session id.
pub const SESSION_COOKIE: &str = "mindmate_session";

pub const DEFAULT_PORT: u16 = 8501;

// Generation parameters sent with every turn.
pub const MAX_NEW_TOKENS: u32 = 1024;
pub const TEMPERATURE: f64 = 0.7;
pub const DO_SAMPLE: bool = true;
pub const TOP_P: f64 = 0.9;
pub const REPETITION_PENALTY: f64 = 1.1;
/// Stops generation when the model starts a new user turn.
pub const USER_TURN_MARKER: &str = "<|user|>";
pub const ASSISTANT_TURN_MARKER: &str = "<|assistant|>";

/// Sessions untouched for this long are dropped.
pub const SESSION_IDLE_TTL: std::time::Duration = std::time::Duration::from_secs(60 * 60);
