use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::catalog::Model;
use crate::constants;
use crate::error::InferenceError;

// Structures matching the provider's text-generation endpoint
#[derive(Serialize, Debug)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub do_sample: bool,
    pub top_p: f64,
    pub repetition_penalty: f64,
    pub stop: Vec<String>,
    /// Only the continuation, not the prompt echoed back.
    pub return_full_text: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: constants::MAX_NEW_TOKENS,
            temperature: constants::TEMPERATURE,
            do_sample: constants::DO_SAMPLE,
            top_p: constants::TOP_P,
            repetition_penalty: constants::REPETITION_PENALTY,
            stop: vec![constants::USER_TURN_MARKER.to_string()],
            return_full_text: false,
        }
    }
}

#[derive(Deserialize, Debug)]
struct Generation {
    generated_text: String,
}

// The endpoint answers with a list, some deployments with a bare object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<Generation>),
    One(Generation),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerationResponse::Many(generations) => {
                generations.into_iter().next().map(|g| g.generated_text)
            }
            GenerationResponse::One(generation) => Some(generation.generated_text),
        }
    }
}

/// Client for the hosted text-generation endpoint.
#[derive(Clone)]
pub struct InferenceClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    parameters: GenerationParameters,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl InferenceClient {
    /// An empty token sends requests without an `Authorization` header.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: (!token.is_empty()).then_some(token),
            parameters: GenerationParameters::default(),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn endpoint(&self, model: Model) -> String {
        format!("{}/models/{}", self.base_url, model.repo_id())
    }

    /// Sends `prompt` to `model` and returns the continuation, trimmed.
    #[instrument(skip(self, prompt, model), fields(model = model.repo_id()))]
    pub async fn generate(&self, prompt: &str, model: Model) -> Result<String, InferenceError> {
        let url = self.endpoint(model);
        let payload = GenerationRequest {
            inputs: prompt,
            parameters: self.parameters.clone(),
        };

        debug!(prompt_len = prompt.len(), "Sending generation request");

        let mut request = self.http.post(&url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| InferenceError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Inference request failed");
            return Err(InferenceError::Status { status, body });
        }

        let generation = response
            .json::<GenerationResponse>()
            .await
            .map_err(InferenceError::Decode)?;

        let text = generation.into_text().ok_or(InferenceError::Empty)?;
        debug!(response = ?text, "Received generation");

        Ok(text.trim().to_string())
    }
}
