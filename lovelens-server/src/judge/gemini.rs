use crate::judge::{InferenceError, InferenceRequest, InferenceService};
use async_trait::async_trait;
use lovelens_core::{Commentary, Language, Mode};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GeminiConfig {
    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env() -> Self {
        let api_key = ["GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .find_map(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty());

        Self {
            api_key,
            ..Self::default()
        }
    }
}

pub struct GeminiJudge {
    http: Client,
    config: GeminiConfig,
}

impl GeminiJudge {
    pub fn new(config: GeminiConfig) -> Result<Self, InferenceError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn url(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model,
            api_key
        )
    }
}

pub fn system_prompt(mode: Mode, language: Language) -> String {
    let persona = match mode {
        Mode::Kiss => {
            "You are a hype announcer for a Stadium Kiss Cam. Analyze the image. \
             If people are kissing, celebrate wildly! If they are shy, encourage them. \
             If it's just one person, make a funny observation."
        }
        Mode::Drink => {
            "You are a hype announcer for a Stadium Drink Cam (Party Cam). Analyze the image. \
             If people are drinking or toasting, celebrate wildly! \"CHEERS!\", \"BOTTOMS UP!\" \
             If they are just holding drinks, hype them up. \
             If they are not drinking, roast them gently to get a drink."
        }
    };
    let answer_in = match language {
        Language::Th => "Thai",
        Language::En => "English",
    };
    let moods: Vec<&str> = mode.moods().iter().map(|m| m.as_str()).collect();

    format!(
        "{persona}\nMoods: {}.\nWrite the commentary in {answer_in}, at most 15 words.",
        moods.join(", ")
    )
}

pub fn build_request_body(request: &InferenceRequest) -> Value {
    let moods: Vec<&str> = request.mode.moods().iter().map(|m| m.as_str()).collect();
    let score_label = match request.mode {
        Mode::Kiss => "Kiss Score 0-100",
        Mode::Drink => "Party Score 0-100",
    };

    json!({
        "systemInstruction": {
            "parts": [{ "text": system_prompt(request.mode, request.language) }]
        },
        "contents": [{
            "parts": [
                { "inlineData": { "mimeType": "image/jpeg", "data": request.image_base64 } },
                { "text": "Return the response in JSON format." }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "text": {
                        "type": "STRING",
                        "description": "Short, punchy announcer commentary (max 15 words)"
                    },
                    "mood": { "type": "STRING", "enum": moods },
                    "score": { "type": "NUMBER", "description": score_label }
                },
                "required": ["text", "mood", "score"]
            }
        }
    })
}

/// Pulls the commentary JSON out of a `generateContent` response.
pub fn parse_response(body: &Value) -> Result<Commentary, InferenceError> {
    if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
        return Err(InferenceError::Service(message.to_owned()));
    }

    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or(InferenceError::EmptyResponse)?;

    let raw: Value = serde_json::from_str(text)?;
    // the service reports score as a JSON number, not always an integer
    let score = raw
        .get("score")
        .and_then(Value::as_f64)
        .map(|s| s.round().clamp(0.0, 255.0) as u8);

    let commentary = Commentary {
        text: serde_json::from_value(raw.get("text").cloned().unwrap_or(Value::Null))?,
        mood: serde_json::from_value(raw.get("mood").cloned().unwrap_or(Value::Null))?,
        score: score.ok_or_else(|| InferenceError::Service("missing score".into()))?,
    };
    Ok(commentary)
}

#[async_trait]
impl InferenceService for GeminiJudge {
    async fn analyze(&self, request: InferenceRequest) -> Result<Commentary, InferenceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(InferenceError::MissingApiKey)?;

        debug!(mode = %request.mode, model = %self.config.model, "Sending frame for analysis");

        let response = self
            .http
            .post(self.url(api_key))
            .json(&build_request_body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Analysis request rejected");
            return Err(InferenceError::Status(status.as_u16(), body));
        }

        let body: Value = response.json().await?;
        parse_response(&body)
    }
}
