//! Report written by an OpenAI-compatible chat-completions API

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ReportGenerator, ReportInput, SECTIONS, TOPICS};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 3000;

const SYSTEM_PROMPT: &str =
    "You are an expert workplace wellness coach specializing in burnout recovery.";

/// Connection settings for the chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl ChatConfig {
    /// Create config from environment variables
    ///
    /// Required: REPORT_API_KEY. Optional: REPORT_API_URL, REPORT_MODEL.
    pub fn from_env() -> Option<Self> {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        Some(Self {
            api_key: get_env("REPORT_API_KEY")?,
            api_url: get_env("REPORT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: get_env("REPORT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Report generator backed by a hosted language model.
///
/// Uses a blocking client; call it from a blocking task.
pub struct ChatReportGenerator {
    client: Client,
    config: ChatConfig,
}

impl ChatReportGenerator {
    pub fn new(config: ChatConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }
}

/// The user prompt for one visitor
pub fn build_prompt(input: &ReportInput) -> String {
    let mut answers = String::new();
    for (id, topic) in TOPICS {
        answers.push_str(&format!("{}. {}: {}\n", id, topic, input.answer(id)));
    }

    let mut sections = String::new();
    for (i, title) in SECTIONS.iter().enumerate() {
        sections.push_str(&format!("## {}. {}\n", i + 1, title));
    }

    format!(
        "Generate a comprehensive, personalized burnout recovery report.\n\n\
         USER DETAILS:\n\
         - Name: {name}\n\
         - Burnout Score: {score}/100\n\
         - Burnout Level: {level}\n\n\
         ASSESSMENT ANSWERS:\n{answers}\n\
         Use a professional, warm and supportive tone. Address {name} by first name, \
         refer to their specific answers, keep advice practical, and avoid medical \
         terminology or fear-based language.\n\n\
         Use markdown with exactly these eight sections:\n\n\
         # Your Personalized Burnout Recovery Report\n\n{sections}\n\
         The 14-Day Recovery Action Plan must break down Week 1 and Week 2. \
         Length: 1500-2500 words.",
        name = input.first_name,
        score = input.score,
        level = input.level,
        answers = answers,
        sections = sections,
    )
}

impl ReportGenerator for ChatReportGenerator {
    fn generate(&self, input: &ReportInput) -> Result<String, String> {
        tracing::info!(score = input.score, level = %input.level, model = %self.config.model, "Requesting report");

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(input) },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| format!("Failed to generate report: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Failed to generate report: HTTP error {}",
                response.status()
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| format!("Failed to generate report: {}", e))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| "Failed to generate report: empty response".to_string())
    }
}
