use crate::model::{net_score, Student};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MISSING_KEY_TEXT: &str =
    "API Key is missing. Please ensure your environment is configured correctly.";
pub const EMPTY_REPORT_TEXT: &str = "Could not generate report.";
pub const ERROR_TEXT: &str =
    "An error occurred while generating the report. Please try again later.";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreLine {
    pub name: String,
    pub bonus: u64,
    pub minus: u64,
}

impl From<&Student> for ScoreLine {
    fn from(s: &Student) -> Self {
        ScoreLine {
            name: s.name.clone(),
            bonus: s.bonus,
            minus: s.minus,
        }
    }
}

/// Anything that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        endpoint: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        if api_key.is_empty() {
            return Err(anyhow!("API key cannot be empty"));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;
        Ok(GeminiClient {
            api_key,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };
        tracing::info!(model = %self.model, "requesting class report");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .context("report request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(anyhow!("report service returned {status}: {text}"));
        }
        let parsed: GenerateResponse = response
            .json()
            .context("failed to parse report response")?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Class report front door. Always resolves to some text.
pub struct ReportRequester {
    generator: Option<Box<dyn TextGenerator>>,
}

impl ReportRequester {
    pub fn unconfigured() -> Self {
        ReportRequester { generator: None }
    }

    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        ReportRequester {
            generator: Some(generator),
        }
    }

    /// A missing or blank key leaves the requester unconfigured.
    pub fn gemini(
        api_key: Option<&str>,
        model: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Self {
        let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            tracing::warn!("API key not configured; class reports are disabled");
            return Self::unconfigured();
        };
        let client = GeminiClient::new(
            key.to_string(),
            model.to_string(),
            endpoint.to_string(),
            timeout,
        );
        match client {
            Ok(client) => Self::with_generator(Box::new(client)),
            Err(e) => {
                tracing::error!("failed to set up report client: {e:#}");
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub fn generate_class_report(&self, class_name: &str, students: &[ScoreLine]) -> String {
        let Some(generator) = self.generator.as_ref() else {
            return MISSING_KEY_TEXT.to_string();
        };
        let prompt = build_prompt(class_name, students);
        match generator.generate(&prompt) {
            Ok(text) if text.trim().is_empty() => EMPTY_REPORT_TEXT.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::error!(class = class_name, "report generation failed: {e:#}");
                ERROR_TEXT.to_string()
            }
        }
    }
}

pub fn build_prompt(class_name: &str, students: &[ScoreLine]) -> String {
    let lines: Vec<String> = students
        .iter()
        .map(|s| {
            format!(
                "- {}: Net Score {} (Bonus: {}, Minus: {})",
                s.name,
                net_score(s.bonus, s.minus),
                s.bonus,
                s.minus
            )
        })
        .collect();
    format!(
        "I have a class of students named \"{class_name}\". \
         Here are their performance stats (Net Score = Bonus - Minus):\n\
         {}\n\n\
         Please analyze these scores and provide a short, encouraging summary for the teacher.\n\
         1. Highlight the top performer(s).\n\
         2. Suggest a general area of improvement if scores are low (high minus count), \
         or praise the class if high.\n\
         3. Keep the tone fun, professional, and motivating.\n\
         4. Keep it under 150 words.\n\
         5. Do not use markdown formatting like bold or italics, \
         just plain text with paragraphs.\n",
        lines.join("\n")
    )
}
