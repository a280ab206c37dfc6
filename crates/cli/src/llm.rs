use anyhow::{anyhow, Result};
use deck_slide_store::ScoredSlide;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ANSWER_TOKENS: u32 = 800;

const SYSTEM_PROMPT: &str = "You are an expert on the product deck provided to you. \
Answer questions accurately based ONLY on the provided source slides. \
If the sources do not contain an answer, say so clearly. \
Structure answers with markdown and bullet points where appropriate. \
For license comparisons, use consistent symbols (included / not included) per tier.";

/// The opaque `complete(prompt) -> text` collaborator: an OpenAI-compatible
/// chat-completions client used to summarize retrieved slides.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ChatClient {
    /// `None` when `OPENAI_API_KEY` is unset — callers degrade to
    /// retrieval-only output instead of failing.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        Some(Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: std::env::var("DECK_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        })
    }

    /// Summarize the retrieved slides into an answer for the query.
    pub async fn summarize(&self, query: &str, slides: &[ScoredSlide]) -> Result<String> {
        let mut sources = String::new();
        for (idx, slide) in slides.iter().enumerate() {
            sources.push_str(&format!(
                "\n--- SOURCE {} ---\nSlide: {}\nContent: {}\n",
                idx + 1,
                slide.slide_id,
                slide.content
            ));
        }

        let user_prompt = format!(
            "Question: {query}\n\n\
             Please provide an accurate answer based ONLY on the following sources:\n\
             {sources}\n\
             Answer concisely, using ONLY the information in these sources."
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            // Keep it factual.
            temperature: 0.0,
            max_tokens: MAX_ANSWER_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;
        let summary = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| anyhow!("empty completion response"))?;
        Ok(summary)
    }
}
