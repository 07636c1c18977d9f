//! AI message rewriting
//!
//! Rewrites outgoing chat text in a configured tone through genai. The
//! provider is inferred from the model name (e.g. `gpt-*` uses OpenAI and
//! reads `OPENAI_API_KEY`).

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::Client as GenAIClient;

use crate::core::config::AiConfig;
use crate::realtime::TextRewriter;

pub struct GenAiRewriter {
    client: GenAIClient,
    model: String,
    options: ChatOptions,
}

impl GenAiRewriter {
    pub fn new(config: &AiConfig) -> Self {
        info!("[AI] Message rewrite enabled, model {} tone {}", config.model, config.tone);

        let options = ChatOptions::default()
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_top_p(config.top_p);

        Self {
            client: GenAIClient::default(),
            model: config.model.clone(),
            options,
        }
    }
}

fn system_prompt(tone: &str) -> String {
    format!(
        "Rewrite the user's chat message in a {} tone. Keep its meaning and language. \
         Reply with the rewritten message only.",
        tone
    )
}

#[async_trait]
impl TextRewriter for GenAiRewriter {
    async fn rewrite(&self, text: &str, tone: &str) -> Result<String> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(system_prompt(tone)),
            ChatMessage::user(text),
        ]);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&self.options))
            .await
            .map_err(|e| anyhow::anyhow!("GenAI error: {}", e))?;

        let rewritten = response
            .first_text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Empty rewrite response"))?
            .to_string();

        debug!("[AI] Rewrote {:?} -> {:?}", text, rewritten);
        Ok(rewritten)
    }
}
