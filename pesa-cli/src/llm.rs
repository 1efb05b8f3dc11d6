//! Transaction categorization through an OpenAI-compatible chat endpoint.

use std::time::Duration;

use async_trait::async_trait;
use pesa_core::{Categorizer, Category, Error, Result, Transaction};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmSection;

const SYSTEM_PROMPT: &str = "You categorize M-Pesa transactions. Reply with only a JSON array \
of objects {\"id\": string, \"category\": string}, one per input transaction. Use exactly one \
of these categories: ";

pub struct LlmCategorizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl LlmCategorizer {
    /// None when the configured key variable is unset or empty.
    pub fn from_config(cfg: &LlmSection) -> Result<Option<Self>> {
        let api_key = match std::env::var(&cfg.api_key_env) {
            Ok(k) if !k.trim().is_empty() => k,
            _ => return Ok(None),
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::ExternalService(format!("build http client: {e}")))?;
        Ok(Some(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            api_key,
        }))
    }
}

#[derive(Serialize)]
struct Msg {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg>,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

#[derive(Serialize)]
struct PromptRow<'a> {
    id: &'a str,
    description: &'a str,
    counterparty: &'a str,
    amount: f64,
}

#[derive(Deserialize)]
struct Assignment {
    id: String,
    category: String,
}

fn system_prompt() -> String {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
    format!("{SYSTEM_PROMPT}{}.", names.join(", "))
}

/// Pull `(id, category)` pairs out of a model reply; prose or code fences
/// around the array are ignored, unknown categories are dropped.
pub fn parse_assignments(reply: &str) -> Result<Vec<(String, Category)>> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    let body = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => return Err(Error::ExternalService("reply has no JSON array".to_string())),
    };
    let rows: Vec<Assignment> = serde_json::from_str(body)?;
    Ok(rows
        .into_iter()
        .filter_map(|a| Category::from_label(&a.category).map(|c| (a.id, c)))
        .collect())
}

fn apply(mut txns: Vec<Transaction>, assignments: &[(String, Category)]) -> Vec<Transaction> {
    for t in &mut txns {
        if let Some((_, c)) = assignments.iter().find(|(id, _)| *id == t.transaction_id) {
            t.category = *c;
        }
    }
    txns
}

#[async_trait]
impl Categorizer for LlmCategorizer {
    async fn categorize(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>> {
        if txns.iter().all(|t| t.is_summary_anchor()) {
            return Ok(txns);
        }
        let (user_content, requested) = {
            let rows: Vec<PromptRow<'_>> = txns
                .iter()
                .filter(|t| !t.is_summary_anchor())
                .map(|t| PromptRow {
                    id: &t.transaction_id,
                    description: &t.description,
                    counterparty: &t.counterparty,
                    amount: t.amount,
                })
                .collect();
            (serde_json::to_string(&rows)?, rows.len())
        };

        let body = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system_prompt(),
                },
                Msg {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.temperature,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::ExternalService(format!("categorization request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(Error::ExternalService(format!("categorization error: {status} {txt}")));
        }

        let out: Resp = resp
            .json()
            .await
            .map_err(|e| Error::ExternalService(format!("parse categorization response: {e}")))?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let assignments = parse_assignments(&content)?;
        debug!(requested, assigned = assignments.len(), "llm categorization");
        Ok(apply(txns, &assignments))
    }
}
