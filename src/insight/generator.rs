use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{ApyPoint, Pool};

/// Default timeout for one generation round-trip.
const GENERATOR_TIMEOUT_SECS: u64 = 30;

/// Structured narrative produced by the generator for a single pool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// Why the pool scored the way it did, in plain language.
    pub risk_explanation: String,
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
    pub apy_stability_analysis: String,
    pub comparison: InsightComparison,
    /// One-line bottom line.
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightComparison {
    pub vs_similar_pools: String,
    /// e.g. "top quartile by risk-adjusted yield on this chain".
    pub relative_position: String,
}

/// Narrative generator collaborator (typically LLM-backed). Implementations
/// must fail with an error when the backend is unreachable — never fabricate
/// a degraded narrative and pass it off as real.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(
        &self,
        pool: &Pool,
        similar: &[Pool],
        history: &[ApyPoint],
    ) -> Result<Insight>;
}

// ── HTTP (chat-completions) implementation ──────────────────────────

/// Generator backed by an OpenAI-compatible chat-completions endpoint.
/// The model is prompted with the pool data and the `Insight` JSON schema and
/// must reply with a single JSON object.
pub struct HttpInsightGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpInsightGenerator {
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(GENERATOR_TIMEOUT_SECS))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    fn prompt(pool: &Pool, similar: &[Pool], history: &[ApyPoint]) -> Result<String> {
        let schema = schemars::schema_for!(Insight);
        Ok(format!(
            "You are a DeFi yield analyst. Analyze this pool and reply with a \
             single JSON object matching this schema (no prose outside JSON):\n\
             {schema}\n\nPool:\n{pool}\n\nSimilar pools:\n{similar}\n\n\
             Recent APY history:\n{history}",
            schema = serde_json::to_string(&schema)?,
            pool = serde_json::to_string_pretty(pool)?,
            similar = serde_json::to_string(similar)?,
            history = serde_json::to_string(history)?,
        ))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl InsightGenerator for HttpInsightGenerator {
    async fn generate(
        &self,
        pool: &Pool,
        similar: &[Pool],
        history: &[ApyPoint],
    ) -> Result<Insight> {
        if self.api_key.is_empty() {
            return Err(anyhow!("generator not configured (missing API key)"));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": Self::prompt(pool, similar, history)? }],
            "temperature": 0.3,
            "response_format": { "type": "json_object" },
        });

        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("generator request failed")?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_else(|_| "unknown error".into());
            return Err(anyhow!("generator returned {status}: {text}"));
        }

        let chat: ChatResponse = resp.json().await.context("decoding generator response")?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| anyhow!("generator returned no choices"))?;

        serde_json::from_str(content).context("generator reply was not a valid Insight")
    }
}
