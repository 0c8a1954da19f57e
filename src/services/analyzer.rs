use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::{ProfileAnalysis, User};
use crate::services::analysis_cache::AnalysisCache;

/// Errors from the external analyzer boundary
///
/// None of these escape `ProfileAnalysisService::analyze`; they degrade to
/// a missing qualitative signal.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Text-in/text-out boundary to the hosted language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError>;
}

/// Chat-completions client for the hosted analyzer
///
/// Speaks the common chat-completions wire shape: bearer auth, one user
/// message, reply text at `choices[0].message.content`.
pub struct AnalyzerClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl AnalyzerClient {
    pub fn new(base_url: String, api_key: String, model: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            model,
            client,
        }
    }
}

#[async_trait]
impl CompletionClient for AnalyzerClient {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.2,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalyzerError::Api(format!(
                "analysis request failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        json.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AnalyzerError::InvalidResponse("missing completion text".into()))
    }
}

/// Cache-fronted qualitative profile analysis
///
/// With no client configured, `analyze` returns `None` immediately; that is
/// the designed degraded mode, and the engine falls back to
/// skill+personality scoring. Transport and parse failures degrade the same
/// way and never block the match pipeline.
pub struct ProfileAnalysisService {
    client: Option<Arc<dyn CompletionClient>>,
    cache: AnalysisCache,
}

impl ProfileAnalysisService {
    pub fn new(client: Arc<dyn CompletionClient>, cache: AnalysisCache) -> Self {
        Self {
            client: Some(client),
            cache,
        }
    }

    /// Service without an analyzer; every `analyze` call returns `None`.
    pub fn disabled() -> Self {
        Self {
            client: None,
            cache: AnalysisCache::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn analyze(&self, user: &User) -> Option<ProfileAnalysis> {
        let client = self.client.as_ref()?;

        let key = AnalysisCache::key(&user.user_id, &user.bio);
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!("analysis cache hit: {}", user.user_id);
            return Some(hit);
        }

        let prompt = build_analysis_prompt(user);
        let raw = match client.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("qualitative analysis failed for {}: {}", user.user_id, e);
                return None;
            }
        };

        let analysis = match parse_analysis(&raw) {
            Some(analysis) => analysis,
            None => {
                tracing::warn!("unparseable analysis response for {}", user.user_id);
                return None;
            }
        };

        self.cache.put(key, analysis.clone());
        Some(analysis)
    }
}

fn build_analysis_prompt(user: &User) -> String {
    let teach: Vec<&str> = user.teach_skills.iter().map(|s| s.name.as_str()).collect();
    let learn: Vec<&str> = user.learn_skills.iter().map(|s| s.name.as_str()).collect();

    format!(
        "Evaluate this skill-exchange profile.\n\
         Teaches: {}\n\
         Wants to learn: {}\n\
         Bio: {}\n\n\
         Score teaching_expertise, learning_clarity and profile_quality \
         from 0 to 1, and list skills with reciprocal_potential.\n\
         Respond with a single JSON object with exactly those four keys. \
         No markdown fences, no commentary.",
        teach.join(", "),
        learn.join(", "),
        user.bio
    )
}

/// Drop a markdown code-fence wrapper if the model added one anyway.
fn strip_code_fences(text: &str) -> &str {
    let mut stripped = text.trim();
    if let Some(rest) = stripped.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        stripped = rest.trim_start();
        if let Some(body) = stripped.strip_suffix("```") {
            stripped = body.trim_end();
        }
    }
    stripped
}

/// Parse the analyzer reply. Missing numeric fields default to 0.5,
/// a missing reciprocal list to empty; values are clamped to [0, 1].
fn parse_analysis(raw: &str) -> Option<ProfileAnalysis> {
    let value: Value = serde_json::from_str(strip_code_fences(raw)).ok()?;

    let score = |field: &str| {
        value
            .get(field)
            .and_then(Value::as_f64)
            .unwrap_or(0.5)
            .clamp(0.0, 1.0)
    };

    let reciprocal_potential = value
        .get("reciprocal_potential")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Some(ProfileAnalysis {
        teaching_expertise: score("teaching_expertise"),
        learning_clarity: score("learning_clarity"),
        profile_quality: score("profile_quality"),
        reciprocal_potential,
    })
}
