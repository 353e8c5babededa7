//! Relay orchestration: search, context assembly, completion.
//!
//! [`run_relay`] drives the streaming pipeline and yields wire-ready
//! [`StreamingEvent`]s; failures become `error` events rather than
//! stream errors so the consumer sees exactly one terminal event.
//! [`run_relay_once`] is the non-streaming variant used by `POST
//! /v1/chat`, returning a typed error for HTTP status mapping.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sr_completion::{CompletionBackend, CompletionEvent, CompletionRequest};
use sr_domain::config::Config;
use sr_domain::hit::{ChatbotProfile, PromptTemplate, SearchHit, SessionState, SourceRecord};
use sr_domain::stream::{BoxStream, EventSequencer, RelayUsage, StreamingEvent};
use sr_domain::{Error, Result};
use sr_search::rank::rank_and_cap;
use sr_search::{to_sources, SearchBackend};
use sr_store::ConfigStore;

/// Canned reply when the search index has nothing for the query.
pub const NO_MATCHES_MESSAGE: &str = "I couldn't find any relevant information for your query. \
     Please try rephrasing your question or contact our support team for assistance.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / dependency shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single chat turn, shared by the streaming and JSON endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub query: String,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub search_index: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Everything the orchestrator needs, behind trait objects so tests can
/// substitute stubs for the three upstream services.
#[derive(Clone)]
pub struct RelayDeps {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConfigStore>,
    pub search: Option<Arc<dyn SearchBackend>>,
    pub completion: Option<Arc<dyn CompletionBackend>>,
}

/// Per-turn settings after merging request overrides, session state,
/// the active profile, and config defaults.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub system_prompt: String,
    pub prompt_name: String,
    pub search_index: String,
    pub max_results: usize,
    pub model: String,
    pub temperature: Option<f32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Settings resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolve the effective settings for one turn.
///
/// Precedence, most specific first: request override, session state,
/// active profile, config default. Never fails: a missing or empty
/// config store degrades to config defaults.
pub async fn resolve_settings(deps: &RelayDeps, req: &RelayRequest) -> RelaySettings {
    let session = deps.store.session_state().await;
    let prompts = deps.store.prompts().await;
    let profiles = deps.store.profiles().await;

    let profile = active_profile(&profiles, &session);
    let (system_prompt, prompt_name) =
        resolve_prompt(&prompts, req, &session, profile, &deps.config);

    let relay = &deps.config.relay;
    RelaySettings {
        system_prompt,
        prompt_name,
        search_index: req
            .search_index
            .clone()
            .or_else(|| profile.map(|p| p.config.search_index.clone()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| relay.default_search_index.clone()),
        max_results: req
            .max_results
            .or_else(|| profile.and_then(|p| p.config.max_results))
            .unwrap_or(relay.max_results),
        model: req
            .model
            .clone()
            .or_else(|| profile.map(|p| p.config.model_name.clone()))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| deps.config.completion.default_model.clone()),
        temperature: req
            .temperature
            .or_else(|| profile.and_then(|p| p.config.temperature)),
    }
}

fn active_profile<'a>(
    profiles: &'a [ChatbotProfile],
    session: &SessionState,
) -> Option<&'a ChatbotProfile> {
    if let Some(id) = &session.active_chatbot_id {
        if let Some(p) = profiles.iter().find(|p| &p.id == id) {
            return Some(p);
        }
        tracing::warn!(chatbot_id = %id, "session references unknown chatbot profile");
    }
    profiles.iter().find(|p| p.is_active)
}

/// Returns `(content, name)` of the prompt template to use.
///
/// Id precedence: request, session, profile. An id that matches no
/// stored template falls through to the default-flagged template, then
/// the first stored template, then the built-in default.
fn resolve_prompt(
    prompts: &[PromptTemplate],
    req: &RelayRequest,
    session: &SessionState,
    profile: Option<&ChatbotProfile>,
    config: &Config,
) -> (String, String) {
    let wanted = req
        .prompt_id
        .clone()
        .or_else(|| session.active_prompt_id.clone())
        .or_else(|| profile.and_then(|p| p.system_prompt_id.clone()));

    if let Some(id) = &wanted {
        if let Some(p) = prompts.iter().find(|p| &p.id == id) {
            return (p.content.clone(), p.name.clone());
        }
        tracing::warn!(prompt_id = %id, "requested prompt not found, falling back");
    }
    if let Some(p) = prompts.iter().find(|p| p.is_default).or(prompts.first()) {
        return (p.content.clone(), p.name.clone());
    }
    (
        config.relay.default_system_prompt.clone(),
        "Default".to_owned(),
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Streaming pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one streaming chat turn.
///
/// Event contract: `start` with the ranked sources, zero or more
/// `content` deltas, then exactly one of `done` or `error`. A failure
/// before search produces a lone `error` event with no `start`.
pub fn run_relay(deps: RelayDeps, req: RelayRequest) -> BoxStream<'static, StreamingEvent> {
    Box::pin(async_stream::stream! {
        let mut seq = EventSequencer::new();

        let query = req.query.trim().to_owned();
        if query.is_empty() {
            if let Some(ev) = seq.error("query must not be empty") {
                yield ev;
            }
            return;
        }

        let Some(search) = deps.search.clone() else {
            if let Some(ev) = seq.error("search service is not configured") {
                yield ev;
            }
            return;
        };
        let Some(completion) = deps.completion.clone() else {
            if let Some(ev) = seq.error("completion service is not configured") {
                yield ev;
            }
            return;
        };

        let settings = resolve_settings(&deps, &req).await;
        tracing::debug!(
            index = %settings.search_index,
            model = %settings.model,
            prompt = %settings.prompt_name,
            "relay settings resolved"
        );

        let started = Instant::now();
        let hits = match search
            .search(&settings.search_index, &query, deps.config.search.pool_limit)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!(error = %e, index = %settings.search_index, "search failed");
                if let Some(ev) = seq.error(e.to_string()) {
                    yield ev;
                }
                return;
            }
        };
        let search_latency_ms = started.elapsed().as_millis() as u64;

        let hits = rank_and_cap(hits, settings.max_results);
        let sources = to_sources(&hits, &deps.config.relay.base_origin);

        if let Some(ev) = seq.start(sources) {
            yield ev;
        }

        // Zero hits: canned reply, completion service never invoked.
        if hits.is_empty() {
            if let Some(ev) = seq.content(NO_MATCHES_MESSAGE.to_owned()) {
                yield ev;
            }
            if let Some(ev) = seq.done(RelayUsage {
                search_results_count: 0,
                response_tokens: 0,
                search_latency_ms,
            }) {
                yield ev;
            }
            return;
        }

        let creq = CompletionRequest {
            query,
            system_prompt: settings.system_prompt,
            hits: hits.clone(),
            model: settings.model,
            temperature: settings.temperature,
        };
        let mut upstream = match completion.generate_stream(&creq).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "completion stream failed to start");
                if let Some(ev) = seq.error(e.to_string()) {
                    yield ev;
                }
                return;
            }
        };

        use futures_util::StreamExt;
        while let Some(item) = upstream.next().await {
            match item {
                Ok(CompletionEvent::Delta { text }) => {
                    if let Some(ev) = seq.content(text) {
                        yield ev;
                    }
                }
                Ok(CompletionEvent::Done { usage }) => {
                    if let Some(ev) = seq.done(RelayUsage {
                        search_results_count: hits.len(),
                        response_tokens: usage.completion_tokens,
                        search_latency_ms,
                    }) {
                        yield ev;
                    }
                    return;
                }
                Err(e) => {
                    tracing::error!(error = %e, "completion stream failed");
                    if let Some(ev) = seq.error(e.to_string()) {
                        yield ev;
                    }
                    return;
                }
            }
        }

        // Upstream closed without a terminal frame.
        if let Some(ev) = seq.done(RelayUsage {
            search_results_count: hits.len(),
            response_tokens: 0,
            search_latency_ms,
        }) {
            yield ev;
        }
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Non-streaming pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The `data` payload of a non-streaming chat response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatData {
    pub query: String,
    pub response: String,
    pub sources: Vec<SourceRecord>,
    pub search_results: Vec<SearchHit>,
    pub prompt_used: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub data: ChatData,
    pub usage: RelayUsage,
}

/// Run one chat turn and return the complete response.
pub async fn run_relay_once(deps: &RelayDeps, req: &RelayRequest) -> Result<ChatOutcome> {
    let query = req.query.trim().to_owned();
    if query.is_empty() {
        return Err(Error::Validation("query must not be empty".into()));
    }
    let search = deps
        .search
        .clone()
        .ok_or_else(|| Error::Config("search service is not configured".into()))?;
    let completion = deps
        .completion
        .clone()
        .ok_or_else(|| Error::Config("completion service is not configured".into()))?;

    let settings = resolve_settings(deps, req).await;

    let started = Instant::now();
    let hits = search
        .search(&settings.search_index, &query, deps.config.search.pool_limit)
        .await?;
    let search_latency_ms = started.elapsed().as_millis() as u64;

    let hits = rank_and_cap(hits, settings.max_results);
    let sources = to_sources(&hits, &deps.config.relay.base_origin);

    if hits.is_empty() {
        return Ok(ChatOutcome {
            data: ChatData {
                query,
                response: NO_MATCHES_MESSAGE.to_owned(),
                sources,
                search_results: hits,
                prompt_used: settings.prompt_name,
                model: settings.model,
                timestamp: Utc::now(),
            },
            usage: RelayUsage {
                search_results_count: 0,
                response_tokens: 0,
                search_latency_ms,
            },
        });
    }

    let creq = CompletionRequest {
        query: query.clone(),
        system_prompt: settings.system_prompt,
        hits: hits.clone(),
        model: settings.model.clone(),
        temperature: settings.temperature,
    };
    let reply = completion.generate(&creq).await?;

    Ok(ChatOutcome {
        usage: RelayUsage {
            search_results_count: hits.len(),
            response_tokens: reply.token_count,
            search_latency_ms,
        },
        data: ChatData {
            query,
            response: reply.text,
            sources,
            search_results: hits,
            prompt_used: settings.prompt_name,
            model: settings.model,
            timestamp: Utc::now(),
        },
    })
}
