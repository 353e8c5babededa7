//! Orchestrator tests with stubbed upstream services.
//!
//! Covers the event-ordering contract, zero-hit short circuit, ranking
//! of sources, failure surfacing, and settings resolution precedence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::json;

use sr_completion::{Completion, CompletionBackend, CompletionEvent, CompletionRequest};
use sr_domain::config::Config;
use sr_domain::hit::{
    ChatbotProfile, FieldMap, ProfileConfig, PromptTemplate, SearchHit, SessionState,
};
use sr_domain::stream::{BoxStream, StreamingEvent, TokenUsage};
use sr_domain::{Error, Result};
use sr_gateway::relay::{
    resolve_settings, run_relay, run_relay_once, RelayDeps, RelayRequest, NO_MATCHES_MESSAGE,
};
use sr_search::SearchBackend;
use sr_store::ConfigStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stubs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct StubStore {
    prompts: Vec<PromptTemplate>,
    profiles: Vec<ChatbotProfile>,
    session: SessionState,
}

#[async_trait::async_trait]
impl ConfigStore for StubStore {
    async fn prompts(&self) -> Vec<PromptTemplate> {
        self.prompts.clone()
    }
    async fn profiles(&self) -> Vec<ChatbotProfile> {
        self.profiles.clone()
    }
    async fn session_state(&self) -> SessionState {
        self.session.clone()
    }
    async fn put_session_state(&self, _state: &SessionState) -> Result<()> {
        Ok(())
    }
}

struct StubSearch {
    hits: Vec<SearchHit>,
    called: AtomicBool,
}

impl StubSearch {
    fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            called: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl SearchBackend for StubSearch {
    async fn search(&self, _index: &str, _query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
        self.called.store(true, Ordering::SeqCst);
        Ok(self.hits.clone())
    }
}

struct FailingSearch;

#[async_trait::async_trait]
impl SearchBackend for FailingSearch {
    async fn search(&self, _index: &str, _query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
        Err(Error::Search("search service returned status 502".into()))
    }
}

struct StubCompletion {
    deltas: Vec<&'static str>,
    completion_tokens: u32,
    called: Arc<AtomicBool>,
}

impl StubCompletion {
    fn new(deltas: Vec<&'static str>, completion_tokens: u32) -> Self {
        Self {
            deltas,
            completion_tokens,
            called: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for StubCompletion {
    async fn generate(&self, _req: &CompletionRequest) -> Result<Completion> {
        self.called.store(true, Ordering::SeqCst);
        Ok(Completion {
            text: self.deltas.concat(),
            token_count: self.completion_tokens,
        })
    }

    async fn generate_stream(
        &self,
        _req: &CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionEvent>>> {
        self.called.store(true, Ordering::SeqCst);
        let mut events: Vec<Result<CompletionEvent>> = self
            .deltas
            .iter()
            .map(|d| {
                Ok(CompletionEvent::Delta {
                    text: (*d).to_owned(),
                })
            })
            .collect();
        events.push(Ok(CompletionEvent::Done {
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: self.completion_tokens,
                total_tokens: 100 + self.completion_tokens,
            },
        }));
        Ok(Box::pin(futures_util::stream::iter(events)))
    }
}

struct FailingCompletion;

#[async_trait::async_trait]
impl CompletionBackend for FailingCompletion {
    async fn generate(&self, _req: &CompletionRequest) -> Result<Completion> {
        Err(Error::Completion {
            status: Some(500),
            message: "upstream exploded".into(),
        })
    }

    async fn generate_stream(
        &self,
        _req: &CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionEvent>>> {
        Ok(Box::pin(futures_util::stream::iter(vec![
            Ok(CompletionEvent::Delta {
                text: "partial".into(),
            }),
            Err(Error::Completion {
                status: None,
                message: "connection reset mid-stream".into(),
            }),
        ])))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn hit(id: &str, name: &str, score: f64) -> SearchHit {
    let mut content = FieldMap::new();
    content.insert("Name".into(), json!(name));
    content.insert(
        "Description".into(),
        json!(format!("{name} is a fine product for all occasions")),
    );
    SearchHit {
        id: id.to_owned(),
        content,
        metadata: FieldMap::new(),
        score,
    }
}

fn deps(
    store: StubStore,
    search: Option<Arc<dyn SearchBackend>>,
    completion: Option<Arc<dyn CompletionBackend>>,
) -> RelayDeps {
    RelayDeps {
        config: Arc::new(Config::default()),
        store: Arc::new(store),
        search,
        completion,
    }
}

async fn collect(deps: RelayDeps, req: RelayRequest) -> Vec<StreamingEvent> {
    run_relay(deps, req).collect().await
}

fn query(q: &str) -> RelayRequest {
    RelayRequest {
        query: q.to_owned(),
        ..Default::default()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Streaming contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn happy_path_orders_events_and_ranks_sources() {
    let search = Arc::new(StubSearch::with_hits(vec![
        hit("a", "Pad A", 0.8),
        hit("b", "Pad B", 0.95),
        hit("c", "Pad C", 0.3),
    ]));
    let completion = Arc::new(StubCompletion::new(vec!["Hello ", "world"], 7));
    let d = deps(StubStore::default(), Some(search), Some(completion));

    let events = collect(d, query("best pad?")).await;
    assert_eq!(events.len(), 4);

    match &events[0] {
        StreamingEvent::Start { sources } => {
            let titles: Vec<&str> = sources.iter().map(|s| s.title.as_str()).collect();
            assert_eq!(titles, ["Pad B", "Pad A", "Pad C"]);
        }
        other => panic!("expected start, got {other:?}"),
    }
    assert!(matches!(&events[1], StreamingEvent::Content { text } if text == "Hello "));
    assert!(matches!(&events[2], StreamingEvent::Content { text } if text == "world"));
    match &events[3] {
        StreamingEvent::Done { usage } => {
            assert_eq!(usage.search_results_count, 3);
            assert_eq!(usage.response_tokens, 7);
        }
        other => panic!("expected done, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_hits_short_circuits_without_completion() {
    let completion = Arc::new(StubCompletion::new(vec!["never"], 1));
    let called = completion.called.clone();
    let d = deps(
        StubStore::default(),
        Some(Arc::new(StubSearch::with_hits(vec![]))),
        Some(completion),
    );

    let events = collect(d, query("obscure thing")).await;
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], StreamingEvent::Start { sources } if sources.is_empty()));
    assert!(matches!(&events[1], StreamingEvent::Content { text } if text == NO_MATCHES_MESSAGE));
    match &events[2] {
        StreamingEvent::Done { usage } => {
            assert_eq!(usage.search_results_count, 0);
            assert_eq!(usage.response_tokens, 0);
        }
        other => panic!("expected done, got {other:?}"),
    }
    assert!(!called.load(Ordering::SeqCst), "completion must not run on zero hits");
}

#[tokio::test]
async fn max_results_caps_sources_and_context() {
    let hits: Vec<SearchHit> = (0..25)
        .map(|i| hit(&format!("h{i}"), &format!("Item {i}"), 1.0 - i as f64 * 0.01))
        .collect();
    let d = deps(
        StubStore::default(),
        Some(Arc::new(StubSearch::with_hits(hits))),
        Some(Arc::new(StubCompletion::new(vec!["ok"], 1))),
    );

    let events = collect(d, query("items")).await;
    match &events[0] {
        // Config::default() caps at 10 results.
        StreamingEvent::Start { sources } => assert_eq!(sources.len(), 10),
        other => panic!("expected start, got {other:?}"),
    }
    match events.last().unwrap() {
        StreamingEvent::Done { usage } => assert_eq!(usage.search_results_count, 10),
        other => panic!("expected done, got {other:?}"),
    }
}

#[tokio::test]
async fn search_failure_is_a_lone_error_event() {
    let d = deps(
        StubStore::default(),
        Some(Arc::new(FailingSearch)),
        Some(Arc::new(StubCompletion::new(vec!["x"], 1))),
    );

    let events = collect(d, query("anything")).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], StreamingEvent::Error { .. }));
}

#[tokio::test]
async fn completion_failure_after_start_ends_with_error_not_done() {
    let d = deps(
        StubStore::default(),
        Some(Arc::new(StubSearch::with_hits(vec![hit("a", "Pad A", 0.9)]))),
        Some(Arc::new(FailingCompletion)),
    );

    let events = collect(d, query("pads")).await;
    assert!(matches!(&events[0], StreamingEvent::Start { .. }));
    assert!(matches!(&events[1], StreamingEvent::Content { text } if text == "partial"));
    assert!(matches!(events.last().unwrap(), StreamingEvent::Error { .. }));
    assert!(!events.iter().any(|e| matches!(e, StreamingEvent::Done { .. })));
}

#[tokio::test]
async fn blank_query_is_rejected_before_search() {
    let search = Arc::new(StubSearch::with_hits(vec![hit("a", "Pad A", 0.9)]));
    let d = deps(
        StubStore::default(),
        Some(search.clone()),
        Some(Arc::new(StubCompletion::new(vec!["x"], 1))),
    );

    let events = collect(d, query("   ")).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], StreamingEvent::Error { .. }));
    assert!(!search.called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn missing_completion_credentials_yield_error_event() {
    let d = deps(
        StubStore::default(),
        Some(Arc::new(StubSearch::with_hits(vec![]))),
        None,
    );

    let events = collect(d, query("hello")).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], StreamingEvent::Error { .. }));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Non-streaming endpoint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn run_once_returns_full_envelope_data() {
    let d = deps(
        StubStore::default(),
        Some(Arc::new(StubSearch::with_hits(vec![
            hit("a", "Pad A", 0.4),
            hit("b", "Pad B", 0.9),
        ]))),
        Some(Arc::new(StubCompletion::new(vec!["An answer."], 12))),
    );

    let outcome = run_relay_once(&d, &query("pads")).await.unwrap();
    assert_eq!(outcome.data.response, "An answer.");
    assert_eq!(outcome.data.sources[0].title, "Pad B");
    assert_eq!(outcome.data.search_results.len(), 2);
    assert_eq!(outcome.data.prompt_used, "Default");
    assert_eq!(outcome.data.model, "gpt-4o-mini");
    assert_eq!(outcome.usage.search_results_count, 2);
    assert_eq!(outcome.usage.response_tokens, 12);
}

#[tokio::test]
async fn run_once_zero_hits_uses_canned_reply() {
    let completion = Arc::new(StubCompletion::new(vec!["never"], 1));
    let called = completion.called.clone();
    let d = deps(
        StubStore::default(),
        Some(Arc::new(StubSearch::with_hits(vec![]))),
        Some(completion),
    );

    let outcome = run_relay_once(&d, &query("nothing")).await.unwrap();
    assert_eq!(outcome.data.response, NO_MATCHES_MESSAGE);
    assert!(outcome.data.sources.is_empty());
    assert_eq!(outcome.usage.search_results_count, 0);
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn run_once_blank_query_is_validation_error() {
    let d = deps(
        StubStore::default(),
        Some(Arc::new(StubSearch::with_hits(vec![]))),
        Some(Arc::new(StubCompletion::new(vec![], 0))),
    );

    let err = run_relay_once(&d, &query("")).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Settings resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn prompt(id: &str, name: &str, is_default: bool) -> PromptTemplate {
    PromptTemplate {
        id: id.to_owned(),
        name: name.to_owned(),
        description: None,
        content: format!("You are {name}."),
        is_default,
    }
}

fn profile(id: &str, prompt_id: Option<&str>, is_active: bool) -> ChatbotProfile {
    ChatbotProfile {
        id: id.to_owned(),
        name: format!("profile {id}"),
        description: None,
        config: ProfileConfig {
            search_index: "catalog".to_owned(),
            model_name: "gpt-4o".to_owned(),
            temperature: Some(0.5),
            max_results: Some(5),
        },
        system_prompt_id: prompt_id.map(str::to_owned),
        is_active,
        rate_limit_per_hour: None,
    }
}

#[tokio::test]
async fn request_prompt_id_beats_session_and_profile() {
    let store = StubStore {
        prompts: vec![
            prompt("p1", "Support", false),
            prompt("p2", "Sales", false),
            prompt("p3", "Fallback", true),
        ],
        profiles: vec![profile("bot1", Some("p2"), true)],
        session: SessionState {
            active_chatbot_id: Some("bot1".to_owned()),
            active_prompt_id: Some("p2".to_owned()),
        },
    };
    let d = deps(store, None, None);

    let req = RelayRequest {
        query: "q".to_owned(),
        prompt_id: Some("p1".to_owned()),
        ..Default::default()
    };
    let settings = resolve_settings(&d, &req).await;
    assert_eq!(settings.prompt_name, "Support");
    assert_eq!(settings.system_prompt, "You are Support.");
}

#[tokio::test]
async fn session_prompt_wins_over_profile_prompt() {
    let store = StubStore {
        prompts: vec![prompt("p1", "Support", false), prompt("p2", "Sales", false)],
        profiles: vec![profile("bot1", Some("p1"), true)],
        session: SessionState {
            active_chatbot_id: Some("bot1".to_owned()),
            active_prompt_id: Some("p2".to_owned()),
        },
    };
    let d = deps(store, None, None);

    let settings = resolve_settings(&d, &query("q")).await;
    assert_eq!(settings.prompt_name, "Sales");
}

#[tokio::test]
async fn unknown_prompt_id_falls_back_to_default_flag() {
    let store = StubStore {
        prompts: vec![prompt("p1", "Support", false), prompt("p2", "Fallback", true)],
        ..Default::default()
    };
    let d = deps(store, None, None);

    let req = RelayRequest {
        query: "q".to_owned(),
        prompt_id: Some("missing".to_owned()),
        ..Default::default()
    };
    let settings = resolve_settings(&d, &req).await;
    assert_eq!(settings.prompt_name, "Fallback");
}

#[tokio::test]
async fn empty_store_uses_builtin_defaults() {
    let d = deps(StubStore::default(), None, None);

    let settings = resolve_settings(&d, &query("q")).await;
    assert_eq!(settings.prompt_name, "Default");
    assert_eq!(settings.search_index, "products");
    assert_eq!(settings.model, "gpt-4o-mini");
    assert_eq!(settings.max_results, 10);
    assert_eq!(settings.temperature, None);
}

#[tokio::test]
async fn active_profile_supplies_index_model_and_temperature() {
    let store = StubStore {
        profiles: vec![profile("bot1", None, true)],
        ..Default::default()
    };
    let d = deps(store, None, None);

    let settings = resolve_settings(&d, &query("q")).await;
    assert_eq!(settings.search_index, "catalog");
    assert_eq!(settings.model, "gpt-4o");
    assert_eq!(settings.temperature, Some(0.5));
    assert_eq!(settings.max_results, 5);
}

#[tokio::test]
async fn request_overrides_beat_profile() {
    let store = StubStore {
        profiles: vec![profile("bot1", None, true)],
        ..Default::default()
    };
    let d = deps(store, None, None);

    let req = RelayRequest {
        query: "q".to_owned(),
        search_index: Some("support-docs".to_owned()),
        model: Some("gpt-4.1-mini".to_owned()),
        max_results: Some(3),
        temperature: Some(0.1),
        ..Default::default()
    };
    let settings = resolve_settings(&d, &req).await;
    assert_eq!(settings.search_index, "support-docs");
    assert_eq!(settings.model, "gpt-4.1-mini");
    assert_eq!(settings.max_results, 3);
    assert_eq!(settings.temperature, Some(0.1));
}
