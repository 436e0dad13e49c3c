//! Integration tests for the turn flow (classify -> search -> answer)
//!
//! Providers are scripted fakes; the cache, history store, gateways and
//! policy are the real implementations.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use subsin_agent::{InMemoryHistoryStore, InsuranceAssistant, ConversationPolicy};
use subsin_config::{ConversationConfig, PromptTemplates};
use subsin_core::{
    ConversationPath, EmbeddingProvider, GenerateRequest, GenerateResponse, LanguageModel,
    SearchHit, SearchProvider, SearchRequest, SearchTarget, TurnRole,
};
use subsin_llm::ChatRateLimiter;
use subsin_rag::{EmbeddingGateway, InMemoryCacheStore, SearchGateway, SearchGatewayConfig};

/// Replies from a script; an exhausted script replies `OFF_TOPIC`
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn push(&self, reply: &str) {
        self.replies.lock().push_back(reply.to_string());
    }

    fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_user_message(&self) -> String {
        self.requests
            .lock()
            .last()
            .and_then(|r| r.last_user_message().map(str::to_string))
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: GenerateRequest) -> subsin_core::Result<GenerateResponse> {
        self.requests.lock().push(request);
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| "OFF_TOPIC".to_string());
        Ok(GenerateResponse::text(reply))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, text: &str) -> subsin_core::Result<Vec<f32>> {
        Ok(vec![text.chars().count() as f32, 1.0])
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Two hits per page, named after the page offset
struct RecordingSearch {
    requests: Mutex<Vec<SearchRequest>>,
    fail: bool,
}

impl RecordingSearch {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for RecordingSearch {
    async fn search(&self, request: &SearchRequest) -> subsin_core::Result<Vec<SearchHit>> {
        self.requests.lock().push(request.clone());
        if self.fail {
            return Err(subsin_core::Error::Search("HTTP 503".to_string()));
        }

        let name_field = match request.target {
            SearchTarget::Product => "Product_Name",
            SearchTarget::Service => "Service_Name",
        };
        Ok((0..2)
            .map(|i| SearchHit::new().with_field(name_field, format!("Item {}", request.skip + i + 1)))
            .collect())
    }
}

struct Harness {
    classifier: Arc<ScriptedModel>,
    answerer: Arc<ScriptedModel>,
    search: Arc<RecordingSearch>,
    history: Arc<InMemoryHistoryStore>,
    assistant: InsuranceAssistant,
}

fn harness_with(search: Arc<RecordingSearch>, history_max_chars: usize) -> Harness {
    let classifier = ScriptedModel::new(&[]);
    let answerer = ScriptedModel::new(&[]);
    let history = Arc::new(InMemoryHistoryStore::new());
    let cache = Arc::new(InMemoryCacheStore::new(256));

    let embeddings = Arc::new(EmbeddingGateway::new(
        Arc::new(FixedEmbedder),
        cache.clone(),
        Duration::from_secs(86_400),
    ));
    let gateway = Arc::new(SearchGateway::new(
        embeddings,
        search.clone(),
        cache,
        SearchGatewayConfig::default(),
    ));
    let policy = ConversationPolicy::new(
        classifier.clone(),
        answerer.clone(),
        history.clone(),
        Arc::new(ChatRateLimiter::default()),
        PromptTemplates::default(),
    );
    let assistant = InsuranceAssistant::new(
        policy,
        gateway,
        ConversationConfig {
            history_max_chars,
            top_k: 3,
        },
    );

    Harness {
        classifier,
        answerer,
        search,
        history,
        assistant,
    }
}

fn harness() -> Harness {
    harness_with(RecordingSearch::new(), 3000)
}

#[tokio::test]
async fn test_product_turn_searches_and_answers() {
    let h = harness();
    h.classifier.push("INSURANCE_PRODUCT");
    h.answerer.push("  เรามีประกันชีวิต 2 แบบครับ  ");

    let outcome = h.assistant.respond("u1", "life insurance", None).await.unwrap();

    assert_eq!(outcome.path, ConversationPath::InsuranceProduct);
    assert_eq!(outcome.answer, "เรามีประกันชีวิต 2 แบบครับ");
    assert!(outcome.context.contains("Product Name: Item 1"));
    assert!(outcome.context.contains("Product Name: Item 2"));

    let requests = h.search.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, SearchTarget::Product);
    assert_eq!(requests[0].query_text, "life insurance");
    assert_eq!(requests[0].top, 3);
    assert_eq!(requests[0].skip, 0);

    assert!(h.answerer.last_user_message().contains("Context: Product Segment: "));

    let entries = h.history.entries("u1");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].role, TurnRole::User);
    assert_eq!(entries[1].role, TurnRole::Assistant);
    assert!(entries
        .iter()
        .all(|e| e.decision == Some(ConversationPath::InsuranceProduct)));
}

#[tokio::test]
async fn test_more_advances_page() {
    let h = harness();
    h.classifier.push("INSURANCE_PRODUCT");
    h.assistant.respond("u1", "life insurance", None).await.unwrap();

    h.classifier.push("MORE");
    let outcome = h.assistant.respond("u1", "show me more", None).await.unwrap();

    assert_eq!(outcome.path, ConversationPath::More);
    assert!(outcome.context.contains("Product Name: Item 4"));

    let requests = h.search.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].query_text, "life insurance");
    assert_eq!(requests[1].skip, 3);

    let state = h.assistant.retrieval_state("u1").unwrap();
    assert_eq!(state.skip, 3);
    assert_eq!(state.target, SearchTarget::Product);
}

#[tokio::test]
async fn test_more_without_prior_search_searches_products() {
    let h = harness();
    h.classifier.push("MORE");

    let outcome = h.assistant.respond("u1", "other plans?", None).await.unwrap();

    assert_eq!(outcome.path, ConversationPath::More);
    let requests = h.search.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_text, "other plans?");
    assert_eq!(requests[0].skip, 0);
}

#[tokio::test]
async fn test_continue_reuses_context() {
    let h = harness();
    h.classifier.push("INSURANCE_SERVICE");
    let first = h.assistant.respond("u1", "how do I claim?", None).await.unwrap();

    h.classifier.push("CONTINUE CONVERSATION");
    let second = h
        .assistant
        .respond("u1", "what documents?", None)
        .await
        .unwrap();

    assert_eq!(second.path, ConversationPath::ContinueConversation);
    assert_eq!(second.context, first.context);
    assert!(second.context.contains("Service Name: Item 1"));
    assert_eq!(h.search.requests().len(), 1);
}

#[tokio::test]
async fn test_off_topic_has_no_context() {
    let h = harness();
    h.classifier.push("banana");
    h.answerer.push("ขออภัยครับ");

    let outcome = h.assistant.respond("u1", "what's the weather?", None).await.unwrap();

    assert_eq!(outcome.path, ConversationPath::OffTopic);
    assert!(outcome.context.is_empty());
    assert!(h.search.requests().is_empty());
    assert!(h
        .answerer
        .last_user_message()
        .contains("Context: \nUser Question: what's the weather?"));
}

#[tokio::test]
async fn test_history_turns_search_with_retrieval_summary() {
    let h = harness();
    h.classifier.push("INSURANCE_PRODUCT");
    h.classifier.push("  premium of *Life Plus*  ");

    let history = "user: do you have life cover?\nassistant: 1) *Life Plus* 2) *Life Max*";
    let outcome = h
        .assistant
        .respond("u1", "how much is the first one?", Some(history))
        .await
        .unwrap();

    assert_eq!(outcome.path, ConversationPath::InsuranceProduct);
    assert_eq!(h.classifier.calls(), 2);
    assert_eq!(h.search.requests()[0].query_text, "premium of *Life Plus*");
    assert!(h.answerer.last_user_message().starts_with("Conversation History: user: do you"));
}

#[tokio::test]
async fn test_long_history_is_compacted_first() {
    let h = harness_with(RecordingSearch::new(), 100);
    h.classifier.push("condensed");
    h.classifier.push("OFF_TOPIC");

    let long_history = "user: ".to_string() + &"ก".repeat(200);
    h.assistant
        .respond("u1", "hello", Some(&long_history))
        .await
        .unwrap();

    let entries = h.history.entries("u1");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].content, "condensed");
    assert_eq!(entries[0].role, TurnRole::Assistant);
    assert!(h
        .answerer
        .last_user_message()
        .starts_with("Conversation History: condensed\n"));
}

#[tokio::test]
async fn test_repeated_query_is_served_from_cache() {
    let h = harness();
    h.classifier.push("INSURANCE_PRODUCT");
    h.classifier.push("INSURANCE_PRODUCT");

    let first = h.assistant.respond("u1", "life insurance", None).await.unwrap();
    let second = h.assistant.respond("u2", "life insurance", None).await.unwrap();

    assert_eq!(first.context, second.context);
    assert_eq!(h.search.requests().len(), 1);
}

#[tokio::test]
async fn test_search_failure_propagates_without_saving() {
    let h = harness_with(RecordingSearch::failing(), 3000);
    h.classifier.push("INSURANCE_SERVICE");

    let err = h
        .assistant
        .respond("u1", "branch locations", None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("HTTP 503"));
    assert_eq!(h.answerer.calls(), 0);
    assert!(h.history.entries("u1").is_empty());
    assert!(h.assistant.retrieval_state("u1").is_none());
}
