//! Turn orchestration
//!
//! Composes the policy primitives and the search gateway for one user turn:
//!
//! ```text
//! history ──▶ summarize_history ──▶ classify
//!                                     │
//!     ┌──────────────┬────────────────┼──────────────┬────────────┐
//!  PRODUCT        SERVICE            MORE         CONTINUE     OFF_TOPIC
//!     │              │                │              │            │
//!  search(0)      search(0)     search(skip+k)   last context   no context
//!     └──────────────┴────────────────┴──────────────┴────────────┘
//!                                     │
//!                              generate_answer
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use subsin_config::ConversationConfig;
use subsin_core::{bangkok_now, ConversationPath, HistoryEntry, SearchTarget, TurnRole};
use subsin_rag::SearchGateway;

use crate::policy::ConversationPolicy;
use crate::AgentError;

/// Last search run for a user, reused by MORE and CONTINUE turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalState {
    /// Query text sent to the search gateway
    pub query: String,
    pub target: SearchTarget,
    /// Results skipped for the page in `context`
    pub skip: usize,
    pub context: String,
}

/// Result of one user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub path: ConversationPath,
    /// Context the answer was grounded in; empty when none
    pub context: String,
    pub answer: String,
}

pub struct InsuranceAssistant {
    policy: ConversationPolicy,
    search: Arc<SearchGateway>,
    conversation: ConversationConfig,
    retrieval: RwLock<HashMap<String, RetrievalState>>,
}

impl InsuranceAssistant {
    pub fn new(
        policy: ConversationPolicy,
        search: Arc<SearchGateway>,
        conversation: ConversationConfig,
    ) -> Self {
        Self {
            policy,
            search,
            conversation,
            retrieval: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &ConversationPolicy {
        &self.policy
    }

    /// Remembered search for a user, if any
    pub fn retrieval_state(&self, user_id: &str) -> Option<RetrievalState> {
        self.retrieval.read().get(user_id).cloned()
    }

    /// Handle one user turn end to end
    pub async fn respond(
        &self,
        user_id: &str,
        query: &str,
        history: Option<&str>,
    ) -> Result<TurnOutcome, AgentError> {
        let history = match history {
            Some(text) => Some(
                self.policy
                    .summarize_history(text, self.conversation.history_max_chars, user_id)
                    .await?,
            ),
            None => None,
        };
        let history = history.as_deref();

        let path = self.policy.classify(query, history).await?;

        let context = match path {
            ConversationPath::InsuranceProduct => {
                self.fresh_search(user_id, query, history, SearchTarget::Product)
                    .await?
            }
            ConversationPath::InsuranceService => {
                self.fresh_search(user_id, query, history, SearchTarget::Service)
                    .await?
            }
            ConversationPath::More => self.next_page(user_id, query).await?,
            ConversationPath::ContinueConversation => self
                .retrieval_state(user_id)
                .map(|state| state.context)
                .unwrap_or_default(),
            ConversationPath::OffTopic => String::new(),
        };

        let answer = self.policy.generate_answer(query, &context, history).await?;
        self.record_turn(user_id, query, &answer, path).await?;

        tracing::debug!(
            user_id = %user_id,
            path = %path,
            context_chars = context.chars().count(),
            "Turn completed"
        );

        Ok(TurnOutcome {
            path,
            context,
            answer,
        })
    }

    async fn fresh_search(
        &self,
        user_id: &str,
        query: &str,
        history: Option<&str>,
        target: SearchTarget,
    ) -> Result<String, AgentError> {
        let retrieval_query = match history {
            Some(text) if !text.trim().is_empty() => {
                self.policy.summarize_for_retrieval(query, Some(text)).await?
            }
            _ => query.to_string(),
        };

        self.run_search(user_id, retrieval_query, 0, target).await
    }

    /// Next page of the remembered search; a product search of `query` when
    /// nothing is remembered
    async fn next_page(&self, user_id: &str, query: &str) -> Result<String, AgentError> {
        match self.retrieval_state(user_id) {
            Some(state) => {
                let skip = state.skip + self.conversation.top_k;
                self.run_search(user_id, state.query, skip, state.target)
                    .await
            }
            None => {
                self.run_search(user_id, query.to_string(), 0, SearchTarget::Product)
                    .await
            }
        }
    }

    async fn run_search(
        &self,
        user_id: &str,
        query: String,
        skip: usize,
        target: SearchTarget,
    ) -> Result<String, AgentError> {
        let context = self
            .search
            .search(&query, self.conversation.top_k, skip, target)
            .await?;

        self.retrieval.write().insert(
            user_id.to_string(),
            RetrievalState {
                query,
                target,
                skip,
                context: context.clone(),
            },
        );
        Ok(context)
    }

    async fn record_turn(
        &self,
        user_id: &str,
        query: &str,
        answer: &str,
        path: ConversationPath,
    ) -> Result<(), AgentError> {
        let store = self.policy.history_store();
        store
            .save(HistoryEntry::new(
                user_id,
                TurnRole::User,
                query,
                bangkok_now(),
                Some(path),
            ))
            .await?;
        store
            .save(HistoryEntry::new(
                user_id,
                TurnRole::Assistant,
                answer,
                bangkok_now(),
                Some(path),
            ))
            .await?;
        Ok(())
    }
}
