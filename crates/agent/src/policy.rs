//! Conversation policy engine
//!
//! Four chat-backed primitives an orchestrator composes per turn:
//!
//! | Operation                 | Model      | Rate limited |
//! |---------------------------|------------|--------------|
//! | `classify`                | classifier | yes          |
//! | `summarize_history`       | classifier | no           |
//! | `summarize_for_retrieval` | classifier | no           |
//! | `generate_answer`         | answerer   | yes          |

use std::sync::Arc;

use subsin_config::constants::generation;
use subsin_config::PromptTemplates;
use subsin_core::{
    bangkok_now, ConversationPath, GenerateRequest, HistoryEntry, HistoryStore, LanguageModel,
    TurnRole,
};
use subsin_llm::ChatRateLimiter;

use crate::prompt::{history_or, render};
use crate::AgentError;

pub struct ConversationPolicy {
    /// Classification and summaries
    classifier: Arc<dyn LanguageModel>,
    /// Persona answers
    answerer: Arc<dyn LanguageModel>,
    history: Arc<dyn HistoryStore>,
    limiter: Arc<ChatRateLimiter>,
    prompts: PromptTemplates,
}

impl ConversationPolicy {
    pub fn new(
        classifier: Arc<dyn LanguageModel>,
        answerer: Arc<dyn LanguageModel>,
        history: Arc<dyn HistoryStore>,
        limiter: Arc<ChatRateLimiter>,
        prompts: PromptTemplates,
    ) -> Self {
        Self {
            classifier,
            answerer,
            history,
            limiter,
            prompts,
        }
    }

    pub fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    pub fn history_store(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Route a user turn to one of the five paths
    ///
    /// Output the parser does not recognise maps to `OffTopic`.
    pub async fn classify(
        &self,
        query: &str,
        history: Option<&str>,
    ) -> Result<ConversationPath, AgentError> {
        let (temperature, max_tokens) = generation::CLASSIFY;
        let user = render(
            &self.prompts.classification_user,
            &[
                ("query", query),
                ("history", history_or(history, &self.prompts.empty_history)),
            ],
        );
        let request = GenerateRequest::new(self.prompts.classification_system.as_str())
            .with_user_message(user)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        self.limiter.acquire().await;
        let response = self.classifier.generate(request).await?;

        let path = ConversationPath::from_label(&response.text).unwrap_or_else(|| {
            tracing::warn!(raw = %response.text.trim(), "Unrecognised classifier label");
            ConversationPath::OffTopic
        });

        metrics::counter!("subsin_classifications_total", "path" => path.as_label()).increment(1);
        tracing::debug!(path = %path, "Classified user turn");
        Ok(path)
    }

    /// Compact over-length history and replace the stored history with it
    ///
    /// Text within `max_chars` characters is returned unchanged and the
    /// history store is not touched. Otherwise the user's stored history is
    /// deleted and the summary saved as a single assistant entry carrying
    /// the user's last decision.
    pub async fn summarize_history(
        &self,
        text: &str,
        max_chars: usize,
        user_id: &str,
    ) -> Result<String, AgentError> {
        let length = text.chars().count();
        if length <= max_chars {
            return Ok(text.to_string());
        }

        let (temperature, max_tokens) = generation::SUMMARIZE_HISTORY;
        let request = GenerateRequest::new(self.prompts.history_compaction_system.as_str())
            .with_user_message(text)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        let response = self.classifier.generate(request).await?;
        let summary = response.text.trim().to_string();

        // Read before delete: the decision lives in the entries being replaced
        let decision = self.history.latest_decision(user_id).await?;
        self.history.delete(user_id).await?;
        self.history
            .save(HistoryEntry::new(
                user_id,
                TurnRole::Assistant,
                summary.as_str(),
                bangkok_now(),
                decision,
            ))
            .await?;

        tracing::info!(
            user_id = %user_id,
            from_chars = length,
            to_chars = summary.chars().count(),
            "Compacted conversation history"
        );
        Ok(summary)
    }

    /// Condense history down to what the new question needs for retrieval
    pub async fn summarize_for_retrieval(
        &self,
        new_question: &str,
        history: Option<&str>,
    ) -> Result<String, AgentError> {
        let (temperature, max_tokens) = generation::SUMMARIZE_FOR_RETRIEVAL;
        let user = render(
            &self.prompts.retrieval_summary_user,
            &[
                ("history", history_or(history, &self.prompts.empty_history)),
                ("question", new_question),
            ],
        );
        let request = GenerateRequest::new(self.prompts.retrieval_summary_system.as_str())
            .with_user_message(user)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        let response = self.classifier.generate(request).await?;
        Ok(response.text.trim().to_string())
    }

    /// Draft the persona answer grounded in `context`
    pub async fn generate_answer(
        &self,
        query: &str,
        context: &str,
        history: Option<&str>,
    ) -> Result<String, AgentError> {
        let (temperature, max_tokens) = generation::ANSWER;
        let user = render(
            &self.prompts.answer_user,
            &[
                ("history", history_or(history, &self.prompts.empty_history)),
                ("context", context),
                ("query", query),
            ],
        );
        let request = GenerateRequest::new(self.prompts.answer_system.as_str())
            .with_user_message(user)
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        self.limiter.acquire().await;
        let response = self.answerer.generate(request).await?;
        Ok(response.text.trim().to_string())
    }
}
