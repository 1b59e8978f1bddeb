//! Answer audience questions about the demoed product
//!
//! Questions arrive mid-demo and must always get an answer. The
//! answerer tries the LLM first, then canned topic answers, then a
//! generic fallback, so the narration never stalls on a failed call.

use crate::command::rules::AnswerRules;
use crate::core::config::config;
use crate::demo::script::ProductConfig;
use crate::llm::client::LlmClient;
use crate::llm::context::ProductContext;
use std::sync::Arc;

const QA_SYSTEM_PROMPT: &str = "You are a friendly product demo presenter. Answer the audience's question about the product in 2-3 conversational sentences, as if speaking aloud. Stay grounded in the product context you are given. If the context does not cover the question, say so briefly and offer to show a related feature instead. Never invent prices, dates, or feature names.";

/// Answers audience questions with graceful degradation
///
/// Falls back from LLM answers to canned topic answers to a generic
/// response, so `answer` always returns something speakable.
pub struct QaAnswerer {
    client: Option<LlmClient>,
    config: Arc<ProductConfig>,
    rules: AnswerRules,
}

impl QaAnswerer {
    pub fn new(client: Option<LlmClient>, config: Arc<ProductConfig>) -> Self {
        Self {
            client,
            config,
            rules: AnswerRules::standard(),
        }
    }

    /// Answer a question about the product
    ///
    /// Never fails. LLM errors and empty responses fall through to the
    /// canned topic table, and unmatched topics get a generic answer.
    pub async fn answer(&self, question: &str) -> String {
        if let Some(client) = &self.client {
            match self.llm_answer(client, question).await {
                Ok(answer) if !answer.trim().is_empty() => return answer.trim().to_string(),
                Ok(_) => {
                    tracing::warn!("LLM returned an empty answer, using canned response");
                }
                Err(e) => {
                    tracing::warn!("LLM answer failed, using canned response: {}", e);
                }
            }
        }

        self.canned_answer(question)
    }

    async fn llm_answer(
        &self,
        client: &LlmClient,
        question: &str,
    ) -> crate::core::error::Result<String> {
        let context = ProductContext::from_config(&self.config);
        let user_prompt = format!(
            "PRODUCT CONTEXT:\n{}\n\nAUDIENCE QUESTION:\n{}",
            context.summary(),
            question
        );

        client
            .complete_capped(QA_SYSTEM_PROMPT, &user_prompt, config().answer_max_tokens)
            .await
    }

    fn canned_answer(&self, question: &str) -> String {
        if let Some(topic) = self.rules.lookup(question) {
            return crate::command::rules::canned_answer(topic, &self.config);
        }

        format!(
            "That's a great question! {} is designed to provide the best user experience. \
             Would you like me to show you a specific feature?",
            self.config.product_name
        )
    }
}
