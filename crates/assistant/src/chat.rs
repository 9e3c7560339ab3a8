//! The tool-calling chat loop.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use sentry_core::types::Timestamp;
use sentry_db::Store;

use crate::error::AssistantError;
use crate::model::{Content, GenerateRequest, LanguageModel, Part, Role, ToolCall};
use crate::prompt::chat_system_instruction;
use crate::tools::{declarations, ToolRequest, ToolRunner};

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

pub struct Assistant {
    pub(crate) model: Arc<dyn LanguageModel>,
    tools: ToolRunner,
    max_tool_rounds: usize,
}

impl Assistant {
    pub fn new(model: Arc<dyn LanguageModel>, store: Arc<dyn Store>) -> Self {
        Self {
            model,
            tools: ToolRunner::new(store),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Answer `query`, running whatever tools the model asks for.
    ///
    /// Each round's calls run concurrently and their results are fed back as
    /// one turn. More than `max_tool_rounds` tool-requesting replies is an
    /// error.
    pub async fn chat(&self, query: &str, now: Timestamp) -> Result<String, AssistantError> {
        let mut request = GenerateRequest {
            system_instruction: Some(chat_system_instruction(now)),
            contents: vec![Content::user_text(query)],
            tools: declarations(),
        };
        let mut tool_rounds = 0;

        loop {
            let response = self.model.generate(&request).await?;
            if response.tool_calls.is_empty() {
                return Ok(response.text);
            }

            tool_rounds += 1;
            if tool_rounds > self.max_tool_rounds {
                tracing::warn!(rounds = self.max_tool_rounds, "Assistant tool loop exhausted");
                return Err(AssistantError::ToolLoopExhausted(self.max_tool_rounds));
            }
            tracing::debug!(
                round = tool_rounds,
                calls = response.tool_calls.len(),
                "Model requested tools"
            );

            let results = join_all(
                response
                    .tool_calls
                    .iter()
                    .map(|call| self.answer_call(call, now)),
            )
            .await;

            let mut model_parts = Vec::with_capacity(response.tool_calls.len() + 1);
            if !response.text.is_empty() {
                model_parts.push(Part::Text(response.text));
            }
            model_parts.extend(response.tool_calls.into_iter().map(Part::FunctionCall));

            request.contents.push(Content {
                role: Role::Model,
                parts: model_parts,
            });
            request.contents.push(Content {
                role: Role::User,
                parts: results,
            });
        }
    }

    async fn answer_call(&self, call: &ToolCall, now: Timestamp) -> Part {
        let response = match ToolRequest::parse(call) {
            Ok(request) => json!({ "result": self.tools.run(request, now).await }),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Rejected tool call");
                json!({ "error": e.to_string() })
            }
        };
        Part::FunctionResponse {
            name: call.name.clone(),
            response,
        }
    }
}
