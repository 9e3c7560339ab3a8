//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AssistantError;
use crate::model::{
    Content, GenerateRequest, LanguageModel, ModelResponse, Part, Role, ToolCall, ToolDeclaration,
};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Model requests can run long when the model thinks before answering.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    /// Config against the public endpoint with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn generate_content_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}/models/{}:generateContent", self.config.model)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelResponse, AssistantError> {
        let body = build_generate_content_body(request);

        let response = self
            .client
            .post(self.generate_content_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                model = %self.config.model,
                "Gemini request failed"
            );
            return Err(AssistantError::HttpStatus {
                status: status.as_u16(),
                body: raw,
            });
        }

        parse_generate_content_response(&raw)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

fn build_generate_content_body(request: &GenerateRequest) -> Value {
    let mut body = json!({
        "contents": request.contents.iter().map(to_gemini_content).collect::<Vec<_>>(),
    });

    if let Some(system) = request.system_instruction.as_deref() {
        body["systemInstruction"] = json!({
            "parts": [{ "text": system }],
        });
    }

    if !request.tools.is_empty() {
        body["tools"] = json!([{
            "functionDeclarations": request
                .tools
                .iter()
                .map(to_gemini_function_declaration)
                .collect::<Vec<_>>(),
        }]);
    }

    body
}

fn to_gemini_content(content: &Content) -> Value {
    let role = match content.role {
        Role::User => "user",
        Role::Model => "model",
    };
    let parts: Vec<Value> = content
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::FunctionCall(call) => json!({
                "functionCall": { "name": call.name, "args": call.args },
            }),
            Part::FunctionResponse { name, response } => json!({
                "functionResponse": { "name": name, "response": response },
            }),
        })
        .collect();

    json!({ "role": role, "parts": parts })
}

fn to_gemini_function_declaration(tool: &ToolDeclaration) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<GenerateContentCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentCandidate {
    content: Option<GenerateContentBody>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentBody {
    parts: Option<Vec<GenerateContentPart>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentPart {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<GenerateContentFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentFunctionCall {
    name: String,
    args: Option<Value>,
}

fn parse_generate_content_response(raw: &str) -> Result<ModelResponse, AssistantError> {
    let parsed: GenerateContentResponse = serde_json::from_str(raw)?;
    let candidate = parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| AssistantError::InvalidResponse("response has no candidates".into()))?;

    let mut response = ModelResponse::default();
    for part in candidate.content.and_then(|c| c.parts).unwrap_or_default() {
        if let Some(text) = part.text {
            response.text.push_str(&text);
        }
        if let Some(call) = part.function_call {
            response.tool_calls.push(ToolCall {
                name: call.name,
                args: call.args.unwrap_or_else(|| json!({})),
            });
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_tool_calls_and_responses() {
        let request = GenerateRequest {
            system_instruction: Some("be brief".into()),
            contents: vec![
                Content::user_text("how many branches?"),
                Content {
                    role: Role::Model,
                    parts: vec![Part::FunctionCall(ToolCall {
                        name: "getBranches".into(),
                        args: json!({}),
                    })],
                },
                Content {
                    role: Role::User,
                    parts: vec![Part::FunctionResponse {
                        name: "getBranches".into(),
                        response: json!({ "result": [] }),
                    }],
                },
            ],
            tools: vec![ToolDeclaration {
                name: "getBranches",
                description: "list",
                parameters: json!({ "type": "object", "properties": {} }),
            }],
        };

        let body = build_generate_content_body(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["functionCall"]["name"], "getBranches");
        assert_eq!(
            body["contents"][2]["parts"][0]["functionResponse"]["response"]["result"],
            json!([])
        );
        assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], "getBranches");
    }

    #[test]
    fn omits_tools_and_system_when_absent() {
        let request = GenerateRequest {
            contents: vec![Content::user_text("hi")],
            ..Default::default()
        };
        let body = build_generate_content_body(&request);
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn parses_text_and_function_calls() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[
            {"text":"Checking. "},
            {"functionCall":{"name":"getDateFromDaysAgo","args":{"days":7}}},
            {"functionCall":{"name":"getBranches"}}
        ]}}]}"#;
        let response = parse_generate_content_response(raw).unwrap();
        assert_eq!(response.text, "Checking. ");
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].args, json!({"days": 7}));
        assert_eq!(response.tool_calls[1].args, json!({}));
    }

    #[test]
    fn missing_candidates_is_invalid() {
        let err = parse_generate_content_response(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, AssistantError::InvalidResponse(_)));
    }
}
