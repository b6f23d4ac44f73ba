//! Wire types: the inbound request, the payloads sent upstream,
//! the shapes the upstream answers with and the client-facing envelope

use serde::{Deserialize, Serialize};

// ===== Inbound =====

/// Body of `POST /process-voice`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest
{   pub prompt: String
}

impl PromptRequest
{   /// Accepts any JSON object that is not empty.
    /// `prompt` falls back to "" when absent or null; any other
    /// non-string value is forwarded as its JSON text.
    pub fn from_json(value: &serde_json::Value) -> Option<Self>
    {   let object = value.as_object()?;
        if object.is_empty()
        {   return None;
        }

        let prompt = match object.get("prompt")
        {   None | Some(serde_json::Value::Null) => String::new()
          , Some(serde_json::Value::String(s)) => s.clone()
          , Some(other) => other.to_string()
        };
        Some(PromptRequest { prompt })
    }
}

// ===== Outbound =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters
{   pub max_new_tokens: usize
  , pub temperature: f32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub return_full_text: Option<bool>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOptions
{   pub wait_for_model: bool
}

/// Text-generation request for the hosted inference API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload
{   pub inputs: String
  , pub parameters: GenerationParameters
  , pub options: InferenceOptions
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage { role: "user".to_string(), content: content.into() }
    }
}

/// Chat-completions request for the router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: usize
  , pub temperature: f32
  , pub stream: bool
}

/// Whatever an adapter sends upstream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundPayload
{   Completion(CompletionPayload)
  , Chat(ChatPayload)
}

// ===== Upstream answers =====

#[derive(Debug, Clone, Deserialize)]
pub struct Generation
{   pub generated_text: String
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChoiceMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub content: Option<String>
}

/// `error` is a bare string on the inference API and an object on the router
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail
{   Text(String)
  , Object
    {   message: String
    }
}

impl ErrorDetail
{   pub fn message(&self) -> &str
    {   match self
        {   ErrorDetail::Text(s) => s
          , ErrorDetail::Object { message } => message
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailureBody
{   pub error: ErrorDetail
  , #[serde(default)]
    pub estimated_time: Option<f64>
}

/// Every body shape the upstreams are known to answer with
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InferenceResponse
{   Generations(Vec<Generation>)
  , ChatCompletion(ChatCompletion)
  , Failure(FailureBody)
}

impl InferenceResponse
{   pub fn parse(body: &str) -> Option<Self>
    {   serde_json::from_str(body).ok()
    }
}

// ===== Client-facing =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status
{   Success
  , Error
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope
{   pub status: Status
  , pub message: String
}

impl ResponseEnvelope
{   pub fn sql(sql: &str) -> Self
    {   ResponseEnvelope
        {   status: Status::Success
          , message: format!("SQL: {}", sql)
        }
    }

    pub fn failure(err: &crate::error::Error) -> Self
    {   ResponseEnvelope
        {   status: Status::Error
          , message: err.to_string()
        }
    }
}

/// Body of 400 and 404 answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub error: String
}
