use log::{debug, trace};
use super::Adapter;
use crate::config::BackendKind;
use crate::error::Error;
use crate::request::{
  ChatMessage, ChatPayload, InferenceResponse, OutboundPayload
};

const MAX_TOKENS: usize = 200;
const TEMPERATURE: f32 = 0.1;

const SYSTEM_PROMPT: &str
  = "You are a SQL expert. Translate the user's request into a single SQL \
     query. Respond with the SQL query only, without explanation.";

/// Chat-completions adapter for the inference router
#[derive(Debug, Clone)]
pub struct ChatAdapter
{   model: String
}

impl ChatAdapter
{   pub fn new(model: impl Into<String>) -> Self
    {   ChatAdapter { model: model.into() }
    }
}

impl Adapter for ChatAdapter
{   fn kind(&self) -> BackendKind
    {   BackendKind::Chat
    }

    fn build_payload(&self, prompt: &str) -> OutboundPayload
    {   let payload = ChatPayload
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage::system(SYSTEM_PROMPT)
            , ChatMessage::user(prompt)
            ]
          , max_tokens: MAX_TOKENS
          , temperature: TEMPERATURE
          , stream: false
        };
        trace!("Chat payload: {:?}", payload);
        OutboundPayload::Chat(payload)
    }

    fn parse_response(&self, status: u16, body: &str)
      -> Result<String, Error>
    {   let parsed = InferenceResponse::parse(body);
        if let Some(err)
          = super::classify_failure(self.kind(), status, body, parsed.as_ref())
        {   return Err(err);
        }

        match parsed
        {   Some(InferenceResponse::ChatCompletion(completion)) => {
              let choice = completion.choices
                .into_iter()
                .next()
                .ok_or(Error::NoGenerations)?;
              debug!("Chat finish reason: {:?}", choice.finish_reason);
              let content = choice.message.content
                .ok_or(Error::NoGenerations)?;
              Ok(super::strip_code_fences(&content))
            }
          , _ => Err(Error::ParseError(super::truncate(body)))
        }
    }
}
