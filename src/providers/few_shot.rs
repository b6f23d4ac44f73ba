use log::trace;
use super::Adapter;
use crate::config::BackendKind;
use crate::error::Error;
use crate::request::{
  CompletionPayload, GenerationParameters, InferenceOptions, OutboundPayload
};

const MAX_NEW_TOKENS: usize = 150;
const TEMPERATURE: f32 = 0.1;

/// Text-generation adapter. A general model is steered towards SQL by
/// two worked examples ahead of the real query.
#[derive(Debug, Clone, Default)]
pub struct FewShotAdapter;

impl FewShotAdapter
{   pub fn new() -> Self
    {   FewShotAdapter
    }

    /// The prompt is spliced in as-is.
    pub fn template(prompt: &str) -> String
    {   format!(
          "Task: Translate natural language to SQL.\n\n\
           Input: Show me users from London\n\
           SQL: SELECT * FROM users WHERE city = 'London'\n\n\
           Input: Count the number of products with price over 50\n\
           SQL: SELECT COUNT(*) FROM products WHERE price > 50\n\n\
           Input: {}\n\
           SQL: ",
          prompt
        )
    }
}

impl Adapter for FewShotAdapter
{   fn kind(&self) -> BackendKind
    {   BackendKind::FewShot
    }

    fn build_payload(&self, prompt: &str) -> OutboundPayload
    {   let payload = CompletionPayload
        {   inputs: Self::template(prompt)
          , parameters: GenerationParameters
            {   max_new_tokens: MAX_NEW_TOKENS
              , temperature: TEMPERATURE
              , return_full_text: None
            }
          , options: InferenceOptions { wait_for_model: false }
        };
        trace!("Few-shot payload: {:?}", payload);
        OutboundPayload::Completion(payload)
    }

    fn parse_response(&self, status: u16, body: &str)
      -> Result<String, Error>
    {   super::first_generation(self.kind(), status, body)
    }
}
