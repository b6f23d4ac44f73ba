use log::trace;
use super::Adapter;
use crate::config::BackendKind;
use crate::error::Error;
use crate::request::{
  CompletionPayload, GenerationParameters, InferenceOptions, OutboundPayload
};

const MAX_NEW_TOKENS: usize = 150;
const TEMPERATURE: f32 = 0.1;

/// The template ends mid-statement so the model continues a query
/// instead of chatting. The upstream only returns the continuation,
/// so this prefix is put back in front of it.
const PRIMED_PREFIX: &str = "SELECT ";

/// Raw inference adapter for instruction-tuned models
#[derive(Debug, Clone, Default)]
pub struct InstructAdapter;

impl InstructAdapter
{   pub fn new() -> Self
    {   InstructAdapter
    }

    pub fn template(prompt: &str) -> String
    {   format!(
          "<s>[INST] You are a SQL expert. Convert the request below into \
           a single SQL query. Only output the SQL query, no explanation.\n\n\
           Request: {} [/INST]\n{}",
          prompt, PRIMED_PREFIX
        )
    }

    /// Put the primed token back unless the model repeated the keyword
    /// itself. `SELECT` only counts as a whole word.
    fn restore_prefix(generated: &str) -> String
    {   let generated = generated.trim();
        let repeated = generated
          .get(..6)
          .map_or(false, |head| head.eq_ignore_ascii_case("SELECT"))
          && generated[6..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace);
        if repeated
        {   generated.to_string()
        } else
        {   format!("{}{}", PRIMED_PREFIX, generated)
        }
    }
}

impl Adapter for InstructAdapter
{   fn kind(&self) -> BackendKind
    {   BackendKind::Instruct
    }

    fn build_payload(&self, prompt: &str) -> OutboundPayload
    {   let payload = CompletionPayload
        {   inputs: Self::template(prompt)
          , parameters: GenerationParameters
            {   max_new_tokens: MAX_NEW_TOKENS
              , temperature: TEMPERATURE
              , return_full_text: Some(false)
            }
          , options: InferenceOptions { wait_for_model: false }
        };
        trace!("Instruct payload: {:?}", payload);
        OutboundPayload::Completion(payload)
    }

    fn parse_response(&self, status: u16, body: &str)
      -> Result<String, Error>
    {   let generated = super::first_generation(self.kind(), status, body)?;
        Ok(Self::restore_prefix(&generated))
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn template_wraps_prompt_in_instruction_and_primes_select()
    {   let text = InstructAdapter::template("top 5 customers");
        assert!(text.starts_with("<s>[INST] "));
        assert!(text.contains("Request: top 5 customers [/INST]"));
        assert!(text.ends_with("[/INST]\nSELECT "));
    }

    #[test]
    fn payload_asks_for_continuation_only()
    {   let json = serde_json::to_value(InstructAdapter::new().build_payload("x"))
          .unwrap();
        assert_eq!(json["parameters"]["return_full_text"], false);
        assert_eq!(json["options"]["wait_for_model"], false);
    }

    #[test]
    fn prepends_primed_token()
    {   let adapter = InstructAdapter::new();
        assert_eq!(
          adapter.parse_response(200, r#"[{"generated_text":"name FROM customers LIMIT 5"}]"#),
          Ok("SELECT name FROM customers LIMIT 5".to_string())
        );
        assert_eq!(
          adapter.parse_response(200, r#"[{"generated_text":"select * from t"}]"#),
          Ok("select * from t".to_string())
        );
    }

    #[test]
    fn column_starting_with_select_still_gets_prefix()
    {   let adapter = InstructAdapter::new();
        assert_eq!(
          adapter.parse_response(200, r#"[{"generated_text":"selected_at, id FROM orders"}]"#),
          Ok("SELECT selected_at, id FROM orders".to_string())
        );
        assert_eq!(
          adapter.parse_response(200, r#"[{"generated_text":"SELECT"}]"#),
          Ok("SELECT".to_string())
        );
    }

    #[test]
    fn loading_error_is_warming_up()
    {   let adapter = InstructAdapter::new();
        let err = adapter
          .parse_response(
            503,
            r#"{"error":"Model mistralai/Mistral-7B-Instruct-v0.2 is currently loading"}"#
          )
          .unwrap_err();
        assert_eq!(err, Error::ModelLoading { retry_after_secs: 20 });
    }
}
