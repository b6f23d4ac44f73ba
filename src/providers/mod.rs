//! Upstream adapters, one per API shape

pub mod chat;
pub mod few_shot;
pub mod instruct;

// Re-export for convenience
pub use chat::ChatAdapter;
pub use few_shot::FewShotAdapter;
pub use instruct::InstructAdapter;

use log::{debug, warn};
use crate::config::{BackendKind, ServiceConfig};
use crate::error::Error;
use crate::request::{InferenceResponse, OutboundPayload};

/// How much of an upstream body is echoed back in diagnostics
pub const DIAGNOSTIC_PREFIX_CHARS: usize = 200;

/// One upstream API shape: how to ask it, how to read its answer
pub trait Adapter: Send + Sync
{   fn kind(&self) -> BackendKind;

    /// Build the request body for `prompt`. Pure: same prompt, same payload.
    fn build_payload(&self, prompt: &str) -> OutboundPayload;

    /// Turn an upstream status and body into SQL or a classified error
    fn parse_response(&self, status: u16, body: &str)
      -> Result<String, Error>;
}

/// Pick the adapter configured for this process
pub fn adapter_for(config: &ServiceConfig) -> Box<dyn Adapter>
{   debug!(
      "Using {} adapter with model {}",
      config.backend.name(),
      config.model
    );
    match config.backend
    {   BackendKind::FewShot => Box::new(FewShotAdapter::new())
      , BackendKind::Instruct => Box::new(InstructAdapter::new())
      , BackendKind::Chat => Box::new(ChatAdapter::new(config.model.clone()))
    }
}

/// First `DIAGNOSTIC_PREFIX_CHARS` characters of `text`
pub fn truncate(text: &str) -> String
{   text.chars().take(DIAGNOSTIC_PREFIX_CHARS).collect()
}

/// The inference API's cold-start wording, "Model <id> is currently loading"
fn mentions_loading(message: &str) -> bool
{   message.to_ascii_lowercase().contains("is currently loading")
}

/// Classification shared by every adapter, run before the shape-specific
/// success parsing. Returns `Some(err)` when the answer is a failure:
/// a 503 or a "currently loading" error body means warming up, with the
/// backend's fixed retry delay. Any other non-2xx or error body is an
/// API error.
pub fn classify_failure(
  kind: BackendKind
, status: u16
, body: &str
, parsed: Option<&InferenceResponse>
) -> Option<Error>
{   let failure = match parsed
    {   Some(InferenceResponse::Failure(f)) => Some(f)
      , _ => None
    };

    let loading = status == 503
      || failure.map_or(false, |f| mentions_loading(f.error.message()));
    if loading
    {   let retry_after_secs = kind.default_retry_secs();
        warn!(
          "Upstream model is loading (status {}, upstream estimate {:?}s), retry in {}s",
          status,
          failure.and_then(|f| f.estimated_time),
          retry_after_secs
        );
        return Some(Error::ModelLoading { retry_after_secs });
    }

    if let Some(f) = failure
    {   return Some(Error::ApiError(truncate(f.error.message())));
    }

    if !(200..300).contains(&status)
    {   return Some(Error::ApiError(truncate(body)));
    }

    None
}

/// Strip a Markdown code fence (```sql or ```) around `text`
pub fn strip_code_fences(text: &str) -> String
{   let trimmed = text.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```sql")
    {   rest
    } else if let Some(rest) = trimmed.strip_prefix("```SQL")
    {   rest
    } else if let Some(rest) = trimmed.strip_prefix("```")
    {   rest
    } else
    {   trimmed
    };
    inner.strip_suffix("```").unwrap_or(inner).trim().to_string()
}

/// Generated text of the first element of a generation list.
/// Shared by the two inference-API adapters.
pub fn first_generation(
  kind: BackendKind
, status: u16
, body: &str
) -> Result<String, Error>
{   let parsed = InferenceResponse::parse(body);
    if let Some(err) = classify_failure(kind, status, body, parsed.as_ref())
    {   return Err(err);
    }

    match parsed
    {   Some(InferenceResponse::Generations(generations)) => {
          generations
            .into_iter()
            .next()
            .map(|g| g.generated_text.trim().to_string())
            .ok_or(Error::NoGenerations)
        }
      , _ => Err(Error::ParseError(truncate(body)))
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn status_503_is_warming_up_with_backend_default()
    {   let err = classify_failure(BackendKind::Chat, 503, "", None).unwrap();
        assert_eq!(err, Error::ModelLoading { retry_after_secs: 10 });

        let err = classify_failure(BackendKind::FewShot, 503, "", None).unwrap();
        assert_eq!(err, Error::ModelLoading { retry_after_secs: 20 });
    }

    #[test]
    fn loading_body_keeps_fixed_retry_delay()
    {   let body = r#"{"error":"Model is currently loading","estimated_time":86400.0}"#;
        let parsed = InferenceResponse::parse(body);
        let err = classify_failure(BackendKind::FewShot, 200, body, parsed.as_ref())
          .unwrap();
        assert_eq!(err, Error::ModelLoading { retry_after_secs: 20 });
        assert!(err.to_string().contains("try again in 20 seconds"));

        let err = classify_failure(BackendKind::Chat, 503, body, parsed.as_ref())
          .unwrap();
        assert_eq!(err, Error::ModelLoading { retry_after_secs: 10 });
    }

    #[test]
    fn other_loading_wording_is_not_warming_up()
    {   let body = r#"{"error":"Error loading tokenizer: file not found"}"#;
        let parsed = InferenceResponse::parse(body);
        assert_eq!(
          classify_failure(BackendKind::Instruct, 400, body, parsed.as_ref()),
          Some(Error::ApiError("Error loading tokenizer: file not found".to_string()))
        );
    }

    #[test]
    fn other_failures_are_truncated_api_errors()
    {   let long = "x".repeat(1000);
        match classify_failure(BackendKind::Instruct, 500, &long, None)
        {   Some(Error::ApiError(msg)) => assert_eq!(msg.len(), DIAGNOSTIC_PREFIX_CHARS)
          , other => panic!("unexpected: {:?}", other)
        }

        let body = r#"{"error":"Authorization header is invalid"}"#;
        let parsed = InferenceResponse::parse(body);
        assert_eq!(
          classify_failure(BackendKind::FewShot, 401, body, parsed.as_ref()),
          Some(Error::ApiError("Authorization header is invalid".to_string()))
        );
    }

    #[test]
    fn success_status_without_error_body_passes()
    {   let body = r#"[{"generated_text":"SELECT 1"}]"#;
        let parsed = InferenceResponse::parse(body);
        assert!(classify_failure(BackendKind::FewShot, 200, body, parsed.as_ref()).is_none());
    }

    #[test]
    fn code_fences_are_stripped()
    {   assert_eq!(strip_code_fences("```sql\nSELECT 1;\n```"), "SELECT 1;");
        assert_eq!(strip_code_fences("```\nSELECT 2;\n```\n"), "SELECT 2;");
        assert_eq!(strip_code_fences("  SELECT 3;  "), "SELECT 3;");
        assert_eq!(strip_code_fences("```sql SELECT 4;"), "SELECT 4;");
    }

    #[test]
    fn first_generation_handles_empty_and_garbage()
    {   assert_eq!(
          first_generation(BackendKind::FewShot, 200, "[]"),
          Err(Error::NoGenerations)
        );
        assert!(matches!(
          first_generation(BackendKind::FewShot, 200, "not json"),
          Err(Error::ParseError(_))
        ));
        assert_eq!(
          first_generation(BackendKind::FewShot, 200, r#"[{"generated_text":" SELECT 1 "}]"#),
          Ok("SELECT 1".to_string())
        );
    }

    #[test]
    fn adapter_follows_configured_backend()
    {   for kind in [BackendKind::FewShot, BackendKind::Instruct, BackendKind::Chat]
        {   let adapter = adapter_for(&ServiceConfig::for_backend(kind));
            assert_eq!(adapter.kind(), kind);
        }
    }
}
