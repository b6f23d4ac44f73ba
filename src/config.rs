//! Process-wide configuration, read once from the environment at startup

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use log::{debug, warn};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const HF_INFERENCE_BASE: &str
  = "https://api-inference.huggingface.co/models";
const HF_ROUTER_CHAT_URL: &str
  = "https://router.huggingface.co/v1/chat/completions";

/// Which upstream API shape the service speaks.
/// Each variant maps to one adapter in `providers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind
{   /// Text-generation endpoint steered by a few-shot template
    FewShot
  , /// Raw inference endpoint with an instruction-wrapped prompt
    Instruct
  , /// Chat-completions router
    Chat
}

impl BackendKind
{   pub fn name(&self) -> &'static str
    {   match self
        {   BackendKind::FewShot => "few-shot"
          , BackendKind::Instruct => "instruct"
          , BackendKind::Chat => "chat"
        }
    }

    pub fn default_model(&self) -> &'static str
    {   match self
        {   BackendKind::FewShot => "google/flan-t5-large"
          , BackendKind::Instruct => "mistralai/Mistral-7B-Instruct-v0.2"
          , BackendKind::Chat => "Qwen/Qwen2.5-Coder-32B-Instruct"
        }
    }

    /// Endpoint used when `HF_API_URL` is not set.
    /// The inference API addresses the model in the path,
    /// the router takes it in the body.
    pub fn default_endpoint(&self, model: &str) -> String
    {   match self
        {   BackendKind::FewShot | BackendKind::Instruct => {
              format!("{}/{}", HF_INFERENCE_BASE, model)
            }
          , BackendKind::Chat => HF_ROUTER_CHAT_URL.to_string()
        }
    }

    /// Seconds suggested to the caller when the model is still loading
    pub fn default_retry_secs(&self) -> u64
    {   match self
        {   BackendKind::FewShot | BackendKind::Instruct => 20
          , BackendKind::Chat => 10
        }
    }
}

impl FromStr for BackendKind
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_ascii_lowercase().replace('_', "-").as_str()
        {   "few-shot" | "fewshot" => Ok(BackendKind::FewShot)
          , "instruct" => Ok(BackendKind::Instruct)
          , "chat" => Ok(BackendKind::Chat)
          , other => Err(crate::error::Error::InvalidConfiguration(
              format!(
                "unknown backend '{}' (expected few-shot, instruct or chat)",
                other
              )
            ))
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig
{   /// Listen port, bound on all interfaces
    pub port: u16
  , /// Upstream API shape
    pub backend: BackendKind
  , /// Model identifier
    pub model: String
  , /// Full upstream URL
    pub endpoint: String
  , /// Bearer credential for the upstream
    #[serde(skip_serializing)]
    pub api_key: Option<String>
  , /// Outbound request timeout in seconds
    pub timeout_secs: u64
}

impl ServiceConfig
{   /// Build a configuration for `backend` with all its defaults
    pub fn for_backend(backend: BackendKind) -> Self
    {   let model = backend.default_model().to_string();
        ServiceConfig
        {   port: DEFAULT_PORT
          , backend
          , endpoint: backend.default_endpoint(&model)
          , model
          , api_key: None
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let get = |key: &str| {
          lookup(key).filter(|v| !v.trim().is_empty())
        };

        let backend = match get("SQL_BACKEND")
        {   Some(raw) => raw.parse::<BackendKind>()?
          , None => BackendKind::FewShot
        };

        let port = match get("PORT")
        {   Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
              crate::error::Error::InvalidConfiguration(
                format!("PORT '{}': {}", raw, e)
              )
            })?
          , None => DEFAULT_PORT
        };

        let timeout_secs = match get("HF_TIMEOUT_SECS")
        {   Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
              crate::error::Error::InvalidConfiguration(
                format!("HF_TIMEOUT_SECS '{}': {}", raw, e)
              )
            })?
          , None => DEFAULT_TIMEOUT_SECS
        };

        let model = get("HF_MODEL")
          .unwrap_or_else(|| backend.default_model().to_string());
        let endpoint = get("HF_API_URL")
          .unwrap_or_else(|| backend.default_endpoint(&model));

        let api_key = get("HF_API_KEY");
        if api_key.is_none()
        {   warn!("HF_API_KEY is not set, upstream calls are unauthenticated");
        }

        let config = ServiceConfig
        {   port
          , backend
          , model
          , endpoint
          , api_key
          , timeout_secs
        };
        debug!("Loaded configuration: {:?}", config.redacted());
        Ok(config)
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }

    /// Copy safe to log
    pub fn redacted(&self) -> Self
    {   ServiceConfig
        {   api_key: self.api_key.as_ref().map(|_| "***".to_string())
          , ..self.clone()
        }
    }
}

impl Default for ServiceConfig
{   fn default() -> Self
    {   ServiceConfig::for_backend(BackendKind::FewShot)
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)])
      -> impl Fn(&str) -> Option<String>
    {   let map: HashMap<String, String> = pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_few_shot_defaults()
    {   let config = ServiceConfig::from_lookup(lookup_from(&[]))
          .unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.backend, BackendKind::FewShot);
        assert_eq!(config.model, "google/flan-t5-large");
        assert_eq!(
          config.endpoint,
          "https://api-inference.huggingface.co/models/google/flan-t5-large"
        );
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn reads_port_key_and_backend()
    {   let config = ServiceConfig::from_lookup(lookup_from(&[
          ("PORT", "8081"),
          ("HF_API_KEY", "hf_secret"),
          ("SQL_BACKEND", "chat"),
        ])).unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.backend, BackendKind::Chat);
        assert_eq!(config.api_key.as_deref(), Some("hf_secret"));
        assert_eq!(
          config.endpoint,
          "https://router.huggingface.co/v1/chat/completions"
        );
    }

    #[test]
    fn model_override_moves_inference_endpoint()
    {   let config = ServiceConfig::from_lookup(lookup_from(&[
          ("SQL_BACKEND", "instruct"),
          ("HF_MODEL", "acme/sql-7b"),
        ])).unwrap();
        assert_eq!(
          config.endpoint,
          "https://api-inference.huggingface.co/models/acme/sql-7b"
        );
    }

    #[test]
    fn rejects_unknown_backend_and_bad_port()
    {   let err = ServiceConfig::from_lookup(lookup_from(&[
          ("SQL_BACKEND", "telepathy"),
        ])).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidConfiguration(_)));

        let err = ServiceConfig::from_lookup(lookup_from(&[
          ("PORT", "eighty"),
        ])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn backend_names_parse_loosely()
    {   assert_eq!("FEW_SHOT".parse::<BackendKind>().unwrap(), BackendKind::FewShot);
        assert_eq!(" instruct ".parse::<BackendKind>().unwrap(), BackendKind::Instruct);
        assert_eq!(BackendKind::Chat.name(), "chat");
    }

    #[test]
    fn redacted_hides_key()
    {   let mut config = ServiceConfig::default();
        config.api_key = Some("hf_secret".to_string());
        assert_eq!(config.redacted().api_key.as_deref(), Some("***"));
    }
}
