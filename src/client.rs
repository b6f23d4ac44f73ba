use log::{debug, trace, error};
use crate::config::ServiceConfig;
use crate::error::Error;
use crate::providers::Adapter;

/// One outbound call per prompt, no retries.
/// Built once at startup and shared read-only between requests.
pub struct InferenceClient
{   endpoint: String
  , api_key: Option<String>
  , http_client: reqwest::Client
  , adapter: Box<dyn Adapter>
}

impl InferenceClient
{   /// Create a client for the configured backend
    pub fn new(config: &ServiceConfig) -> Result<Self, Error>
    {   Self::with_adapter(config, crate::providers::adapter_for(config))
    }

    pub fn with_adapter(
      config: &ServiceConfig
    , adapter: Box<dyn Adapter>
    ) -> Result<Self, Error>
    {   debug!(
          "Creating InferenceClient for {} (timeout {}s)",
          config.endpoint, config.timeout_secs
        );
        let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(InferenceClient
        {   endpoint: config.endpoint.clone()
          , api_key: config.api_key.clone()
          , http_client
          , adapter
        })
    }

    pub fn adapter(&self) -> &dyn Adapter
    {   self.adapter.as_ref()
    }

    /// Ask the upstream for SQL answering `prompt`
    pub async fn generate_sql(&self, prompt: &str)
      -> Result<String, Error>
    {   let payload = self.adapter.build_payload(prompt);
        debug!(
          "Sending {} request to {}",
          self.adapter.kind().name(),
          self.endpoint
        );

        let mut request = self.http_client
          .post(&self.endpoint)
          .header("Content-Type", "application/json")
          .json(&payload);
        if let Some(key) = &self.api_key
        {   request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
          error!("HTTP error: {}", e);
          Error::from(e)
        })?;

        let status = response.status().as_u16();
        trace!("Upstream response status: {}", status);

        let body = response.text().await.map_err(|e| {
          error!("Failed to read upstream body: {}", e);
          Error::from(e)
        })?;
        trace!("Upstream body: {}", crate::providers::truncate(&body));

        self.adapter.parse_response(status, &body)
    }
}
