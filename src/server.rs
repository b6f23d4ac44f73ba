//! HTTP surface: `POST /process-voice` and a JSON 404 fallback

use std::sync::Arc;
use axum::{
  body::Bytes,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::post,
  Json, Router,
};
use log::{debug, info, warn, error};
use crate::client::InferenceClient;
use crate::config::ServiceConfig;
use crate::error::Error;
use crate::request::{ErrorResponse, PromptRequest, ResponseEnvelope};

pub const PROCESS_VOICE_PATH: &str = "/process-voice";

/// Read-only state shared by all requests
pub struct AppState
{   pub client: InferenceClient
}

impl AppState
{   pub fn from_config(config: &ServiceConfig) -> Result<Self, Error>
    {   Ok(AppState { client: InferenceClient::new(config)? })
    }
}

pub fn build_app(state: Arc<AppState>) -> Router
{   Router::new()
      .route(PROCESS_VOICE_PATH, post(process_voice))
      .fallback(not_found)
      .with_state(state)
}

/// Bind all interfaces on `config.port` and serve until the process stops
pub async fn run_server(config: &ServiceConfig) -> Result<(), Error>
{   let state = Arc::new(AppState::from_config(config)?);
    info!(
      "Serving {} with the {} backend ({})",
      PROCESS_VOICE_PATH,
      state.client.adapter().kind().name(),
      config.model
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
      .await
      .map_err(|e| {
        error!("Failed to bind port {}: {}", config.port, e);
        Error::Other(format!("bind failed on port {}: {}", config.port, e))
      })?;
    info!("Listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, build_app(state))
      .await
      .map_err(|e| Error::Other(format!("server failed: {}", e)))
}

impl IntoResponse for Error
{   fn into_response(self) -> Response
    {   let status = if self.is_warming_up()
        {   StatusCode::SERVICE_UNAVAILABLE
        } else
        {   StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ResponseEnvelope::failure(&self))).into_response()
    }
}

fn invalid_payload() -> Response
{   (
      StatusCode::BAD_REQUEST,
      Json(ErrorResponse { error: "Invalid payload".to_string() }),
    )
      .into_response()
}

/// Body is taken raw so that a missing or malformed body still gets the
/// service's own 400 envelope instead of the extractor's rejection
async fn process_voice(
  State(state): State<Arc<AppState>>
, body: Bytes
) -> Response
{   let request = match serde_json::from_slice::<serde_json::Value>(&body)
      .ok()
      .as_ref()
      .and_then(PromptRequest::from_json)
    {   Some(request) => request
      , None => {
          debug!("Rejecting payload of {} bytes", body.len());
          return invalid_payload();
        }
    };

    info!("Received prompt: {:?}", request.prompt);

    match state.client.generate_sql(&request.prompt).await
    {   Ok(sql) => {
          info!("Generated SQL: {}", sql);
          (StatusCode::OK, Json(ResponseEnvelope::sql(&sql))).into_response()
        }
      , Err(err) if err.is_warming_up() => {
          warn!("Prompt not served, {}", err);
          err.into_response()
        }
      , Err(err) => {
          error!("Prompt failed: {}", err);
          err.into_response()
        }
    }
}

async fn not_found() -> Response
{   (
      StatusCode::NOT_FOUND,
      Json(ErrorResponse { error: "Not found".to_string() }),
    )
      .into_response()
}
