pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod client;
pub mod server;

/*

voice-sql turns a spoken (already transcribed) request into SQL by asking
a hosted model. One endpoint, one outbound call per request, no state.

voice-sql/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports
│   ├── main.rs         # Binary: logging, config, serve
│   ├── error.rs        # Error type and its client-facing text
│   ├── config.rs       # Environment configuration, backend choice
│   ├── request.rs      # Inbound, outbound and envelope types
│   ├── client.rs       # The single outbound call
│   ├── server.rs       # axum router and handler
│   └── providers/      # One adapter per upstream API shape
│       ├── mod.rs      # Adapter trait, shared failure handling
│       ├── few_shot.rs
│       ├── instruct.rs
│       └── chat.rs
└── tests/              # End-to-end against a mock upstream

*/

pub use client::InferenceClient;
pub use config::{BackendKind, ServiceConfig};
pub use error::Error;
pub use providers::Adapter;
pub use server::{build_app, run_server, AppState};
