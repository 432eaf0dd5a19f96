//! HTTP server for the journal.
//!
//! Serves `GET /route/{scope}` as an HTML (or JSON) listing of the scope's
//! entries, plus `/metrics`, `/-/healthy` and `/-/ready`.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod middleware;
mod request;
mod response;

pub use config::{CliArgs, JournalServerConfig, load_config};
pub use error::ApiError;
pub use handlers::AppState;
pub use http::{JournalServer, journal_router, operations_router};
pub use metrics::Metrics;
pub use request::scope_from_headers;
pub use response::{ResponseFormat, render_html};
