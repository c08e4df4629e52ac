//! Web server module
//!
//! Provides the relay's HTTP API.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use handlers::RelayResponse;
pub use routes::create_router;
pub use state::AppState;
