//! VnLegal server: axum HTTP API and CLI around the legal document splitter.

pub mod cli;
pub mod error;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
