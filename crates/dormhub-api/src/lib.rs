//! # dormhub-api
//!
//! JSON HTTP surface for DormHub, mounted under `/api`. Handlers are thin:
//! they extract, call one service method, and wrap the result in
//! [`ApiResponse`](dto::response::ApiResponse).

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
