//! HTTP surface of the facade.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit)
//!     → handlers.rs (query string or JSON body → RouteQuery)
//!     → Dispatcher (provider call, formatting)
//!     → response.rs (status mapping, content type)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
