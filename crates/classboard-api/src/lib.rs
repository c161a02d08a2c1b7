//! Classboard API Layer
//!
//! Wire types and the REST collaborator used by the board controller.
//! `HttpBoardApi` talks to a running backend; `MemoryBackend` keeps the
//! same server-side rules in process for the dev server and for tests.

pub mod api;
pub mod client;
pub mod config;
pub mod dto;
pub mod http;
pub mod memory;

pub use api::BoardApi;
pub use client::{ApiError, ApiResult, ValidationIssue};
pub use config::ClientConfig;
pub use http::HttpBoardApi;
pub use memory::{MemoryBackend, Operation};
