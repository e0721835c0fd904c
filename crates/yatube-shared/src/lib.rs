//! # Yatube Shared
//!
//! Request and response types exchanged between the browser-facing server
//! and its clients.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, HealthResponse};
