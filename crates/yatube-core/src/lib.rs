//! # Yatube Core
//!
//! The domain layer of the Yatube blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, repository ports, the feed paginator, post form validation and the
//! services the HTTP layer drives.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use pagination::{Page, PageWindow, Paginator, PAGE_SIZE};
