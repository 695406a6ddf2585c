//! Core library for tav: configuration, API types, and the feedback client.
//!
//! This crate has no UI dependencies. The TUI crate consumes it through
//! [`api::FeedbackClient`] and [`config::Config`].

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use api::FeedbackClient;
pub use config::Config;
pub use error::ApiError;
pub use types::{FeedbackContent, FeedbackRef};
