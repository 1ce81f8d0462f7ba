// src/models/mod.rs

//! Domain models for the scraper application.

mod config;
mod query;
mod record;
mod selectors;

// Re-export all public types
pub use config::{Config, ScraperConfig, SessionConfig};
pub use query::SearchQuery;
pub use record::{thread_url, Comment, CommentThreads, Entry, Post};
pub use selectors::TimelineSelectors;
