// src/session/mod.rs

//! Page session capability surface.
//!
//! The pagination core drives a browser-like session exclusively through
//! [`PageSession`]; the concrete automation mechanism stays behind the
//! trait. A chromiumoxide-backed implementation ships behind the
//! `browser` feature.

use async_trait::async_trait;

use crate::error::Result;

#[cfg(feature = "browser")]
pub mod chrome;
mod recycler;

#[cfg(feature = "browser")]
pub use chrome::{ChromeSession, ChromeSessionFactory};
pub use recycler::SessionRecycler;

/// One browser-like page session.
///
/// All calls are sequential; there is exactly one logical owner at a time.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to a URL and wait for the initial render.
    async fn open(&mut self, url: &str) -> Result<()>;

    /// Scroll to the bottom of the page.
    async fn scroll(&mut self) -> Result<()>;

    /// Wait until content revealed by the last scroll or navigation is
    /// considered ready. The quiescence condition is the implementation's
    /// choice.
    async fn settle(&mut self) -> Result<()>;

    /// Snapshot of the currently rendered document.
    async fn current_document(&mut self) -> Result<String>;

    /// Whether an element matching `selector` is currently present.
    async fn find_sentinel(&mut self, selector: &str) -> Result<bool>;

    /// Activate every element currently matching `selector`.
    /// Returns how many elements were clicked.
    async fn click(&mut self, selector: &str) -> Result<usize>;

    /// Release the session and its underlying resources.
    async fn close(&mut self) -> Result<()>;
}

/// Creates fresh page sessions on demand.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self) -> Result<Box<dyn PageSession>>;
}
