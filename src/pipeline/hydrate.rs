// src/pipeline/hydrate.rs

//! Record hydration.
//!
//! The `scrape ids` flow persists cheap `id, username` checkpoint lines;
//! hydration re-fetches each record's thread page and rebuilds the full
//! post, comments included.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{thread_url, Config, Post};
use crate::pipeline::PageDriver;
use crate::session::SessionFactory;

/// Split one checkpoint line (`id, username`) into its parts.
pub fn parse_checkpoint_line(line: &str) -> Option<(&str, &str)> {
    let (id, username) = line.trim().split_once(',')?;
    let id = id.trim();
    let username = username.trim();
    if id.is_empty() || username.is_empty() {
        return None;
    }
    Some((id, username))
}

/// Re-fetches full posts from checkpoint lines over one recycled session.
pub struct Hydrator {
    driver: PageDriver,
    profile_url: String,
}

impl Hydrator {
    pub fn new(factory: Box<dyn SessionFactory>, config: Arc<Config>) -> Result<Self> {
        Ok(Self {
            driver: PageDriver::new(factory, &config)?,
            profile_url: config.scraper.profile_url.clone(),
        })
    }

    /// Fetch one record's thread page and rebuild the post.
    ///
    /// Returns [`AppError::SessionUnavailable`] when the page no longer
    /// renders the record (deleted, suspended, wrong id); callers skip
    /// those and continue.
    pub async fn hydrate(&mut self, id: &str, username: &str) -> Result<Post> {
        let url = thread_url(&self.profile_url, username, id);
        let capture = self.driver.collect_thread(&url).await?;

        let mut post = capture
            .root
            .ok_or_else(|| AppError::unavailable(format!("{username}/{id}")))?;
        for conversation in capture.conversations {
            post.attach_conversation(conversation);
        }
        Ok(post)
    }

    /// Release the underlying session.
    pub async fn close(&mut self) -> Result<()> {
        self.driver.close().await
    }
}
