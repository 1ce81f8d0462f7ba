// src/session/recycler.rs

//! Session lifetime management.
//!
//! Long-lived browser sessions leak renderer resources, so a session is
//! retired after a bounded number of page loads and replaced with a fresh
//! one. Callers only ever see the [`PageSession`] surface; the swap is
//! invisible to them.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::session::{PageSession, SessionFactory};

/// A [`PageSession`] that transparently replaces its underlying session
/// after every `reload_every` page loads.
///
/// The retiring session is always fully closed before its replacement is
/// created.
pub struct SessionRecycler {
    factory: Box<dyn SessionFactory>,
    session: Option<Box<dyn PageSession>>,
    reload_every: usize,
    opened: usize,
}

impl SessionRecycler {
    /// Create a recycler. No session is launched until the first `open`.
    pub fn new(factory: Box<dyn SessionFactory>, reload_every: usize) -> Self {
        Self {
            factory,
            session: None,
            reload_every: reload_every.max(1),
            opened: 0,
        }
    }

    async fn retire_current(&mut self) -> Result<()> {
        if let Some(mut old) = self.session.take() {
            // Release errors must not leave us without a session; the
            // replacement is created regardless.
            if let Err(e) = old.close().await {
                log::warn!("Failed to close retired session: {}", e);
            }
        }
        Ok(())
    }

    fn current(&mut self) -> Result<&mut Box<dyn PageSession>> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::session("no active session"))
    }
}

#[async_trait]
impl PageSession for SessionRecycler {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.opened += 1;
        if self.opened > self.reload_every {
            self.retire_current().await?;
            self.opened = 1;
        }
        if self.session.is_none() {
            let fresh = self.factory.create().await?;
            self.session = Some(fresh);
        }
        self.current()?.open(url).await
    }

    async fn scroll(&mut self) -> Result<()> {
        self.current()?.scroll().await
    }

    async fn settle(&mut self) -> Result<()> {
        self.current()?.settle().await
    }

    async fn current_document(&mut self) -> Result<String> {
        self.current()?.current_document().await
    }

    async fn find_sentinel(&mut self, selector: &str) -> Result<bool> {
        self.current()?.find_sentinel(selector).await
    }

    async fn click(&mut self, selector: &str) -> Result<usize> {
        self.current()?.click(selector).await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            session.close().await?;
        }
        Ok(())
    }
}
