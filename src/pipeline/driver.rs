// src/pipeline/driver.rs

//! Pagination driver.
//!
//! Runs one page-collection cycle at a time against the session: open the
//! page, scroll a fixed number of steps, capture the rendered document,
//! extract. Posts carrying comments trigger a nested thread sub-cycle
//! that scrolls their conversation page to the end before extraction.

use scraper::Html;

use crate::error::Result;
use crate::models::{Comment, Config, Post};
use crate::services::{Extractor, ThreadExtractor};
use crate::session::{PageSession, SessionFactory, SessionRecycler};

/// States of one page-collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Opening,
    Scrolling,
    Extracting,
    Done,
}

/// Everything captured from one conversation thread page.
pub struct ThreadCapture {
    /// First post-level node in document order (the thread's root post)
    pub root: Option<Post>,
    /// Conversation groups in display order
    pub conversations: Vec<Vec<Comment>>,
}

/// Drives pagination cycles over a recycled page session.
pub struct PageDriver {
    session: SessionRecycler,
    extractor: Extractor,
    threads: ThreadExtractor,
    per_driver: usize,
    profile_url: String,
}

impl PageDriver {
    /// Create a driver. The session itself is launched lazily on the
    /// first page load.
    pub fn new(factory: Box<dyn SessionFactory>, config: &Config) -> Result<Self> {
        Ok(Self {
            session: SessionRecycler::new(factory, config.scraper.reload_every),
            extractor: Extractor::new(&config.selectors)?,
            threads: ThreadExtractor::new(&config.selectors)?,
            per_driver: config.scraper.per_driver,
            profile_url: config.scraper.profile_url.clone(),
        })
    }

    /// One full pagination cycle: all posts visible after scrolling, with
    /// their comment threads resolved.
    pub async fn collect_page(&mut self, url: &str) -> Result<Vec<Post>> {
        let mut state = DriverState::Opening;
        let mut posts = Vec::new();

        while state != DriverState::Done {
            log::debug!("Driver state: {:?}", state);
            state = match state {
                DriverState::Opening => {
                    self.session.open(url).await?;
                    DriverState::Scrolling
                }
                DriverState::Scrolling => {
                    for _ in 0..self.per_driver {
                        self.session.scroll().await?;
                        self.session.settle().await?;
                    }
                    DriverState::Extracting
                }
                DriverState::Extracting => {
                    let html = self.session.current_document().await?;
                    let document = Html::parse_document(&html);
                    posts = self.extractor.posts(&document);
                    DriverState::Done
                }
                DriverState::Done => DriverState::Done,
            };
        }

        // Thread sub-cycles navigate the session away from the timeline,
        // so they run only after the timeline document is captured.
        for post in &mut posts {
            if post.comments.total == 0 {
                continue;
            }
            let thread_url = post.thread_url(&self.profile_url);
            let capture = self.collect_thread(&thread_url).await?;
            for conversation in capture.conversations {
                post.attach_conversation(conversation);
            }
        }

        Ok(posts)
    }

    /// Nested sub-cycle over one conversation thread page.
    ///
    /// Scrolling is sentinel-driven and unbounded: it continues until the
    /// page stops announcing more items.
    pub async fn collect_thread(&mut self, url: &str) -> Result<ThreadCapture> {
        self.session.open(url).await?;

        while !self.threads.is_at_thread_end(&mut self.session).await? {
            self.session.scroll().await?;
            self.session.settle().await?;
        }

        let expanded = self.threads.expand_more_replies(&mut self.session).await?;
        if expanded > 0 {
            log::debug!("Expanded {} reply controls on {}", expanded, url);
        }

        let html = self.session.current_document().await?;
        let document = Html::parse_document(&html);

        let root = self.extractor.posts(&document).into_iter().next();
        let conversations = self
            .threads
            .conversations(&document)
            .into_iter()
            .map(|group| self.extractor.comments(group))
            .filter(|conversation| !conversation.is_empty())
            .collect();

        Ok(ThreadCapture {
            root,
            conversations,
        })
    }

    /// Release the underlying session.
    pub async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }
}
