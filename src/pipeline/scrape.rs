// src/pipeline/scrape.rs

//! Collection orchestrator.
//!
//! Repeats pagination cycles against the search endpoint and yields a
//! lazy, forward-only stream of posts. The cursor advances to the last
//! yielded post's id, so a consumer that stops early can checkpoint and
//! resume with `max_id` later.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::Stream;

use crate::error::{AppError, Result};
use crate::models::{Config, Post, SearchQuery};
use crate::pipeline::PageDriver;
use crate::session::SessionFactory;

/// Runs full pagination cycles over the configured search endpoint.
pub struct TimelineScraper {
    driver: PageDriver,
    config: Arc<Config>,
}

impl TimelineScraper {
    pub fn new(factory: Box<dyn SessionFactory>, config: Arc<Config>) -> Result<Self> {
        Ok(Self {
            driver: PageDriver::new(factory, &config)?,
            config,
        })
    }

    /// One full pagination cycle. Ends with [`AppError::NoMoreItems`]
    /// when the page renders no posts at all; callers must treat that as
    /// successful termination, not failure.
    pub async fn scrape_once(&mut self, query: &SearchQuery) -> Result<Vec<Post>> {
        let url = query.to_url(&self.config.scraper.search_url)?;
        log::debug!("Cycle URL: {}", url);

        let posts = self.driver.collect_page(&url).await?;
        if posts.is_empty() {
            return Err(AppError::NoMoreItems);
        }
        log::info!("Cycle yielded {} posts", posts.len());
        Ok(posts)
    }

    /// Lazy stream of up to `times` pagination cycles. Consumes the
    /// scraper: the stream is forward-only and cannot be restarted.
    pub fn scrape_many(
        self,
        query: SearchQuery,
        times: usize,
        cursor: Option<String>,
    ) -> ScrapeStream {
        ScrapeStream {
            scraper: self,
            query,
            cursor,
            remaining: times,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Release the driver's session.
    pub async fn close(&mut self) -> Result<()> {
        self.driver.close().await
    }
}

/// Pull-based post stream over multiple pagination cycles.
///
/// Exhausts cleanly: `next()` keeps returning `None` once `times` cycles
/// ran or a cycle came back empty. The underlying session is released on
/// every termination path.
pub struct ScrapeStream {
    scraper: TimelineScraper,
    query: SearchQuery,
    cursor: Option<String>,
    remaining: usize,
    buffer: VecDeque<Post>,
    done: bool,
}

impl ScrapeStream {
    /// Next post, running the next pagination cycle when the current one
    /// is drained.
    pub async fn next(&mut self) -> Option<Result<Post>> {
        loop {
            if let Some(post) = self.buffer.pop_front() {
                self.cursor = Some(post.entry.id.clone());
                return Some(Ok(post));
            }
            if self.done {
                return None;
            }
            if self.remaining == 0 {
                self.finish().await;
                return None;
            }

            self.remaining -= 1;
            // unconditional per-cycle copy; the template never sees the cursor
            let cycle_query = self.query.for_cycle(self.cursor.as_deref());
            match self.scraper.scrape_once(&cycle_query).await {
                Ok(posts) => self.buffer.extend(posts),
                Err(AppError::NoMoreItems) => {
                    log::info!("Timeline exhausted, ending scrape");
                    self.finish().await;
                    return None;
                }
                Err(e) => {
                    self.finish().await;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Cursor of the last yielded post, for consumer-side checkpointing.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Adapt into a [`futures::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<Post>> {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next().await.map(|item| (item, stream))
        })
    }

    async fn finish(&mut self) {
        self.done = true;
        if let Err(e) = self.scraper.close().await {
            log::warn!("Failed to release session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{ScriptedFactory, SessionScript};

    fn tweet(id: &str, username: &str) -> String {
        format!(
            r#"<div class="tweet" data-tweet-id="{id}" data-screen-name="{username}">
                 <p class="tweet-text">post {id}</p>
               </div>"#
        )
    }

    fn page(tweets: &[(&str, &str)]) -> String {
        let body: String = tweets.iter().map(|(id, user)| tweet(id, user)).collect();
        format!("<html><body>{body}</body></html>")
    }

    /// Three scripted cycles: fresh query -> p1,p2; after p2 -> p3;
    /// after p3 -> nothing.
    fn three_cycle_script() -> SessionScript {
        SessionScript::new(|url: &str| {
            if url.contains("max_id%3Ap3") {
                page(&[])
            } else if url.contains("max_id%3Ap2") {
                page(&[("p3", "carol")])
            } else {
                page(&[("p1", "alice"), ("p2", "bob")])
            }
        })
    }

    fn scraper(script: &SessionScript) -> TimelineScraper {
        let mut config = Config::default();
        config.scraper.per_driver = 0;
        TimelineScraper::new(
            Box::new(ScriptedFactory::new(script.clone())),
            Arc::new(config),
        )
        .unwrap()
    }

    async fn drain(stream: &mut ScrapeStream) -> Vec<Post> {
        let mut posts = Vec::new();
        while let Some(item) = stream.next().await {
            posts.push(item.unwrap());
        }
        posts
    }

    #[tokio::test]
    async fn test_scrape_many_stops_on_empty_cycle() {
        let script = three_cycle_script();
        let mut stream = scraper(&script).scrape_many(SearchQuery::new("#rust"), 10, None);

        let posts = drain(&mut stream).await;
        let ids: Vec<&str> = posts.iter().map(|p| p.entry.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);

        // cycles 1-3 ran, the empty third one terminated the stream early
        assert_eq!(script.events_of("open").len(), 3);
        // exhausted, not wrapping around
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_cursor_advances_to_last_yielded_id() {
        let script = three_cycle_script();
        let mut stream = scraper(&script).scrape_many(SearchQuery::new("#rust"), 3, None);
        let _ = drain(&mut stream).await;

        let opens = script.events_of("open");
        assert!(!opens[0].contains("max_id"));
        assert!(opens[1].contains("max_id%3Ap2"));
        assert!(opens[2].contains("max_id%3Ap3"));
    }

    #[tokio::test]
    async fn test_initial_cursor_is_applied() {
        let script = three_cycle_script();
        let mut stream = scraper(&script).scrape_many(
            SearchQuery::new("#rust"),
            1,
            Some("p2".to_string()),
        );
        let posts = drain(&mut stream).await;

        let ids: Vec<&str> = posts.iter().map(|p| p.entry.id.as_str()).collect();
        assert_eq!(ids, ["p3"]);
        assert!(script.events_of("open")[0].contains("max_id%3Ap2"));
    }

    #[tokio::test]
    async fn test_consumer_stopping_early_runs_no_further_cycles() {
        let script = three_cycle_script();
        let mut stream = scraper(&script).scrape_many(SearchQuery::new("#rust"), 10, None);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.entry.id, "p1");
        drop(stream);

        assert_eq!(script.events_of("open").len(), 1);
    }

    #[tokio::test]
    async fn test_times_limit_is_honored() {
        let script = three_cycle_script();
        let mut stream = scraper(&script).scrape_many(SearchQuery::new("#rust"), 2, None);
        let posts = drain(&mut stream).await;

        assert_eq!(posts.len(), 3);
        assert_eq!(script.events_of("open").len(), 2);
    }

    #[tokio::test]
    async fn test_session_released_on_exhaustion() {
        let script = three_cycle_script();
        let mut stream = scraper(&script).scrape_many(SearchQuery::new("#rust"), 2, None);
        let _ = drain(&mut stream).await;

        assert_eq!(script.events_of("close").len(), 1);
    }

    #[tokio::test]
    async fn test_into_stream_yields_same_sequence() {
        use futures::StreamExt;

        let script = three_cycle_script();
        let stream = scraper(&script)
            .scrape_many(SearchQuery::new("#rust"), 10, None)
            .into_stream();
        let posts: Vec<_> = stream.map(|item| item.unwrap().entry.id).collect().await;
        assert_eq!(posts, ["p1", "p2", "p3"]);
    }
}
