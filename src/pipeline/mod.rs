//! Pipeline entry points for scraper operations.
//!
//! - `driver`: one session-driven page load + scroll + extract cycle
//! - `scrape`: multi-cycle collection with cursor-based resumption
//! - `hydrate`: rebuild full posts from checkpoint lines

pub mod driver;
pub mod hydrate;
pub mod scrape;

pub use driver::{PageDriver, ThreadCapture};
pub use hydrate::Hydrator;
pub use scrape::{ScrapeStream, TimelineScraper};
