//! Extraction and aggregation services.
//!
//! - `extract`: typed records from parsed timeline markup
//! - `threads`: conversation grouping and thread-page session driving
//! - `stats`: aggregate reporting over collected records

pub mod extract;
pub mod stats;
pub mod threads;

pub use extract::Extractor;
pub use stats::{LanguageFilter, TimelineStats};
pub use threads::ThreadExtractor;
