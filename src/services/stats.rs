// src/services/stats.rs

//! Aggregate statistics over collected timelines.
//!
//! Consumes the JSON-lines archive produced by the hydrate flow. Posts
//! are deduplicated by id here, in the reporting layer: the collection
//! core exposes identifiers verbatim and may retraverse pages.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Entry, Post};
use crate::services::extract::parse_humanized_count;
use crate::utils::text::content_words;

/// Keeps entries whose recognizable-word ratio meets a threshold.
///
/// Recognition is wordlist membership: the caller supplies the corpus
/// (one word per line), the filter never guesses. Hashtag tokens are not
/// counted either way.
pub struct LanguageFilter {
    language: String,
    words: HashSet<String>,
    threshold: f64,
}

impl LanguageFilter {
    pub fn new(language: impl Into<String>, words: HashSet<String>, threshold: f64) -> Self {
        Self {
            language: language.into(),
            words,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Load the corpus from a wordlist file, one word per line.
    pub fn from_wordlist(language: impl Into<String>, path: &Path, threshold: f64) -> Result<Self> {
        let words = fs::read_to_string(path)?
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();
        Ok(Self::new(language, words, threshold))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether the text reads as the filter's language. Texts without any
    /// candidate words pass.
    pub fn matches(&self, text: &str) -> bool {
        let candidates: Vec<String> = content_words(text);
        if candidates.is_empty() {
            return true;
        }
        let known = candidates
            .iter()
            .filter(|word| self.words.contains(word.as_str()))
            .count();
        known as f64 / candidates.len() as f64 >= self.threshold
    }
}

/// Accumulator for the `stats` report.
#[derive(Default)]
pub struct TimelineStats {
    filter: Option<LanguageFilter>,
    seen_ids: HashSet<String>,

    all_posts: u64,
    all_comments: u64,
    posts: u64,
    comments: u64,
    posts_with_video: u64,
    comments_with_video: u64,
    posts_with_images: u64,
    comments_with_images: u64,
    videos: u64,
    images: u64,
    retweets: u64,
    likes: u64,
    post_retweets: u64,
    post_likes: u64,
    posts_without_comments: u64,

    users: HashMap<String, u64>,
    users_posting: HashMap<String, u64>,
    hashtags: HashMap<String, u64>,

    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
}

impl TimelineStats {
    pub fn new(filter: Option<LanguageFilter>) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    fn keep(&self, entry: &Entry) -> bool {
        match &self.filter {
            Some(filter) => filter.matches(&entry.text),
            None => true,
        }
    }

    /// Fold one post (and its comments) into the totals. Posts already
    /// seen under the same id are retraversals and are ignored.
    pub fn record(&mut self, post: &Post) {
        self.all_posts += 1;
        if !self.seen_ids.insert(post.entry.id.clone()) {
            return;
        }

        for conversation in &post.comments.conversations {
            for comment in conversation {
                self.all_comments += 1;
                if !self.keep(&comment.entry) {
                    continue;
                }
                self.comments += 1;
                self.record_entry(&comment.entry, false);
            }
        }

        if !self.keep(&post.entry) {
            return;
        }
        self.posts += 1;
        *self
            .users_posting
            .entry(post.entry.username.clone())
            .or_insert(0) += 1;
        self.record_entry(&post.entry, true);

        if post.comments.total == 0 {
            self.posts_without_comments += 1;
        }
        if post.entry.time > 0 {
            if let Some(timestamp) = DateTime::from_timestamp(post.entry.time, 0) {
                self.date_from = Some(match self.date_from {
                    Some(current) => current.min(timestamp),
                    None => timestamp,
                });
                self.date_to = Some(match self.date_to {
                    Some(current) => current.max(timestamp),
                    None => timestamp,
                });
            }
        }
    }

    fn record_entry(&mut self, entry: &Entry, is_post: bool) {
        *self.users.entry(entry.username.clone()).or_insert(0) += 1;
        for hashtag in &entry.hashtags {
            *self.hashtags.entry(hashtag.clone()).or_insert(0) += 1;
        }

        let retweets = parse_humanized_count(&entry.retweets);
        let likes = parse_humanized_count(&entry.likes);
        self.retweets += retweets;
        self.likes += likes;

        if is_post {
            self.post_retweets += retweets;
            self.post_likes += likes;
            if !entry.videos.is_empty() {
                self.posts_with_video += 1;
            }
            if !entry.images.is_empty() {
                self.posts_with_images += 1;
            }
        } else {
            if !entry.videos.is_empty() {
                self.comments_with_video += 1;
            }
            if !entry.images.is_empty() {
                self.comments_with_images += 1;
            }
        }
        self.videos += entry.videos.len() as u64;
        self.images += entry.images.len() as u64;
    }

    /// Render the aggregate report.
    pub fn report(&self) -> String {
        let mut out = String::new();
        if let Some(filter) = &self.filter {
            out.push_str(&format!("language: {}\n", filter.language()));
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            out.push_str(&format!("period of time: from {from} to {to}\n"));
        }
        out.push_str(&format!("# users: {}\n", self.users.len()));
        out.push_str(&format!("# posts: {} of {}\n", self.posts, self.all_posts));
        out.push_str(&format!(
            "# comments: {} of {}\n",
            self.comments, self.all_comments
        ));
        if self.posts > 0 {
            out.push_str(&format!(
                "# comments / # post: {:.2}\n",
                self.comments as f64 / self.posts as f64
            ));
            out.push_str(&format!(
                "# likes / # post: {:.2}\n",
                self.post_likes as f64 / self.posts as f64
            ));
        }
        out.push_str(&format!("# videos: {}\n", self.videos));
        out.push_str(&format!("# posts with video: {}\n", self.posts_with_video));
        out.push_str(&format!(
            "# comments with video: {}\n",
            self.comments_with_video
        ));
        out.push_str(&format!("# images: {}\n", self.images));
        out.push_str(&format!("# posts with images: {}\n", self.posts_with_images));
        out.push_str(&format!(
            "# comments with images: {}\n",
            self.comments_with_images
        ));
        out.push_str(&format!("# users posting: {}\n", self.users_posting.len()));
        out.push_str(&format!("# all likes: {}\n", self.likes));
        out.push_str(&format!("# post likes: {}\n", self.post_likes));
        out.push_str(&format!("# all retweets: {}\n", self.retweets));
        out.push_str(&format!("# post retweets: {}\n", self.post_retweets));
        out.push_str(&format!(
            "# posts without comments: {}\n",
            self.posts_without_comments
        ));
        out.push_str(&format!(
            "# users with less than 5 posts/comments: {}\n",
            self.users.values().filter(|&&count| count < 5).count()
        ));

        out.push_str("most used hashtags:\n");
        for (hashtag, count) in top(&self.hashtags, 20) {
            out.push_str(&format!("\t{hashtag} = {count}\n"));
        }
        out.push_str("most posting users (# posts):\n");
        for (username, count) in top(&self.users_posting, 20) {
            out.push_str(&format!("\t{username} = {count}\n"));
        }
        out.push_str("most prolific users (# posts + # comments):\n");
        for (username, count) in top(&self.users, 20) {
            out.push_str(&format!("\t{username} = {count}\n"));
        }
        out
    }
}

/// Hashtag frequencies across posts and their comments, most used first.
pub fn hashtag_frequencies<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for post in posts {
        for entry in post.iter_entries() {
            for hashtag in &entry.hashtags {
                *counts.entry(hashtag.clone()).or_insert(0) += 1;
            }
        }
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Top `limit` entries by count, ties broken alphabetically.
fn top(counts: &HashMap<String, u64>, limit: usize) -> Vec<(&str, u64)> {
    let mut sorted: Vec<_> = counts
        .iter()
        .map(|(key, &count)| (key.as_str(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted.truncate(limit);
    sorted
}
