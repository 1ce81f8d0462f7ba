// src/services/extract.rs

//! Markup extraction service.
//!
//! Pure functions over parsed documents: timeline fragments in, typed
//! records out. No I/O happens here.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Comment, CommentThreads, Entry, Post, TimelineSelectors};

/// Parse a humanized counter string into an integer.
///
/// `K` scales by 1 000 and `M` by 1 000 000; fractional values are
/// truncated after scaling. Empty or unparseable input yields zero, never
/// an error.
///
/// # Examples
/// ```
/// use talon::services::extract::parse_humanized_count;
///
/// assert_eq!(parse_humanized_count("12.3K"), 12_300);
/// assert_eq!(parse_humanized_count("1M"), 1_000_000);
/// assert_eq!(parse_humanized_count(""), 0);
/// ```
pub fn parse_humanized_count(raw: &str) -> u64 {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0;
    }

    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix(['K', 'k']) {
        (n, 1_000u64)
    } else if let Some(n) = cleaned.strip_suffix(['M', 'm']) {
        (n, 1_000_000u64)
    } else {
        (cleaned.as_str(), 1u64)
    };

    let (whole, frac) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }

    let mut value = whole.parse::<u64>().unwrap_or(0).saturating_mul(multiplier);
    if !frac.is_empty() {
        // integer arithmetic keeps the truncation exact ("3.9K" -> 3900)
        let frac = &frac[..frac.len().min(9)];
        let scale = 10u64.pow(frac.len() as u32);
        value = value.saturating_add(frac.parse::<u64>().unwrap_or(0) * multiplier / scale);
    }
    value
}

/// Canonical form of a hashtag: no leading '#', lowercase.
pub fn fold_hashtag(tag: &str) -> String {
    tag.trim_start_matches('#').to_lowercase()
}

/// Extracts typed records from timeline markup.
///
/// All selectors are parsed once at construction; an invalid selector in
/// the configuration fails fast with [`AppError::Selector`].
pub struct Extractor {
    post_sel: Selector,
    text_sel: Selector,
    timestamp_sel: Selector,
    image_sel: Selector,
    video_sel: Selector,
    reply_count_sel: Selector,
    retweet_count_sel: Selector,
    like_count_sel: Selector,
    id_attr: String,
    username_attr: String,
    timestamp_attr: String,
    image_attr: String,
    hashtag_re: Regex,
    style_url_re: Regex,
}

impl Extractor {
    /// Build an extractor from configured selectors.
    pub fn new(selectors: &TimelineSelectors) -> Result<Self> {
        Ok(Self {
            post_sel: parse_selector(&selectors.post_selector)?,
            text_sel: parse_selector(&selectors.text_selector)?,
            timestamp_sel: parse_selector(&selectors.timestamp_selector)?,
            image_sel: parse_selector(&selectors.image_selector)?,
            video_sel: parse_selector(&selectors.video_selector)?,
            reply_count_sel: parse_selector(&selectors.reply_count_selector)?,
            retweet_count_sel: parse_selector(&selectors.retweet_count_selector)?,
            like_count_sel: parse_selector(&selectors.like_count_selector)?,
            id_attr: selectors.id_attr.clone(),
            username_attr: selectors.username_attr.clone(),
            timestamp_attr: selectors.timestamp_attr.clone(),
            image_attr: selectors.image_attr.clone(),
            hashtag_re: Regex::new(r"#\w+").map_err(|e| AppError::config(e.to_string()))?,
            style_url_re: Regex::new(r#"url\(['"]?([^'")]+)['"]?\)"#)
                .map_err(|e| AppError::config(e.to_string()))?,
        })
    }

    /// All post-level records in document order.
    ///
    /// An empty result is not an error: it is the end-of-results signal
    /// the orchestrator terminates on. Fragments missing required anchors
    /// are skipped.
    pub fn posts(&self, document: &Html) -> Vec<Post> {
        document
            .select(&self.post_sel)
            .filter_map(|node| match self.post(node) {
                Ok(post) => Some(post),
                Err(e) => {
                    log::warn!("Skipping post fragment: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Build one post from its timeline node.
    pub fn post(&self, node: ElementRef<'_>) -> Result<Post> {
        let entry = self.entry(node)?;
        let total = parse_humanized_count(&self.counter_text(node, &self.reply_count_sel));
        Ok(Post {
            entry,
            comments: CommentThreads {
                total,
                conversations: Vec::new(),
            },
        })
    }

    /// Build one comment from its conversation node.
    pub fn comment(&self, node: ElementRef<'_>) -> Result<Comment> {
        Ok(Comment {
            entry: self.entry(node)?,
        })
    }

    /// All comments of one conversation, in display order (root reply
    /// first, nested replies following the existing DOM order). Malformed
    /// fragments are skipped.
    pub fn comments(&self, nodes: Vec<ElementRef<'_>>) -> Vec<Comment> {
        nodes
            .into_iter()
            .filter_map(|node| match self.comment(node) {
                Ok(comment) => Some(comment),
                Err(e) => {
                    log::warn!("Skipping comment fragment: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Shared field extraction for posts and comments. All derived fields
    /// are computed eagerly here.
    fn entry(&self, node: ElementRef<'_>) -> Result<Entry> {
        let id = node
            .value()
            .attr(&self.id_attr)
            .ok_or_else(|| AppError::malformed("entry", format!("missing {}", self.id_attr)))?
            .to_string();
        let username = node
            .value()
            .attr(&self.username_attr)
            .ok_or_else(|| {
                AppError::malformed(
                    format!("entry {id}"),
                    format!("missing {}", self.username_attr),
                )
            })?
            .to_string();

        let time = node
            .select(&self.timestamp_sel)
            .next()
            .and_then(|el| el.value().attr(&self.timestamp_attr))
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(0);

        let text = node
            .select(&self.text_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
            .trim()
            .to_string();

        let mut hashtags: Vec<String> = Vec::new();
        for tag in self.hashtag_re.find_iter(&text) {
            let folded = fold_hashtag(tag.as_str());
            if !hashtags.contains(&folded) {
                hashtags.push(folded);
            }
        }

        let images = node
            .select(&self.image_sel)
            .filter_map(|el| el.value().attr(&self.image_attr))
            .map(str::to_string)
            .collect();

        let videos = node
            .select(&self.video_sel)
            .filter_map(|el| el.value().attr("style"))
            .filter_map(|style| {
                self.style_url_re
                    .captures(style)
                    .map(|caps| caps[1].to_string())
            })
            .collect();

        Ok(Entry {
            id,
            username,
            time,
            text,
            hashtags,
            images,
            videos,
            retweets: self.counter_text(node, &self.retweet_count_sel),
            likes: self.counter_text(node, &self.like_count_sel),
        })
    }

    /// Humanized counter text, empty when the action block is absent.
    fn counter_text(&self, node: ElementRef<'_>, selector: &Selector) -> String {
        node.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| AppError::selector(raw, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(&TimelineSelectors::default()).unwrap()
    }

    fn tweet_fragment(id: &str, username: &str, text: &str) -> String {
        format!(
            r#"<li><div class="tweet" data-tweet-id="{id}" data-screen-name="{username}">
                 <p class="tweet-text">{text}</p>
                 <span class="_timestamp" data-time="1546300800"></span>
                 <div class="ProfileTweet-action--reply">
                   <span class="ProfileTweet-actionCountForPresentation">2</span>
                 </div>
                 <div class="ProfileTweet-action--retweet">
                   <span class="ProfileTweet-actionCountForPresentation">12.3K</span>
                 </div>
                 <div class="ProfileTweet-action--favorite">
                   <span class="ProfileTweet-actionCountForPresentation">1M</span>
                 </div>
               </div></li>"#
        )
    }

    #[test]
    fn test_parse_humanized_count() {
        assert_eq!(parse_humanized_count("12.3K"), 12_300);
        assert_eq!(parse_humanized_count("1M"), 1_000_000);
        assert_eq!(parse_humanized_count("2.5M"), 2_500_000);
        assert_eq!(parse_humanized_count("42"), 42);
        assert_eq!(parse_humanized_count("1,234"), 1_234);
        assert_eq!(parse_humanized_count(""), 0);
        assert_eq!(parse_humanized_count("  "), 0);
        assert_eq!(parse_humanized_count("n/a"), 0);
    }

    #[test]
    fn test_parse_humanized_count_truncates_exactly() {
        // float scaling would yield 3899 here
        assert_eq!(parse_humanized_count("3.9K"), 3_900);
        assert_eq!(parse_humanized_count("1.2345K"), 1_234);
        assert_eq!(parse_humanized_count("0.7K"), 700);
    }

    #[test]
    fn test_fold_hashtag() {
        assert_eq!(fold_hashtag("#Foo"), fold_hashtag("#foo"));
        assert_eq!(fold_hashtag("#Rust"), "rust");
        // idempotent
        assert_eq!(fold_hashtag(&fold_hashtag("#Rust")), "rust");
    }

    #[test]
    fn test_posts_empty_document() {
        let document = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        assert!(extractor().posts(&document).is_empty());
    }

    #[test]
    fn test_posts_in_document_order() {
        let html = format!(
            "<html><body><ol>{}{}</ol></body></html>",
            tweet_fragment("111", "alice", "first"),
            tweet_fragment("222", "bob", "second"),
        );
        let document = Html::parse_document(&html);
        let posts = extractor().posts(&document);
        let ids: Vec<&str> = posts.iter().map(|p| p.entry.id.as_str()).collect();
        assert_eq!(ids, ["111", "222"]);
    }

    #[test]
    fn test_post_fields() {
        let html = format!(
            "<html><body>{}</body></html>",
            tweet_fragment("111", "alice", "hello #Rust #rust <b>#Città</b> world"),
        );
        let document = Html::parse_document(&html);
        let posts = extractor().posts(&document);
        assert_eq!(posts.len(), 1);

        let post = &posts[0];
        assert_eq!(post.entry.username, "alice");
        assert_eq!(post.entry.time, 1_546_300_800);
        assert_eq!(post.entry.text, "hello #Rust #rust #Città world");
        // folded, deduplicated, first-seen order
        assert_eq!(post.entry.hashtags, ["rust", "città"]);
        assert_eq!(post.entry.retweets, "12.3K");
        assert_eq!(post.entry.likes, "1M");
        assert_eq!(post.comments.total, 2);
        assert!(post.comments.conversations.is_empty());
    }

    #[test]
    fn test_post_media() {
        let html = r##"<html><body>
            <div class="tweet" data-tweet-id="9" data-screen-name="carol">
              <p class="tweet-text">media</p>
              <div class="AdaptiveMedia-photoContainer"><img src="https://img/a.jpg"></div>
              <div class="AdaptiveMedia-photoContainer"><img src="https://img/b.jpg"></div>
              <div class="PlayableMedia-player"
                   style="background-image:url('https://vid/poster.jpg')"></div>
            </div></body></html>"##;
        let document = Html::parse_document(html);
        let posts = extractor().posts(&document);

        assert_eq!(posts[0].entry.images, ["https://img/a.jpg", "https://img/b.jpg"]);
        assert_eq!(posts[0].entry.videos, ["https://vid/poster.jpg"]);
    }

    #[test]
    fn test_missing_counters_parse_to_zero() {
        let html = r#"<html><body>
            <div class="tweet" data-tweet-id="5" data-screen-name="dave">
              <p class="tweet-text">bare</p>
            </div></body></html>"#;
        let document = Html::parse_document(html);
        let posts = extractor().posts(&document);

        assert_eq!(posts[0].entry.retweets, "");
        assert_eq!(posts[0].entry.likes, "");
        assert_eq!(posts[0].comments.total, 0);
        assert_eq!(posts[0].entry.time, 0);
    }

    #[test]
    fn test_fragment_without_username_is_skipped() {
        let html = r#"<html><body>
            <div class="tweet" data-tweet-id="1"><p class="tweet-text">orphan</p></div>
            <div class="tweet" data-tweet-id="2" data-screen-name="erin">
              <p class="tweet-text">kept</p>
            </div></body></html>"#;
        let document = Html::parse_document(html);
        let posts = extractor().posts(&document);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].entry.id, "2");
    }

    #[test]
    fn test_comments_keep_display_order_and_skip_malformed() {
        let html = r#"<html><body>
            <div class="tweet" data-tweet-id="c1" data-screen-name="bob">
              <p class="tweet-text">root reply</p>
            </div>
            <div class="tweet" data-tweet-id="c2">
              <p class="tweet-text">no author anchor</p>
            </div>
            <div class="tweet" data-tweet-id="c3" data-screen-name="dave">
              <p class="tweet-text">nested reply</p>
            </div></body></html>"#;
        let document = Html::parse_document(html);
        let extractor = extractor();

        let selector = Selector::parse("div.tweet").unwrap();
        let comments = extractor.comments(document.select(&selector).collect());

        let ids: Vec<&str> = comments.iter().map(|c| c.entry.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c3"]);
    }

    #[test]
    fn test_invalid_selector_fails_construction() {
        let mut selectors = TimelineSelectors::default();
        selectors.post_selector = "[[invalid".to_string();
        assert!(matches!(
            Extractor::new(&selectors),
            Err(AppError::Selector { .. })
        ));
    }
}
