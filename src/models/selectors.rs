// src/models/selectors.rs

//! CSS selectors for scraping a rendered timeline.

use serde::{Deserialize, Serialize};

/// CSS selectors and attribute names for timeline markup.
///
/// Defaults target the legacy Twitter stream markup; overriding them in
/// the config file lets the extractor follow markup changes without a
/// rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSelectors {
    /// Selector for each post-level node on a timeline or thread page
    pub post_selector: String,

    /// Attribute carrying the post identifier
    #[serde(default = "default_id_attr")]
    pub id_attr: String,

    /// Attribute carrying the author handle
    #[serde(default = "default_username_attr")]
    pub username_attr: String,

    /// Selector for the text body within a post node
    pub text_selector: String,

    /// Selector for the timestamp element within a post node
    pub timestamp_selector: String,

    /// Attribute carrying the epoch timestamp
    #[serde(default = "default_timestamp_attr")]
    pub timestamp_attr: String,

    /// Selector for image elements within a post node
    pub image_selector: String,

    /// Attribute carrying the image reference (usually "src")
    #[serde(default = "default_image_attr")]
    pub image_attr: String,

    /// Selector for video player containers within a post node
    pub video_selector: String,

    /// Selector for the humanized reply counter
    pub reply_count_selector: String,

    /// Selector for the humanized retweet counter
    pub retweet_count_selector: String,

    /// Selector for the humanized like counter
    pub like_count_selector: String,

    /// Selector for one conversation group on a thread page
    pub conversation_selector: String,

    /// Selector for comment nodes within a conversation group
    pub comment_selector: String,

    /// Selector for "show more replies" controls on a thread page
    pub more_replies_selector: String,

    /// Sentinel node present while the thread still loads more items
    pub more_items_selector: String,
}

fn default_id_attr() -> String {
    "data-tweet-id".to_string()
}

fn default_username_attr() -> String {
    "data-screen-name".to_string()
}

fn default_timestamp_attr() -> String {
    "data-time".to_string()
}

fn default_image_attr() -> String {
    "src".to_string()
}

impl Default for TimelineSelectors {
    fn default() -> Self {
        Self {
            post_selector: "div.tweet[data-tweet-id]".to_string(),
            id_attr: default_id_attr(),
            username_attr: default_username_attr(),
            text_selector: "p.tweet-text".to_string(),
            timestamp_selector: "span._timestamp".to_string(),
            timestamp_attr: default_timestamp_attr(),
            image_selector: ".AdaptiveMedia-photoContainer img".to_string(),
            image_attr: default_image_attr(),
            video_selector: ".PlayableMedia-player".to_string(),
            reply_count_selector:
                ".ProfileTweet-action--reply .ProfileTweet-actionCountForPresentation".to_string(),
            retweet_count_selector:
                ".ProfileTweet-action--retweet .ProfileTweet-actionCountForPresentation".to_string(),
            like_count_selector:
                ".ProfileTweet-action--favorite .ProfileTweet-actionCountForPresentation"
                    .to_string(),
            conversation_selector: "li.ThreadedConversation, li.ThreadedConversation--loneTweet"
                .to_string(),
            comment_selector: "div.tweet[data-tweet-id]".to_string(),
            more_replies_selector: "a.ThreadedConversation-moreRepliesLink".to_string(),
            more_items_selector: ".timeline-end.has-more-items .stream-end".to_string(),
        }
    }
}
