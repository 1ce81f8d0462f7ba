//! Post and comment data structures.

use serde::{Deserialize, Serialize};

/// Build the canonical permalink for a single item's thread page.
pub fn thread_url(base: &str, username: &str, id: &str) -> String {
    format!("{}/{}/status/{}", base.trim_end_matches('/'), username, id)
}

/// Fields shared by posts and comments.
///
/// Engagement counters keep the humanized strings exactly as rendered
/// ("12.3K"); use [`crate::services::extract::parse_humanized_count`] to
/// read them as integers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Entry {
    /// Platform-assigned identifier, stable across pages
    pub id: String,

    /// Author handle
    pub username: String,

    /// Publication time, epoch seconds (0 when the page carried none)
    #[serde(default)]
    pub time: i64,

    /// Text body
    #[serde(default)]
    pub text: String,

    /// Hashtags, lowercase, without the leading '#', first-seen order
    #[serde(default)]
    pub hashtags: Vec<String>,

    /// Image references in display order
    #[serde(default, rename = "image")]
    pub images: Vec<String>,

    /// Video references in display order
    #[serde(default, rename = "video")]
    pub videos: Vec<String>,

    /// Raw humanized retweet counter
    #[serde(default)]
    pub retweets: String,

    /// Raw humanized like counter
    #[serde(default)]
    pub likes: String,
}

/// A timeline post with its comment threads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(flatten)]
    pub entry: Entry,

    /// Comment summary plus the conversations attached so far
    pub comments: CommentThreads,
}

/// Comment-count summary and the conversations collected for a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CommentThreads {
    /// Total comment count as rendered on the timeline entry
    pub total: u64,

    /// Conversations attached by the thread sub-cycle, in display order
    #[serde(default)]
    pub conversations: Vec<Vec<Comment>>,
}

/// A single comment. Owned exclusively by its parent post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    #[serde(flatten)]
    pub entry: Entry,
}

impl Post {
    /// Permalink of this post's conversation thread page.
    pub fn thread_url(&self, base: &str) -> String {
        thread_url(base, &self.entry.username, &self.entry.id)
    }

    /// Append one conversation. No validation that the conversation
    /// semantically belongs to this post; that is the caller's job.
    pub fn attach_conversation(&mut self, conversation: Vec<Comment>) {
        self.comments.conversations.push(conversation);
    }

    /// The post entry followed by every comment entry in conversation order.
    pub fn iter_entries(&self) -> impl Iterator<Item = &Entry> {
        std::iter::once(&self.entry).chain(
            self.comments
                .conversations
                .iter()
                .flat_map(|conversation| conversation.iter().map(|c| &c.entry)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            entry: Entry {
                id: "998877".to_string(),
                username: "alice".to_string(),
                time: 1_546_300_800,
                text: "good morning #Rust".to_string(),
                hashtags: vec!["rust".to_string()],
                images: vec!["https://pbs.example.com/a.jpg".to_string()],
                videos: vec![],
                retweets: "12.3K".to_string(),
                likes: "1M".to_string(),
            },
            comments: CommentThreads {
                total: 2,
                conversations: vec![],
            },
        }
    }

    fn sample_comment(id: &str) -> Comment {
        Comment {
            entry: Entry {
                id: id.to_string(),
                username: "bob".to_string(),
                ..Entry::default()
            },
        }
    }

    #[test]
    fn test_thread_url() {
        let post = sample_post();
        assert_eq!(
            post.thread_url("https://twitter.com"),
            "https://twitter.com/alice/status/998877"
        );
        // trailing slash on the base must not double up
        assert_eq!(
            thread_url("https://twitter.com/", "alice", "998877"),
            "https://twitter.com/alice/status/998877"
        );
    }

    #[test]
    fn test_attach_conversation_appends() {
        let mut post = sample_post();
        post.attach_conversation(vec![sample_comment("1")]);
        post.attach_conversation(vec![sample_comment("2"), sample_comment("3")]);
        assert_eq!(post.comments.conversations.len(), 2);
        assert_eq!(post.comments.conversations[1].len(), 2);
    }

    #[test]
    fn test_iter_entries_order() {
        let mut post = sample_post();
        post.attach_conversation(vec![sample_comment("c1"), sample_comment("c2")]);
        post.attach_conversation(vec![sample_comment("c3")]);
        let ids: Vec<&str> = post.iter_entries().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["998877", "c1", "c2", "c3"]);
    }

    #[test]
    fn test_json_round_trip() {
        let mut post = sample_post();
        post.attach_conversation(vec![sample_comment("c1")]);

        let line = serde_json::to_string(&post).unwrap();
        let back: Post = serde_json::from_str(&line).unwrap();

        assert_eq!(back, post);
        assert_eq!(back.entry.hashtags, vec!["rust"]);
        assert_eq!(back.entry.images.len(), 1);
        assert_eq!(back.entry.retweets, "12.3K");
    }

    #[test]
    fn test_json_wire_field_names() {
        let post = sample_post();
        let value = serde_json::to_value(&post).unwrap();

        // flat mapping: entry fields at the top level, media under the
        // singular keys used by the line-delimited archive format
        assert_eq!(value["id"], "998877");
        assert_eq!(value["username"], "alice");
        assert!(value["image"].is_array());
        assert!(value["video"].is_array());
        assert_eq!(value["comments"]["total"], 2);
    }
}
