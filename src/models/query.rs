// src/models/query.rs

//! Search query template and URL construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Timeline search parameters.
///
/// The template carries the pristine search term; [`SearchQuery::for_cycle`]
/// produces the per-cycle copy with the cursor merged in, so no pagination
/// cycle ever mutates the shared template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    params: BTreeMap<String, String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        let mut params = BTreeMap::new();
        params.insert("f".to_string(), "tweets".to_string());
        params.insert("src".to_string(), "typd".to_string());
        Self { params }
    }
}

impl SearchQuery {
    /// Template with the given search term (hashtag or free text).
    pub fn new(term: impl Into<String>) -> Self {
        let mut query = Self::default();
        query.set("q", term);
        query
    }

    /// Set or replace a single parameter.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Restrict results to one language (the `l` filter).
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.set("l", lang);
        self
    }

    /// The pristine search term, if any.
    pub fn term(&self) -> Option<&str> {
        self.params.get("q").map(String::as_str)
    }

    /// Copy of this template for one pagination cycle.
    ///
    /// With a cursor, the copy's `q` asks for items strictly older than
    /// the cursor id; the template itself is left untouched.
    pub fn for_cycle(&self, cursor: Option<&str>) -> SearchQuery {
        let mut cycle = self.clone();
        if let Some(max_id) = cursor {
            let term = self.term().unwrap_or_default();
            cycle.set("q", format!("{term} max_id:{max_id}"));
        }
        cycle
    }

    /// Render as a percent-encoded search URL against the base endpoint.
    pub fn to_url(&self, base: &str) -> Result<String> {
        let mut url = Url::parse(base)?;
        url.query_pairs_mut().clear().extend_pairs(&self.params);
        Ok(url.to_string())
    }
}
