//! The single article and its bounded comment list

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Comments kept per article; older ones are evicted
pub const MAX_COMMENTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: u32,
    pub title: String,
    pub content: String,
    /// Newest first
    pub comments: Vec<String>,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            id: 1,
            title: "Sports News".to_string(),
            content: "The Rockets beat the Thunder 114-80 in game 5 of their first-round \
                      series, but the bigger story was the clash between Dennis Schroder \
                      and PJ Tucker that got both players ejected. Houston now leads the \
                      series 3-2."
                .to_string(),
            comments: vec!["Comment 1".to_string(), "Comment 2".to_string()],
        }
    }
}

#[derive(Debug)]
pub struct ArticleStore {
    article: Mutex<Article>,
}

impl ArticleStore {
    pub fn new(mut article: Article) -> Self {
        article.comments.truncate(MAX_COMMENTS);
        Self {
            article: Mutex::new(article),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Article> {
        self.article.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a comment verbatim. Surrounding whitespace is trimmed and blank
    /// comments are dropped; returns whether anything was stored.
    pub fn post_comment(&self, text: &str) -> bool {
        let comment = text.trim();
        if comment.is_empty() {
            return false;
        }

        let mut article = self.lock();
        article.comments.insert(0, comment.to_string());
        article.comments.truncate(MAX_COMMENTS);
        debug!(count = article.comments.len(), "Comment stored");
        true
    }

    /// Snapshot of the article as it is now
    pub fn article(&self) -> Article {
        self.lock().clone()
    }
}

impl Default for ArticleStore {
    fn default() -> Self {
        Self::new(Article::default())
    }
}
