//! Core search‐result types and matching utilities.
//!
//! Defines:
//! - `ResultItem` with its `UserSummary` / `ArticleSummary` variants
//! - `SearchType` selecting which kinds of items a query returns
//! - `SearchSource`, the boundary every data source implements
//! - `matches` supporting AND (`&`) / OR (`|`) / substring
//! - `filter_items` to apply a query to names, titles and nicknames.

use crate::error::SearchError;
use crate::utils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Likes needed before an article is flagged as hot
pub const HIGHLY_LIKED_THRESHOLD: u32 = 15;

/// Longest title shown before truncation
pub const TITLE_MAX_LENGTH: usize = 20;

/// A user matched by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
}

/// An article matched by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub nickname: String,
    pub posted_at: DateTime<Utc>,
    #[serde(default)]
    pub has_image: bool,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: u32,
}

impl ArticleSummary {
    pub fn is_highly_liked(&self) -> bool {
        self.likes >= HIGHLY_LIKED_THRESHOLD
    }

    /// Title as shown in result lists
    pub fn display_title(&self) -> String {
        utils::truncate_chars(&self.title, TITLE_MAX_LENGTH)
    }
}

/// One entry of a search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultItem {
    User(UserSummary),
    Article(ArticleSummary),
}

impl ResultItem {
    pub fn as_user(&self) -> Option<&UserSummary> {
        match self {
            ResultItem::User(user) => Some(user),
            ResultItem::Article(_) => None,
        }
    }

    pub fn as_article(&self) -> Option<&ArticleSummary> {
        match self {
            ResultItem::Article(article) => Some(article),
            ResultItem::User(_) => None,
        }
    }
}

/// Which kinds of items a query should return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Users and articles
    #[default]
    All,
    /// Users only
    Users,
}

impl SearchType {
    /// Path segment used by the remote API
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::All => "all",
            SearchType::Users => "users",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SearchType::All),
            "users" => Ok(SearchType::Users),
            other => Err(format!("unknown search type '{}'", other)),
        }
    }
}

/// A place search queries can be answered from.
///
/// Implementations block; the worker runs them off the event loop.
pub trait SearchSource: Send + Sync {
    fn search(&self, keyword: &str, search_type: SearchType)
        -> Result<Vec<ResultItem>, SearchError>;
}

/// Matches a search query against text
/// Supports & (AND) and | (OR) operators
pub fn matches(query: &str, text: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let text_lower = text.to_lowercase();

    if query.contains('&') {
        // AND search
        query
            .split('&')
            .map(str::trim)
            .all(|term| text_lower.contains(&term.to_lowercase()))
    } else if query.contains('|') {
        // OR search
        query
            .split('|')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .any(|term| text_lower.contains(&term.to_lowercase()))
    } else {
        // Simple search
        text_lower.contains(&query.trim().to_lowercase())
    }
}

/// Whether `item` matches `query` on any of its searchable fields
pub fn item_matches(query: &str, item: &ResultItem) -> bool {
    match item {
        ResultItem::User(user) => matches(query, &user.full_name),
        ResultItem::Article(article) => {
            matches(query, &article.title) || matches(query, &article.nickname)
        }
    }
}

/// Filter items based on search criteria
pub fn filter_items(items: Vec<ResultItem>, query: &str) -> Vec<ResultItem> {
    if query.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| item_matches(query, item))
        .collect()
}
