//! Searches a local JSON catalog of users and articles.
//!
//! Provides:
//! - `Catalog`, the on-disk document (`{"users": [...], "articles": [...]}`)
//! - `CatalogSource`, a `SearchSource` matching keywords with `item_matches`
//!   in parallel using rayon.

use crate::error::SearchError;
use crate::search::{
    item_matches, ArticleSummary, ResultItem, SearchSource, SearchType, UserSummary,
};
use rayon::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Everything a catalog file holds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub users: Vec<UserSummary>,
    #[serde(default)]
    pub articles: Vec<ArticleSummary>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, SearchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a catalog file
    pub fn load(path: &Path) -> Result<Self, SearchError> {
        log::trace!("Loading catalog from {}", path.display());
        let mut file = File::open(path)
            .map_err(|e| SearchError::Catalog(format!("{}: {}", path.display(), e)))?;
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)
            .map_err(|e| SearchError::Catalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&buffer)
    }
}

/// In-memory search over a `Catalog`
#[derive(Debug, Clone)]
pub struct CatalogSource {
    items: Vec<ResultItem>,
}

impl CatalogSource {
    /// Users come first, articles newest first after them.
    pub fn new(catalog: Catalog) -> Self {
        let Catalog {
            users,
            mut articles,
        } = catalog;
        articles.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));

        let items = users
            .into_iter()
            .map(ResultItem::User)
            .chain(articles.into_iter().map(ResultItem::Article))
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SearchSource for CatalogSource {
    fn search(
        &self,
        keyword: &str,
        search_type: SearchType,
    ) -> Result<Vec<ResultItem>, SearchError> {
        let results: Vec<ResultItem> = self
            .items
            .par_iter()
            .filter(|item| search_type == SearchType::All || item.as_user().is_some())
            .filter(|item| item_matches(keyword, item))
            .cloned()
            .collect();

        log::debug!("Catalog matched {} items for {:?}", results.len(), keyword);
        Ok(results)
    }
}
