//! Debounced search with recent-search history for a social news feed.
//!
//! Keystrokes are debounced, the settled keyword is searched against a
//! `SearchSource`, only the newest query's result is ever shown, and keywords
//! that found something are kept in a bounded recent-search list that
//! survives restarts.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod history;
pub mod query;
pub mod remote;
pub mod render;
pub mod search;
pub mod session;
pub mod tabs;
pub mod utils;
pub mod worker;

pub use config::SearchConfig;
pub use error::{SearchError, StorageError};
pub use search::{ArticleSummary, ResultItem, SearchSource, SearchType, UserSummary};
pub use session::{Phase, SearchSession};
