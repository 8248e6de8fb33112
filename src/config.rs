//! Runtime settings, read from the environment.
//!
//! | variable               | default         |
//! |------------------------|-----------------|
//! | `debounce_ms`          | 1000            |
//! | `history_limit`        | 10              |
//! | `cache_ttl_ms`         | 30000           |
//! | `search_empty_keyword` | false           |
//! | `search_type`          | `all`           |
//! | `history_namespace`    | `recent-result` |
//! | `search_endpoint`      | unset           |

use crate::cache::DEFAULT_NAMESPACE;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::search::SearchType;
use crate::utils::{get_env_bool, get_env_parsed, get_env_with_default};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet interval before a keyword is searched
    pub debounce: Duration,
    /// Recent searches kept
    pub history_limit: usize,
    /// How long a result stays reusable for the same keyword
    pub cache_ttl: Duration,
    /// Whether an empty keyword still runs a query
    pub search_empty_keyword: bool,
    pub search_type: SearchType,
    /// Storage key of the recent-search list
    pub history_namespace: String,
    /// Base URL of the remote API; the local catalog is used when unset
    pub search_endpoint: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            cache_ttl: DEFAULT_CACHE_TTL,
            search_empty_keyword: false,
            search_type: SearchType::All,
            history_namespace: DEFAULT_NAMESPACE.to_string(),
            search_endpoint: None,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let history_limit = match get_env_parsed("history_limit", defaults.history_limit) {
            0 => {
                log::warn!("history_limit must be at least 1, using {}", DEFAULT_HISTORY_LIMIT);
                DEFAULT_HISTORY_LIMIT
            }
            limit => limit,
        };

        let search_endpoint = std::env::var("search_endpoint")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            debounce: Duration::from_millis(get_env_parsed(
                "debounce_ms",
                defaults.debounce.as_millis() as u64,
            )),
            history_limit,
            cache_ttl: Duration::from_millis(get_env_parsed(
                "cache_ttl_ms",
                defaults.cache_ttl.as_millis() as u64,
            )),
            search_empty_keyword: get_env_bool("search_empty_keyword"),
            search_type: get_env_parsed("search_type", defaults.search_type),
            history_namespace: get_env_with_default("history_namespace", DEFAULT_NAMESPACE),
            search_endpoint,
        }
    }
}
