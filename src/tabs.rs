//! Tab selection shared between sibling views.
//!
//! Provides:
//! - `TabBar<T>`, an explicit state object holding the tab list and which one
//!   is active; the header reads and writes it, the bodies only read it
//! - `SearchTab`, the tabs of the search screen.

use serde::Serialize;

/// Describes one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem<T> {
    pub id: T,
    pub title: String,
}

/// Ordered tabs with exactly one active
#[derive(Debug, Clone)]
pub struct TabBar<T> {
    items: Vec<TabItem<T>>,
    active: usize,
}

impl<T: Copy + PartialEq> TabBar<T> {
    /// Tabs in display order; the first is active. Returns `None` for an empty
    /// list.
    pub fn new(items: Vec<TabItem<T>>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self { items, active: 0 })
    }

    /// Like `new`, starting on `default_tab` when it is one of the items
    pub fn with_default(items: Vec<TabItem<T>>, default_tab: T) -> Option<Self> {
        let mut bar = Self::new(items)?;
        bar.select(default_tab);
        Some(bar)
    }

    pub fn items(&self) -> &[TabItem<T>] {
        &self.items
    }

    pub fn active(&self) -> T {
        self.items[self.active].id
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_active(&self, id: T) -> bool {
        self.active() == id
    }

    /// Activate `id`. Unknown ids leave the selection alone and return false.
    pub fn select(&mut self, id: T) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Activate by position
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.active = index;
            true
        } else {
            false
        }
    }
}

/// Tabs of the search screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTab {
    /// Articles, matched on title
    Title,
    /// Users, matched on nickname
    Nickname,
}

impl SearchTab {
    pub fn title(&self) -> &'static str {
        match self {
            SearchTab::Title => "Title",
            SearchTab::Nickname => "Nickname",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "title" | "article" | "articles" => Some(SearchTab::Title),
            "nickname" | "user" | "users" => Some(SearchTab::Nickname),
            _ => None,
        }
    }

    /// Tab bar of the search screen, starting on article titles
    pub fn bar() -> TabBar<SearchTab> {
        let items = [SearchTab::Title, SearchTab::Nickname]
            .into_iter()
            .map(|tab| TabItem {
                id: tab,
                title: tab.title().to_string(),
            })
            .collect();

        TabBar { items, active: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bar_is_rejected() {
        assert!(TabBar::<SearchTab>::new(Vec::new()).is_none());
    }

    #[test]
    fn search_bar_starts_on_titles() {
        let bar = SearchTab::bar();
        assert_eq!(bar.active(), SearchTab::Title);
        assert_eq!(bar.items().len(), 2);
    }

    #[test]
    fn select_switches_active_tab() {
        let mut bar = SearchTab::bar();
        assert!(bar.select(SearchTab::Nickname));
        assert!(bar.is_active(SearchTab::Nickname));
        assert_eq!(bar.active_index(), 1);

        assert!(!bar.select_index(7));
        assert_eq!(bar.active(), SearchTab::Nickname);
    }

    #[test]
    fn default_tab_applies_when_known() {
        let items = vec![
            TabItem {
                id: 1u8,
                title: "newest".to_string(),
            },
            TabItem {
                id: 2u8,
                title: "hottest".to_string(),
            },
            TabItem {
                id: 3u8,
                title: "subscribed".to_string(),
            },
        ];
        let bar = TabBar::with_default(items.clone(), 3).unwrap();
        assert_eq!(bar.active(), 3);

        let fallback = TabBar::with_default(items, 9).unwrap();
        assert_eq!(fallback.active(), 1);
    }

    #[test]
    fn tab_names_parse() {
        assert_eq!(SearchTab::parse("Users"), Some(SearchTab::Nickname));
        assert_eq!(SearchTab::parse("title"), Some(SearchTab::Title));
        assert_eq!(SearchTab::parse("likes"), None);
    }
}
