// src/render.rs
//! View model of the search screen.
//!
//! Projects a `SearchSession` and the tab bar into a serializable snapshot:
//! the rows of the active tab, the status line and, when it should be shown,
//! the recent-search footer. The binary prints one snapshot per state change.

use crate::cache::HistoryStorage;
use crate::query::QueryStatus;
use crate::search::{ArticleSummary, ResultItem, UserSummary};
use crate::session::{Phase, SearchSession};
use crate::tabs::{SearchTab, TabBar};
use crate::utils;
use crate::worker::QueryDispatcher;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;

/// One article line
#[derive(Debug, Serialize)]
pub struct ArticleRow {
    pub id: String,
    pub title: String,
    pub nickname: String,
    pub posted: String,
    pub has_image: bool,
    pub likes: u32,
    pub comments: u32,
    pub highly_liked: bool,
}

impl ArticleRow {
    fn new(article: &ArticleSummary, now: DateTime<Utc>) -> Self {
        Self {
            id: article.id.clone(),
            title: article.display_title(),
            nickname: article.nickname.clone(),
            posted: utils::time_delta(article.posted_at, now),
            has_image: article.has_image,
            likes: article.likes,
            comments: article.comments,
            highly_liked: article.is_highly_liked(),
        }
    }
}

/// One user line
#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
}

impl From<&UserSummary> for UserRow {
    fn from(user: &UserSummary) -> Self {
        Self {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    Article(ArticleRow),
    User(UserRow),
}

/// What the active tab shows
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TabBody {
    /// Nothing searched yet
    Empty,
    /// Placeholder rows while the query runs
    Skeleton,
    Rows { rows: Vec<Row> },
    Failed { message: String },
}

#[derive(Debug, Serialize)]
pub struct SearchView {
    pub keyword: String,
    pub phase: Phase,
    pub tab: SearchTab,
    pub body: TabBody,
    /// Present only when the footer is visible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent: Option<Vec<String>>,
}

/// Rows of `items` belonging to `tab`
pub fn rows_for_tab(items: &[ResultItem], tab: SearchTab, now: DateTime<Utc>) -> Vec<Row> {
    items
        .iter()
        .filter_map(|item| match (tab, item) {
            (SearchTab::Title, ResultItem::Article(article)) => {
                Some(Row::Article(ArticleRow::new(article, now)))
            }
            (SearchTab::Nickname, ResultItem::User(user)) => Some(Row::User(user.into())),
            _ => None,
        })
        .collect()
}

impl SearchView {
    pub fn build<D, S>(
        session: &SearchSession<D, S>,
        tabs: &TabBar<SearchTab>,
        now: DateTime<Utc>,
    ) -> Self
    where
        D: QueryDispatcher,
        S: HistoryStorage,
    {
        let result = session.result();
        let tab = tabs.active();

        let body = match result.status() {
            QueryStatus::Idle => TabBody::Empty,
            QueryStatus::Pending => TabBody::Skeleton,
            QueryStatus::Success => TabBody::Rows {
                rows: rows_for_tab(result.data().unwrap_or_default(), tab, now),
            },
            QueryStatus::Error => TabBody::Failed {
                message: result.error().unwrap_or("search failed").to_string(),
            },
        };

        let recent = session
            .shows_recent_history()
            .then(|| session.history().to_vec());

        Self {
            keyword: session.keyword().to_string(),
            phase: session.phase(),
            tab,
            body,
            recent,
        }
    }
}

/// Print a view as one JSON line
pub fn output_view(view: &SearchView) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(view)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::config::SearchConfig;
    use crate::query::{Completion, QueryTicket};
    use chrono::TimeZone;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Recorder(Vec<QueryTicket>);

    impl QueryDispatcher for Recorder {
        fn dispatch(&mut self, ticket: QueryTicket) {
            self.0.push(ticket);
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 9, 14, 12, 0, 0).unwrap()
    }

    fn mixed() -> Vec<ResultItem> {
        vec![
            ResultItem::User(UserSummary {
                id: "u1".to_string(),
                full_name: "Kim".to_string(),
            }),
            ResultItem::Article(ArticleSummary {
                id: "a1".to_string(),
                title: "A headline that keeps on going".to_string(),
                nickname: "@kim".to_string(),
                posted_at: now() - chrono::Duration::hours(2),
                has_image: true,
                likes: 20,
                comments: 1,
            }),
        ]
    }

    #[test]
    fn tabs_split_articles_and_users() {
        let items = mixed();

        let titles = rows_for_tab(&items, SearchTab::Title, now());
        assert_eq!(titles.len(), 1);
        match &titles[0] {
            Row::Article(row) => {
                assert_eq!(row.title, "A headline that keep...");
                assert_eq!(row.posted, "2 hours ago");
                assert!(row.highly_liked);
            }
            other => panic!("unexpected row {:?}", other),
        }

        let users = rows_for_tab(&items, SearchTab::Nickname, now());
        assert_eq!(users.len(), 1);
        assert!(matches!(&users[0], Row::User(row) if row.full_name == "Kim"));
    }

    #[test]
    fn view_follows_session_state() {
        let t0 = Instant::now();
        let mut session = SearchSession::new(
            &SearchConfig::default(),
            Recorder::default(),
            MemoryStorage::with_terms(["old"]),
        );
        let mut tabs = SearchTab::bar();

        let view = SearchView::build(&session, &tabs, now());
        assert!(matches!(view.body, TabBody::Empty));
        assert_eq!(view.recent, Some(vec!["old".to_string()]));

        session.set_keyword("kim", t0);
        session.tick(t0 + Duration::from_millis(1000));
        let view = SearchView::build(&session, &tabs, now());
        assert!(matches!(view.body, TabBody::Skeleton));
        assert_eq!(view.recent, None);

        let ticket = session.dispatcher().0[0].clone();
        session.settle(
            Completion {
                ticket,
                outcome: Ok(mixed()),
            },
            t0 + Duration::from_millis(1100),
        );
        tabs.select(SearchTab::Nickname);

        let view = SearchView::build(&session, &tabs, now());
        assert_eq!(view.tab, SearchTab::Nickname);
        assert!(matches!(&view.body, TabBody::Rows { rows } if rows.len() == 1));
        assert_eq!(
            view.recent,
            Some(vec!["kim".to_string(), "old".to_string()])
        );

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["phase"], "resolved");
        assert_eq!(json["body"]["state"], "rows");
        assert_eq!(json["body"]["rows"][0]["kind"], "user");
    }
}
