//! Searches the social API over HTTP.
//!
//! `GET {endpoint}/search/{all|users}/{keyword}` answers with a JSON array
//! mixing post objects and user objects. Posts carry their author embedded;
//! likes and comments arrive as arrays and are only counted.

use crate::error::SearchError;
use crate::search::{ArticleSummary, ResultItem, SearchSource, SearchType, UserSummary};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAuthor {
    full_name: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPost {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    likes: Vec<Value>,
    #[serde(default)]
    comments: Vec<Value>,
    author: RawAuthor,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(rename = "_id")]
    id: String,
    full_name: String,
}

// Posts are tried first: user objects never carry a title
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItem {
    Post(RawPost),
    User(RawUser),
}

impl From<RawItem> for ResultItem {
    fn from(raw: RawItem) -> Self {
        match raw {
            RawItem::User(user) => ResultItem::User(UserSummary {
                id: user.id,
                full_name: user.full_name,
            }),
            RawItem::Post(post) => ResultItem::Article(ArticleSummary {
                id: post.id,
                title: post.title,
                nickname: post.author.username.unwrap_or(post.author.full_name),
                posted_at: post.created_at,
                has_image: post.image.map_or(false, |image| !image.is_empty()),
                likes: post.likes.len() as u32,
                comments: post.comments.len() as u32,
            }),
        }
    }
}

/// Decode a search response body
pub fn parse_response(body: &str) -> Result<Vec<ResultItem>, SearchError> {
    let raw: Vec<RawItem> = serde_json::from_str(body)?;
    Ok(raw.into_iter().map(ResultItem::from).collect())
}

/// Build the request URL for `keyword`, encoding it as one path segment.
pub fn search_url(
    endpoint: &Url,
    keyword: &str,
    search_type: SearchType,
) -> Result<Url, SearchError> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["search", search_type.as_str(), keyword]);
    Ok(url)
}

/// `SearchSource` backed by the remote API
pub struct RemoteSource {
    endpoint: Url,
    client: Client,
}

impl RemoteSource {
    pub fn new(endpoint: &str) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder()
            .user_agent(concat!("feed_search/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { endpoint, client })
    }
}

impl SearchSource for RemoteSource {
    fn search(
        &self,
        keyword: &str,
        search_type: SearchType,
    ) -> Result<Vec<ResultItem>, SearchError> {
        let url = search_url(&self.endpoint, keyword, search_type)?;
        log::debug!("GET {}", url);

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        parse_response(&body)
    }
}
