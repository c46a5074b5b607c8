//! VK REST API client
//!
//! Thin GET-per-method client: every call goes to `{base_url}{method}` with
//! the parameters, the access token and the API version in the query string,
//! and unwraps the `response`/`error` envelope. Calls run sequentially and
//! are not retried; callers decide what an error means for the user.

pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::Session;
use crate::config::ApiConfig;
pub use types::{ApiError, Envelope, FavePage, Group, GroupsById, ItemsPage, User, Video, VideoImage};

/// Profile fields requested alongside every listing
const PROFILE_FIELDS: &str = "photo_100,photo_200";

/// Errors surfaced by API calls
#[derive(Debug, Error)]
pub enum VkError {
    #[error("not signed in to VK")]
    NotAuthenticated,

    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("VK returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("{0}")]
    Other(String),
}

impl VkError {
    /// True when the stored token is no longer usable and the user has to
    /// sign in again: authorization failed (5), key invalidated (27, 28)
    pub fn needs_relogin(&self) -> bool {
        match self {
            VkError::NotAuthenticated => true,
            VkError::Api { code, .. } => matches!(code, 5 | 27 | 28),
            _ => false,
        }
    }

    /// True for VK's per-app request throttle (6)
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, VkError::Api { code: 6, .. })
    }
}

impl From<reqwest::Error> for VkError {
    fn from(err: reqwest::Error) -> Self {
        VkError::Network(err.to_string())
    }
}

pub type VkResult<T> = Result<T, VkError>;

/// Orderings of friends.get the suppliers use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendsOrder {
    /// Ranked by interaction, the listing default
    Hints,
    Random,
}

impl FriendsOrder {
    fn as_param(self) -> &'static str {
        match self {
            FriendsOrder::Hints => "hints",
            FriendsOrder::Random => "random",
        }
    }
}

/// The slice of the VK API the suppliers are built on
#[async_trait]
pub trait VkApi: Send + Sync {
    /// users.get; an empty id list means the signed-in user
    async fn users_get(&self, ids: &[String]) -> VkResult<Vec<User>>;

    async fn friends_get(&self, order: FriendsOrder, count: usize) -> VkResult<ItemsPage<User>>;

    async fn groups_get(&self, count: usize) -> VkResult<ItemsPage<Group>>;

    async fn groups_get_by_id(&self, ids: &[String]) -> VkResult<Vec<Group>>;

    /// video.get for `owner_id`'s videos; a leading `-` means a community
    async fn video_get(&self, owner_id: &str, count: usize) -> VkResult<ItemsPage<Video>>;

    async fn fave_get_pages(&self, count: usize) -> VkResult<ItemsPage<FavePage>>;

    /// stats.trackVisitor; registers the app visit, response is ignored
    async fn track_visitor(&self) -> VkResult<()>;
}

/// reqwest-backed client bound to one signed-in session
pub struct VkClient {
    http: reqwest::Client,
    base_url: String,
    version: String,
    session: Session,
}

impl VkClient {
    pub fn new(config: &ApiConfig, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            version: config.version.clone(),
            session,
        }
    }

    /// Reuse an existing HTTP client instead of building a fresh one
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}{}", self.base_url, method)
    }

    /// Call `method`, appending the access token and API version
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> VkResult<T> {
        let url = self.method_url(method);

        let mut query: Vec<(&str, &str)> = params
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        query.push(("access_token", &self.session.access_token));
        query.push(("v", &self.version));

        debug!(method, "calling VK API");
        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VkError::Http {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|err| VkError::Shape(format!("{method}: {err}")))?;
        if let Some(error) = envelope.error {
            warn!(method, code = error.error_code, "VK API returned an error");
            return Err(VkError::Api {
                code: error.error_code,
                message: error.error_msg,
            });
        }
        envelope
            .response
            .ok_or_else(|| VkError::Shape(format!("{method}: neither response nor error present")))
    }
}

#[async_trait]
impl VkApi for VkClient {
    async fn users_get(&self, ids: &[String]) -> VkResult<Vec<User>> {
        let mut params = vec![("fields", PROFILE_FIELDS.to_string())];
        if !ids.is_empty() {
            params.push(("user_ids", ids.join(",")));
        }
        self.call("users.get", &params).await
    }

    async fn friends_get(&self, order: FriendsOrder, count: usize) -> VkResult<ItemsPage<User>> {
        self.call(
            "friends.get",
            &[
                ("order", order.as_param().to_string()),
                ("count", count.to_string()),
                ("fields", PROFILE_FIELDS.to_string()),
            ],
        )
        .await
    }

    async fn groups_get(&self, count: usize) -> VkResult<ItemsPage<Group>> {
        self.call(
            "groups.get",
            &[
                ("extended", "1".to_string()),
                ("count", count.to_string()),
                ("fields", PROFILE_FIELDS.to_string()),
            ],
        )
        .await
    }

    async fn groups_get_by_id(&self, ids: &[String]) -> VkResult<Vec<Group>> {
        let raw: GroupsById = self
            .call(
                "groups.getById",
                &[
                    ("group_ids", ids.join(",")),
                    ("fields", PROFILE_FIELDS.to_string()),
                ],
            )
            .await?;
        Ok(raw.into_groups())
    }

    async fn video_get(&self, owner_id: &str, count: usize) -> VkResult<ItemsPage<Video>> {
        self.call(
            "video.get",
            &[
                ("owner_id", owner_id.to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    async fn fave_get_pages(&self, count: usize) -> VkResult<ItemsPage<FavePage>> {
        self.call(
            "fave.getPages",
            &[
                ("count", count.to_string()),
                ("fields", PROFILE_FIELDS.to_string()),
            ],
        )
        .await
    }

    async fn track_visitor(&self) -> VkResult<()> {
        let _: serde_json::Value = self.call("stats.trackVisitor", &[]).await?;
        Ok(())
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relogin_errors_are_the_token_invalidation_codes() {
        let auth_failed = VkError::Api {
            code: 5,
            message: "User authorization failed".into(),
        };
        assert!(auth_failed.needs_relogin());
        assert!(VkError::NotAuthenticated.needs_relogin());
        assert!(VkError::Api {
            code: 27,
            message: String::new()
        }
        .needs_relogin());
        assert!(VkError::Api {
            code: 28,
            message: String::new()
        }
        .needs_relogin());

        let throttled = VkError::Api {
            code: 6,
            message: "Too many requests".into(),
        };
        assert!(!throttled.needs_relogin());
        assert!(throttled.is_rate_limited());

        assert!(!VkError::Network("reset".into()).needs_relogin());
    }

    #[test]
    fn friends_order_maps_to_the_wire_param() {
        assert_eq!(FriendsOrder::Hints.as_param(), "hints");
        assert_eq!(FriendsOrder::Random.as_param(), "random");
    }

    #[test]
    fn method_url_joins_base_and_method() {
        let session = Session {
            access_token: "tok".into(),
            user_id: "1".into(),
        };
        let client = VkClient::new(&ApiConfig::default(), session);
        assert_eq!(
            client.method_url("users.get"),
            "https://api.vk.com/method/users.get"
        );
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let short = snippet("ok");
        assert_eq!(short, "ok");

        let long = snippet(&"x".repeat(500));
        assert!(long.len() < 500);
        assert!(long.ends_with("..."));
    }
}
