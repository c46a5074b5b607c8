//! Wire types for VK API responses
//!
//! Every method call comes back in an envelope holding either `response` or
//! `error`. Only the fields the suppliers actually read are modeled; serde
//! ignores the rest of each object.

use serde::Deserialize;

/// Envelope wrapping every method response
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: Option<T>,
    pub error: Option<ApiError>,
}

/// Error body returned in place of a response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: String,
}

/// Paged list shape shared by friends.get, groups.get, video.get and
/// fave.getPages
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsPage<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub items: Vec<T>,
}

/// A profile as returned by users.get and friends.get
#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub photo_100: Option<String>,
    #[serde(default)]
    pub photo_200: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Largest avatar the profile carries
    pub fn best_photo(&self) -> Option<&str> {
        self.photo_200.as_deref().or(self.photo_100.as_deref())
    }
}

/// A community as returned by groups.get and groups.getById
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Group {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo_100: Option<String>,
    #[serde(default)]
    pub photo_200: Option<String>,
}

impl Group {
    pub fn best_photo(&self) -> Option<&str> {
        self.photo_200.as_deref().or(self.photo_100.as_deref())
    }
}

/// groups.getById answers with a bare array on older API versions and a
/// `{"groups": [...]}` wrapper on newer ones; accept both
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GroupsById {
    Wrapped { groups: Vec<Group> },
    Bare(Vec<Group>),
}

impl GroupsById {
    pub fn into_groups(self) -> Vec<Group> {
        match self {
            GroupsById::Wrapped { groups } => groups,
            GroupsById::Bare(groups) => groups,
        }
    }
}

/// A video as returned by video.get
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Video {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub views: u64,
    /// Sized thumbnail list sent by newer API versions
    #[serde(default)]
    pub image: Vec<VideoImage>,
    #[serde(default)]
    pub photo_1280: Option<String>,
    #[serde(default)]
    pub photo_800: Option<String>,
    #[serde(default)]
    pub photo_640: Option<String>,
    #[serde(default)]
    pub photo_320: Option<String>,
    #[serde(default)]
    pub photo_130: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoImage {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Video {
    /// Widest cover available, preferring the sized `image` list over the
    /// legacy fixed-width fields
    pub fn cover_url(&self) -> Option<&str> {
        if let Some(widest) = self.image.iter().max_by_key(|img| img.width) {
            return Some(widest.url.as_str());
        }
        self.photo_1280
            .as_deref()
            .or(self.photo_800.as_deref())
            .or(self.photo_640.as_deref())
            .or(self.photo_320.as_deref())
            .or(self.photo_130.as_deref())
    }
}

/// A bookmarked page from fave.getPages, carrying either a user or a group
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavePage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub group: Option<Group>,
}

impl FavePage {
    pub fn title(&self) -> Option<String> {
        if let Some(user) = &self.user {
            return Some(user.full_name());
        }
        self.group.as_ref().map(|group| group.name.clone())
    }

    pub fn best_photo(&self) -> Option<&str> {
        if let Some(user) = &self.user {
            return user.best_photo();
        }
        self.group.as_ref().and_then(|group| group.best_photo())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn users_get_is_a_bare_array_in_an_envelope() {
        let body = json!({
            "response": [
                {"id": 1, "first_name": "Pavel", "last_name": "Durov", "photo_100": "https://x/100.jpg"}
            ]
        });
        let envelope: Envelope<Vec<User>> = serde_json::from_value(body).unwrap();
        let users = envelope.response.unwrap();
        assert_eq!(users[0].full_name(), "Pavel Durov");
        assert_eq!(users[0].best_photo(), Some("https://x/100.jpg"));
        assert!(envelope.error.is_none());
    }

    #[test]
    fn error_envelope_parses() {
        let body = json!({
            "error": {"error_code": 5, "error_msg": "User authorization failed", "request_params": []}
        });
        let envelope: Envelope<Vec<User>> = serde_json::from_value(body).unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.error_code, 5);
        assert_eq!(error.error_msg, "User authorization failed");
    }

    #[test]
    fn best_photo_prefers_the_larger_size() {
        let user: User = serde_json::from_value(json!({
            "id": 2, "photo_100": "small", "photo_200": "large"
        }))
        .unwrap();
        assert_eq!(user.best_photo(), Some("large"));
    }

    #[test]
    fn cover_prefers_the_widest_image_entry() {
        let video: Video = serde_json::from_value(json!({
            "id": 3,
            "title": "Clip",
            "image": [
                {"url": "w130", "width": 130, "height": 97},
                {"url": "w800", "width": 800, "height": 450},
                {"url": "w320", "width": 320, "height": 240}
            ],
            "photo_130": "legacy130"
        }))
        .unwrap();
        assert_eq!(video.cover_url(), Some("w800"));
    }

    #[test]
    fn cover_falls_back_through_the_legacy_fields() {
        let video: Video = serde_json::from_value(json!({
            "id": 4, "photo_320": "p320", "photo_130": "p130"
        }))
        .unwrap();
        assert_eq!(video.cover_url(), Some("p320"));

        let bare: Video = serde_json::from_value(json!({"id": 5})).unwrap();
        assert_eq!(bare.cover_url(), None);
    }

    #[test]
    fn groups_by_id_accepts_both_shapes() {
        let bare: GroupsById =
            serde_json::from_value(json!([{"id": 1, "name": "apiclub"}])).unwrap();
        assert_eq!(bare.into_groups()[0].name, "apiclub");

        let wrapped: GroupsById =
            serde_json::from_value(json!({"groups": [{"id": 2, "name": "team"}]})).unwrap();
        assert_eq!(wrapped.into_groups()[0].name, "team");
    }

    #[test]
    fn fave_page_title_covers_users_and_groups() {
        let page: FavePage = serde_json::from_value(json!({
            "type": "user",
            "user": {"id": 1, "first_name": "Anna", "last_name": "K"}
        }))
        .unwrap();
        assert_eq!(page.title().as_deref(), Some("Anna K"));

        let community: FavePage = serde_json::from_value(json!({
            "type": "group",
            "group": {"id": 2, "name": "Design", "photo_200": "g200"}
        }))
        .unwrap();
        assert_eq!(community.title().as_deref(), Some("Design"));
        assert_eq!(community.best_photo(), Some("g200"));

        let empty = FavePage::default();
        assert!(empty.title().is_none());
    }
}
