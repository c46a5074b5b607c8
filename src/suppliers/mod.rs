//! The supplier catalog and its resolution dispatch
//!
//! Each supplier resolves one remote listing into per-position values: plain
//! strings for text suppliers, source URLs for image suppliers (the plugin
//! engine downloads those before handing paths to the host). Suppliers never
//! talk to the sink themselves.

pub mod faves;
pub mod friends;
pub mod groups;
pub mod users;
pub mod videos;

use crate::api::{VkApi, VkResult};
use crate::host::{DataKind, HostShell, SettingsStore};

/// Transient settings key coordinating the random friend pair
pub const RANDOM_ID_KEY: &str = "RandomID";

/// One value resolved for one position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    Text(String),
    /// Remote image to download before supplying
    Image { url: String },
}

/// Catalog entry registered with the host's data menu
#[derive(Debug, Clone, Copy)]
pub struct Supplier {
    pub action: &'static str,
    pub title: &'static str,
    pub kind: DataKind,
}

/// Every supplier the plugin registers, in menu order
pub static CATALOG: &[Supplier] = &[
    Supplier {
        action: users::MY_AVATAR,
        title: "My Avatar",
        kind: DataKind::Image,
    },
    Supplier {
        action: users::AVATARS_BY_ID,
        title: "Avatars by ID",
        kind: DataKind::Image,
    },
    Supplier {
        action: friends::FRIEND_AVATARS,
        title: "Friends' Avatars",
        kind: DataKind::Image,
    },
    Supplier {
        action: friends::RANDOM_FRIEND_AVATARS,
        title: "Random Friends' Avatars",
        kind: DataKind::Image,
    },
    Supplier {
        action: groups::GROUP_AVATARS,
        title: "Groups' Avatars",
        kind: DataKind::Image,
    },
    Supplier {
        action: groups::GROUP_AVATARS_BY_ID,
        title: "Groups' Avatars by ID",
        kind: DataKind::Image,
    },
    Supplier {
        action: faves::FAVE_AVATARS,
        title: "Faves' Avatars",
        kind: DataKind::Image,
    },
    Supplier {
        action: videos::VIDEO_COVERS,
        title: "Video Covers",
        kind: DataKind::Image,
    },
    Supplier {
        action: users::MY_NAME,
        title: "My Name",
        kind: DataKind::Text,
    },
    Supplier {
        action: friends::FRIEND_FIRST_NAMES,
        title: "Friends' First Names",
        kind: DataKind::Text,
    },
    Supplier {
        action: friends::FRIEND_FULL_NAMES,
        title: "Friends' Full Names",
        kind: DataKind::Text,
    },
    Supplier {
        action: friends::RANDOM_FRIEND_NAMES,
        title: "Random Friends' Names",
        kind: DataKind::Text,
    },
    Supplier {
        action: groups::GROUP_NAMES,
        title: "Groups' Names",
        kind: DataKind::Text,
    },
    Supplier {
        action: groups::GROUP_NAMES_BY_ID,
        title: "Groups' Names by ID",
        kind: DataKind::Text,
    },
    Supplier {
        action: faves::FAVE_TITLES,
        title: "Faves' Titles",
        kind: DataKind::Text,
    },
    Supplier {
        action: videos::VIDEO_TITLES,
        title: "Video Titles",
        kind: DataKind::Text,
    },
    Supplier {
        action: videos::VIDEO_VIEWS,
        title: "Video Views",
        kind: DataKind::Text,
    },
];

pub fn find(action: &str) -> Option<&'static Supplier> {
    CATALOG.iter().find(|supplier| supplier.action == action)
}

/// Everything a supplier draws on while resolving
pub struct ResolveCtx<'a> {
    pub api: &'a dyn VkApi,
    pub settings: &'a dyn SettingsStore,
    pub shell: &'a dyn HostShell,
    /// Signed-in user id, the default for prompted ids
    pub user_id: &'a str,
    /// How many positions the host addressed
    pub count: usize,
}

impl ResolveCtx<'_> {
    /// Ask for an id list, defaulting to the signed-in user
    ///
    /// Input is trimmed and lowercased, and the first space becomes `-` so
    /// "club 123" shorthand turns into the negative community owner id.
    /// `None` means the user cancelled.
    fn prompt_ids(&self, label: &str) -> Option<String> {
        let raw = self.shell.prompt(label, self.user_id)?;
        Some(normalize_ids(&raw))
    }

    fn prompt_id_list(&self, label: &str) -> Option<Vec<String>> {
        let raw = self.prompt_ids(label)?;
        Some(
            raw.split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        )
    }
}

fn normalize_ids(raw: &str) -> String {
    raw.trim().to_lowercase().replacen(' ', "-", 1)
}

/// Resolve the values for `action`
///
/// `Ok(None)` means a prompt was cancelled and the supply is silently
/// dropped; an unknown action is an error.
pub async fn resolve(action: &str, ctx: &ResolveCtx<'_>) -> VkResult<Option<Vec<DataValue>>> {
    match action {
        users::MY_AVATAR => users::my_avatar(ctx).await.map(Some),
        users::AVATARS_BY_ID => users::avatars_by_id(ctx).await,
        users::MY_NAME => users::my_name(ctx).await.map(Some),
        friends::FRIEND_AVATARS => friends::avatars(ctx).await.map(Some),
        friends::FRIEND_FIRST_NAMES => friends::first_names(ctx).await.map(Some),
        friends::FRIEND_FULL_NAMES => friends::full_names(ctx).await.map(Some),
        friends::RANDOM_FRIEND_AVATARS => friends::random_avatars(ctx).await.map(Some),
        friends::RANDOM_FRIEND_NAMES => friends::random_names(ctx).await.map(Some),
        groups::GROUP_AVATARS => groups::avatars(ctx).await.map(Some),
        groups::GROUP_NAMES => groups::names(ctx).await.map(Some),
        groups::GROUP_AVATARS_BY_ID => groups::avatars_by_id(ctx).await,
        groups::GROUP_NAMES_BY_ID => groups::names_by_id(ctx).await,
        faves::FAVE_AVATARS => faves::avatars(ctx).await.map(Some),
        faves::FAVE_TITLES => faves::titles(ctx).await.map(Some),
        videos::VIDEO_COVERS => videos::covers(ctx).await,
        videos::VIDEO_TITLES => videos::titles(ctx).await,
        videos::VIDEO_VIEWS => videos::views(ctx).await,
        other => Err(crate::api::VkError::Other(format!(
            "unknown supplier action: {other}"
        ))),
    }
}
