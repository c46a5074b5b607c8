//! VK sign-in via the OAuth implicit flow
//!
//! VK hands the access token back in the URL fragment of a redirect to a
//! well-known blank page, so there is no code-exchange round trip: the
//! plugin points the host's embedded browser at the authorize URL, watches
//! navigation for the redirect and scrapes the fragment.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::config::{ApiConfig, AppConfig};
use crate::host::SettingsStore;

const AUTHORIZE_ENDPOINT: &str = "https://oauth.vk.com/authorize";

/// Path VK redirects to once the user has granted (or denied) access
const REDIRECT_PATH: &str = "/blank.html";

/// Settings keys for the persisted session
pub const ACCESS_TOKEN_KEY: &str = "ACCESS_TOKEN";
pub const USER_ID_KEY: &str = "USER_ID";
pub const SCOPE_KEY: &str = "SCOPE_KEY";

/// Build the authorize URL for the configured app
pub fn authorize_url(app: &AppConfig, api: &ApiConfig) -> Result<Url> {
    let raw = format!(
        "{}?client_id={}&display=page&redirect_uri={}&scope={}&response_type=token&v={}",
        AUTHORIZE_ENDPOINT,
        urlencoding::encode(&app.app_id),
        urlencoding::encode(&app.redirect_uri),
        urlencoding::encode(&app.scope),
        urlencoding::encode(&api.version),
    );
    Url::parse(&raw).context("failed to build authorize URL")
}

/// Credentials scraped from the redirect fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub access_token: String,
    pub user_id: String,
}

/// Inspect a navigation URL for the implicit-flow redirect
///
/// Only the exact `/blank.html` path counts as the redirect. Returns `None`
/// for unrelated navigation, for denial redirects (`#error=access_denied&...`)
/// and for fragments missing either field.
pub fn capture_redirect(url: &Url) -> Option<Capture> {
    if url.path() != REDIRECT_PATH {
        return None;
    }
    let fragment = url.fragment()?;

    let mut access_token = None;
    let mut user_id = None;
    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" => access_token = Some(value.into_owned()),
            "user_id" => user_id = Some(value.into_owned()),
            _ => {}
        }
    }

    Some(Capture {
        access_token: access_token?,
        user_id: user_id?,
    })
}

/// A signed-in user as persisted in host settings
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

impl Session {
    /// Load the stored session
    ///
    /// Returns `None` when signed out, and also when the configured scope no
    /// longer matches the one the token was granted under; asking for wider
    /// access only takes effect through a fresh sign-in.
    pub fn load(settings: &dyn SettingsStore, app: &AppConfig) -> Option<Self> {
        let access_token = settings.get_str(ACCESS_TOKEN_KEY)?;
        let user_id = settings.get_str(USER_ID_KEY)?;

        let stored_scope = settings.get_str(SCOPE_KEY).unwrap_or_default();
        if stored_scope != app.scope {
            debug!(
                stored = %stored_scope,
                configured = %app.scope,
                "stored token scope is stale, sign-in required"
            );
            return None;
        }

        Some(Self {
            access_token,
            user_id,
        })
    }

    /// Persist a captured session under the scope it was requested with
    pub fn store(settings: &dyn SettingsStore, capture: &Capture, scope: &str) -> Result<()> {
        settings
            .set(ACCESS_TOKEN_KEY, json!(capture.access_token))
            .context("failed to store access token")?;
        settings
            .set(USER_ID_KEY, json!(capture.user_id))
            .context("failed to store user id")?;
        settings
            .set(SCOPE_KEY, json!(scope))
            .context("failed to store scope")?;
        Ok(())
    }

    /// Forget the stored session
    pub fn clear(settings: &dyn SettingsStore) -> Result<()> {
        settings.remove(ACCESS_TOKEN_KEY)?;
        settings.remove(USER_ID_KEY)?;
        settings.remove(SCOPE_KEY)?;
        Ok(())
    }
}
