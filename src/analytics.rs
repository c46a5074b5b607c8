//! Usage beacons via the Google Analytics Measurement Protocol (v1)
//!
//! Hits are fire-and-forget: built synchronously, sent on a spawned task,
//! failures logged at debug and otherwise ignored. Nothing in the plugin
//! ever waits on analytics.

use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config::AnalyticsConfig;
use crate::host::SettingsStore;

/// Settings key the anonymous client id is persisted under
const UUID_KEY: &str = "google.analytics.uuid";

const COLLECT_URL: &str = "https://www.google-analytics.com/collect";
const DEBUG_COLLECT_URL: &str = "https://www.google-analytics.com/debug/collect";

/// Event sink the plugin reports usage to
pub trait Telemetry: Send + Sync {
    fn event(&self, category: &str, action: &str);
}

/// Sink that drops every event, used when analytics is off
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn event(&self, _category: &str, _action: &str) {}
}

/// What the hits report about the plugin itself
#[derive(Debug, Clone)]
pub struct AppTag {
    pub name: String,
    pub id: String,
    pub version: String,
}

impl Default for AppTag {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            id: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct GoogleAnalytics {
    http: reqwest::Client,
    endpoint: &'static str,
    tracking_id: String,
    data_source: String,
    client_id: String,
    app: AppTag,
}

impl GoogleAnalytics {
    pub fn new(
        tracking_id: String,
        debug: bool,
        settings: &dyn SettingsStore,
        data_source: String,
        app: AppTag,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint(debug),
            tracking_id,
            data_source,
            client_id: client_id(settings),
            app,
        }
    }

    /// Reuse an existing HTTP client instead of building a fresh one
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn payload(&self, category: &str, action: &str) -> Vec<(&'static str, String)> {
        vec![
            ("v", "1".to_string()),
            ("tid", self.tracking_id.clone()),
            ("ds", self.data_source.clone()),
            ("cid", self.client_id.clone()),
            ("t", "event".to_string()),
            ("an", self.app.name.clone()),
            ("aid", self.app.id.clone()),
            ("av", self.app.version.clone()),
            ("ec", category.to_string()),
            ("ea", action.to_string()),
            // Cache buster, fresh per hit
            ("z", Uuid::new_v4().to_string()),
        ]
    }
}

impl Telemetry for GoogleAnalytics {
    fn event(&self, category: &str, action: &str) {
        let request = self
            .http
            .get(self.endpoint)
            .query(&self.payload(category, action));
        let label = format!("{category}/{action}");
        tokio::spawn(async move {
            match request.send().await {
                Ok(response) => debug!(hit = %label, status = %response.status(), "analytics hit sent"),
                Err(err) => debug!(hit = %label, "analytics hit failed: {err}"),
            }
        });
    }
}

/// Anonymous client id, generated once and persisted in host settings
fn client_id(settings: &dyn SettingsStore) -> String {
    if let Some(existing) = settings.get_str(UUID_KEY) {
        return existing;
    }
    let fresh = Uuid::new_v4().to_string();
    if let Err(err) = settings.set(UUID_KEY, json!(fresh)) {
        debug!("could not persist analytics client id: {err}");
    }
    fresh
}

fn endpoint(debug: bool) -> &'static str {
    if debug {
        DEBUG_COLLECT_URL
    } else {
        COLLECT_URL
    }
}

/// Pick the sink for the current configuration, sharing the caller's HTTP
/// client when hits are enabled
pub fn create_telemetry(
    config: &AnalyticsConfig,
    settings: &dyn SettingsStore,
    data_source: String,
    http: reqwest::Client,
) -> Arc<dyn Telemetry> {
    if !config.enabled {
        return Arc::new(NoopTelemetry);
    }
    match &config.tracking_id {
        Some(tracking_id) => Arc::new(
            GoogleAnalytics::new(
                tracking_id.clone(),
                config.debug,
                settings,
                data_source,
                AppTag::default(),
            )
            .with_http_client(http),
        ),
        None => Arc::new(NoopTelemetry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemorySettings;

    fn ga(settings: &dyn SettingsStore) -> GoogleAnalytics {
        GoogleAnalytics::new(
            "UA-000000-1".to_string(),
            false,
            settings,
            "TestHost 1.0".to_string(),
            AppTag {
                name: "vkdata".into(),
                id: "vkdata".into(),
                version: "0.3.0".into(),
            },
        )
    }

    #[test]
    fn client_id_is_generated_once_and_reused() {
        let settings = MemorySettings::new();
        let first = ga(&settings);
        let stored = settings.get_str(UUID_KEY).unwrap();
        assert_eq!(first.client_id, stored);

        let second = ga(&settings);
        assert_eq!(second.client_id, stored);
    }

    #[test]
    fn payload_carries_the_protocol_fields() {
        let settings = MemorySettings::new();
        let sink = ga(&settings);
        let payload = sink.payload("supply", "friend_avatars");

        let get = |key: &str| {
            payload
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("v").as_deref(), Some("1"));
        assert_eq!(get("tid").as_deref(), Some("UA-000000-1"));
        assert_eq!(get("ds").as_deref(), Some("TestHost 1.0"));
        assert_eq!(get("t").as_deref(), Some("event"));
        assert_eq!(get("ec").as_deref(), Some("supply"));
        assert_eq!(get("ea").as_deref(), Some("friend_avatars"));
        assert_eq!(get("cid"), settings.get_str(UUID_KEY));
        assert!(get("z").is_some());
    }

    #[test]
    fn cache_buster_differs_between_hits() {
        let settings = MemorySettings::new();
        let sink = ga(&settings);
        let z = |payload: &[(&str, String)]| {
            payload
                .iter()
                .find(|(k, _)| *k == "z")
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        let first = z(&sink.payload("a", "b"));
        let second = z(&sink.payload("a", "b"));
        assert_ne!(first, second);
    }

    #[test]
    fn debug_flag_switches_the_endpoint() {
        assert_eq!(endpoint(false), COLLECT_URL);
        assert_eq!(endpoint(true), DEBUG_COLLECT_URL);
    }

    #[test]
    fn factory_falls_back_to_noop() {
        let settings = MemorySettings::new();

        let disabled = AnalyticsConfig {
            enabled: false,
            debug: false,
            tracking_id: Some("UA-000000-1".into()),
        };
        create_telemetry(&disabled, &settings, "h".into(), reqwest::Client::new()).event("a", "b");

        let unconfigured = AnalyticsConfig {
            enabled: true,
            debug: false,
            tracking_id: None,
        };
        create_telemetry(&unconfigured, &settings, "h".into(), reqwest::Client::new())
            .event("a", "b");

        // Neither sink touched the settings store
        assert!(settings.get(UUID_KEY).is_none());
    }
}
