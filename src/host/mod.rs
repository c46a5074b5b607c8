//! Host collaborator interfaces
//!
//! The design tool owns the document model, the settings store, the toast UI
//! and the embedded browser used for sign-in. These traits define what the
//! plugin needs from the host, allowing a real host adapter to be injected
//! and tests to use mocks.

mod console;
mod settings;

pub use console::ConsoleHost;
pub use settings::{FileSettings, MemorySettings};

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Data kinds a supplier can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Image,
    Text,
}

impl DataKind {
    /// Host-facing uniform type identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Image => "public.image",
            DataKind::Text => "public.text",
        }
    }
}

/// Key/value settings storage owned by the host
///
/// Holds the session keys (`ACCESS_TOKEN`, `USER_ID`, `SCOPE_KEY`), the
/// transient random-selection id list and the analytics client id.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;

    fn remove(&self, key: &str) -> anyhow::Result<()>;

    /// String view of a setting, `None` for absent or non-string values
    fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

/// The host's data-supplier registry and index-addressed write-back channel
pub trait DataSink: Send + Sync {
    /// Announce a supplier entry in the host's data menu
    fn register_supplier(&self, kind: DataKind, title: &str, action: &str);

    /// Remove every entry registered by this plugin
    fn deregister_all(&self);

    fn supply_text(&self, key: &str, index: usize, text: &str);

    fn supply_image(&self, key: &str, index: usize, path: &Path);

    /// Tag a plain layer with the origin of its supplied image
    fn annotate(&self, index: usize, key: &str, value: &str) {
        let _ = (index, key, value);
    }
}

/// UI affordances and the embedded auth browser owned by the host
pub trait HostShell: Send + Sync {
    /// Short toast shown to the user
    fn message(&self, text: &str);

    /// Modal string input; `None` means the user cancelled
    fn prompt(&self, label: &str, default: &str) -> Option<String>;

    /// Present the embedded browser pointed at the authorize URL
    fn open_auth_surface(&self, url: &Url) -> anyhow::Result<()>;

    /// Tear the browser surface down after a successful capture
    fn close_auth_surface(&self);

    /// Bundled fallback image used when a download fails
    fn placeholder_image(&self) -> Option<PathBuf> {
        None
    }

    /// Host name + version, used as the analytics data source
    fn app_descriptor(&self) -> String {
        "unknown host".to_string()
    }
}

/// Bundle of host collaborators handed to the plugin at construction
#[derive(Clone)]
pub struct Host {
    pub settings: Arc<dyn SettingsStore>,
    pub sink: Arc<dyn DataSink>,
    pub shell: Arc<dyn HostShell>,
}

/// Whether a supply target is a plain layer or a symbol override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Layer,
    Override,
}

/// One addressed item in a supply callback
#[derive(Debug, Clone, Copy)]
pub struct SupplyTarget {
    pub index: usize,
    pub kind: TargetKind,
}

/// One host callback: the data key to write back to and the addressed items
#[derive(Debug, Clone)]
pub struct SupplyRequest {
    pub key: String,
    pub targets: Vec<SupplyTarget>,
}

impl SupplyRequest {
    /// Request addressing `count` plain layers, as most hosts issue
    pub fn layers(key: impl Into<String>, count: usize) -> Self {
        Self {
            key: key.into(),
            targets: (0..count)
                .map(|index| SupplyTarget {
                    index,
                    kind: TargetKind::Layer,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
