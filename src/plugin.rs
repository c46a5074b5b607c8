//! Plugin lifecycle and supply dispatch
//!
//! `Plugin` ties the host collaborators, the API client, the image store and
//! telemetry together the way the host drives them: register the catalog on
//! startup, resolve and write back values per supplier callback, clean up on
//! shutdown. Every callback failure is caught here; the user only ever sees
//! a toast while the log carries the detail.

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::analytics::{create_telemetry, Telemetry};
use crate::api::{VkApi, VkClient, VkError, VkResult};
use crate::auth::{self, Capture, Session};
use crate::config::Config;
use crate::host::{Host, SupplyRequest, TargetKind};
use crate::images::ImageStore;
use crate::suppliers::{self, DataValue, ResolveCtx};

/// Layer-setting key recording where a supplied image came from
const PHOTO_SOURCE_KEY: &str = "vk.photo.id";

const GENERIC_FAILURE: &str = "Something went wrong";

pub struct Plugin {
    config: Config,
    host: Host,
    http: reqwest::Client,
    images: ImageStore,
    telemetry: Arc<dyn Telemetry>,
    api_override: Option<Arc<dyn VkApi>>,
}

impl Plugin {
    pub fn new(config: Config, host: Host) -> Self {
        let http = reqwest::Client::new();
        let images = ImageStore::new(&config.images).with_http_client(http.clone());
        let telemetry = create_telemetry(
            &config.analytics,
            host.settings.as_ref(),
            host.shell.app_descriptor(),
            http.clone(),
        );
        Self {
            config,
            host,
            http,
            images,
            telemetry,
            api_override: None,
        }
    }

    /// Swap the telemetry sink, mainly for tests
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Replace the live client, letting tests drive the dispatch
    pub fn with_api(mut self, api: Arc<dyn VkApi>) -> Self {
        self.api_override = Some(api);
        self
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn session(&self) -> Option<Session> {
        Session::load(self.host.settings.as_ref(), &self.config.app)
    }

    /// API handle for the signed-in user, even with an override in place a
    /// session is still required
    fn api_handle(&self) -> VkResult<(Arc<dyn VkApi>, Session)> {
        let session = self.session().ok_or(VkError::NotAuthenticated)?;
        let api: Arc<dyn VkApi> = match &self.api_override {
            Some(api) => api.clone(),
            None => Arc::new(
                VkClient::new(&self.config.api, session.clone())
                    .with_http_client(self.http.clone()),
            ),
        };
        Ok((api, session))
    }

    /// Host hook: plugin loaded
    pub fn on_startup(&self) {
        for supplier in suppliers::CATALOG {
            self.host
                .sink
                .register_supplier(supplier.kind, supplier.title, supplier.action);
        }
        info!(count = suppliers::CATALOG.len(), "registered supplier catalog");

        match self.api_handle() {
            Ok((api, _)) => {
                // Visit ping is best-effort, the host never waits on it
                tokio::spawn(async move {
                    if let Err(err) = api.track_visitor().await {
                        debug!("trackVisitor failed: {err}");
                    }
                });
                self.telemetry.event("plugin", "startup");
            }
            Err(_) => {
                if let Err(err) = self.begin_auth() {
                    warn!("could not open the sign-in surface: {err}");
                }
            }
        }
    }

    /// Host hook: plugin unloaded
    pub fn on_shutdown(&self) {
        self.host.sink.deregister_all();
        if let Err(err) = self.images.clear() {
            warn!("could not clear the image folder: {err}");
        }
    }

    /// Point the host's embedded browser at the authorize page
    pub fn begin_auth(&self) -> anyhow::Result<()> {
        let url = auth::authorize_url(&self.config.app, &self.config.api)?;
        self.host.shell.open_auth_surface(&url)
    }

    /// Host hook: the auth surface navigated somewhere
    ///
    /// Returns true once credentials were captured and stored; any other
    /// navigation leaves the surface open.
    pub fn on_auth_navigation(&self, url: &Url) -> anyhow::Result<bool> {
        let capture = match auth::capture_redirect(url) {
            Some(capture) => capture,
            None => return Ok(false),
        };
        self.complete_auth(&capture)?;
        Ok(true)
    }

    fn complete_auth(&self, capture: &Capture) -> anyhow::Result<()> {
        Session::store(self.host.settings.as_ref(), capture, &self.config.app.scope)?;
        self.host.shell.close_auth_surface();
        self.host.shell.message("Signed in to VK");
        info!(user_id = %capture.user_id, "authenticated");
        self.telemetry.event("auth", "success");
        Ok(())
    }

    /// Forget the session and immediately offer a fresh sign-in
    pub fn logout(&self) -> anyhow::Result<()> {
        Session::clear(self.host.settings.as_ref())?;
        self.telemetry.event("auth", "logout");
        self.begin_auth()
    }

    /// Host hook: one supplier callback
    pub async fn supply(&self, action: &str, request: &SupplyRequest) {
        if request.is_empty() {
            return;
        }
        self.telemetry.event("supply", action);

        if let Err(err) = self.try_supply(action, request).await {
            error!(action, "supply failed: {err}");
            self.host.shell.message(GENERIC_FAILURE);
            if err.needs_relogin() {
                if let Err(err) = Session::clear(self.host.settings.as_ref()) {
                    warn!("could not clear the stale session: {err}");
                }
                if let Err(err) = self.begin_auth() {
                    warn!("could not reopen the sign-in surface: {err}");
                }
            }
        }
    }

    async fn try_supply(&self, action: &str, request: &SupplyRequest) -> VkResult<()> {
        let (api, session) = self.api_handle()?;
        let ctx = ResolveCtx {
            api: api.as_ref(),
            settings: self.host.settings.as_ref(),
            shell: self.host.shell.as_ref(),
            user_id: &session.user_id,
            count: request.len(),
        };

        let values = match suppliers::resolve(action, &ctx).await? {
            Some(values) => values,
            // Cancelled prompt, nothing supplied
            None => return Ok(()),
        };
        if values.is_empty() {
            self.host.shell.message("VK returned nothing to supply");
            return Ok(());
        }

        // Shorter remote lists cycle over the addressed positions
        for (position, target) in request.targets.iter().enumerate() {
            match &values[position % values.len()] {
                DataValue::Text(text) => {
                    self.host.sink.supply_text(&request.key, target.index, text);
                }
                DataValue::Image { url } => {
                    let path = match self.images.download(url).await {
                        Ok(path) => path,
                        Err(err) => {
                            warn!(url, "image download failed: {err}");
                            match self.host.shell.placeholder_image() {
                                Some(placeholder) => placeholder,
                                None => continue,
                            }
                        }
                    };
                    self.host.sink.supply_image(&request.key, target.index, &path);
                    if target.kind == TargetKind::Layer {
                        self.host.sink.annotate(target.index, PHOTO_SOURCE_KEY, url);
                    }
                }
            }
        }
        Ok(())
    }
}
