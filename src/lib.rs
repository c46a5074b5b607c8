//! vkdata: VK data supplier plugin core
//!
//! This library provides:
//! - OAuth implicit-flow sign-in against VK with session persistence
//! - A typed client for the VK REST methods the suppliers consume
//! - A catalog of data suppliers mapping API responses to layer values
//! - Image downloads into a disposable temp folder
//! - Fire-and-forget usage analytics (Google Analytics Measurement Protocol)
//!
//! The design tool itself stays behind the `host` traits: settings, toasts,
//! the embedded auth browser and the data-supplier registry are injected, so
//! the same core runs inside a host adapter or the bundled CLI.

pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod host;
pub mod images;
pub mod plugin;
pub mod suppliers;

pub use config::Config;
pub use plugin::Plugin;
