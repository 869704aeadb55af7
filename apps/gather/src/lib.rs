//! # gather
//!
//! The Gather runtime - THE BINARY's library half.
//!
//! - [`coordinator`] watches one batch of assets and signals readiness once
//! - [`loader`] fetches and decodes assets (local files, HTTP)
//! - [`config`] loads manifests and layers timeout overrides
//! - [`api`] serves preload status over HTTP
//!
//! ```text
//!  manifest ──► config::Settings ──► Coordinator::start(locators, loader, timeouts)
//!                                          │
//!                          progress ◄──────┤ watch::Receiver<Status>
//!                          on_ready ◄──────┘ ReadyListener (once)
//! ```

pub mod api;
pub mod config;
pub mod coordinator;
pub mod loader;

pub use coordinator::{AssetView, Coordinator, ReadyListener, ReadyReport, Settler, Status};
pub use loader::{AssetLoader, FileLoader, HttpLoader, LoadError, RoutingLoader};
