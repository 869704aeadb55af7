//! # Asset Loaders
//!
//! The per-kind "native asset primitives" the coordinator watches.
//!
//! A loader fetches one asset and checks that its leading bytes decode as
//! the descriptor's kind. It reports exactly one result; the coordinator
//! races that result against the per-asset timer.
//!
//! - `FileLoader` - local files, relative to a base directory
//! - `HttpLoader` - `http://` and `https://` locators via reqwest
//! - `RoutingLoader` - picks one of the above by locator scheme

mod fs;
mod http;

pub use fs::FileLoader;
pub use http::HttpLoader;

use gather_core::{AssetDescriptor, AssetKind, primitives::SNIFF_LEN, sniff};
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Why one asset failed to load.
///
/// Load errors never leave the coordinator: they settle the asset as a
/// failure and are logged.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading a local file failed.
    #[error("cannot read '{locator}': {reason}")]
    Io { locator: String, reason: String },

    /// The server answered with a non-success status.
    #[error("'{locator}' returned HTTP {status}")]
    Status { locator: String, status: u16 },

    /// The request could not be completed.
    #[error("request for '{locator}' failed: {reason}")]
    Transport { locator: String, reason: String },

    /// The bytes do not decode as the expected kind.
    #[error("'{locator}' is not a decodable {expected} asset")]
    Undecodable {
        locator: String,
        expected: AssetKind,
    },
}

// =============================================================================
// LOADER TRAIT
// =============================================================================

/// A source of asset load signals.
///
/// Implementations must be cheap to share: the coordinator holds one loader
/// behind an `Arc` and calls it from one task per asset.
pub trait AssetLoader: Send + Sync {
    /// Fetch and decode one asset.
    fn load(&self, asset: &AssetDescriptor) -> impl Future<Output = Result<(), LoadError>> + Send;
}

/// Verify sniffed header bytes against the descriptor's kind.
pub(crate) fn verify_header(asset: &AssetDescriptor, header: &[u8]) -> Result<(), LoadError> {
    let header = &header[..header.len().min(SNIFF_LEN)];
    sniff::verify(asset.kind, header)
        .map(|format| {
            tracing::trace!(locator = %asset.locator, ?format, "header verified");
        })
        .map_err(|_| LoadError::Undecodable {
            locator: asset.locator.clone(),
            expected: asset.kind,
        })
}

// =============================================================================
// ROUTING LOADER
// =============================================================================

/// Dispatches by locator scheme: HTTP(S) to [`HttpLoader`], everything else
/// to [`FileLoader`].
#[derive(Debug, Clone)]
pub struct RoutingLoader {
    files: FileLoader,
    http: HttpLoader,
}

impl RoutingLoader {
    /// Create a loader resolving relative file locators against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            files: FileLoader::new(base_dir),
            http: HttpLoader::new(),
        }
    }
}

/// True for locators fetched over HTTP.
pub fn is_remote(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl AssetLoader for RoutingLoader {
    async fn load(&self, asset: &AssetDescriptor) -> Result<(), LoadError> {
        if is_remote(&asset.locator) {
            self.http.load(asset).await
        } else {
            self.files.load(asset).await
        }
    }
}
