//! # Configuration
//!
//! Manifest loading and timeout layering.
//!
//! Precedence for every timeout: CLI flag > manifest value > built-in default.
//!
//! ## Environment Variables
//!
//! - `GATHER_LOG_FORMAT`: `json` for machine-parseable logs (default: text)
//! - `GATHER_CORS_ORIGINS`: comma-separated allowed origins for the status API

use gather_core::{GatherError, Manifest, TimeoutOverrides, Timeouts};
use std::path::{Path, PathBuf};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "GATHER_LOG_FORMAT";

/// Environment variable listing allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "GATHER_CORS_ORIGINS";

/// Maximum manifest file size (1 MB).
const MAX_MANIFEST_SIZE: u64 = 1024 * 1024;

// =============================================================================
// MANIFEST FORMAT
// =============================================================================

/// On-disk manifest encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    /// Pick the format from the file extension; anything but `.json` is TOML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ManifestFormat::Json,
            _ => ManifestFormat::Toml,
        }
    }
}

/// Parse manifest text.
pub fn parse_manifest(text: &str, format: ManifestFormat) -> Result<Manifest, GatherError> {
    match format {
        ManifestFormat::Toml => toml::from_str(text)
            .map_err(|e| GatherError::ManifestError(format!("Invalid TOML manifest: {}", e))),
        ManifestFormat::Json => serde_json::from_str(text)
            .map_err(|e| GatherError::ManifestError(format!("Invalid JSON manifest: {}", e))),
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Everything a preload run needs, resolved from manifest and flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub manifest: Manifest,
    /// Directory relative file locators resolve against.
    pub base_dir: PathBuf,
    pub timeouts: Timeouts,
}

impl Settings {
    /// Load a manifest file and layer CLI overrides on top of it.
    pub fn load(path: &Path, cli: TimeoutOverrides) -> Result<Self, GatherError> {
        let manifest = load_manifest(path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self::from_manifest(manifest, base_dir, cli))
    }

    /// Resolve settings for an already parsed manifest.
    #[must_use]
    pub fn from_manifest(manifest: Manifest, base_dir: PathBuf, cli: TimeoutOverrides) -> Self {
        let timeouts = manifest.timeouts.overlay(cli).resolve();
        Self {
            manifest,
            base_dir,
            timeouts,
        }
    }
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest, GatherError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        GatherError::IoError(format!("Cannot read manifest '{}': {}", path.display(), e))
    })?;

    if !metadata.is_file() {
        return Err(GatherError::IoError(format!(
            "Manifest '{}' is not a regular file",
            path.display()
        )));
    }

    if metadata.len() > MAX_MANIFEST_SIZE {
        return Err(GatherError::ManifestError(format!(
            "Manifest size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_MANIFEST_SIZE
        )));
    }

    let text = std::fs::read_to_string(path).map_err(|e| {
        GatherError::IoError(format!("Cannot read manifest '{}': {}", path.display(), e))
    })?;

    parse_manifest(&text, ManifestFormat::from_path(path))
}
