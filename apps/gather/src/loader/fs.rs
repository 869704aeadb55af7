//! Local file loader.

use super::{AssetLoader, LoadError, verify_header};
use gather_core::{AssetDescriptor, primitives::SNIFF_LEN};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Loads assets from the local filesystem.
///
/// Relative locators resolve against the base directory; `file://` prefixes
/// are stripped. Only the header is read: decoding a file means its leading
/// bytes match a container of the expected kind.
#[derive(Debug, Clone)]
pub struct FileLoader {
    base_dir: PathBuf,
}

impl FileLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve a locator to a filesystem path.
    #[must_use]
    pub fn resolve(&self, locator: &str) -> PathBuf {
        let trimmed = locator.trim();
        let stripped = trimmed.strip_prefix("file://").unwrap_or(trimmed);
        // Query and fragment never name part of a local file.
        let path = stripped
            .split(['?', '#'])
            .next()
            .unwrap_or(stripped);
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    async fn read_header(&self, asset: &AssetDescriptor) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(&asset.locator);
        let io_error = |e: std::io::Error| LoadError::Io {
            locator: asset.locator.clone(),
            reason: e.to_string(),
        };

        let mut file = tokio::fs::File::open(&path).await.map_err(io_error)?;
        let mut header = vec![0u8; SNIFF_LEN];
        let mut filled = 0;

        while filled < SNIFF_LEN {
            let read = file.read(&mut header[filled..]).await.map_err(io_error)?;
            if read == 0 {
                break;
            }
            filled += read;
        }

        header.truncate(filled);
        Ok(header)
    }
}

impl AssetLoader for FileLoader {
    async fn load(&self, asset: &AssetDescriptor) -> Result<(), LoadError> {
        let header = self.read_header(asset).await?;
        verify_header(asset, &header)?;
        tracing::debug!(locator = %asset.locator, bytes = header.len(), "file asset decoded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute() {
        let loader = FileLoader::new("/srv/site");

        assert_eq!(loader.resolve("img/a.png"), PathBuf::from("/srv/site/img/a.png"));
        assert_eq!(loader.resolve("/abs/b.mp3"), PathBuf::from("/abs/b.mp3"));
        assert_eq!(loader.resolve("file:///abs/c.mp4"), PathBuf::from("/abs/c.mp4"));
        assert_eq!(
            loader.resolve("clip.webm?v=2#t=3"),
            PathBuf::from("/srv/site/clip.webm")
        );
    }
}
