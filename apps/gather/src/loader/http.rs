//! HTTP(S) loader.

use super::{AssetLoader, LoadError, verify_header};
use gather_core::{AssetDescriptor, primitives::SNIFF_LEN};

/// Fetches remote assets over HTTP.
///
/// The whole body is drained so the asset is fully transferred; the first
/// bytes are kept for the decode check. Cancellation by the per-asset timer
/// drops the in-flight request.
#[derive(Debug, Clone, Default)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetLoader for HttpLoader {
    async fn load(&self, asset: &AssetDescriptor) -> Result<(), LoadError> {
        let transport = |e: reqwest::Error| LoadError::Transport {
            locator: asset.locator.clone(),
            reason: e.to_string(),
        };

        let mut response = self
            .client
            .get(asset.locator.trim())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                locator: asset.locator.clone(),
                status: status.as_u16(),
            });
        }

        let mut header = Vec::with_capacity(SNIFF_LEN);
        let mut received = 0usize;
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            received = received.saturating_add(chunk.len());
            if header.len() < SNIFF_LEN {
                let take = (SNIFF_LEN - header.len()).min(chunk.len());
                header.extend_from_slice(&chunk[..take]);
            }
        }

        verify_header(asset, &header)?;
        tracing::debug!(locator = %asset.locator, bytes = received, "remote asset decoded");
        Ok(())
    }
}
