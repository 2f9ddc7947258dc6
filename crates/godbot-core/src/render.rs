use async_trait::async_trait;

use crate::Result;

/// Code-to-image rendering port (carbonara adapter).
#[async_trait]
pub trait RenderPort: Send + Sync {
    /// Render source code to an image; returns the encoded bytes.
    async fn render_code(&self, code: &str) -> Result<Vec<u8>>;
}
