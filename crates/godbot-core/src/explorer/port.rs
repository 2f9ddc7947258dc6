use async_trait::async_trait;

use crate::explorer::types::{CompileRequest, CompilerListing};
use crate::result::CompileResult;
use crate::Result;

/// Remote compilation service port.
///
/// The HTTP transport (and its retry story) lives in the adapter crate; the
/// core only sees typed records.
#[async_trait]
pub trait ExplorerPort: Send + Sync {
    /// Fetch the flat compiler list for one language.
    async fn list_compilers(&self, language: &str) -> Result<Vec<CompilerListing>>;

    /// Run one compile and interpret the response into a `CompileResult`.
    async fn compile(&self, req: &CompileRequest) -> Result<CompileResult>;

    /// Resolve a short link to the source code of its first session.
    async fn shortlink_source(&self, link_id: &str) -> Result<String>;
}
