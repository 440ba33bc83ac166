//! Notion document store: HTTP client, wire format and batched upload.

pub mod client;
pub mod id;
pub mod upload;
pub mod wire;

pub use client::NotionClient;
pub use id::normalize_id;
pub use upload::{upload_page, UploadReport, BATCH_SIZE};

use crate::convert::Block;
use crate::error::Result;

/// Page metadata needed by the tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    /// Page identifier.
    pub id: String,
    /// Resolved page title.
    pub title: String,
}

/// Remote document store operations.
///
/// Create and append calls accept at most 100 blocks each.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Retrieve page metadata.
    async fn retrieve_page(&self, page_id: &str) -> Result<PageSummary>;

    /// List the first page of a block's children.
    async fn list_children(&self, block_id: &str) -> Result<Vec<Block>>;

    /// Create a page under `parent_id` with the given children. Returns the new page id.
    async fn create_page(&self, parent_id: &str, title: &str, children: &[Block])
        -> Result<String>;

    /// Append children to an existing page or block.
    async fn append_children(&self, block_id: &str, children: &[Block]) -> Result<()>;
}
