//! Batched page creation.

use crate::convert::Block;
use crate::error::{Error, Result};

use super::DocumentStore;

/// Blocks per remote call, kept under the store's 100-item ceiling.
pub const BATCH_SIZE: usize = 95;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Identifier of the created page.
    pub page_id: String,
    /// Blocks written.
    pub block_count: usize,
    /// Remote calls made, the create call included.
    pub batches: usize,
}

impl UploadReport {
    /// User-facing confirmation text.
    pub fn message(&self) -> String {
        if self.batches > 1 {
            format!(
                "Page created successfully with {} blocks. ID: {}",
                self.block_count, self.page_id
            )
        } else {
            format!("Page created successfully. ID: {}", self.page_id)
        }
    }
}

/// Create a page titled `title` under `parent_id` holding `blocks`, in order.
///
/// Up to [`BATCH_SIZE`] blocks go with the create call. The rest are appended
/// to the new page in batches, one call at a time. The first failure stops the
/// upload; blocks already written stay on the page.
pub async fn upload_page(
    store: &dyn DocumentStore,
    parent_id: &str,
    title: &str,
    blocks: &[Block],
) -> Result<UploadReport> {
    if blocks.len() <= BATCH_SIZE {
        let page_id = store.create_page(parent_id, title, blocks).await?;
        tracing::info!(page_id = %page_id, blocks = blocks.len(), "created page");
        return Ok(UploadReport {
            page_id,
            block_count: blocks.len(),
            batches: 1,
        });
    }

    let (first, rest) = blocks.split_at(BATCH_SIZE);
    let total_batches = 1 + rest.len().div_ceil(BATCH_SIZE);

    let page_id = store.create_page(parent_id, title, first).await?;
    tracing::info!(page_id = %page_id, total_batches, "created page, appending remaining blocks");

    for (index, batch) in rest.chunks(BATCH_SIZE).enumerate() {
        let completed_batches = index + 1;
        if let Err(e) = store.append_children(&page_id, batch).await {
            tracing::warn!(
                page_id = %page_id,
                completed_batches,
                total_batches,
                error = %e,
                "append failed, page left partially populated"
            );
            return Err(Error::PartialUpload {
                page_id,
                completed_batches,
                total_batches,
                source: Box::new(e),
            });
        }
        tracing::debug!(page_id = %page_id, batch = completed_batches + 1, size = batch.len(), "appended batch");
    }

    Ok(UploadReport {
        page_id,
        block_count: blocks.len(),
        batches: total_batches,
    })
}
