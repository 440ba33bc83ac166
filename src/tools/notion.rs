//! Notion tools: `read_page` and `create_page`.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::convert::{parse, render_document};
use crate::error::Result;
use crate::notion::{normalize_id, upload_page, DocumentStore};
use crate::protocol::{ToolCallResult, ToolDefinition};

use super::{parse_args, Tool, ToolRegistry};

/// Context shared by the Notion tools.
pub struct NotionContext {
    /// Remote document store.
    pub store: Arc<dyn DocumentStore>,
}

impl NotionContext {
    /// Wrap a document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

/// Registry holding both Notion tools.
pub fn registry(context: NotionContext) -> ToolRegistry<NotionContext> {
    let mut registry = ToolRegistry::new(context);
    registry.register(Arc::new(ReadPageTool));
    registry.register(Arc::new(CreatePageTool));
    registry
}

// ============================================================================
// read_page
// ============================================================================

/// Reads a page and renders its top-level blocks as Markdown-like text.
pub struct ReadPageTool;

#[derive(Debug, Deserialize)]
struct ReadPageArgs {
    page_id: String,
}

#[async_trait::async_trait]
impl Tool<NotionContext> for ReadPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "read_page".into(),
            description: "Read a Notion page content".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_id": {
                        "type": "string",
                        "description": "The ID of the page to read"
                    }
                },
                "required": ["page_id"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &NotionContext,
    ) -> Result<ToolCallResult> {
        let args: ReadPageArgs = parse_args(arguments)?;
        let page_id = normalize_id(&args.page_id);

        let page = context.store.retrieve_page(&page_id).await?;
        let blocks = context.store.list_children(&page_id).await?;
        tracing::debug!(page_id = %page_id, blocks = blocks.len(), "read page");

        Ok(ToolCallResult::text(format!(
            "Page Title: {}\n\nContent:\n{}",
            page.title,
            render_document(&blocks)
        )))
    }
}

// ============================================================================
// create_page
// ============================================================================

/// Creates a page from Markdown, batching blocks past the per-call limit.
pub struct CreatePageTool;

#[derive(Debug, Deserialize)]
struct CreatePageArgs {
    parent_id: String,
    title: String,
    #[serde(default)]
    content: Option<String>,
}

#[async_trait::async_trait]
impl Tool<NotionContext> for CreatePageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "create_page".into(),
            description: "Create a new Notion page".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parent_id": {
                        "type": "string",
                        "description": "Parent page ID"
                    },
                    "title": {
                        "type": "string",
                        "description": "Page title"
                    },
                    "content": {
                        "type": "string",
                        "description": "Page content"
                    }
                },
                "required": ["parent_id", "title"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &NotionContext,
    ) -> Result<ToolCallResult> {
        let args: CreatePageArgs = parse_args(arguments)?;
        let parent_id = normalize_id(&args.parent_id);
        let blocks = args.content.as_deref().map(parse).unwrap_or_default();

        let report = upload_page(context.store.as_ref(), &parent_id, &args.title, &blocks).await?;
        Ok(ToolCallResult::text(report.message()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::convert::{Block, HeadingLevel, RichSpan};
    use crate::error::Error;
    use crate::notion::PageSummary;

    #[derive(Default)]
    struct FakeStore {
        pages: Mutex<Vec<(String, String, Vec<Block>)>>,
        appended: Mutex<Vec<usize>>,
        children: Vec<Block>,
        missing: bool,
    }

    #[async_trait::async_trait]
    impl DocumentStore for FakeStore {
        async fn retrieve_page(&self, page_id: &str) -> Result<PageSummary> {
            if self.missing {
                return Err(Error::Notion {
                    status: 404,
                    code: "object_not_found".into(),
                    message: format!("Could not find page with ID: {page_id}."),
                });
            }
            Ok(PageSummary {
                id: page_id.into(),
                title: "Weekly notes".into(),
            })
        }

        async fn list_children(&self, _block_id: &str) -> Result<Vec<Block>> {
            Ok(self.children.clone())
        }

        async fn create_page(
            &self,
            parent_id: &str,
            title: &str,
            children: &[Block],
        ) -> Result<String> {
            self.pages
                .lock()
                .unwrap()
                .push((parent_id.into(), title.into(), children.to_vec()));
            Ok("page-1".into())
        }

        async fn append_children(&self, _block_id: &str, children: &[Block]) -> Result<()> {
            self.appended.lock().unwrap().push(children.len());
            Ok(())
        }
    }

    fn tools(store: Arc<FakeStore>) -> ToolRegistry<NotionContext> {
        registry(NotionContext::new(store))
    }

    #[tokio::test]
    async fn test_read_page_renders_blocks() {
        let store = Arc::new(FakeStore {
            children: vec![
                Block::Heading {
                    level: HeadingLevel::H1,
                    text: vec![RichSpan::plain("Plan")],
                },
                Block::Unsupported("child_database".into()),
                Block::BulletedItem {
                    text: vec![RichSpan::bold("ship")],
                    indent: 0,
                },
            ],
            ..FakeStore::default()
        });

        let result = tools(store)
            .call("read_page", json!({"page_id": "abc"}))
            .await;

        assert!(!result.is_error);
        assert_eq!(
            result.first_text(),
            Some("Page Title: Weekly notes\n\nContent:\n# Plan\n\n• **ship**")
        );
    }

    #[tokio::test]
    async fn test_read_page_surfaces_store_error() {
        let store = Arc::new(FakeStore {
            missing: true,
            ..FakeStore::default()
        });

        let result = tools(store)
            .call("read_page", json!({"page_id": "abc"}))
            .await;

        assert!(result.is_error);
        assert_eq!(
            result.first_text(),
            Some("Error: Could not find page with ID: abc.")
        );
    }

    #[tokio::test]
    async fn test_read_page_requires_page_id() {
        let result = tools(Arc::new(FakeStore::default()))
            .call("read_page", json!({}))
            .await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_create_page_parses_content() {
        let store = Arc::new(FakeStore::default());
        let result = tools(Arc::clone(&store))
            .call(
                "create_page",
                json!({
                    "parent_id": "parent",
                    "title": "Notes",
                    "content": "# Title\n\nSome **bold** text\n\n---"
                }),
            )
            .await;

        assert_eq!(result.first_text(), Some("Page created successfully. ID: page-1"));

        let pages = store.pages.lock().unwrap();
        let (parent, title, blocks) = &pages[0];
        assert_eq!(parent, "parent");
        assert_eq!(title, "Notes");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].kind(), "paragraph");
        assert_eq!(blocks[2], Block::Divider);
    }

    #[tokio::test]
    async fn test_create_page_without_content() {
        let store = Arc::new(FakeStore::default());
        tools(Arc::clone(&store))
            .call("create_page", json!({"parent_id": "p", "title": "Empty"}))
            .await;

        assert!(store.pages.lock().unwrap()[0].2.is_empty());
    }

    #[tokio::test]
    async fn test_create_page_batches_long_content() {
        let store = Arc::new(FakeStore::default());
        let content = (0..120)
            .map(|i| format!("- item {i}"))
            .collect::<Vec<_>>()
            .join("\n");

        let result = tools(Arc::clone(&store))
            .call(
                "create_page",
                json!({"parent_id": "p", "title": "List", "content": content}),
            )
            .await;

        assert_eq!(
            result.first_text(),
            Some("Page created successfully with 120 blocks. ID: page-1")
        );
        assert_eq!(store.pages.lock().unwrap()[0].2.len(), 95);
        assert_eq!(*store.appended.lock().unwrap(), vec![25]);
    }
}
