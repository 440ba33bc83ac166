//! Browser tools: navigation, page content, input and screenshots.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use crate::browser::{ContentFormat, EngineKind, SessionController};
use crate::error::Result;
use crate::protocol::{ToolCallResult, ToolDefinition};

use super::{parse_args, Tool, ToolRegistry};

/// Base64 characters echoed back when a screenshot is not saved to disk.
const SCREENSHOT_PREVIEW_CHARS: usize = 100;

/// Context shared by the browser tools.
pub struct BrowserContext {
    /// Engine cache and active page.
    pub session: Arc<SessionController>,
    /// Timeout used when a call gives none.
    pub default_timeout: Duration,
}

impl BrowserContext {
    /// Create a context over `session`.
    pub fn new(session: Arc<SessionController>, default_timeout: Duration) -> Self {
        Self {
            session,
            default_timeout,
        }
    }

    /// Timeout from a `timeout` argument in milliseconds. Missing, zero,
    /// negative or non-finite values mean default.
    fn timeout(&self, millis: Option<f64>) -> Duration {
        millis
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
            .unwrap_or(self.default_timeout)
    }
}

/// Registry holding all seven browser tools.
pub fn registry(context: BrowserContext) -> ToolRegistry<BrowserContext> {
    let mut registry = ToolRegistry::new(context);
    registry.register(Arc::new(NavigateTool));
    registry.register(Arc::new(PageContentTool));
    registry.register(Arc::new(ClickTool));
    registry.register(Arc::new(FillTool));
    registry.register(Arc::new(ScreenshotTool));
    registry.register(Arc::new(WaitForElementTool));
    registry.register(Arc::new(CloseBrowserTool));
    registry
}

fn timeout_schema() -> serde_json::Value {
    json!({
        "type": "number",
        "description": "Timeout in milliseconds (default: 30000)"
    })
}

// ============================================================================
// Navigation
// ============================================================================

/// Opens a fresh page on the requested engine and loads a URL.
pub struct NavigateTool;

#[derive(Debug, Deserialize)]
struct NavigateArgs {
    url: String,
    #[serde(default)]
    browser: Option<String>,
    #[serde(default)]
    wait_for: Option<String>,
}

#[async_trait::async_trait]
impl Tool<BrowserContext> for NavigateTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "navigate_to_page".into(),
            description: "Navigate to a URL and get page information".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to navigate to"
                    },
                    "browser": {
                        "type": "string",
                        "enum": ["chromium", "firefox", "webkit"],
                        "description": "Browser type to use (default: chromium)"
                    },
                    "wait_for": {
                        "type": "string",
                        "description": "Selector to wait for before returning (optional)"
                    }
                },
                "required": ["url"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &BrowserContext,
    ) -> Result<ToolCallResult> {
        let args: NavigateArgs = parse_args(arguments)?;
        let kind: EngineKind = match args.browser.as_deref() {
            Some(name) => name.parse()?,
            None => EngineKind::default(),
        };

        let page = context.session.open_page(kind).await?;
        page.goto(&args.url).await?;

        if let Some(selector) = args.wait_for.as_deref() {
            page.wait_for(selector, context.default_timeout).await?;
        }

        let title = page.title().await?;
        let url = page.url().await?;
        tracing::info!(engine = %kind, url = %url, "navigated");

        Ok(ToolCallResult::text(format!(
            "Successfully navigated to: {url}\nPage title: {title}"
        )))
    }
}

/// Returns text or markup of the page or of one element.
pub struct PageContentTool;

#[derive(Debug, Deserialize)]
struct PageContentArgs {
    #[serde(default, rename = "type")]
    format: Option<String>,
    #[serde(default)]
    selector: Option<String>,
}

#[async_trait::async_trait]
impl Tool<BrowserContext> for PageContentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_page_content".into(),
            description: "Get the text content or HTML of the current page".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["text", "html"],
                        "description": "Type of content to retrieve (default: text)"
                    },
                    "selector": {
                        "type": "string",
                        "description": "CSS selector to get content from specific element (optional)"
                    }
                }
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &BrowserContext,
    ) -> Result<ToolCallResult> {
        let args: PageContentArgs = parse_args(arguments)?;
        let page = context.session.page().await?;
        let format: ContentFormat = match args.format.as_deref() {
            Some(name) => name.parse()?,
            None => ContentFormat::default(),
        };

        let content = page.content(format, args.selector.as_deref()).await?;
        Ok(ToolCallResult::text(content))
    }
}

// ============================================================================
// Interaction
// ============================================================================

#[derive(Debug, Deserialize)]
struct SelectorArgs {
    selector: String,
    #[serde(default)]
    timeout: Option<f64>,
}

/// Clicks an element once it appears.
pub struct ClickTool;

#[async_trait::async_trait]
impl Tool<BrowserContext> for ClickTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "click_element".into(),
            description: "Click on an element on the page".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector of the element to click"
                    },
                    "timeout": timeout_schema()
                },
                "required": ["selector"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &BrowserContext,
    ) -> Result<ToolCallResult> {
        let args: SelectorArgs = parse_args(arguments)?;
        let page = context.session.page().await?;
        page.click(&args.selector, context.timeout(args.timeout))
            .await?;

        Ok(ToolCallResult::text(format!(
            "Successfully clicked element: {}",
            args.selector
        )))
    }
}

/// Replaces the value of an input field.
pub struct FillTool;

#[derive(Debug, Deserialize)]
struct FillArgs {
    selector: String,
    value: String,
    #[serde(default)]
    timeout: Option<f64>,
}

#[async_trait::async_trait]
impl Tool<BrowserContext> for FillTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "fill_input".into(),
            description: "Fill an input field with text".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector of the input element"
                    },
                    "value": {
                        "type": "string",
                        "description": "Text to fill in the input"
                    },
                    "timeout": timeout_schema()
                },
                "required": ["selector", "value"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &BrowserContext,
    ) -> Result<ToolCallResult> {
        let args: FillArgs = parse_args(arguments)?;
        let page = context.session.page().await?;
        page.fill(&args.selector, &args.value, context.timeout(args.timeout))
            .await?;

        Ok(ToolCallResult::text(format!(
            "Successfully filled input {} with: {}",
            args.selector, args.value
        )))
    }
}

/// Waits until a selector matches.
pub struct WaitForElementTool;

#[async_trait::async_trait]
impl Tool<BrowserContext> for WaitForElementTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "wait_for_element".into(),
            description: "Wait for an element to appear on the page".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": {
                        "type": "string",
                        "description": "CSS selector of the element to wait for"
                    },
                    "timeout": timeout_schema()
                },
                "required": ["selector"]
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &BrowserContext,
    ) -> Result<ToolCallResult> {
        let args: SelectorArgs = parse_args(arguments)?;
        let page = context.session.page().await?;
        page.wait_for(&args.selector, context.timeout(args.timeout))
            .await?;

        Ok(ToolCallResult::text(format!(
            "Element appeared: {}",
            args.selector
        )))
    }
}

// ============================================================================
// Screenshots and teardown
// ============================================================================

/// Captures a PNG of the active page.
pub struct ScreenshotTool;

#[derive(Debug, Deserialize)]
struct ScreenshotArgs {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    full_page: Option<bool>,
}

#[async_trait::async_trait]
impl Tool<BrowserContext> for ScreenshotTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "take_screenshot".into(),
            description: "Take a screenshot of the current page".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to save the screenshot (optional, returns base64 if not provided)"
                    },
                    "full_page": {
                        "type": "boolean",
                        "description": "Take screenshot of full page (default: true)"
                    }
                }
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &BrowserContext,
    ) -> Result<ToolCallResult> {
        let args: ScreenshotArgs = parse_args(arguments)?;
        let page = context.session.page().await?;
        let png = page.screenshot(args.full_page.unwrap_or(true)).await?;

        match args.path {
            Some(path) => {
                tokio::fs::write(&path, &png).await?;
                tracing::info!(path = %path, bytes = png.len(), "saved screenshot");
                Ok(ToolCallResult::text(format!("Screenshot saved to: {path}")))
            }
            None => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
                let preview: String = encoded.chars().take(SCREENSHOT_PREVIEW_CHARS).collect();
                Ok(ToolCallResult::text(format!(
                    "Screenshot taken (base64): data:image/png;base64,{preview}..."
                )))
            }
        }
    }
}

/// Closes one engine, or all of them.
pub struct CloseBrowserTool;

#[derive(Debug, Deserialize)]
struct CloseBrowserArgs {
    #[serde(default)]
    browser: Option<String>,
}

#[async_trait::async_trait]
impl Tool<BrowserContext> for CloseBrowserTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "close_browser".into(),
            description: "Close the browser instance".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "browser": {
                        "type": "string",
                        "enum": ["chromium", "firefox", "webkit", "all"],
                        "description": "Browser type to close or 'all' to close all browsers"
                    }
                }
            }),
        }
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &BrowserContext,
    ) -> Result<ToolCallResult> {
        let args: CloseBrowserArgs = parse_args(arguments)?;

        let kind: EngineKind = match args.browser.as_deref() {
            Some("all") => {
                context.session.close_all().await?;
                return Ok(ToolCallResult::text("All browser instances closed"));
            }
            Some(name) => name.parse()?,
            None => context.session.current_engine().await,
        };

        context.session.close_engine(kind).await?;
        Ok(ToolCallResult::text(format!("Browser {kind} closed")))
    }
}
