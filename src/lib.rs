//! # pagebridge-mcp
//!
//! MCP (Model Context Protocol) servers bridging AI assistants to Notion pages
//! and to a headless browser.
//!
//! Two servers share one JSON-RPC 2.0 stdio transport:
//!
//! - **notion**: `read_page` renders a page's blocks as Markdown-like text;
//!   `create_page` converts Markdown into blocks and uploads them in batches.
//! - **browser**: `navigate_to_page`, `get_page_content`, `click_element`,
//!   `fill_input`, `take_screenshot`, `wait_for_element` and `close_browser`
//!   drive Chrome/Chromium over the DevTools protocol.
//!
//! The Markdown ↔ block conversion in [`convert`] is pure and can be used on
//! its own.
//!
//! ## Usage with VS Code
//!
//! Add to your `.vscode/mcp.json`:
//!
//! ```json
//! {
//!   "servers": {
//!     "notion": {
//!       "command": "pagebridge-mcp",
//!       "args": ["notion"],
//!       "env": { "NOTION_TOKEN": "secret_..." }
//!     },
//!     "browser": {
//!       "command": "pagebridge-mcp",
//!       "args": ["browser"]
//!     }
//!   }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod browser;
pub mod config;
pub mod convert;
pub mod error;
pub mod notion;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, McpMessage};
pub use server::McpServer;
pub use tools::{Tool, ToolRegistry};
