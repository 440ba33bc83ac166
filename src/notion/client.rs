//! Notion REST client.

use reqwest::{Method, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::NotionConfig;
use crate::convert::Block;
use crate::error::{Error, Result};

use super::wire::{block_from_api, blocks_to_api, create_page_body, page_title};
use super::{DocumentStore, PageSummary};

/// Children fetched per listing call; the API maximum.
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct BlockList {
    #[serde(default)]
    results: Vec<Value>,
}

/// HTTP implementation of [`DocumentStore`].
pub struct NotionClient {
    http: reqwest::Client,
    base: Url,
    config: NotionConfig,
}

impl NotionClient {
    /// Create a client.
    pub fn new(config: NotionConfig) -> Result<Self> {
        let base = Url::parse(&config.api_base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| Error::Config(format!("invalid API base URL: {}", config.api_base)))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("pagebridge-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base, config })
    }

    /// Request to the API base plus `segments`, each percent-encoded as one
    /// path segment.
    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        self.http
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.notion_version)
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) if !err.message.is_empty() => (err.code, err.message),
            _ => (
                String::new(),
                format!("request failed with status {}", status.as_u16()),
            ),
        };

        tracing::debug!(status = status.as_u16(), code = %code, "Notion API error");
        Err(Error::Notion {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait::async_trait]
impl DocumentStore for NotionClient {
    async fn retrieve_page(&self, page_id: &str) -> Result<PageSummary> {
        let page: Value = self
            .send(self.request(Method::GET, &["pages", page_id]))
            .await?;
        let id = page
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(page_id)
            .to_string();
        Ok(PageSummary {
            id,
            title: page_title(&page),
        })
    }

    async fn list_children(&self, block_id: &str) -> Result<Vec<Block>> {
        let list: BlockList = self
            .send(
                self.request(Method::GET, &["blocks", block_id, "children"])
                    .query(&[("page_size", PAGE_SIZE)]),
            )
            .await?;
        tracing::debug!(block_id, count = list.results.len(), "listed children");
        Ok(list.results.iter().map(block_from_api).collect())
    }

    async fn create_page(
        &self,
        parent_id: &str,
        title: &str,
        children: &[Block],
    ) -> Result<String> {
        let created: CreatedObject = self
            .send(
                self.request(Method::POST, &["pages"])
                    .json(&create_page_body(parent_id, title, children)),
            )
            .await?;
        Ok(created.id)
    }

    async fn append_children(&self, block_id: &str, children: &[Block]) -> Result<()> {
        let _: Value = self
            .send(
                self.request(Method::PATCH, &["blocks", block_id, "children"])
                    .json(&json!({ "children": blocks_to_api(children) })),
            )
            .await?;
        Ok(())
    }
}
