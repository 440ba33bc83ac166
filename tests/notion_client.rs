//! Notion HTTP client tests against a mock API.

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pagebridge_mcp::config::NotionConfig;
use pagebridge_mcp::convert::{parse, Block, HeadingLevel, RichSpan};
use pagebridge_mcp::notion::{upload_page, DocumentStore, NotionClient};
use pagebridge_mcp::Error;

const PAGE_ID: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";

async fn client(server: &MockServer) -> NotionClient {
    let config = NotionConfig {
        api_base: server.uri(),
        ..NotionConfig::with_token("secret_test")
    };
    assert_ok!(NotionClient::new(config))
}

#[tokio::test]
async fn test_retrieve_page_sends_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/pages/{PAGE_ID}")))
        .and(header("authorization", "Bearer secret_test"))
        .and(header("notion-version", "2022-06-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "page",
            "id": PAGE_ID,
            "properties": {
                "Name": {
                    "type": "title",
                    "title": [
                        { "plain_text": "Road" },
                        { "plain_text": "map" }
                    ]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = assert_ok!(client(&server).await.retrieve_page(PAGE_ID).await);
    assert_eq!(page.id, PAGE_ID);
    assert_eq!(page.title, "Roadmap");
}

#[tokio::test]
async fn test_list_children_maps_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/blocks/{PAGE_ID}/children")))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [
                {
                    "type": "heading_2",
                    "heading_2": { "rich_text": [{ "plain_text": "Goals" }] }
                },
                {
                    "type": "to_do",
                    "to_do": {
                        "rich_text": [{
                            "plain_text": "ship",
                            "annotations": { "bold": true }
                        }],
                        "checked": true
                    }
                },
                { "type": "child_database", "child_database": { "title": "db" } }
            ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let blocks = assert_ok!(client(&server).await.list_children(PAGE_ID).await);
    assert_eq!(
        blocks,
        vec![
            Block::Heading {
                level: HeadingLevel::H2,
                text: vec![RichSpan::plain("Goals")],
            },
            Block::Todo {
                checked: true,
                text: vec![RichSpan::bold("ship")],
            },
            Block::Unsupported("child_database".into()),
        ]
    );
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/pages/{PAGE_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page with ID: 59833787-2cf9-4fdf-8782-e53db20768a5."
        })))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server).await.retrieve_page(PAGE_ID).await);
    assert_eq!(
        err.to_string(),
        "Could not find page with ID: 59833787-2cf9-4fdf-8782-e53db20768a5."
    );
    match err {
        Error::Notion { status, code, .. } => {
            assert_eq!(status, 404);
            assert_eq!(code, "object_not_found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_body_uses_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server).await.retrieve_page(PAGE_ID).await);
    assert_eq!(err.to_string(), "request failed with status 502");
}

#[tokio::test]
async fn test_create_page_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "parent": { "page_id": PAGE_ID },
            "properties": {
                "title": { "title": [{ "text": { "content": "Notes" } }] }
            },
            "children": [{
                "object": "block",
                "type": "heading_1",
                "heading_1": { "rich_text": [{ "type": "text", "text": { "content": "Hi" } }] }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new-page" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = assert_ok!(
        client(&server)
            .await
            .create_page(PAGE_ID, "Notes", &parse("# Hi"))
            .await
    );
    assert_eq!(id, "new-page");
}

#[tokio::test]
async fn test_upload_appends_overflow_batches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new-page" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/blocks/new-page/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let blocks: Vec<Block> = (0..200)
        .map(|i| Block::Paragraph(vec![RichSpan::plain(format!("line {i}"))]))
        .collect();
    let store = client(&server).await;

    let report = assert_ok!(upload_page(&store, PAGE_ID, "Long", &blocks).await);
    assert_eq!(report.batches, 3);
    assert_eq!(
        report.message(),
        "Page created successfully with 200 blocks. ID: new-page"
    );

    let requests = server.received_requests().await.unwrap();
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["children"].as_array().unwrap().len()
        })
        .collect();
    assert_eq!(sizes, vec![95, 95, 10]);
}

#[tokio::test]
async fn test_upload_failure_keeps_store_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new-page" })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "object": "error",
            "status": 429,
            "code": "rate_limited",
            "message": "You have been rate limited. Please try again in a few minutes."
        })))
        .mount(&server)
        .await;

    let blocks = vec![Block::Divider; 150];
    let store = client(&server).await;

    let err = assert_err!(upload_page(&store, PAGE_ID, "Long", &blocks).await);
    assert_eq!(
        err.to_string(),
        "You have been rate limited. Please try again in a few minutes."
    );
    assert!(matches!(
        err,
        Error::PartialUpload {
            completed_batches: 1,
            total_batches: 2,
            ..
        }
    ));
}

#[tokio::test]
async fn test_ids_stay_inside_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page."
        })))
        .mount(&server)
        .await;

    assert_err!(
        client(&server)
            .await
            .retrieve_page("abc/../users?x=1")
            .await
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/pages/abc%2F..%2Fusers%3Fx=1");
    assert_eq!(requests[0].url.query(), None);
}

#[test]
fn test_invalid_api_base_is_rejected() {
    let config = NotionConfig {
        api_base: "not a url".into(),
        ..NotionConfig::with_token("secret_test")
    };
    assert!(matches!(NotionClient::new(config), Err(Error::Config(_))));
}
