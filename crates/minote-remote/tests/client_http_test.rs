//! HTTP client tests against a mock Mi Notes server

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use minote_core::{RemoteError, RemoteNoteService};
use minote_remote::{ClientConfig, ClientError, MinoteClient, RetryPolicy};

// ============================================================================
// Helper Functions
// ============================================================================

fn client_for(server: &MockServer, max_retries: u32) -> MinoteClient {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .cookie("serviceToken=abc; userId=1")
        .page_limit(2)
        .retry(RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        })
        .build();
    MinoteClient::with_config(config).unwrap()
}

fn ok_envelope(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 0, "result": "ok", "data": data}))
}

// ============================================================================
// TEST: Endpoints
// ============================================================================

#[tokio::test]
async fn test_catalog_page_sends_cookie_limit_and_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/note/full/page/"))
        .and(query_param("limit", "2"))
        .and(query_param("syncTag", "cursor-1"))
        .and(header("cookie", "serviceToken=abc; userId=1"))
        .respond_with(ok_envelope(json!({
            "entries": [{"id": 1, "type": "note", "modifyDate": 5}],
            "folders": [{"id": "7", "type": "folder", "subject": "Work"}],
            "lastPage": true,
            "syncTag": "cursor-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let page = client.fetch_page(Some("cursor-1")).await.unwrap();

    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.folders.len(), 1);
    assert!(page.last_page);
    assert_eq!(page.sync_tag.as_deref(), Some("cursor-2"));
}

#[tokio::test]
async fn test_note_detail_unwraps_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/note/note/42/"))
        .respond_with(ok_envelope(json!({
            "entry": {
                "content": "<text indent=\"1\">hi</text>",
                "extraInfo": "{\"title\":\"Hello\"}",
                "setting": {"data": [{"fileId": "f1", "mimeType": "image/png", "digest": "d"}]},
                "createDate": 1,
                "modifyDate": 2
            }
        })))
        .mount(&server)
        .await;

    let detail = client_for(&server, 0).fetch_note_details("42").await.unwrap();
    assert_eq!(detail.content, "<text indent=\"1\">hi</text>");
    assert_eq!(detail.attachments().len(), 1);
    assert_eq!(detail.attachments()[0].file_id, "f1");
    assert_eq!(detail.modify_date, 2);
}

#[tokio::test]
async fn test_file_download_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file/full"))
        .and(query_param("type", "note_img"))
        .and(query_param("fileid", "f1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .mount(&server)
        .await;

    let bytes = client_for(&server, 0).fetch_image("f1").await.unwrap();
    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}

// ============================================================================
// TEST: Error Handling
// ============================================================================

#[tokio::test]
async fn test_non_zero_code_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/note/full/page/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 10003, "result": "error", "description": "bad ts"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 3).fetch_page(None).await.unwrap_err();
    match err {
        RemoteError::Api { code, message } => {
            assert_eq!(code, 10003);
            assert_eq!(message, "bad ts");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, 3).note_detail("1").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn test_server_error_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/note/full/page/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/note/full/page/"))
        .respond_with(ok_envelope(json!({"entries": [], "folders": [], "lastPage": true})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server, 3).catalog_page(None).await.unwrap();
    assert!(page.last_page);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server, 2).file_bytes("f1").await.unwrap_err();
    match err {
        ClientError::TooManyRetries { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(last.contains("500"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, 0).fetch_note_details("1").await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
}
