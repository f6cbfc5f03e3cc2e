//! Integration tests for page fetching and extraction using wiremock

use web_summarizer::error::AppError;
use web_summarizer::extractor::{PageFetcher, MAX_TEXT_CHARS};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> PageFetcher {
    PageFetcher::new().unwrap()
}

#[tokio::test]
async fn test_extracts_visible_text() {
    let mock_server = MockServer::start().await;

    let html = r#"<!DOCTYPE html>
<html>
<head><title>Article</title><script>trackVisitor();</script></head>
<body>
    <h1>Big   News</h1>
    <p>Something happened today.</p>
    <style>.hidden { display: none; }</style>
</body>
</html>"#;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/article", mock_server.uri());
    let extracted = fetcher().extract_text_from_url(&url).await.unwrap();

    assert_eq!(extracted.source_url, url);
    assert_eq!(extracted.text, "Article Big News Something happened today.");
}

#[tokio::test]
async fn test_sends_browser_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_regex("user-agent", "^Mozilla/5.0 .*Chrome/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let html = fetcher().fetch_html(&format!("{}/", mock_server.uri())).await.unwrap();
    assert!(html.contains("ok"));
}

#[tokio::test]
async fn test_long_page_is_capped() {
    let mock_server = MockServer::start().await;

    let html = format!("<html><body><p>{}</p></body></html>", "lorem ipsum ".repeat(1000));
    Mock::given(method("GET"))
        .and(path("/long"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(&mock_server)
        .await;

    let extracted = fetcher().extract_text_from_url(&format!("{}/long", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(extracted.text.chars().count(), MAX_TEXT_CHARS);
}

#[tokio::test]
async fn test_not_found_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = fetcher().extract_text_from_url(&format!("{}/missing", mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        AppError::Fetch(msg) => {
            assert!(msg.starts_with("Error extracting text from URL: "));
            assert!(msg.contains("404"));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = fetcher().fetch_html(&mock_server.uri()).await.unwrap_err();
    assert!(matches!(err, AppError::Fetch(msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_connection_refused_is_fetch_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = fetcher().extract_text_from_url(&format!("http://127.0.0.1:{port}/"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Fetch(_)));
}

#[tokio::test]
async fn test_meta_charset_decoded() {
    let mock_server = MockServer::start().await;

    let body: Vec<u8> =
        b"<html><head><meta charset=\"windows-1252\"></head><body><p>Caf\xe9 cr\xe8me</p></body></html>".to_vec();
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&mock_server)
        .await;

    let extracted = fetcher()
        .extract_text_from_url(&format!("{}/latin", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(extracted.text, "Caf\u{e9} cr\u{e8}me");
}
