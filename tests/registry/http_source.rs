use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use binsync::config::SiteConfig;
use binsync::error::RegistryFetchError;
use binsync::registry::{HttpRegistrySource, RegistrySource};

fn install_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn site(server: &MockServer) -> SiteConfig {
    SiteConfig {
        api_base_url: server.uri(),
        ..SiteConfig::default()
    }
}

#[tokio::test]
async fn reads_registry_list_from_public_endpoint() {
    install_crypto();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reg42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "grade-5-plants", "title": "Plants Unit", "url": "https://api.npoint.io/abc123"},
            {"id": "weather", "title": "Weather", "url": "https://api.npoint.io/w1", "extra": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpRegistrySource::new(&site(&server), "reg42");
    assert_eq!(source.url(), format!("{}/reg42", server.uri()));
    let entries = source.fetch().await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["extra"], json!(true));
    server.verify().await;
}

#[tokio::test]
async fn object_body_is_not_a_list() {
    install_crypto();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reg42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
        .mount(&server)
        .await;

    let err = HttpRegistrySource::new(&site(&server), "reg42")
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryFetchError::NotAList("object")));
}

#[tokio::test]
async fn server_error_reports_status() {
    install_crypto();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reg42"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = HttpRegistrySource::new(&site(&server), "reg42")
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryFetchError::Status(500)));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    install_crypto();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reg42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = HttpRegistrySource::new(&site(&server), "reg42")
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryFetchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    install_crypto();
    // reserve a free port, then release it so nothing is listening there
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let source = HttpRegistrySource::with_client(
        binsync::registry::build_registry_client(),
        format!("http://127.0.0.1:{port}/reg42"),
    );
    let err = source.fetch().await.unwrap_err();
    assert!(
        matches!(err, RegistryFetchError::Request(_)),
        "expected a transport error, got {err:?}"
    );
}
