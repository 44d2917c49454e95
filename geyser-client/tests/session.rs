mod common;

use std::sync::Arc;

use geyser_client::{
    Client, Config, InMemoryBackend, JsonFileBackend, SessionBackend, SessionData, StoredCookie, Url,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

async fn mount_cookie_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "sessionid=s1; Path=/")
                .append_header("set-cookie", "steamLoginSecure=tok; Path=/; HttpOnly"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn saved_session_restores_into_a_fresh_client() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;

    let backend = Arc::new(InMemoryBackend::new());
    let cfg     = Config { session_backend: backend.clone(), ..config(&server) };

    let first = Client::new(cfg.clone()).unwrap();
    assert_eq!(first.ensure_session_token().await.unwrap(), "s1");
    first.save_session().unwrap();

    let saved = backend.load().unwrap().unwrap();
    assert_eq!(saved.cookies.len(), 2);

    let second = Client::new(cfg).unwrap();
    assert_eq!(second.session_token().as_deref(), Some("s1"));
    assert_eq!(second.export_session().cookies.len(), 2);
    assert_eq!(requests_to(&server, "/").await.len(), 1);
}

#[tokio::test]
async fn restored_cookies_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat"))
        .and(wiremock::matchers::header("cookie", "sessionid=restored"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chat_page()))
        .mount(&server)
        .await;

    let host   = Url::parse(&server.uri()).unwrap().host_str().unwrap().to_string();
    let client = client(&server);
    client.restore_session(&SessionData { cookies: vec![StoredCookie::new("sessionid", "restored", host)] });

    assert_eq!(client.chat_access_token().await.unwrap(), TOKEN);
}

#[tokio::test]
async fn session_file_round_trip() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;

    let dir  = tempfile::tempdir().unwrap();
    let file = dir.path().join("geyser.session.json");
    let cfg  = Config { session_backend: Arc::new(JsonFileBackend::new(&file)), ..config(&server) };

    let client = Client::new(cfg.clone()).unwrap();
    client.ensure_session_token().await.unwrap();
    client.save_session().unwrap();

    let on_disk = SessionData::load(&file).unwrap();
    assert!(on_disk.cookies.iter().any(|c| c.name == "steamLoginSecure" && c.http_only));

    let again = Client::new(cfg).unwrap();
    assert_eq!(again.session_token().as_deref(), Some("s1"));
}

#[tokio::test]
async fn logout_clears_jar_and_backend() {
    let server = MockServer::start().await;
    mount_cookie_page(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/logout"))
        .and(body_string_contains("sessionid=s1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Arc::new(InMemoryBackend::new());
    let client  = Client::new(Config { session_backend: backend.clone(), ..config(&server) }).unwrap();
    client.ensure_session_token().await.unwrap();
    client.save_session().unwrap();

    client.logout().await.unwrap();
    assert!(client.jar().is_empty());
    assert_eq!(client.session_token(), None);
    assert!(backend.load().unwrap().is_none());
}
