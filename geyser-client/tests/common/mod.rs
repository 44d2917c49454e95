#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use geyser_client::{Client, Config, InMemoryBackend, Url};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// 512-bit test key; the private exponent lets tests check what was sent.
pub const MODULUS: &str = "d1fee1b1598a8b52831043684c971ef4ba302653983be8012ad537e514b600f729047ca323f64a42e0f01fa1f8aef1bdeed728c5b863383e3152364e522f1d97";
pub const PRIVATE: &str = "7e1969f98f654c883dbfb45a9b335c1964fca8e725d1435e00148d3df893da3b79d61bfd17278cb85bebdf833460b4b1f24116eb26d516f2845d696312054901";

pub const TOKEN: &str = "0123456789abcdef0123456789abcdef";
pub const STEAM_ID: u64 = 76561197960287930;

/// Both base URLs point at the mock server; nothing is persisted.
pub fn config(server: &MockServer) -> Config {
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    Config {
        community_url:   base.clone(),
        api_url:         base,
        session_backend: Arc::new(InMemoryBackend::new()),
        ..Config::default()
    }
}

pub fn client(server: &MockServer) -> Client {
    Client::new(config(server)).unwrap()
}

/// Decoded `application/x-www-form-urlencoded` body.
pub fn form(req: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&req.body).into_owned().collect()
}

/// Every request the server saw for `p`, oldest first.
pub async fn requests_to(server: &MockServer, p: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == p)
        .collect()
}

pub fn json_with_session(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .insert_header("set-cookie", "sessionid=abc%21123; Path=/")
}

pub async fn mount_rsa_key(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login/getrsakey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success":       true,
            "publickey_mod": MODULUS,
            "publickey_exp": "010001",
            "timestamp":     "1234500000",
        })))
        .mount(server)
        .await;
}

pub fn chat_page() -> String {
    format!(
        r#"<html><script>var WebAPI = new CWebAPI( 'https://api.steampowered.com/', 'https://api.steampowered.com/', "{TOKEN}" );</script></html>"#
    )
}

/// Chat page plus a successful presence logon with cursor 10.
pub async fn mount_chat(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chat_page()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ISteamWebUserPresenceOAuth/Logon/v0001/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "steamid":       STEAM_ID.to_string(),
            "error":         "OK",
            "umqid":         "8142307455418938370",
            "timestamp":     1000,
            "utc_timestamp": 1700000000,
            "message":       10,
            "push":          0,
        })))
        .mount(server)
        .await;
}
