//! Web chat over the `ISteamWebUserPresenceOAuth` long-poll endpoints.
//!
//! [`Client::chat`] scrapes an access token from the chat page, logs on to
//! presence and returns a [`ChatSession`]. Call [`ChatSession::poll`] in a
//! loop; each call waits up to 35 s server-side and returns whatever arrived.

use std::sync::LazyLock;

use geyser_ids::SteamId;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

use crate::errors::ChatError;
use crate::message::{self, Decoded, PollBatch};
use crate::transport::HttpTransport;
use crate::{Client, ReqwestTransport};

const STATUS_OK: &str = "OK";

/// Server-side long-poll wait, in seconds.
const POLL_TIMEOUT_SECS: u32 = 35;

static RE_ACCESS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"CWebAPI\s*\(\s*(?:[^,]+,){2}\s*"([0-9a-f]{32})"\s*\)"#)
        .expect("access token pattern compiles")
});

/// Pull the 32-hex-digit access token out of the chat page HTML.
pub fn extract_access_token(page: &str) -> Option<&str> {
    RE_ACCESS_TOKEN
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

// ─── Wire types ───────────────────────────────────────────────────────────────

/// Accepts `"123"` or `123`.
fn u64_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }
    match Repr::deserialize(d)? {
        Repr::Text(s)   => s.parse().map_err(serde::de::Error::custom),
        Repr::Number(n) => Ok(n),
    }
}

#[derive(Deserialize)]
struct LogonResponse {
    #[serde(default)]
    steamid:       Option<SteamId>,
    #[serde(default)]
    error:         String,
    #[serde(default, deserialize_with = "u64_lenient")]
    umqid:         u64,
    #[serde(default)]
    timestamp:     u64,
    #[serde(default)]
    utc_timestamp: u64,
    #[serde(default)]
    message:       u64,
    #[serde(default)]
    push:          u64,
}

#[derive(Deserialize)]
struct PollResponse {
    #[serde(default)]
    messages:    Vec<Box<RawValue>>,
    #[serde(default)]
    messagelast: Option<u64>,
    #[serde(default)]
    error:       String,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    error: String,
}

// ─── ChatSession ──────────────────────────────────────────────────────────────

/// A logged-on web chat session.
///
/// Only [`ChatSession::poll`] advances `message` and `poll_id`; sends leave
/// them alone. Both take `&mut self`/`&self` accordingly, so sharing one
/// session between a poller and a sender needs outside synchronisation.
pub struct ChatSession<T: HttpTransport = ReqwestTransport> {
    /// The logged-on account.
    pub steam_id:      SteamId,
    /// Server-assigned session id (`umqid`).
    pub umqid:         u64,
    /// Cursor: id of the last message the server has delivered.
    pub message:       u64,
    /// Number of polls issued so far; sent with the next poll.
    pub poll_id:       u64,
    pub timestamp:     u64,
    pub utc_timestamp: u64,
    pub push:          u64,
    access_token:      String,
    client:            Client<T>,
}

impl<T: HttpTransport> std::fmt::Debug for ChatSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("steam_id", &self.steam_id)
            .field("umqid", &self.umqid)
            .field("message", &self.message)
            .field("poll_id", &self.poll_id)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> ChatSession<T> {
    /// Bootstrap a session on an authenticated client.
    pub async fn open(client: &Client<T>) -> Result<Self, ChatError> {
        let access_token = client.chat_access_token().await?;

        let url = client.api_endpoint("ISteamWebUserPresenceOAuth/Logon/v0001/")?;
        let rsp: LogonResponse = client.transport()
            .post_form(url, &[("access_token", access_token.clone())])
            .await?
            .error_for_status()?
            .json()?;

        if rsp.error != STATUS_OK {
            return Err(ChatError::Status(rsp.error));
        }

        let steam_id = rsp.steamid.unwrap_or_default();
        tracing::info!("[geyser] Chat logon ✓  ({steam_id}, umqid {})", rsp.umqid);

        Ok(Self {
            steam_id,
            umqid:         rsp.umqid,
            message:       rsp.message,
            poll_id:       0,
            timestamp:     rsp.timestamp,
            utc_timestamp: rsp.utc_timestamp,
            push:          rsp.push,
            access_token,
            client:        client.clone(),
        })
    }

    pub fn access_token(&self) -> &str { &self.access_token }

    /// Long-poll for new messages.
    ///
    /// Once a response body has been decoded, `poll_id` is incremented and
    /// the cursor adopts the server's `messagelast` before the status is
    /// checked: the server has consumed this poll either way. A request that
    /// fails or is dropped before that point leaves both untouched.
    pub async fn poll(&mut self) -> Result<PollBatch, ChatError> {
        let url  = self.client.api_endpoint("ISteamWebUserPresenceOAuth/Poll/v0001/")?;
        let form = [
            ("umqid",          self.umqid.to_string()),
            ("message",        self.message.to_string()),
            ("pollid",         self.poll_id.to_string()),
            ("sectimeout",     POLL_TIMEOUT_SECS.to_string()),
            ("secidletime",    "0".to_string()),
            ("use_accountids", "1".to_string()),
            ("access_token",   self.access_token.clone()),
        ];

        let rsp: PollResponse = self.client.transport()
            .post_form(url, &form)
            .await?
            .error_for_status()?
            .json()?;

        self.poll_id += 1;
        if let Some(last) = rsp.messagelast {
            self.message = last;
        }
        tracing::debug!("[geyser] Poll {} → cursor {} ({})", self.poll_id, self.message, rsp.error);

        if rsp.error != STATUS_OK {
            return Err(ChatError::Status(rsp.error));
        }

        let mut batch = PollBatch::default();
        for entry in &rsp.messages {
            match message::decode(entry)? {
                Decoded::Known(m)   => batch.messages.push(m),
                Decoded::Unknown(u) => {
                    tracing::warn!("[geyser] Unknown chat message type {:?}: {}", u.header.kind, u.raw);
                    batch.unknown.push(u);
                }
            }
        }
        Ok(batch)
    }

    /// Send a chat line to `recipient`.
    pub async fn send(&self, recipient: SteamId, text: &str) -> Result<(), ChatError> {
        self.send_kind(recipient, "saytext", Some(text)).await
    }

    /// Show the "typing…" indicator to `recipient`.
    pub async fn send_typing(&self, recipient: SteamId) -> Result<(), ChatError> {
        self.send_kind(recipient, "typing", None).await
    }

    async fn send_kind(&self, recipient: SteamId, kind: &str, text: Option<&str>) -> Result<(), ChatError> {
        let url = self.client.api_endpoint("ISteamWebUserPresenceOAuth/Message/v0001/")?;
        let mut form = vec![
            ("umqid",        self.umqid.to_string()),
            ("access_token", self.access_token.clone()),
            ("type",         kind.to_string()),
            ("steamid_dst",  recipient.to_string()),
        ];
        if let Some(t) = text {
            form.push(("text", t.to_string()));
        }

        let rsp: StatusResponse = self.client.transport()
            .post_form(url, &form)
            .await?
            .error_for_status()?
            .json()?;

        if rsp.error != STATUS_OK {
            return Err(ChatError::Status(rsp.error));
        }
        Ok(())
    }
}

// ─── Client entry points ──────────────────────────────────────────────────────

impl<T: HttpTransport> Client<T> {
    /// Fetch the chat page and extract its web API access token.
    pub async fn chat_access_token(&self) -> Result<String, ChatError> {
        let url  = self.community_endpoint("chat")?;
        let page = self.transport().get(url).await?.error_for_status()?;
        extract_access_token(&page.body)
            .map(str::to_string)
            .ok_or(ChatError::NoAuthToken)
    }

    /// Open a web chat session. See [`ChatSession::open`].
    pub async fn chat(&self) -> Result<ChatSession<T>, ChatError> {
        ChatSession::open(self).await
    }
}
