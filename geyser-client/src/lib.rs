//! # geyser-client
//!
//! Async client for the Steam Community web login and web chat.
//!
//! ## Features
//! - RSA-encrypted password login with CAPTCHA and Steam Guard challenges
//! - Cookie-jar sessions that export to / restore from a JSON cookie list
//! - Pluggable [`HttpTransport`] and [`SessionBackend`]
//! - Web chat: access-token bootstrap, presence logon, long poll, send
//!
//! ```rust,no_run
//! use geyser_client::{Client, Config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client    = Client::new(Config::default())?;
//! let mut login = client.login("alice", "secret").await?;
//! if !login.complete {
//!     login.guard_code = Some("ABCDE".into());
//!     login.attempt().await?;
//! }
//! client.save_session()?;
//!
//! let mut chat = client.chat().await?;
//! loop {
//!     match chat.poll().await {
//!         Ok(batch) => for m in batch.messages { println!("{m:?}"); },
//!         Err(e) if e.is_timeout() => continue,
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! # }
//! ```

#![deny(unsafe_code)]

mod chat;
pub mod cookies;
mod errors;
mod login;
pub mod message;
mod session;
pub mod session_backend;
pub mod transport;

pub use chat::{ChatSession, extract_access_token};
pub use cookies::{CookieJar, StoredCookie};
pub use errors::{ChatError, InvocationError, LoginError};
pub use login::{Challenge, LoginAttempt, Prompter};
pub use message::{Message, MessageHeader, PersonaStateMessage, PollBatch, TextMessage, UnknownMessage};
pub use session::SessionData;
pub use session_backend::{InMemoryBackend, JsonFileBackend, SessionBackend};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

pub use geyser_ids::{AccountType, SteamId, Universe};
pub use url::Url;

use std::sync::{Arc, LazyLock};
use std::time::Duration;

// ─── Endpoints ────────────────────────────────────────────────────────────────

/// Steam Community: login, CAPTCHA images, chat page. Session cookies are scoped here.
pub static COMMUNITY_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://steamcommunity.com/").expect("static community URL is valid")
});

/// Steam Web API host serving the presence / chat endpoints.
pub static API_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.steampowered.com/").expect("static API URL is valid")
});

// ─── Config ───────────────────────────────────────────────────────────────────

/// Configuration for [`Client::new`].
///
/// Base URLs must end with `/`; endpoint paths are joined onto them.
#[derive(Clone)]
pub struct Config {
    pub community_url:   Url,
    pub api_url:         Url,
    /// Per-request timeout. Must exceed the 35 s long-poll wait.
    pub timeout:         Duration,
    pub user_agent:      String,
    /// Session persistence backend (default: JSON file `"geyser.session.json"`).
    pub session_backend: Arc<dyn SessionBackend>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            community_url:   COMMUNITY_URL.clone(),
            api_url:         API_URL.clone(),
            timeout:         Duration::from_secs(60),
            user_agent:      concat!("geyser/", env!("CARGO_PKG_VERSION")).to_string(),
            session_backend: Arc::new(JsonFileBackend::new("geyser.session.json")),
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

struct ClientInner<T> {
    transport: T,
    config:    Config,
}

/// A Steam Community web session. Cheap to clone; internally Arc-wrapped.
pub struct Client<T: HttpTransport = ReqwestTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: HttpTransport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl Client<ReqwestTransport> {
    /// Build a client over `reqwest`, restoring any session the backend holds.
    pub fn new(config: Config) -> Result<Self, InvocationError> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> Client<T> {
    /// Build a client over a custom transport, restoring any session the backend holds.
    pub fn with_transport(config: Config, transport: T) -> Result<Self, InvocationError> {
        let client = Self { inner: Arc::new(ClientInner { transport, config }) };

        let backend = &client.inner.config.session_backend;
        if let Some(data) = backend.load()? {
            client.restore_session(&data);
            tracing::info!(
                "[geyser] Restored session ({} cookies) from {}",
                data.cookies.len(),
                backend.name()
            );
        }
        Ok(client)
    }

    pub fn config(&self) -> &Config { &self.inner.config }

    pub fn transport(&self) -> &T { &self.inner.transport }

    pub fn jar(&self) -> &CookieJar { self.inner.transport.jar() }

    pub(crate) fn community_endpoint(&self, path: &str) -> Result<Url, InvocationError> {
        Ok(self.inner.config.community_url.join(path)?)
    }

    pub(crate) fn api_endpoint(&self, path: &str) -> Result<Url, InvocationError> {
        Ok(self.inner.config.api_url.join(path)?)
    }

    // ── Session ────────────────────────────────────────────────────────────

    /// Every cookie belonging to the community domain.
    pub fn export_session(&self) -> SessionData {
        let host = self.inner.config.community_url.host_str().unwrap_or_default();
        SessionData { cookies: self.jar().cookies_in_domain(host) }
    }

    /// Seed the jar from a previously exported session.
    pub fn restore_session(&self, data: &SessionData) {
        for c in &data.cookies {
            self.jar().insert(c.clone());
        }
    }

    /// Write [`Client::export_session`] to the configured backend.
    pub fn save_session(&self) -> Result<(), InvocationError> {
        let backend = &self.inner.config.session_backend;
        backend.save(&self.export_session())?;
        tracing::info!("[geyser] Session saved to {} ✓", backend.name());
        Ok(())
    }

    /// The session token: the percent-decoded `sessionid` cookie.
    ///
    /// Always derived from the jar, never cached.
    pub fn session_token(&self) -> Option<String> {
        self.jar()
            .get(&self.inner.config.community_url, "sessionid")
            .map(|v| percent_encoding::percent_decode_str(&v).decode_utf8_lossy().into_owned())
    }

    /// [`Client::session_token`], asking the community root for a fresh
    /// `sessionid` cookie once if the jar has none.
    pub async fn ensure_session_token(&self) -> Result<String, LoginError> {
        if let Some(sid) = self.session_token() {
            return Ok(sid);
        }
        let root = self.inner.config.community_url.clone();
        self.inner.transport.get(root).await?;
        self.session_token().ok_or(LoginError::NoSessionToken)
    }

    /// Log out server-side, then drop the local cookies and stored session.
    pub async fn logout(&self) -> Result<(), LoginError> {
        let sid = self.ensure_session_token().await?;
        let url = self.community_endpoint("login/logout")?;
        self.inner.transport
            .post_form(url, &[("sessionid", sid)])
            .await?
            .error_for_status()?;

        self.jar().clear();
        self.inner.config.session_backend.delete().map_err(InvocationError::Io)?;
        tracing::info!("[geyser] Logged out ✓");
        Ok(())
    }
}
