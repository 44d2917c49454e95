//! Error types for geyser-client.
//!
//! Three layers, matching where a failure can originate:
//! [`InvocationError`] for the HTTP exchange itself, [`LoginError`] for the
//! authentication flow and [`ChatError`] for the messaging protocol.

use std::{fmt, io};

use geyser_crypto::RsaError;

// ─── InvocationError ──────────────────────────────────────────────────────────

/// A failure talking to the web endpoints, independent of what was asked.
#[derive(Debug)]
pub enum InvocationError {
    /// Network / TLS / timeout failure from the HTTP client.
    Http(reqwest::Error),
    /// The server answered with a non-success HTTP status.
    Status(u16),
    /// The response body was not what the endpoint is documented to return.
    Deserialize(String),
    /// An endpoint URL could not be built from the configured base.
    Url(url::ParseError),
    /// Local I/O (session persistence).
    Io(io::Error),
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e)        => write!(f, "HTTP error: {e}"),
            Self::Status(code)   => write!(f, "HTTP status {code}"),
            Self::Deserialize(s) => write!(f, "deserialize error: {s}"),
            Self::Url(e)         => write!(f, "invalid endpoint URL: {e}"),
            Self::Io(e)          => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for InvocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Url(e)  => Some(e),
            Self::Io(e)   => Some(e),
            _             => None,
        }
    }
}

impl From<reqwest::Error> for InvocationError {
    fn from(e: reqwest::Error) -> Self { Self::Http(e) }
}

impl From<serde_json::Error> for InvocationError {
    fn from(e: serde_json::Error) -> Self { Self::Deserialize(e.to_string()) }
}

impl From<url::ParseError> for InvocationError {
    fn from(e: url::ParseError) -> Self { Self::Url(e) }
}

impl From<io::Error> for InvocationError {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}

impl InvocationError {
    /// `true` if the HTTP client gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

// ─── LoginError ───────────────────────────────────────────────────────────────

/// Errors returned by [`crate::Client::login`] and [`crate::LoginAttempt`].
#[derive(Debug)]
pub enum LoginError {
    /// The key-retrieval endpoint reported failure (e.g. unknown account).
    KeyFetchFailed,
    /// The RSA key was malformed or the password could not be encrypted.
    EncryptionFailed(RsaError),
    /// No `sessionid` cookie could be found after a login round trip.
    NoSessionToken,
    /// Nothing left to answer and the login is not complete: the username or
    /// password is wrong. Carries the server's message, if any.
    LoginFailed { message: String },
    /// The interactive collaborator failed to read input.
    Prompt(io::Error),
    /// Any other error.
    Other(InvocationError),
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyFetchFailed      => write!(f, "RSA key retrieval returned failure"),
            Self::EncryptionFailed(e) => write!(f, "password encryption failed: {e}"),
            Self::NoSessionToken      => write!(f, "could not get sessionid cookie, ensure logged in"),
            Self::LoginFailed { message } if message.is_empty() => {
                write!(f, "login failed with no CAPTCHA or Steam Guard to complete, verify username & password")
            }
            Self::LoginFailed { message } => write!(f, "login failed: {message}"),
            Self::Prompt(e)           => write!(f, "prompt failed: {e}"),
            Self::Other(e)            => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoginError {}

impl From<InvocationError> for LoginError {
    fn from(e: InvocationError) -> Self { Self::Other(e) }
}

impl From<RsaError> for LoginError {
    fn from(e: RsaError) -> Self { Self::EncryptionFailed(e) }
}

// ─── ChatError ────────────────────────────────────────────────────────────────

/// Errors returned by [`crate::ChatSession`] operations.
#[derive(Debug)]
pub enum ChatError {
    /// The chat page carried no access token: the page format changed or the
    /// client is not logged in.
    NoAuthToken,
    /// The server replied with a status other than `OK`.
    Status(String),
    /// Any other error.
    Other(InvocationError),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAuthToken => write!(
                f,
                "steam chat: could not retrieve chat auth token, the format may have changed or you may not be logged in"
            ),
            Self::Status(s)   => write!(f, "steam chat: {s}"),
            Self::Other(e)    => write!(f, "steam chat: {e}"),
        }
    }
}

impl std::error::Error for ChatError {}

impl From<InvocationError> for ChatError {
    fn from(e: InvocationError) -> Self { Self::Other(e) }
}

impl ChatError {
    /// `true` for the status a long poll reports when nothing arrived in time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Status(s) => s == "Timeout",
            Self::Other(e)  => e.is_timeout(),
            _               => false,
        }
    }

    /// The server-reported status string, if this is a protocol-status error.
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Status(s) => Some(s),
            _               => None,
        }
    }
}
