//! Cookie storage shared by every request a [`crate::Client`] makes.
//!
//! The jar is also the session: exporting the cookies scoped to the community
//! domain and seeding them back into a fresh jar restores a login.

use std::sync::RwLock;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

// ─── StoredCookie ─────────────────────────────────────────────────────────────

fn root_path() -> String { "/".to_string() }

/// One cookie with the attributes needed to decide where it is sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name:      String,
    pub value:     String,
    /// Domain without a leading dot.
    pub domain:    String,
    /// Set when the server gave no `Domain` attribute: only the exact host matches.
    #[serde(default)]
    pub host_only: bool,
    #[serde(default = "root_path")]
    pub path:      String,
    #[serde(default)]
    pub secure:    bool,
    #[serde(default)]
    pub http_only: bool,
    /// `None` for a session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires:   Option<DateTime<Utc>>,
}

impl StoredCookie {
    /// A host-only session cookie with path `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name:      name.into(),
            value:     value.into(),
            domain:    host.into(),
            host_only: true,
            path:      root_path(),
            secure:    false,
            http_only: false,
            expires:   None,
        }
    }

    /// Parse a `Set-Cookie` header value received from `url`.
    ///
    /// Returns `None` for malformed headers and for a `Domain` attribute the
    /// responding host is not allowed to set.
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let c    = cookie::Cookie::parse(header).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();

        let (domain, host_only) = match c.domain() {
            Some(d) => {
                let d = d.trim_start_matches('.').to_ascii_lowercase();
                if !domain_match(&host, &d) {
                    return None;
                }
                (d, false)
            }
            None => (host, true),
        };

        let path = match c.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => default_path(url),
        };

        // Max-Age wins over Expires.
        let expires = match c.max_age() {
            Some(age) => Some(
                TimeDelta::try_seconds(age.whole_seconds())
                    .and_then(|d| Utc::now().checked_add_signed(d))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            None => c
                .expires_datetime()
                .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), 0)),
        };

        Some(Self {
            name:      c.name().to_string(),
            value:     c.value().to_string(),
            domain,
            host_only,
            path,
            secure:    c.secure().unwrap_or(false),
            http_only: c.http_only().unwrap_or(false),
            expires,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|e| e <= now)
    }

    /// Whether the cookie belongs to `host`, ignoring path and scheme.
    pub fn in_domain(&self, host: &str) -> bool {
        if self.host_only {
            host.eq_ignore_ascii_case(&self.domain)
        } else {
            domain_match(&host.to_ascii_lowercase(), &self.domain)
        }
    }

    /// Whether the cookie should be sent with a request to `url`.
    pub fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else { return false };
        if !self.in_domain(host) {
            return false;
        }
        if self.secure && url.scheme() != "https" {
            return false;
        }
        path_match(url.path(), &self.path)
    }

    fn same_slot(&self, other: &Self) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

fn domain_match(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

fn path_match(request: &str, cookie: &str) -> bool {
    if request == cookie {
        return true;
    }
    request.starts_with(cookie)
        && (cookie.ends_with('/') || request.as_bytes().get(cookie.len()) == Some(&b'/'))
}

fn default_path(url: &Url) -> String {
    let p = url.path();
    match p.rfind('/') {
        Some(0) | None => root_path(),
        Some(i)        => p[..i].to_string(),
    }
}

// ─── CookieJar ────────────────────────────────────────────────────────────────

/// Thread-safe cookie store.
///
/// Implements [`reqwest::cookie::CookieStore`] so the HTTP client reads and
/// writes it on every request, redirects included.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<Vec<StoredCookie>>,
}

impl CookieJar {
    pub fn new() -> Self { Self::default() }

    /// Insert or replace a cookie. An already-expired cookie deletes its slot.
    pub fn insert(&self, cookie: StoredCookie) {
        let mut jar = self.cookies.write().unwrap_or_else(|p| p.into_inner());
        jar.retain(|c| !c.same_slot(&cookie));
        if !cookie.is_expired(Utc::now()) {
            jar.push(cookie);
        }
    }

    /// Store a raw `Set-Cookie` header received from `url`.
    pub fn store_header(&self, header: &str, url: &Url) {
        match StoredCookie::parse(header, url) {
            Some(c) => self.insert(c),
            None    => tracing::debug!("[geyser] Ignoring unusable Set-Cookie from {}", url.host_str().unwrap_or("?")),
        }
    }

    /// Live cookies that would be sent to `url`, longest path first.
    pub fn cookies_for(&self, url: &Url) -> Vec<StoredCookie> {
        let now = Utc::now();
        let jar = self.cookies.read().unwrap_or_else(|p| p.into_inner());
        let mut out: Vec<_> = jar
            .iter()
            .filter(|c| !c.is_expired(now) && c.matches(url))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        out
    }

    /// Every live cookie belonging to `host`, whatever its path or secure flag.
    pub fn cookies_in_domain(&self, host: &str) -> Vec<StoredCookie> {
        let now = Utc::now();
        let jar = self.cookies.read().unwrap_or_else(|p| p.into_inner());
        jar.iter()
            .filter(|c| !c.is_expired(now) && c.in_domain(host))
            .cloned()
            .collect()
    }

    /// Value of the named cookie as it would be sent to `url`.
    pub fn get(&self, url: &Url, name: &str) -> Option<String> {
        self.cookies_for(url)
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }

    /// The `Cookie` request header for `url`, if any cookie applies.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies_for(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn len(&self) -> usize {
        self.cookies.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn clear(&self) {
        self.cookies.write().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for h in cookie_headers {
            if let Ok(s) = h.to_str() {
                self.store_header(s, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.header_for(url).and_then(|s| HeaderValue::from_str(&s).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url { Url::parse(s).unwrap() }

    #[test]
    fn host_only_cookie_stays_on_its_host() {
        let jar = CookieJar::new();
        jar.store_header("sessionid=abc; Path=/", &url("https://steamcommunity.com/login/dologin"));
        assert_eq!(jar.get(&url("https://steamcommunity.com/chat"), "sessionid").as_deref(), Some("abc"));
        assert_eq!(jar.get(&url("https://api.steamcommunity.com/"), "sessionid"), None);
    }

    #[test]
    fn domain_cookie_covers_subdomains() {
        let jar = CookieJar::new();
        jar.store_header("steamCountry=NL; Domain=.steamcommunity.com", &url("https://steamcommunity.com/"));
        assert!(jar.get(&url("https://help.steamcommunity.com/"), "steamCountry").is_some());
        assert!(jar.get(&url("https://notsteamcommunity.com/"), "steamCountry").is_none());
    }

    #[test]
    fn foreign_domain_is_rejected() {
        let jar = CookieJar::new();
        jar.store_header("evil=1; Domain=example.org", &url("https://steamcommunity.com/"));
        assert!(jar.is_empty());
    }

    #[test]
    fn secure_cookie_needs_https() {
        let jar = CookieJar::new();
        jar.store_header("steamLoginSecure=x; Secure; HttpOnly", &url("https://steamcommunity.com/"));
        assert!(jar.get(&url("http://steamcommunity.com/"), "steamLoginSecure").is_none());
        assert!(jar.get(&url("https://steamcommunity.com/"), "steamLoginSecure").is_some());
        assert_eq!(jar.cookies_in_domain("steamcommunity.com").len(), 1);
    }

    #[test]
    fn path_scoping() {
        let jar = CookieJar::new();
        jar.store_header("a=1; Path=/chat", &url("https://steamcommunity.com/"));
        assert!(jar.get(&url("https://steamcommunity.com/chat/friends"), "a").is_some());
        assert!(jar.get(&url("https://steamcommunity.com/chatter"), "a").is_none());
        assert!(jar.get(&url("https://steamcommunity.com/"), "a").is_none());
    }

    #[test]
    fn replacement_and_expiry() {
        let jar = CookieJar::new();
        let u = url("https://steamcommunity.com/");
        jar.store_header("sessionid=one", &u);
        jar.store_header("sessionid=two", &u);
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get(&u, "sessionid").as_deref(), Some("two"));

        jar.store_header("sessionid=gone; Max-Age=0", &u);
        assert!(jar.get(&u, "sessionid").is_none());
        assert!(jar.is_empty());
    }

    #[test]
    fn header_joins_cookies() {
        let jar = CookieJar::new();
        let u = url("https://steamcommunity.com/");
        jar.store_header("a=1", &u);
        jar.store_header("b=2", &u);
        let h = jar.header_for(&u).unwrap();
        assert!(h == "a=1; b=2" || h == "b=2; a=1");
    }
}
