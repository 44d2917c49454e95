//! Pluggable HTTP transport.
//!
//! Every component issues its requests through [`HttpTransport`], which also
//! owns the [`CookieJar`] the session lives in. [`ReqwestTransport`] is the
//! default implementation.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use url::Url;

use crate::cookies::CookieJar;
use crate::errors::InvocationError;
use crate::Config;

// ─── HttpResponse ─────────────────────────────────────────────────────────────

/// A fully-read HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body:   String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with [`InvocationError::Status`] unless the status is 2xx.
    pub fn error_for_status(self) -> Result<Self, InvocationError> {
        if self.is_success() { Ok(self) } else { Err(InvocationError::Status(self.status)) }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, InvocationError> {
        serde_json::from_str(&self.body).map_err(InvocationError::from)
    }
}

// ─── Trait ────────────────────────────────────────────────────────────────────

/// A cookie-bearing HTTP client.
///
/// Implementations must store every `Set-Cookie` they receive in [`jar`] and
/// send the matching cookies with every request. A dropped request future
/// must leave no partial state behind beyond cookies already received.
///
/// [`jar`]: HttpTransport::jar
pub trait HttpTransport: Send + Sync + 'static {
    /// `GET url`, following redirects.
    fn get(&self, url: Url) -> impl Future<Output = Result<HttpResponse, InvocationError>> + Send;

    /// `POST url` with an `application/x-www-form-urlencoded` body.
    fn post_form(
        &self,
        url:  Url,
        form: &[(&str, String)],
    ) -> impl Future<Output = Result<HttpResponse, InvocationError>> + Send;

    /// The cookie store shared by all requests.
    fn jar(&self) -> &CookieJar;
}

// ─── ReqwestTransport ─────────────────────────────────────────────────────────

/// [`HttpTransport`] over a `reqwest` client using the jar as cookie provider.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    jar:  Arc<CookieJar>,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, InvocationError> {
        let jar  = Arc::new(CookieJar::new());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http, jar })
    }

    async fn read(rsp: reqwest::Response) -> Result<HttpResponse, InvocationError> {
        let status = rsp.status().as_u16();
        let body   = rsp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse, InvocationError> {
        tracing::debug!("[geyser] GET {}", url.path());
        let rsp = self.http.get(url).send().await?;
        Self::read(rsp).await
    }

    async fn post_form(&self, url: Url, form: &[(&str, String)]) -> Result<HttpResponse, InvocationError> {
        tracing::debug!("[geyser] POST {}", url.path());
        let rsp = self.http.post(url).form(form).send().await?;
        Self::read(rsp).await
    }

    fn jar(&self) -> &CookieJar { &self.jar }
}
