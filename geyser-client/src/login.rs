//! Web login: RSA key retrieval, encrypted password submission and
//! CAPTCHA / Steam Guard challenge resolution.
//!
//! [`Client::login`] fetches the key, encrypts the password and submits the
//! first attempt. If the returned [`LoginAttempt`] is not complete, fill in
//! what [`LoginAttempt::challenge`] asks for and call
//! [`LoginAttempt::attempt`] again, or hand the whole loop to
//! [`LoginAttempt::complete_with`] and a [`Prompter`].

use std::io;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use geyser_crypto::{PublicKey, encrypt_pkcs1v15};
use geyser_ids::SteamId;
use serde::Deserialize;

use crate::errors::LoginError;
use crate::transport::HttpTransport;
use crate::{Client, ReqwestTransport};

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RsaKeyResponse {
    #[serde(default)]
    success:        bool,
    #[serde(default)]
    publickey_mod:  String,
    #[serde(default)]
    publickey_exp:  String,
    #[serde(default)]
    timestamp:      String,
}

#[derive(Default, Deserialize)]
struct TransferParameters {
    #[serde(default)]
    steamid: Option<String>,
}

#[derive(Deserialize)]
struct DoLoginResponse {
    #[serde(default)]
    login_complete:      bool,
    #[serde(default)]
    captcha_needed:      bool,
    /// A string id, or `-1` when no CAPTCHA is pending.
    #[serde(default)]
    captcha_gid:         serde_json::Value,
    #[serde(default)]
    emailauth_needed:    bool,
    #[serde(default)]
    emaildomain:         Option<String>,
    #[serde(default)]
    emailsteamid:        Option<String>,
    #[serde(default)]
    transfer_parameters: TransferParameters,
    #[serde(default)]
    message:             String,
}

fn gid_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) if !s.is_empty() && s != "-1" => Some(s.clone()),
        serde_json::Value::Number(n) if n.as_i64() != Some(-1)     => Some(n.to_string()),
        _ => None,
    }
}

fn parse_steam_id(s: Option<&str>) -> Option<SteamId> {
    s.and_then(|s| s.parse::<SteamId>().ok()).filter(|id| id.as_u64() != 0)
}

// ─── Challenge ────────────────────────────────────────────────────────────────

/// What the server wants before the next [`LoginAttempt::attempt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Challenge {
    /// Nothing to answer.
    None,
    /// Solve the image at [`LoginAttempt::captcha_url`].
    Captcha,
    /// Enter the Steam Guard code sent by email / the mobile app.
    SecondFactor,
    /// Both of the above.
    Both,
}

// ─── Prompter ─────────────────────────────────────────────────────────────────

/// Interactive collaborator used by [`LoginAttempt::complete_with`].
pub trait Prompter {
    /// Show a server status message such as "Please verify your humanity".
    fn status(&self, message: &str) -> io::Result<()>;

    /// Show the CAPTCHA image URL and read the solution.
    fn captcha(&self, url: &str) -> io::Result<String>;

    /// Read a Steam Guard code. `email_domain` names where it was sent, if known.
    fn guard_code(&self, email_domain: Option<&str>) -> io::Result<String>;
}

// ─── LoginAttempt ─────────────────────────────────────────────────────────────

/// A complete or in-progress login.
///
/// If `complete` is false, fill `captcha_solution` and/or `guard_code`
/// according to [`LoginAttempt::challenge`] and call
/// [`LoginAttempt::attempt`] again.
pub struct LoginAttempt<T: HttpTransport = ReqwestTransport> {
    /// Login has completed, no extra input required.
    pub complete:         bool,
    /// Last status message from the server, e.g. "Please complete the captcha below".
    pub message:          String,
    /// Pending CAPTCHA id; see [`LoginAttempt::captcha_url`].
    pub captcha:          Option<String>,
    /// Solution for the pending CAPTCHA, sent with the next attempt.
    pub captcha_solution: Option<String>,
    /// A Steam Guard code is required for the login to continue.
    pub second_factor:    bool,
    /// Domain of the address the Steam Guard code was emailed to.
    pub email_domain:     Option<String>,
    /// Steam Guard code, sent with the next attempt.
    pub guard_code:       Option<String>,
    /// Name Steam Guard will remember this device by.
    pub device_name:      String,
    /// Account id, once the server has revealed it.
    pub steam_id:         Option<SteamId>,
    /// Session token derived after the most recent round trip.
    pub session_token:    String,

    username:      String,
    encrypted:     Vec<u8>,
    rsa_timestamp: String,
    client:        Client<T>,
}

impl<T: HttpTransport> std::fmt::Debug for LoginAttempt<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("username", &self.username)
            .field("complete", &self.complete)
            .field("message", &self.message)
            .field("captcha", &self.captcha)
            .field("second_factor", &self.second_factor)
            .field("email_domain", &self.email_domain)
            .field("steam_id", &self.steam_id)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> LoginAttempt<T> {
    pub fn username(&self) -> &str { &self.username }

    /// The RSA-encrypted password as submitted.
    pub fn encrypted_password(&self) -> &[u8] { &self.encrypted }

    /// Image URL for the pending CAPTCHA. Pure string formatting.
    pub fn captcha_url(&self) -> Option<String> {
        let gid     = self.captcha.as_ref()?;
        let mut url = self.client.community_endpoint("public/captcha.php").ok()?;
        url.query_pairs_mut().clear().append_pair("gid", gid);
        Some(url.to_string())
    }

    /// What must be supplied before the next attempt.
    pub fn challenge(&self) -> Challenge {
        match (self.captcha.is_some(), self.second_factor) {
            (false, false) => Challenge::None,
            (true,  false) => Challenge::Captcha,
            (false, true)  => Challenge::SecondFactor,
            (true,  true)  => Challenge::Both,
        }
    }

    /// Submit the credentials plus any filled-in challenge responses.
    ///
    /// Fails with [`LoginError::LoginFailed`] when the server neither accepts
    /// the login nor asks for anything more.
    pub async fn attempt(&mut self) -> Result<(), LoginError> {
        let url  = self.client.community_endpoint("login/dologin")?;
        let form = [
            ("username",          self.username.clone()),
            ("password",          BASE64.encode(&self.encrypted)),
            ("emailauth",         self.guard_code.clone().unwrap_or_default()),
            ("loginfriendlyname", self.device_name.clone()),
            ("captchaGID",        self.captcha.clone().unwrap_or_default()),
            ("captcha_text",      self.captcha_solution.clone().unwrap_or_default()),
            ("rsatimestamp",      self.rsa_timestamp.clone()),
            ("remember_login",    "false".to_string()),
        ];

        let rsp: DoLoginResponse = self.client.transport()
            .post_form(url, &form)
            .await?
            .error_for_status()?
            .json()?;

        self.complete      = rsp.login_complete;
        self.captcha       = if rsp.captcha_needed { gid_string(&rsp.captcha_gid) } else { None };
        self.second_factor = rsp.emailauth_needed;
        self.email_domain  = rsp.emaildomain.filter(|d| !d.is_empty());
        self.message       = rsp.message;
        // Answers are single-use; the next challenge needs fresh input.
        self.captcha_solution = None;
        self.guard_code       = None;

        if let Some(id) = parse_steam_id(rsp.transfer_parameters.steamid.as_deref())
            .or_else(|| parse_steam_id(rsp.emailsteamid.as_deref()))
        {
            self.steam_id = Some(id);
        }

        self.session_token = self.client.ensure_session_token().await?;

        if self.complete {
            tracing::info!("[geyser] Logged in as {} ✓", self.username);
            return Ok(());
        }

        match self.challenge() {
            Challenge::None => Err(LoginError::LoginFailed { message: self.message.clone() }),
            c => {
                tracing::info!("[geyser] Login needs {c:?}");
                Ok(())
            }
        }
    }

    /// Drive the login to completion, asking `prompter` for every answer.
    pub async fn complete_with(&mut self, prompter: &dyn Prompter) -> Result<(), LoginError> {
        while !self.complete {
            if !self.message.is_empty() {
                prompter.status(&self.message).map_err(LoginError::Prompt)?;
            }

            if self.challenge() == Challenge::None {
                return Err(LoginError::LoginFailed { message: self.message.clone() });
            }

            if let Some(url) = self.captcha_url() {
                self.captcha_solution = Some(prompter.captcha(&url).map_err(LoginError::Prompt)?);
            }
            if self.second_factor {
                let code = prompter
                    .guard_code(self.email_domain.as_deref())
                    .map_err(LoginError::Prompt)?;
                self.guard_code = Some(code);
            }

            self.attempt().await?;
        }
        Ok(())
    }
}

// ─── Client entry point ───────────────────────────────────────────────────────

impl<T: HttpTransport> Client<T> {
    /// Fetch the account's RSA key, encrypt `password` and submit the first attempt.
    ///
    /// The returned attempt may still need a CAPTCHA or Steam Guard code.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginAttempt<T>, LoginError> {
        let (key, rsa_timestamp) = self.fetch_rsa_key(username).await?;
        let encrypted = encrypt_pkcs1v15(password.as_bytes(), &key)?;

        let mut attempt = LoginAttempt {
            complete:         false,
            message:          String::new(),
            captcha:          None,
            captcha_solution: None,
            second_factor:    false,
            email_domain:     None,
            guard_code:       None,
            device_name:      String::new(),
            steam_id:         None,
            session_token:    String::new(),
            username:         username.to_string(),
            encrypted,
            rsa_timestamp,
            client:           self.clone(),
        };
        attempt.attempt().await?;
        Ok(attempt)
    }

    async fn fetch_rsa_key(&self, username: &str) -> Result<(PublicKey, String), LoginError> {
        let url = self.community_endpoint("login/getrsakey")?;
        let rsp: RsaKeyResponse = self.transport()
            .post_form(url, &[("username", username.to_string())])
            .await?
            .error_for_status()?
            .json()?;

        if !rsp.success {
            return Err(LoginError::KeyFetchFailed);
        }
        let key = PublicKey::from_hex(&rsp.publickey_mod, &rsp.publickey_exp)?;
        tracing::info!("[geyser] RSA key fetched ({} bits)", key.size() * 8);
        Ok((key, rsp.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captcha_gid_forms() {
        assert_eq!(gid_string(&serde_json::json!("55")).as_deref(), Some("55"));
        assert_eq!(gid_string(&serde_json::json!(55)).as_deref(), Some("55"));
        assert_eq!(gid_string(&serde_json::json!(-1)), None);
        assert_eq!(gid_string(&serde_json::json!("-1")), None);
        assert_eq!(gid_string(&serde_json::Value::Null), None);
    }

    #[test]
    fn steam_id_fields_are_lenient() {
        assert_eq!(parse_steam_id(Some("76561197960287930")), Some(SteamId::user(22202)));
        assert_eq!(parse_steam_id(Some("")), None);
        assert_eq!(parse_steam_id(Some("0")), None);
        assert_eq!(parse_steam_id(None), None);
    }

    #[test]
    fn captcha_url_on_default_community() {
        let config = crate::Config {
            session_backend: std::sync::Arc::new(crate::InMemoryBackend::new()),
            ..Default::default()
        };
        let client = Client::new(config).unwrap();
        let mut login = LoginAttempt {
            complete:         false,
            message:          String::new(),
            captcha:          None,
            captcha_solution: None,
            second_factor:    false,
            email_domain:     None,
            guard_code:       None,
            device_name:      String::new(),
            steam_id:         None,
            session_token:    String::new(),
            username:         "alice".into(),
            encrypted:        Vec::new(),
            rsa_timestamp:    String::new(),
            client,
        };
        assert_eq!(login.captcha_url(), None);
        assert_eq!(login.challenge(), Challenge::None);

        login.captcha = Some("55".into());
        assert_eq!(
            login.captcha_url().as_deref(),
            Some("https://steamcommunity.com/public/captcha.php?gid=55")
        );
        login.second_factor = true;
        assert_eq!(login.challenge(), Challenge::Both);

        login.captcha = Some("a&b=c d".into());
        assert_eq!(
            login.captcha_url().as_deref(),
            Some("https://steamcommunity.com/public/captcha.php?gid=a%26b%3Dc+d")
        );
    }

    #[test]
    fn minimal_failure_response_decodes() {
        let rsp: DoLoginResponse = serde_json::from_str(r#"{"success":false,"message":"bad"}"#).unwrap();
        assert!(!rsp.login_complete && !rsp.captcha_needed && !rsp.emailauth_needed);
        assert_eq!(rsp.message, "bad");
    }
}
