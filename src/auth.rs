use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Identity};
use std::str::FromStr;
use url::Url;

use crate::config::Source;
use crate::error::{Result, SpinnakerError};

const USER_AGENT: &str = concat!("spinnaker-resource/", env!("CARGO_PKG_VERSION"));

/// Supported ways of authenticating against the Spinnaker gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Ldap,
    X509,
}

impl FromStr for AuthMethod {
    type Err = SpinnakerError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("ldap") {
            Ok(Self::Ldap)
        } else if s.eq_ignore_ascii_case("x509") {
            Ok(Self::X509)
        } else {
            Err(SpinnakerError::Config("auth_method must be set".to_string()))
        }
    }
}

impl AuthMethod {
    /// Resolve the method from a source; a missing tag is treated like an unknown one.
    pub fn from_source(source: &Source) -> Result<Self> {
        source.auth_method.as_deref().unwrap_or("").parse()
    }
}

/// Produces an HTTP client already carrying the credentials the gateway expects.
pub trait AuthProvider {
    fn client(&self, base_url: &Url) -> Result<Client>;
}

/// Username/password authentication, sent as HTTP Basic on every request.
pub struct LdapAuth {
    username: String,
    password: String,
}

impl LdapAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl AuthProvider for LdapAuth {
    fn client(&self, base_url: &Url) -> Result<Client> {
        if self.username.is_empty() {
            return Err(SpinnakerError::Auth(
                "ldap_username is required for ldap authentication".to_string(),
            ));
        }

        let credentials = STANDARD.encode(format!("{}:{}", self.username, self.password));
        let mut value = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| SpinnakerError::Auth(format!("Invalid ldap credentials: {e}")))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        log::debug!("Building ldap-authenticated client for {base_url}");

        Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| SpinnakerError::Auth(format!("Failed to create HTTP client: {e}")))
    }
}

/// Mutual-TLS authentication with a PEM client certificate and key.
pub struct X509Auth {
    cert: String,
    key: String,
}

impl X509Auth {
    pub fn new(cert: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }
}

impl AuthProvider for X509Auth {
    fn client(&self, base_url: &Url) -> Result<Client> {
        if self.cert.trim().is_empty() || self.key.trim().is_empty() {
            return Err(SpinnakerError::Auth(
                "x509_cert and x509_key are required for x509 authentication".to_string(),
            ));
        }

        let bundle = format!("{}\n{}\n", self.cert.trim_end(), self.key.trim_end());
        let identity = Identity::from_pem(bundle.as_bytes())
            .map_err(|e| SpinnakerError::Auth(format!("Invalid x509 certificate or key: {e}")))?;

        log::debug!("Building x509-authenticated client for {base_url}");

        Client::builder()
            .user_agent(USER_AGENT)
            .identity(identity)
            .build()
            .map_err(|e| SpinnakerError::Auth(format!("Failed to create HTTP client: {e}")))
    }
}

/// Pick the provider for `method`, pulling its credentials out of `source`.
pub fn provider_for(method: AuthMethod, source: &Source) -> Box<dyn AuthProvider> {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    match method {
        AuthMethod::Ldap => Box::new(LdapAuth::new(
            field(&source.ldap_username),
            field(&source.ldap_password),
        )),
        AuthMethod::X509 => Box::new(X509Auth::new(
            field(&source.x509_cert),
            field(&source.x509_key),
        )),
    }
}
