//! Client configuration: target environment, endpoints, and display locale.

use std::time::Duration;

use parking_lot::RwLock;
use url::Url;

use crate::error::{Error, Result};

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("planora-client/", env!("CARGO_PKG_VERSION"));

const PRODUCTION_API_URL: &str = "https://api.planora.io";
const PRODUCTION_UPLOAD_URL: &str = "https://upload.planora.io";
const STAGING_API_URL: &str = "https://api.staging.planora.io";
const STAGING_UPLOAD_URL: &str = "https://upload.staging.planora.io";

/// Which backend deployment the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Production,
    Staging,
}

impl Environment {
    fn api_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_API_URL,
            Self::Staging => STAGING_API_URL,
        }
    }

    fn upload_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_UPLOAD_URL,
            Self::Staging => STAGING_UPLOAD_URL,
        }
    }
}

/// Display locale; the backend namespaces its API under a locale prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    De,
    Fr,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Fr => "fr",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "de" => Ok(Self::De),
            "fr" => Ok(Self::Fr),
            other => Err(Error::config(format!("Unknown locale: {}", other))),
        }
    }
}

/// Configurable options for the client.
#[derive(Debug)]
pub struct ClientConfig {
    /// Target deployment (selects API and upload hosts).
    pub environment: Environment,

    /// Explicit API base URL, overriding the environment host.
    pub api_url_override: Option<Url>,

    /// Explicit upload base URL, overriding the environment host.
    pub upload_url_override: Option<Url>,

    /// Active display locale. Endpoint resolution re-reads this on every
    /// request, so switching locale takes effect for the next call.
    active_locale: RwLock<Locale>,

    /// Overall timeout for a single HTTP request.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Debounce quiescence window for search coordinators.
    pub search_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            api_url_override: None,
            upload_url_override: None,
            active_locale: RwLock::new(Locale::default()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            search_debounce: Duration::from_millis(400),
        }
    }
}

impl ClientConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Default::default()
        }
    }

    /// Create a ClientConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PLANORA_ENV`: "production" (default) or "staging"
    /// - `PLANORA_API_URL`: explicit API base URL override
    /// - `PLANORA_UPLOAD_URL`: explicit upload base URL override
    /// - `PLANORA_LOCALE`: initial display locale (default: "en")
    pub fn from_env() -> Result<Self> {
        let environment = match std::env::var("PLANORA_ENV") {
            Ok(v) if v.trim().eq_ignore_ascii_case("staging") => Environment::Staging,
            _ => Environment::Production,
        };

        let mut config = Self::new(environment);

        if let Ok(raw) = std::env::var("PLANORA_API_URL") {
            config.api_url_override = Some(Url::parse(raw.trim())?);
        }
        if let Ok(raw) = std::env::var("PLANORA_UPLOAD_URL") {
            config.upload_url_override = Some(Url::parse(raw.trim())?);
        }
        if let Ok(raw) = std::env::var("PLANORA_LOCALE") {
            config.set_locale(raw.parse()?);
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, url: Url) -> Self {
        self.api_url_override = Some(url);
        self
    }

    pub fn with_upload_url(mut self, url: Url) -> Self {
        self.upload_url_override = Some(url);
        self
    }

    pub fn with_locale(self, locale: Locale) -> Self {
        self.set_locale(locale);
        self
    }

    /// Current display locale.
    pub fn locale(&self) -> Locale {
        *self.active_locale.read()
    }

    /// Switch the display locale; subsequent requests use the new prefix.
    pub fn set_locale(&self, locale: Locale) {
        *self.active_locale.write() = locale;
    }

    /// Host the API lives on, before the locale prefix is applied.
    pub fn api_host(&self) -> Result<Url> {
        match &self.api_url_override {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(self.environment.api_url())?),
        }
    }

    /// Resolve an API endpoint against the locale-prefixed base.
    ///
    /// Recomputed per call: the active locale is read here, never cached by
    /// the transport.
    pub fn api_endpoint(&self, path: &str) -> Result<Url> {
        let host = self.api_host()?;
        let prefix = format!("{}/api", self.locale().code());
        join_segments(host, &prefix, path)
    }

    /// Resolve an endpoint on the upload host (no locale prefix).
    pub fn upload_endpoint(&self, path: &str) -> Result<Url> {
        let host = match &self.upload_url_override {
            Some(url) => url.clone(),
            None => Url::parse(self.environment.upload_url())?,
        };
        join_segments(host, "", path)
    }
}

fn join_segments(base: Url, prefix: &str, path: &str) -> Result<Url> {
    let mut joined = base;
    {
        let mut segments = joined
            .path_segments_mut()
            .map_err(|_| Error::config("Base URL cannot be a base"))?;
        segments.pop_if_empty();
        for segment in prefix.split('/').chain(path.split('/')) {
            if !segment.is_empty() {
                segments.push(segment);
            }
        }
    }
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_are_locale_prefixed() {
        let config = ClientConfig::default();
        let url = config.api_endpoint("projects").unwrap();
        assert_eq!(url.as_str(), "https://api.planora.io/en/api/projects");
    }

    #[test]
    fn locale_switch_changes_next_resolution() {
        let config = ClientConfig::default();
        assert_eq!(
            config.api_endpoint("users").unwrap().path(),
            "/en/api/users"
        );

        config.set_locale(Locale::De);
        assert_eq!(
            config.api_endpoint("users").unwrap().path(),
            "/de/api/users"
        );
    }

    #[test]
    fn override_replaces_environment_host() {
        let config = ClientConfig::new(Environment::Staging)
            .with_api_url(Url::parse("http://127.0.0.1:8080").unwrap());
        let url = config.api_endpoint("auth/login").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/en/api/auth/login");
    }

    #[test]
    fn upload_endpoint_skips_locale_prefix() {
        let config = ClientConfig::default();
        let url = config.upload_endpoint("documents").unwrap();
        assert_eq!(url.as_str(), "https://upload.planora.io/documents");
    }

    #[test]
    fn locale_parsing() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(" de ".parse::<Locale>().unwrap(), Locale::De);
        assert!("xx".parse::<Locale>().is_err());
    }
}
