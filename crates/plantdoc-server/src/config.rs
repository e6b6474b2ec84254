//! Server Configuration

use axum::http::Uri;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPSTREAM: &str = "http://localhost:38000";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid upstream URL {0:?}: expected http(s)://host[:port]")]
    InvalidUpstream(String),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Inference service the `/predict` prefix is forwarded to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upstream {
    /// Base URL without trailing slash, may carry a path prefix
    base: String,
    /// `scheme://authority`, used when rewriting `Origin`
    origin: String,
}

impl Upstream {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidUpstream(raw.to_string());

        let uri: Uri = raw.trim().parse().map_err(|_| invalid())?;
        let scheme = uri.scheme_str().ok_or_else(invalid)?;
        if scheme != "http" && scheme != "https" {
            return Err(invalid());
        }
        let authority = uri.authority().ok_or_else(invalid)?;

        let origin = format!("{scheme}://{authority}");
        let path = uri.path().trim_end_matches('/');

        Ok(Self {
            base: format!("{origin}{path}"),
            origin,
        })
    }

    /// Upstream URL for an incoming path and query
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base, path_and_query)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

/// Development server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub upstream: Upstream,
    /// Built frontend (index.html + wasm bundle)
    pub static_dir: String,
    /// Largest request body forwarded upstream
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            upstream: Upstream {
                base: DEFAULT_UPSTREAM.into(),
                origin: DEFAULT_UPSTREAM.into(),
            },
            static_dir: DEFAULT_STATIC_DIR.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read `BIND_ADDR`, `PREDICT_UPSTREAM`, `STATIC_DIR` and `MAX_UPLOAD_BYTES`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let upstream = match lookup("PREDICT_UPSTREAM") {
            Some(raw) => Upstream::parse(&raw)?,
            None => defaults.upstream,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            upstream,
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
            max_upload_bytes,
        })
    }
}
