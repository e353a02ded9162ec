//! Host normalization for reachability probes
//!
//! A configured host may arrive as a bare name (`example.com`), a name with
//! port (`example.com:8080`) or a full URL (`https://example.com/path`).
//! The resolver needs the bare host; the HTTP request needs a URL with a scheme.

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL format: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Missing host in URL")]
    MissingHost,
    #[error("Host is empty")]
    EmptyHost,
}

/// Normalized probe target derived from a configured host string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Bare host with scheme, credentials, port and path stripped
    pub host: String,
    /// Port used for the resolution pre-check
    pub port: u16,
    /// Scheme-qualified URL for the HTTP request
    pub url: String,
}

impl ProbeTarget {
    /// Parse a configured host into a probe target
    ///
    /// # Examples
    /// - `example.com` → host `example.com`, url `http://example.com`
    /// - `https://example.com/path` → host `example.com`, url `https://example.com/path`
    /// - `example.com:8080` → host `example.com`, port 8080, url `http://example.com:8080`
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UrlError::EmptyHost);
        }

        let url = build_probe_url(trimmed);
        let parsed = Url::parse(&url)?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(UrlError::MissingHost)?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = parsed.port_or_known_default().unwrap_or(80);

        Ok(Self { host, port, url })
    }
}

/// Whether the host string starts with a `scheme://` prefix
///
/// A `://` inside a path or query (`example.com/?next=http://...`) does not count.
pub fn has_scheme(host: &str) -> bool {
    let Some((scheme, _)) = host.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Prepend `http://` when no scheme is present
pub fn build_probe_url(host: &str) -> String {
    let trimmed = host.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
