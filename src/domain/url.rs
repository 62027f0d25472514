use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use url::{Host, Url};

use crate::error::DetectionError;

static SCHEME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"));

/// A submitted URL, parsed once per request.
///
/// Lexical features are computed from `raw`; the host is what the registration
/// check looks up. Inputs the URL parser rejects still get a host from a plain
/// lexical split so every non-empty string can be featurized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInput {
    raw: String,
    scheme: Option<String>,
    host: String,
    path: String,
    ip_host: bool,
}

impl UrlInput {
    pub fn parse(raw: &str) -> Result<Self, DetectionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DetectionError::InvalidInput(
                "url must be a non-empty string".to_string(),
            ));
        }

        let has_scheme = SCHEME_REGEX.is_match(trimmed);
        let candidate = if has_scheme {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        match Url::parse(&candidate) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => {
                let ip_host = matches!(url.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)));
                Ok(Self {
                    raw: trimmed.to_string(),
                    scheme: has_scheme.then(|| url.scheme().to_string()),
                    host: url.host_str().unwrap_or_default().to_ascii_lowercase(),
                    path: url.path().to_string(),
                    ip_host,
                })
            }
            _ => Ok(Self::lexical(trimmed)),
        }
    }

    fn lexical(trimmed: &str) -> Self {
        let (scheme, rest) = match SCHEME_REGEX.find(trimmed) {
            Some(m) => (
                Some(trimmed[..m.end() - 3].to_ascii_lowercase()),
                &trimmed[m.end()..],
            ),
            None => (None, trimmed),
        };

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        let tail = &rest[authority_end..];

        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let host = if host_port.starts_with('[') {
            host_port
                .find(']')
                .map(|end| &host_port[..=end])
                .unwrap_or(host_port)
        } else {
            host_port.split(':').next().unwrap_or(host_port)
        }
        .to_ascii_lowercase();

        let (before_fragment, _) = tail.split_once('#').unwrap_or((tail, ""));
        let path = before_fragment
            .split_once('?')
            .map_or(before_fragment, |(path, _)| path);

        let ip_host = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok();

        Self {
            raw: trimmed.to_string(),
            scheme,
            host,
            path: path.to_string(),
            ip_host,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Scheme as written by the caller, `None` when the input had none.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_ip_host(&self) -> bool {
        self.ip_host
    }

    /// Domain name to send to the registration-data provider.
    ///
    /// `None` for IP literals and hosts without a dot, which have no
    /// registration record to look up.
    pub fn lookup_domain(&self) -> Option<String> {
        if self.ip_host {
            return None;
        }
        let host = self.host.trim_end_matches('.');
        let host = host.strip_prefix("www.").unwrap_or(host);
        if host.is_empty() || !host.contains('.') {
            return None;
        }
        Some(host.to_string())
    }
}
