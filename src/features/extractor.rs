use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::UrlInput;
#[cfg(test)]
use crate::error::DetectionError;

use super::layout::FEATURE_COUNT;

static IP_LIKE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})|(0x[0-9a-fA-F]{1,2}\.){3}0x[0-9a-fA-F]{1,2}")
        .expect("valid ip regex")
});
static PERCENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[0-9a-fA-F]{2}").expect("valid percent-encoding regex"));
static REDIRECT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[?&](url|redirect|redir|redirect_uri|to|link|goto|next|return|continue)=")
        .expect("valid redirect regex")
});

const SHORTENERS: &[&str] = &[
    "bit.ly", "goo.gl", "tinyurl.com", "t.co", "ow.ly", "is.gd", "buff.ly", "adf.ly",
    "bitly.com", "cutt.ly", "rb.gy", "shorturl.at", "tiny.cc", "t.ly", "rebrand.ly",
    "bl.ink", "lnkd.in", "s.id", "v.gd", "qr.net",
];

const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login", "signin", "logon", "verify", "account", "update", "secure", "banking",
    "confirm", "password", "webscr", "ebayisapi", "wallet", "suspend", "unlock",
];

/// Immutable, fixed-width numeric encoding of one URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    #[cfg(test)]
    pub fn from_values(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
pub fn extract_url(raw: &str) -> Result<FeatureVector, DetectionError> {
    let url = UrlInput::parse(raw)?;
    Ok(extract(&url))
}

/// Builds the feature vector in `FEATURE_LAYOUT` order.
pub fn extract(url: &UrlInput) -> FeatureVector {
    let raw = url.as_str();
    let lower = raw.to_ascii_lowercase();
    let host = url.host();
    let bare_host = host.trim_end_matches('.');
    let bare_host = bare_host.strip_prefix("www.").unwrap_or(bare_host);
    let host_dots = bare_host.matches('.').count();

    let values = vec![
        flag(url.is_ip_host() || IP_LIKE_REGEX.is_match(host)),
        url_length(raw.chars().count()),
        flag(SHORTENERS.contains(&bare_host)),
        flag(raw.contains('@')),
        flag(raw.rfind("//").is_some_and(|pos| pos > 7)),
        flag(host.contains('-')),
        sub_domain_level(host_dots, url.is_ip_host()),
        if url.scheme() == Some("https") { -1.0 } else { 1.0 },
        flag(host.contains("http")),
        SUSPICIOUS_KEYWORDS
            .iter()
            .filter(|keyword| lower.contains(*keyword))
            .count() as f32,
        raw.chars()
            .filter(|ch| !ch.is_alphanumeric() && !matches!(ch, '.' | '/' | ':'))
            .count() as f32,
        if url.is_ip_host() {
            0.0
        } else {
            host_dots.saturating_sub(1) as f32
        },
        flag(PERCENT_REGEX.is_match(raw)),
        flag(REDIRECT_REGEX.is_match(raw)),
        digit_ratio(host),
        url.path().split('/').filter(|segment| !segment.is_empty()).count() as f32,
    ];

    debug_assert_eq!(values.len(), FEATURE_COUNT);
    tracing::trace!(target: "features", host = %host, ?values, "features extracted");
    FeatureVector(values)
}

fn flag(condition: bool) -> f32 {
    if condition {
        1.0
    } else {
        -1.0
    }
}

fn url_length(len: usize) -> f32 {
    if len < 54 {
        -1.0
    } else if len <= 75 {
        0.0
    } else {
        1.0
    }
}

fn sub_domain_level(dots: usize, ip_host: bool) -> f32 {
    if ip_host {
        return 1.0;
    }
    match dots {
        0 | 1 => -1.0,
        2 => 0.0,
        _ => 1.0,
    }
}

fn digit_ratio(host: &str) -> f32 {
    let total = host.chars().count();
    if total == 0 {
        return 0.0;
    }
    let digits = host.chars().filter(|ch| ch.is_ascii_digit()).count();
    digits as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::layout::FEATURE_LAYOUT;

    fn feature(vector: &FeatureVector, name: &str) -> f32 {
        let index = FEATURE_LAYOUT
            .iter()
            .position(|n| *n == name)
            .expect("known feature");
        vector.as_slice()[index]
    }

    #[test]
    fn every_non_empty_input_has_full_width() {
        for raw in [
            "https://www.wikipedia.org",
            "wikipedia.org",
            "x",
            "::::",
            "http://",
            "/relative/path?q=1",
            "http://[::1]:8080/",
            "javascript:alert(1)",
            "ünïcödé.example/päth",
        ] {
            let vector = extract_url(raw).unwrap();
            assert_eq!(vector.len(), FEATURE_COUNT, "width for {raw:?}");
        }
    }

    #[test]
    fn empty_input_is_rejected_not_zeroed() {
        assert!(matches!(extract_url(""), Err(DetectionError::InvalidInput(_))));
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_url("http://paypa1-login.verify-account.com/update").unwrap();
        let b = extract_url("http://paypa1-login.verify-account.com/update").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn suspicious_url_features() {
        let v = extract_url("http://paypa1-login.verify-account.com/update").unwrap();
        assert_eq!(feature(&v, "having_ip_address"), -1.0);
        assert_eq!(feature(&v, "url_length"), -1.0);
        assert_eq!(feature(&v, "prefix_suffix"), 1.0);
        assert_eq!(feature(&v, "having_sub_domain"), 0.0);
        assert_eq!(feature(&v, "ssl_final_state"), 1.0);
        assert_eq!(feature(&v, "suspicious_keywords"), 4.0);
        assert_eq!(feature(&v, "subdomain_depth"), 1.0);
        assert_eq!(feature(&v, "path_depth"), 1.0);
        assert!(feature(&v, "host_digit_ratio") > 0.0);
    }

    #[test]
    fn benign_url_features() {
        let v = extract_url("https://www.wikipedia.org").unwrap();
        assert_eq!(feature(&v, "prefix_suffix"), -1.0);
        assert_eq!(feature(&v, "having_sub_domain"), -1.0);
        assert_eq!(feature(&v, "ssl_final_state"), -1.0);
        assert_eq!(feature(&v, "suspicious_keywords"), 0.0);
        assert_eq!(feature(&v, "subdomain_depth"), 0.0);
        assert_eq!(feature(&v, "double_slash_redirecting"), -1.0);
    }

    #[test]
    fn lexical_red_flags() {
        let v = extract_url(
            "http://198.51.100.7/x//y?redirect=https%3A%2F%2Fbank.example&user=a@b",
        )
        .unwrap();
        assert_eq!(feature(&v, "having_ip_address"), 1.0);
        assert_eq!(feature(&v, "having_at_symbol"), 1.0);
        assert_eq!(feature(&v, "double_slash_redirecting"), 1.0);
        assert_eq!(feature(&v, "percent_encoding"), 1.0);
        assert_eq!(feature(&v, "redirect_parameter"), 1.0);
        assert_eq!(feature(&v, "url_length"), 0.0);
    }

    #[test]
    fn shortener_hosts() {
        let v = extract_url("https://bit.ly/3xYz").unwrap();
        assert_eq!(feature(&v, "shortening_service"), 1.0);
    }
}
