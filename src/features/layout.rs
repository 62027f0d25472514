//! Feature layout shared by the extractor and the classifier artifact.
//!
//! The artifact declares the same names in the same order; any change here
//! needs a re-exported model and a bumped `FEATURE_VERSION`.

pub const FEATURE_VERSION: u8 = 1;

pub const FEATURE_LAYOUT: &[&str] = &[
    "having_ip_address",        // 0: host is an IP literal (1) or not (-1)
    "url_length",               // 1: <54 (-1), 54..=75 (0), >75 (1)
    "shortening_service",       // 2: known shortener host
    "having_at_symbol",         // 3: '@' anywhere in the url
    "double_slash_redirecting", // 4: last "//" past position 7
    "prefix_suffix",            // 5: '-' in host
    "having_sub_domain",        // 6: one dot (-1), two (0), more (1)
    "ssl_final_state",          // 7: https (-1) or not (1)
    "https_token",              // 8: "http"/"https" inside the host
    "suspicious_keywords",      // 9: count of phishing bait tokens
    "special_char_count",       // 10: count of non-alphanumeric chars other than ./:
    "subdomain_depth",          // 11: labels beyond the registrable pair
    "percent_encoding",         // 12: %XX escapes present
    "redirect_parameter",       // 13: url=/redirect=/goto=... query keys
    "host_digit_ratio",         // 14: digits / host length
    "path_depth",               // 15: non-empty path segments
];

pub const FEATURE_COUNT: usize = 16;
