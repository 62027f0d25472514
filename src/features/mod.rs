mod extractor;
pub mod layout;

#[cfg(test)]
pub use extractor::extract_url;
pub use extractor::{extract, FeatureVector};
pub use layout::{FEATURE_LAYOUT, FEATURE_VERSION};
