pub mod types;
pub mod url;

pub use types::{ClassifierVerdict, RegistrationSignal, Verdict};
pub use url::UrlInput;
