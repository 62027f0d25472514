use serde::{Deserialize, Serialize};

/// Output of the classifier for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierVerdict {
    pub label: bool,
    /// Phishing probability in `[0, 1]`, when the model provides one.
    pub score: Option<f32>,
}

/// Outcome of the registration-age check.
///
/// `determinate == false` means the provider could not answer; the value of
/// `recently_registered` then comes from the configured failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationSignal {
    pub recently_registered: bool,
    pub determinate: bool,
}

impl RegistrationSignal {
    pub fn determined(recently_registered: bool) -> Self {
        Self {
            recently_registered,
            determinate: true,
        }
    }

    pub fn indeterminate(recently_registered: bool) -> Self {
        Self {
            recently_registered,
            determinate: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_phishing: bool,
    pub reasons: Vec<String>,
}
