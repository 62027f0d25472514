use crate::domain::{ClassifierVerdict, RegistrationSignal, Verdict};

pub const CLASSIFIER_REASON: &str = "URL looks suspicious (ML Detection)";
pub const NEW_DOMAIN_REASON: &str = "Domain is too new (WHOIS Check)";
pub const UNVERIFIED_DOMAIN_REASON: &str = "Domain age could not be verified (WHOIS Check)";

/// Either signal alone flags the URL. Reasons keep classifier-then-registration order.
pub fn fuse(classifier: ClassifierVerdict, registration: RegistrationSignal) -> Verdict {
    let mut reasons = Vec::with_capacity(2);

    if classifier.label {
        reasons.push(CLASSIFIER_REASON.to_string());
    }
    if registration.recently_registered {
        let reason = if registration.determinate {
            NEW_DOMAIN_REASON
        } else {
            UNVERIFIED_DOMAIN_REASON
        };
        reasons.push(reason.to_string());
    }

    Verdict {
        is_phishing: classifier.label || registration.recently_registered,
        reasons,
    }
}
