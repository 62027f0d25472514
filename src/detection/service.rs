use std::sync::Arc;

use crate::{
    domain::{UrlInput, Verdict},
    error::DetectionError,
    features,
    model::ClassifierScorer,
    whois::{RegistrationAgeSignal, RegistrationProvider},
};

use super::fuser::fuse;

/// Runs one URL through extraction, scoring and the registration check.
///
/// Built once at startup and shared across requests; holds no per-request state.
pub struct DetectionService<P> {
    scorer: Arc<ClassifierScorer>,
    registration: RegistrationAgeSignal<P>,
}

impl<P: RegistrationProvider> DetectionService<P> {
    pub fn new(scorer: Arc<ClassifierScorer>, registration: RegistrationAgeSignal<P>) -> Self {
        Self {
            scorer,
            registration,
        }
    }

    pub fn scorer(&self) -> &ClassifierScorer {
        &self.scorer
    }

    pub async fn evaluate(&self, raw_url: &str) -> Result<Verdict, DetectionError> {
        let url = UrlInput::parse(raw_url)?;
        let vector = features::extract(&url);

        let (classified, registration) = tokio::join!(
            async { self.scorer.score(&vector) },
            self.registration.check_age(&url),
        );

        let classifier = classified.map_err(|err| {
            tracing::error!(target: "detection", error = %err, "classifier failed");
            DetectionError::ClassifierUnavailable(err.to_string())
        })?;

        let verdict = fuse(classifier, registration);
        tracing::info!(
            target: "detection",
            host = %url.host(),
            label = classifier.label,
            score = ?classifier.score,
            registration_determinate = registration.determinate,
            recently_registered = registration.recently_registered,
            is_phishing = verdict.is_phishing,
            "url evaluated"
        );
        Ok(verdict)
    }
}
