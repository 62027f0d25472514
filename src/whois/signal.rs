use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time::timeout;

use crate::{
    config::{FailurePolicy, RegistrationConfig, WhoisConfig},
    domain::{RegistrationSignal, UrlInput},
};

use super::{LookupError, RegistrationProvider};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Turns a registration lookup into the "recently registered" signal.
///
/// Never fails: lookup errors become an indeterminate signal whose value is
/// decided by the configured failure policy.
pub struct RegistrationAgeSignal<P> {
    provider: P,
    recent_threshold: chrono::Duration,
    failure_policy: FailurePolicy,
    timeout: Duration,
    max_retries: u32,
    clock: Clock,
}

impl<P: RegistrationProvider> RegistrationAgeSignal<P> {
    pub fn new(provider: P, registration: &RegistrationConfig, whois: &WhoisConfig) -> Self {
        Self {
            provider,
            recent_threshold: registration.recent_threshold,
            failure_policy: registration.failure_policy,
            timeout: whois.timeout,
            max_retries: whois.max_retries,
            clock: Arc::new(Utc::now),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn check_age(&self, url: &UrlInput) -> RegistrationSignal {
        let Some(domain) = url.lookup_domain() else {
            tracing::debug!(
                target: "whois",
                host = %url.host(),
                "host has no registrable domain; skipping lookup"
            );
            return self.indeterminate();
        };

        match self.lookup(&domain).await {
            Ok(created) => {
                let now = (self.clock)();
                let recent = is_recent(created, now, self.recent_threshold);
                tracing::debug!(
                    target: "whois",
                    domain = %domain,
                    created = %created,
                    recent,
                    "registration date resolved"
                );
                RegistrationSignal::determined(recent)
            }
            Err(err) => {
                tracing::warn!(
                    target: "whois",
                    domain = %domain,
                    error = %err,
                    policy = ?self.failure_policy,
                    "registration lookup failed; signal is indeterminate"
                );
                self.indeterminate()
            }
        }
    }

    async fn lookup(&self, domain: &str) -> Result<DateTime<Utc>, LookupError> {
        let mut attempt = 0;
        loop {
            let result = match timeout(self.timeout, self.provider.creation_date(domain)).await {
                Ok(result) => result,
                Err(_) => Err(LookupError::Timeout),
            };
            match result {
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        target: "whois",
                        domain = %domain,
                        attempt,
                        error = %err,
                        "retrying registration lookup"
                    );
                }
                other => return other,
            }
        }
    }

    fn indeterminate(&self) -> RegistrationSignal {
        RegistrationSignal::indeterminate(self.failure_policy == FailurePolicy::Closed)
    }
}

/// A creation date in the future counts as registered just now.
fn is_recent(
    created: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: chrono::Duration,
) -> bool {
    let age = now.signed_duration_since(created).max(chrono::Duration::zero());
    age < threshold
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::whois::testing::{Behavior, FakeProvider};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn signal(
        behavior: Behavior,
        policy: FailurePolicy,
        max_retries: u32,
    ) -> RegistrationAgeSignal<Arc<FakeProvider>> {
        let provider = Arc::new(FakeProvider::new(behavior));
        RegistrationAgeSignal::new(
            provider,
            &RegistrationConfig {
                recent_threshold: chrono::Duration::days(180),
                failure_policy: policy,
            },
            &WhoisConfig {
                api_url: String::new(),
                api_key: Some("k".into()),
                timeout: Duration::from_millis(50),
                max_retries,
            },
        )
        .with_clock(Arc::new(now))
    }

    fn url(raw: &str) -> UrlInput {
        UrlInput::parse(raw).unwrap()
    }

    #[test]
    fn recency_is_relative_to_now() {
        let threshold = chrono::Duration::days(180);
        assert!(is_recent(now() - chrono::Duration::days(3), now(), threshold));
        assert!(!is_recent(now() - chrono::Duration::days(400), now(), threshold));
        assert!(!is_recent(now() - threshold, now(), threshold));
        assert!(is_recent(now() + chrono::Duration::days(2), now(), threshold));
        // Same calendar year as "now" but well past the threshold.
        let january = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        assert!(!is_recent(january, now(), threshold));
    }

    #[tokio::test]
    async fn new_domain_is_flagged() {
        let signal = signal(
            Behavior::Created(now() - chrono::Duration::days(10)),
            FailurePolicy::Open,
            0,
        );
        let result = signal
            .check_age(&url("http://paypa1-login.verify-account.com/update"))
            .await;
        assert_eq!(result, RegistrationSignal::determined(true));
    }

    #[tokio::test]
    async fn old_domain_is_not_flagged() {
        let signal = signal(
            Behavior::Created(Utc.with_ymd_and_hms(2001, 1, 13, 0, 0, 0).unwrap()),
            FailurePolicy::Open,
            0,
        );
        let result = signal.check_age(&url("https://www.wikipedia.org")).await;
        assert_eq!(result, RegistrationSignal::determined(false));
    }

    #[tokio::test]
    async fn failures_fail_open_by_default() {
        for behavior in [Behavior::Status(500), Behavior::Missing, Behavior::Hang] {
            let signal = signal(behavior, FailurePolicy::Open, 0);
            let result = signal.check_age(&url("https://www.wikipedia.org")).await;
            assert_eq!(result, RegistrationSignal::indeterminate(false));
        }
    }

    #[tokio::test]
    async fn failures_can_fail_closed() {
        let signal = signal(Behavior::Status(503), FailurePolicy::Closed, 0);
        let result = signal.check_age(&url("https://www.wikipedia.org")).await;
        assert_eq!(result, RegistrationSignal::indeterminate(true));
    }

    #[tokio::test]
    async fn ip_hosts_skip_the_provider() {
        let provider = Arc::new(FakeProvider::new(Behavior::Created(now())));
        let signal = RegistrationAgeSignal::new(
            provider.clone(),
            &RegistrationConfig {
                recent_threshold: chrono::Duration::days(180),
                failure_policy: FailurePolicy::Open,
            },
            &WhoisConfig {
                api_url: String::new(),
                api_key: None,
                timeout: Duration::from_millis(50),
                max_retries: 0,
            },
        );
        let result = signal.check_age(&url("http://203.0.113.9/login")).await;
        assert_eq!(result, RegistrationSignal::indeterminate(false));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn retries_only_transient_failures() {
        let provider = Arc::new(FakeProvider::new(Behavior::Status(500)));
        let signal = RegistrationAgeSignal::new(
            provider.clone(),
            &RegistrationConfig {
                recent_threshold: chrono::Duration::days(180),
                failure_policy: FailurePolicy::Open,
            },
            &WhoisConfig {
                api_url: String::new(),
                api_key: None,
                timeout: Duration::from_millis(50),
                max_retries: 2,
            },
        );
        signal.check_age(&url("https://example.com")).await;
        assert_eq!(provider.calls(), 3);

        let provider = Arc::new(FakeProvider::new(Behavior::Missing));
        let signal = RegistrationAgeSignal::new(
            provider.clone(),
            &RegistrationConfig {
                recent_threshold: chrono::Duration::days(180),
                failure_policy: FailurePolicy::Open,
            },
            &WhoisConfig {
                api_url: String::new(),
                api_key: None,
                timeout: Duration::from_millis(50),
                max_retries: 2,
            },
        );
        signal.check_age(&url("https://example.com")).await;
        assert_eq!(provider.calls(), 1);
    }
}
