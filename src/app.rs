use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, time::timeout};

use crate::{
    config::AppConfig,
    detection::DetectionService,
    http,
    infrastructure::shutdown::Shutdown,
    model::ClassifierScorer,
    whois::{RegistrationAgeSignal, WhoisXmlClient},
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PhishGuardApp {
    config: Arc<AppConfig>,
    service: Arc<DetectionService<WhoisXmlClient>>,
    shutdown: Shutdown,
}

impl PhishGuardApp {
    pub fn initialize(config: AppConfig, shutdown: Shutdown) -> Result<Self> {
        let config = Arc::new(config);

        let scorer = ClassifierScorer::load(&config.model.path).with_context(|| {
            format!(
                "failed to load classifier model {}",
                config.model.path.display()
            )
        })?;

        if config.whois.api_key.is_none() {
            tracing::warn!(
                target: "whois",
                "WHOIS_API_KEY is not set; every registration check will be indeterminate"
            );
        }

        let http_client = Client::builder()
            .user_agent(format!("phishguard/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.whois.timeout)
            .build()?;
        let whois = WhoisXmlClient::new(http_client, config.whois.clone());
        let registration = RegistrationAgeSignal::new(whois, &config.registration, &config.whois);

        tracing::info!(
            target: "app",
            threshold_days = config.registration.recent_threshold.num_days(),
            policy = ?config.registration.failure_policy,
            timeout_ms = config.whois.timeout.as_millis() as u64,
            retries = config.whois.max_retries,
            "registration check configured"
        );

        let service = Arc::new(DetectionService::new(Arc::new(scorer), registration));

        Ok(Self {
            config,
            service,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let PhishGuardApp {
            config,
            service,
            shutdown,
        } = self;

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.bind_addr))?;
        tracing::info!(target: "app", addr = %config.bind_addr, "phishguard listening");

        let server = axum::serve(listener, http::router(service))
            .with_graceful_shutdown(shutdown.subscribe().wait());
        let mut server_handle = tokio::spawn(async move { server.await });

        let mut shutdown_listener = shutdown.subscribe();
        tokio::select! {
            _ = shutdown_listener.notified() => {
                tracing::info!(target: "app", "shutdown requested (CTRL+C / SIGTERM)");
            }
            res = &mut server_handle => {
                res.context("http server task panicked")?
                    .context("http server stopped unexpectedly")?;
                tracing::info!(target: "app", "http server stopped");
                return Ok(());
            }
        }

        match timeout(SHUTDOWN_TIMEOUT, &mut server_handle).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(err))) => {
                tracing::error!(target: "app", error = %err, "http server failed while draining");
            }
            Ok(Err(err)) => {
                tracing::error!(target: "app", error = %err, "http server task panicked");
            }
            Err(_) => {
                tracing::warn!(
                    target: "app",
                    "http server did not drain within {:?}; aborting",
                    SHUTDOWN_TIMEOUT
                );
                server_handle.abort();
            }
        }

        tracing::info!(target: "app", "phishguard stopped");
        Ok(())
    }
}
