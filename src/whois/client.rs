use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::config::WhoisConfig;

use super::{
    response::{build_query, parse_response},
    LookupError, RegistrationProvider,
};

/// WhoisXML API client.
#[derive(Clone)]
pub struct WhoisXmlClient {
    http: Client,
    config: WhoisConfig,
}

impl WhoisXmlClient {
    pub fn new(http: Client, config: WhoisConfig) -> Self {
        Self { http, config }
    }

    async fn fetch_creation_date(&self, domain: &str) -> Result<DateTime<Utc>, LookupError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingCredentials)?;

        let response = self
            .http
            .get(&self.config.api_url)
            .query(&build_query(domain, api_key))
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(LookupError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        parse_response(response).await
    }
}

impl RegistrationProvider for WhoisXmlClient {
    fn creation_date(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<DateTime<Utc>, LookupError>> + Send {
        self.fetch_creation_date(domain)
    }
}
