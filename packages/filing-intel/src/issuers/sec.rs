//! Issuer lookup against the SEC submissions feed.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{FilingError, Result};
use crate::traits::issuer::IssuerInfoProvider;
use crate::types::metadata::IssuerInfo;

/// Base URL of the SEC submissions API.
pub const SEC_SUBMISSIONS_URL: &str = "https://data.sec.gov/submissions";

/// Looks up issuers by CIK on `data.sec.gov`.
///
/// The SEC rejects requests without a descriptive User-Agent, so one is
/// required at construction.
#[derive(Clone)]
pub struct SecSubmissionsProvider {
    client: Client,
    user_agent: String,
    base_url: String,
}

impl SecSubmissionsProvider {
    pub fn new(user_agent: impl Into<String>) -> Result<Self> {
        let user_agent = user_agent.into();
        if user_agent.trim().is_empty() {
            return Err(FilingError::Config("SEC user agent must not be empty".into()));
        }
        Ok(Self {
            client: Client::new(),
            user_agent,
            base_url: SEC_SUBMISSIONS_URL.to_string(),
        })
    }

    /// Set a custom base URL (for proxies and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Submissions URL for a CIK, zero-padded to ten digits.
    pub fn submissions_url(&self, cik: &str) -> Option<String> {
        let digits = cik.trim().trim_start_matches("CIK");
        if digits.is_empty() || digits.len() > 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(format!("{}/CIK{:0>10}.json", self.base_url, digits))
    }
}

#[async_trait]
impl IssuerInfoProvider for SecSubmissionsProvider {
    async fn lookup(&self, cik: &str) -> Result<Option<IssuerInfo>> {
        let Some(url) = self.submissions_url(cik) else {
            warn!(cik, "Not a numeric CIK, skipping issuer lookup");
            return Ok(None);
        };
        debug!(%url, "Fetching issuer submissions");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| FilingError::IssuerLookup(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(cik, status = status.as_u16(), "Issuer lookup returned no data");
            return Ok(None);
        }

        let info = response
            .json::<IssuerInfo>()
            .await
            .map_err(|e| FilingError::IssuerLookup(Box::new(e)))?;
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submissions_url_pads_cik() {
        let provider = SecSubmissionsProvider::new("test agent test@example.com").unwrap();
        assert_eq!(
            provider.submissions_url("320193").unwrap(),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
        assert_eq!(
            provider.submissions_url("0000320193").unwrap(),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
    }

    #[test]
    fn test_submissions_url_rejects_non_numeric() {
        let provider = SecSubmissionsProvider::new("agent").unwrap();
        assert!(provider.submissions_url("unknown").is_none());
        assert!(provider.submissions_url("").is_none());
        assert!(provider.submissions_url("12345678901").is_none());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        assert!(SecSubmissionsProvider::new(" ").is_err());
    }

    #[tokio::test]
    async fn test_non_numeric_cik_skips_request() {
        let provider = SecSubmissionsProvider::new("agent")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        assert!(provider.lookup("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_network_failure_is_lookup_error() {
        let provider = SecSubmissionsProvider::new("agent")
            .unwrap()
            .with_base_url("http://127.0.0.1:1/");
        let result = provider.lookup("320193").await;
        assert!(matches!(result, Err(FilingError::IssuerLookup(_))));
    }
}
