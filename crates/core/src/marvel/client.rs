//! HTTP client for the public character API.
//!
//! Requests are authenticated with `ts`/`apikey`/`hash` query parameters.
//! Every response is wrapped in `{ "data": { "results": [...] } }`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::types::{Character, Collection, Page};
use super::{CharacterSource, MarvelError};
use crate::config::MarvelConfig;
use crate::metrics::{REMOTE_REQUESTS, REMOTE_REQUEST_DURATION};
use crate::signer::RequestSigner;

/// Remote character API client.
pub struct MarvelClient {
    client: Client,
    base_url: String,
    signer: Option<RequestSigner>,
    listing_limit: u32,
}

impl MarvelClient {
    /// Create a new client.
    ///
    /// Missing keys do not fail construction; every request fails with
    /// [`MarvelError::NotConfigured`] instead.
    pub fn new(config: &MarvelConfig) -> Result<Self, MarvelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            signer: RequestSigner::from_config(config),
            listing_limit: config.collection_listing_limit,
        })
    }

    /// Whether both signing keys are present.
    pub fn is_configured(&self) -> bool {
        self.signer.is_some()
    }

    fn signer(&self) -> Result<&RequestSigner, MarvelError> {
        self.signer.as_ref().ok_or_else(|| {
            MarvelError::NotConfigured("public and private API keys are required".to_string())
        })
    }

    /// Issue a signed GET and unwrap the response envelope.
    async fn get_results<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<DataContainer<T>, MarvelError> {
        let signer = self.signer()?;
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let result = self.send(signer, &url, params).await;

        REMOTE_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());
        REMOTE_REQUESTS
            .with_label_values(&[endpoint, if result.is_ok() { "success" } else { "error" }])
            .inc();

        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        signer: &RequestSigner,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<DataContainer<T>, MarvelError> {
        let response = self
            .client
            .get(url)
            .query(&signer.query_params())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(MarvelError::NotConfigured(
                "API rejected the request signature".to_string(),
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarvelError::RateLimitExceeded);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(MarvelError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarvelError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let wrapper: DataWrapper<T> = response
            .json()
            .await
            .map_err(|e| MarvelError::Malformed(format!("Failed to parse response: {}", e)))?;

        wrapper.into_container()
    }
}

#[async_trait]
impl CharacterSource for MarvelClient {
    async fn list_collections(&self) -> Result<Vec<Collection>, MarvelError> {
        debug!("Listing collections: limit={}", self.listing_limit);

        let container: DataContainer<Collection> = self
            .get_results(
                "events",
                "/events",
                &[("limit", self.listing_limit.to_string())],
            )
            .await?;

        container.into_results()
    }

    async fn fetch_members(
        &self,
        collection_id: u64,
        offset: u32,
        limit: u32,
    ) -> Result<Page, MarvelError> {
        debug!(
            "Fetching members: collection={}, offset={}, limit={}",
            collection_id, offset, limit
        );

        let container: DataContainer<Character> = self
            .get_results(
                "event_characters",
                &format!("/events/{}/characters", collection_id),
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        let total = container.total;
        Ok(Page {
            offset,
            limit,
            total,
            results: container.into_results()?,
        })
    }

    async fn fetch_character(&self, id: u64) -> Result<Option<Character>, MarvelError> {
        debug!("Fetching character: id={}", id);

        let result: Result<DataContainer<Character>, _> = self
            .get_results("character", &format!("/characters/{}", id), &[])
            .await;

        match result {
            Ok(container) => Ok(container.into_results()?.into_iter().next()),
            Err(MarvelError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Response envelope (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct DataWrapper<T> {
    data: Option<DataContainer<T>>,
}

impl<T> DataWrapper<T> {
    fn into_container(self) -> Result<DataContainer<T>, MarvelError> {
        self.data
            .ok_or_else(|| MarvelError::Malformed("missing `data` envelope".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct DataContainer<T> {
    #[serde(default)]
    total: Option<u32>,
    results: Option<Vec<T>>,
}

impl<T> DataContainer<T> {
    fn into_results(self) -> Result<Vec<T>, MarvelError> {
        self.results
            .ok_or_else(|| MarvelError::Malformed("missing `data.results`".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> MarvelConfig {
        MarvelConfig {
            public_key: Some("pub".to_string()),
            private_key: Some("priv".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_without_keys_is_unconfigured() {
        let client = MarvelClient::new(&MarvelConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.signer(),
            Err(MarvelError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let mut config = configured();
        config.base_url = "http://localhost:1234/v1/public/".to_string();
        let client = MarvelClient::new(&config).unwrap();
        assert!(client.is_configured());
        assert_eq!(client.base_url, "http://localhost:1234/v1/public");
    }

    #[tokio::test]
    async fn test_unconfigured_calls_fail_without_network() {
        let client = MarvelClient::new(&MarvelConfig::default()).unwrap();

        assert!(matches!(
            client.list_collections().await,
            Err(MarvelError::NotConfigured(_))
        ));
        assert!(matches!(
            client.fetch_members(1, 0, 20).await,
            Err(MarvelError::NotConfigured(_))
        ));
        assert!(matches!(
            client.fetch_character(1).await,
            Err(MarvelError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_envelope_with_results() {
        let json = r#"{"code": 200, "data": {"offset": 0, "limit": 20, "total": 2, "count": 2,
            "results": [{"id": 1, "title": "Avengers: Age of Ultron"}, {"id": 2, "title": "Civil War"}]}}"#;
        let wrapper: DataWrapper<Collection> = serde_json::from_str(json).unwrap();
        let container = wrapper.into_container().unwrap();
        assert_eq!(container.total, Some(2));
        let results = container.into_results().unwrap();
        assert_eq!(results[0].title, "Avengers: Age of Ultron");
    }

    #[test]
    fn test_envelope_missing_data_is_malformed() {
        let wrapper: DataWrapper<Collection> =
            serde_json::from_str(r#"{"code": 200, "status": "Ok"}"#).unwrap();
        assert!(matches!(
            wrapper.into_container(),
            Err(MarvelError::Malformed(_))
        ));
    }

    #[test]
    fn test_envelope_missing_results_is_malformed() {
        let wrapper: DataWrapper<Collection> =
            serde_json::from_str(r#"{"data": {"total": 0}}"#).unwrap();
        let container = wrapper.into_container().unwrap();
        assert!(matches!(
            container.into_results(),
            Err(MarvelError::Malformed(_))
        ));
    }
}
