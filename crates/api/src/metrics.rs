//! Client for the time-series metrics query endpoint.
//!
//! Device metric endpoints render a Flux query and forward it, wrapped in a
//! metric request, to the dashboard's query API. The response JSON is
//! relayed untouched.

use std::time::Duration;

use sensordash_core::metrics::QUERY_INTERVAL_MS;
use sensordash_core::types::DbId;
use serde::Serialize;

/// Upper bound on a single upstream query.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how metric queries are sent.
#[derive(Debug, Clone, Default)]
pub struct MetricsConfig {
    /// Full URL of the metrics query endpoint. Metric routes answer 503
    /// while this is unset.
    pub query_url: Option<String>,
    pub datasource_id: DbId,
    pub datasource_org_id: DbId,
    /// Base bucket; the sensor endpoint may append a suffix.
    pub bucket: String,
    pub organization: String,
}

impl MetricsConfig {
    /// Load metrics settings from environment variables.
    ///
    /// | Env Var                     | Default   |
    /// |-----------------------------|-----------|
    /// | `METRICS_QUERY_URL`         | unset     |
    /// | `METRICS_DATASOURCE_ID`     | `1`       |
    /// | `METRICS_DATASOURCE_ORG_ID` | `1`       |
    /// | `METRICS_BUCKET`            | `sensors` |
    /// | `METRICS_ORGANIZATION`      | `default` |
    pub fn from_env() -> Self {
        let query_url = std::env::var("METRICS_QUERY_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let datasource_id: DbId = std::env::var("METRICS_DATASOURCE_ID")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("METRICS_DATASOURCE_ID must be a valid i64");

        let datasource_org_id: DbId = std::env::var("METRICS_DATASOURCE_ORG_ID")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("METRICS_DATASOURCE_ORG_ID must be a valid i64");

        Self {
            query_url,
            datasource_id,
            datasource_org_id,
            bucket: std::env::var("METRICS_BUCKET").unwrap_or_else(|_| "sensors".into()),
            organization: std::env::var("METRICS_ORGANIZATION")
                .unwrap_or_else(|_| "default".into()),
        }
    }
}

/// Errors from the metrics proxy.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// No query URL is configured.
    #[error("Metrics backend is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The metrics endpoint returned a non-2xx status code.
    #[error("Metrics API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

/// Body POSTed to the metrics query endpoint.
#[derive(Debug, Serialize)]
pub struct MetricRequest {
    pub from: &'static str,
    pub to: &'static str,
    pub queries: Vec<MetricQuery>,
    pub debug: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    pub datasource_id: DbId,
    pub interval_ms: i64,
    pub org_id: DbId,
    pub options: QueryOptions,
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub default_bucket: String,
    pub organization: String,
}

/// HTTP client for the metrics endpoint.
pub struct MetricsClient {
    client: reqwest::Client,
    config: MetricsConfig,
}

impl MetricsClient {
    /// Build a client with a bounded request timeout.
    pub fn new(config: MetricsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Wrap a Flux query for `bucket` in a metric request.
    pub fn metric_request(&self, bucket: &str, flux: String) -> MetricRequest {
        MetricRequest {
            from: "0",
            to: "0",
            queries: vec![MetricQuery {
                datasource_id: self.config.datasource_id,
                interval_ms: QUERY_INTERVAL_MS,
                org_id: self.config.datasource_org_id,
                options: QueryOptions {
                    default_bucket: bucket.to_string(),
                    organization: self.config.organization.clone(),
                },
                query: flux,
            }],
            debug: false,
        }
    }

    /// Run a Flux query against `bucket` and return the raw JSON answer.
    pub async fn query(
        &self,
        bucket: &str,
        flux: String,
    ) -> Result<serde_json::Value, MetricsError> {
        let url = self
            .config
            .query_url
            .as_deref()
            .ok_or(MetricsError::NotConfigured)?;

        let response = self
            .client
            .post(url)
            .json(&self.metric_request(bucket, flux))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetricsError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
