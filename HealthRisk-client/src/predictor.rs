use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use health_risk_domain::entities::{BackendHealth, FormState, ModelInfo, PredictionResult};

use crate::config::{ClientConfig, ConfigError};
use crate::errors::ConnectivityError;

/// Path of the prediction endpoint
pub const PREDICT_PATH: &str = "/predict";
/// Path of the service health check
pub const HEALTH_PATH: &str = "/health";
/// Path of the model description endpoint
pub const MODEL_INFO_PATH: &str = "/model-info";

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Trait for the external risk prediction service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Submit a form snapshot and return the predicted risks
    async fn predict(&self, form: &FormState) -> Result<PredictionResult, ConnectivityError>;

    /// Query the service health endpoint
    async fn health(&self) -> Result<BackendHealth, ConnectivityError>;

    /// Query the description of the loaded models
    async fn model_info(&self) -> Result<ModelInfo, ConnectivityError>;
}

/// HTTP implementation of [`PredictionService`]
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: Client,
    config: ClientConfig,
}

impl HttpPredictionClient {
    /// Build a client for the configured service.
    ///
    /// No request timeout is set: a request is awaited until the transport
    /// resolves or fails.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConnectivityError> {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        read_json(response).await
    }
}

/// Turn a response into `T`, treating any non-success status as a failure.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ConnectivityError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
        if let Some(detail) = &detail {
            warn!("Prediction service reported an error: {}", detail);
        }
        return Err(ConnectivityError::status(status, detail));
    }

    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    #[instrument(skip(self, form), fields(request_id = tracing::field::Empty))]
    async fn predict(&self, form: &FormState) -> Result<PredictionResult, ConnectivityError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let url = self.config.endpoint(PREDICT_PATH);
        info!("Submitting prediction request for age {}", form.age);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .json(form)
            .send()
            .await?;

        // Only JSON well-formedness is checked; field types are read leniently
        let body: serde_json::Value = read_json(response).await?;
        let result = PredictionResult::from(body);
        info!(
            heart_risk = ?result.heart_risk,
            diabetes_risk = ?result.diabetes_risk,
            insights = result.insights().len(),
            "Prediction received"
        );
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<BackendHealth, ConnectivityError> {
        self.get_json(HEALTH_PATH).await
    }

    #[instrument(skip(self))]
    async fn model_info(&self) -> Result<ModelInfo, ConnectivityError> {
        self.get_json(MODEL_INFO_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_for_default_config() {
        let client = HttpPredictionClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().endpoint(PREDICT_PATH), "http://localhost:5000/predict");
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig {
            base_url: "localhost:5000".to_string(),
            user_agent: None,
        };
        assert!(HttpPredictionClient::new(config).is_err());
    }
}
