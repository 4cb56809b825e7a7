// Testing utilities for the prediction client
// This module is only available in tests or with the "mock" feature

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use health_risk_domain::entities::{BackendHealth, FormState, ModelInfo, ModelSummary, PredictionResult};

use crate::errors::ConnectivityError;
use crate::predictor::PredictionService;

#[derive(Debug, Clone)]
enum StubResponse {
    Result(PredictionResult),
    Unreachable,
}

/// Scripted stand-in for the prediction service.
///
/// Records every form it receives. When built with [`held`](Self::held),
/// each prediction waits for a matching [`release`](Self::release) before
/// answering, which lets tests observe a request while it is in flight.
#[derive(Debug)]
pub struct StubPredictionService {
    response: Mutex<StubResponse>,
    received: Mutex<Vec<FormState>>,
    hold: bool,
    request_seen: Notify,
    gate: Notify,
}

impl StubPredictionService {
    fn from_response(response: StubResponse) -> Self {
        Self {
            response: Mutex::new(response),
            received: Mutex::new(Vec::new()),
            hold: false,
            request_seen: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// A service that answers every prediction with `result`
    pub fn with_result(result: PredictionResult) -> Self {
        Self::from_response(StubResponse::Result(result))
    }

    /// A service that cannot be reached
    pub fn unreachable() -> Self {
        Self::from_response(StubResponse::Unreachable)
    }

    /// Hold each prediction until [`release`](Self::release) is called
    pub fn held(mut self) -> Self {
        self.hold = true;
        self
    }

    pub fn respond_with(&self, result: PredictionResult) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = StubResponse::Result(result);
    }

    pub fn fail_with_unreachable(&self) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = StubResponse::Unreachable;
    }

    /// Forms received so far, oldest first
    pub fn received(&self) -> Vec<FormState> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Wait until a prediction request has arrived
    pub async fn wait_for_request(&self) {
        self.request_seen.notified().await;
    }

    /// Let one held prediction answer
    pub fn release(&self) {
        self.gate.notify_one();
    }

    fn current(&self) -> StubResponse {
        self.response.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl PredictionService for StubPredictionService {
    async fn predict(&self, form: &FormState) -> Result<PredictionResult, ConnectivityError> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(form.clone());
        self.request_seen.notify_one();

        if self.hold {
            self.gate.notified().await;
        }

        match self.current() {
            StubResponse::Result(result) => Ok(result),
            StubResponse::Unreachable => Err(ConnectivityError::transport("stub service unreachable")),
        }
    }

    async fn health(&self) -> Result<BackendHealth, ConnectivityError> {
        match self.current() {
            StubResponse::Result(_) => Ok(BackendHealth {
                status: "healthy".to_string(),
                models_loaded: true,
            }),
            StubResponse::Unreachable => Err(ConnectivityError::transport("stub service unreachable")),
        }
    }

    async fn model_info(&self) -> Result<ModelInfo, ConnectivityError> {
        match self.current() {
            StubResponse::Result(_) => Ok(ModelInfo {
                heart_model: ModelSummary {
                    model_type: "RandomForestClassifier".to_string(),
                    features: vec!["age".to_string(), "sex".to_string()],
                    n_estimators: Some(200),
                },
                diabetes_model: ModelSummary {
                    model_type: "RandomForestClassifier".to_string(),
                    features: vec!["Age".to_string(), "Gender".to_string()],
                    n_estimators: Some(200),
                },
            }),
            StubResponse::Unreachable => Err(ConnectivityError::transport("stub service unreachable")),
        }
    }
}
