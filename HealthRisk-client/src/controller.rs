//! Submission controller.
//!
//! Owns the intake form and the assessment state and mediates every
//! prediction request. At most one request is outstanding at a time: a
//! submission attempted while another is in flight is rejected without
//! touching the state or sending anything.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{error, info, instrument, warn};

use health_risk_domain::entities::{BackendHealth, FormState, ModelInfo, PredictionResult};
use health_risk_domain::services::coercion::InputEvent;
use health_risk_domain::session::AssessmentState;

use crate::errors::ConnectivityError;
use crate::predictor::PredictionService;

/// Outcome of a call to [`AssessmentController::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The service answered; the result is now displayed
    Succeeded(PredictionResult),
    /// The request failed; the connectivity message is now displayed
    Failed(ConnectivityError),
    /// Another submission was still outstanding; nothing was sent
    AlreadyInFlight,
}

#[derive(Debug, Default)]
struct Session {
    form: FormState,
    state: AssessmentState,
}

/// Single owner of the form and the assessment display state
#[derive(Debug)]
pub struct AssessmentController<P> {
    service: P,
    session: Mutex<Session>,
}

/// Clears the loading state if a submission ends without settling,
/// e.g. because its future was dropped.
///
/// Must be disarmed under the same lock that settles the state, otherwise
/// its drop could abandon the Loading state of a later submission.
struct LoadingGuard<'a> {
    session: &'a Mutex<Session>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(session: &'a Mutex<Session>) -> Self {
        Self { session, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.state.is_loading() {
            warn!("Submission ended without an outcome; clearing loading state");
            session.state.abandon();
        }
    }
}

impl<P: PredictionService> AssessmentController<P> {
    /// Create a controller with a default form
    pub fn new(service: P) -> Self {
        Self::with_form(service, FormState::default())
    }

    pub fn with_form(service: P, form: FormState) -> Self {
        Self {
            service,
            session: Mutex::new(Session {
                form,
                state: AssessmentState::Empty,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn service(&self) -> &P {
        &self.service
    }

    /// Snapshot of the current form
    pub fn form(&self) -> FormState {
        self.lock().form.clone()
    }

    /// Snapshot of the current display state
    pub fn state(&self) -> AssessmentState {
        self.lock().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.is_loading()
    }

    /// Merge one input event into the form. Allowed while a request is
    /// outstanding; the outstanding request keeps its own snapshot.
    pub fn apply_input(&self, event: &InputEvent) {
        self.lock().form.apply(event);
    }

    /// Flip a boolean field, returning its new value
    pub fn toggle(&self, name: &str) -> Option<bool> {
        self.lock().form.toggle(name)
    }

    /// Send the current form to the prediction service.
    ///
    /// The loading state is entered before the request starts and left
    /// when it settles, whichever way it settles.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> SubmitOutcome {
        let snapshot = {
            let mut session = self.lock();
            if session.state.is_loading() {
                warn!("Submission rejected: a request is already in flight");
                return SubmitOutcome::AlreadyInFlight;
            }
            session.state.begin();
            session.form.clone()
        };
        let mut guard = LoadingGuard::new(&self.session);

        let outcome = self.service.predict(&snapshot).await;

        let mut session = self.lock();
        guard.disarm();
        match outcome {
            Ok(result) => {
                info!("Assessment updated");
                session.state.succeed(result.clone());
                SubmitOutcome::Succeeded(result)
            }
            Err(e) => {
                error!("Prediction request failed: {}", e.cause());
                session.state.fail(e.user_message());
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Ask the service whether it is up. Does not affect the display state.
    pub async fn check_health(&self) -> Result<BackendHealth, ConnectivityError> {
        self.service.health().await.map_err(|e| {
            warn!("Health check failed: {}", e.cause());
            e
        })
    }

    /// Fetch the model description. Does not affect the display state.
    pub async fn model_info(&self) -> Result<ModelInfo, ConnectivityError> {
        self.service.model_info().await.map_err(|e| {
            warn!("Model info request failed: {}", e.cause());
            e
        })
    }
}
