//! Interactive intake session.
//!
//! Executes parsed commands against an [`AssessmentController`]. Output is
//! delivered through a channel so that a submission can run on its own task
//! and report when it settles, while further edits keep being accepted.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use health_risk_client::{AssessmentController, PredictionService, SubmitOutcome};
use health_risk_domain::entities::FormField;
use health_risk_domain::services::coercion::{FieldValue, InputEvent};

use crate::commands::Command;
use crate::render;

const ALREADY_IN_PROGRESS: &str = "An assessment is already in progress.";

/// Whether the session should keep reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct IntakeSession<P> {
    controller: Arc<AssessmentController<P>>,
    output: UnboundedSender<String>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<P> IntakeSession<P>
where
    P: PredictionService + 'static,
{
    pub fn new(controller: Arc<AssessmentController<P>>, output: UnboundedSender<String>) -> Self {
        Self {
            controller,
            output,
            pending: Mutex::new(None),
        }
    }

    pub fn controller(&self) -> &Arc<AssessmentController<P>> {
        &self.controller
    }

    fn emit(&self, text: impl Into<String>) {
        // The receiver only goes away at shutdown
        if self.output.send(text.into()).is_err() {
            debug!("Output channel closed");
        }
    }

    /// Execute one command
    pub async fn execute(&self, command: Command) -> Flow {
        match command {
            Command::Set { field, value } => {
                let event = InputEvent::for_field(field.as_str(), value);
                self.controller.apply_input(&event);
                let stored = self
                    .controller
                    .form()
                    .value(&field)
                    .map(describe_value)
                    .unwrap_or_default();
                if FormField::lookup(&field).is_none() {
                    self.emit(format!("{} = {} (not a standard field, sent as-is)", field, stored));
                } else {
                    self.emit(format!("{} = {}", field, stored));
                }
            }
            Command::Toggle { field } => match self.controller.toggle(&field) {
                Some(checked) => self.emit(format!("{} = {}", field, checked)),
                None => self.emit(format!("'{}' is not a checkbox field", field)),
            },
            Command::ShowForm => self.emit(render::render_form(&self.controller.form())),
            Command::ShowResult => self.emit(render::render_assessment(&self.controller.state())),
            Command::Submit => self.spawn_submission(),
            Command::Health => match self.controller.check_health().await {
                Ok(health) => self.emit(render::render_health(&health)),
                Err(e) => self.emit(format!("Error: {}", e)),
            },
            Command::ModelInfo => match self.controller.model_info().await {
                Ok(info) => self.emit(render::render_model_info(&info)),
                Err(e) => self.emit(format!("Error: {}", e)),
            },
            Command::Help => self.emit(render::help_text()),
            Command::Quit => {
                info!("Intake session ended by user");
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Run the submission on its own task and report the panel when it settles
    fn spawn_submission(&self) {
        // The spawned task enters Loading only once it runs, so an unfinished
        // task counts as in flight too
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let task_running = pending.as_ref().is_some_and(|handle| !handle.is_finished());
        if task_running || self.controller.is_loading() {
            self.emit(ALREADY_IN_PROGRESS);
            return;
        }
        self.emit(render::LOADING_BANNER);

        let controller = Arc::clone(&self.controller);
        let output = self.output.clone();
        *pending = Some(tokio::spawn(async move {
            let text = match controller.submit().await {
                SubmitOutcome::AlreadyInFlight => ALREADY_IN_PROGRESS.to_string(),
                SubmitOutcome::Succeeded(_) | SubmitOutcome::Failed(_) => {
                    render::render_assessment(&controller.state())
                }
            };
            if output.send(text).is_err() {
                debug!("Output channel closed before the assessment was reported");
            }
        }));
    }

    /// Wait for the outstanding submission task, if any, to report
    pub async fn wait_for_submission(&self) {
        let handle = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                debug!("Submission task ended abnormally: {}", e);
            }
        }
    }
}

fn describe_value(value: FieldValue) -> String {
    match value {
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(s) => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_risk_client::testing::StubPredictionService;
    use health_risk_domain::entities::PredictionResult;
    use tokio::sync::mpsc;

    fn session(service: StubPredictionService) -> (IntakeSession<StubPredictionService>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Arc::new(AssessmentController::new(service));
        (IntakeSession::new(controller, tx), rx)
    }

    #[tokio::test]
    async fn test_set_reports_stored_value() {
        let (session, mut rx) = session(StubPredictionService::unreachable());

        session
            .execute(Command::Set { field: "oldpeak".into(), value: "1.4".into() })
            .await;
        assert_eq!(rx.recv().await.unwrap(), "oldpeak = 1.4");

        session
            .execute(Command::Set { field: "age".into(), value: "abc".into() })
            .await;
        assert_eq!(rx.recv().await.unwrap(), "age = NaN");
    }

    #[tokio::test]
    async fn test_toggle_non_checkbox_is_reported() {
        let (session, mut rx) = session(StubPredictionService::unreachable());

        session.execute(Command::Toggle { field: "chol".into() }).await;
        assert_eq!(rx.recv().await.unwrap(), "'chol' is not a checkbox field");
    }

    #[tokio::test]
    async fn test_submit_reports_result_when_settled() {
        let result = PredictionResult {
            heart_risk: Some(72.0),
            diabetes_risk: Some(35.0),
            insights: Some(vec!["Monitor blood pressure".to_string()]),
            status: None,
        };
        let (session, mut rx) = session(StubPredictionService::with_result(result));

        assert_eq!(session.execute(Command::Submit).await, Flow::Continue);
        assert_eq!(rx.recv().await.unwrap(), render::LOADING_BANNER);

        let panel = rx.recv().await.unwrap();
        assert!(panel.contains("72%"));
        assert!(panel.contains("Monitor blood pressure"));
    }

    #[tokio::test]
    async fn test_quit_stops_session() {
        let (session, _rx) = session(StubPredictionService::unreachable());
        assert_eq!(session.execute(Command::Quit).await, Flow::Quit);
    }

    #[tokio::test]
    async fn test_rapid_submits_start_one_task() {
        let service = StubPredictionService::with_result(PredictionResult::default()).held();
        let (session, mut rx) = session(service);

        // Second submit arrives before the first task has entered Loading
        session.execute(Command::Submit).await;
        session.execute(Command::Submit).await;

        assert_eq!(rx.recv().await.unwrap(), render::LOADING_BANNER);
        assert_eq!(rx.recv().await.unwrap(), ALREADY_IN_PROGRESS);

        session.controller().service().wait_for_request().await;
        session.controller().service().release();
        session.wait_for_submission().await;

        assert!(rx.recv().await.unwrap().ends_with(render::DISCLAIMER));
        assert_eq!(session.controller().service().received().len(), 1);
        assert!(!session.controller().is_loading());
    }
}
