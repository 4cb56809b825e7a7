//! Assessment state machine.
//!
//! The intake screen shows at most one of: nothing yet, a result, or an
//! error. Loading is a state of its own that remembers the last good result
//! so it can stay on screen while a new request is outstanding.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::entities::PredictionResult;

/// A prediction together with the time it was received
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub result: PredictionResult,
    pub received_at: DateTime<Utc>,
}

impl Assessment {
    pub fn new(result: PredictionResult) -> Self {
        Self {
            result,
            received_at: Utc::now(),
        }
    }
}

/// Display state of the assessment panel
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AssessmentState {
    /// No submission has completed yet
    #[default]
    Empty,
    /// A request is outstanding
    Loading { previous: Option<Assessment> },
    /// The latest submission succeeded
    Ready(Assessment),
    /// The latest submission failed
    Failed { message: String },
}

impl AssessmentState {
    /// Enter the loading state, clearing any error and keeping the last result
    pub fn begin(&mut self) {
        let previous = match std::mem::take(self) {
            AssessmentState::Ready(assessment) => Some(assessment),
            AssessmentState::Loading { previous } => previous,
            AssessmentState::Empty | AssessmentState::Failed { .. } => None,
        };
        *self = AssessmentState::Loading { previous };
    }

    /// Settle with a fresh result, replacing any prior one
    pub fn succeed(&mut self, result: PredictionResult) {
        *self = AssessmentState::Ready(Assessment::new(result));
    }

    /// Settle with an error; the previous result is no longer shown
    pub fn fail(&mut self, message: impl Into<String>) {
        *self = AssessmentState::Failed {
            message: message.into(),
        };
    }

    /// Leave the loading state without an outcome, restoring what was shown
    /// before. No-op in any other state.
    pub fn abandon(&mut self) {
        if let AssessmentState::Loading { previous } = self {
            debug!("Abandoning outstanding assessment");
            *self = match previous.take() {
                Some(assessment) => AssessmentState::Ready(assessment),
                None => AssessmentState::Empty,
            };
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AssessmentState::Loading { .. })
    }

    /// Result currently on display, if any
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            AssessmentState::Ready(assessment) => Some(&assessment.result),
            AssessmentState::Loading { previous } => previous.as_ref().map(|a| &a.result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AssessmentState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(heart: f64) -> PredictionResult {
        PredictionResult {
            heart_risk: Some(heart),
            diabetes_risk: Some(10.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_empty() {
        let state = AssessmentState::default();
        assert!(!state.is_loading());
        assert!(state.result().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failure_clears_result() {
        let mut state = AssessmentState::default();
        state.begin();
        state.succeed(sample(72.0));
        assert_eq!(state.result().and_then(|r| r.heart_risk), Some(72.0));

        state.begin();
        state.fail("unreachable");
        assert!(state.result().is_none());
        assert_eq!(state.error(), Some("unreachable"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_success_clears_error() {
        let mut state = AssessmentState::default();
        state.begin();
        state.fail("unreachable");

        state.begin();
        assert!(state.error().is_none());
        assert!(state.is_loading());

        state.succeed(sample(55.0));
        assert!(state.error().is_none());
        assert_eq!(state.result().and_then(|r| r.heart_risk), Some(55.0));
    }

    #[test]
    fn test_loading_keeps_previous_result_visible() {
        let mut state = AssessmentState::default();
        state.succeed(sample(30.0));
        state.begin();

        assert!(state.is_loading());
        assert_eq!(state.result().and_then(|r| r.heart_risk), Some(30.0));
    }

    #[test]
    fn test_abandon_restores_prior_display() {
        let mut state = AssessmentState::default();
        state.begin();
        state.abandon();
        assert_eq!(state, AssessmentState::Empty);

        state.succeed(sample(45.0));
        state.begin();
        state.abandon();
        assert!(matches!(state, AssessmentState::Ready(_)));

        // Not loading: nothing to abandon
        state.fail("x");
        state.abandon();
        assert_eq!(state.error(), Some("x"));
    }
}
