// HealthRisk client
// Talks to the external prediction service and drives the assessment
// state machine from the domain crate.

pub mod config;
pub mod controller;
pub mod errors;
pub mod predictor;

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use config::{ClientConfig, ConfigError};
pub use controller::{AssessmentController, SubmitOutcome};
pub use errors::{ConnectivityError, FailureCause, CONNECTIVITY_MESSAGE};
pub use predictor::{HttpPredictionClient, PredictionService};
