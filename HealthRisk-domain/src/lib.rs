// HealthRisk Domain
// This crate contains the intake form model, field coercion and risk
// classification for the health risk client. It performs no I/O.

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// Assessment state machine driven by the prediction client
pub mod session;

pub use entities::{FormState, Gender, PredictionResult};
pub use services::risk::{classify, RiskTier};
pub use session::{Assessment, AssessmentState};
