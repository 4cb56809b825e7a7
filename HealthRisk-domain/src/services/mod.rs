pub mod coercion;
pub mod risk;

// Domain services
// Pure functions applied to the form before submission and to the
// prediction payload after it comes back.

pub use coercion::{coerce, parse_float, FieldValue, InputEvent, InputKind, RawInput};
pub use risk::{assess, classify, RiskAssessment, RiskKind, RiskTier, ToneTokens};
