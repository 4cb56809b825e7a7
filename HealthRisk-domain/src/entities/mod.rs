// Domain entities and value objects
pub mod form_state;
pub mod prediction;

// Re-export common types for easier imports
pub use form_state::{FormField, FormSection, FormState, Gender, FORM_FIELDS};
pub use prediction::{BackendHealth, ModelInfo, ModelSummary, PredictionResult};
