// HealthRisk app lib.rs
//
// Terminal front end for the intake form: command parsing, text rendering
// of the form and the assessment, and the session loop used by the binary.

pub mod commands;
pub mod intake;
pub mod render;
