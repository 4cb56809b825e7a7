//! Plain text rendering of the intake form and the assessment panel.

use health_risk_domain::entities::{BackendHealth, FormSection, FormState, ModelInfo, PredictionResult, FORM_FIELDS};
use health_risk_domain::services::coercion::FieldValue;
use health_risk_domain::services::risk::{assess, RiskAssessment};
use health_risk_domain::session::AssessmentState;

/// Width of the proportional risk bar in cells
pub const BAR_WIDTH: usize = 20;

pub const DISCLAIMER: &str = "Predictive tool only. Consult healthcare professionals.";

pub const EMPTY_PLACEHOLDER: &str = "Submit vitals to see results";

pub const LOADING_BANNER: &str = "Analyzing...";

const SECTIONS: [FormSection; 3] = [
    FormSection::Demographics,
    FormSection::Cardiovascular,
    FormSection::MetabolicSymptoms,
];

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(true) => "[x]".to_string(),
        FieldValue::Bool(false) => "[ ]".to_string(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(s) => s.clone(),
    }
}

/// Render every field of the form, grouped by section
pub fn render_form(form: &FormState) -> String {
    let mut lines = Vec::new();

    for section in SECTIONS {
        lines.push(section.title().to_string());
        for field in FORM_FIELDS.iter().filter(|f| f.section == section) {
            let value = form
                .value(field.name)
                .map(|v| format_value(&v))
                .unwrap_or_default();
            lines.push(format!("  {:<22} {:<6} ({})", field.label, value, field.name));
        }
    }

    if !form.extra.is_empty() {
        lines.push("Other".to_string());
        for (name, value) in &form.extra {
            lines.push(format!("  {:<22} {}", name, value));
        }
    }

    lines.join("\n")
}

fn render_bar(assessment: &RiskAssessment) -> String {
    let filled = assessment.bar_fill(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn render_card(assessment: &RiskAssessment) -> Vec<String> {
    let (figure, tier) = match (assessment.percentage, assessment.tier) {
        (Some(p), Some(tier)) => (format!("{}%", p), tier.label()),
        _ => ("--".to_string(), "--"),
    };

    vec![
        format!("{:<14} {:<9} {:>7}", assessment.kind.title(), tier, figure),
        format!("  {}", render_bar(assessment)),
    ]
}

/// Render the two risk cards and, when present, the insight list
pub fn render_result(result: &PredictionResult) -> String {
    let mut lines = vec!["Risk Assessment".to_string()];
    for assessment in assess(result).iter() {
        lines.extend(render_card(assessment));
    }

    // Insight block is omitted entirely when there is nothing to say
    if result.has_insights() {
        lines.push("Preventive Care Insights".to_string());
        for (i, insight) in result.insights().iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, insight));
        }
    }

    lines.join("\n")
}

/// Render the assessment panel for any display state
pub fn render_assessment(state: &AssessmentState) -> String {
    let body = match state {
        AssessmentState::Empty => EMPTY_PLACEHOLDER.to_string(),
        AssessmentState::Loading { previous: None } => LOADING_BANNER.to_string(),
        AssessmentState::Loading {
            previous: Some(previous),
        } => format!("{}\n{}", LOADING_BANNER, render_result(&previous.result)),
        AssessmentState::Ready(assessment) => render_result(&assessment.result),
        AssessmentState::Failed { message } => format!("Error: {}", message),
    };

    format!("{}\n\n{}", body, DISCLAIMER)
}

pub fn render_health(health: &BackendHealth) -> String {
    format!(
        "Prediction service: {} (models loaded: {})",
        health.status,
        if health.models_loaded { "yes" } else { "no" }
    )
}

pub fn render_model_info(info: &ModelInfo) -> String {
    let mut lines = Vec::new();
    for (title, model) in [("Heart model", &info.heart_model), ("Diabetes model", &info.diabetes_model)] {
        let estimators = model
            .n_estimators
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        lines.push(format!("{}: {} ({} estimators)", title, model.model_type, estimators));
        if !model.features.is_empty() {
            lines.push(format!("  features: {}", model.features.join(", ")));
        }
    }
    lines.join("\n")
}

pub fn help_text() -> &'static str {
    "Commands:
  set <field> [value]  edit a field (see 'form' for field names)
  toggle <field>       flip a checkbox field
  form                 show the current form
  submit               generate a risk assessment
  result               show the latest assessment
  health               check the prediction service
  model-info           describe the prediction models
  help                 show this help
  quit                 exit"
}
