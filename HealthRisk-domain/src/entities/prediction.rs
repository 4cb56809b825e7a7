use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body of a successful prediction request.
///
/// Only JSON well-formedness is required. Decoding goes through
/// [`From<Value>`], so a missing, null or wrongly typed entry becomes an
/// absent value instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct PredictionResult {
    /// Heart disease risk in percent (0-100)
    pub heart_risk: Option<f64>,

    /// Diabetes risk in percent (0-100)
    pub diabetes_risk: Option<f64>,

    /// Ordered advisory lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,

    /// Status marker some backends include ("success")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// Numbers pass through; numeric strings such as "72" are read as numbers
fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<Value> for PredictionResult {
    fn from(body: Value) -> Self {
        let Value::Object(fields) = body else {
            return Self::default();
        };

        let insights = match fields.get("insights") {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        };

        Self {
            heart_risk: lenient_number(fields.get("heart_risk")),
            diabetes_risk: lenient_number(fields.get("diabetes_risk")),
            insights,
            status: fields.get("status").and_then(Value::as_str).map(str::to_string),
        }
    }
}

impl PredictionResult {
    /// Insights, or an empty slice when the key was absent
    pub fn insights(&self) -> &[String] {
        self.insights.as_deref().unwrap_or(&[])
    }

    pub fn has_insights(&self) -> bool {
        !self.insights().is_empty()
    }
}

/// Body of the prediction service's `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub models_loaded: bool,
}

impl BackendHealth {
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.models_loaded
    }
}

/// Description of one trained model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    #[serde(rename = "type")]
    pub model_type: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub n_estimators: Option<u32>,
}

/// Body of the prediction service's `GET /model-info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub heart_model: ModelSummary,
    pub diabetes_model: ModelSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_response_decodes() {
        let result: PredictionResult = serde_json::from_value(json!({
            "heart_risk": 72,
            "diabetes_risk": 35.5,
            "insights": ["Monitor blood pressure"],
            "status": "success"
        }))
        .unwrap();

        assert_eq!(result.heart_risk, Some(72.0));
        assert_eq!(result.diabetes_risk, Some(35.5));
        assert_eq!(result.insights().to_vec(), vec!["Monitor blood pressure".to_string()]);
        assert_eq!(result.status.as_deref(), Some("success"));
    }

    #[test]
    fn test_missing_keys_are_absent_not_errors() {
        let result: PredictionResult =
            serde_json::from_value(json!({ "heart_risk": 40, "diabetes_risk": 70 })).unwrap();
        assert!(result.insights.is_none());
        assert!(!result.has_insights());

        let empty: PredictionResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, PredictionResult::default());
    }

    #[test]
    fn test_wrongly_typed_entries_are_lenient() {
        let result: PredictionResult = serde_json::from_value(json!({
            "heart_risk": "72",
            "diabetes_risk": true,
            "insights": ["Walk daily", 3, null, "Cut sugar"],
            "status": 1
        }))
        .unwrap();

        assert_eq!(result.heart_risk, Some(72.0));
        assert_eq!(result.diabetes_risk, None);
        assert_eq!(result.insights().to_vec(), vec!["Walk daily".to_string(), "Cut sugar".to_string()]);
        assert_eq!(result.status, None);

        let scalar_insights: PredictionResult =
            serde_json::from_value(json!({ "heart_risk": 10, "insights": "x" })).unwrap();
        assert!(scalar_insights.insights.is_none());
        assert_eq!(scalar_insights.heart_risk, Some(10.0));
    }

    #[test]
    fn test_non_object_body_is_default() {
        let result: PredictionResult = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(result, PredictionResult::default());

        let text: PredictionResult = serde_json::from_str("\"ok\"").unwrap();
        assert_eq!(text, PredictionResult::default());
    }

    #[test]
    fn test_model_info_decodes_type_key() {
        let info: ModelInfo = serde_json::from_value(json!({
            "heart_model": { "type": "RandomForestClassifier", "features": ["age"], "n_estimators": 200 },
            "diabetes_model": { "type": "RandomForestClassifier", "features": [], "n_estimators": null }
        }))
        .unwrap();

        assert_eq!(info.heart_model.model_type, "RandomForestClassifier");
        assert_eq!(info.heart_model.n_estimators, Some(200));
        assert_eq!(info.diabetes_model.n_estimators, None);
    }

    #[test]
    fn test_backend_health_readiness() {
        let health: BackendHealth =
            serde_json::from_value(json!({ "status": "healthy", "models_loaded": false })).unwrap();
        assert!(!health.is_ready());
    }
}
