use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::PredictionResult;

/// Lowest percentage classified as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

/// Lowest percentage classified as moderate risk
pub const MODERATE_RISK_THRESHOLD: f64 = 40.0;

/// Severity tier derived from a risk percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    /// Below 40%
    Low,
    /// 40% up to but excluding 70%
    Moderate,
    /// 70% and above
    High,
}

/// Presentation tokens attached to a tier.
///
/// These are opaque labels for the renderer; only their stability matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneTokens {
    pub text: &'static str,
    pub background: &'static str,
    pub border: &'static str,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }

    pub fn tokens(&self) -> ToneTokens {
        match self {
            RiskTier::Low => ToneTokens {
                text: "text-green-600",
                background: "bg-green-50",
                border: "border-green-500",
            },
            RiskTier::Moderate => ToneTokens {
                text: "text-orange-600",
                background: "bg-orange-50",
                border: "border-orange-500",
            },
            RiskTier::High => ToneTokens {
                text: "text-red-600",
                background: "bg-red-50",
                border: "border-red-500",
            },
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a risk percentage into a tier.
///
/// Bands are evaluated from high to low, so anything that fails both
/// comparisons (negative numbers and NaN included) is Low.
pub fn classify(percentage: f64) -> RiskTier {
    if percentage >= HIGH_RISK_THRESHOLD {
        RiskTier::High
    } else if percentage >= MODERATE_RISK_THRESHOLD {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}

/// Which prediction a risk figure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskKind {
    Heart,
    Diabetes,
}

impl RiskKind {
    pub fn title(&self) -> &'static str {
        match self {
            RiskKind::Heart => "Heart Disease",
            RiskKind::Diabetes => "Diabetes",
        }
    }
}

/// One classified risk figure ready for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub kind: RiskKind,
    /// `None` when the response omitted the figure
    pub percentage: Option<f64>,
    pub tier: Option<RiskTier>,
}

impl RiskAssessment {
    pub fn new(kind: RiskKind, percentage: Option<f64>) -> Self {
        Self {
            kind,
            percentage,
            tier: percentage.map(classify),
        }
    }

    /// Number of filled cells in a bar of `width` cells
    pub fn bar_fill(&self, width: usize) -> usize {
        match self.percentage {
            Some(p) if p.is_finite() && p > 0.0 => {
                let cells = (p / 100.0 * width as f64).round();
                (cells as usize).min(width)
            }
            Some(p) if p == f64::INFINITY => width,
            _ => 0,
        }
    }
}

/// Classify both risk figures of a prediction, heart first
pub fn assess(result: &PredictionResult) -> [RiskAssessment; 2] {
    [
        RiskAssessment::new(RiskKind::Heart, result.heart_risk),
        RiskAssessment::new(RiskKind::Diabetes, result.diabetes_risk),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify(70.0), RiskTier::High);
        assert_eq!(classify(69.999), RiskTier::Moderate);
        assert_eq!(classify(40.0), RiskTier::Moderate);
        assert_eq!(classify(39.999), RiskTier::Low);
        assert_eq!(classify(100.0), RiskTier::High);
        assert_eq!(classify(0.0), RiskTier::Low);
    }

    #[test]
    fn test_out_of_range_values_fall_through_to_low() {
        assert_eq!(classify(-5.0), RiskTier::Low);
        assert_eq!(classify(f64::NAN), RiskTier::Low);
        assert_eq!(classify(f64::NEG_INFINITY), RiskTier::Low);
        assert_eq!(classify(250.0), RiskTier::High);
    }

    #[test]
    fn test_classification_sweep() {
        let mut p = -10.0;
        while p <= 110.0 {
            let expected = if p >= 70.0 {
                RiskTier::High
            } else if p >= 40.0 {
                RiskTier::Moderate
            } else {
                RiskTier::Low
            };
            assert_eq!(classify(p), expected, "percentage {}", p);
            p += 0.25;
        }
    }

    #[test]
    fn test_tokens_are_distinct_per_tier() {
        let tiers = [RiskTier::Low, RiskTier::Moderate, RiskTier::High];
        for (i, a) in tiers.iter().enumerate() {
            for b in &tiers[i + 1..] {
                assert_ne!(a.tokens(), b.tokens());
            }
        }
        assert_eq!(RiskTier::High.tokens().border, "border-red-500");
        assert_eq!(RiskTier::Moderate.to_string(), "Moderate");
    }

    #[test]
    fn test_assess_scenario() {
        let result = PredictionResult {
            heart_risk: Some(72.0),
            diabetes_risk: Some(35.0),
            insights: Some(vec!["Monitor blood pressure".to_string()]),
            status: None,
        };
        let [heart, diabetes] = assess(&result);

        assert_eq!(heart.kind, RiskKind::Heart);
        assert_eq!(heart.tier, Some(RiskTier::High));
        assert_eq!(diabetes.tier, Some(RiskTier::Low));
    }

    #[test]
    fn test_missing_figure_has_no_tier() {
        let assessment = RiskAssessment::new(RiskKind::Diabetes, None);
        assert_eq!(assessment.tier, None);
        assert_eq!(assessment.bar_fill(20), 0);
    }

    #[test]
    fn test_bar_fill_is_clamped() {
        assert_eq!(RiskAssessment::new(RiskKind::Heart, Some(50.0)).bar_fill(20), 10);
        assert_eq!(RiskAssessment::new(RiskKind::Heart, Some(72.0)).bar_fill(20), 14);
        assert_eq!(RiskAssessment::new(RiskKind::Heart, Some(140.0)).bar_fill(20), 20);
        assert_eq!(RiskAssessment::new(RiskKind::Heart, Some(-3.0)).bar_fill(20), 0);
        assert_eq!(RiskAssessment::new(RiskKind::Heart, Some(f64::NAN)).bar_fill(20), 0);
    }
}
