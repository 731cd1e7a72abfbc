use serde::Serialize;

use crate::errors::Severity;
use crate::models::wire::AtsReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Favorable,
    NeedsImprovement,
    Poor,
}

impl ScoreTier {
    /// Fixed boundaries: 80 and above favorable, 60 up to but excluding 80
    /// needs improvement. Fractional scores are never rounded up a tier.
    pub fn classify(score: f64) -> Self {
        if score >= 80.0 {
            ScoreTier::Favorable
        } else if score >= 60.0 {
            ScoreTier::NeedsImprovement
        } else {
            ScoreTier::Poor
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ScoreTier::Favorable => Severity::Success,
            ScoreTier::NeedsImprovement => Severity::Warning,
            ScoreTier::Poor => Severity::Danger,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Favorable => "favorable",
            ScoreTier::NeedsImprovement => "needs improvement",
            ScoreTier::Poor => "poor",
        }
    }

    fn message(&self, score: f64) -> String {
        match self {
            ScoreTier::Favorable => {
                format!("Great! Your resume scored {score}/100 and is well optimized for ATS.")
            }
            ScoreTier::NeedsImprovement => format!(
                "Your resume scored {score}/100. Review the suggestions to improve it."
            ),
            ScoreTier::Poor => format!(
                "Your resume scored {score}/100 and may be filtered out by ATS. Significant changes are recommended."
            ),
        }
    }
}

/// Classified score check result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreAssessment {
    pub score: f64,
    pub tier: ScoreTier,
    pub severity: Severity,
    pub message: String,
    pub report: AtsReport,
}

impl ScoreAssessment {
    pub fn from_report(report: AtsReport) -> Self {
        let score = clamp_score(report.overall_score);
        let tier = ScoreTier::classify(score);
        Self {
            score,
            tier,
            severity: tier.severity(),
            message: tier.message(score),
            report,
        }
    }
}

/// Clamps into [0, 100]; NaN counts as 0.
fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}
