use serde::{Deserialize, Serialize};

use crate::model::result_model::{
    ComparisonResult, ComparisonSummary, DifferenceKind, ElementPair, QualityReport, Readiness,
    Severity,
};

pub const PRODUCTION_MIN_SCORE: f64 = 95.0;
pub const REVIEW_MIN_SCORE: f64 = 85.0;
pub const REVIEW_MAX_CRITICAL: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessThresholds {
    /// `production-ready` needs zero critical issues and at least this score.
    #[serde(default = "default_production_min_score")]
    pub production_min_score: f64,

    /// `needs-review` needs at least this score...
    #[serde(default = "default_review_min_score")]
    pub review_min_score: f64,

    /// ...and no more than this many critical issues.
    #[serde(default = "default_review_max_critical")]
    pub review_max_critical: usize,
}

impl Default for ReadinessThresholds {
    fn default() -> Self {
        Self {
            production_min_score: PRODUCTION_MIN_SCORE,
            review_min_score: REVIEW_MIN_SCORE,
            review_max_critical: REVIEW_MAX_CRITICAL,
        }
    }
}

fn default_production_min_score() -> f64 { PRODUCTION_MIN_SCORE }
fn default_review_min_score() -> f64 { REVIEW_MIN_SCORE }
fn default_review_max_critical() -> usize { REVIEW_MAX_CRITICAL }

/// `100 * (total - mismatched) / total`, vacuously 100 for no elements.
pub fn accuracy(total: usize, mismatched: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let mismatched = mismatched.min(total);
    100.0 * (total - mismatched) as f64 / total as f64
}

pub fn readiness(critical: usize, overall: f64, thresholds: &ReadinessThresholds) -> Readiness {
    if critical == 0 && overall >= thresholds.production_min_score {
        Readiness::ProductionReady
    } else if critical <= thresholds.review_max_critical && overall >= thresholds.review_min_score {
        Readiness::NeedsReview
    } else {
        Readiness::NeedsMajorFixes
    }
}

fn elements_with(pairs: &[ElementPair], predicate: impl Fn(&DifferenceKind) -> bool) -> usize {
    pairs.iter().filter(|p| p.has_kind(&predicate)).count()
}

/// Roll per-element differences up into scores and a verdict.
///
/// A category's mismatch count is the number of design elements with at
/// least one difference in that category.
pub fn aggregate(
    pairs: Vec<ElementPair>,
    unmatched_rendered: usize,
    thresholds: &ReadinessThresholds,
) -> ComparisonResult {
    let total = pairs.len();
    let matched = pairs.iter().filter(|p| p.is_matched()).count();

    let content_accuracy = accuracy(total, elements_with(&pairs, DifferenceKind::is_content));
    let typography_accuracy =
        accuracy(total, elements_with(&pairs, DifferenceKind::is_typography));
    let color_accuracy = accuracy(total, elements_with(&pairs, |k| *k == DifferenceKind::Color));
    let layout_accuracy = if total == 0 {
        100.0
    } else {
        100.0 * matched as f64 / total as f64
    };

    let overall_score =
        (content_accuracy + typography_accuracy + color_accuracy + layout_accuracy) / 4.0;

    let differences: Vec<_> = pairs.iter().flat_map(|p| p.differences.iter()).collect();
    let count_severity = |s: Severity| differences.iter().filter(|d| d.severity == s).count();

    let critical_issues: Vec<_> = differences
        .iter()
        .filter(|d| d.severity == Severity::Critical)
        .map(|d| (*d).clone())
        .collect();

    let summary = ComparisonSummary {
        total_elements: total,
        matched_elements: matched,
        missing_elements: total - matched,
        unmatched_rendered,
        text_mismatches: differences
            .iter()
            .filter(|d| d.kind == DifferenceKind::Text)
            .count(),
        style_mismatches: differences.iter().filter(|d| d.kind.is_style()).count(),
        critical: count_severity(Severity::Critical),
        high: count_severity(Severity::High),
        medium: count_severity(Severity::Medium),
        low: count_severity(Severity::Low),
    };

    let verdict = readiness(critical_issues.len(), overall_score, thresholds);

    tracing::info!(
        overall = overall_score,
        critical = critical_issues.len(),
        readiness = %verdict,
        "comparison aggregated"
    );

    ComparisonResult {
        overall_score,
        pairs,
        critical_issues,
        summary,
        quality: QualityReport {
            content_accuracy,
            typography_accuracy,
            color_accuracy,
            layout_accuracy,
            readiness: verdict,
        },
    }
}
