use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::element_model::{DesignElement, RenderedElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifferenceKind {
    Text,
    FontFamily,
    FontSize,
    FontWeight,
    Color,
    Missing,
}

impl DifferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifferenceKind::Text => "text",
            DifferenceKind::FontFamily => "font-family",
            DifferenceKind::FontSize => "font-size",
            DifferenceKind::FontWeight => "font-weight",
            DifferenceKind::Color => "color",
            DifferenceKind::Missing => "missing",
        }
    }

    pub fn is_typography(&self) -> bool {
        matches!(
            self,
            DifferenceKind::FontFamily | DifferenceKind::FontSize | DifferenceKind::FontWeight
        )
    }

    pub fn is_content(&self) -> bool {
        matches!(self, DifferenceKind::Text | DifferenceKind::Missing)
    }

    /// Style mismatches as counted in the summary: typography plus colour.
    pub fn is_style(&self) -> bool {
        self.is_typography() || *self == DifferenceKind::Color
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub kind: DifferenceKind,
    pub severity: Severity,
    pub expected: String,
    pub actual: String,
    pub description: String,
    pub suggestion: String,
}

/// One design element and the rendered element chosen for it, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPair {
    pub design: DesignElement,
    pub rendered: Option<RenderedElement>,
    /// Match confidence in [0, 1]; 0 for unmatched design elements.
    pub confidence: f64,
    pub differences: Vec<Difference>,
}

impl ElementPair {
    pub fn is_matched(&self) -> bool {
        self.rendered.is_some()
    }

    pub fn has_kind(&self, predicate: impl Fn(&DifferenceKind) -> bool) -> bool {
        self.differences.iter().any(|d| predicate(&d.kind))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Readiness {
    ProductionReady,
    NeedsReview,
    NeedsMajorFixes,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::ProductionReady => "production-ready",
            Readiness::NeedsReview => "needs-review",
            Readiness::NeedsMajorFixes => "needs-major-fixes",
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub total_elements: usize,
    pub matched_elements: usize,
    pub missing_elements: usize,
    /// Text-bearing rendered elements that no design element selected.
    pub unmatched_rendered: usize,
    pub text_mismatches: usize,
    pub style_mismatches: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub content_accuracy: f64,
    pub typography_accuracy: f64,
    pub color_accuracy: f64,
    pub layout_accuracy: f64,
    pub readiness: Readiness,
}

/// Outcome of one `compare` call. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub overall_score: f64,
    pub pairs: Vec<ElementPair>,
    pub critical_issues: Vec<Difference>,
    pub summary: ComparisonSummary,
    pub quality: QualityReport,
}

impl ComparisonResult {
    pub fn differences(&self) -> impl Iterator<Item = &Difference> {
        self.pairs.iter().flat_map(|p| p.differences.iter())
    }
}
