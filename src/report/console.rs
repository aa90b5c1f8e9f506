use crate::model::result_model::{ComparisonResult, ElementPair, Readiness};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a comparison result for terminal output.
///
/// Produces output like:
/// ```text
/// === Design QA: 87.5 / 100 (needs-review) ===
///
/// Content 100.0  Typography 75.0  Color 100.0  Layout 75.0
///
/// ✓ MATCH    heading "Welcome back" (confidence 0.92)
/// ✗ DIFF     label "Day workshop" (confidence 0.81)
///     [critical] text: expected "Day workshop", actual ""
///         Update text content to: "Day workshop"
/// ✗ MISSING  button "Sign up"
///
/// === 4 elements: 3 matched, 1 missing, 2 unmatched on page ===
/// ```
pub fn format_console_report(result: &ComparisonResult) -> String {
    let mut out = String::new();
    let quality = &result.quality;

    out.push_str(&format!(
        "=== Design QA: {:.1} / 100 ({}) ===\n\n",
        result.overall_score, quality.readiness
    ));

    out.push_str(&format!(
        "Content {:.1}  Typography {:.1}  Color {:.1}  Layout {:.1}\n\n",
        quality.content_accuracy,
        quality.typography_accuracy,
        quality.color_accuracy,
        quality.layout_accuracy
    ));

    for pair in &result.pairs {
        out.push_str(&format_pair(pair));
    }

    let summary = &result.summary;
    out.push_str(&format!(
        "\n=== {} elements: {} matched, {} missing, {} unmatched on page ===\n",
        summary.total_elements,
        summary.matched_elements,
        summary.missing_elements,
        summary.unmatched_rendered
    ));

    if !result.critical_issues.is_empty() {
        out.push_str(&format!(
            "{} critical issue(s) must be fixed before release.\n",
            result.critical_issues.len()
        ));
    } else if quality.readiness == Readiness::ProductionReady {
        out.push_str("Ready for production.\n");
    }

    out
}

fn format_pair(pair: &ElementPair) -> String {
    let design = &pair.design;
    let mut out = String::new();

    let marker = if !pair.is_matched() {
        "\u{2717} MISSING"
    } else if pair.differences.is_empty() {
        "\u{2713} MATCH  "
    } else {
        "\u{2717} DIFF   "
    };

    if pair.is_matched() {
        out.push_str(&format!(
            "{}  {} \"{}\" (confidence {:.2})\n",
            marker,
            design.role,
            design.label(),
            pair.confidence
        ));
    } else {
        out.push_str(&format!("{}  {} \"{}\"\n", marker, design.role, design.label()));
        return out;
    }

    for d in &pair.differences {
        out.push_str(&format!(
            "    [{}] {}: expected \"{}\", actual \"{}\"\n        {}\n",
            d.severity, d.kind, d.expected, d.actual, d.suggestion
        ));
    }

    out
}
