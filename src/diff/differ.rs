use serde::{Deserialize, Serialize};

use crate::diff::style_value::{
    font_families_match, format_number, normalize_color, parse_font_weight, parse_px,
};
use crate::model::element_model::{DesignElement, RenderedElement};
use crate::model::result_model::{Difference, DifferenceKind, Severity};
use crate::text::normalize::normalize;

pub const FONT_SIZE_TOLERANCE_PX: f64 = 2.0;
pub const FONT_SIZE_HIGH_SEVERITY_PX: f64 = 6.0;
pub const FONT_WEIGHT_TOLERANCE: f64 = 100.0;

/// Shown as the actual value of a `missing` difference.
pub const MISSING_ACTUAL: &str = "Missing";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffTolerances {
    /// Font sizes may differ by up to this many px without a difference.
    #[serde(default = "default_font_size_px")]
    pub font_size_px: f64,

    /// Above this delta a font-size difference is `high` instead of `medium`.
    #[serde(default = "default_font_size_high_px")]
    pub font_size_high_px: f64,

    #[serde(default = "default_font_weight")]
    pub font_weight: f64,
}

impl Default for DiffTolerances {
    fn default() -> Self {
        Self {
            font_size_px: FONT_SIZE_TOLERANCE_PX,
            font_size_high_px: FONT_SIZE_HIGH_SEVERITY_PX,
            font_weight: FONT_WEIGHT_TOLERANCE,
        }
    }
}

fn default_font_size_px() -> f64 { FONT_SIZE_TOLERANCE_PX }
fn default_font_size_high_px() -> f64 { FONT_SIZE_HIGH_SEVERITY_PX }
fn default_font_weight() -> f64 { FONT_WEIGHT_TOLERANCE }

/// Compare every attribute of a matched pair. All checks run; a pair can
/// produce several differences.
pub fn diff_pair(
    design: &DesignElement,
    rendered: &RenderedElement,
    tolerances: &DiffTolerances,
) -> Vec<Difference> {
    [
        check_text(design, rendered),
        check_font_family(design, rendered),
        check_font_size(design, rendered, tolerances),
        check_font_weight(design, rendered, tolerances),
        check_color(design, rendered),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// The single difference an unmatched design element yields.
pub fn missing_difference(design: &DesignElement) -> Difference {
    let label = design.label().to_string();
    Difference {
        kind: DifferenceKind::Missing,
        severity: Severity::High,
        expected: label.clone(),
        actual: MISSING_ACTUAL.to_string(),
        description: format!(
            "{} \"{}\" is present in design but missing on the page",
            design.role, label
        ),
        suggestion: format!("Add missing element: \"{}\"", label),
    }
}

fn check_text(design: &DesignElement, rendered: &RenderedElement) -> Option<Difference> {
    let expected = design.text.as_deref().filter(|t| !t.trim().is_empty())?;
    let actual = rendered.visible_text();

    if normalize(expected) == normalize(actual) {
        return None;
    }

    Some(Difference {
        kind: DifferenceKind::Text,
        severity: Severity::Critical,
        expected: expected.to_string(),
        actual: actual.to_string(),
        description: "Text content does not match design".to_string(),
        suggestion: format!("Update text content to: \"{}\"", expected),
    })
}

fn check_font_family(design: &DesignElement, rendered: &RenderedElement) -> Option<Difference> {
    let expected = design.style.font_family.as_deref()?;
    let actual = rendered.style.font_family.as_deref().unwrap_or("");

    if font_families_match(expected, actual) {
        return None;
    }

    Some(Difference {
        kind: DifferenceKind::FontFamily,
        severity: Severity::High,
        expected: expected.to_string(),
        actual: actual.to_string(),
        description: "Font family does not match design".to_string(),
        suggestion: format!("Update font-family to: {}", expected),
    })
}

fn check_font_size(
    design: &DesignElement,
    rendered: &RenderedElement,
    tolerances: &DiffTolerances,
) -> Option<Difference> {
    let expected = design.style.font_size?;
    let raw = rendered.style.font_size.as_deref().unwrap_or("");

    let severity = match parse_px(raw) {
        Some(actual) => {
            let delta = (expected - actual).abs();
            if delta <= tolerances.font_size_px {
                return None;
            }
            if delta <= tolerances.font_size_high_px {
                Severity::Medium
            } else {
                Severity::High
            }
        }
        // Unknown magnitude: assume the worst.
        None => Severity::High,
    };

    let expected_px = format!("{}px", format_number(expected));
    Some(Difference {
        kind: DifferenceKind::FontSize,
        severity,
        expected: expected_px.clone(),
        actual: raw.to_string(),
        description: "Font size does not match design".to_string(),
        suggestion: format!("Update font-size to: {}", expected_px),
    })
}

fn check_font_weight(
    design: &DesignElement,
    rendered: &RenderedElement,
    tolerances: &DiffTolerances,
) -> Option<Difference> {
    let expected = design.style.font_weight?;
    let raw = rendered.style.font_weight.as_deref().unwrap_or("");

    if let Some(actual) = parse_font_weight(raw)
        && (expected - actual).abs() <= tolerances.font_weight
    {
        return None;
    }

    Some(Difference {
        kind: DifferenceKind::FontWeight,
        severity: Severity::Medium,
        expected: format_number(expected),
        actual: raw.to_string(),
        description: "Font weight does not match design".to_string(),
        suggestion: format!("Update font-weight to: {}", format_number(expected)),
    })
}

fn check_color(design: &DesignElement, rendered: &RenderedElement) -> Option<Difference> {
    let expected_raw = design.style.color.as_deref()?;
    let actual_raw = rendered.style.color.as_deref().unwrap_or("");

    let expected = normalize_color(expected_raw);
    let actual = normalize_color(actual_raw);

    if let (Some(e), Some(a)) = (&expected, &actual)
        && e == a
    {
        return None;
    }

    let expected = expected.unwrap_or_else(|| expected_raw.to_string());
    let actual = actual.unwrap_or_else(|| actual_raw.to_string());
    Some(Difference {
        kind: DifferenceKind::Color,
        severity: Severity::Medium,
        suggestion: format!("Update color to: {}", expected),
        expected,
        actual,
        description: "Text color does not match design".to_string(),
    })
}
