use crate::model::result_model::{ComparisonResult, Readiness};

// ============================================================================
// HTML reporter: self-contained HTML report
// ============================================================================

fn readiness_color(readiness: Readiness) -> &'static str {
    match readiness {
        Readiness::ProductionReady => "#4CAF50",
        Readiness::NeedsReview => "#FF9800",
        Readiness::NeedsMajorFixes => "#f44336",
    }
}

/// Generate a self-contained HTML report.
///
/// Header colour follows the readiness verdict; each design element gets
/// its own card listing its differences with their suggestions. Inline CSS
/// only.
pub fn generate_html_report(result: &ComparisonResult, title: &str) -> String {
    let quality = &result.quality;
    let summary = &result.summary;

    let mut cards = String::new();
    for pair in &result.pairs {
        let class = if !pair.is_matched() {
            "missing"
        } else if pair.differences.is_empty() {
            "pass"
        } else {
            "fail"
        };

        let matched_text = match &pair.rendered {
            Some(r) => format!(
                "Matched &lt;{}&gt; {} (confidence {:.2})",
                escape_html(&r.tag),
                escape_html(&r.id),
                pair.confidence
            ),
            None => "Not found on the page".to_string(),
        };

        cards.push_str(&format!(
            r#"<div class="element {class}">
<h3>{role}: {label}</h3>
<p>{matched}</p>
"#,
            class = class,
            role = pair.design.role,
            label = escape_html(pair.design.label()),
            matched = matched_text,
        ));

        if !pair.differences.is_empty() {
            cards.push_str("<ul class=\"differences\">\n");
            for d in &pair.differences {
                cards.push_str(&format!(
                    "<li class=\"{severity}\"><b>{severity}</b> {kind}: {description}<br><i>{suggestion}</i></li>\n",
                    severity = d.severity,
                    kind = d.kind,
                    description = escape_html(&d.description),
                    suggestion = escape_html(&d.suggestion),
                ));
            }
            cards.push_str("</ul>\n");
        }

        cards.push_str("</div>\n");
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - Design QA Report</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 0; background: #f5f5f5; }}
.header {{ background: {header_color}; color: white; padding: 20px 30px; }}
.header h1 {{ margin: 0 0 8px 0; font-size: 24px; }}
.header p {{ margin: 0; font-size: 16px; opacity: 0.9; }}
.scores {{ display: flex; gap: 12px; max-width: 900px; margin: 20px auto 0 auto; padding: 0 20px; }}
.score {{ flex: 1; background: white; border-radius: 6px; padding: 12px; text-align: center; }}
.score b {{ display: block; font-size: 22px; }}
.content {{ max-width: 900px; margin: 20px auto; padding: 0 20px; }}
.element {{ background: white; border-radius: 6px; padding: 16px 20px; margin-bottom: 12px; border-left: 4px solid #ccc; }}
.element.pass {{ border-left-color: #4CAF50; }}
.element.fail {{ border-left-color: #FF9800; }}
.element.missing {{ border-left-color: #f44336; }}
.element h3 {{ margin: 0 0 8px 0; font-size: 16px; }}
.element p {{ margin: 4px 0; color: #666; font-size: 14px; }}
.differences {{ margin: 8px 0 0 0; padding-left: 20px; }}
.differences li {{ font-size: 13px; margin-bottom: 6px; }}
.differences li.critical {{ color: #b71c1c; }}
.differences li.high {{ color: #c62828; }}
.differences li.medium {{ color: #e65100; }}
.differences li.low {{ color: #555; }}
</style>
</head>
<body>
<div class="header">
<h1>{score:.1} / 100 ({readiness})</h1>
<p>{title}: {matched} of {total} elements matched, {missing} missing, {critical} critical issue(s)</p>
</div>
<div class="scores">
<div class="score"><b>{content:.1}</b>Content</div>
<div class="score"><b>{typography:.1}</b>Typography</div>
<div class="score"><b>{color:.1}</b>Color</div>
<div class="score"><b>{layout:.1}</b>Layout</div>
</div>
<div class="content">
{cards}
</div>
</body>
</html>"##,
        title = escape_html(title),
        header_color = readiness_color(quality.readiness),
        score = result.overall_score,
        readiness = quality.readiness,
        matched = summary.matched_elements,
        total = summary.total_elements,
        missing = summary.missing_elements,
        critical = result.critical_issues.len(),
        content = quality.content_accuracy,
        typography = quality.typography_accuracy,
        color = quality.color_accuracy,
        layout = quality.layout_accuracy,
        cards = cards,
    )
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
