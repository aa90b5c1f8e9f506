use crate::model::result_model::{ComparisonResult, ElementPair};

// ============================================================================
// JUnit XML reporter: standard CI integration format
// ============================================================================

/// Generate a JUnit XML report for CI systems.
///
/// Every design element is a testcase; an element with differences (or
/// with no rendered counterpart) carries one `<failure>` listing them:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="Checkout" tests="2" failures="1">
///   <testcase name="heading: Welcome" classname="design-qa.heading" />
///   <testcase name="label: Day workshop" classname="design-qa.label">
///     <failure message="1 difference(s), worst critical" type="text">...</failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(result: &ComparisonResult, suite_name: &str) -> String {
    let failures = result
        .pairs
        .iter()
        .filter(|p| !p.differences.is_empty())
        .count();

    let mut cases = String::new();
    for pair in &result.pairs {
        cases.push_str(&testcase(pair));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\">\n{cases}</testsuite>\n",
        name = escape_xml(suite_name),
        tests = result.pairs.len(),
        failures = failures,
        cases = cases,
    )
}

fn testcase(pair: &ElementPair) -> String {
    let name = escape_xml(&format!("{}: {}", pair.design.role, pair.design.label()));
    let classname = format!("design-qa.{}", pair.design.role);

    // Differences are never empty for an unmatched element: it carries `missing`.
    let Some(worst) = pair.differences.iter().min_by_key(|d| d.severity) else {
        return format!(
            "  <testcase name=\"{}\" classname=\"{}\" />\n",
            name, classname
        );
    };

    let body = pair
        .differences
        .iter()
        .map(|d| format!("[{}] {}: {}", d.severity, d.kind, d.description))
        .collect::<Vec<_>>()
        .join("\n");

    let message = format!(
        "{} difference(s), worst {}",
        pair.differences.len(),
        worst.severity
    );

    format!(
        "  <testcase name=\"{name}\" classname=\"{classname}\">\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n  </testcase>\n",
        name = name,
        classname = classname,
        message = escape_xml(&message),
        kind = worst.kind,
        body = escape_xml(&body),
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
