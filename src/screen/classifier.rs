use crate::model::element_model::ElementRole;

pub const HEADING_MIN_FONT_SIZE: f64 = 20.0;
pub const HEADING_MIN_FONT_WEIGHT: f64 = 600.0;
pub const LABEL_MAX_CHARS: usize = 45;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const HEADING_NAME_HINTS: [&str; 2] = ["heading", "title"];

/// Everything the role rules may look at. Design elements leave `tag` and
/// `aria_role` empty; rendered elements leave `name` empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleSignals<'a> {
    pub tag: Option<&'a str>,
    pub aria_role: Option<&'a str>,
    pub name: Option<&'a str>,
    pub font_size: Option<f64>,
    pub font_weight: Option<f64>,
    pub text: &'a str,
}

pub struct RoleRule {
    pub name: &'static str,
    pub role: ElementRole,
    pub applies: fn(&RoleSignals) -> bool,
}

/// Evaluated top to bottom; the first rule that applies wins.
pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        name: "heading-tag",
        role: ElementRole::Heading,
        applies: has_heading_tag,
    },
    RoleRule {
        name: "button",
        role: ElementRole::Button,
        applies: is_button,
    },
    RoleRule {
        name: "heading-name",
        role: ElementRole::Heading,
        applies: has_heading_name,
    },
    RoleRule {
        name: "large-bold-text",
        role: ElementRole::Heading,
        applies: is_large_bold,
    },
    RoleRule {
        name: "short-text",
        role: ElementRole::Label,
        applies: is_short_text,
    },
    RoleRule {
        name: "long-text",
        role: ElementRole::Paragraph,
        applies: has_text,
    },
];

fn has_heading_tag(s: &RoleSignals) -> bool {
    s.tag.is_some_and(|t| HEADING_TAGS.contains(&t))
}

fn is_button(s: &RoleSignals) -> bool {
    s.tag == Some("button") || s.aria_role == Some("button") || name_contains(s, &["button"])
}

fn has_heading_name(s: &RoleSignals) -> bool {
    name_contains(s, &HEADING_NAME_HINTS)
}

fn is_large_bold(s: &RoleSignals) -> bool {
    s.font_size.is_some_and(|v| v >= HEADING_MIN_FONT_SIZE)
        && s.font_weight.is_some_and(|v| v >= HEADING_MIN_FONT_WEIGHT)
}

fn is_short_text(s: &RoleSignals) -> bool {
    let text = s.text.trim();
    !text.is_empty() && text.chars().count() < LABEL_MAX_CHARS
}

fn has_text(s: &RoleSignals) -> bool {
    !s.text.trim().is_empty()
}

fn name_contains(signals: &RoleSignals, hints: &[&str]) -> bool {
    signals
        .name
        .map(|n| n.to_lowercase())
        .is_some_and(|n| hints.iter().any(|h| n.contains(h)))
}

/// The rule that decides `signals`, if any.
pub fn matching_rule(signals: &RoleSignals) -> Option<&'static RoleRule> {
    ROLE_RULES.iter().find(|rule| (rule.applies)(signals))
}

pub fn classify_role(signals: &RoleSignals) -> ElementRole {
    matching_rule(signals)
        .map(|rule| rule.role)
        .unwrap_or(ElementRole::Other)
}
