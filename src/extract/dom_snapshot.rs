use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::diff::style_value::{parse_font_weight, parse_px, primary_font_family};
use crate::error::{QaError, Result};
use crate::model::element_model::{BoundingBox, ComputedStyle, RenderedElement};
use crate::screen::classifier::{RoleSignals, classify_role};

/// One element as emitted by the in-page extraction script.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub tag_name: String,
    /// Direct text nodes only.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub styles: ComputedStyle,
    #[serde(default)]
    pub position: Option<BoundingBox>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub hierarchy: Vec<String>,
}

/// Accepts a bare array of records, or an object carrying them under
/// `elements` or `dom`.
pub fn parse_dom_snapshot(json: &str) -> Result<Vec<RenderedElement>> {
    let value: Value = serde_json::from_str(json).map_err(|e| QaError::json("DOM snapshot", e))?;

    let records = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove("elements")
            .or_else(|| map.remove("dom"))
            .ok_or_else(|| QaError::malformed("snapshot", "no 'elements' or 'dom' array"))?,
        _ => return Err(QaError::malformed("snapshot", "expected an array or object")),
    };

    let records: Vec<DomRecord> =
        serde_json::from_value(records).map_err(|e| QaError::json("DOM records", e))?;
    normalize_dom_records(records)
}

/// Turn raw records into rendered elements.
///
/// Records with zero width or height are dropped as invisible; a record
/// without a position is an error. Missing ids get a stable `<tag> #<index>`;
/// the space keeps them apart from real element ids, which never contain one.
pub fn normalize_dom_records(records: Vec<DomRecord>) -> Result<Vec<RenderedElement>> {
    let total = records.len();
    let mut elements = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        let tag = record.tag_name.trim().to_lowercase();
        let id = record
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("{} #{}", tag, index));

        let position = record
            .position
            .ok_or_else(|| QaError::malformed(&id, "rendered element has no position"))?;
        position
            .validate()
            .map_err(|reason| QaError::malformed(&id, reason))?;
        if position.width == 0.0 || position.height == 0.0 {
            continue;
        }

        let style = ComputedStyle {
            font_family: record
                .styles
                .font_family
                .as_deref()
                .map(primary_font_family)
                .filter(|f| !f.is_empty()),
            ..record.styles
        };

        let own_text = record.text.trim().to_string();
        let role = classify_role(&RoleSignals {
            tag: Some(tag.as_str()),
            aria_role: record.attributes.get("role").map(String::as_str),
            font_size: style.font_size.as_deref().and_then(parse_px),
            font_weight: style.font_weight.as_deref().and_then(parse_font_weight),
            text: &own_text,
            ..RoleSignals::default()
        });

        elements.push(RenderedElement {
            id,
            tag,
            own_text,
            text_content: record.text_content.trim().to_string(),
            bounding_box: position,
            style,
            role,
            attributes: record.attributes,
            hierarchy: record.hierarchy,
        });
    }

    tracing::info!(
        records = total,
        visible = elements.len(),
        "DOM snapshot normalised"
    );
    Ok(elements)
}
