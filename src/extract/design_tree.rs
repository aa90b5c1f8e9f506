use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diff::style_value::{FillColor, rgb_to_hex};
use crate::error::{QaError, Result};
use crate::model::element_model::{BoundingBox, DesignElement, DesignStyle};
use crate::screen::classifier::{RoleSignals, classify_role};

/// A node of the design API's document tree. Only the fields the
/// comparison needs are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub absolute_bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub fills: Vec<Fill>,
    #[serde(default)]
    pub style: Option<TypeStyle>,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(default)]
    pub children: Vec<DesignNode>,
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fill {
    #[serde(rename = "type")]
    pub fill_type: String,
    #[serde(default)]
    pub color: Option<FillColor>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<f64>,
}

/// Distinct style values used across a design frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DesignTokens {
    pub colors: BTreeSet<String>,
    pub fonts: BTreeSet<String>,
    pub font_sizes: Vec<f64>,
    pub font_weights: Vec<f64>,
}

/// Accepts a bare node, `{"document": node}`, or the API's
/// `{"nodes": {"<id>": {"document": node}}}` envelope.
pub fn parse_design_document(json: &str) -> Result<DesignNode> {
    let value: Value = serde_json::from_str(json).map_err(|e| QaError::json("design document", e))?;

    let node = if let Some(nodes) = value.get("nodes").and_then(Value::as_object) {
        nodes
            .values()
            .find_map(|entry| entry.get("document"))
            .cloned()
            .ok_or_else(|| QaError::malformed("nodes", "envelope contains no document"))?
    } else if let Some(document) = value.get("document") {
        document.clone()
    } else {
        value
    };

    serde_json::from_value(node).map_err(|e| QaError::json("design node", e))
}

fn first_solid_fill(node: &DesignNode) -> Option<String> {
    node.fills
        .iter()
        .find(|f| f.visible && f.fill_type == "SOLID" && f.color.is_some())
        .and_then(|f| f.color.as_ref())
        .map(rgb_to_hex)
}

/// Flatten the text nodes of `root` into design elements.
///
/// Boxes are translated so the root frame's top-left corner is the origin,
/// matching the frame's rendered screenshot. A text node without a box is
/// an error rather than a zero-sized element.
pub fn extract_design_elements(root: &DesignNode) -> Result<Vec<DesignElement>> {
    let origin = root
        .absolute_bounding_box
        .map(|b| (b.x, b.y))
        .unwrap_or((0.0, 0.0));

    let mut elements = Vec::new();
    walk(root, &[], origin, &mut elements)?;

    tracing::info!(
        frame = %root.name,
        text_elements = elements.len(),
        "design frame flattened"
    );
    Ok(elements)
}

fn walk(
    node: &DesignNode,
    parents: &[String],
    origin: (f64, f64),
    out: &mut Vec<DesignElement>,
) -> Result<()> {
    if !node.visible {
        return Ok(());
    }

    let name = if node.name.is_empty() { "unnamed" } else { node.name.as_str() };
    let mut hierarchy = parents.to_vec();
    hierarchy.push(format!("{}:{}", node.node_type, name));

    if node.node_type == "TEXT" {
        let text = node.characters.as_deref().unwrap_or("").trim();
        if !text.is_empty() {
            out.push(text_element(node, text, hierarchy, origin)?);
        }
        return Ok(());
    }

    for child in &node.children {
        walk(child, &hierarchy, origin, out)?;
    }
    Ok(())
}

fn text_element(
    node: &DesignNode,
    text: &str,
    hierarchy: Vec<String>,
    origin: (f64, f64),
) -> Result<DesignElement> {
    let bounds = node
        .absolute_bounding_box
        .ok_or_else(|| QaError::malformed(&node.id, "text node has no absoluteBoundingBox"))?;
    bounds
        .validate()
        .map_err(|reason| QaError::malformed(&node.id, reason))?;

    let type_style = node.style.clone().unwrap_or_default();
    let style = DesignStyle {
        font_family: type_style.font_family.filter(|f| !f.trim().is_empty()),
        font_size: type_style.font_size,
        font_weight: type_style.font_weight,
        color: first_solid_fill(node),
    };

    let role = classify_role(&RoleSignals {
        name: Some(node.name.as_str()),
        font_size: style.font_size,
        font_weight: style.font_weight,
        text,
        ..RoleSignals::default()
    });

    Ok(DesignElement {
        id: node.id.clone(),
        name: if node.name.is_empty() {
            "Text".to_string()
        } else {
            node.name.clone()
        },
        node_type: node.node_type.clone(),
        text: Some(text.to_string()),
        bounding_box: BoundingBox::new(
            bounds.x - origin.0,
            bounds.y - origin.1,
            bounds.width,
            bounds.height,
        ),
        style,
        role,
        hierarchy,
    })
}

pub fn collect_design_tokens(elements: &[DesignElement]) -> DesignTokens {
    let mut tokens = DesignTokens::default();

    for el in elements {
        if let Some(color) = &el.style.color {
            tokens.colors.insert(color.clone());
        }
        if let Some(font) = &el.style.font_family {
            tokens.fonts.insert(font.clone());
        }
        if let Some(size) = el.style.font_size {
            tokens.font_sizes.push(size);
        }
        if let Some(weight) = el.style.font_weight {
            tokens.font_weights.push(weight);
        }
    }

    for values in [&mut tokens.font_sizes, &mut tokens.font_weights] {
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
    }

    tokens
}
