use std::collections::BTreeMap;

use design_qa::model::element_model::{
    BoundingBox, ComputedStyle, DesignElement, DesignStyle, ElementRole, RenderedElement,
};
use design_qa::text::embedding::TextSimilarity;

pub fn bbox(x: f64, y: f64, width: f64, height: f64) -> BoundingBox {
    BoundingBox::new(x, y, width, height)
}

pub fn design(id: &str, text: &str, bounds: BoundingBox) -> DesignElement {
    DesignElement {
        id: id.to_string(),
        name: text.to_string(),
        node_type: "TEXT".to_string(),
        text: Some(text.to_string()),
        bounding_box: bounds,
        style: DesignStyle::default(),
        role: ElementRole::Other,
        hierarchy: vec![],
    }
}

pub fn styled_design(id: &str, text: &str, bounds: BoundingBox, style: DesignStyle) -> DesignElement {
    DesignElement {
        style,
        ..design(id, text, bounds)
    }
}

pub fn rendered(id: &str, text: &str, bounds: BoundingBox) -> RenderedElement {
    RenderedElement {
        id: id.to_string(),
        tag: "p".to_string(),
        own_text: text.to_string(),
        text_content: text.to_string(),
        bounding_box: bounds,
        style: ComputedStyle::default(),
        role: ElementRole::Other,
        attributes: BTreeMap::new(),
        hierarchy: vec![],
    }
}

pub fn styled_rendered(
    id: &str,
    text: &str,
    bounds: BoundingBox,
    style: ComputedStyle,
) -> RenderedElement {
    RenderedElement {
        style,
        ..rendered(id, text, bounds)
    }
}

pub fn computed(family: &str, size: &str, weight: &str, color: &str) -> ComputedStyle {
    ComputedStyle {
        font_family: Some(family.to_string()),
        font_size: Some(size.to_string()),
        font_weight: Some(weight.to_string()),
        color: Some(color.to_string()),
    }
}

/// Similarity that ignores the texts and returns a fixed value.
pub struct FixedSimilarity(pub f64);

impl TextSimilarity for FixedSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.trim().is_empty() || b.trim().is_empty() {
            0.0
        } else {
            self.0
        }
    }
}
