use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns a reason when the box cannot take part in geometry scoring.
    ///
    /// Negative coordinates are accepted: off-screen nodes and text that
    /// overflows its frame both have them. Sizes must not be negative.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("bounding box {} is not finite ({})", name, value));
            }
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(format!(
                "bounding box has negative size ({}x{})",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementRole {
    Heading,
    Paragraph,
    Button,
    Label,
    Other,
}

impl ElementRole {
    /// `Other` carries no information and never triggers the role penalty.
    pub fn is_known(&self) -> bool {
        !matches!(self, ElementRole::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementRole::Heading => "heading",
            ElementRole::Paragraph => "paragraph",
            ElementRole::Button => "button",
            ElementRole::Label => "label",
            ElementRole::Other => "other",
        }
    }
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typography and colour as resolved by the design tool.
///
/// Every field is optional: an absent value means the design makes no
/// claim about that attribute and the differ skips it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<f64>,
    /// Hex colour resolved from the first solid fill.
    pub color: Option<String>,
}

/// Computed style strings exactly as the browser reported them
/// (`"16px"`, `"700"`, `"rgb(0, 0, 0)"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<String>,
    #[serde(default)]
    pub font_weight: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A text-bearing node from the design tool's scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    pub id: String,
    pub name: String,
    /// Scene-graph node type (`TEXT`, `FRAME`, ...).
    #[serde(default)]
    pub node_type: String,
    pub text: Option<String>,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub style: DesignStyle,
    pub role: ElementRole,
    #[serde(default)]
    pub hierarchy: Vec<String>,
}

impl DesignElement {
    /// Text if present, otherwise the node type; used for `missing` reporting.
    /// The name stands in only when the type is unknown.
    pub fn label(&self) -> &str {
        match self.text.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ if !self.node_type.is_empty() => &self.node_type,
            _ => &self.name,
        }
    }
}

/// A visible element from the live page render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedElement {
    pub id: String,
    pub tag: String,
    /// Direct text nodes only.
    pub own_text: String,
    /// Full `textContent`, descendants included.
    pub text_content: String,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub style: ComputedStyle,
    pub role: ElementRole,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub hierarchy: Vec<String>,
}

impl RenderedElement {
    /// Text the differ checks against: own text, or the full content when
    /// the element has no direct text nodes.
    pub fn visible_text(&self) -> &str {
        if self.own_text.trim().is_empty() {
            &self.text_content
        } else {
            &self.own_text
        }
    }
}
