use serde::{Deserialize, Serialize};

use crate::geometry::iou::{iou, proximity};
use crate::model::element_model::{DesignElement, RenderedElement};
use crate::text::embedding::TextSimilarity;

pub const IOU_WEIGHT: f64 = 0.6;
pub const TEXT_WEIGHT: f64 = 0.4;
pub const ROLE_PENALTY: f64 = 0.5;
/// A best candidate must score strictly above this to count as a match.
pub const MIN_MATCH_CONFIDENCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_iou_weight")]
    pub iou_weight: f64,
    #[serde(default = "default_text_weight")]
    pub text_weight: f64,
    #[serde(default = "default_role_penalty")]
    pub role_penalty: f64,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            iou_weight: IOU_WEIGHT,
            text_weight: TEXT_WEIGHT,
            role_penalty: ROLE_PENALTY,
            min_confidence: MIN_MATCH_CONFIDENCE,
        }
    }
}

fn default_iou_weight() -> f64 { IOU_WEIGHT }
fn default_text_weight() -> f64 { TEXT_WEIGHT }
fn default_role_penalty() -> f64 { ROLE_PENALTY }
fn default_min_confidence() -> f64 { MIN_MATCH_CONFIDENCE }

/// Breakdown of one design/rendered candidate score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub iou: f64,
    pub text: f64,
    pub penalty: f64,
    pub total: f64,
}

/// Result of matching one design element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementMatch {
    pub design: usize,
    pub rendered: Option<usize>,
    /// Best score clamped to [0, 1]; 0 when unmatched.
    pub confidence: f64,
}

pub fn score_candidate(
    design: &DesignElement,
    rendered: &RenderedElement,
    similarity: &dyn TextSimilarity,
    config: &MatchConfig,
) -> CandidateScore {
    let overlap = iou(&design.bounding_box, &rendered.bounding_box);
    let text = similarity.similarity(design.text.as_deref().unwrap_or(""), &rendered.own_text);

    let penalty = if design.role.is_known()
        && rendered.role.is_known()
        && design.role != rendered.role
    {
        config.role_penalty
    } else {
        0.0
    };

    CandidateScore {
        iou: overlap,
        text,
        penalty,
        total: config.iou_weight * overlap + config.text_weight * text - penalty,
    }
}

/// Best rendered candidate for one design element, if it clears the threshold.
///
/// Equal scores are broken by positional proximity, then by input order.
pub fn best_match(
    design: &DesignElement,
    rendered: &[RenderedElement],
    similarity: &dyn TextSimilarity,
    config: &MatchConfig,
) -> Option<(usize, CandidateScore)> {
    let mut best: Option<(usize, CandidateScore, f64)> = None;

    for (index, candidate) in rendered.iter().enumerate() {
        let score = score_candidate(design, candidate, similarity, config);
        let near = proximity(&design.bounding_box, &candidate.bounding_box);

        let better = match &best {
            None => true,
            Some((_, current, current_near)) => {
                score.total > current.total || (score.total == current.total && near > *current_near)
            }
        };
        if better {
            best = Some((index, score, near));
        }
    }

    let (index, score, _) = best?;
    if score.total > config.min_confidence {
        Some((index, score))
    } else {
        tracing::debug!(
            design = %design.id,
            rendered = %rendered[index].id,
            iou = score.iou,
            text = score.text,
            penalty = score.penalty,
            total = score.total,
            threshold = config.min_confidence,
            "best candidate rejected"
        );
        None
    }
}

/// Greedy per-design-element assignment, O(D x R).
///
/// No global assignment is attempted: a rendered element may be the best
/// match for several design elements, and when the same text appears at
/// several positions the wrong instance can win.
pub fn match_elements(
    design: &[DesignElement],
    rendered: &[RenderedElement],
    similarity: &dyn TextSimilarity,
    config: &MatchConfig,
) -> Vec<ElementMatch> {
    design
        .iter()
        .enumerate()
        .map(|(index, element)| match best_match(element, rendered, similarity, config) {
            Some((found, score)) => {
                tracing::debug!(
                    design = %element.id,
                    rendered = %rendered[found].id,
                    iou = score.iou,
                    text = score.text,
                    penalty = score.penalty,
                    total = score.total,
                    "matched"
                );
                ElementMatch {
                    design: index,
                    rendered: Some(found),
                    confidence: score.total.clamp(0.0, 1.0),
                }
            }
            None => {
                tracing::debug!(design = %element.id, "no candidate above threshold");
                ElementMatch {
                    design: index,
                    rendered: None,
                    confidence: 0.0,
                }
            }
        })
        .collect()
}
