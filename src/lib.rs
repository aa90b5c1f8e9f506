use std::time::Duration;

use crate::{
    diff::differ::{DiffTolerances, diff_pair, missing_difference},
    error::{QaError, Result},
    extract::source::{DesignSource, PageSource},
    matching::matcher::{MatchConfig, match_elements},
    model::{
        element_model::{DesignElement, RenderedElement},
        result_model::{ComparisonResult, ElementPair},
    },
    report::aggregate::{ReadinessThresholds, aggregate},
    text::embedding::{SemanticScorer, TextSimilarity},
};

pub mod browser;
pub mod cli;
pub mod diff;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod matching;
pub mod model;
pub mod raster;
pub mod report;
pub mod screen;
pub mod text;

/// Wall-clock limit for a whole comparison, collaborators included.
pub const COMPARISON_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything a comparison needs besides its inputs.
#[derive(Default)]
pub struct Comparator {
    pub scorer: SemanticScorer,
    pub matching: MatchConfig,
    pub tolerances: DiffTolerances,
    pub readiness: ReadinessThresholds,
}

impl Comparator {
    pub fn new(scorer: SemanticScorer) -> Self {
        Self {
            scorer,
            ..Self::default()
        }
    }

    /// Match, diff and score one design frame against one page render.
    ///
    /// Only the embedding step awaits; matching, diffing and aggregation
    /// run synchronously once every text has been embedded.
    pub async fn compare(
        &self,
        design: &[DesignElement],
        rendered: &[RenderedElement],
    ) -> Result<ComparisonResult> {
        validate_inputs(design, rendered)?;

        tracing::info!(
            design = design.len(),
            rendered = rendered.len(),
            "comparison started"
        );

        let texts = design
            .iter()
            .filter_map(|d| d.text.as_deref())
            .chain(rendered.iter().map(|r| r.own_text.as_str()));
        let index = self.scorer.prepare(texts).await;

        tracing::info!(
            texts = index.len(),
            fallbacks = index.fallback_count(),
            "texts embedded"
        );

        Ok(self.compare_with_similarity(design, rendered, &index))
    }

    /// The synchronous core of [`Comparator::compare`], for callers that
    /// bring their own similarity. Inputs are assumed validated.
    pub fn compare_with_similarity(
        &self,
        design: &[DesignElement],
        rendered: &[RenderedElement],
        similarity: &dyn TextSimilarity,
    ) -> ComparisonResult {
        let matches = match_elements(design, rendered, similarity, &self.matching);

        let mut selected = vec![false; rendered.len()];
        let pairs: Vec<ElementPair> = matches
            .into_iter()
            .map(|m| {
                let element = &design[m.design];
                match m.rendered {
                    Some(found) => {
                        selected[found] = true;
                        let counterpart = &rendered[found];
                        ElementPair {
                            design: element.clone(),
                            rendered: Some(counterpart.clone()),
                            confidence: m.confidence,
                            differences: diff_pair(element, counterpart, &self.tolerances),
                        }
                    }
                    None => ElementPair {
                        design: element.clone(),
                        rendered: None,
                        confidence: 0.0,
                        differences: vec![missing_difference(element)],
                    },
                }
            })
            .collect();

        let unmatched_rendered = rendered
            .iter()
            .zip(&selected)
            .filter(|(r, chosen)| !**chosen && !r.own_text.trim().is_empty())
            .count();

        tracing::info!(
            pairs = pairs.len(),
            unmatched_rendered,
            "elements matched and diffed"
        );

        aggregate(pairs, unmatched_rendered, &self.readiness)
    }
}

fn validate_inputs(design: &[DesignElement], rendered: &[RenderedElement]) -> Result<()> {
    let boxes = design
        .iter()
        .map(|d| (d.id.as_str(), &d.bounding_box))
        .chain(rendered.iter().map(|r| (r.id.as_str(), &r.bounding_box)));

    for (id, bounds) in boxes {
        if id.trim().is_empty() {
            return Err(QaError::malformed("<empty id>", "element id must not be empty"));
        }
        bounds
            .validate()
            .map_err(|reason| QaError::malformed(id, reason))?;
    }
    Ok(())
}

/// Compare with the default comparator (hashed embeddings, default thresholds).
pub async fn compare(
    design: &[DesignElement],
    rendered: &[RenderedElement],
) -> Result<ComparisonResult> {
    Comparator::default().compare(design, rendered).await
}

/// [`Comparator::compare`] bounded by `limit`.
pub async fn compare_with_deadline(
    comparator: &Comparator,
    design: &[DesignElement],
    rendered: &[RenderedElement],
    limit: Duration,
) -> Result<ComparisonResult> {
    tokio::time::timeout(limit, comparator.compare(design, rendered))
        .await
        .map_err(|_| QaError::Timeout { limit })?
}

// =========================================================================
// Collaborator-driven run
// =========================================================================

/// Fetch both sides concurrently, then compare, all within `limit`.
pub async fn run_comparison(
    design: &dyn DesignSource,
    page: &dyn PageSource,
    comparator: &Comparator,
    limit: Duration,
) -> Result<ComparisonResult> {
    let run = async {
        let (design, rendered) =
            tokio::try_join!(design.design_elements(), page.rendered_elements())?;
        comparator.compare(&design, &rendered).await
    };

    tokio::time::timeout(limit, run)
        .await
        .map_err(|_| QaError::Timeout { limit })?
}
