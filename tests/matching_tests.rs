use std::io;
use std::sync::{Arc, Mutex};

use design_qa::geometry::iou::{iou, proximity};
use design_qa::matching::matcher::{MatchConfig, best_match, match_elements, score_candidate};
use design_qa::model::element_model::{BoundingBox, ElementRole};
use proptest::prelude::*;

mod common;

use common::builders::{FixedSimilarity, bbox, design, rendered};

// ============================================================================
// IoU
// ============================================================================

#[test]
fn test_iou_identical_boxes() {
    let a = bbox(10.0, 10.0, 100.0, 50.0);
    assert_eq!(iou(&a, &a), 1.0);
}

#[test]
fn test_iou_disjoint_and_touching_boxes() {
    let a = bbox(0.0, 0.0, 10.0, 10.0);
    assert_eq!(iou(&a, &bbox(50.0, 50.0, 10.0, 10.0)), 0.0);
    // Shared edge, no shared area.
    assert_eq!(iou(&a, &bbox(10.0, 0.0, 10.0, 10.0)), 0.0);
}

#[test]
fn test_iou_half_overlap() {
    let a = bbox(0.0, 0.0, 10.0, 10.0);
    let b = bbox(5.0, 0.0, 10.0, 10.0);
    // 50 / (100 + 100 - 50)
    assert!((iou(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_iou_zero_area_box() {
    let a = bbox(0.0, 0.0, 0.0, 10.0);
    assert_eq!(iou(&a, &a), 0.0);
}

#[test]
fn test_proximity_falls_off_with_distance() {
    let a = bbox(0.0, 0.0, 10.0, 10.0);
    assert_eq!(proximity(&a, &a), 1.0);
    assert!((proximity(&a, &bbox(500.0, 0.0, 10.0, 10.0)) - 0.5).abs() < 1e-9);
    assert_eq!(proximity(&a, &bbox(5000.0, 0.0, 10.0, 10.0)), 0.0);
}

fn arb_box() -> impl Strategy<Value = BoundingBox> {
    (
        -500.0..500.0f64,
        -500.0..500.0f64,
        0.0..400.0f64,
        0.0..400.0f64,
    )
        .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, w, h))
}

proptest! {
    #[test]
    fn prop_iou_symmetric(a in arb_box(), b in arb_box()) {
        prop_assert!((iou(&a, &b) - iou(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn prop_iou_in_unit_range(a in arb_box(), b in arb_box()) {
        let v = iou(&a, &b);
        prop_assert!((0.0..=1.0).contains(&v));
    }
}

// ============================================================================
// Candidate scoring
// ============================================================================

#[test]
fn test_score_combines_iou_and_text() {
    let d = design("d1", "Sign up", bbox(0.0, 0.0, 100.0, 20.0));
    let r = rendered("r1", "Sign up", bbox(0.0, 0.0, 100.0, 20.0));

    let score = score_candidate(&d, &r, &FixedSimilarity(0.5), &MatchConfig::default());
    assert_eq!(score.iou, 1.0);
    assert_eq!(score.text, 0.5);
    assert_eq!(score.penalty, 0.0);
    assert!((score.total - 0.8).abs() < 1e-9);
}

#[test]
fn test_role_penalty_applies_only_to_known_conflicting_roles() {
    let mut d = design("d1", "Sign up", bbox(0.0, 0.0, 100.0, 20.0));
    let mut r = rendered("r1", "Sign up", bbox(0.0, 0.0, 100.0, 20.0));
    let config = MatchConfig::default();
    let sim = FixedSimilarity(1.0);

    d.role = ElementRole::Button;
    r.role = ElementRole::Heading;
    let penalised = score_candidate(&d, &r, &sim, &config);
    assert_eq!(penalised.penalty, 0.5);
    assert!((penalised.total - 0.5).abs() < 1e-9);

    r.role = ElementRole::Other;
    assert_eq!(score_candidate(&d, &r, &sim, &config).penalty, 0.0);

    r.role = ElementRole::Button;
    assert_eq!(score_candidate(&d, &r, &sim, &config).penalty, 0.0);
}

#[test]
fn test_role_penalty_can_push_total_negative() {
    let mut d = design("d1", "Sign up", bbox(0.0, 0.0, 10.0, 10.0));
    let mut r = rendered("r1", "Other text", bbox(500.0, 500.0, 10.0, 10.0));
    d.role = ElementRole::Label;
    r.role = ElementRole::Paragraph;

    let score = score_candidate(&d, &r, &FixedSimilarity(0.0), &MatchConfig::default());
    assert!((score.total + 0.5).abs() < 1e-9);
}

// ============================================================================
// Threshold and selection
// ============================================================================

#[test]
fn test_threshold_boundary() {
    // iou 0 everywhere: total = 0.4 * similarity.
    let d = design("d1", "Sign up", bbox(0.0, 0.0, 10.0, 10.0));
    let r = vec![rendered("r1", "Sign up", bbox(100.0, 100.0, 10.0, 10.0))];
    let config = MatchConfig::default();

    // 0.4 * 0.51 = 0.204 > 0.2
    assert!(best_match(&d, &r, &FixedSimilarity(0.51), &config).is_some());
    // 0.4 * 0.49 = 0.196 < 0.2
    assert!(best_match(&d, &r, &FixedSimilarity(0.49), &config).is_none());
}

#[test]
fn test_score_equal_to_threshold_is_rejected() {
    let d = design("d1", "Sign up", bbox(0.0, 0.0, 10.0, 10.0));
    let r = vec![rendered("r1", "Sign up", bbox(100.0, 100.0, 10.0, 10.0))];
    let config = MatchConfig {
        text_weight: 0.5,
        ..MatchConfig::default()
    };

    assert!(best_match(&d, &r, &FixedSimilarity(0.4), &config).is_none());
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_rejected_candidate_is_logged_with_its_score() {
    let d = design("d1", "Sign up", bbox(0.0, 0.0, 10.0, 10.0));
    let r = vec![rendered("r1", "Sign up", bbox(100.0, 100.0, 10.0, 10.0))];

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let found = tracing::subscriber::with_default(subscriber, || {
        best_match(&d, &r, &FixedSimilarity(0.49), &MatchConfig::default())
    });
    assert!(found.is_none());

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("best candidate rejected"), "{}", output);
    assert!(output.contains("rendered=r1"), "{}", output);
    assert!(output.contains("total="), "{}", output);
    assert!(output.contains("threshold=0.2"), "{}", output);
}

#[test]
fn test_best_match_prefers_highest_score() {
    let d = design("d1", "Sign up", bbox(0.0, 0.0, 100.0, 20.0));
    let r = vec![
        rendered("far", "Sign up", bbox(0.0, 200.0, 100.0, 20.0)),
        rendered("near", "Sign up", bbox(10.0, 0.0, 100.0, 20.0)),
    ];

    let (index, _) = best_match(&d, &r, &FixedSimilarity(1.0), &MatchConfig::default()).unwrap();
    assert_eq!(index, 1);
}

#[test]
fn test_tie_broken_by_proximity() {
    // Neither candidate overlaps, so both score 0.4; the closer one wins.
    let d = design("d1", "Sign up", bbox(0.0, 0.0, 10.0, 10.0));
    let r = vec![
        rendered("far", "Sign up", bbox(600.0, 0.0, 10.0, 10.0)),
        rendered("near", "Sign up", bbox(50.0, 0.0, 10.0, 10.0)),
    ];

    let (index, score) =
        best_match(&d, &r, &FixedSimilarity(1.0), &MatchConfig::default()).unwrap();
    assert_eq!(index, 1);
    assert!((score.total - 0.4).abs() < 1e-9);
}

#[test]
fn test_match_elements_allows_shared_candidate() {
    let d = vec![
        design("d1", "Sign up", bbox(0.0, 0.0, 100.0, 20.0)),
        design("d2", "Sign up", bbox(0.0, 2.0, 100.0, 20.0)),
    ];
    let r = vec![rendered("r1", "Sign up", bbox(0.0, 0.0, 100.0, 20.0))];

    let matches = match_elements(&d, &r, &FixedSimilarity(1.0), &MatchConfig::default());
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].rendered, Some(0));
    assert_eq!(matches[1].rendered, Some(0));
    assert!((matches[0].confidence - 1.0).abs() < 1e-9);
}

#[test]
fn test_match_elements_unmatched_has_zero_confidence() {
    let d = vec![design("d1", "Sign up", bbox(0.0, 0.0, 10.0, 10.0))];
    let matches = match_elements(&d, &[], &FixedSimilarity(1.0), &MatchConfig::default());
    assert_eq!(matches[0].rendered, None);
    assert_eq!(matches[0].confidence, 0.0);
}
