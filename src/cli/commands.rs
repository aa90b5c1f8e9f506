use std::path::PathBuf;
use std::time::Duration;

use crate::browser::playwright::ExtractionScript;
use crate::cli::config::ReportFormat;
use crate::extract::design_tree::{
    collect_design_tokens, extract_design_elements, parse_design_document,
};
use crate::extract::source::{DesignDocumentFile, DomSnapshotFile, PageSource};
use crate::model::result_model::{ComparisonResult, Readiness};
use crate::raster::pixel_diff::{RasterComparison, RasterOptions, compare_images};
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::{Comparator, run_comparison};

// ============================================================================
// compare subcommand
// ============================================================================

/// Where the rendered side comes from.
#[derive(Debug, Clone)]
pub enum RenderedInput {
    Snapshot(String),
    Live { url: String, script: String },
}

/// Run one comparison and return its verdict.
pub async fn cmd_compare(
    comparator: &Comparator,
    design_path: &str,
    rendered: RenderedInput,
    format: ReportFormat,
    output: Option<&str>,
    timeout: Duration,
) -> Result<Readiness, Box<dyn std::error::Error>> {
    let design = DesignDocumentFile::new(design_path);
    let page: Box<dyn PageSource> = match &rendered {
        RenderedInput::Snapshot(path) => Box::new(DomSnapshotFile::new(path)),
        RenderedInput::Live { url, script } => Box::new(ExtractionScript::node(script, url)),
    };

    let result = run_comparison(&design, page.as_ref(), comparator, timeout).await?;
    let verdict = result.quality.readiness;

    let title = match &rendered {
        RenderedInput::Snapshot(path) => path.as_str(),
        RenderedInput::Live { url, .. } => url.as_str(),
    };
    let content = render_report(&result, format, title)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &content).await?;
            tracing::info!(path, "report written");
        }
        None => print!("{}", content),
    }

    Ok(verdict)
}

/// Render a comparison result in the requested format.
pub fn render_report(
    result: &ComparisonResult,
    format: ReportFormat,
    title: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ReportFormat::Console => format_console_report(result),
        ReportFormat::Html => generate_html_report(result, title),
        ReportFormat::Junit => generate_junit_xml(result, title),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
    })
}

// ============================================================================
// raster subcommand
// ============================================================================

pub fn cmd_raster(
    design_path: &str,
    live_path: &str,
    threshold: f64,
    diff_output: Option<&str>,
) -> Result<RasterComparison, Box<dyn std::error::Error>> {
    let design = std::fs::read(design_path)?;
    let live = std::fs::read(live_path)?;

    let options = RasterOptions {
        threshold,
        diff_output: diff_output.map(PathBuf::from),
    };
    let comparison = compare_images(&design, &live, &options)?;

    println!(
        "Raster score: {:.2} / 100 ({} of {} pixels differ, {:.2}%)",
        comparison.overall_score,
        comparison.pixel_difference,
        comparison.total_pixels,
        comparison.diff_percentage
    );
    println!(
        "Layout {:.1}  Color {:.1}  Structure {:.1}",
        comparison.analysis.layout_match,
        comparison.analysis.color_similarity,
        comparison.analysis.structural_similarity
    );
    for line in &comparison.feedback {
        println!("  - {}", line);
    }

    Ok(comparison)
}

// ============================================================================
// tokens subcommand
// ============================================================================

pub fn cmd_tokens(design_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(design_path)?;
    let root = parse_design_document(&json)?;
    let elements = extract_design_elements(&root)?;
    let tokens = collect_design_tokens(&elements);

    println!("{}", serde_json::to_string_pretty(&tokens)?);
    Ok(())
}
