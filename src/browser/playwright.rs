use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{QaError, Result};
use crate::extract::dom_snapshot::parse_dom_snapshot;
use crate::extract::source::PageSource;
use crate::model::element_model::RenderedElement;

/// Page-load strategies tried in order; each gets its own time limit.
pub const LOAD_STRATEGIES: [(&str, Duration); 3] = [
    ("domcontentloaded", Duration::from_secs(30)),
    ("load", Duration::from_secs(45)),
    ("networkidle2", Duration::from_secs(60)),
];

/// Captures a live page by running an external extraction script
/// (`<program> <args..> <url> --wait-until <strategy>`) that prints the
/// DOM snapshot JSON on stdout.
#[derive(Debug, Clone)]
pub struct ExtractionScript {
    pub program: String,
    pub args: Vec<String>,
    pub url: String,
    pub strategies: Vec<(String, Duration)>,
}

impl ExtractionScript {
    pub fn node(script: &str, url: &str) -> Self {
        Self::new("node", vec![script.to_string()], url)
    }

    pub fn new(program: &str, args: Vec<String>, url: &str) -> Self {
        Self {
            program: program.to_string(),
            args,
            url: url.to_string(),
            strategies: LOAD_STRATEGIES
                .iter()
                .map(|(name, limit)| (name.to_string(), *limit))
                .collect(),
        }
    }

    async fn run_strategy(&self, strategy: &str, limit: Duration) -> Result<String> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.url)
            .arg("--wait-until")
            .arg(strategy)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(limit, child)
            .await
            .map_err(|_| {
                QaError::PageCapture(format!("{} timed out after {}s", strategy, limit.as_secs()))
            })?
            .map_err(|e| QaError::PageCapture(format!("failed to spawn {}: {}", self.program, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(strategy, stderr = %stderr.trim(), "extraction script stderr");
        }

        if !output.status.success() {
            return Err(QaError::PageCapture(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl PageSource for ExtractionScript {
    async fn rendered_elements(&self) -> Result<Vec<RenderedElement>> {
        let mut last_error = None;

        for (strategy, limit) in &self.strategies {
            tracing::info!(url = %self.url, strategy = %strategy, "capturing page");
            match self.run_strategy(strategy, *limit).await {
                Ok(stdout) => return parse_dom_snapshot(&stdout),
                Err(e) => {
                    tracing::warn!(strategy = %strategy, error = %e, "load strategy failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| QaError::PageCapture("no load strategies configured".to_string())))
    }
}
