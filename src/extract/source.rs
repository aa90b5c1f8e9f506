use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{QaError, Result};
use crate::extract::design_tree::{extract_design_elements, parse_design_document};
use crate::extract::dom_snapshot::parse_dom_snapshot;
use crate::model::element_model::{DesignElement, RenderedElement};

/// Produces the normalised design side of a comparison.
#[async_trait]
pub trait DesignSource: Send + Sync {
    async fn design_elements(&self) -> Result<Vec<DesignElement>>;
}

/// Produces the normalised rendered side of a comparison.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn rendered_elements(&self) -> Result<Vec<RenderedElement>>;
}

pub(crate) async fn read_file(path: &PathBuf) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| QaError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// A design document saved from the design API (`GET /files/:key/nodes`).
pub struct DesignDocumentFile {
    pub path: PathBuf,
}

impl DesignDocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DesignSource for DesignDocumentFile {
    async fn design_elements(&self) -> Result<Vec<DesignElement>> {
        let json = read_file(&self.path).await?;
        let root = parse_design_document(&json)?;
        extract_design_elements(&root)
    }
}

/// A DOM snapshot previously written by the extraction script.
pub struct DomSnapshotFile {
    pub path: PathBuf,
}

impl DomSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for DomSnapshotFile {
    async fn rendered_elements(&self) -> Result<Vec<RenderedElement>> {
        let json = read_file(&self.path).await?;
        parse_dom_snapshot(&json)
    }
}
