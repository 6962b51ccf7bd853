use std::path::PathBuf;

use crate::registry::schema::Rectangle;

#[derive(Debug, thiserror::Error)]
pub enum TabellaError {
    #[error("no input file found at {}", dir.display())]
    InputNotFound { dir: PathBuf },

    #[error("no table found in region {region} for supplier '{supplier_id}'")]
    RegionExtractionMiss {
        supplier_id: String,
        region: Rectangle,
    },

    #[error("could not identify the supplier: none of the {probes_tried} probe region(s) matched a known supplier")]
    SupplierUnresolved { probes_tried: usize },

    #[error("unknown supplier '{0}'")]
    UnknownSupplier(String),

    #[error("table extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("page {page} has {width} column(s) but the template needs column {column}")]
    ColumnOutOfRange {
        page: usize,
        column: usize,
        width: usize,
    },

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("could not read page geometry: {0}")]
    Geometry(String),

    #[error("failed to write spreadsheet: {0}")]
    ExportFailure(String),

    #[error("failed to load registry from {path}: {reason}")]
    RegistryLoad { path: PathBuf, reason: String },

    #[error("invalid registry: {0}")]
    RegistryInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TabellaError {
    /// True when the extraction engine itself cannot run, as opposed to a
    /// single region coming back empty or unreadable.
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, TabellaError::PdftotextNotFound)
    }
}
