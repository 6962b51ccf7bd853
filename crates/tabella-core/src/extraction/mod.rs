pub mod geometry;
pub mod pdftotext;
pub mod table;

use crate::error::TabellaError;
use crate::registry::schema::Rectangle;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn center(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// A single word positioned on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// All words found on one page.
#[derive(Debug, Clone)]
pub struct PageWords {
    pub page_number: usize,
    pub words: Vec<Word>,
}

/// One page's table as extracted from a region, before any cleaning.
///
/// Every row has the same number of cells; missing cells are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawGrid {
    pub page_number: usize,
    pub rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The top-left cell, trimmed.
    pub fn first_cell(&self) -> Option<&str> {
        self.rows.first()?.first().map(|c| c.trim())
    }
}

/// Which pages an extraction covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScope {
    All,
    /// A single 1-based page.
    Only(usize),
}

/// Trait for region-scoped table extraction backends.
pub trait RegionExtractor: Send + Sync {
    /// Extract the table inside `region` from each page in `pages`.
    ///
    /// Returns one grid per page that has at least one row inside the
    /// region, in page order. A region with no text yields an empty vector.
    fn extract_region(
        &self,
        pdf: &Path,
        region: &Rectangle,
        pages: PageScope,
    ) -> Result<Vec<RawGrid>, TabellaError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
